use serde::Deserialize;
use std::{fs, path::Path};
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = ".config/bizcard.toml";

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub ocr: OcrSection,
}

fn default_db_path() -> String {
    "bizcardx.db".to_string()
}

#[derive(Deserialize, Debug, Clone)]
pub struct ServerSection {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_bind() -> String {
    "127.0.0.1:8501".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackend {
    #[default]
    Tesseract,
    Ollama,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct OcrSection {
    #[serde(default)]
    pub backend: OcrBackend,
    #[serde(default)]
    pub tesseract: TesseractConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TesseractConfig {
    #[serde(default = "default_tesseract_binary")]
    pub binary: String,
    #[serde(default = "default_lang")]
    pub lang: String,
}

fn default_tesseract_binary() -> String {
    "tesseract".to_string()
}

fn default_lang() -> String {
    "eng".to_string()
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            binary: default_tesseract_binary(),
            lang: default_lang(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llava".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            model: default_ollama_model(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            server: ServerSection::default(),
            ocr: OcrSection::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Like `load`, but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        info!(path = %path.display(), "Loading config");
        Self::load(path)
    }
}
