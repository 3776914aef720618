// src/ocr.rs

use crate::config::{OcrBackend, OcrSection, OllamaConfig, TesseractConfig};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{info, warn};

/// Prompt for vision backends. The model transcribes; it does not label fields.
const TRANSCRIBE_PROMPT: &str = "Transcribe every line of text on this business card exactly as \
printed, top to bottom, one line per output line. Output only the text, no commentary.";

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{engine} exited with {status}: {stderr}")]
    Failed {
        engine: &'static str,
        status: String,
        stderr: String,
    },
    #[error("OCR request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("OCR backend unavailable: {0}")]
    Unavailable(String),
}

/// Black-box OCR: image bytes in, recognised lines out (top to bottom).
#[async_trait]
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &'static str;

    async fn extract_lines(&self, image: &[u8]) -> Result<Vec<String>, OcrError>;
}

/// Build the engine selected in config.
pub fn build_engine(cfg: &OcrSection) -> Box<dyn OcrEngine> {
    match cfg.backend {
        OcrBackend::Tesseract => {
            info!(binary = %cfg.tesseract.binary, lang = %cfg.tesseract.lang, "Using tesseract OCR backend");
            Box::new(TesseractOcr::new(&cfg.tesseract))
        }
        OcrBackend::Ollama => {
            info!(url = %cfg.ollama.base_url, model = %cfg.ollama.model, "Using Ollama vision OCR backend");
            Box::new(OllamaOcr::new(&cfg.ollama))
        }
    }
}

/// Split raw engine output into trimmed, non-empty lines.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct TesseractOcr {
    binary: String,
    lang: String,
}

impl TesseractOcr {
    pub fn new(cfg: &TesseractConfig) -> Self {
        Self {
            binary: cfg.binary.clone(),
            lang: cfg.lang.clone(),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn extract_lines(&self, image: &[u8]) -> Result<Vec<String>, OcrError> {
        let spawn_err = |source: std::io::Error| OcrError::Spawn {
            binary: self.binary.clone(),
            source,
        };

        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", self.lang.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_err)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(image).await.map_err(spawn_err)?;
        }

        let output = child.wait_with_output().await.map_err(spawn_err)?;
        if !output.status.success() {
            return Err(OcrError::Failed {
                engine: self.name(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let lines = split_lines(&String::from_utf8_lossy(&output.stdout));
        info!(lines = lines.len(), bytes = image.len(), "Tesseract finished");
        Ok(lines)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    images: Vec<String>,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

pub struct OllamaOcr {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaOcr {
    pub fn new(cfg: &OllamaConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
        }
    }

    /// Check if the Ollama server is reachable.
    async fn check_health(&self) -> bool {
        match self
            .client
            .get(&self.base_url)
            .timeout(std::time::Duration::from_secs(3))
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                warn!(status = %resp.status(), "Ollama server returned non-OK status");
                false
            }
            Err(e) => {
                warn!(error = %e, "Ollama server not reachable");
                false
            }
        }
    }
}

#[async_trait]
impl OcrEngine for OllamaOcr {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn extract_lines(&self, image: &[u8]) -> Result<Vec<String>, OcrError> {
        if !self.check_health().await {
            return Err(OcrError::Unavailable(format!(
                "Ollama is not running at {}. Start it with: ollama serve",
                self.base_url
            )));
        }

        let request = GenerateRequest {
            model: &self.model,
            prompt: TRANSCRIBE_PROMPT,
            images: vec![STANDARD.encode(image)],
            stream: false,
            options: GenerateOptions { temperature: 0.0 },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::Failed {
                engine: self.name(),
                status: status.to_string(),
                stderr: body,
            });
        }

        let generated: GenerateResponse = response.json().await?;
        let lines = split_lines(&generated.response);
        info!(lines = lines.len(), model = %self.model, "Ollama transcription finished");
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_drops_blanks() {
        let raw = "  Jane Doe \n\nCEO\r\n   \n+1-555-2020\n\x0c";
        assert_eq!(split_lines(raw), vec!["Jane Doe", "CEO", "+1-555-2020"]);
        assert!(split_lines("").is_empty());
    }

    #[tokio::test]
    async fn test_missing_tesseract_binary() {
        let engine = TesseractOcr::new(&TesseractConfig {
            binary: "bizcard-no-such-ocr-binary".to_string(),
            lang: "eng".to_string(),
        });
        let err = engine.extract_lines(b"not an image").await.unwrap_err();
        assert!(matches!(err, OcrError::Spawn { .. }));
    }

    #[test]
    fn test_build_engine_follows_backend() {
        let mut cfg = OcrSection::default();
        assert_eq!(build_engine(&cfg).name(), "tesseract");
        cfg.backend = OcrBackend::Ollama;
        assert_eq!(build_engine(&cfg).name(), "ollama");
    }
}
