mod card_db;
mod card_processor;
mod config;
mod heuristics;
mod ocr;
mod web;

use card_db::CardStore;
use config::Config;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: bizcard [serve]
       bizcard scan <image> [--save]
       bizcard list
       bizcard delete <name> [designation]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // init tracing
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("BIZCARD_CONFIG").unwrap_or_else(|_| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = Config::load_or_default(&config_path)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        [] | ["serve"] => {
            let engine = ocr::build_engine(&cfg.ocr);
            web::serve(&cfg, Arc::from(engine)).await?;
        }
        ["scan", rest @ ..] => {
            let Some((image, save)) = scan_args(rest) else {
                eprintln!("{USAGE}");
                return Err("scan takes one image path and an optional --save".into());
            };
            card_processor::scan_file(Path::new(image), &cfg, save).await?;
        }
        ["list"] => {
            let db = CardStore::new(&cfg.db_path)?;
            let cards = db.select_all()?;
            for card in &cards {
                println!("{}", serde_json::to_string(&card.fields)?);
            }
            info!(cards = cards.len(), db_path = %cfg.db_path, "Listed cards");
        }
        ["delete", name, rest @ ..] if rest.len() <= 1 => {
            let db = CardStore::new(&cfg.db_path)?;
            let removed = db.delete_where(name, rest.first().copied())?;
            println!("DELETED {removed} card(s)");
        }
        _ => {
            eprintln!("{USAGE}");
            return Err("unrecognised command".into());
        }
    }

    Ok(())
}

/// `scan` arguments: exactly one image path, `--save` anywhere.
fn scan_args<'a>(rest: &[&'a str]) -> Option<(&'a str, bool)> {
    let save = rest.contains(&"--save");
    let mut paths = rest.iter().copied().filter(|a| *a != "--save");
    match (paths.next(), paths.next()) {
        (Some(image), None) if !image.starts_with("--") => Some((image, save)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_args_accept_save_in_any_position() {
        assert_eq!(scan_args(&["card.png"]), Some(("card.png", false)));
        assert_eq!(scan_args(&["card.png", "--save"]), Some(("card.png", true)));
        assert_eq!(scan_args(&["--save", "card.png"]), Some(("card.png", true)));
    }

    #[test]
    fn test_scan_args_reject_flags_and_extra_paths() {
        assert_eq!(scan_args(&[]), None);
        assert_eq!(scan_args(&["--save"]), None);
        assert_eq!(scan_args(&["--verbose", "card.png"]), None);
        assert_eq!(scan_args(&["a.png", "b.png"]), None);
    }
}
