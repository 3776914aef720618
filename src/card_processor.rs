// src/card_processor.rs

use crate::card_db::CardStore;
use crate::config::Config;
use crate::heuristics::{self, CardFields, ClassifyError};
use crate::ocr::{self, OcrEngine, OcrError};
use std::path::Path;
use tracing::{info, warn};

/// Image types accepted on upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    /// Sniff the magic bytes; anything but PNG/JPEG is rejected.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(ImageKind::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageKind::Jpeg)
        } else {
            None
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("unsupported image type (expected PNG or JPEG)")]
    UnsupportedImage,
    #[error(transparent)]
    Ocr(#[from] OcrError),
    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

/// One OCR run, classified and ready for preview.
#[derive(Debug, Clone)]
pub struct ScannedCard {
    pub kind: ImageKind,
    pub lines: Vec<String>,
    pub fields: CardFields,
}

/// Check the image type, OCR it and bucket the lines into fields.
#[tracing::instrument(name = "scan", skip_all, fields(engine = engine.name(), bytes = image.len()))]
pub async fn scan_card(engine: &dyn OcrEngine, image: &[u8]) -> Result<ScannedCard, ScanError> {
    let kind = ImageKind::detect(image).ok_or(ScanError::UnsupportedImage)?;
    let lines = engine.extract_lines(image).await?;
    info!(lines = lines.len(), kind = ?kind, "OCR lines received");

    let fields = match heuristics::classify_lines(lines.as_slice()) {
        Ok(fields) => fields,
        Err(e) => {
            warn!(error = %e, "Could not classify OCR output");
            return Err(e.into());
        }
    };

    let (filled, total) = fields.coverage();
    info!(
        filled,
        total,
        name = %fields.name,
        company = %fields.company_name,
        "Card classified"
    );

    Ok(ScannedCard {
        kind,
        lines,
        fields,
    })
}

/// Scan a card from disk, print the fields, optionally store the card.
///
/// Usage: `cargo run -- scan <image> [--save]`
pub async fn scan_file(
    path: &Path,
    cfg: &Config,
    save: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let image = tokio::fs::read(path).await?;
    info!(path = %path.display(), bytes = image.len(), "Loaded card image");

    let engine = ocr::build_engine(&cfg.ocr);
    let scanned = scan_card(engine.as_ref(), &image).await?;

    println!("\n--- OCR Lines ---");
    for line in &scanned.lines {
        println!("{line}");
    }
    println!("--- Fields ---");
    println!("{}", serde_json::to_string_pretty(&scanned.fields)?);
    let (filled, total) = scanned.fields.coverage();
    println!("--- End ({filled}/{total} fields) ---\n");

    if save {
        let db = CardStore::new(&cfg.db_path)?;
        let rowid = db.insert(&scanned.fields, &image)?;
        println!("SAVED SUCCESSFULLY (row {rowid})");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    struct FixedOcr(Vec<&'static str>);

    #[async_trait]
    impl OcrEngine for FixedOcr {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn extract_lines(&self, _image: &[u8]) -> Result<Vec<String>, OcrError> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    #[test]
    fn test_detect_image_kind() {
        assert_eq!(ImageKind::detect(PNG_HEADER), Some(ImageKind::Png));
        assert_eq!(
            ImageKind::detect(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10]),
            Some(ImageKind::Jpeg)
        );
        assert_eq!(ImageKind::detect(b"GIF89a"), None);
        assert_eq!(ImageKind::detect(b""), None);
        assert_eq!(ImageKind::Jpeg.mime(), "image/jpeg");
    }

    #[tokio::test]
    async fn test_scan_card_classifies_lines() {
        let engine = FixedOcr(vec!["Jane Doe", "CEO", "Acme Corp", "jane@acme.com"]);
        let scanned = scan_card(&engine, PNG_HEADER).await.unwrap();
        assert_eq!(scanned.kind, ImageKind::Png);
        assert_eq!(scanned.lines.len(), 4);
        assert_eq!(scanned.fields.company_name, "Acme Corp");
        assert_eq!(scanned.fields.email, "jane@acme.com");
    }

    #[tokio::test]
    async fn test_scan_card_rejects_other_formats() {
        let engine = FixedOcr(vec!["Jane Doe", "CEO"]);
        let err = scan_card(&engine, b"GIF89a....").await.unwrap_err();
        assert!(matches!(err, ScanError::UnsupportedImage));
    }

    #[tokio::test]
    async fn test_scan_card_reports_insufficient_text() {
        let engine = FixedOcr(vec!["lonely"]);
        let err = scan_card(&engine, PNG_HEADER).await.unwrap_err();
        assert!(matches!(
            err,
            ScanError::Classify(ClassifyError::InsufficientText { found: 1 })
        ));
        assert_eq!(
            err.to_string(),
            "insufficient text detected: need at least 2 lines, found 1"
        );
    }
}
