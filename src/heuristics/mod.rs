// src/heuristics/mod.rs

mod card;

use serde::Deserialize;
use serde::Serialize;

/// Placeholder stored for a field that received no OCR line.
pub const MISSING: &str = "NA";

/// The eight text fields of a business card, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Designation,
    CompanyName,
    Contact,
    Email,
    Website,
    Address,
    Pincode,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Name,
        Field::Designation,
        Field::CompanyName,
        Field::Contact,
        Field::Email,
        Field::Website,
        Field::Address,
        Field::Pincode,
    ];

    /// Upper-case key used in JSON output and form field names.
    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "NAME",
            Field::Designation => "DESIGNATION",
            Field::CompanyName => "COMPANY_NAME",
            Field::Contact => "CONTACT",
            Field::Email => "EMAIL",
            Field::Website => "WEBSITE",
            Field::Address => "ADDRESS",
            Field::Pincode => "PINCODE",
        }
    }

    /// Human label for form inputs.
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Designation => "Designation",
            Field::CompanyName => "Company_name",
            Field::Contact => "Contact",
            Field::Email => "Email",
            Field::Website => "Website",
            Field::Address => "Address",
            Field::Pincode => "Pincode",
        }
    }
}

/// All structured data we extract from one business card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CardFields {
    pub name: String,
    pub designation: String,
    pub company_name: String,
    pub contact: String,
    pub email: String,
    pub website: String,
    pub address: String,
    pub pincode: String,
}

impl CardFields {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Designation => &self.designation,
            Field::CompanyName => &self.company_name,
            Field::Contact => &self.contact,
            Field::Email => &self.email,
            Field::Website => &self.website,
            Field::Address => &self.address,
            Field::Pincode => &self.pincode,
        }
    }

    /// How many fields hold real content rather than the placeholder.
    pub fn coverage(&self) -> (usize, usize) {
        let filled = Field::ALL
            .iter()
            .filter(|&&f| self.get(f) != MISSING)
            .count();
        (filled, Field::ALL.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    #[error("insufficient text detected: need at least 2 lines, found {found}")]
    InsufficientText { found: usize },
}

/// Bucket ordered OCR lines into card fields.
pub fn classify_lines<S: AsRef<str>>(lines: &[S]) -> Result<CardFields, ClassifyError> {
    card::classify(lines)
}
