use super::{CardFields, ClassifyError, MISSING};
use regex::Regex;
use std::sync::LazyLock;

static LEADING_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]").expect("static regex"));
static ADDRESS_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,;]").expect("static regex"));

/// Only these casings count as a website marker; `WWw`, `wWW` etc. do not.
const WEBSITE_MARKERS: [&str; 5] = ["WWW", "www", "Www", "wWw", "wwW"];
const REGION_MARKERS: [&str; 2] = ["Tamil Nadu", "TamilNadu"];

/// Where a single line (index >= 2) ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Bucket {
    Contact,
    Email,
    Website(String),
    Pincode,
    CompanyName,
    Address(String),
}

/// Positional name/designation, then first-match rules for the rest.
pub fn classify<S: AsRef<str>>(lines: &[S]) -> Result<CardFields, ClassifyError> {
    let [name, designation, rest @ ..] = lines else {
        return Err(ClassifyError::InsufficientText { found: lines.len() });
    };

    let mut company_name = Vec::new();
    let mut contact = Vec::new();
    let mut email = Vec::new();
    let mut website = Vec::new();
    let mut address = Vec::new();
    let mut pincode = Vec::new();

    for line in rest {
        let s = line.as_ref();
        match bucket_for(s) {
            Bucket::Contact => contact.push(s.to_string()),
            Bucket::Email => email.push(s.to_string()),
            Bucket::Website(lowered) => website.push(lowered),
            Bucket::Pincode => pincode.push(s.to_string()),
            Bucket::CompanyName => company_name.push(s.to_string()),
            Bucket::Address(stripped) => address.push(stripped),
        }
    }

    Ok(CardFields {
        name: join_or_missing(&[name.as_ref().to_string()]),
        designation: join_or_missing(&[designation.as_ref().to_string()]),
        company_name: join_or_missing(&company_name),
        contact: join_or_missing(&contact),
        email: join_or_missing(&email),
        website: join_or_missing(&website),
        address: join_or_missing(&address),
        pincode: join_or_missing(&pincode),
    })
}

// Rule order matters: a line can satisfy several predicates.
fn bucket_for(s: &str) -> Bucket {
    if looks_like_contact(s) {
        Bucket::Contact
    } else if s.contains('@') && s.contains(".com") {
        Bucket::Email
    } else if WEBSITE_MARKERS.iter().any(|m| s.contains(m)) {
        Bucket::Website(s.to_lowercase())
    } else if REGION_MARKERS.iter().any(|m| s.contains(m)) || is_digits(s) {
        Bucket::Pincode
    } else if LEADING_LETTER.is_match(s) {
        Bucket::CompanyName
    } else {
        Bucket::Address(ADDRESS_PUNCT.replace_all(s, "").into_owned())
    }
}

fn looks_like_contact(s: &str) -> bool {
    s.starts_with('+') || (s.contains('-') && is_digits(&s.replace('-', "")))
}

/// ASCII `0-9` only; Unicode digits such as `²` or `١٢٣` do not count.
fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn join_or_missing(values: &[String]) -> String {
    if values.is_empty() {
        MISSING.to_string()
    } else {
        values.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::Field;

    fn card(lines: &[&str]) -> CardFields {
        classify(lines).unwrap()
    }

    #[test]
    fn test_full_card() {
        let fields = card(&[
            "Jane Doe",
            "CEO",
            "Acme Corp",
            "+1-555-2020",
            "jane@acme.com",
            "www.acme.com",
            "12 Main St",
            "600001",
        ]);
        assert_eq!(fields.name, "Jane Doe");
        assert_eq!(fields.designation, "CEO");
        assert_eq!(fields.company_name, "Acme Corp");
        assert_eq!(fields.contact, "+1-555-2020");
        assert_eq!(fields.email, "jane@acme.com");
        assert_eq!(fields.website, "www.acme.com");
        assert_eq!(fields.address, "12 Main St");
        assert_eq!(fields.pincode, "600001");
        assert_eq!(fields.coverage(), (8, 8));
    }

    #[test]
    fn test_too_few_lines() {
        assert_eq!(
            classify::<&str>(&[]),
            Err(ClassifyError::InsufficientText { found: 0 })
        );
        assert_eq!(
            classify(&["Only Name"]),
            Err(ClassifyError::InsufficientText { found: 1 })
        );
    }

    #[test]
    fn test_two_lines_fill_placeholders() {
        let fields = card(&["+91 98400 12345", "x@y.com"]);
        // first two lines are trusted whatever they look like
        assert_eq!(fields.name, "+91 98400 12345");
        assert_eq!(fields.designation, "x@y.com");
        for f in Field::ALL {
            assert!(!fields.get(f).is_empty());
        }
        assert_eq!(fields.contact, MISSING);
        assert_eq!(fields.address, MISSING);
        assert_eq!(fields.coverage(), (2, 8));
    }

    #[test]
    fn test_hyphenated_digits_are_contact_not_pincode() {
        let fields = card(&["A", "B", "123-456"]);
        assert_eq!(fields.contact, "123-456");
        assert_eq!(fields.pincode, MISSING);
    }

    #[test]
    fn test_lone_hyphen_is_not_contact() {
        let fields = card(&["A", "B", "-"]);
        assert_eq!(fields.contact, MISSING);
        assert_eq!(fields.address, "-");
    }

    #[test]
    fn test_website_casing_variants() {
        let fields = card(&["A", "B", "WWW.ACME.COM", "wWw.Example.org"]);
        assert_eq!(fields.website, "www.acme.com www.example.org");

        // not one of the recognised casings: falls through to company
        let fields = card(&["A", "B", "WWw.example.com"]);
        assert_eq!(fields.website, MISSING);
        assert_eq!(fields.company_name, "WWw.example.com");
    }

    #[test]
    fn test_email_needs_dot_com() {
        let fields = card(&["A", "B", "info@acme.in", "sales@acme.com"]);
        assert_eq!(fields.email, "sales@acme.com");
        assert_eq!(fields.company_name, "info@acme.in");
    }

    #[test]
    fn test_email_checked_before_website() {
        let fields = card(&["A", "B", "hello@www.acme.com"]);
        assert_eq!(fields.email, "hello@www.acme.com");
        assert_eq!(fields.website, MISSING);
    }

    #[test]
    fn test_region_goes_to_pincode() {
        let fields = card(&["A", "B", "Chennai, Tamil Nadu", "TamilNadu 600113", "tamil nadu"]);
        assert_eq!(fields.pincode, "Chennai, Tamil Nadu TamilNadu 600113");
        assert_eq!(fields.company_name, "tamil nadu");
    }

    #[test]
    fn test_address_strips_punctuation() {
        let fields = card(&["A", "B", "12, Main St; City", "#4 Park Road,"]);
        assert_eq!(fields.address, "12 Main St City #4 Park Road");
    }

    #[test]
    fn test_punctuation_only_line_leaves_empty_address() {
        let fields = card(&["A", "B", ",;"]);
        assert_eq!(fields.address, "");
        assert_eq!(fields.company_name, MISSING);
    }

    #[test]
    fn test_unicode_digits_are_not_pincode() {
        let fields = card(&["A", "B", "١٢٣", "600001"]);
        assert_eq!(fields.pincode, "600001");
        assert_eq!(fields.address, "١٢٣");
    }

    #[test]
    fn test_multiple_lines_join_in_order() {
        let fields = card(&["A", "B", "+123", "Global", "Insurance", "456-789"]);
        assert_eq!(fields.contact, "+123 456-789");
        assert_eq!(fields.company_name, "Global Insurance");
    }

    #[test]
    fn test_classification_is_repeatable() {
        let lines = ["Selva", "DATA MANAGER", "+123-456-7890", "123 ABC St , Chennai;"];
        assert_eq!(card(&lines), card(&lines));
    }
}
