//! HTML rendering for the three UI modes.
//!
//! Plain string templates; every value coming from OCR, the store or the
//! request goes through [`escape`].

use crate::card_db::StoredCard;
use crate::card_processor::ScannedCard;
use crate::heuristics::{CardFields, Field};
use axum::http::StatusCode;
use std::fmt::Write;

const TITLE: &str = "EXTRACTING BUSINESS CARD DATA WITH 'OCR'";

/// Sidebar entry that is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Home,
    Upload,
    Delete,
}

/// Banner shown above a page body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Success,
    Warning,
    Error,
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(nav: Nav, body: &str) -> String {
    let link = |target: Nav, href: &str, label: &str| {
        let class = if target == nav { " class=\"active\"" } else { "" };
        format!("<li><a href=\"{href}\"{class}>{label}</a></li>")
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>BizCard</title>
<style>
body {{ font-family: sans-serif; margin: 0; display: flex; }}
nav {{ width: 14rem; min-height: 100vh; background: #f0f2f6; padding: 1rem; }}
nav a.active {{ font-weight: bold; }}
main {{ flex: 1; padding: 1rem 2rem; }}
table {{ border-collapse: collapse; }}
td, th {{ border: 1px solid #ccc; padding: 0.3rem 0.6rem; }}
.success {{ color: #0a7a2f; }} .warning {{ color: #a66a00; }} .error {{ color: #b00020; }}
</style>
</head>
<body>
<nav><h3>Main Menu</h3><ul>{home}{upload}{delete}</ul></nav>
<main>
<h1>{TITLE}</h1>
{body}
</main>
</body>
</html>"#,
        home = link(Nav::Home, "/", "Home"),
        upload = link(Nav::Upload, "/upload", "Upload &amp; Modifying"),
        delete = link(Nav::Delete, "/delete", "Delete"),
    )
}

fn notice(kind: Notice, message: &str) -> String {
    let class = match kind {
        Notice::Success => "success",
        Notice::Warning => "warning",
        Notice::Error => "error",
    };
    format!("<p class=\"{class}\"><strong>{}</strong></p>", escape(message))
}

pub fn home_page() -> String {
    layout(
        Nav::Home,
        "<h3>Technologies Used: Rust, Tesseract OCR, axum, SQLite</h3>\
         <h3>About: BizCard extracts information from business cards.</h3>\
         <p>It automates pulling the key details off a business card photo: \
         name, designation, company, contact number, email, website, address \
         and pincode. The text is read by an OCR engine, sorted into fields, \
         shown for review and saved to a local database where it can be \
         previewed, modified or deleted.</p>",
    )
}

/// The method selector shown under the upload form.
fn method_links() -> &'static str {
    "<p>Select the Method: \
     <a href=\"/upload\">None</a> | \
     <a href=\"/upload/preview\">Preview</a> | \
     <a href=\"/upload/modify\">Modify</a></p>"
}

pub fn upload_page() -> String {
    let body = format!(
        "<form method=\"post\" action=\"/upload\" enctype=\"multipart/form-data\">\
         <label>Upload the Image <input type=\"file\" name=\"image\" accept=\".png,.jpg,.jpeg\" required></label> \
         <button type=\"submit\">Extract</button></form>\
         {}",
        method_links()
    );
    layout(Nav::Upload, &body)
}

fn fields_header(with_image: bool) -> String {
    let mut row = String::from("<tr>");
    for field in Field::ALL {
        let _ = write!(row, "<th>{}</th>", field.key());
    }
    if with_image {
        row.push_str("<th>IMAGE</th>");
    }
    row.push_str("</tr>");
    row
}

fn fields_cells(fields: &CardFields) -> String {
    Field::ALL
        .iter()
        .map(|&f| format!("<td>{}</td>", escape(fields.get(f))))
        .collect()
}

/// Result of one scan: extracted table plus a form that carries the record to `/save`.
pub fn scan_preview_page(scanned: &ScannedCard, image_b64: &str) -> String {
    let data_uri = format!("data:{};base64,{image_b64}", scanned.kind.mime());
    let mut hidden = String::new();
    for field in Field::ALL {
        let _ = write!(
            hidden,
            "<input type=\"hidden\" name=\"{}\" value=\"{}\">",
            field.key(),
            escape(scanned.fields.get(field))
        );
    }

    let body = format!(
        "<img src=\"{data_uri}\" width=\"300\" alt=\"uploaded card\">\
         {notice}\
         <table>{header}<tr>{cells}<td><img src=\"{data_uri}\" width=\"80\" alt=\"\"></td></tr></table>\
         <form method=\"post\" action=\"/save\">{hidden}\
         <input type=\"hidden\" name=\"image\" value=\"{image_b64}\">\
         <button type=\"submit\">Save</button></form>\
         {methods}",
        notice = notice(Notice::Success, "TEXT IS EXTRACTED SUCCESSFULLY"),
        header = fields_header(true),
        cells = fields_cells(&scanned.fields),
        methods = method_links(),
    );
    layout(Nav::Upload, &body)
}

pub fn cards_table_page(cards: &[StoredCard]) -> String {
    let mut rows = String::new();
    for card in cards {
        let _ = write!(
            rows,
            "<tr>{}<td><img src=\"/cards/{}/image\" width=\"80\" alt=\"\"></td></tr>",
            fields_cells(&card.fields),
            card.rowid
        );
    }
    let table = if cards.is_empty() {
        "<p>No cards saved yet.</p>".to_string()
    } else {
        format!("<table>{}{rows}</table>", fields_header(true))
    };
    layout(Nav::Upload, &format!("{}{table}", method_links()))
}

fn select(name: &str, label: &str, options: &[String], selected: Option<&str>) -> String {
    let mut html = format!("<label>{label} <select name=\"{name}\" onchange=\"this.form.submit()\">");
    for option in options {
        let mark = if Some(option.as_str()) == selected { " selected" } else { "" };
        let value = escape(option);
        let _ = write!(html, "<option value=\"{value}\"{mark}>{value}</option>");
    }
    html.push_str("</select></label>");
    html
}

/// Name selector plus an edit form for the first card with that name.
pub fn modify_page(names: &[String], card: Option<&StoredCard>) -> String {
    let mut body = String::from(method_links());
    let Some(card) = card else {
        if names.is_empty() {
            body.push_str("<p>No cards saved yet.</p>");
        } else {
            let _ = write!(
                body,
                "<form method=\"get\" action=\"/upload/modify\">{}</form><p>No card with that name.</p>",
                select("name", "Select the name", names, None)
            );
        }
        return layout(Nav::Upload, &body);
    };

    let _ = write!(
        body,
        "<form method=\"get\" action=\"/upload/modify\">{}</form>",
        select("name", "Select the name", names, Some(card.fields.name.as_str()))
    );

    let mut inputs = String::new();
    for field in Field::ALL {
        let _ = write!(
            inputs,
            "<p><label>{} <input type=\"text\" name=\"{}\" value=\"{}\"></label></p>",
            field.label(),
            field.key(),
            escape(card.fields.get(field))
        );
    }
    let _ = write!(
        body,
        "<table>{header}<tr>{cells}</tr></table>\
         <form method=\"post\" action=\"/upload/modify\">\
         <input type=\"hidden\" name=\"original_name\" value=\"{original}\">{inputs}\
         <button type=\"submit\">Modify</button></form>",
        header = fields_header(false),
        cells = fields_cells(&card.fields),
        original = escape(&card.fields.name),
    );
    layout(Nav::Upload, &body)
}

pub fn delete_page(
    names: &[String],
    name: Option<&str>,
    designations: &[String],
    designation: Option<&str>,
) -> String {
    let mut body = format!(
        "<form method=\"get\" action=\"/delete\">{} {}</form>",
        select("name", "Select the name", names, name),
        select("designation", "Select the designation", designations, designation),
    );

    if let (Some(name), Some(designation)) = (name, designation) {
        let name = escape(name);
        let designation = escape(designation);
        let _ = write!(
            body,
            "<p>Selected Name : {name}</p><p>Selected Designation : {designation}</p>\
             <form method=\"post\" action=\"/delete\">\
             <input type=\"hidden\" name=\"name\" value=\"{name}\">\
             <input type=\"hidden\" name=\"designation\" value=\"{designation}\">\
             <button type=\"submit\">Delete</button></form>"
        );
    } else if names.is_empty() {
        body.push_str("<p>No cards saved yet.</p>");
    }
    layout(Nav::Delete, &body)
}

pub fn message_page(nav: Nav, kind: Notice, message: &str) -> String {
    let links = if nav == Nav::Upload { method_links() } else { "" };
    layout(nav, &format!("{}{links}", notice(kind, message)))
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let title = status.canonical_reason().unwrap_or("Error");
    layout(
        Nav::Home,
        &format!("<h2>{}</h2>{}", status.as_u16(), notice(Notice::Error, &format!("{title}: {message}"))),
    )
}
