use super::pages::{self, Nav, Notice};
use super::{AppState, WebError, with_store};
use crate::card_processor::{ImageKind, scan_card};
use crate::heuristics::CardFields;
use axum::{
    Form,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct SaveForm {
    #[serde(flatten)]
    pub fields: CardFields,
    /// Base64 image carried over from the scan preview.
    pub image: String,
}

#[derive(Debug, Deserialize)]
pub struct ModifyForm {
    pub original_name: String,
    #[serde(flatten)]
    pub fields: CardFields,
}

#[derive(Debug, Default, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    pub name: Option<String>,
    pub designation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    pub name: String,
    pub designation: String,
}

pub async fn home() -> Html<String> {
    Html(pages::home_page())
}

pub async fn upload_form() -> Html<String> {
    Html(pages::upload_page())
}

/// POST /upload: OCR the uploaded card and show the extracted fields.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Html<String>, WebError> {
    let mut image = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("image") {
            let filename = field.file_name().unwrap_or("").to_string();
            let bytes = field.bytes().await?;
            info!(filename = %filename, bytes = bytes.len(), "Card image uploaded");
            image = Some(bytes);
        }
    }
    let image = image
        .filter(|b| !b.is_empty())
        .ok_or_else(|| WebError::new(StatusCode::BAD_REQUEST, "no image uploaded"))?;

    let scanned = scan_card(state.ocr.as_ref(), &image).await?;
    Ok(Html(pages::scan_preview_page(
        &scanned,
        &STANDARD.encode(&image),
    )))
}

/// POST /save: persist the previewed card verbatim.
pub async fn save(
    State(state): State<AppState>,
    Form(form): Form<SaveForm>,
) -> Result<Html<String>, WebError> {
    let image = STANDARD.decode(form.image.as_bytes())?;
    let fields = form.fields;
    with_store(&state, move |store| store.insert(&fields, &image)).await?;
    Ok(Html(pages::message_page(
        Nav::Upload,
        Notice::Success,
        "SAVED SUCCESSFULLY",
    )))
}

/// GET /upload/preview: every stored card.
pub async fn preview(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    let cards = with_store(&state, |store| store.select_all()).await?;
    Ok(Html(pages::cards_table_page(&cards)))
}

/// GET /upload/modify: pick a name, edit the first card with it.
pub async fn modify_form(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Result<Html<String>, WebError> {
    let (names, card) = with_store(&state, move |store| {
        let names = store.names()?;
        let Some(selected) = query.name.or_else(|| names.first().cloned()) else {
            return Ok((names, None));
        };
        let card = store.find_by_name(&selected)?.into_iter().next();
        Ok((names, card))
    })
    .await?;
    Ok(Html(pages::modify_page(&names, card.as_ref())))
}

/// POST /upload/modify: delete every card with the old name, insert the edit.
pub async fn modify(
    State(state): State<AppState>,
    Form(form): Form<ModifyForm>,
) -> Result<Html<String>, WebError> {
    let ModifyForm {
        original_name,
        fields,
    } = form;
    with_store(&state, move |store| store.modify(&original_name, &fields)).await?;
    Ok(Html(pages::message_page(
        Nav::Upload,
        Notice::Success,
        "MODIFIED SUCCESSFULLY",
    )))
}

/// GET /delete: name selector, then the designations stored for that name.
pub async fn delete_form(
    State(state): State<AppState>,
    Query(query): Query<DeleteQuery>,
) -> Result<Html<String>, WebError> {
    let (names, name, designations) = with_store(&state, move |store| {
        let names = store.names()?;
        let name = query.name.or_else(|| names.first().cloned());
        let designations = match &name {
            Some(name) => store.designations_for(name)?,
            None => Vec::new(),
        };
        Ok((names, name, designations))
    })
    .await?;

    let designation = query
        .designation
        .filter(|d| designations.contains(d))
        .or_else(|| designations.first().cloned());
    Ok(Html(pages::delete_page(
        &names,
        name.as_deref(),
        &designations,
        designation.as_deref(),
    )))
}

/// POST /delete: remove rows matching both name and designation.
pub async fn delete(
    State(state): State<AppState>,
    Form(form): Form<DeleteForm>,
) -> Result<Html<String>, WebError> {
    let removed = with_store(&state, move |store| {
        store.delete_where(&form.name, Some(&form.designation))
    })
    .await?;
    info!(removed, "Delete request handled");
    Ok(Html(pages::message_page(Nav::Delete, Notice::Warning, "DELETED")))
}

/// GET /cards/:rowid/image: stored image bytes.
pub async fn card_image(
    State(state): State<AppState>,
    Path(rowid): Path<i64>,
) -> Result<Response, WebError> {
    let image = with_store(&state, move |store| store.image(rowid))
        .await?
        .ok_or_else(|| WebError::new(StatusCode::NOT_FOUND, "Card not found"))?;
    let mime = ImageKind::detect(&image)
        .map(ImageKind::mime)
        .unwrap_or("application/octet-stream");
    Ok(([(header::CONTENT_TYPE, mime)], image).into_response())
}
