use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

use crate::dtos::{MessageResponse, PublishForm, PublishResponse};
use crate::middleware::AuthUser;
use crate::services::PublishMetadata;
use crate::AppState;

const DEFAULT_FILE_NAME: &str = "catalog.pdf";

struct UploadedFile {
    data: Vec<u8>,
    file_name: Option<String>,
    content_type: Option<String>,
}

pub async fn publish_catalog(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let max_upload_bytes = state.config.storage.max_upload_bytes;
    let mut form = PublishForm::default();
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(multipart_error)?.to_vec();

                if data.len() > max_upload_bytes {
                    return Err(AppError::PayloadTooLarge(format!(
                        "File too large (max {} bytes)",
                        max_upload_bytes
                    )));
                }
                upload = Some(UploadedFile {
                    data,
                    file_name,
                    content_type,
                });
            }
            "path" => form.path = Some(field.text().await.map_err(multipart_error)?),
            "title" => form.title = Some(field.text().await.map_err(multipart_error)?),
            other => tracing::debug!(field = %other, "Ignoring unknown multipart field"),
        }
    }

    let upload = upload.ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("No file uploaded")))?;
    form.validate()?;

    let path = form.path.unwrap_or_else(|| {
        format!(
            "catalog/{}",
            sanitize_file_name(upload.file_name.as_deref().unwrap_or_default())
        )
    });

    tracing::info!(
        path = %path,
        size = upload.data.len(),
        subject = ?claims.get("sub"),
        "Catalog publish started"
    );

    let pointer = state
        .catalog
        .publish(
            upload.data,
            &path,
            PublishMetadata {
                file_name: upload.file_name,
                content_type: upload.content_type,
                title: form.title,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PublishResponse {
            message: "Catalog published successfully".to_string(),
            catalog: pointer,
        }),
    ))
}

pub async fn delete_catalog(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<MessageResponse>, AppError> {
    tracing::info!(subject = ?claims.get("sub"), "Catalog removal requested");

    state.catalog.remove().await?;

    Ok(Json(MessageResponse::new("Catalog deleted successfully")))
}

pub async fn current_catalog(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let pointer = state
        .catalog
        .current()
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("No catalog published")))?;

    Ok(Json(pointer))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(anyhow::anyhow!(
            "Failed to read multipart body: {}",
            err.body_text()
        ))
    }
}

/// Reduces a client-supplied file name to a single safe path segment.
fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        DEFAULT_FILE_NAME.to_string()
    } else {
        cleaned.chars().take(200).collect()
    }
}
