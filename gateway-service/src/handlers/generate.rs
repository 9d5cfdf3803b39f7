use crate::config::MediaTransport;
use crate::dtos::{GenerateResponse, GenerateTextRequest};
use crate::services::extract_text;
use crate::services::providers::{ContentPart, FileData, InlineData};
use crate::startup::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use base64::Engine;
use serde_json::Value;
use service_core::error::AppError;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// The media routes differ only in the multipart field they accept and the
/// prompt used when the caller supplies none.
#[derive(Clone, Copy)]
enum MediaKind {
    Image,
    Document,
    Audio,
}

impl MediaKind {
    fn field_name(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Document => "document",
            MediaKind::Audio => "audio",
        }
    }

    fn default_prompt(self) -> &'static str {
        match self {
            MediaKind::Image => "What's in this picture?",
            MediaKind::Document => "Summarize this document:",
            MediaKind::Audio => "Transcribe this audio:",
        }
    }
}

struct UploadedMedia {
    data: Vec<u8>,
    original_name: String,
    mime_type: String,
}

pub async fn generate_text(
    State(state): State<AppState>,
    Json(request): Json<GenerateTextRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    // An absent prompt is forwarded as an empty content list; the provider
    // rejects it with its own validation error.
    let parts = request
        .prompt
        .map(|text| vec![ContentPart::Text { text }])
        .unwrap_or_default();

    let response = state.provider.generate_content(parts).await?;

    Ok(Json(GenerateResponse {
        result: extract_text(&response),
    }))
}

pub async fn generate_from_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<GenerateResponse>, AppError> {
    generate_from_media(state, multipart, MediaKind::Image).await
}

pub async fn generate_from_document(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<GenerateResponse>, AppError> {
    generate_from_media(state, multipart, MediaKind::Document).await
}

pub async fn generate_from_audio(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<GenerateResponse>, AppError> {
    generate_from_media(state, multipart, MediaKind::Audio).await
}

async fn generate_from_media(
    state: AppState,
    multipart: Multipart,
    kind: MediaKind,
) -> Result<Json<GenerateResponse>, AppError> {
    let (media, prompt) = read_form(multipart, kind).await?;

    let mut media =
        media.ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("No file uploaded.")))?;

    if matches!(kind, MediaKind::Audio) {
        apply_mp3_override(&mut media);
    }

    let prompt = prompt.unwrap_or_else(|| kind.default_prompt().to_string());

    let response = match state.config.upload.transport {
        MediaTransport::FileApi => {
            let staged = PathBuf::from(&state.config.upload.dir).join(Uuid::new_v4().to_string());
            tokio::fs::write(&staged, &media.data).await.map_err(|e| {
                tracing::error!("Failed to stage upload to {}: {}", staged.display(), e);
                AppError::from(e)
            })?;

            let result = generate_with_file_reference(&state, &staged, &media, &prompt).await;

            // The staged file is removed on every exit path once it exists;
            // a cleanup failure is logged, never surfaced to the caller.
            if let Err(e) = tokio::fs::remove_file(&staged).await {
                tracing::error!(
                    "Failed to clean up staged upload {}: {}",
                    staged.display(),
                    e
                );
            }

            result?
        }
        MediaTransport::Inline => {
            let parts = vec![
                ContentPart::Text { text: prompt },
                ContentPart::InlineData {
                    inline_data: InlineData {
                        mime_type: media.mime_type.clone(),
                        data: base64::engine::general_purpose::STANDARD.encode(&media.data),
                    },
                },
            ];

            state.provider.generate_content(parts).await?
        }
    };

    Ok(Json(GenerateResponse {
        result: extract_text(&response),
    }))
}

/// Upload-then-reference flow: stage the file with the provider's Files API
/// and reference the returned URI in the generation call.
async fn generate_with_file_reference(
    state: &AppState,
    staged: &Path,
    media: &UploadedMedia,
    prompt: &str,
) -> Result<Value, AppError> {
    let uploaded = state.provider.upload_file(staged, &media.mime_type).await?;

    tracing::info!(
        filename = %media.original_name,
        uri = %uploaded.uri,
        "Uploaded media to provider file storage"
    );

    let parts = vec![
        ContentPart::Text {
            text: prompt.to_string(),
        },
        ContentPart::FileData {
            file_data: FileData {
                mime_type: uploaded.mime_type,
                file_uri: uploaded.uri,
            },
        },
    ];

    Ok(state.provider.generate_content(parts).await?)
}

async fn read_form(
    mut multipart: Multipart,
    kind: MediaKind,
) -> Result<(Option<UploadedMedia>, Option<String>), AppError> {
    let mut media = None;
    let mut prompt = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
    })? {
        let name = field.name().unwrap_or_default().to_string();

        if name == kind.field_name() {
            let original_name = field.file_name().unwrap_or("unnamed").to_string();
            let mime_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Failed to read file bytes: {}", e))
                })?
                .to_vec();

            media = Some(UploadedMedia {
                data,
                original_name,
                mime_type,
            });
        } else if name == "prompt" {
            let text = field.text().await.map_err(|e| {
                AppError::BadRequest(anyhow::anyhow!("Failed to read prompt field: {}", e))
            })?;
            prompt = Some(text);
        }
    }

    Ok((media, prompt))
}

/// Multipart MIME sniffing is unreliable for mp3 uploads; trust the file
/// extension over the declared content type.
fn apply_mp3_override(media: &mut UploadedMedia) {
    let is_mp3 = Path::new(&media.original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("mp3"));

    if is_mp3 && media.mime_type != "audio/mpeg" {
        tracing::warn!(
            declared = %media.mime_type,
            filename = %media.original_name,
            "Declared MIME type for .mp3 upload is not audio/mpeg, overriding"
        );
        media.mime_type = "audio/mpeg".to_string();
    }
}
