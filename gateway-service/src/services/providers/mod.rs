//! Generative AI provider abstractions and implementations.
//!
//! This module provides a trait-based abstraction over the provider,
//! allowing the handlers to be exercised against a mock backend.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service_core::error::AppError;
use std::path::Path;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::Upstream(err.to_string())
    }
}

/// A single part of a generation request's content payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentPart {
    Text {
        text: String,
    },
    FileData {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

/// Reference to a file previously staged in the provider's file storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

/// Raw bytes embedded directly in the generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// Handle returned by a file upload: the provider-side URI plus the MIME
/// type as normalized by the provider.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub uri: String,
    pub mime_type: String,
}

/// Trait for generative providers (Gemini, mock).
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Issue one generateContent call. The raw response body is returned as
    /// untyped JSON since the envelope shape varies across API versions.
    async fn generate_content(&self, parts: Vec<ContentPart>) -> Result<Value, ProviderError>;

    /// Upload a local file to the provider's file storage.
    async fn upload_file(
        &self,
        path: &Path,
        mime_type: &str,
    ) -> Result<UploadedFile, ProviderError>;
}
