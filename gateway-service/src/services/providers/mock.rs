//! Mock provider implementation for testing.

use super::{ContentPart, GenerativeProvider, ProviderError, UploadedFile};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Record of an upload_file invocation.
#[derive(Debug, Clone)]
pub struct UploadRecord {
    pub path: PathBuf,
    pub mime_type: String,
}

/// Mock provider that records calls and returns a canned response.
pub struct MockProvider {
    response: Value,
    failure: Option<String>,
    pub generate_calls: Mutex<Vec<Vec<ContentPart>>>,
    pub upload_calls: Mutex<Vec<UploadRecord>>,
}

impl MockProvider {
    /// A provider whose generate_content always yields `response`.
    pub fn returning(response: Value) -> Self {
        Self {
            response,
            failure: None,
            generate_calls: Mutex::new(Vec::new()),
            upload_calls: Mutex::new(Vec::new()),
        }
    }

    /// A provider whose every call fails with the given message.
    pub fn failing(message: &str) -> Self {
        Self {
            response: Value::Null,
            failure: Some(message.to_string()),
            generate_calls: Mutex::new(Vec::new()),
            upload_calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl GenerativeProvider for MockProvider {
    async fn generate_content(&self, parts: Vec<ContentPart>) -> Result<Value, ProviderError> {
        if let Some(message) = &self.failure {
            return Err(ProviderError::ApiError(message.clone()));
        }

        self.generate_calls.lock().unwrap().push(parts);
        Ok(self.response.clone())
    }

    async fn upload_file(
        &self,
        path: &Path,
        mime_type: &str,
    ) -> Result<UploadedFile, ProviderError> {
        if let Some(message) = &self.failure {
            return Err(ProviderError::ApiError(message.clone()));
        }

        self.upload_calls.lock().unwrap().push(UploadRecord {
            path: path.to_path_buf(),
            mime_type: mime_type.to_string(),
        });

        Ok(UploadedFile {
            uri: "https://generativelanguage.googleapis.com/v1beta/files/mock".to_string(),
            mime_type: mime_type.to_string(),
        })
    }
}
