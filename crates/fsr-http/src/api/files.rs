//! File uploads and attachments.

use std::path::Path;

use bytes::Bytes;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use fsr_core::{Error, InvalidInputError, Iri, Result};

use crate::client::FortiSoar;
use crate::http::{ApiRequest, FilePart};

const FILES: &str = "/api/3/files";
const ATTACHMENTS: &str = "/api/3/attachments";
const OCTET_STREAM: &str = "application/octet-stream";

/// Mapping of file extensions to MIME types.
/// Format: `(extension, mime_type)`
const EXTENSION_MIME_MAPPINGS: &[(&str, &str)] = &[
    ("json", "application/json"),
    ("txt", "text/plain"),
    ("log", "text/plain"),
    ("csv", "text/csv"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("xml", "application/xml"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("eml", "message/rfc822"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
];

/// MIME type for a file name, by extension. Unknown extensions are octet streams.
pub fn mime_for_path(path: impl AsRef<Path>) -> &'static str {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .and_then(|ext| {
            EXTENSION_MIME_MAPPINGS
                .iter()
                .find(|(e, _)| *e == ext)
                .map(|(_, mime)| *mime)
        })
        .unwrap_or(OCTET_STREAM)
}

/// Uploads to `/api/3/files` and attachment records.
#[derive(Debug, Clone, Copy)]
pub struct Files<'a> {
    client: &'a FortiSoar,
}

impl<'a> Files<'a> {
    pub(crate) fn new(client: &'a FortiSoar) -> Self {
        Self { client }
    }

    /// Upload a file from disk. Returns the created file record.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or the upload is refused.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn upload(&self, path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| InvalidInputError::Other {
                message: format!("'{}' has no file name", path.display()),
            })?
            .to_string();

        let content = tokio::fs::read(path).await?;
        debug!(bytes = content.len(), "read upload");
        self.upload_bytes(&file_name, content, None).await
    }

    /// Upload in-memory content. The MIME type defaults to one derived from `file_name`.
    ///
    /// # Errors
    ///
    /// Fails if the MIME type is invalid or the upload is refused.
    #[instrument(skip(self, content))]
    pub async fn upload_bytes(
        &self,
        file_name: &str,
        content: impl Into<Bytes>,
        content_type: Option<&str>,
    ) -> Result<Value> {
        let mime = match content_type {
            Some(m) => m
                .parse::<mime::Mime>()
                .map_err(|e| InvalidInputError::Other {
                    message: format!("invalid MIME type '{m}': {e}"),
                })?
                .to_string(),
            None => mime_for_path(file_name).to_string(),
        };

        let part = FilePart::new("file", file_name, mime, content);
        self.client
            .send(ApiRequest::post(FILES).multipart(vec![part], Vec::new()))
            .await?
            .json()
    }

    /// Create an attachment record pointing at an uploaded file.
    #[instrument(skip(self))]
    pub async fn create_attachment(
        &self,
        name: &str,
        file: &Iri,
        description: Option<&str>,
    ) -> Result<Value> {
        let mut body = json!({
            "name": name,
            "file": file.as_str(),
        });
        if let Some(description) = description {
            body["description"] = Value::String(description.to_string());
        }
        self.client.post(ATTACHMENTS, body).await
    }

    /// Upload a file and wrap it in an attachment named after the file.
    ///
    /// # Errors
    ///
    /// Fails if either request fails or the upload response has no `@id`.
    pub async fn upload_attachment(
        &self,
        path: impl AsRef<Path>,
        description: Option<&str>,
    ) -> Result<Value> {
        let path = path.as_ref();
        let uploaded = self.upload(path).await?;
        let iri = uploaded
            .get("@id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::UnexpectedResponse("uploaded file has no @id".to_string()))?
            .parse::<Iri>()?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        self.create_attachment(name, &iri, description).await
    }
}
