//! Client for the hosted object-storage API (UploadThing v6).
//!
//! An upload takes two requests. First the file metadata is posted to the API,
//! which answers with a presigned POST target and the file's public URL:
//!
//! ```json
//! { "data": [{ "key": "abc", "fileUrl": "https://utfs.io/f/abc",
//!              "url": "https://bucket.s3.amazonaws.com", "fields": { "key": "abc", "policy": "..." } }] }
//! ```
//!
//! Then the bytes go to `url` as `multipart/form-data`: every returned field
//! first, the `file` part last. The response is decoded strictly: an entry
//! without `fileUrl` or without an upload target is a failure.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uplink_shared::RemoteConfig;

use super::error::RemoteStoreError;

/// Header carrying the API token.
const API_KEY_HEADER: &str = "x-uploadthing-api-key";

/// Multipart field carrying the bytes in the presigned POST.
const FILE_FIELD: &str = "file";

/// Stores bytes somewhere public and returns the URL.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Upload `bytes` and return their public URL.
    async fn store(
        &self,
        bytes: Bytes,
        file_name: &str,
        content_type: &str,
    ) -> Result<String, RemoteStoreError>;
}

/// HTTP client for the hosted storage API.
#[derive(Clone)]
pub struct HostedStoreClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl HostedStoreClient {
    /// Build a client from configuration.
    ///
    /// No timeout is applied unless `timeout_secs` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, RemoteStoreError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            api_url: config.api_url.clone(),
            token: config.token.clone(),
        })
    }

    async fn presign(
        &self,
        file_name: &str,
        size: usize,
        content_type: &str,
    ) -> Result<UploadTarget, RemoteStoreError> {
        let request = PresignRequest {
            files: [FileMeta {
                name: file_name,
                size,
                file_type: content_type,
            }],
            content_disposition: "inline",
        };

        let response = self
            .http
            .post(&self.api_url)
            .header(API_KEY_HEADER, &self.token)
            .json(&request)
            .send()
            .await?;

        let body = success_body(response).await?;
        debug!(body = %body, "remote store presign response");
        parse_presign_response(&body)
    }

    async fn upload(
        &self,
        target: &UploadTarget,
        bytes: Bytes,
        file_name: &str,
        content_type: &str,
    ) -> Result<(), RemoteStoreError> {
        let form = target
            .fields
            .iter()
            .fold(Form::new(), |form, (name, value)| {
                form.text(name.clone(), value.clone())
            });
        let part = Part::bytes(bytes.to_vec())
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = form.part(FILE_FIELD, part);

        let response = self
            .http
            .post(&target.upload_url)
            .multipart(form)
            .send()
            .await?;

        success_body(response).await.map(drop)
    }
}

#[async_trait]
impl RemoteStore for HostedStoreClient {
    async fn store(
        &self,
        bytes: Bytes,
        file_name: &str,
        content_type: &str,
    ) -> Result<String, RemoteStoreError> {
        let target = self.presign(file_name, bytes.len(), content_type).await?;
        self.upload(&target, bytes, file_name, content_type).await?;
        Ok(target.file_url)
    }
}

/// Returns the body of a 2xx response, or the status error otherwise.
async fn success_body(response: reqwest::Response) -> Result<String, RemoteStoreError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RemoteStoreError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.text().await?)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PresignRequest<'a> {
    files: [FileMeta<'a>; 1],
    content_disposition: &'static str,
}

#[derive(Debug, Serialize)]
struct FileMeta<'a> {
    name: &'a str,
    size: usize,
    #[serde(rename = "type")]
    file_type: &'a str,
}

/// Wire shape of the presign response.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PresignResponse {
    Data { data: Vec<PresignedFile> },
    Error { error: String },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PresignedFile {
    #[serde(default)]
    file_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    fields: BTreeMap<String, String>,
}

/// Where to send the bytes and where they will be served from.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct UploadTarget {
    pub(crate) upload_url: String,
    pub(crate) fields: BTreeMap<String, String>,
    pub(crate) file_url: String,
}

/// Decode a presign response body into the target of the first file.
pub(crate) fn parse_presign_response(body: &str) -> Result<UploadTarget, RemoteStoreError> {
    let first = match serde_json::from_str::<PresignResponse>(body)? {
        PresignResponse::Data { data } => data.into_iter().next(),
        PresignResponse::Error { error } => return Err(RemoteStoreError::Rejected(error)),
    }
    .ok_or(RemoteStoreError::MissingUrl)?;

    let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
    let file_url = non_blank(first.file_url).ok_or(RemoteStoreError::MissingUrl)?;
    let upload_url = non_blank(first.url).ok_or(RemoteStoreError::MissingUrl)?;

    Ok(UploadTarget {
        upload_url,
        fields: first.fields,
        file_url,
    })
}
