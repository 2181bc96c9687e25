//! HTTP client for the PocketBase REST API.
//!
//! Every endpoint lives under `<base_url>/api/`. Responses with a status of
//! 400 or above are turned into [`ApiError::Api`] using the server's
//! `{code, message, data}` error envelope when present.

use crate::{
    context::Context,
    model::{
        most_recent, AuthRequest, AuthResponse, Backup, FileToken, HealthStatus, ListOptions,
        RecordsList,
    },
    record::Record,
};
use futures::StreamExt;
use reqwest::{multipart, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, trace};
use url::Url;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Backup downloads and uploads can be large.
const TRANSFER_TIMEOUT: Duration = Duration::from_secs(1800);
const USER_AGENT: &str = concat!("pbcli/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("URL '{0}' cannot be used as an API base")]
    InvalidBaseUrl(String),
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        data: Value,
    },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("authentication required")]
    AuthenticationRequired,
    #[error("backup '{0}' not found")]
    BackupNotFound(String),
    #[error("downloaded file is empty")]
    EmptyDownload,
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::BackupNotFound(_)) || self.status() == Some(404)
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, ApiError::AuthenticationRequired)
            || matches!(self.status(), Some(401) | Some(403))
    }

    /// Transport failures, as opposed to errors reported by the server.
    pub fn is_network_error(&self) -> bool {
        matches!(self, ApiError::Http(e) if e.is_connect() || e.is_timeout() || e.is_request())
    }

    /// Short description suitable for end users.
    pub fn friendly_message(&self) -> String {
        match self {
            ApiError::Api {
                status, message, ..
            } => match status {
                400 => format!("Invalid request: {}", message),
                401 => "Authentication required or session expired".to_string(),
                403 => "Permission denied".to_string(),
                404 => "The requested resource was not found".to_string(),
                s if *s >= 500 => format!("Server error: {}", message),
                _ => message.clone(),
            },
            other => other.to_string(),
        }
    }

    /// Next step for the user, when one is obvious.
    pub fn suggestion(&self) -> Option<String> {
        match self.status() {
            Some(400) => self.field_errors().map(|errors| {
                format!("Check these fields: {}", errors.join("; "))
            }),
            Some(401) => Some("Run 'pb auth' to authenticate again".to_string()),
            Some(403) => Some(
                "Check the collection API rules or authenticate with an account that has access"
                    .to_string(),
            ),
            Some(404) => Some("Check the collection name and record id".to_string()),
            Some(s) if s >= 500 => Some("Check the server logs or try again later".to_string()),
            _ if self.is_network_error() => {
                Some("Check that the server URL is correct and reachable".to_string())
            }
            _ => None,
        }
    }

    /// `field: message` pairs from a validation failure.
    pub fn field_errors(&self) -> Option<Vec<String>> {
        let ApiError::Api { data, .. } = self else {
            return None;
        };
        let fields = data.as_object()?;
        let errors: Vec<String> = fields
            .iter()
            .map(|(field, detail)| {
                let message = detail
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("invalid value");
                format!("{}: {}", field, message)
            })
            .collect();
        (!errors.is_empty()).then_some(errors)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Clone)]
pub struct PocketBaseClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl PocketBaseClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() || base_url.host_str().is_none() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    /// Client for a context, carrying its token when it has one.
    pub fn from_context(context: &Context) -> Result<Self, ApiError> {
        let client = Self::new(&context.base_url)?;
        Ok(if context.auth_token.is_empty() {
            client
        } else {
            client.with_token(context.auth_token.clone())
        })
    }

    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("Making {} request to {}", method, url);
        let request = self.http.request(method, url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn require_token(&self) -> Result<(), ApiError> {
        match &self.token {
            Some(token) if !token.is_empty() => Ok(()),
            _ => Err(ApiError::AuthenticationRequired),
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        debug!("Response status: {}", response.status());
        if response.status().as_u16() >= 400 {
            return Err(Self::error_from(response).await);
        }
        Ok(response)
    }

    async fn error_from(response: Response) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        trace!("Error response body: {}", body);

        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(envelope) if !envelope.message.is_empty() => ApiError::Api {
                status: status.as_u16(),
                message: envelope.message,
                data: envelope.data,
            },
            _ => ApiError::Api {
                status: status.as_u16(),
                message: if body.trim().is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                } else {
                    body
                },
                data: Value::Null,
            },
        }
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let text = self.send(request).await?.text().await?;
        trace!("Raw response text for deserialization: {}", text);
        serde_json::from_str(&text).map_err(|e| {
            error!("Failed to deserialize response: {}. Raw response: {}", e, text);
            ApiError::Json(e)
        })
    }

    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let url = self.url(&["health"])?;
        self.json(self.request(Method::GET, url)).await
    }

    pub async fn auth_with_password(
        &self,
        collection: &str,
        identity: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        debug!("Authenticating with collection: {}", collection);
        let url = self.url(&["collections", collection, "auth-with-password"])?;
        let body = AuthRequest { identity, password };
        self.json(self.request(Method::POST, url).json(&body)).await
    }

    pub async fn auth_refresh(&self, collection: &str) -> Result<AuthResponse, ApiError> {
        self.require_token()?;
        let url = self.url(&["collections", collection, "auth-refresh"])?;
        self.json(self.request(Method::POST, url)).await
    }

    pub async fn list_records(
        &self,
        collection: &str,
        options: &ListOptions,
    ) -> Result<RecordsList, ApiError> {
        let url = self.url(&["collections", collection, "records"])?;
        self.json(self.request(Method::GET, url).query(&options.query()))
            .await
    }

    pub async fn get_record(
        &self,
        collection: &str,
        id: &str,
        expand: &[String],
        fields: &[String],
    ) -> Result<Record, ApiError> {
        let url = self.url(&["collections", collection, "records", id])?;
        let mut query = Vec::new();
        if !expand.is_empty() {
            query.push(("expand", expand.join(",")));
        }
        if !fields.is_empty() {
            query.push(("fields", fields.join(",")));
        }
        self.json(self.request(Method::GET, url).query(&query)).await
    }

    pub async fn create_record(&self, collection: &str, data: &Record) -> Result<Record, ApiError> {
        let url = self.url(&["collections", collection, "records"])?;
        self.json(self.request(Method::POST, url).json(data)).await
    }

    pub async fn update_record(
        &self,
        collection: &str,
        id: &str,
        data: &Record,
    ) -> Result<Record, ApiError> {
        let url = self.url(&["collections", collection, "records", id])?;
        self.json(self.request(Method::PATCH, url).json(data)).await
    }

    pub async fn delete_record(&self, collection: &str, id: &str) -> Result<(), ApiError> {
        let url = self.url(&["collections", collection, "records", id])?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    pub async fn list_backups(&self) -> Result<Vec<Backup>, ApiError> {
        self.require_token()?;
        let url = self.url(&["backups"])?;
        self.json(self.request(Method::GET, url)).await
    }

    pub async fn get_backup(&self, key: &str) -> Result<Backup, ApiError> {
        self.list_backups()
            .await?
            .into_iter()
            .find(|b| b.key == key)
            .ok_or_else(|| ApiError::BackupNotFound(key.to_string()))
    }

    /// Starts a backup. The server may answer without a body, in which case
    /// the newest backup is assumed to be the one just created.
    pub async fn create_backup(&self, name: Option<&str>) -> Result<Backup, ApiError> {
        self.require_token()?;
        let url = self.url(&["backups"])?;
        let body = match name.filter(|n| !n.is_empty()) {
            Some(name) => serde_json::json!({ "name": name }),
            None => serde_json::json!({}),
        };
        let response = self
            .send(
                self.request(Method::POST, url)
                    .timeout(TRANSFER_TIMEOUT)
                    .json(&body),
            )
            .await?;

        if response.status() == StatusCode::NO_CONTENT {
            debug!("Backup created (204 No Content), looking up the newest backup");
            let backups = self.list_backups().await?;
            return most_recent(&backups)
                .cloned()
                .ok_or_else(|| ApiError::BackupNotFound(name.unwrap_or_default().to_string()));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn delete_backup(&self, key: &str) -> Result<(), ApiError> {
        self.require_token()?;
        let url = self.url(&["backups", key])?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    pub async fn restore_backup(&self, key: &str) -> Result<(), ApiError> {
        self.require_token()?;
        let url = self.url(&["backups", key, "restore"])?;
        self.send(self.request(Method::POST, url).timeout(TRANSFER_TIMEOUT))
            .await?;
        Ok(())
    }

    /// Short-lived token for protected file downloads.
    pub async fn file_token(&self) -> Result<String, ApiError> {
        self.require_token()?;
        let url = self.url(&["files", "token"])?;
        let token: FileToken = self.json(self.request(Method::POST, url)).await?;
        Ok(token.token)
    }

    /// Streams a backup archive to `destination`, reporting each chunk size.
    /// Returns the number of bytes written.
    pub async fn download_backup<F>(
        &self,
        key: &str,
        destination: &Path,
        mut on_chunk: F,
    ) -> Result<u64, ApiError>
    where
        F: FnMut(u64),
    {
        let file_token = self.file_token().await?;
        let url = self.url(&["backups", key])?;
        debug!("Downloading backup {} to {}", key, destination.display());

        // File tokens authenticate through the query string only.
        let request = self
            .http
            .get(url)
            .query(&[("token", file_token.as_str())])
            .timeout(TRANSFER_TIMEOUT);
        let response = self.send(request).await?;

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ApiError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let result = Self::write_body(response, destination, &mut on_chunk).await;
        if result.is_err() {
            // Partial files would block the next attempt without --force.
            if let Err(e) = tokio::fs::remove_file(destination).await {
                debug!("Could not remove {}: {}", destination.display(), e);
            }
        }
        result
    }

    async fn write_body<F>(
        response: Response,
        destination: &Path,
        on_chunk: &mut F,
    ) -> Result<u64, ApiError>
    where
        F: FnMut(u64),
    {
        let io_error = |source| ApiError::Io {
            path: destination.to_path_buf(),
            source,
        };
        let mut file = tokio::fs::File::create(destination)
            .await
            .map_err(io_error)?;

        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await.map_err(io_error)?;
            written += chunk.len() as u64;
            on_chunk(chunk.len() as u64);
        }
        file.flush().await.map_err(io_error)?;

        debug!("Downloaded {} bytes to {}", written, destination.display());
        if written == 0 {
            return Err(ApiError::EmptyDownload);
        }
        Ok(written)
    }

    /// Uploads a backup archive. `name` overrides the stored file name.
    pub async fn upload_backup(&self, source: &Path, name: Option<&str>) -> Result<Backup, ApiError> {
        self.require_token()?;
        let bytes = tokio::fs::read(source).await.map_err(|e| ApiError::Io {
            path: source.to_path_buf(),
            source: e,
        })?;
        let size = bytes.len() as u64;
        let file_name = name
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .or_else(|| {
                source
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "backup.zip".to_string());

        debug!("Uploading {} bytes as {}", size, file_name);
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.clone())
            .mime_str("application/zip")?;
        let form = multipart::Form::new().part("file", part);

        let url = self.url(&["backups", "upload"])?;
        let response = self
            .send(
                self.request(Method::POST, url)
                    .timeout(TRANSFER_TIMEOUT)
                    .multipart(form),
            )
            .await?;

        if response.status() == StatusCode::NO_CONTENT {
            return match self.get_backup(&file_name).await {
                Ok(backup) => Ok(backup),
                Err(e) => {
                    debug!("Could not fetch uploaded backup details: {}", e);
                    Ok(Backup {
                        key: file_name,
                        size,
                        modified: String::new(),
                    })
                }
            };
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}
