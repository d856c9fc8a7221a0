//! HTTP gateway to the site API
//!
//! Everything that talks to the network goes through [`ApiGateway`]. The
//! production implementation, [`HttpGateway`], attaches the operator's
//! bearer token whenever the session holds one and shapes non-success
//! responses into [`ApiError`]s.

use async_trait::async_trait;
use auth::AuthSession;
use common::config::ClientConfig;
use reqwest::{
    Client, Method,
    multipart::{Form, Part},
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult, extract_detail};

/// A file picked for upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Lower-cased extension, if the name has one
    pub fn extension(&self) -> Option<String> {
        let (stem, extension) = self.file_name.rsplit_once('.')?;
        (!stem.is_empty() && !extension.is_empty()).then(|| extension.to_ascii_lowercase())
    }
}

/// Body of an API request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    /// Multipart form with a `file` part and a `subfolder` field
    Upload { file: UploadFile, subfolder: String },
}

/// One call against the API, relative to the base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: RequestBody::Json(body),
        }
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::PUT,
            path: path.into(),
            body: RequestBody::Json(body),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    pub fn upload(path: impl Into<String>, file: UploadFile, subfolder: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: RequestBody::Upload {
                file,
                subfolder: subfolder.into(),
            },
        }
    }
}

/// Performs authenticated API calls
///
/// Returns the decoded JSON body on success (`Value::Null` for an empty
/// body). Implementations never touch the session beyond reading the token.
#[async_trait]
pub trait ApiGateway: Send + Sync {
    async fn send(&self, request: ApiRequest) -> ApiResult<Value>;
}

/// `ApiGateway` over HTTP
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    session: AuthSession,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, session: AuthSession) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            session,
        }
    }

    pub fn from_config(config: &ClientConfig, session: AuthSession) -> Self {
        Self::new(config.api_base.clone(), session)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn multipart_form(file: UploadFile, subfolder: String) -> ApiResult<Form> {
    let mime = mime_guess::from_path(&file.file_name).first_or_octet_stream();
    let part = Part::bytes(file.bytes)
        .file_name(file.file_name)
        .mime_str(mime.essence_str())
        .map_err(|e| ApiError::BadRequest(format!("Unsupported file type: {}", e)))?;

    Ok(Form::new().part("file", part).text("subfolder", subfolder))
}

#[async_trait]
impl ApiGateway for HttpGateway {
    async fn send(&self, request: ApiRequest) -> ApiResult<Value> {
        let ApiRequest { method, path, body } = request;
        debug!("{} {}", method, path);

        let mut builder = self.client.request(method.clone(), self.url(&path));
        if let Some(token) = self.session.current_token() {
            builder = builder.bearer_auth(token);
        }

        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Upload { file, subfolder } => {
                builder.multipart(multipart_form(file, subfolder)?)
            }
        };

        let response = builder.send().await.map_err(|e| {
            warn!("{} {} failed: {}", method, path, e);
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            warn!("{} {} returned {}", method, path, status);
            return Err(ApiError::from_status(status.as_u16(), extract_detail(&text)));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::storage::MemoryStore;
    use std::sync::Arc;

    #[test]
    fn test_url_joining() {
        let session = AuthSession::restore(Arc::new(MemoryStore::new()));
        let gateway = HttpGateway::new("http://localhost:8001/api/", session);

        assert_eq!(gateway.base_url(), "http://localhost:8001/api");
        assert_eq!(
            gateway.url("/admin/projects"),
            "http://localhost:8001/api/admin/projects"
        );
    }

    #[test]
    fn test_upload_file_extension() {
        assert_eq!(UploadFile::new("photo.PNG", vec![]).extension(), Some("png".into()));
        assert_eq!(UploadFile::new("archive.tar.gz", vec![]).extension(), Some("gz".into()));
        assert_eq!(UploadFile::new("README", vec![]).extension(), None);
        assert_eq!(UploadFile::new(".hidden", vec![]).extension(), None);
    }
}
