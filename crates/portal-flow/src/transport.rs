//! HTTP side of a submission: one multipart POST, opaque bytes back

use reqwest::multipart::Form;
use reqwest::{Client, Url};
use sha2::{Digest, Sha256};

use crate::error::FlowError;

/// Binary result returned by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    /// Content type announced by the server, informational only
    pub content_type: Option<String>,
}

impl Artifact {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Hex digest used in diagnostics
    pub fn sha256(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.bytes);
        hex::encode(hasher.finalize())
    }
}

/// Posts payloads to endpoints under a fixed server base URL
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, FlowError> {
        let client = Client::builder()
            .build()
            .map_err(|source| FlowError::Client { source })?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, FlowError> {
        let base_url = Url::parse(base_url).map_err(|e| FlowError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(FlowError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "expected an http(s) URL".to_string(),
            });
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint path under the base URL, keeping any path prefix
    /// the base already has (`http://host/portal` + `/x` -> `/portal/x`).
    pub fn endpoint_url(&self, endpoint: &str) -> Url {
        let mut url = self.base_url.clone();
        let prefix = self.base_url.path().trim_end_matches('/');
        let endpoint = endpoint.trim_start_matches('/');
        url.set_path(&format!("{}/{}", prefix, endpoint));
        url.set_query(None);
        url.set_fragment(None);
        url
    }

    /// Send one POST and return the body of a 2xx response.
    ///
    /// Any other status is a failure and its body is left unread.
    pub async fn post_multipart(&self, url: &Url, payload: Form) -> Result<Artifact, FlowError> {
        let response = self
            .client
            .post(url.clone())
            .multipart(payload)
            .send()
            .await
            .map_err(|source| FlowError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FlowError::Status {
                url: url.to_string(),
                status,
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await.map_err(|source| FlowError::Body {
            url: url.to_string(),
            source,
        })?;

        Ok(Artifact {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}
