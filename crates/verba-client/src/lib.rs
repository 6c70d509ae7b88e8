// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod wire;

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;
use verba_app::{
    DocumentDetail, DocumentId, DocumentSummary, QueryResponse, Transport, TransportError,
};

use crate::wire::{
    DetailResponse, DocumentPayload, ListResponse, MessageBody, QueryPayload, QueryResult,
};

/// Blocking HTTP client for the retrieval service's JSON API.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    timeout: Duration,
    http: HttpClient,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("server.base_url must not be empty");
        }
        let parsed = Url::parse(&base_url)
            .with_context(|| format!("server.base_url {base_url:?} is not a valid URL"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!(
                "server.base_url must use http or https, got {:?}",
                parsed.scheme()
            );
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        let url = self.endpoint(path);
        self.send_json(path, &url, self.http.get(&url))
    }

    fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, TransportError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        self.send_json(path, &url, self.http.post(&url).json(body))
    }

    fn send_json<T: DeserializeOwned>(
        &self,
        path: &str,
        url: &str,
        request: RequestBuilder,
    ) -> Result<T, TransportError> {
        debug!(endpoint = path, "sending request");
        let response = request
            .send()
            .map_err(|error| connection_error(url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let error = clean_error_response(status, &body);
            warn!(endpoint = path, status = status.as_u16(), "request rejected");
            return Err(error);
        }

        let body = response
            .text()
            .map_err(|error| connection_error(url, error))?;
        serde_json::from_str(&body).map_err(|error| TransportError::Malformed {
            context: path.to_owned(),
            message: error.to_string(),
        })
    }
}

impl Transport for HttpTransport {
    fn list_documents(&self) -> Result<Vec<DocumentSummary>, TransportError> {
        let parsed: ListResponse = self.get_json("get_all_documents")?;
        Ok(parsed.into_summaries())
    }

    fn fetch_document_detail(&self, id: &DocumentId) -> Result<DocumentDetail, TransportError> {
        let parsed: DetailResponse = self.post_json(
            "get_document",
            &DocumentPayload {
                document_id: id.as_str(),
            },
        )?;
        Ok(parsed.into_detail())
    }

    fn run_query(&self, text: &str) -> Result<QueryResponse, TransportError> {
        let parsed: QueryResult = self.post_json("query", &QueryPayload { query: text })?;
        Ok(parsed.into_response())
    }

    fn health(&self) -> Result<(), TransportError> {
        let _: serde_json::Value = self.get_json("health")?;
        Ok(())
    }
}

fn connection_error(url: &str, error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        return TransportError::Timeout {
            url: url.to_owned(),
        };
    }
    TransportError::Unreachable {
        url: url.to_owned(),
        message: error.to_string(),
    }
}

fn clean_error_response(status: StatusCode, body: &str) -> TransportError {
    let code = status.as_u16();
    if let Ok(parsed) = serde_json::from_str::<MessageBody>(body)
        && let Some(message) = parsed.into_message()
    {
        return TransportError::Status { code, message };
    }

    let body = body.trim();
    let message = if !body.is_empty() && body.len() < 100 && !body.contains('{') {
        body.to_owned()
    } else {
        status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_owned()
    };
    TransportError::Status { code, message }
}

#[cfg(test)]
mod tests {
    use super::{HttpTransport, clean_error_response};
    use reqwest::StatusCode;
    use std::time::Duration;
    use verba_app::TransportError;

    #[test]
    fn new_trims_trailing_slash() -> anyhow::Result<()> {
        let transport = HttpTransport::new("http://localhost:8000/", Duration::from_secs(1))?;
        assert_eq!(transport.base_url(), "http://localhost:8000");
        assert_eq!(transport.timeout(), Duration::from_secs(1));
        Ok(())
    }

    #[test]
    fn new_rejects_empty_and_invalid_urls() {
        assert!(HttpTransport::new("   ", Duration::from_secs(1)).is_err());
        assert!(HttpTransport::new("not a url", Duration::from_secs(1)).is_err());
        assert!(HttpTransport::new("ftp://example.com", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn error_message_comes_from_message_field() {
        let error = clean_error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"message":"Database not ready!"}"#,
        );
        assert_eq!(
            error,
            TransportError::Status {
                code: 503,
                message: "Database not ready!".to_owned(),
            }
        );
    }

    #[test]
    fn short_plain_bodies_are_kept_and_json_noise_is_dropped() {
        let plain = clean_error_response(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(
            plain,
            TransportError::Status {
                code: 502,
                message: "upstream down".to_owned(),
            }
        );

        let noisy = clean_error_response(StatusCode::INTERNAL_SERVER_ERROR, r#"{"trace":[1,2]}"#);
        assert_eq!(
            noisy,
            TransportError::Status {
                code: 500,
                message: "Internal Server Error".to_owned(),
            }
        );
    }
}
