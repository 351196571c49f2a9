use std::time::Duration;

use anyhow::Context;
use axum::http::{header, HeaderValue, StatusCode};
use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::error::AnalysisError;

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    text: &'a str,
}

/// Whatever the inference service answered, uninterpreted.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

/// HTTP client for the external inference endpoint.
#[derive(Clone)]
pub struct Analyzer {
    client: reqwest::Client,
    endpoint: String,
}

impl Analyzer {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        // The inference service is a sidecar; never route it through HTTP(S)_PROXY.
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .context("build analyzer http client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST `{"text": ..}` to the endpoint. Only transport failures are
    /// errors; any HTTP status is returned as-is.
    pub async fn analyze(&self, text: &str) -> Result<UpstreamResponse, AnalysisError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&PredictRequest { text })
            .send()
            .await
            .map_err(AnalysisError::UpstreamUnavailable)?;

        let status = resp.status();
        let content_type = resp.headers().get(header::CONTENT_TYPE).cloned();
        let body = resp.bytes().await.map_err(AnalysisError::UpstreamBody)?;
        debug!(%status, bytes = body.len(), "analysis service responded");

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}
