// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared JSON-over-HTTP plumbing for collaborator clients.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use leadline_core::LeadlineError;

/// One collaborator service endpoint: a pooled client, a base URL, and the
/// name used in error reporting.
#[derive(Debug, Clone)]
pub(crate) struct ServiceClient {
    name: &'static str,
    base_url: String,
    http: reqwest::Client,
}

impl ServiceClient {
    pub(crate) fn new(
        name: &'static str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, LeadlineError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LeadlineError::Collaborator {
                name: name.into(),
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            name,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// POST `request` as JSON and decode a JSON response.
    pub(crate) async fn post_json<Req, Resp>(
        &self,
        path: &str,
        request: &Req,
    ) -> Result<Resp, LeadlineError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let response = self.post(path, request).await?;
        response.json::<Resp>().await.map_err(|e| {
            LeadlineError::Collaborator {
                name: self.name.into(),
                message: format!("invalid response body: {e}"),
                source: Some(Box::new(e)),
            }
        })
    }

    /// POST `request` as JSON, checking only the status.
    pub(crate) async fn post_unit<Req>(
        &self,
        path: &str,
        request: &Req,
    ) -> Result<(), LeadlineError>
    where
        Req: Serialize + ?Sized,
    {
        self.post(path, request).await.map(|_| ())
    }

    async fn post<Req>(
        &self,
        path: &str,
        request: &Req,
    ) -> Result<reqwest::Response, LeadlineError>
    where
        Req: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(service = self.name, url = %url, "collaborator request");
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| LeadlineError::Collaborator {
                name: self.name.into(),
                message: format!("request to {url} failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LeadlineError::collaborator(
                self.name,
                format!("{url} returned {status}: {body}"),
            ));
        }
        Ok(response)
    }
}
