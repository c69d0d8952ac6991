// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the compliance send gateway.

use std::time::Duration;

use async_trait::async_trait;

use leadline_core::traits::{SendGateway, SendReceipt, SendRequest};
use leadline_core::LeadlineError;

use crate::client::ServiceClient;

/// Compliance gateway over HTTP. A rejection here is the one collaborator
/// failure the router treats as fatal, so errors map to
/// [`LeadlineError::Gateway`] rather than the degradable collaborator kind.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: ServiceClient,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LeadlineError> {
        Ok(Self {
            client: ServiceClient::new("gateway", base_url, timeout)?,
        })
    }
}

#[async_trait]
impl SendGateway for HttpGateway {
    async fn send(&self, request: SendRequest) -> Result<SendReceipt, LeadlineError> {
        self.client
            .post_json("/send", &request)
            .await
            .map_err(|e| match e {
                LeadlineError::Collaborator {
                    message, source, ..
                } => LeadlineError::Gateway { message, source },
                other => other,
            })
    }
}
