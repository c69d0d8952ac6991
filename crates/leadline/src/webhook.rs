// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider webhook surface built on axum.
//!
//! Translates the SMS provider's form-encoded delivery callback into an
//! [`InboundSms`] and hands it to the conversation router. The reply body is
//! always an empty TwiML document; outbound messages go through the send
//! gateway, never through the webhook response.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use leadline_core::types::{InboundSms, MediaItem};
use leadline_router::InboundRouter;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

const EMPTY_TWIML: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Response></Response>"#;

/// Shared state for axum request handlers.
#[derive(Clone)]
struct WebhookState {
    router: Arc<InboundRouter>,
}

/// Build the webhook application.
pub fn app(router: Arc<InboundRouter>) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/webhook/sms", post(post_sms))
        .layer(TraceLayer::new_for_http())
        .with_state(WebhookState { router })
}

async fn get_health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn post_sms(
    State(state): State<WebhookState>,
    Form(form): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    let Some(event) = parse_inbound(&form) else {
        warn!("webhook rejected: missing To, From, or MessageSid");
        return StatusCode::BAD_REQUEST.into_response();
    };

    match state.router.handle(event).await {
        Ok(_) => (
            [(header::CONTENT_TYPE, "text/xml")],
            EMPTY_TWIML,
        )
            .into_response(),
        Err(e) => {
            // A 5xx makes the provider redeliver; sid dedup makes that safe.
            error!(error = %e, "inbound routing failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Decode the provider's form fields into an [`InboundSms`].
///
/// `To`, `From`, and `MessageSid` are required; everything else defaults.
/// Media attachments arrive as `NumMedia` plus indexed `MediaUrl{N}` and
/// `MediaContentType{N}` pairs.
fn parse_inbound(form: &HashMap<String, String>) -> Option<InboundSms> {
    let to = non_empty(form, "To")?;
    let from = non_empty(form, "From")?;
    let provider_sid = non_empty(form, "MessageSid")?;
    let body = form.get("Body").cloned().unwrap_or_default();

    let num_media: usize = form
        .get("NumMedia")
        .and_then(|n| n.parse().ok())
        .unwrap_or(0);

    let mut media = Vec::with_capacity(num_media);
    for i in 0..num_media {
        let Some(url) = form.get(&format!("MediaUrl{i}")) else {
            continue;
        };
        let content_type = form
            .get(&format!("MediaContentType{i}"))
            .cloned()
            .unwrap_or_else(|| "application/octet-stream".to_string());
        media.push(MediaItem {
            url: url.clone(),
            content_type,
            provider_id: None,
        });
    }

    Some(InboundSms {
        to,
        from,
        body,
        provider_sid,
        media,
    })
}

fn non_empty(form: &HashMap<String, String>, key: &str) -> Option<String> {
    form.get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_plain_text_delivery() {
        let event = parse_inbound(&form(&[
            ("To", "+15550001111"),
            ("From", "+15557770001"),
            ("Body", "need a quote"),
            ("MessageSid", "SM123"),
        ]))
        .unwrap();

        assert_eq!(event.to, "+15550001111");
        assert_eq!(event.from, "+15557770001");
        assert_eq!(event.body, "need a quote");
        assert_eq!(event.provider_sid, "SM123");
        assert!(event.media.is_empty());
    }

    #[test]
    fn parses_indexed_media_attachments() {
        let event = parse_inbound(&form(&[
            ("To", "+15550001111"),
            ("From", "+15557770001"),
            ("Body", ""),
            ("MessageSid", "SM124"),
            ("NumMedia", "2"),
            ("MediaUrl0", "https://media.example/one.jpg"),
            ("MediaContentType0", "image/jpeg"),
            ("MediaUrl1", "https://media.example/two.png"),
        ]))
        .unwrap();

        assert_eq!(event.media.len(), 2);
        assert_eq!(event.media[0].content_type, "image/jpeg");
        assert_eq!(event.media[1].content_type, "application/octet-stream");
        assert!(event.is_media_only());
    }

    #[test]
    fn missing_sid_is_rejected() {
        assert!(parse_inbound(&form(&[
            ("To", "+15550001111"),
            ("From", "+15557770001"),
            ("Body", "hi"),
        ]))
        .is_none());
    }

    #[test]
    fn blank_sender_is_rejected() {
        assert!(parse_inbound(&form(&[
            ("To", "+15550001111"),
            ("From", "   "),
            ("MessageSid", "SM125"),
        ]))
        .is_none());
    }

    #[test]
    fn media_count_gaps_are_skipped() {
        let event = parse_inbound(&form(&[
            ("To", "+15550001111"),
            ("From", "+15557770001"),
            ("MessageSid", "SM126"),
            ("NumMedia", "3"),
            ("MediaUrl1", "https://media.example/only.jpg"),
        ]))
        .unwrap();

        assert_eq!(event.media.len(), 1);
        assert_eq!(event.media[0].url, "https://media.example/only.jpg");
    }
}
