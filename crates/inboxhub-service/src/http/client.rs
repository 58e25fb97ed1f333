//! HTTP client for the remote notification service.
//!
//! Every endpoint answers with an [`ApiEnvelope`]. A `401` additionally
//! flips the optional authentication signal to `false` so the lifecycle
//! controller tears the session down.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, warn};

use inboxhub_core::config::RemoteConfig;
use inboxhub_core::error::{AppError, ErrorKind};
use inboxhub_core::result::AppResult;
use inboxhub_core::types::{NotificationId, Page, PageRequest};
use inboxhub_entity::NotificationRecord;

use super::envelope::ApiEnvelope;
use crate::traits::remote::RemoteNotificationService;

/// REST implementation of [`RemoteNotificationService`].
#[derive(Debug)]
pub struct HttpNotificationService {
    client: Client,
    api_url: String,
    access_token: Option<String>,
    auth_signal: Option<watch::Sender<bool>>,
}

impl HttpNotificationService {
    /// Build a client from the remote settings.
    pub fn new(config: &RemoteConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds.max(1)))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build HTTP client",
                    e,
                )
            })?;

        let api_url = format!(
            "{}{}",
            config.base_url.trim_end_matches('/'),
            config.api_prefix.trim_end_matches('/')
        );
        Url::parse(&api_url).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid remote URL '{api_url}'"),
                e,
            )
        })?;

        let access_token = config
            .access_token
            .clone()
            .filter(|t| !t.trim().is_empty());

        Ok(Self {
            client,
            api_url,
            access_token,
            auth_signal: None,
        })
    }

    /// Attach a signal that is set to `false` whenever the server answers `401`.
    pub fn with_auth_signal(mut self, signal: watch::Sender<bool>) -> Self {
        self.auth_signal = Some(signal);
        self
    }

    /// Base URL every endpoint is appended to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn signal_logout(&self) {
        if let Some(signal) = &self.auth_signal {
            signal.send_if_modified(|authenticated| {
                let changed = *authenticated;
                *authenticated = false;
                changed
            });
        }
    }

    /// Send a request and unwrap the envelope, returning its payload if any.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        action: &str,
    ) -> AppResult<Option<T>> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| request_error(e, action))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!(action, "Remote service rejected credentials");
            self.signal_logout();
            return Err(AppError::authentication(format!(
                "{action} failed: unauthorized"
            )));
        }

        let body = response.text().await.map_err(|e| request_error(e, action))?;
        let envelope = if body.trim().is_empty() {
            None
        } else if status.is_success() {
            Some(serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&body).map_err(
                |e| {
                    AppError::with_source(
                        ErrorKind::Serialization,
                        format!("{action} returned a malformed response"),
                        e,
                    )
                },
            )?)
        } else {
            serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&body).ok()
        };

        if !status.is_success() {
            let detail = envelope
                .as_ref()
                .and_then(ApiEnvelope::failure_message)
                .unwrap_or_else(|| status.to_string());
            return Err(AppError::remote(format!("{action} failed: {detail}")));
        }

        let Some(envelope) = envelope else {
            return Ok(None);
        };

        if !envelope.is_success() {
            let detail = envelope
                .failure_message()
                .unwrap_or_else(|| "request rejected".to_string());
            return Err(AppError::remote(format!("{action} failed: {detail}")));
        }

        match envelope.data {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(data) => serde_json::from_value(data).map(Some).map_err(|e| {
                AppError::with_source(
                    ErrorKind::Serialization,
                    format!("{action} returned an unexpected payload"),
                    e,
                )
            }),
        }
    }
}

#[async_trait]
impl RemoteNotificationService for HttpNotificationService {
    async fn fetch_page(&self, request: PageRequest) -> AppResult<Page<NotificationRecord>> {
        let url = Url::parse_with_params(
            &self.endpoint("/notifications"),
            &[
                ("page", request.page.to_string()),
                ("size", request.page_size.to_string()),
            ],
        )
        .map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Invalid notifications URL", e)
        })?;

        debug!(page = request.page, size = request.page_size, "Fetching notifications");

        self.execute::<Page<NotificationRecord>>(self.client.get(url), "Fetch notifications")
            .await?
            .ok_or_else(|| AppError::remote("Fetch notifications failed: no data returned"))
    }

    async fn mark_one_read(&self, id: &NotificationId) -> AppResult<()> {
        let url = self.endpoint(&format!("/notifications/{id}/read"));
        debug!(notification_id = %id, "Marking notification as read");
        self.execute::<serde_json::Value>(self.client.patch(url), "Mark notification as read")
            .await
            .map(|_| ())
    }

    async fn mark_all_read(&self) -> AppResult<()> {
        let url = self.endpoint("/notifications/read-all");
        debug!("Marking all notifications as read");
        self.execute::<serde_json::Value>(self.client.patch(url), "Mark all as read")
            .await
            .map(|_| ())
    }
}

/// Classify a `reqwest` failure: link problems are transport errors.
fn request_error(err: reqwest::Error, action: &str) -> AppError {
    let kind = if err.is_timeout() || err.is_connect() || err.is_request() {
        ErrorKind::Transport
    } else if err.is_decode() {
        ErrorKind::Serialization
    } else {
        ErrorKind::Remote
    };
    AppError::with_source(kind, format!("{action} failed: {err}"), err)
}
