/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::v0::errors::{ApiError, CtmsError, Incident};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::trace;

pub const HAL_JSON: &str = "application/hal+json";

/// Directly communicates with the CTMS services.
///
/// The bearer token obtained at login is held here, per instance. It is never
/// installed into any process-wide default, so independent sessions in one
/// process cannot clobber each other's credentials.
#[derive(Default, Clone)]
pub struct ApiClient {
    https_client: reqwest::Client,
    token: Option<String>,
}

impl ApiClient {
    /// Creates an unauthenticated client, used for the login handshake.
    pub fn new(config: &CtmsConfig) -> Result<Self, CtmsError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            https_client: builder.build()?,
            token: None,
        })
    }

    /// Returns a client that sends `Authorization: Bearer <token>` on every
    /// request, sharing the underlying connection pool.
    pub fn authenticated(&self, token: &str) -> Self {
        Self {
            https_client: self.https_client.clone(),
            token: Some(token.to_string()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Performs a get request against a CTMS resource
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, CtmsError> {
        self.send(Method::GET, url, Payload::None).await
    }

    /// Performs a post request with a HAL+JSON body
    pub async fn post<T, B>(&self, url: &str, body: &B) -> Result<T, CtmsError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, url, Payload::Json(serde_json::to_vec(body)?))
            .await
    }

    /// Performs a patch request with a HAL+JSON body
    pub async fn patch<T, B>(&self, url: &str, body: &B) -> Result<T, CtmsError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::PATCH, url, Payload::Json(serde_json::to_vec(body)?))
            .await
    }

    /// Performs a put request with an opaque binary body (media payloads)
    pub async fn put_bytes<T: DeserializeOwned>(
        &self,
        url: &str,
        body: Bytes,
    ) -> Result<T, CtmsError> {
        self.send(Method::PUT, url, Payload::Bytes(body)).await
    }

    /// Performs a delete request, ignoring any response body
    pub async fn delete(&self, url: &str) -> Result<(), CtmsError> {
        let _ = self.dispatch(Method::DELETE, url, Payload::None).await?;
        Ok(())
    }

    /// Performs a delete request that answers with a document
    pub async fn delete_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, CtmsError> {
        self.send(Method::DELETE, url, Payload::None).await
    }

    /// Posts a urlencoded form with a `Basic` client token header. Only the
    /// ROPC token exchange uses this shape.
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        url: &str,
        form: &[(&str, &str)],
        client_token: &str,
    ) -> Result<T, CtmsError> {
        trace!(method = "POST", url, "sending form request");
        let response = self
            .https_client
            .post(url)
            .header(ACCEPT, HAL_JSON)
            .header(AUTHORIZATION, format!("Basic {client_token}"))
            .form(form)
            .send()
            .await?;
        let response = Self::checked(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        payload: Payload,
    ) -> Result<T, CtmsError> {
        let response = self.dispatch(method, url, payload).await?;
        Ok(response.json::<T>().await?)
    }

    async fn dispatch(
        &self,
        method: Method,
        url: &str,
        payload: Payload,
    ) -> Result<reqwest::Response, CtmsError> {
        trace!(method = %method, url, "sending request");
        let mut request = self
            .https_client
            .request(method, url)
            .header(ACCEPT, HAL_JSON);
        if let Some(token) = self.token.as_deref() {
            request = request.bearer_auth(token);
        }
        request = match payload {
            Payload::None => request,
            Payload::Json(body) => request.header(CONTENT_TYPE, HAL_JSON).body(body),
            Payload::Bytes(body) => request
                .header(CONTENT_TYPE, "application/octet-stream")
                .body(body),
        };
        let response = request.send().await?;
        Self::checked(response).await
    }

    // Non-2xx bodies are read in full before failing: CTMS error payloads
    // carry the incident codes callers inspect.
    async fn checked(response: reqwest::Response) -> Result<reqwest::Response, CtmsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let incident = serde_json::from_str::<Incident>(&body)
            .ok()
            .filter(|i| i.code.is_some() || i.incident.is_some());
        Err(CtmsError::Api(ApiError {
            status: status.as_u16(),
            incident,
            body,
        }))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("token", &self.token.as_ref().map(|_| "xxx"))
            .finish()
    }
}

enum Payload {
    None,
    Json(Vec<u8>),
    Bytes(Bytes),
}

/// Client-side configuration for the session: the pre-shared client token
/// presented during the ROPC exchange, and an optional per-request deadline.
#[derive(Clone, Default)]
pub struct CtmsConfig {
    pub(crate) client_token: String,
    pub(crate) timeout: Option<Duration>,
}

impl CtmsConfig {
    /// Uses an already base64-assembled client token.
    pub fn new(client_token: impl Into<String>) -> Self {
        Self {
            client_token: client_token.into(),
            timeout: None,
        }
    }

    /// Assembles the client token from a client id/secret pair.
    pub fn from_client_credentials(client_id: &str, client_secret: &str) -> Self {
        Self::new(BASE64.encode(format!("{client_id}:{client_secret}")))
    }

    /// Applies a deadline to every request issued through the session.
    /// Cancellation is dropping the future.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn client_token(&self) -> &str {
        &self.client_token
    }
}

impl std::fmt::Debug for CtmsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CtmsConfig")
            .field("client_token", &"xxx")
            .field("timeout", &self.timeout)
            .finish()
    }
}
