/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

use num_enum::TryFromPrimitive;
use serde::Deserialize;
use std::io;
use thiserror::Error;

/// Error conditions that can be returned
#[derive(Error, Debug)]
pub enum CtmsError {
    #[error("I/O error")]
    Io(#[from] io::Error),

    #[error("Request network error")]
    Transport(#[from] reqwest::Error),

    /// A required resource or relation was missing or unreachable while the
    /// session was being established. Fatal: the session is not usable.
    #[error("Discovery of {what} failed")]
    Discovery {
        what: String,
        #[source]
        source: Option<Box<CtmsError>>,
    },

    /// The identity provider rejected the credentials.
    #[error("Authentication rejected: {0}")]
    Authentication(String),

    /// The server answered with a non-2xx status. The raw body is preserved
    /// since CTMS error payloads carry structured incident codes.
    #[error("API response was error: {0}")]
    Api(ApiError),

    /// A relation the operation needs is absent from the document, meaning
    /// the operation is not legal for the resource in its current state.
    #[error("Link relation not available: {0}")]
    MissingLink(String),

    /// The pagination safety cap was hit before the server stopped
    /// advertising a `next` link.
    #[error("Page limit exceeded after {0} pages")]
    PageLimitExceeded(usize),

    #[error("Deserialization error")]
    Deserialization(#[from] serde_json::Error),

    #[error("URL Parse error")]
    UrlParsing(#[from] url::ParseError),

    #[error("Expected response missing")]
    ResponseMissing(),
}

impl CtmsError {
    pub(crate) fn discovery(what: impl Into<String>, source: CtmsError) -> Self {
        CtmsError::Discovery {
            what: what.into(),
            source: Some(Box::new(source)),
        }
    }

    pub(crate) fn discovery_missing(what: impl Into<String>) -> Self {
        CtmsError::Discovery {
            what: what.into(),
            source: None,
        }
    }

    pub(crate) fn missing_link(relation: &str) -> Self {
        CtmsError::MissingLink(relation.to_string())
    }
}

/// A non-2xx HTTP response, with whatever structured incident information the
/// body carried.
#[derive(Debug)]
pub struct ApiError {
    pub status: u16,
    pub incident: Option<Incident>,
    pub body: String,
}

impl ApiError {
    /// True for the one remediated case: a 409 whose payload carries an
    /// incident identifying a name collision ("folder already exists").
    pub fn is_folder_conflict(&self) -> bool {
        self.incident
            .as_ref()
            .is_some_and(|i| i.incident.is_some() && i.code.as_deref() == Some("409"))
    }

    pub fn status_code(&self) -> Option<ApiStatusCode> {
        ApiStatusCode::try_from(self.status).ok()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.incident.as_ref().and_then(|i| i.message.as_deref()) {
            Some(message) => write!(f, "{}, msg: {}", self.status, message),
            None => write!(f, "{}", self.status),
        }
    }
}

/// Structured error payload returned by CTMS services.
#[derive(Deserialize, Debug, Clone)]
pub struct Incident {
    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub incident: Option<serde_json::Value>,
}

/// Status codes the client inspects, per the CTMS API docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u16)]
pub enum ApiStatusCode {
    // Good Codes
    Ok = 200,
    CreatedSuccessfully = 201,
    Accepted = 202,
    NoContent = 204,

    // Failing Codes
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    MethodNotAllowed = 405,
    Conflict = 409,
    TooManyRequests = 429,
    InternalServerError = 500,
    ServiceUnavailable = 503,
}
