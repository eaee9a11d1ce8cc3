/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! The three-step login handshake: entry-point resource, identity providers,
//! then a Resource Owner Password Credentials token exchange.

use crate::v0::api::{ApiClient, CtmsConfig};
use crate::v0::errors::CtmsError;
use crate::v0::hal::{Link, LinkRefs, Links};
use crate::v0::parsers::one_or_many;
use serde::Deserialize;
use tracing::{debug, error};

/// Resource-owner credentials for the ROPC grant.
#[derive(Clone)]
pub struct CtmsAuth {
    pub username: String,
    pub password: String,
}

impl CtmsAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for CtmsAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CtmsAuth")
            .field("username", &self.username)
            .field("password", &"xxx")
            .finish()
    }
}

/// The `/auth` entry-point resource.
#[derive(Deserialize, Debug, Clone)]
pub struct EntryPoint {
    #[serde(rename = "_links", default)]
    pub links: EntryPointLinks,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct EntryPointLinks {
    #[serde(rename = "auth:identity-providers", default)]
    pub identity_providers: Option<LinkRefs>,
}

/// The identity-providers listing.
#[derive(Deserialize, Debug, Clone)]
pub struct IdentityProviders {
    #[serde(rename = "_embedded", default)]
    pub embedded: IdentityProvidersEmbedded,

    #[serde(rename = "_links", default)]
    pub links: Links,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct IdentityProvidersEmbedded {
    #[serde(
        rename = "auth:identity-provider",
        default,
        deserialize_with = "one_or_many"
    )]
    pub providers: Vec<IdentityProvider>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct IdentityProvider {
    #[serde(default)]
    pub kind: Option<String>,

    #[serde(rename = "_links", default)]
    pub links: IdentityProviderLinks,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct IdentityProviderLinks {
    #[serde(rename = "auth:ropc-default", default)]
    pub ropc_default: Option<LinkRefs>,
}

impl IdentityProviders {
    /// The token endpoint of the first provider supporting the default ROPC
    /// grant.
    pub fn ropc_default(&self) -> Option<&Link> {
        self.embedded
            .providers
            .iter()
            .find_map(|provider| provider.links.ropc_default.as_ref())
            .and_then(LinkRefs::first)
    }
}

/// The bearer token envelope returned by the token endpoint. Lives for the
/// session; there is no refresh flow, invalidation happens server-side.
#[derive(Deserialize, Clone)]
pub struct UserSession {
    pub access_token: String,

    #[serde(default)]
    pub token_type: Option<String>,

    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl std::fmt::Debug for UserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserSession")
            .field("access_token", &"xxx")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Fetches the authorization entry-point resource at `{base}/auth`.
pub async fn get_auth_endpoint(api: &ApiClient, url: &str) -> Result<EntryPoint, CtmsError> {
    let full_url = format!("{url}/auth");
    debug!(action = "authorize", reference = "CTMS", "get authorization end point with url: {full_url}");

    api.get::<EntryPoint>(&full_url).await.map_err(|err| {
        error!(action = "authorize", reference = "CTMS", error = %err, "get authorization end point");
        CtmsError::discovery("auth entry point", err)
    })
}

/// Follows `auth:identity-providers` from the entry point.
pub async fn get_identity_providers(
    api: &ApiClient,
    entry_point: &EntryPoint,
) -> Result<IdentityProviders, CtmsError> {
    debug!(action = "authorize", reference = "CTMS", "get identity providers");

    let link = entry_point
        .links
        .identity_providers
        .as_ref()
        .and_then(LinkRefs::first)
        .ok_or_else(|| CtmsError::discovery_missing("auth:identity-providers relation"))?;

    api.get::<IdentityProviders>(&link.href)
        .await
        .map_err(|err| {
            error!(action = "authorize", reference = "CTMS", error = %err, "get identity providers");
            CtmsError::discovery("identity providers", err)
        })
}

/// Exchanges the resource-owner credentials for a bearer token at the
/// provider advertising `auth:ropc-default`.
///
/// Credential rejection is never retried here; whether a retry is safe is the
/// caller's decision.
pub async fn authorize(
    api: &ApiClient,
    identity_providers: &IdentityProviders,
    auth: &CtmsAuth,
    config: &CtmsConfig,
) -> Result<UserSession, CtmsError> {
    debug!(action = "authorize", reference = "CTMS", "login");

    let token_endpoint = identity_providers
        .ropc_default()
        .ok_or_else(|| CtmsError::discovery_missing("auth:ropc-default identity provider"))?;

    let form = [
        ("grant_type", "password"),
        ("username", auth.username.as_str()),
        ("password", auth.password.as_str()),
    ];

    api.post_form::<UserSession>(&token_endpoint.href, &form, config.client_token())
        .await
        .map_err(|err| match err {
            CtmsError::Api(response) => {
                error!(action = "authorize", reference = "CTMS", "login rejected: {response}");
                CtmsError::Authentication(response.to_string())
            }
            other => {
                error!(action = "authorize", reference = "CTMS", error = %other, "login");
                other
            }
        })
}
