/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::v0::api::{ApiClient, CtmsConfig};
use crate::v0::auth::{self, CtmsAuth, UserSession};
use crate::v0::errors::CtmsError;
use crate::v0::registry;
use crate::v0::store::ResourceStore;
use std::sync::Arc;

/// The CTMS client is the starting point for the module: one logged-in
/// session against one platform, holding the bearer token and the resource
/// cache for its whole lifetime.
#[derive(Debug, Clone)]
pub struct Client {
    api: Arc<ApiClient>,
    cache: Arc<ResourceStore>,
    session: UserSession,
    url: String,
}

impl Client {
    /// Establishes a session: walks the auth entry point to the identity
    /// providers, performs the ROPC token exchange, then discovers the
    /// registry and the per-domain resource maps.
    ///
    /// Each step depends on the prior response and fails on its own terms:
    /// the handshake with [`CtmsError::Discovery`] or
    /// [`CtmsError::Authentication`], discovery with [`CtmsError::Discovery`]
    /// naming the failing domain. There is no degraded mode.
    pub async fn connect(
        url: &str,
        auth: &CtmsAuth,
        config: &CtmsConfig,
    ) -> Result<Self, CtmsError> {
        let api = ApiClient::new(config)?;

        let entry_point = auth::get_auth_endpoint(&api, url).await?;
        let identity_providers = auth::get_identity_providers(&api, &entry_point).await?;
        let session = auth::authorize(&api, &identity_providers, auth, config).await?;

        // From here on every call carries the session's bearer token, held
        // by this client instance only.
        let api = api.authenticated(&session.access_token);

        let service_root = registry::get_service_root(&api, url).await?;
        let full = registry::get_full_registry_info(&api, &service_root).await?;
        let mut cache = registry::get_resource_index(&api, full).await?;
        cache.set_identity(identity_providers);

        Ok(Self {
            api: Arc::new(api),
            cache: Arc::new(cache),
            session,
            url: url.to_string(),
        })
    }

    /// The transport carrying this session's bearer token.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// The resource cache. It has all the resource responses needed to make
    /// calls without re-discovering the platform.
    pub fn cache(&self) -> &ResourceStore {
        &self.cache
    }

    pub fn session(&self) -> &UserSession {
        &self.session
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}
