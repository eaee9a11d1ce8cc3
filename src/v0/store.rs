/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::v0::auth::IdentityProviders;
use crate::v0::registry::{FullRegistryInfo, ResourceLink, ServiceResources};
use std::collections::BTreeMap;

/// Session-scoped cache of everything discovery produced: the full registry,
/// the per-domain resource roots, the identity-providers document, and the
/// merged relation index.
///
/// Populated once when the session is established and read-only afterwards;
/// operations read it and return fresh documents the caller owns.
#[derive(Debug, Clone)]
pub struct ResourceStore {
    full: FullRegistryInfo,
    asset: ServiceResources,
    location: ServiceResources,
    search: ServiceResources,
    taxonomies: ServiceResources,
    pa: ServiceResources,
    identity: Option<IdentityProviders>,
    index: BTreeMap<String, ResourceLink>,
}

impl ResourceStore {
    pub(crate) fn new(
        full: FullRegistryInfo,
        asset: ServiceResources,
        location: ServiceResources,
        search: ServiceResources,
        taxonomies: ServiceResources,
        pa: ServiceResources,
        index: BTreeMap<String, ResourceLink>,
    ) -> Self {
        Self {
            full,
            asset,
            location,
            search,
            taxonomies,
            pa,
            identity: None,
            index,
        }
    }

    pub(crate) fn set_identity(&mut self, identity: IdentityProviders) {
        self.identity = Some(identity);
    }

    pub fn full(&self) -> &FullRegistryInfo {
        &self.full
    }

    pub fn asset(&self) -> &ServiceResources {
        &self.asset
    }

    pub fn location(&self) -> &ServiceResources {
        &self.location
    }

    pub fn search(&self) -> &ServiceResources {
        &self.search
    }

    pub fn taxonomies(&self) -> &ServiceResources {
        &self.taxonomies
    }

    pub fn pa(&self) -> &ServiceResources {
        &self.pa
    }

    pub fn identity(&self) -> Option<&IdentityProviders> {
        self.identity.as_ref()
    }

    /// Looks a capability up by relation name in the merged index.
    pub fn resource(&self, name: &str) -> Option<&ResourceLink> {
        self.index.get(name)
    }

    /// Every known relation name, sorted. Two discoveries of the same
    /// registry yield the same set.
    pub fn relation_names(&self) -> Vec<&str> {
        self.index.keys().map(String::as_str).collect()
    }
}
