/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! Runtime discovery of the server's capabilities: service root, full
//! registry, and the per-domain resource maps.

use crate::v0::api::ApiClient;
use crate::v0::errors::CtmsError;
use crate::v0::hal::{LinkRefs, Links, strip_template};
use crate::v0::store::ResourceStore;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{error, trace};

/// Path of the registry's own service root, relative to the platform origin.
pub const REGISTRY_SERVICE: &str = "/apis/avid.ctms.registry;version=0;realm=global";

/// The registry's own service root. Answering the bus operation directly
/// yields a slightly downgraded Service Root resource; the full registry is
/// one `registry:serviceroots` hop away.
#[derive(Deserialize, Debug, Clone)]
pub struct ServiceRoot {
    #[serde(rename = "_links", default)]
    pub links: ServiceRootLinks,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ServiceRootLinks {
    #[serde(rename = "registry:serviceroots", default)]
    pub serviceroots: Option<LinkRefs>,
}

/// One advertised `{href, type}` entry of a registry resource.
#[derive(Deserialize, Debug, Clone)]
pub struct ResourceDescription {
    pub href: String,

    #[serde(rename = "type", default)]
    pub media_type: Option<String>,
}

/// The full registry: every resource the platform advertises, keyed by
/// relation name. Immutable once fetched.
#[derive(Deserialize, Debug, Clone)]
pub struct FullRegistryInfo {
    #[serde(default)]
    pub resources: BTreeMap<String, Vec<ResourceDescription>>,

    #[serde(rename = "_links", default)]
    pub links: Links,
}

impl FullRegistryInfo {
    pub fn resource(&self, name: &str) -> Option<&ResourceDescription> {
        self.resources.get(name).and_then(|entries| entries.first())
    }

    pub fn resource_href(&self, name: &str) -> Option<&str> {
        self.resource(name).map(|entry| entry.href.as_str())
    }

    /// Resolves a resource the operation cannot do without. A missing entry
    /// means the system does not offer the capability.
    pub fn require_resource(&self, name: &str) -> Result<&ResourceDescription, CtmsError> {
        self.resource(name)
            .ok_or_else(|| CtmsError::missing_link(name))
    }
}

/// A per-domain service root (assets, locations, search, taxonomies, pa).
/// Capabilities here are dynamic by nature, so the relation map stays
/// generic.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ServiceResources {
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// A flattened `{name, href}` capability, as recorded in the session index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLink {
    pub name: String,
    pub href: String,
}

/// Fetches the registry's own service root.
pub async fn get_service_root(api: &ApiClient, url: &str) -> Result<ServiceRoot, CtmsError> {
    trace!(action = "get", reference = "CTMS", "service root");

    api.get::<ServiceRoot>(&format!("{url}{REGISTRY_SERVICE}"))
        .await
        .map_err(|err| {
            error!(action = "get", reference = "CTMS", error = %err, "service root");
            CtmsError::discovery("registry service root", err)
        })
}

/// Follows `registry:serviceroots` (template parameters stripped) to the
/// full registry info.
pub async fn get_full_registry_info(
    api: &ApiClient,
    service_root: &ServiceRoot,
) -> Result<FullRegistryInfo, CtmsError> {
    trace!(action = "get", reference = "CTMS", "full registry info");

    let link = service_root
        .links
        .serviceroots
        .as_ref()
        .and_then(LinkRefs::first)
        .ok_or_else(|| CtmsError::discovery_missing("registry:serviceroots relation"))?;

    api.get::<FullRegistryInfo>(strip_template(&link.href))
        .await
        .map_err(|err| {
            error!(action = "get", reference = "CTMS", error = %err, "full registry info");
            CtmsError::discovery("full registry info", err)
        })
}

/// Walks the per-domain resource roots and builds the session-scoped
/// resource index.
///
/// The baseline is every top-level registry resource; each domain root then
/// contributes the relations of its own `_links` (`self` and `curies` are
/// navigational noise, not capabilities). Deduplication is by relation name,
/// last writer wins; the set of relations that only a deeper call revealed is
/// logged for diagnostics and never used for control flow.
///
/// Any domain root failing to load aborts the whole discovery: a partial map
/// is not a valid session.
pub async fn get_resource_index(
    api: &ApiClient,
    full: FullRegistryInfo,
) -> Result<ResourceStore, CtmsError> {
    let mut resource_links: Vec<ResourceLink> = Vec::new();
    for (name, descriptions) in &full.resources {
        for description in descriptions {
            resource_links.push(ResourceLink {
                name: name.clone(),
                href: description.href.clone(),
            });
        }
    }
    let from_service_root = resource_links.clone();

    let asset = domain_root(api, &full, "aa:assets", "assets resources").await?;
    merge_domain_links(&mut resource_links, &asset);

    let location = domain_root(api, &full, "loc:locations", "location resources").await?;
    merge_domain_links(&mut resource_links, &location);

    let search = domain_root(api, &full, "search:searches", "search resources").await?;
    merge_domain_links(&mut resource_links, &search);

    let taxonomies =
        domain_root(api, &full, "taxonomies:taxonomies", "taxonomies resources").await?;
    merge_domain_links(&mut resource_links, &taxonomies);

    let pa = domain_root(api, &full, "pa:extended", "pa resources").await?;
    merge_domain_links(&mut resource_links, &pa);

    // Last writer wins on duplicate names; the BTreeMap keeps diagnostics
    // deterministic.
    let mut index: BTreeMap<String, ResourceLink> = BTreeMap::new();
    for link in resource_links {
        index.insert(link.name.clone(), link);
    }
    for link in index.values() {
        trace!("{} |  {}", link.name, link.href);
    }

    trace!("Not in service root response");
    for link in index.values() {
        if !from_service_root.iter().any(|base| base.name == link.name) {
            trace!("{} | {}", link.name, link.href);
        }
    }

    Ok(ResourceStore::new(
        full, asset, location, search, taxonomies, pa, index,
    ))
}

async fn domain_root(
    api: &ApiClient,
    full: &FullRegistryInfo,
    relation: &str,
    what: &str,
) -> Result<ServiceResources, CtmsError> {
    trace!(action = "get", reference = "CTMS", "{what}");

    let href = full
        .resource_href(relation)
        .ok_or_else(|| CtmsError::discovery_missing(format!("{relation} resource")))?;

    api.get::<ServiceResources>(href).await.map_err(|err| {
        error!(action = "get", reference = "CTMS", error = %err, "{what}");
        CtmsError::discovery(what, err)
    })
}

fn merge_domain_links(resource_links: &mut Vec<ResourceLink>, root: &ServiceResources) {
    for (name, refs) in root.links.iter() {
        if name == "self" || name == "curies" {
            continue;
        }
        if let Some(link) = refs.first() {
            resource_links.push(ResourceLink {
                name: name.clone(),
                href: link.href.clone(),
            });
        }
    }
}
