/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! Search operations: the CTMS simple search and the ElasticSearch-backed
//! asynchronous search.

use crate::v0::api::ApiClient;
use crate::v0::errors::CtmsError;
use crate::v0::expressions::Expression;
use crate::v0::hal::{AssetObject, CollectionLinks, Paging};
use crate::v0::parsers::one_or_many;
use crate::v0::registry::FullRegistryInfo;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, warn};

/// One page of simple-search hits.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct SearchResult {
    #[serde(default)]
    pub paging: Option<Paging>,

    #[serde(rename = "_links", default)]
    pub links: CollectionLinks,

    #[serde(rename = "_embedded", default)]
    pub embedded: SearchEmbedded,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SearchEmbedded {
    #[serde(rename = "aa:asset", default, deserialize_with = "one_or_many")]
    pub assets: Vec<AssetObject>,
}

impl SearchResult {
    pub fn assets(&self) -> &[AssetObject] {
        &self.embedded.assets
    }
}

/// State of an asynchronous ElasticSearch run.
#[derive(Deserialize, Debug, Clone)]
pub struct ElasticSearchStatus {
    pub id: String,

    #[serde(rename = "self")]
    pub self_url: String,

    #[serde(default)]
    pub complete: bool,

    #[serde(default)]
    pub progress: SearchProgress,

    #[serde(default)]
    pub expression: Option<Expression>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SearchProgress {
    #[serde(default)]
    pub status: String,
}

/// One ElasticSearch hit; the catalog item carries the platform asset id.
#[derive(Deserialize, Debug, Clone)]
pub struct ElasticSearchResult {
    pub catalog_item: CatalogItem,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CatalogItem {
    pub metadata: CatalogMetadata,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CatalogMetadata {
    pub payload: CatalogPayload,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CatalogPayload {
    pub avid: AvidIds,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AvidIds {
    pub id: String,
}

/// Simple full-text search for assets via `search:simple-search`. Does not
/// match on custom attributes.
pub async fn simple_search(
    api: &ApiClient,
    full: &FullRegistryInfo,
    search: &str,
    offset: u64,
    limit: u64,
) -> Result<SearchResult, CtmsError> {
    debug!(
        action = "simple search",
        reference = search,
        "with offset: {offset} and limit: {limit}"
    );

    let template = &full.require_resource("search:simple-search")?.href;
    let url = template
        .replace("{search}", &urlencoding::encode(search))
        .replace("{&offset,limit}", &format!("&offset={offset}&limit={limit}"));

    api.get::<SearchResult>(&url).await.inspect_err(
        |err| error!(action = "simple search", reference = search, error = %err, "simple search"),
    )
}

/// Starts an asynchronous search on the ElasticSearch service that backs the
/// platform index. The endpoint lives outside the registry, on the platform
/// origin taken from the registry's own `self` link.
pub async fn elastic_search(
    api: &ApiClient,
    full: &FullRegistryInfo,
    expression: &Expression,
) -> Result<ElasticSearchStatus, CtmsError> {
    debug!(action = "elastic search", "start search");

    let registry_self = full.links.require("self")?;
    let origin = url::Url::parse(&registry_self.href)?
        .origin()
        .ascii_serialization();

    api.post::<ElasticSearchStatus, _>(&format!("{origin}/search/v1/search"), expression)
        .await
        .inspect_err(|err| error!(action = "elastic search", error = %err, "start search"))
}

/// Refreshes the state of a running search.
pub async fn get_elastic_search_status(
    api: &ApiClient,
    status: &ElasticSearchStatus,
) -> Result<ElasticSearchStatus, CtmsError> {
    debug!(action = "elastic status", reference = status.id.as_str(), "get status");

    api.get::<ElasticSearchStatus>(&status.self_url)
        .await
        .inspect_err(
            |err| error!(action = "elastic status", reference = status.id.as_str(), error = %err, "get status"),
        )
}

/// Fetches the results of a finished search.
pub async fn get_elastic_search_result(
    api: &ApiClient,
    status: &ElasticSearchStatus,
) -> Result<Vec<ElasticSearchResult>, CtmsError> {
    debug!(action = "elastic result", reference = status.id.as_str(), "get results");

    api.get::<Vec<ElasticSearchResult>>(&format!("{}/results", status.self_url))
        .await
        .inspect_err(
            |err| error!(action = "elastic result", reference = status.id.as_str(), error = %err, "get results"),
        )
}

const ELASTIC_POLL_INTERVAL: Duration = Duration::from_millis(100);
const ELASTIC_POLL_LIMIT: usize = 600;

/// Runs an expression through the ElasticSearch service and waits for the
/// results.
///
/// The status resource is polled on a short interval until it reports
/// `complete`. The ceiling is soft, like the bulk poller's: when it is hit
/// the results are fetched anyway and may be partial.
pub async fn search_with_elastic_search(
    api: &ApiClient,
    full: &FullRegistryInfo,
    expression: &Expression,
) -> Result<Vec<ElasticSearchResult>, CtmsError> {
    let mut status = elastic_search(api, full, expression).await?;

    let mut checks = 0;
    while !status.complete {
        debug!(
            action = "elastic search",
            reference = status.id.as_str(),
            "search status: {}",
            status.progress.status
        );
        checks += 1;
        if checks > ELASTIC_POLL_LIMIT {
            warn!(
                action = "elastic search",
                reference = status.id.as_str(),
                "search not complete after {ELASTIC_POLL_LIMIT} checks, fetching results anyway"
            );
            break;
        }
        tokio::time::sleep(ELASTIC_POLL_INTERVAL).await;
        status = get_elastic_search_status(api, &status).await?;
    }

    let assets = get_elastic_search_result(api, &status).await?;
    debug!(
        action = "elastic search",
        reference = status.id.as_str(),
        "found assets: {}",
        assets.len()
    );
    Ok(assets)
}
