/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! Operations over `aa:` resources: asset metadata, custom attributes and
//! time-based segments.

use crate::v0::api::ApiClient;
use crate::v0::errors::CtmsError;
use crate::v0::hal::{AssetObject, Common};
use crate::v0::macros::require_link;
use crate::v0::registry::FullRegistryInfo;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Well-known attribute names.
pub mod attributes {
    pub const VIDEO_ID: &str = "com.avid.workgroup.Property.System.VideoID";
    pub const USER_PREFIX: &str = "com.avid.workgroup.Property.User.";
}

/// One custom attribute of an asset.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Custom attributes to read or update on an asset.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AssetAttributes {
    pub attributes: Vec<Attribute>,
}

/// Time-based metadata segments of an asset.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TimeBased {
    #[serde(default)]
    pub segments: Vec<Segment>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Segment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,

    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

/// Returns the `aa:asset` identified by the given id, optionally resolving
/// the named attributes. The id can also be the mob id when working against
/// `pa:` functions.
pub async fn get_asset_by_id(
    api: &ApiClient,
    full: &FullRegistryInfo,
    id: &str,
    attributes: &[&str],
) -> Result<AssetObject, CtmsError> {
    debug!(action = "asset", reference = id, "get asset by id");

    let template = &full.require_resource("aa:asset-by-id")?.href;
    let mut url = template.replace("{id}", &urlencoding::encode(id));
    if !attributes.is_empty() {
        url.push_str(&format!(
            "?attributes={}",
            attributes
                .iter()
                .map(|attribute| urlencoding::encode(attribute).into_owned())
                .collect::<Vec<_>>()
                .join(",")
        ));
    }

    api.get::<AssetObject>(&url).await.inspect_err(
        |err| error!(action = "asset", reference = id, error = %err, "get asset by id"),
    )
}

/// Updates custom attributes of an asset. The attributes to update must be
/// carried by the embedded `aa:attributes` resource of the referenced
/// object, so the patch goes through `loc:referenced-object`.
pub async fn update_asset_attributes(
    api: &ApiClient,
    asset: &AssetObject,
    to_update: &AssetAttributes,
) -> Result<serde_json::Value, CtmsError> {
    debug!(
        action = "update asset",
        reference = asset.common.name.as_str(),
        "update asset attributes"
    );

    let referenced = asset
        .embedded
        .referenced_object
        .as_ref()
        .ok_or_else(|| CtmsError::missing_link("loc:referenced-object"))?;
    let url = &require_link!(referenced.links.update_attributes, "aa:update-attributes").href;

    api.patch::<serde_json::Value, _>(url, to_update)
        .await
        .inspect_err(
            |err| error!(action = "update asset", reference = asset.common.name.as_str(), error = %err, "update asset attributes"),
        )
}

/// Updates custom attributes of an asset addressed by id (without a path).
/// `reference` is only used as logging metadata, e.g. a video id or name.
pub async fn update_asset_attributes_by_id(
    api: &ApiClient,
    full: &FullRegistryInfo,
    id: &str,
    to_update: &AssetAttributes,
    reference: &str,
) -> Result<serde_json::Value, CtmsError> {
    debug!(action = "update asset", reference = reference, "attributes for id: {id}");

    let template = &full.require_resource("aa:update-attributes-by-id")?.href;
    let url = template.replace("{id}", &urlencoding::encode(id));
    api.patch::<serde_json::Value, _>(&url, to_update)
        .await
        .inspect_err(
            |err| error!(action = "update asset", reference = reference, error = %err, "update asset attributes by id"),
        )
}

/// Updates an `aa:asset` resource by id. Only common properties may be
/// updated this way.
pub async fn update_asset_by_id(
    api: &ApiClient,
    full: &FullRegistryInfo,
    id: &str,
    common: &Common,
) -> Result<serde_json::Value, CtmsError> {
    debug!(action = "asset", reference = id, "update asset by id");

    #[derive(Serialize)]
    struct CommonUpdate<'a> {
        common: &'a Common,
    }

    let template = &full.require_resource("aa:update-asset-by-id")?.href;
    let url = template.replace("{id}", &urlencoding::encode(id));
    api.patch::<serde_json::Value, _>(&url, &CommonUpdate { common })
        .await
        .inspect_err(
            |err| error!(action = "asset", reference = id, error = %err, "update asset by id"),
        )
}

/// Fetches the time-based metadata of an asset via `aa:time-based`.
pub async fn get_time_based(
    api: &ApiClient,
    asset: &AssetObject,
) -> Result<TimeBased, CtmsError> {
    debug!(
        action = "asset",
        reference = asset.common.name.as_str(),
        "get time based for: {}",
        asset.common.name
    );

    let url = &require_link!(asset.links.time_based, "aa:time-based").href;
    api.get::<TimeBased>(url).await.inspect_err(
        |err| error!(action = "asset", reference = asset.common.name.as_str(), error = %err, "get time based"),
    )
}

/// Creates or replaces time-based segments via `aa:time-based`.
pub async fn upsert_segments(
    api: &ApiClient,
    asset: &AssetObject,
    time_based: &TimeBased,
) -> Result<TimeBased, CtmsError> {
    debug!(
        action = "asset",
        reference = asset.common.name.as_str(),
        "upsert time based for: {}",
        asset.common.name
    );

    let url = &require_link!(asset.links.time_based, "aa:time-based").href;
    api.patch::<TimeBased, _>(url, time_based).await.inspect_err(
        |err| error!(action = "asset", reference = asset.common.name.as_str(), error = %err, "upsert time based"),
    )
}
