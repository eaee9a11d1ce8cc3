/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! Operations over `loc:` resources: items, folders and their collections.
//!
//! An item that acts as a folder links to a `loc:collection` of its children
//! and embeds that collection in its own document; the items in the folder
//! can again be sub folders, asset references or both.

use crate::v0::api::ApiClient;
use crate::v0::bulk::BulkCommandResponse;
use crate::v0::errors::CtmsError;
use crate::v0::hal::{AssetObject, Collection, Item, ItemProps};
use crate::v0::macros::require_link;
use crate::v0::pages::{self, PageWalk};
use crate::v0::properties::BaseType;
use crate::v0::registry::{FullRegistryInfo, ServiceResources};
use async_stream::try_stream;
use chrono::Utc;
use futures::Stream;
use tracing::{debug, error, warn};

/// Query options for [`get_item_by_id`].
#[derive(Debug, Clone)]
pub struct ItemOptions {
    /// Page size requested from the server.
    pub limit: u64,

    /// Attribute names to resolve onto the returned items.
    pub attributes: Option<Vec<String>>,

    /// Safety limits for draining the embedded collection.
    pub pages: PageWalk,
}

impl Default for ItemOptions {
    fn default() -> Self {
        Self {
            limit: 1000,
            attributes: None,
            pages: PageWalk::default(),
        }
    }
}

/// Fetches the folder structure root advertised as `loc:root-item`.
pub async fn get_root(
    api: &ApiClient,
    full: &FullRegistryInfo,
) -> Result<AssetObject, CtmsError> {
    debug!(action = "root", "get root location");

    let url = &full.require_resource("loc:root-item")?.href;
    api.get::<AssetObject>(url).await
}

/// Returns the item identified by the given identifier. The item can be a
/// folder or a non-folder item; a folder comes back with its embedded child
/// collection fully drained through the page walker.
///
/// `id` can be given as `Projects`, `/Projects/` or `/Projects/Child Folder`.
pub async fn get_item_by_id(
    api: &ApiClient,
    full: &FullRegistryInfo,
    id: &str,
    options: &ItemOptions,
) -> Result<AssetObject, CtmsError> {
    debug!(action = "get item", reference = id, "get item by id: {id}");

    let template = &full.require_resource("loc:item-by-id")?.href;
    let mut url = template.replace("{id}", &urlencoding::encode(id));
    url.push_str(&format!("?offset=0&limit={}", options.limit));
    if let Some(attributes) = &options.attributes {
        url.push_str(&format!("&attributes={}", encode_csv(attributes)));
    }

    let mut item: AssetObject = api.get(&url).await.inspect_err(
        |err| error!(action = "get item", reference = id, error = %err, "get item by id"),
    )?;

    if let Some(collection) = item.embedded.collection.as_mut() {
        pages::drain_pages(api, collection, &options.pages).await?;
    }

    Ok(item)
}

/// Re-fetches an item through its own `self` link with the wide default
/// limit. For non-folder assets prefer `asset::get_asset_by_id` (less
/// payload).
pub async fn get_item_by_asset(
    api: &ApiClient,
    asset: &AssetObject,
) -> Result<AssetObject, CtmsError> {
    debug!(action = "get item", reference = asset.base.id.as_str(), "get item by asset");

    let href = &require_link!(asset.links.self_link, "self").href;
    let url = match href.split_once('?') {
        Some((base, _)) => format!("{base}?offset=0&limit=1000"),
        None => format!("{href}?offset=0&limit=1000"),
    };

    api.get::<AssetObject>(&url).await.inspect_err(
        |err| error!(action = "get item", reference = asset.base.id.as_str(), error = %err, "get item by asset"),
    )
}

/// Updates an item's common properties (rename) via `loc:update-item`.
pub async fn update_item(
    api: &ApiClient,
    asset: &AssetObject,
    update: &ItemProps,
) -> Result<AssetObject, CtmsError> {
    debug!(
        action = "update asset",
        reference = asset.base.id.as_str(),
        "update with name: {}",
        update.common.name
    );

    let url = &require_link!(asset.links.update_item, "loc:update-item").href;
    api.patch::<AssetObject, _>(url, update).await.inspect_err(
        |err| error!(action = "update asset", reference = asset.base.id.as_str(), error = %err, "update item"),
    )
}

/// Adds an item to the folder collection via `loc:add-item`. Can be used to
/// copy a folder with content.
pub async fn add_item(
    api: &ApiClient,
    folder: &AssetObject,
    item: &Item,
) -> Result<AssetObject, CtmsError> {
    debug!(
        action = "add asset",
        reference = item.base.id.as_str(),
        "add item: {} with type: {:?}",
        item.base.id,
        item.base.kind
    );

    let url = &require_link!(folder.links.add_item, "loc:add-item").href;
    api.post::<AssetObject, _>(url, item).await.inspect_err(
        |err| error!(action = "add asset", reference = item.base.id.as_str(), error = %err, "add item"),
    )
}

// Bounded remediation of name collisions on move; the suffix carries the
// attempt index so it stays collision-free even under a frozen clock.
const MOVE_ATTEMPTS: usize = 3;

/// Moves an item into the destination folder via `loc:move-item`. A folder
/// moves with all of its items and sub folders; a non-folder item leaves its
/// original folder.
///
/// A 409 whose payload identifies a name collision ("folder already exists")
/// is remediated: a timestamp-suffixed backup folder is created at the
/// destination and the move is retried into it, at most [`MOVE_ATTEMPTS`]
/// times. Every other error propagates unchanged.
pub async fn move_item(
    api: &ApiClient,
    destination: &AssetObject,
    to_move: &Item,
) -> Result<AssetObject, CtmsError> {
    debug!(
        action = "move asset",
        reference = to_move.base.id.as_str(),
        "move item: {} with type: {:?}",
        to_move.base.id,
        to_move.base.kind
    );

    let mut target = destination.clone();
    let mut attempt = 0;
    loop {
        let url = &require_link!(target.links.move_item, "loc:move-item").href;
        match api.post::<AssetObject, _>(url, to_move).await {
            Ok(moved) => return Ok(moved),
            Err(CtmsError::Api(response))
                if response.is_folder_conflict() && attempt + 1 < MOVE_ATTEMPTS =>
            {
                let message = response
                    .incident
                    .as_ref()
                    .and_then(|incident| incident.message.as_deref())
                    .unwrap_or("folder already exists");
                warn!(
                    action = "move asset",
                    reference = to_move.base.id.as_str(),
                    "{}",
                    message.split(';').next().unwrap_or(message)
                );

                attempt += 1;
                let name = to_move
                    .base
                    .id
                    .split('/')
                    .filter(|segment| !segment.is_empty())
                    .next_back()
                    .unwrap_or(to_move.base.id.as_str());
                let backup_name =
                    format!("{name} copy {}-{attempt}", Utc::now().timestamp_millis());
                target = create_folder(api, destination, &backup_name).await?;
            }
            Err(err) => {
                error!(action = "move asset", reference = to_move.base.id.as_str(), error = %err, "move item");
                return Err(err);
            }
        }
    }
}

/// Moves multiple items into the destination folder via `loc:move-items`.
/// The per-item outcome shape is system-specific.
pub async fn move_items(
    api: &ApiClient,
    destination: &AssetObject,
    to_move: &[Item],
) -> Result<serde_json::Value, CtmsError> {
    debug!(
        action = "bulk move",
        reference = destination.base.id.as_str(),
        "move items: {}",
        to_move.len()
    );

    let url = &require_link!(destination.links.move_items, "loc:move-items").href;
    api.post::<serde_json::Value, _>(url, to_move).await.inspect_err(
        |err| error!(action = "bulk move", reference = destination.base.id.as_str(), error = %err, "move items"),
    )
}

/// Adds a folder to the folder collection via `loc:create-folder`.
pub async fn create_folder(
    api: &ApiClient,
    parent_folder: &AssetObject,
    folder_name: &str,
) -> Result<AssetObject, CtmsError> {
    debug!(
        action = "create folder",
        reference = folder_name,
        "in: {}",
        parent_folder.base.id
    );

    let url = &require_link!(parent_folder.links.create_folder, "loc:create-folder").href;
    api.post::<AssetObject, _>(url, &ItemProps::named(folder_name))
        .await
        .inspect_err(
            |err| error!(action = "create folder", reference = folder_name, error = %err, "create folder"),
        )
}

/// Deletes an asset through its `loc:delete-item` link.
///
/// Never fails: a missing delete link (the item is not deletable in its
/// current state) and any delete error both come back as `false`, so batch
/// callers can continue past individual failures.
pub async fn delete_item(api: &ApiClient, asset: &AssetObject) -> bool {
    let Some(delete_link) = asset.links.delete_item.as_ref() else {
        return false;
    };

    debug!(
        action = "delete asset",
        reference = asset.base.id.as_str(),
        "delete {:?}: {}{}",
        asset.common.asset_type,
        asset.common.path.as_deref().unwrap_or_default(),
        asset.common.name
    );

    match api.delete(&delete_link.href).await {
        Ok(()) => true,
        Err(err) => {
            error!(action = "delete asset", reference = asset.base.id.as_str(), error = %err, "item");
            false
        }
    }
}

/// Looks an item up among the folder's embedded children by id and deletes
/// it. `Ok(false)` when the item is not in the folder or not deletable.
pub async fn delete_item_in_folder(
    api: &ApiClient,
    parent_folder: &AssetObject,
    id: &str,
) -> Result<bool, CtmsError> {
    debug!(
        action = "delete asset",
        reference = id,
        "delete item in folder: {} with id: {id}",
        parent_folder.base.id
    );

    let wanted = format!("{}{id}", parent_folder.base.id);
    match parent_folder.items().iter().find(|item| item.base.id == wanted) {
        Some(asset) => Ok(delete_item(api, asset).await),
        None => {
            warn!(
                action = "delete asset",
                reference = id,
                "item with id: {id} not found in folder: {} during delete item",
                parent_folder.base.id
            );
            Ok(false)
        }
    }
}

/// Deletes the folder's embedded items one by one, returning the ones that
/// could not be deleted. Prefer [`delete_bulk_items_in_folder`] for large
/// folders.
pub async fn delete_all_items_in_folder(
    api: &ApiClient,
    parent_folder: &AssetObject,
) -> Vec<AssetObject> {
    debug!(
        action = "delete all items",
        reference = parent_folder.base.id.as_str(),
        "all items in folder"
    );

    let mut not_deleted = Vec::new();
    for asset in parent_folder.items() {
        if !delete_item(api, asset).await {
            not_deleted.push(asset.clone());
        }
    }
    not_deleted
}

/// Deletes assets across folders via the registry-level
/// `loc:delete-item-by-id-bulk-command`. Await the returned command with
/// [`crate::v0::bulk::await_completion`].
pub async fn delete_bulk_items_by_id(
    api: &ApiClient,
    location_resources: &ServiceResources,
    ids: &[String],
) -> Result<BulkCommandResponse, CtmsError> {
    debug!(
        action = "bulk delete",
        "item(s): {} by id: {}",
        ids.len(),
        ids.join(", ")
    );

    let url = &location_resources
        .links
        .require("loc:delete-item-by-id-bulk-command")?
        .href;
    api.post::<BulkCommandResponse, _>(url, ids).await.inspect_err(
        |err| error!(action = "bulk delete", error = %err, "delete bulk items by id"),
    )
}

/// Deletes every non-folder item of the given folder through its scoped bulk
/// command. `Ok(None)` when the folder holds no non-folder items; no request
/// is made in that case.
pub async fn delete_bulk_items_in_folder(
    api: &ApiClient,
    folder: &AssetObject,
) -> Result<Option<BulkCommandResponse>, CtmsError> {
    let url = &require_link!(
        folder.links.delete_in_folder_bulk,
        "loc:delete-item-in-folder-by-id-bulk-command"
    )
    .href;

    let ids: Vec<&str> = folder
        .items()
        .iter()
        .filter(|item| item.base.kind != BaseType::Folder)
        .map(|item| item.base.id.as_str())
        .collect();
    if ids.is_empty() {
        return Ok(None);
    }

    debug!(
        action = "bulk delete",
        reference = folder.common.name.as_str(),
        "delete item(s) in folder total found: {}",
        ids.len()
    );
    api.post::<BulkCommandResponse, _>(url, &ids)
        .await
        .map(Some)
        .inspect_err(
            |err| error!(action = "bulk delete", reference = folder.common.name.as_str(), error = %err, "delete items in folder"),
        )
}

/// Returns the item identified by its moniker, the opaque secondary
/// identifier distinct from the path-based id.
pub async fn get_item_by_moniker(
    api: &ApiClient,
    location_resources: &ServiceResources,
    moniker: &str,
) -> Result<AssetObject, CtmsError> {
    debug!(action = "get", reference = moniker, "get item by moniker");

    let template = &location_resources
        .links
        .require("pa:location-item-by-moniker")?
        .href;
    let url = template.replace("{moniker}", &urlencoding::encode(moniker));
    api.get::<AssetObject>(&url).await.inspect_err(
        |err| error!(action = "get", reference = moniker, error = %err, "get item by moniker"),
    )
}

/// Streams the items of a folder, following continuation pages as they are
/// consumed. One request is outstanding at a time.
pub fn stream_folder_items<'a>(
    api: &'a ApiClient,
    folder: &'a AssetObject,
) -> impl Stream<Item = Result<AssetObject, CtmsError>> + 'a {
    try_stream! {
        if let Some(collection) = folder.embedded.collection.as_ref() {
            for item in &collection.embedded.items {
                yield item.clone();
            }

            let mut next = collection.links.next.clone();
            while let Some(link) = next {
                let page: Collection = api.get(&link.href).await?;
                next = page.links.next.clone();
                for item in page.embedded.items {
                    yield item;
                }
            }
        }
    }
}

fn encode_csv(attributes: &[String]) -> String {
    attributes
        .iter()
        .map(|attribute| urlencoding::encode(attribute).into_owned())
        .collect::<Vec<_>>()
        .join(",")
}
