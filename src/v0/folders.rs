/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! Folder recipes: tree walking, path upserts and folder-scoped sweeps.

use crate::v0::api::ApiClient;
use crate::v0::bulk::{self, PolledStatus};
use crate::v0::errors::CtmsError;
use crate::v0::hal::AssetObject;
use crate::v0::location::{self, ItemOptions};
use crate::v0::pa::{self, ReservationResponse};
use crate::v0::properties::{AssetType, BaseType};
use crate::v0::registry::FullRegistryInfo;
use tracing::{debug, error, trace};

/// Collects folders of a folder tree, depth-first in the order the server
/// returns them.
///
/// The depth of a node counts from 1 at the walk root. Recursion stops at
/// `depth_limit`; with `only_depth_folders` set, only the folders at exactly
/// that depth are recorded.
pub struct Walker {
    /// Folders collected so far, in discovery order.
    pub directories: Vec<AssetObject>,

    pub depth_limit: usize,

    pub only_depth_folders: bool,
}

impl Walker {
    pub fn new() -> Self {
        Self {
            directories: Vec::new(),
            depth_limit: 100,
            only_depth_folders: false,
        }
    }

    /// Walks the tree under `root` (a path like `Projects` or
    /// `/Projects/Child Folder`), one fetch at a time.
    ///
    /// Implemented over an explicit work stack, so the tree depth never
    /// turns into call-stack depth. Any fetch failure aborts the whole walk;
    /// there is no partial-tree recovery.
    pub async fn walk(
        &mut self,
        api: &ApiClient,
        full: &FullRegistryInfo,
        root: &str,
    ) -> Result<&[AssetObject], CtmsError> {
        let mut stack: Vec<(String, usize)> = vec![(root.to_string(), 1)];

        while let Some((path, depth)) = stack.pop() {
            trace!(
                action = "walk",
                reference = path.as_str(),
                "get child folders with depth: {depth}"
            );

            let folder = location::get_item_by_id(api, full, &path, &ItemOptions::default())
                .await
                .inspect_err(
                    |err| error!(action = "walk", reference = path.as_str(), error = %err, "walk aborted"),
                )?;

            let recorded = !self.only_depth_folders || depth == self.depth_limit;
            if depth < self.depth_limit {
                // Reversed so the pop order matches the server order
                let children = folder_assets(&folder);
                for child in children.iter().rev() {
                    stack.push((child.base.id.clone(), depth + 1));
                }
            }
            if recorded {
                self.directories.push(folder);
            }
        }

        Ok(&self.directories)
    }
}

impl Default for Walker {
    fn default() -> Self {
        Self::new()
    }
}

/// The folder-typed items embedded in a folder document.
pub fn folder_assets(folder: &AssetObject) -> Vec<AssetObject> {
    let folders: Vec<AssetObject> = folder
        .items()
        .iter()
        .filter(|item| item.base.kind == BaseType::Folder)
        .cloned()
        .collect();
    debug!(
        action = "get assets",
        reference = folder.common.path.as_deref().unwrap_or(folder.base.id.as_str()),
        "{} folders found",
        folders.len()
    );
    folders
}

/// Returns the named child folder of `parent_folder`, creating it when it is
/// not there yet. The name match is case-insensitive.
pub async fn upsert_folder(
    api: &ApiClient,
    full: &FullRegistryInfo,
    name: &str,
    parent_folder: &str,
) -> Result<AssetObject, CtmsError> {
    debug!(
        action = "upsert folder",
        reference = name,
        "upsert folder: {name} in: {parent_folder}"
    );

    let root_response = location::get_item_by_id(api, full, parent_folder, &ItemOptions::default())
        .await
        .inspect_err(
            |err| error!(action = "upsert folder", reference = name, error = %err, "upsert folder"),
        )?;

    let hits = folder_assets(&root_response);
    if let Some(found) = hits
        .iter()
        .find(|hit| hit.common.name.eq_ignore_ascii_case(name))
    {
        debug!(
            action = "upsert folder",
            reference = name,
            "{name} in {parent_folder} already exists"
        );
        return Ok(found.clone());
    }

    location::create_folder(api, &root_response, name).await
}

/// Creates every missing folder of `full_folder_path` below the `Projects`
/// root, returning the deepest one. `None` when the path holds nothing below
/// the root.
pub async fn create_projects_folders_full_path(
    api: &ApiClient,
    full: &FullRegistryInfo,
    full_folder_path: &str,
) -> Result<Option<AssetObject>, CtmsError> {
    upsert_path(api, full, "Projects", path_segments(full_folder_path, "Projects")).await
}

/// Creates every missing folder of `full_folder_path` below its first
/// segment, returning the deepest one.
pub async fn create_folders_full_path(
    api: &ApiClient,
    full: &FullRegistryInfo,
    full_folder_path: &str,
) -> Result<Option<AssetObject>, CtmsError> {
    let mut segments = full_folder_path.split('/').filter(|s| !s.is_empty());
    let Some(root) = segments.next() else {
        return Ok(None);
    };
    upsert_path(api, full, root, segments.map(str::to_string).collect()).await
}

async fn upsert_path(
    api: &ApiClient,
    full: &FullRegistryInfo,
    root: &str,
    segments: Vec<String>,
) -> Result<Option<AssetObject>, CtmsError> {
    let mut parent = root.to_string();
    let mut newest = None;
    for segment in segments {
        let folder = upsert_folder(api, full, &segment, &parent).await?;
        parent = folder.base.id.clone();
        newest = Some(folder);
    }
    Ok(newest)
}

// The leading root segment is dropped positionally, so a nested folder may
// carry the root's name
fn path_segments(path: &str, root: &str) -> Vec<String> {
    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.first().copied() == Some(root) {
        segments.remove(0);
    }
    segments.into_iter().map(str::to_string).collect()
}

/// The child folders of the given path or folder name.
pub async fn get_child_folders(
    api: &ApiClient,
    full: &FullRegistryInfo,
    root: &str,
) -> Result<Vec<AssetObject>, CtmsError> {
    debug!(action = "get child(s)", reference = root, "get child folders");

    let root_folder = location::get_item_by_id(api, full, root, &ItemOptions::default()).await?;
    Ok(folder_assets(&root_folder))
}

/// The masterclips directly inside the given path or folder name.
pub async fn get_masterclips_by_folder(
    api: &ApiClient,
    full: &FullRegistryInfo,
    root: &str,
) -> Result<Vec<AssetObject>, CtmsError> {
    debug!(action = "get masterclip(s)", reference = root, "get masterclips");

    let root_folder = location::get_item_by_id(api, full, root, &ItemOptions::default()).await?;
    Ok(root_folder
        .items()
        .iter()
        .filter(|item| item.common.asset_type == Some(AssetType::Masterclip))
        .cloned()
        .collect())
}

/// Deletes every asset in the folder through the scoped bulk command and
/// waits for the outcome. Folders are left alone. `None` when there was
/// nothing to delete.
pub async fn delete_bulk_assets_in_folder_with_status(
    api: &ApiClient,
    folder: &AssetObject,
) -> Result<Option<PolledStatus>, CtmsError> {
    debug!(
        action = "bulk delete",
        reference = folder.common.path.as_deref().unwrap_or(folder.base.id.as_str()),
        "delete assets in folder"
    );

    let Some(command) = location::delete_bulk_items_in_folder(api, folder).await? else {
        return Ok(None);
    };
    let count = folder
        .items()
        .iter()
        .filter(|item| item.base.kind != BaseType::Folder)
        .count();

    let polled = bulk::await_completion(api, &command, count).await?;
    if let Some(polled) = &polled {
        debug!(
            action = "bulk delete",
            reference = polled.status.command.id.as_str(),
            "done with delete all assets, progress: {}%",
            polled.status.command.progress.unwrap_or(0)
        );
    }
    Ok(polled)
}

/// Releases the reservation of every reserved folder in the slice, returning
/// the reservation responses.
pub async fn remove_reservations(
    api: &ApiClient,
    folders: &[AssetObject],
) -> Result<Vec<ReservationResponse>, CtmsError> {
    let reserved: Vec<&AssetObject> = folders.iter().filter(|f| f.status.reserved).collect();
    trace!(
        action = "remove reservation",
        "{} of {} folder(s) has a reservation",
        reserved.len(),
        folders.len()
    );

    let mut responses = Vec::with_capacity(reserved.len());
    for folder in reserved {
        let reservation = pa::get_reservation(api, folder).await?;
        responses.push(pa::delete_reservation(api, &reservation).await?);
    }
    Ok(responses)
}
