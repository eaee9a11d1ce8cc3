/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! Sequence recipes: finding sequences in folders and keeping their metadata
//! in step.

use crate::v0::api::ApiClient;
use crate::v0::asset::{self, AssetAttributes, Attribute, attributes};
use crate::v0::errors::CtmsError;
use crate::v0::hal::AssetObject;
use crate::v0::location::{self, ItemOptions};
use crate::v0::pa::{self, MediaInfo};
use crate::v0::properties::AssetType;
use crate::v0::expressions::sequences_by_video_id_expression;
use crate::v0::registry::{FullRegistryInfo, ServiceResources};
use crate::v0::search;
use tracing::{debug, error};

/// The sequences directly inside a folder, optionally with the named
/// attributes resolved.
pub async fn get_sequences_with_metadata_by_folder(
    api: &ApiClient,
    full: &FullRegistryInfo,
    folder: &str,
    attribute_names: Option<Vec<String>>,
) -> Result<Vec<AssetObject>, CtmsError> {
    debug!(
        action = "get",
        reference = folder,
        "get sequences with metadata for folder: {folder}"
    );

    let options = ItemOptions {
        attributes: attribute_names,
        ..ItemOptions::default()
    };
    let root_response = location::get_item_by_id(api, full, folder, &options)
        .await
        .inspect_err(
            |err| error!(action = "get", reference = folder, error = %err, "get sequences"),
        )?;

    let sequences: Vec<AssetObject> = root_response
        .items()
        .iter()
        .filter(|item| item.common.asset_type == Some(AssetType::Sequence))
        .cloned()
        .collect();
    debug!(
        action = "get",
        reference = folder,
        "found sequences: {} in folder: {folder}",
        sequences.len()
    );
    Ok(sequences)
}

/// Media info for every sequence directly inside a folder.
pub async fn get_media_info_of_sequences_by_folder(
    api: &ApiClient,
    full: &FullRegistryInfo,
    pa_resources: &ServiceResources,
    folder: &str,
    attribute_names: Option<Vec<String>>,
) -> Result<Vec<MediaInfo>, CtmsError> {
    debug!(
        action = "get",
        reference = folder,
        "get media info of sequences in the folder: {folder}"
    );

    let sequences =
        get_sequences_with_metadata_by_folder(api, full, folder, attribute_names).await?;

    let ids: Vec<&str> = sequences
        .iter()
        .filter_map(|sequence| sequence.embedded.referenced_object.as_deref())
        .map(|referenced| referenced.base.id.as_str())
        .collect();

    let mut media_infos = Vec::with_capacity(ids.len());
    for id in ids {
        let result = pa::get_media_info_by_id(api, pa_resources, id).await?;
        media_infos.push(result.media_info);
    }
    Ok(media_infos)
}

/// The sequences of a folder whose video id attribute matches.
pub async fn get_sequences_by_video_id_for_folder(
    api: &ApiClient,
    full: &FullRegistryInfo,
    video_id: &str,
    folder: &str,
) -> Result<Vec<AssetObject>, CtmsError> {
    debug!(
        action = "get",
        reference = video_id,
        "get sequences by video id: {video_id} in the folder: {folder}"
    );

    let sequences = get_sequences_with_metadata_by_folder(
        api,
        full,
        folder,
        Some(vec![attributes::VIDEO_ID.to_string()]),
    )
    .await?;

    Ok(sequences
        .into_iter()
        .filter(|sequence| {
            attributes_from_asset(sequence)
                .iter()
                .find(|attribute| attribute.name == attributes::VIDEO_ID)
                .is_some_and(|attribute| attribute.value == video_id)
        })
        .collect())
}

/// Updates the metadata of every sequence carrying the given video id,
/// located through the ElasticSearch index.
pub async fn update_sequence_metadata_by_video_id(
    api: &ApiClient,
    full: &FullRegistryInfo,
    video_id: &str,
    asset_attributes: &AssetAttributes,
) -> Result<(), CtmsError> {
    debug!(
        action = "update sequence",
        reference = video_id,
        "upsert sequence with metadata"
    );

    let expression = sequences_by_video_id_expression(video_id);
    let search_result = search::search_with_elastic_search(api, full, &expression).await?;

    if search_result.is_empty() {
        debug!(
            action = "update sequence",
            reference = video_id,
            "no sequence found with reference: {video_id}"
        );
        return Ok(());
    }

    debug!(
        action = "update sequence",
        reference = video_id,
        "{} found with reference: {video_id}",
        search_result.len()
    );
    for found in &search_result {
        let id = &found.catalog_item.metadata.payload.avid.id;
        asset::update_asset_attributes_by_id(api, full, id, asset_attributes, video_id).await?;
    }
    Ok(())
}

/// The custom attributes of the referenced object embedded in a location
/// item. Empty when the item references nothing or carries no attributes.
pub fn attributes_from_asset(asset: &AssetObject) -> &[Attribute] {
    asset
        .embedded
        .referenced_object
        .as_deref()
        .and_then(|referenced| referenced.embedded.attributes.as_ref())
        .map(|doc| doc.attributes.as_slice())
        .unwrap_or_default()
}
