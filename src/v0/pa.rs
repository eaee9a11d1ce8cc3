/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! Production-automation (`pa:`) extensions: sequences, media info, file
//! import and reservations.

use crate::v0::api::ApiClient;
use crate::v0::bulk::BulkCommandResponse;
use crate::v0::errors::CtmsError;
use crate::v0::hal::{AssetObject, Link};
use crate::v0::macros::require_link;
use crate::v0::registry::ServiceResources;
use bytes::Bytes;
use chrono::{DateTime, Days, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Payload for creating a sequence (or subclip) in a folder.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Sequence {
    #[serde(rename = "dbPath")]
    pub db_path: String,

    pub item: SequenceItem,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SequenceItem {
    #[serde(rename = "createSequence")]
    pub create_sequence: CreateSequenceProps,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateSequenceProps {
    pub name: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Sequence {
    pub fn new(db_path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            item: SequenceItem {
                create_sequence: CreateSequenceProps {
                    name: name.into(),
                    kind: None,
                },
            },
        }
    }
}

/// Answer to a sequence creation; `id` is the full interplay identifier.
#[derive(Deserialize, Debug, Clone)]
pub struct CreateSequenceResponse {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(rename = "_links", default)]
    pub links: crate::v0::hal::Links,
}

impl CreateSequenceResponse {
    /// The moniker part of the interplay id, usable with
    /// `location::get_item_by_moniker`.
    pub fn moniker(&self) -> Option<&str> {
        self.id
            .as_deref()
            .and_then(|id| id.split_once("sequence:"))
            .map(|(_, moniker)| moniker)
    }
}

/// Media info of one asset. The field set is system-specific.
#[derive(Deserialize, Debug, Clone)]
#[serde(transparent)]
pub struct MediaInfo(pub serde_json::Value);

#[derive(Deserialize, Debug, Clone)]
pub struct MediaInfoResult {
    #[serde(rename = "mediaInfo")]
    pub media_info: MediaInfo,
}

/// Payload for importing a previously uploaded file.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ImportAsset {
    #[serde(rename = "fileName")]
    pub file_name: String,

    #[serde(rename = "assetType", default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Answer to a file upload.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct FileUploadResult {
    #[serde(rename = "fileName", default)]
    pub file_name: Option<String>,

    #[serde(rename = "_links", default)]
    pub links: crate::v0::hal::Links,
}

/// Reservation (advisory lock) state of one asset or folder, enforced by the
/// remote system.
#[derive(Deserialize, Debug, Clone)]
pub struct ReservationResponse {
    #[serde(rename = "expirationDate", default)]
    pub expiration_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub owner: Option<String>,

    #[serde(rename = "_links", default)]
    pub links: ReservationLinks,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ReservationLinks {
    #[serde(rename = "self", default)]
    pub self_link: Option<Link>,

    #[serde(rename = "pa:create-reservation", default)]
    pub create_reservation: Option<Link>,
}

impl ReservationResponse {
    // Last path segment of the reservation's own URL, for logging
    fn reference(&self) -> &str {
        self.links
            .self_link
            .as_ref()
            .and_then(|link| link.href.rsplit('/').next())
            .unwrap_or("reservation")
    }
}

#[derive(Serialize)]
struct CreateReservation {
    #[serde(rename = "expirationDate")]
    expiration_date: DateTime<Utc>,
}

/// Creates a sequence via `pa:createSequence`.
pub async fn create_sequence(
    api: &ApiClient,
    pa_resources: &ServiceResources,
    sequence: &Sequence,
) -> Result<CreateSequenceResponse, CtmsError> {
    debug!(
        action = "create sequence",
        reference = sequence.item.create_sequence.name.as_str(),
        "in folder: {}",
        sequence.db_path
    );

    let url = &pa_resources.links.require("pa:createSequence")?.href;
    api.post::<CreateSequenceResponse, _>(url, sequence)
        .await
        .inspect_err(
            |err| error!(action = "create sequence", reference = sequence.item.create_sequence.name.as_str(), error = %err, "create sequence"),
        )
}

/// Creates a subclip of the given masterclip via `pa:createSubclip`.
pub async fn create_subclip(
    api: &ApiClient,
    pa_resources: &ServiceResources,
    asset_id: &str,
    subclip: &Sequence,
) -> Result<CreateSequenceResponse, CtmsError> {
    debug!(
        action = "create subclip",
        reference = subclip.item.create_sequence.name.as_str(),
        "sub clip of: {asset_id} in folder: {}",
        subclip.db_path
    );

    let template = &pa_resources.links.require("pa:createSubclip")?.href;
    let url = template.replace("{assetId}", &urlencoding::encode(asset_id));
    api.post::<CreateSequenceResponse, _>(&url, subclip)
        .await
        .inspect_err(
            |err| error!(action = "create subclip", reference = asset_id, error = %err, "create subclip"),
        )
}

/// Uploads a file's content through the item's `pa:upload-file` link. Import
/// it afterwards with [`import_asset`].
pub async fn upload_file(
    api: &ApiClient,
    asset: &AssetObject,
    content: Bytes,
) -> Result<FileUploadResult, CtmsError> {
    debug!(
        action = "upload file",
        reference = asset.common.name.as_str(),
        "upload {} byte(s)",
        content.len()
    );

    let url = &require_link!(asset.links.upload_file, "pa:upload-file").href;
    api.put_bytes::<FileUploadResult>(url, content)
        .await
        .inspect_err(
            |err| error!(action = "upload file", reference = asset.common.name.as_str(), error = %err, "upload file"),
        )
}

/// Imports a file previously uploaded with [`upload_file`] via the folder's
/// `pa:import-asset-command`.
pub async fn import_asset(
    api: &ApiClient,
    import_to: &AssetObject,
    import: &ImportAsset,
) -> Result<AssetObject, CtmsError> {
    debug!(
        action = "import file",
        reference = import.file_name.as_str(),
        "{}",
        import.file_name
    );

    let url = &require_link!(import_to.links.import_asset_command, "pa:import-asset-command").href;
    api.post::<AssetObject, _>(url, import).await.inspect_err(
        |err| error!(action = "import file", reference = import.file_name.as_str(), error = %err, "import asset"),
    )
}

/// Fetches the media info of one asset via `pa:mediaInfo-by-id`.
pub async fn get_media_info_by_id(
    api: &ApiClient,
    pa_resources: &ServiceResources,
    id: &str,
) -> Result<MediaInfoResult, CtmsError> {
    info!(action = "media info", reference = id, "get media info for: {id}");

    let template = &pa_resources.links.require("pa:mediaInfo-by-id")?.href;
    let url = template.replace("{assetId}", &urlencoding::encode(id));
    api.get::<MediaInfoResult>(&url).await.inspect_err(
        |err| error!(action = "media info", reference = id, error = %err, "get media info"),
    )
}

/// Requests media info for several assets at once via `pa:mediainfo-command`.
/// Await the returned bulk command with [`crate::v0::bulk::await_completion`].
pub async fn get_media_info_bulk(
    api: &ApiClient,
    pa_resources: &ServiceResources,
    ids: &[String],
) -> Result<BulkCommandResponse, CtmsError> {
    debug!(action = "bulk media info", "for: {}", ids.join(", "));

    let url = &pa_resources.links.require("pa:mediainfo-command")?.href;
    api.post::<BulkCommandResponse, _>(url, ids).await.inspect_err(
        |err| error!(action = "bulk media info", error = %err, "get media info bulk"),
    )
}

/// Reads the reservation state of an asset via `pa:reservations`.
pub async fn get_reservation(
    api: &ApiClient,
    asset: &AssetObject,
) -> Result<ReservationResponse, CtmsError> {
    debug!(action = "get reservation", reference = asset.base.id.as_str(), "get reservation");

    let url = &require_link!(asset.links.reservations, "pa:reservations").href;
    api.get::<ReservationResponse>(url).await.inspect_err(
        |err| error!(action = "get reservation", reference = asset.base.id.as_str(), error = %err, "get reservation"),
    )
}

/// Creates (or renews) a reservation. Without an explicit expiration the
/// reservation runs out one day from now.
pub async fn create_reservation(
    api: &ApiClient,
    reservation: &ReservationResponse,
    expiration_date: Option<DateTime<Utc>>,
) -> Result<ReservationResponse, CtmsError> {
    debug!(action = "create reservation", reference = reservation.reference(), "create reservation");

    let url = &require_link!(reservation.links.create_reservation, "pa:create-reservation").href;
    let expiration_date = expiration_date.unwrap_or_else(|| Utc::now() + Days::new(1));
    api.post::<ReservationResponse, _>(url, &CreateReservation { expiration_date })
        .await
        .inspect_err(
            |err| error!(action = "create reservation", reference = reservation.reference(), error = %err, "create reservation"),
        )
}

/// Releases a reservation for every user.
pub async fn delete_reservation(
    api: &ApiClient,
    reservation: &ReservationResponse,
) -> Result<ReservationResponse, CtmsError> {
    debug!(action = "delete reservation", reference = reservation.reference(), "delete reservation");

    let link = require_link!(reservation.links.create_reservation, "pa:create-reservation");
    let url = format!("{}?user=all-users", link.href);
    api.delete_json::<ReservationResponse>(&url).await.inspect_err(
        |err| error!(action = "delete reservation", reference = reservation.reference(), error = %err, "delete reservation"),
    )
}

/// Fetches the associations of an asset via `pa:asset-associations`.
pub async fn get_associations(
    api: &ApiClient,
    asset: &AssetObject,
) -> Result<AssetObject, CtmsError> {
    debug!(action = "get associations", reference = asset.base.id.as_str(), "get associations");

    let url = &require_link!(asset.links.asset_associations, "pa:asset-associations").href;
    api.get::<AssetObject>(url).await.inspect_err(
        |err| error!(action = "get associations", reference = asset.base.id.as_str(), error = %err, "get associations"),
    )
}
