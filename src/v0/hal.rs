/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::v0::errors::CtmsError;
use crate::v0::parsers::{from_asset_type, from_base_type, one_or_many};
use crate::v0::properties::{AssetType, BaseType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One server-advertised hyperlink.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Link {
    pub href: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

/// A relation pointing at one or several link entries. The registry and auth
/// documents publish arrays, item documents publish single objects.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum LinkRefs {
    One(Link),
    Many(Vec<Link>),
}

impl LinkRefs {
    pub fn first(&self) -> Option<&Link> {
        match self {
            LinkRefs::One(link) => Some(link),
            LinkRefs::Many(links) => links.first(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Link> {
        match self {
            LinkRefs::One(link) => std::slice::from_ref(link).iter(),
            LinkRefs::Many(links) => links.iter(),
        }
    }
}

/// Generic relation map for documents whose capabilities are dynamic by
/// nature (the registry and the per-domain service roots). State-dependent
/// documents use typed link structs instead, so "is this operation legal"
/// is a field presence check.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(transparent)]
pub struct Links(pub BTreeMap<String, LinkRefs>);

impl Links {
    pub fn get(&self, relation: &str) -> Option<&LinkRefs> {
        self.0.get(relation)
    }

    pub fn first_href(&self, relation: &str) -> Option<&str> {
        self.get(relation)
            .and_then(LinkRefs::first)
            .map(|link| link.href.as_str())
    }

    pub fn require(&self, relation: &str) -> Result<&Link, CtmsError> {
        self.get(relation)
            .and_then(LinkRefs::first)
            .ok_or_else(|| CtmsError::missing_link(relation))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &LinkRefs)> {
        self.0.iter()
    }
}

/// Stable identity of an item.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Base {
    pub id: String,

    #[serde(rename = "type", deserialize_with = "from_base_type")]
    pub kind: BaseType,
}

/// Display attributes shared by all items.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Common {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(
        default,
        rename = "assetType",
        deserialize_with = "from_asset_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub asset_type: Option<AssetType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

impl Common {
    pub fn named(name: impl Into<String>) -> Self {
        Common {
            name: name.into(),
            ..Common::default()
        }
    }
}

/// Server-side state flags.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Status {
    #[serde(default)]
    pub reserved: bool,
}

/// Links an item can expose. Availability is state-dependent: an absent
/// relation means the action is currently illegal for this resource, not a
/// parse error.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ItemLinks {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<Link>,

    #[serde(
        rename = "loc:collection",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub collection: Option<Link>,

    #[serde(
        rename = "loc:update-item",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub update_item: Option<Link>,

    #[serde(
        rename = "loc:add-item",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub add_item: Option<Link>,

    #[serde(
        rename = "loc:move-item",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub move_item: Option<Link>,

    #[serde(
        rename = "loc:move-items",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub move_items: Option<Link>,

    #[serde(
        rename = "loc:create-folder",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub create_folder: Option<Link>,

    #[serde(
        rename = "loc:delete-item",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub delete_item: Option<Link>,

    #[serde(
        rename = "loc:delete-item-in-folder-by-id-bulk-command",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub delete_in_folder_bulk: Option<Link>,

    #[serde(
        rename = "aa:time-based",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub time_based: Option<Link>,

    #[serde(
        rename = "aa:update-attributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub update_attributes: Option<Link>,

    #[serde(
        rename = "pa:upload-file",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub upload_file: Option<Link>,

    #[serde(
        rename = "pa:import-asset-command",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub import_asset_command: Option<Link>,

    #[serde(
        rename = "pa:reservations",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reservations: Option<Link>,

    #[serde(
        rename = "pa:asset-associations",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub asset_associations: Option<Link>,
}

/// Resources an item may carry inline.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ItemEmbedded {
    #[serde(
        rename = "loc:collection",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub collection: Option<Collection>,

    #[serde(
        rename = "loc:referenced-object",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub referenced_object: Option<Box<AssetObject>>,

    #[serde(
        rename = "aa:attributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub attributes: Option<AttributesDocument>,
}

/// Custom attributes embedded on an asset.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AttributesDocument {
    #[serde(default)]
    pub attributes: Vec<crate::v0::asset::Attribute>,
}

/// The generic CTMS item: a folder, an asset reference, or anything else the
/// server models as a location item.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AssetObject {
    pub base: Base,

    #[serde(default)]
    pub common: Common,

    #[serde(default)]
    pub status: Status,

    #[serde(rename = "_links", default)]
    pub links: ItemLinks,

    #[serde(rename = "_embedded", default)]
    pub embedded: ItemEmbedded,
}

impl AssetObject {
    /// The items of the embedded folder collection. Empty when the document
    /// embeds no collection or the collection embeds no items; `paging`
    /// metadata is advisory only and never consulted here.
    pub fn items(&self) -> &[AssetObject] {
        self.embedded
            .collection
            .as_ref()
            .map(|collection| collection.embedded.items.as_slice())
            .unwrap_or_default()
    }

    /// The move/add payload shape for this item.
    pub fn item_ref(&self) -> Item {
        Item {
            base: self.base.clone(),
            common: None,
        }
    }
}

impl std::fmt::Display for AssetObject {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "name: {}, id: {}", self.common.name, self.base.id)
    }
}

/// Payload sent when adding or moving an item.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Item {
    pub base: Base,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common: Option<Common>,
}

/// Payload carrying an item's common properties, as sent when creating a
/// folder or updating an item.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ItemProps {
    pub common: Common,
}

impl ItemProps {
    pub fn named(name: impl Into<String>) -> Self {
        ItemProps {
            common: Common::named(name),
        }
    }
}

/// Links a collection page can expose.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CollectionLinks {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<Link>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Link>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<Link>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CollectionEmbedded {
    #[serde(rename = "loc:item", default, deserialize_with = "one_or_many")]
    pub items: Vec<AssetObject>,
}

/// A page of items, embedded in a folder or standing alone as a continuation
/// page. Carries a `next` link while the server has more to give.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Collection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,

    #[serde(rename = "_links", default)]
    pub links: CollectionLinks,

    #[serde(rename = "_embedded", default)]
    pub embedded: CollectionEmbedded,
}

impl Collection {
    pub fn items(&self) -> &[AssetObject] {
        &self.embedded.items
    }

    /// Canonical emptiness rule: a collection is empty iff it embeds no
    /// items, regardless of what `paging` claims.
    pub fn is_empty(&self) -> bool {
        self.embedded.items.is_empty()
    }
}

/// Offset/limit paging metadata.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Paging {
    #[serde(default)]
    pub offset: u64,

    #[serde(default)]
    pub limit: u64,

    #[serde(default)]
    pub elements: u64,

    #[serde(rename = "totalElements", default)]
    pub total_elements: u64,
}

// CTMS link templates carry RFC 6570 tails like `{id}` or `{?lang}`
pub(crate) fn strip_template(href: &str) -> &str {
    match href.find('{') {
        Some(idx) => &href[..idx],
        None => href,
    }
}
