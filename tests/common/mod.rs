/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! Shared fixtures for the mock-server tests. The JSON mirrors the HAL
//! documents a MediaCentral platform answers with, shrunk to the fields the
//! client reads.

#![allow(dead_code)]

use ctms::v0::{ApiClient, CtmsConfig, FullRegistryInfo, ServiceResources};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLIENT_TOKEN: &str = "dGVzdC1jbGllbnQ6c2VjcmV0";
pub const SESSION_TOKEN: &str = "session-token";

/// An already-authenticated transport, for tests that start past the
/// handshake.
pub fn api_client() -> ApiClient {
    ApiClient::new(&CtmsConfig::new(CLIENT_TOKEN))
        .expect("api client")
        .authenticated(SESSION_TOKEN)
}

pub async fn mount_get(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// The full registry info document, with every template the tests resolve.
pub fn registry_json(base: &str) -> Value {
    json!({
        "resources": {
            "aa:assets": [{"href": format!("{base}/apis/assets"), "type": "application/hal+json"}],
            "loc:locations": [{"href": format!("{base}/apis/locations")}],
            "search:searches": [{"href": format!("{base}/apis/searches")}],
            "taxonomies:taxonomies": [{"href": format!("{base}/apis/taxonomies")}],
            "pa:extended": [{"href": format!("{base}/apis/pa")}],
            "loc:root-item": [{"href": format!("{base}/items/root")}],
            "loc:item-by-id": [{"href": format!("{base}/items/{{id}}")}],
            "aa:asset-by-id": [{"href": format!("{base}/assets/{{id}}")}],
            "aa:update-attributes-by-id": [{"href": format!("{base}/assets/{{id}}/attributes")}],
            "aa:update-asset-by-id": [{"href": format!("{base}/assets/{{id}}")}],
            "search:simple-search": [{"href": format!("{base}/searches/simple?search={{search}}{{&offset,limit}}")}]
        },
        "_links": {
            "self": {"href": format!("{base}/registry/serviceroots")},
            "datamodel:aggregated-model": [{"href": format!("{base}/datamodel/aggregated{{?lang}}")}]
        }
    })
}

pub fn full_registry(base: &str) -> FullRegistryInfo {
    serde_json::from_value(registry_json(base)).expect("registry fixture")
}

/// A `loc:` domain root carrying the relations the location operations use.
pub fn location_root_json(base: &str) -> Value {
    json!({
        "_links": {
            "self": {"href": format!("{base}/apis/locations")},
            "curies": [{"href": format!("{base}/docs/{{rel}}"), "name": "loc", "templated": true}],
            "loc:delete-item-by-id-bulk-command": {"href": format!("{base}/locations/delete-bulk")},
            "pa:location-item-by-moniker": {"href": format!("{base}/monikers/{{moniker}}")}
        }
    })
}

pub fn location_root(base: &str) -> ServiceResources {
    serde_json::from_value(location_root_json(base)).expect("location root fixture")
}

pub fn pa_root(base: &str) -> ServiceResources {
    serde_json::from_value(json!({
        "_links": {
            "self": {"href": format!("{base}/apis/pa")},
            "pa:createSequence": {"href": format!("{base}/pa/sequences")},
            "pa:createSubclip": {"href": format!("{base}/pa/assets/{{assetId}}/subclips")},
            "pa:mediaInfo-by-id": {"href": format!("{base}/pa/media-info/{{assetId}}")},
            "pa:mediainfo-command": {"href": format!("{base}/pa/media-info-bulk")}
        }
    }))
    .expect("pa root fixture")
}

/// A child entry as it appears inside a folder's embedded collection.
pub fn child_json(base: &str, id: &str, name: &str, kind: &str) -> Value {
    json!({
        "base": {"id": id, "type": kind},
        "common": {"name": name, "path": format!("/{id}")},
        "_links": {
            "self": {"href": format!("{base}/items/{id}")}
        }
    })
}

pub fn child_asset_json(base: &str, id: &str, name: &str, asset_type: &str) -> Value {
    let mut child = child_json(base, id, name, "asset");
    child["common"]["assetType"] = json!(asset_type);
    child["_links"]["loc:delete-item"] = json!({"href": format!("{base}/items/{id}")});
    child
}

/// A folder document embedding one collection page of children.
pub fn folder_json(base: &str, id: &str, name: &str, children: Vec<Value>) -> Value {
    let total = children.len();
    json!({
        "base": {"id": id, "type": "folder"},
        "common": {"name": name, "path": format!("/{id}/")},
        "_links": {
            "self": {"href": format!("{base}/items/{id}?offset=0&limit=25")},
            "loc:create-folder": {"href": format!("{base}/items/{id}/folders")},
            "loc:move-item": {"href": format!("{base}/items/{id}/move")},
            "loc:delete-item-in-folder-by-id-bulk-command": {"href": format!("{base}/items/{id}/delete-bulk")}
        },
        "_embedded": {
            "loc:collection": {
                "paging": {"offset": 0, "limit": 1000, "elements": total, "totalElements": total},
                "_links": {"self": {"href": format!("{base}/items/{id}/collection")}},
                "_embedded": {"loc:item": children}
            }
        }
    })
}
