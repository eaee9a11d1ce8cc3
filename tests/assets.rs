/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
mod common;

use common::{api_client, child_asset_json, mount_get};
use ctms::v0::asset::{self, AssetAttributes, Attribute, attributes};
use ctms::v0::{AssetObject, CtmsError, sequences};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn asset_by_id_encodes_the_id_and_attribute_names() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/assets/2016.5"))
        .and(query_param(
            "attributes",
            format!("{},{}Theta", attributes::VIDEO_ID, attributes::USER_PREFIX),
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(child_asset_json(&base, "2016.5", "clip", "masterclip")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = api_client();
    let full = common::full_registry(&base);
    let theta = format!("{}Theta", attributes::USER_PREFIX);
    let asset = asset::get_asset_by_id(
        &api,
        &full,
        "2016.5",
        &[attributes::VIDEO_ID, theta.as_str()],
    )
    .await
    .unwrap();

    assert_eq!(asset.base.id, "2016.5");
}

#[tokio::test]
async fn attribute_updates_go_through_the_referenced_object() {
    let server = MockServer::start().await;
    let base = server.uri();

    let mut item = child_asset_json(&base, "Projects/seq", "seq", "sequence");
    item["_embedded"] = json!({
        "loc:referenced-object": {
            "base": {"id": "060a-9", "type": "asset"},
            "common": {"name": "seq"},
            "_links": {
                "aa:update-attributes": {"href": format!("{base}/assets/060a-9/attributes")}
            }
        }
    });
    let item: AssetObject = serde_json::from_value(item).unwrap();

    let update = AssetAttributes {
        attributes: vec![Attribute {
            name: attributes::VIDEO_ID.to_string(),
            value: "v-42".to_string(),
        }],
    };
    Mock::given(method("PATCH"))
        .and(path("/assets/060a-9/attributes"))
        .and(body_json(&update))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_client();
    asset::update_asset_attributes(&api, &item, &update).await.unwrap();
}

#[tokio::test]
async fn attribute_update_without_a_referenced_object_is_a_state_error() {
    let server = MockServer::start().await;
    let item: AssetObject =
        serde_json::from_value(child_asset_json(&server.uri(), "x", "x", "sequence")).unwrap();

    let api = api_client();
    let err = asset::update_asset_attributes(&api, &item, &AssetAttributes::default())
        .await
        .unwrap_err();

    assert!(matches!(err, CtmsError::MissingLink(relation) if relation == "loc:referenced-object"));
}

#[tokio::test]
async fn time_based_segments_round_through_their_link() {
    let server = MockServer::start().await;
    let base = server.uri();

    let mut item = child_asset_json(&base, "Projects/seq", "seq", "sequence");
    item["_links"]["aa:time-based"] = json!({"href": format!("{base}/assets/seq/time-based")});
    let item: AssetObject = serde_json::from_value(item).unwrap();

    mount_get(
        &server,
        "/assets/seq/time-based",
        json!({
            "segments": [
                {"begin": 0, "end": 250, "attributes": [{"name": "marker", "value": "intro"}]}
            ]
        }),
    )
    .await;

    let api = api_client();
    let time_based = asset::get_time_based(&api, &item).await.unwrap();

    assert_eq!(time_based.segments.len(), 1);
    assert_eq!(time_based.segments[0].end, Some(250));
}

#[tokio::test]
async fn sequences_in_a_folder_are_filtered_by_video_id() {
    let server = MockServer::start().await;
    let base = server.uri();

    let mut wanted = child_asset_json(&base, "Daily/seq1", "seq1", "sequence");
    wanted["_embedded"] = json!({
        "loc:referenced-object": {
            "base": {"id": "060a-1", "type": "asset"},
            "common": {"name": "seq1"},
            "_embedded": {"aa:attributes": {"attributes": [
                {"name": attributes::VIDEO_ID, "value": "v-42"}
            ]}}
        }
    });
    let mut other = child_asset_json(&base, "Daily/seq2", "seq2", "sequence");
    other["_embedded"] = json!({
        "loc:referenced-object": {
            "base": {"id": "060a-2", "type": "asset"},
            "common": {"name": "seq2"},
            "_embedded": {"aa:attributes": {"attributes": [
                {"name": attributes::VIDEO_ID, "value": "v-7"}
            ]}}
        }
    });

    mount_get(
        &server,
        "/items/Daily",
        common::folder_json(
            &base,
            "Daily",
            "Daily",
            vec![
                wanted,
                other,
                common::child_json(&base, "Daily/sub", "sub", "folder"),
            ],
        ),
    )
    .await;

    let api = api_client();
    let full = common::full_registry(&base);
    let hits = sequences::get_sequences_by_video_id_for_folder(&api, &full, "v-42", "Daily")
        .await
        .unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].base.id, "Daily/seq1");
}
