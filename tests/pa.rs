/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
mod common;

use bytes::Bytes;
use common::{api_client, child_json, mount_get};
use ctms::v0::{AssetObject, ImportAsset, Sequence, datamodel, pa};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn created_sequences_expose_their_moniker() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("POST"))
        .and(path("/pa/sequences"))
        .and(body_string_contains("\"dbPath\":\"/Projects/Daily/\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "interplay:pam?sequence:060a2b34-9f",
            "_links": {"self": {"href": format!("{base}/pa/sequences/060a2b34-9f")}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_client();
    let root = common::pa_root(&base);
    let sequence = Sequence::new("/Projects/Daily/", "evening show");
    let created = pa::create_sequence(&api, &root, &sequence).await.unwrap();

    assert_eq!(created.moniker(), Some("060a2b34-9f"));
}

#[tokio::test]
async fn uploaded_files_are_sent_as_octet_streams() {
    let server = MockServer::start().await;
    let base = server.uri();

    let mut item = child_json(&base, "Projects/drop", "drop", "folder");
    item["_links"]["pa:upload-file"] = json!({"href": format!("{base}/pa/uploads/drop")});
    item["_links"]["pa:import-asset-command"] =
        json!({"href": format!("{base}/pa/imports/drop")});
    let item: AssetObject = serde_json::from_value(item).unwrap();

    Mock::given(method("PUT"))
        .and(path("/pa/uploads/drop"))
        .and(header("content-type", "application/octet-stream"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"fileName": "clip.mxf"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/pa/imports/drop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(child_json(
            &base,
            "Projects/drop/clip",
            "clip",
            "asset",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_client();
    let uploaded = pa::upload_file(&api, &item, Bytes::from_static(b"mxf-bytes"))
        .await
        .unwrap();
    assert_eq!(uploaded.file_name.as_deref(), Some("clip.mxf"));

    let import = ImportAsset {
        file_name: "clip.mxf".to_string(),
        asset_type: Some("masterclip".to_string()),
        comment: None,
    };
    let imported = pa::import_asset(&api, &item, &import).await.unwrap();
    assert_eq!(imported.base.id, "Projects/drop/clip");
}

#[tokio::test]
async fn media_info_substitutes_the_asset_id() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_get(
        &server,
        "/pa/media-info/060a-7",
        json!({"mediaInfo": {"format": "XDCAM HD", "duration": "00:01:30:00"}}),
    )
    .await;

    let api = api_client();
    let root = common::pa_root(&base);
    let result = pa::get_media_info_by_id(&api, &root, "060a-7").await.unwrap();

    assert_eq!(result.media_info.0["format"], json!("XDCAM HD"));
}

#[tokio::test]
async fn renewing_a_reservation_posts_an_expiration_date() {
    let server = MockServer::start().await;
    let base = server.uri();

    let reservation: pa::ReservationResponse = serde_json::from_value(json!({
        "_links": {
            "self": {"href": format!("{base}/reservations/f1")},
            "pa:create-reservation": {"href": format!("{base}/reservations/f1/lock")}
        }
    }))
    .unwrap();

    Mock::given(method("POST"))
        .and(path("/reservations/f1/lock"))
        .and(body_string_contains("expirationDate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "expirationDate": "2025-06-01T12:00:00Z",
            "_links": {
                "self": {"href": format!("{base}/reservations/f1")},
                "pa:create-reservation": {"href": format!("{base}/reservations/f1/lock")}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_client();
    let renewed = pa::create_reservation(&api, &reservation, None).await.unwrap();
    assert!(renewed.expiration_date.is_some());
}

#[tokio::test]
async fn the_aggregated_datamodel_fills_in_the_language() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/datamodel/aggregated"))
        .and(wiremock::matchers::query_param("lang", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": {"aa:asset": {"attributes": []}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_client();
    let full = common::full_registry(&base);
    let model = datamodel::get_complete_datamodel(&api, &full, "en").await.unwrap();

    assert!(model["models"]["aa:asset"].is_object());
}
