/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
mod common;

use common::{api_client, child_asset_json, mount_get};
use ctms::v0::expressions::sequences_by_name_expression;
use ctms::v0::search::{self, search_with_elastic_search, simple_search};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn simple_search_fills_in_the_template_parameters() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/searches/simple"))
        .and(query_param("search", "evening show"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "paging": {"offset": 0, "limit": 25, "elements": 2, "totalElements": 2},
            "_links": {"self": {"href": format!("{base}/searches/simple?search=evening%20show")}},
            "_embedded": {"aa:asset": [
                child_asset_json(&base, "x1", "evening show 1", "sequence"),
                child_asset_json(&base, "x2", "evening show 2", "masterclip"),
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_client();
    let full = common::full_registry(&base);
    let result = simple_search(&api, &full, "evening show", 0, 25).await.unwrap();

    assert_eq!(result.assets().len(), 2);
    assert_eq!(result.assets()[0].base.id, "x1");
}

#[tokio::test]
async fn a_lone_search_hit_still_parses() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/searches/simple"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_embedded": {"aa:asset": child_asset_json(&base, "only", "only", "sequence")}
        })))
        .mount(&server)
        .await;

    let api = api_client();
    let full = common::full_registry(&base);
    let result = simple_search(&api, &full, "only", 0, 25).await.unwrap();

    assert_eq!(result.assets().len(), 1);
}

#[tokio::test]
async fn elastic_recipe_polls_until_complete_then_fetches_results() {
    let server = MockServer::start().await;
    let base = server.uri();

    // The search service lives on the platform origin, outside the registry
    Mock::given(method("POST"))
        .and(path("/search/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "s1",
            "self": format!("{base}/search/v1/searches/s1"),
            "complete": false,
            "progress": {"status": "running"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    mount_get(
        &server,
        "/search/v1/searches/s1",
        json!({
            "id": "s1",
            "self": format!("{base}/search/v1/searches/s1"),
            "complete": true,
            "progress": {"status": "done"}
        }),
    )
    .await;

    mount_get(
        &server,
        "/search/v1/searches/s1/results",
        json!([
            {"catalog_item": {"metadata": {"payload": {"avid": {"id": "060a-1"}}}}},
            {"catalog_item": {"metadata": {"payload": {"avid": {"id": "060a-2"}}}}}
        ]),
    )
    .await;

    let api = api_client();
    let full = common::full_registry(&base);
    let expression = sequences_by_name_expression("evening show");
    let hits = search_with_elastic_search(&api, &full, &expression)
        .await
        .unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].catalog_item.metadata.payload.avid.id, "060a-1");
}

#[tokio::test]
async fn elastic_status_refresh_reads_the_self_url() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_get(
        &server,
        "/search/v1/searches/s7",
        json!({
            "id": "s7",
            "self": format!("{base}/search/v1/searches/s7"),
            "complete": true,
            "progress": {"status": "done"}
        }),
    )
    .await;

    let api = api_client();
    let status: search::ElasticSearchStatus = serde_json::from_value(json!({
        "id": "s7",
        "self": format!("{base}/search/v1/searches/s7"),
        "complete": false,
        "progress": {"status": "running"}
    }))
    .unwrap();

    let refreshed = search::get_elastic_search_status(&api, &status).await.unwrap();
    assert!(refreshed.complete);
}
