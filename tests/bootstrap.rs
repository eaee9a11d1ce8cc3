/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
mod common;

use common::{CLIENT_TOKEN, SESSION_TOKEN, api_client, mount_get, registry_json};
use ctms::v0::{Client, CtmsAuth, CtmsConfig, CtmsError, registry};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REGISTRY_PATH: &str = "/apis/avid.ctms.registry;version=0;realm=global";

async fn mount_handshake(server: &MockServer) {
    let base = server.uri();

    mount_get(
        server,
        "/auth",
        json!({
            "_links": {
                "auth:identity-providers": [{"href": format!("{base}/auth/identity-providers")}]
            }
        }),
    )
    .await;

    // The first provider has no ROPC endpoint; the client must scan past it
    mount_get(
        server,
        "/auth/identity-providers",
        json!({
            "_embedded": {
                "auth:identity-provider": [
                    {"kind": "windows", "_links": {}},
                    {"kind": "default", "_links": {
                        "auth:ropc-default": [{"href": format!("{base}/auth/tokens")}]
                    }}
                ]
            },
            "_links": {"self": {"href": format!("{base}/auth/identity-providers")}}
        }),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/auth/tokens"))
        .and(header("authorization", format!("Basic {CLIENT_TOKEN}")))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": SESSION_TOKEN,
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

// Everything past the token exchange must carry the session bearer token.
async fn mount_registry(server: &MockServer) {
    let base = server.uri();
    let bearer = format!("Bearer {SESSION_TOKEN}");

    Mock::given(method("GET"))
        .and(path(REGISTRY_PATH))
        .and(header("authorization", bearer.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_links": {
                "registry:serviceroots": [{"href": format!("{base}/registry/serviceroots{{;version}}")}]
            }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/registry/serviceroots"))
        .and(header("authorization", bearer.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(registry_json(&base)))
        .mount(server)
        .await;

    mount_domain_roots(server).await;
}

async fn mount_domain_roots(server: &MockServer) {
    let base = server.uri();

    mount_get(
        server,
        "/apis/assets",
        json!({
            "_links": {
                "self": {"href": format!("{base}/apis/assets")},
                "curies": [{"href": format!("{base}/docs/{{rel}}"), "name": "aa", "templated": true}],
                "aa:time-based-by-id": {"href": format!("{base}/assets/{{id}}/time-based")}
            }
        }),
    )
    .await;
    mount_get(server, "/apis/locations", common::location_root_json(&base)).await;
    mount_get(
        server,
        "/apis/searches",
        json!({
            "_links": {
                "self": {"href": format!("{base}/apis/searches")},
                "search:saved-searches": {"href": format!("{base}/searches/saved")}
            }
        }),
    )
    .await;
    mount_get(
        server,
        "/apis/taxonomies",
        json!({"_links": {"self": {"href": format!("{base}/apis/taxonomies")}}}),
    )
    .await;
    mount_get(
        server,
        "/apis/pa",
        json!({
            "_links": {
                "self": {"href": format!("{base}/apis/pa")},
                "pa:createSequence": {"href": format!("{base}/pa/sequences")}
            }
        }),
    )
    .await;
}

#[tokio::test]
async fn connect_walks_the_whole_chain_and_installs_the_token() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    mount_registry(&server).await;

    let auth = CtmsAuth::new("alice", "secret");
    let config = CtmsConfig::new(CLIENT_TOKEN);
    let client = Client::connect(&server.uri(), &auth, &config).await.unwrap();

    assert_eq!(client.session().access_token, SESSION_TOKEN);
    assert!(client.api().is_authenticated());
    assert!(client.cache().identity().is_some());

    // Baseline relations and relations only a domain root revealed
    let names = client.cache().relation_names();
    assert!(names.contains(&"loc:item-by-id"));
    assert!(names.contains(&"aa:time-based-by-id"));
    assert!(names.contains(&"search:saved-searches"));
    assert!(names.contains(&"pa:location-item-by-moniker"));
    // Navigational noise never becomes a capability
    assert!(!names.contains(&"self"));
    assert!(!names.contains(&"curies"));
}

#[tokio::test]
async fn missing_identity_providers_relation_is_a_discovery_error() {
    let server = MockServer::start().await;
    mount_get(&server, "/auth", json!({"_links": {}})).await;

    let auth = CtmsAuth::new("alice", "secret");
    let config = CtmsConfig::new(CLIENT_TOKEN);
    let err = Client::connect(&server.uri(), &auth, &config)
        .await
        .unwrap_err();

    match err {
        CtmsError::Discovery { what, .. } => assert!(what.contains("identity-providers")),
        other => panic!("expected discovery error, got {other:?}"),
    }
}

#[tokio::test]
async fn rejected_credentials_are_an_authentication_error() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_get(
        &server,
        "/auth",
        json!({
            "_links": {
                "auth:identity-providers": [{"href": format!("{base}/auth/identity-providers")}]
            }
        }),
    )
    .await;
    mount_get(
        &server,
        "/auth/identity-providers",
        json!({
            "_embedded": {
                "auth:identity-provider": [
                    {"_links": {"auth:ropc-default": [{"href": format!("{base}/auth/tokens")}]}}
                ]
            }
        }),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/auth/tokens"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "401",
            "message": "invalid username or password",
            "incident": "a1b2c3"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = CtmsAuth::new("alice", "wrong");
    let config = CtmsConfig::new(CLIENT_TOKEN);
    let err = Client::connect(&server.uri(), &auth, &config)
        .await
        .unwrap_err();

    // Rejection is not retried automatically
    match err {
        CtmsError::Authentication(message) => assert!(message.contains("401")),
        other => panic!("expected authentication error, got {other:?}"),
    }
}

#[tokio::test]
async fn discovering_the_same_registry_twice_yields_the_same_relations() {
    let server = MockServer::start().await;
    mount_domain_roots(&server).await;

    let api = api_client();
    let full = common::full_registry(&server.uri());

    let first = registry::get_resource_index(&api, full.clone()).await.unwrap();
    let second = registry::get_resource_index(&api, full).await.unwrap();

    assert_eq!(first.relation_names(), second.relation_names());
    assert!(!first.relation_names().is_empty());
}

#[tokio::test]
async fn a_failing_domain_root_aborts_discovery_naming_the_domain() {
    let server = MockServer::start().await;
    mount_domain_roots(&server).await;

    // Shadow the search root with a server error
    let mut full = common::full_registry(&server.uri());
    let broken = format!("{}/apis/broken-searches", server.uri());
    full.resources.get_mut("search:searches").unwrap()[0].href = broken;
    Mock::given(method("GET"))
        .and(path("/apis/broken-searches"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let api = api_client();
    let err = registry::get_resource_index(&api, full).await.unwrap_err();

    match err {
        CtmsError::Discovery { what, source } => {
            assert_eq!(what, "search resources");
            assert!(source.is_some());
        }
        other => panic!("expected discovery error, got {other:?}"),
    }
}
