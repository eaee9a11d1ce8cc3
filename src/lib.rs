/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! # CTMS
//!
//! This CTMS library was created for working with the CTMS (Common Tool
//! Metadata Service) APIv0 interface of MediaCentral asset-management systems.
//!
//! CTMS is a HAL+JSON hypermedia API: the server advertises its capabilities
//! as named link relations on self-describing resources, and every operation
//! follows a link taken from a previously fetched document rather than a URL
//! template baked into the client. The only URLs the library ever builds
//! itself are path-parameter substitutions into server-provided templates.
//!
//! ## Features
//!
//! - Session bootstrap: auth entry point -> identity providers -> ROPC token
//! - Registry discovery: service root -> full registry -> per-domain resource
//!   maps, cached for the lifetime of the client
//! - Location items and folders (CRUD, move with conflict remediation, bulk
//!   delete with status polling)
//! - Folder tree walking with a configurable depth limit
//! - Asset metadata (custom attributes, time-based segments)
//! - Simple and ElasticSearch-backed search
//! - Production-automation extensions (sequences, media info, reservations,
//!   file upload/import)
//!
//! *The access token obtained at login is held per client instance. Two
//! clients in one process never share or clobber each other's credentials.*
//!
//! ## Installation
//!
//! ```toml
//! [dependencies]
//! ctms = "0.3"
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use ctms::v0::{location, folders::Walker, Client, CtmsAuth, CtmsConfig, ItemOptions};
//!
//! async fn list_projects(url: &str) -> anyhow::Result<()> {
//!     // The client token is the pre-shared Basic token for the ROPC exchange
//!     let auth = CtmsAuth::new("some-user", "some-password");
//!     let config = CtmsConfig::new("client-token");
//!
//!     // Runs the whole handshake and discovery chain
//!     let client = Client::connect(url, &auth, &config).await?;
//!
//!     // Fetch a folder; embedded collection pages are drained automatically
//!     let projects = location::get_item_by_id(
//!         client.api(),
//!         client.cache().full(),
//!         "Projects",
//!         &ItemOptions::default(),
//!     )
//!     .await?;
//!     for item in projects.items() {
//!         println!("{} ({:?})", item.common.name, item.base.kind);
//!     }
//!
//!     // Collect the folder tree two levels deep
//!     let mut walker = Walker::new();
//!     walker.depth_limit = 2;
//!     let folders = walker
//!         .walk(client.api(), client.cache().full(), "Projects")
//!         .await?;
//!     println!("{} folder(s)", folders.len());
//!     Ok(())
//! }
//! ```
pub mod v0;
