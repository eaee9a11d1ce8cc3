/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! Operations over the data-model aggregator service.

use crate::v0::api::ApiClient;
use crate::v0::errors::CtmsError;
use crate::v0::registry::{FullRegistryInfo, ServiceResources};
use tracing::{debug, error};

/// Path of the aggregator's own service root, relative to the platform
/// origin.
pub const DATAMODEL_SERVICE: &str = "/apis/avid.ctms.datamodel.aggregator;version=0;realm=global";

/// Fetches the data-model aggregator's own service root.
pub async fn get_root_data_model(
    api: &ApiClient,
    url: &str,
) -> Result<ServiceResources, CtmsError> {
    debug!(action = "get", reference = "datamodel", "get root data model");

    api.get::<ServiceResources>(&format!("{url}{DATAMODEL_SERVICE}"))
        .await
        .inspect_err(
            |err| error!(action = "get", reference = "datamodel", error = %err, "get root data model"),
        )
}

/// Fetches the aggregated data model via `datamodel:aggregated-model`. The
/// model's shape is site-specific, so it comes back as raw JSON.
pub async fn get_complete_datamodel(
    api: &ApiClient,
    full: &FullRegistryInfo,
    language: &str,
) -> Result<serde_json::Value, CtmsError> {
    debug!(
        action = "get",
        reference = "datamodel",
        "get complete data model with language: {language}"
    );

    let template = &full.links.require("datamodel:aggregated-model")?.href;
    let url = template.replace("{?lang}", &format!("?lang={language}"));
    api.get::<serde_json::Value>(&url).await.inspect_err(
        |err| error!(action = "get", reference = "datamodel", error = %err, "get complete data model"),
    )
}
