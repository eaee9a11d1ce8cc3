/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::v0::{AssetType, BaseType};
use serde::Deserialize;
use std::str::FromStr;

// Parses base type, tolerating kinds this library does not know about
pub fn from_base_type<'de, D>(deserializer: D) -> Result<BaseType, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    BaseType::from_str(&s).or(Ok(BaseType::Unknown))
}

// Parses asset type
pub fn from_asset_type<'de, D>(deserializer: D) -> Result<Option<AssetType>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Ok(AssetType::from_str(&s).ok().or(Some(AssetType::Unknown)))
}

// HAL embeds a lone resource as an object and several as an array; both
// normalize to a Vec here
pub fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}
