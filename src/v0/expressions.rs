/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! Builders for the ElasticSearch expression AST used by the search service.

use crate::v0::asset::attributes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{EnumString, IntoStaticStr};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ElasticValueType {
    Equals,
    LessThan,
    GreaterThan,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ElasticBodyType {
    Intersect,
    Combined,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ElasticGroupType {
    BooleanMetadata,
}

/// A full search expression: the query body plus an optional result filter.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Expression {
    pub query: QueryBody,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,

    #[serde(default)]
    pub username: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QueryBody {
    #[serde(rename = "type")]
    pub kind: ElasticBodyType,

    pub queries: Vec<QueryGroup>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QueryGroup {
    #[serde(rename = "type")]
    pub kind: ElasticGroupType,

    pub condition: String,

    pub queries: Vec<QueryTerm>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum QueryTerm {
    Date(DateQuery),
    Text(Query),
}

/// Free-text match over the given metadata attributes.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Query {
    pub value: String,
    pub attributes: Vec<String>,
}

impl Query {
    pub fn new(value: impl Into<String>, attributes: Vec<String>) -> Self {
        Self {
            value: value.into(),
            attributes,
        }
    }
}

/// Date comparison against one metadata attribute.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DateQuery {
    #[serde(rename = "type")]
    pub op: ElasticValueType,

    pub attribute: String,

    pub value: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Filter {
    #[serde(rename = "type")]
    pub kind: ElasticBodyType,

    pub all: Vec<All>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct All {
    #[serde(rename = "type")]
    pub kind: ElasticBodyType,

    pub any: Vec<Any>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Any {
    #[serde(rename = "type")]
    pub op: ElasticValueType,

    pub attribute: String,

    pub value: String,
}

/// Expression matching all assets created before the given date.
pub fn before_date_expression(before_date: DateTime<Utc>) -> Expression {
    Expression {
        query: QueryBody {
            kind: ElasticBodyType::Intersect,
            queries: vec![QueryGroup {
                kind: ElasticGroupType::BooleanMetadata,
                condition: "and".to_string(),
                queries: vec![QueryTerm::Date(DateQuery {
                    op: ElasticValueType::LessThan,
                    attribute: "payload._.source_item_created".to_string(),
                    value: before_date,
                })],
            }],
        },
        filter: None,
        username: String::new(),
    }
}

/// Expression matching the video id attribute, filtered down to sequences.
pub fn sequences_by_video_id_expression(video_id: &str) -> Expression {
    // The index mangles dots inside attribute names
    let attribute = format!(
        "payload.interplay-pam.{}",
        attributes::VIDEO_ID.replace('.', "%2E")
    );
    sequences_expression(Query::new(video_id, vec![attribute]))
}

/// Expression matching on title, filtered down to sequences.
pub fn sequences_by_name_expression(name: &str) -> Expression {
    sequences_expression(Query::new(name, vec!["payload._.title".to_string()]))
}

fn sequences_expression(query: Query) -> Expression {
    Expression {
        query: QueryBody {
            kind: ElasticBodyType::Intersect,
            queries: vec![QueryGroup {
                kind: ElasticGroupType::BooleanMetadata,
                condition: "and".to_string(),
                queries: vec![QueryTerm::Text(query)],
            }],
        },
        filter: Some(Filter {
            kind: ElasticBodyType::Combined,
            all: vec![All {
                kind: ElasticBodyType::Combined,
                any: vec![Any {
                    op: ElasticValueType::Equals,
                    attribute: "payload._.source_item_type".to_string(),
                    value: "sequence".to_string(),
                }],
            }],
        }),
        username: String::new(),
    }
}
