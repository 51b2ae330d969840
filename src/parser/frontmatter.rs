use std::fmt;

use anyhow::{bail, Context};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer};
use serde_yaml::{Mapping, Value};

use crate::{date::extract_date_time, metadata::split_tags};

/// Frontmatter keys this generator understands. Keys are matched after
/// lowercasing and trimming, everything else is ignored.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub(crate) struct Frontmatter {
    #[serde(deserialize_with = "scalar_text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "scalar_text")]
    pub description: Option<String>,
    pub created: Option<RawDate>,
    pub updated: Option<RawDate>,
    #[serde(rename = "coverimagepath", deserialize_with = "scalar_text")]
    pub cover_image_path: Option<String>,
    pub tags: Option<RawTags>,
}

/// Any YAML scalar. `title: 2024` or `draft: true` are plain text to us.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub(crate) enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Integer(n) => write!(f, "{n}"),
            Scalar::Float(n) => write!(f, "{n}"),
            Scalar::Bool(b) => write!(f, "{b}"),
        }
    }
}

fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let scalar = Option::<Scalar>::deserialize(deserializer)?;
    Ok(scalar.map(|s| s.to_string()))
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub(crate) enum RawDate {
    Timestamp(DateTime<FixedOffset>),
    Text(Scalar),
}

impl RawDate {
    pub fn resolve(&self) -> Option<DateTime<Utc>> {
        match self {
            RawDate::Timestamp(dt) => Some(dt.with_timezone(&Utc)),
            RawDate::Text(s) => extract_date_time(&s.to_string()).map(|dt| dt.and_utc()),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub(crate) enum RawTags {
    List(Vec<Scalar>),
    Text(Scalar),
}

impl RawTags {
    pub fn into_tags(self) -> Vec<String> {
        match self {
            RawTags::List(list) => {
                let mut tags: Vec<String> = vec![];
                for tag in list.iter().map(Scalar::to_string) {
                    let tag = tag.trim();
                    if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
                        tags.push(tag.to_string());
                    }
                }
                tags
            }
            RawTags::Text(s) => split_tags(&s.to_string()),
        }
    }
}

/// Decodes a YAML frontmatter block into [`Frontmatter`].
pub(crate) fn decode(yaml: &str) -> anyhow::Result<Frontmatter> {
    let value: Value = serde_yaml::from_str(yaml).context("invalid frontmatter YAML")?;
    let mapping = match value {
        Value::Null => return Ok(Frontmatter::default()),
        Value::Mapping(mapping) => mapping,
        _ => bail!("frontmatter is not a key/value mapping"),
    };

    let normalized: Mapping = mapping
        .into_iter()
        .filter_map(|(key, value)| {
            let key = key.as_str()?.trim().to_lowercase();
            Some((Value::String(key), value))
        })
        .collect();

    serde_yaml::from_value(Value::Mapping(normalized)).context("unexpected frontmatter value")
}
