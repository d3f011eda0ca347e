//! Versioned YAML manifest wrapping one decoded route.
//!
//! [`Manifest`] is the typed shape written by the import step. Files read back
//! from the library are held as a [`ManifestDocument`] instead, which keeps
//! the mapping exactly as parsed (key order, unknown keys) so a tag edit can
//! rewrite the file without disturbing anything else in it.

use serde::{Deserialize, Serialize};
use serde_norway::{Mapping, Value};

use crate::error::{RouteError, Result};
use crate::route::RouteData;

pub const API_VERSION: &str = "bikerouter.de/v1";
pub const KIND: &str = "Route";

const METADATA_KEY: &str = "metadata";
const NAME_KEY: &str = "name";
const TAGS_KEY: &str = "tags";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub spec: RouteData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Neither deduplicated nor sorted.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Manifest {
    #[must_use]
    pub fn from_route(route: RouteData, metadata: Metadata) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata,
            spec: route,
        }
    }

    #[must_use]
    pub fn into_route(self) -> RouteData {
        self.spec
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_norway::to_string(self)?)
    }

    /// Parses and checks the `apiVersion`/`kind` header.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let manifest: Self = serde_norway::from_str(text)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_version != API_VERSION {
            return Err(RouteError::Validation(format!(
                "unsupported apiVersion {:?}, expected {API_VERSION:?}",
                self.api_version
            )));
        }
        if self.kind != KIND {
            return Err(RouteError::Validation(format!(
                "unsupported kind {:?}, expected {KIND:?}",
                self.kind
            )));
        }
        Ok(())
    }
}

/// A parsed manifest file whose top level is a mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestDocument {
    root: Mapping,
}

impl ManifestDocument {
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_norway::from_str(text)?;
        match value {
            Value::Mapping(root) => Ok(Self { root }),
            other => Err(RouteError::Validation(format!(
                "manifest top level must be a mapping, found {}",
                value_kind(&other)
            ))),
        }
    }

    /// `metadata.name`, or an empty string when missing or not a scalar.
    #[must_use]
    pub fn name(&self) -> String {
        self.metadata()
            .and_then(|metadata| metadata.get(NAME_KEY))
            .and_then(scalar_text)
            .unwrap_or_default()
    }

    /// `metadata.tags`, empty when missing. Non-scalar items are skipped.
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        self.metadata()
            .and_then(|metadata| metadata.get(TAGS_KEY))
            .and_then(Value::as_sequence)
            .map(|items| items.iter().filter_map(scalar_text).collect())
            .unwrap_or_default()
    }

    /// Replaces `metadata.tags` in place, creating `metadata` when absent.
    pub fn set_tags(&mut self, tags: &[String]) -> Result<()> {
        match self.root.get(METADATA_KEY) {
            None | Some(Value::Null) => {
                self.root.insert(
                    Value::String(METADATA_KEY.to_string()),
                    Value::Mapping(Mapping::new()),
                );
            }
            Some(Value::Mapping(_)) => {}
            Some(other) => {
                return Err(RouteError::Validation(format!(
                    "metadata must be a mapping, found {}",
                    value_kind(other)
                )));
            }
        }

        let Some(Value::Mapping(metadata)) = self.root.get_mut(METADATA_KEY) else {
            return Err(RouteError::Validation(
                "metadata mapping is missing".to_string(),
            ));
        };
        let tags = tags.iter().cloned().map(Value::String).collect();
        metadata.insert(
            Value::String(TAGS_KEY.to_string()),
            Value::Sequence(tags),
        );
        Ok(())
    }

    /// Typed view for display. Missing sections default; mistyped ones fail.
    pub fn manifest(&self) -> Result<Manifest> {
        Ok(serde_norway::from_value(Value::Mapping(self.root.clone()))?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_norway::to_string(&self.root)?)
    }

    fn metadata(&self) -> Option<&Mapping> {
        self.root.get(METADATA_KEY).and_then(Value::as_mapping)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
