use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use routebook_core::{IndexEntry, RouteError, SearchQuery};
use serde::Serialize;

use crate::cli::ListArgs;

pub(super) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(super) struct RouteSummary<'a> {
    pub(super) id: &'a str,
    pub(super) name: &'a str,
    pub(super) tags: &'a [String],
    pub(super) filepath: &'a Path,
}

impl<'a> From<&'a IndexEntry> for RouteSummary<'a> {
    fn from(entry: &'a IndexEntry) -> Self {
        Self {
            id: &entry.id,
            name: &entry.name,
            tags: &entry.tags,
            filepath: &entry.filepath,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ListOutput<'a> {
    pub(super) library: &'a Path,
    pub(super) routes: Vec<RouteSummary<'a>>,
    pub(super) errors: &'a [String],
}

pub(super) fn build_query(args: &ListArgs) -> SearchQuery {
    let mut query = SearchQuery::new();
    let tags = args
        .tags
        .iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    if !tags.is_empty() {
        query = query.with_tags(tags);
    }
    if let Some(name) = args.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        query = query.with_name_contains(name);
    }
    query
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(super) struct ErrorOutput {
    pub(super) code: &'static str,
    pub(super) message: String,
    pub(super) operation: &'static str,
}

/// Core failures keep their stable code; anything else is `INTERNAL`.
pub(super) fn error_output(operation: &'static str, err: &anyhow::Error) -> ErrorOutput {
    let code = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<RouteError>())
        .map_or("INTERNAL", RouteError::code);
    ErrorOutput {
        code,
        message: format!("{err:#}"),
        operation,
    }
}
