use std::path::PathBuf;

use crate::decode::decode;
use crate::error::{RouteError, Result};
use crate::fs::{self, LibraryFs};
use crate::manifest::{Manifest, Metadata};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteImport {
    pub url: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Replace an existing manifest with the same file name.
    pub overwrite: bool,
}

impl RouteImport {
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    pub path: PathBuf,
    pub manifest: Manifest,
}

/// Decodes a share link and stores it as `<name>.yaml` in the library.
pub fn import_route(library: &LibraryFs, request: &RouteImport) -> Result<ImportOutcome> {
    let route = decode(&request.url)?;
    let manifest = Manifest::from_route(
        route,
        Metadata {
            name: request.name.clone(),
            description: request.description.clone(),
            tags: request.tags.clone(),
        },
    );

    library.ensure_root()?;
    let path = library.resolve(&format!("{}.yaml", sanitize_file_stem(&request.name)));
    if path.exists() {
        if !request.overwrite {
            return Err(RouteError::Conflict(format!(
                "manifest already exists: {}",
                path.display()
            )));
        }
        Manifest::from_yaml(&fs::read_text(&path)?).map_err(|err| {
            RouteError::Conflict(format!(
                "refusing to overwrite {}, not a route manifest: {err}",
                path.display()
            ))
        })?;
    }

    fs::write_atomic(&path, &manifest.to_yaml()?)?;
    tracing::info!(
        path = %path.display(),
        waypoints = manifest.spec.waypoints.len(),
        "imported route"
    );
    Ok(ImportOutcome { path, manifest })
}

/// Lowercase ASCII alphanumerics, any other run of characters becomes `-`.
#[must_use]
pub fn sanitize_file_stem(input: &str) -> String {
    let mut out = String::new();
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    let out = out.trim_matches('-').to_string();
    if out.is_empty() {
        "route".to_string()
    } else {
        out
    }
}
