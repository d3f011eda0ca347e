// Public fallible APIs in this crate share one concrete error contract (`RouteError`).
#![allow(
    clippy::missing_errors_doc,
    reason = "crate-wide fallible API uses one explicit error type; per-item boilerplate would duplicate contract"
)]

pub mod config;
pub mod decode;
pub mod error;
pub mod fs;
pub mod index;
pub mod ingest;
pub mod manifest;
pub mod route;
pub mod tags;

pub use config::LibraryConfig;
pub use decode::decode;
pub use error::{Result, RouteError};
pub use index::{IndexEntry, LoadReport, RouteIndex, SearchQuery, load, save_tags};
pub use ingest::{ImportOutcome, RouteImport, import_route};
pub use manifest::{Manifest, ManifestDocument, Metadata};
pub use route::{Poi, RouteData, Waypoint};
pub use tags::{format_tag_text, parse_tag_text};
