use anyhow::{Context, Result, anyhow};
use routebook_core::fs::LibraryFs;
use routebook_core::{
    LibraryConfig, RouteError, RouteImport, RouteIndex, decode, import_route, parse_tag_text,
};
use serde_json::json;

use crate::cli::Commands;

mod support;


use self::support::{ListOutput, RouteSummary, build_query, error_output, print_json};

pub(crate) fn run(config: &LibraryConfig, command: Commands) -> Result<()> {
    match command {
        Commands::Decode(args) => {
            let route = decode(&args.url).context("failed to decode share link")?;
            print_json(&route)?;
        }
        Commands::Import(args) => {
            let library = LibraryFs::new(&config.library_path);
            let mut request = RouteImport::new(args.url, args.name);
            request.description = args.description;
            request.tags = parse_tag_text(&args.tags);
            request.overwrite = args.force;
            let outcome = import_route(&library, &request).context("failed to import route")?;
            print_json(&json!({
                "status": "ok",
                "path": outcome.path,
                "name": outcome.manifest.metadata.name,
                "waypoints": outcome.manifest.spec.waypoints.len(),
            }))?;
        }
        Commands::List(args) => {
            let index = RouteIndex::open(&config.library_path);
            let routes = index
                .search(&build_query(&args))
                .into_iter()
                .map(RouteSummary::from)
                .collect();
            print_json(&ListOutput {
                library: index.library_path(),
                routes,
                errors: index.errors(),
            })?;
        }
        Commands::Show(args) => {
            let index = RouteIndex::open(&config.library_path);
            let entry = index
                .get_by_id(&args.id)
                .ok_or_else(|| RouteError::NotFound(format!("route id: {}", args.id)))?;
            print!("{}", entry.raw.to_yaml()?);
        }
        Commands::Tag(args) => {
            let mut index = RouteIndex::open(&config.library_path);
            let path = index
                .update_tags_from_text(&args.id, &args.tags)
                .with_context(|| format!("failed to update tags of {:?}", args.id))?;
            let entry = index
                .get_by_path(&path)
                .ok_or_else(|| anyhow!("route disappeared after reload: {}", path.display()))?;
            print_json(&RouteSummary::from(entry))?;
        }
        Commands::Errors => {
            let index = RouteIndex::open(&config.library_path);
            print_json(&index.errors())?;
        }
    }
    Ok(())
}

/// Writes a JSON error payload to stderr.
pub(crate) fn report_error(operation: &'static str, err: &anyhow::Error) {
    let output = error_output(operation, err);
    match serde_json::to_string_pretty(&output) {
        Ok(text) => eprintln!("{text}"),
        Err(_) => eprintln!("{}: {}", output.code, output.message),
    }
}
