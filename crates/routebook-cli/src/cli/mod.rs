use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod args;


pub use args::{IdArg, ImportArgs, ListArgs, TagArgs, UrlArg};

#[derive(Debug, Parser)]
#[command(name = "routebook")]
#[command(about = "Personal bikerouter.de route library", version)]
pub struct Cli {
    /// Library directory. Falls back to $ROUTEBOOK_LIBRARY, then ./library.
    #[arg(long, global = true)]
    pub library: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decode a share link and print the route data.
    Decode(UrlArg),
    /// Decode a share link and store it as a manifest in the library.
    Import(ImportArgs),
    /// List library routes, optionally filtered.
    List(ListArgs),
    /// Print one stored manifest.
    Show(IdArg),
    /// Replace the tags of one route.
    Tag(TagArgs),
    /// Print files the library could not load.
    Errors,
}

impl Commands {
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::Import(_) => "import",
            Self::List(_) => "list",
            Self::Show(_) => "show",
            Self::Tag(_) => "tag",
            Self::Errors => "errors",
        }
    }
}
