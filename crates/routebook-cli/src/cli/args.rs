use clap::Args;

#[derive(Debug, Args)]
pub struct UrlArg {
    pub url: String,
}

#[derive(Debug, Args)]
pub struct IdArg {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    pub url: String,
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "")]
    pub description: String,
    /// Comma-separated tags, e.g. "gravel, scenic".
    #[arg(long, default_value = "")]
    pub tags: String,
    /// Replace an existing manifest with the same file name.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Keep routes carrying this tag; repeat to require several.
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,
    /// Case-insensitive substring of the route name.
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Debug, Args)]
pub struct TagArgs {
    pub id: String,
    /// Comma-separated replacement tags; empty clears them.
    #[arg(allow_hyphen_values = true)]
    pub tags: String,
}
