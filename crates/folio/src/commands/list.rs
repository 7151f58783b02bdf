//! `folio list` command implementation.

use std::path::PathBuf;

use clap::Args;
use folio_config::{CliSettings, Config};
use folio_server::{create_library, server_config_from_folio_config};
use folio_site::{BLOG_AREA, FetchOptions, PageListItem};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the list command.
#[derive(Args)]
pub(crate) struct ListArgs {
    /// Content area (directory under `content/`).
    #[arg(default_value = BLOG_AREA)]
    area: String,

    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,

    /// Content repository checkout (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Ignore cached entries.
    #[arg(long)]
    fresh: bool,

    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ListArgs {
    pub(crate) fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir.clone(),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let library = create_library(&server_config_from_folio_config(&config, version.to_owned()));

        let opts = FetchOptions {
            force_fresh: self.fresh,
        };
        let items: Vec<PageListItem> = if self.area == BLOG_AREA {
            library.blog_list_items(&opts)?
        } else {
            library
                .pages_in_dir(&self.area, &opts)?
                .into_iter()
                .map(PageListItem::from)
                .collect()
        };

        if self.json {
            output.data(&serde_json::to_string_pretty(&items)?);
            return Ok(());
        }

        for item in &items {
            output.row(&item.slug, &describe(item));
        }
        output.success(&format!("{} page(s) in {}", items.len(), self.area));
        Ok(())
    }
}

/// One-line summary: date, title and reading time when known.
fn describe(item: &PageListItem) -> String {
    let fm = &item.frontmatter;
    let mut parts = Vec::new();
    if let Some(date) = &fm.date {
        parts.push(date.clone());
    }
    if let Some(title) = &fm.title {
        parts.push(title.clone());
    }
    if let Some(read_time) = &item.read_time {
        parts.push(format!("({})", read_time.text));
    }
    parts.join("  ")
}
