//! `folio page` command implementation.

use std::path::PathBuf;

use clap::Args;
use folio_config::{CliSettings, Config};
use folio_server::{create_library, server_config_from_folio_config};
use folio_site::FetchOptions;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the page command.
#[derive(Args)]
pub(crate) struct PageArgs {
    /// Slug of the page within its area.
    slug: String,

    /// Content area (directory under `content/`).
    #[arg(short, long, default_value = "blog")]
    area: String,

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

impl PageArgs {
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
        let page = library
            .page(&self.area, &self.slug, &opts)?
            .ok_or_else(|| CliError::NotFound(format!("{}/{}", self.area, self.slug)))?;

        output.data(&serde_json::to_string_pretty(&page)?);
        Ok(())
    }
}
