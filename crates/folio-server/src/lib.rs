//! HTTP server for Folio.
//!
//! This crate provides a native Rust HTTP server using axum, serving:
//! - `GET /blog/{slug}`: compiled post with its head metadata
//! - `GET /blog`: post index, newest first
//! - `POST /action/mark-read`: completion signal from the read-progress detector
//!
//! # Quick Start
//!
//! ```ignore
//! use folio_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         source_dir: "site".into(),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum server (folio-server)
//!                        │
//!                        └─► spawn_blocking ──► Library (download + compile + cache)
//!                                                   │
//!                                                   └─► FsContentSource (content checkout)
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use folio_bundler::{
    Bundler, CodeSandboxTransformer, LinkEmbedder, OEmbedTransformer, PreUnwrapGuard, TransformSet,
};
use folio_cache::{Cache, FileCache, MemoryCache, NullCache};
use folio_config::{BatchFailureMode, CacheBackend, PreUnwrapMode};
use folio_content::FsContentSource;
use folio_site::{BatchFailurePolicy, Library, LibraryConfig};
use state::AppState;

pub use error::ServerError;

/// Where compiled content is cached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheMode {
    /// No caching.
    Disabled,
    /// In-process cache with expiry.
    Memory {
        /// Entry lifetime.
        ttl: Duration,
    },
    /// On-disk cache, invalidated when the version changes.
    File {
        /// Cache directory.
        dir: PathBuf,
    },
}

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Checkout of the content repository.
    pub source_dir: PathBuf,
    /// Cache backend.
    pub cache: CacheMode,
    /// Guard for the pre-container unwrapping pass.
    pub pre_unwrap: PreUnwrapGuard,
    /// Resolve embeddable links over oEmbed.
    pub embeds: bool,
    /// Timeout for a single embed lookup.
    pub embed_timeout: Duration,
    /// Per-page failure policy for listings.
    pub batch_failure: BatchFailurePolicy,
    /// Public site URL, for logging.
    pub site_url: String,
    /// Application version (for cache invalidation).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            source_dir: PathBuf::from("."),
            cache: CacheMode::Disabled,
            pre_unwrap: PreUnwrapGuard::Literal,
            embeds: false,
            embed_timeout: Duration::from_secs(10),
            batch_failure: BatchFailurePolicy::Skip,
            site_url: String::new(),
            version: String::new(),
        }
    }
}

/// Run the server.
///
/// # Errors
///
/// Returns an error if the address is invalid or the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let library = create_library(&config);
    let state = Arc::new(AppState::new(library));
    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, site_url = %config.site_url, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Build the content library described by `config`.
#[must_use]
pub fn create_library(config: &ServerConfig) -> Library {
    let source = Arc::new(FsContentSource::new(config.source_dir.clone()));

    let cache: Box<dyn Cache> = match &config.cache {
        CacheMode::Disabled => Box::new(NullCache),
        CacheMode::Memory { ttl } => Box::new(MemoryCache::new(*ttl)),
        CacheMode::File { dir } => Box::new(FileCache::new(dir.clone(), &config.version)),
    };

    let mut embedder = LinkEmbedder::default().with_provider(CodeSandboxTransformer);
    if config.embeds {
        embedder = embedder.with_provider(OEmbedTransformer::new(config.embed_timeout));
    }
    let transforms = TransformSet::standard(embedder, config.pre_unwrap);

    Library::new(
        source,
        cache.as_ref(),
        Bundler::new(),
        transforms,
        LibraryConfig {
            batch_failure: config.batch_failure,
        },
    )
}

/// Create server configuration from Folio config.
#[must_use]
pub fn server_config_from_folio_config(config: &folio_config::Config, version: String) -> ServerConfig {
    let cache = match (config.cache.enabled, config.cache.backend) {
        (false, _) => CacheMode::Disabled,
        (true, CacheBackend::Memory) => CacheMode::Memory {
            ttl: Duration::from_secs(config.cache.ttl_secs),
        },
        (true, CacheBackend::File) => CacheMode::File {
            dir: config.content_resolved.cache_dir(),
        },
    };

    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        source_dir: config.content_resolved.source_dir.clone(),
        cache,
        pre_unwrap: match config.render.pre_unwrap {
            PreUnwrapMode::Literal => PreUnwrapGuard::Literal,
            PreUnwrapMode::SoleChild => PreUnwrapGuard::SoleChild,
        },
        embeds: config.render.embeds,
        embed_timeout: Duration::from_secs(config.render.embed_timeout_secs),
        batch_failure: match config.render.batch_failure {
            BatchFailureMode::Skip => BatchFailurePolicy::Skip,
            BatchFailureMode::Abort => BatchFailurePolicy::Abort,
        },
        site_url: config.site_resolved.url.clone(),
        version,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_server_config_from_default_config() {
        let config = folio_config::Config::default();

        let server = server_config_from_folio_config(&config, "1.0.0".to_owned());

        assert_eq!(server.host, config.server.host);
        assert_eq!(server.port, config.server.port);
        assert_eq!(server.pre_unwrap, PreUnwrapGuard::Literal);
        assert_eq!(server.batch_failure, BatchFailurePolicy::Skip);
        assert_eq!(server.version, "1.0.0");
    }

    #[test]
    fn test_disabled_cache_maps_to_disabled_mode() {
        let mut config = folio_config::Config::default();
        config.cache.enabled = false;

        let server = server_config_from_folio_config(&config, String::new());

        assert_eq!(server.cache, CacheMode::Disabled);
    }

    #[test]
    fn test_file_cache_uses_project_cache_dir() {
        let mut config = folio_config::Config::default();
        config.cache.enabled = true;
        config.cache.backend = CacheBackend::File;

        let server = server_config_from_folio_config(&config, String::new());

        assert_eq!(
            server.cache,
            CacheMode::File {
                dir: config.content_resolved.cache_dir()
            }
        );
    }
}
