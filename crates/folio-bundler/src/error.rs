//! Error types for content bundling.

/// Error raised while compiling a document.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BundleError {
    /// Front matter is not valid YAML or a field has the wrong type.
    #[error("invalid front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),

    /// An `import` line that is not a default import of a relative path.
    #[error("invalid import statement: {0}")]
    InvalidImport(String),

    /// Import target is not part of the content unit.
    #[error("could not resolve import \"{specifier}\" from {importer}")]
    UnresolvedImport {
        /// Import path as written.
        specifier: String,
        /// Document containing the import.
        importer: String,
    },

    /// Import target has an extension the bundler cannot inline.
    #[error("unsupported import target: {0}")]
    UnsupportedImport(String),

    /// A document imports itself, directly or transitively.
    #[error("import cycle: {0}")]
    ImportCycle(String),

    /// Rendered HTML could not be tokenized.
    #[error("HTML parse error: {0}")]
    Html(#[from] quick_xml::Error),
}

/// Error raised by an embed provider.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// Provider answered with an error status.
    #[error("HTTP error: {status}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
    },

    /// Provider response could not be used.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}
