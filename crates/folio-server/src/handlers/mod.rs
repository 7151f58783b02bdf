//! HTTP request handlers.

pub(crate) mod actions;
pub(crate) mod blog;

use std::sync::Arc;

use folio_site::{Library, LibraryError};

use crate::error::ServerError;
use crate::state::AppState;

/// Run a library call on the blocking pool.
///
/// Content operations read files and compile markdown synchronously, so they
/// must not run on the async workers.
pub(crate) async fn with_library<T, F>(state: &Arc<AppState>, f: F) -> Result<T, ServerError>
where
    F: FnOnce(&Library) -> Result<T, LibraryError> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    let result = tokio::task::spawn_blocking(move || f(&state.library)).await?;
    Ok(result?)
}
