//! CLI command implementations.

pub(crate) mod list;
pub(crate) mod page;
pub(crate) mod serve;

pub(crate) use list::ListArgs;
pub(crate) use page::PageArgs;
pub(crate) use serve::ServeArgs;
