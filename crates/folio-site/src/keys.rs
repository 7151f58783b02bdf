//! Cache keys for content operations.

use std::fmt;

/// Key of a cached content entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKey<'a> {
    /// Downloaded file set of a page: `{area}:{slug}:downloaded`.
    Downloaded {
        /// Content area.
        area: &'a str,
        /// Page slug.
        slug: &'a str,
    },
    /// Compiled page: `{area}:{slug}:compiled`.
    Compiled {
        /// Content area.
        area: &'a str,
        /// Page slug.
        slug: &'a str,
    },
    /// Directory listing of an area: `{area}:dir-list`.
    DirList {
        /// Content area.
        area: &'a str,
    },
}

impl fmt::Display for CacheKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Downloaded { area, slug } => write!(f, "{area}:{slug}:downloaded"),
            Self::Compiled { area, slug } => write!(f, "{area}:{slug}:compiled"),
            Self::DirList { area } => write!(f, "{area}:dir-list"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_key_formats() {
        assert_eq!(
            CacheKey::Downloaded { area: "blog", slug: "hello" }.to_string(),
            "blog:hello:downloaded"
        );
        assert_eq!(
            CacheKey::Compiled { area: "blog", slug: "hello" }.to_string(),
            "blog:hello:compiled"
        );
        assert_eq!(CacheKey::DirList { area: "pages" }.to_string(), "pages:dir-list");
    }
}
