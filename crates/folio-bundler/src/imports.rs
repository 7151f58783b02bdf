//! Component imports.
//!
//! Documents may start with default imports of co-located files:
//!
//! ```text
//! import Counter from './components/counter.mdx'
//! import Diagram from "./diagram.svg";
//! ```
//!
//! Import paths are resolved against the virtual root `./` of the content unit.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::BundleError;

static IMPORT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^import\s+([A-Za-z_$][\w$]*)\s+from\s+(?:'([^']+)'|"([^"]+)")\s*;?\s*$"#)
        .expect("invalid import regex")
});

/// A default import of a co-located file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Import {
    /// Local name, used as the component tag.
    pub name: String,
    /// Path as written in the document.
    pub specifier: String,
}

/// Split leading import lines from the rest of a document body.
///
/// Blank lines between imports are skipped. The first other line starts the body.
pub(crate) fn split_imports(body: &str) -> Result<(Vec<Import>, &str), BundleError> {
    let mut imports = Vec::new();
    let mut offset = 0;

    for line in body.split_inclusive('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            offset += line.len();
            continue;
        }
        if !trimmed.starts_with("import ") {
            break;
        }
        let caps = IMPORT_PATTERN
            .captures(trimmed)
            .ok_or_else(|| BundleError::InvalidImport(trimmed.to_owned()))?;
        let specifier = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
        imports.push(Import {
            name: caps[1].to_owned(),
            specifier: specifier.to_owned(),
        });
        offset += line.len();
    }

    if imports.is_empty() {
        return Ok((imports, body));
    }
    Ok((imports, &body[offset..]))
}

/// Directory part of a virtual path (`./a/b.mdx` -> `./a/`).
pub(crate) fn dir_of(path: &str) -> &str {
    path.rfind('/').map_or("./", |i| &path[..=i])
}

/// Resolve a relative import specifier against the importing file's directory.
///
/// Returns `None` for bare specifiers and paths escaping the virtual root.
pub(crate) fn resolve_specifier(base_dir: &str, specifier: &str) -> Option<String> {
    if !specifier.starts_with("./") && !specifier.starts_with("../") {
        return None;
    }

    let mut segments: Vec<&str> = base_dir
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    for segment in specifier.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(format!("./{}", segments.join("/")))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_split_imports() {
        let body = "import Counter from './counter.mdx'\n\nimport Logo from \"./logo.svg\";\n# Title\n";
        let (imports, rest) = split_imports(body).unwrap();

        assert_eq!(
            imports,
            vec![
                Import {
                    name: "Counter".to_owned(),
                    specifier: "./counter.mdx".to_owned(),
                },
                Import {
                    name: "Logo".to_owned(),
                    specifier: "./logo.svg".to_owned(),
                },
            ]
        );
        assert_eq!(rest, "# Title\n");
    }

    #[test]
    fn test_no_imports_returns_body_unchanged() {
        let body = "\n# Title\n\nimport is a word\n";
        let (imports, rest) = split_imports(body).unwrap();

        assert!(imports.is_empty());
        assert_eq!(rest, body);
    }

    #[test]
    fn test_named_import_rejected() {
        let err = split_imports("import { a } from './a.mdx'\n").unwrap_err();

        assert!(matches!(err, BundleError::InvalidImport(_)));
    }

    #[test]
    fn test_resolve_specifier() {
        assert_eq!(resolve_specifier("./", "./a.mdx").as_deref(), Some("./a.mdx"));
        assert_eq!(
            resolve_specifier("./components/", "./b.mdx").as_deref(),
            Some("./components/b.mdx")
        );
        assert_eq!(
            resolve_specifier("./components/", "../c.svg").as_deref(),
            Some("./c.svg")
        );
        assert_eq!(resolve_specifier("./", "../outside.mdx"), None);
        assert_eq!(resolve_specifier("./", "react"), None);
    }

    #[test]
    fn test_dir_of() {
        assert_eq!(dir_of("./index.mdx"), "./");
        assert_eq!(dir_of("./components/a.mdx"), "./components/");
    }
}
