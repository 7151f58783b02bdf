//! Document compilation.
//!
//! [`Bundler`] turns one document plus its co-located files into front
//! matter and a self-contained HTML fragment:
//!
//! 1. Split and parse YAML front matter
//! 2. Compile imported components (recursively for `.md`/`.mdx`)
//! 3. Parse markdown and run markdown passes
//! 4. Render HTML, parse it into an element tree, run HTML passes
//!
//! Built-in passes run first; the caller's [`TransformSet`] is appended.

use std::collections::{BTreeMap, HashMap};

use pulldown_cmark::{Event, Options, Parser, TextMergeStream, html};

use crate::components::InlineComponents;
use crate::error::BundleError;
use crate::frontmatter::{Frontmatter, parse_frontmatter, split_frontmatter};
use crate::imports::{Import, dir_of, resolve_specifier, split_imports};
use crate::transforms::TransformSet;
use crate::tree::Fragment;

/// Virtual path of the entry document.
const ENTRY_PATH: &str = "./index.mdx";

/// Result of compiling a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    /// Parsed front matter.
    pub frontmatter: Frontmatter,
    /// Compiled HTML with components inlined.
    pub code: String,
}

/// Compiler for markdown documents with component imports.
#[derive(Debug, Clone)]
pub struct Bundler {
    gfm: bool,
}

impl Default for Bundler {
    fn default() -> Self {
        Self::new()
    }
}

impl Bundler {
    /// Create a bundler with GitHub Flavored Markdown enabled.
    #[must_use]
    pub fn new() -> Self {
        Self { gfm: true }
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// When enabled, the parser supports tables, strikethrough, task lists
    /// and footnotes.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }

    /// Compile a document.
    ///
    /// `files` maps virtual paths (`./components/note.mdx`) to the content of
    /// the other files of the content unit.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError`] for malformed front matter, unresolvable or
    /// cyclic imports and markup that cannot be parsed.
    pub fn bundle(
        &self,
        source: &str,
        files: &BTreeMap<String, String>,
        transforms: &TransformSet,
    ) -> Result<Bundle, BundleError> {
        let (yaml, body) = split_frontmatter(source);
        let frontmatter = match yaml {
            Some(yaml) => parse_frontmatter(yaml)?,
            None => Frontmatter::default(),
        };

        let mut stack = Vec::new();
        let fragment = self.compile(body, ENTRY_PATH, files, transforms, &mut stack)?;

        Ok(Bundle {
            frontmatter,
            code: fragment.to_html(),
        })
    }

    fn compile(
        &self,
        body: &str,
        importer: &str,
        files: &BTreeMap<String, String>,
        transforms: &TransformSet,
        stack: &mut Vec<String>,
    ) -> Result<Fragment, BundleError> {
        let (imports, body) = split_imports(body)?;
        let components = self.load_components(&imports, importer, files, transforms, stack)?;

        let passes = TransformSet::new()
            .with_html(InlineComponents::new(components))
            .then(transforms);

        let events: Vec<Event<'_>> =
            TextMergeStream::new(Parser::new_ext(body, self.parser_options())).collect();
        let events = passes.apply_markdown(events);

        let mut rendered = String::with_capacity(body.len() * 2);
        html::push_html(&mut rendered, events.into_iter());

        let mut fragment = Fragment::parse(&rendered)?;
        passes.apply_html(&mut fragment);

        tracing::debug!(importer, imports = imports.len(), "compiled document");
        Ok(fragment)
    }

    fn load_components(
        &self,
        imports: &[Import],
        importer: &str,
        files: &BTreeMap<String, String>,
        transforms: &TransformSet,
        stack: &mut Vec<String>,
    ) -> Result<HashMap<String, Fragment>, BundleError> {
        let mut components = HashMap::with_capacity(imports.len());

        for import in imports {
            let (path, content) = resolve_specifier(dir_of(importer), &import.specifier)
                .and_then(|path| files.get(&path).map(|content| (path, content)))
                .ok_or_else(|| BundleError::UnresolvedImport {
                    specifier: import.specifier.clone(),
                    importer: importer.to_owned(),
                })?;

            let extension = path
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_ascii_lowercase())
                .unwrap_or_default();

            let fragment = match extension.as_str() {
                "md" | "mdx" => {
                    if stack.contains(&path) {
                        let mut chain = stack.clone();
                        chain.push(path);
                        return Err(BundleError::ImportCycle(chain.join(" -> ")));
                    }
                    stack.push(path.clone());
                    let (_, body) = split_frontmatter(content);
                    let compiled = self.compile(body, &path, files, transforms, stack);
                    stack.pop();
                    compiled?
                }
                "html" | "htm" | "svg" => Fragment::parse(content)?,
                _ => return Err(BundleError::UnsupportedImport(path)),
            };

            components.insert(import.name.clone(), fragment);
        }

        Ok(components)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::transforms::{HtmlTransform, PreUnwrapGuard, UnwrapPreContainers};

    fn files(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_bundle_frontmatter_and_body() {
        let source = "---\ntitle: Hello\ndate: 2024-01-01\n---\n# Hello\n\nText\n";

        let bundle = Bundler::new()
            .bundle(source, &BTreeMap::new(), &TransformSet::new())
            .unwrap();

        assert_eq!(bundle.frontmatter.title.as_deref(), Some("Hello"));
        assert_eq!(bundle.frontmatter.date.as_deref(), Some("2024-01-01"));
        assert_eq!(bundle.code, "<h1>Hello</h1>\n<p>Text</p>\n");
    }

    #[test]
    fn test_bundle_without_frontmatter() {
        let bundle = Bundler::new()
            .bundle("Plain\n", &BTreeMap::new(), &TransformSet::new())
            .unwrap();

        assert_eq!(bundle.frontmatter, Frontmatter::default());
        assert_eq!(bundle.code, "<p>Plain</p>\n");
    }

    #[test]
    fn test_gfm_strikethrough_toggle() {
        let source = "~~gone~~\n";

        let gfm = Bundler::new()
            .bundle(source, &BTreeMap::new(), &TransformSet::new())
            .unwrap();
        let plain = Bundler::new()
            .with_gfm(false)
            .bundle(source, &BTreeMap::new(), &TransformSet::new())
            .unwrap();

        assert_eq!(gfm.code, "<p><del>gone</del></p>\n");
        assert_eq!(plain.code, "<p>~~gone~~</p>\n");
    }

    #[test]
    fn test_mdx_component_inlined_without_its_frontmatter() {
        let files = files(&[("./note.mdx", "---\ntitle: ignored\n---\n**Note**\n")]);
        let source = "import Note from './note.mdx'\n\n# T\n\n<Note />\n";

        let bundle = Bundler::new()
            .bundle(source, &files, &TransformSet::new())
            .unwrap();

        assert_eq!(bundle.code, "<h1>T</h1>\n<p><strong>Note</strong></p>\n\n");
        assert_eq!(bundle.frontmatter, Frontmatter::default());
    }

    #[test]
    fn test_nested_component_resolves_relative_to_importer() {
        let files = files(&[
            ("./components/card.mdx", "import Icon from './icon.svg'\n\n<Icon />\n"),
            ("./components/icon.svg", "<svg><circle r=\"1\"/></svg>"),
        ]);
        let source = "import Card from './components/card.mdx'\n\n<Card />\n";

        let bundle = Bundler::new()
            .bundle(source, &files, &TransformSet::new())
            .unwrap();

        assert!(bundle.code.contains("<svg><circle r=\"1\"></circle></svg>"));
    }

    #[test]
    fn test_unresolved_import() {
        let err = Bundler::new()
            .bundle(
                "import Missing from './missing.mdx'\n\n<Missing />\n",
                &BTreeMap::new(),
                &TransformSet::new(),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            BundleError::UnresolvedImport { ref specifier, .. } if specifier == "./missing.mdx"
        ));
    }

    #[test]
    fn test_unsupported_import() {
        let files = files(&[("./counter.js", "export default 1")]);

        let err = Bundler::new()
            .bundle(
                "import Counter from './counter.js'\n",
                &files,
                &TransformSet::new(),
            )
            .unwrap_err();

        assert!(matches!(err, BundleError::UnsupportedImport(ref p) if p == "./counter.js"));
    }

    #[test]
    fn test_import_cycle() {
        let files = files(&[
            ("./a.mdx", "import B from './b.mdx'\n\n<B />\n"),
            ("./b.mdx", "import A from './a.mdx'\n\n<A />\n"),
        ]);

        let err = Bundler::new()
            .bundle("import A from './a.mdx'\n", &files, &TransformSet::new())
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "import cycle: ./a.mdx -> ./b.mdx -> ./a.mdx"
        );
    }

    #[test]
    fn test_malformed_frontmatter_is_fatal() {
        let err = Bundler::new()
            .bundle("---\ntitle: [\n---\nBody\n", &BTreeMap::new(), &TransformSet::new())
            .unwrap_err();

        assert!(matches!(err, BundleError::FrontMatter(_)));
    }

    #[test]
    fn test_transform_set_applied() {
        let transforms = TransformSet::new()
            .with_markdown(crate::transforms::CloudinaryImages)
            .with_html(UnwrapPreContainers::new(PreUnwrapGuard::Literal));
        let source = "![x](https://res.cloudinary.com/demo/image/upload/a.png)\n\n<div><pre>code</pre></div>\n";

        let bundle = Bundler::new()
            .bundle(source, &BTreeMap::new(), &transforms)
            .unwrap();

        assert!(bundle.code.contains(
            "src=\"https://res.cloudinary.com/demo/image/upload/f_auto,q_auto,dpr_2.0/a.png\""
        ));
        assert!(bundle.code.contains("<pre>code</pre>"));
        assert!(!bundle.code.contains("<div>"));
    }

    struct CountComponents;

    impl HtmlTransform for CountComponents {
        fn name(&self) -> &'static str {
            "count-components"
        }

        fn transform(&self, fragment: &mut Fragment) {
            // Runs after the built-in inlining pass, so no component tags remain.
            assert!(!fragment.children.iter().any(|n| n.is_element("Note")));
        }
    }

    #[test]
    fn test_configured_passes_run_after_builtin() {
        let files = files(&[("./note.html", "<aside>n</aside>")]);
        let transforms = TransformSet::new().with_html(CountComponents);

        Bundler::new()
            .bundle("import Note from './note.html'\n\n<Note />\n", &files, &transforms)
            .unwrap();
    }
}
