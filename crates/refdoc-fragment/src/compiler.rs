/*
 * compiler.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Body -> CompiledFragment compilation.
 */

//! Fragment compilation.
//!
//! ## Passes
//!
//! 1. **Hoist**: module statements leave the body (dynamic embedding)
//! 2. **Shortcodes**: `{{< ... >}}` directives are resolved against frontmatter
//! 3. **Fenced divs**: callouts and divs become raw HTML wrappers
//! 4. **Parse**: comrak builds the Markdown AST with the configured extensions
//! 5. **Components**: embedded component tags are collected and checked
//! 6. **Render**: comrak writes HTML, highlighting fenced code with syntect

use comrak::plugins::syntect::{SyntectAdapter, SyntectAdapterBuilder};
use comrak::{Arena, Options, Plugins, format_html_with_plugins, parse_document};
use refdoc_frontmatter::Meta;
use syntect::highlighting::ThemeSet;

use crate::callout::expand_fenced_divs;
use crate::components::collect_components;
use crate::esm::hoist_module_statements;
use crate::fragment::CompiledFragment;
use crate::options::CompilerOptions;
use crate::shortcode::{ShortcodeHandler, ShortcodeResolver, builtin_handlers};
use crate::{CompileError, Result};

/// Compiles override bodies with one fixed set of options.
///
/// Build one compiler per pipeline and share it; it holds the loaded syntax
/// and theme sets and is `Send + Sync`.
pub struct FragmentCompiler {
    options: CompilerOptions,
    highlighter: SyntectAdapter,
    shortcodes: Vec<Box<dyn ShortcodeHandler>>,
}

impl std::fmt::Debug for FragmentCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FragmentCompiler")
            .field("options", &self.options)
            .field(
                "shortcodes",
                &self.shortcodes.iter().map(|h| h.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl FragmentCompiler {
    /// Create a compiler with the built-in shortcodes.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::UnknownTheme`] if `options.syntax_theme` is not
    /// one of the bundled syntect themes.
    pub fn new(options: CompilerOptions) -> Result<Self> {
        let themes = ThemeSet::load_defaults();
        if !themes.themes.contains_key(&options.syntax_theme) {
            return Err(CompileError::UnknownTheme {
                name: options.syntax_theme,
            });
        }
        let highlighter = SyntectAdapterBuilder::new()
            .theme(&options.syntax_theme)
            .build();

        Ok(Self {
            options,
            highlighter,
            shortcodes: builtin_handlers(),
        })
    }

    /// Register an additional shortcode handler.
    ///
    /// A handler with the same name as an existing one replaces it.
    pub fn with_shortcode(mut self, handler: Box<dyn ShortcodeHandler>) -> Self {
        self.shortcodes.retain(|h| h.name() != handler.name());
        self.shortcodes.push(handler);
        self
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compile a body into a fragment.
    ///
    /// Returns `Ok(None)` without doing any work when the body is empty or
    /// whitespace-only. `metadata` is the section's frontmatter, used by the
    /// `meta` shortcode.
    pub fn compile(&self, body: &str, metadata: &Meta) -> Result<Option<CompiledFragment>> {
        if body.trim().is_empty() {
            return Ok(None);
        }

        let hoisted = hoist_module_statements(body, self.options.dynamic_embedding)?;
        let resolved = ShortcodeResolver::new(&self.shortcodes, metadata).resolve(&hoisted.body)?;
        let expanded = expand_fenced_divs(&resolved)?;

        let arena = Arena::new();
        let mut options = Options::default();
        self.configure(&mut options);
        let root = parse_document(&arena, &expanded, &options);

        let components = collect_components(root)?;
        if !self.options.dynamic_embedding {
            if let Some(name) = components.first() {
                return Err(CompileError::EmbeddingDisabled {
                    construct: format!("the component <{}>", name),
                });
            }
        }

        let mut plugins = Plugins::default();
        plugins.render.codefence_syntax_highlighter = Some(&self.highlighter);

        let mut html = Vec::new();
        format_html_with_plugins(root, &options, &mut html, &plugins)
            .map_err(|e| CompileError::Render(e.to_string()))?;
        let html = String::from_utf8(html).map_err(|e| CompileError::Render(e.to_string()))?;

        tracing::trace!(
            bytes = html.len(),
            imports = hoisted.imports.len(),
            components = components.len(),
            "Compiled fragment"
        );

        Ok(Some(CompiledFragment {
            html,
            imports: hoisted.imports,
            exports: hoisted.exports,
            components,
        }))
    }

    fn configure(&self, options: &mut Options) {
        let gfm = self.options.table_syntax;
        options.extension.table = gfm;
        options.extension.strikethrough = gfm;
        options.extension.autolink = gfm;
        options.extension.tasklist = gfm;
        options.extension.footnotes = gfm;
        // Callout wrappers and components are emitted as raw HTML.
        options.render.unsafe_ = true;
    }
}
