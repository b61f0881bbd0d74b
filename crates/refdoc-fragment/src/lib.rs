/*
 * refdoc-fragment
 * Copyright (c) 2025 Posit, PBC
 *
 * Compile reference override bodies into renderable HTML fragments.
 *
 * Markdown is parsed and rendered with comrak; fenced code is highlighted
 * with syntect. On top of CommonMark the compiler understands callouts
 * (fenced divs), shortcodes and MDX-style module statements/components.
 */

mod callout;
mod compiler;
mod components;
mod error;
mod esm;
mod fence;
mod fragment;
mod options;
mod shortcode;

pub use callout::CALLOUT_TYPES;
pub use compiler::FragmentCompiler;
pub use error::{CompileError, Result};
pub use fragment::{CompiledFragment, EmbedImport};
pub use options::{CompilerOptions, DEFAULT_SYNTAX_THEME};
pub use shortcode::{
    KbdShortcodeHandler, MetaShortcodeHandler, Shortcode, ShortcodeContext, ShortcodeHandler,
};
