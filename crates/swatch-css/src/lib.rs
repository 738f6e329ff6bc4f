//! Stylesheet build pipeline for swatch component kits.
//!
//! Runs the fixed clean -> lint -> transform -> minify sequence over the
//! bundle entry stylesheets, writing artifacts to a flat build directory and
//! a consumer-layout mirror directory.

pub mod inline;
pub mod lint;
pub mod minify;
pub mod pipeline;
pub mod transform;

pub use lint::{lint_sources, LintReport};
pub use pipeline::{StyleConfig, StyleError, StylePipeline, StyleReport};
