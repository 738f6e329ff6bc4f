//! The markup-token regeneration decision.
//!
//! Rebuilding the preview assets and application bundle is expensive next to
//! a CSS-only edit, so regeneration is keyed on a fingerprint of the example
//! markup: the ordered concatenation of every component's `markup` string.
//! Equal fingerprints mean the rendered page would be structurally identical
//! and the rebuild can be skipped.

use crate::component::Component;

/// Compute the markup token for an ordered component list.
///
/// Components without example markup contribute the empty string, so the
/// token is order-sensitive over the markup-bearing components.
pub fn markup_token(components: &[Component]) -> String {
    components
        .iter()
        .map(|c| c.annotation.markup.as_deref().unwrap_or(""))
        .collect()
}

/// Outcome of the regeneration decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegenDecision {
    /// Whether the preview assets, bundle, and page must be rebuilt
    pub rebuild: bool,

    /// The token the caller should retain for the next invocation
    pub token: String,
}

/// Decide whether the preview must be regenerated.
///
/// Pure function of the previously retained token and the freshly parsed
/// component list; the caller owns the retained token (initially empty, so
/// the first run after process start always rebuilds).
///
/// Note the deliberate sharp edge: a parse that yields zero components
/// degenerates to the empty token, and if the retained token is also empty
/// the run counts as unchanged and regeneration is skipped.
pub fn decide_regeneration(previous_token: &str, components: &[Component]) -> RegenDecision {
    let token = markup_token(components);

    RegenDecision {
        rebuild: token != previous_token,
        token,
    }
}
