//! Short-circuit extension points.
//!
//! A collaborator may register one hook per resolver. The contract, for
//! both: the hook is consulted exactly once per resolution, before the
//! cascade's own generation steps run, and a non-empty return always
//! wins over internal generation. An empty or `None` return falls
//! through to the cascade.

use crate::types::ItemRef;

/// Overrides the bare title before the title cascade generates one.
pub trait TitleHook: Send + Sync {
    fn bare_title(&self, item: &ItemRef) -> Option<String>;
}

/// Overrides the description before the description cascade generates one.
pub trait DescriptionHook: Send + Sync {
    fn description(&self, item: &ItemRef) -> Option<String>;
}

/// Run a hook result through the non-empty-wins rule.
pub(crate) fn winning(result: Option<String>) -> Option<String> {
    result.filter(|s| !s.trim().is_empty())
}
