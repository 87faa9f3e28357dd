use thiserror::Error;

/// Reasons the hierarchical pass gives up and hands over to the
/// sequential fallback layout. None of these reach callers of
/// [`super::layout`]; they are logged and recorded on the
/// [`super::LayoutPlan`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("node at index {index} has an empty id")]
    EmptyNodeId { index: usize },

    #[error("node id `{0}` appears more than once")]
    DuplicateNodeId(String),

    #[error("spacing constant `{0}` is not a finite number")]
    InvalidSpacing(&'static str),

    #[error("computed coordinate for node `{0}` is not finite")]
    NonFiniteCoordinate(String),
}

impl LayoutError {
    /// Whether the configured spacing cannot be trusted for the fallback
    /// layout either.
    pub fn invalidates_spacing(&self) -> bool {
        matches!(
            self,
            LayoutError::InvalidSpacing(_) | LayoutError::NonFiniteCoordinate(_)
        )
    }
}
