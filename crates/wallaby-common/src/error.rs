//! Shared error type for the Wallaby layout engine.
//!
//! Layout itself is deterministic and pure given fixed inputs; the only
//! fallible seam is the resource collaborator that resolves fonts. Structural
//! invariant violations inside the engine are programming errors and panic
//! instead of surfacing here.

/// Errors signalled by layout resource collaborators.
#[derive(Debug, thiserror::Error)]
pub enum WallabyError {
    /// The resource cache could not resolve a font for a computed style.
    ///
    /// The layout engine has no fallback logic of its own; whatever the
    /// collaborator signals is propagated to the caller unchanged.
    #[error("no font available for style: {style}")]
    FontNotFound {
        /// Human-readable description of the style the lookup used.
        style: String,
    },
}
