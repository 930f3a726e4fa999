//! Shared error vocabulary for Caravel.
//!
//! Convergence touches several collaborators (container runtime, router,
//! app registry, release store), and they all fail in the same handful of
//! ways: a record that isn't there, a record that already is, bad
//! configuration, an I/O fault, or an operation attempted at the wrong
//! time. [`CommonError`] names those cases once so every crate in the
//! workspace reports them identically and callers can branch on
//! predicates like [`CommonError::is_not_found`] instead of matching
//! message strings.
//!
//! Domain-specific failures stay out of this crate. A consuming crate
//! defines its own error enum, embeds `CommonError` through a transparent
//! `#[from]` variant, and adds variants for whatever only it can produce:
//!
//! ```rust,ignore
//! use caravel_error::CommonError;
//! use thiserror::Error;
//!
//! #[derive(Debug, Error)]
//! pub enum CoreError {
//!     #[error(transparent)]
//!     Common(#[from] CommonError),
//!
//!     #[error("unknown resource type: {0}")]
//!     UnknownResource(String),
//! }
//! ```
//!
//! Not-found deserves a note: it is sometimes not an error at all. The
//! router reconciler, for example, treats a missing endpoint as the cue
//! to create one. Keeping the variant (and its predicate) here is what
//! lets that decision live at the call site.

mod common;

pub use common::CommonError;

/// Result type alias using `CommonError`.
pub type Result<T> = std::result::Result<T, CommonError>;
