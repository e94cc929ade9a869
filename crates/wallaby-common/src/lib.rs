//! Common utilities for the Wallaby layout engine.
//!
//! This crate provides shared infrastructure used by all layout components:
//! - **Warning System** - colored terminal output for tolerated-but-lossy situations
//! - **Errors** - the shared error type for resource collaborators

pub mod error;
pub mod warning;

pub use error::WallabyError;
