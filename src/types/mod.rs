//! Type definitions module.
//!
//! Contains shared types used across the application.

pub mod registry;
pub mod token;
pub mod unlock;

pub use registry::*;
pub use token::*;
pub use unlock::*;
