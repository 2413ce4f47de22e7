//! Core types - pure abstractions shared across the codebase.

mod env;

pub use env::{EnvContext, Environment};
