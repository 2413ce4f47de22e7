//! Shared utilities.
//!
//! - [`exec`]: External command execution for the CSS processor hook
//! - [`html`]: HTML escaping
//! - [`path`]: Path normalization and output route helpers

pub mod exec;
pub mod html;
pub mod path;
