//! Process environment, read once at startup.
//!
//! Transforms never read ambient environment state; everything they need is
//! captured here at process start and passed down by reference.

/// Name of the variable selecting the build environment.
pub const ENVIRONMENT_VAR: &str = "ENVIRONMENT";

/// Build environment selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Full output processing: class mangling and HTML minification.
    Production,
    /// Fast local builds, output left readable.
    #[default]
    Development,
}

impl Environment {
    /// Parse from the `ENVIRONMENT` variable value. Anything other than
    /// `production` selects development.
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            Some("production") => Self::Production,
            _ => Self::Development,
        }
    }

    #[inline]
    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

/// Environment state captured at process start.
#[derive(Debug, Clone, Default)]
pub struct EnvContext {
    /// Selected build environment.
    pub environment: Environment,
    /// Deploy token exposed to the page layout (`${token}`). Empty pages
    /// are fine without it; unset stays `None`.
    pub token: Option<String>,
}

impl EnvContext {
    /// Capture the process environment. `token_var` names the variable
    /// holding the deploy token (configured via `[site] token_env`).
    pub fn from_process(token_var: &str) -> Self {
        Self {
            environment: Environment::from_value(
                std::env::var(ENVIRONMENT_VAR).ok().as_deref(),
            ),
            token: std::env::var(token_var).ok().filter(|t| !t.is_empty()),
        }
    }

    #[inline]
    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }
}
