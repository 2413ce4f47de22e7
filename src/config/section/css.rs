//! `[build.css]` section configuration.
//!
//! The stylesheet pipeline: an input stylesheet, optionally piped through an
//! external utility-class processor before minification.
//!
//! # Example
//!
//! ```toml
//! [build.css]
//! input = "assets/styles/site.css"       # relative to site root
//! command = ["tailwindcss"]
//! # Expands to: tailwindcss -i $LOAM_INPUT -o $LOAM_OUTPUT
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CssConfig {
    /// Input stylesheet path (relative to site root). `None` disables the
    /// stylesheet pipeline entirely.
    pub input: Option<PathBuf>,

    /// External processor command. Empty means the input is used as-is.
    /// `$LOAM_INPUT`, `$LOAM_OUTPUT` and `$LOAM_MINIFY` are substituted in
    /// arguments; a bare command gets `-i $LOAM_INPUT -o $LOAM_OUTPUT`
    /// appended.
    pub command: Vec<String>,
}

impl CssConfig {
    /// Full processor argv for the given input/output, or `None` when no
    /// command is configured.
    pub fn processor_command(&self) -> Option<Vec<String>> {
        let mut command = self.command.clone();
        if command.is_empty() {
            return None;
        }

        // Bare command: append the conventional in/out flags
        if command.len() == 1 {
            command.extend([
                "-i".into(),
                "$LOAM_INPUT".into(),
                "-o".into(),
                "$LOAM_OUTPUT".into(),
            ]);
        }
        Some(command)
    }
}
