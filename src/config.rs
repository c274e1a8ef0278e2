// Copyright 2025 STARGA Inc.
// Licensed under the Apache License, Version 2.0 (the “License”);
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at:
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an “AS IS” BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Part of the MIND project (Machine Intelligence Native Design).

//! Rule-set configuration.
//!
//! ```toml
//! redefinition = "replace"
//! trace_resolution = true
//! validate_tangent_arity = true
//! ```
//!
//! Missing keys take their defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// What registering a rule for an already-registered key does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedefinitionPolicy {
    /// Reject with [`RegistrationError::Redefinition`](crate::RegistrationError::Redefinition).
    #[default]
    Error,
    /// Keep the newer rule and log a warning.
    Replace,
}

/// Options applied by a [`RuleSetBuilder`](crate::RuleSetBuilder) and the
/// [`RuleSet`](crate::RuleSet) it builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    pub redefinition: RedefinitionPolicy,
    /// Emit a `trace` event for every lookup.
    pub trace_resolution: bool,
    /// Reject forward calls whose tangent count, and reverse rules whose
    /// pullback slot count, is not `args + 1`.
    pub validate_tangent_arity: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            redefinition: RedefinitionPolicy::Error,
            trace_resolution: false,
            validate_tangent_arity: true,
        }
    }
}

/// Errors loading or rendering a [`RegistryConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid rule-set config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to render rule-set config: {0}")]
    Render(#[from] toml::ser::Error),
}

impl RegistryConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
