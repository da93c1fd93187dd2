// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Perimeter-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Perimeter and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Editor configuration, read from `PERIMETER_*` environment variables.

use std::env;
use std::fmt;
use std::time::Duration;

use crate::visibility::Theme;

pub const PALETTE_ENV: &str = "PERIMETER_PALETTE";
pub const GATEWAY_TIMEOUT_ENV: &str = "PERIMETER_GATEWAY_TIMEOUT_MS";
pub const HISTORY_LIMIT_ENV: &str = "PERIMETER_HISTORY_LIMIT";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorConfig {
    pub theme: Theme,
    /// Upper bound for each persistence call. `None` waits indefinitely.
    pub gateway_timeout: Option<Duration>,
    /// Maximum undo entries per edit session. `None` keeps every mutation.
    pub history_limit: Option<usize>,
}

impl EditorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| match env::var(name) {
            Ok(value) => Ok(Some(value)),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidEnv {
                name: name.to_owned(),
                value: "<non-unicode>".to_owned(),
                reason: "value is not valid unicode".to_owned(),
            }),
        })
    }

    /// Builds a config from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(mut lookup: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Result<Option<String>, ConfigError>,
    {
        let mut config = Self::default();

        if let Some(value) = non_blank(lookup(PALETTE_ENV)?) {
            config.theme = Theme::parse_csv(&value)
                .map_err(|reason| ConfigError::invalid(PALETTE_ENV, &value, reason))?;
        }

        if let Some(value) = non_blank(lookup(GATEWAY_TIMEOUT_ENV)?) {
            let millis: u64 = value.parse().map_err(|_| {
                ConfigError::invalid(GATEWAY_TIMEOUT_ENV, &value, "expected milliseconds")
            })?;
            config.gateway_timeout = (millis > 0).then(|| Duration::from_millis(millis));
        }

        if let Some(value) = non_blank(lookup(HISTORY_LIMIT_ENV)?) {
            let limit: usize = value.parse().map_err(|_| {
                ConfigError::invalid(HISTORY_LIMIT_ENV, &value, "expected a positive integer")
            })?;
            if limit == 0 {
                return Err(ConfigError::invalid(
                    HISTORY_LIMIT_ENV,
                    &value,
                    "limit must be at least 1",
                ));
            }
            config.history_limit = Some(limit);
        }

        Ok(config)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidEnv {
        name: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(name: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidEnv {
            name: name.to_owned(),
            value: value.to_owned(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEnv {
                name,
                value,
                reason,
            } => write!(f, "invalid env {name}={value} ({reason})"),
        }
    }
}

impl std::error::Error for ConfigError {}
