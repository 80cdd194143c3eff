use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{AppError, AppResult};

pub const CONFIG_ENV_VAR: &str = "DESKHAND_CONFIG";

/// Top-level configuration: named organizations plus the list of
/// configured helpers.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub organizations: BTreeMap<String, OrganizationConfig>,
    #[serde(default)]
    pub helpers: Vec<HelperConfig>,
}

/// Per-organization server credentials. Every section is optional; a helper
/// that needs an unconfigured server fails with a configuration error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganizationConfig {
    pub jira: Option<JiraConfig>,
    pub confluence: Option<ConfluenceConfig>,
    pub forge: Option<ForgeConfig>,
    pub calendar: Option<CalendarConfig>,
    pub badgebox: Option<BadgeBoxConfig>,
    pub smtp: Option<SmtpConfig>,
    pub ftp: Option<FtpConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JiraConfig {
    pub url: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfluenceConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    /// Application identifier used when creating Jira remote links.
    pub global_identifier: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgeConfig {
    pub url: String,
    pub user_phid: String,
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    /// URL of the CalDAV calendar collection events are PUT into.
    pub url: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BadgeBoxConfig {
    pub username: String,
    pub password: String,
    /// Server override, mainly for tests; the production endpoint is baked in.
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub default_from_address: String,
    pub html_signature: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// One user-facing helper: a kind (which subcommand runs it), the
/// organization it acts for and a flat bag of string parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct HelperConfig {
    pub name: String,
    pub kind: String,
    pub organization: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl HelperConfig {
    pub fn param(&self, key: &str) -> AppResult<&str> {
        self.parameters.get(key).map(String::as_str).ok_or_else(|| {
            AppError::Configuration(format!(
                "helper '{}' is missing parameter '{key}'",
                self.name
            ))
        })
    }

    pub fn opt_param(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    /// Parameter holding a filesystem path; `${HOME}` expands to the home
    /// directory.
    pub fn path_param(&self, key: &str) -> AppResult<PathBuf> {
        Ok(PathBuf::from(expand_home(self.param(key)?)))
    }

    pub fn int_param(&self, key: &str) -> AppResult<u32> {
        let raw = self.param(key)?;
        raw.trim().parse().map_err(|_| {
            AppError::Configuration(format!(
                "helper '{}' parameter '{key}' is not a number: {raw}",
                self.name
            ))
        })
    }

    /// Comma-separated list parameter. Empty entries are dropped.
    pub fn list_param(&self, key: &str) -> AppResult<Vec<String>> {
        Ok(self
            .param(key)?
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// `wrong:right, wrong2:right2` style mapping parameter.
    pub fn map_param(&self, key: &str) -> AppResult<BTreeMap<String, String>> {
        let mut map = BTreeMap::new();
        for entry in self.param(key)?.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (from, to) = entry.split_once(':').ok_or_else(|| {
                AppError::Configuration(format!(
                    "helper '{}' parameter '{key}' entry '{entry}' is not 'from:to'",
                    self.name
                ))
            })?;
            map.insert(from.trim().to_string(), to.trim().to_string());
        }
        Ok(map)
    }
}

impl AppConfig {
    /// Load the configuration from, in order of preference, an explicit
    /// path, `$DESKHAND_CONFIG` or `~/.config/deskhand/config.json`.
    pub fn load(explicit: Option<&Path>) -> AppResult<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match env::var(CONFIG_ENV_VAR) {
                Ok(path) => PathBuf::from(path),
                Err(_) => default_config_path()?,
            },
        };
        let contents = fs::read_to_string(&path).map_err(|err| {
            AppError::Configuration(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> AppResult<Self> {
        serde_json::from_str(contents)
            .map_err(|err| AppError::Configuration(format!("invalid config file: {err}")))
    }

    pub fn organization(&self, name: &str) -> AppResult<&OrganizationConfig> {
        self.organizations
            .get(name)
            .ok_or_else(|| AppError::Configuration(format!("unknown organization '{name}'")))
    }

    /// Find the helper entry for a subcommand. `name` disambiguates when the
    /// configuration holds more than one helper of the same kind.
    pub fn helper(&self, kind: &str, name: Option<&str>) -> AppResult<&HelperConfig> {
        let mut matches = self
            .helpers
            .iter()
            .filter(|helper| helper.kind == kind)
            .filter(|helper| name.is_none_or(|name| helper.name == name));
        let first = matches.next().ok_or_else(|| match name {
            Some(name) => {
                AppError::Configuration(format!("no '{kind}' helper named '{name}' configured"))
            }
            None => AppError::Configuration(format!("no '{kind}' helper configured")),
        })?;
        if matches.next().is_some() {
            return Err(AppError::Configuration(format!(
                "multiple '{kind}' helpers configured, pick one with --helper"
            )));
        }
        Ok(first)
    }
}

fn default_config_path() -> AppResult<PathBuf> {
    let base = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|home| PathBuf::from(home).join(".config")))
        .map_err(|_| AppError::Configuration("cannot determine the home directory".to_string()))?;
    Ok(base.join("deskhand").join("config.json"))
}

pub fn expand_home(path: &str) -> String {
    match env::var("HOME") {
        Ok(home) => path.replace("${HOME}", &home),
        Err(_) => path.to_string(),
    }
}
