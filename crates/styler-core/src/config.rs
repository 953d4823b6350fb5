//! Run configuration
//!
//! A [`Config`] is built once before any file is processed and handed to the
//! engine by reference; nothing in the core mutates it during a run.

use crate::error::StylerError;
use crate::result::Result;
use once_cell::sync::Lazy;
use schemars::JsonSchema;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Toolchain version assumed when no minimum supported version is configured
pub const DEFAULT_TOOLCHAIN_VERSION: Version = Version::new(1, 18, 0);

/// Standard-library module names alias lifting must never introduce
pub static STDLIB_MODULES: Lazy<BTreeSet<&'static str>> = Lazy::new(|| {
    [
        "Access", "Agent", "Application", "Atom", "Base", "Behaviour", "Bitwise", "Calendar",
        "Code", "Config", "Date", "DateTime", "Dict", "Duration", "Enum", "Exception", "File",
        "Float", "Function", "GenEvent", "GenServer", "HashDict", "HashSet", "IO", "Inspect",
        "Integer", "Kernel", "Keyword", "List", "Logger", "Macro", "Map", "MapSet", "Module",
        "NaiveDateTime", "Node", "OptionParser", "Path", "Port", "Process", "Protocol", "Range",
        "Record", "Regex", "Registry", "Set", "Stream", "String", "StringIO", "Supervisor",
        "System", "Task", "Time", "Tuple", "URI", "Version",
    ]
    .into_iter()
    .collect()
});

/// Configuration for one restyling run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Extra short names alias lifting must not introduce
    #[schemars(description = "Module short names that alias lifting must never introduce")]
    pub alias_lifting_exclude: BTreeSet<String>,

    /// Oldest language version the restyled code must still run on
    #[schemars(
        with = "Option<String>",
        description = "Minimum supported Elixir version; version-gated rewrites only apply at or above their replacement's version"
    )]
    pub minimum_supported_elixir_version: Option<Version>,

    /// Version of the running toolchain, used when no minimum is set
    #[schemars(with = "String", description = "Version of the running toolchain")]
    pub toolchain_version: Version,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alias_lifting_exclude: BTreeSet::new(),
            minimum_supported_elixir_version: None,
            toolchain_version: DEFAULT_TOOLCHAIN_VERSION,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alias_lifting_exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alias_lifting_exclude
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_minimum_supported_elixir_version(mut self, version: Version) -> Self {
        self.minimum_supported_elixir_version = Some(version);
        self
    }

    pub fn with_toolchain_version(mut self, version: Version) -> Self {
        self.toolchain_version = version;
        self
    }

    /// Set the minimum supported version from text such as `"1.15"` or `"1.15.2"`
    pub fn with_minimum_version_str(self, version: &str) -> Result<Self> {
        Ok(self.with_minimum_supported_elixir_version(parse_version(version)?))
    }

    /// Version every version-gated rewrite is checked against
    pub fn elixir_version(&self) -> &Version {
        self.minimum_supported_elixir_version
            .as_ref()
            .unwrap_or(&self.toolchain_version)
    }

    /// Whether an API introduced in `since` can be relied on
    pub fn supports(&self, since: &Version) -> bool {
        self.elixir_version() >= since
    }

    /// Whether alias lifting must not introduce `short_name`
    pub fn is_lifting_excluded(&self, short_name: &str) -> bool {
        STDLIB_MODULES.contains(short_name) || self.alias_lifting_exclude.contains(short_name)
    }

    /// Check that every configured value is usable
    pub fn validate(&self) -> Result<()> {
        for name in &self.alias_lifting_exclude {
            if name.is_empty() || name.contains('.') {
                return Err(StylerError::config_error(format!(
                    "aliasLiftingExclude entries must be single module segments, got '{name}'"
                )));
            }
        }
        Ok(())
    }

    /// Return to the default configuration
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// JSON schema describing the configuration
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(Config)).unwrap_or_default()
    }
}

/// Parse a version, accepting the two-component `major.minor` form
pub fn parse_version(text: &str) -> Result<Version> {
    let text = text.trim();
    let version = match text.split('.').count() {
        2 => Version::parse(&format!("{text}.0"))?,
        _ => Version::parse(text)?,
    };
    Ok(version)
}
