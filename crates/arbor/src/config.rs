//! Filter configuration loaded from TOML or JSON.
//!
//! # Example
//!
//! ```toml
//! empty_groups = "hide"
//! caching = true
//!
//! [text]
//! pattern = "sh0*"
//! syntax = "wildcard"
//! case_sensitive = false
//! ```
//!
//! ```no_run
//! use arbor::config::FilterConfig;
//!
//! let config = FilterConfig::load("filter.toml")?;
//! let mut resolver = config.build_resolver::<String>();
//! resolver.set_filter(config.text_filter()?);
//! # Ok::<(), arbor::Error>(())
//! ```

use std::path::Path;

use arbor_core::logging::targets;
use arbor_core::{EmptyGroupPolicy, VisibilityResolver};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::{CaseSensitivity, PatternSyntax, TextFilter};

/// Serialized form of [`EmptyGroupPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyGroups {
    /// [`EmptyGroupPolicy::ShowEmptyGroups`].
    Show,
    /// [`EmptyGroupPolicy::HideEmptyGroups`].
    Hide,
}

impl From<EmptyGroups> for EmptyGroupPolicy {
    fn from(value: EmptyGroups) -> Self {
        match value {
            EmptyGroups::Show => EmptyGroupPolicy::ShowEmptyGroups,
            EmptyGroups::Hide => EmptyGroupPolicy::HideEmptyGroups,
        }
    }
}

impl From<EmptyGroupPolicy> for EmptyGroups {
    fn from(value: EmptyGroupPolicy) -> Self {
        match value {
            EmptyGroupPolicy::ShowEmptyGroups => EmptyGroups::Show,
            EmptyGroupPolicy::HideEmptyGroups => EmptyGroups::Hide,
        }
    }
}

/// The `[text]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Initial filter text. Empty accepts everything.
    pub pattern: String,
    /// How `pattern` is interpreted.
    pub syntax: PatternSyntax,
    /// Whether matching respects letter case.
    pub case_sensitive: bool,
}

/// The supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format.
    Json,
    /// TOML format.
    Toml,
}

impl ConfigFormat {
    /// Picks the format from a file extension (`.json`, `.toml`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        if extension.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else if extension.eq_ignore_ascii_case("toml") {
            Some(Self::Toml)
        } else {
            None
        }
    }
}

/// Settings for a filtered view.
///
/// `empty_groups` has no default and must always be given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Whether directly matching groups with no matching descendants show.
    pub empty_groups: EmptyGroups,
    /// Whether visibility results are cached.
    #[serde(default = "default_caching")]
    pub caching: bool,
    /// Text filter settings.
    #[serde(default)]
    pub text: TextConfig,
}

fn default_caching() -> bool {
    true
}

impl FilterConfig {
    /// Creates a configuration with the given policy and defaults elsewhere.
    pub fn new(policy: EmptyGroupPolicy) -> Self {
        Self {
            empty_groups: policy.into(),
            caching: default_caching(),
            text: TextConfig::default(),
        }
    }

    /// Loads a configuration, picking the format from the file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            Error::config(format!(
                "unsupported config file extension: '{}'",
                path.display()
            ))
        })?;
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config = Self::parse(&content, format)?;
        tracing::debug!(target: targets::FILTER, path = %path.display(), ?format, "loaded filter config");
        Ok(config)
    }

    /// Parses a configuration from text in the given format.
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        match format {
            ConfigFormat::Json => Self::from_json_str(content),
            ConfigFormat::Toml => Self::from_toml_str(content),
        }
    }

    /// Parses a JSON configuration.
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Parses a TOML configuration.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The configured empty-group policy.
    pub fn policy(&self) -> EmptyGroupPolicy {
        self.empty_groups.into()
    }

    /// The configured case sensitivity.
    pub fn case_sensitivity(&self) -> CaseSensitivity {
        CaseSensitivity::from_flag(self.text.case_sensitive)
    }

    /// Builds a resolver with the configured policy and caching mode.
    pub fn build_resolver<T: 'static>(&self) -> VisibilityResolver<T> {
        let mut resolver = VisibilityResolver::new(self.policy());
        if !self.caching {
            resolver.enable_caching(false);
        }
        resolver
    }

    /// Compiles the configured text filter.
    pub fn text_filter(&self) -> Result<TextFilter> {
        TextFilter::new(
            self.text.pattern.clone(),
            self.text.syntax,
            self.case_sensitivity(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_defaults() {
        let config = FilterConfig::from_toml_str("empty_groups = \"hide\"\n").unwrap();
        assert_eq!(config.policy(), EmptyGroupPolicy::HideEmptyGroups);
        assert!(config.caching);
        assert_eq!(config.text, TextConfig::default());
        assert_eq!(config.text.syntax, PatternSyntax::FixedString);
        assert_eq!(config.case_sensitivity(), CaseSensitivity::CaseInsensitive);
    }

    #[test]
    fn test_toml_full() {
        let toml = r#"
            empty_groups = "show"
            caching = false

            [text]
            pattern = "sh0?0"
            syntax = "wildcard"
            case_sensitive = true
        "#;
        let config = FilterConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.policy(), EmptyGroupPolicy::ShowEmptyGroups);
        assert!(!config.caching);

        let resolver = config.build_resolver::<String>();
        assert!(!resolver.is_caching_enabled());
        assert_eq!(resolver.policy(), EmptyGroupPolicy::ShowEmptyGroups);

        let filter = config.text_filter().unwrap();
        assert!(filter.is_match("sh010"));
        assert!(!filter.is_match("SH010"));
    }

    #[test]
    fn test_empty_groups_is_required() {
        assert!(matches!(
            FilterConfig::from_toml_str("caching = true"),
            Err(Error::Toml(_))
        ));
        assert!(matches!(
            FilterConfig::from_json_str("{}"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_json() {
        let config = FilterConfig::from_json_str(
            r#"{ "empty_groups": "hide", "text": { "pattern": "(", "syntax": "regex" } }"#,
        )
        .unwrap();
        assert!(matches!(
            config.text_filter(),
            Err(Error::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("a/filter.TOML")),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("filter.json")),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_path(Path::new("filter.ini")), None);
        assert_eq!(ConfigFormat::from_path(Path::new("filter")), None);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = FilterConfig::new(EmptyGroupPolicy::HideEmptyGroups);
        config.text.pattern = "hero".to_string();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(FilterConfig::from_toml_str(&text).unwrap(), config);
    }
}
