//! Engine configuration.
//!
//! Layered with figment: built-in defaults, then an optional YAML file, then
//! `HYPERKIT_`-prefixed environment variables (`__` separates nested keys,
//! e.g. `HYPERKIT_PAGINATION__MAX_ITEMS_PER_PAGE=50`).

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const ENV_PREFIX: &str = "HYPERKIT_";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct HyperkitConfig {
    /// Media type used when negotiation yields no registered mapper.
    pub default_media_type: String,
    pub pagination: PaginationConfig,
    pub embedding: EmbeddingConfig,
    /// Whether writers render documents with indentation.
    pub pretty_print: bool,
}

impl Default for HyperkitConfig {
    fn default() -> Self {
        Self {
            default_media_type: default_media_type(),
            pagination: PaginationConfig::default(),
            embedding: EmbeddingConfig::default(),
            pretty_print: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct PaginationConfig {
    pub default_items_per_page: u64,
    pub max_items_per_page: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_items_per_page: 30,
            max_items_per_page: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct EmbeddingConfig {
    /// Deepest embedded path writers will inline. `None` leaves depth bounded
    /// only by the client's `embedded` directive.
    pub max_depth: Option<usize>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self { max_depth: Some(8) }
    }
}

fn default_media_type() -> String {
    "application/hal+json".to_owned()
}

impl HyperkitConfig {
    /// Load configuration from defaults, an optional YAML file and the environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when a layer cannot be parsed or holds
    /// unknown keys, and the errors of [`HyperkitConfig::validate`] for values
    /// that parse but make no sense.
    pub fn load(yaml: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = yaml {
            figment = figment.merge(Yaml::file(path));
        }
        let config: Self = figment.merge(Env::prefixed(ENV_PREFIX).split("__")).extract()?;
        config.validate()?;

        tracing::debug!(
            default_media_type = %config.default_media_type,
            max_items_per_page = config.pagination.max_items_per_page,
            "hyperkit configuration loaded"
        );
        Ok(config)
    }

    /// # Errors
    /// Returns [`ConfigError::InvalidMediaType`] if `default_media_type` is not a media type
    /// and [`ConfigError::InvalidPagination`] if a page size is zero or the default
    /// exceeds the maximum.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_media_type.parse::<mime::Mime>().is_err() {
            return Err(ConfigError::InvalidMediaType {
                media_type: self.default_media_type.clone(),
            });
        }
        self.pagination.validate()
    }
}

impl PaginationConfig {
    /// # Errors
    /// Returns [`ConfigError::InvalidPagination`] for a zero bound or a default above the maximum.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Self {
            default_items_per_page,
            max_items_per_page,
        } = *self;
        if default_items_per_page == 0
            || max_items_per_page == 0
            || default_items_per_page > max_items_per_page
        {
            return Err(ConfigError::InvalidPagination {
                default_items_per_page,
                max_items_per_page,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_are_used_without_sources() {
        Jail::expect_with(|_jail| {
            let config = HyperkitConfig::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config, HyperkitConfig::default());
            assert_eq!(config.default_media_type, "application/hal+json");
            assert_eq!(config.pagination.default_items_per_page, 30);
            assert_eq!(config.pagination.max_items_per_page, 100);
            assert_eq!(config.embedding.max_depth, Some(8));
            assert!(config.pretty_print);
            Ok(())
        });
    }

    #[test]
    fn yaml_file_then_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "hyperkit.yaml",
                r"
default_media_type: application/json
pagination:
  max_items_per_page: 20
",
            )?;
            jail.set_env("HYPERKIT_PAGINATION__DEFAULT_ITEMS_PER_PAGE", "5");
            jail.set_env("HYPERKIT_PRETTY_PRINT", "false");

            let config = HyperkitConfig::load(Some(Path::new("hyperkit.yaml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.default_media_type, "application/json");
            assert_eq!(config.pagination.max_items_per_page, 20);
            assert_eq!(config.pagination.default_items_per_page, 5);
            assert!(!config.pretty_print);
            assert_eq!(config.embedding.max_depth, Some(8));
            Ok(())
        });
    }

    #[test]
    fn unknown_keys_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("hyperkit.yaml", "pagination:\n  page_size: 10\n")?;

            let err = HyperkitConfig::load(Some(Path::new("hyperkit.yaml"))).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)));
            Ok(())
        });
    }

    #[test]
    fn zero_or_inverted_page_sizes_are_rejected() {
        for (default_items_per_page, max_items_per_page) in [(200, 50), (0, 0), (0, 10), (10, 0)] {
            let config = HyperkitConfig {
                pagination: PaginationConfig {
                    default_items_per_page,
                    max_items_per_page,
                },
                ..HyperkitConfig::default()
            };

            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidPagination { .. })
            ));
        }

        let equal = PaginationConfig {
            default_items_per_page: 50,
            max_items_per_page: 50,
        };
        assert!(equal.validate().is_ok());
    }

    #[test]
    fn inverted_page_sizes_from_env_fail_loading() {
        Jail::expect_with(|jail| {
            jail.set_env("HYPERKIT_PAGINATION__DEFAULT_ITEMS_PER_PAGE", "200");
            jail.set_env("HYPERKIT_PAGINATION__MAX_ITEMS_PER_PAGE", "50");

            let err = HyperkitConfig::load(None).unwrap_err();
            assert!(matches!(
                err,
                ConfigError::InvalidPagination {
                    default_items_per_page: 200,
                    max_items_per_page: 50,
                }
            ));
            Ok(())
        });
    }

    #[test]
    fn invalid_default_media_type_is_rejected() {
        let config = HyperkitConfig {
            default_media_type: "not a media type".to_owned(),
            ..HyperkitConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMediaType { .. })
        ));
    }
}
