//! Client configuration loaded via OrthoConfig.
//!
//! Timing fields carry loader defaults; the remaining fields are optional and
//! their accessors apply the documented defaults. Values come from
//! `REGISTRY_*` environment variables or a configuration file.

use std::ffi::OsString;
use std::time::Duration;

use ortho_config::OrthoConfig;
use pagination::{CATALOGUE_PAGE_SIZE, DEFAULT_PAGE_SIZE, PageRequest, PageRequestError};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_FALLBACK_LOOKUP_URL: &str = "https://viacep.com.br";
const DEFAULT_USER_AGENT: &str = concat!("registry-client/", env!("CARGO_PKG_VERSION"));

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// A URL setting does not parse.
    #[error("{field} is not a valid URL ({value}): {message}")]
    InvalidUrl {
        /// Setting name.
        field: &'static str,
        /// Offending value.
        value: String,
        /// Parser message.
        message: String,
    },
    /// A URL setting cannot carry path segments.
    #[error("{field} cannot be used as a base URL ({value})")]
    NotABase {
        /// Setting name.
        field: &'static str,
        /// Offending value.
        value: String,
    },
    /// The configuration sources could not be read or merged.
    #[error("failed to load client settings: {message}")]
    Load {
        /// Loader message.
        message: String,
    },
    /// A page size setting is out of range.
    #[error("{field} is invalid: {source}")]
    PageSize {
        /// Setting name.
        field: &'static str,
        /// Range violation.
        source: PageRequestError,
    },
}

/// Configuration values for the registry client.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REGISTRY")]
pub struct ClientSettings {
    /// Base URL of the record service, which also hosts the primary postal
    /// lookup.
    pub api_base_url: Option<String>,
    /// Base URL of the public fallback postal lookup provider.
    pub fallback_lookup_url: Option<String>,
    /// Per-request timeout for outbound HTTP calls, in milliseconds.
    #[ortho_config(default = 10_000)]
    pub request_timeout_ms: u64,
    /// Quiet period before a list search input settles, in milliseconds.
    #[ortho_config(default = 400)]
    pub debounce_ms: u64,
    /// Time a notice stays visible, in milliseconds.
    #[ortho_config(default = 5_000)]
    pub notice_ttl_ms: u64,
    /// Rows per list page.
    pub page_size: Option<u32>,
    /// Rows fetched for the association eligibility catalogue.
    pub catalogue_size: Option<u32>,
    /// User-agent header sent with every request.
    pub user_agent: Option<String>,
}

impl ClientSettings {
    /// Load settings from `REGISTRY_*` variables and configuration files.
    ///
    /// Command-line arguments are not consulted; they belong to the command
    /// parser.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Load`] when a source is malformed.
    pub fn load_from_env() -> Result<Self, SettingsError> {
        Self::load_from_iter([OsString::from("registry-client")]).map_err(|error| {
            SettingsError::Load {
                message: error.to_string(),
            }
        })
    }

    /// Record service base URL, defaulting to `http://localhost:8080/api`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the value is not a usable base URL.
    pub fn api_base_url(&self) -> Result<Url, SettingsError> {
        parse_base(
            "api_base_url",
            self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL),
        )
    }

    /// Fallback lookup base URL, defaulting to `https://viacep.com.br`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the value is not a usable base URL.
    pub fn fallback_lookup_url(&self) -> Result<Url, SettingsError> {
        parse_base(
            "fallback_lookup_url",
            self.fallback_lookup_url
                .as_deref()
                .unwrap_or(DEFAULT_FALLBACK_LOOKUP_URL),
        )
    }

    /// Outbound request timeout, 10 seconds unless configured.
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Search debounce window, 400 ms unless configured.
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Notice time to live, 5 seconds unless configured.
    pub const fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }

    /// First list page, ten rows unless configured.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::PageSize`] for an out-of-range size.
    pub fn page(&self) -> Result<PageRequest, SettingsError> {
        PageRequest::first(self.page_size.unwrap_or(DEFAULT_PAGE_SIZE))
            .map_err(|source| SettingsError::PageSize {
                field: "page_size",
                source,
            })
    }

    /// Eligibility catalogue request, one hundred rows unless configured.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::PageSize`] for an out-of-range size.
    pub fn catalogue(&self) -> Result<PageRequest, SettingsError> {
        PageRequest::first(self.catalogue_size.unwrap_or(CATALOGUE_PAGE_SIZE))
            .map_err(|source| SettingsError::PageSize {
                field: "catalogue_size",
                source,
            })
    }

    /// User-agent header value.
    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}

fn parse_base(field: &'static str, value: &str) -> Result<Url, SettingsError> {
    let url = Url::parse(value).map_err(|error| SettingsError::InvalidUrl {
        field,
        value: value.to_owned(),
        message: error.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(SettingsError::NotABase {
            field,
            value: value.to_owned(),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    //! Unit tests for client configuration parsing.

    use super::*;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "REGISTRY_API_BASE_URL",
        "REGISTRY_FALLBACK_LOOKUP_URL",
        "REGISTRY_REQUEST_TIMEOUT_MS",
        "REGISTRY_DEBOUNCE_MS",
        "REGISTRY_NOTICE_TTL_MS",
        "REGISTRY_PAGE_SIZE",
        "REGISTRY_CATALOGUE_SIZE",
        "REGISTRY_USER_AGENT",
    ];

    fn unset() -> ClientSettings {
        ClientSettings {
            api_base_url: None,
            fallback_lookup_url: None,
            request_timeout_ms: 10_000,
            debounce_ms: 400,
            notice_ttl_ms: 5_000,
            page_size: None,
            catalogue_size: None,
            user_agent: None,
        }
    }

    fn load_from_empty_args() -> ClientSettings {
        ClientSettings::load_from_env().expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();

        assert_eq!(
            settings.api_base_url().expect("default URL").as_str(),
            "http://localhost:8080/api"
        );
        assert_eq!(
            settings.fallback_lookup_url().expect("default URL").as_str(),
            "https://viacep.com.br/"
        );
        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
        assert_eq!(settings.debounce(), Duration::from_millis(400));
        assert_eq!(settings.notice_ttl(), Duration::from_millis(5000));
        assert_eq!(settings.page().expect("page").size(), 10);
        assert_eq!(settings.catalogue().expect("catalogue").size(), 100);
        assert!(settings.user_agent().starts_with("registry-client/"));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("REGISTRY_API_BASE_URL", Some("https://records.example/api".to_owned())),
            ("REGISTRY_FALLBACK_LOOKUP_URL", None),
            ("REGISTRY_REQUEST_TIMEOUT_MS", Some("2500".to_owned())),
            ("REGISTRY_DEBOUNCE_MS", Some("250".to_owned())),
            ("REGISTRY_NOTICE_TTL_MS", None),
            ("REGISTRY_PAGE_SIZE", Some("25".to_owned())),
            ("REGISTRY_CATALOGUE_SIZE", None),
            ("REGISTRY_USER_AGENT", Some("ops-console/2".to_owned())),
        ]);

        let settings = load_from_empty_args();

        assert_eq!(
            settings.api_base_url().expect("URL").as_str(),
            "https://records.example/api"
        );
        assert_eq!(settings.request_timeout(), Duration::from_millis(2500));
        assert_eq!(settings.debounce(), Duration::from_millis(250));
        assert_eq!(settings.page().expect("page").size(), 25);
        assert_eq!(settings.user_agent(), "ops-console/2");
    }

    #[rstest]
    #[case::not_a_url(Some("records"), "api_base_url is not a valid URL")]
    #[case::mailto(Some("mailto:ops@example.com"), "api_base_url cannot be used as a base URL")]
    fn rejects_unusable_base_urls(#[case] value: Option<&str>, #[case] prefix: &str) {
        let settings = ClientSettings {
            api_base_url: value.map(str::to_owned),
            ..unset()
        };
        let error = settings.api_base_url().expect_err("URL must be rejected");
        assert!(error.to_string().starts_with(prefix), "{error}");
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let settings = ClientSettings {
            page_size: Some(0),
            ..unset()
        };
        assert!(matches!(
            settings.page(),
            Err(SettingsError::PageSize {
                field: "page_size",
                ..
            })
        ));
    }
}
