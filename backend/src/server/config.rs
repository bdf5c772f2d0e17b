//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;

use biblioteka::domain::{DEFAULT_STORE_TIMEOUT, LifecyclePolicy};
use biblioteka::inbound::http::session_config::SessionSettings;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Deployment settings loaded via OrthoConfig from `BIBLIOTEKA_*`
/// environment variables, configuration files, or CLI flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BIBLIOTEKA")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Deadline for a single catalogue store call, in milliseconds.
    pub store_timeout_ms: Option<u64>,
    /// Username of the bootstrap admin account.
    pub admin_username: Option<String>,
    /// Password for the bootstrap admin. Required in release builds.
    pub admin_password: Option<String>,
    /// Let admins reserve a book someone else holds.
    pub admin_reserve_override: Option<bool>,
    /// Let admins return a book on behalf of its holder.
    pub admin_return_override: Option<bool>,
}

/// Raised when a setting is present but unusable.
#[derive(Debug, thiserror::Error)]
pub enum ServerSettingsError {
    #[error("invalid bind address {value:?}: {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("store timeout must be greater than zero")]
    ZeroTimeout,
}

impl ServerSettings {
    /// Parse the configured bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, ServerSettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.trim()
            .parse()
            .map_err(|source| ServerSettingsError::BindAddr {
                value: raw.to_owned(),
                source,
            })
    }

    /// Per-call store deadline, falling back to the domain default.
    pub fn store_timeout(&self) -> Result<Duration, ServerSettingsError> {
        match self.store_timeout_ms {
            Some(0) => Err(ServerSettingsError::ZeroTimeout),
            Some(ms) => Ok(Duration::from_millis(ms)),
            None => Ok(DEFAULT_STORE_TIMEOUT),
        }
    }

    /// Return the bootstrap admin username, falling back to `admin`.
    pub fn admin_username(&self) -> &str {
        self.admin_username
            .as_deref()
            .unwrap_or(DEFAULT_ADMIN_USERNAME)
    }

    /// Admin override policy. Unset flags keep the default behaviour.
    pub fn policy(&self) -> LifecyclePolicy {
        let defaults = LifecyclePolicy::default();
        LifecyclePolicy {
            admin_reserve_override: self
                .admin_reserve_override
                .unwrap_or(defaults.admin_reserve_override),
            admin_return_override: self
                .admin_return_override
                .unwrap_or(defaults.admin_return_override),
        }
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) session_ttl: Duration,
    pub(crate) bind_addr: SocketAddr,
}

impl ServerConfig {
    /// Construct a server configuration from resolved session settings.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        let SessionSettings {
            key,
            cookie_secure,
            same_site,
            ttl,
        } = session;
        Self {
            key,
            cookie_secure,
            same_site,
            session_ttl: ttl,
            bind_addr,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for server settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "BIBLIOTEKA_BIND_ADDR",
        "BIBLIOTEKA_STORE_TIMEOUT_MS",
        "BIBLIOTEKA_ADMIN_USERNAME",
        "BIBLIOTEKA_ADMIN_PASSWORD",
        "BIBLIOTEKA_ADMIN_RESERVE_OVERRIDE",
        "BIBLIOTEKA_ADMIN_RETURN_OVERRIDE",
    ];

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("biblioteka")])
            .expect("config should load")
    }

    fn cleared() -> [(&'static str, Option<String>); 6] {
        VARS.map(|name| (name, None))
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(cleared());

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("default parses"),
            SocketAddr::from(([0, 0, 0, 0], 8080))
        );
        assert_eq!(
            settings.store_timeout().expect("default timeout"),
            DEFAULT_STORE_TIMEOUT
        );
        assert_eq!(settings.admin_username(), "admin");
        assert!(settings.admin_password.is_none());
        assert_eq!(settings.policy(), LifecyclePolicy::default());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let mut vars = cleared();
        vars[0].1 = Some("127.0.0.1:9000".to_owned());
        vars[1].1 = Some("250".to_owned());
        vars[2].1 = Some("librarian".to_owned());
        vars[3].1 = Some("s3cret".to_owned());
        vars[4].1 = Some("false".to_owned());
        vars[5].1 = Some("false".to_owned());
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("parses"),
            SocketAddr::from(([127, 0, 0, 1], 9000))
        );
        assert_eq!(
            settings.store_timeout().expect("timeout"),
            Duration::from_millis(250)
        );
        assert_eq!(settings.admin_username(), "librarian");
        assert_eq!(settings.admin_password.as_deref(), Some("s3cret"));
        assert_eq!(
            settings.policy(),
            LifecyclePolicy {
                admin_reserve_override: false,
                admin_return_override: false,
            }
        );
    }

    #[rstest]
    fn malformed_bind_addresses_are_reported() {
        let mut vars = cleared();
        vars[0].1 = Some("not-an-address".to_owned());
        let _guard = lock_env(vars);

        let err = load_from_empty_args()
            .bind_addr()
            .expect_err("address should be rejected");

        assert!(matches!(err, ServerSettingsError::BindAddr { .. }));
    }

    #[rstest]
    fn zero_timeouts_are_rejected() {
        let mut vars = cleared();
        vars[1].1 = Some("0".to_owned());
        let _guard = lock_env(vars);

        let err = load_from_empty_args()
            .store_timeout()
            .expect_err("zero is rejected");

        assert!(matches!(err, ServerSettingsError::ZeroTimeout));
    }
}
