//! Builders wiring domain services to their in-memory adapters.

use std::sync::Arc;

use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultClock;
use tracing::{info, warn};

use biblioteka::domain::{AccountService, CatalogService, Username};
use biblioteka::inbound::http::session_config::BuildMode;
use biblioteka::inbound::http::state::HttpState;
use biblioteka::outbound::memory::{
    InMemoryCatalogStore, InMemoryLoanRepository, InMemoryUserRepository,
};
use biblioteka::outbound::security::Argon2PasswordHasher;

use super::ServerSettings;

/// Password used for the bootstrap admin in debug builds when none is set.
const DEBUG_ADMIN_PASSWORD: &str = "admin";

type Accounts = AccountService<InMemoryUserRepository, Argon2PasswordHasher>;
type Catalog = CatalogService<InMemoryCatalogStore, InMemoryLoanRepository>;

/// Services shared by every worker.
pub struct Services {
    accounts: Arc<Accounts>,
    catalog: Arc<Catalog>,
}

impl Services {
    /// Build services over empty in-memory stores.
    ///
    /// # Errors
    /// Returns an error when the store timeout setting is unusable.
    pub fn in_memory(settings: &ServerSettings) -> Result<Self> {
        let store_timeout = settings
            .store_timeout()
            .wrap_err("invalid store timeout")?;
        let accounts = Arc::new(AccountService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(Argon2PasswordHasher::default()),
        ));
        let catalog = Arc::new(
            CatalogService::new(
                Arc::new(InMemoryCatalogStore::new()),
                Arc::new(InMemoryLoanRepository::new()),
                Arc::new(DefaultClock),
            )
            .with_policy(settings.policy())
            .with_store_timeout(store_timeout),
        );
        info!(
            store_timeout_ms = u64::try_from(store_timeout.as_millis()).unwrap_or(u64::MAX),
            admin_reserve_override = settings.policy().admin_reserve_override,
            admin_return_override = settings.policy().admin_return_override,
            "catalogue services ready"
        );
        Ok(Self { accounts, catalog })
    }

    /// Ensure the configured admin account exists.
    ///
    /// Release builds refuse to start without an explicit admin password.
    ///
    /// # Errors
    /// Returns an error for an invalid username, a missing release password,
    /// or a failed registration.
    pub async fn bootstrap_admin(&self, settings: &ServerSettings, mode: BuildMode) -> Result<()> {
        let username = Username::new(settings.admin_username())
            .wrap_err("invalid admin username")?;
        let password = match (settings.admin_password.as_deref(), mode) {
            (Some(password), _) => password,
            (None, BuildMode::Debug) => {
                warn!(%username, "using default admin password (dev only)");
                DEBUG_ADMIN_PASSWORD
            }
            (None, BuildMode::Release) => {
                return Err(eyre!(
                    "BIBLIOTEKA_ADMIN_PASSWORD must be set in release builds"
                ));
            }
        };
        self.accounts
            .ensure_admin(&username, password)
            .await
            .map_err(|err| eyre!("failed to bootstrap admin account: {err}"))?;
        Ok(())
    }

    /// Handler state over these services.
    pub fn http_state(&self) -> HttpState {
        HttpState::from_services(self.accounts.clone(), self.catalog.clone())
    }
}
