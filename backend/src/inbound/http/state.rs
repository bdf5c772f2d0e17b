//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data` and only see domain
//! ports, so they stay testable without real adapters.

use std::sync::Arc;

use crate::domain::ports::{
    BookLifecycleCommand, CatalogAdminCommand, CatalogQuery, LoginService, RegistrationService,
    SessionProvider,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn RegistrationService>,
    pub sessions: Arc<dyn SessionProvider>,
    pub catalog: Arc<dyn CatalogQuery>,
    pub lifecycle: Arc<dyn BookLifecycleCommand>,
    pub admin: Arc<dyn CatalogAdminCommand>,
}

impl HttpState {
    /// Wire state from one account service and one catalogue service.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use biblioteka::domain::{AccountService, CatalogService};
    /// use biblioteka::inbound::http::state::HttpState;
    /// use biblioteka::outbound::memory::{
    ///     InMemoryCatalogStore, InMemoryLoanRepository, InMemoryUserRepository,
    /// };
    /// use biblioteka::outbound::security::Argon2PasswordHasher;
    ///
    /// let accounts = Arc::new(AccountService::new(
    ///     Arc::new(InMemoryUserRepository::new()),
    ///     Arc::new(Argon2PasswordHasher::default()),
    /// ));
    /// let catalog = Arc::new(CatalogService::new(
    ///     Arc::new(InMemoryCatalogStore::new()),
    ///     Arc::new(InMemoryLoanRepository::new()),
    ///     Arc::new(mockable::DefaultClock),
    /// ));
    /// let state = HttpState::from_services(accounts, catalog);
    /// let _lifecycle = state.lifecycle.clone();
    /// ```
    pub fn from_services<A, C>(accounts: Arc<A>, catalog: Arc<C>) -> Self
    where
        A: LoginService + RegistrationService + SessionProvider + 'static,
        C: CatalogQuery + BookLifecycleCommand + CatalogAdminCommand + 'static,
    {
        Self {
            login: accounts.clone(),
            registration: accounts.clone(),
            sessions: accounts,
            catalog: catalog.clone(),
            lifecycle: catalog.clone(),
            admin: catalog,
        }
    }
}
