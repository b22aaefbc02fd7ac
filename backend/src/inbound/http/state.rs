//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use crate::domain::ports::{
    AccountsCommand, AccountsQuery, AdminCommand, AdminQuery, AnimalsCommand, AnimalsQuery,
    BookingsCommand, BookingsQuery, CasesCommand, CasesQuery, MarketplaceQuery,
    NotificationSink, NotificationsCommand, NotificationsQuery, OrdersCommand, OrdersQuery,
    PasswordResetNotifier, RepositoryProvider, SellerCommand, SellerQuery, VetsCommand,
    VetsQuery,
};
use crate::domain::{
    AccountsService, AdminPorts, AdminService, AnimalsService, BookingsService, CasesService,
    MarketplaceService, NotificationDispatcher, NotificationsService, OrdersService, ResetPolicy,
    VetsService,
};
use crate::outbound::password_reset_log::LoggingPasswordResetNotifier;

/// Cross-cutting collaborators shared by every service.
#[derive(Clone)]
pub struct ServiceOptions {
    pub clock: Arc<dyn Clock>,
    pub reset_policy: ResetPolicy,
    pub reset_notifier: Arc<dyn PasswordResetNotifier>,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            clock: Arc::new(DefaultClock),
            reset_policy: ResetPolicy::default(),
            reset_notifier: Arc::new(LoggingPasswordResetNotifier),
        }
    }
}

/// Dependency bundle for HTTP handlers.
///
/// Fields are public so tests can swap a single port for a mock.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountsCommand>,
    pub accounts_query: Arc<dyn AccountsQuery>,
    pub animals: Arc<dyn AnimalsCommand>,
    pub animals_query: Arc<dyn AnimalsQuery>,
    pub cases: Arc<dyn CasesCommand>,
    pub cases_query: Arc<dyn CasesQuery>,
    pub vets: Arc<dyn VetsCommand>,
    pub vets_query: Arc<dyn VetsQuery>,
    pub bookings: Arc<dyn BookingsCommand>,
    pub bookings_query: Arc<dyn BookingsQuery>,
    pub marketplace: Arc<dyn MarketplaceQuery>,
    pub seller: Arc<dyn SellerCommand>,
    pub seller_query: Arc<dyn SellerQuery>,
    pub orders: Arc<dyn OrdersCommand>,
    pub orders_query: Arc<dyn OrdersQuery>,
    pub notifications: Arc<dyn NotificationsCommand>,
    pub notifications_query: Arc<dyn NotificationsQuery>,
    pub admin: Arc<dyn AdminCommand>,
    pub admin_query: Arc<dyn AdminQuery>,
}

impl HttpState {
    /// Wire every domain service on top of the adapters supplied by `repos`.
    ///
    /// # Examples
    /// ```
    /// use anilink::inbound::http::state::{HttpState, ServiceOptions};
    /// use anilink::outbound::memory::InMemoryStore;
    ///
    /// let state = HttpState::from_repositories(&InMemoryStore::new(), ServiceOptions::default());
    /// let _accounts = state.accounts.clone();
    /// ```
    pub fn from_repositories<R: RepositoryProvider>(repos: &R, options: ServiceOptions) -> Self {
        let ServiceOptions {
            clock,
            reset_policy,
            reset_notifier,
        } = options;
        let sink: Arc<dyn NotificationSink> = Arc::new(NotificationDispatcher::new(
            repos.notifications(),
            repos.settings(),
            clock.clone(),
        ));

        let accounts = Arc::new(AccountsService::new(
            repos.users(),
            repos.resets(),
            reset_notifier,
            clock.clone(),
            reset_policy,
        ));
        let animals = Arc::new(AnimalsService::new(repos.animals(), clock.clone()));
        let cases = Arc::new(CasesService::new(
            repos.cases(),
            repos.animals(),
            repos.vets(),
            sink.clone(),
            clock.clone(),
        ));
        let vets = Arc::new(VetsService::new(repos.vets(), repos.users(), clock.clone()));
        let bookings = Arc::new(BookingsService::new(
            repos.bookings(),
            repos.vets(),
            repos.cases(),
            sink.clone(),
            clock.clone(),
        ));
        let marketplace = Arc::new(MarketplaceService::new(
            repos.products(),
            repos.sellers(),
            repos.orders(),
            clock.clone(),
        ));
        let orders = Arc::new(OrdersService::new(
            repos.orders(),
            repos.products(),
            sink.clone(),
            clock.clone(),
        ));
        let notifications = Arc::new(NotificationsService::new(repos.notifications()));
        let admin = Arc::new(AdminService::new(
            repos.users(),
            repos.vets(),
            repos.products(),
            AdminPorts {
                settings: repos.settings(),
                stats: repos.stats(),
                notifier: sink,
                clock,
            },
        ));

        Self {
            accounts: accounts.clone(),
            accounts_query: accounts,
            animals: animals.clone(),
            animals_query: animals,
            cases: cases.clone(),
            cases_query: cases,
            vets: vets.clone(),
            vets_query: vets,
            bookings: bookings.clone(),
            bookings_query: bookings,
            marketplace: marketplace.clone(),
            seller: marketplace.clone(),
            seller_query: marketplace,
            orders: orders.clone(),
            orders_query: orders,
            notifications: notifications.clone(),
            notifications_query: notifications,
            admin: admin.clone(),
            admin_query: admin,
        }
    }
}
