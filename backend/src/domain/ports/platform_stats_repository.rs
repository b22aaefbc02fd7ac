//! Port for cross-table platform statistics.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{PlatformStats, ReportWindow, ReportsOverview};

use super::define_port_error;

define_port_error! {
    /// Errors raised by statistics adapters.
    pub enum PlatformStatsRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "stats repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "stats repository query failed: {message}",
    }
}

/// Port computing the admin dashboard counters and reports.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlatformStatsRepository: Send + Sync {
    /// Counters over all data, revenue since `revenue_since`, and the
    /// `recent_limit` newest bookings and orders. `days` is left at zero.
    async fn snapshot(
        &self,
        revenue_since: DateTime<Utc>,
        recent_limit: usize,
    ) -> Result<PlatformStats, PlatformStatsRepositoryError>;

    /// Orders by day and the seller and product rankings for `window`, plus
    /// booking counts per status. Rankings keep `top_limit` entries.
    async fn reports(
        &self,
        window: ReportWindow,
        top_limit: usize,
    ) -> Result<ReportsOverview, PlatformStatsRepositoryError>;
}
