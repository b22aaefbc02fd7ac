//! Notification inboxes, platform settings, and admin statistics.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::{
    NotificationRepository, NotificationRepositoryError, PlatformStatsRepository,
    PlatformStatsRepositoryError, SettingsRepository, SettingsRepositoryError,
};
use crate::domain::{
    Booking, FeedKey, FeedQuery, Notification, Order, PlatformStats, ReportOrder, ReportWindow,
    ReportsOverview, SettingKey, UserId, VetStatus,
};

use super::InMemoryStore;

#[async_trait]
impl NotificationRepository for InMemoryStore {
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError> {
        let mut state = self.state.write().await;
        state.notifications.push(notification.clone());
        Ok(())
    }

    async fn insert_once(&self, notification: &Notification) -> Result<bool, NotificationRepositoryError> {
        let mut state = self.state.write().await;
        let seen = state.notifications.iter().any(|n| n.duplicates(notification));
        if !seen {
            state.notifications.push(notification.clone());
        }
        Ok(!seen)
    }

    async fn feed(
        &self,
        user_id: &UserId,
        query: FeedQuery,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        let state = self.state.read().await;
        let mut matching: Vec<Notification> = state
            .notifications
            .iter()
            .filter(|n| n.user_id == *user_id && (!query.unread_only || !n.read))
            .filter(|n| query.before.is_none_or(|before| FeedKey::of(n) < before))
            .cloned()
            .collect();
        matching.sort_by_key(|n| std::cmp::Reverse(FeedKey::of(n)));
        matching.truncate(query.limit as usize);
        Ok(matching)
    }

    async fn unread_count(&self, user_id: &UserId) -> Result<u64, NotificationRepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .notifications
            .iter()
            .filter(|n| n.user_id == *user_id && !n.read)
            .count() as u64)
    }

    async fn mark_read(&self, user_id: &UserId, id: &Uuid) -> Result<bool, NotificationRepositoryError> {
        let mut state = self.state.write().await;
        let owned = state
            .notifications
            .iter_mut()
            .find(|n| n.id == *id && n.user_id == *user_id);
        Ok(match owned {
            Some(notification) => {
                notification.read = true;
                true
            }
            None => false,
        })
    }

    async fn mark_all_read(&self, user_id: &UserId) -> Result<u64, NotificationRepositoryError> {
        let mut state = self.state.write().await;
        let mut updated = 0;
        for notification in state
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == *user_id && !n.read)
        {
            notification.read = true;
            updated += 1;
        }
        Ok(updated)
    }
}

#[async_trait]
impl SettingsRepository for InMemoryStore {
    async fn load(&self) -> Result<Vec<(String, String)>, SettingsRepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .settings
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    async fn save(&self, values: &[(SettingKey, String)]) -> Result<(), SettingsRepositoryError> {
        let mut state = self.state.write().await;
        for (key, value) in values {
            state.settings.insert(key.as_str().to_owned(), value.clone());
        }
        Ok(())
    }
}

fn most_recent<T: Clone>(
    items: impl Iterator<Item = T>,
    created_at: impl Fn(&T) -> DateTime<Utc>,
    limit: usize,
) -> Vec<T> {
    let mut items: Vec<T> = items.collect();
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
    items.truncate(limit);
    items
}

#[async_trait]
impl PlatformStatsRepository for InMemoryStore {
    async fn snapshot(
        &self,
        revenue_since: DateTime<Utc>,
        recent_limit: usize,
    ) -> Result<PlatformStats, PlatformStatsRepositoryError> {
        let state = self.state.read().await;
        let users = state.users.values().map(|stored| &stored.user);
        let revenue = state
            .orders
            .values()
            .filter(|order| order.status.counts_as_revenue() && order.created_at >= revenue_since)
            .fold(0_i64, |sum, order| sum.saturating_add(order.total_price));
        Ok(PlatformStats {
            days: 0,
            total_users: users.clone().count() as u64,
            active_users: users.filter(|user| user.is_active).count() as u64,
            total_vets: state.vets.len() as u64,
            pending_vets: state
                .vets
                .values()
                .filter(|vet| vet.status == VetStatus::Pending)
                .count() as u64,
            total_products: state.products.len() as u64,
            flagged_products: state.products.values().filter(|p| p.is_flagged).count() as u64,
            total_bookings: state.bookings.len() as u64,
            total_orders: state.orders.len() as u64,
            revenue,
            recent_bookings: most_recent(
                state.bookings.values().cloned(),
                |booking: &Booking| booking.created_at,
                recent_limit,
            ),
            recent_orders: most_recent(
                state.orders.values().cloned(),
                |order: &Order| order.created_at,
                recent_limit,
            ),
        })
    }

    async fn reports(
        &self,
        window: ReportWindow,
        top_limit: usize,
    ) -> Result<ReportsOverview, PlatformStatsRepositoryError> {
        let state = self.state.read().await;
        let orders: Vec<ReportOrder> = state.orders.values().map(ReportOrder::from).collect();
        Ok(ReportsOverview::tally(
            window,
            &orders,
            state.bookings.values().map(|booking| (booking.status, 1)),
            |id| state.users.get(id).map(|stored| stored.user.name.as_ref().to_owned()),
            |id| state.products.get(id).map(|product| product.title.clone()),
            top_limit,
        ))
    }
}
