//! Account and password reset storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageParams;

use crate::domain::ports::{
    PasswordResetRecord, PasswordResetRepository, PasswordResetRepositoryError, StoredUser,
    UserRepository, UserRepositoryError,
};
use crate::domain::{
    EmailAddress, PasswordDigest, PhoneNumber, ResetTokenDigest, User, UserAdminFilter, UserId,
    UserProfile,
};

use super::{InMemoryStore, MemoryState, paged};

fn check_unique(
    state: &MemoryState,
    id: UserId,
    email: &EmailAddress,
    phone: Option<&PhoneNumber>,
) -> Result<(), UserRepositoryError> {
    let others = state.users.values().filter(|stored| stored.user.id != id);
    for other in others {
        if other.user.email == *email {
            return Err(UserRepositoryError::duplicate_email());
        }
        if phone.is_some() && other.user.phone.as_ref() == phone {
            return Err(UserRepositoryError::duplicate_phone());
        }
    }
    Ok(())
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: &StoredUser, profile: &UserProfile) -> Result<(), UserRepositoryError> {
        let mut state = self.state.write().await;
        check_unique(&state, user.user.id, &user.user.email, user.user.phone.as_ref())?;
        state.users.insert(user.user.id, user.clone());
        state.profiles.insert(user.user.id, profile.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let state = self.state.read().await;
        Ok(state.users.get(id).map(|stored| stored.user.clone()))
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<StoredUser>, UserRepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|stored| stored.user.email == *email)
            .cloned())
    }

    async fn update_account(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut state = self.state.write().await;
        check_unique(&state, user.id, &user.email, user.phone.as_ref())?;
        let stored = state
            .users
            .get_mut(&user.id)
            .ok_or_else(|| UserRepositoryError::query(format!("user {} does not exist", user.id)))?;
        stored.user = user.clone();
        Ok(())
    }

    async fn find_profile(&self, id: &UserId) -> Result<UserProfile, UserRepositoryError> {
        let state = self.state.read().await;
        Ok(state.profiles.get(id).cloned().unwrap_or_default())
    }

    async fn save_profile(&self, id: &UserId, profile: &UserProfile) -> Result<(), UserRepositoryError> {
        let mut state = self.state.write().await;
        state.profiles.insert(*id, profile.clone());
        Ok(())
    }

    async fn update_password(&self, id: &UserId, password: &PasswordDigest) -> Result<(), UserRepositoryError> {
        let mut state = self.state.write().await;
        let stored = state
            .users
            .get_mut(id)
            .ok_or_else(|| UserRepositoryError::query(format!("user {id} does not exist")))?;
        stored.password = password.clone();
        Ok(())
    }

    async fn list(
        &self,
        filter: &UserAdminFilter,
        page: PageParams,
    ) -> Result<(Vec<User>, u64), UserRepositoryError> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state
            .users
            .values()
            .map(|stored| &stored.user)
            .filter(|user| filter.matches(user))
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paged(users, page))
    }
}

#[async_trait]
impl PasswordResetRepository for InMemoryStore {
    async fn insert(&self, record: &PasswordResetRecord) -> Result<(), PasswordResetRepositoryError> {
        let mut state = self.state.write().await;
        state.resets.push(record.clone());
        Ok(())
    }

    async fn latest_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<PasswordResetRecord>, PasswordResetRepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .resets
            .iter()
            .filter(|record| record.user_id == *user_id)
            .max_by_key(|record| record.created_at)
            .cloned())
    }

    async fn find_by_digest(
        &self,
        digest: &ResetTokenDigest,
    ) -> Result<Option<PasswordResetRecord>, PasswordResetRepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .resets
            .iter()
            .find(|record| record.digest == *digest)
            .cloned())
    }

    async fn mark_used(
        &self,
        digest: &ResetTokenDigest,
        used_at: DateTime<Utc>,
    ) -> Result<bool, PasswordResetRepositoryError> {
        let mut state = self.state.write().await;
        let unused = state
            .resets
            .iter_mut()
            .find(|record| record.digest == *digest && record.used_at.is_none());
        Ok(match unused {
            Some(record) => {
                record.used_at = Some(used_at);
                true
            }
            None => false,
        })
    }
}
