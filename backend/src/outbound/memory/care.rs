//! Animals, cases, the vet directory, and bookings.

use async_trait::async_trait;
use pagination::PageParams;
use uuid::Uuid;

use crate::domain::ports::{
    AnimalRepository, AnimalRepositoryError, BookingRepository, BookingRepositoryError,
    CaseRepository, CaseRepositoryError, VetRepository, VetRepositoryError,
};
use crate::domain::{
    Animal, AnimalFilter, Availability, Booking, BookingScope, BookingStatus, Case, CaseFilter,
    CaseScope, UserId, VetProfile, VetSearch, VetStatus,
};

use super::{InMemoryStore, paged};

#[async_trait]
impl AnimalRepository for InMemoryStore {
    async fn list_for_owner(
        &self,
        owner_id: &UserId,
        filter: &AnimalFilter,
    ) -> Result<Vec<Animal>, AnimalRepositoryError> {
        let state = self.state.read().await;
        let mut animals: Vec<Animal> = state
            .animals
            .values()
            .filter(|animal| animal.owner_id == *owner_id && filter.matches(animal))
            .cloned()
            .collect();
        animals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(animals)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Animal>, AnimalRepositoryError> {
        Ok(self.state.read().await.animals.get(id).cloned())
    }

    async fn save(&self, animal: &Animal) -> Result<(), AnimalRepositoryError> {
        let mut state = self.state.write().await;
        state.animals.insert(animal.id, animal.clone());
        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, AnimalRepositoryError> {
        let mut state = self.state.write().await;
        let removed = state.animals.remove(id).is_some();
        if removed {
            for case in state.cases.values_mut() {
                if case.animal_id == Some(*id) {
                    case.animal_id = None;
                }
            }
        }
        Ok(removed)
    }
}

fn case_in_scope(case: &Case, scope: CaseScope, filter: &CaseFilter) -> bool {
    let scoped = match scope {
        CaseScope::Owner(owner) => case.owner_id == owner,
        CaseScope::Vet(vet) => case.vet_id == Some(vet),
        CaseScope::All => true,
    };
    scoped
        && filter.animal_id.is_none_or(|id| case.animal_id == Some(id))
        && filter.status.is_none_or(|status| case.status == status)
}

#[async_trait]
impl CaseRepository for InMemoryStore {
    async fn list(&self, scope: CaseScope, filter: &CaseFilter) -> Result<Vec<Case>, CaseRepositoryError> {
        let state = self.state.read().await;
        let mut cases: Vec<Case> = state
            .cases
            .values()
            .filter(|case| case_in_scope(case, scope, filter))
            .cloned()
            .collect();
        cases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(cases)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Case>, CaseRepositoryError> {
        Ok(self.state.read().await.cases.get(id).cloned())
    }

    async fn save(&self, case: &Case) -> Result<(), CaseRepositoryError> {
        let mut state = self.state.write().await;
        state.cases.insert(case.id, case.clone());
        Ok(())
    }
}

#[async_trait]
impl VetRepository for InMemoryStore {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<VetProfile>, VetRepositoryError> {
        Ok(self.state.read().await.vets.get(user_id).cloned())
    }

    async fn save(&self, profile: &VetProfile) -> Result<(), VetRepositoryError> {
        let mut state = self.state.write().await;
        state.vets.insert(profile.user_id, profile.clone());
        Ok(())
    }

    async fn search_approved(&self, search: &VetSearch) -> Result<Vec<VetProfile>, VetRepositoryError> {
        let state = self.state.read().await;
        let mut vets: Vec<VetProfile> = state
            .vets
            .values()
            .filter(|vet| vet.status == VetStatus::Approved && search.matches(vet))
            .cloned()
            .collect();
        vets.sort_by(|a, b| a.clinic_name.cmp(&b.clinic_name));
        Ok(vets)
    }

    async fn list_by_status(
        &self,
        status: Option<VetStatus>,
        page: PageParams,
    ) -> Result<(Vec<VetProfile>, u64), VetRepositoryError> {
        let state = self.state.read().await;
        let mut vets: Vec<VetProfile> = state
            .vets
            .values()
            .filter(|vet| status.is_none_or(|wanted| vet.status == wanted))
            .cloned()
            .collect();
        vets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paged(vets, page))
    }

    async fn find_availability(&self, user_id: &UserId) -> Result<Option<Availability>, VetRepositoryError> {
        Ok(self.state.read().await.availability.get(user_id).cloned())
    }

    async fn save_availability(
        &self,
        user_id: &UserId,
        availability: &Availability,
    ) -> Result<(), VetRepositoryError> {
        let mut state = self.state.write().await;
        state.availability.insert(*user_id, availability.clone());
        Ok(())
    }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn list(
        &self,
        scope: BookingScope,
        status: Option<BookingStatus>,
        page: PageParams,
    ) -> Result<(Vec<Booking>, u64), BookingRepositoryError> {
        let state = self.state.read().await;
        let mut bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|booking| match scope {
                BookingScope::Owner(owner) => booking.owner_id == owner,
                BookingScope::Vet(vet) => booking.vet_id == vet,
                BookingScope::All => true,
            })
            .filter(|booking| status.is_none_or(|wanted| booking.status == wanted))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| a.scheduled_at.cmp(&b.scheduled_at));
        Ok(paged(bookings, page))
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Booking>, BookingRepositoryError> {
        Ok(self.state.read().await.bookings.get(id).cloned())
    }

    async fn save(&self, booking: &Booking) -> Result<(), BookingRepositoryError> {
        let mut state = self.state.write().await;
        state.bookings.insert(booking.id, booking.clone());
        Ok(())
    }
}
