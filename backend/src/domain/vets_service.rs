//! Vet directory service: public search, profile upserts, and availability.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{PageParams, Paginated};
use tracing::info;

use crate::domain::accounts_service::map_user_error;
use crate::domain::ports::{
    UserRepository, VetRepository, VetRepositoryError, VetsCommand, VetsQuery,
};
use crate::domain::{
    Actor, Availability, Error, UserId, VetListing, VetProfile, VetProfileInput, VetSearch,
    VetStatus, rank_by_distance,
};

pub(crate) fn map_vet_error(error: VetRepositoryError) -> Error {
    match error {
        VetRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("vet repository unavailable: {message}"))
        }
        VetRepositoryError::Query { message } => {
            Error::internal(format!("vet repository error: {message}"))
        }
    }
}

/// Vet service implementing the vets driving ports.
#[derive(Clone)]
pub struct VetsService<V, U> {
    vets: Arc<V>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<V, U> VetsService<V, U> {
    pub fn new(vets: Arc<V>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self { vets, users, clock }
    }
}

impl<V: VetRepository, U: UserRepository> VetsService<V, U> {
    async fn find(&self, vet_id: &UserId) -> Result<Option<VetProfile>, Error> {
        self.vets.find_by_user(vet_id).await.map_err(map_vet_error)
    }

    async fn approved(&self, vet_id: UserId) -> Result<VetProfile, Error> {
        self.find(&vet_id)
            .await?
            .filter(|vet| vet.status == VetStatus::Approved)
            .ok_or_else(|| Error::not_found(format!("vet {vet_id} not found")))
    }
}

#[async_trait]
impl<V: VetRepository, U: UserRepository> VetsCommand for VetsService<V, U> {
    async fn upsert_my_profile(
        &self,
        actor: &Actor,
        input: VetProfileInput,
    ) -> Result<VetProfile, Error> {
        actor.require_vet()?;
        let account = self
            .users
            .find_by_id(&actor.user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("login required"))?;
        let existing = self.find(&actor.user_id).await?;
        let previous_status = existing.as_ref().map(|vet| vet.status);

        let profile = VetProfile::upsert(
            existing,
            actor.user_id,
            account.name.as_ref(),
            input,
            self.clock.utc(),
        )?;
        self.vets.save(&profile).await.map_err(map_vet_error)?;
        if previous_status != Some(profile.status) {
            info!(vet_id = %actor.user_id, status = profile.status.as_str(), "vet profile submitted for review");
        }
        Ok(profile)
    }

    async fn set_availability(
        &self,
        actor: &Actor,
        availability: Availability,
    ) -> Result<Availability, Error> {
        actor.require_vet()?;
        if self.find(&actor.user_id).await?.is_none() {
            return Err(Error::conflict(
                "create your vet profile before publishing availability",
            ));
        }
        let availability = availability.validate()?;
        self.vets
            .save_availability(&actor.user_id, &availability)
            .await
            .map_err(map_vet_error)?;
        Ok(availability)
    }
}

#[async_trait]
impl<V: VetRepository, U: UserRepository> VetsQuery for VetsService<V, U> {
    async fn search(
        &self,
        search: VetSearch,
        page: PageParams,
    ) -> Result<Paginated<VetListing>, Error> {
        let vets = self
            .vets
            .search_approved(&search)
            .await
            .map_err(map_vet_error)?;
        let listings: Vec<VetListing> = match search.proximity {
            Some(filter) => rank_by_distance(vets, filter, VetProfile::location)
                .into_iter()
                .map(|(profile, distance_km)| VetListing {
                    profile,
                    distance_km,
                })
                .collect(),
            None => vets
                .into_iter()
                .map(|profile| VetListing {
                    profile,
                    distance_km: None,
                })
                .collect(),
        };
        Ok(Paginated::from_full(listings, page))
    }

    async fn get(&self, vet_id: UserId) -> Result<VetProfile, Error> {
        self.approved(vet_id).await
    }

    async fn availability(&self, vet_id: UserId) -> Result<Availability, Error> {
        self.approved(vet_id).await?;
        let availability = self
            .vets
            .find_availability(&vet_id)
            .await
            .map_err(map_vet_error)?;
        Ok(availability.unwrap_or_default())
    }

    async fn my_profile(&self, actor: &Actor) -> Result<VetProfile, Error> {
        actor.require_vet()?;
        self.find(&actor.user_id)
            .await?
            .ok_or_else(|| Error::not_found("you have not created a vet profile yet"))
    }
}

#[cfg(test)]
mod tests {
    //! Directory search and profile lifecycle.

    use std::collections::BTreeMap;

    use chrono::{DateTime, Utc};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ports::{MockUserRepository, MockVetRepository};
    use crate::domain::test_support::{fixed_clock, sample_user, sample_vet};
    use crate::domain::{ErrorCode, ProximityFilter, Role, TimeSlot, Weekday};

    #[fixture]
    fn now() -> DateTime<Utc> {
        "2026-05-04T10:00:00Z".parse().expect("valid timestamp")
    }

    fn service(
        vets: MockVetRepository,
        users: MockUserRepository,
        now: DateTime<Utc>,
    ) -> VetsService<MockVetRepository, MockUserRepository> {
        VetsService::new(Arc::new(vets), Arc::new(users), fixed_clock(now))
    }

    fn located(latitude: Option<f64>, longitude: Option<f64>) -> VetProfile {
        let mut vet = sample_vet(UserId::random(), VetStatus::Approved);
        vet.latitude = latitude;
        vet.longitude = longitude;
        vet
    }

    #[rstest]
    #[tokio::test]
    async fn proximity_search_sorts_filters_and_counts_after_radius(now: DateTime<Utc>) {
        let kampala = located(Some(0.3476), Some(32.5825));
        let entebbe = located(Some(0.0512), Some(32.4637));
        let gulu = located(Some(2.7724), Some(32.2881));
        let unknown = located(None, None);
        let entebbe_id = entebbe.user_id;
        let all = vec![gulu, unknown, entebbe, kampala];
        let mut vets = MockVetRepository::new();
        vets.expect_search_approved()
            .returning(move |_| Ok(all.clone()));
        let svc = service(vets, MockUserRepository::new(), now);

        let search = VetSearch {
            proximity: ProximityFilter::from_query(Some(0.05), Some(32.46), Some(60.0))
                .expect("valid filter"),
            ..VetSearch::default()
        };
        let page = PageParams::new(Some(1), Some(1)).expect("page");
        let result = svc.search(search, page).await.expect("searched");

        assert_eq!(result.total, 2);
        assert_eq!(result.data[0].profile.user_id, entebbe_id);
        assert!(result.data[0].distance_km.expect("distance") < 1.0);
    }

    #[rstest]
    #[tokio::test]
    async fn unapproved_vets_are_hidden_from_public_reads(now: DateTime<Utc>) {
        let mut vets = MockVetRepository::new();
        vets.expect_find_by_user()
            .returning(|id| Ok(Some(sample_vet(*id, VetStatus::Pending))));
        let svc = service(vets, MockUserRepository::new(), now);

        let err = svc.get(UserId::random()).await.expect_err("pending");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn license_change_sends_approved_profile_back_to_review(now: DateTime<Utc>) {
        let account = sample_user(Role::Vet, "Dr Okello");
        let actor = Actor::new(account.id, Role::Vet);
        let approved = sample_vet(account.id, VetStatus::Approved);
        let mut vets = MockVetRepository::new();
        vets.expect_find_by_user()
            .returning(move |_| Ok(Some(approved.clone())));
        vets.expect_save()
            .withf(|p| p.status == VetStatus::Pending && p.license_number == "UVB-9999")
            .times(1)
            .returning(|_| Ok(()));
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(account.clone())));
        let svc = service(vets, users, now);

        let input = VetProfileInput {
            clinic_name: "Mbarara Animal Clinic".into(),
            license_number: "UVB-9999".into(),
            ..VetProfileInput::default()
        };
        let profile = svc
            .upsert_my_profile(&actor, input)
            .await
            .expect("upserted");
        assert_eq!(profile.name, "Dr Okello");
    }

    #[rstest]
    #[tokio::test]
    async fn availability_requires_a_profile_and_valid_slots(now: DateTime<Utc>) {
        let actor = Actor::new(UserId::random(), Role::Vet);
        let mut vets = MockVetRepository::new();
        vets.expect_find_by_user()
            .returning(|id| Ok(Some(sample_vet(*id, VetStatus::Pending))));
        vets.expect_save_availability().never();
        let svc = service(vets, MockUserRepository::new(), now);

        let overlapping = Availability {
            weekly_schedule: BTreeMap::from([(
                Weekday::Mon,
                vec![
                    TimeSlot {
                        start: "08:00".into(),
                        end: "12:00".into(),
                    },
                    TimeSlot {
                        start: "11:00".into(),
                        end: "14:00".into(),
                    },
                ],
            )]),
            ..Availability::default()
        };
        let err = svc
            .set_availability(&actor, overlapping)
            .await
            .expect_err("overlap");
        assert_eq!(err.details().expect("details")["code"], "overlap");
    }

    #[rstest]
    #[tokio::test]
    async fn availability_defaults_to_empty_schedule(now: DateTime<Utc>) {
        let mut vets = MockVetRepository::new();
        vets.expect_find_by_user()
            .returning(|id| Ok(Some(sample_vet(*id, VetStatus::Approved))));
        vets.expect_find_availability().returning(|_| Ok(None));
        let svc = service(vets, MockUserRepository::new(), now);

        let availability = svc.availability(UserId::random()).await.expect("read");
        assert!(availability.weekly_schedule.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn owners_cannot_manage_vet_profiles(now: DateTime<Utc>) {
        let svc = service(MockVetRepository::new(), MockUserRepository::new(), now);
        let owner = Actor::new(UserId::random(), Role::Owner);

        let err = svc.my_profile(&owner).await.expect_err("vets only");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }
}
