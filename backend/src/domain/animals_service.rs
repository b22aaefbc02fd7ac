//! Livestock record service. Owners only see and touch their own animals.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{AnimalRepository, AnimalRepositoryError, AnimalsCommand, AnimalsQuery};
use crate::domain::{
    Actor, Animal, AnimalFilter, AnimalPatch, Error, NewAnimal, NewTreatment, NewVaccination,
};

pub(crate) fn map_animal_error(error: AnimalRepositoryError) -> Error {
    match error {
        AnimalRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("animal repository unavailable: {message}"))
        }
        AnimalRepositoryError::Query { message } => {
            Error::internal(format!("animal repository error: {message}"))
        }
    }
}

/// Animal service implementing the animals driving ports.
#[derive(Clone)]
pub struct AnimalsService<R> {
    animals: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> AnimalsService<R> {
    pub fn new(animals: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { animals, clock }
    }
}

impl<R: AnimalRepository> AnimalsService<R> {
    /// Load an animal owned by the actor. Other owners' animals read as
    /// missing.
    async fn owned(&self, actor: &Actor, id: Uuid) -> Result<Animal, Error> {
        actor.require_owner()?;
        self.animals
            .find_by_id(&id)
            .await
            .map_err(map_animal_error)?
            .filter(|animal| animal.owner_id == actor.user_id)
            .ok_or_else(|| Error::not_found(format!("animal {id} not found")))
    }

    async fn store(&self, animal: Animal) -> Result<Animal, Error> {
        self.animals.save(&animal).await.map_err(map_animal_error)?;
        Ok(animal)
    }
}

#[async_trait]
impl<R: AnimalRepository> AnimalsCommand for AnimalsService<R> {
    async fn create(&self, actor: &Actor, input: NewAnimal) -> Result<Animal, Error> {
        actor.require_owner()?;
        let animal = Animal::create(actor.user_id, input, self.clock.utc())?;
        let animal = self.store(animal).await?;
        info!(animal_id = %animal.id, owner_id = %actor.user_id, "animal registered");
        Ok(animal)
    }

    async fn update(&self, actor: &Actor, id: Uuid, patch: AnimalPatch) -> Result<Animal, Error> {
        let mut animal = self.owned(actor, id).await?;
        animal.apply_patch(patch, self.clock.utc())?;
        self.store(animal).await
    }

    async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), Error> {
        self.owned(actor, id).await?;
        let removed = self.animals.delete(&id).await.map_err(map_animal_error)?;
        if !removed {
            return Err(Error::not_found(format!("animal {id} not found")));
        }
        Ok(())
    }

    async fn add_vaccination(
        &self,
        actor: &Actor,
        id: Uuid,
        input: NewVaccination,
    ) -> Result<Animal, Error> {
        let mut animal = self.owned(actor, id).await?;
        animal.vaccinations.push(input.into_record()?);
        animal.updated_at = self.clock.utc();
        self.store(animal).await
    }

    async fn add_treatment(
        &self,
        actor: &Actor,
        id: Uuid,
        input: NewTreatment,
    ) -> Result<Animal, Error> {
        let mut animal = self.owned(actor, id).await?;
        animal.treatments.push(input.into_record()?);
        animal.updated_at = self.clock.utc();
        self.store(animal).await
    }
}

#[async_trait]
impl<R: AnimalRepository> AnimalsQuery for AnimalsService<R> {
    async fn list(&self, actor: &Actor, filter: AnimalFilter) -> Result<Vec<Animal>, Error> {
        actor.require_owner()?;
        self.animals
            .list_for_owner(&actor.user_id, &filter)
            .await
            .map_err(map_animal_error)
    }

    async fn get(&self, actor: &Actor, id: Uuid) -> Result<Animal, Error> {
        self.owned(actor, id).await
    }
}

#[cfg(test)]
mod tests {
    //! Ownership and health-record behaviour.

    use chrono::{DateTime, NaiveDate, Utc};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ports::MockAnimalRepository;
    use crate::domain::test_support::fixed_clock;
    use crate::domain::{ErrorCode, Role, UserId};

    #[fixture]
    fn now() -> DateTime<Utc> {
        "2026-05-04T10:00:00Z".parse().expect("valid timestamp")
    }

    fn owner() -> Actor {
        Actor::new(UserId::random(), Role::Owner)
    }

    fn cow(owner: &Actor, now: DateTime<Utc>) -> Animal {
        Animal::create(
            owner.user_id,
            NewAnimal {
                species: "Cattle".into(),
                name: Some("Bella".into()),
                ..NewAnimal::default()
            },
            now,
        )
        .expect("valid animal")
    }

    fn date(raw: &str) -> NaiveDate {
        raw.parse().expect("valid date")
    }

    #[rstest]
    #[tokio::test]
    async fn other_owners_animals_read_as_missing(now: DateTime<Utc>) {
        let stranger = owner();
        let animal = cow(&stranger, now);
        let mut repo = MockAnimalRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(animal.clone())));
        repo.expect_save().never();
        let svc = AnimalsService::new(Arc::new(repo), fixed_clock(now));

        let err = svc
            .get(&owner(), Uuid::new_v4())
            .await
            .expect_err("hidden");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn non_owners_are_forbidden(now: DateTime<Utc>) {
        let svc = AnimalsService::new(Arc::new(MockAnimalRepository::new()), fixed_clock(now));
        let vet = Actor::new(UserId::random(), Role::Vet);

        let err = svc
            .list(&vet, AnimalFilter::default())
            .await
            .expect_err("owners only");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn vaccinations_are_appended(now: DateTime<Utc>) {
        let actor = owner();
        let animal = cow(&actor, now);
        let id = animal.id;
        let mut repo = MockAnimalRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(animal.clone())));
        repo.expect_save()
            .withf(|a| a.vaccinations.len() == 1)
            .times(1)
            .returning(|_| Ok(()));
        let svc = AnimalsService::new(Arc::new(repo), fixed_clock(now));

        let updated = svc
            .add_vaccination(
                &actor,
                id,
                NewVaccination {
                    vaccine: "FMD".into(),
                    administered_on: date("2026-05-01"),
                    next_due_on: Some(date("2026-11-01")),
                    notes: None,
                },
            )
            .await
            .expect("recorded");
        assert_eq!(updated.vaccinations[0].vaccine, "FMD");
    }

    #[rstest]
    #[tokio::test]
    async fn vaccination_due_before_administered_is_rejected(now: DateTime<Utc>) {
        let actor = owner();
        let animal = cow(&actor, now);
        let id = animal.id;
        let mut repo = MockAnimalRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(animal.clone())));
        repo.expect_save().never();
        let svc = AnimalsService::new(Arc::new(repo), fixed_clock(now));

        let err = svc
            .add_vaccination(
                &actor,
                id,
                NewVaccination {
                    vaccine: "FMD".into(),
                    administered_on: date("2026-05-01"),
                    next_due_on: Some(date("2026-04-01")),
                    notes: None,
                },
            )
            .await
            .expect_err("invalid dates");
        assert_eq!(err.details().expect("details")["field"], "nextDueOn");
    }

    #[rstest]
    #[tokio::test]
    async fn delete_reports_races_as_missing(now: DateTime<Utc>) {
        let actor = owner();
        let animal = cow(&actor, now);
        let id = animal.id;
        let mut repo = MockAnimalRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(animal.clone())));
        repo.expect_delete().returning(|_| Ok(false));
        let svc = AnimalsService::new(Arc::new(repo), fixed_clock(now));

        let err = svc.delete(&actor, id).await.expect_err("already gone");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn connection_failures_are_unavailable(now: DateTime<Utc>) {
        let mut repo = MockAnimalRepository::new();
        repo.expect_list_for_owner()
            .returning(|_, _| Err(AnimalRepositoryError::connection("pool exhausted")));
        let svc = AnimalsService::new(Arc::new(repo), fixed_clock(now));

        let err = svc
            .list(&owner(), AnimalFilter::default())
            .await
            .expect_err("unavailable");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
