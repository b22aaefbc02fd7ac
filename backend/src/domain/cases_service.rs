//! Health case service: submission, role-scoped reads, vet assignment, and
//! closure.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::domain::animals_service::map_animal_error;
use crate::domain::ports::{
    AnimalRepository, CaseRepository, CaseRepositoryError, CasesCommand, CasesQuery,
    NotificationSink, VetRepository,
};
use crate::domain::vets_service::map_vet_error;
use crate::domain::{
    Actor, Case, CaseFilter, CaseScope, Error, NewCase, NewNotification, NotificationPayload,
    NotificationType, Role, Transition, UserId, VetStatus, invalid_field,
};

pub(crate) fn map_case_error(error: CaseRepositoryError) -> Error {
    match error {
        CaseRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("case repository unavailable: {message}"))
        }
        CaseRepositoryError::Query { message } => {
            Error::internal(format!("case repository error: {message}"))
        }
    }
}

fn case_notification(user_id: UserId, case: &Case, title: &str, message: String) -> NewNotification {
    NewNotification::new(user_id, NotificationType::Case, title, message)
        .with_payload(NotificationPayload::for_entity("case", "cases", case.id))
}

/// Case service implementing the cases driving ports.
#[derive(Clone)]
pub struct CasesService<C, A, V> {
    cases: Arc<C>,
    animals: Arc<A>,
    vets: Arc<V>,
    notifier: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
}

impl<C, A, V> CasesService<C, A, V> {
    pub fn new(
        cases: Arc<C>,
        animals: Arc<A>,
        vets: Arc<V>,
        notifier: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cases,
            animals,
            vets,
            notifier,
            clock,
        }
    }
}

impl<C, A, V> CasesService<C, A, V>
where
    C: CaseRepository,
    A: AnimalRepository,
    V: VetRepository,
{
    async fn load(&self, id: Uuid) -> Result<Case, Error> {
        self.cases
            .find_by_id(&id)
            .await
            .map_err(map_case_error)?
            .ok_or_else(|| Error::not_found(format!("case {id} not found")))
    }

    async fn load_visible(&self, actor: &Actor, id: Uuid) -> Result<Case, Error> {
        let case = self.load(id).await?;
        if !case.is_visible_to(actor.user_id, actor.is_admin()) {
            return Err(Error::forbidden("not authorised to view this case"));
        }
        Ok(case)
    }

    async fn load_owned(&self, actor: &Actor, id: Uuid) -> Result<Case, Error> {
        let case = self.load(id).await?;
        if case.owner_id != actor.user_id {
            return Err(Error::forbidden("only the case owner may do this"));
        }
        Ok(case)
    }
}

#[async_trait]
impl<C, A, V> CasesCommand for CasesService<C, A, V>
where
    C: CaseRepository,
    A: AnimalRepository,
    V: VetRepository,
{
    async fn create(&self, actor: &Actor, input: NewCase) -> Result<Case, Error> {
        actor.require_owner()?;
        let species = match input.animal_id {
            Some(animal_id) => {
                let animal = self
                    .animals
                    .find_by_id(&animal_id)
                    .await
                    .map_err(map_animal_error)?
                    .filter(|animal| animal.owner_id == actor.user_id)
                    .ok_or_else(|| {
                        invalid_field(
                            "animalId",
                            "unknown_animal",
                            "animalId does not match one of your animals",
                            Some(json!(animal_id)),
                        )
                    })?;
                Some(animal.species)
            }
            None => None,
        };

        let case = Case::create(actor.user_id, input, species.as_deref(), self.clock.utc())?;
        self.cases.save(&case).await.map_err(map_case_error)?;
        info!(case_id = %case.id, owner_id = %actor.user_id, "case submitted");

        let message = format!("Your {} case has been submitted", case.animal_type);
        self.notifier
            .notify(case_notification(actor.user_id, &case, "New case created", message))
            .await;
        Ok(case)
    }

    async fn assign_vet(&self, actor: &Actor, id: Uuid, vet_id: UserId) -> Result<Case, Error> {
        let mut case = self.load(id).await?;
        if case.owner_id != actor.user_id && !actor.is_admin() {
            return Err(Error::forbidden("only the case owner or an admin may assign a vet"));
        }
        let vet_ready = self
            .vets
            .find_by_user(&vet_id)
            .await
            .map_err(map_vet_error)?
            .is_some_and(|vet| vet.status == VetStatus::Approved);
        if !vet_ready {
            return Err(invalid_field(
                "vetId",
                "not_verified",
                "vetId must reference a verified vet",
                Some(json!(vet_id)),
            ));
        }

        if case.assign(vet_id, self.clock.utc())? == Transition::Unchanged {
            return Ok(case);
        }
        self.cases.save(&case).await.map_err(map_case_error)?;
        info!(case_id = %case.id, vet_id = %vet_id, "vet assigned to case");

        let message = format!("A {} case has been assigned to you", case.animal_type);
        self.notifier
            .notify_once(case_notification(vet_id, &case, "New case assigned", message))
            .await;
        Ok(case)
    }

    async fn close(&self, actor: &Actor, id: Uuid) -> Result<Case, Error> {
        let mut case = self.load_owned(actor, id).await?;
        if case.close(self.clock.utc()) == Transition::Unchanged {
            return Ok(case);
        }
        self.cases.save(&case).await.map_err(map_case_error)?;

        let message = format!("Your {} case has been closed", case.animal_type);
        self.notifier
            .notify_once(case_notification(case.owner_id, &case, "Case closed", message))
            .await;
        Ok(case)
    }
}

#[async_trait]
impl<C, A, V> CasesQuery for CasesService<C, A, V>
where
    C: CaseRepository,
    A: AnimalRepository,
    V: VetRepository,
{
    async fn list(&self, actor: &Actor, filter: CaseFilter) -> Result<Vec<Case>, Error> {
        let (scope, filter) = match actor.role {
            Role::Owner => (CaseScope::Owner(actor.user_id), filter),
            Role::Vet => (
                CaseScope::Vet(actor.user_id),
                CaseFilter {
                    animal_id: None,
                    ..filter
                },
            ),
            Role::Admin => (CaseScope::All, filter),
            Role::Seller => return Err(Error::forbidden("sellers have no health cases")),
        };
        self.cases.list(scope, &filter).await.map_err(map_case_error)
    }

    async fn get(&self, actor: &Actor, id: Uuid) -> Result<Case, Error> {
        self.load_visible(actor, id).await
    }
}

#[cfg(test)]
#[path = "cases_service_tests.rs"]
mod tests;
