//! Driving ports for an owner's livestock records.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Actor, Animal, AnimalFilter, AnimalPatch, Error, NewAnimal, NewTreatment, NewVaccination,
};

/// Animal mutations. Only the owner may touch an animal.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnimalsCommand: Send + Sync {
    async fn create(&self, actor: &Actor, input: NewAnimal) -> Result<Animal, Error>;
    async fn update(&self, actor: &Actor, id: Uuid, patch: AnimalPatch) -> Result<Animal, Error>;
    async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), Error>;
    async fn add_vaccination(&self, actor: &Actor, id: Uuid, input: NewVaccination) -> Result<Animal, Error>;
    async fn add_treatment(&self, actor: &Actor, id: Uuid, input: NewTreatment) -> Result<Animal, Error>;
}

/// Animal reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnimalsQuery: Send + Sync {
    async fn list(&self, actor: &Actor, filter: AnimalFilter) -> Result<Vec<Animal>, Error>;
    async fn get(&self, actor: &Actor, id: Uuid) -> Result<Animal, Error>;
}
