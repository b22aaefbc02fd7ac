//! Tests for case submission, visibility, assignment, and closure.

use chrono::{DateTime, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockAnimalRepository, MockCaseRepository, MockVetRepository};
use crate::domain::test_support::{RecordingSink, fixed_clock, sample_vet};
use crate::domain::{Animal, CaseStatus, ErrorCode, NewAnimal, SymptomsInput};

type Service = CasesService<MockCaseRepository, MockAnimalRepository, MockVetRepository>;

#[fixture]
fn now() -> DateTime<Utc> {
    "2026-05-04T10:00:00Z".parse().expect("valid timestamp")
}

struct Harness {
    cases: MockCaseRepository,
    animals: MockAnimalRepository,
    vets: MockVetRepository,
    sink: Arc<RecordingSink>,
}

impl Harness {
    fn new() -> Self {
        Self {
            cases: MockCaseRepository::new(),
            animals: MockAnimalRepository::new(),
            vets: MockVetRepository::new(),
            sink: Arc::new(RecordingSink::default()),
        }
    }

    fn build(self, now: DateTime<Utc>) -> (Service, Arc<RecordingSink>) {
        let service = CasesService::new(
            Arc::new(self.cases),
            Arc::new(self.animals),
            Arc::new(self.vets),
            self.sink.clone(),
            fixed_clock(now),
        );
        (service, self.sink)
    }
}

fn owner() -> Actor {
    Actor::new(UserId::random(), Role::Owner)
}

fn submission(animal_id: Option<Uuid>, animal_type: Option<&str>) -> NewCase {
    NewCase {
        animal_id,
        animal_type: animal_type.map(str::to_owned),
        symptoms: SymptomsInput::Text("fever, coughing".into()),
        notes: None,
        location: None,
        district: Some("Mbarara".into()),
        latitude: None,
        longitude: None,
    }
}

fn open_case(owner: &Actor, now: DateTime<Utc>) -> Case {
    Case::create(owner.user_id, submission(None, Some("Goat")), None, now).expect("valid case")
}

#[rstest]
#[tokio::test]
async fn create_uses_animal_species_and_notifies_owner(now: DateTime<Utc>) {
    let actor = owner();
    let animal = Animal::create(
        actor.user_id,
        NewAnimal {
            species: "Cattle".into(),
            ..NewAnimal::default()
        },
        now,
    )
    .expect("animal");
    let animal_id = animal.id;
    let mut harness = Harness::new();
    harness
        .animals
        .expect_find_by_id()
        .returning(move |_| Ok(Some(animal.clone())));
    harness
        .cases
        .expect_save()
        .withf(|case| case.animal_type == "Cattle" && case.symptoms.len() == 2)
        .times(1)
        .returning(|_| Ok(()));
    let (svc, sink) = harness.build(now);

    let case = svc
        .create(&actor, submission(Some(animal_id), None))
        .await
        .expect("created");
    assert_eq!(case.status, CaseStatus::Submitted);
    assert_eq!(sink.titles(), vec!["New case created".to_owned()]);
}

#[rstest]
#[tokio::test]
async fn create_rejects_foreign_animals(now: DateTime<Utc>) {
    let stranger = owner();
    let animal = Animal::create(
        stranger.user_id,
        NewAnimal {
            species: "Cattle".into(),
            ..NewAnimal::default()
        },
        now,
    )
    .expect("animal");
    let animal_id = animal.id;
    let mut harness = Harness::new();
    harness
        .animals
        .expect_find_by_id()
        .returning(move |_| Ok(Some(animal.clone())));
    harness.cases.expect_save().never();
    let (svc, sink) = harness.build(now);

    let err = svc
        .create(&owner(), submission(Some(animal_id), None))
        .await
        .expect_err("foreign animal");
    assert_eq!(err.details().expect("details")["field"], "animalId");
    assert!(sink.titles().is_empty());
}

#[rstest]
#[tokio::test]
async fn assign_requires_an_approved_vet(now: DateTime<Utc>) {
    let actor = owner();
    let case = open_case(&actor, now);
    let vet_id = UserId::random();
    let mut harness = Harness::new();
    harness
        .cases
        .expect_find_by_id()
        .returning(move |_| Ok(Some(case.clone())));
    harness
        .vets
        .expect_find_by_user()
        .returning(move |id| Ok(Some(sample_vet(*id, VetStatus::Pending))));
    harness.cases.expect_save().never();
    let (svc, _) = harness.build(now);

    let err = svc
        .assign_vet(&actor, Uuid::new_v4(), vet_id)
        .await
        .expect_err("pending vet");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn assign_moves_case_under_review_and_notifies_once(now: DateTime<Utc>) {
    let actor = owner();
    let case = open_case(&actor, now);
    let vet_id = UserId::random();
    let mut harness = Harness::new();
    harness
        .cases
        .expect_find_by_id()
        .returning(move |_| Ok(Some(case.clone())));
    harness
        .vets
        .expect_find_by_user()
        .returning(move |id| Ok(Some(sample_vet(*id, VetStatus::Approved))));
    harness
        .cases
        .expect_save()
        .withf(move |c| c.vet_id == Some(vet_id) && c.status == CaseStatus::UnderReview)
        .times(1)
        .returning(|_| Ok(()));
    let (svc, sink) = harness.build(now);

    svc.assign_vet(&actor, Uuid::new_v4(), vet_id)
        .await
        .expect("assigned");
    let sent = sink.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0.user_id, vet_id);
    assert!(sent[0].1, "assignment notices are de-duplicated");
}

#[rstest]
#[tokio::test]
async fn reassigning_the_same_vet_is_a_no_op(now: DateTime<Utc>) {
    let actor = owner();
    let vet_id = UserId::random();
    let mut case = open_case(&actor, now);
    case.assign(vet_id, now).expect("assign");
    let mut harness = Harness::new();
    harness
        .cases
        .expect_find_by_id()
        .returning(move |_| Ok(Some(case.clone())));
    harness
        .vets
        .expect_find_by_user()
        .returning(move |id| Ok(Some(sample_vet(*id, VetStatus::Approved))));
    harness.cases.expect_save().never();
    let (svc, sink) = harness.build(now);

    svc.assign_vet(&actor, Uuid::new_v4(), vet_id)
        .await
        .expect("no-op");
    assert!(sink.titles().is_empty());
}

#[rstest]
#[tokio::test]
async fn only_owner_or_admin_may_assign(now: DateTime<Utc>) {
    let case = open_case(&owner(), now);
    let mut harness = Harness::new();
    harness
        .cases
        .expect_find_by_id()
        .returning(move |_| Ok(Some(case.clone())));
    let (svc, _) = harness.build(now);
    let vet = Actor::new(UserId::random(), Role::Vet);

    let err = svc
        .assign_vet(&vet, Uuid::new_v4(), vet.user_id)
        .await
        .expect_err("not owner");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn closing_twice_notifies_once(now: DateTime<Utc>) {
    let actor = owner();
    let mut closed = open_case(&actor, now);
    closed.close(now);
    let mut harness = Harness::new();
    harness
        .cases
        .expect_find_by_id()
        .returning(move |_| Ok(Some(closed.clone())));
    harness.cases.expect_save().never();
    let (svc, sink) = harness.build(now);

    let case = svc.close(&actor, Uuid::new_v4()).await.expect("idempotent");
    assert_eq!(case.status, CaseStatus::Closed);
    assert!(sink.titles().is_empty());
}

#[rstest]
#[case(Role::Owner, true)]
#[case(Role::Vet, false)]
#[case(Role::Admin, true)]
#[tokio::test]
async fn get_is_limited_to_participants(
    now: DateTime<Utc>,
    #[case] role: Role,
    #[case] is_participant: bool,
) {
    let actor = Actor::new(UserId::random(), role);
    let case_owner = if is_participant && role == Role::Owner {
        actor
    } else {
        owner()
    };
    let case = open_case(&case_owner, now);
    let mut harness = Harness::new();
    harness
        .cases
        .expect_find_by_id()
        .returning(move |_| Ok(Some(case.clone())));
    let (svc, _) = harness.build(now);

    let result = svc.get(&actor, Uuid::new_v4()).await;
    match result {
        Ok(_) => assert!(is_participant),
        Err(err) => {
            assert!(!is_participant);
            assert_eq!(err.code(), ErrorCode::Forbidden);
        }
    }
}

#[rstest]
#[tokio::test]
async fn vets_list_only_assigned_cases(now: DateTime<Utc>) {
    let vet = Actor::new(UserId::random(), Role::Vet);
    let vet_id = vet.user_id;
    let mut harness = Harness::new();
    harness
        .cases
        .expect_list()
        .withf(move |scope, filter| *scope == CaseScope::Vet(vet_id) && filter.animal_id.is_none())
        .times(1)
        .returning(|_, _| Ok(Vec::new()));
    let (svc, _) = harness.build(now);

    let filter = CaseFilter {
        animal_id: Some(Uuid::new_v4()),
        status: None,
    };
    assert!(svc.list(&vet, filter).await.expect("listed").is_empty());
}
