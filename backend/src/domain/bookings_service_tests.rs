//! Tests for booking requests and the appointment lifecycle.

use chrono::{DateTime, Duration, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockBookingRepository, MockCaseRepository, MockVetRepository};
use crate::domain::test_support::{RecordingSink, fixed_clock, sample_vet};
use crate::domain::ErrorCode;

type Service = BookingsService<MockBookingRepository, MockVetRepository, MockCaseRepository>;

#[fixture]
fn now() -> DateTime<Utc> {
    "2026-05-04T10:00:00Z".parse().expect("valid timestamp")
}

fn build(
    bookings: MockBookingRepository,
    vets: MockVetRepository,
    now: DateTime<Utc>,
) -> (Service, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let service = BookingsService::new(
        Arc::new(bookings),
        Arc::new(vets),
        Arc::new(MockCaseRepository::new()),
        sink.clone(),
        fixed_clock(now),
    );
    (service, sink)
}

fn approved_vets(farm_visits: bool) -> MockVetRepository {
    let mut vets = MockVetRepository::new();
    vets.expect_find_by_user().returning(move |id| {
        let mut vet = sample_vet(*id, VetStatus::Approved);
        vet.farm_visits = farm_visits;
        Ok(Some(vet))
    });
    vets
}

fn request(vet_id: UserId, visit_type: VisitType, now: DateTime<Utc>) -> NewBooking {
    NewBooking {
        vet_id,
        case_id: None,
        visit_type,
        scheduled_at: now + Duration::days(2),
        notes: Some("Cow not eating".into()),
    }
}

fn existing(owner: UserId, vet: UserId, now: DateTime<Utc>) -> Booking {
    Booking::request(owner, request(vet, VisitType::Clinic, now), now).expect("booking")
}

#[rstest]
#[tokio::test]
async fn create_notifies_vet_and_owner(now: DateTime<Utc>) {
    let owner = Actor::new(UserId::random(), Role::Owner);
    let vet_id = UserId::random();
    let mut bookings = MockBookingRepository::new();
    bookings.expect_save().times(1).returning(|_| Ok(()));
    let (svc, sink) = build(bookings, approved_vets(true), now);

    let booking = svc
        .create(&owner, request(vet_id, VisitType::Farm, now))
        .await
        .expect("created");
    assert_eq!(booking.status, BookingStatus::Requested);
    let sent = sink.sent();
    assert_eq!(sent[0].0.user_id, vet_id);
    assert_eq!(sent[0].0.title, "New booking request");
    assert_eq!(sent[1].0.user_id, owner.user_id);
    assert_eq!(sent[1].0.title, "Appointment requested");
}

#[rstest]
#[tokio::test]
async fn farm_visits_need_a_vet_that_offers_them(now: DateTime<Utc>) {
    let owner = Actor::new(UserId::random(), Role::Owner);
    let mut bookings = MockBookingRepository::new();
    bookings.expect_save().never();
    let (svc, _) = build(bookings, approved_vets(false), now);

    let err = svc
        .create(&owner, request(UserId::random(), VisitType::Farm, now))
        .await
        .expect_err("no farm visits");
    assert_eq!(err.details().expect("details")["field"], "visitType");
}

#[rstest]
#[tokio::test]
async fn unverified_vets_cannot_be_booked(now: DateTime<Utc>) {
    let owner = Actor::new(UserId::random(), Role::Owner);
    let mut vets = MockVetRepository::new();
    vets.expect_find_by_user().returning(|_| Ok(None));
    let (svc, _) = build(MockBookingRepository::new(), vets, now);

    let err = svc
        .create(&owner, request(UserId::random(), VisitType::Clinic, now))
        .await
        .expect_err("unknown vet");
    assert_eq!(err.details().expect("details")["field"], "vetId");
}

#[rstest]
#[tokio::test]
async fn vet_confirmation_notifies_owner(now: DateTime<Utc>) {
    let owner_id = UserId::random();
    let vet = Actor::new(UserId::random(), Role::Vet);
    let booking = existing(owner_id, vet.user_id, now);
    let mut bookings = MockBookingRepository::new();
    bookings
        .expect_find_by_id()
        .returning(move |_| Ok(Some(booking.clone())));
    bookings
        .expect_save()
        .withf(|b| b.status == BookingStatus::Confirmed)
        .times(1)
        .returning(|_| Ok(()));
    let (svc, sink) = build(bookings, MockVetRepository::new(), now);

    svc.update_status(&vet, Uuid::new_v4(), BookingStatus::Confirmed)
        .await
        .expect("confirmed");
    let sent = sink.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0.user_id, owner_id);
    assert_eq!(sent[0].0.title, "Appointment update");
}

#[rstest]
#[tokio::test]
async fn vet_starting_a_visit_sends_nothing(now: DateTime<Utc>) {
    let vet = Actor::new(UserId::random(), Role::Vet);
    let mut booking = existing(UserId::random(), vet.user_id, now);
    booking
        .transition(BookingStatus::Confirmed, now)
        .expect("confirm");
    let mut bookings = MockBookingRepository::new();
    bookings
        .expect_find_by_id()
        .returning(move |_| Ok(Some(booking.clone())));
    bookings.expect_save().returning(|_| Ok(()));
    let (svc, sink) = build(bookings, MockVetRepository::new(), now);

    svc.update_status(&vet, Uuid::new_v4(), BookingStatus::InProgress)
        .await
        .expect("started");
    assert!(sink.titles().is_empty());
}

#[rstest]
#[case(BookingStatus::Confirmed, ErrorCode::Forbidden)]
#[case(BookingStatus::Cancelled, ErrorCode::Conflict)]
#[tokio::test]
async fn owners_may_only_cancel_open_bookings(
    now: DateTime<Utc>,
    #[case] requested: BookingStatus,
    #[case] expected: ErrorCode,
) {
    let owner = Actor::new(UserId::random(), Role::Owner);
    let mut booking = existing(owner.user_id, UserId::random(), now);
    booking
        .transition(BookingStatus::Declined, now)
        .expect("decline");
    let mut bookings = MockBookingRepository::new();
    bookings
        .expect_find_by_id()
        .returning(move |_| Ok(Some(booking.clone())));
    bookings.expect_save().never();
    let (svc, _) = build(bookings, MockVetRepository::new(), now);

    let err = svc
        .update_status(&owner, Uuid::new_v4(), requested)
        .await
        .expect_err("refused");
    assert_eq!(err.code(), expected);
}

#[rstest]
#[tokio::test]
async fn strangers_cannot_read_bookings(now: DateTime<Utc>) {
    let booking = existing(UserId::random(), UserId::random(), now);
    let mut bookings = MockBookingRepository::new();
    bookings
        .expect_find_by_id()
        .returning(move |_| Ok(Some(booking.clone())));
    let (svc, _) = build(bookings, MockVetRepository::new(), now);

    let stranger = Actor::new(UserId::random(), Role::Owner);
    let err = svc
        .get(&stranger, Uuid::new_v4())
        .await
        .expect_err("not involved");
    assert_eq!(err.code(), ErrorCode::Forbidden);

    let admin = Actor::new(UserId::random(), Role::Admin);
    svc.get(&admin, Uuid::new_v4()).await.expect("admins see all");
}

#[rstest]
#[tokio::test]
async fn list_scopes_by_role(now: DateTime<Utc>) {
    let vet = Actor::new(UserId::random(), Role::Vet);
    let vet_id = vet.user_id;
    let mut bookings = MockBookingRepository::new();
    bookings
        .expect_list()
        .withf(move |scope, status, _| {
            *scope == BookingScope::Vet(vet_id) && *status == Some(BookingStatus::Requested)
        })
        .returning(|_, _, _| Ok((Vec::new(), 0)));
    let (svc, _) = build(bookings, MockVetRepository::new(), now);

    let page = svc
        .list(&vet, Some(BookingStatus::Requested), PageParams::default())
        .await
        .expect("listed");
    assert_eq!(page.total, 0);
}
