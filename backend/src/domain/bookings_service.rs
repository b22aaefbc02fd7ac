//! Booking service: requests, the appointment lifecycle, and role-scoped
//! reads.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{PageParams, Paginated};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::domain::cases_service::map_case_error;
use crate::domain::ports::{
    BookingRepository, BookingRepositoryError, BookingsCommand, BookingsQuery, CaseRepository,
    NotificationSink, VetRepository,
};
use crate::domain::vets_service::map_vet_error;
use crate::domain::{
    Actor, Booking, BookingScope, BookingStatus, Error, NewBooking, NewNotification,
    NotificationPayload, NotificationType, Role, UserId, VetStatus, VisitType, invalid_field,
};

pub(crate) fn map_booking_error(error: BookingRepositoryError) -> Error {
    match error {
        BookingRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("booking repository unavailable: {message}"))
        }
        BookingRepositoryError::Query { message } => {
            Error::internal(format!("booking repository error: {message}"))
        }
    }
}

fn booking_notification(
    user_id: UserId,
    booking: &Booking,
    title: &str,
    message: String,
) -> NewNotification {
    NewNotification::new(user_id, NotificationType::Booking, title, message)
        .with_payload(NotificationPayload::for_entity("booking", "bookings", booking.id))
}

fn visit_label(visit_type: VisitType) -> &'static str {
    match visit_type {
        VisitType::Clinic => "clinic visit",
        VisitType::Farm => "farm visit",
    }
}

/// Booking service implementing the bookings driving ports.
#[derive(Clone)]
pub struct BookingsService<B, V, C> {
    bookings: Arc<B>,
    vets: Arc<V>,
    cases: Arc<C>,
    notifier: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
}

impl<B, V, C> BookingsService<B, V, C> {
    pub fn new(
        bookings: Arc<B>,
        vets: Arc<V>,
        cases: Arc<C>,
        notifier: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bookings,
            vets,
            cases,
            notifier,
            clock,
        }
    }
}

impl<B, V, C> BookingsService<B, V, C>
where
    B: BookingRepository,
    V: VetRepository,
    C: CaseRepository,
{
    async fn load(&self, id: Uuid) -> Result<Booking, Error> {
        self.bookings
            .find_by_id(&id)
            .await
            .map_err(map_booking_error)?
            .ok_or_else(|| Error::not_found(format!("booking {id} not found")))
    }

    async fn check_request(&self, actor: &Actor, input: &NewBooking) -> Result<(), Error> {
        let vet = self
            .vets
            .find_by_user(&input.vet_id)
            .await
            .map_err(map_vet_error)?
            .filter(|vet| vet.status == VetStatus::Approved)
            .ok_or_else(|| {
                invalid_field(
                    "vetId",
                    "not_verified",
                    "vetId must reference a verified vet",
                    Some(json!(input.vet_id)),
                )
            })?;
        if input.visit_type == VisitType::Farm && !vet.farm_visits {
            return Err(invalid_field(
                "visitType",
                "farm_visits_unavailable",
                "this vet does not offer farm visits",
                Some(json!(input.visit_type)),
            ));
        }
        if let Some(case_id) = input.case_id {
            let owned = self
                .cases
                .find_by_id(&case_id)
                .await
                .map_err(map_case_error)?
                .is_some_and(|case| case.owner_id == actor.user_id);
            if !owned {
                return Err(invalid_field(
                    "caseId",
                    "unknown_case",
                    "caseId does not match one of your cases",
                    Some(json!(case_id)),
                ));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<B, V, C> BookingsCommand for BookingsService<B, V, C>
where
    B: BookingRepository,
    V: VetRepository,
    C: CaseRepository,
{
    async fn create(&self, actor: &Actor, input: NewBooking) -> Result<Booking, Error> {
        actor.require_owner()?;
        self.check_request(actor, &input).await?;
        let booking = Booking::request(actor.user_id, input, self.clock.utc())?;
        self.bookings
            .save(&booking)
            .await
            .map_err(map_booking_error)?;
        info!(booking_id = %booking.id, vet_id = %booking.vet_id, "booking requested");

        let when = booking.scheduled_at.format("%Y-%m-%d %H:%M UTC");
        let label = visit_label(booking.visit_type);
        self.notifier
            .notify(booking_notification(
                booking.vet_id,
                &booking,
                "New booking request",
                format!("A farmer requested a {label} on {when}"),
            ))
            .await;
        self.notifier
            .notify(booking_notification(
                booking.owner_id,
                &booking,
                "Appointment requested",
                format!("Your {label} request for {when} was sent to the vet"),
            ))
            .await;
        Ok(booking)
    }

    async fn update_status(
        &self,
        actor: &Actor,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking, Error> {
        let mut booking = self.load(id).await?;
        let by_vet = booking.vet_id == actor.user_id;
        let by_owner = booking.owner_id == actor.user_id;
        if !by_vet && !(by_owner && status == BookingStatus::Cancelled) {
            return Err(Error::forbidden(if by_owner {
                "owners may only cancel a booking"
            } else {
                "not authorised to change this booking"
            }));
        }

        booking.transition(status, self.clock.utc())?;
        self.bookings
            .save(&booking)
            .await
            .map_err(map_booking_error)?;
        info!(booking_id = %booking.id, status = status.as_str(), "booking status changed");

        if by_vet && status.notifies_owner() {
            let message = format!(
                "Your {} is now {}",
                visit_label(booking.visit_type),
                status.as_str().to_lowercase()
            );
            self.notifier
                .notify(booking_notification(
                    booking.owner_id,
                    &booking,
                    "Appointment update",
                    message,
                ))
                .await;
        } else if by_owner {
            self.notifier
                .notify(booking_notification(
                    booking.vet_id,
                    &booking,
                    "Appointment cancelled",
                    "The farmer cancelled this appointment".to_owned(),
                ))
                .await;
        }
        Ok(booking)
    }
}

#[async_trait]
impl<B, V, C> BookingsQuery for BookingsService<B, V, C>
where
    B: BookingRepository,
    V: VetRepository,
    C: CaseRepository,
{
    async fn list(
        &self,
        actor: &Actor,
        status: Option<BookingStatus>,
        page: PageParams,
    ) -> Result<Paginated<Booking>, Error> {
        let scope = match actor.role {
            Role::Owner => BookingScope::Owner(actor.user_id),
            Role::Vet => BookingScope::Vet(actor.user_id),
            Role::Admin => BookingScope::All,
            Role::Seller => return Err(Error::forbidden("sellers have no bookings")),
        };
        let (items, total) = self
            .bookings
            .list(scope, status, page)
            .await
            .map_err(map_booking_error)?;
        Ok(Paginated::new(items, total, page))
    }

    async fn get(&self, actor: &Actor, id: Uuid) -> Result<Booking, Error> {
        let booking = self.load(id).await?;
        if !booking.involves(actor.user_id) && !actor.is_admin() {
            return Err(Error::forbidden("not authorised to view this booking"));
        }
        Ok(booking)
    }
}

#[cfg(test)]
#[path = "bookings_service_tests.rs"]
mod tests;
