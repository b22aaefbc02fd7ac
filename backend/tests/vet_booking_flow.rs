//! End-to-end consultation flow: an owner reports a sick animal, an approved
//! vet takes the case, and the appointment runs to completion.

use actix_web::http::StatusCode;
use actix_web::test;
use chrono::{Duration, Utc};
use serde_json::{Value, json};

use anilink::domain::Role;

mod support;

use support::{Harness, app, call, email_for, login, notification_titles, register, seed_admin};

fn id_of(body: &Value) -> String {
    body["id"].as_str().expect("id").to_owned()
}

#[actix_web::test]
async fn owner_books_an_approved_vet_for_a_case() {
    let harness = Harness::new();
    seed_admin(&harness.store, "Joseph Admin").await;
    let app = test::init_service(app(harness.state)).await;

    let (owner, _) = register(&app, Role::Owner, "Amina Nakato").await;
    let (vet, vet_body) = register(&app, Role::Vet, "Grace Atim").await;
    let vet_id = id_of(&vet_body);
    let (status, admin) = login(&app, &email_for("Joseph Admin"), support::PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    let admin = admin.expect("admin session");

    let (status, animal, _) = call(
        &app,
        test::TestRequest::post().uri("/api/v1/animals"),
        Some(&owner),
        Some(json!({ "species": "cattle", "name": "Kaweesi" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{animal}");

    let (status, case, _) = call(
        &app,
        test::TestRequest::post().uri("/api/v1/cases"),
        Some(&owner),
        Some(json!({
            "animalId": id_of(&animal),
            "symptoms": "fever, loss of appetite",
            "district": "Mbarara",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{case}");
    assert_eq!(case["status"], "SUBMITTED");
    assert_eq!(case["animalType"], "cattle");
    let case_id = id_of(&case);

    // Unapproved vets cannot take cases.
    let (status, _, _) = call(
        &app,
        test::TestRequest::put().uri("/api/v1/vets/me"),
        Some(&vet),
        Some(json!({
            "clinicName": "Mbarara Animal Clinic",
            "licenseNumber": "UVB-2291",
            "farmVisits": true,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let assign = format!("/api/v1/cases/{case_id}/assign");
    let (status, body, _) = call(
        &app,
        test::TestRequest::post().uri(&assign),
        Some(&owner),
        Some(json!({ "vetId": vet_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "not_verified");

    let (status, _, _) = call(
        &app,
        test::TestRequest::post().uri(&format!("/api/v1/admin/vets/{vet_id}/approve")),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, case, _) = call(
        &app,
        test::TestRequest::post().uri(&assign),
        Some(&owner),
        Some(json!({ "vetId": vet_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{case}");
    assert_eq!(case["status"], "UNDER_REVIEW");

    let scheduled_at = (Utc::now() + Duration::days(2)).to_rfc3339();
    let (status, booking, _) = call(
        &app,
        test::TestRequest::post().uri("/api/v1/bookings"),
        Some(&owner),
        Some(json!({
            "vetId": vet_id,
            "caseId": case_id,
            "visitType": "FARM",
            "scheduledAt": scheduled_at,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{booking}");
    assert_eq!(booking["status"], "REQUESTED");
    let status_uri = format!("/api/v1/bookings/{}/status", id_of(&booking));

    // Owners may only cancel.
    let (status, _, _) = call(
        &app,
        test::TestRequest::patch().uri(&status_uri),
        Some(&owner),
        Some(json!({ "status": "CONFIRMED" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    for next in ["CONFIRMED", "IN_PROGRESS", "COMPLETED"] {
        let (status, body, _) = call(
            &app,
            test::TestRequest::patch().uri(&status_uri),
            Some(&vet),
            Some(json!({ "status": next })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{next}: {body}");
        assert_eq!(body["status"], next);
    }

    let (status, _, _) = call(
        &app,
        test::TestRequest::patch().uri(&status_uri),
        Some(&owner),
        Some(json!({ "status": "CANCELLED" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let owner_titles = notification_titles(&app, &owner).await;
    assert!(owner_titles.iter().any(|title| title == "Appointment requested"));
    assert!(owner_titles.iter().any(|title| title == "Appointment update"));
    let vet_titles = notification_titles(&app, &vet).await;
    assert!(vet_titles.iter().any(|title| title == "New case assigned"));
    assert!(vet_titles.iter().any(|title| title == "New booking request"));
}

#[actix_web::test]
async fn owner_cancellation_notifies_the_vet() {
    let harness = Harness::new();
    seed_admin(&harness.store, "Joseph Admin").await;
    let app = test::init_service(app(harness.state)).await;

    let (owner, _) = register(&app, Role::Owner, "Amina Nakato").await;
    let (vet, vet_body) = register(&app, Role::Vet, "Grace Atim").await;
    let vet_id = id_of(&vet_body);
    let (_, admin) = login(&app, &email_for("Joseph Admin"), support::PASSWORD).await;
    let admin = admin.expect("admin session");

    call(
        &app,
        test::TestRequest::put().uri("/api/v1/vets/me"),
        Some(&vet),
        Some(json!({ "clinicName": "Atim Vet Care", "licenseNumber": "UVB-1010" })),
    )
    .await;
    call(
        &app,
        test::TestRequest::post().uri(&format!("/api/v1/admin/vets/{vet_id}/approve")),
        Some(&admin),
        None,
    )
    .await;

    // Farm visits are not offered by this vet.
    let scheduled_at = (Utc::now() + Duration::days(1)).to_rfc3339();
    let (status, body, _) = call(
        &app,
        test::TestRequest::post().uri("/api/v1/bookings"),
        Some(&owner),
        Some(json!({ "vetId": vet_id, "visitType": "FARM", "scheduledAt": scheduled_at })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "visitType");

    let (status, booking, _) = call(
        &app,
        test::TestRequest::post().uri("/api/v1/bookings"),
        Some(&owner),
        Some(json!({ "vetId": vet_id, "visitType": "CLINIC", "scheduledAt": scheduled_at })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{booking}");

    let (status, body, _) = call(
        &app,
        test::TestRequest::patch().uri(&format!("/api/v1/bookings/{}/status", id_of(&booking))),
        Some(&owner),
        Some(json!({ "status": "CANCELLED" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "CANCELLED");

    let vet_titles = notification_titles(&app, &vet).await;
    assert!(vet_titles.iter().any(|title| title == "Appointment cancelled"));
}
