mod common;

use std::sync::atomic::Ordering;

use assert_matches::assert_matches;
use common::{identity, TestGateway};
use medportal_app::error::AppError;
use medportal_app::forms::{AppointmentForm, RegistrationForm, SignInForm};
use medportal_core::appointments::Specialty;
use medportal_core::error::CoreError;
use medportal_core::profile::DocumentType;
use medportal_core::types::Date;
use medportal_db::repositories::{appointment_repo, notification_repo};
use medportal_gateway::MemoryGateway;

fn today() -> Date {
    Date::from_ymd_opt(2026, 10, 19).unwrap()
}

fn booking() -> AppointmentForm {
    AppointmentForm {
        date: Some(Date::from_ymd_opt(2026, 11, 3).unwrap()),
        time: "10:00".into(),
        specialty: Some(Specialty::Cardiology),
        provider: "Dr. Ruiz".into(),
        reason: "Control anual".into(),
        notes: "Traer exámenes".into(),
    }
}

// ---------------------------------------------------------------------------
// Appointment form
// ---------------------------------------------------------------------------

#[tokio::test]
async fn appointment_without_date_makes_no_gateway_calls() {
    let gw = TestGateway::new();
    let me = identity();
    let mut form = AppointmentForm {
        date: None,
        ..booking()
    };

    let err = form.submit(gw.as_ref(), Some(&me), today()).await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(err.user_message(), "Please select a date");
    assert_eq!(gw.data_calls(), 0);
    // Fields are kept for correction.
    assert_eq!(form.provider, "Dr. Ruiz");
}

#[tokio::test]
async fn appointment_in_the_past_makes_no_gateway_calls() {
    let gw = TestGateway::new();
    let mut form = AppointmentForm {
        date: Some(Date::from_ymd_opt(2026, 10, 1).unwrap()),
        ..booking()
    };

    let err = form
        .submit(gw.as_ref(), Some(&identity()), today())
        .await
        .unwrap_err();

    assert_matches!(err, AppError::Core(CoreError::Validation(_)));
    assert_eq!(gw.data_calls(), 0);
}

#[tokio::test]
async fn appointment_requires_sign_in() {
    let gw = TestGateway::new();
    let err = booking().submit(gw.as_ref(), None, today()).await.unwrap_err();
    assert_matches!(err, AppError::NotSignedIn);
    assert_eq!(gw.data_calls(), 0);
}

#[tokio::test]
async fn booking_writes_appointment_then_notification_and_resets() {
    let gw = TestGateway::new();
    let me = identity();
    let mut form = booking();

    let confirmation = form.submit(gw.as_ref(), Some(&me), today()).await.unwrap();

    assert_eq!(confirmation.title, "Appointment registered!");
    assert_eq!(form, AppointmentForm::default());

    let appointments = gw.inner.rows(appointment_repo::TABLE).await;
    assert_eq!(appointments.len(), 1);
    assert_eq!(appointments[0]["estado"], "programada");
    assert_eq!(appointments[0]["fecha"], "2026-11-03");
    assert_eq!(appointments[0]["notas"], "Traer exámenes");

    let notifications = gw.inner.rows(notification_repo::TABLE).await;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["tipo"], "cita");
    assert_eq!(notifications[0]["leida"], false);
    assert_eq!(notifications[0]["user_id"], me.user_id.to_string());
    assert_eq!(gw.inserts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_booking_surfaces_message_and_keeps_fields() {
    let gw = TestGateway::new();
    gw.fail_inserts_into(appointment_repo::TABLE).await;
    let mut form = booking();

    let err = form
        .submit(gw.as_ref(), Some(&identity()), today())
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "injected insert failure");
    assert_eq!(form, booking());
    assert!(gw.inner.rows(notification_repo::TABLE).await.is_empty());
}

#[tokio::test]
async fn failed_confirmation_notification_is_ignored() {
    let gw = TestGateway::new();
    gw.fail_inserts_into(notification_repo::TABLE).await;
    let mut form = booking();

    form.submit(gw.as_ref(), Some(&identity()), today())
        .await
        .unwrap();

    assert_eq!(gw.inner.rows(appointment_repo::TABLE).await.len(), 1);
    assert!(gw.inner.rows(notification_repo::TABLE).await.is_empty());
    assert_eq!(form, AppointmentForm::default());
}

// ---------------------------------------------------------------------------
// Registration and sign-in
// ---------------------------------------------------------------------------

fn registration() -> RegistrationForm {
    RegistrationForm {
        full_name: "Ana Pérez".into(),
        document_type: DocumentType::Passport,
        document_number: "AB123456".into(),
        issue_date: Some(Date::from_ymd_opt(2018, 3, 14).unwrap()),
        email: "ana@example.com".into(),
        password: "secreto".into(),
    }
}

#[tokio::test]
async fn registration_signs_in_with_profile_metadata() {
    let gw = TestGateway::new();
    let portal = gw.portal().await;
    let mut form = registration();

    let registration = form.submit(&portal.session, today()).await.unwrap();

    assert!(registration.is_signed_in());
    assert_eq!(portal.session.identity().as_ref(), Some(registration.identity()));
    let session = portal.session.current().unwrap();
    assert_eq!(session.metadata["nombre_completo"], "Ana Pérez");
    assert_eq!(session.metadata["tipo_documento"], "Pasaporte");
    assert_eq!(session.metadata["fecha_expedicion"], "2018-03-14");
    assert_eq!(form, RegistrationForm::default());
}

#[tokio::test]
async fn registration_pending_confirmation_resets_without_signing_in() {
    let gw = TestGateway::wrapping(MemoryGateway::with_email_confirmation());
    let portal = gw.portal().await;
    let mut form = registration();

    let registration = form.submit(&portal.session, today()).await.unwrap();

    assert!(!registration.is_signed_in());
    assert_eq!(registration.identity().email, "ana@example.com");
    assert!(portal.session.identity().is_none());
    assert_eq!(form, RegistrationForm::default());
}

#[tokio::test]
async fn invalid_registration_never_reaches_the_gateway() {
    let gw = TestGateway::new();
    let portal = gw.portal().await;
    let mut form = RegistrationForm {
        issue_date: Some(Date::from_ymd_opt(1899, 12, 31).unwrap()),
        ..registration()
    };

    let err = form.submit(&portal.session, today()).await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(gw.auth_calls.load(Ordering::SeqCst), 0);
    assert!(portal.session.identity().is_none());
}

#[tokio::test]
async fn duplicate_registration_reports_gateway_message() {
    let gw = TestGateway::new();
    let portal = gw.portal().await;
    registration().submit(&portal.session, today()).await.unwrap();

    let err = registration()
        .submit(&portal.session, today())
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "User already registered");
}

#[tokio::test]
async fn sign_in_form_clears_password() {
    let gw = TestGateway::new();
    let portal = gw.portal().await;
    registration().submit(&portal.session, today()).await.unwrap();
    portal.session.sign_out().await.unwrap();

    let mut form = SignInForm {
        email: "ana@example.com".into(),
        password: "wrong-password".into(),
    };
    let err = form.submit(&portal.session).await.unwrap_err();
    assert_eq!(err.user_message(), "Invalid login credentials");
    assert!(form.password.is_empty());

    form.password = "secreto".into();
    let me = form.submit(&portal.session).await.unwrap();
    assert_eq!(me.email, "ana@example.com");
    assert!(form.password.is_empty());
}

#[tokio::test]
async fn blank_sign_in_is_rejected_locally() {
    let gw = TestGateway::new();
    let portal = gw.portal().await;
    let mut form = SignInForm::default();

    let err = form.submit(&portal.session).await.unwrap_err();

    assert_eq!(err.user_message(), "Email is required");
    assert_eq!(gw.auth_calls.load(Ordering::SeqCst), 0);
}
