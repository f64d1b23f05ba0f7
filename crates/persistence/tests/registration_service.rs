//! RegistrationService behaviour against the in-memory store.

use std::sync::Arc;

use domain::models::registrant::{CheckInOutcome, RegistrantKind, RegistrationRequest};
use domain::repositories::{RegistrantQuery, RegistrantStore};
use domain::services::notification::{MockNotifier, NotificationTemplate};
use domain::services::registration::{BulkAction, RegistrationService, ServiceError};
use domain::services::registration_validator::ValidationIssue;
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use persistence::InMemoryRegistrantStore;
use serde_json::json;

fn service_with(notifier: MockNotifier) -> (RegistrationService, Arc<MockNotifier>) {
    let notifier = Arc::new(notifier);
    let service = RegistrationService::new(
        Arc::new(InMemoryRegistrantStore::new()),
        notifier.clone(),
        100,
    );
    (service, notifier)
}

fn ada() -> RegistrationRequest {
    serde_json::from_value(json!({
        "type": "participant",
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@x.com",
        "phone": "+1-555-0100",
        "address": "1 Analytical Engine Way",
        "gender": "female",
        "maritalStatus": "single",
        "isLeader": "no"
    }))
    .unwrap()
}

fn volunteer(email: &str) -> RegistrationRequest {
    let mut req = ada();
    req.kind = Some("volunteer".to_string());
    req.email = Some(email.to_string());
    req.departments = Some(json!(["media", "protocol"]));
    req
}

#[tokio::test]
async fn test_register_participant_sends_confirmation() {
    let (service, notifier) = service_with(MockNotifier::new());

    let registered = service.register(ada()).await.unwrap();
    assert!(registered.email_sent);
    assert!(registered.registrant.is_confirmed);
    assert!(registered.registrant.registration_code.starts_with("PAR-"));

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ada@x.com");
    assert_eq!(sent[0].template, NotificationTemplate::ParticipantConfirmation);
    assert_eq!(
        sent[0].vars["registrationCode"],
        registered.registrant.registration_code
    );
}

#[tokio::test]
async fn test_register_volunteer_uses_volunteer_template() {
    let (service, notifier) = service_with(MockNotifier::new());

    let registered = service.register(volunteer("vol@x.com")).await.unwrap();
    assert_eq!(registered.registrant.kind, RegistrantKind::Volunteer);
    assert!(registered.registrant.registration_code.starts_with("VOL-"));
    assert_eq!(
        notifier.sent()[0].template,
        NotificationTemplate::VolunteerConfirmation
    );
}

#[tokio::test]
async fn test_duplicate_email_across_kinds() {
    let (service, _) = service_with(MockNotifier::new());
    service.register(ada()).await.unwrap();

    let err = service.register(volunteer("ADA@x.com")).await.unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateEmail));
}

#[tokio::test]
async fn test_notifier_failure_keeps_registration() {
    let (service, _) = service_with(MockNotifier::failing());

    let registered = service.register(ada()).await.unwrap();
    assert!(!registered.email_sent);

    let stored = service.find_by_id(registered.registrant.id).await.unwrap();
    assert_eq!(stored.email, "ada@x.com");
}

#[tokio::test]
async fn test_invalid_payload_writes_nothing() {
    let (service, notifier) = service_with(MockNotifier::new());
    let mut req = ada();
    req.is_leader = Some("yes".to_string());
    req.ministry = Some("other".to_string());

    let err = service.register(req).await.unwrap_err();
    match err {
        ServiceError::Invalid(errors) => {
            assert!(errors.contains(&ValidationIssue::MissingCustomMinistry))
        }
        other => panic!("expected validation error, got {:?}", other),
    }

    let page = service.list(&RegistrantQuery::default()).await.unwrap();
    assert_eq!(page.total, 0);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn test_check_in_twice_keeps_original_time() {
    let (service, _) = service_with(MockNotifier::new());
    let registered = service.register(ada()).await.unwrap();
    let code = registered.registrant.registration_code.clone();

    let first = service.check_in_by_code(&code).await.unwrap();
    assert!(matches!(first, CheckInOutcome::CheckedIn(_)));
    let first_time = first.registrant().check_in_time;
    assert!(first_time.is_some());

    let second = service.check_in_by_code(&code).await.unwrap();
    assert!(second.was_already_checked_in());
    assert_eq!(second.message(), "Already checked in");
    assert_eq!(second.registrant().check_in_time, first_time);

    let by_id = service.check_in_by_id(registered.registrant.id).await.unwrap();
    assert!(by_id.was_already_checked_in());
    assert_eq!(by_id.registrant().check_in_time, first_time);
}

#[tokio::test]
async fn test_check_in_unknown_code() {
    let (service, _) = service_with(MockNotifier::new());
    let err = service.check_in_by_code("PAR-000000-ZZZZ").await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let blank = service.check_in_by_code("   ").await.unwrap_err();
    assert!(matches!(blank, ServiceError::BadRequest(_)));
}

#[tokio::test]
async fn test_confirm_is_idempotent() {
    let (service, _) = service_with(MockNotifier::new());
    let registered = service.register(ada()).await.unwrap();

    let confirmed = service.confirm(registered.registrant.id).await.unwrap();
    assert!(confirmed.is_confirmed);
    assert_eq!(confirmed.updated_at, registered.registrant.updated_at);
}

#[tokio::test]
async fn test_bulk_check_in_then_delete() {
    let (service, _) = service_with(MockNotifier::new());
    let mut ids = Vec::new();
    for i in 0..3 {
        let email: String = SafeEmail().fake();
        let email = format!("v{}.{}", i, email);
        ids.push(service.register(volunteer(&email)).await.unwrap().registrant.id);
    }

    let first = service.bulk(BulkAction::CheckIn, None, &ids[..2]).await.unwrap();
    assert_eq!(first, 2);

    // Already checked-in rows are not counted again.
    let second = service.bulk(BulkAction::CheckIn, None, &ids).await.unwrap();
    assert_eq!(second, 1);

    let participants_only = service
        .bulk(BulkAction::Delete, Some(RegistrantKind::Participant), &ids)
        .await
        .unwrap();
    assert_eq!(participants_only, 0);

    let deleted = service.bulk(BulkAction::Delete, None, &ids).await.unwrap();
    assert_eq!(deleted, 3);
    assert_eq!(service.store().stats().await.unwrap().total, 0);
}

#[tokio::test]
async fn test_bulk_rejects_empty_and_oversized_requests() {
    let notifier = Arc::new(MockNotifier::new());
    let service = RegistrationService::new(
        Arc::new(InMemoryRegistrantStore::new()),
        notifier,
        2,
    );

    let empty = service.bulk(BulkAction::Confirm, None, &[]).await.unwrap_err();
    assert!(matches!(empty, ServiceError::BadRequest(_)));

    let ids: Vec<_> = (0..3).map(|_| uuid::Uuid::new_v4()).collect();
    let too_many = service.bulk(BulkAction::Confirm, None, &ids).await.unwrap_err();
    assert!(matches!(too_many, ServiceError::BadRequest(_)));

    // Duplicate ids collapse before the limit is applied.
    let repeated = vec![ids[0]; 5];
    assert_eq!(service.bulk(BulkAction::Confirm, None, &repeated).await.unwrap(), 0);
}

#[tokio::test]
async fn test_list_search_and_department_filter() {
    let (service, _) = service_with(MockNotifier::new());
    service.register(ada()).await.unwrap();
    service.register(volunteer("grace@navy.mil")).await.unwrap();

    let by_search = service
        .list(&RegistrantQuery {
            search: Some("NAVY".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_search.total, 1);
    assert_eq!(by_search.items[0].email, "grace@navy.mil");

    let by_department = service
        .list(&RegistrantQuery {
            department: Some(domain::models::registrant::Department::Protocol),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_department.total, 1);
}

#[tokio::test]
async fn test_find_by_email_is_case_insensitive() {
    let (service, _) = service_with(MockNotifier::new());
    let registered = service.register(ada()).await.unwrap().registrant;

    let found = service.find_by_email("  Ada@X.com ").await.unwrap();
    assert_eq!(found.id, registered.id);

    assert!(matches!(
        service.find_by_email("bob@x.com").await,
        Err(ServiceError::NotFound("Registrant"))
    ));
    assert!(matches!(
        service.find_by_email("   ").await,
        Err(ServiceError::BadRequest(_))
    ));
}
