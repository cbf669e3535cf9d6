mod common;

use account_service::domain::account::errors::AccountError;
use account_service::domain::account::models::AccountId;
use account_service::domain::account::models::CreateAccountCommand;
use account_service::domain::account::models::EmailAddress;
use account_service::domain::account::models::UpdateAccountCommand;
use account_service::domain::account::models::Username;
use account_service::domain::account::ports::AccountServicePort;
use common::create_account;
use common::test_service;

#[tokio::test]
async fn created_account_starts_active_and_unlocked() {
    let service = test_service();

    let account = create_account(&*service, "alice", "alice@example.com", "pw1").await;

    assert!(account.active);
    assert_eq!(account.failed_attempts, 0);
    assert!(!account.locked);
    assert!(account.last_login_at.is_none());
    assert!(account.password_hash.starts_with("$argon2"));
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let service = test_service();
    create_account(&*service, "alice", "alice@example.com", "pw1").await;

    let result = service
        .create_account(CreateAccountCommand::new(
            Username::new("alice".to_string()).unwrap(),
            EmailAddress::new("other@example.com".to_string()).unwrap(),
            "pw2".to_string(),
        ))
        .await;

    assert!(matches!(
        result.unwrap_err(),
        AccountError::DuplicateUsername(_)
    ));
}

#[tokio::test]
async fn inactive_account_still_occupies_username() {
    let service = test_service();
    let account = create_account(&*service, "alice", "alice@example.com", "pw1").await;
    service.deactivate(&account.id).await.unwrap();

    let result = service
        .create_account(CreateAccountCommand::new(
            Username::new("alice".to_string()).unwrap(),
            EmailAddress::new("other@example.com".to_string()).unwrap(),
            "pw2".to_string(),
        ))
        .await;

    assert!(matches!(
        result.unwrap_err(),
        AccountError::DuplicateUsername(_)
    ));
}

#[tokio::test]
async fn username_matching_is_case_sensitive() {
    let service = test_service();
    create_account(&*service, "alice", "alice@example.com", "pw1").await;

    // A username differing only in case is a distinct account.
    let account = create_account(&*service, "Alice", "alice2@example.com", "pw2").await;
    assert_eq!(account.username.as_str(), "Alice");

    assert!(service.get_by_username("alice").await.unwrap().is_some());
    assert!(service.get_by_username("ALICE").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let service = test_service();
    create_account(&*service, "alice", "alice@example.com", "pw1").await;

    let result = service
        .create_account(CreateAccountCommand::new(
            Username::new("bob".to_string()).unwrap(),
            EmailAddress::new("alice@example.com".to_string()).unwrap(),
            "pw2".to_string(),
        ))
        .await;

    assert!(matches!(
        result.unwrap_err(),
        AccountError::DuplicateEmail(_)
    ));
}

#[tokio::test]
async fn lookups_include_inactive_accounts() {
    let service = test_service();
    let account = create_account(&*service, "alice", "alice@example.com", "pw1").await;
    service.deactivate(&account.id).await.unwrap();

    let by_id = service.get_by_id(&account.id).await.unwrap();
    assert!(by_id.is_some_and(|found| !found.active));

    let by_username = service.get_by_username("alice").await.unwrap();
    assert!(by_username.is_some());
}

#[tokio::test]
async fn email_update_leaves_hash_and_auth_state_untouched() {
    let service = test_service();
    let account = create_account(&*service, "alice", "alice@example.com", "pw1").await;
    let original_hash = account.password_hash.clone();

    let command = UpdateAccountCommand {
        email: Some(EmailAddress::new("new@example.com".to_string()).unwrap()),
        password: None,
    };
    let updated = service
        .update_email_and_password(&account.id, command)
        .await
        .unwrap();

    assert_eq!(updated.email.as_str(), "new@example.com");
    assert_eq!(updated.password_hash, original_hash);
    assert_eq!(updated.failed_attempts, 0);
    assert!(!updated.locked);

    // The original password still logs in.
    let login = service.login_with_lockout("alice", "pw1").await.unwrap();
    assert!(login.is_some());
}

#[tokio::test]
async fn email_update_to_taken_address_fails() {
    let service = test_service();
    create_account(&*service, "alice", "alice@example.com", "pw1").await;
    let bob = create_account(&*service, "bob", "bob@example.com", "pw2").await;

    let command = UpdateAccountCommand {
        email: Some(EmailAddress::new("alice@example.com".to_string()).unwrap()),
        password: None,
    };
    let result = service.update_email_and_password(&bob.id, command).await;

    assert!(matches!(
        result.unwrap_err(),
        AccountError::DuplicateEmail(_)
    ));
}

#[tokio::test]
async fn password_update_replaces_hash() {
    let service = test_service();
    let account = create_account(&*service, "alice", "alice@example.com", "pw1").await;

    let command = UpdateAccountCommand {
        email: None,
        password: Some("pw2".to_string()),
    };
    let updated = service
        .update_email_and_password(&account.id, command)
        .await
        .unwrap();

    assert_ne!(updated.password_hash, account.password_hash);
    assert!(service
        .verify_credentials("alice", "pw2")
        .await
        .unwrap()
        .is_some());
    assert!(service
        .verify_credentials("alice", "pw1")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn update_of_unknown_account_is_not_found() {
    let service = test_service();

    let result = service
        .update_email_and_password(
            &AccountId::new(),
            UpdateAccountCommand::default(),
        )
        .await;

    assert!(matches!(result.unwrap_err(), AccountError::NotFound(_)));
}

#[tokio::test]
async fn deactivate_is_idempotent_and_activate_restores() {
    let service = test_service();
    let account = create_account(&*service, "alice", "alice@example.com", "pw1").await;

    let deactivated = service.deactivate(&account.id).await.unwrap();
    assert!(!deactivated.active);

    // Deactivating an already-inactive account succeeds silently.
    let again = service.deactivate(&account.id).await.unwrap();
    assert!(!again.active);

    let restored = service.activate(&account.id).await.unwrap();
    assert!(restored.active);
}

#[tokio::test]
async fn list_active_excludes_deactivated() {
    let service = test_service();
    create_account(&*service, "alice", "alice@example.com", "pw1").await;
    let bob = create_account(&*service, "bob", "bob@example.com", "pw2").await;
    service.deactivate(&bob.id).await.unwrap();

    let active = service.list_active().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].username.as_str(), "alice");
}

#[tokio::test]
async fn list_active_newest_first_orders_by_creation() {
    let service = test_service();
    create_account(&*service, "first", "first@example.com", "pw").await;
    create_account(&*service, "second", "second@example.com", "pw").await;
    create_account(&*service, "third", "third@example.com", "pw").await;

    let listed = service.list_active_newest_first().await.unwrap();
    let usernames: Vec<&str> = listed.iter().map(|a| a.username.as_str()).collect();
    assert_eq!(usernames, ["third", "second", "first"]);
}

#[tokio::test]
async fn delete_hard_removes_the_record() {
    let service = test_service();
    let account = create_account(&*service, "alice", "alice@example.com", "pw1").await;

    service.delete_hard(&account.id).await.unwrap();

    assert!(service.get_by_id(&account.id).await.unwrap().is_none());

    // A second delete has no target left.
    let result = service.delete_hard(&account.id).await;
    assert!(matches!(result.unwrap_err(), AccountError::NotFound(_)));
}

#[tokio::test]
async fn pagination_reports_window_and_totals() {
    let service = test_service();
    for i in 0..5 {
        create_account(
            &*service,
            &format!("user{i}"),
            &format!("user{i}@example.com"),
            "pw",
        )
        .await;
    }

    let first = service.list_paginated(0, 2).await.unwrap();
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.total_elements, 5);
    assert_eq!(first.total_pages, 3);

    let last = service.list_paginated(2, 2).await.unwrap();
    assert_eq!(last.items.len(), 1);

    let beyond = service.list_paginated(3, 2).await.unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total_elements, 5);
}
