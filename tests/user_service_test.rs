//! User service unit tests over a mocked repository and notifier.

mod common;

use uuid::Uuid;

use accounts_api::domain::{NewUser, Password, Requester, User, UserChanges};
use accounts_api::errors::AppError;
use accounts_api::services::UserService;

use common::{staff_user, test_user, user_manager, MockNotif, MockUserRepo};

fn valid_registration() -> NewUser {
    NewUser {
        username: "newuser".to_string(),
        email: "newuser@example.com".to_string(),
        password: "StrongP@ssw0rd123".to_string(),
        is_staff: false,
    }
}

/// Extract the per-field messages from a validation error.
fn field_messages(err: AppError, field: &str) -> Vec<String> {
    match err {
        AppError::Validation(fields) => fields.0.get(field).cloned().unwrap_or_default(),
        other => panic!("expected validation error, got {:?}", other),
    }
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_register_success() {
    let assigned_id = Uuid::new_v4();

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_username().returning(|_| Ok(None));
    repo.expect_create()
        .returning(move |username, email, password_hash, is_staff| {
            let mut user = test_user(assigned_id);
            user.username = username;
            user.email = email;
            user.password_hash = password_hash;
            user.is_staff = is_staff;
            Ok(user)
        });

    let service = user_manager(repo, MockNotif::new());
    let user = service.register(valid_registration()).await.unwrap();

    // The repository-assigned id is echoed back
    assert_eq!(user.id, assigned_id);
    assert_eq!(user.username, "newuser");
    assert!(!user.is_staff);

    // The password was hashed, never stored verbatim
    assert_ne!(user.password_hash, "StrongP@ssw0rd123");
    assert!(Password::from_hash(user.password_hash).verify("StrongP@ssw0rd123"));
}

#[tokio::test]
async fn test_register_short_password_rejected() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_username().returning(|_| Ok(None));

    let service = user_manager(repo, MockNotif::new());
    let mut registration = valid_registration();
    registration.password = "short".to_string();

    let err = service.register(registration).await.unwrap_err();
    let messages = field_messages(err, "password");
    assert!(messages
        .iter()
        .any(|m| m.contains("too short") && m.contains("8 characters")));
}

#[tokio::test]
async fn test_register_common_password_rejected() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_username().returning(|_| Ok(None));

    let service = user_manager(repo, MockNotif::new());
    let mut registration = valid_registration();
    registration.password = "password".to_string();

    let err = service.register(registration).await.unwrap_err();
    assert!(field_messages(err, "password")
        .contains(&"This password is too common.".to_string()));
}

#[tokio::test]
async fn test_register_numeric_password_rejected() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_username().returning(|_| Ok(None));

    let service = user_manager(repo, MockNotif::new());
    let mut registration = valid_registration();
    registration.password = "983475029384".to_string();

    let err = service.register(registration).await.unwrap_err();
    assert!(field_messages(err, "password")
        .contains(&"This password is entirely numeric.".to_string()));
}

#[tokio::test]
async fn test_register_password_matching_username_rejected() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_username().returning(|_| Ok(None));

    let service = user_manager(repo, MockNotif::new());
    let mut registration = valid_registration();
    registration.password = registration.username.clone();

    let err = service.register(registration).await.unwrap_err();
    assert!(field_messages(err, "password")
        .contains(&"The password is too similar to the username.".to_string()));
}

#[tokio::test]
async fn test_register_reports_all_password_violations() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_username().returning(|_| Ok(None));

    let service = user_manager(repo, MockNotif::new());
    let mut registration = valid_registration();
    // Short, common and entirely numeric at once
    registration.password = "123456".to_string();

    let err = service.register(registration).await.unwrap_err();
    let messages = field_messages(err, "password");
    assert!(messages.iter().any(|m| m.contains("too short")));
    assert!(messages.iter().any(|m| m.contains("too common")));
    assert!(messages.iter().any(|m| m.contains("entirely numeric")));
}

#[tokio::test]
async fn test_register_duplicate_username_rejected() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_username()
        .returning(|_| Ok(Some(test_user(Uuid::new_v4()))));

    let service = user_manager(repo, MockNotif::new());
    let mut registration = valid_registration();
    registration.username = "testuser".to_string();

    let err = service.register(registration).await.unwrap_err();
    assert!(field_messages(err, "username")
        .contains(&"A user with that username already exists.".to_string()));
}

#[tokio::test]
async fn test_register_invalid_username_rejected() {
    let service = user_manager(MockUserRepo::new(), MockNotif::new());

    for username in ["", "user name", "user_name!"] {
        let mut registration = valid_registration();
        registration.username = username.to_string();

        let err = service.register(registration).await.unwrap_err();
        assert!(
            !field_messages(err, "username").is_empty(),
            "{username:?} should be rejected"
        );
    }
}

#[tokio::test]
async fn test_register_invalid_email_rejected() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_username().returning(|_| Ok(None));

    let service = user_manager(repo, MockNotif::new());

    for email in ["", "plainaddress", "user@exa mple.com"] {
        let mut registration = valid_registration();
        registration.email = email.to_string();

        let err = service.register(registration).await.unwrap_err();
        assert!(
            field_messages(err, "email")
                .contains(&"Enter a valid email address.".to_string()),
            "{email:?} should be rejected"
        );
    }
}

// =============================================================================
// Get / list
// =============================================================================

#[tokio::test]
async fn test_get_user_success() {
    let user_id = Uuid::new_v4();

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .returning(|id| Ok(Some(test_user(id))));

    let service = user_manager(repo, MockNotif::new());
    let user = service.get_user(user_id).await.unwrap();

    assert_eq!(user.id, user_id);
}

#[tokio::test]
async fn test_get_user_not_found() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id().returning(|_| Ok(None));

    let service = user_manager(repo, MockNotif::new());
    let err = service.get_user(Uuid::new_v4()).await.unwrap_err();

    assert!(matches!(err, AppError::NotFound));
}

#[tokio::test]
async fn test_list_users_success() {
    let mut repo = MockUserRepo::new();
    repo.expect_list().returning(|| {
        Ok(vec![
            test_user(Uuid::new_v4()),
            staff_user(Uuid::new_v4()),
        ])
    });

    let service = user_manager(repo, MockNotif::new());
    let users = service.list_users().await.unwrap();

    assert_eq!(users.len(), 2);
}

// =============================================================================
// Update authorization
// =============================================================================

fn changes_with_email(email: &str) -> UserChanges {
    UserChanges {
        email: Some(email.to_string()),
        ..UserChanges::default()
    }
}

#[tokio::test]
async fn test_update_anonymous_forbidden() {
    let user_id = Uuid::new_v4();

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .returning(|id| Ok(Some(test_user(id))));

    let service = user_manager(repo, MockNotif::new());
    let err = service
        .update_user(user_id, changes_with_email("new@example.com"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden));
}

#[tokio::test]
async fn test_update_other_user_forbidden() {
    let user_id = Uuid::new_v4();
    let other = Requester {
        id: Uuid::new_v4(),
        is_staff: false,
    };

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .returning(|id| Ok(Some(test_user(id))));

    let service = user_manager(repo, MockNotif::new());
    let err = service
        .update_user(user_id, changes_with_email("new@example.com"), Some(other))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden));
}

#[tokio::test]
async fn test_update_own_account_allowed() {
    let user_id = Uuid::new_v4();
    let owner = Requester {
        id: user_id,
        is_staff: false,
    };

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .returning(|id| Ok(Some(test_user(id))));
    repo.expect_update()
        .withf(|_, patch| patch.email.as_deref() == Some("new@example.com"))
        .returning(|id, patch| {
            let mut user = test_user(id);
            if let Some(email) = patch.email {
                user.email = email;
            }
            Ok(user)
        });

    let service = user_manager(repo, MockNotif::new());
    let user = service
        .update_user(user_id, changes_with_email("new@example.com"), Some(owner))
        .await
        .unwrap();

    assert_eq!(user.email, "new@example.com");
}

#[tokio::test]
async fn test_update_by_staff_allowed() {
    let user_id = Uuid::new_v4();
    let staff = Requester {
        id: Uuid::new_v4(),
        is_staff: true,
    };

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .returning(|id| Ok(Some(test_user(id))));
    repo.expect_update()
        .returning(|id, _| Ok(test_user(id)));

    let service = user_manager(repo, MockNotif::new());
    let result = service
        .update_user(user_id, changes_with_email("new@example.com"), Some(staff))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_update_missing_id_not_found_even_for_staff() {
    let staff = Requester {
        id: Uuid::new_v4(),
        is_staff: true,
    };

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id().returning(|_| Ok(None));

    let service = user_manager(repo, MockNotif::new());
    let err = service
        .update_user(
            Uuid::new_v4(),
            changes_with_email("new@example.com"),
            Some(staff),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound));
}

#[tokio::test]
async fn test_update_rejected_password_writes_nothing() {
    let user_id = Uuid::new_v4();
    let owner = Requester {
        id: user_id,
        is_staff: false,
    };

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .returning(|id| Ok(Some(test_user(id))));
    // No update expectation: a repository write would fail the test

    let service = user_manager(repo, MockNotif::new());
    let changes = UserChanges {
        password: Some("password".to_string()),
        ..UserChanges::default()
    };
    let err = service
        .update_user(user_id, changes, Some(owner))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_update_password_is_rehashed() {
    let user_id = Uuid::new_v4();
    let owner = Requester {
        id: user_id,
        is_staff: false,
    };

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .returning(|id| Ok(Some(test_user(id))));
    repo.expect_update()
        .withf(|_, patch| {
            patch
                .password_hash
                .as_deref()
                .is_some_and(|h| h != "An0ther$trongPwd" && h.starts_with("$argon2"))
        })
        .returning(|id, _| Ok(test_user(id)));

    let service = user_manager(repo, MockNotif::new());
    let changes = UserChanges {
        password: Some("An0ther$trongPwd".to_string()),
        ..UserChanges::default()
    };

    assert!(service.update_user(user_id, changes, Some(owner)).await.is_ok());
}

#[tokio::test]
async fn test_update_duplicate_username_rejected() {
    let user_id = Uuid::new_v4();
    let owner = Requester {
        id: user_id,
        is_staff: false,
    };

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .returning(|id| Ok(Some(test_user(id))));
    repo.expect_find_by_username()
        .returning(|_| Ok(Some(staff_user(Uuid::new_v4()))));

    let service = user_manager(repo, MockNotif::new());
    let changes = UserChanges {
        username: Some("admin".to_string()),
        ..UserChanges::default()
    };
    let err = service
        .update_user(user_id, changes, Some(owner))
        .await
        .unwrap_err();

    assert!(field_messages(err, "username")
        .contains(&"A user with that username already exists.".to_string()));
}

// =============================================================================
// Delete authorization
// =============================================================================

#[tokio::test]
async fn test_delete_own_account_allowed() {
    let user_id = Uuid::new_v4();
    let owner = Requester {
        id: user_id,
        is_staff: false,
    };

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .returning(|id| Ok(Some(test_user(id))));
    repo.expect_delete().returning(|_| Ok(()));

    let service = user_manager(repo, MockNotif::new());
    assert!(service.delete_user(user_id, Some(owner)).await.is_ok());
}

#[tokio::test]
async fn test_delete_by_staff_allowed() {
    let user_id = Uuid::new_v4();
    let staff = Requester {
        id: Uuid::new_v4(),
        is_staff: true,
    };

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .returning(|id| Ok(Some(test_user(id))));
    repo.expect_delete().returning(|_| Ok(()));

    let service = user_manager(repo, MockNotif::new());
    assert!(service.delete_user(user_id, Some(staff)).await.is_ok());
}

#[tokio::test]
async fn test_delete_other_user_forbidden() {
    let user_id = Uuid::new_v4();
    let other = Requester {
        id: Uuid::new_v4(),
        is_staff: false,
    };

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .returning(|id| Ok(Some(test_user(id))));

    let service = user_manager(repo, MockNotif::new());
    let err = service.delete_user(user_id, Some(other)).await.unwrap_err();

    assert!(matches!(err, AppError::Forbidden));
}

#[tokio::test]
async fn test_delete_anonymous_forbidden() {
    let user_id = Uuid::new_v4();

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .returning(|id| Ok(Some(test_user(id))));

    let service = user_manager(repo, MockNotif::new());
    let err = service.delete_user(user_id, None).await.unwrap_err();

    assert!(matches!(err, AppError::Forbidden));
}

#[tokio::test]
async fn test_delete_missing_id_not_found() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id().returning(|_| Ok(None));

    let service = user_manager(repo, MockNotif::new());
    let err = service.delete_user(Uuid::new_v4(), None).await.unwrap_err();

    assert!(matches!(err, AppError::NotFound));
}

// =============================================================================
// Password reset
// =============================================================================

#[tokio::test]
async fn test_reset_known_email_sends_one_notification() {
    let user_id = Uuid::new_v4();

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_email()
        .returning(move |_| Ok(Some(test_user(user_id))));

    let mut notifier = MockNotif::new();
    let expected_prefix = format!("/user/reset-password/{}/", user_id);
    notifier
        .expect_send()
        .times(1)
        .withf(move |to, subject, body| {
            to == "testuser@example.com"
                && subject == "Password reset"
                && body.contains(&expected_prefix)
        })
        .returning(|_, _, _| Ok(()));

    let service = user_manager(repo, notifier);
    assert!(service
        .request_password_reset("testuser@example.com")
        .await
        .is_ok());
}

#[tokio::test]
async fn test_reset_unknown_email_sends_nothing() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_email().returning(|_| Ok(None));

    let mut notifier = MockNotif::new();
    notifier.expect_send().times(0);

    let service = user_manager(repo, notifier);
    let err = service
        .request_password_reset("nobody@example.com")
        .await
        .unwrap_err();

    assert!(field_messages(err, "email")
        .contains(&"No account found with this email address.".to_string()));
}

#[tokio::test]
async fn test_reset_notifier_failure_not_surfaced() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_email()
        .returning(|_| Ok(Some(test_user(Uuid::new_v4()))));

    let mut notifier = MockNotif::new();
    notifier
        .expect_send()
        .times(1)
        .returning(|_, _, _| Err(accounts_api::AppError::internal("SMTP down")));

    let service = user_manager(repo, notifier);
    assert!(service
        .request_password_reset("testuser@example.com")
        .await
        .is_ok());
}

#[tokio::test]
async fn test_confirm_reset_replaces_password() {
    let user_id = Uuid::new_v4();
    let user = test_user(user_id);
    let token = common::reset_issuer().issue(&user).unwrap();

    let mut repo = MockUserRepo::new();
    let lookup: User = user.clone();
    repo.expect_find_by_id()
        .returning(move |_| Ok(Some(lookup.clone())));
    repo.expect_update()
        .withf(|_, patch| patch.password_hash.is_some() && patch.username.is_none())
        .returning(|id, _| Ok(test_user(id)));

    let service = user_manager(repo, MockNotif::new());
    assert!(service
        .confirm_password_reset(user_id, &token, "Fresh$ecret42")
        .await
        .is_ok());
}

#[tokio::test]
async fn test_confirm_reset_rejects_invalid_token() {
    let user_id = Uuid::new_v4();

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .returning(|id| Ok(Some(test_user(id))));
    // No update expectation: a repository write would fail the test

    let service = user_manager(repo, MockNotif::new());
    let err = service
        .confirm_password_reset(user_id, "not-a-token", "Fresh$ecret42")
        .await
        .unwrap_err();

    assert!(field_messages(err, "token")
        .contains(&"Invalid or expired reset token.".to_string()));
}

#[tokio::test]
async fn test_confirm_reset_rejects_weak_password() {
    let user_id = Uuid::new_v4();
    let user = test_user(user_id);
    let token = common::reset_issuer().issue(&user).unwrap();

    let mut repo = MockUserRepo::new();
    let lookup: User = user.clone();
    repo.expect_find_by_id()
        .returning(move |_| Ok(Some(lookup.clone())));

    let service = user_manager(repo, MockNotif::new());
    let err = service
        .confirm_password_reset(user_id, &token, "password")
        .await
        .unwrap_err();

    assert!(field_messages(err, "new_password")
        .contains(&"This password is too common.".to_string()));
}
