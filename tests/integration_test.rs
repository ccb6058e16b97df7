use exchange_users::commands::{RegisterUser, UpdateUserProfile};
use exchange_users::config::AppConfig;
use exchange_users::lifecycle::{StartupError, UsersSystem};
use exchange_users::model::{Role, RoleName, User, UserId, UserStatus};
use exchange_users::queries::{GetUserProfile, UserProfileDto};
use exchange_users::repository::{InMemoryUserRepository, UserRepository};
use exchange_users::role_cache::{CacheError, InMemoryRoleReader};
use exchange_users::{ErrorCode, UserError};
use mediator::mock::MockHandler;
use mediator::{MediatorError, QueryBus};
use std::sync::Arc;

fn alice() -> RegisterUser {
    RegisterUser {
        line_user_id: "line-alice".to_string(),
        email: Some("alice@example.com".to_string()),
        display_name: "Alice".to_string(),
    }
}

async fn start_system() -> (UsersSystem, Arc<InMemoryUserRepository>) {
    let repo = Arc::new(InMemoryUserRepository::new());
    let system = UsersSystem::start(
        AppConfig::default(),
        Arc::new(InMemoryRoleReader::with_default_roles()),
        repo.clone(),
    )
    .await
    .expect("Failed to start system");
    (system, repo)
}

/// Register, update and read back a user through both buses.
#[tokio::test]
async fn test_full_users_flow() {
    let (system, repo) = start_system().await;
    let ctx = system.context();

    let user_id = system
        .command_bus
        .dispatch(&ctx, alice())
        .await
        .expect("Failed to register user");
    assert_eq!(user_id, UserId::from("user_1"));

    let updated = system
        .command_bus
        .dispatch(
            &ctx,
            UpdateUserProfile {
                user_id: user_id.clone(),
                first_name: Some("Alice".to_string()),
                last_name: Some("Liddell".to_string()),
                ..UpdateUserProfile::default()
            },
        )
        .await
        .expect("Failed to update profile");
    assert_eq!(updated, user_id);

    let profile = system
        .query_bus
        .dispatch(&ctx, GetUserProfile { user_id: user_id.clone() })
        .await
        .expect("Failed to get profile");
    assert_eq!(profile.display_name, "Alice");
    assert_eq!(profile.last_name.as_deref(), Some("Liddell"));
    assert_eq!(profile.status, UserStatus::PendingVerification);
    assert_eq!(profile.roles, vec!["POSTER".to_string()]);

    let stored = repo.find_by_id(&user_id).await.unwrap().unwrap();
    assert_eq!(stored.roles.len(), 1);
    assert_eq!(stored.roles[0].id, 1);
    assert_eq!(stored.roles[0].name, RoleName::Poster);

    system.shutdown().await;
}

/// A repository that already holds users keeps them when new ones register.
#[tokio::test]
async fn test_registration_does_not_overwrite_stored_users() {
    let repo = Arc::new(InMemoryUserRepository::new());
    repo.insert(User::new(UserId::from("user_1"), "line-existing", None, "Bob"))
        .await
        .unwrap();
    let system = UsersSystem::start(
        AppConfig::default(),
        Arc::new(InMemoryRoleReader::with_default_roles()),
        repo.clone(),
    )
    .await
    .unwrap();

    let new_id = system
        .command_bus
        .dispatch(
            &system.context(),
            RegisterUser {
                line_user_id: "line-new".to_string(),
                email: None,
                display_name: "New".to_string(),
            },
        )
        .await
        .unwrap();

    assert_ne!(new_id, UserId::from("user_1"));
    assert_eq!(repo.len(), 2);
    let existing = repo.find_by_id(&UserId::from("user_1")).await.unwrap().unwrap();
    assert_eq!(existing.line_user_id, "line-existing");
    assert_eq!(existing.profile.display_name, "Bob");

    system.shutdown().await;
}

#[tokio::test]
async fn test_startup_binds_every_request_type() {
    let (system, _repo) = start_system().await;

    assert!(system.command_bus.is_registered::<RegisterUser>());
    assert!(system.command_bus.is_registered::<UpdateUserProfile>());
    assert!(system.query_bus.is_registered::<GetUserProfile>());
    assert!(!system.command_bus.is_registered::<GetUserProfile>());
    assert!(system.role_cache.is_initialized());

    system.shutdown().await;
}

#[tokio::test]
async fn test_startup_fails_when_roles_cannot_load() {
    let reader = Arc::new(InMemoryRoleReader::with_default_roles());
    reader.set_unavailable(true);

    let result = UsersSystem::start(
        AppConfig::default(),
        reader,
        Arc::new(InMemoryUserRepository::new()),
    )
    .await;

    assert!(matches!(
        result,
        Err(StartupError::RoleCache(CacheError::SourceUnavailable(_)))
    ));
}

#[tokio::test]
async fn test_domain_errors_reach_the_caller() {
    let (system, _repo) = start_system().await;
    let ctx = system.context();

    system.command_bus.dispatch(&ctx, alice()).await.unwrap();
    let duplicate = system
        .command_bus
        .dispatch(&ctx, alice())
        .await
        .unwrap_err();
    assert_eq!(duplicate.code(), ErrorCode::AlreadyExists);

    let missing = system
        .query_bus
        .dispatch(&ctx, GetUserProfile { user_id: UserId::from("user_404") })
        .await
        .unwrap_err();
    assert_eq!(missing, UserError::NotFound(UserId::from("user_404")));
    assert_eq!(missing.code(), ErrorCode::NotFound);

    system.shutdown().await;
}

#[tokio::test]
async fn test_registration_fails_without_default_role() {
    let reader = Arc::new(InMemoryRoleReader::new(vec![Role::new(3, RoleName::Admin)]));
    let repo = Arc::new(InMemoryUserRepository::new());
    let system = UsersSystem::start(AppConfig::default(), reader, repo.clone())
        .await
        .unwrap();

    let err = system
        .command_bus
        .dispatch(&system.context(), alice())
        .await
        .unwrap_err();

    assert_eq!(err, UserError::Role(CacheError::RoleNameNotFound(RoleName::Poster)));
    assert_eq!(err.code(), ErrorCode::Internal);
    assert!(repo.is_empty());

    system.shutdown().await;
}

#[tokio::test]
async fn test_unbound_query_reports_handler_not_found() {
    let bus = QueryBus::new();
    let err = bus
        .dispatch(
            &mediator::Context::new(),
            GetUserProfile { user_id: UserId::from("user_1") },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        UserError::Mediator(MediatorError::HandlerNotFound { .. })
    ));
}

/// Callers of the query bus can be tested against a scripted handler.
#[tokio::test]
async fn test_query_bus_with_mock_handler() {
    let mock = MockHandler::<GetUserProfile>::new();
    mock.expect().return_ok(UserProfileDto {
        user_id: "user_7".into(),
        line_user_id: "line-7".into(),
        email: None,
        display_name: "Seven".into(),
        first_name: None,
        last_name: None,
        bio: None,
        avatar_url: None,
        phone_number: None,
        address: None,
        status: UserStatus::Active,
        is_verified: true,
        roles: vec!["TASKER".into()],
    });
    mock.expect()
        .return_err(UserError::NotFound(UserId::from("user_8")));

    let bus = QueryBus::new();
    bus.register_handler::<GetUserProfile, _>(mock.clone()).unwrap();
    let ctx = mediator::Context::new();

    let profile = bus
        .dispatch(&ctx, GetUserProfile { user_id: UserId::from("user_7") })
        .await
        .unwrap();
    assert_eq!(profile.display_name, "Seven");
    assert!(bus
        .dispatch(&ctx, GetUserProfile { user_id: UserId::from("user_8") })
        .await
        .is_err());

    assert_eq!(mock.calls(), 2);
    mock.verify();
}

#[tokio::test]
async fn test_shutdown_cancels_request_contexts() {
    let (system, _repo) = start_system().await;
    let ctx = system.context();
    assert!(!ctx.is_cancelled());

    system.shutdown().await;
    assert!(ctx.is_cancelled());
}
