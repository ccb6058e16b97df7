use exchange_users::commands::{RegisterUser, UpdateUserProfile};
use exchange_users::config::AppConfig;
use exchange_users::lifecycle::{setup_tracing, UsersSystem};
use exchange_users::queries::GetUserProfile;
use exchange_users::repository::InMemoryUserRepository;
use exchange_users::role_cache::InMemoryRoleReader;
use std::sync::Arc;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = AppConfig::from_env().map_err(|e| e.to_string())?;
    info!(service = %config.service_name, "Starting application");

    let system = UsersSystem::start(
        config,
        Arc::new(InMemoryRoleReader::with_default_roles()),
        Arc::new(InMemoryUserRepository::new()),
    )
    .await
    .map_err(|e| e.to_string())?;

    let ctx = system.context().with_correlation_id("demo-1");

    let span = tracing::info_span!("user_registration");
    let user_id = async {
        info!("Registering demo user");
        system
            .command_bus
            .dispatch(
                &ctx,
                RegisterUser {
                    line_user_id: "U4af4980629".to_string(),
                    email: Some("alice@example.com".to_string()),
                    display_name: "Alice".to_string(),
                },
            )
            .await
            .map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("profile_update");
    let updated = async {
        system
            .command_bus
            .dispatch(
                &ctx,
                UpdateUserProfile {
                    user_id: user_id.clone(),
                    first_name: Some("Alice".to_string()),
                    bio: Some("Posts gardening jobs".to_string()),
                    ..UpdateUserProfile::default()
                },
            )
            .await
    }
    .instrument(span)
    .await;
    if let Err(e) = updated {
        error!(error = %e, code = %e.code(), "Profile update failed");
    }

    match system
        .query_bus
        .dispatch(&ctx, GetUserProfile { user_id })
        .await
    {
        Ok(profile) => info!(?profile, "Profile loaded"),
        Err(e) => error!(error = %e, code = %e.code(), "Profile lookup failed"),
    }

    info!(stats = ?system.role_cache.stats(), "Role cache stats");

    system.shutdown().await;

    info!("Application completed successfully");
    Ok(())
}
