use lambda_runtime::{service_fn, Error, LambdaEvent};
use service_core::error::AppError;
use service_core::observability::logging::init_tracing;
use signup_gate::{
    config::GateConfig,
    handlers::handle_pre_signup,
    models::PreSignupEvent,
    services::{CognitoDirectory, GoogleIdTokenVerifier},
    GateSettings, SignupGate,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load configuration - fail fast if invalid
    let config = GateConfig::from_env()?;

    init_tracing(&config.common.log_level, config.common.json_logs);

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting sign-up gate"
    );

    // Clients live for the whole execution environment and are reused by warm invocations
    let verifier = GoogleIdTokenVerifier::new(&config.google)?;
    let directory = CognitoDirectory::connect(config.directory.user_pool_id.clone()).await;

    let gate = SignupGate::new(
        Arc::new(verifier),
        Arc::new(directory),
        GateSettings::from(&config),
    );
    let gate = &gate;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<PreSignupEvent>| async move {
        handle_pre_signup(gate, event.payload)
            .await
            .map_err(|e| Error::from(AppError::from(e)))
    }))
    .await
}
