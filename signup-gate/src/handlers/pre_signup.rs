use tracing::Instrument;

use crate::models::PreSignupEvent;
use crate::services::GateError;
use crate::SignupGate;

/// Runs the gate on a Cognito pre-sign-up event and writes the decision into its response.
pub async fn handle_pre_signup(
    gate: &SignupGate,
    mut event: PreSignupEvent,
) -> Result<PreSignupEvent, GateError> {
    let span = tracing::info_span!(
        "pre_signup",
        trigger_source = event.trigger_source.as_deref().unwrap_or("unknown"),
        user_name = event.user_name.as_deref().unwrap_or("unknown"),
    );

    async move {
        let signup = event.signup()?;
        let decision = gate.decide(&signup).await?;
        event.apply(decision);

        tracing::info!(
            auto_confirm_user = decision.auto_confirm,
            auto_verify_email = decision.auto_verify_email,
            "Pre-sign-up decision"
        );
        Ok(event)
    }
    .instrument(span)
    .await
}
