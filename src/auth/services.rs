use tracing::{info, warn};

use super::{
    dto::{LoginForm, TokenResponse},
    password::{verify_password, verify_without_user},
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
    users::services::normalize_email,
};

/// Verifies the presented credentials and issues an access token whose subject is
/// the user's email.
pub async fn login(state: &AppState, form: LoginForm) -> AppResult<TokenResponse> {
    if let Some(grant_type) = form.grant_type.as_deref() {
        if grant_type != "password" {
            return Err(AppError::BadRequest("Unsupported grant_type".into()));
        }
    }

    let email = normalize_email(&form.username);
    let user = match state.users.find_by_email(&email).await? {
        Some(u) => u,
        None => {
            verify_without_user(&form.password);
            warn!(email = %email, "login unknown email");
            return Err(AppError::InvalidCredentials);
        }
    };

    if !verify_password(&user.password_hash, &form.password) {
        warn!(email = %email, user_id = user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let access_token = state.tokens.issue_for_subject(&user.email)?;
    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(TokenResponse::bearer(access_token))
}
