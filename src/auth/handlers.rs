use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::instrument;

use super::{
    dto::{LoginForm, TokenResponse},
    services,
};
use crate::{error::AppResult, extract::AppForm, state::AppState};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    AppForm(form): AppForm<LoginForm>,
) -> AppResult<(StatusCode, Json<TokenResponse>)> {
    let token = services::login(&state, form).await?;
    Ok((StatusCode::ACCEPTED, Json(token)))
}
