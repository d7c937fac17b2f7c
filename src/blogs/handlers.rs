use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{BlogRequest, Pagination, ShowBlog},
    repo::Blog,
};
use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppResult},
    extract::{AppJson, AppPath, AppQuery},
    state::AppState,
};

const MAX_PAGE: i64 = 100;

pub fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/blog", get(list_blogs).post(create_blog))
        .route(
            "/blog/:id",
            get(show_blog).put(update_blog).delete(destroy_blog),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_blog(
    State(state): State<AppState>,
    AuthUser(email): AuthUser,
    AppJson(payload): AppJson<BlogRequest>,
) -> AppResult<(StatusCode, Json<Blog>)> {
    let payload = payload.validated()?;
    let author = state.users.find_by_email(&email).await?.ok_or_else(|| {
        warn!(email = %email, "token subject has no user");
        AppError::InvalidToken
    })?;

    let blog = state
        .blogs
        .create(author.id, &payload.title, &payload.body)
        .await?;
    info!(blog_id = blog.id, user_id = author.id, "blog created");
    Ok((StatusCode::CREATED, Json(blog)))
}

#[instrument(skip(state, _user))]
pub async fn list_blogs(
    State(state): State<AppState>,
    _user: AuthUser,
    AppQuery(p): AppQuery<Pagination>,
) -> AppResult<Json<Vec<ShowBlog>>> {
    let limit = p.limit.clamp(0, MAX_PAGE);
    let offset = p.offset.max(0);
    let rows = state.blogs.list(limit, offset).await?;
    Ok(Json(rows.into_iter().map(ShowBlog::from).collect()))
}

#[instrument(skip(state))]
pub async fn show_blog(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ShowBlog>> {
    let blog = state
        .blogs
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Blog with id {id} is not available")))?;
    Ok(Json(blog.into()))
}

#[instrument(skip(state, _user, payload))]
pub async fn update_blog(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<BlogRequest>,
) -> AppResult<(StatusCode, Json<&'static str>)> {
    let payload = payload.validated()?;
    if !state.blogs.update(id, &payload.title, &payload.body).await? {
        return Err(AppError::NotFound(format!("Blog with id {id} is not found")));
    }
    info!(blog_id = id, "blog updated");
    Ok((StatusCode::ACCEPTED, Json("updated")))
}

#[instrument(skip(state, _user))]
pub async fn destroy_blog(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    if !state.blogs.delete(id).await? {
        return Err(AppError::NotFound(format!("Blog with id {id} is not found")));
    }
    info!(blog_id = id, "blog deleted");
    Ok(StatusCode::NO_CONTENT)
}
