use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};

use super::{
    dto::{BlogSummary, CreateUserRequest, ShowUser},
    repo::{NewUser, User},
};
use crate::{
    auth::password::hash_password,
    error::{AppError, AppResult},
    state::AppState,
};

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub async fn register(state: &AppState, req: CreateUserRequest) -> AppResult<ShowUser> {
    let name = req.name.trim().to_string();
    let email = normalize_email(&req.email);

    if name.is_empty() {
        return Err(AppError::BadRequest("Name must not be empty".into()));
    }
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::BadRequest("Invalid email".into()));
    }
    if req.password.is_empty() {
        return Err(AppError::BadRequest("Password must not be empty".into()));
    }

    if state.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password(&req.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        AppError::Internal(e)
    })?;

    let user = state
        .users
        .create(NewUser {
            name,
            email,
            password_hash,
        })
        .await?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(show_user(user, Vec::new()))
}

pub async fn get_user(state: &AppState, id: i64) -> AppResult<ShowUser> {
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {id} is not found")))?;
    let blogs = state.blogs.list_by_author(user.id).await?;
    Ok(show_user(user, blogs.into_iter().map(BlogSummary::from).collect()))
}

fn show_user(user: User, blogs: Vec<BlogSummary>) -> ShowUser {
    ShowUser {
        id: user.id,
        name: user.name,
        email: user.email,
        blogs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@x.com"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("not an email"));
        assert_eq!(normalize_email("  A@X.com "), "a@x.com");
    }

    #[tokio::test]
    async fn register_stores_hash_not_plaintext() {
        let state = AppState::fake();
        let shown = register(&state, request("A", "A@x.com", "secret")).await.unwrap();
        assert_eq!(shown.email, "a@x.com");

        let stored = state.users.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "secret");
        assert!(crate::auth::password::verify_password(&stored.password_hash, "secret"));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let state = AppState::fake();
        register(&state, request("A", "a@x.com", "secret")).await.unwrap();
        let err = register(&state, request("B", "a@x.com", "other")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn rejects_invalid_input() {
        let state = AppState::fake();
        for req in [
            request("", "a@x.com", "secret"),
            request("A", "nope", "secret"),
            request("A", "a@x.com", ""),
        ] {
            let err = register(&state, req).await.unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)));
        }
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let state = AppState::fake();
        let err = get_user(&state, 42).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "User with id 42 is not found"));
    }
}
