use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    auth::token::TokenIssuer,
    blogs::repo::{BlogRepo, PgBlogRepo},
    config::AppConfig,
    db,
    users::repo::{PgUserRepo, UserRepo},
};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepo>,
    pub blogs: Arc<dyn BlogRepo>,
    pub tokens: Arc<TokenIssuer>,
}

impl AppState {
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let tokens = Arc::new(TokenIssuer::new(&config.jwt)?);
        let db = db::connect(config).await?;

        Ok(Self {
            users: Arc::new(PgUserRepo::new(db.clone())),
            blogs: Arc::new(PgBlogRepo::new(db)),
            tokens,
        })
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::{config::JwtConfig, db::memory::MemoryDb};

        let mem = Arc::new(MemoryDb::default());
        let tokens = TokenIssuer::new(&JwtConfig {
            secret: "test-secret-key-that-is-32-bytes!!".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 30,
        })
        .expect("test jwt config is valid");

        Self {
            users: mem.clone(),
            blogs: mem,
            tokens: Arc::new(tokens),
        }
    }
}

impl FromRef<AppState> for Arc<TokenIssuer> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}
