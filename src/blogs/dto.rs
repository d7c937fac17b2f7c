use serde::{Deserialize, Serialize};

use super::repo::BlogWithCreator;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct BlogRequest {
    pub title: String,
    pub body: String,
}

impl BlogRequest {
    /// Trims both fields and rejects empty ones.
    pub fn validated(self) -> Result<Self, AppError> {
        let title = self.title.trim().to_string();
        let body = self.body.trim().to_string();
        if title.is_empty() {
            return Err(AppError::BadRequest("Title must not be empty".into()));
        }
        if body.is_empty() {
            return Err(AppError::BadRequest("Body must not be empty".into()));
        }
        Ok(Self { title, body })
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Creator {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ShowBlog {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub creator: Creator,
}

impl From<BlogWithCreator> for ShowBlog {
    fn from(b: BlogWithCreator) -> Self {
        Self {
            id: b.id,
            title: b.title,
            body: b.body,
            creator: Creator {
                id: b.user_id,
                name: b.creator_name,
                email: b.creator_email,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_trims_and_rejects_blank() {
        let ok = BlogRequest {
            title: "  Hello ".into(),
            body: "world".into(),
        }
        .validated()
        .unwrap();
        assert_eq!(ok.title, "Hello");

        let err = BlogRequest {
            title: "   ".into(),
            body: "world".into(),
        }
        .validated()
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn pagination_defaults() {
        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(p.limit, 20);
        assert_eq!(p.offset, 0);
    }
}
