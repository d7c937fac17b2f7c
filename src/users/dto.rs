use serde::{Deserialize, Serialize};

use crate::blogs::repo::Blog;

/// Request body for user registration.
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Post summary nested under its author.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BlogSummary {
    pub id: i64,
    pub title: String,
    pub body: String,
}

impl From<Blog> for BlogSummary {
    fn from(b: Blog) -> Self {
        Self {
            id: b.id,
            title: b.title,
            body: b.body,
        }
    }
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShowUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub blogs: Vec<BlogSummary>,
}
