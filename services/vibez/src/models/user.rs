//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User entity
///
/// The password is kept as submitted; it is never included in responses.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: DateTime<Utc>,
}

/// New user creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Registration form as posted by the browser
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub password: String,
}

impl From<RegisterForm> for NewUser {
    fn from(form: RegisterForm) -> Self {
        Self {
            first_name: form.fname.trim().to_string(),
            last_name: form.lname.trim().to_string(),
            email: form.email.trim().to_string(),
            password: form.password,
        }
    }
}

/// Login form
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}
