//! `POST /register` and `POST /login`.

use super::required;
use crate::{
    errors::AppError,
    models::{RowId, user::NewUser},
    services::account_service::AccountService,
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

pub const REGISTERED_MESSAGE: &str = "Usuário cadastrado com sucesso!";
pub const LOGGED_IN_MESSAGE: &str = "Login realizado com sucesso!";

/// Body of `POST /register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of `POST /login`. Older clients send the username as `user`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "user")]
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: LoggedInUser,
}

#[derive(Debug, Serialize)]
pub struct LoggedInUser {
    pub id: RowId,
    pub name: String,
}

pub async fn register(
    State(accounts): State<AccountService>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let user = NewUser {
        username: required(req.username, "username")?,
        email: required(req.email, "email")?,
        password: required(req.password, "password")?,
    };

    accounts.register(user).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: REGISTERED_MESSAGE,
        }),
    ))
}

pub async fn login(
    State(accounts): State<AccountService>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(req) = payload?;
    let username = required(req.username, "username")?;
    let password = required(req.password, "password")?;

    let user = accounts.login(&username, &password).await?;

    Ok(Json(LoginResponse {
        message: LOGGED_IN_MESSAGE,
        user: LoggedInUser {
            id: user.id,
            name: user.username,
        },
    }))
}
