use crate::application::user;
use crate::domain::commands::*;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;

use super::AppState;
use crate::api::{
    error::ApiError,
    extractor::AuthenticatedUser,
    types::{CreateUserRequest, TokenRequest, TokenResponse, UpdateProfileRequest, UserResponse},
};

/// POST /users - ユーザー登録
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let cmd = RegisterUser {
        email: req.email,
        password: req.password,
    };
    let user = user::register_user(&state.service_deps, cmd).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /users/token - アクセストークンの発行
pub async fn obtain_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = user::login(&state.service_deps, &req.email, &req.password).await?;
    Ok(Json(token.into()))
}

/// GET /users/me - 自分のプロフィール
pub async fn get_me(AuthenticatedUser(me): AuthenticatedUser) -> Json<UserResponse> {
    Json(me.into())
}

/// PATCH /users/me - 自分のプロフィールを更新
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(me): AuthenticatedUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let cmd = UpdateProfile {
        user_id: me.user_id,
        email: req.email,
        password: req.password,
    };
    let user = user::update_profile(&state.service_deps, cmd).await?;
    Ok(Json(user.into()))
}
