use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    error::{ApiError, UserError},
    state::AppState,
    users::{
        dto::CreateUserRequest,
        repo_types::{NewUser, User},
    },
};

const INVALID_BODY: &str = "Invalid request body";

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", post(create_user))
        .route("/api/users/", post(create_user))
        .route("/api/users/:login", get(get_user_by_login))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(payload) = payload.map_err(|e| {
        warn!(error = %e, "create user: malformed body");
        ApiError::bad_request(INVALID_BODY)
    })?;

    let new_user = NewUser::try_from(payload).map_err(|e| {
        warn!(error = %e, "create user: missing field");
        ApiError::bad_request(e.to_string())
    })?;

    let user = match state.users.save(new_user).await {
        Ok(u) => u,
        Err(e) => {
            match &e {
                UserError::Persistence(source) => error!(error = %source, "create user failed"),
                _ => warn!(error = %e, "create user rejected"),
            }
            return Err(ApiError::bad_request(e.to_string()));
        }
    };

    info!(user_id = %user.id, login = %user.login, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state))]
pub async fn get_user_by_login(
    State(state): State<AppState>,
    Path(login): Path<String>,
) -> Result<Json<User>, ApiError> {
    match state.users.get(&login).await {
        Ok(user) => Ok(Json(user)),
        Err(e) => {
            if let UserError::Persistence(source) = &e {
                error!(error = %source, %login, "get user failed");
                return Err(ApiError::internal(e.to_string()));
            }
            warn!(error = %e, %login, "user not found");
            Err(ApiError::not_found(e.to_string()))
        }
    }
}
