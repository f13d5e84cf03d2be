//! Auth routes and shared application state.
//!
//! Sessions are not a thing here: login returns the user record and the SPA
//! keeps it in its own store. Passwords are hashed with argon2 and the hash
//! never appears in a response body.

use crate::api::{internal_error, ApiError};
use crate::db::Db;
use crate::models::{LoginRequest, Message, SignupRequest, UpdateProfileRequest, User, UserRecord};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

// ── Shared state ───────────────────────────────────────────────

pub struct AppState {
    pub db: Db,
}

pub type SharedState = Arc<AppState>;

// ── Password hashing ───────────────────────────────────────────

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// ── Handlers ───────────────────────────────────────────────────

// POST /auth/signup
pub async fn signup(
    State(state): State<SharedState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let name = payload.name.as_deref().unwrap_or("").trim();
    let email = payload.email.as_deref().unwrap_or("").trim();
    let password = payload.password.as_deref().unwrap_or("");
    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(Message::new("All fields are required")),
        ));
    }

    if state
        .db
        .get_user_by_email(email)
        .map_err(internal_error)?
        .is_some()
    {
        warn!(email, "signup rejected: email already registered");
        return Err((
            StatusCode::CONFLICT,
            Json(Message::new("User already exists with this email")),
        ));
    }

    let record = UserRecord {
        name: name.to_string(),
        email: email.to_string(),
        password_hash: hash_password(password).map_err(internal_error)?,
        created_at: Utc::now(),
    };

    let id = state.db.create_user(&record).map_err(internal_error)?;
    info!(%id, email, "user created");

    Ok((StatusCode::CREATED, Json(record.into_user(id))))
}

// POST /auth/login
pub async fn login(
    State(state): State<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<User>, ApiError> {
    let email = payload.email.as_deref().unwrap_or("").trim();
    let password = payload.password.as_deref().unwrap_or("");
    if email.is_empty() || password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(Message::new("Email and password are required")),
        ));
    }

    // Same response for unknown email and bad password.
    let invalid = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(Message::new("Invalid credentials")),
        )
    };

    let (id, record) = state
        .db
        .get_user_by_email(email)
        .map_err(internal_error)?
        .ok_or_else(invalid)?;

    if !verify_password(password, &record.password_hash) {
        warn!(email, "login rejected: bad password");
        return Err(invalid());
    }

    info!(%id, email, "user logged in");
    Ok(Json(record.into_user(id)))
}

// POST /auth/update-profile
pub async fn update_profile(
    State(state): State<SharedState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<Message>, ApiError> {
    let user_id = payload.user_id.as_deref().unwrap_or("").trim();
    let name = payload.name.as_deref().unwrap_or("").trim();
    if user_id.is_empty() || name.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(Message::new("User ID and name are required")),
        ));
    }

    let not_found = || (StatusCode::NOT_FOUND, Json(Message::new("User not found")));

    // An id that is not a UUID cannot match any stored user.
    let id = Uuid::parse_str(user_id).map_err(|_| not_found())?;

    if !state.db.set_user_name(id, name).map_err(internal_error)? {
        return Err(not_found());
    }

    info!(%id, "profile updated");
    Ok(Json(Message::new("Profile updated successfully")))
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_state(name: &str) -> (SharedState, String) {
        let path = format!("/tmp/acadtrack_auth_{name}_{}.redb", std::process::id());
        let _ = fs::remove_file(&path);
        let db = Db::open(&path).unwrap();
        (Arc::new(AppState { db }), path)
    }

    fn cleanup(path: &str) {
        let _ = fs::remove_file(path);
    }

    fn signup_request(name: &str, email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            name: Some(name.into()),
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
        assert!(!verify_password("hunter2", "not-a-hash"));
    }

    #[tokio::test]
    async fn signup_login_flow() {
        let (state, path) = temp_state("flow");

        let (status, Json(user)) = signup(
            State(state.clone()),
            Json(signup_request("Ada", "ada@uni.edu", "hunter2")),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(user.name, "Ada");
        assert!(!user.id.is_empty());

        // Same email again is a conflict.
        let err = signup(
            State(state.clone()),
            Json(signup_request("Ada 2", "ada@uni.edu", "other")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::CONFLICT);

        let Json(logged_in) = login(
            State(state.clone()),
            Json(LoginRequest {
                email: Some("ada@uni.edu".into()),
                password: Some("hunter2".into()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(logged_in.id, user.id);

        let err = login(
            State(state),
            Json(LoginRequest {
                email: Some("ada@uni.edu".into()),
                password: Some("wrong".into()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::UNAUTHORIZED);

        cleanup(&path);
    }

    #[tokio::test]
    async fn signup_requires_all_fields() {
        let (state, path) = temp_state("fields");

        let err = signup(
            State(state),
            Json(SignupRequest {
                name: Some("Ada".into()),
                email: None,
                password: Some("hunter2".into()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);

        cleanup(&path);
    }

    #[tokio::test]
    async fn update_profile_renames_or_404s() {
        let (state, path) = temp_state("profile");

        let (_, Json(user)) = signup(
            State(state.clone()),
            Json(signup_request("Ada", "ada@uni.edu", "hunter2")),
        )
        .await
        .unwrap();

        let Json(msg) = update_profile(
            State(state.clone()),
            Json(UpdateProfileRequest {
                user_id: Some(user.id.clone()),
                name: Some("Ada L.".into()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(msg.message, "Profile updated successfully");

        // Unknown and malformed ids both land on 404.
        for bad_id in [Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
            let err = update_profile(
                State(state.clone()),
                Json(UpdateProfileRequest {
                    user_id: Some(bad_id),
                    name: Some("Ghost".into()),
                }),
            )
            .await
            .unwrap_err();
            assert_eq!(err.0, StatusCode::NOT_FOUND);
        }

        cleanup(&path);
    }
}
