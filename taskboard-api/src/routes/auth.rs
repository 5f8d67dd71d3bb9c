/// Authentication and user endpoints
///
/// Sessions are carried in an httpOnly `jwt` cookie set by register and
/// login and cleared by logout. Every endpoint except register and login
/// runs behind the session layer.
///
/// # Endpoints
///
/// - `POST   /api/v1/auth/register` - Register and start a session
/// - `POST   /api/v1/auth/login` - Start a session
/// - `GET    /api/v1/auth/get-user` - Current user
/// - `GET    /api/v1/auth/logout` - Clear the session cookie
/// - `PUT    /api/v1/auth/update-user/:id` - Update own name, email and photo (multipart or JSON)
/// - `DELETE /api/v1/auth/delete-user/:id` - Delete a user
/// - `GET    /api/v1/auth/get-users` - List users

use crate::{
    app::{AppState, SessionUser},
    error::{ApiError, ApiResult},
    middleware::upload::{self, PhotoForm},
    routes::{data, message, ApiJson, DataResponse, MessageResponse, ResourceId},
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{password, session, SESSION_COOKIE},
    models::user::{CreateUser, PublicUser, UpdateUser, User, UserProfile},
    validation::{first_message, require_all},
};
use validator::Validate;

/// Register request
///
/// Fields are optional so a missing one produces the API's own message
/// rather than a deserialisation error.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 5, message = "Name must be at least 5 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Please provide a valid email"))]
    pub email: Option<String>,

    #[validate(length(min = 5, message = "Password must be at least 5 characters"))]
    pub password: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Current-user response; the user sits under `user`, not `data`
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub message: &'static str,
    pub user: UserProfile,
}

/// Order in which register reports failing rules
const REGISTER_RULE_ORDER: [&str; 3] = ["email", "password", "name"];

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(secure)
        .path("/")
        .build()
}

fn start_session(state: &AppState, jar: CookieJar, user_id: i32) -> ApiResult<CookieJar> {
    let token = session::issue(user_id, state.config.session_ttl(), state.jwt_secret())?;
    Ok(jar.add(session_cookie(token, state.config.session.secure_cookie)))
}

/// Register a new user
///
/// ```text
/// POST /api/v1/auth/register
/// { "name": "alice123", "email": "a@example.com", "password": "secret" }
/// ```
///
/// Responds 201 with the user (no password, no photo) and sets the session
/// cookie.
///
/// # Errors
///
/// - `400 Bad Request`: Missing field, invalid email, short password or name
/// - `409 Conflict`: Email already registered
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, CookieJar, Json<DataResponse<PublicUser>>)> {
    let [name, email, plain] = require_all(
        [&req.name, &req.email, &req.password],
        "Please provide name, email, and password",
    )?;

    req.validate()
        .map_err(|e| first_message(&e, &REGISTER_RULE_ORDER))?;

    if User::email_exists(&state.db, email).await? {
        return Err(ApiError::Conflict("User already exist".to_string()));
    }

    let password_hash = password::hash_password(plain)?;

    let user = User::create(
        &state.db,
        CreateUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");

    let jar = start_session(&state, jar, user.id)?;

    Ok((
        StatusCode::CREATED,
        jar,
        data("User registered successfully", PublicUser::from(user)),
    ))
}

/// Log in with email and password
///
/// # Errors
///
/// - `400 Bad Request`: Missing email or password
/// - `401 Unauthorized`: Unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<(CookieJar, Json<DataResponse<PublicUser>>)> {
    let [email, plain] = require_all(
        [&req.email, &req.password],
        "Please provide email and password",
    )?;

    let invalid = || ApiError::unauthorized("Invalid credentials");

    let user = User::find_by_email(&state.db, email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(plain, &user.password)? {
        tracing::debug!(user_id = user.id, "Rejected login with wrong password");
        return Err(invalid());
    }

    let jar = start_session(&state, jar, user.id)?;

    Ok((jar, data("User logged in successfully", PublicUser::from(user))))
}

/// Returns the user behind the current session
pub async fn get_user(
    State(state): State<AppState>,
    Extension(SessionUser(user_id)): Extension<SessionUser>,
) -> ApiResult<Json<UserResponse>> {
    let user = UserProfile::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(UserResponse {
        message: "User retrieved successfully",
        user,
    }))
}

/// Clears the session cookie
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, message("User logged out successfully"))
}

/// Updates the session user's name, email and optionally photo
///
/// Multipart form with `name`, `email` and an optional `photo` file, or a
/// JSON body with `name` and `email`. A new photo replaces the old one,
/// whose file is then deleted.
///
/// # Errors
///
/// - `400 Bad Request`: Missing name or email, or photo not PNG/JPEG
/// - `401 Unauthorized`: Target is not the session user
/// - `404 Not Found`: No such user
/// - `409 Conflict`: Email taken by another user
pub async fn update_user(
    State(state): State<AppState>,
    Extension(session_user): Extension<SessionUser>,
    ResourceId(id): ResourceId,
    headers: HeaderMap,
    form: PhotoForm,
) -> ApiResult<Json<DataResponse<UserProfile>>> {
    match apply_user_update(&state, session_user, id, &headers, &form).await {
        Ok(user) => Ok(data("User updated successfully", user)),
        Err(err) => {
            if let Some(stored) = form.photo {
                upload::remove_in_background(stored.path);
            }
            Err(err)
        }
    }
}

async fn apply_user_update(
    state: &AppState,
    SessionUser(session_id): SessionUser,
    id: i32,
    headers: &HeaderMap,
    form: &PhotoForm,
) -> ApiResult<UserProfile> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if user.id != session_id {
        tracing::warn!(user_id = session_id, target_id = id, "Rejected update of another user");
        return Err(ApiError::unauthorized(
            "You are not authorized to perform this action",
        ));
    }

    let (name, email) = (form.field("name"), form.field("email"));
    let [name, email] = require_all([&name, &email], "Please provide name and email")?;

    let photo = match &form.photo {
        Some(stored) => Some(upload::public_url(
            headers,
            state.config.uploads.public_base_url.as_deref(),
            &stored.filename,
        )),
        None => user.photo.clone(),
    };

    let updated = User::update(
        &state.db,
        id,
        UpdateUser {
            name: name.to_string(),
            email: email.to_string(),
            photo,
        },
    )
    .await?
    .ok_or_else(|| ApiError::not_found("User not found"))?;

    if let (Some(stored), Some(old)) = (&form.photo, &user.photo) {
        let dir = state.config.uploads_dir();
        if upload::photo_path(&dir, old).as_ref() != Some(&stored.path) {
            upload::remove_photo(&dir, old);
        }
    }

    tracing::info!(user_id = id, "User updated");

    Ok(UserProfile::from(updated))
}

/// Deletes a user and their photo
///
/// Tasks assigned to the user are deleted with them.
pub async fn delete_user(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> ApiResult<Json<MessageResponse>> {
    let user = User::delete(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if let Some(photo) = &user.photo {
        upload::remove_photo(&state.config.uploads_dir(), photo);
    }

    tracing::info!(user_id = id, "User deleted");

    Ok(message("User deleted successfully"))
}

/// Lists all users
pub async fn get_users(
    State(state): State<AppState>,
) -> ApiResult<Json<DataResponse<Vec<UserProfile>>>> {
    let users = UserProfile::list(&state.db).await?;
    Ok(data("Users retrieved successfully", users))
}
