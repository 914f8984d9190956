//! Vibez routes
//!
//! Pages are JSON documents carrying the page name, the login flag and the
//! flash messages queued by the previous request. Form posts answer with a
//! `303 See Other` redirect.

use axum::{
    Extension, Form, Json, Router,
    extract::State,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    AppState,
    error::{AppError, AppResult},
    generator::{GenerateError, PlaylistGenerator},
    middleware::require_login,
    models::{ChoosePlaylistForm, CreatePlaylistForm, LoginForm, NewUser, RegisterForm},
    session::{Session, session_middleware},
    validation::{validate_playlist_form, validate_registration},
};

/// Create the router for the web service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/create", get(create_form).post(create_playlist))
        .route("/generateplaylist", get(generate_playlist))
        .route("/playlists", get(list_playlists).post(choose_playlist))
        .route("/songspage", get(songs_page))
        .route_layer(middleware::from_fn(require_login));

    Router::new()
        .route("/health", get(health_check))
        .route("/", get(index))
        .route("/homepageloggedin", get(homepage_logged_in))
        .route("/register", get(register_form).post(register))
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout))
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Page document for `name`, draining the session's flash messages
async fn page(session: &Session, name: &str, extra: Value) -> Response {
    let flashes = session.take_flashes().await;
    let logged_in = session.user_id().await.is_some();

    let mut body = json!({
        "page": name,
        "logged_in": logged_in,
        "flashes": flashes,
    });
    if let (Some(body), Value::Object(extra)) = (body.as_object_mut(), extra) {
        body.extend(extra);
    }

    Json(body).into_response()
}

/// Queue `message` and redirect to `to`
async fn flash_redirect(session: &Session, message: impl Into<String>, to: &str) -> Response {
    session.flash(message).await;
    Redirect::to(to).into_response()
}

/// User id of a request that passed [`require_login`]
async fn current_user(session: &Session) -> AppResult<i32> {
    session.user_id().await.ok_or_else(|| {
        error!("Protected handler reached without a logged-in user");
        AppError::InternalServerError
    })
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "vibez"
    }))
}

/// Homepage for visitors
pub async fn index(Extension(session): Extension<Session>) -> Response {
    page(&session, "home", json!({})).await
}

/// Homepage shown after login
pub async fn homepage_logged_in(Extension(session): Extension<Session>) -> Response {
    page(&session, "home_logged_in", json!({})).await
}

pub async fn register_form(Extension(session): Extension<Session>) -> Response {
    page(&session, "register", json!({})).await
}

/// Process a registration
pub async fn register(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    if let Err(message) = validate_registration(&form) {
        return Ok(flash_redirect(&session, message, "/register").await);
    }

    let new_user = NewUser::from(form);

    // Check-then-insert; two concurrent registrations can both pass
    let existing = state
        .users
        .find_by_email(&new_user.email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            AppError::InternalServerError
        })?;

    if existing.is_some() {
        return Ok(flash_redirect(&session, "User already exists", "/").await);
    }

    let user = state.users.create(&new_user).await.map_err(|e| {
        error!("Failed to create user: {}", e);
        AppError::InternalServerError
    })?;

    info!("Registered user {}", user.id);
    let message = format!("User {} has been added.", user.first_name);
    Ok(flash_redirect(&session, message, "/login").await)
}

pub async fn login_form(Extension(session): Extension<Session>) -> Response {
    page(&session, "login", json!({})).await
}

/// Process a login
pub async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let user = state
        .users
        .find_by_email(form.email.trim())
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            AppError::InternalServerError
        })?;

    let Some(user) = user else {
        return Ok(flash_redirect(&session, "No such user", "/login").await);
    };

    if user.password != form.password {
        info!("Rejected login for user {}", user.id);
        return Ok(flash_redirect(&session, "Incorrect password", "/login").await);
    }

    session.clear().await;
    session.log_in(user.id).await;
    info!("User {} logged in", user.id);

    Ok(flash_redirect(&session, "Logged in", "/homepageloggedin").await)
}

/// Log out
pub async fn logout(Extension(session): Extension<Session>) -> Response {
    if let Some(user_id) = session.user_id().await {
        info!("User {} logged out", user_id);
    }

    session.clear().await;
    flash_redirect(&session, "Logged out.", "/").await
}

/// First step of the playlist wizard
pub async fn create_form(Extension(session): Extension<Session>) -> Response {
    page(&session, "create", json!({})).await
}

/// Remember the wizard choices and move on to generation
pub async fn create_playlist(
    Extension(session): Extension<Session>,
    Form(form): Form<CreatePlaylistForm>,
) -> Response {
    match validate_playlist_form(&form) {
        Ok(criteria) => {
            session.set_criteria(criteria).await;
            Redirect::to("/generateplaylist").into_response()
        }
        Err(message) => flash_redirect(&session, message, "/create").await,
    }
}

/// Generate, store and show a playlist for the remembered wizard choices
pub async fn generate_playlist(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Response> {
    let user_id = current_user(&session).await?;

    let Some(criteria) = session.criteria().await else {
        return Ok(flash_redirect(
            &session,
            "Choose a genre and danceability range first",
            "/create",
        )
        .await);
    };

    let generated = match PlaylistGenerator::from_state(&state)
        .generate(user_id, &criteria)
        .await
    {
        Ok(generated) => generated,
        Err(GenerateError::NoTracks) => {
            return Ok(flash_redirect(
                &session,
                "No tracks matched those preferences",
                "/create",
            )
            .await);
        }
        Err(GenerateError::Music(e)) => {
            error!("Failed to fetch recommendations: {:#}", e);
            return Err(AppError::MusicService);
        }
        Err(GenerateError::Storage(e)) => {
            error!("Failed to store generated playlist: {:#}", e);
            return Err(AppError::InternalServerError);
        }
    };

    Ok(page(
        &session,
        "generated_playlist",
        json!({
            "playlist": generated.playlist,
            "tracks": generated.tracks,
            "new_songs": generated.new_songs,
        }),
    )
    .await)
}

/// The logged-in user's playlists
pub async fn list_playlists(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Response> {
    let user_id = current_user(&session).await?;

    let playlists = state.playlists.list_by_user(user_id).await.map_err(|e| {
        error!("Failed to list playlists: {}", e);
        AppError::InternalServerError
    })?;

    Ok(page(&session, "playlists", json!({ "playlists": playlists })).await)
}

/// Remember the track ids of the chosen playlist for the songs page
pub async fn choose_playlist(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<ChoosePlaylistForm>,
) -> AppResult<Response> {
    let user_id = current_user(&session).await?;

    let playlist_id: i32 = form
        .playlist_id
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest("playlistId must be an integer".to_string()))?;

    let playlist = state
        .playlists
        .find_for_user(playlist_id, user_id)
        .await
        .map_err(|e| {
            error!("Failed to look up playlist: {}", e);
            AppError::InternalServerError
        })?;

    if playlist.is_none() {
        return Ok(flash_redirect(&session, "No such playlist", "/playlists").await);
    }

    let track_ids = state.playlists.track_ids(playlist_id).await.map_err(|e| {
        error!("Failed to load playlist tracks: {}", e);
        AppError::InternalServerError
    })?;

    session.set_track_ids(track_ids.join(",")).await;
    Ok(Redirect::to("/songspage").into_response())
}

/// Track details for the chosen playlist
pub async fn songs_page(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Response> {
    let Some(track_ids) = session.track_ids().await else {
        return Ok(flash_redirect(&session, "Choose a playlist first", "/playlists").await);
    };

    if track_ids.is_empty() {
        return Ok(page(&session, "songs", json!({ "tracks": [] })).await);
    }

    let token = state.music.access_token().await.map_err(|e| {
        error!("Failed to obtain music API token: {:#}", e);
        AppError::MusicService
    })?;

    let tracks = state.music.tracks(&token, &track_ids).await.map_err(|e| {
        error!("Failed to look up tracks: {:#}", e);
        AppError::MusicService
    })?;

    Ok(page(&session, "songs", json!({ "tracks": tracks })).await)
}
