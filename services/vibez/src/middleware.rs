//! Login gate for protected routes

use axum::{
    Extension,
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::info;

use crate::session::Session;

/// Flash message and redirect target for an anonymous visitor of `path`
fn login_redirect_for(path: &str) -> (&'static str, &'static str) {
    match path {
        "/create" => ("User may create playlist after logging in", "/"),
        "/playlists" => ("User may view their playlist after logging in", "/login"),
        _ => ("Please log in first", "/login"),
    }
}

/// Let the request through only when the session carries a user id
pub async fn require_login(
    Extension(session): Extension<Session>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if session.user_id().await.is_some() {
        return next.run(req).await;
    }

    let (message, target) = login_redirect_for(req.uri().path());
    info!("Redirecting anonymous request for {} to {}", req.uri().path(), target);

    session.flash(message).await;
    Redirect::to(target).into_response()
}
