//! Session middleware for cookie-based authentication

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::error;
use uuid::Uuid;

use crate::error::AppError;
use crate::session::{SESSION_COOKIE, SessionUser};
use crate::state::AppState;

/// Resolve the session cookie to a logged-in user, if any.
async fn resolve_session(state: &AppState, jar: &CookieJar) -> Result<Option<SessionUser>, AppError> {
    let Some(session_id) = session_id_from(jar) else {
        return Ok(None);
    };

    state.sessions.get_session(session_id).await.map_err(|e| {
        error!("Failed to load session: {}", e);
        AppError::Internal
    })
}

fn session_id_from(jar: &CookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

/// Require a logged-in user. The user is placed in the request extensions
/// for handlers to pick up; anonymous requests get a 401 on API paths and a
/// redirect to the welcome page elsewhere.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let user = match resolve_session(&state, &jar).await {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    match user {
        Some(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        None => {
            if req.uri().path().starts_with("/api/") {
                AppError::Unauthorized.into_response()
            } else {
                Redirect::to("/welcome").into_response()
            }
        }
    }
}

/// Require a guest: logged-in users are sent back to the booking page.
pub async fn guest_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request<Body>,
    next: Next,
) -> Response {
    match resolve_session(&state, &jar).await {
        Ok(Some(_)) => Redirect::to("/").into_response(),
        Ok(None) => next.run(req).await,
        Err(e) => e.into_response(),
    }
}
