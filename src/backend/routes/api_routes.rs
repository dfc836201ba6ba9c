/**
 * API Route Handlers
 *
 * Account, profile and file endpoints.
 *
 * # Routes
 *
 * ## Public
 * - `POST /api/auth/signup`, `POST /api/auth/login`, `POST /api/auth/logout`
 * - `POST /api/auth/refresh`
 * - `POST /api/auth/verify/{target}`, `POST /api/auth/confirm`
 * - `POST /api/auth/reset-password`, `POST /api/auth/migrate-email`,
 *   `POST /api/auth/terminate-account` (signed license)
 * - `GET /api/auth/google/start`, `GET /api/auth/google`
 *
 * ## Session
 * - `GET /api/auth/me`, `POST /api/auth/personalize/{field}`,
 *   `POST /api/auth/two-factor`
 * - `GET /api/profiles/{user_id}`
 * - `POST /api/files/avatar`, `DELETE /api/files/{file_id}`
 */

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::backend::auth::handlers::{
    confirm, google_callback, google_start, login, logout, me, migrate_email, personalize, profile,
    refresh, reset_password, signup, terminate_account, toggle_2fa, verify,
};
use crate::backend::files::{delete_file_handler, upload_avatar};
use crate::backend::middleware::auth_middleware;
use crate::backend::server::state::AppState;

/// Configure API routes
///
/// Session routes sit behind `auth_middleware`, which answers 401
/// `sessionInvalid` before the handler runs. Licensed routes check their
/// license in the handler.
pub fn configure_api_routes(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/verify/{target}", post(verify))
        .route("/api/auth/confirm", post(confirm))
        .route("/api/auth/reset-password", post(reset_password))
        .route("/api/auth/migrate-email", post(migrate_email))
        .route("/api/auth/terminate-account", post(terminate_account))
        .route("/api/auth/google/start", get(google_start))
        .route("/api/auth/google", get(google_callback));

    let protected = Router::new()
        .route("/api/auth/me", get(me))
        .route("/api/auth/personalize/{field}", post(personalize))
        .route("/api/auth/two-factor", post(toggle_2fa))
        .route("/api/profiles/{user_id}", get(profile))
        .route("/api/files/avatar", post(upload_avatar))
        .route("/api/files/{file_id}", delete(delete_file_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    router.merge(public).merge(protected)
}
