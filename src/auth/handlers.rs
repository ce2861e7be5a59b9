use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{info, instrument, Span};

use crate::{
    auth::{
        dto::{AuthResponse, PublicUser, RefreshRequest, RegisterResponse},
        jwt::{AuthUser, ACCESS_COOKIE, REFRESH_COOKIE},
        service::Session,
    },
    error::AppError,
    state::AppState,
    validation::{SignInForm, SignUpForm},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn with_session(jar: CookieJar, session: &Session, secure: bool) -> CookieJar {
    let access = Cookie::build((ACCESS_COOKIE, session.access_token.clone()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(session.expires_in));
    let refresh = Cookie::build((REFRESH_COOKIE, session.refresh_token.clone()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax);
    jar.add(access).add(refresh)
}

fn without_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(ACCESS_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_COOKIE).path("/"))
}

/// Registration never opens a session; the account has to be confirmed
/// through the emailed link first.
#[instrument(skip_all, fields(email = tracing::field::Empty))]
pub async fn register(
    State(state): State<AppState>,
    form: Result<Json<SignUpForm>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let Json(form) = form?;
    let input = form.validate()?;
    Span::current().record("email", input.email.as_str());
    let outcome = state.auth.sign_up(&input.email, &input.password).await?;

    info!(user_id = %outcome.user.id, "user registered");
    let message = if outcome.confirmation_required {
        "User was registered successfully! Please check email for confirmation"
    } else {
        "User was registered successfully!"
    };
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: outcome.user.into(),
            confirmation_required: outcome.confirmation_required,
            message: message.into(),
        }),
    ))
}

#[instrument(skip_all, fields(email = tracing::field::Empty))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    form: Result<Json<SignInForm>, JsonRejection>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let Json(form) = form?;
    let input = form.validate()?;
    Span::current().record("email", input.email.as_str());
    let session = state.auth.sign_in(&input.email, &input.password).await?;

    info!(user_id = %session.user.id, "user signed in");
    let jar = with_session(jar, &session, state.config.cookie_secure);
    Ok((jar, Json(session.into())))
}

#[instrument(skip_all)]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let token = body
        .and_then(|Json(b)| b.refresh_token)
        .or_else(|| jar.get(REFRESH_COOKIE).map(|c| c.value().to_string()))
        .ok_or(AppError::Unauthorized("Refresh token required"))?;

    let session = state.auth.refresh(&token).await?;
    let jar = with_session(jar, &session, state.config.cookie_secure);
    Ok((jar, Json(session.into())))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
    jar: CookieJar,
) -> Result<(StatusCode, CookieJar), AppError> {
    state.auth.sign_out(&user.access_token).await?;
    info!("user signed out");
    Ok((StatusCode::NO_CONTENT, without_session(jar)))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    let info = state
        .auth
        .current_user(&user.access_token)
        .await?
        .ok_or(AppError::Unauthorized("Session is no longer valid"))?;
    Ok(Json(info.into()))
}
