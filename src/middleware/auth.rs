use actix_web::{dev::Payload, http::header, web, Error, FromRequest, HttpRequest};
use chrono::Utc;
use futures::future::{ready, LocalBoxFuture, Ready};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::dto::TokenQuery;
use crate::services::access::Principal;
use crate::services::edit_token_service::EditTokenService;
use crate::state::AppState;
use crate::utils::jwt;

/// Identity carried by a valid session token.
/// Extracting it directly makes the session mandatory (401 otherwise).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
    pub is_admin: bool,
}

fn app_state(req: &HttpRequest) -> Result<web::Data<AppState>, AppError> {
    req.app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::Internal("application state is not registered".to_string()))
}

/// Reads the bearer session. No header means no session; a header that does
/// not hold a valid token is rejected.
fn session_from_request(req: &HttpRequest, state: &AppState) -> Result<Option<AuthUser>, AppError> {
    // 1. Extract the Authorization header
    let Some(auth_header) = req.headers().get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    // 2. Header as string
    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::unauthorized("Invalid Authorization header"))?;

    // 3. "Bearer <token>"
    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::unauthorized("Invalid Authorization format (expected: Bearer <token>)"))?;

    // 4. Verify the JWT
    let claims = jwt::verify_token(&state.config.jwt_secret, token).map_err(AppError::Unauthorized)?;

    // 5. Admin when flagged at login or when the email is the configured admin
    Ok(Some(AuthUser {
        user_id: claims.sub,
        is_admin: claims.is_admin || state.config.is_admin_email(&claims.email),
        email: claims.email,
    }))
}

impl FromRequest for AuthUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = app_state(req)
            .and_then(|state| session_from_request(req, &state))
            .and_then(|session| session.ok_or_else(|| AppError::unauthorized("Missing Authorization header")));

        ready(result.map_err(Error::from))
    }
}

/// Optional session plus optional `?token=` edit token. An invalid or expired
/// edit token fails the request with 401; an absent one is left to the handler.
impl FromRequest for Principal {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let state = app_state(&req)?;
            let session = session_from_request(&req, &state)?;

            let token = web::Query::<TokenQuery>::from_query(req.query_string())
                .ok()
                .and_then(|query| query.into_inner().token)
                .filter(|token| !token.is_empty());

            let token_user = match token {
                Some(token) => {
                    let user_id = EditTokenService::validate(&state.db, &token, Utc::now())
                        .await
                        .map_err(AppError::from)?;
                    Some(user_id.ok_or_else(|| AppError::unauthorized("Invalid or expired token"))?)
                }
                None => None,
            };

            Ok(Principal { session, token_user })
        })
    }
}
