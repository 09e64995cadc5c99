// Ownership / admin gate shared by every pledge, confirmation and
// submission operation.
//
// Order of checks:
//   1. admin session        -> allowed
//   2. edit token of owner  -> allowed
//   3. session of owner     -> allowed
//   4. otherwise            -> 401 when nothing identified the caller, 403 else

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;

/// Everything a request proved about its caller.
#[derive(Debug, Clone, Default)]
pub struct Principal {
    pub session: Option<AuthUser>,
    /// Owner of the edit token passed as `?token=`, already validated.
    pub token_user: Option<i32>,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.session.as_ref().is_some_and(|session| session.is_admin)
    }

    pub fn is_anonymous(&self) -> bool {
        self.session.is_none() && self.token_user.is_none()
    }

    /// The admin session, when the caller is acting as admin.
    pub fn admin(&self) -> Option<&AuthUser> {
        self.session.as_ref().filter(|session| session.is_admin)
    }

    pub fn can_access(&self, owner_id: i32) -> bool {
        self.is_admin()
            || self.token_user == Some(owner_id)
            || self.session.as_ref().is_some_and(|session| session.user_id == owner_id)
    }

    pub fn authorize(&self, owner_id: i32) -> AppResult<()> {
        if self.can_access(owner_id) {
            Ok(())
        } else if self.is_anonymous() {
            Err(AppError::unauthorized("Authentication required"))
        } else {
            Err(AppError::forbidden("Access denied"))
        }
    }

    pub fn require_admin(&self) -> AppResult<&AuthUser> {
        match (&self.session, self.admin()) {
            (_, Some(admin)) => Ok(admin),
            (Some(_), None) => Err(AppError::forbidden("Admin access required")),
            (None, None) => Err(AppError::unauthorized("Authentication required")),
        }
    }

    /// Endpoints under /manage need an edit token unless an admin calls them.
    pub fn require_token_or_admin(&self) -> AppResult<()> {
        if self.is_admin() || self.token_user.is_some() {
            Ok(())
        } else {
            Err(AppError::bad_request("Token is required"))
        }
    }
}

#[cfg(test)]
impl Principal {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_session(session: AuthUser) -> Self {
        Self { session: Some(session), token_user: None }
    }

    pub fn with_token(user_id: i32) -> Self {
        Self { session: None, token_user: Some(user_id) }
    }
}
