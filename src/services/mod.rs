// ============================================================================
// SERVICES
// ============================================================================
//
// Business logic behind the routes. Handlers stay thin: extract, call one
// service, serialize.
//
// ============================================================================

pub mod access;
pub mod edit_token_service;
pub mod identity_service;
pub mod auth_service;
pub mod audit_service;
pub mod notification_service;
pub mod pledge_service;
pub mod confirmation_service;
pub mod submission_service;
pub mod filters;
pub mod admin_service;
pub mod csv_export;
pub mod stats_service;
pub mod gallery_service;
pub mod like_service;
