// ============================================================================
// MODELS
// ============================================================================
//
// One SeaORM entity per table, plus the value types stored inside them and
// the JSON bodies of the API.
//
// Modules:
//   - users         : participants, identified by email
//   - edit_tokens   : emailed bearer tokens for anonymous edits
//   - admin_users   : administrator credentials (PBKDF2)
//   - pledges       : intended hides (CONCEPT / HIDDEN)
//   - confirmations : already published caches linked to the event
//   - submissions   : the published cache fulfilling a pledge (1:1)
//   - audit_logs    : before/after snapshots of admin mutations
//   - post_likes    : anonymous likes on news posts
//   - values        : ImageSet, Labels, vocabularies
//   - dto           : request / response bodies
//   - health        : health check body
//
// ============================================================================

pub mod health;
pub mod values;
pub mod dto;
pub mod users;
pub mod edit_tokens;
pub mod admin_users;
pub mod pledges;
pub mod confirmations;
pub mod submissions;
pub mod audit_logs;
pub mod post_likes;
