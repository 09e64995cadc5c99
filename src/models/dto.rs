// Request and response bodies of the JSON API (camelCase on the wire).
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use super::values::{ImagesPayload, AU_STATES, CACHE_SIZES, CACHE_TYPES};
use super::{confirmations, pledges, submissions};

// ---------------------------------------------------------------------------
// Pledges
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePledgeRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(length(max = 100))]
    pub title: Option<String>,
    #[serde(default = "one")]
    #[validate(range(min = 1, max = 50))]
    pub pledged_count: i32,
    #[validate(length(min = 1))]
    pub cache_types: Vec<String>,
    #[validate(length(min = 1))]
    pub cache_sizes: Vec<String>,
    #[validate(length(min = 1))]
    pub states: Vec<String>,
    #[serde(default)]
    pub approx_locations: Vec<String>,
    #[serde(alias = "ideaNotes")]
    #[validate(length(max = 2000))]
    pub concept_notes: Option<String>,
    pub images: Option<ImagesPayload>,
}

impl CreatePledgeRequest {
    pub fn check(&self) -> AppResult<()> {
        self.validate()?;
        check_labels("cacheTypes", &self.cache_types, &CACHE_TYPES)?;
        check_labels("cacheSizes", &self.cache_sizes, &CACHE_SIZES)?;
        check_labels("states", &self.states, &AU_STATES)
    }
}

/// Partial pledge update shared by PATCH /pledges/{id} and PUT /manage/pledge/{id}.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePledgeRequest {
    #[validate(length(min = 1, max = 50))]
    pub gc_username: Option<String>,
    #[validate(length(max = 100))]
    pub title: Option<String>,
    #[validate(range(min = 1, max = 50))]
    pub pledged_count: Option<i32>,
    pub cache_types: Option<Vec<String>>,
    pub cache_sizes: Option<Vec<String>>,
    pub states: Option<Vec<String>>,
    pub approx_locations: Option<Vec<String>>,
    #[validate(length(max = 2000))]
    pub concept_notes: Option<String>,
    pub images: Option<ImagesPayload>,
}

impl UpdatePledgeRequest {
    pub fn check(&self) -> AppResult<()> {
        self.validate()?;
        if let Some(types) = &self.cache_types {
            check_labels("cacheTypes", types, &CACHE_TYPES)?;
        }
        if let Some(sizes) = &self.cache_sizes {
            check_labels("cacheSizes", sizes, &CACHE_SIZES)?;
        }
        if let Some(states) = &self.states {
            check_labels("states", states, &AU_STATES)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PledgeWithSubmission {
    #[serde(flatten)]
    pub pledge: pledges::Model,
    pub submission: Option<submissions::Model>,
}

// ---------------------------------------------------------------------------
// Confirmations
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateConfirmationRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    pub gc_code: String,
    #[validate(length(min = 1, max = 100))]
    pub cache_name: String,
    #[serde(rename = "type")]
    pub cache_type: String,
    #[serde(rename = "size")]
    pub cache_size: String,
    pub difficulty: f64,
    pub terrain: f64,
    #[validate(length(min = 1, max = 100))]
    pub suburb: String,
    pub state: String,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[serde(default)]
    pub no_previous_pledge: bool,
}

impl CreateConfirmationRequest {
    pub fn check(&self) -> AppResult<()> {
        self.validate()?;
        check_gc_code(&self.gc_code)?;
        check_label("type", &self.cache_type, &CACHE_TYPES)?;
        check_label("size", &self.cache_size, &CACHE_SIZES)?;
        check_label("state", &self.state, &AU_STATES)?;
        check_rating("difficulty", self.difficulty)?;
        check_rating("terrain", self.terrain)
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfirmationRequest {
    pub gc_code: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub cache_name: Option<String>,
    #[serde(rename = "type")]
    pub cache_type: Option<String>,
    #[serde(rename = "size")]
    pub cache_size: Option<String>,
    pub difficulty: Option<f64>,
    pub terrain: Option<f64>,
    #[validate(length(min = 1, max = 100))]
    pub suburb: Option<String>,
    pub state: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl UpdateConfirmationRequest {
    pub fn check(&self) -> AppResult<()> {
        self.validate()?;
        if let Some(code) = &self.gc_code {
            check_gc_code(code)?;
        }
        if let Some(cache_type) = &self.cache_type {
            check_label("type", cache_type, &CACHE_TYPES)?;
        }
        if let Some(size) = &self.cache_size {
            check_label("size", size, &CACHE_SIZES)?;
        }
        if let Some(state) = &self.state {
            check_label("state", state, &AU_STATES)?;
        }
        if let Some(difficulty) = self.difficulty {
            check_rating("difficulty", difficulty)?;
        }
        if let Some(terrain) = self.terrain {
            check_rating("terrain", terrain)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PledgeSummary {
    pub id: i32,
    pub pledged_count: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationWithPledge {
    #[serde(flatten)]
    pub confirmation: confirmations::Model,
    pub pledge: Option<PledgeSummary>,
}

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubmissionRequest {
    pub pledge_id: i32,
    pub gc_code: String,
    #[validate(length(min = 1, max = 100))]
    pub cache_name: String,
    #[serde(rename = "type")]
    pub cache_type: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub suburb: String,
    pub state: String,
    pub difficulty: f64,
    pub terrain: f64,
    pub hidden_date: String,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    pub images: Option<ImagesPayload>,
}

impl CreateSubmissionRequest {
    /// Validates the body and returns the parsed hidden date.
    pub fn check(&self) -> AppResult<NaiveDate> {
        self.validate()?;
        check_gc_code(&self.gc_code)?;
        check_label("type", &self.cache_type, &CACHE_TYPES)?;
        check_label("state", &self.state, &AU_STATES)?;
        check_rating("difficulty", self.difficulty)?;
        check_rating("terrain", self.terrain)?;
        parse_hidden_date(&self.hidden_date)
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubmissionRequest {
    pub gc_code: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub cache_name: Option<String>,
    #[serde(rename = "type")]
    pub cache_type: Option<String>,
    #[validate(length(max = 100))]
    pub suburb: Option<String>,
    pub state: Option<String>,
    pub difficulty: Option<f64>,
    pub terrain: Option<f64>,
    pub hidden_date: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    pub images: Option<ImagesPayload>,
}

impl UpdateSubmissionRequest {
    /// Validates the body and returns the parsed hidden date, if one was sent.
    pub fn check(&self) -> AppResult<Option<NaiveDate>> {
        self.validate()?;
        if let Some(code) = &self.gc_code {
            check_gc_code(code)?;
        }
        if let Some(cache_type) = &self.cache_type {
            check_label("type", cache_type, &CACHE_TYPES)?;
        }
        if let Some(state) = &self.state {
            check_label("state", state, &AU_STATES)?;
        }
        if let Some(difficulty) = self.difficulty {
            check_rating("difficulty", difficulty)?;
        }
        if let Some(terrain) = self.terrain {
            check_rating("terrain", terrain)?;
        }
        self.hidden_date.as_deref().map(parse_hidden_date).transpose()
    }
}

// ---------------------------------------------------------------------------
// Auth, profile, likes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct MagicLinkRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 50))]
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyTokenRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub user_id: i32,
    pub email: String,
    pub is_admin: bool,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorQuery {
    pub visitor_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LikeStatus {
    pub liked: bool,
    pub count: u64,
}

// ---------------------------------------------------------------------------
// Field rules
// ---------------------------------------------------------------------------

fn one() -> i32 {
    1
}

fn check_label(field: &str, value: &str, allowed: &[&str]) -> AppResult<()> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(AppError::invalid_field(
            field,
            format!("{value} is not one of {}", allowed.join(", ")),
        ))
    }
}

fn check_labels(field: &str, values: &[String], allowed: &[&str]) -> AppResult<()> {
    values
        .iter()
        .try_for_each(|value| check_label(field, value, allowed))
}

/// Difficulty and terrain run from 1.0 to 5.0 in half steps.
pub fn check_rating(field: &str, value: f64) -> AppResult<()> {
    let doubled = value * 2.0;
    if (1.0..=5.0).contains(&value) && doubled.fract() == 0.0 {
        Ok(())
    } else {
        Err(AppError::invalid_field(field, "must be between 1 and 5 in steps of 0.5"))
    }
}

pub fn check_gc_code(code: &str) -> AppResult<()> {
    let valid = code.len() >= 3
        && code.len() <= 10
        && code.starts_with("GC")
        && code.chars().skip(2).all(|c| c.is_ascii_alphanumeric() && !c.is_ascii_lowercase());
    if valid {
        Ok(())
    } else {
        Err(AppError::invalid_field("gcCode", "must look like GC1A2B3"))
    }
}

/// Accepts `YYYY-MM-DD` or a full ISO timestamp and keeps the date part.
pub fn parse_hidden_date(raw: &str) -> AppResult<NaiveDate> {
    raw.get(..10)
        .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        .ok_or_else(|| AppError::invalid_field("hiddenDate", "must be an ISO date"))
}
