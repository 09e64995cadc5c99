// Admin list / export filters. The creation-date range is pushed into SQL;
// the field filters run over the loaded rows because pledges keep their
// states and types in JSON lists.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::{ColumnTrait, QueryFilter};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::{confirmations, pledges, submissions, users};

/// Query string accepted by every /admin list and export endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQuery {
    pub state: Option<String>,
    pub cache_type: Option<String>,
    pub gc_username: Option<String>,
    pub search: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct RecordFilter {
    state: Option<String>,
    cache_type: Option<String>,
    gc_username: Option<String>, // lowercased
    search: Option<String>,      // lowercased
    created_from: Option<DateTime<Utc>>,
    created_before: Option<DateTime<Utc>>, // exclusive: day after endDate
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty() && v != "all")
}

fn parse_day(field: &str, raw: &str) -> AppResult<NaiveDate> {
    raw.get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        .ok_or_else(|| AppError::invalid_field(field, "must be a YYYY-MM-DD date"))
}

fn midnight(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc()
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

impl TryFrom<FilterQuery> for RecordFilter {
    type Error = AppError;

    fn try_from(query: FilterQuery) -> AppResult<Self> {
        let created_from = non_empty(query.start_date)
            .map(|raw| parse_day("startDate", &raw).map(midnight))
            .transpose()?;
        let created_before = non_empty(query.end_date)
            .map(|raw| parse_day("endDate", &raw).map(|day| midnight(day) + Duration::days(1)))
            .transpose()?;

        Ok(Self {
            state: non_empty(query.state),
            cache_type: non_empty(query.cache_type),
            gc_username: non_empty(query.gc_username).map(|v| v.to_lowercase()),
            search: non_empty(query.search).map(|v| v.to_lowercase()),
            created_from,
            created_before,
        })
    }
}

impl RecordFilter {
    /// Restricts `query` to the requested creation-date range.
    pub fn created_between<Q: QueryFilter, C: ColumnTrait>(&self, query: Q, column: C) -> Q {
        let query = match self.created_from {
            Some(from) => query.filter(column.gte(from)),
            None => query,
        };
        match self.created_before {
            Some(before) => query.filter(column.lt(before)),
            None => query,
        }
    }

    fn username_matches(&self, username: &str) -> bool {
        self.gc_username
            .as_deref()
            .is_none_or(|needle| contains_ci(username, needle))
    }

    fn search_matches<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        match self.search.as_deref() {
            None => true,
            Some(needle) => fields.into_iter().any(|field| contains_ci(field, needle)),
        }
    }

    pub fn matches_pledge(&self, pledge: &pledges::Model) -> bool {
        let locations = pledge.approx_locations.joined();
        self.state.as_deref().is_none_or(|state| pledge.states.contains(state))
            && self.cache_type.as_deref().is_none_or(|t| pledge.cache_types.contains(t))
            && self.username_matches(&pledge.gc_username)
            && self.search_matches([
                pledge.gc_username.as_str(),
                pledge.title.as_deref().unwrap_or_default(),
                locations.as_str(),
                pledge.concept_notes.as_deref().unwrap_or_default(),
            ])
    }

    pub fn matches_submission(&self, submission: &submissions::Model) -> bool {
        self.state.as_deref().is_none_or(|state| submission.state == state)
            && self.cache_type.as_deref().is_none_or(|t| submission.cache_type == t)
            && self.username_matches(&submission.gc_username)
            && self.search_matches([
                submission.gc_username.as_str(),
                submission.gc_code.as_str(),
                submission.cache_name.as_str(),
                submission.suburb.as_str(),
                submission.notes.as_deref().unwrap_or_default(),
            ])
    }

    /// Confirmations carry no username of their own; the owner's is used.
    pub fn matches_confirmation(&self, confirmation: &confirmations::Model, owner: Option<&users::Model>) -> bool {
        let username = owner.map(|user| user.username.as_str()).unwrap_or_default();
        self.state.as_deref().is_none_or(|state| confirmation.state == state)
            && self.cache_type.as_deref().is_none_or(|t| confirmation.cache_type == t)
            && self.username_matches(username)
            && self.search_matches([
                username,
                confirmation.gc_code.as_str(),
                confirmation.cache_name.as_str(),
                confirmation.suburb.as_str(),
                confirmation.notes.as_deref().unwrap_or_default(),
            ])
    }
}
