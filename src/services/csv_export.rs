// CSV rendering for the admin exports. The header row is written as is;
// every data field is wrapped in double quotes with inner quotes doubled.
// Lines are joined with a single '\n', no BOM.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::services::admin_service::{AdminConfirmation, AdminPledge, AdminSubmission};

pub const PLEDGE_COLUMNS: [&str; 10] = [
    "ID", "GC Username", "Email", "Title", "Cache Type", "Cache Size", "Suburb", "State", "Status", "Created At",
];

pub const SUBMISSION_COLUMNS: [&str; 12] = [
    "ID", "GC Code", "Cache Name", "GC Username", "Email", "Type", "Difficulty", "Terrain", "Suburb", "State",
    "Hidden Date", "Created At",
];

pub const CONFIRMATION_COLUMNS: [&str; 14] = [
    "Username", "Email", "GC Code", "Cache Name", "Type", "Size", "Difficulty", "Terrain", "Suburb", "State", "Notes",
    "From Non-Pledge", "Pledge ID", "Created At",
];

pub fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn render(columns: &[&str], rows: impl Iterator<Item = Vec<String>>) -> String {
    std::iter::once(columns.join(","))
        .chain(rows.map(|row| row.iter().map(|field| quote(field)).collect::<Vec<_>>().join(",")))
        .collect::<Vec<_>>()
        .join("\n")
}

fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn pledges_csv(rows: &[AdminPledge]) -> String {
    render(
        &PLEDGE_COLUMNS,
        rows.iter().map(|row| {
            let pledge = &row.pledge;
            vec![
                pledge.id.to_string(),
                pledge.gc_username.clone(),
                row.email().to_string(),
                pledge.title.clone().unwrap_or_default(),
                pledge.cache_types.joined(),
                pledge.cache_sizes.joined(),
                pledge.approx_locations.joined(),
                pledge.states.joined(),
                pledge.status.as_str().to_string(),
                timestamp(&pledge.created_at),
            ]
        }),
    )
}

pub fn submissions_csv(rows: &[AdminSubmission]) -> String {
    render(
        &SUBMISSION_COLUMNS,
        rows.iter().map(|row| {
            let submission = &row.submission;
            vec![
                submission.id.to_string(),
                submission.gc_code.clone(),
                submission.cache_name.clone(),
                submission.gc_username.clone(),
                row.email().to_string(),
                submission.cache_type.clone(),
                submission.difficulty.to_string(),
                submission.terrain.to_string(),
                submission.suburb.clone(),
                submission.state.clone(),
                submission.hidden_date.format("%Y-%m-%d").to_string(),
                timestamp(&submission.created_at),
            ]
        }),
    )
}

pub fn confirmations_csv(rows: &[AdminConfirmation]) -> String {
    render(
        &CONFIRMATION_COLUMNS,
        rows.iter().map(|row| {
            let confirmation = &row.confirmation;
            vec![
                row.username().to_string(),
                row.email().to_string(),
                confirmation.gc_code.clone(),
                confirmation.cache_name.clone(),
                confirmation.cache_type.clone(),
                confirmation.cache_size.clone(),
                confirmation.difficulty.to_string(),
                confirmation.terrain.to_string(),
                confirmation.suburb.clone(),
                confirmation.state.clone(),
                confirmation.notes.clone().unwrap_or_default(),
                if confirmation.from_non_pledge { "Yes" } else { "No" }.to_string(),
                confirmation.pledge_id.map(|id| id.to_string()).unwrap_or_default(),
                timestamp(&confirmation.created_at),
            ]
        }),
    )
}
