// ============================================================================
// STATS
// ============================================================================
//
// Read-only aggregation over every pledge, confirmation and submission.
//
//   - totals per table, sum of pledged_count
//   - rainmakers: distinct usernames across pledges and submissions
//   - byState / byType / bySize: each list element of a pledge counts once,
//     each confirmation and submission counts once for its own value
//   - *Breakdown: the same counts kept apart per source
//   - pledges per UTC day and per Monday-to-Sunday week
//
// ============================================================================

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use sea_orm::*;
use serde::Serialize;

use crate::models::{confirmations, pledges, submissions};

pub const RAINMAKER_SAMPLE_SIZE: usize = 25;

pub type Counts = BTreeMap<String, u64>;

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct Breakdown {
    pub pledges: Counts,
    pub confirmations: Counts,
    pub submissions: Counts,
}

impl Breakdown {
    /// All sources added together.
    pub fn combined(&self) -> Counts {
        let mut total = Counts::new();
        for counts in [&self.pledges, &self.confirmations, &self.submissions] {
            for (key, count) in counts {
                *total.entry(key.clone()).or_default() += count;
            }
        }
        total
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LatestPledge {
    pub id: i32,
    pub gc_username: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_pledges: u64,
    pub total_confirmations: u64,
    pub total_submissions: u64,
    pub total_caches_pledged: i64,
    pub rainmakers: u64,
    pub by_state: Counts,
    pub by_type: Counts,
    pub by_size: Counts,
    pub state_breakdown: Breakdown,
    pub type_breakdown: Breakdown,
    pub size_breakdown: Breakdown,
    pub latest_pledge: Option<LatestPledge>,
    pub rainmaker_sample: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    #[serde(flatten)]
    pub stats: Stats,
    pub total_pledgers: u64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DayCount {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeekCount {
    pub week_start: String,
    pub week_end: String,
    pub count: u64,
}

fn bump<'a>(counts: &mut Counts, keys: impl IntoIterator<Item = &'a String>) {
    for key in keys {
        *counts.entry(key.clone()).or_default() += 1;
    }
}

/// Monday of the week `day` falls in.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

fn iso_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Pure aggregation; `rng` only picks the rainmaker sample.
pub fn aggregate<R: Rng + ?Sized>(
    pledges: &[pledges::Model],
    confirmations: &[confirmations::Model],
    submissions: &[submissions::Model],
    rng: &mut R,
) -> Stats {
    let mut states = Breakdown::default();
    let mut types = Breakdown::default();
    let mut sizes = Breakdown::default();

    for pledge in pledges {
        bump(&mut states.pledges, pledge.states.iter());
        bump(&mut types.pledges, pledge.cache_types.iter());
        bump(&mut sizes.pledges, pledge.cache_sizes.iter());
    }
    for confirmation in confirmations {
        bump(&mut states.confirmations, [&confirmation.state]);
        bump(&mut types.confirmations, [&confirmation.cache_type]);
        bump(&mut sizes.confirmations, [&confirmation.cache_size]);
    }
    for submission in submissions {
        bump(&mut states.submissions, [&submission.state]);
        bump(&mut types.submissions, [&submission.cache_type]);
    }

    let rainmakers: BTreeSet<&str> = pledges
        .iter()
        .map(|pledge| pledge.gc_username.as_str())
        .chain(submissions.iter().map(|submission| submission.gc_username.as_str()))
        .filter(|name| !name.is_empty())
        .collect();
    let names: Vec<&str> = rainmakers.iter().copied().collect();
    let rainmaker_sample = names
        .choose_multiple(rng, RAINMAKER_SAMPLE_SIZE)
        .map(|name| (*name).to_owned())
        .collect();

    let latest_pledge = pledges
        .iter()
        .max_by_key(|pledge| (pledge.created_at, pledge.id))
        .map(|pledge| LatestPledge {
            id: pledge.id,
            gc_username: pledge.gc_username.clone(),
            title: pledge.title.clone(),
            created_at: pledge.created_at,
        });

    Stats {
        total_pledges: pledges.len() as u64,
        total_confirmations: confirmations.len() as u64,
        total_submissions: submissions.len() as u64,
        total_caches_pledged: pledges.iter().map(|pledge| i64::from(pledge.pledged_count)).sum(),
        rainmakers: rainmakers.len() as u64,
        by_state: states.combined(),
        by_type: types.combined(),
        by_size: sizes.combined(),
        state_breakdown: states,
        type_breakdown: types,
        size_breakdown: sizes,
        latest_pledge,
        rainmaker_sample,
    }
}

/// Distinct users owning at least one pledge or confirmation.
pub fn count_pledgers(pledges: &[pledges::Model], confirmations: &[confirmations::Model]) -> u64 {
    pledges
        .iter()
        .map(|pledge| pledge.user_id)
        .chain(confirmations.iter().map(|confirmation| confirmation.user_id))
        .collect::<HashSet<_>>()
        .len() as u64
}

/// Pledges per UTC calendar day, oldest first.
pub fn by_day(created: &[DateTime<Utc>]) -> Vec<DayCount> {
    let mut days: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for at in created {
        *days.entry(at.date_naive()).or_default() += 1;
    }
    days.into_iter()
        .map(|(day, count)| DayCount { date: iso_day(day), count })
        .collect()
}

/// Pledges per Monday-to-Sunday week, oldest first.
pub fn by_week(created: &[DateTime<Utc>]) -> Vec<WeekCount> {
    let mut weeks: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for at in created {
        *weeks.entry(week_start(at.date_naive())).or_default() += 1;
    }
    weeks
        .into_iter()
        .map(|(start, count)| WeekCount {
            week_start: iso_day(start),
            week_end: iso_day(start + Duration::days(6)),
            count,
        })
        .collect()
}

pub struct StatsService;

impl StatsService {
    pub async fn public(db: &DatabaseConnection) -> Result<Stats, DbErr> {
        let (pledges, confirmations, submissions) = Self::load(db).await?;
        Ok(aggregate(&pledges, &confirmations, &submissions, &mut rand::thread_rng()))
    }

    pub async fn admin(db: &DatabaseConnection) -> Result<AdminStats, DbErr> {
        let (pledges, confirmations, submissions) = Self::load(db).await?;
        let total_pledgers = count_pledgers(&pledges, &confirmations);
        let stats = aggregate(&pledges, &confirmations, &submissions, &mut rand::thread_rng());
        Ok(AdminStats { stats, total_pledgers })
    }

    pub async fn pledges_by_day(db: &DatabaseConnection) -> Result<Vec<DayCount>, DbErr> {
        Ok(by_day(&Self::pledge_times(db).await?))
    }

    pub async fn pledges_by_week(db: &DatabaseConnection) -> Result<Vec<WeekCount>, DbErr> {
        Ok(by_week(&Self::pledge_times(db).await?))
    }

    async fn pledge_times(db: &DatabaseConnection) -> Result<Vec<DateTime<Utc>>, DbErr> {
        pledges::Entity::find()
            .select_only()
            .column(pledges::Column::CreatedAt)
            .order_by_asc(pledges::Column::CreatedAt)
            .into_tuple::<DateTime<Utc>>()
            .all(db)
            .await
    }

    async fn load(
        db: &DatabaseConnection,
    ) -> Result<(Vec<pledges::Model>, Vec<confirmations::Model>, Vec<submissions::Model>), DbErr> {
        let pledges = pledges::Entity::find().all(db).await?;
        let confirmations = confirmations::Entity::find().all(db).await?;
        let submissions = submissions::Entity::find().all(db).await?;
        Ok((pledges, confirmations, submissions))
    }
}
