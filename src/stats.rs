use crate::github::{DataFetchError, RepoSource, Repository};
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;

pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const TOP_LANGUAGES: usize = 5;
const TOP_REPOS: usize = 3;
const ACTIVITY_MIN: u32 = 20;
const ACTIVITY_MAX: u32 = 119;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageShare {
    pub name: String,
    pub percentage: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositorySummary {
    pub name: String,
    pub stars: u64,
    pub description: String,
}

/// One month of activity. The count is simulated: the unauthenticated API has
/// no per-month commit totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityPoint {
    pub month: &'static str,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResult {
    pub top_languages: Vec<LanguageShare>,
    pub top_repos: Vec<RepositorySummary>,
    pub activity_data: Vec<ActivityPoint>,
}

/// Fetch repos and profile for `username` together and aggregate them.
///
/// Either request failing fails the whole call; nothing partial is returned.
pub async fn compute_stats<S>(source: &S, username: &str) -> Result<StatsResult, DataFetchError>
where
    S: RepoSource + ?Sized,
{
    let (repos, profile) =
        tokio::try_join!(source.list_repos(username), source.user_profile(username))?;

    tracing::debug!(
        login = %profile.login,
        name = ?profile.name,
        public_repos = ?profile.public_repos,
        created_at = ?profile.created_at,
        repos = repos.len(),
        "fetched profile and repositories"
    );

    Ok(StatsResult {
        top_languages: top_languages(&repos),
        top_repos: top_repos(repos),
        activity_data: simulated_activity(&mut rand::thread_rng()),
    })
}

/// Share of total repository size per primary language, highest first.
///
/// Each percentage is rounded on its own, so the list need not sum to 100.
/// Returns an empty list when no sized repository declares a language.
pub fn top_languages(repos: &[Repository]) -> Vec<LanguageShare> {
    let mut totals: Vec<(&str, u64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut grand_total = 0u64;

    for repo in repos {
        let Some(language) = repo.language.as_deref() else {
            continue;
        };
        let size = repo.size.unwrap_or(0);
        let slot = *index.entry(language).or_insert_with(|| {
            totals.push((language, 0));
            totals.len() - 1
        });
        totals[slot].1 = totals[slot].1.saturating_add(size);
        grand_total = grand_total.saturating_add(size);
    }

    if grand_total == 0 {
        return Vec::new();
    }

    let mut shares: Vec<LanguageShare> = totals
        .into_iter()
        .map(|(name, size)| LanguageShare {
            name: name.to_string(),
            percentage: ((size as f64 / grand_total as f64) * 100.0).round() as u8,
        })
        .collect();

    // stable: equal percentages keep first-seen order
    shares.sort_by(|a, b| b.percentage.cmp(&a.percentage));
    shares.truncate(TOP_LANGUAGES);
    shares
}

/// The three most-starred repositories, highest first.
pub fn top_repos(mut repos: Vec<Repository>) -> Vec<RepositorySummary> {
    repos.sort_by(|a, b| {
        b.stargazers_count
            .unwrap_or(0)
            .cmp(&a.stargazers_count.unwrap_or(0))
    });

    repos
        .into_iter()
        .take(TOP_REPOS)
        .map(|repo| RepositorySummary {
            name: repo.name,
            stars: repo.stargazers_count.unwrap_or(0),
            description: repo.description.unwrap_or_default(),
        })
        .collect()
}

/// Placeholder monthly series: one uniform draw in [20, 119] per month.
pub fn simulated_activity<R: Rng>(rng: &mut R) -> Vec<ActivityPoint> {
    MONTHS
        .iter()
        .map(|&month| ActivityPoint {
            month,
            count: rng.gen_range(ACTIVITY_MIN..=ACTIVITY_MAX),
        })
        .collect()
}
