use crate::insights;
use crate::stats::StatsResult;
use std::fmt::Write;

const BAR_WIDTH: usize = 30;
const CHART_WIDTH: usize = 40;

fn bar(value: u64, max: u64, width: usize) -> String {
    let filled = if max == 0 {
        0
    } else {
        ((value as f64 / max as f64) * width as f64).round() as usize
    };
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Plain-text rendering of all three views plus insights.
pub fn render(username: &str, year: i32, stats: &StatsResult) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "GitHub Wrapped {year} · {username}");
    let _ = writeln!(out);

    let _ = writeln!(out, "Top Languages");
    if stats.top_languages.is_empty() {
        let _ = writeln!(out, "  (no language data)");
    }
    let name_width = stats
        .top_languages
        .iter()
        .map(|l| l.name.chars().count())
        .max()
        .unwrap_or(0);
    for lang in &stats.top_languages {
        let _ = writeln!(
            out,
            "  {:<name_width$}  {} {:>3}%",
            lang.name,
            bar(lang.percentage as u64, 100, BAR_WIDTH),
            lang.percentage
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Top Repositories");
    if stats.top_repos.is_empty() {
        let _ = writeln!(out, "  (no repositories)");
    }
    for repo in &stats.top_repos {
        let _ = writeln!(out, "  {} ★ {}", repo.name, repo.stars);
        if !repo.description.is_empty() {
            let _ = writeln!(out, "    {}", repo.description);
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Activity Overview (simulated)");
    let max = stats
        .activity_data
        .iter()
        .map(|p| p.count as u64)
        .max()
        .unwrap_or(0);
    for point in &stats.activity_data {
        let _ = writeln!(
            out,
            "  {} {} {:>3}",
            point.month,
            bar(point.count as u64, max, CHART_WIDTH),
            point.count
        );
    }
    let _ = writeln!(out);

    let insights = insights::derive(&stats.activity_data);
    let _ = writeln!(out, "Your Year in Review");
    if let Some(best) = insights.most_active {
        let _ = writeln!(out, "  Most Active Month: {}", best.month);
        let _ = writeln!(out, "    You made {} contributions!", best.count);
    }
    let _ = writeln!(out, "  Total Contributions: {}", insights.total);
    let _ = writeln!(
        out,
        "    That's an average of {} per month!",
        insights.average
    );
    if insights.has_streak() {
        let _ = writeln!(out, "  Productive Streaks");
        let _ = writeln!(
            out,
            "    You were on fire during {}!",
            insights.streak_months.join(", ")
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{ActivityPoint, LanguageShare, MONTHS, RepositorySummary};

    fn sample() -> StatsResult {
        StatsResult {
            top_languages: vec![
                LanguageShare {
                    name: "Rust".into(),
                    percentage: 60,
                },
                LanguageShare {
                    name: "Go".into(),
                    percentage: 40,
                },
            ],
            top_repos: vec![
                RepositorySummary {
                    name: "wrapped".into(),
                    stars: 50,
                    description: "year in review".into(),
                },
                RepositorySummary {
                    name: "dotfiles".into(),
                    stars: 3,
                    description: String::new(),
                },
            ],
            activity_data: MONTHS
                .iter()
                .enumerate()
                .map(|(i, &month)| ActivityPoint {
                    month,
                    count: if i % 4 == 0 { 100 } else { 20 },
                })
                .collect(),
        }
    }

    #[test]
    fn bar_scales_and_clamps() {
        assert_eq!(bar(50, 100, 10), "█████░░░░░");
        assert_eq!(bar(0, 0, 4), "░░░░");
        assert_eq!(bar(200, 100, 4), "████");
    }

    #[test]
    fn renders_every_section() {
        let text = render("octocat", 2024, &sample());
        assert!(text.starts_with("GitHub Wrapped 2024 · octocat"));
        assert!(text.contains(" 60%"));
        assert!(text.contains("wrapped ★ 50"));
        assert!(text.contains("year in review"));
        assert!(text.contains("Activity Overview (simulated)"));
        assert!(text.contains("Most Active Month: Jan"));
        assert!(text.contains("Total Contributions: 480"));
        assert!(text.contains("You were on fire during Jan, May, Sep!"));
    }

    #[test]
    fn empty_sections_are_labeled() {
        let stats = StatsResult {
            top_languages: vec![],
            top_repos: vec![],
            activity_data: sample().activity_data,
        };
        let text = render("nobody", 2024, &stats);
        assert!(text.contains("(no language data)"));
        assert!(text.contains("(no repositories)"));
    }
}
