//! Narrative figures derived from the monthly activity series.
//!
//! These are display-only projections; they are recomputed from
//! `activity_data` every time a view is rendered and never stored.

use crate::stats::ActivityPoint;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insights<'a> {
    pub most_active: Option<&'a ActivityPoint>,
    pub total: u64,
    pub average: u64,
    pub streak_months: Vec<&'a str>,
}

impl Insights<'_> {
    /// A streak needs at least two months above the average.
    pub fn has_streak(&self) -> bool {
        self.streak_months.len() > 1
    }
}

pub fn derive(activity: &[ActivityPoint]) -> Insights<'_> {
    // earliest month wins a tie
    let most_active = activity.iter().fold(None, |best: Option<&ActivityPoint>, p| {
        match best {
            Some(b) if b.count >= p.count => Some(b),
            _ => Some(p),
        }
    });

    let total: u64 = activity.iter().map(|p| p.count as u64).sum();
    let average = if activity.is_empty() {
        0
    } else {
        (total as f64 / activity.len() as f64).round() as u64
    };

    let streak_months = activity
        .iter()
        .filter(|p| p.count as u64 > average)
        .map(|p| p.month)
        .collect();

    Insights {
        most_active,
        total,
        average,
        streak_months,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::MONTHS;

    fn series(counts: [u32; 12]) -> Vec<ActivityPoint> {
        MONTHS
            .iter()
            .zip(counts)
            .map(|(&month, count)| ActivityPoint { month, count })
            .collect()
    }

    #[test]
    fn totals_and_rounded_average() {
        let data = series([20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 27]);
        let insights = derive(&data);
        assert_eq!(insights.total, 247);
        // 20.58 rounds up
        assert_eq!(insights.average, 21);
        assert_eq!(insights.streak_months, ["Dec"]);
        assert!(!insights.has_streak());
    }

    #[test]
    fn tie_for_most_active_goes_to_earliest_month() {
        let data = series([30, 90, 40, 90, 20, 20, 20, 20, 20, 20, 20, 20]);
        let best = derive(&data).most_active.unwrap();
        assert_eq!(best.month, "Feb");
        assert_eq!(best.count, 90);
    }

    #[test]
    fn streak_lists_months_above_average_in_order() {
        let data = series([100, 20, 20, 100, 20, 20, 20, 20, 20, 20, 20, 100]);
        let insights = derive(&data);
        assert_eq!(insights.average, 40);
        assert_eq!(insights.streak_months, ["Jan", "Apr", "Dec"]);
        assert!(insights.has_streak());
    }

    #[test]
    fn flat_series_has_no_streak() {
        let data = series([50; 12]);
        let insights = derive(&data);
        assert!(insights.streak_months.is_empty());
        assert!(!insights.has_streak());
    }

    #[test]
    fn empty_series() {
        let insights = derive(&[]);
        assert!(insights.most_active.is_none());
        assert_eq!(insights.total, 0);
        assert_eq!(insights.average, 0);
    }
}
