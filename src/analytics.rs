//! Training-load analytics: daily aggregation, acute/chronic sums, the
//! acute:chronic workload ratio, and the bucketed views the dashboard
//! charts from.
//!
//! Everything here is pure: callers pass `today` in, so results are
//! deterministic and the whole module is testable without a clock.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use itertools::Itertools;
use serde::Serialize;

use crate::workout::Workout;

/// Trailing window for the acute load sum, inclusive of today.
pub const ACUTE_WINDOW_DAYS: u32 = 7;
/// Trailing window feeding the chronic average, inclusive of today.
pub const CHRONIC_WINDOW_DAYS: u32 = 28;

/// One calendar day of summed load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyLoad {
    pub day: NaiveDate,
    pub load: f64,
}

/// A trailing 7-day slice of the chronic window, for the 4-week chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekBucket {
    pub label: &'static str,
    pub load: f64,
}

/// One row of the last-7-days breakdown list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBreakdown {
    pub day: NaiveDate,
    pub label: String,
    pub load: f64,
    pub is_today: bool,
}

/// Risk-band classification of the ratio.
///
/// The bands are order-sensitive and intentionally leave the transition
/// zones (0.7, 0.8) and (1.3, 1.5] without a label; the caller renders a
/// neutral placeholder for those.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum TrendLabel {
    #[strum(serialize = "High Load Increase")]
    HighLoadIncrease,
    #[strum(serialize = "Stable Load")]
    StableLoad,
    #[strum(serialize = "Reduced Load")]
    ReducedLoad,
}

impl TrendLabel {
    pub fn classify(ratio: f64) -> Option<TrendLabel> {
        if ratio > 1.5 {
            Some(TrendLabel::HighLoadIncrease)
        } else if (0.8..=1.3).contains(&ratio) {
            Some(TrendLabel::StableLoad)
        } else if ratio < 0.7 {
            Some(TrendLabel::ReducedLoad)
        } else {
            None
        }
    }
}

fn loads_by_day(workouts: &[Workout]) -> HashMap<NaiveDate, f64> {
    workouts
        .iter()
        .map(|w| (w.date, w.load))
        .into_grouping_map()
        .sum()
}

/// Reduce workouts into a zero-filled daily series covering the trailing
/// `window_days` ending at `today`, oldest first.
pub fn aggregate(workouts: &[Workout], window_days: u32, today: NaiveDate) -> Vec<DailyLoad> {
    let by_day = loads_by_day(workouts);

    (0..window_days)
        .rev()
        .map(|back| {
            let day = today - Days::new(u64::from(back));
            DailyLoad {
                day,
                load: by_day.get(&day).copied().unwrap_or(0.0),
            }
        })
        .collect()
}

/// Sum of daily load over the trailing 7 days.
pub fn acute_load(workouts: &[Workout], today: NaiveDate) -> f64 {
    aggregate(workouts, ACUTE_WINDOW_DAYS, today)
        .iter()
        .map(|d| d.load)
        .sum()
}

/// Rolling 4-week average: 28-day sum divided by 4.
pub fn chronic_load(workouts: &[Workout], today: NaiveDate) -> f64 {
    let sum: f64 = aggregate(workouts, CHRONIC_WINDOW_DAYS, today)
        .iter()
        .map(|d| d.load)
        .sum();
    sum / 4.0
}

/// Acute divided by chronic. A zero chronic load yields 0 ("no load"),
/// not 1 ("at baseline"), so an empty history shows the neutral trend.
pub fn acwr_ratio(acute: f64, chronic: f64) -> f64 {
    if chronic == 0.0 {
        0.0
    } else {
        acute / chronic
    }
}

/// Everything the metrics panel and the `status` subcommand need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadSummary {
    pub acute: f64,
    pub chronic: f64,
    pub ratio: f64,
    pub trend: Option<TrendLabel>,
}

impl LoadSummary {
    pub fn compute(workouts: &[Workout], today: NaiveDate) -> Self {
        let acute = acute_load(workouts, today);
        let chronic = chronic_load(workouts, today);
        let ratio = acwr_ratio(acute, chronic);
        Self {
            acute,
            chronic,
            ratio,
            trend: TrendLabel::classify(ratio),
        }
    }
}

/// Group day-aggregated loads into four trailing 7-day buckets, oldest
/// first ("Wk 4".."Wk 1"). Future-dated days and days older than the
/// chronic window are excluded, so the buckets partition exactly the same
/// 28 days the chronic average is computed from.
pub fn weekly_buckets(workouts: &[Workout], today: NaiveDate) -> [WeekBucket; 4] {
    let mut buckets = [
        WeekBucket { label: "Wk 4", load: 0.0 },
        WeekBucket { label: "Wk 3", load: 0.0 },
        WeekBucket { label: "Wk 2", load: 0.0 },
        WeekBucket { label: "Wk 1", load: 0.0 },
    ];

    for (day, load) in loads_by_day(workouts) {
        let age_days = (today - day).num_days();
        if !(0..i64::from(CHRONIC_WINDOW_DAYS)).contains(&age_days) {
            continue;
        }
        let idx = (age_days / 7) as usize; // 0 = most recent week
        buckets[3 - idx].load += load;
    }

    buckets
}

/// Per-day rows for the last 7 days, weekday-labeled, today last.
pub fn daily_breakdown(workouts: &[Workout], today: NaiveDate) -> Vec<DayBreakdown> {
    aggregate(workouts, ACUTE_WINDOW_DAYS, today)
        .into_iter()
        .map(|d| {
            let is_today = d.day == today;
            DayBreakdown {
                label: if is_today {
                    "Today".to_string()
                } else {
                    d.day.format("%a").to_string()
                },
                day: d.day,
                load: d.load,
                is_today,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::Intensity;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn workout(id: i64, date: NaiveDate, duration_min: f64, intensity: Intensity) -> Workout {
        Workout {
            id,
            date,
            duration_min,
            intensity,
            load: duration_min * f64::from(intensity.multiplier()),
        }
    }

    #[test]
    fn test_aggregate_zero_fills_window() {
        let today = day(2025, 6, 30);
        let series = aggregate(&[], 7, today);

        assert_eq!(series.len(), 7);
        assert_eq!(series[0].day, day(2025, 6, 24));
        assert_eq!(series[6].day, today);
        assert!(series.iter().all(|d| d.load == 0.0));
    }

    #[test]
    fn test_aggregate_sums_same_day_entries() {
        let today = day(2025, 6, 30);
        let workouts = vec![
            workout(1, today, 30.0, Intensity::Moderate),
            workout(2, today, 10.0, Intensity::Maximum),
        ];

        let series = aggregate(&workouts, 7, today);
        assert_eq!(series[6].load, 180.0 + 100.0);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let today = day(2025, 6, 30);
        let workouts = vec![
            workout(1, today, 30.0, Intensity::Moderate),
            workout(2, today - Days::new(3), 45.0, Intensity::Light),
        ];

        assert_eq!(aggregate(&workouts, 28, today), aggregate(&workouts, 28, today));
    }

    #[test]
    fn test_acute_matches_direct_filter() {
        let today = day(2025, 6, 30);
        let workouts = vec![
            workout(1, today, 30.0, Intensity::Moderate),
            workout(2, today - Days::new(6), 45.0, Intensity::Light),
            workout(3, today - Days::new(7), 60.0, Intensity::Hard), // outside acute
            workout(4, today - Days::new(20), 20.0, Intensity::Maximum),
        ];

        let direct: f64 = workouts
            .iter()
            .filter(|w| {
                let age = (today - w.date).num_days();
                (0..7).contains(&age)
            })
            .map(|w| w.load)
            .sum();

        assert_eq!(acute_load(&workouts, today), direct);
    }

    #[test]
    fn test_week_old_record_chronic_only() {
        let today = day(2025, 6, 30);
        let workouts = vec![workout(1, today - Days::new(7), 60.0, Intensity::Hard)];

        assert_eq!(acute_load(&workouts, today), 0.0);
        assert_eq!(chronic_load(&workouts, today), 480.0 / 4.0);
    }

    #[test]
    fn test_spike_scenario() {
        // 30 min moderate today + 45 min light three days ago, no other
        // history: acute 360, chronic 90, ratio 4.0 = high load increase.
        let today = day(2025, 6, 30);
        let workouts = vec![
            workout(1, today, 30.0, Intensity::Moderate),
            workout(2, today - Days::new(3), 45.0, Intensity::Light),
        ];

        let summary = LoadSummary::compute(&workouts, today);
        assert_eq!(summary.acute, 360.0);
        assert_eq!(summary.chronic, 90.0);
        assert_eq!(summary.ratio, 4.0);
        assert_eq!(summary.trend, Some(TrendLabel::HighLoadIncrease));
    }

    #[test]
    fn test_empty_history() {
        let summary = LoadSummary::compute(&[], day(2025, 6, 30));
        assert_eq!(summary.acute, 0.0);
        assert_eq!(summary.chronic, 0.0);
        assert_eq!(summary.ratio, 0.0);
        assert_eq!(summary.trend, None);
    }

    #[test]
    fn test_trend_bands() {
        assert_eq!(TrendLabel::classify(1.51), Some(TrendLabel::HighLoadIncrease));
        assert_eq!(TrendLabel::classify(4.0), Some(TrendLabel::HighLoadIncrease));
        assert_eq!(TrendLabel::classify(0.8), Some(TrendLabel::StableLoad));
        assert_eq!(TrendLabel::classify(1.0), Some(TrendLabel::StableLoad));
        assert_eq!(TrendLabel::classify(1.3), Some(TrendLabel::StableLoad));
        assert_eq!(TrendLabel::classify(0.69), Some(TrendLabel::ReducedLoad));
        assert_eq!(TrendLabel::classify(0.0), Some(TrendLabel::ReducedLoad));
    }

    #[test]
    fn test_trend_transition_zones_unlabeled() {
        assert_eq!(TrendLabel::classify(0.7), None);
        assert_eq!(TrendLabel::classify(0.75), None);
        assert_eq!(TrendLabel::classify(0.79), None);
        assert_eq!(TrendLabel::classify(1.31), None);
        assert_eq!(TrendLabel::classify(1.5), None);
    }

    #[test]
    fn test_trend_display() {
        assert_eq!(
            TrendLabel::HighLoadIncrease.to_string(),
            "High Load Increase"
        );
        assert_eq!(TrendLabel::ReducedLoad.to_string(), "Reduced Load");
    }

    #[test]
    fn test_weekly_buckets_placement() {
        let today = day(2025, 6, 30);
        let workouts = vec![
            workout(1, today, 30.0, Intensity::Moderate),           // Wk 1
            workout(2, today - Days::new(6), 10.0, Intensity::Light), // Wk 1
            workout(3, today - Days::new(7), 10.0, Intensity::Light), // Wk 2
            workout(4, today - Days::new(27), 10.0, Intensity::Light), // Wk 4
            workout(5, today - Days::new(28), 99.0, Intensity::Maximum), // excluded
            workout(6, today + Days::new(1), 99.0, Intensity::Maximum), // future, excluded
        ];

        let buckets = weekly_buckets(&workouts, today);
        assert_eq!(buckets[0].label, "Wk 4");
        assert_eq!(buckets[3].label, "Wk 1");
        assert_eq!(buckets[3].load, 180.0 + 40.0);
        assert_eq!(buckets[2].load, 40.0);
        assert_eq!(buckets[1].load, 0.0);
        assert_eq!(buckets[0].load, 40.0);
    }

    #[test]
    fn test_weekly_buckets_reconcile_with_chronic_window() {
        let today = day(2025, 6, 30);
        let workouts: Vec<Workout> = (0..40)
            .map(|i| workout(i, today - Days::new(i as u64), 10.0, Intensity::Moderate))
            .collect();

        let bucket_total: f64 = weekly_buckets(&workouts, today).iter().map(|b| b.load).sum();
        let window_total: f64 = aggregate(&workouts, CHRONIC_WINDOW_DAYS, today)
            .iter()
            .map(|d| d.load)
            .sum();
        assert_eq!(bucket_total, window_total);
    }

    #[test]
    fn test_daily_breakdown_totals_acute() {
        let today = day(2025, 6, 30);
        let workouts = vec![
            workout(1, today, 30.0, Intensity::Moderate),
            workout(2, today - Days::new(2), 45.0, Intensity::Light),
            workout(3, today - Days::new(9), 60.0, Intensity::Hard),
        ];

        let rows = daily_breakdown(&workouts, today);
        assert_eq!(rows.len(), 7);
        assert!(rows.last().unwrap().is_today);
        assert_eq!(rows.last().unwrap().label, "Today");
        assert_eq!(rows.iter().filter(|r| r.is_today).count(), 1);

        let total: f64 = rows.iter().map(|r| r.load).sum();
        assert_eq!(total, acute_load(&workouts, today));
    }
}
