//! Aggregate statistics over recorded sessions

use chrono::{DateTime, Datelike, Days, Local, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

use super::types::{TrainingCategory, TrainingSession};

/// Inclusive window in epoch milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

impl TimeRange {
    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }

    /// Local midnight today up to `now`
    pub fn today_at<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let start = start_of_day(now, now.date_naive());
        Self { start, end: now.timestamp_millis() }
    }

    /// Monday midnight of the current week up to `now`
    pub fn week_at<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let today = now.date_naive();
        let days_since_monday = today.weekday().number_from_monday() as u64 - 1;
        let monday = today.checked_sub_days(Days::new(days_since_monday)).unwrap_or(today);
        Self {
            start: start_of_day(now, monday),
            end: now.timestamp_millis(),
        }
    }

    pub fn today() -> Self {
        Self::today_at(&Local::now())
    }

    pub fn week() -> Self {
        Self::week_at(&Local::now())
    }
}

/// Epoch millis of midnight on `date` in the timezone of `now`
fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>, date: chrono::NaiveDate) -> i64 {
    let midnight = date.and_time(NaiveTime::MIN);
    now.timezone()
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        // Midnight skipped by a DST change: fall back to the UTC reading
        .unwrap_or_else(|| midnight.and_utc().timestamp_millis())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingStats {
    pub total_sessions: u32,
    pub total_questions: u32,
    pub correct_answers: u32,
    /// Percentage in 0..=100
    pub accuracy: f64,
    /// Seconds
    pub total_duration: u64,
    pub average_session_duration: f64,
}

/// Sum sessions matching the optional category and window
pub fn compute_stats<'a>(
    sessions: impl IntoIterator<Item = &'a TrainingSession>,
    category: Option<TrainingCategory>,
    range: Option<TimeRange>,
) -> TrainingStats {
    let mut stats = TrainingStats::default();

    for session in sessions {
        if category.is_some_and(|c| c != session.category) {
            continue;
        }
        if range.is_some_and(|r| !r.contains(session.timestamp)) {
            continue;
        }
        stats.total_sessions += 1;
        stats.total_questions += session.total_questions;
        stats.correct_answers += session.correct_answers.min(session.total_questions);
        stats.total_duration += session.duration;
    }

    if stats.total_questions > 0 {
        stats.accuracy = stats.correct_answers as f64 / stats.total_questions as f64 * 100.0;
    }
    if stats.total_sessions > 0 {
        stats.average_session_duration = stats.total_duration as f64 / stats.total_sessions as f64;
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(category: TrainingCategory, timestamp: i64, total: u32, correct: u32, duration: u64) -> TrainingSession {
        TrainingSession {
            id: format!("s{timestamp}"),
            category,
            timestamp,
            total_questions: total,
            correct_answers: correct,
            duration,
            settings: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_empty_accuracy_is_zero() {
        let stats = compute_stats(std::iter::empty(), None, None);
        assert_eq!(stats.accuracy, 0.0);
        assert_eq!(stats.average_session_duration, 0.0);

        let zero = [session(TrainingCategory::Chord, 1, 0, 0, 30)];
        let stats = compute_stats(&zero, None, None);
        assert_eq!(stats.total_sessions, 1);
        assert_eq!(stats.accuracy, 0.0);
    }

    #[test]
    fn test_filters_and_sums() {
        let sessions = [
            session(TrainingCategory::Interval, 100, 10, 7, 60),
            session(TrainingCategory::Interval, 200, 10, 8, 120),
            session(TrainingCategory::Chord, 150, 5, 5, 30),
        ];
        let stats = compute_stats(&sessions, Some(TrainingCategory::Interval), None);
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.correct_answers, 15);
        assert!((stats.accuracy - 75.0).abs() < 1e-9);
        assert!((stats.average_session_duration - 90.0).abs() < 1e-9);

        let window = TimeRange { start: 120, end: 200 };
        let stats = compute_stats(&sessions, None, Some(window));
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.total_questions, 15);
    }

    #[test]
    fn test_accuracy_bounded() {
        let sessions = [session(TrainingCategory::Progression, 1, 3, 9, 10)];
        let stats = compute_stats(&sessions, None, None);
        assert!(stats.accuracy <= 100.0);
    }

    #[test]
    fn test_week_starts_monday() {
        // Wednesday 2024-01-17 12:00 local
        let now = Local.with_ymd_and_hms(2024, 1, 17, 12, 0, 0).unwrap();
        let week = TimeRange::week_at(&now);
        let monday = Local.with_ymd_and_hms(2024, 1, 15, 0, 5, 0).unwrap();
        let sunday = Local.with_ymd_and_hms(2024, 1, 14, 23, 55, 0).unwrap();
        assert!(week.contains(monday.timestamp_millis()));
        assert!(!week.contains(sunday.timestamp_millis()));

        // On a Sunday the week still started the previous Monday
        let sunday_noon = Local.with_ymd_and_hms(2024, 1, 21, 12, 0, 0).unwrap();
        assert_eq!(TimeRange::week_at(&sunday_noon).start, week.start);
    }

    #[test]
    fn test_today_window() {
        let now = Local.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap();
        let today = TimeRange::today_at(&now);
        let early = Local.with_ymd_and_hms(2024, 3, 5, 0, 1, 0).unwrap();
        let yesterday = Local.with_ymd_and_hms(2024, 3, 4, 23, 59, 0).unwrap();
        assert!(today.contains(early.timestamp_millis()));
        assert!(!today.contains(yesterday.timestamp_millis()));
        assert_eq!(today.end, now.timestamp_millis());
    }
}
