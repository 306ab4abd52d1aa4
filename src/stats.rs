use crate::models::{HabitLogEntry, HabitStats};
use chrono::{Datelike, Duration, Local, NaiveDate};
use std::collections::HashSet;
use std::str::FromStr;

pub fn compute_stats_today(entries: &[HabitLogEntry]) -> HabitStats {
    compute_stats(entries, Local::now().date_naive())
}

/// Derives completion rate and streaks from one habit's log.
///
/// Entries may arrive in any order and may skip days. A skipped day breaks a
/// streak the same way an explicit `completed: false` does. When two entries
/// share a date the first one in `entries` wins. The current streak walks back
/// from the newest entry, which may be dated after `today`.
pub fn compute_stats(entries: &[HabitLogEntry], today: NaiveDate) -> HabitStats {
    let mut days = unique_days(entries);
    days.sort_by_key(|entry| entry.date);

    HabitStats {
        completion_rate: completion_rate(&days),
        current_streak: current_streak(&days, today),
        longest_streak: longest_streak(&days),
    }
}

fn unique_days(entries: &[HabitLogEntry]) -> Vec<&HabitLogEntry> {
    let mut seen = HashSet::with_capacity(entries.len());
    entries
        .iter()
        .filter(|entry| seen.insert(entry.date))
        .collect()
}

fn completion_rate(days: &[&HabitLogEntry]) -> u8 {
    let total = days.len() as u64;
    if total == 0 {
        return 0;
    }
    let completed = days.iter().filter(|entry| entry.completed).count() as u64;
    // round half up: floor(100c/t + 1/2)
    ((200 * completed + total) / (2 * total)) as u8
}

// `days` is ascending by date.
fn current_streak(days: &[&HabitLogEntry], today: NaiveDate) -> u32 {
    let mut recent_first = days.iter().rev();

    let Some(most_recent) = recent_first.next() else {
        return 0;
    };
    let stale = today
        .pred_opt()
        .is_some_and(|yesterday| most_recent.date < yesterday);
    if stale || !most_recent.completed {
        return 0;
    }

    let mut streak = 1;
    let mut expected = most_recent.date.pred_opt();
    for entry in recent_first {
        if !entry.completed || expected != Some(entry.date) {
            break;
        }
        streak += 1;
        expected = entry.date.pred_opt();
    }
    streak
}

// `days` is ascending by date.
fn longest_streak(days: &[&HabitLogEntry]) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut last_completed: Option<NaiveDate> = None;

    for entry in days {
        if !entry.completed {
            run = 0;
            last_completed = None;
            continue;
        }
        run = match last_completed {
            Some(prev) if prev.succ_opt() == Some(entry.date) => run + 1,
            _ => 1,
        };
        last_completed = Some(entry.date);
        longest = longest.max(run);
    }
    longest
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateView {
    #[default]
    Week,
    Month,
    Year,
}

impl DateView {
    pub fn days(self) -> i64 {
        match self {
            DateView::Week => 7,
            DateView::Month => 30,
            DateView::Year => 365,
        }
    }

    /// Inclusive window starting on the Monday of `reference`'s week, or
    /// `None` when the window falls outside the representable calendar.
    pub fn range(self, reference: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let start = week_start(reference)?;
        let end = start.checked_add_signed(Duration::days(self.days() - 1))?;
        Some((start, end))
    }
}

impl FromStr for DateView {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(DateView::Week),
            "month" => Ok(DateView::Month),
            "year" => Ok(DateView::Year),
            other => Err(format!("view must be 'week', 'month' or 'year', got '{other}'")),
        }
    }
}

pub fn week_start(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_signed(Duration::days(date.weekday().num_days_from_monday() as i64))
}
