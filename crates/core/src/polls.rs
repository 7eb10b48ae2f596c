//! Weekly poll rules: the answering window, open/closed questions, and
//! option-set invariants.
//!
//! A user may answer one poll per ISO week. The week runs from Monday
//! 00:00 UTC to the following Monday 00:00 UTC.

use chrono::{Datelike, Duration, NaiveTime};
use serde::Serialize;

use crate::types::{DbId, Timestamp};

/// Valid option keys, in display order.
pub const OPTION_KEYS: &[&str] = &["a", "b", "c", "d"];

/// Minimum number of options a question needs.
pub const MIN_OPTIONS: usize = 2;

/// Maximum length of a question title, subtitle, or option text.
pub const MAX_TEXT_LENGTH: usize = 255;

/// Number of rows returned by the leaderboard and recent-participants lists.
pub const STATISTICS_SIZE: i64 = 10;

/// An option as submitted when creating or replacing a question's options.
#[derive(Debug, Clone)]
pub struct OptionDraft<'a> {
    pub key: &'a str,
    pub text: &'a str,
    pub is_correct: bool,
}

/// Outcome of the answer that locked a user for the current week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastResult {
    pub question_id: DbId,
    pub selected_key: String,
    pub correct_key: Option<String>,
    pub is_correct: bool,
}

/// Return `[start, end)` of the week containing `now`.
pub fn week_window(now: Timestamp) -> (Timestamp, Timestamp) {
    let days_since_monday = i64::from(now.weekday().num_days_from_monday());
    let monday = now.date_naive() - Duration::days(days_since_monday);
    let start = monday.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(7))
}

/// If the user's latest answer falls inside the current week, return the
/// moment the lock lifts.
pub fn unlocks_at(last_answer_at: Option<Timestamp>, now: Timestamp) -> Option<Timestamp> {
    let (start, end) = week_window(now);
    match last_answer_at {
        Some(answered) if answered >= start && answered < end => Some(end),
        _ => None,
    }
}

/// A question accepts answers while active and inside its optional date range.
pub fn is_open(
    is_active: bool,
    start_date: Option<Timestamp>,
    end_date: Option<Timestamp>,
    now: Timestamp,
) -> bool {
    is_active && start_date.map_or(true, |s| s <= now) && end_date.map_or(true, |e| e > now)
}

/// Validate question title and subtitle lengths.
pub fn validate_question(title: &str, subtitle: Option<&str>) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Poll title cannot be empty".to_string());
    }
    if title.chars().count() > MAX_TEXT_LENGTH {
        return Err(format!(
            "Poll title exceeds maximum length of {MAX_TEXT_LENGTH} characters"
        ));
    }
    if subtitle.is_some_and(|s| s.chars().count() > MAX_TEXT_LENGTH) {
        return Err(format!(
            "Poll subtitle exceeds maximum length of {MAX_TEXT_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Validate a date range: when both ends are set, start must precede end.
pub fn validate_date_range(
    start_date: Option<Timestamp>,
    end_date: Option<Timestamp>,
) -> Result<(), String> {
    match (start_date, end_date) {
        (Some(s), Some(e)) if s >= e => Err("Poll start date must be before end date".to_string()),
        _ => Ok(()),
    }
}

/// Validate a full option set for one question.
///
/// Keys must be among [`OPTION_KEYS`] and unique, texts non-empty, at least
/// [`MIN_OPTIONS`] options, and at most one option marked correct.
pub fn validate_options(options: &[OptionDraft<'_>]) -> Result<(), String> {
    if options.len() < MIN_OPTIONS {
        return Err(format!("A poll needs at least {MIN_OPTIONS} options"));
    }
    let mut seen: Vec<&str> = Vec::with_capacity(options.len());
    for opt in options {
        if !OPTION_KEYS.contains(&opt.key) {
            return Err(format!(
                "Invalid option key '{}'. Must be one of: {}",
                opt.key,
                OPTION_KEYS.join(", ")
            ));
        }
        if seen.contains(&opt.key) {
            return Err(format!("Duplicate option key '{}'", opt.key));
        }
        seen.push(opt.key);
        if opt.text.trim().is_empty() {
            return Err(format!("Option '{}' has no text", opt.key));
        }
        if opt.text.chars().count() > MAX_TEXT_LENGTH {
            return Err(format!(
                "Option '{}' exceeds maximum length of {MAX_TEXT_LENGTH} characters",
                opt.key
            ));
        }
    }
    let correct = options.iter().filter(|o| o.is_correct).count();
    if correct > 1 {
        return Err("At most one option can be marked correct".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> Timestamp {
        chrono::Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn opt<'a>(key: &'a str, is_correct: bool) -> OptionDraft<'a> {
        OptionDraft { key, text: "answer", is_correct }
    }

    // -- week_window ---------------------------------------------------------

    #[test]
    fn window_starts_on_monday_midnight() {
        // 2026-10-14 is a Wednesday.
        let (start, end) = week_window(utc(2026, 10, 14, 15, 30));
        assert_eq!(start, utc(2026, 10, 12, 0, 0));
        assert_eq!(end, utc(2026, 10, 19, 0, 0));
    }

    #[test]
    fn monday_midnight_opens_new_window() {
        let (start, _) = week_window(utc(2026, 10, 19, 0, 0));
        assert_eq!(start, utc(2026, 10, 19, 0, 0));
    }

    #[test]
    fn sunday_late_belongs_to_previous_window() {
        let (start, end) = week_window(utc(2026, 10, 18, 23, 59));
        assert_eq!(start, utc(2026, 10, 12, 0, 0));
        assert_eq!(end, utc(2026, 10, 19, 0, 0));
    }

    // -- unlocks_at ----------------------------------------------------------

    #[test]
    fn answer_this_week_locks_until_next_monday() {
        let now = utc(2026, 10, 16, 9, 0);
        let unlock = unlocks_at(Some(utc(2026, 10, 13, 8, 0)), now);
        assert_eq!(unlock, Some(utc(2026, 10, 19, 0, 0)));
    }

    #[test]
    fn answer_last_week_does_not_lock() {
        let now = utc(2026, 10, 19, 0, 1);
        assert_eq!(unlocks_at(Some(utc(2026, 10, 18, 23, 0)), now), None);
    }

    #[test]
    fn never_answered_is_unlocked() {
        assert_eq!(unlocks_at(None, utc(2026, 10, 19, 12, 0)), None);
    }

    // -- is_open -------------------------------------------------------------

    #[test]
    fn inactive_question_is_closed() {
        assert!(!is_open(false, None, None, utc(2026, 1, 1, 0, 0)));
    }

    #[test]
    fn date_range_gates_question() {
        let start = Some(utc(2026, 3, 1, 0, 0));
        let end = Some(utc(2026, 3, 8, 0, 0));
        assert!(!is_open(true, start, end, utc(2026, 2, 28, 23, 59)));
        assert!(is_open(true, start, end, utc(2026, 3, 1, 0, 0)));
        assert!(!is_open(true, start, end, utc(2026, 3, 8, 0, 0)));
    }

    #[test]
    fn open_ended_question_is_open() {
        assert!(is_open(true, None, None, utc(2030, 1, 1, 0, 0)));
    }

    // -- validate_options ----------------------------------------------------

    #[test]
    fn two_options_one_correct_is_valid() {
        assert!(validate_options(&[opt("a", true), opt("b", false)]).is_ok());
    }

    #[test]
    fn no_correct_option_is_valid() {
        assert!(validate_options(&[opt("a", false), opt("b", false)]).is_ok());
    }

    #[test]
    fn two_correct_options_rejected() {
        let err = validate_options(&[opt("a", true), opt("b", true)]).unwrap_err();
        assert!(err.contains("At most one"));
    }

    #[test]
    fn duplicate_key_rejected() {
        assert!(validate_options(&[opt("a", false), opt("a", false)]).is_err());
    }

    #[test]
    fn unknown_key_rejected() {
        assert!(validate_options(&[opt("a", false), opt("e", false)]).is_err());
    }

    #[test]
    fn single_option_rejected() {
        assert!(validate_options(&[opt("a", true)]).is_err());
    }

    #[test]
    fn inverted_date_range_rejected() {
        let s = Some(utc(2026, 3, 8, 0, 0));
        let e = Some(utc(2026, 3, 1, 0, 0));
        assert!(validate_date_range(s, e).is_err());
        assert!(validate_date_range(s, None).is_ok());
    }
}
