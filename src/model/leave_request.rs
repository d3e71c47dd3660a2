use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum LeaveType {
    Annual,
    Sick,
    Personal,
    Maternity,
    Paternity,
    Emergency,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    /// Statuses that block an overlapping request from being created.
    pub const ACTIVE: [LeaveStatus; 2] = [LeaveStatus::Pending, LeaveStatus::Approved];
}

/// A leave request row. Records are never physically deleted; the status
/// column carries the full lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "2026-02-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-02-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "ANNUAL")]
    pub leave_type: LeaveType,
    #[schema(example = "PENDING")]
    pub status: LeaveStatus,
    #[schema(example = "Family vacation", nullable = true)]
    pub reason: Option<String>,
    /// Set only once the request leaves PENDING.
    pub approver_comments: Option<String>,
    pub approved_by: Option<u64>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub approved_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
}

impl LeaveRequest {
    /// Inclusive day count of the request. A same-day request counts as 1.
    pub fn number_of_days(&self) -> i64 {
        inclusive_days(self.start_date, self.end_date)
    }

    /// Inclusive-bounds overlap test against another date range.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date >= start
    }
}

/// Inclusive day count between two calendar dates: `|end - start| + 1`.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days().abs() + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(start: NaiveDate, end: NaiveDate, status: LeaveStatus) -> LeaveRequest {
        LeaveRequest {
            id: 1,
            employee_id: 1,
            start_date: start,
            end_date: end,
            leave_type: LeaveType::Annual,
            status,
            reason: None,
            approver_comments: None,
            approved_by: None,
            approved_at: None,
            created_at: None,
        }
    }

    #[test]
    fn same_day_request_is_one_day() {
        assert_eq!(inclusive_days(date(2024, 2, 1), date(2024, 2, 1)), 1);
    }

    #[test]
    fn three_day_request() {
        assert_eq!(inclusive_days(date(2024, 2, 1), date(2024, 2, 3)), 3);
    }

    #[test]
    fn day_count_spans_month_boundary() {
        assert_eq!(inclusive_days(date(2024, 1, 31), date(2024, 2, 2)), 3);
    }

    #[test]
    fn day_count_spans_leap_day() {
        assert_eq!(inclusive_days(date(2024, 2, 28), date(2024, 3, 1)), 3);
    }

    #[test]
    fn overlap_is_inclusive_at_both_bounds() {
        let existing = request(date(2024, 2, 1), date(2024, 2, 3), LeaveStatus::Pending);
        // Sharing a single boundary day counts as overlap.
        assert!(existing.overlaps(date(2024, 2, 3), date(2024, 2, 5)));
        assert!(existing.overlaps(date(2024, 1, 30), date(2024, 2, 1)));
        // Adjacent but disjoint ranges do not overlap.
        assert!(!existing.overlaps(date(2024, 2, 4), date(2024, 2, 5)));
        assert!(!existing.overlaps(date(2024, 1, 29), date(2024, 1, 31)));
    }

    #[test]
    fn containment_overlaps() {
        let existing = request(date(2024, 2, 1), date(2024, 2, 10), LeaveStatus::Approved);
        assert!(existing.overlaps(date(2024, 2, 4), date(2024, 2, 5)));
        assert!(existing.overlaps(date(2024, 1, 1), date(2024, 3, 1)));
    }

    #[test]
    fn status_round_trips_through_strings() {
        assert_eq!(LeaveStatus::Pending.to_string(), "PENDING");
        assert_eq!(
            LeaveStatus::from_str("CANCELLED").unwrap(),
            LeaveStatus::Cancelled
        );
        assert_eq!(LeaveType::Maternity.to_string(), "MATERNITY");
        assert_eq!(LeaveType::from_str("SICK").unwrap(), LeaveType::Sick);
    }

    fn arb_date() -> impl Strategy<Value = NaiveDate> {
        (0i64..20_000).prop_map(|off| date(2000, 1, 1) + chrono::Duration::days(off))
    }

    proptest! {
        #[test]
        fn inclusive_day_count_matches_difference(a in arb_date(), len in 0i64..3_650) {
            let b = a + chrono::Duration::days(len);
            prop_assert_eq!(inclusive_days(a, b), len + 1);
        }

        #[test]
        fn day_count_is_at_least_one_and_symmetric(a in arb_date(), b in arb_date()) {
            prop_assert!(inclusive_days(a, b) >= 1);
            prop_assert_eq!(inclusive_days(a, b), inclusive_days(b, a));
        }

        #[test]
        fn overlap_iff_ranges_share_a_day(
            a in arb_date(), alen in 0i64..60, b in arb_date(), blen in 0i64..60
        ) {
            let a_end = a + chrono::Duration::days(alen);
            let b_end = b + chrono::Duration::days(blen);
            let existing = request(a, a_end, LeaveStatus::Pending);

            let share_a_day = a.max(b) <= a_end.min(b_end);
            prop_assert_eq!(existing.overlaps(b, b_end), share_a_day);
        }
    }
}
