//! Birthday Engine
//!
//! Pure computation: given a collection snapshot and "today", the members
//! whose next birthday falls within a horizon, nearest first.
//!
//! A horizon of N days is the window of N calendar days starting today, so
//! `days_until` ranges over `0..N`. Feb 29 birthdays fall on Mar 1 in
//! non-leap years.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use shared::models::Member;

/// One upcoming anniversary
#[derive(Debug, Clone, Serialize)]
pub struct UpcomingBirthday<'a> {
    /// 0 = today
    pub days_until: i64,
    /// Date of the anniversary
    pub date: NaiveDate,
    /// Age reached on `date`
    pub turning: i32,
    pub member: &'a Member,
}

/// The birthday's anniversary in `year`
pub fn occurrence_in_year(birthday: NaiveDate, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, birthday.month(), birthday.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
}

/// First anniversary on or after `today`
pub fn next_occurrence(birthday: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
    let this_year = occurrence_in_year(birthday, today.year())?;
    if this_year < today {
        occurrence_in_year(birthday, today.year() + 1)
    } else {
        Some(this_year)
    }
}

/// Members whose next birthday falls in the `horizon_days`-day window starting at `today`.
///
/// Ordered by `days_until`, then name (case-insensitive), then id. Members
/// whose stored birthday does not parse are skipped.
pub fn upcoming(members: &[Member], today: NaiveDate, horizon_days: u32) -> Vec<UpcomingBirthday<'_>> {
    let horizon = i64::from(horizon_days);

    let mut out: Vec<UpcomingBirthday<'_>> = members
        .iter()
        .filter_map(|member| {
            let Some(birthday) = member.birthday_date() else {
                tracing::warn!(
                    member_id = member.id,
                    birthday = %member.birthday,
                    "Skipping member with unparseable birthday"
                );
                return None;
            };
            let date = next_occurrence(birthday, today)?;
            let days_until = (date - today).num_days();
            (0..horizon).contains(&days_until).then(|| UpcomingBirthday {
                days_until,
                date,
                turning: date.year() - birthday.year(),
                member,
            })
        })
        .collect();

    out.sort_by(|a, b| {
        a.days_until
            .cmp(&b.days_until)
            .then_with(|| a.member.name.to_lowercase().cmp(&b.member.name.to_lowercase()))
            .then(a.member.id.cmp(&b.member.id))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn member(id: i64, name: &str, birthday: &str) -> Member {
        Member {
            id,
            name: name.to_string(),
            phone: "0800".to_string(),
            email: None,
            address: None,
            birthday: birthday.to_string(),
            photo: None,
            joined: None,
        }
    }

    fn days_for(members: &[Member], today: NaiveDate, horizon: u32) -> Vec<(i64, i64)> {
        upcoming(members, today, horizon)
            .iter()
            .map(|u| (u.member.id, u.days_until))
            .collect()
    }

    #[test]
    fn test_birthday_today_is_zero_days() {
        let members = vec![member(1, "Ada", "01-06-1990")];
        let result = upcoming(&members, date(2024, 6, 1), 30);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].days_until, 0);
        assert_eq!(result[0].date, date(2024, 6, 1));
        assert_eq!(result[0].turning, 34);
    }

    #[test]
    fn test_days_until_within_month() {
        let members = vec![member(1, "Ben", "15-06-1995")];
        assert_eq!(days_for(&members, date(2024, 6, 1), 30), vec![(1, 14)]);
    }

    #[test]
    fn test_horizon_window() {
        let members = vec![member(1, "Cal", "01-07-1990")];
        assert!(days_for(&members, date(2024, 6, 1), 29).is_empty());
        assert!(days_for(&members, date(2024, 6, 1), 30).is_empty());
        assert_eq!(days_for(&members, date(2024, 6, 1), 31), vec![(1, 30)]);
    }

    #[test]
    fn test_zero_horizon_is_empty() {
        let members = vec![member(1, "Ada", "01-06-1990")];
        assert!(upcoming(&members, date(2024, 6, 1), 0).is_empty());
        assert_eq!(days_for(&members, date(2024, 6, 1), 1), vec![(1, 0)]);
    }

    #[test]
    fn test_year_rollover() {
        let members = vec![member(1, "Dan", "05-01-1980")];
        let result = upcoming(&members, date(2024, 12, 20), 30);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].days_until, 16);
        assert_eq!(result[0].date, date(2025, 1, 5));
        assert_eq!(result[0].turning, 45);
    }

    #[test]
    fn test_passed_birthday_rolls_to_next_year() {
        let members = vec![member(1, "Eve", "31-05-1990")];
        assert!(days_for(&members, date(2024, 6, 1), 30).is_empty());
        assert_eq!(days_for(&members, date(2024, 6, 1), 365), vec![(1, 364)]);
    }

    #[test]
    fn test_leap_day_in_non_leap_year_falls_on_march_first() {
        let birthday = date(2000, 2, 29);
        assert_eq!(occurrence_in_year(birthday, 2023), Some(date(2023, 3, 1)));
        assert_eq!(occurrence_in_year(birthday, 2024), Some(date(2024, 2, 29)));

        let members = vec![member(1, "Leap", "29-02-2000")];
        let result = upcoming(&members, date(2023, 2, 20), 30);
        assert_eq!(result[0].date, date(2023, 3, 1));
        assert_eq!(result[0].days_until, 9);

        // Today is Mar 1 in a non-leap year: the anniversary is today
        assert_eq!(days_for(&members, date(2023, 3, 1), 1), vec![(1, 0)]);
        // Mar 2, 2023: next is Feb 29, 2024
        assert_eq!(
            next_occurrence(birthday, date(2023, 3, 2)),
            Some(date(2024, 2, 29))
        );
    }

    #[test]
    fn test_unparseable_birthdays_are_skipped() {
        let members = vec![
            member(1, "Bad", "30-02-2000"),
            member(2, "Empty", ""),
            member(3, "Good", "02-06-1990"),
        ];
        assert_eq!(days_for(&members, date(2024, 6, 1), 30), vec![(3, 1)]);
    }

    #[test]
    fn test_ordering_by_days_then_name() {
        let members = vec![
            member(1, "zed", "10-06-1990"),
            member(2, "Amy", "10-06-1985"),
            member(3, "Bob", "03-06-2001"),
            member(4, "amy", "10-06-1970"),
        ];
        assert_eq!(
            days_for(&members, date(2024, 6, 1), 30),
            vec![(3, 2), (2, 9), (4, 9), (1, 9)]
        );
    }
}
