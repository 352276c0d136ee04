use chrono::{Local, NaiveDate};

use crate::models::Reminder;

/// Calendar day of a reminder in the local timezone.
pub fn local_day(reminder: &Reminder) -> NaiveDate {
    reminder.reminder_date.with_timezone(&Local).date_naive()
}

/// Open reminders falling on `today`. Compares calendar days, not a time window.
pub fn todays_reminders(reminders: &[Reminder], today: NaiveDate) -> Vec<&Reminder> {
    reminders
        .iter()
        .filter(|r| !r.completed && local_day(r) == today)
        .collect()
}

pub fn open_reminders(reminders: &[Reminder]) -> Vec<&Reminder> {
    reminders.iter().filter(|r| !r.completed).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn reminder(id: &str, at: chrono::DateTime<Utc>, completed: bool) -> Reminder {
        Reminder {
            reminder_id: id.to_string(),
            job_id: "job_1".to_string(),
            message: format!("follow up {}", id),
            reminder_date: at,
            completed,
        }
    }

    fn local_noon(day: NaiveDate) -> chrono::DateTime<Utc> {
        Local
            .from_local_datetime(&day.and_hms_opt(12, 0, 0).unwrap())
            .single()
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_only_open_reminders_for_today() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let reminders = vec![
            reminder("today", local_noon(today), false),
            reminder("done", local_noon(today), true),
            reminder("tomorrow", local_noon(today) + Duration::days(1), false),
            reminder("yesterday", local_noon(today) - Duration::days(1), false),
        ];

        let ids: Vec<&str> = todays_reminders(&reminders, today)
            .into_iter()
            .map(|r| r.reminder_id.as_str())
            .collect();
        assert_eq!(ids, vec!["today"]);
    }

    #[test]
    fn test_day_boundaries_use_local_calendar() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let start = Local
            .from_local_datetime(&today.and_hms_opt(0, 0, 1).unwrap())
            .single()
            .unwrap()
            .with_timezone(&Utc);
        let end = Local
            .from_local_datetime(&today.and_hms_opt(23, 59, 59).unwrap())
            .single()
            .unwrap()
            .with_timezone(&Utc);
        let reminders = vec![reminder("early", start, false), reminder("late", end, false)];

        assert_eq!(todays_reminders(&reminders, today).len(), 2);
        assert!(todays_reminders(&reminders, today.succ_opt().unwrap()).is_empty());
    }

    #[test]
    fn test_open_reminders() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let reminders = vec![reminder("a", at, true), reminder("b", at, false)];
        assert_eq!(open_reminders(&reminders).len(), 1);
    }
}
