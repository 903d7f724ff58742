//! Daily and weekly task boards for the admin planner.
//!
//! Both functions partition an already-fetched list: every input task ends
//! up in exactly one bucket.

use std::cmp::Ordering;

use chrono::{Datelike, Days, NaiveDate, NaiveTime};
use db::models::task::Task;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Clone, Default, Serialize, TS)]
pub struct DailySchedule {
    pub date: NaiveDate,
    pub morning: Vec<Task>,
    pub afternoon: Vec<Task>,
    pub evening: Vec<Task>,
    pub anytime: Vec<Task>,
}

#[derive(Debug, Clone, Default, Serialize, TS)]
pub struct WeeklySchedule {
    pub today_date: NaiveDate,
    pub week_end: NaiveDate,
    pub overdue: Vec<Task>,
    pub today: Vec<Task>,
    pub tomorrow: Vec<Task>,
    pub this_week: Vec<Task>,
    pub later: Vec<Task>,
    pub unscheduled: Vec<Task>,
}

fn noon() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn five_pm() -> NaiveTime {
    NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// `None` sorts after every `Some`.
fn cmp_present_first<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        cmp_present_first(&a.due_date, &b.due_date)
            .then_with(|| cmp_present_first(&a.due_time, &b.due_time))
            .then_with(|| a.title.cmp(&b.title))
    });
}

/// Sunday closing the ISO week that contains `day`.
pub fn end_of_week(day: NaiveDate) -> NaiveDate {
    let days_left = 6 - u64::from(day.weekday().num_days_from_monday());
    day.checked_add_days(Days::new(days_left)).unwrap_or(day)
}

/// Split the tasks of one day by time of day.
pub fn bucket_daily(tasks: Vec<Task>, day: NaiveDate) -> DailySchedule {
    let mut schedule = DailySchedule {
        date: day,
        ..Default::default()
    };

    for task in tasks {
        match task.due_time {
            None => schedule.anytime.push(task),
            Some(t) if t < noon() => schedule.morning.push(task),
            Some(t) if t < five_pm() => schedule.afternoon.push(task),
            Some(_) => schedule.evening.push(task),
        }
    }

    for bucket in [
        &mut schedule.morning,
        &mut schedule.afternoon,
        &mut schedule.evening,
        &mut schedule.anytime,
    ] {
        sort_tasks(bucket);
    }
    schedule
}

/// Split tasks relative to `today`. Overdue ignores status: a done task
/// dated in the past still lands there if the caller fetched it.
pub fn bucket_weekly(tasks: Vec<Task>, today: NaiveDate) -> WeeklySchedule {
    let tomorrow = today.succ_opt().unwrap_or(today);
    let week_end = end_of_week(today);
    let mut schedule = WeeklySchedule {
        today_date: today,
        week_end,
        ..Default::default()
    };

    for task in tasks {
        match task.due_date {
            None => schedule.unscheduled.push(task),
            Some(date) if date < today => schedule.overdue.push(task),
            Some(date) if date == today => schedule.today.push(task),
            Some(date) if date == tomorrow => schedule.tomorrow.push(task),
            Some(date) if date <= week_end => schedule.this_week.push(task),
            Some(_) => schedule.later.push(task),
        }
    }

    for bucket in [
        &mut schedule.overdue,
        &mut schedule.today,
        &mut schedule.tomorrow,
        &mut schedule.this_week,
        &mut schedule.later,
        &mut schedule.unscheduled,
    ] {
        sort_tasks(bucket);
    }
    schedule
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use db::models::task::{TaskPriority, TaskStatus};
    use uuid::Uuid;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn task(title: &str, due_date: Option<NaiveDate>, due_time: Option<NaiveTime>) -> Task {
        Task {
            id: Uuid::new_v4(),
            project_id: None,
            step_id: None,
            title: title.to_string(),
            description: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            due_date,
            due_time,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn test_daily_buckets_by_time_of_day() {
        let day = date(2025, 3, 12);
        let schedule = bucket_daily(
            vec![
                task("standup", Some(day), Some(time(9, 0))),
                task("lunch review", Some(day), Some(time(12, 0))),
                task("late call", Some(day), Some(time(16, 59))),
                task("deploy", Some(day), Some(time(17, 0))),
                task("inbox zero", Some(day), None),
                task("early", Some(day), Some(time(7, 30))),
            ],
            day,
        );

        assert_eq!(titles(&schedule.morning), vec!["early", "standup"]);
        assert_eq!(titles(&schedule.afternoon), vec!["lunch review", "late call"]);
        assert_eq!(titles(&schedule.evening), vec!["deploy"]);
        assert_eq!(titles(&schedule.anytime), vec!["inbox zero"]);
    }

    #[test]
    fn test_daily_keeps_every_task() {
        let day = date(2025, 3, 12);
        let input: Vec<Task> = (0..24)
            .map(|h| task(&format!("t{h}"), Some(day), Some(time(h, 15))))
            .chain([task("untimed", None, None)])
            .collect();
        let schedule = bucket_daily(input, day);
        let total = schedule.morning.len()
            + schedule.afternoon.len()
            + schedule.evening.len()
            + schedule.anytime.len();
        assert_eq!(total, 25);
        assert_eq!(schedule.morning.len(), 12);
        assert_eq!(schedule.afternoon.len(), 5);
        assert_eq!(schedule.evening.len(), 7);
    }

    #[test]
    fn test_end_of_week_is_sunday() {
        assert_eq!(end_of_week(date(2025, 3, 10)), date(2025, 3, 16));
        assert_eq!(end_of_week(date(2025, 3, 12)), date(2025, 3, 16));
        assert_eq!(end_of_week(date(2025, 3, 16)), date(2025, 3, 16));
    }

    #[test]
    fn test_weekly_buckets_relative_to_today() {
        // Wednesday
        let today = date(2025, 3, 12);
        let mut done_overdue = task("old invoice", Some(date(2025, 3, 1)), None);
        done_overdue.status = TaskStatus::Done;

        let schedule = bucket_weekly(
            vec![
                task("yesterday", Some(date(2025, 3, 11)), None),
                done_overdue,
                task("today pm", Some(today), Some(time(15, 0))),
                task("today am", Some(today), Some(time(9, 0))),
                task("thursday", Some(date(2025, 3, 13)), None),
                task("sunday", Some(date(2025, 3, 16)), None),
                task("friday", Some(date(2025, 3, 14)), None),
                task("next monday", Some(date(2025, 3, 17)), None),
                task("someday", None, None),
            ],
            today,
        );

        assert_eq!(titles(&schedule.overdue), vec!["old invoice", "yesterday"]);
        assert_eq!(titles(&schedule.today), vec!["today am", "today pm"]);
        assert_eq!(titles(&schedule.tomorrow), vec!["thursday"]);
        assert_eq!(titles(&schedule.this_week), vec!["friday", "sunday"]);
        assert_eq!(titles(&schedule.later), vec!["next monday"]);
        assert_eq!(titles(&schedule.unscheduled), vec!["someday"]);
        assert_eq!(schedule.week_end, date(2025, 3, 16));
    }

    #[test]
    fn test_weekly_on_sunday_sends_tomorrow_to_tomorrow_not_later() {
        let sunday = date(2025, 3, 16);
        let schedule = bucket_weekly(
            vec![
                task("monday", Some(date(2025, 3, 17)), None),
                task("tuesday", Some(date(2025, 3, 18)), None),
            ],
            sunday,
        );
        assert_eq!(titles(&schedule.tomorrow), vec!["monday"]);
        assert!(schedule.this_week.is_empty());
        assert_eq!(titles(&schedule.later), vec!["tuesday"]);
    }

    #[test]
    fn test_untimed_tasks_sort_after_timed_ones() {
        let today = date(2025, 3, 12);
        let schedule = bucket_weekly(
            vec![
                task("b untimed", Some(today), None),
                task("a untimed", Some(today), None),
                task("timed", Some(today), Some(time(18, 0))),
            ],
            today,
        );
        assert_eq!(
            titles(&schedule.today),
            vec!["timed", "a untimed", "b untimed"]
        );
    }
}
