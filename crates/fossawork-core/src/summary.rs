use chrono::{Duration, NaiveDate};

use crate::work_order::WorkOrder;
use crate::work_week::{WeekInfo, WorkWeekConfig, is_in_week};

/// Per-week aggregation of a work-order collection, as shown on the
/// dashboard: how many orders land in the week, broken down by day.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekSummary {
    pub week: WeekInfo,
    /// Orders whose scheduled date falls inside the week.
    pub scheduled: usize,
    /// Orders with no (parseable) scheduled date at all.
    pub unscheduled: usize,
    /// Order count for every calendar day of the week, zero-filled.
    pub per_day: Vec<(NaiveDate, usize)>,
}

/// Bucket `orders` into `week`.
///
/// Orders scheduled outside the week, on an excluded weekend, or on a
/// configured holiday are counted in neither bucket.
pub fn summarize(orders: &[WorkOrder], week: &WeekInfo, config: &WorkWeekConfig) -> WeekSummary {
    let mut per_day: Vec<(NaiveDate, usize)> = Vec::new();
    let mut day = week.week_start.date();
    while day <= week.week_end.date() {
        per_day.push((day, 0));
        day = day + Duration::days(1);
    }

    let mut scheduled = 0;
    let mut unscheduled = 0;
    for order in orders {
        match order.scheduled_date {
            None => unscheduled += 1,
            Some(when) if is_in_week(when, week, config) => {
                scheduled += 1;
                if let Some(slot) = per_day.iter_mut().find(|(d, _)| *d == when.date()) {
                    slot.1 += 1;
                }
            }
            Some(_) => {}
        }
    }

    WeekSummary {
        week: week.clone(),
        scheduled,
        unscheduled,
        per_day,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::work_week::compute_week;
    use chrono::NaiveDateTime;

    fn dt(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn order(id: &str, scheduled: Option<NaiveDateTime>) -> WorkOrder {
        WorkOrder {
            id: id.to_string(),
            description: None,
            scheduled_date: scheduled,
            address: None,
        }
    }

    #[test]
    fn buckets_orders_by_day() {
        let config = WorkWeekConfig::default();
        let week = compute_week(dt(2024, 1, 17, 9), &config, dt(2024, 1, 17, 9));
        let orders = vec![
            order("a", Some(dt(2024, 1, 15, 8))),
            order("b", Some(dt(2024, 1, 15, 13))),
            order("c", Some(dt(2024, 1, 18, 10))),
            order("d", None),
            order("e", Some(dt(2024, 1, 25, 10))), // next week
        ];

        let summary = summarize(&orders, &week, &config);
        assert_eq!(summary.scheduled, 3);
        assert_eq!(summary.unscheduled, 1);
        assert_eq!(summary.per_day.len(), 5);
        assert_eq!(
            summary.per_day[0],
            (NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(), 2)
        );
        assert_eq!(summary.per_day[1].1, 0);
        assert_eq!(summary.per_day[3].1, 1);
    }

    #[test]
    fn seven_day_week_has_seven_buckets() {
        let config = WorkWeekConfig {
            work_on_weekends: true,
            ..WorkWeekConfig::default()
        };
        let week = compute_week(dt(2024, 1, 17, 9), &config, dt(2024, 1, 17, 9));
        let summary = summarize(&[], &week, &config);
        assert_eq!(summary.per_day.len(), 7);
        assert!(summary.per_day.iter().all(|(_, n)| *n == 0));
    }

    #[test]
    fn holiday_orders_excluded_from_both_buckets() {
        let config =
            WorkWeekConfig::from_preferences(false, &["2024-01-16".to_string()]).unwrap();
        let week = compute_week(dt(2024, 1, 17, 9), &config, dt(2024, 1, 17, 9));
        let orders = vec![order("a", Some(dt(2024, 1, 16, 8)))];

        let summary = summarize(&orders, &week, &config);
        assert_eq!(summary.scheduled, 0);
        assert_eq!(summary.unscheduled, 0);
    }
}
