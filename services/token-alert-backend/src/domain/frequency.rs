use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Digests go out at 07:00 UTC.
const DELIVERY_HOUR: u32 = 7;

/// The cadence of a digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }

    /// Recurrence rule handed to the scheduler: every Friday at 07:00 for
    /// weekly digests, the first of every month at 07:00 for monthly ones.
    pub fn cron_expression(&self) -> &'static str {
        match self {
            Frequency::Weekly => "0 7 * * 5",
            Frequency::Monthly => "0 7 1 * *",
        }
    }

    /// First occurrence of the recurrence rule strictly after `after`.
    pub fn next_run_after(&self, after: DateTime<Utc>) -> DateTime<Utc> {
        let today = after.date_naive();
        let candidate = match self {
            Frequency::Weekly => {
                let days_ahead = (Weekday::Fri.num_days_from_monday() + 7
                    - today.weekday().num_days_from_monday())
                    % 7;
                today + Duration::days(i64::from(days_ahead))
            }
            Frequency::Monthly => first_of_month(today),
        };
        let candidate = at_delivery_time(candidate);
        if candidate > after {
            return candidate;
        }
        match self {
            Frequency::Weekly => candidate + Duration::days(7),
            Frequency::Monthly => {
                // Day 28 + 4 days always lands in the next month.
                let next_month = first_of_month(today) + Duration::days(32);
                at_delivery_time(first_of_month(next_month))
            }
        }
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

fn at_delivery_time(date: NaiveDate) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(DELIVERY_HOUR, 0, 0).unwrap_or_default();
    Utc.from_utc_datetime(&date.and_time(time))
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            _ => Err(format!("Invalid frequency: {s} (expected weekly or monthly)")),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
