// src/common/period.rs

use std::{fmt, str::FromStr};

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::error::AppError;

// A semana começa no domingo
pub const WEEK_START: Weekday = Weekday::Sun;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    Today,
    Week,
    Month,
}

impl FromStr for StatsPeriod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(StatsPeriod::Today),
            "week" => Ok(StatsPeriod::Week),
            "month" => Ok(StatsPeriod::Month),
            other => Err(AppError::InvalidPeriod(other.to_string())),
        }
    }
}

impl fmt::Display for StatsPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatsPeriod::Today => "today",
            StatsPeriod::Week => "week",
            StatsPeriod::Month => "month",
        };
        f.write_str(s)
    }
}

/// Janela semiaberta de datas: [start, end)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DateWindow {
    #[schema(value_type = String, format = Date)]
    pub start: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self::new(day, next_day(day))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}

pub fn next_day(day: NaiveDate) -> NaiveDate {
    day.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX)
}

pub fn previous_day(day: NaiveDate) -> NaiveDate {
    day.checked_sub_days(Days::new(1)).unwrap_or(NaiveDate::MIN)
}

/// Domingo mais recente (o próprio dia, se for domingo).
pub fn week_start(day: NaiveDate) -> NaiveDate {
    let offset = (7 + day.weekday().num_days_from_monday() - WEEK_START.num_days_from_monday()) % 7;
    day.checked_sub_days(Days::new(offset.into()))
        .unwrap_or(NaiveDate::MIN)
}

pub fn month_start(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

impl StatsPeriod {
    /// Janela "até hoje, inclusive" usada na verificação em tempo real.
    pub fn live_window(self, today: NaiveDate) -> DateWindow {
        let end = next_day(today);
        let start = match self {
            StatsPeriod::Today => today,
            StatsPeriod::Week => week_start(today),
            StatsPeriod::Month => month_start(today),
        };
        DateWindow::new(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_known_periods_only() {
        assert_eq!("today".parse::<StatsPeriod>().unwrap(), StatsPeriod::Today);
        assert_eq!("week".parse::<StatsPeriod>().unwrap(), StatsPeriod::Week);
        assert_eq!("month".parse::<StatsPeriod>().unwrap(), StatsPeriod::Month);

        let err = "quarter".parse::<StatsPeriod>().unwrap_err();
        assert!(matches!(err, AppError::InvalidPeriod(p) if p == "quarter"));
        assert!("Today".parse::<StatsPeriod>().is_err());
    }

    #[test]
    fn week_starts_on_most_recent_sunday() {
        // 2026-10-15 é uma quinta-feira
        assert_eq!(week_start(date(2026, 10, 15)), date(2026, 10, 11));
        // Domingo é o próprio início
        assert_eq!(week_start(date(2026, 10, 11)), date(2026, 10, 11));
        // Sábado
        assert_eq!(week_start(date(2026, 10, 17)), date(2026, 10, 11));
    }

    #[test]
    fn live_windows_end_at_midnight_tomorrow() {
        let today = date(2026, 10, 15);
        assert_eq!(
            StatsPeriod::Today.live_window(today),
            DateWindow::new(today, date(2026, 10, 16))
        );
        assert_eq!(
            StatsPeriod::Week.live_window(today),
            DateWindow::new(date(2026, 10, 11), date(2026, 10, 16))
        );
        assert_eq!(
            StatsPeriod::Month.live_window(today),
            DateWindow::new(date(2026, 10, 1), date(2026, 10, 16))
        );
    }

    #[test]
    fn window_is_half_open() {
        let w = DateWindow::single_day(date(2026, 10, 15));
        assert!(w.contains(date(2026, 10, 15)));
        assert!(!w.contains(date(2026, 10, 16)));
        assert!(!w.contains(date(2026, 10, 14)));
    }
}
