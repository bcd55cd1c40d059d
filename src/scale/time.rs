use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Weekday};

use super::{Linear, tick_increment};
use crate::error::{Error, Result};

const DAY_MS: f64 = 86_400_000.0;
const YEAR_MS: f64 = 365.25 * DAY_MS;

/// Calendar-aligned tick step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeInterval {
    /// Every `n` days; `Days(7)` aligns to Sundays, other steps to the day
    /// of the month.
    Days(u32),
    /// Every `n` months, starting from January.
    Months(u32),
    /// Every `n` years, on years divisible by `n`.
    Years(i32),
}

const CANDIDATES: [TimeInterval; 6] = [
    TimeInterval::Days(1),
    TimeInterval::Days(2),
    TimeInterval::Days(7),
    TimeInterval::Months(1),
    TimeInterval::Months(3),
    TimeInterval::Years(1),
];

impl TimeInterval {
    fn approx_millis(self) -> f64 {
        match self {
            Self::Days(n) => n as f64 * DAY_MS,
            Self::Months(n) => n as f64 * 30.0 * DAY_MS,
            Self::Years(n) => n as f64 * 365.0 * DAY_MS,
        }
    }

    /// Picks the interval whose duration is closest (by ratio) to
    /// `span / count`; spans of many years use a nice multiple of years.
    pub fn choose(start: NaiveDateTime, stop: NaiveDateTime, count: usize) -> Self {
        let span = (millis(stop) - millis(start)).abs();
        let target = span / count.max(1) as f64;

        if target >= Self::Years(1).approx_millis() {
            let step = tick_increment(0.0, span / YEAR_MS, count);
            let years = if step >= 1.0 { step.round() as i32 } else { 1 };
            return Self::Years(years.max(1));
        }

        let index = CANDIDATES
            .iter()
            .position(|interval| interval.approx_millis() > target)
            .unwrap_or(CANDIDATES.len() - 1);
        if index == 0 {
            return CANDIDATES[0];
        }

        let below = CANDIDATES[index - 1];
        let above = CANDIDATES[index];
        if target / below.approx_millis() < above.approx_millis() / target {
            below
        } else {
            above
        }
    }

    fn is_aligned(self, date: NaiveDate) -> bool {
        match self {
            Self::Days(7) => date.weekday() == Weekday::Sun,
            Self::Days(n) => (date.day() - 1) % n.max(1) == 0,
            Self::Months(n) => date.day() == 1 && date.month0() % n.max(1) == 0,
            Self::Years(n) => date.ordinal() == 1 && date.year().rem_euclid(n.max(1)) == 0,
        }
    }

    /// First aligned date at or after `at`.
    fn ceil(self, at: NaiveDateTime) -> Option<NaiveDate> {
        let mut date = at.date();
        if at.time() != NaiveTime::MIN {
            date = date.succ_opt()?;
        }

        match self {
            Self::Days(_) => {
                while !self.is_aligned(date) {
                    date = date.succ_opt()?;
                }
                Some(date)
            }
            Self::Months(_) => {
                let mut month = if date.day() == 1 {
                    date
                } else {
                    first_of_month(date)?.checked_add_months(Months::new(1))?
                };
                while !self.is_aligned(month) {
                    month = month.checked_add_months(Months::new(1))?;
                }
                Some(month)
            }
            Self::Years(n) => {
                let n = n.max(1);
                let mut year = date.year();
                if date.ordinal() != 1 {
                    year += 1;
                }
                let aligned = year.div_euclid(n) * n;
                let year = if aligned < year { aligned + n } else { aligned };
                NaiveDate::from_ymd_opt(year, 1, 1)
            }
        }
    }

    /// Next aligned date strictly after the aligned `date`.
    fn advance(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Days(7) => date.checked_add_signed(TimeDelta::days(7)),
            Self::Days(_) => {
                let mut next = date.succ_opt()?;
                while !self.is_aligned(next) {
                    next = next.succ_opt()?;
                }
                Some(next)
            }
            Self::Months(n) => date.checked_add_months(Months::new(n.max(1))),
            Self::Years(n) => NaiveDate::from_ymd_opt(date.year() + n.max(1), 1, 1),
        }
    }

    pub fn label(self, date: NaiveDate) -> String {
        match self {
            Self::Years(_) => date.format("%Y").to_string(),
            Self::Months(_) if date.month() == 1 => date.format("%Y").to_string(),
            Self::Months(_) => date.format("%B").to_string(),
            Self::Days(_) => date.format("%b %d").to_string(),
        }
    }
}

fn first_of_month(date: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
}

fn millis(value: NaiveDateTime) -> f64 {
    value.and_utc().timestamp_millis() as f64
}

/// Continuous scale over calendar instants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeScale {
    domain: [NaiveDateTime; 2],
    linear: Linear,
}

impl TimeScale {
    pub fn new(domain: [NaiveDateTime; 2], range: [f64; 2]) -> Result<Self> {
        let linear = Linear::new([millis(domain[0]), millis(domain[1])], range).map_err(
            |error| match error {
                Error::DivisionByZero { value, .. } => Error::DivisionByZero {
                    scale: "time",
                    value,
                },
                other => other,
            },
        )?;
        Ok(Self { domain, linear })
    }

    pub fn domain(&self) -> [NaiveDateTime; 2] {
        self.domain
    }

    pub fn range(&self) -> [f64; 2] {
        self.linear.range()
    }

    pub fn scale(&self, value: NaiveDateTime) -> f64 {
        self.linear.scale(millis(value))
    }

    pub fn ticks(&self, count: usize) -> TimeTicks {
        let (start, stop) = if self.domain[0] <= self.domain[1] {
            (self.domain[0], self.domain[1])
        } else {
            (self.domain[1], self.domain[0])
        };
        let interval = TimeInterval::choose(start, stop, count);
        TimeTicks {
            interval,
            next: interval.ceil(start),
            stop,
        }
    }
}

/// Lazy ascending sequence of calendar-aligned ticks; `Clone` restarts it.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeTicks {
    interval: TimeInterval,
    next: Option<NaiveDate>,
    stop: NaiveDateTime,
}

impl TimeTicks {
    pub fn interval(&self) -> TimeInterval {
        self.interval
    }
}

impl Iterator for TimeTicks {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next?;
        if current.and_time(NaiveTime::MIN) > self.stop {
            self.next = None;
            return None;
        }
        self.next = self.interval.advance(current);
        Some(current)
    }
}
