//! Calendar decomposition: splitting a date range into typed period blocks.
//!
//! Grounded in the teacher's `api::fetch_public_holidays` for the shape of
//! a region's holiday set, but made fully offline and deterministic: the
//! decomposer never performs network I/O (see SPEC_FULL.md §3, "Determinism").

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodBlockType {
    Main,
    Call,
}

#[derive(Debug, Clone)]
pub struct PeriodBlock {
    pub week_start: NaiveDate,
    pub block_type: PeriodBlockType,
    pub days: Vec<NaiveDate>,
}

impl PeriodBlock {
    pub fn start_date(&self) -> NaiveDate {
        *self.days.first().expect("block has at least one day")
    }

    pub fn end_date(&self) -> NaiveDate {
        *self.days.last().expect("block has at least one day")
    }
}

#[derive(Debug, Clone)]
pub struct Calendar {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub region: String,
    pub holidays: BTreeSet<NaiveDate>,
}

impl Calendar {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, region: impl Into<String>) -> Self {
        Self {
            start_date,
            end_date,
            region: region.into(),
            holidays: BTreeSet::new(),
        }
    }

    pub fn add_holiday(&mut self, day: NaiveDate) {
        self.holidays.insert(day);
    }

    pub fn is_holiday(&self, day: NaiveDate) -> bool {
        self.holidays.contains(&day)
    }

    /// A day is "off" if it falls on the weekend (Saturday/Sunday) or is an
    /// explicit holiday. Workdays adjacent to a holiday are pulled into the
    /// off-day run by the maximal-run grouping below, not by this predicate
    /// itself - see DESIGN.md for why a Friday is not unconditionally off.
    fn is_off_day(&self, day: NaiveDate) -> bool {
        matches!(day.weekday(), Weekday::Sat | Weekday::Sun) || self.is_holiday(day)
    }

    fn week_start_of(day: NaiveDate) -> NaiveDate {
        let offset = day.weekday().num_days_from_monday() as i64;
        day - Duration::days(offset)
    }

    /// Decompose `[start_date, end_date]` into an ordered map of
    /// `week_start -> [blocks]`, sorted chronologically both across weeks
    /// and within a week.
    pub fn decompose(&self) -> Vec<(NaiveDate, Vec<PeriodBlock>)> {
        let mut weeks: Vec<(NaiveDate, Vec<PeriodBlock>)> = Vec::new();
        let mut day = self.start_date;
        while day <= self.end_date {
            let week_start = Self::week_start_of(day);
            let week_end = (week_start + Duration::days(6)).min(self.end_date);
            let mut days_in_week = Vec::new();
            let mut cursor = day;
            while cursor <= week_end {
                days_in_week.push(cursor);
                cursor += Duration::days(1);
            }

            let blocks = self.blocks_for_week(week_start, &days_in_week);
            weeks.push((week_start, blocks));

            day = week_end + Duration::days(1);
        }
        weeks
    }

    fn blocks_for_week(&self, week_start: NaiveDate, days: &[NaiveDate]) -> Vec<PeriodBlock> {
        let mut blocks = Vec::new();
        let mut current_type = None;
        let mut current_days: Vec<NaiveDate> = Vec::new();

        for &d in days {
            let off = self.is_off_day(d);
            let this_type = if off { PeriodBlockType::Call } else { PeriodBlockType::Main };
            match current_type {
                Some(t) if t == this_type => current_days.push(d),
                Some(t) => {
                    blocks.push(PeriodBlock {
                        week_start,
                        block_type: t,
                        days: std::mem::take(&mut current_days),
                    });
                    current_type = Some(this_type);
                    current_days.push(d);
                }
                None => {
                    current_type = Some(this_type);
                    current_days.push(d);
                }
            }
        }
        if let Some(t) = current_type {
            blocks.push(PeriodBlock {
                week_start,
                block_type: t,
                days: current_days,
            });
        }
        blocks
    }
}
