//! Occurrence generation for recurrence rules.
//!
//! Everything here is pure: a rule and a query window go in, dated occurrences
//! come out. Counting helpers work analytically from the rule start so that a
//! repetition limit is honoured no matter which window the caller asks for.

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calendar::{
    anchored_date, days_in_month, month_index, next_weekday_on_or_after, year_month_from_index,
    DateWindow,
};
use super::rule::{RecurrenceKind, RecurrenceRule};
use super::{AccountId, CategoryId, CurrencyId, PersonId, RuleId, TypeId};
use crate::errors::Result;

/// One concrete dated instance of a rule. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub rule_id: RuleId,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub currency_id: CurrencyId,
    pub category_id: CategoryId,
    pub type_id: TypeId,
    pub description: String,
    pub account_id: Option<AccountId>,
    pub person_id: Option<PersonId>,
}

impl Occurrence {
    fn from_rule(rule: &RecurrenceRule, date: NaiveDate) -> Self {
        Self {
            rule_id: rule.id,
            date,
            amount: rule.amount,
            currency_id: rule.currency_id,
            category_id: rule.category_id,
            type_id: rule.type_id,
            description: rule.description.clone(),
            account_id: rule.account_id,
            person_id: rule.person_id,
        }
    }
}

/// Occurrences of `rule` inside `window`, in chronological order.
pub fn generate(rule: &RecurrenceRule, window: &DateWindow) -> Result<Vec<Occurrence>> {
    Ok(occurrence_dates(rule, window)?
        .into_iter()
        .map(|date| Occurrence::from_rule(rule, date))
        .collect())
}

/// Dates of `rule` inside `window` after bounds and repetition limit are applied.
pub fn occurrence_dates(rule: &RecurrenceRule, window: &DateWindow) -> Result<Vec<NaiveDate>> {
    if !rule.active {
        return Ok(Vec::new());
    }
    rule.validate()?;
    let Some(effective) = window.clamp(rule.window_start, rule.window_end) else {
        return Ok(Vec::new());
    };
    let mut dates = candidates_in(rule, &effective);
    if let Some(limit) = rule.limit() {
        let remaining = limit.saturating_sub(occurrences_before(rule, effective.start));
        dates.truncate(remaining as usize);
    }
    Ok(dates)
}

/// Number of occurrences `generate` would produce for `window`, computed without enumeration.
pub fn count_in_window(rule: &RecurrenceRule, window: &DateWindow) -> u64 {
    if !rule.active {
        return 0;
    }
    let Some(effective) = window.clamp(rule.window_start, rule.window_end) else {
        return 0;
    };
    let count = count_between(rule, &effective);
    match rule.limit() {
        Some(limit) => count.min(limit.saturating_sub(occurrences_before(rule, effective.start))),
        None => count,
    }
}

/// Valid occurrences since the rule start strictly before `date`, ignoring the limit.
///
/// Rules without a start date have nothing to count from and report zero.
pub fn occurrences_before(rule: &RecurrenceRule, date: NaiveDate) -> u64 {
    let Some(start) = rule.window_start else {
        return 0;
    };
    let Some(last) = date.pred_opt() else {
        return 0;
    };
    let last = rule.window_end.map_or(last, |end| end.min(last));
    if last < start {
        return 0;
    }
    count_between(rule, &DateWindow { start, end: last })
}

fn candidates_in(rule: &RecurrenceRule, range: &DateWindow) -> Vec<NaiveDate> {
    match rule.recurrence_kind {
        RecurrenceKind::Monthly => (month_index(range.start)..=month_index(range.end))
            .filter_map(|index| {
                let (year, month) = year_month_from_index(index);
                anchored_date(year, month, rule.anchor_day)
            })
            .filter(|date| range.contains(*date))
            .collect(),
        RecurrenceKind::Weekly => {
            let mut dates = Vec::new();
            let mut current = next_weekday_on_or_after(range.start, rule.anchor_day);
            while current <= range.end {
                dates.push(current);
                current += Duration::days(7);
            }
            dates
        }
        RecurrenceKind::Annual => {
            let Some(month) = rule.anchor_month() else {
                return Vec::new();
            };
            (range.start.year()..=range.end.year())
                .filter_map(|year| anchored_date(year, month, rule.anchor_day))
                .filter(|date| range.contains(*date))
                .collect()
        }
        RecurrenceKind::Once => rule
            .window_start
            .filter(|start| range.contains(*start))
            .into_iter()
            .collect(),
    }
}

fn count_between(rule: &RecurrenceRule, range: &DateWindow) -> u64 {
    let day = rule.anchor_day;
    match rule.recurrence_kind {
        RecurrenceKind::Monthly if day <= 28 => {
            // Every month has the anchor day; only the partial edge months can miss it.
            let mut months = (month_index(range.end) - month_index(range.start) + 1) as u64;
            if range.start.day() > day {
                months -= 1;
            }
            if range.end.day() < day {
                months = months.saturating_sub(1);
            }
            months
        }
        RecurrenceKind::Monthly => (month_index(range.start)..=month_index(range.end))
            .filter(|index| {
                let (year, month) = year_month_from_index(*index);
                if day > days_in_month(year, month) {
                    return false;
                }
                let in_first = *index == month_index(range.start) && range.start.day() > day;
                let in_last = *index == month_index(range.end) && range.end.day() < day;
                !in_first && !in_last
            })
            .count() as u64,
        RecurrenceKind::Weekly => {
            let first = next_weekday_on_or_after(range.start, day);
            if first > range.end {
                0
            } else {
                (range.end - first).num_days() as u64 / 7 + 1
            }
        }
        RecurrenceKind::Annual | RecurrenceKind::Once => candidates_in(rule, range).len() as u64,
    }
}
