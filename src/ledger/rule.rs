use std::fmt;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AccountId, CategoryId, CurrencyId, PersonId, RuleId, TypeId};
use crate::errors::{PlannerError, Result};

/// Repetition limit value meaning "repeat forever".
pub const UNBOUNDED: i32 = -1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecurrenceKind {
    Monthly,
    Weekly,
    Annual,
    Once,
}

impl fmt::Display for RecurrenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecurrenceKind::Monthly => "Monthly",
            RecurrenceKind::Weekly => "Weekly",
            RecurrenceKind::Annual => "Annual",
            RecurrenceKind::Once => "Once",
        };
        f.write_str(label)
    }
}

/// Declarative description of a planned movement (rent, salary, subscription).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub id: RuleId,
    pub description: String,
    pub recurrence_kind: RecurrenceKind,
    /// Day of month for MONTHLY/ANNUAL, ISO weekday for WEEKLY.
    pub anchor_day: u32,
    pub amount: Decimal,
    pub currency_id: CurrencyId,
    pub category_id: CategoryId,
    pub type_id: TypeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<AccountId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<PersonId>,
    #[serde(default)]
    pub window_start: Option<NaiveDate>,
    #[serde(default)]
    pub window_end: Option<NaiveDate>,
    #[serde(default = "RecurrenceRule::unbounded")]
    pub repetition_limit: i32,
    #[serde(default = "RecurrenceRule::active_default")]
    pub active: bool,
}

impl RecurrenceRule {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        description: impl Into<String>,
        recurrence_kind: RecurrenceKind,
        anchor_day: u32,
        amount: Decimal,
        currency_id: CurrencyId,
        category_id: CategoryId,
        type_id: TypeId,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            recurrence_kind,
            anchor_day,
            amount,
            currency_id,
            category_id,
            type_id,
            account_id: None,
            person_id: None,
            window_start: None,
            window_end: None,
            repetition_limit: UNBOUNDED,
            active: true,
        }
    }

    pub fn starting(mut self, start: NaiveDate) -> Self {
        self.window_start = Some(start);
        self
    }

    pub fn ending(mut self, end: NaiveDate) -> Self {
        self.window_end = Some(end);
        self
    }

    pub fn limited_to(mut self, repetitions: i32) -> Self {
        self.repetition_limit = repetitions;
        self
    }

    pub fn for_account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn owned_by(mut self, person_id: PersonId) -> Self {
        self.person_id = Some(person_id);
        self
    }

    pub fn unbounded() -> i32 {
        UNBOUNDED
    }

    fn active_default() -> bool {
        true
    }

    /// `Some(n)` when the rule stops after `n` occurrences.
    pub fn limit(&self) -> Option<u64> {
        (self.repetition_limit != UNBOUNDED).then_some(self.repetition_limit.max(0) as u64)
    }

    /// Month used by ANNUAL rules; taken from the rule start.
    pub fn anchor_month(&self) -> Option<u32> {
        self.window_start.map(|start| start.month())
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| {
            Err(PlannerError::Validation(format!(
                "rule `{}`: {}",
                self.description, reason
            )))
        };

        let day_range = match self.recurrence_kind {
            RecurrenceKind::Weekly => 1..=7,
            _ => 1..=31,
        };
        if !day_range.contains(&self.anchor_day) {
            return invalid(format!(
                "anchor day {} is not valid for a {} rule",
                self.anchor_day, self.recurrence_kind
            ));
        }
        if self.amount <= Decimal::ZERO {
            return invalid(format!("amount {} must be positive", self.amount));
        }
        if let (Some(start), Some(end)) = (self.window_start, self.window_end) {
            if end < start {
                return invalid(format!("window end {end} is before start {start}"));
            }
        }
        if self.repetition_limit != UNBOUNDED && self.repetition_limit < 1 {
            return invalid(format!(
                "repetition limit {} must be -1 or at least 1",
                self.repetition_limit
            ));
        }
        if self.window_start.is_none() {
            match self.recurrence_kind {
                RecurrenceKind::Annual | RecurrenceKind::Once => {
                    return invalid(format!("{} rules need a start date", self.recurrence_kind));
                }
                _ if self.repetition_limit != UNBOUNDED => {
                    return invalid("limited rules need a start date to count from".into());
                }
                _ => {}
            }
        }
        if self.recurrence_kind == RecurrenceKind::Annual {
            let month = self.anchor_month().unwrap_or(1);
            // 2000 is a leap year, so Feb 29 passes while Feb 30 or Apr 31 do not.
            if NaiveDate::from_ymd_opt(2000, month, self.anchor_day).is_none() {
                return invalid(format!(
                    "day {} never occurs in month {}",
                    self.anchor_day, month
                ));
            }
        }
        Ok(())
    }
}

/// Ordered collection of rules owned by the planning module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleBook {
    rules: Vec<RecurrenceRule>,
}

impl RuleBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, rule: RecurrenceRule) -> Result<RuleId> {
        rule.validate()?;
        if self.get(rule.id).is_some() {
            return Err(PlannerError::Validation(format!(
                "rule {} already exists",
                rule.id
            )));
        }
        let id = rule.id;
        self.rules.push(rule);
        Ok(id)
    }

    /// Applies `mutator` to a copy and only commits it when it still validates.
    pub fn update<F>(&mut self, id: RuleId, mutator: F) -> Result<()>
    where
        F: FnOnce(&mut RecurrenceRule),
    {
        let slot = self
            .rules
            .iter_mut()
            .find(|rule| rule.id == id)
            .ok_or_else(|| PlannerError::Lookup(format!("rule {id} not found")))?;
        let mut edited = slot.clone();
        mutator(&mut edited);
        edited.id = id;
        edited.validate()?;
        *slot = edited;
        Ok(())
    }

    pub fn remove(&mut self, id: RuleId) -> Result<RecurrenceRule> {
        let index = self
            .rules
            .iter()
            .position(|rule| rule.id == id)
            .ok_or_else(|| PlannerError::Lookup(format!("rule {id} not found")))?;
        Ok(self.rules.remove(index))
    }

    pub fn set_active(&mut self, id: RuleId, active: bool) -> Result<()> {
        self.update(id, |rule| rule.active = active)
    }

    pub fn get(&self, id: RuleId) -> Option<&RecurrenceRule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    pub fn all(&self) -> &[RecurrenceRule] {
        &self.rules
    }

    pub fn active(&self) -> impl Iterator<Item = &RecurrenceRule> {
        self.rules.iter().filter(|rule| rule.active)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rent() -> RecurrenceRule {
        RecurrenceRule::new("Rent", RecurrenceKind::Monthly, 5, dec!(1000), 2, 12, 4)
            .starting(date(2024, 1, 1))
    }

    #[test]
    fn anchor_day_range_depends_on_kind() {
        let mut rule = rent();
        rule.anchor_day = 31;
        assert!(rule.validate().is_ok());
        rule.anchor_day = 32;
        assert!(rule.validate().is_err());

        rule.recurrence_kind = RecurrenceKind::Weekly;
        rule.anchor_day = 8;
        assert!(rule.validate().is_err());
        rule.anchor_day = 7;
        assert!(rule.validate().is_ok());
        rule.anchor_day = 0;
        assert!(rule.validate().is_err());
    }

    #[test]
    fn rejects_reversed_bounds_and_bad_limits() {
        let rule = rent().ending(date(2023, 12, 31));
        assert!(matches!(rule.validate(), Err(PlannerError::Validation(_))));

        assert!(rent().limited_to(0).validate().is_err());
        assert!(rent().limited_to(-2).validate().is_err());
        assert!(rent().limited_to(1).validate().is_ok());
        assert!(rent().limited_to(UNBOUNDED).validate().is_ok());
    }

    #[test]
    fn start_is_required_where_counting_needs_it() {
        let mut rule = rent();
        rule.window_start = None;
        assert!(rule.validate().is_ok());
        assert!(rule.clone().limited_to(3).validate().is_err());

        rule.recurrence_kind = RecurrenceKind::Once;
        assert!(rule.validate().is_err());
    }

    #[test]
    fn annual_rules_reject_impossible_days() {
        let leap_day =
            RecurrenceRule::new("Insurance", RecurrenceKind::Annual, 29, dec!(90), 2, 3, 4)
                .starting(date(2024, 2, 29));
        assert!(leap_day.validate().is_ok());

        let mut never = leap_day.clone();
        never.anchor_day = 30;
        assert!(never.validate().is_err());
    }

    #[test]
    fn rule_book_update_keeps_valid_state() {
        let mut book = RuleBook::new();
        let id = book.add(rent()).unwrap();

        let err = book.update(id, |rule| rule.anchor_day = 40).unwrap_err();
        assert!(matches!(err, PlannerError::Validation(_)));
        assert_eq!(book.get(id).unwrap().anchor_day, 5);

        book.set_active(id, false).unwrap();
        assert_eq!(book.active().count(), 0);

        let removed = book.remove(id).unwrap();
        assert_eq!(removed.description, "Rent");
        assert!(matches!(book.remove(id), Err(PlannerError::Lookup(_))));
    }

    #[test]
    fn serde_defaults_fill_optional_columns() {
        let json = r#"{
            "id": "6f9c2a52-3f53-4f43-9a59-0c8f0d1e2b11",
            "description": "Gym",
            "recurrence_kind": "WEEKLY",
            "anchor_day": 3,
            "amount": "25.00",
            "currency_id": 2,
            "category_id": 9,
            "type_id": 4
        }"#;
        let rule: RecurrenceRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.repetition_limit, UNBOUNDED);
        assert!(rule.active);
        assert_eq!(rule.limit(), None);
        assert_eq!(rule.amount, dec!(25.00));
    }
}
