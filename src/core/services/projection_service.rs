use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::core::lookup::LookupProvider;
use crate::errors::Result;
use crate::ledger::recurring::count_in_window;
use crate::ledger::{CategoryId, DateWindow, LedgerEntry, PersonId, RecurrenceRule, TypeId};

/// Expected (or actual) totals per `(category, type)` bucket.
pub type Projection = BTreeMap<(CategoryId, TypeId), Decimal>;

/// One dashboard row comparing what was planned with what was confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketComparison {
    pub category_id: CategoryId,
    pub type_id: TypeId,
    pub projected: Decimal,
    pub actual: Decimal,
    /// `actual - projected`.
    pub difference: Decimal,
}

pub struct ProjectionService;

impl ProjectionService {
    /// Projects a month's totals straight from the rules; nothing is persisted.
    ///
    /// Rules that are invalid or reference an unknown category or type add
    /// nothing and are logged.
    pub fn project(
        rules: &[RecurrenceRule],
        year: i32,
        month: u32,
        person_filter: Option<PersonId>,
        lookups: &dyn LookupProvider,
    ) -> Result<Projection> {
        let window = DateWindow::month(year, month)?;
        let mut projection = Projection::new();

        for rule in rules
            .iter()
            .filter(|rule| rule.active && matches_person(rule.person_id, person_filter))
        {
            if let Err(err) = rule.validate() {
                warn!(rule_id = %rule.id, error = %err, "rule left out of projection");
                continue;
            }
            if !lookups.has_category(rule.category_id) {
                warn!(
                    rule_id = %rule.id,
                    category_id = rule.category_id,
                    "unknown category, rule left out of projection"
                );
                continue;
            }
            if let Err(err) = lookups.resolve_type_nature(rule.type_id) {
                warn!(rule_id = %rule.id, error = %err, "rule left out of projection");
                continue;
            }

            let count = count_in_window(rule, &window);
            if count == 0 {
                continue;
            }
            *projection
                .entry((rule.category_id, rule.type_id))
                .or_insert(Decimal::ZERO) += rule.amount * Decimal::from(count);
        }
        Ok(projection)
    }

    /// Sums settled entries of the month into the same buckets as [`Self::project`].
    pub fn actual_totals(
        entries: &[LedgerEntry],
        year: i32,
        month: u32,
        person_filter: Option<PersonId>,
    ) -> Result<Projection> {
        let window = DateWindow::month(year, month)?;
        let mut totals = Projection::new();
        for entry in entries.iter().filter(|entry| {
            entry.status.is_settled()
                && window.contains(entry.date)
                && matches_person(entry.person_id, person_filter)
        }) {
            *totals
                .entry((entry.category_id, entry.type_id))
                .or_insert(Decimal::ZERO) += entry.amount;
        }
        Ok(totals)
    }

    /// Rows for every bucket present on either side, in bucket order.
    pub fn compare(projected: &Projection, actual: &Projection) -> Vec<BucketComparison> {
        let mut keys: Vec<_> = projected.keys().chain(actual.keys()).copied().collect();
        keys.sort_unstable();
        keys.dedup();
        keys.into_iter()
            .map(|(category_id, type_id)| {
                let projected = projected
                    .get(&(category_id, type_id))
                    .copied()
                    .unwrap_or_default();
                let actual = actual
                    .get(&(category_id, type_id))
                    .copied()
                    .unwrap_or_default();
                BucketComparison {
                    category_id,
                    type_id,
                    projected,
                    actual,
                    difference: actual - projected,
                }
            })
            .collect()
    }

    pub fn total(projection: &Projection) -> Decimal {
        projection.values().copied().sum()
    }
}

fn matches_person(owner: Option<PersonId>, filter: Option<PersonId>) -> bool {
    filter.map_or(true, |person| owner == Some(person))
}
