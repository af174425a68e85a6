use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::lookup::LookupProvider;
use crate::core::store::LedgerStore;
use crate::errors::{ErrorKind, Feedback, PlannerError, Result};
use crate::ledger::{generate, DateWindow, LedgerEntryTemplate, RecurrenceRule, RuleId};

use super::expansion_service::{DedupPolicy, ExpansionGroup, ExpansionRegistry};

/// Failure that aborted one rule during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleFailure {
    pub rule_id: RuleId,
    pub description: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl RuleFailure {
    fn new(rule: &RecurrenceRule, err: &PlannerError) -> Self {
        Self {
            rule_id: rule.id,
            description: rule.description.clone(),
            kind: err.kind(),
            message: err.detail().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterializationReport {
    pub run_id: Uuid,
    pub window: DateWindow,
    pub inserted_count: usize,
    pub skipped_count: usize,
    pub per_rule_errors: Vec<RuleFailure>,
}

impl MaterializationReport {
    fn new(window: DateWindow) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            window,
            inserted_count: 0,
            skipped_count: 0,
            per_rule_errors: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.per_rule_errors.is_empty()
    }

    /// Summary for UI collaborators; a run with rule failures is not a success.
    pub fn feedback(&self) -> Feedback {
        let summary = format!(
            "{} entries inserted, {} already present",
            self.inserted_count, self.skipped_count
        );
        match self.per_rule_errors.first() {
            None => Feedback::ok(summary),
            Some(first) => Feedback {
                success: false,
                kind: Some(first.kind),
                message: format!(
                    "{summary}; {} rule(s) failed, first: {}",
                    self.per_rule_errors.len(),
                    first.message
                ),
            },
        }
    }
}

/// Turns rule occurrences into pending ledger entries exactly once.
pub struct MaterializeService;

impl MaterializeService {
    /// Materializes every rule over `[window_start, window_end]`.
    ///
    /// Only an invalid window fails the call. Rule errors are collected in the
    /// report and the run carries on with the next rule.
    pub fn materialize<S: LedgerStore + ?Sized>(
        store: &mut S,
        lookups: &dyn LookupProvider,
        registry: &ExpansionRegistry,
        rules: &[RecurrenceRule],
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<MaterializationReport> {
        let window = DateWindow::new(window_start, window_end)?;
        let mut report = MaterializationReport::new(window);

        for rule in rules {
            if let Err(err) = Self::materialize_rule(store, lookups, registry, rule, &mut report) {
                warn!(
                    run_id = %report.run_id,
                    rule_id = %rule.id,
                    error = %err,
                    "rule skipped during materialization"
                );
                report.per_rule_errors.push(RuleFailure::new(rule, &err));
            }
        }

        info!(
            run_id = %report.run_id,
            start = %window.start,
            end = %window.end,
            inserted = report.inserted_count,
            skipped = report.skipped_count,
            failed_rules = report.per_rule_errors.len(),
            "materialization finished"
        );
        Ok(report)
    }

    fn materialize_rule<S: LedgerStore + ?Sized>(
        store: &mut S,
        lookups: &dyn LookupProvider,
        registry: &ExpansionRegistry,
        rule: &RecurrenceRule,
        report: &mut MaterializationReport,
    ) -> Result<()> {
        for occurrence in generate(rule, &report.window)? {
            let group = registry.expand(&occurrence, lookups)?;
            Self::write_group(store, group, report)?;
        }
        Ok(())
    }

    fn write_group<S: LedgerStore + ?Sized>(
        store: &mut S,
        group: ExpansionGroup,
        report: &mut MaterializationReport,
    ) -> Result<()> {
        let total = group.templates.len();
        let mut missing = Vec::with_capacity(total);
        for template in group.templates {
            if !Self::exists(store, group.policy, &template)? {
                missing.push(template);
            }
        }
        if missing.len() < total {
            debug!(
                strategy = group.strategy,
                present = total - missing.len(),
                missing = missing.len(),
                "entries already materialized"
            );
        }
        report.skipped_count += total - missing.len();

        for template in missing {
            store.insert_ledger_entry(template)?;
            report.inserted_count += 1;
        }
        Ok(())
    }

    fn exists<S: LedgerStore + ?Sized>(
        store: &S,
        policy: DedupPolicy,
        template: &LedgerEntryTemplate,
    ) -> Result<bool> {
        let key = template.dedup_key();
        match (policy, template.origin_id) {
            (DedupPolicy::SameOrigin, Some(origin_id)) => Ok(store
                .find_planned_entry(key.date, key.category_id, origin_id)?
                .is_some()),
            (DedupPolicy::KeyAndType, _) => Ok(store
                .entries_with_key(&key)?
                .iter()
                .any(|entry| entry.type_id == template.type_id)),
            _ => Ok(store
                .find_ledger_entry(key.date, &key.description, key.category_id)?
                .is_some()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlannerConfig;
    use crate::core::lookup::LookupContext;
    use crate::ledger::{EntryOrigin, EntryStatus, Ledger, LookupTables, RecurrenceKind};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config() -> PlannerConfig {
        PlannerConfig {
            default_accounts: BTreeMap::from([(2, 98)]),
            ..PlannerConfig::default()
        }
    }

    #[test]
    fn monthly_rule_materializes_once() {
        let mut ledger = Ledger::new("Household");
        let tables = LookupTables::new();
        let config = config();
        let lookups = LookupContext::new(&tables, &config);
        let registry = ExpansionRegistry::new();
        let rule = RecurrenceRule::new("Rent", RecurrenceKind::Monthly, 5, dec!(1000), 2, 12, 4)
            .starting(date(2024, 1, 1));
        let rules = vec![rule.clone()];

        let report = MaterializeService::materialize(
            &mut ledger,
            &lookups,
            &registry,
            &rules,
            date(2024, 2, 1),
            date(2024, 4, 30),
        )
        .unwrap();
        assert_eq!(report.inserted_count, 3);
        assert!(report.is_clean());
        let dates: Vec<_> = ledger.entries.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![date(2024, 2, 5), date(2024, 3, 5), date(2024, 4, 5)]);
        assert!(ledger.entries.iter().all(|e| {
            e.status == EntryStatus::Pending
                && e.origin == EntryOrigin::Planned
                && e.origin_id == Some(rule.id)
        }));

        let again = MaterializeService::materialize(
            &mut ledger,
            &lookups,
            &registry,
            &rules,
            date(2024, 2, 1),
            date(2024, 4, 30),
        )
        .unwrap();
        assert_eq!(again.inserted_count, 0);
        assert_eq!(again.skipped_count, 3);
        assert_ne!(again.run_id, report.run_id);
    }

    #[test]
    fn failing_rule_does_not_abort_the_run() {
        let mut ledger = Ledger::new("Household");
        let tables = LookupTables::new();
        let config = config();
        let lookups = LookupContext::new(&tables, &config);
        let registry = ExpansionRegistry::new();
        let orphan = RecurrenceRule::new("Peso bill", RecurrenceKind::Monthly, 1, dec!(10), 1, 12, 4)
            .starting(date(2024, 1, 1));
        let rent = RecurrenceRule::new("Rent", RecurrenceKind::Monthly, 1, dec!(10), 2, 12, 4)
            .starting(date(2024, 1, 1));

        let report = MaterializeService::materialize(
            &mut ledger,
            &lookups,
            &registry,
            &[orphan.clone(), rent],
            date(2024, 1, 1),
            date(2024, 1, 31),
        )
        .unwrap();
        assert_eq!(report.inserted_count, 1);
        assert_eq!(report.per_rule_errors.len(), 1);
        assert_eq!(report.per_rule_errors[0].rule_id, orphan.id);
        assert_eq!(report.per_rule_errors[0].kind, ErrorKind::Configuration);
        let feedback = report.feedback();
        assert!(!feedback.success);
        assert_eq!(feedback.kind, Some(ErrorKind::Configuration));
    }

    #[test]
    fn inverted_window_fails_the_call() {
        let mut ledger = Ledger::new("Household");
        let tables = LookupTables::new();
        let config = config();
        let lookups = LookupContext::new(&tables, &config);
        let err = MaterializeService::materialize(
            &mut ledger,
            &lookups,
            &ExpansionRegistry::new(),
            &[],
            date(2024, 2, 1),
            date(2024, 1, 1),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
