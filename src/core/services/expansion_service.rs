//! Category expansion: turns one occurrence into the ledger entry templates it stands for.
//!
//! Ordinary categories map one-to-one. Special category codes are registered
//! with a strategy that produces several sibling templates (profit-split
//! payroll, inter-account transfers).

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::{PlannerConfig, ProfitSplitConfig, TransferConfig};
use crate::core::lookup::LookupProvider;
use crate::errors::{PlannerError, Result};
use crate::ledger::money::share_of;
use crate::ledger::{
    AccountId, CategoryId, EntryOrigin, EntryStatus, LedgerEntryTemplate, Occurrence, TypeId,
};

/// Marker appended to descriptions of generated profit-split entries.
pub const PROFIT_SPLIT_MARKER: &str = ";;pj_auto";

const COMPANY_RESERVE_SHARE: Decimal = dec!(0.15);
const PERSONAL_PAYOUT_SHARE: Decimal = dec!(0.765);
const EMERGENCY_RESERVE_SHARE: Decimal = dec!(0.085);

/// How the materializer decides whether a group of templates already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupPolicy {
    /// One template, found by its `(date, description, category)` key.
    SingleKey,
    /// Templates share a key and differ by type; each half is checked on its own.
    KeyAndType,
    /// Siblings are found by date, category and originating rule, so an edited
    /// amount does not write a second set.
    SameOrigin,
}

/// Templates produced for one occurrence plus the policy used to deduplicate them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionGroup {
    pub strategy: &'static str,
    pub policy: DedupPolicy,
    pub templates: Vec<LedgerEntryTemplate>,
}

pub trait ExpansionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn dedup_policy(&self) -> DedupPolicy;

    fn expand(
        &self,
        occurrence: &Occurrence,
        lookups: &dyn LookupProvider,
    ) -> Result<Vec<LedgerEntryTemplate>>;
}

/// Pending template linked back to the rule that produced `occurrence`.
fn planned_template(
    occurrence: &Occurrence,
    description: String,
    amount: Decimal,
    account_id: AccountId,
    type_id: TypeId,
    category_id: CategoryId,
) -> LedgerEntryTemplate {
    LedgerEntryTemplate {
        date: occurrence.date,
        description,
        amount,
        account_id,
        type_id,
        category_id,
        status: EntryStatus::Pending,
        origin: EntryOrigin::Planned,
        origin_id: Some(occurrence.rule_id),
        person_id: occurrence.person_id,
    }
}

/// Account for an ordinary occurrence: the rule's own account, then the
/// currency default, then the fallback currency's default.
pub fn resolve_account(occurrence: &Occurrence, lookups: &dyn LookupProvider) -> Result<AccountId> {
    if let Some(account) = occurrence.account_id {
        return Ok(account);
    }
    lookups
        .default_account_for_currency(occurrence.currency_id)
        .or_else(|| {
            lookups
                .fallback_currency()
                .and_then(|currency| lookups.default_account_for_currency(currency))
        })
        .ok_or_else(|| {
            PlannerError::Configuration(format!(
                "no default account registered for currency {}",
                occurrence.currency_id
            ))
        })
}

/// One pending template carrying the occurrence unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityExpansion;

impl ExpansionStrategy for IdentityExpansion {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn dedup_policy(&self) -> DedupPolicy {
        DedupPolicy::SingleKey
    }

    fn expand(
        &self,
        occurrence: &Occurrence,
        lookups: &dyn LookupProvider,
    ) -> Result<Vec<LedgerEntryTemplate>> {
        let account = resolve_account(occurrence, lookups)?;
        Ok(vec![planned_template(
            occurrence,
            occurrence.description.clone(),
            occurrence.amount,
            account,
            occurrence.type_id,
            occurrence.category_id,
        )])
    }
}

/// Splits a contractor payment into company reserve, personal payout and
/// emergency reserve entries on the same account.
#[derive(Debug, Clone)]
pub struct ProfitSplitExpansion {
    config: ProfitSplitConfig,
}

impl ProfitSplitExpansion {
    pub fn new(config: ProfitSplitConfig) -> Self {
        Self { config }
    }

    /// Rounded `(company, payout, reserve)` shares of `total`.
    pub fn shares(total: Decimal) -> (Decimal, Decimal, Decimal) {
        (
            share_of(total, COMPANY_RESERVE_SHARE),
            share_of(total, PERSONAL_PAYOUT_SHARE),
            share_of(total, EMERGENCY_RESERVE_SHARE),
        )
    }
}

impl ExpansionStrategy for ProfitSplitExpansion {
    fn name(&self) -> &'static str {
        "profit-split"
    }

    fn dedup_policy(&self) -> DedupPolicy {
        DedupPolicy::SameOrigin
    }

    fn expand(
        &self,
        occurrence: &Occurrence,
        lookups: &dyn LookupProvider,
    ) -> Result<Vec<LedgerEntryTemplate>> {
        let account = resolve_account(occurrence, lookups)?;
        let total = occurrence.amount;
        let (company, payout, reserve) = Self::shares(total);
        Ok(vec![
            planned_template(
                occurrence,
                format!("Company reserve: 15% of {total:.2} {PROFIT_SPLIT_MARKER}"),
                company,
                account,
                occurrence.type_id,
                self.config.company_reserve_category,
            ),
            planned_template(
                occurrence,
                format!("Salary payout: {payout:.2} of {total:.2} {PROFIT_SPLIT_MARKER}"),
                payout,
                account,
                occurrence.type_id,
                self.config.personal_payout_category,
            ),
            planned_template(
                occurrence,
                format!(
                    "Emergency reserve: 8.5% of {total:.2} = {reserve:.2} {PROFIT_SPLIT_MARKER}"
                ),
                reserve,
                account,
                self.config.reserve_type,
                self.config.emergency_reserve_category,
            ),
        ])
    }
}

/// Debit and credit pair against the currency's default account.
#[derive(Debug, Clone)]
pub struct TransferExpansion {
    config: TransferConfig,
}

impl TransferExpansion {
    pub fn new(config: TransferConfig) -> Self {
        Self { config }
    }
}

impl ExpansionStrategy for TransferExpansion {
    fn name(&self) -> &'static str {
        "transfer"
    }

    fn dedup_policy(&self) -> DedupPolicy {
        DedupPolicy::KeyAndType
    }

    fn expand(
        &self,
        occurrence: &Occurrence,
        lookups: &dyn LookupProvider,
    ) -> Result<Vec<LedgerEntryTemplate>> {
        let account = lookups
            .default_account_for_currency(occurrence.currency_id)
            .ok_or_else(|| {
                PlannerError::Configuration(format!(
                    "transfer needs a default account for currency {}",
                    occurrence.currency_id
                ))
            })?;
        let category = self.config.trigger_category;
        Ok(vec![
            planned_template(
                occurrence,
                occurrence.description.clone(),
                occurrence.amount,
                account,
                self.config.debit_type,
                category,
            ),
            planned_template(
                occurrence,
                occurrence.description.clone(),
                occurrence.amount,
                account,
                self.config.credit_type,
                category,
            ),
        ])
    }
}

/// Maps special category codes to their expansion strategy; everything else is identity.
pub struct ExpansionRegistry {
    strategies: HashMap<CategoryId, Box<dyn ExpansionStrategy>>,
    fallback: IdentityExpansion,
}

impl Default for ExpansionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpansionRegistry {
    pub fn new() -> Self {
        Self {
            strategies: HashMap::new(),
            fallback: IdentityExpansion,
        }
    }

    /// Registry with the split and transfer strategies the config enables.
    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        config.validate()?;
        let mut registry = Self::new();
        if let Some(split) = &config.profit_split {
            registry.register(
                split.trigger_category,
                Box::new(ProfitSplitExpansion::new(split.clone())),
            )?;
        }
        if let Some(transfer) = &config.transfer {
            registry.register(
                transfer.trigger_category,
                Box::new(TransferExpansion::new(transfer.clone())),
            )?;
        }
        Ok(registry)
    }

    pub fn register(
        &mut self,
        category_id: CategoryId,
        strategy: Box<dyn ExpansionStrategy>,
    ) -> Result<()> {
        if self.strategies.contains_key(&category_id) {
            return Err(PlannerError::Configuration(format!(
                "category {category_id} already has an expansion strategy"
            )));
        }
        self.strategies.insert(category_id, strategy);
        Ok(())
    }

    pub fn resolve(&self, category_id: CategoryId) -> &dyn ExpansionStrategy {
        self.strategies
            .get(&category_id)
            .map(|strategy| strategy.as_ref())
            .unwrap_or(&self.fallback as &dyn ExpansionStrategy)
    }

    pub fn expand(
        &self,
        occurrence: &Occurrence,
        lookups: &dyn LookupProvider,
    ) -> Result<ExpansionGroup> {
        let strategy = self.resolve(occurrence.category_id);
        Ok(ExpansionGroup {
            strategy: strategy.name(),
            policy: strategy.dedup_policy(),
            templates: strategy.expand(occurrence, lookups)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lookup::LookupContext;
    use crate::ledger::{LookupTables, RecurrenceKind, RecurrenceRule};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn config() -> PlannerConfig {
        PlannerConfig {
            default_accounts: BTreeMap::from([(1, 97), (2, 98), (3, 99)]),
            fallback_currency: Some(2),
            profit_split: Some(ProfitSplitConfig {
                trigger_category: 18,
                company_reserve_category: 25,
                personal_payout_category: 24,
                emergency_reserve_category: 23,
                reserve_type: 15,
            }),
            transfer: Some(TransferConfig {
                trigger_category: 28,
                debit_type: 16,
                credit_type: 17,
            }),
            ledger_file: None,
        }
    }

    fn occurrence(category: CategoryId, currency: u32, amount: Decimal) -> Occurrence {
        let rule = RecurrenceRule::new(
            "Invoice",
            RecurrenceKind::Monthly,
            5,
            amount,
            currency,
            category,
            3,
        )
        .starting(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        Occurrence {
            rule_id: rule.id,
            date: NaiveDate::from_ymd_opt(2024, 2, 5).unwrap(),
            amount,
            currency_id: currency,
            category_id: category,
            type_id: 3,
            description: rule.description.clone(),
            account_id: None,
            person_id: None,
        }
    }

    #[test]
    fn ordinary_category_expands_to_identity() {
        let tables = LookupTables::new();
        let config = config();
        let lookups = LookupContext::new(&tables, &config);
        let registry = ExpansionRegistry::from_config(&config).unwrap();

        let group = registry.expand(&occurrence(12, 3, dec!(1000)), &lookups).unwrap();
        assert_eq!(group.policy, DedupPolicy::SingleKey);
        assert_eq!(group.templates.len(), 1);
        let template = &group.templates[0];
        assert_eq!(template.account_id, 99);
        assert_eq!(template.status, EntryStatus::Pending);
        assert_eq!(template.origin, EntryOrigin::Planned);
        assert_eq!(template.amount, dec!(1000));
    }

    #[test]
    fn explicit_account_and_fallback_currency() {
        let tables = LookupTables::new();
        let config = config();
        let lookups = LookupContext::new(&tables, &config);

        let mut explicit = occurrence(12, 3, dec!(10));
        explicit.account_id = Some(5);
        assert_eq!(resolve_account(&explicit, &lookups).unwrap(), 5);

        let unknown_currency = occurrence(12, 9, dec!(10));
        assert_eq!(resolve_account(&unknown_currency, &lookups).unwrap(), 98);

        let no_fallback = PlannerConfig {
            fallback_currency: None,
            ..config.clone()
        };
        let lookups = LookupContext::new(&tables, &no_fallback);
        let err = resolve_account(&unknown_currency, &lookups).unwrap_err();
        assert!(matches!(err, PlannerError::Configuration(_)));
    }

    #[test]
    fn profit_split_produces_three_rounded_siblings() {
        let tables = LookupTables::new();
        let config = config();
        let lookups = LookupContext::new(&tables, &config);
        let registry = ExpansionRegistry::from_config(&config).unwrap();

        let group = registry.expand(&occurrence(18, 2, dec!(100.00)), &lookups).unwrap();
        assert_eq!(group.policy, DedupPolicy::SameOrigin);
        let amounts: Vec<_> = group.templates.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![dec!(15.00), dec!(76.50), dec!(8.50)]);
        let categories: Vec<_> = group.templates.iter().map(|t| t.category_id).collect();
        assert_eq!(categories, vec![25, 24, 23]);
        assert_eq!(group.templates[2].type_id, 15);
        assert_eq!(group.templates[0].type_id, 3);
        assert!(group
            .templates
            .iter()
            .all(|t| t.account_id == 98 && t.description.ends_with(PROFIT_SPLIT_MARKER)));
        assert_eq!(
            group.templates[1].description,
            "Salary payout: 76.50 of 100.00 ;;pj_auto"
        );
    }

    #[test]
    fn split_shares_stay_within_a_cent() {
        for total in [dec!(100.00), dec!(333.33), dec!(0.07), dec!(1234.57)] {
            let (a, b, c) = ProfitSplitExpansion::shares(total);
            assert!((a + b + c - total).abs() <= dec!(0.01), "total {total}");
        }
    }

    #[test]
    fn transfer_needs_currency_default_account() {
        let tables = LookupTables::new();
        let config = config();
        let lookups = LookupContext::new(&tables, &config);
        let registry = ExpansionRegistry::from_config(&config).unwrap();

        let group = registry.expand(&occurrence(28, 1, dec!(50)), &lookups).unwrap();
        assert_eq!(group.policy, DedupPolicy::KeyAndType);
        assert_eq!(group.templates.len(), 2);
        assert_eq!(group.templates[0].type_id, 16);
        assert_eq!(group.templates[1].type_id, 17);
        assert_eq!(group.templates[0].dedup_key(), group.templates[1].dedup_key());
        assert!(group.templates.iter().all(|t| t.account_id == 97));

        let err = registry
            .expand(&occurrence(28, 9, dec!(50)), &lookups)
            .unwrap_err();
        assert!(matches!(err, PlannerError::Configuration(_)));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = ExpansionRegistry::new();
        registry.register(40, Box::new(IdentityExpansion)).unwrap();
        assert!(registry.register(40, Box::new(IdentityExpansion)).is_err());
        assert_eq!(registry.resolve(41).name(), "identity");
    }
}
