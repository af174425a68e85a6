#![allow(dead_code)]

use std::{collections::BTreeMap, path::PathBuf, sync::Mutex};

use chrono::NaiveDate;
use movement_planner::{
    config::{PlannerConfig, ProfitSplitConfig, TransferConfig},
    ledger::{Account, Category, Ledger, LookupTables, Nature, TransactionType},
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a unique directory that outlives the calling test.
pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub const ARS: u32 = 1;
pub const BRL: u32 = 2;
pub const USD: u32 = 3;

pub const HOUSING: u32 = 12;
pub const GROCERIES: u32 = 14;
pub const PJ_INCOME: u32 = 18;
pub const EMERGENCY_RESERVE: u32 = 23;
pub const SALARY_PAYOUT: u32 = 24;
pub const COMPANY_RESERVE: u32 = 25;
pub const TRANSFER: u32 = 28;

pub const INCOME: u32 = 3;
pub const EXPENSE: u32 = 4;
pub const RESERVE: u32 = 15;
pub const TRANSFER_OUT: u32 = 16;
pub const TRANSFER_IN: u32 = 17;

pub fn household_lookups() -> LookupTables {
    LookupTables::new()
        .with_account(Account::new(97, "Pesos wallet", ARS))
        .with_account(Account::new(98, "Checking", BRL))
        .with_account(Account::new(99, "Dollar account", USD))
        .with_category(Category::new(HOUSING, "Housing").with_group("Fixed"))
        .with_category(Category::new(GROCERIES, "Groceries").with_group("Living"))
        .with_category(Category::new(PJ_INCOME, "PJ income"))
        .with_category(Category::new(EMERGENCY_RESERVE, "Emergency reserve"))
        .with_category(Category::new(SALARY_PAYOUT, "Salary payout"))
        .with_category(Category::new(COMPANY_RESERVE, "Company reserve"))
        .with_category(Category::new(TRANSFER, "Transfer between accounts"))
        .with_type(TransactionType::new(INCOME, "Income", Nature::Inflow))
        .with_type(TransactionType::new(EXPENSE, "Expense", Nature::Outflow))
        .with_type(TransactionType::new(RESERVE, "Reserve", Nature::Outflow))
        .with_type(TransactionType::new(TRANSFER_OUT, "Transfer out", Nature::Outflow))
        .with_type(TransactionType::new(TRANSFER_IN, "Transfer in", Nature::Inflow))
}

pub fn household_config() -> PlannerConfig {
    PlannerConfig {
        default_accounts: BTreeMap::from([(ARS, 97), (BRL, 98), (USD, 99)]),
        fallback_currency: Some(BRL),
        profit_split: Some(ProfitSplitConfig {
            trigger_category: PJ_INCOME,
            company_reserve_category: COMPANY_RESERVE,
            personal_payout_category: SALARY_PAYOUT,
            emergency_reserve_category: EMERGENCY_RESERVE,
            reserve_type: RESERVE,
        }),
        transfer: Some(TransferConfig {
            trigger_category: TRANSFER,
            debit_type: TRANSFER_OUT,
            credit_type: TRANSFER_IN,
        }),
        ledger_file: None,
    }
}

pub fn household_ledger() -> Ledger {
    Ledger::new("Household").with_lookups(household_lookups())
}
