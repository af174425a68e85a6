pub mod balance_service;
pub mod entry_service;
pub mod expansion_service;
pub mod materialize_service;
pub mod projection_service;

pub use balance_service::{BalanceChange, BalanceService};
pub use entry_service::EntryService;
pub use expansion_service::{
    DedupPolicy, ExpansionGroup, ExpansionRegistry, ExpansionStrategy, IdentityExpansion,
    ProfitSplitExpansion, TransferExpansion,
};
pub use materialize_service::{MaterializationReport, MaterializeService, RuleFailure};
pub use projection_service::{BucketComparison, Projection, ProjectionService};
