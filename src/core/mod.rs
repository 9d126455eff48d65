pub mod balance;
pub mod bracket;
pub mod error;
pub mod expense;
pub mod money;
pub mod obligation;
pub mod period;
pub mod revenue;
pub mod settings;
pub mod summary;

// Flat public surface for engine types and functions.
pub use balance::{project_available_funds, summarize_account, AccountBalance, AccountSummary};
pub use bracket::{
    allocate, validate_partition, Allocation, BracketAllocation, BracketScope, BracketTable,
    TaxBracket,
};
pub use error::{EngineError, ErrorKind};
pub use expense::{aggregate_expenses, ExpenseRecord, ExpenseTotals, Frequency, RecurrenceRule};
pub use money::{Money, Percentage};
pub use obligation::{
    totals, totals_for, totals_for_period, ObligationKind, ObligationRecord, ObligationStatus,
    ObligationTotals,
};
pub use period::DateRange;
pub use revenue::{aggregate, AccrualTotals, CashTotals, RevenueRecord, RevenueTotals};
pub use settings::Settings;
pub use summary::{
    compose_dashboard_summary, compose_income_tax_summary, compose_period_summary,
    compose_yearly_overview, DashboardSummary, IncomeTaxSummary, PeriodSummary,
};
