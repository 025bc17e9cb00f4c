//! Child support under the Duesseldorfer Tabelle.
//!
//! The pipeline runs in fixed stages: statutory deductions reduce gross income to net
//! income, the job expense allowance yields the adjusted net income used for the
//! shortfall test, and the payable amounts come either from proportional scaling of
//! the minimum entitlements or from the table bracket, stepped down while the total
//! would cut into the obligor's protected minimum.

pub mod bracket;
mod calculator;
pub mod domain;
pub mod income;
pub mod payout;
pub mod report;
pub mod shortfall;
pub mod table;

#[cfg(test)]
mod tests;

pub use calculator::{
    compute, CalculationError, ChildSupport, SupportCalculation, SupportCalculator,
    SupportOutcome,
};
pub use domain::{Child, ComputationContext, Deduction, Deductions, InputError, Obligor};
pub use payout::BracketDescent;
pub use report::SupportReportSummary;
pub use shortfall::ProtectedMinimum;
pub use table::{AgeBand, Bracket, SupportTable, TableConstants, TableError};
