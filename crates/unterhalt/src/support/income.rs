use super::domain::{Deduction, Deductions, Obligor};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Share of net income recognised as job-related expenses.
pub const JOB_EXPENSE_RATE: Decimal = dec!(0.05);
/// Upper bound of the job-related expense allowance.
pub const JOB_EXPENSE_CAP: Decimal = dec!(150);

pub const PENSION_ALLOWANCE_LABEL: &str = "Pension allowance";

/// Whether personal deductions apply when adjusting net income.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentMode {
    /// Pre-check for a shortfall: only the job expense allowance is removed.
    ShortfallCheck,
    /// Personal deductions and the pension allowance are removed as well.
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustedIncome {
    pub amount: Decimal,
    pub applied_deductions: Vec<Deduction>,
}

pub fn compute_net(gross_income: Decimal, statutory_deductions: &Deductions) -> Decimal {
    gross_income - statutory_deductions.total()
}

pub fn compute_job_expense_allowance(net_income: Decimal) -> Decimal {
    (JOB_EXPENSE_RATE * net_income).round_dp(2).min(JOB_EXPENSE_CAP)
}

pub fn compute_adjusted_net(
    obligor: &Obligor,
    net_income: Decimal,
    job_expense_allowance: Decimal,
    mode: AdjustmentMode,
) -> AdjustedIncome {
    let base = net_income - job_expense_allowance;
    match mode {
        AdjustmentMode::ShortfallCheck => AdjustedIncome {
            amount: base,
            applied_deductions: Vec::new(),
        },
        AdjustmentMode::Full => {
            let mut applied_deductions: Vec<Deduction> =
                obligor.personal_deductions.iter().cloned().collect();
            applied_deductions.push(Deduction::new(
                PENSION_ALLOWANCE_LABEL,
                obligor.pension_allowance_rate * obligor.gross_income,
            ));
            let total: Decimal = applied_deductions.iter().map(|entry| entry.amount).sum();
            AdjustedIncome {
                amount: base - total,
                applied_deductions,
            }
        }
    }
}
