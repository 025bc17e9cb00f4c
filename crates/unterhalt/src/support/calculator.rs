use super::bracket::{resolve_bracket, step_modifier};
use super::domain::{ComputationContext, Deduction, InputError, Obligor};
use super::income::{
    compute_adjusted_net, compute_job_expense_allowance, compute_net, AdjustmentMode,
};
use super::payout::{proportional_payout, resolve_bracket_payout, BracketDescent, Claim};
use super::shortfall::{assess, child_minimums, ProtectedMinimum};
use super::table::{AgeBand, SupportTable};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Failure of a single calculation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalculationError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),
    #[error(
        "hidden shortfall: support of {required} at bracket {bracket} exceeds distributable mass {distributable}"
    )]
    HiddenShortfall {
        bracket: u8,
        required: Decimal,
        distributable: Decimal,
    },
    #[error("bracket {0} is not part of the support table")]
    BracketOutOfRange(u8),
}

/// How the payable amounts were determined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SupportOutcome {
    /// No children, or every entitlement factor is zero.
    NoClaims,
    Shortfall {
        coverage_factor: Decimal,
    },
    Bracket {
        initial_bracket: u8,
        bracket: u8,
        step_modifier: u32,
        descents: Vec<BracketDescent>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildSupport {
    pub birth_date: NaiveDate,
    pub age_years: f64,
    pub age_band: AgeBand,
    pub minimum: Decimal,
    pub payable: Decimal,
}

/// Immutable result of one calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupportCalculation {
    pub table_year: u16,
    pub as_of: NaiveDate,
    pub gross_income: Decimal,
    pub statutory_deductions: Vec<Deduction>,
    pub net_income: Decimal,
    pub job_expense_allowance: Decimal,
    pub adjusted_net_deductions: Vec<Deduction>,
    pub adjusted_net_income: Decimal,
    pub protected_minimum: ProtectedMinimum,
    pub distributable_mass: Decimal,
    pub outcome: SupportOutcome,
    pub children: Vec<ChildSupport>,
    pub summation_cutoff: usize,
    pub total_minimum: Decimal,
    pub total_payable: Decimal,
}

impl SupportCalculation {
    pub fn is_shortfall(&self) -> bool {
        matches!(self.outcome, SupportOutcome::Shortfall { .. })
    }

    pub fn coverage_factor(&self) -> Option<Decimal> {
        match self.outcome {
            SupportOutcome::Shortfall { coverage_factor } => Some(coverage_factor),
            _ => None,
        }
    }

    pub fn bracket(&self) -> Option<u8> {
        match self.outcome {
            SupportOutcome::Bracket { bracket, .. } => Some(bracket),
            _ => None,
        }
    }

    pub fn partial_minimum_total(&self) -> Decimal {
        self.children
            .iter()
            .take(self.summation_cutoff)
            .map(|child| child.minimum)
            .sum()
    }

    pub fn partial_payable_total(&self) -> Decimal {
        self.children
            .iter()
            .take(self.summation_cutoff)
            .map(|child| child.payable)
            .sum()
    }
}

/// Runs the full pipeline: income reduction, shortfall test, payout resolution.
pub fn compute(
    obligor: &Obligor,
    context: &ComputationContext,
    table: &SupportTable,
) -> Result<SupportCalculation, CalculationError> {
    obligor.validate()?;
    context.validate()?;

    let net_income = compute_net(obligor.gross_income, &obligor.statutory_deductions);
    let job_expense_allowance = compute_job_expense_allowance(net_income);
    let precheck = compute_adjusted_net(
        obligor,
        net_income,
        job_expense_allowance,
        AdjustmentMode::ShortfallCheck,
    );
    let protected_minimum = ProtectedMinimum::for_obligor(obligor, table.constants());

    let minimums = child_minimums(table, context)?;
    let minimum_amounts: Vec<Decimal> = minimums.iter().map(|entry| entry.amount).collect();
    let total_minimum: Decimal = minimum_amounts.iter().sum();
    let assessment = assess(precheck.amount, &protected_minimum, total_minimum);

    debug!(
        %net_income,
        %job_expense_allowance,
        adjusted_net_income = %precheck.amount,
        distributable_mass = %assessment.distributable_mass,
        %total_minimum,
        is_shortfall = assessment.is_shortfall,
        "shortfall assessment complete"
    );

    let (outcome, adjusted, payable) = match assessment.coverage_factor {
        Some(coverage_factor) if assessment.is_shortfall => (
            SupportOutcome::Shortfall { coverage_factor },
            precheck,
            proportional_payout(&minimum_amounts, coverage_factor),
        ),
        Some(_) => {
            let full = compute_adjusted_net(
                obligor,
                net_income,
                job_expense_allowance,
                AdjustmentMode::Full,
            );
            let child_count = context.children.len();
            let start = resolve_bracket(table, full.amount, child_count);
            let claims: Vec<Claim> = minimums
                .iter()
                .zip(&context.children)
                .map(|(minimum, child)| Claim {
                    age_band: minimum.age_band,
                    entitlement_factor: child.minimum_entitlement_factor,
                })
                .collect();
            let payout =
                resolve_bracket_payout(table, start, &claims, assessment.distributable_mass)?;
            debug!(
                adjusted_net_income = %full.amount,
                initial_bracket = payout.initial_bracket,
                bracket = payout.bracket,
                "bracket payout resolved"
            );
            (
                SupportOutcome::Bracket {
                    initial_bracket: payout.initial_bracket,
                    bracket: payout.bracket,
                    step_modifier: step_modifier(child_count),
                    descents: payout.descents,
                },
                full,
                payout.amounts,
            )
        }
        None => {
            let full = compute_adjusted_net(
                obligor,
                net_income,
                job_expense_allowance,
                AdjustmentMode::Full,
            );
            let payable = vec![Decimal::ZERO; minimums.len()];
            (SupportOutcome::NoClaims, full, payable)
        }
    };

    let children: Vec<ChildSupport> = context
        .children
        .iter()
        .zip(minimums)
        .zip(payable)
        .map(|((child, minimum), payable)| ChildSupport {
            birth_date: child.birth_date,
            age_years: minimum.age_years,
            age_band: minimum.age_band,
            minimum: minimum.amount,
            payable,
        })
        .collect();
    let total_payable = children.iter().map(|child| child.payable).sum();

    Ok(SupportCalculation {
        table_year: table.year(),
        as_of: context.as_of,
        gross_income: obligor.gross_income,
        statutory_deductions: obligor.statutory_deductions.iter().cloned().collect(),
        net_income,
        job_expense_allowance,
        adjusted_net_deductions: adjusted.applied_deductions,
        adjusted_net_income: adjusted.amount,
        protected_minimum,
        distributable_mass: assessment.distributable_mass,
        outcome,
        children,
        summation_cutoff: context.cutoff(),
        total_minimum,
        total_payable,
    })
}

/// Shares one loaded table across calculations.
#[derive(Debug, Clone)]
pub struct SupportCalculator {
    table: Arc<SupportTable>,
}

impl SupportCalculator {
    pub fn new(table: Arc<SupportTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &SupportTable {
        &self.table
    }

    pub fn calculate(
        &self,
        obligor: &Obligor,
        context: &ComputationContext,
    ) -> Result<SupportCalculation, CalculationError> {
        compute(obligor, context, &self.table)
    }
}
