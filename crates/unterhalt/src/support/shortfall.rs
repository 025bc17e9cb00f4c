use super::calculator::CalculationError;
use super::domain::{ComputationContext, Obligor};
use super::table::{age_in_years, AgeBand, SupportTable, TableConstants, LOWEST_BRACKET};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

/// Breakdown of the income the obligor keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProtectedMinimum {
    pub statutory_amount: Decimal,
    pub housing_cost: Decimal,
    pub housing_share: Decimal,
    pub reduction_factor: Decimal,
    pub amount: Decimal,
}

impl ProtectedMinimum {
    pub fn for_obligor(obligor: &Obligor, constants: TableConstants) -> Self {
        let housing_share = constants.protected_minimum_housing_share;
        let housing_cost = obligor.housing_cost.unwrap_or(housing_share);
        let housing_surplus = (housing_cost - housing_share).max(Decimal::ZERO);
        let amount = (constants.protected_minimum_income + housing_surplus)
            * (Decimal::ONE - obligor.self_retain_reduction_factor);

        Self {
            statutory_amount: constants.protected_minimum_income,
            housing_cost,
            housing_share,
            reduction_factor: obligor.self_retain_reduction_factor,
            amount,
        }
    }

    pub fn housing_differs(&self) -> bool {
        self.housing_cost != self.housing_share
    }
}

/// A child's entitlement at the lowest bracket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildMinimum {
    pub age_years: f64,
    pub age_band: AgeBand,
    pub amount: Decimal,
}

pub fn child_minimums(
    table: &SupportTable,
    context: &ComputationContext,
) -> Result<Vec<ChildMinimum>, CalculationError> {
    context
        .children
        .iter()
        .map(|child| {
            let age_years = age_in_years(child.birth_date, context.as_of);
            let age_band = table.age_band_for(age_years);
            let base = table
                .minimum_amount(LOWEST_BRACKET, age_band)
                .ok_or(CalculationError::BracketOutOfRange(LOWEST_BRACKET))?;
            Ok(ChildMinimum {
                age_years,
                age_band,
                amount: base * child.minimum_entitlement_factor,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortfallAssessment {
    pub distributable_mass: Decimal,
    pub minimum_total: Decimal,
    /// `None` when there is nothing to cover.
    pub coverage_factor: Option<Decimal>,
    pub is_shortfall: bool,
}

/// Distributable mass and coverage factor for the shortfall test.
///
/// The factor is clamped to `[0, 1]`: a negative distributable mass yields 0, so every
/// payable is 0 rather than tracking the (negative) mass.
pub fn assess(
    adjusted_net_income: Decimal,
    protected_minimum: &ProtectedMinimum,
    minimum_total: Decimal,
) -> ShortfallAssessment {
    let distributable_mass = adjusted_net_income - protected_minimum.amount;

    if minimum_total.is_zero() {
        return ShortfallAssessment {
            distributable_mass,
            minimum_total,
            coverage_factor: None,
            is_shortfall: false,
        };
    }

    if distributable_mass < Decimal::ZERO {
        warn!(
            %distributable_mass,
            protected_minimum = %protected_minimum.amount,
            "adjusted net income below protected minimum; coverage clamped to zero"
        );
    }

    let coverage_factor = (distributable_mass / minimum_total)
        .min(Decimal::ONE)
        .max(Decimal::ZERO);

    ShortfallAssessment {
        distributable_mass,
        minimum_total,
        coverage_factor: Some(coverage_factor),
        is_shortfall: coverage_factor < Decimal::ONE,
    }
}
