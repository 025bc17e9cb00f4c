use super::calculator::CalculationError;
use super::table::{AgeBand, SupportTable, LOWEST_BRACKET};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{error, warn};

/// What a child can claim from the table, independent of the bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim {
    pub age_band: AgeBand,
    pub entitlement_factor: Decimal,
}

/// One step down the table taken to preserve the protected minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BracketDescent {
    pub from: u8,
    pub to: u8,
    pub required: Decimal,
    pub distributable: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketPayout {
    pub initial_bracket: u8,
    pub bracket: u8,
    pub amounts: Vec<Decimal>,
    pub descents: Vec<BracketDescent>,
}

enum DescentState {
    Evaluating(u8),
    Resolved { bracket: u8, amounts: Vec<Decimal> },
    Failed { bracket: u8, required: Decimal },
}

/// Scales every minimum by the coverage factor.
pub fn proportional_payout(minimums: &[Decimal], coverage_factor: Decimal) -> Vec<Decimal> {
    minimums
        .iter()
        .map(|minimum| (minimum * coverage_factor).round_dp(2))
        .collect()
}

/// Walks down from `start_bracket` until the table amounts fit the distributable mass.
///
/// The fit is checked on the unrounded scaled amounts; only the returned payables are
/// rounded to cents.
pub fn resolve_bracket_payout(
    table: &SupportTable,
    start_bracket: i32,
    claims: &[Claim],
    distributable_mass: Decimal,
) -> Result<BracketPayout, CalculationError> {
    let initial_bracket = clamp_start(table, start_bracket);
    let mut descents = Vec::new();
    let mut state = DescentState::Evaluating(initial_bracket);

    loop {
        state = match state {
            DescentState::Evaluating(bracket) => {
                let amounts = bracket_amounts(table, bracket, claims)?;
                let required: Decimal = amounts.iter().sum();

                if required <= distributable_mass {
                    DescentState::Resolved { bracket, amounts }
                } else if bracket > LOWEST_BRACKET {
                    warn!(
                        bracket,
                        %required,
                        distributable = %distributable_mass,
                        "support total breaches protected minimum; descending one bracket"
                    );
                    descents.push(BracketDescent {
                        from: bracket,
                        to: bracket - 1,
                        required,
                        distributable: distributable_mass,
                    });
                    DescentState::Evaluating(bracket - 1)
                } else {
                    DescentState::Failed { bracket, required }
                }
            }
            DescentState::Resolved { bracket, amounts } => {
                return Ok(BracketPayout {
                    initial_bracket,
                    bracket,
                    amounts: amounts.iter().map(|amount| amount.round_dp(2)).collect(),
                    descents,
                });
            }
            DescentState::Failed { bracket, required } => {
                error!(
                    bracket,
                    %required,
                    distributable = %distributable_mass,
                    "lowest bracket still breaches protected minimum; hidden shortfall"
                );
                return Err(CalculationError::HiddenShortfall {
                    bracket,
                    required,
                    distributable: distributable_mass,
                });
            }
        };
    }
}

fn clamp_start(table: &SupportTable, start_bracket: i32) -> u8 {
    let highest = i32::from(table.highest_bracket());
    let lowest = i32::from(table.lowest_bracket());
    if start_bracket < lowest {
        warn!(
            start_bracket,
            "household size shifts below the lowest bracket; starting at bracket 1"
        );
    }
    start_bracket.clamp(lowest, highest) as u8
}

fn bracket_amounts(
    table: &SupportTable,
    bracket: u8,
    claims: &[Claim],
) -> Result<Vec<Decimal>, CalculationError> {
    claims
        .iter()
        .map(|claim| {
            table
                .minimum_amount(bracket, claim.age_band)
                .map(|amount| amount * claim.entitlement_factor)
                .ok_or(CalculationError::BracketOutOfRange(bracket))
        })
        .collect()
}
