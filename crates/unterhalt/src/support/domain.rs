use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default share of gross income recognised as private pension provision.
pub const DEFAULT_PENSION_ALLOWANCE_RATE: Decimal = dec!(0.04);

/// Labelled amount subtracted from an income figure. Negative amounts are additions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deduction {
    pub label: String,
    pub amount: Decimal,
}

impl Deduction {
    pub fn new(label: impl Into<String>, amount: Decimal) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}

/// Ordered, uniquely labelled deductions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Deduction>", into = "Vec<Deduction>")]
pub struct Deductions(Vec<Deduction>);

impl Deductions {
    pub fn new(entries: Vec<Deduction>) -> Result<Self, InputError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            let label = entry.label.trim();
            if label.is_empty() {
                return Err(InputError::EmptyDeductionLabel);
            }
            if !seen.insert(label.to_string()) {
                return Err(InputError::DuplicateDeduction(label.to_string()));
            }
        }
        Ok(Self(entries))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Deduction> {
        self.0.iter()
    }

    pub fn total(&self) -> Decimal {
        self.0.iter().map(|entry| entry.amount).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl TryFrom<Vec<Deduction>> for Deductions {
    type Error = InputError;

    fn try_from(value: Vec<Deduction>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Deductions> for Vec<Deduction> {
    fn from(value: Deductions) -> Self {
        value.0
    }
}

/// The parent owing support.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obligor {
    pub gross_income: Decimal,
    #[serde(default)]
    pub statutory_deductions: Deductions,
    #[serde(default)]
    pub personal_deductions: Deductions,
    /// Actual warm rent. `None` means it matches the share built into the table.
    #[serde(default)]
    pub housing_cost: Option<Decimal>,
    #[serde(default = "default_pension_allowance_rate")]
    pub pension_allowance_rate: Decimal,
    #[serde(default)]
    pub self_retain_reduction_factor: Decimal,
}

impl Obligor {
    pub fn new(gross_income: Decimal) -> Self {
        Self {
            gross_income,
            statutory_deductions: Deductions::default(),
            personal_deductions: Deductions::default(),
            housing_cost: None,
            pension_allowance_rate: DEFAULT_PENSION_ALLOWANCE_RATE,
            self_retain_reduction_factor: Decimal::ZERO,
        }
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if self.pension_allowance_rate < Decimal::ZERO {
            return Err(InputError::NegativePensionRate(self.pension_allowance_rate));
        }
        if self.self_retain_reduction_factor < Decimal::ZERO
            || self.self_retain_reduction_factor >= Decimal::ONE
        {
            return Err(InputError::ReductionFactorOutOfRange(
                self.self_retain_reduction_factor,
            ));
        }
        if self.housing_cost.is_some_and(|cost| cost < Decimal::ZERO) {
            return Err(InputError::NegativeHousingCost);
        }
        Ok(())
    }
}

fn default_pension_allowance_rate() -> Decimal {
    DEFAULT_PENSION_ALLOWANCE_RATE
}

fn default_entitlement_factor() -> Decimal {
    Decimal::ONE
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Child {
    pub birth_date: NaiveDate,
    /// Scales the table amount for partial or adjusted claims.
    #[serde(default = "default_entitlement_factor")]
    pub minimum_entitlement_factor: Decimal,
}

impl Child {
    pub fn new(birth_date: NaiveDate) -> Self {
        Self {
            birth_date,
            minimum_entitlement_factor: Decimal::ONE,
        }
    }

    pub fn with_entitlement_factor(mut self, factor: Decimal) -> Self {
        self.minimum_entitlement_factor = factor;
        self
    }
}

/// Per-calculation inputs besides the obligor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationContext {
    pub as_of: NaiveDate,
    #[serde(default)]
    pub children: Vec<Child>,
    /// Only the first `n` children count toward the reported partial totals.
    #[serde(default)]
    pub summation_cutoff: Option<usize>,
}

impl ComputationContext {
    pub fn new(as_of: NaiveDate, children: Vec<Child>) -> Self {
        Self {
            as_of,
            children,
            summation_cutoff: None,
        }
    }

    pub fn with_summation_cutoff(mut self, cutoff: usize) -> Self {
        self.summation_cutoff = Some(cutoff);
        self
    }

    pub fn cutoff(&self) -> usize {
        self.summation_cutoff.unwrap_or(self.children.len())
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if let Some(cutoff) = self.summation_cutoff {
            if cutoff > self.children.len() {
                return Err(InputError::SummationCutoffOutOfRange {
                    cutoff,
                    children: self.children.len(),
                });
            }
        }

        for (index, child) in self.children.iter().enumerate() {
            if child.birth_date > self.as_of {
                return Err(InputError::BornAfterReferenceDate {
                    index,
                    birth_date: child.birth_date,
                    as_of: self.as_of,
                });
            }
            if child.minimum_entitlement_factor < Decimal::ZERO {
                return Err(InputError::NegativeEntitlementFactor { index });
            }
        }

        Ok(())
    }
}

/// Rejected calculation inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("deduction labels must not be empty")]
    EmptyDeductionLabel,
    #[error("deduction '{0}' is listed more than once")]
    DuplicateDeduction(String),
    #[error("pension allowance rate {0} must not be negative")]
    NegativePensionRate(Decimal),
    #[error("self-retain reduction factor {0} must lie in [0, 1)")]
    ReductionFactorOutOfRange(Decimal),
    #[error("housing cost must not be negative")]
    NegativeHousingCost,
    #[error("child #{index} born {birth_date} after the reference date {as_of}")]
    BornAfterReferenceDate {
        index: usize,
        birth_date: NaiveDate,
        as_of: NaiveDate,
    },
    #[error("child #{index} has a negative entitlement factor")]
    NegativeEntitlementFactor { index: usize },
    #[error("summation cutoff {cutoff} exceeds the number of children ({children})")]
    SummationCutoffOutOfRange { cutoff: usize, children: usize },
}
