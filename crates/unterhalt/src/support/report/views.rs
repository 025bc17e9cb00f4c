use super::super::table::AgeBand;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountDirection {
    Less,
    Plus,
}

impl AmountDirection {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Less => "less",
            Self::Plus => "plus",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncomeLine {
    pub label: String,
    pub direction: AmountDirection,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtectedMinimumView {
    pub statutory_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub housing_cost: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub housing_share: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduction_factor: Option<Decimal>,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildLine {
    pub birth_date: NaiveDate,
    pub age_band: AgeBand,
    pub age_band_label: &'static str,
    pub minimum: Decimal,
    pub payable: Decimal,
}

/// Presentation-ready view of a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupportReportSummary {
    pub table_year: u16,
    pub as_of: NaiveDate,
    pub gross_income: Decimal,
    pub statutory_lines: Vec<IncomeLine>,
    pub net_income: Decimal,
    pub job_expense_allowance: Decimal,
    pub adjusted_net_lines: Vec<IncomeLine>,
    pub adjusted_net_income: Decimal,
    pub outcome_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bracket: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage_factor: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protected_minimum: Option<ProtectedMinimumView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distributable_mass: Option<Decimal>,
    pub minimum_column_label: &'static str,
    pub children: Vec<ChildLine>,
    pub partial_minimum_total: Decimal,
    pub partial_payable_total: Decimal,
    pub net_after_partial_support: Decimal,
    pub adjusted_net_after_partial_support: Decimal,
    pub adjusted_net_after_total_support: Decimal,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<String>,
}
