use crate::support::domain::{Child, ComputationContext, Deduction, Deductions, Obligor};
use crate::support::table::SupportTable;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub(crate) fn table() -> SupportTable {
    SupportTable::duesseldorf_2023().expect("embedded table is valid")
}

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(crate) fn as_of() -> NaiveDate {
    date(2023, 7, 28)
}

pub(crate) fn deductions(entries: &[(&str, Decimal)]) -> Deductions {
    Deductions::new(
        entries
            .iter()
            .map(|(label, amount)| Deduction::new(*label, *amount))
            .collect(),
    )
    .expect("valid deductions")
}

/// Privately insured obligor with two school-age children.
pub(crate) fn reference_obligor() -> Obligor {
    let mut obligor = Obligor::new(dec!(3000));
    obligor.statutory_deductions = deductions(&[
        ("PrivKVPV", dec!(300)),
        ("PKVKind", dec!(20)),
        ("Einkommensteuer", dec!(400)),
        ("Kirchensteuer", dec!(40)),
    ]);
    obligor.personal_deductions = deductions(&[("RisikoLebensVersicherung", dec!(10))]);
    obligor.housing_cost = Some(dec!(520));
    obligor
}

pub(crate) fn reference_context() -> ComputationContext {
    ComputationContext::new(
        as_of(),
        vec![
            Child::new(date(2011, 11, 11)),
            Child::new(date(2012, 12, 12)),
        ],
    )
}
