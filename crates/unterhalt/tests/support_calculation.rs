use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use unterhalt::support::{
    compute, Child, ComputationContext, Deduction, Deductions, Obligor, SupportCalculator,
    SupportOutcome, SupportTable,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn deductions(entries: &[(&str, Decimal)]) -> Deductions {
    Deductions::new(
        entries
            .iter()
            .map(|(label, amount)| Deduction::new(*label, *amount))
            .collect(),
    )
    .expect("valid deductions")
}

fn calculator() -> SupportCalculator {
    SupportCalculator::new(Arc::new(
        SupportTable::duesseldorf_2023().expect("embedded table"),
    ))
}

#[test]
fn privately_insured_obligor_with_two_children() {
    let mut obligor = Obligor::new(dec!(3000));
    obligor.statutory_deductions = deductions(&[
        ("PrivKVPV", dec!(300)),
        ("PKVKind", dec!(20)),
        ("Einkommensteuer", dec!(400)),
        ("Kirchensteuer", dec!(40)),
    ]);
    obligor.personal_deductions = deductions(&[("RisikoLebensVersicherung", dec!(10))]);
    obligor.housing_cost = Some(dec!(520));
    let context = ComputationContext::new(
        date(2023, 7, 28),
        vec![Child::new(date(2011, 11, 11)), Child::new(date(2012, 12, 12))],
    );

    let result = calculator()
        .calculate(&obligor, &context)
        .expect("calculation succeeds");

    assert_eq!(result.net_income, dec!(2240));
    assert_eq!(result.job_expense_allowance, dec!(112.00));
    assert_eq!(result.distributable_mass, dec!(758.00));
    assert_eq!(result.total_minimum, dec!(754));
    assert!(!result.is_shortfall());
    assert_eq!(result.adjusted_net_income, dec!(1998));
    assert_eq!(result.bracket(), Some(1));
    assert_eq!(result.total_payable, dec!(754));
    assert!(result
        .children
        .iter()
        .all(|child| child.minimum == dec!(377) && child.payable == dec!(377)));
}

#[test]
fn shortfall_scales_the_minimum_by_coverage() {
    let mut obligor = Obligor::new(dec!(1500));
    obligor.statutory_deductions = deductions(&[("Krankenversicherung", dec!(20))]);
    let context = ComputationContext::new(date(2023, 7, 28), vec![Child::new(date(2020, 3, 1))]);

    let result = calculator()
        .calculate(&obligor, &context)
        .expect("calculation succeeds");

    // net 1480, allowance 74, distributable 1406 - 1370 = 36
    assert_eq!(result.distributable_mass, dec!(36));
    let factor = result.coverage_factor().expect("shortfall has a factor");
    assert!(factor < Decimal::ONE);
    assert_eq!(result.children[0].payable, (dec!(312) * factor).round_dp(2));
    assert_eq!(result.total_payable, dec!(36.00));
}

#[test]
fn zero_children_is_not_an_error() {
    let obligor = Obligor::new(dec!(2500));
    let context = ComputationContext::new(date(2023, 7, 28), Vec::new());

    let result = calculator()
        .calculate(&obligor, &context)
        .expect("calculation succeeds");

    assert_eq!(result.outcome, SupportOutcome::NoClaims);
    assert_eq!(result.total_payable, Decimal::ZERO);
    assert!(!result.is_shortfall());
    assert_eq!(result.coverage_factor(), None);
}

#[test]
fn four_children_start_below_the_table_and_clamp() {
    let mut obligor = Obligor::new(dec!(3200));
    obligor.personal_deductions = deductions(&[("Kreditrate", dec!(900))]);
    let context = ComputationContext::new(
        date(2023, 7, 28),
        vec![
            Child::new(date(2021, 1, 1)),
            Child::new(date(2019, 1, 1)),
            Child::new(date(2016, 1, 1)),
            Child::new(date(2010, 1, 1)),
        ],
    );

    // distributable 3050 - 1370 = 1680 covers minimums 312 + 312 + 377 + 463 = 1464;
    // full adjusted 3050 - 900 - 128 = 2022 is bracket 2, shifted by two to 0
    let result = compute(&obligor, &context, calculator().table()).expect("calculation succeeds");

    match result.outcome {
        SupportOutcome::Bracket {
            initial_bracket,
            bracket,
            step_modifier,
            ..
        } => {
            assert_eq!(step_modifier, 2);
            assert_eq!(initial_bracket, 1);
            assert_eq!(bracket, 1);
        }
        other => panic!("expected bracket outcome, got {other:?}"),
    }
    assert_eq!(result.total_payable, dec!(1464));
}

#[test]
fn loads_a_table_edition_from_csv() {
    let csv = "bracket,net_income_ceiling,age_0_5,age_6_11,age_12_17,age_18_plus,percent\n\
               1,2100,480,551,645,689,100\n\
               2,2500,504,579,678,724,105\n";
    let table = SupportTable::from_csv_reader(
        2024,
        csv.as_bytes(),
        unterhalt::support::TableConstants {
            protected_minimum_income: dec!(1450),
            protected_minimum_housing_share: dec!(520),
        },
    )
    .expect("valid edition");

    assert_eq!(table.year(), 2024);
    assert_eq!(table.highest_bracket(), 2);
    assert_eq!(table.bracket_for_ceiling(dec!(9000)), 2);
}
