use super::common::*;
use crate::support::domain::{Child, ComputationContext, Obligor};
use crate::support::{compute, CalculationError, InputError, SupportOutcome};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn reference_household_descends_to_bracket_one() {
    let result = compute(&reference_obligor(), &reference_context(), &table()).expect("computes");

    assert_eq!(result.net_income, dec!(2240));
    assert_eq!(result.job_expense_allowance, dec!(112.00));
    assert_eq!(result.protected_minimum.amount, dec!(1370));
    assert_eq!(result.distributable_mass, dec!(758));
    assert_eq!(result.total_minimum, dec!(754));
    assert_eq!(result.adjusted_net_income, dec!(1998));
    assert!(!result.is_shortfall());

    match &result.outcome {
        SupportOutcome::Bracket {
            initial_bracket,
            bracket,
            step_modifier,
            descents,
        } => {
            assert_eq!(*initial_bracket, 2);
            assert_eq!(*bracket, 1);
            assert_eq!(*step_modifier, 0);
            assert_eq!(descents.len(), 1);
            assert_eq!(descents[0].required, dec!(806));
        }
        other => panic!("expected bracket outcome, got {other:?}"),
    }

    let payable: Vec<_> = result.children.iter().map(|child| child.payable).collect();
    assert_eq!(payable, [dec!(377), dec!(377)]);
    assert_eq!(result.total_payable, dec!(754));
}

#[test]
fn higher_income_keeps_the_income_bracket() {
    let mut obligor = reference_obligor();
    obligor.gross_income = dec!(4000);
    let result = compute(&obligor, &reference_context(), &table()).expect("computes");

    // net 3240, allowance 150, full adjusted 3240 - 150 - 10 - 160 = 2920 -> bracket 4
    assert_eq!(result.adjusted_net_income, dec!(2920));
    assert_eq!(result.bracket(), Some(4));
    assert_eq!(result.total_payable, dec!(906));
}

#[test]
fn third_child_shifts_bracket_down() {
    let mut obligor = reference_obligor();
    obligor.gross_income = dec!(5000);
    let mut context = reference_context();
    context.children.push(Child::new(date(2018, 3, 1)));

    let result = compute(&obligor, &context, &table()).expect("computes");

    // full adjusted 4240 - 150 - 10 - 200 = 3880 -> bracket 6, shifted to 5
    match result.outcome {
        SupportOutcome::Bracket {
            initial_bracket,
            step_modifier,
            ..
        } => {
            assert_eq!(step_modifier, 1);
            assert_eq!(initial_bracket, 5);
        }
        other => panic!("expected bracket outcome, got {other:?}"),
    }
}

#[test]
fn low_income_is_a_shortfall_case() {
    let mut obligor = Obligor::new(dec!(1800));
    obligor.statutory_deductions = deductions(&[("Krankenversicherung", dec!(150))]);
    let context = ComputationContext::new(as_of(), vec![Child::new(date(2020, 6, 1))]);

    let result = compute(&obligor, &context, &table()).expect("computes");

    assert!(result.is_shortfall());
    let factor = result.coverage_factor().expect("coverage factor");
    assert!(factor < Decimal::ONE);
    assert_eq!(result.children[0].minimum, dec!(312));
    assert_eq!(result.children[0].payable, (dec!(312) * factor).round_dp(2));
    assert_eq!(result.children[0].payable, dec!(197.50));
    assert_eq!(result.adjusted_net_income, dec!(1567.50));
    assert!(result.adjusted_net_deductions.is_empty());
}

#[test]
fn no_children_yields_zero_totals() {
    let context = ComputationContext::new(as_of(), Vec::new());
    let result = compute(&reference_obligor(), &context, &table()).expect("computes");

    assert_eq!(result.outcome, SupportOutcome::NoClaims);
    assert!(!result.is_shortfall());
    assert_eq!(result.total_payable, Decimal::ZERO);
    assert_eq!(result.total_minimum, Decimal::ZERO);
    assert!(result.children.is_empty());
}

#[test]
fn partial_totals_respect_summation_cutoff() {
    let context = reference_context().with_summation_cutoff(1);
    let result = compute(&reference_obligor(), &context, &table()).expect("computes");

    assert_eq!(result.partial_payable_total(), dec!(377));
    assert_eq!(result.partial_minimum_total(), dec!(377));
    assert_eq!(result.total_payable, dec!(754));
}

#[test]
fn entitlement_factor_scales_bracket_amounts() {
    let mut context = reference_context();
    context.children[1] = Child::new(date(2012, 12, 12)).with_entitlement_factor(dec!(0.5));
    let result = compute(&reference_obligor(), &context, &table()).expect("computes");

    // minimums 377 + 188.5 = 565.5; bracket 2 amounts 403 + 201.5 = 604.5 fit 758
    assert_eq!(result.bracket(), Some(2));
    let payable: Vec<_> = result.children.iter().map(|child| child.payable).collect();
    assert_eq!(payable, [dec!(403), dec!(201.50)]);
}

#[test]
fn fractional_entitlement_fitting_the_mass_exactly_resolves() {
    let mut obligor = Obligor::new(dec!(2000));
    obligor.statutory_deductions = deductions(&[("Krankenversicherung", dec!(161.842))]);
    let context = ComputationContext::new(
        as_of(),
        vec![Child::new(date(2015, 1, 1)).with_entitlement_factor(dec!(0.998))],
    );

    // mass 1838.158 - 91.91 - 1370 = 376.248 against a minimum of 377 * 0.998 = 376.246
    let result = compute(&obligor, &context, &table()).expect("no hidden shortfall");

    assert_eq!(result.distributable_mass, dec!(376.248));
    assert_eq!(result.total_minimum, dec!(376.246));
    assert!(!result.is_shortfall());
    assert_eq!(result.bracket(), Some(1));
    assert_eq!(result.children[0].payable, dec!(376.25));
}

#[test]
fn invalid_inputs_are_rejected_before_calculation() {
    let context = reference_context().with_summation_cutoff(3);
    let err = compute(&reference_obligor(), &context, &table()).expect_err("cutoff too large");
    assert!(matches!(
        err,
        CalculationError::InvalidInput(InputError::SummationCutoffOutOfRange { .. })
    ));
}
