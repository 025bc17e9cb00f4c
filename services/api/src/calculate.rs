use crate::infra::{deserialize_optional_date, parse_date};
use chrono::{Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;
use unterhalt::config::AppConfig;
use unterhalt::error::AppError;
use unterhalt::support::{
    AgeBand, CalculationError, Child, ComputationContext, Deduction, Deductions, Obligor,
    SupportCalculation, SupportCalculator, SupportReportSummary, SupportTable,
};
use unterhalt::telemetry;

/// Household as accepted by `calculate --input` and the HTTP endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct HouseholdInput {
    pub(crate) obligor: Obligor,
    #[serde(default)]
    pub(crate) children: Vec<Child>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) as_of: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) summation_cutoff: Option<usize>,
}

impl HouseholdInput {
    pub(crate) fn into_parts(self, fallback_as_of: NaiveDate) -> (Obligor, ComputationContext) {
        let as_of = self.as_of.unwrap_or(fallback_as_of);
        let mut context = ComputationContext::new(as_of, self.children);
        if let Some(cutoff) = self.summation_cutoff {
            context = context.with_summation_cutoff(cutoff);
        }
        (self.obligor, context)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CalculationOutput {
    pub(crate) calculation: SupportCalculation,
    pub(crate) summary: SupportReportSummary,
}

impl From<SupportCalculation> for CalculationOutput {
    fn from(calculation: SupportCalculation) -> Self {
        let summary = calculation.summary();
        Self {
            calculation,
            summary,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct CalculateArgs {
    /// JSON file describing the obligor and children
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Reference date for child ages (YYYY-MM-DD). Overrides the file; defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Print the calculation as JSON instead of a text report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference date for child ages (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Print the calculation as JSON instead of a text report
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_calculate(args: CalculateArgs) -> Result<(), AppError> {
    let CalculateArgs {
        input,
        as_of,
        json,
    } = args;

    let calculator = load_calculator()?;
    let reader = BufReader::new(File::open(&input)?);
    let mut household: HouseholdInput = serde_json::from_reader(reader)?;
    if as_of.is_some() {
        household.as_of = as_of;
    }

    let (obligor, context) = household.into_parts(Local::now().date_naive());
    let calculation = calculator.calculate(&obligor, &context)?;
    emit(calculation, json)
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let calculator = load_calculator()?;
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let (obligor, context) = sample_household(as_of)?;

    if !args.json {
        println!("Child support demo (sample household)");
    }
    let calculation = calculator.calculate(&obligor, &context)?;
    emit(calculation, args.json)
}

pub(crate) fn run_table() -> Result<(), AppError> {
    let calculator = load_calculator()?;
    render_table(calculator.table());
    Ok(())
}

fn load_calculator() -> Result<SupportCalculator, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let table = config.table.load_table()?;
    Ok(SupportCalculator::new(Arc::new(table)))
}

fn emit(calculation: SupportCalculation, json: bool) -> Result<(), AppError> {
    if json {
        let output = CalculationOutput::from(calculation);
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        render_support_report(&calculation.summary());
    }
    Ok(())
}

/// Privately insured obligor with two school-age children.
pub(crate) fn sample_household(
    as_of: NaiveDate,
) -> Result<(Obligor, ComputationContext), AppError> {
    let mut obligor = Obligor::new(dec!(3000));
    obligor.statutory_deductions = Deductions::new(vec![
        Deduction::new("PrivKVPV", dec!(300)),
        Deduction::new("PKVKind", dec!(20)),
        Deduction::new("Einkommensteuer", dec!(400)),
        Deduction::new("Kirchensteuer", dec!(40)),
    ])
    .map_err(CalculationError::from)?;
    obligor.personal_deductions =
        Deductions::new(vec![Deduction::new("RisikoLebensVersicherung", dec!(10))])
            .map_err(CalculationError::from)?;

    let children = [(2011, 11, 11), (2012, 12, 12)]
        .into_iter()
        .filter_map(|(year, month, day)| NaiveDate::from_ymd_opt(year, month, day))
        .map(Child::new)
        .collect();

    Ok((obligor, ComputationContext::new(as_of, children)))
}

pub(crate) fn render_support_report(summary: &SupportReportSummary) {
    println!(
        "Duesseldorfer Tabelle {} (children's ages as of {})",
        summary.table_year, summary.as_of
    );

    println!("\nIncome");
    print_amount("Gross income", summary.gross_income);
    for line in &summary.statutory_lines {
        print_amount(&format!("{} {}", line.direction.label(), line.label), line.amount);
    }
    print_amount("Net income", summary.net_income);
    print_amount("less job expense allowance", summary.job_expense_allowance);
    for line in &summary.adjusted_net_lines {
        print_amount(&format!("{} {}", line.direction.label(), line.label), line.amount);
    }
    print_amount("Adjusted net income", summary.adjusted_net_income);

    println!("\nOutcome: {}", summary.outcome_label);
    if let Some(bracket) = summary.bracket {
        println!("- bracket {bracket}");
    }
    if let Some(factor) = summary.coverage_factor {
        println!("- coverage factor {factor:.2}");
    }
    if let Some(protected) = &summary.protected_minimum {
        println!("- protected minimum {:.2}", protected.amount);
        if let (Some(cost), Some(share)) = (protected.housing_cost, protected.housing_share) {
            println!("  housing cost {cost:.2} against a share of {share:.2}");
        }
        if let Some(factor) = protected.reduction_factor {
            println!("  reduced by factor {factor}");
        }
    }
    if let Some(mass) = summary.distributable_mass {
        println!("- distributable mass {mass:.2}");
    }

    if summary.children.is_empty() {
        println!("\nChildren: none");
    } else {
        println!("\nChildren");
        println!(
            "  {:<12} {:>6} {:>16} {:>10}",
            "Born", "Age", summary.minimum_column_label, "Payable"
        );
        for child in &summary.children {
            println!(
                "  {:<12} {:>6} {:>16.2} {:>10.2}",
                child.birth_date.to_string(),
                child.age_band_label,
                child.minimum,
                child.payable
            );
        }
        println!(
            "  {:<12} {:>6} {:>16.2} {:>10.2}",
            "Total", "", summary.partial_minimum_total, summary.partial_payable_total
        );
    }

    println!("\nRemaining income");
    print_amount("Net after support", summary.net_after_partial_support);
    print_amount(
        "Adjusted net after support",
        summary.adjusted_net_after_partial_support,
    );
    print_amount(
        "Adjusted net after all children",
        summary.adjusted_net_after_total_support,
    );

    if !summary.notices.is_empty() {
        println!("\nNotices");
        for notice in &summary.notices {
            println!("- {notice}");
        }
    }
}

fn print_amount(label: &str, amount: Decimal) {
    println!("  {label:<40} {amount:>10.2}");
}

fn render_table(table: &SupportTable) {
    let constants = table.constants();
    println!("Duesseldorfer Tabelle {}", table.year());
    println!(
        "Protected minimum {:.2} (housing share {:.2})",
        constants.protected_minimum_income, constants.protected_minimum_housing_share
    );

    let bands = AgeBand::ordered();
    print!("\n  {:>3} {:>10}", "#", "up to");
    for band in bands {
        print!(" {:>8}", band.label());
    }
    println!(" {:>5}", "%");

    for bracket in table.brackets() {
        print!(
            "  {:>3} {:>10.2}",
            bracket.index, bracket.net_income_ceiling
        );
        for band in bands {
            print!(" {:>8.2}", bracket.minimum_for(band));
        }
        println!(" {:>5}", bracket.percent_of_base);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 7, 28).expect("valid date")
    }

    #[test]
    fn household_input_parses_minimal_json() {
        let household: HouseholdInput = serde_json::from_str(
            r#"{
                "obligor": { "gross_income": "1800" },
                "children": [{ "birth_date": "2020-06-01" }],
                "as_of": "2023-07-28"
            }"#,
        )
        .expect("input parses");

        let (obligor, context) = household.into_parts(NaiveDate::MIN);
        assert_eq!(obligor.gross_income, dec!(1800));
        assert_eq!(context.as_of, reference_date());
        assert_eq!(context.cutoff(), 1);
    }

    #[test]
    fn household_input_falls_back_to_given_date() {
        let household: HouseholdInput =
            serde_json::from_str(r#"{ "obligor": { "gross_income": 2500 }, "summation_cutoff": 0 }"#)
                .expect("input parses");
        let (_, context) = household.into_parts(reference_date());
        assert_eq!(context.as_of, reference_date());
        assert!(context.children.is_empty());
        assert_eq!(context.cutoff(), 0);
    }

    #[test]
    fn sample_household_descends_to_first_bracket() {
        let table = SupportTable::duesseldorf_2023().expect("embedded table");
        let calculator = SupportCalculator::new(Arc::new(table));
        let (obligor, context) = sample_household(reference_date()).expect("sample builds");

        let output = CalculationOutput::from(
            calculator
                .calculate(&obligor, &context)
                .expect("sample calculates"),
        );
        assert_eq!(output.summary.bracket, Some(1));
        assert_eq!(output.calculation.total_payable, dec!(754));
        assert_eq!(output.summary.notices.len(), 1);
    }
}
