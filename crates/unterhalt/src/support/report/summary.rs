use super::super::calculator::{SupportCalculation, SupportOutcome};
use super::super::domain::Deduction;
use super::views::{
    AmountDirection, ChildLine, IncomeLine, ProtectedMinimumView, SupportReportSummary,
};
use rust_decimal::Decimal;

impl SupportCalculation {
    pub fn summary(&self) -> SupportReportSummary {
        let partial_minimum_total = self.partial_minimum_total();
        let partial_payable_total = self.partial_payable_total();

        let (outcome_label, minimum_column_label) = match self.outcome {
            SupportOutcome::NoClaims => ("No support claims", "Minimum"),
            SupportOutcome::Shortfall { .. } => ("Shortfall case", "Assessment base"),
            SupportOutcome::Bracket { .. } => ("Bracket payout", "Minimum"),
        };

        let (protected_minimum, distributable_mass) = if self.is_shortfall() {
            (
                Some(protected_minimum_view(self)),
                Some(self.distributable_mass),
            )
        } else {
            (None, None)
        };

        let notices = match &self.outcome {
            SupportOutcome::Bracket { descents, .. } => descents
                .iter()
                .map(|step| {
                    format!(
                        "support total {:.2} at bracket {} breaches the protected minimum; bracket reduced to {}",
                        step.required, step.from, step.to
                    )
                })
                .collect(),
            _ => Vec::new(),
        };

        SupportReportSummary {
            table_year: self.table_year,
            as_of: self.as_of,
            gross_income: self.gross_income,
            statutory_lines: income_lines(&self.statutory_deductions),
            net_income: self.net_income,
            job_expense_allowance: self.job_expense_allowance,
            adjusted_net_lines: income_lines(&self.adjusted_net_deductions),
            adjusted_net_income: self.adjusted_net_income,
            outcome_label,
            bracket: self.bracket(),
            coverage_factor: self.coverage_factor().map(|factor| factor.round_dp(2)),
            protected_minimum,
            distributable_mass,
            minimum_column_label,
            children: self
                .children
                .iter()
                .map(|child| ChildLine {
                    birth_date: child.birth_date,
                    age_band: child.age_band,
                    age_band_label: child.age_band.label(),
                    minimum: child.minimum,
                    payable: child.payable,
                })
                .collect(),
            partial_minimum_total,
            partial_payable_total,
            net_after_partial_support: self.net_income - partial_payable_total,
            adjusted_net_after_partial_support: self.adjusted_net_income - partial_payable_total,
            adjusted_net_after_total_support: self.adjusted_net_income - self.total_payable,
            notices,
        }
    }
}

fn income_lines(deductions: &[Deduction]) -> Vec<IncomeLine> {
    deductions
        .iter()
        .map(|entry| {
            let direction = if entry.amount > Decimal::ZERO {
                AmountDirection::Less
            } else {
                AmountDirection::Plus
            };
            IncomeLine {
                label: entry.label.clone(),
                direction,
                amount: entry.amount.abs(),
            }
        })
        .collect()
}

fn protected_minimum_view(calculation: &SupportCalculation) -> ProtectedMinimumView {
    let protected = calculation.protected_minimum;
    let housing_differs = protected.housing_differs();
    ProtectedMinimumView {
        statutory_amount: protected.statutory_amount,
        housing_cost: housing_differs.then_some(protected.housing_cost),
        housing_share: housing_differs.then_some(protected.housing_share),
        reduction_factor: (!protected.reduction_factor.is_zero())
            .then_some(protected.reduction_factor),
        amount: protected.amount,
    }
}
