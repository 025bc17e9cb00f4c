use super::table::SupportTable;
use rust_decimal::Decimal;

/// Households with more than two children move down one bracket per extra child.
pub fn step_modifier(child_count: usize) -> u32 {
    child_count.saturating_sub(2) as u32
}

/// Bracket implied by income, shifted down for large households.
///
/// The result may fall below the lowest bracket; the payout descent starts no lower
/// than bracket 1.
pub fn resolve_bracket(
    table: &SupportTable,
    adjusted_net_income: Decimal,
    child_count: usize,
) -> i32 {
    i32::from(table.bracket_for_ceiling(adjusted_net_income)) - step_modifier(child_count) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn step_modifier_counts_children_beyond_two() {
        assert_eq!(step_modifier(0), 0);
        assert_eq!(step_modifier(2), 0);
        assert_eq!(step_modifier(3), 1);
        assert_eq!(step_modifier(5), 3);
    }

    #[test]
    fn resolve_bracket_shifts_for_large_households() {
        let table = SupportTable::duesseldorf_2023().expect("embedded table");
        assert_eq!(resolve_bracket(&table, dec!(1998), 2), 2);
        assert_eq!(resolve_bracket(&table, dec!(3200), 4), 3);
        assert_eq!(resolve_bracket(&table, dec!(1500), 4), -1);
    }
}
