use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

const EMBEDDED_2023: &str = include_str!("../../data/duesseldorfer_tabelle_2023.csv");

/// Lowest bracket of every table edition.
pub const LOWEST_BRACKET: u8 = 1;

/// Tolerance added to a child's age so exact birthdays do not flip bands through rounding.
pub const AGE_EPSILON_YEARS: f64 = 0.1;

/// Age column of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBand {
    UpToFive,
    SixToEleven,
    TwelveToSeventeen,
    Adult,
}

impl AgeBand {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::UpToFive,
            Self::SixToEleven,
            Self::TwelveToSeventeen,
            Self::Adult,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::UpToFive => "0-5",
            Self::SixToEleven => "6-11",
            Self::TwelveToSeventeen => "12-17",
            Self::Adult => "18+",
        }
    }

    const fn column(self) -> usize {
        match self {
            Self::UpToFive => 0,
            Self::SixToEleven => 1,
            Self::TwelveToSeventeen => 2,
            Self::Adult => 3,
        }
    }
}

/// Statutory constants published alongside each table edition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConstants {
    pub protected_minimum_income: Decimal,
    pub protected_minimum_housing_share: Decimal,
}

impl TableConstants {
    pub fn duesseldorf_2023() -> Self {
        Self {
            protected_minimum_income: dec!(1370),
            protected_minimum_housing_share: dec!(520),
        }
    }
}

/// One income row of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bracket {
    pub index: u8,
    pub net_income_ceiling: Decimal,
    minimum_by_age_band: [Decimal; 4],
    pub percent_of_base: u16,
}

impl Bracket {
    pub fn new(
        index: u8,
        net_income_ceiling: Decimal,
        minimum_by_age_band: [Decimal; 4],
        percent_of_base: u16,
    ) -> Self {
        Self {
            index,
            net_income_ceiling,
            minimum_by_age_band,
            percent_of_base,
        }
    }

    pub fn minimum_for(&self, band: AgeBand) -> Decimal {
        self.minimum_by_age_band[band.column()]
    }
}

/// Errors raised while loading or validating a table edition.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("support table has no brackets")]
    Empty,
    #[error("bracket index {found} out of sequence (expected {expected})")]
    NonContiguousIndex { expected: u8, found: u8 },
    #[error("net income ceiling {ceiling} of bracket {index} does not exceed the previous bracket")]
    NonIncreasingCeiling { index: u8, ceiling: Decimal },
    #[error("bracket {index} has a negative amount in age band {band}")]
    NegativeAmount { index: u8, band: &'static str },
    #[error("age band thresholds must start at 0 and increase strictly")]
    InvalidAgeThresholds,
    #[error("protected minimum constants must not be negative")]
    NegativeConstant,
    #[error("failed to read support table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid support table CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Immutable, validated edition of the Duesseldorfer Tabelle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupportTable {
    year: u16,
    brackets: Vec<Bracket>,
    age_thresholds: [u32; 4],
    constants: TableConstants,
}

impl SupportTable {
    pub fn new(
        year: u16,
        brackets: Vec<Bracket>,
        age_thresholds: [u32; 4],
        constants: TableConstants,
    ) -> Result<Self, TableError> {
        if brackets.is_empty() {
            return Err(TableError::Empty);
        }

        let mut previous_ceiling: Option<Decimal> = None;
        for (position, bracket) in brackets.iter().enumerate() {
            let expected = LOWEST_BRACKET.saturating_add(position as u8);
            if bracket.index != expected {
                return Err(TableError::NonContiguousIndex {
                    expected,
                    found: bracket.index,
                });
            }

            if previous_ceiling.is_some_and(|previous| bracket.net_income_ceiling <= previous) {
                return Err(TableError::NonIncreasingCeiling {
                    index: bracket.index,
                    ceiling: bracket.net_income_ceiling,
                });
            }
            previous_ceiling = Some(bracket.net_income_ceiling);

            if let Some(band) = AgeBand::ordered()
                .into_iter()
                .find(|band| bracket.minimum_for(*band) < Decimal::ZERO)
            {
                return Err(TableError::NegativeAmount {
                    index: bracket.index,
                    band: band.label(),
                });
            }
        }

        if age_thresholds[0] != 0 || age_thresholds.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err(TableError::InvalidAgeThresholds);
        }

        if constants.protected_minimum_income < Decimal::ZERO
            || constants.protected_minimum_housing_share < Decimal::ZERO
        {
            return Err(TableError::NegativeConstant);
        }

        Ok(Self {
            year,
            brackets,
            age_thresholds,
            constants,
        })
    }

    /// The 2023 edition shipped with the crate.
    pub fn duesseldorf_2023() -> Result<Self, TableError> {
        Self::embedded(2023, TableConstants::duesseldorf_2023())
    }

    /// Embedded amounts under a different year label or constants.
    pub fn embedded(year: u16, constants: TableConstants) -> Result<Self, TableError> {
        Self::from_csv_reader(year, EMBEDDED_2023.as_bytes(), constants)
    }

    pub fn from_path<P: AsRef<Path>>(
        year: u16,
        path: P,
        constants: TableConstants,
    ) -> Result<Self, TableError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(year, file, constants)
    }

    pub fn from_csv_reader<R: Read>(
        year: u16,
        reader: R,
        constants: TableConstants,
    ) -> Result<Self, TableError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut brackets = Vec::new();
        for record in csv_reader.deserialize::<TableRow>() {
            brackets.push(record?.into_bracket());
        }

        Self::new(year, brackets, [0, 6, 12, 18], constants)
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn constants(&self) -> TableConstants {
        self.constants
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    pub fn age_threshold(&self, band: AgeBand) -> u32 {
        self.age_thresholds[band.column()]
    }

    pub fn bracket(&self, index: u8) -> Option<&Bracket> {
        index
            .checked_sub(LOWEST_BRACKET)
            .and_then(|offset| self.brackets.get(offset as usize))
    }

    pub fn lowest_bracket(&self) -> u8 {
        LOWEST_BRACKET
    }

    pub fn highest_bracket(&self) -> u8 {
        self.brackets
            .last()
            .map(|bracket| bracket.index)
            .unwrap_or(LOWEST_BRACKET)
    }

    /// Smallest bracket whose ceiling covers the income, saturating at the top bracket.
    pub fn bracket_for_ceiling(&self, adjusted_net_income: Decimal) -> u8 {
        self.brackets
            .iter()
            .find(|bracket| bracket.net_income_ceiling >= adjusted_net_income)
            .map(|bracket| bracket.index)
            .unwrap_or_else(|| self.highest_bracket())
    }

    pub fn age_band_for(&self, age_years: f64) -> AgeBand {
        let shifted = age_years + AGE_EPSILON_YEARS;
        let below = self
            .age_thresholds
            .iter()
            .take_while(|threshold| f64::from(**threshold) < shifted)
            .count();
        AgeBand::ordered()[below.saturating_sub(1)]
    }

    pub fn minimum_amount(&self, bracket: u8, band: AgeBand) -> Option<Decimal> {
        self.bracket(bracket).map(|row| row.minimum_for(band))
    }
}

/// Age in years as whole days over 365, without calendar-month precision.
pub fn age_in_years(birth_date: NaiveDate, as_of: NaiveDate) -> f64 {
    (as_of - birth_date).num_days() as f64 / 365.0
}

#[derive(Debug, Deserialize)]
struct TableRow {
    bracket: u8,
    net_income_ceiling: Decimal,
    age_0_5: Decimal,
    age_6_11: Decimal,
    age_12_17: Decimal,
    age_18_plus: Decimal,
    percent: u16,
}

impl TableRow {
    fn into_bracket(self) -> Bracket {
        Bracket::new(
            self.bracket,
            self.net_income_ceiling,
            [self.age_0_5, self.age_6_11, self.age_12_17, self.age_18_plus],
            self.percent,
        )
    }
}
