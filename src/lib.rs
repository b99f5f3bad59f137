//! Personal income and capital tax computation across UK tax years 1980/81
//! to 2024/25.
//!
//! Each year's allowances, band ladder and scheme variants live in a
//! read-only registry. A caller supplies a [`TaxSource`] (the recorded
//! amounts per basis category) and a birthday; the engine allocates each
//! category onto the year's bands in the legally mandated order and returns
//! a [`TaxAnalysis`] for the reporting layers.

pub mod allowances;
pub mod analysis;
pub mod bands;
pub mod basis;
pub mod config;
pub mod registry;
pub mod scheme;
pub mod year;

pub use allowances::{AgeRelief, Allowances, MarginalReduction, SavingsRelief};
pub use analysis::{SlicedTaxDueBucket, TaxAnalysis, TaxBucket, TaxDueBucket, TaxError};
pub use bands::{TaxBand, TaxBandSet, TaxBands};
pub use basis::{GainEvent, TaxBasis, TaxSource};
pub use config::TaxConfig;
pub use registry::{find_tax_year_for_date, find_tax_year_for_range, tax_years};
pub use scheme::{CapitalKind, CapitalRates, CapitalScheme, DividendScheme, InterestScheme, Scheme};
pub use year::TaxYear;

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Analyse a taxpayer's year, resolving the ruleset from any date within it.
///
/// Fails with [`TaxError::UnsupportedYear`] for dates outside the registry.
pub fn analyse(
    date: NaiveDate,
    source: &dyn TaxSource,
    birthday: NaiveDate,
    tax_paid: Decimal,
) -> Result<TaxAnalysis, TaxError> {
    let year = find_tax_year_for_date(date).ok_or(TaxError::UnsupportedYear(date))?;
    Ok(year.analyse(source, birthday, tax_paid))
}
