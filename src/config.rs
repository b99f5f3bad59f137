use crate::basis::{TaxBasis, TaxSource};
use crate::bands::{TaxBand, TaxBandSet};
use crate::year::TaxYear;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

/// The single allowance mutation primitive.
///
/// Takes `amount` out of `pool`, clamping the pool at zero, and returns the
/// part of `amount` the pool could not cover.
pub fn consume(pool: &mut Decimal, amount: Decimal) -> Decimal {
    assert!(
        *pool >= Decimal::ZERO,
        "allowance pool went negative: {pool}"
    );
    if amount > *pool {
        let remainder = amount - *pool;
        *pool = Decimal::ZERO;
        remainder
    } else {
        *pool -= amount;
        Decimal::ZERO
    }
}

/// Whole years elapsed from `birthday` to `date`.
pub fn age_on(birthday: NaiveDate, date: NaiveDate) -> i32 {
    let mut age = date.year() - birthday.year();
    if (date.month(), date.day()) < (birthday.month(), birthday.day()) {
        age -= 1;
    }
    age
}

/// Per-analysis working state: resolved allowances, gross income figures and
/// a mutable copy of the year's band capacities.
///
/// The allowance pools and band copies are consumed downward, never
/// increased, as each basis category is processed in order. A `clone` is a
/// fully independent snapshot whose pools can be decremented without
/// affecting the master copy.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxConfig {
    pub year_end: NaiveDate,
    pub client_age: i32,
    /// Earned and property income, before savings and dividends.
    pub gross_pre_savings: Decimal,
    /// Everything taxed under the income schedule, capital gains excluded.
    pub gross_taxable: Decimal,
    pub allowance: Decimal,
    pub rental_allowance: Decimal,
    pub savings_allowance: Decimal,
    pub dividend_allowance: Decimal,
    pub capital_allowance: Decimal,
    pub tax_bands: TaxBandSet,
    pub basic_index: usize,
    pub lo_savings_band: Option<TaxBand>,
    pub has_age_related_allowance: bool,
}

impl TaxConfig {
    /// Build the working state for one analysis. The gross figures are fixed
    /// here, before any allowance or band is touched, because the tapering
    /// rules need the pre-consumption totals.
    pub fn new(year: &TaxYear, source: &dyn TaxSource, birthday: NaiveDate) -> Self {
        let client_age = age_on(birthday, year.year_end);
        let allowances = &year.allowances;

        let amount = |basis| source.amount_for_basis(basis).max(Decimal::ZERO);

        let room_rental_excess =
            (amount(TaxBasis::RoomRental) - allowances.rental).max(Decimal::ZERO);
        let gross_pre_savings = amount(TaxBasis::Salary)
            + amount(TaxBasis::RentalIncome)
            + amount(TaxBasis::OtherIncome)
            + room_rental_excess;

        let gross_taxable = gross_pre_savings
            + amount(TaxBasis::TaxedInterest)
            + amount(TaxBasis::UntaxedInterest)
            + amount(TaxBasis::Dividend)
            + amount(TaxBasis::UnitTrustDividend)
            + amount(TaxBasis::ForeignDividend)
            + amount(TaxBasis::ChargeableGains);

        let (allowance, has_age_related_allowance) =
            allowances.allowance_for(gross_taxable, client_age, birthday);
        let savings_allowance = allowances.savings_allowance_for(gross_taxable, &year.bands);

        log::debug!(
            "config for year ending {}: age {client_age}, gross {gross_taxable}, allowance {allowance}",
            year.year_end
        );

        TaxConfig {
            year_end: year.year_end,
            client_age,
            gross_pre_savings,
            gross_taxable,
            allowance,
            rental_allowance: allowances.rental,
            savings_allowance,
            dividend_allowance: allowances.dividend_allowance(),
            capital_allowance: allowances.capital,
            tax_bands: year.bands.standard.clone(),
            basic_index: year.bands.basic_index(),
            lo_savings_band: year.bands.low_savings,
            has_age_related_allowance,
        }
    }
}
