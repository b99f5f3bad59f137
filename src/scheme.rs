use crate::bands::{TaxBand, TaxBandSet};
use crate::basis::TaxBasis;
use crate::config::{consume, TaxConfig};
use rust_decimal::Decimal;

/// How interest is mapped onto the year's ladder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InterestScheme {
    /// Taxed like any other income (years to 1995/96).
    AsIncome,
    /// Basic-rate band overridden to the savings rate (1996/97 to 2007/08).
    BaseRate { rate: Decimal },
    /// As `BaseRate`, with the savings-only starting band in front
    /// (2008/09 onwards).
    LoBaseRate { rate: Decimal },
}

/// How dividends are mapped onto the year's ladder.
///
/// The credit-era variants (`Base`, `Higher`, `LoHigher`, and `Additional`
/// with `relief: false`) carry a notional tax credit: the allowance-covered
/// amount is not zero-rated but held over into the first charged band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DividendScheme {
    /// Taxed like any other income (years to 1992/93).
    AsIncome,
    /// Bands through the basic band at `rate`, higher bands untouched
    /// (1993/94 to 1998/99).
    Base { rate: Decimal },
    /// Two dividend rates replacing the ladder (no general low band).
    Higher { base: Decimal, higher: Decimal },
    /// Two dividend rates in years with a general low band
    /// (1999/00 to 2007/08).
    LoHigher { base: Decimal, higher: Decimal },
    /// Three dividend rates (2010/11 onwards); `relief` is false while the
    /// notional credit survived (to 2015/16), true in the allowance era.
    Additional {
        base: Decimal,
        higher: Decimal,
        additional: Decimal,
        relief: bool,
    },
}

impl DividendScheme {
    fn relief_available(&self) -> bool {
        match self {
            DividendScheme::AsIncome => true,
            DividendScheme::Base { .. }
            | DividendScheme::Higher { .. }
            | DividendScheme::LoHigher { .. } => false,
            DividendScheme::Additional { relief, .. } => *relief,
        }
    }
}

/// Basic/higher rate pair for a capital gains schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapitalRates {
    pub base: Decimal,
    pub higher: Decimal,
}

/// The year's capital gains schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CapitalScheme {
    /// Gains taxed at income rates on top of income (1988/89 to 2007/08).
    AsIncome,
    /// Single flat rate (30% to 1987/88, 18% in 2008/09 and 2009/10).
    Flat { rate: Decimal },
    /// Rate depends on the remaining basic-rate capacity (2010/11 to 2015/16).
    Split(CapitalRates),
    /// Separate residential rates on top of the split (2016/17 onwards).
    Residential {
        general: CapitalRates,
        residential: CapitalRates,
    },
}

impl CapitalScheme {
    /// Resolve the schedule for one capital basis.
    pub fn kind_for(&self, basis: TaxBasis) -> CapitalKind {
        match self {
            CapitalScheme::AsIncome => CapitalKind::AsIncome,
            CapitalScheme::Flat { rate } => CapitalKind::Flat { rate: *rate },
            CapitalScheme::Split(rates) => CapitalKind::Split(*rates),
            CapitalScheme::Residential {
                general,
                residential,
            } => {
                if basis == TaxBasis::ResidentialCapitalGains {
                    CapitalKind::Split(*residential)
                } else {
                    CapitalKind::Split(*general)
                }
            }
        }
    }
}

/// A capital schedule resolved for a single basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CapitalKind {
    AsIncome,
    Flat { rate: Decimal },
    Split(CapitalRates),
}

/// The allocation strategy for one basis category.
///
/// A closed set of variants sharing one allocation algorithm; the variant
/// decides which allowance pools are consumed (and in what order) and how
/// the year's ladder is reshaped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scheme {
    Income,
    RoomRental,
    Interest(InterestScheme),
    Dividend(DividendScheme),
    Capital(CapitalKind),
    ChargeableGains,
}

impl Scheme {
    /// Whether the allowance-covered amount is genuinely tax-free.
    pub fn relief_available(&self) -> bool {
        match self {
            Scheme::Dividend(dividend) => dividend.relief_available(),
            _ => true,
        }
    }

    /// Read-only lookahead: how much of `amount` the scheme's allowance
    /// pools would cover, in the same precedence order `adjust_allowances`
    /// consumes them.
    pub fn amount_covered_by_allowance(&self, config: &TaxConfig, amount: Decimal) -> Decimal {
        let mut remaining = amount.max(Decimal::ZERO);
        let mut covered = Decimal::ZERO;
        for pool in self.pool_amounts(config) {
            let taken = remaining.min(pool);
            covered += taken;
            remaining -= taken;
        }
        covered
    }

    /// Consume the scheme's allowance pools and return the uncovered
    /// remainder. Pools clamp at zero, never negative.
    pub fn adjust_allowances(&self, config: &mut TaxConfig, amount: Decimal) -> Decimal {
        let mut remaining = amount.max(Decimal::ZERO);
        match self {
            Scheme::Income | Scheme::ChargeableGains => {
                remaining = consume(&mut config.allowance, remaining);
            }
            Scheme::RoomRental => {
                remaining = consume(&mut config.rental_allowance, remaining);
                remaining = consume(&mut config.allowance, remaining);
            }
            Scheme::Interest(_) => {
                remaining = consume(&mut config.savings_allowance, remaining);
                remaining = consume(&mut config.allowance, remaining);
            }
            Scheme::Dividend(_) => {
                remaining = consume(&mut config.dividend_allowance, remaining);
                remaining = consume(&mut config.allowance, remaining);
            }
            Scheme::Capital(_) => {
                remaining = consume(&mut config.capital_allowance, remaining);
                remaining = consume(&mut config.allowance, remaining);
            }
        }
        remaining
    }

    /// The scheme's view of the remaining rate ladder.
    pub fn tax_band_iterator(&self, config: &TaxConfig) -> Vec<TaxBand> {
        let standard = || config.tax_bands.iter().copied().collect::<Vec<_>>();
        let basic = config.basic_index;

        match self {
            Scheme::Income
            | Scheme::RoomRental
            | Scheme::ChargeableGains
            | Scheme::Interest(InterestScheme::AsIncome)
            | Scheme::Dividend(DividendScheme::AsIncome)
            | Scheme::Capital(CapitalKind::AsIncome) => standard(),

            Scheme::Interest(InterestScheme::BaseRate { rate }) => {
                override_rate(standard(), basic, *rate)
            }
            Scheme::Interest(InterestScheme::LoBaseRate { rate }) => {
                let low = config.lo_savings_band.unwrap_or_else(|| {
                    panic!(
                        "year ending {} has no low savings band for its interest scheme",
                        config.year_end
                    )
                });
                let mut ladder = vec![low];
                ladder.extend(override_rate(standard(), basic, *rate));
                ladder
            }

            Scheme::Dividend(dividend) => standard()
                .into_iter()
                .enumerate()
                .map(|(index, band)| TaxBand {
                    amount: band.amount,
                    rate: dividend_rate(dividend, index, basic, band.rate),
                })
                .collect(),

            Scheme::Capital(CapitalKind::Flat { rate }) => vec![TaxBand::unbounded(*rate)],
            Scheme::Capital(CapitalKind::Split(rates)) => {
                let basic_capacity = config.tax_bands.capacity_through(basic);
                vec![
                    TaxBand::new(basic_capacity, rates.base),
                    TaxBand::unbounded(rates.higher),
                ]
            }
        }
    }

    /// Allocate a basis amount onto the ladder and consume the shared state.
    ///
    /// The working set always sums to the (clamped) input amount. After the
    /// walk, the real pools are decremented and the ladder copies shrunk so
    /// later basis categories see the smaller capacities.
    pub fn allocate_to_tax_bands(&self, config: &mut TaxConfig, amount: Decimal) -> TaxBandSet {
        let amount = amount.max(Decimal::ZERO);
        let covered = self.amount_covered_by_allowance(config, amount);

        let mut working: Vec<TaxBand> = Vec::new();
        let mut remaining = amount - covered;
        // with no relief the covered amount is held over into the first band
        let mut carry = covered;
        if self.relief_available() {
            if covered > Decimal::ZERO {
                working.push(TaxBand::new(covered, Decimal::ZERO));
            }
            carry = Decimal::ZERO;
        }

        for band in self.tax_band_iterator(config) {
            if remaining <= Decimal::ZERO && carry <= Decimal::ZERO {
                break;
            }
            let taken = band.amount.map_or(remaining, |a| remaining.min(a));
            let allocated = taken + carry;
            if allocated > Decimal::ZERO {
                working.push(TaxBand::new(allocated, band.rate));
            }
            carry = Decimal::ZERO;
            remaining -= taken;
            if band.is_unbounded() {
                break;
            }
        }

        let unconsumed = self.adjust_allowances(config, amount);
        self.adjust_tax_bands(config, unconsumed);
        log::debug!("{self:?} allocated {amount}: {working:?}");

        TaxBandSet::new(working)
    }

    /// Shrink the shared band copies by the amount that escaped the
    /// allowances. The low savings band sits inside the basic band, so it is
    /// eroded by every category, not just interest.
    fn adjust_tax_bands(&self, config: &mut TaxConfig, amount: Decimal) {
        if amount <= Decimal::ZERO {
            return;
        }
        config.tax_bands.deduct(amount);
        if let Some(band) = &mut config.lo_savings_band {
            band.deduct(amount);
        }
    }

    /// Allowance pools in consumption order, read-only.
    fn pool_amounts(&self, config: &TaxConfig) -> Vec<Decimal> {
        match self {
            Scheme::Income | Scheme::ChargeableGains => vec![config.allowance],
            Scheme::RoomRental => vec![config.rental_allowance, config.allowance],
            Scheme::Interest(_) => vec![config.savings_allowance, config.allowance],
            Scheme::Dividend(_) => vec![config.dividend_allowance, config.allowance],
            Scheme::Capital(_) => vec![config.capital_allowance, config.allowance],
        }
    }
}

/// Replace the rate of the band at `index`, keeping the rest of the ladder.
fn override_rate(mut bands: Vec<TaxBand>, index: usize, rate: Decimal) -> Vec<TaxBand> {
    if let Some(band) = bands.get_mut(index) {
        band.rate = rate;
    }
    bands
}

/// Dividend rate for the band at `index`, positioned relative to the
/// basic-rate band.
fn dividend_rate(
    scheme: &DividendScheme,
    index: usize,
    basic_index: usize,
    standard_rate: Decimal,
) -> Decimal {
    match scheme {
        DividendScheme::AsIncome => standard_rate,
        DividendScheme::Base { rate } => {
            if index <= basic_index {
                *rate
            } else {
                standard_rate
            }
        }
        DividendScheme::Higher { base, higher } | DividendScheme::LoHigher { base, higher } => {
            if index <= basic_index {
                *base
            } else {
                *higher
            }
        }
        DividendScheme::Additional {
            base,
            higher,
            additional,
            ..
        } => {
            if index <= basic_index {
                *base
            } else if index == basic_index + 1 {
                *higher
            } else {
                *additional
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn config_2018_19() -> TaxConfig {
        TaxConfig {
            year_end: NaiveDate::from_ymd_opt(2019, 4, 5).unwrap(),
            client_age: 40,
            gross_pre_savings: dec!(0),
            gross_taxable: dec!(0),
            allowance: dec!(11850),
            rental_allowance: dec!(7500),
            savings_allowance: dec!(1000),
            dividend_allowance: dec!(2000),
            capital_allowance: dec!(11700),
            tax_bands: TaxBandSet::new(vec![
                TaxBand::new(dec!(34500), dec!(0.20)),
                TaxBand::new(dec!(115500), dec!(0.40)),
                TaxBand::unbounded(dec!(0.45)),
            ]),
            basic_index: 0,
            lo_savings_band: Some(TaxBand::new(dec!(5000), dec!(0))),
            has_age_related_allowance: false,
        }
    }

    fn config_2004_05() -> TaxConfig {
        TaxConfig {
            year_end: NaiveDate::from_ymd_opt(2005, 4, 5).unwrap(),
            client_age: 40,
            gross_pre_savings: dec!(0),
            gross_taxable: dec!(0),
            allowance: dec!(4745),
            rental_allowance: dec!(4250),
            savings_allowance: dec!(0),
            dividend_allowance: dec!(0),
            capital_allowance: dec!(8200),
            tax_bands: TaxBandSet::new(vec![
                TaxBand::new(dec!(2020), dec!(0.10)),
                TaxBand::new(dec!(29380), dec!(0.22)),
                TaxBand::unbounded(dec!(0.40)),
            ]),
            basic_index: 1,
            lo_savings_band: None,
            has_age_related_allowance: false,
        }
    }

    #[test]
    fn income_allocation_covers_the_amount() {
        let mut config = config_2018_19();
        let working = Scheme::Income.allocate_to_tax_bands(&mut config, dec!(50000));

        assert_eq!(working.total_amount(), dec!(50000));
        assert_eq!(working.taxable_income(), dec!(38150));
        assert_eq!(working.tax_due(), dec!(8360));
    }

    #[test]
    fn allocation_consumes_the_shared_ladder() {
        let mut config = config_2018_19();
        Scheme::Income.allocate_to_tax_bands(&mut config, dec!(50000));

        assert_eq!(config.allowance, dec!(0));
        assert_eq!(config.tax_bands.get(0).unwrap().amount, Some(dec!(0)));
        assert_eq!(config.tax_bands.get(1).unwrap().amount, Some(dec!(111850)));
        // the starting savings band sits inside the basic band
        assert_eq!(config.lo_savings_band.unwrap().amount, Some(dec!(0)));
    }

    #[test]
    fn lookahead_does_not_mutate() {
        let config = config_2018_19();
        let covered =
            Scheme::Dividend(DividendScheme::AsIncome).amount_covered_by_allowance(&config, dec!(20000));
        assert_eq!(covered, dec!(13850));
        assert_eq!(config.dividend_allowance, dec!(2000));
        assert_eq!(config.allowance, dec!(11850));
    }

    #[test]
    fn allowance_precedence_own_pool_first() {
        let mut config = config_2018_19();
        let remaining =
            Scheme::Dividend(DividendScheme::AsIncome).adjust_allowances(&mut config, dec!(3000));
        assert_eq!(remaining, dec!(0));
        assert_eq!(config.dividend_allowance, dec!(0));
        assert_eq!(config.allowance, dec!(10850));
    }

    #[test]
    fn negative_amount_clamps_to_zero() {
        let mut config = config_2018_19();
        let working = Scheme::Income.allocate_to_tax_bands(&mut config, dec!(-100));
        assert_eq!(working.total_amount(), dec!(0));
        assert_eq!(config.allowance, dec!(11850));
    }

    #[test]
    fn amount_within_allowance_is_one_zero_band() {
        let mut config = config_2018_19();
        let working = Scheme::Income.allocate_to_tax_bands(&mut config, dec!(8000));
        assert_eq!(working.len(), 1);
        assert_eq!(working.tax_due(), dec!(0));
        assert_eq!(working.taxable_income(), dec!(0));
        assert_eq!(config.allowance, dec!(3850));
    }

    #[test]
    fn no_relief_carries_allowance_into_first_band() {
        // 2004/05 dividends: 10% credit rate; the allowance-covered amount is
        // taxed at the first band rate instead of being dropped.
        let mut config = config_2004_05();
        let scheme = Scheme::Dividend(DividendScheme::LoHigher {
            base: dec!(0.10),
            higher: dec!(0.325),
        });
        let working = scheme.allocate_to_tax_bands(&mut config, dec!(6000));

        assert!(!scheme.relief_available());
        assert_eq!(working.total_amount(), dec!(6000));
        // no zero-rate band: everything lands in the 10% band
        assert_eq!(working.len(), 1);
        assert_eq!(working.tax_due(), dec!(600));
        assert_eq!(config.allowance, dec!(0));
    }

    #[test]
    fn interest_base_rate_overrides_basic_band() {
        let mut config = config_2004_05();
        config.allowance = dec!(0);
        let scheme = Scheme::Interest(InterestScheme::BaseRate { rate: dec!(0.20) });

        let ladder = scheme.tax_band_iterator(&config);
        assert_eq!(ladder[0].rate, dec!(0.10)); // general low band untouched
        assert_eq!(ladder[1].rate, dec!(0.20)); // basic 22% -> 20%
        assert_eq!(ladder[2].rate, dec!(0.40));
    }

    #[test]
    fn interest_lo_base_rate_injects_savings_band() {
        let mut config = config_2018_19();
        config.allowance = dec!(0);
        config.savings_allowance = dec!(0);
        let scheme = Scheme::Interest(InterestScheme::LoBaseRate { rate: dec!(0.20) });

        let working = scheme.allocate_to_tax_bands(&mut config, dec!(6000));
        assert_eq!(working.total_amount(), dec!(6000));
        // 5,000 in the 0% starting band, 1,000 at 20%
        assert_eq!(working.tax_due(), dec!(200));
    }

    #[test]
    #[should_panic(expected = "no low savings band")]
    fn missing_low_savings_band_panics() {
        let mut config = config_2018_19();
        config.lo_savings_band = None;
        Scheme::Interest(InterestScheme::LoBaseRate { rate: dec!(0.20) })
            .allocate_to_tax_bands(&mut config, dec!(100));
    }

    #[test]
    fn capital_split_uses_remaining_basic_capacity() {
        let mut config = config_2018_19();
        config.allowance = dec!(0);
        config.capital_allowance = dec!(0);
        // salary has already eaten most of the basic band
        config.tax_bands.deduct(dec!(30000));

        let scheme = Scheme::Capital(CapitalKind::Split(CapitalRates {
            base: dec!(0.18),
            higher: dec!(0.28),
        }));
        let working = scheme.allocate_to_tax_bands(&mut config, dec!(10000));

        // 4,500 left at 18%, the rest at 28%
        assert_eq!(working.tax_due(), dec!(810) + dec!(1540));
    }

    #[test]
    fn capital_flat_is_single_band() {
        let mut config = config_2018_19();
        config.capital_allowance = dec!(0);
        config.allowance = dec!(0);
        let scheme = Scheme::Capital(CapitalKind::Flat { rate: dec!(0.18) });
        let working = scheme.allocate_to_tax_bands(&mut config, dec!(1000000));
        assert_eq!(working.len(), 1);
        assert_eq!(working.tax_due(), dec!(180000));
    }

    #[test]
    fn dividend_additional_maps_three_rates() {
        let mut config = config_2018_19();
        config.allowance = dec!(0);
        config.dividend_allowance = dec!(0);
        let scheme = Scheme::Dividend(DividendScheme::Additional {
            base: dec!(0.075),
            higher: dec!(0.325),
            additional: dec!(0.381),
            relief: true,
        });
        let ladder = scheme.tax_band_iterator(&config);
        assert_eq!(ladder[0].rate, dec!(0.075));
        assert_eq!(ladder[1].rate, dec!(0.325));
        assert_eq!(ladder[2].rate, dec!(0.381));
    }

    #[test]
    fn unbounded_band_absorbs_the_rest() {
        let mut config = config_2018_19();
        config.allowance = dec!(0);
        let working = Scheme::Income.allocate_to_tax_bands(&mut config, dec!(500000));
        assert_eq!(working.total_amount(), dec!(500000));
        // 34,500 @ 20% + 115,500 @ 40% + 350,000 @ 45%
        assert_eq!(working.tax_due(), dec!(6900) + dec!(46200) + dec!(157500));
    }

    #[test]
    fn allowance_pools_are_monotonic() {
        let mut config = config_2018_19();
        let before = (config.allowance, config.savings_allowance, config.dividend_allowance);
        Scheme::Income.allocate_to_tax_bands(&mut config, dec!(20000));
        Scheme::Interest(InterestScheme::LoBaseRate { rate: dec!(0.20) })
            .allocate_to_tax_bands(&mut config, dec!(3000));
        Scheme::Dividend(DividendScheme::Additional {
            base: dec!(0.075),
            higher: dec!(0.325),
            additional: dec!(0.381),
            relief: true,
        })
        .allocate_to_tax_bands(&mut config, dec!(4000));

        assert!(config.allowance <= before.0);
        assert!(config.savings_allowance <= before.1);
        assert!(config.dividend_allowance <= before.2);
    }
}
