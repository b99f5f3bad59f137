use crate::bands::TaxBands;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Rate at which an allowance is withdrawn above an income limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarginalReduction {
    /// £1 of allowance lost for every £2 of income over the limit.
    HalfOver,
    /// £2 of allowance lost for every £3 of income over the limit.
    TwoThirdsOver,
}

impl MarginalReduction {
    pub fn reduce(&self, income: Decimal, limit: Decimal) -> Decimal {
        let excess = (income - limit).max(Decimal::ZERO);
        match self {
            MarginalReduction::HalfOver => excess / dec!(2),
            MarginalReduction::TwoThirdsOver => excess * dec!(2) / dec!(3),
        }
    }
}

/// Age-related personal allowance data for one tax year.
///
/// The cutoff dates model the born-before freeze applied from 2013/14, when
/// the age allowances were closed to new cohorts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeRelief {
    pub lo: Decimal,
    pub hi: Decimal,
    pub limit: Decimal,
    /// Qualifying age for the higher allowance (80 until 1988/89, 75 after).
    pub hi_age: i32,
    pub lo_cutoff: Option<NaiveDate>,
    pub hi_cutoff: Option<NaiveDate>,
}

/// Personal savings allowance and dividend allowance, from 2016/17.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavingsRelief {
    pub savings: Decimal,
    pub dividend: Decimal,
}

/// One tax year's allowance table. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Allowances {
    pub basic: Decimal,
    pub rental: Decimal,
    pub capital: Decimal,
    pub reduction: MarginalReduction,
    pub age: Option<AgeRelief>,
    pub savings: Option<SavingsRelief>,
    /// Personal allowance withdrawal threshold (£100,000 from 2010/11),
    /// always withdrawn at £1 per £2.
    pub additional_limit: Option<Decimal>,
}

impl Allowances {
    pub fn new(
        basic: Decimal,
        rental: Decimal,
        capital: Decimal,
        reduction: MarginalReduction,
    ) -> Self {
        Allowances {
            basic,
            rental,
            capital,
            reduction,
            age: None,
            savings: None,
            additional_limit: None,
        }
    }

    pub fn with_age(mut self, age: AgeRelief) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_savings(mut self, savings: SavingsRelief) -> Self {
        self.savings = Some(savings);
        self
    }

    pub fn with_additional_limit(mut self, limit: Decimal) -> Self {
        self.additional_limit = Some(limit);
        self
    }

    /// Resolve the personal allowance for a taxpayer.
    ///
    /// Returns the allowance and whether an age-related amount survived the
    /// taper. The taper never takes the allowance below the base amount; the
    /// additional-limit withdrawal can then reduce it all the way to zero.
    pub fn allowance_for(
        &self,
        gross_taxable: Decimal,
        age: i32,
        birthday: NaiveDate,
    ) -> (Decimal, bool) {
        let mut allowance = self.basic;
        let mut age_related = false;

        if let Some(relief) = &self.age {
            let candidate = if age >= relief.hi_age && born_before(birthday, relief.hi_cutoff) {
                Some(relief.hi)
            } else if age >= 65 && born_before(birthday, relief.lo_cutoff) {
                Some(relief.lo)
            } else {
                None
            };
            if let Some(mut candidate) = candidate {
                if gross_taxable > relief.limit {
                    candidate -= self.reduction.reduce(gross_taxable, relief.limit);
                    log::debug!(
                        "age allowance tapered to {candidate} (income {gross_taxable} over limit {})",
                        relief.limit
                    );
                }
                if candidate > self.basic {
                    allowance = candidate;
                    age_related = true;
                }
            }
        }

        if let Some(limit) = self.additional_limit {
            if gross_taxable > limit {
                let withdrawn = MarginalReduction::HalfOver.reduce(gross_taxable, limit);
                allowance = (allowance - withdrawn).max(Decimal::ZERO);
                if allowance <= self.basic {
                    age_related = false;
                }
            }
        }

        (allowance, age_related)
    }

    /// Resolve the savings allowance: full within the basic-rate boundary,
    /// half within the higher-rate boundary, zero beyond. Boundaries are the
    /// standard ladder's cumulative amounts shifted up by the base allowance.
    pub fn savings_allowance_for(&self, gross_taxable: Decimal, bands: &TaxBands) -> Decimal {
        let Some(relief) = &self.savings else {
            return Decimal::ZERO;
        };

        let basic_boundary = self.basic + bands.standard.capacity_through(bands.basic_index());
        if gross_taxable <= basic_boundary {
            return relief.savings;
        }

        let higher_index = bands.basic_index() + 1;
        match bands.standard.get(higher_index) {
            Some(band) if !band.is_unbounded() => {
                let higher_boundary = self.basic + bands.standard.capacity_through(higher_index);
                if gross_taxable <= higher_boundary {
                    relief.savings / dec!(2)
                } else {
                    Decimal::ZERO
                }
            }
            _ => relief.savings / dec!(2),
        }
    }

    /// The dividend allowance is a flat year constant, bracket-independent.
    pub fn dividend_allowance(&self) -> Decimal {
        self.savings.map_or(Decimal::ZERO, |s| s.dividend)
    }
}

fn born_before(birthday: NaiveDate, cutoff: Option<NaiveDate>) -> bool {
    cutoff.is_none_or(|c| birthday < c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::{TaxBand, TaxBandSet};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bands_2016_17() -> TaxBands {
        TaxBands::new(
            TaxBandSet::new(vec![
                TaxBand::new(dec!(32000), dec!(0.20)),
                TaxBand::new(dec!(118000), dec!(0.40)),
                TaxBand::unbounded(dec!(0.45)),
            ]),
            false,
            Some(TaxBand::new(dec!(5000), dec!(0))),
        )
    }

    fn aged(basic: Decimal) -> Allowances {
        Allowances::new(basic, dec!(0), dec!(0), MarginalReduction::HalfOver).with_age(AgeRelief {
            lo: dec!(10500),
            hi: dec!(10660),
            limit: dec!(26100),
            hi_age: 75,
            lo_cutoff: None,
            hi_cutoff: None,
        })
    }

    #[test]
    fn half_over_reduction() {
        let r = MarginalReduction::HalfOver;
        assert_eq!(r.reduce(dec!(28100), dec!(26100)), dec!(1000));
        assert_eq!(r.reduce(dec!(20000), dec!(26100)), dec!(0));
    }

    #[test]
    fn two_thirds_over_reduction() {
        let r = MarginalReduction::TwoThirdsOver;
        assert_eq!(r.reduce(dec!(6200), dec!(5900)), dec!(200));
    }

    #[test]
    fn under_65_gets_base_allowance() {
        let (allowance, age_related) = aged(dec!(9440)).allowance_for(
            dec!(20000),
            60,
            date(1953, 6, 1),
        );
        assert_eq!(allowance, dec!(9440));
        assert!(!age_related);
    }

    #[test]
    fn age_bands_select_lo_and_hi() {
        let allowances = aged(dec!(9440));
        let (lo, _) = allowances.allowance_for(dec!(20000), 68, date(1945, 6, 1));
        assert_eq!(lo, dec!(10500));
        let (hi, _) = allowances.allowance_for(dec!(20000), 80, date(1933, 6, 1));
        assert_eq!(hi, dec!(10660));
    }

    #[test]
    fn taper_never_drops_below_base() {
        // 9440 base, 10500 age: fully withdrawn once income is 2120 over the
        // limit, and any further excess must not bite into the base amount.
        let allowances = aged(dec!(9440));
        let (allowance, age_related) = allowances.allowance_for(dec!(60000), 68, date(1945, 6, 1));
        assert_eq!(allowance, dec!(9440));
        assert!(!age_related);
    }

    #[test]
    fn partial_taper_flags_age_relief() {
        let allowances = aged(dec!(9440));
        // 1000 over the limit withdraws 500 of the 1060 age uplift
        let (allowance, age_related) = allowances.allowance_for(dec!(27100), 68, date(1945, 6, 1));
        assert_eq!(allowance, dec!(10000));
        assert!(age_related);
    }

    #[test]
    fn cohort_cutoff_excludes_younger_birthdays() {
        let mut allowances = aged(dec!(9440));
        let relief = allowances.age.as_mut().unwrap();
        relief.lo_cutoff = Some(date(1948, 4, 6));
        relief.hi_cutoff = Some(date(1938, 4, 6));

        // 65 but born after the freeze date: base allowance only
        let (allowance, _) = allowances.allowance_for(dec!(20000), 65, date(1948, 7, 1));
        assert_eq!(allowance, dec!(9440));

        // born before the lo cutoff still qualifies
        let (allowance, _) = allowances.allowance_for(dec!(20000), 66, date(1947, 7, 1));
        assert_eq!(allowance, dec!(10500));
    }

    #[test]
    fn additional_limit_withdraws_to_zero() {
        let allowances = Allowances::new(dec!(12570), dec!(0), dec!(0), MarginalReduction::HalfOver)
            .with_additional_limit(dec!(100000));
        let (allowance, _) = allowances.allowance_for(dec!(110000), 40, date(1985, 1, 1));
        assert_eq!(allowance, dec!(7570));
        let (allowance, _) = allowances.allowance_for(dec!(130000), 40, date(1985, 1, 1));
        assert_eq!(allowance, dec!(0));
    }

    #[test]
    fn savings_allowance_tiers() {
        let allowances = Allowances::new(dec!(11000), dec!(0), dec!(0), MarginalReduction::HalfOver)
            .with_savings(SavingsRelief {
                savings: dec!(1000),
                dividend: dec!(5000),
            });
        let bands = bands_2016_17();

        // basic boundary 43,000; higher boundary 161,000
        assert_eq!(allowances.savings_allowance_for(dec!(30000), &bands), dec!(1000));
        assert_eq!(allowances.savings_allowance_for(dec!(43000), &bands), dec!(1000));
        assert_eq!(allowances.savings_allowance_for(dec!(60000), &bands), dec!(500));
        assert_eq!(allowances.savings_allowance_for(dec!(200000), &bands), dec!(0));
    }

    #[test]
    fn no_savings_relief_means_zero() {
        let allowances = Allowances::new(dec!(6475), dec!(0), dec!(0), MarginalReduction::HalfOver);
        assert_eq!(
            allowances.savings_allowance_for(dec!(10000), &bands_2016_17()),
            dec!(0)
        );
        assert_eq!(allowances.dividend_allowance(), dec!(0));
    }
}
