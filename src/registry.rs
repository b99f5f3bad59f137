//! The historical rule tables, one [`TaxYear`] per year ending 5 April 1981
//! through 5 April 2025. Process-wide, read-only, built once.

use crate::allowances::{AgeRelief, Allowances, MarginalReduction, SavingsRelief};
use crate::bands::{TaxBand, TaxBands, TaxBandSet};
use crate::scheme::{CapitalRates, CapitalScheme, DividendScheme, InterestScheme};
use crate::year::TaxYear;
use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::ops::RangeInclusive;

lazy_static! {
    static ref TAX_YEARS: Vec<TaxYear> = build_years();
}

/// The tax year whose 6 April to 5 April window contains `date`.
pub fn find_tax_year_for_date(date: NaiveDate) -> Option<&'static TaxYear> {
    let start = NaiveDate::from_ymd_opt(date.year(), 4, 6).expect("6 April always exists");
    let end_year = if date >= start {
        date.year() + 1
    } else {
        date.year()
    };
    TAX_YEARS.iter().find(|y| y.year() == end_year)
}

/// The tax year covering the range's end date.
pub fn find_tax_year_for_range(range: &RangeInclusive<NaiveDate>) -> Option<&'static TaxYear> {
    find_tax_year_for_date(*range.end())
}

/// All supported years, oldest first.
pub fn tax_years() -> &'static [TaxYear] {
    &TAX_YEARS
}

fn apr5(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 4, 5).expect("5 April always exists")
}

fn band(amount: Decimal, rate: Decimal) -> TaxBand {
    TaxBand::new(amount, rate)
}

fn top(rate: Decimal) -> TaxBand {
    TaxBand::unbounded(rate)
}

fn ladder(bands: Vec<TaxBand>) -> TaxBandSet {
    TaxBandSet::new(bands)
}

/// Rent-a-room relief, introduced 1992/93.
fn rental_for(end: i32) -> Decimal {
    match end {
        ..=1992 => dec!(0),
        1993..=1997 => dec!(3250),
        1998..=2016 => dec!(4250),
        _ => dec!(7500),
    }
}

/// The age allowance taper moved from two-thirds to half withdrawal in
/// 1989/90.
fn reduction_for(end: i32) -> MarginalReduction {
    if end <= 1989 {
        MarginalReduction::TwoThirdsOver
    } else {
        MarginalReduction::HalfOver
    }
}

fn interest_for(end: i32) -> InterestScheme {
    match end {
        ..=1996 => InterestScheme::AsIncome,
        1997..=2008 => InterestScheme::BaseRate { rate: dec!(0.20) },
        _ => InterestScheme::LoBaseRate { rate: dec!(0.20) },
    }
}

fn dividend_for(end: i32) -> DividendScheme {
    match end {
        ..=1993 => DividendScheme::AsIncome,
        // lower-rate dividends alongside the standard higher band
        1994..=1999 => DividendScheme::Base { rate: dec!(0.20) },
        // tax-credit era: 10% ordinary, 32.5% upper
        2000..=2008 => DividendScheme::LoHigher {
            base: dec!(0.10),
            higher: dec!(0.325),
        },
        2009..=2010 => DividendScheme::Higher {
            base: dec!(0.10),
            higher: dec!(0.325),
        },
        2011..=2013 => DividendScheme::Additional {
            base: dec!(0.10),
            higher: dec!(0.325),
            additional: dec!(0.425),
            relief: false,
        },
        2014..=2016 => DividendScheme::Additional {
            base: dec!(0.10),
            higher: dec!(0.325),
            additional: dec!(0.375),
            relief: false,
        },
        // dividend allowance era
        2017..=2022 => DividendScheme::Additional {
            base: dec!(0.075),
            higher: dec!(0.325),
            additional: dec!(0.381),
            relief: true,
        },
        _ => DividendScheme::Additional {
            base: dec!(0.0875),
            higher: dec!(0.3375),
            additional: dec!(0.3935),
            relief: true,
        },
    }
}

fn capital_for(end: i32) -> CapitalScheme {
    match end {
        ..=1988 => CapitalScheme::Flat { rate: dec!(0.30) },
        // gains stacked on income at income rates
        1989..=2008 => CapitalScheme::AsIncome,
        2009..=2010 => CapitalScheme::Flat { rate: dec!(0.18) },
        2011..=2016 => CapitalScheme::Split(CapitalRates {
            base: dec!(0.18),
            higher: dec!(0.28),
        }),
        2017..=2024 => CapitalScheme::Residential {
            general: CapitalRates {
                base: dec!(0.10),
                higher: dec!(0.20),
            },
            residential: CapitalRates {
                base: dec!(0.18),
                higher: dec!(0.28),
            },
        },
        _ => CapitalScheme::Residential {
            general: CapitalRates {
                base: dec!(0.10),
                higher: dec!(0.20),
            },
            residential: CapitalRates {
                base: dec!(0.18),
                higher: dec!(0.24),
            },
        },
    }
}

fn tax_year(end: i32, allowances: Allowances, bands: TaxBands) -> TaxYear {
    TaxYear {
        year_end: apr5(end),
        allowances,
        bands,
        interest: interest_for(end),
        dividend: dividend_for(end),
        capital: capital_for(end),
    }
}

/// A single age allowance (the 65+/80+ split arrived in 1987/88).
fn age(lo: Decimal, hi: Decimal, limit: Decimal, hi_age: i32) -> AgeRelief {
    AgeRelief {
        lo,
        hi,
        limit,
        hi_age,
        lo_cutoff: None,
        hi_cutoff: None,
    }
}

/// Age allowances frozen to the pre-2013 cohorts (born before 6 April 1948
/// for the lower amount, 6 April 1938 for the higher).
fn frozen_age(lo: Decimal, hi: Decimal, limit: Decimal) -> AgeRelief {
    AgeRelief {
        lo,
        hi,
        limit,
        hi_age: 75,
        lo_cutoff: NaiveDate::from_ymd_opt(1948, 4, 6),
        hi_cutoff: NaiveDate::from_ymd_opt(1938, 4, 6),
    }
}

fn allowances(end: i32, basic: Decimal, capital: Decimal) -> Allowances {
    Allowances::new(basic, rental_for(end), capital, reduction_for(end))
}

/// The pre-1988 surtax-style ladder: a wide basic band then 40% to 60% in
/// steps.
fn surtax_bands(basic: Decimal, steps: [Decimal; 4], first_rate: Decimal) -> TaxBands {
    TaxBands::new(
        ladder(vec![
            band(basic, first_rate),
            band(steps[0], dec!(0.40)),
            band(steps[1], dec!(0.45)),
            band(steps[2], dec!(0.50)),
            band(steps[3], dec!(0.55)),
            top(dec!(0.60)),
        ]),
        false,
        None,
    )
}

/// Two-band ladder of the 1988-1992 reform years.
fn two_bands(basic: Decimal) -> TaxBands {
    TaxBands::new(
        ladder(vec![band(basic, dec!(0.25)), top(dec!(0.40))]),
        false,
        None,
    )
}

/// Low band plus basic band, 1992/93 to 2007/08.
fn low_bands(low: Decimal, low_rate: Decimal, basic: Decimal, basic_rate: Decimal) -> TaxBands {
    TaxBands::new(
        ladder(vec![
            band(low, low_rate),
            band(basic, basic_rate),
            top(dec!(0.40)),
        ]),
        true,
        None,
    )
}

/// 20/40 ladder with a savings-only starting band, 2008/09 and 2009/10.
fn savings_band_years(basic: Decimal, low_savings: Decimal) -> TaxBands {
    TaxBands::new(
        ladder(vec![band(basic, dec!(0.20)), top(dec!(0.40))]),
        false,
        Some(band(low_savings, dec!(0.10))),
    )
}

/// Three-band ladder of the additional-rate era, 2010/11 onwards.
fn additional_bands(
    basic: Decimal,
    higher: Decimal,
    additional_rate: Decimal,
    low_savings: TaxBand,
) -> TaxBands {
    TaxBands::new(
        ladder(vec![
            band(basic, dec!(0.20)),
            band(higher, dec!(0.40)),
            top(additional_rate),
        ]),
        false,
        Some(low_savings),
    )
}

fn build_years() -> Vec<TaxYear> {
    vec![
        // 1980/81 and 1981/82: allowances frozen
        tax_year(
            1981,
            allowances(1981, dec!(1375), dec!(3000))
                .with_age(age(dec!(1820), dec!(1820), dec!(5900), 75)),
            surtax_bands(
                dec!(11250),
                [dec!(2000), dec!(3500), dec!(3000), dec!(6000)],
                dec!(0.30),
            ),
        ),
        tax_year(
            1982,
            allowances(1982, dec!(1375), dec!(3000))
                .with_age(age(dec!(1820), dec!(1820), dec!(5900), 75)),
            surtax_bands(
                dec!(11250),
                [dec!(2000), dec!(3500), dec!(3000), dec!(6000)],
                dec!(0.30),
            ),
        ),
        tax_year(
            1983,
            allowances(1983, dec!(1565), dec!(5000))
                .with_age(age(dec!(2070), dec!(2070), dec!(6700), 75)),
            surtax_bands(
                dec!(12800),
                [dec!(2300), dec!(4000), dec!(6200), dec!(6200)],
                dec!(0.30),
            ),
        ),
        tax_year(
            1984,
            allowances(1984, dec!(1785), dec!(5300))
                .with_age(age(dec!(2360), dec!(2360), dec!(7600), 75)),
            surtax_bands(
                dec!(14600),
                [dec!(2600), dec!(4600), dec!(7100), dec!(7100)],
                dec!(0.30),
            ),
        ),
        tax_year(
            1985,
            allowances(1985, dec!(2005), dec!(5600))
                .with_age(age(dec!(2490), dec!(2490), dec!(8100), 75)),
            surtax_bands(
                dec!(15400),
                [dec!(2800), dec!(4900), dec!(7500), dec!(7500)],
                dec!(0.30),
            ),
        ),
        tax_year(
            1986,
            allowances(1986, dec!(2205), dec!(5900))
                .with_age(age(dec!(2690), dec!(2690), dec!(8800), 75)),
            surtax_bands(
                dec!(16200),
                [dec!(3000), dec!(5200), dec!(7900), dec!(7900)],
                dec!(0.30),
            ),
        ),
        tax_year(
            1987,
            allowances(1987, dec!(2335), dec!(6300))
                .with_age(age(dec!(2850), dec!(2850), dec!(9400), 75)),
            surtax_bands(
                dec!(17200),
                [dec!(3000), dec!(5200), dec!(7900), dec!(7900)],
                dec!(0.29),
            ),
        ),
        // 1987/88 split the age allowance at 80
        tax_year(
            1988,
            allowances(1988, dec!(2425), dec!(6600))
                .with_age(age(dec!(2960), dec!(3070), dec!(9800), 80)),
            surtax_bands(
                dec!(17900),
                [dec!(2500), dec!(5000), dec!(7900), dec!(7900)],
                dec!(0.27),
            ),
        ),
        // 1988/89 reform: two bands, gains taxed as income
        tax_year(
            1989,
            allowances(1989, dec!(2605), dec!(5000))
                .with_age(age(dec!(3180), dec!(3310), dec!(10600), 80)),
            two_bands(dec!(19300)),
        ),
        // 1989/90 moved the higher age allowance to 75
        tax_year(
            1990,
            allowances(1990, dec!(2785), dec!(5000))
                .with_age(age(dec!(3400), dec!(3540), dec!(11300), 75)),
            two_bands(dec!(20700)),
        ),
        tax_year(
            1991,
            allowances(1991, dec!(3005), dec!(5000))
                .with_age(age(dec!(3670), dec!(3820), dec!(12300), 75)),
            two_bands(dec!(20700)),
        ),
        tax_year(
            1992,
            allowances(1992, dec!(3295), dec!(5500))
                .with_age(age(dec!(4020), dec!(4180), dec!(13500), 75)),
            two_bands(dec!(23700)),
        ),
        // 1992/93 introduced the 20% lower band and rent-a-room relief
        tax_year(
            1993,
            allowances(1993, dec!(3445), dec!(5800))
                .with_age(age(dec!(4200), dec!(4370), dec!(14200), 75)),
            low_bands(dec!(2000), dec!(0.20), dec!(21700), dec!(0.25)),
        ),
        tax_year(
            1994,
            allowances(1994, dec!(3445), dec!(5800))
                .with_age(age(dec!(4200), dec!(4370), dec!(14200), 75)),
            low_bands(dec!(2500), dec!(0.20), dec!(21200), dec!(0.25)),
        ),
        tax_year(
            1995,
            allowances(1995, dec!(3445), dec!(5800))
                .with_age(age(dec!(4200), dec!(4370), dec!(14200), 75)),
            low_bands(dec!(3000), dec!(0.20), dec!(20700), dec!(0.25)),
        ),
        tax_year(
            1996,
            allowances(1996, dec!(3525), dec!(6000))
                .with_age(age(dec!(4630), dec!(4800), dec!(14600), 75)),
            low_bands(dec!(3200), dec!(0.20), dec!(21100), dec!(0.25)),
        ),
        tax_year(
            1997,
            allowances(1997, dec!(3765), dec!(6300))
                .with_age(age(dec!(4910), dec!(5090), dec!(15200), 75)),
            low_bands(dec!(3900), dec!(0.20), dec!(21600), dec!(0.24)),
        ),
        tax_year(
            1998,
            allowances(1998, dec!(4045), dec!(6500))
                .with_age(age(dec!(5220), dec!(5400), dec!(15600), 75)),
            low_bands(dec!(4100), dec!(0.20), dec!(22000), dec!(0.23)),
        ),
        tax_year(
            1999,
            allowances(1999, dec!(4195), dec!(6800))
                .with_age(age(dec!(5410), dec!(5600), dec!(16200), 75)),
            low_bands(dec!(4300), dec!(0.20), dec!(22800), dec!(0.23)),
        ),
        // 1999/2000: 10% starting rate
        tax_year(
            2000,
            allowances(2000, dec!(4335), dec!(7100))
                .with_age(age(dec!(5720), dec!(5980), dec!(16800), 75)),
            low_bands(dec!(1500), dec!(0.10), dec!(26500), dec!(0.23)),
        ),
        tax_year(
            2001,
            allowances(2001, dec!(4385), dec!(7200))
                .with_age(age(dec!(5790), dec!(6050), dec!(17000), 75)),
            low_bands(dec!(1520), dec!(0.10), dec!(26880), dec!(0.22)),
        ),
        tax_year(
            2002,
            allowances(2002, dec!(4535), dec!(7500))
                .with_age(age(dec!(5990), dec!(6260), dec!(17600), 75)),
            low_bands(dec!(1880), dec!(0.10), dec!(27520), dec!(0.22)),
        ),
        tax_year(
            2003,
            allowances(2003, dec!(4615), dec!(7700))
                .with_age(age(dec!(6100), dec!(6370), dec!(17900), 75)),
            low_bands(dec!(1920), dec!(0.10), dec!(27980), dec!(0.22)),
        ),
        tax_year(
            2004,
            allowances(2004, dec!(4615), dec!(7900))
                .with_age(age(dec!(6610), dec!(6720), dec!(18300), 75)),
            low_bands(dec!(1960), dec!(0.10), dec!(28540), dec!(0.22)),
        ),
        tax_year(
            2005,
            allowances(2005, dec!(4745), dec!(8200))
                .with_age(age(dec!(6830), dec!(6950), dec!(18900), 75)),
            low_bands(dec!(2020), dec!(0.10), dec!(29380), dec!(0.22)),
        ),
        tax_year(
            2006,
            allowances(2006, dec!(4895), dec!(8500))
                .with_age(age(dec!(7090), dec!(7220), dec!(19500), 75)),
            low_bands(dec!(2090), dec!(0.10), dec!(30310), dec!(0.22)),
        ),
        tax_year(
            2007,
            allowances(2007, dec!(5035), dec!(8800))
                .with_age(age(dec!(7280), dec!(7420), dec!(20100), 75)),
            low_bands(dec!(2150), dec!(0.10), dec!(31150), dec!(0.22)),
        ),
        tax_year(
            2008,
            allowances(2008, dec!(5225), dec!(9200))
                .with_age(age(dec!(7550), dec!(7690), dec!(20900), 75)),
            low_bands(dec!(2230), dec!(0.10), dec!(32370), dec!(0.22)),
        ),
        // 2008/09: starting rate restricted to savings
        tax_year(
            2009,
            allowances(2009, dec!(6035), dec!(9600))
                .with_age(age(dec!(9030), dec!(9180), dec!(21800), 75)),
            savings_band_years(dec!(34800), dec!(2320)),
        ),
        tax_year(
            2010,
            allowances(2010, dec!(6475), dec!(10100))
                .with_age(age(dec!(9490), dec!(9640), dec!(22900), 75)),
            savings_band_years(dec!(37400), dec!(2440)),
        ),
        // 2010/11: 50% additional rate and the 100,000 allowance withdrawal
        tax_year(
            2011,
            allowances(2011, dec!(6475), dec!(10100))
                .with_age(age(dec!(9490), dec!(9640), dec!(22900), 75))
                .with_additional_limit(dec!(100000)),
            additional_bands(
                dec!(37400),
                dec!(112600),
                dec!(0.50),
                band(dec!(2440), dec!(0.10)),
            ),
        ),
        tax_year(
            2012,
            allowances(2012, dec!(7475), dec!(10600))
                .with_age(age(dec!(9940), dec!(10090), dec!(24000), 75))
                .with_additional_limit(dec!(100000)),
            additional_bands(
                dec!(35000),
                dec!(115000),
                dec!(0.50),
                band(dec!(2560), dec!(0.10)),
            ),
        ),
        tax_year(
            2013,
            allowances(2013, dec!(8105), dec!(10600))
                .with_age(age(dec!(10500), dec!(10660), dec!(25400), 75))
                .with_additional_limit(dec!(100000)),
            additional_bands(
                dec!(34370),
                dec!(115630),
                dec!(0.50),
                band(dec!(2710), dec!(0.10)),
            ),
        ),
        // 2013/14: age allowances frozen to the pre-2013 cohorts, 45% top rate
        tax_year(
            2014,
            allowances(2014, dec!(9440), dec!(10900))
                .with_age(frozen_age(dec!(10500), dec!(10660), dec!(26100)))
                .with_additional_limit(dec!(100000)),
            additional_bands(
                dec!(32010),
                dec!(117990),
                dec!(0.45),
                band(dec!(2790), dec!(0.10)),
            ),
        ),
        tax_year(
            2015,
            allowances(2015, dec!(10000), dec!(11000))
                .with_age(frozen_age(dec!(10500), dec!(10660), dec!(27000)))
                .with_additional_limit(dec!(100000)),
            additional_bands(
                dec!(31865),
                dec!(118135),
                dec!(0.45),
                band(dec!(2880), dec!(0.10)),
            ),
        ),
        // 2015/16: 0% starting savings rate; lower age allowance overtaken
        tax_year(
            2016,
            allowances(2016, dec!(10600), dec!(11100))
                .with_age(frozen_age(dec!(10600), dec!(10660), dec!(27700)))
                .with_additional_limit(dec!(100000)),
            additional_bands(
                dec!(31785),
                dec!(118215),
                dec!(0.45),
                band(dec!(5000), dec!(0)),
            ),
        ),
        // 2016/17: savings and dividend allowances replace the age system
        tax_year(
            2017,
            allowances(2017, dec!(11000), dec!(11100))
                .with_savings(SavingsRelief {
                    savings: dec!(1000),
                    dividend: dec!(5000),
                })
                .with_additional_limit(dec!(100000)),
            additional_bands(
                dec!(32000),
                dec!(118000),
                dec!(0.45),
                band(dec!(5000), dec!(0)),
            ),
        ),
        tax_year(
            2018,
            allowances(2018, dec!(11500), dec!(11300))
                .with_savings(SavingsRelief {
                    savings: dec!(1000),
                    dividend: dec!(5000),
                })
                .with_additional_limit(dec!(100000)),
            additional_bands(
                dec!(33500),
                dec!(116500),
                dec!(0.45),
                band(dec!(5000), dec!(0)),
            ),
        ),
        tax_year(
            2019,
            allowances(2019, dec!(11850), dec!(11700))
                .with_savings(SavingsRelief {
                    savings: dec!(1000),
                    dividend: dec!(2000),
                })
                .with_additional_limit(dec!(100000)),
            additional_bands(
                dec!(34500),
                dec!(115500),
                dec!(0.45),
                band(dec!(5000), dec!(0)),
            ),
        ),
        tax_year(
            2020,
            allowances(2020, dec!(12500), dec!(12000))
                .with_savings(SavingsRelief {
                    savings: dec!(1000),
                    dividend: dec!(2000),
                })
                .with_additional_limit(dec!(100000)),
            additional_bands(
                dec!(37500),
                dec!(112500),
                dec!(0.45),
                band(dec!(5000), dec!(0)),
            ),
        ),
        tax_year(
            2021,
            allowances(2021, dec!(12500), dec!(12300))
                .with_savings(SavingsRelief {
                    savings: dec!(1000),
                    dividend: dec!(2000),
                })
                .with_additional_limit(dec!(100000)),
            additional_bands(
                dec!(37500),
                dec!(112500),
                dec!(0.45),
                band(dec!(5000), dec!(0)),
            ),
        ),
        tax_year(
            2022,
            allowances(2022, dec!(12570), dec!(12300))
                .with_savings(SavingsRelief {
                    savings: dec!(1000),
                    dividend: dec!(2000),
                })
                .with_additional_limit(dec!(100000)),
            additional_bands(
                dec!(37700),
                dec!(112300),
                dec!(0.45),
                band(dec!(5000), dec!(0)),
            ),
        ),
        tax_year(
            2023,
            allowances(2023, dec!(12570), dec!(12300))
                .with_savings(SavingsRelief {
                    savings: dec!(1000),
                    dividend: dec!(2000),
                })
                .with_additional_limit(dec!(100000)),
            additional_bands(
                dec!(37700),
                dec!(112300),
                dec!(0.45),
                band(dec!(5000), dec!(0)),
            ),
        ),
        // 2023/24: additional-rate threshold cut to 125,140
        tax_year(
            2024,
            allowances(2024, dec!(12570), dec!(6000))
                .with_savings(SavingsRelief {
                    savings: dec!(1000),
                    dividend: dec!(1000),
                })
                .with_additional_limit(dec!(100000)),
            additional_bands(
                dec!(37700),
                dec!(87440),
                dec!(0.45),
                band(dec!(5000), dec!(0)),
            ),
        ),
        tax_year(
            2025,
            allowances(2025, dec!(12570), dec!(3000))
                .with_savings(SavingsRelief {
                    savings: dec!(1000),
                    dividend: dec!(500),
                })
                .with_additional_limit(dec!(100000)),
            additional_bands(
                dec!(37700),
                dec!(87440),
                dec!(0.45),
                band(dec!(5000), dec!(0)),
            ),
        ),
    ]
}
