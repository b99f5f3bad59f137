use crate::allowances::Allowances;
use crate::analysis::{SlicedTaxDueBucket, TaxAnalysis, TaxBucket, TaxDueBucket};
use crate::bands::TaxBands;
use crate::basis::{TaxBasis, TaxSource};
use crate::config::TaxConfig;
use crate::scheme::{CapitalScheme, DividendScheme, InterestScheme, Scheme};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

/// Peer-to-peer interest first became reportable in 2016/17.
const FIRST_PEER_TO_PEER_YEAR: i32 = 2017;

/// One tax year's complete ruleset: allowance table, rate ladder and the
/// scheme variants in force. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxYear {
    /// 5 April of the calendar year the tax year ends in.
    pub year_end: NaiveDate,
    pub allowances: Allowances,
    pub bands: TaxBands,
    pub interest: InterestScheme,
    pub dividend: DividendScheme,
    pub capital: CapitalScheme,
}

impl TaxYear {
    /// Calendar year of the end date (2019 for the 2018/19 year).
    pub fn year(&self) -> i32 {
        self.year_end.year()
    }

    /// 6 April of the previous calendar year.
    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year() - 1, 4, 6).expect("6 April always exists")
    }

    /// Display as "2018/19".
    pub fn display(&self) -> String {
        format!("{}/{:02}", self.year() - 1, self.year() % 100)
    }

    /// The scheme taxing one basis category in this year.
    pub fn scheme_for(&self, basis: TaxBasis) -> Scheme {
        match basis {
            TaxBasis::Salary | TaxBasis::RentalIncome | TaxBasis::OtherIncome => Scheme::Income,
            TaxBasis::RoomRental => Scheme::RoomRental,
            TaxBasis::TaxedInterest
            | TaxBasis::UntaxedInterest
            | TaxBasis::PeerToPeerInterest => Scheme::Interest(self.interest),
            TaxBasis::Dividend | TaxBasis::UnitTrustDividend | TaxBasis::ForeignDividend => {
                Scheme::Dividend(self.dividend)
            }
            TaxBasis::ChargeableGains => Scheme::ChargeableGains,
            TaxBasis::ResidentialCapitalGains | TaxBasis::CapitalGains => {
                Scheme::Capital(self.capital.kind_for(basis))
            }
        }
    }

    /// The legally mandated processing order: earned income first, then
    /// savings, then dividends, gains last. Allowances and band capacity are
    /// shared, so the order changes the result.
    fn processing_order(&self) -> Vec<TaxBasis> {
        let mut order = vec![
            TaxBasis::Salary,
            TaxBasis::RentalIncome,
            TaxBasis::RoomRental,
            TaxBasis::OtherIncome,
            TaxBasis::TaxedInterest,
            TaxBasis::UntaxedInterest,
        ];
        if self.year() >= FIRST_PEER_TO_PEER_YEAR {
            order.push(TaxBasis::PeerToPeerInterest);
        }
        order.extend([
            TaxBasis::Dividend,
            TaxBasis::UnitTrustDividend,
            TaxBasis::ForeignDividend,
            TaxBasis::ChargeableGains,
            TaxBasis::ResidentialCapitalGains,
            TaxBasis::CapitalGains,
        ]);
        order
    }

    /// Compute the full liability for one taxpayer and year.
    ///
    /// `tax_paid` is the credit for tax already deducted at source,
    /// sign-adjusted by the caller.
    pub fn analyse(
        &self,
        source: &dyn TaxSource,
        birthday: NaiveDate,
        tax_paid: Decimal,
    ) -> TaxAnalysis {
        let mut config = TaxConfig::new(self, source, birthday);
        let mut buckets = Vec::new();

        for basis in self.processing_order() {
            let amount = source.amount_for_basis(basis);
            if amount <= Decimal::ZERO {
                continue;
            }
            let scheme = self.scheme_for(basis);
            let snapshot = config.clone();
            let bands = scheme.allocate_to_tax_bands(&mut config, amount);
            let bucket = TaxDueBucket::new(basis, bands, snapshot);
            buckets.push(self.slice_if_chargeable(source, scheme, bucket));
        }

        let mut analysis = TaxAnalysis::new(self.year_end, config, buckets, tax_paid);
        analysis.calculate_tax_due();
        analysis.calculate_tax_profit();
        analysis
    }

    /// A chargeable-gains bucket spilling over more than one charged band
    /// qualifies for top-slicing: re-allocate the slice total against the
    /// band capacities the real gain saw (the pre-allocation snapshot).
    fn slice_if_chargeable(
        &self,
        source: &dyn TaxSource,
        scheme: Scheme,
        bucket: TaxDueBucket,
    ) -> TaxBucket {
        if bucket.basis != TaxBasis::ChargeableGains || bucket.bands.charged_band_count() <= 1 {
            return TaxBucket::Standard(bucket);
        }
        let events = source.chargeable_events();
        let total_slices: Decimal = events.iter().map(|e| e.slice).sum();
        if total_slices <= Decimal::ZERO {
            return TaxBucket::Standard(bucket);
        }
        let mut slice_config = bucket.config.clone();
        let slice_bands = scheme.allocate_to_tax_bands(&mut slice_config, total_slices);
        TaxBucket::Sliced(SlicedTaxDueBucket::new(bucket, &events, slice_bands))
    }
}
