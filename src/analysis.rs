use crate::bands::TaxBandSet;
use crate::basis::{GainEvent, TaxBasis};
use crate::config::TaxConfig;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// No tax year covers the requested date.
///
/// Recoverable: the caller should surface the year as unsupported. Corrupted
/// rule tables, by contrast, panic at construction.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TaxError {
    #[error("no tax year found for date: {0}")]
    UnsupportedYear(NaiveDate),
}

/// The result of taxing one basis category.
///
/// `config` is the snapshot frozen before this category consumed the shared
/// pools, so reporting can show what the category had available.
#[derive(Debug, Clone)]
pub struct TaxDueBucket {
    pub basis: TaxBasis,
    pub bands: TaxBandSet,
    pub config: TaxConfig,
}

impl TaxDueBucket {
    pub fn new(basis: TaxBasis, bands: TaxBandSet, config: TaxConfig) -> Self {
        TaxDueBucket {
            basis,
            bands,
            config,
        }
    }

    pub fn tax_due(&self) -> Decimal {
        self.bands.tax_due()
    }

    pub fn taxable_income(&self) -> Decimal {
        self.bands.taxable_income()
    }
}

/// Chargeable-gains bucket with top-slicing relief applied.
///
/// The slice allocation runs against the same remaining band capacities the
/// real gain saw, then the slice tax is scaled back up by the gains/slices
/// ratio. The relief is the difference against the unsliced tax and is
/// deliberately not clamped at zero.
#[derive(Debug, Clone)]
pub struct SlicedTaxDueBucket {
    pub bucket: TaxDueBucket,
    pub total_gains: Decimal,
    pub total_slices: Decimal,
    pub ratio: Decimal,
    pub slice_bands: TaxBandSet,
}

impl SlicedTaxDueBucket {
    pub fn new(bucket: TaxDueBucket, events: &[GainEvent], slice_bands: TaxBandSet) -> Self {
        let total_gains: Decimal = events.iter().map(|e| e.gain).sum();
        let total_slices: Decimal = events.iter().map(|e| e.slice).sum();
        assert!(
            total_slices > Decimal::ZERO,
            "cannot slice a bucket with no slice total"
        );
        let ratio = total_gains / total_slices;
        log::debug!(
            "slicing {}: gains {total_gains}, slices {total_slices}, ratio {ratio}",
            bucket.basis
        );
        SlicedTaxDueBucket {
            bucket,
            total_gains,
            total_slices,
            ratio,
            slice_bands,
        }
    }

    /// Slice tax scaled back to the full gain.
    pub fn nett_tax_due(&self) -> Decimal {
        self.slice_bands.tax_due() * self.ratio
    }

    /// Saving from slicing against the unsliced tax.
    pub fn tax_relief(&self) -> Decimal {
        self.bucket.tax_due() - self.nett_tax_due()
    }
}

/// A per-basis result, sliced or not.
#[derive(Debug, Clone)]
pub enum TaxBucket {
    Standard(TaxDueBucket),
    Sliced(SlicedTaxDueBucket),
}

impl TaxBucket {
    pub fn basis(&self) -> TaxBasis {
        match self {
            TaxBucket::Standard(b) => b.basis,
            TaxBucket::Sliced(s) => s.bucket.basis,
        }
    }

    pub fn taxable_income(&self) -> Decimal {
        match self {
            TaxBucket::Standard(b) => b.taxable_income(),
            TaxBucket::Sliced(s) => s.bucket.taxable_income(),
        }
    }

    /// Tax charged by the bucket's own bands, before slicing relief.
    pub fn tax_due(&self) -> Decimal {
        match self {
            TaxBucket::Standard(b) => b.tax_due(),
            TaxBucket::Sliced(s) => s.bucket.tax_due(),
        }
    }

    pub fn tax_relief(&self) -> Decimal {
        match self {
            TaxBucket::Standard(_) => Decimal::ZERO,
            TaxBucket::Sliced(s) => s.tax_relief(),
        }
    }
}

/// CSV record for one bucket of the analysis.
#[derive(Debug, Serialize, Deserialize)]
pub struct BucketCsvRecord {
    pub basis: String,
    pub taxable_income: String,
    pub tax_due: String,
    pub tax_relief: String,
}

impl From<&TaxBucket> for BucketCsvRecord {
    fn from(bucket: &TaxBucket) -> Self {
        BucketCsvRecord {
            basis: bucket.basis().to_string(),
            taxable_income: bucket.taxable_income().round_dp(2).to_string(),
            tax_due: bucket.tax_due().round_dp(2).to_string(),
            tax_relief: bucket.tax_relief().round_dp(2).to_string(),
        }
    }
}

/// The complete result of one analysis: the end-state config, the buckets
/// in processing order and the aggregated totals.
#[derive(Debug, Clone)]
pub struct TaxAnalysis {
    pub year_end: NaiveDate,
    /// The working state after every category was processed: what remains of
    /// the allowance pools and band capacities.
    pub config: TaxConfig,
    buckets: Vec<TaxBucket>,
    pub taxable_income: Decimal,
    pub tax_due: Decimal,
    pub tax_paid: Decimal,
    pub tax_profit: Decimal,
}

impl TaxAnalysis {
    pub(crate) fn new(
        year_end: NaiveDate,
        config: TaxConfig,
        buckets: Vec<TaxBucket>,
        tax_paid: Decimal,
    ) -> Self {
        TaxAnalysis {
            year_end,
            config,
            buckets,
            taxable_income: Decimal::ZERO,
            tax_due: Decimal::ZERO,
            tax_paid,
            tax_profit: Decimal::ZERO,
        }
    }

    /// Sum the buckets, netting off each sliced bucket's relief.
    pub(crate) fn calculate_tax_due(&mut self) {
        self.taxable_income = self.buckets.iter().map(TaxBucket::taxable_income).sum();
        self.tax_due = self
            .buckets
            .iter()
            .map(|b| b.tax_due() - b.tax_relief())
            .sum();
    }

    /// `tax_paid` is a credit, sign-adjusted by the caller.
    pub(crate) fn calculate_tax_profit(&mut self) {
        self.tax_profit = self.tax_due + self.tax_paid;
    }

    pub fn buckets(&self) -> impl Iterator<Item = &TaxBucket> {
        self.buckets.iter()
    }

    pub fn bucket_for(&self, basis: TaxBasis) -> Option<&TaxBucket> {
        self.buckets.iter().find(|b| b.basis() == basis)
    }

    /// Write one CSV row per bucket, in processing order.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        for bucket in &self.buckets {
            let record: BucketCsvRecord = bucket.into();
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
