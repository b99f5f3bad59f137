use rust_decimal::Decimal;

/// One slice of the rate ladder: a capacity and the rate applied to it.
///
/// `amount == None` marks the final, unbounded band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxBand {
    pub amount: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxBand {
    pub fn new(amount: Decimal, rate: Decimal) -> Self {
        TaxBand {
            amount: Some(amount),
            rate,
        }
    }

    pub fn unbounded(rate: Decimal) -> Self {
        TaxBand { amount: None, rate }
    }

    pub fn is_unbounded(&self) -> bool {
        self.amount.is_none()
    }

    /// Remove capacity from this band, clamped at zero.
    /// Unbounded bands absorb any amount without shrinking.
    pub fn deduct(&mut self, amount: Decimal) {
        if let Some(capacity) = self.amount {
            self.amount = Some((capacity - amount).max(Decimal::ZERO));
        }
    }
}

/// Ordered sequence of tax bands, consumed lowest first.
///
/// At most one band is unbounded, and it is always last. A set built from a
/// rule table violating that is a corrupted table and construction panics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaxBandSet {
    bands: Vec<TaxBand>,
}

impl TaxBandSet {
    pub fn new(bands: Vec<TaxBand>) -> Self {
        let unbounded = bands.iter().filter(|b| b.is_unbounded()).count();
        assert!(
            unbounded <= 1,
            "band set has {unbounded} unbounded bands, at most one allowed"
        );
        if unbounded == 1 {
            assert!(
                bands.last().is_some_and(TaxBand::is_unbounded),
                "unbounded band must be the last band"
            );
        }
        TaxBandSet { bands }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaxBand> {
        self.bands.iter()
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TaxBand> {
        self.bands.get(index)
    }

    /// Remove capacity from the ladder in order, lowest band first.
    pub fn deduct(&mut self, amount: Decimal) {
        let mut remaining = amount.max(Decimal::ZERO);
        for band in &mut self.bands {
            if remaining <= Decimal::ZERO {
                break;
            }
            match band.amount {
                Some(capacity) => {
                    let taken = remaining.min(capacity);
                    band.amount = Some(capacity - taken);
                    remaining -= taken;
                }
                // the unbounded band absorbs whatever is left
                None => break,
            }
        }
        log::debug!("band set deduct {}: now {:?}", amount, self.bands);
    }

    /// Total capacity of the bounded bands up to and including `index`.
    pub fn capacity_through(&self, index: usize) -> Decimal {
        self.bands
            .iter()
            .take(index + 1)
            .filter_map(|b| b.amount)
            .sum()
    }

    /// Tax charged by a working (fully allocated) set.
    pub fn tax_due(&self) -> Decimal {
        self.bands
            .iter()
            .filter_map(|b| b.amount.map(|a| a * b.rate))
            .sum()
    }

    /// Allocated amount excluding the zero-rate allowance band.
    pub fn taxable_income(&self) -> Decimal {
        self.bands
            .iter()
            .filter(|b| !b.rate.is_zero())
            .filter_map(|b| b.amount)
            .sum()
    }

    /// Total allocated amount, zero-rate band included.
    pub fn total_amount(&self) -> Decimal {
        self.bands.iter().filter_map(|b| b.amount).sum()
    }

    /// Bands carrying a non-zero amount at a non-zero rate.
    pub fn charged_band_count(&self) -> usize {
        self.bands
            .iter()
            .filter(|b| !b.rate.is_zero() && b.amount.is_some_and(|a| !a.is_zero()))
            .count()
    }
}

/// One tax year's rate ladder.
///
/// `has_low_band` marks a general starting band at the front of `standard`
/// (1992/93 to 2007/08). `low_savings` is the savings-only starting band
/// introduced in 2008/09, held separately because only interest schemes
/// allocate into it.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxBands {
    pub standard: TaxBandSet,
    pub has_low_band: bool,
    pub low_savings: Option<TaxBand>,
}

impl TaxBands {
    pub fn new(standard: TaxBandSet, has_low_band: bool, low_savings: Option<TaxBand>) -> Self {
        assert!(
            !standard.is_empty(),
            "standard band set must have at least one band"
        );
        assert!(
            low_savings.is_none_or(|b| !b.is_unbounded()),
            "low savings band must be bounded"
        );
        TaxBands {
            standard,
            has_low_band,
            low_savings,
        }
    }

    /// Index of the basic-rate band within the standard set.
    pub fn basic_index(&self) -> usize {
        usize::from(self.has_low_band)
    }
}
