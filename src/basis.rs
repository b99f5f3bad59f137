use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Category of income or gain, taxed under its own allocation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxBasis {
    Salary,
    RentalIncome,
    RoomRental,
    OtherIncome,
    TaxedInterest,
    UntaxedInterest,
    PeerToPeerInterest,
    Dividend,
    UnitTrustDividend,
    ForeignDividend,
    ChargeableGains,
    ResidentialCapitalGains,
    CapitalGains,
}

impl TaxBasis {
    pub fn display(&self) -> &'static str {
        match self {
            TaxBasis::Salary => "Salary",
            TaxBasis::RentalIncome => "Rental Income",
            TaxBasis::RoomRental => "Room Rental",
            TaxBasis::OtherIncome => "Other Income",
            TaxBasis::TaxedInterest => "Taxed Interest",
            TaxBasis::UntaxedInterest => "Untaxed Interest",
            TaxBasis::PeerToPeerInterest => "Peer-to-Peer Interest",
            TaxBasis::Dividend => "Dividend",
            TaxBasis::UnitTrustDividend => "Unit Trust Dividend",
            TaxBasis::ForeignDividend => "Foreign Dividend",
            TaxBasis::ChargeableGains => "Chargeable Gains",
            TaxBasis::ResidentialCapitalGains => "Residential Capital Gains",
            TaxBasis::CapitalGains => "Capital Gains",
        }
    }

    /// Interest-like categories, taxed under the year's interest scheme.
    pub fn is_interest(&self) -> bool {
        matches!(
            self,
            TaxBasis::TaxedInterest | TaxBasis::UntaxedInterest | TaxBasis::PeerToPeerInterest
        )
    }

    /// Dividend-like categories, taxed under the year's dividend scheme.
    pub fn is_dividend(&self) -> bool {
        matches!(
            self,
            TaxBasis::Dividend | TaxBasis::UnitTrustDividend | TaxBasis::ForeignDividend
        )
    }

    /// Capital disposals, taxed under the year's capital scheme.
    pub fn is_capital(&self) -> bool {
        matches!(
            self,
            TaxBasis::ResidentialCapitalGains | TaxBasis::CapitalGains
        )
    }
}

impl std::fmt::Display for TaxBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// A single chargeable-gain event with its annualised slice.
///
/// `slice` is the gain divided over the complete years the underlying policy
/// ran; top-slicing relief rebuilds the tax as if only the slice had arisen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainEvent {
    pub gain: Decimal,
    pub slice: Decimal,
}

/// Read-only supplier of recorded amounts for one taxpayer and tax year.
///
/// Implementations must return zero (not fail) for categories with no
/// recorded activity.
pub trait TaxSource {
    fn amount_for_basis(&self, basis: TaxBasis) -> Decimal;

    /// The individual events behind the ChargeableGains basis.
    ///
    /// The default treats the basis total as one event sliced over a single
    /// year, which makes top-slicing a no-op.
    fn chargeable_events(&self) -> Vec<GainEvent> {
        let gain = self.amount_for_basis(TaxBasis::ChargeableGains);
        if gain <= Decimal::ZERO {
            return Vec::new();
        }
        vec![GainEvent { gain, slice: gain }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    struct MapSource(HashMap<TaxBasis, Decimal>);

    impl TaxSource for MapSource {
        fn amount_for_basis(&self, basis: TaxBasis) -> Decimal {
            self.0.get(&basis).copied().unwrap_or(Decimal::ZERO)
        }
    }

    #[test]
    fn missing_basis_is_zero() {
        let source = MapSource(HashMap::new());
        assert_eq!(source.amount_for_basis(TaxBasis::Salary), Decimal::ZERO);
    }

    #[test]
    fn default_chargeable_events_single_slice() {
        let source = MapSource(HashMap::from([(TaxBasis::ChargeableGains, dec!(9000))]));
        let events = source.chargeable_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].gain, dec!(9000));
        assert_eq!(events[0].slice, dec!(9000));
    }

    #[test]
    fn default_chargeable_events_empty_when_zero() {
        let source = MapSource(HashMap::new());
        assert!(source.chargeable_events().is_empty());
    }

    #[test]
    fn basis_families() {
        assert!(TaxBasis::TaxedInterest.is_interest());
        assert!(TaxBasis::ForeignDividend.is_dividend());
        assert!(TaxBasis::ResidentialCapitalGains.is_capital());
        assert!(!TaxBasis::ChargeableGains.is_capital());
        assert!(!TaxBasis::Salary.is_interest());
    }
}
