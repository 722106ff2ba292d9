//! Money conservation invariant checker.
//!
//! Invariant checked after settlement activity:
//! ```text
//! Σ wallet balances == Σ recorded funding
//! ```
//!
//! A wallet-funded checkout moves money between wallets and must not change
//! the total. External gateway settlement credits sellers with money
//! captured outside the wallets, so it records fresh funding. If the
//! invariant ever breaks, something has gone catastrophically wrong.

use rust_decimal::Decimal;

use vendora_types::{Result, VendoraError};

/// Tracks the money that has entered the wallet system.
#[derive(Debug, Clone, Default)]
pub struct MoneyConservation {
    /// Total funding since genesis: wallet deposits plus external captures.
    funded: Decimal,
}

impl MoneyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self {
            funded: Decimal::ZERO,
        }
    }

    /// Record money entering the system (deposit or external capture).
    pub fn record_funding(&mut self, amount: Decimal) {
        self.funded += amount;
    }

    /// The total the wallets should sum to.
    #[must_use]
    pub fn expected_total(&self) -> Decimal {
        self.funded
    }

    /// Verify the actual wallet sum against the recorded funding.
    ///
    /// # Errors
    /// Returns [`VendoraError::ConservationViolation`] if they differ.
    pub fn verify(&self, actual_total: Decimal) -> Result<()> {
        if actual_total != self.funded {
            return Err(VendoraError::ConservationViolation {
                reason: format!(
                    "wallet sum {actual_total} != recorded funding {}",
                    self.funded
                ),
            });
        }
        Ok(())
    }
}
