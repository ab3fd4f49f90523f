//! Chain boundary — the only place FeeRail touches on-chain state.
//!
//! The engine never builds a wallet from ambient configuration: a
//! [`ChainClient`] is injected at construction, so unit tests run
//! against the deterministic [`MockChain`] and production wires in a
//! real signer-backed provider.
//!
//! All amounts stay fixed-point [`Decimal`] until this boundary;
//! [`to_minor_units`] is the single Decimal → integer conversion point.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use feerail_types::{ChainAddress, ChainRef, FeerailError, Result};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Which of the engine's two wallets a balance query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalletKind {
    /// Holds converted funds ready for operator distribution.
    Payout,
    /// Receives fees claimed from the venue, pre-conversion.
    Claim,
}

/// Snapshot of both wallet balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBalances {
    pub payout_wallet: Decimal,
    pub claim_wallet: Decimal,
}

/// Result of a bounded confirmation wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// One confirmation observed.
    Confirmed,
    /// The wait elapsed with the transfer's fate unknown.
    TimedOut,
}

/// On-chain status of a previously submitted transfer, as reported by a
/// later lookup (used by reconciliation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferStatus {
    Confirmed,
    /// Still in the mempool / awaiting confirmation.
    Pending,
    Rejected { reason: String },
    /// The provider has no knowledge of the reference.
    Unknown,
}

/// External chain collaborator: balance queries, signed transfer
/// submission, and receipt lookup.
pub trait ChainClient: Send + Sync {
    /// Live balance of one of the engine's wallets.
    fn balance(&self, wallet: WalletKind) -> Result<Decimal>;

    /// Submit a signed transfer from the payout wallet.
    ///
    /// # Errors
    /// [`FeerailError::ChainRejected`] if the chain refuses the
    /// transaction outright.
    fn submit_transfer(&self, to: &ChainAddress, amount: Decimal) -> Result<ChainRef>;

    /// Wait up to `timeout` for a single confirmation.
    fn await_confirmation(&self, reference: &ChainRef, timeout: Duration)
    -> Result<ConfirmOutcome>;

    /// Look up the current status of a submitted transfer.
    fn transfer_status(&self, reference: &ChainRef) -> Result<TransferStatus>;
}

impl<C: ChainClient + ?Sized> ChainClient for &C {
    fn balance(&self, wallet: WalletKind) -> Result<Decimal> {
        (**self).balance(wallet)
    }

    fn submit_transfer(&self, to: &ChainAddress, amount: Decimal) -> Result<ChainRef> {
        (**self).submit_transfer(to, amount)
    }

    fn await_confirmation(
        &self,
        reference: &ChainRef,
        timeout: Duration,
    ) -> Result<ConfirmOutcome> {
        (**self).await_confirmation(reference, timeout)
    }

    fn transfer_status(&self, reference: &ChainRef) -> Result<TransferStatus> {
        (**self).transfer_status(reference)
    }
}

/// Convert a decimal amount to the token's minor-unit integer.
///
/// # Errors
/// Returns [`FeerailError::AmountNotRepresentable`] if the amount is
/// negative or carries more fractional digits than the token scale.
pub fn to_minor_units(amount: Decimal, decimals: u32) -> Result<u128> {
    let factor = 10u64
        .checked_pow(decimals)
        .ok_or_else(|| FeerailError::Configuration(format!("token decimals {decimals} too large")))?;
    let scaled = amount * Decimal::from(factor);
    if amount.is_sign_negative() || !scaled.fract().is_zero() {
        return Err(FeerailError::AmountNotRepresentable { amount, decimals });
    }
    scaled
        .to_u128()
        .ok_or(FeerailError::AmountNotRepresentable { amount, decimals })
}

// ---------------------------------------------------------------------------
// MockChain — deterministic test double
// ---------------------------------------------------------------------------

struct MockState {
    payout_balance: Decimal,
    claim_balance: Decimal,
    /// Rejection reasons consumed FIFO by upcoming submissions.
    reject_queue: Vec<String>,
    /// Number of upcoming submissions that will time out on confirmation.
    timeout_next: usize,
    statuses: HashMap<ChainRef, TransferStatus>,
    submitted: Vec<(ChainAddress, Decimal, ChainRef)>,
    seq: u64,
}

/// Scriptable in-memory chain provider for deterministic tests.
///
/// Submissions deduct the payout balance immediately; confirmation
/// timeouts leave the transfer `Pending` until the test script resolves
/// it via [`MockChain::resolve`].
pub struct MockChain {
    state: Mutex<MockState>,
}

impl MockChain {
    #[must_use]
    pub fn new(payout_balance: Decimal, claim_balance: Decimal) -> Self {
        Self {
            state: Mutex::new(MockState {
                payout_balance,
                claim_balance,
                reject_queue: Vec::new(),
                timeout_next: 0,
                statuses: HashMap::new(),
                submitted: Vec::new(),
                seq: 0,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Script the next submission to be rejected with `reason`.
    pub fn reject_next(&self, reason: &str) {
        self.lock().reject_queue.push(reason.to_string());
    }

    /// Script the next submission to time out on confirmation.
    pub fn timeout_next(&self) {
        self.lock().timeout_next += 1;
    }

    /// Resolve a previously timed-out transfer (for reconciliation tests).
    pub fn resolve(&self, reference: &ChainRef, status: TransferStatus) {
        self.lock().statuses.insert(reference.clone(), status);
    }

    /// Transfers actually submitted, in order.
    #[must_use]
    pub fn submissions(&self) -> Vec<(ChainAddress, Decimal, ChainRef)> {
        self.lock().submitted.clone()
    }
}

impl ChainClient for MockChain {
    fn balance(&self, wallet: WalletKind) -> Result<Decimal> {
        let state = self.lock();
        Ok(match wallet {
            WalletKind::Payout => state.payout_balance,
            WalletKind::Claim => state.claim_balance,
        })
    }

    fn submit_transfer(&self, to: &ChainAddress, amount: Decimal) -> Result<ChainRef> {
        let mut state = self.lock();
        if !state.reject_queue.is_empty() {
            let reason = state.reject_queue.remove(0);
            return Err(FeerailError::ChainRejected { reason });
        }
        if state.payout_balance < amount {
            return Err(FeerailError::ChainRejected {
                reason: "insufficient wallet balance".to_string(),
            });
        }
        state.payout_balance -= amount;
        state.seq += 1;
        let reference = ChainRef::new(format!("0xmock{:08x}", state.seq));
        let status = if state.timeout_next > 0 {
            state.timeout_next -= 1;
            TransferStatus::Pending
        } else {
            TransferStatus::Confirmed
        };
        state.statuses.insert(reference.clone(), status);
        state.submitted.push((to.clone(), amount, reference.clone()));
        Ok(reference)
    }

    fn await_confirmation(
        &self,
        reference: &ChainRef,
        _timeout: Duration,
    ) -> Result<ConfirmOutcome> {
        let state = self.lock();
        match state.statuses.get(reference) {
            Some(TransferStatus::Confirmed) => Ok(ConfirmOutcome::Confirmed),
            Some(_) => Ok(ConfirmOutcome::TimedOut),
            None => Err(FeerailError::ChainUnavailable {
                reason: format!("unknown reference {reference}"),
            }),
        }
    }

    fn transfer_status(&self, reference: &ChainRef) -> Result<TransferStatus> {
        let state = self.lock();
        Ok(state
            .statuses
            .get(reference)
            .cloned()
            .unwrap_or(TransferStatus::Unknown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> ChainAddress {
        ChainAddress::parse("0x52908400098527886e0f7030069857d2e4169ee7").unwrap()
    }

    #[test]
    fn minor_units_exact_conversion() {
        // 750.00 USDC at 6 decimals = 750_000_000.
        let units = to_minor_units(Decimal::new(750_00, 2), 6).unwrap();
        assert_eq!(units, 750_000_000);
    }

    #[test]
    fn minor_units_rejects_excess_precision() {
        // 0.0000001 does not fit 6 decimals.
        let err = to_minor_units(Decimal::new(1, 7), 6).unwrap_err();
        assert!(matches!(err, FeerailError::AmountNotRepresentable { .. }));
    }

    #[test]
    fn minor_units_rejects_negative() {
        let err = to_minor_units(Decimal::new(-1, 0), 6).unwrap_err();
        assert!(matches!(err, FeerailError::AmountNotRepresentable { .. }));
    }

    #[test]
    fn minor_units_zero() {
        assert_eq!(to_minor_units(Decimal::ZERO, 6).unwrap(), 0);
    }

    #[test]
    fn mock_transfer_deducts_balance() {
        let chain = MockChain::new(Decimal::new(100, 0), Decimal::ZERO);
        let reference = chain.submit_transfer(&addr(), Decimal::new(30, 0)).unwrap();
        assert_eq!(
            chain.balance(WalletKind::Payout).unwrap(),
            Decimal::new(70, 0)
        );
        assert_eq!(
            chain
                .await_confirmation(&reference, Duration::from_secs(1))
                .unwrap(),
            ConfirmOutcome::Confirmed
        );
    }

    #[test]
    fn mock_scripted_rejection() {
        let chain = MockChain::new(Decimal::new(100, 0), Decimal::ZERO);
        chain.reject_next("nonce too low");
        let err = chain
            .submit_transfer(&addr(), Decimal::new(30, 0))
            .unwrap_err();
        assert!(matches!(err, FeerailError::ChainRejected { .. }));
        // Balance untouched by a rejected submission.
        assert_eq!(
            chain.balance(WalletKind::Payout).unwrap(),
            Decimal::new(100, 0)
        );
    }

    #[test]
    fn mock_scripted_timeout_then_resolution() {
        let chain = MockChain::new(Decimal::new(100, 0), Decimal::ZERO);
        chain.timeout_next();
        let reference = chain.submit_transfer(&addr(), Decimal::new(30, 0)).unwrap();
        assert_eq!(
            chain
                .await_confirmation(&reference, Duration::from_secs(1))
                .unwrap(),
            ConfirmOutcome::TimedOut
        );
        assert_eq!(
            chain.transfer_status(&reference).unwrap(),
            TransferStatus::Pending
        );

        chain.resolve(&reference, TransferStatus::Confirmed);
        assert_eq!(
            chain.transfer_status(&reference).unwrap(),
            TransferStatus::Confirmed
        );
    }

    #[test]
    fn unknown_reference_status() {
        let chain = MockChain::new(Decimal::ZERO, Decimal::ZERO);
        assert_eq!(
            chain.transfer_status(&ChainRef::new("0xnope")).unwrap(),
            TransferStatus::Unknown
        );
    }
}
