//! End-to-end integration tests across all three planes.
//!
//! These tests exercise the full settlement lifecycle:
//! Security Envelope (Ingress) -> Fee Ledger -> Finality Plane (Payout)
//!
//! They verify that the planes work together in realistic scenarios:
//! signed webhook intake, claim and aggregation, readiness checks,
//! idempotent payout runs, halting on shortfall, and reconciliation of
//! timed-out transfers.

use chrono::{DateTime, TimeZone, Utc};
use feerail_ingress::signature::sign;
use feerail_ingress::{FeeEventPayload, SecurityGate, WebhookHeaders, WebhookIngress, WebhookProvider};
use feerail_ledger::FeeLedger;
use feerail_payout::{
    ChainClient, MockChain, OperatorOutcome, PayoutExecutor, ReadinessEvaluator, SkipReason,
    TransferStatus, WalletKind,
};
use feerail_types::{
    FeerailError, OperatorId, OperatorProfile, PayoutConfig, PayoutStatus, Period, PeriodKind,
    RevenueStream, WebhookConfig,
};
use rust_decimal::Decimal;

const VENUE_SECRET: &[u8] = b"whsec_venue_0123456789abcdef";
const ADDR_A: &str = "0x52908400098527886e0f7030069857d2e4169ee7";
const ADDR_B: &str = "0x8617e340b3d01fa5f11f306f4090fd50e238070d";

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn dec(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Helper: the full settlement pipeline — intake, ledger, gate, payout.
struct SettlementPipeline {
    ingress: WebhookIngress,
    ledger: FeeLedger,
    gate: SecurityGate,
    operators: Vec<OperatorProfile>,
    executor: PayoutExecutor<MockChain>,
    period: Period,
    seq: u64,
}

impl SettlementPipeline {
    fn new(payout_wallet_cents: i64) -> Self {
        let chain = MockChain::new(dec(payout_wallet_cents), Decimal::ZERO);
        Self {
            ingress: WebhookIngress::new(&WebhookConfig::default())
                .with_secret(WebhookProvider::Venue, VENUE_SECRET),
            ledger: FeeLedger::new(),
            gate: SecurityGate::default(),
            operators: Vec::new(),
            executor: PayoutExecutor::new(chain, PayoutConfig::default()).unwrap(),
            period: Period::new(ts(0), ts(86_400)).unwrap(),
            seq: 0,
        }
    }

    fn onboard(&mut self, name: &str, address: Option<&str>) -> OperatorId {
        let op = OperatorId::new();
        let mut profile = OperatorProfile::new(op, name);
        if let Some(addr) = address {
            profile = profile.with_address(addr);
        }
        self.operators.push(profile);
        op
    }

    /// Deliver a signed venue webhook and record the accepted event.
    fn deliver_fee(&mut self, op: OperatorId, cents: i64, stream: RevenueStream, occurred: i64) {
        self.seq += 1;
        let body = serde_json::to_vec(&FeeEventPayload {
            operator_id: op,
            amount: dec(cents),
            currency: "USDC".to_string(),
            stream,
            occurred_at: ts(occurred),
        })
        .unwrap();
        let sent_at = occurred.to_string();
        let signature = sign(WebhookProvider::Venue, &body, &sent_at, VENUE_SECRET);
        let headers = WebhookHeaders::new(signature, format!("evt_{}", self.seq), sent_at);

        let event = self
            .ingress
            .accept(WebhookProvider::Venue, &body, &headers, ts(occurred + 5))
            .expect("signed webhook should be accepted");
        self.ledger
            .record_fee_at(
                event.operator_id,
                event.amount,
                &event.currency,
                event.stream,
                event.occurred_at,
            )
            .expect("accepted event should record");
    }

    fn claim_all(&mut self) -> usize {
        self.ledger.mark_claimed(&self.period, "claim-e2e")
    }

    fn run_payouts(&mut self) -> feerail_payout::PayoutRunReport {
        self.executor
            .process_payouts(
                PeriodKind::Daily,
                &self.period,
                &mut self.ledger,
                &self.gate,
                &self.operators,
            )
            .expect("payout run should start")
    }
}

// =============================================================================
// Test: signed webhook to confirmed payout, full happy path
// =============================================================================
#[test]
fn e2e_webhook_to_confirmed_payout() {
    // Wallet holds 800.00; entitlement will be 0.7 x 1000 + 0.5 x 100 = 750.00.
    let mut pipeline = SettlementPipeline::new(800_00);
    let alpha = pipeline.onboard("Alpha Terminal", Some(ADDR_A));

    pipeline.deliver_fee(alpha, 600_00, RevenueStream::Trading, 1_000);
    pipeline.deliver_fee(alpha, 400_00, RevenueStream::Trading, 2_000);
    pipeline.deliver_fee(alpha, 100_00, RevenueStream::OnRamp, 3_000);
    assert_eq!(pipeline.claim_all(), 3);

    // Readiness agrees with what the run will do.
    let readiness = ReadinessEvaluator::new(
        MockChain::new(dec(800_00), Decimal::ZERO),
        PayoutConfig::default(),
    )
    .unwrap()
    .check_readiness(
        &pipeline.ledger,
        &pipeline.gate,
        &pipeline.operators,
        PeriodKind::Daily,
        &pipeline.period,
    )
    .unwrap();
    assert!(readiness.ready);
    assert_eq!(readiness.required, dec(750_00));

    let report = pipeline.run_payouts();
    assert_eq!(report.paid_count(), 1);
    assert_eq!(report.total_paid, dec(750_00));

    let history = pipeline.executor.history(alpha);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, PayoutStatus::Completed);
    assert_eq!(history[0].recipient, ADDR_A);

    // Ledger fees are now distributed; nothing claimed remains.
    assert!(pipeline.ledger.claimed_not_distributed_total().is_empty());
}

// =============================================================================
// Test: re-running the same period pays nobody twice
// =============================================================================
#[test]
fn e2e_double_run_is_idempotent() {
    let mut pipeline = SettlementPipeline::new(5_000_00);
    let alpha = pipeline.onboard("Alpha", Some(ADDR_A));
    let beta = pipeline.onboard("Beta", Some(ADDR_B));

    pipeline.deliver_fee(alpha, 1000_00, RevenueStream::Trading, 1_000);
    pipeline.deliver_fee(beta, 500_00, RevenueStream::Trading, 2_000);
    pipeline.claim_all();

    let first = pipeline.run_payouts();
    assert_eq!(first.paid_count(), 2);

    let second = pipeline.run_payouts();
    assert_eq!(second.paid_count(), 0);
    for result in &second.outcomes {
        assert!(matches!(
            result.outcome,
            OperatorOutcome::Skipped {
                reason: SkipReason::AlreadyPaid
            }
        ));
    }

    // One transfer each, one record each.
    assert_eq!(pipeline.executor.chain().submissions().len(), 2);
    assert_eq!(pipeline.executor.history(alpha).len(), 1);
    assert_eq!(pipeline.executor.history(beta).len(), 1);
}

// =============================================================================
// Test: wallet shortfall halts the run instead of paying partially
// =============================================================================
#[test]
fn e2e_shortfall_halts_run() {
    // Two operators at 700.00 entitlement each; wallet holds 750.00.
    let mut pipeline = SettlementPipeline::new(750_00);
    let alpha = pipeline.onboard("Alpha", Some(ADDR_A));
    let beta = pipeline.onboard("Beta", Some(ADDR_B));

    pipeline.deliver_fee(alpha, 1000_00, RevenueStream::Trading, 1_000);
    pipeline.deliver_fee(beta, 1000_00, RevenueStream::Trading, 2_000);
    pipeline.claim_all();

    let report = pipeline.run_payouts();
    assert!(report.halted);
    assert_eq!(report.paid_count(), 1);
    assert_eq!(report.total_paid, dec(700_00));

    // Only one transfer left the wallet; the shorted operator retries
    // next run once the wallet is topped up.
    assert_eq!(pipeline.executor.chain().submissions().len(), 1);
    let shorted = report
        .outcomes
        .iter()
        .find(|r| matches!(
            r.outcome,
            OperatorOutcome::Skipped {
                reason: SkipReason::InsufficientFunds { .. }
            }
        ))
        .expect("one operator must be shorted");
    assert!(pipeline.executor.history(shorted.operator_id).is_empty());

    // The wallet keeps the remainder: 750.00 - 700.00 = 50.00.
    assert_eq!(
        pipeline.executor.chain().balance(WalletKind::Payout).unwrap(),
        dec(50_00)
    );

    // The shorted operator's obligation does not disappear: the next
    // readiness report still carries their full entitlement and says
    // the wallet cannot cover it.
    let readiness = ReadinessEvaluator::new(
        pipeline.executor.chain(),
        PayoutConfig::default(),
    )
    .unwrap()
    .check_readiness(
        &pipeline.ledger,
        &pipeline.gate,
        &pipeline.operators,
        PeriodKind::Daily,
        &pipeline.period,
    )
    .unwrap();
    assert!(!readiness.ready);
    assert_eq!(readiness.available, dec(50_00));
    let owed = readiness
        .per_operator
        .iter()
        .find(|r| r.operator_id == shorted.operator_id)
        .expect("shorted operator must still be listed");
    assert_eq!(owed.entitlement, dec(700_00));
    assert!(readiness.required >= dec(700_00));
}

// =============================================================================
// Test: suspended operator is vetoed, reinstated after review, then paid
// =============================================================================
#[test]
fn e2e_security_veto_then_reinstatement() {
    let mut pipeline = SettlementPipeline::new(5_000_00);
    let alpha = pipeline.onboard("Alpha", Some(ADDR_A));

    pipeline.deliver_fee(alpha, 1000_00, RevenueStream::Trading, 1_000);
    pipeline.claim_all();

    // Five pattern hits push the risk score past the threshold.
    for _ in 0..5 {
        pipeline
            .gate
            .scan_content(alpha, "guaranteed returns, join now")
            .unwrap();
    }
    assert!(!pipeline.gate.is_payable(alpha));

    let vetoed = pipeline.run_payouts();
    assert_eq!(vetoed.paid_count(), 0);
    assert!(matches!(
        vetoed.outcomes[0].outcome,
        OperatorOutcome::Skipped {
            reason: SkipReason::SecurityVeto { .. }
        }
    ));

    // Review clears the operator; the next run pays.
    pipeline.gate.begin_review(alpha).unwrap();
    pipeline
        .gate
        .review_platform(alpha, true, "marketing copy, not fraud")
        .unwrap();

    let report = pipeline.run_payouts();
    assert_eq!(report.paid_count(), 1);
    assert_eq!(report.total_paid, dec(700_00));
}

// =============================================================================
// Test: banned operator is never paid, even after wallet top-up and re-runs
// =============================================================================
#[test]
fn e2e_ban_is_terminal_for_payouts() {
    let mut pipeline = SettlementPipeline::new(5_000_00);
    let alpha = pipeline.onboard("Alpha", Some(ADDR_A));

    pipeline.deliver_fee(alpha, 1000_00, RevenueStream::Trading, 1_000);
    pipeline.claim_all();
    pipeline.gate.ban(alpha, "confirmed fraud").unwrap();

    for _ in 0..3 {
        let report = pipeline.run_payouts();
        assert_eq!(report.paid_count(), 0);
    }
    assert!(pipeline.executor.history(alpha).is_empty());
    assert!(matches!(
        pipeline.gate.begin_review(alpha).unwrap_err(),
        FeerailError::BannedIsTerminal(_)
    ));
}

// =============================================================================
// Test: replayed webhook never double-counts revenue
// =============================================================================
#[test]
fn e2e_replayed_webhook_is_single_counted() {
    let mut pipeline = SettlementPipeline::new(5_000_00);
    let alpha = pipeline.onboard("Alpha", Some(ADDR_A));

    let body = serde_json::to_vec(&FeeEventPayload {
        operator_id: alpha,
        amount: dec(1000_00),
        currency: "USDC".to_string(),
        stream: RevenueStream::Trading,
        occurred_at: ts(1_000),
    })
    .unwrap();
    let sent_at = "1000".to_string();
    let signature = sign(WebhookProvider::Venue, &body, &sent_at, VENUE_SECRET);
    let headers = WebhookHeaders::new(signature, "evt_replayed", sent_at);

    let event = pipeline
        .ingress
        .accept(WebhookProvider::Venue, &body, &headers, ts(1_005))
        .unwrap();
    pipeline
        .ledger
        .record_fee_at(
            event.operator_id,
            event.amount,
            &event.currency,
            event.stream,
            event.occurred_at,
        )
        .unwrap();

    // Byte-identical redelivery: rejected, nothing recorded.
    let err = pipeline
        .ingress
        .accept(WebhookProvider::Venue, &body, &headers, ts(1_010))
        .unwrap_err();
    assert!(matches!(err, FeerailError::ReplayDetected { .. }));

    pipeline.claim_all();
    let report = pipeline.run_payouts();
    assert_eq!(report.total_paid, dec(700_00), "one delivery, one payout");
}

// =============================================================================
// Test: timed-out transfer blocks retries until reconciliation settles it
// =============================================================================
#[test]
fn e2e_timeout_reconcile_confirm() {
    let mut pipeline = SettlementPipeline::new(5_000_00);
    let alpha = pipeline.onboard("Alpha", Some(ADDR_A));

    pipeline.deliver_fee(alpha, 1000_00, RevenueStream::Trading, 1_000);
    pipeline.claim_all();

    pipeline.executor.chain().timeout_next();
    let report = pipeline.run_payouts();
    assert!(matches!(
        report.outcomes[0].outcome,
        OperatorOutcome::AwaitingConfirmation { .. }
    ));

    // Re-running cannot resubmit while the transfer is unresolved.
    let blocked = pipeline.run_payouts();
    assert!(matches!(
        blocked.outcomes[0].outcome,
        OperatorOutcome::Skipped {
            reason: SkipReason::AwaitingReconciliation
        }
    ));
    assert_eq!(pipeline.executor.chain().submissions().len(), 1);

    // The transfer eventually confirms; reconciliation promotes it.
    let reference = pipeline.executor.history(alpha)[0]
        .chain_reference
        .clone()
        .unwrap();
    pipeline
        .executor
        .chain()
        .resolve(&reference, TransferStatus::Confirmed);
    let reconciled = pipeline.executor.reconcile(&mut pipeline.ledger).unwrap();
    assert_eq!(reconciled.completed, 1);

    // Now fully settled: further runs skip as already paid.
    let settled = pipeline.run_payouts();
    assert!(matches!(
        settled.outcomes.first().map(|r| &r.outcome),
        None | Some(OperatorOutcome::Skipped {
            reason: SkipReason::AlreadyPaid
        })
    ));
    assert_eq!(pipeline.executor.chain().submissions().len(), 1);
    assert_eq!(pipeline.executor.history(alpha)[0].status, PayoutStatus::Completed);
}

// =============================================================================
// Test: bad address records a failure; fixing it allows the retry to pay
// =============================================================================
#[test]
fn e2e_bad_address_then_corrected() {
    let mut pipeline = SettlementPipeline::new(5_000_00);
    let alpha = pipeline.onboard("Alpha", Some("not-a-chain-address"));

    pipeline.deliver_fee(alpha, 1000_00, RevenueStream::Trading, 1_000);
    pipeline.claim_all();

    let report = pipeline.run_payouts();
    assert!(matches!(
        report.outcomes[0].outcome,
        OperatorOutcome::Failed { .. }
    ));
    assert_eq!(pipeline.executor.history(alpha)[0].status, PayoutStatus::Failed);

    // Operator fixes their address.
    pipeline.operators[0].payout_address = Some(ADDR_A.to_string());
    let retry = pipeline.run_payouts();
    assert_eq!(retry.paid_count(), 1);

    let history = pipeline.executor.history(alpha);
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].status, PayoutStatus::Completed);
}

// =============================================================================
// Test: periods are independent — paying one period leaves the next payable
// =============================================================================
#[test]
fn e2e_adjacent_periods_settle_independently() {
    let mut pipeline = SettlementPipeline::new(5_000_00);
    let alpha = pipeline.onboard("Alpha", Some(ADDR_A));

    // One fee in each of two adjacent days; the boundary fee belongs to
    // the second period only.
    pipeline.deliver_fee(alpha, 1000_00, RevenueStream::Trading, 1_000);
    pipeline.deliver_fee(alpha, 500_00, RevenueStream::Trading, 86_400);
    let day_two = pipeline.period.next();
    pipeline.ledger.mark_claimed(&pipeline.period, "claim-day1");
    pipeline.ledger.mark_claimed(&day_two, "claim-day2");

    let first = pipeline.run_payouts();
    assert_eq!(first.total_paid, dec(700_00));

    pipeline.period = day_two;
    let second = pipeline.run_payouts();
    assert_eq!(second.total_paid, dec(350_00));

    assert_eq!(pipeline.executor.history(alpha).len(), 2);
}
