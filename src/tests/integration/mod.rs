//! Integration tests for the checkout flow
//!
//! Each scenario drives a `CheckoutService` wired to the mock gateway and
//! the recording confirmer. Time is paused so gateway delays and the QR
//! countdown advance virtually.

use futures::future::join_all;
use rust_decimal::Decimal;
use std::time::Duration;
use tokio_test::assert_ok;

use crate::application::{BankChoice, QrTimerState, SubmissionState, SubmitOutcome, TimerEvent};
use crate::domain::payment_method::{MethodTag, PaymentField, UpiSubMode};
use crate::domain::payments::GatewayError;
use crate::domain::validation::{ValidationField, ValidationReason, ValidationResult};
use crate::shared::error::CheckoutError;
use crate::tests::common::{fixtures, Harness};

#[tokio::test(start_paused = true)]
async fn test_card_payment_is_charged_and_confirmed_once() {
    let harness = Harness::with_donation(fixtures::patient_donation(2500)).await;
    let session = harness.service.open().await.unwrap();

    {
        let mut guard = session.lock().await;
        guard.switch_method(MethodTag::Card).unwrap();
        guard.update_field(PaymentField::CardNumber, "4111111111111111");
        guard.update_field(PaymentField::Expiry, "12/28");
        guard.update_field(PaymentField::Cvv, "123");
        guard.update_field(PaymentField::HolderName, "A B");
        assert_eq!(guard.validate(), ValidationResult::Ok);
        assert_eq!(guard.pay_button_label(), "Pay ₹2500 via Card");
    }

    let outcome = harness.service.submit(&session).await.unwrap();
    let SubmitOutcome::Succeeded(receipt) = outcome else {
        panic!("expected success");
    };
    assert_eq!(receipt.amount, Decimal::from(2500));
    assert_eq!(receipt.method, MethodTag::Card);

    assert_eq!(session.lock().await.submission_state(), &SubmissionState::Succeeded);
    assert_eq!(harness.gateway.call_count().await, 1);

    let confirmations = harness.confirmer.confirmations().await;
    assert_eq!(confirmations.len(), 1);
    assert_eq!(confirmations[0].amount, Decimal::from(2500));
    assert_eq!(confirmations[0].reference.as_deref(), Some("don-1001"));
    assert_eq!(confirmations[0].transaction_id, receipt.transaction_id);

    assert!(harness.store.get().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_netbanking_without_bank_is_rejected() {
    let harness = Harness::with_donation(fixtures::patient_donation(2500)).await;
    let session = harness.service.open().await.unwrap();
    session.lock().await.switch_method(MethodTag::NetBanking).unwrap();

    let outcome = harness.service.submit(&session).await.unwrap();
    let SubmitOutcome::Rejected(result) = outcome else {
        panic!("expected rejection");
    };
    assert_eq!(
        result,
        ValidationResult::Invalid { field: ValidationField::Bank, reason: ValidationReason::Required }
    );
    assert_eq!(result.user_message(), Some("Please select your bank"));

    assert_eq!(harness.gateway.call_count().await, 0);
    assert_eq!(session.lock().await.submission_state(), &SubmissionState::Idle);
    assert!(harness.confirmer.confirmations().await.is_empty());
    assert!(harness.store.get().await.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_qr_expiry_and_regeneration() {
    let harness = Harness::with_donation(fixtures::patient_donation(2500)).await;
    let session = harness.service.open().await.unwrap();

    let mut events = {
        let mut guard = session.lock().await;
        guard.switch_method(MethodTag::Qr).unwrap();
        guard.take_timer_events().unwrap()
    };

    tokio::time::sleep(Duration::from_secs(600) + Duration::from_millis(500)).await;
    assert_eq!(events.recv().await, Some(TimerEvent::Expired));

    let mut guard = session.lock().await;
    assert_eq!(guard.qr_state(), QrTimerState { remaining_seconds: 0, expired: true });
    assert!(!guard.qr_timer_running());

    guard.regenerate_qr().unwrap();
    assert_eq!(guard.qr_state(), QrTimerState { remaining_seconds: 600, expired: false });
    assert_eq!(guard.qr_state().display(), "10:00");
}

#[tokio::test(start_paused = true)]
async fn test_repeated_switching_leaves_one_timer() {
    let harness = Harness::with_donation(fixtures::patient_donation(2500)).await;
    let session = harness.service.open().await.unwrap();

    let before = {
        let mut guard = session.lock().await;
        for tag in [MethodTag::Qr, MethodTag::Card, MethodTag::Qr, MethodTag::Upi, MethodTag::Qr, MethodTag::NetBanking, MethodTag::Qr] {
            guard.switch_method(tag).unwrap();
        }
        guard.qr_tick_count()
    };

    tokio::time::sleep(Duration::from_millis(3500)).await;

    let guard = session.lock().await;
    assert_eq!(guard.qr_tick_count() - before, 3);
    assert_eq!(guard.qr_state().remaining_seconds, 597);
}

#[tokio::test(start_paused = true)]
async fn test_double_submit_charges_once() {
    let harness = Harness::with_donation(fixtures::patient_donation(2500)).await;
    let session = harness.service.open().await.unwrap();

    let (first, second) = tokio::join!(harness.service.submit(&session), harness.service.submit(&session));

    assert!(matches!(first.unwrap(), SubmitOutcome::Succeeded(_)));
    assert_eq!(second.unwrap(), SubmitOutcome::InFlight);
    assert_eq!(harness.gateway.call_count().await, 1);
    assert_eq!(harness.confirmer.confirmations().await.len(), 1);

    let metrics = harness.service.metrics();
    assert_eq!(metrics.submissions, 2);
    assert_eq!(metrics.duplicate_submissions, 1);
    assert_eq!(metrics.gateway_successes, 1);

    assert_eq!(harness.service.submit(&session).await.unwrap(), SubmitOutcome::AlreadyCompleted);
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_submits_charges_once() {
    let harness = Harness::with_donation(fixtures::patient_donation(2500)).await;
    let session = harness.service.open().await.unwrap();

    let outcomes = join_all((0..5).map(|_| harness.service.submit(&session))).await;

    let succeeded = outcomes
        .iter()
        .filter(|o| matches!(o, Ok(SubmitOutcome::Succeeded(_))))
        .count();
    let in_flight = outcomes
        .iter()
        .filter(|o| matches!(o, Ok(SubmitOutcome::InFlight)))
        .count();
    assert_eq!((succeeded, in_flight), (1, 4));
    assert_eq!(harness.gateway.call_count().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_switch_rejected_while_payment_in_flight() {
    let harness = Harness::with_donation(fixtures::patient_donation(2500)).await;
    let session = harness.service.open().await.unwrap();

    let submit = harness.service.submit(&session);
    tokio::pin!(submit);

    // Poll once so the submission reaches the gateway.
    tokio::select! {
        biased;
        _ = &mut submit => panic!("gateway should still be processing"),
        _ = tokio::time::sleep(Duration::from_millis(100)) => {}
    }

    {
        let mut guard = session.lock().await;
        assert_eq!(guard.submission_state(), &SubmissionState::Submitting);
        assert!(matches!(guard.switch_method(MethodTag::Card), Err(CheckoutError::SubmissionInProgress)));
        assert!(!guard.update_field(PaymentField::VpaId, "donor@okaxis"));
    }

    assert!(matches!(submit.await.unwrap(), SubmitOutcome::Succeeded(_)));
}

#[tokio::test(start_paused = true)]
async fn test_failed_payment_can_be_retried() {
    let harness = Harness::with_donation(fixtures::patient_donation(2500)).await;
    harness.gateway.push_outcome(Err(GatewayError::Unavailable("maintenance".into()))).await;
    let session = harness.service.open().await.unwrap();

    let outcome = harness.service.submit(&session).await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Failed(GatewayError::Unavailable("maintenance".into())));
    {
        let guard = session.lock().await;
        assert_eq!(guard.submission_state(), &SubmissionState::Idle);
        assert!(guard.last_failure().is_some_and(GatewayError::is_retryable));
    }
    assert!(harness.confirmer.confirmations().await.is_empty());

    let retry = harness.service.submit(&session).await.unwrap();
    assert!(matches!(retry, SubmitOutcome::Succeeded(_)));
    assert_eq!(harness.gateway.call_count().await, 2);
    assert!(session.lock().await.last_failure().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_confirmation_failure_keeps_payment() {
    let harness = Harness::with_donation(fixtures::patient_donation(2500)).await;
    harness.confirmer.fail_with("backend down").await;
    let session = harness.service.open().await.unwrap();

    let err = harness.service.submit(&session).await.unwrap_err();
    let CheckoutError::Confirmation { receipt, reason } = err else {
        panic!("expected confirmation error");
    };
    assert_eq!(receipt.amount, Decimal::from(2500));
    assert!(reason.contains("backend down"));

    assert_eq!(session.lock().await.submission_state(), &SubmissionState::Succeeded);
    assert_eq!(harness.service.submit(&session).await.unwrap(), SubmitOutcome::AlreadyCompleted);
    assert_eq!(harness.gateway.call_count().await, 1);
    assert_eq!(harness.service.metrics().confirmation_failures, 1);
}

#[tokio::test(start_paused = true)]
async fn test_confirmation_can_be_retried_without_recharging() {
    let harness = Harness::with_donation(fixtures::patient_donation(2500)).await;
    harness.confirmer.fail_with("backend down").await;
    let session = harness.service.open().await.unwrap();

    let err = harness.service.submit(&session).await.unwrap_err();
    assert!(matches!(err, CheckoutError::Confirmation { .. }));
    assert!(harness.store.get().await.is_some());

    // Still down: the pending record survives a failed retry.
    assert!(matches!(
        harness.service.retry_confirmation(&session).await,
        Err(CheckoutError::Confirmation { .. })
    ));
    assert!(harness.store.get().await.is_some());

    harness.confirmer.recover().await;
    assert_ok!(harness.service.retry_confirmation(&session).await);

    let confirmations = harness.confirmer.confirmations().await;
    assert_eq!(confirmations.len(), 3);
    assert!(confirmations.iter().all(|c| c.transaction_id == confirmations[0].transaction_id));
    assert!(harness.store.get().await.is_none());
    assert_eq!(harness.gateway.call_count().await, 1);
    assert_eq!(harness.service.metrics().confirmation_failures, 2);
}

#[tokio::test(start_paused = true)]
async fn test_confirmation_after_abandoned_submit() {
    let harness = Harness::with_donation(fixtures::patient_donation(2500)).await;
    let session = harness.service.open().await.unwrap();

    // The caller gives up while the gateway is still working.
    let abandoned = tokio::time::timeout(Duration::from_millis(100), harness.service.submit(&session)).await;
    assert!(abandoned.is_err());
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(session.lock().await.submission_state(), &SubmissionState::Succeeded);
    assert!(harness.confirmer.confirmations().await.is_empty());

    assert_ok!(harness.service.retry_confirmation(&session).await);
    assert_eq!(harness.confirmer.confirmations().await.len(), 1);
    assert!(harness.store.get().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_retry_confirmation_requires_payment() {
    let harness = Harness::with_donation(fixtures::patient_donation(2500)).await;
    let session = harness.service.open().await.unwrap();

    assert!(matches!(harness.service.retry_confirmation(&session).await, Err(CheckoutError::NotPaid)));
    assert!(harness.confirmer.confirmations().await.is_empty());
    assert!(harness.store.get().await.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_upi_address_payment_snapshot() {
    let harness = Harness::with_donation(fixtures::quick_donation(300)).await;
    let session = harness.service.open().await.unwrap();
    {
        let mut guard = session.lock().await;
        guard.select_upi_mode(UpiSubMode::Vpa).unwrap();
        guard.update_field(PaymentField::VpaId, "donor.name@okhdfcbank");
    }

    assert!(matches!(harness.service.submit(&session).await.unwrap(), SubmitOutcome::Succeeded(_)));

    let requests = harness.gateway.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].amount, Decimal::from(300));
    assert_eq!(requests[0].donation_ref, None);
    assert_eq!(requests[0].method.tag(), MethodTag::Upi);
}

#[tokio::test(start_paused = true)]
async fn test_netbanking_quick_pick() {
    let harness = Harness::with_donation(fixtures::patient_donation(1000)).await;
    let session = harness.service.open().await.unwrap();
    {
        let mut guard = session.lock().await;
        guard.switch_method(MethodTag::NetBanking).unwrap();
        guard.select_bank(BankChoice::QuickPick("SBI".into())).unwrap();
        assert_eq!(guard.pay_button_label(), "Pay ₹1000 via Net Banking");
    }

    let outcome = harness.service.submit(&session).await.unwrap();
    let SubmitOutcome::Succeeded(receipt) = outcome else {
        panic!("expected success");
    };
    assert_eq!(receipt.method, MethodTag::NetBanking);
}

#[tokio::test]
async fn test_open_without_pending_donation() {
    crate::tests::config::init();
    let harness = Harness::new(crate::tests::config::test_config());
    assert!(matches!(harness.service.open().await, Err(CheckoutError::NoPendingDonation)));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_clears_pending_donation() {
    let harness = Harness::with_donation(fixtures::patient_donation(2500)).await;
    let session = harness.service.open().await.unwrap();
    session.lock().await.switch_method(MethodTag::Qr).unwrap();

    assert_ok!(harness.service.cancel(&session).await);

    assert!(harness.store.get().await.is_none());
    assert!(!session.lock().await.qr_timer_running());
    assert!(matches!(harness.service.submit(&session).await, Err(CheckoutError::SessionClosed)));
    assert_eq!(harness.gateway.call_count().await, 0);
}
