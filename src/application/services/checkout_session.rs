//! Checkout session - the state behind a single checkout page
//!
//! The session owns the bound donation, the active payment method and the
//! QR countdown. UI events arrive as method calls; rendering reads the
//! accessors. The submission state is driven by the `SubmissionController`.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, info};

use crate::application::services::countdown_timer::{CountdownTimer, QrTimerState, TimerEvent};
use crate::config::QrConfig;
use crate::domain::donation::PendingDonation;
use crate::domain::formatting::{self, CardBrand};
use crate::domain::payment_method::{MethodTag, PaymentField, PaymentMethod, UpiSubMode};
use crate::domain::payments::{ChargeRequest, GatewayError, PaymentReceipt};
use crate::domain::validation::{self, ValidationResult};
use crate::shared::error::CheckoutError;
use crate::shared::logging::LoggingUtils;

/// Session shared between UI handlers and the submission controller
pub type SharedSession = Arc<Mutex<CheckoutSession>>;

/// Where a submit attempt stands
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum SubmissionState {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed(GatewayError),
}

impl SubmissionState {
    /// A charge attempt is between validation and its result
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SubmissionState::Validating | SubmissionState::Submitting)
    }
}

/// Bank picked on the net-banking tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankChoice {
    /// One of the highlighted popular banks
    QuickPick(String),
    /// Chosen from the full dropdown
    Other(String),
}

/// What the order summary panel shows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutSummary {
    pub recipient: String,
    pub hospital: String,
    pub amount: Decimal,
    pub method: MethodTag,
}

pub struct CheckoutSession {
    donation: PendingDonation,
    active_method: PaymentMethod,
    submission_state: SubmissionState,
    quick_pick_bank: Option<String>,
    last_failure: Option<GatewayError>,
    receipt: Option<PaymentReceipt>,
    cancelled: bool,
    qr_ttl_seconds: u32,
    timer: CountdownTimer,
    timer_events: Option<mpsc::UnboundedReceiver<TimerEvent>>,
}

impl CheckoutSession {
    /// Bind a pending donation and open on UPI (app intent).
    ///
    /// With `start_on_load` the QR countdown starts immediately, which needs a
    /// Tokio runtime.
    pub fn initialize(donation: PendingDonation, qr: &QrConfig) -> Self {
        let (mut timer, timer_events) = CountdownTimer::new(qr);
        if qr.start_on_load {
            timer.restart();
        }

        LoggingUtils::log_session_opened(
            donation.reference().unwrap_or("-"),
            &donation.recipient_label,
            donation.amount,
        );

        Self {
            donation,
            active_method: PaymentMethod::default_for(MethodTag::Upi, qr.ttl_seconds),
            submission_state: SubmissionState::Idle,
            quick_pick_bank: None,
            last_failure: None,
            receipt: None,
            cancelled: false,
            qr_ttl_seconds: qr.ttl_seconds,
            timer,
            timer_events: Some(timer_events),
        }
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    pub fn donation(&self) -> &PendingDonation {
        &self.donation
    }

    pub fn active_method(&self) -> &PaymentMethod {
        &self.active_method
    }

    pub fn active_tag(&self) -> MethodTag {
        self.active_method.tag()
    }

    pub fn submission_state(&self) -> &SubmissionState {
        &self.submission_state
    }

    pub fn quick_pick_bank(&self) -> Option<&str> {
        self.quick_pick_bank.as_deref()
    }

    /// Gateway failure from the most recent attempt, kept for the retry prompt
    pub fn last_failure(&self) -> Option<&GatewayError> {
        self.last_failure.as_ref()
    }

    pub fn receipt(&self) -> Option<&PaymentReceipt> {
        self.receipt.as_ref()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// No further user changes are accepted
    pub fn is_closed(&self) -> bool {
        self.cancelled || self.submission_state == SubmissionState::Succeeded
    }

    fn ensure_mutable(&self) -> Result<(), CheckoutError> {
        if self.is_closed() {
            return Err(CheckoutError::SessionClosed);
        }
        if self.submission_state.is_in_flight() {
            return Err(CheckoutError::SubmissionInProgress);
        }
        Ok(())
    }

    fn ensure_method(&self, expected: MethodTag) -> Result<(), CheckoutError> {
        if self.active_tag() != expected {
            return Err(CheckoutError::WrongMethod {
                expected: expected.to_string(),
                active: self.active_tag().to_string(),
            });
        }
        Ok(())
    }

    /// Activate a freshly defaulted method. Re-selecting the active tab keeps its state.
    pub fn switch_method(&mut self, tag: MethodTag) -> Result<(), CheckoutError> {
        self.ensure_mutable()?;
        let previous = self.active_tag();
        if previous == tag {
            return Ok(());
        }

        if previous == MethodTag::Qr {
            self.timer.stop();
        }
        self.active_method = PaymentMethod::default_for(tag, self.qr_ttl_seconds);
        self.quick_pick_bank = None;
        if tag == MethodTag::Qr {
            self.timer.restart();
        }

        debug!(from = %previous, to = %tag, "Payment method switched");
        Ok(())
    }

    pub fn select_upi_mode(&mut self, mode: UpiSubMode) -> Result<(), CheckoutError> {
        self.ensure_mutable()?;
        self.ensure_method(MethodTag::Upi)?;
        if let PaymentMethod::Upi { sub_mode, .. } = &mut self.active_method {
            *sub_mode = mode;
        }
        Ok(())
    }

    /// Select the paying bank. An empty code (the dropdown placeholder) is ignored.
    pub fn select_bank(&mut self, choice: BankChoice) -> Result<(), CheckoutError> {
        self.ensure_mutable()?;
        self.ensure_method(MethodTag::NetBanking)?;

        let (code, highlight) = match choice {
            BankChoice::QuickPick(code) => (code.trim().to_string(), true),
            BankChoice::Other(code) => (code.trim().to_string(), false),
        };
        if code.is_empty() {
            return Ok(());
        }

        if let PaymentMethod::NetBanking { bank_code } = &mut self.active_method {
            *bank_code = Some(code.clone());
        }
        self.quick_pick_bank = highlight.then_some(code);
        Ok(())
    }

    /// Store a normalized field value. Returns false when the field belongs to
    /// an inactive method or the session no longer accepts input.
    pub fn update_field(&mut self, field: PaymentField, raw: &str) -> bool {
        if self.ensure_mutable().is_err() {
            return false;
        }

        match (&mut self.active_method, field) {
            (PaymentMethod::Upi { vpa_id, .. }, PaymentField::VpaId) => {
                let value = raw.trim();
                *vpa_id = (!value.is_empty()).then(|| value.to_string());
            }
            (PaymentMethod::Card { number, .. }, PaymentField::CardNumber) => {
                *number = formatting::format_card_number(raw);
            }
            (PaymentMethod::Card { expiry, .. }, PaymentField::Expiry) => {
                *expiry = formatting::format_expiry(raw);
            }
            (PaymentMethod::Card { cvv, .. }, PaymentField::Cvv) => {
                *cvv = raw.to_string();
            }
            (PaymentMethod::Card { holder_name, .. }, PaymentField::HolderName) => {
                *holder_name = raw.to_string();
            }
            _ => return false,
        }
        true
    }

    /// Brand icon for the card number entered so far
    pub fn card_brand(&self) -> Option<CardBrand> {
        self.active_method.card_brand()
    }

    pub fn validate(&self) -> ValidationResult {
        validation::validate(&self.active_method)
    }

    pub fn pay_button_label(&self) -> String {
        let amount = format!("₹{}", self.donation.amount.normalize());
        match self.active_tag() {
            MethodTag::Qr => format!("Scan QR to Pay {}", amount),
            tag => format!("Pay {} via {}", amount, tag.display_name()),
        }
    }

    pub fn summary(&self) -> CheckoutSummary {
        CheckoutSummary {
            recipient: self.donation.recipient_label.clone(),
            hospital: self.donation.hospital_label.clone(),
            amount: self.donation.amount,
            method: self.active_tag(),
        }
    }

    pub fn qr_state(&self) -> QrTimerState {
        self.timer.state()
    }

    pub fn watch_qr(&self) -> watch::Receiver<QrTimerState> {
        self.timer.subscribe()
    }

    pub fn qr_timer_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn qr_tick_count(&self) -> u64 {
        self.timer.tick_count()
    }

    /// Expiry events; can be taken once
    pub fn take_timer_events(&mut self) -> Option<mpsc::UnboundedReceiver<TimerEvent>> {
        self.timer_events.take()
    }

    /// Issue a new QR code and restart its countdown
    pub fn regenerate_qr(&mut self) -> Result<(), CheckoutError> {
        self.ensure_mutable()?;
        self.ensure_method(MethodTag::Qr)?;
        self.active_method = PaymentMethod::default_for(MethodTag::Qr, self.qr_ttl_seconds);
        self.timer.restart();
        info!("QR code regenerated");
        Ok(())
    }

    /// Abandon checkout
    pub fn cancel(&mut self) -> Result<(), CheckoutError> {
        if self.submission_state.is_in_flight() {
            return Err(CheckoutError::SubmissionInProgress);
        }
        self.timer.stop();
        self.cancelled = true;
        info!(donation_ref = self.donation.reference().unwrap_or("-"), "Checkout cancelled");
        Ok(())
    }

    /// Page is going away; stop periodic work
    pub fn teardown(&mut self) {
        self.timer.stop();
    }

    pub(crate) fn transition(&mut self, next: SubmissionState) {
        debug!(from = ?self.submission_state, to = ?next, "Submission state changed");
        self.submission_state = next;
    }

    /// Freeze what the gateway will charge; the amount always comes from the donation
    pub(crate) fn charge_request(&self) -> ChargeRequest {
        ChargeRequest {
            donation_ref: self.donation.reference().map(str::to_string),
            amount: self.donation.amount,
            method: self.active_method.clone(),
            requested_at: Utc::now(),
        }
    }

    pub(crate) fn record_success(&mut self, receipt: PaymentReceipt) {
        self.timer.stop();
        self.last_failure = None;
        self.receipt = Some(receipt);
        self.transition(SubmissionState::Succeeded);
    }

    /// Failed is reported, then the session returns to Idle for an explicit retry
    pub(crate) fn record_failure(&mut self, error: GatewayError) {
        self.transition(SubmissionState::Failed(error.clone()));
        self.last_failure = Some(error);
        self.transition(SubmissionState::Idle);
    }
}
