//! Application services - Orchestration of the checkout flow

pub mod checkout_service;
pub mod checkout_session;
pub mod countdown_timer;
pub mod submission_controller;

pub use checkout_service::CheckoutService;
pub use checkout_session::{BankChoice, CheckoutSession, CheckoutSummary, SharedSession, SubmissionState};
pub use countdown_timer::{CountdownTimer, QrTimerState, TimerEvent};
pub use submission_controller::{SubmissionController, SubmitOutcome};
