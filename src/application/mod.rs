//! Application layer - Checkout orchestration
//!
//! This module contains the session state, the submission controller and the
//! service that ties them to the pending donation and the donation backend.

pub mod services;

pub use services::*;
