//! QR code countdown
//!
//! A single owned tick task drives the countdown. Every `restart()` or
//! `stop()` bumps a generation counter and aborts the previous task, so a
//! stale tick can never land after the timer has been reset.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::QrConfig;

/// Observable countdown state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct QrTimerState {
    pub remaining_seconds: u32,
    pub expired: bool,
}

impl QrTimerState {
    fn fresh(duration_secs: u32) -> Self {
        Self {
            remaining_seconds: duration_secs,
            expired: false,
        }
    }

    /// `MM:SS`
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.remaining_seconds / 60, self.remaining_seconds % 60)
    }
}

/// Emitted once when a countdown reaches zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// The QR code is no longer payable; prompt for regeneration
    Expired,
}

pub struct CountdownTimer {
    duration_secs: u32,
    tick_interval: Duration,
    state: Arc<watch::Sender<QrTimerState>>,
    events: mpsc::UnboundedSender<TimerEvent>,
    generation: Arc<AtomicU64>,
    ticks: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl CountdownTimer {
    /// Create a stopped timer and the receiver for its expiry events
    pub fn new(config: &QrConfig) -> (Self, mpsc::UnboundedReceiver<TimerEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(QrTimerState::fresh(config.ttl_seconds));

        let timer = Self {
            duration_secs: config.ttl_seconds,
            tick_interval: Duration::from_millis(config.tick_interval_ms),
            state: Arc::new(state),
            events,
            generation: Arc::new(AtomicU64::new(0)),
            ticks: Arc::new(AtomicU64::new(0)),
            handle: None,
        };
        (timer, events_rx)
    }

    /// Reset to the full duration and start ticking.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn restart(&mut self) {
        self.cancel_task();
        let generation = self.generation.load(Ordering::SeqCst);
        self.state.send_replace(QrTimerState::fresh(self.duration_secs));

        let task = TickTask {
            generation,
            current_generation: self.generation.clone(),
            tick_interval: self.tick_interval,
            state: self.state.clone(),
            events: self.events.clone(),
            ticks: self.ticks.clone(),
        };
        self.handle = Some(tokio::spawn(task.run()));
        debug!(duration_secs = self.duration_secs, "QR countdown started");
    }

    /// Stop ticking and keep the current state
    pub fn stop(&mut self) {
        if self.cancel_task() {
            debug!(remaining = self.state.borrow().remaining_seconds, "QR countdown stopped");
        }
    }

    fn cancel_task(&mut self) -> bool {
        self.generation.fetch_add(1, Ordering::SeqCst);
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Whether a live tick sequence exists
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn state(&self) -> QrTimerState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<QrTimerState> {
        self.state.subscribe()
    }

    /// Ticks applied since creation, across restarts
    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.cancel_task();
    }
}

struct TickTask {
    generation: u64,
    current_generation: Arc<AtomicU64>,
    tick_interval: Duration,
    state: Arc<watch::Sender<QrTimerState>>,
    events: mpsc::UnboundedSender<TimerEvent>,
    ticks: Arc<AtomicU64>,
}

impl TickTask {
    async fn run(self) {
        let mut interval = interval_at(Instant::now() + self.tick_interval, self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            // The generation is re-read under the watch lock so a tick can
            // never land on state that a restart has already replaced.
            let mut stale = false;
            let mut expired = false;
            self.state.send_if_modified(|s| {
                if self.current_generation.load(Ordering::SeqCst) != self.generation {
                    stale = true;
                    return false;
                }
                s.remaining_seconds = s.remaining_seconds.saturating_sub(1);
                if s.remaining_seconds == 0 {
                    s.expired = true;
                    expired = true;
                }
                true
            });
            if stale {
                return;
            }
            self.ticks.fetch_add(1, Ordering::SeqCst);

            if expired {
                info!("QR code expired");
                // Nobody listening is fine; the watch state still shows expiry.
                let _ = self.events.send(TimerEvent::Expired);
                return;
            }
        }
    }
}
