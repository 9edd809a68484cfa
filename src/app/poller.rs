//! Fixed-interval registration loop
//!
//! One spawned task fires an attempt every interval until the portal
//! reports success or [`Poller::stop`] is called. Failures and network
//! errors are logged and the next tick proceeds exactly like the first:
//! no backoff, no retry limit.
//!
//! The selection (target, category, term) is read from a watch channel at
//! every tick, so changes made while running reach the next request. A tick
//! with no target selected is skipped.

use crate::error::{ErrorKind, Result};
use crate::interface::RequestApi;
use crate::model::dtos::{PollConfig, RegistrationForm};
use crate::model::structs::CourseRecord;
use crate::session::SessionCookies;
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};

/// Body fragments the portal uses to report a successful registration.
const SUCCESS_MARKERS: [&str; 2] = ["成功", r#""jg":"1""#];

/// Characters of a rejected body kept for the log.
const PREVIEW_CHARS: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Running,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    /// Portal answered but did not register the course; holds a preview
    /// of the body.
    Rejected(String),
    /// Request never produced a body (timeout, connection reset, ...).
    TransientError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    Attempted { attempt: u64, outcome: AttemptOutcome },
    Succeeded { course: CourseRecord, attempts: u64 },
    Stopped,
}

pub fn classify_response(body: &str) -> AttemptOutcome {
    if SUCCESS_MARKERS.iter().any(|marker| body.contains(marker)) {
        AttemptOutcome::Success
    } else {
        AttemptOutcome::Rejected(body.chars().take(PREVIEW_CHARS).collect())
    }
}

pub struct Poller<C> {
    client: Arc<C>,
    state: Arc<watch::Sender<PollState>>,
    // Bumped on every start and on every success; a run whose generation
    // is no longer current exits at its next tick
    generation: Arc<AtomicU64>,
    // Shared across runs: a restarted loop must not overlap an attempt
    // still in flight from the previous run
    in_flight: Arc<AtomicBool>,
    stop_tx: Option<watch::Sender<bool>>,
    events: mpsc::UnboundedSender<PollEvent>,
}

impl<C: RequestApi> Poller<C> {
    pub fn new(client: Arc<C>) -> (Self, mpsc::UnboundedReceiver<PollEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(PollState::Idle);
        let poller = Self {
            client,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: Arc::new(AtomicBool::new(false)),
            stop_tx: None,
            events,
        };
        (poller, rx)
    }

    pub fn state(&self) -> PollState {
        *self.state.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.state() == PollState::Running
    }

    pub fn subscribe_state(&self) -> watch::Receiver<PollState> {
        self.state.subscribe()
    }

    /// Begin polling with the live selection behind `config`. Fails without
    /// changing state when there are no cookies, no target course, or a
    /// loop is already running.
    ///
    /// The interval is fixed for the run; everything else in the config is
    /// re-read at each tick.
    pub fn start(
        &mut self,
        config: watch::Receiver<PollConfig>,
        session: &SessionCookies,
    ) -> Result<()> {
        if self.is_running() {
            return Err(ErrorKind::PollerError("already running".to_string()).into());
        }
        if session.is_empty() {
            tracing::warn!("请先登录: no session cookies captured");
            return Err(ErrorKind::SessionError("请先登录".to_string()).into());
        }
        let current = config.borrow().clone();
        let target = current.target.ok_or_else(|| {
            tracing::warn!("请先选课: no target course selected");
            ErrorKind::CourseError("请先选课".to_string())
        })?;

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (stop_tx, stop_rx) = watch::channel(false);
        self.state.send_replace(PollState::Running);
        self.stop_tx = Some(stop_tx);

        tracing::info!(
            interval_ms = current.interval.as_millis(),
            category = current.category.code(),
            "开始抢: {}",
            target.name
        );

        let run = Run {
            client: Arc::clone(&self.client),
            session: session.clone(),
            config,
            interval: current.interval.as_duration(),
            state: Arc::clone(&self.state),
            generation: Arc::clone(&self.generation),
            run_generation: generation,
            in_flight: Arc::clone(&self.in_flight),
            events: self.events.clone(),
            stop_rx,
        };
        tokio::spawn(run.execute());
        Ok(())
    }

    /// Cancel future ticks. Returns whether a running loop was stopped;
    /// calling it while idle does nothing.
    pub fn stop(&mut self) -> bool {
        let was_running = self.is_running();
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
        }
        if !was_running {
            return false;
        }
        self.state.send_replace(PollState::Idle);
        let _ = self.events.send(PollEvent::Stopped);
        tracing::info!("已停止");
        true
    }
}

impl<C> Drop for Poller<C> {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
        }
    }
}

struct Run<C> {
    client: Arc<C>,
    session: SessionCookies,
    config: watch::Receiver<PollConfig>,
    interval: std::time::Duration,
    state: Arc<watch::Sender<PollState>>,
    generation: Arc<AtomicU64>,
    run_generation: u64,
    in_flight: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<PollEvent>,
    stop_rx: watch::Receiver<bool>,
}

impl<C: RequestApi> Run<C> {
    async fn execute(mut self) {
        let period = self.interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut attempt = 0u64;

        loop {
            tokio::select! {
                biased;
                _ = self.stop_rx.changed() => break,
                _ = ticker.tick() => {}
            }

            if !self.is_current() {
                break;
            }

            let current = self.config.borrow().clone();
            let Some(target) = current.target.clone() else {
                tracing::debug!("no target selected, skipping tick");
                continue;
            };

            if self
                .in_flight
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                tracing::debug!("previous attempt still in flight, skipping tick");
                continue;
            }
            attempt += 1;
            let outcome = self.attempt(&current, &target).await;
            self.in_flight.store(false, Ordering::Release);

            let succeeded = outcome == AttemptOutcome::Success;
            match &outcome {
                AttemptOutcome::Success => {
                    tracing::info!(attempt, "抢到了！{}", target.name)
                }
                AttemptOutcome::Rejected(preview) => {
                    tracing::warn!(attempt, "失败: {preview}...")
                }
                AttemptOutcome::TransientError(e) => {
                    tracing::warn!(attempt, "网络错误: {e}")
                }
            }
            let _ = self.events.send(PollEvent::Attempted { attempt, outcome });

            if succeeded {
                let _ = self.events.send(PollEvent::Succeeded {
                    course: target,
                    attempts: attempt,
                });
                // Registered: whichever run is current, including one
                // started while this attempt was in flight, is done too
                self.generation.fetch_add(1, Ordering::SeqCst);
                self.state.send_replace(PollState::Idle);
                return;
            }
        }

        if self.is_current() {
            self.state.send_if_modified(|state| {
                let changed = *state == PollState::Running;
                *state = PollState::Idle;
                changed
            });
        }
    }

    fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.run_generation
    }

    async fn attempt(&self, config: &PollConfig, target: &CourseRecord) -> AttemptOutcome {
        let form = RegistrationForm::new(&config.term, config.category, target);
        tracing::debug!(pid = %target.pid, kcdm = %target.course_code, "submitting");

        match self.client.add_to_cart(form, self.session.snapshot()).await {
            Ok(body) => classify_response(&body),
            Err(e) => AttemptOutcome::TransientError(e.to_string()),
        }
    }
}
