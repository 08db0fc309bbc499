//! Countdown controller: owns the state machine, the tick source and the
//! alert session, and hands expired countdowns to the dispatcher.
//!
//! ```text
//!   Idle ──arm──► Running ──cancel──► Idle
//!                    │
//!                    └──tick(remaining == 0)──► Escalated ──reset──► Idle
//! ```
//!
//! Every transition happens under one async mutex, so a sensor trigger, a
//! manual toggle and a tick arriving together are applied one at a time.

use std::sync::Arc;
use std::time::Duration;

use escalation_core::{ArmSource, CountdownCore, CountdownState, Transition, Windows};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::alerts::AlertActuator;
use crate::dispatch::{EmergencyPayload, EscalationDispatcher};
use crate::profile::ProfileStore;

struct Inner {
    core: CountdownCore,
    alerts: AlertActuator,
    ticker: Option<JoinHandle<()>>,
}

enum TickOutcome {
    Continue,
    Stop,
    Escalate(EmergencyPayload),
}

#[derive(Clone)]
pub struct CountdownController {
    inner: Arc<Mutex<Inner>>,
    state_tx: Arc<watch::Sender<CountdownState>>,
    dispatcher: Arc<EscalationDispatcher>,
    profiles: Arc<dyn ProfileStore>,
    tick_interval: Duration,
}

impl CountdownController {
    pub fn new(
        windows: Windows,
        tick_interval: Duration,
        alerts: AlertActuator,
        dispatcher: EscalationDispatcher,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        let core = CountdownCore::new(windows);
        let (state_tx, _) = watch::channel(core.state());
        Self {
            inner: Arc::new(Mutex::new(Inner {
                core,
                alerts,
                ticker: None,
            })),
            state_tx: Arc::new(state_tx),
            dispatcher: Arc::new(dispatcher),
            profiles,
            tick_interval,
        }
    }

    /// Observable countdown state for display.
    pub fn state(&self) -> watch::Receiver<CountdownState> {
        self.state_tx.subscribe()
    }

    pub fn snapshot(&self) -> CountdownState {
        *self.state_tx.borrow()
    }

    pub async fn arm(&self, source: ArmSource) -> Transition {
        let mut inner = self.inner.lock().await;
        self.arm_locked(&mut inner, source)
    }

    pub async fn cancel(&self) -> Transition {
        let mut inner = self.inner.lock().await;
        self.cancel_locked(&mut inner)
    }

    /// Start/stop control: cancels a running countdown, otherwise starts one
    /// with the manual window.
    pub async fn manual_toggle(&self) -> Transition {
        let mut inner = self.inner.lock().await;
        if inner.core.state().is_running() {
            self.cancel_locked(&mut inner)
        } else {
            self.arm_locked(&mut inner, ArmSource::Manual)
        }
    }

    /// Stops everything regardless of state. Safe to call repeatedly.
    pub async fn teardown(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(ticker) = inner.ticker.take() {
            ticker.abort();
        }
        if inner.alerts.deactivate() {
            log::debug!("Alert session released on teardown");
        }
        if inner.core.cancel() == Transition::Cancelled {
            log::info!("Countdown torn down while active");
            self.publish(&inner);
        }
    }

    fn arm_locked(&self, inner: &mut Inner, source: ArmSource) -> Transition {
        let transition = inner.core.arm(source);
        if let Transition::Armed { remaining } = transition {
            log::info!("Countdown armed ({:?}): {} seconds to respond", source, remaining);
            inner.alerts.activate();
            let ticker = self.spawn_ticker(inner.core.episode());
            if let Some(stale) = inner.ticker.replace(ticker) {
                stale.abort();
            }
            self.publish(inner);
        }
        transition
    }

    fn cancel_locked(&self, inner: &mut Inner) -> Transition {
        let transition = inner.core.cancel();
        if transition == Transition::Cancelled {
            if let Some(ticker) = inner.ticker.take() {
                ticker.abort();
            }
            inner.alerts.deactivate();
            log::info!("Countdown cancelled");
            self.publish(inner);
        }
        transition
    }

    async fn tick(&self, episode: u64) -> TickOutcome {
        let mut inner = self.inner.lock().await;
        if inner.core.episode() != episode {
            return TickOutcome::Stop;
        }
        match inner.core.tick() {
            Transition::Ticked { remaining } => {
                log::debug!("{} seconds left", remaining);
                self.publish(&inner);
                TickOutcome::Continue
            }
            Transition::Escalated => {
                self.publish(&inner);
                // Called from the ticker itself: detach, don't abort.
                drop(inner.ticker.take());
                inner.alerts.deactivate();
                let payload = EmergencyPayload::from_profile(self.profiles.current().as_ref());
                inner.core.reset();
                self.publish(&inner);
                log::warn!("No response before the countdown ran out, escalating");
                TickOutcome::Escalate(payload)
            }
            _ => TickOutcome::Stop,
        }
    }

    fn spawn_ticker(&self, episode: u64) -> JoinHandle<()> {
        let controller = self.clone();
        let period = self.tick_interval;
        tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                match controller.tick(episode).await {
                    TickOutcome::Continue => {}
                    TickOutcome::Stop => break,
                    TickOutcome::Escalate(payload) => {
                        controller.dispatcher.send_reported(payload).await;
                        break;
                    }
                }
            }
        })
    }

    fn publish(&self, inner: &Inner) {
        self.state_tx.send_replace(inner.core.state());
    }
}
