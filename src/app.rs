//! Service object tying the monitor and the countdown together.

use std::sync::Arc;

use escalation_core::{CountdownState, Transition};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::alerts::{AlertActuator, AudioPlayer, Haptics};
use crate::config::Settings;
use crate::countdown::CountdownController;
use crate::dispatch::{AlertTransport, ErrorReporter, EscalationDispatcher};
use crate::monitor::MotionMonitor;
use crate::profile::ProfileStore;
use crate::sensor::SensorSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonitorMode {
    /// Impacts arm the countdown; the manual control works too.
    Motion,
    /// No sensor: only the manual control can start a countdown.
    ManualOnly,
}

/// Platform collaborators.
pub struct Services {
    pub audio: Arc<dyn AudioPlayer>,
    pub haptics: Arc<dyn Haptics>,
    pub transport: Arc<dyn AlertTransport>,
    pub reporter: Arc<dyn ErrorReporter>,
    pub profiles: Arc<dyn ProfileStore>,
}

pub struct CrashGuard {
    controller: CountdownController,
    monitor: MotionMonitor,
    monitor_task: Option<JoinHandle<u64>>,
    mode: MonitorMode,
}

impl CrashGuard {
    pub fn new(settings: &Settings, services: Services) -> Self {
        let alerts = AlertActuator::new(settings.alerts.clone(), services.audio, services.haptics);
        let dispatcher = EscalationDispatcher::new(
            services.transport,
            services.reporter,
            settings.dispatch_timeout(),
        );
        let controller = CountdownController::new(
            settings.windows(),
            settings.tick_interval(),
            alerts,
            dispatcher,
            services.profiles,
        );
        Self {
            controller,
            monitor: MotionMonitor::new(settings.tilt_threshold),
            monitor_task: None,
            mode: MonitorMode::ManualOnly,
        }
    }

    /// Subscribes to `sensor`. If the sensor is refused the guard keeps
    /// running with the manual control only.
    pub fn start(&mut self, sensor: &dyn SensorSource) -> MonitorMode {
        if self.monitor_task.as_ref().is_some_and(|task| !task.is_finished()) {
            return self.mode;
        }
        self.mode = match sensor.subscribe() {
            Ok(subscription) => {
                let monitor = self.monitor;
                let controller = self.controller.clone();
                self.monitor_task = Some(tokio::spawn(async move {
                    monitor.run(subscription, controller).await
                }));
                log::info!("Watching for impacts above {:.2}", monitor.threshold());
                MonitorMode::Motion
            }
            Err(e) => {
                log::warn!("{}; crash detection limited to manual trigger", e);
                MonitorMode::ManualOnly
            }
        };
        self.mode
    }

    pub async fn manual_toggle(&self) -> Transition {
        self.controller.manual_toggle().await
    }

    pub fn state(&self) -> watch::Receiver<CountdownState> {
        self.controller.state()
    }

    pub fn controller(&self) -> &CountdownController {
        &self.controller
    }

    pub fn mode(&self) -> MonitorMode {
        self.mode
    }

    /// Drops the sensor subscription and stops any countdown. Safe to call
    /// more than once.
    pub async fn shutdown(&mut self) {
        if let Some(task) = self.monitor_task.take() {
            task.abort();
            // Wait for the task to drop its subscription.
            let _ = task.await;
        }
        self.mode = MonitorMode::ManualOnly;
        self.controller.teardown().await;
    }
}
