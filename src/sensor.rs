//! Accelerometer collaborator.
//!
//! The hardware driver lives outside this crate. A [`SensorSource`] hands
//! out a [`SensorSubscription`], a stream of [`AccelerationSample`]s that
//! unsubscribes itself when dropped.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::SensorError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AccelerationSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AccelerationSample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn peak(&self) -> f64 {
        escalation_core::peak_axis(self.x, self.y, self.z)
    }
}

pub trait SensorSource: Send + Sync {
    fn subscribe(&self) -> Result<SensorSubscription, SensorError>;
}

type Unsubscribe = Box<dyn FnOnce() + Send>;

pub struct SensorSubscription {
    samples: mpsc::Receiver<AccelerationSample>,
    on_unsubscribe: Option<Unsubscribe>,
}

impl SensorSubscription {
    pub fn new(
        samples: mpsc::Receiver<AccelerationSample>,
        on_unsubscribe: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            samples,
            on_unsubscribe: Some(Box::new(on_unsubscribe)),
        }
    }

    /// Next sample, or `None` once the source has gone away.
    pub async fn next(&mut self) -> Option<AccelerationSample> {
        self.samples.recv().await
    }

    /// Safe to call any number of times; only the first call reaches the source.
    pub fn unsubscribe(&mut self) {
        if let Some(unsubscribe) = self.on_unsubscribe.take() {
            self.samples.close();
            unsubscribe();
        }
    }

    pub fn is_active(&self) -> bool {
        self.on_unsubscribe.is_some()
    }
}

impl Drop for SensorSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// In-process sensor fed by [`ChannelSensor::push`]. Used by the demo binary
/// and by tests; a platform driver would implement [`SensorSource`] directly.
#[derive(Clone)]
pub struct ChannelSensor {
    subscriber: Arc<Mutex<Slot>>,
    capacity: usize,
}

#[derive(Default)]
struct Slot {
    generation: u64,
    tx: Option<mpsc::Sender<AccelerationSample>>,
}

impl ChannelSensor {
    pub fn new(capacity: usize) -> Self {
        Self {
            subscriber: Arc::new(Mutex::new(Slot::default())),
            capacity: capacity.max(1),
        }
    }

    /// Delivers a sample to the current subscriber. Returns false when nobody
    /// is listening or the subscriber is behind.
    pub fn push(&self, sample: AccelerationSample) -> bool {
        match self.subscriber.lock().tx.as_ref() {
            Some(tx) => tx.try_send(sample).is_ok(),
            None => false,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscriber
            .lock()
            .tx
            .as_ref()
            .map(|tx| !tx.is_closed())
            .unwrap_or(false)
    }

    /// Ends the stream for the current subscriber, as a driver does on shutdown.
    pub fn close(&self) {
        self.subscriber.lock().tx.take();
    }
}

impl SensorSource for ChannelSensor {
    fn subscribe(&self) -> Result<SensorSubscription, SensorError> {
        let (tx, rx) = mpsc::channel(self.capacity);
        let generation = {
            let mut slot = self.subscriber.lock();
            if slot.tx.replace(tx).is_some() {
                log::debug!("replacing previous sensor subscriber");
            }
            slot.generation += 1;
            slot.generation
        };
        let shared = Arc::clone(&self.subscriber);
        Ok(SensorSubscription::new(rx, move || {
            let mut slot = shared.lock();
            // A newer subscriber owns the slot now; leave it alone.
            if slot.generation == generation {
                slot.tx.take();
            }
        }))
    }
}

/// A sensor the platform refused us, e.g. permission denied.
pub struct UnavailableSensor {
    reason: String,
}

impl UnavailableSensor {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl SensorSource for UnavailableSensor {
    fn subscribe(&self) -> Result<SensorSubscription, SensorError> {
        Err(SensorError::Unavailable(self.reason.clone()))
    }
}
