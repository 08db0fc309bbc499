use escalation_core::{exceeds_threshold, ArmSource, Transition};

use crate::countdown::CountdownController;
use crate::sensor::{AccelerationSample, SensorSubscription};

/// A sample that crossed the impact threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrashTrigger {
    pub sample: AccelerationSample,
    pub peak: f64,
}

#[derive(Clone, Copy, Debug)]
pub struct MotionMonitor {
    threshold: f64,
}

impl MotionMonitor {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Each sample is judged on its own; there is no debounce.
    pub fn on_sample(&self, sample: AccelerationSample) -> Option<CrashTrigger> {
        if exceeds_threshold(sample.x, sample.y, sample.z, self.threshold) {
            Some(CrashTrigger {
                sample,
                peak: sample.peak(),
            })
        } else {
            None
        }
    }

    /// Feeds the subscription into the controller until the stream ends.
    /// Returns the number of samples seen.
    pub async fn run(
        &self,
        mut subscription: SensorSubscription,
        controller: CountdownController,
    ) -> u64 {
        let mut seen = 0u64;
        while let Some(sample) = subscription.next().await {
            seen += 1;
            let Some(trigger) = self.on_sample(sample) else {
                continue;
            };
            if let Transition::Armed { .. } = controller.arm(ArmSource::Motion).await {
                log::warn!(
                    "Impact detected (peak {:.2} > {:.2}), countdown started",
                    trigger.peak,
                    self.threshold
                );
            }
        }
        log::info!("Sensor stream ended after {} samples", seen);
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_sample_threshold() {
        let monitor = MotionMonitor::new(2.0);
        assert_eq!(monitor.on_sample(AccelerationSample::new(0.1, 1.0, -1.9)), None);
        assert_eq!(monitor.on_sample(AccelerationSample::new(2.0, 2.0, 2.0)), None);

        let trigger = monitor
            .on_sample(AccelerationSample::new(5.0, 0.0, 0.0))
            .unwrap();
        assert_eq!(trigger.peak, 5.0);

        let trigger = monitor
            .on_sample(AccelerationSample::new(0.0, 0.5, -3.0))
            .unwrap();
        assert_eq!(trigger.peak, 3.0);
    }

    #[test]
    fn test_every_sample_independent() {
        let monitor = MotionMonitor::new(2.0);
        let hard = AccelerationSample::new(0.0, 4.0, 0.0);
        assert!(monitor.on_sample(hard).is_some());
        assert!(monitor.on_sample(hard).is_some());
    }
}
