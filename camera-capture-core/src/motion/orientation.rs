use serde::{Deserialize, Serialize};

/// Threshold, in g-units, beyond which an accelerometer axis wins the
/// orientation classification. Samples inside the threshold on both axes are
/// ambiguous and keep the prior orientation (hysteresis).
const ORIENTATION_THRESHOLD_G: f64 = 0.75;

/// One accelerometer sample, in g-units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl MotionSample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Coarse four-way device orientation derived from gravity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeviceOrientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

/// Classify a sample against the previous orientation. First match wins;
/// ambiguous samples retain `previous`.
pub fn classify(sample: MotionSample, previous: DeviceOrientation) -> DeviceOrientation {
    if sample.x >= ORIENTATION_THRESHOLD_G {
        DeviceOrientation::LandscapeLeft
    } else if sample.x <= -ORIENTATION_THRESHOLD_G {
        DeviceOrientation::LandscapeRight
    } else if sample.y <= -ORIENTATION_THRESHOLD_G {
        DeviceOrientation::Portrait
    } else if sample.y >= ORIENTATION_THRESHOLD_G {
        DeviceOrientation::PortraitUpsideDown
    } else {
        previous
    }
}

/// Sticky orientation state fed by periodic accelerometer samples.
#[derive(Debug, Clone, Copy)]
pub struct OrientationTracker {
    current: DeviceOrientation,
}

impl OrientationTracker {
    pub fn new() -> Self {
        Self {
            current: DeviceOrientation::Portrait,
        }
    }

    pub fn current(&self) -> DeviceOrientation {
        self.current
    }

    /// Ingest a sample; errored samples arrive as `None` and are ignored.
    /// Returns true when the derived orientation changed.
    pub fn ingest(&mut self, sample: Option<MotionSample>) -> bool {
        let Some(sample) = sample else {
            return false;
        };
        let next = classify(sample, self.current);
        let changed = next != self.current;
        self.current = next;
        changed
    }
}

impl Default for OrientationTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_cardinal_tilts() {
        let prior = DeviceOrientation::Portrait;
        assert_eq!(
            classify(MotionSample::new(0.8, 0.0, 0.0), prior),
            DeviceOrientation::LandscapeLeft
        );
        assert_eq!(
            classify(MotionSample::new(-0.8, 0.0, 0.0), prior),
            DeviceOrientation::LandscapeRight
        );
        assert_eq!(
            classify(MotionSample::new(0.0, -0.8, 0.0), prior),
            DeviceOrientation::Portrait
        );
        assert_eq!(
            classify(MotionSample::new(0.0, 0.8, 0.0), prior),
            DeviceOrientation::PortraitUpsideDown
        );
    }

    #[test]
    fn ambiguous_sample_keeps_previous() {
        assert_eq!(
            classify(
                MotionSample::new(0.1, 0.1, 0.0),
                DeviceOrientation::LandscapeRight
            ),
            DeviceOrientation::LandscapeRight
        );
    }

    #[test]
    fn x_axis_wins_over_y() {
        // First-match ordering: a hard landscape tilt beats a simultaneous
        // portrait component.
        assert_eq!(
            classify(
                MotionSample::new(0.9, -0.9, 0.0),
                DeviceOrientation::Portrait
            ),
            DeviceOrientation::LandscapeLeft
        );
    }

    #[test]
    fn tracker_ignores_errored_samples() {
        let mut tracker = OrientationTracker::new();
        assert!(tracker.ingest(Some(MotionSample::new(0.8, 0.0, 0.0))));
        assert_eq!(tracker.current(), DeviceOrientation::LandscapeLeft);

        assert!(!tracker.ingest(None));
        assert_eq!(tracker.current(), DeviceOrientation::LandscapeLeft);
    }

    #[test]
    fn tracker_reports_change_only_on_transition() {
        let mut tracker = OrientationTracker::new();
        assert!(!tracker.ingest(Some(MotionSample::new(0.0, -0.9, 0.0))));
        assert!(tracker.ingest(Some(MotionSample::new(0.9, 0.0, 0.0))));
        assert!(!tracker.ingest(Some(MotionSample::new(0.9, 0.0, 0.0))));
    }
}
