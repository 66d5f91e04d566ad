//! Test data builders for creating test objects

use motion_recorder::{Channel, RecorderConfig, SensorSample};
use std::path::Path;

/// Builder for creating test SensorSamples
pub struct SampleBuilder {
    channel: Channel,
    timestamp: f64,
    values: Vec<f64>,
}

impl SampleBuilder {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            timestamp: 0.0,
            values: vec![0.0, 0.0, 0.0],
        }
    }

    pub fn at(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn values(mut self, values: &[f64]) -> Self {
        self.values = values.to_vec();
        self
    }

    pub fn build(self) -> SensorSample {
        SensorSample::new(self.channel, self.timestamp, self.values)
    }
}

/// Configuration exporting into `dir`, every channel enabled
pub fn config_in(dir: &Path) -> RecorderConfig {
    RecorderConfig::new().with_export_dir(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_builder_defaults() {
        let sample = SampleBuilder::new(Channel::Gyroscope).build();
        assert_eq!(sample.channel, Channel::Gyroscope);
        assert_eq!(sample.values, vec![0.0, 0.0, 0.0]);
    }
}
