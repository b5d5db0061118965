//! Dispatcher configuration types

use std::time::Duration;

/// Whether the host owns the forwarding toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherMode {
    /// The viewer drives forwarding itself; forcing it is refused.
    Standalone,
    /// Embedded in a host application that may force forwarding on.
    Embedded,
}

/// When frames are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Decode only while some subscriber wants decoded images.
    OnDemand,
    /// Decode every forwarded frame.
    Always,
    /// Forward raw frames only.
    Never,
}

/// Which thread decodes and notifies subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Copy the raw frame and hand it to a worker; newest frame wins.
    Worker,
    /// Decode and notify on the driver's delivery thread.
    Inline,
}

/// Configuration for a frame dispatcher
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub mode: DispatcherMode,
    pub decode_policy: DecodePolicy,
    pub delivery: Delivery,
    /// Keep a copy of the most recent frame for `latest_frame()`
    pub retain_latest: bool,
    /// Thread name of the decode worker
    pub worker_name: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            mode: DispatcherMode::Standalone,
            decode_policy: DecodePolicy::OnDemand,
            delivery: Delivery::Worker,
            retain_latest: true,
            worker_name: "frame-decode".to_string(),
        }
    }
}

impl DispatcherConfig {
    pub fn builder() -> DispatcherConfigBuilder {
        DispatcherConfigBuilder::default()
    }
}

/// Builder for DispatcherConfig
#[derive(Default)]
pub struct DispatcherConfigBuilder {
    mode: Option<DispatcherMode>,
    decode_policy: Option<DecodePolicy>,
    delivery: Option<Delivery>,
    retain_latest: Option<bool>,
    worker_name: Option<String>,
}

impl DispatcherConfigBuilder {
    pub fn mode(mut self, mode: DispatcherMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.decode_policy = Some(policy);
        self
    }

    pub fn delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = Some(delivery);
        self
    }

    pub fn retain_latest(mut self, retain: bool) -> Self {
        self.retain_latest = Some(retain);
        self
    }

    pub fn worker_name(mut self, name: impl Into<String>) -> Self {
        self.worker_name = Some(name.into());
        self
    }

    pub fn build(self) -> DispatcherConfig {
        let default = DispatcherConfig::default();
        DispatcherConfig {
            mode: self.mode.unwrap_or(default.mode),
            decode_policy: self.decode_policy.unwrap_or(default.decode_policy),
            delivery: self.delivery.unwrap_or(default.delivery),
            retain_latest: self.retain_latest.unwrap_or(default.retain_latest),
            worker_name: self.worker_name.unwrap_or(default.worker_name),
        }
    }
}

/// Counters of a dispatcher since creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Frames accepted while forwarding was enabled
    pub delivered: u64,
    /// Frames replaced in the worker slot before they were processed
    pub dropped: u64,
    pub decoded: u64,
    pub decode_failures: u64,
    pub decode_time: Duration,
}

impl DispatchStats {
    pub fn average_decode_time(&self) -> Option<Duration> {
        (self.decoded > 0).then(|| {
            Duration::from_nanos((self.decode_time.as_nanos() / self.decoded as u128) as u64)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = DispatcherConfig::builder()
            .mode(DispatcherMode::Embedded)
            .decode_policy(DecodePolicy::Always)
            .delivery(Delivery::Inline)
            .retain_latest(false)
            .worker_name("cam0-decode")
            .build();

        assert_eq!(config.mode, DispatcherMode::Embedded);
        assert_eq!(config.decode_policy, DecodePolicy::Always);
        assert_eq!(config.delivery, Delivery::Inline);
        assert!(!config.retain_latest);
        assert_eq!(config.worker_name, "cam0-decode");
    }

    #[test]
    fn test_builder_defaults() {
        let config = DispatcherConfig::builder().build();
        assert_eq!(config.mode, DispatcherMode::Standalone);
        assert_eq!(config.decode_policy, DecodePolicy::OnDemand);
        assert_eq!(config.delivery, Delivery::Worker);
        assert!(config.retain_latest);
    }

    #[test]
    fn test_average_decode_time() {
        let mut stats = DispatchStats::default();
        assert_eq!(stats.average_decode_time(), None);
        stats.decoded = 4;
        stats.decode_time = Duration::from_millis(20);
        assert_eq!(stats.average_decode_time(), Some(Duration::from_millis(5)));

        // A count that does not fit in u32.
        stats.decoded = 1 << 32;
        stats.decode_time = Duration::from_secs(1 << 32);
        assert_eq!(stats.average_decode_time(), Some(Duration::from_secs(1)));
    }
}
