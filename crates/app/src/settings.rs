//! Engine settings, normalized by the binary from its configuration.

use std::time::Duration;

use hcbridge_domain::temperature::TemperatureUnit;

/// Poll interval used when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSettings {
    /// Delay between poll cycles; zero disables the poller.
    pub poll_interval: Duration,
    /// How long a manual thermostat setpoint holds; zero means forever.
    pub thermostat_timeout: Duration,
    /// Derive the thermostat heating/cooling state automatically.
    pub cooling_management: bool,
    /// Global variables exposed as switches.
    pub switch_global_variables: Vec<String>,
    /// Expose the security system accessory.
    pub security_system: bool,
    /// Unit the hub reports temperatures in.
    pub temperature_unit: TemperatureUnit,
    /// Delay between startup reconciliation attempts.
    pub reconcile_retry: Duration,
}

impl BridgeSettings {
    #[must_use]
    pub fn poller_enabled(&self) -> bool {
        !self.poll_interval.is_zero()
    }
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            thermostat_timeout: Duration::from_secs(2 * 3600),
            cooling_management: false,
            switch_global_variables: Vec::new(),
            security_system: false,
            temperature_unit: TemperatureUnit::Celsius,
            reconcile_retry: Duration::from_secs(10),
        }
    }
}
