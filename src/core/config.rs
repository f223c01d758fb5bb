//! Operational configuration with documented constants
//!
//! All magic numbers of the coordination core are collected here with
//! explanations of their purpose and how they interact with each other.

/// Configuration for the coordination core
///
/// These values mirror the staffing rhythm of the command post they were
/// tuned against. Changing them changes how quickly the picture ages out.
#[derive(Debug, Clone)]
pub struct OpsConfig {
    // === LEDGERS ===
    /// Maximum number of alerts kept on the alert bus
    ///
    /// The bus is re-sorted newest-first and truncated to this cap on every
    /// insertion. Older alerts fall off even if unacknowledged.
    pub max_alerts: usize,

    /// Maximum number of history events kept in the ledger
    ///
    /// Same append-then-trim discipline as the alert bus, with a larger cap
    /// because history is the audit trail for every operation.
    pub max_history_events: usize,

    /// Maximum number of after-action reports retained
    pub max_after_action_reports: usize,

    /// Maximum number of points in a unit's route history
    pub max_route_points: usize,

    // === LOGISTICS THRESHOLDS ===
    /// Ammo percentage above which a resupply clears LOW_SUPPLIES
    ///
    /// Both this and `resupply_supply_days` must be exceeded for the
    /// auto-clear to fire.
    pub resupply_ammo_percent: u8,

    /// Days of supply above which a resupply clears LOW_SUPPLIES
    pub resupply_supply_days: u32,

    // === REPORTING RHYTHM ===
    /// Expected interval between unit hourly reports (ms)
    ///
    /// A unit that misses one interval gets a report-missed alert.
    pub hourly_report_interval_ms: u64,

    /// Silence after which a unit is declared out of communication (ms)
    ///
    /// At 4x the report interval, a unit has missed several consecutive
    /// reports before the status flips to NO_COMMUNICATION.
    pub communication_overdue_ms: u64,

    // === FIRE MISSIONS ===
    /// How long a completed fire mission lingers before it is purged (ms)
    ///
    /// Completed missions stay visible briefly so the requester can see the
    /// terminal state. Purely a retention window; the domain transition has
    /// already committed when the shot was confirmed.
    pub completed_mission_linger_ms: u64,
}

impl Default for OpsConfig {
    fn default() -> Self {
        Self {
            max_alerts: 50,
            max_history_events: 200,
            max_after_action_reports: 100,
            max_route_points: 50,

            resupply_ammo_percent: 20,
            resupply_supply_days: 3,

            hourly_report_interval_ms: 60 * 60 * 1000,
            communication_overdue_ms: 4 * 60 * 60 * 1000,

            completed_mission_linger_ms: 30_000,
        }
    }
}

impl OpsConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.max_alerts == 0 || self.max_history_events == 0 {
            return Err("Ledger caps must be positive".into());
        }

        // A unit must be able to miss at least one report before being
        // declared out of communication
        if self.communication_overdue_ms <= self.hourly_report_interval_ms {
            return Err(format!(
                "communication_overdue_ms ({}) should be > hourly_report_interval_ms ({})",
                self.communication_overdue_ms, self.hourly_report_interval_ms
            ));
        }

        if self.resupply_ammo_percent > 100 {
            return Err(format!(
                "resupply_ammo_percent ({}) must be a percentage",
                self.resupply_ammo_percent
            ));
        }

        Ok(())
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<OpsConfig> = OnceLock::new();

/// Get the global ops config (initializes with defaults if not set)
pub fn config() -> &'static OpsConfig {
    CONFIG.get_or_init(OpsConfig::default)
}

/// Set the global ops config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: OpsConfig) -> Result<(), OpsConfig> {
    CONFIG.set(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(OpsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_overdue_must_exceed_interval() {
        let mut cfg = OpsConfig::default();
        cfg.communication_overdue_ms = cfg.hourly_report_interval_ms;
        assert!(cfg.validate().is_err());
    }
}
