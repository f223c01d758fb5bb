//! Unit attribute and position updates
//!
//! These operations never drive the lifecycle state machine except for
//! LOW_SUPPLIES, which a logistics update raises when a unit falls to
//! its resupply thresholds and clears once it is back above both.

use crate::core::config::config;
use crate::core::error::{FirelineError, Result};
use crate::core::types::{Timestamp, UnitId, UserId};
use crate::geo::{format_dms, GeoPoint};
use crate::ledger::{HistoryEvent, HistoryKind};
use crate::unit::{transition, RoutePoint, Transition, UnitEvent, UnitSituation, UnitStatus};
use crate::world::WorldState;

/// Partial logistics update; absent fields are left untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct LogisticsUpdate {
    pub fuel_level: Option<u8>,
    pub ammo_level: Option<u8>,
    pub days_of_supply: Option<u32>,
}

/// Apply a logistics update, raising or clearing the unit's supply
/// warning against the resupply thresholds.
pub fn update_logistics(
    world: &mut WorldState,
    unit_id: UnitId,
    update: LogisticsUpdate,
    user: Option<UserId>,
    now: Timestamp,
) -> Result<()> {
    for (label, value) in [("Fuel", update.fuel_level), ("Ammo", update.ammo_level)] {
        if let Some(v) = value {
            if v > 100 {
                return Err(FirelineError::Validation(format!(
                    "{} level must be a percentage, got {}",
                    label, v
                )));
            }
        }
    }

    let cfg = config();
    let name = world.require_unit(unit_id)?.name.clone();
    let mut changes = Vec::new();
    let mut cleared = false;
    let mut warned = false;

    {
        let unit = world.require_unit_mut(unit_id)?;
        if let Some(fuel) = update.fuel_level {
            changes.push(format!("fuel {}% -> {}%", unit.fuel_level, fuel));
            unit.fuel_level = fuel;
        }
        if let Some(ammo) = update.ammo_level {
            changes.push(format!("ammo {}% -> {}%", unit.ammo_level, ammo));
            unit.ammo_level = ammo;
        }
        if let Some(days) = update.days_of_supply {
            changes.push(format!("supply {}d -> {}d", unit.days_of_supply, days));
            unit.days_of_supply = days;
        }
        if changes.is_empty() {
            return Ok(());
        }
        unit.last_resupply = now;

        if unit.ammo_level > cfg.resupply_ammo_percent && unit.days_of_supply > cfg.resupply_supply_days {
            if let Transition::To(next) = transition(unit.status, UnitEvent::Resupply) {
                unit.status = next;
                cleared = true;
            }
        } else if matches!(unit.status, UnitStatus::Operational | UnitStatus::Moving | UnitStatus::Static) {
            unit.status = UnitStatus::LowSupplies;
            warned = true;
        }
    }

    let mut details = format!("Logistics updated for {}: {}.", name, changes.join(", "));
    if cleared {
        details.push_str(" Supply warning cleared.");
    }
    if warned {
        details.push_str(" Unit is low on supplies.");
    }
    let mut event = HistoryEvent::new(HistoryKind::LogisticsUpdated, details, now).with_unit(unit_id, name);
    if let Some(user) = user {
        event = event.with_user(user);
    }
    world.history.record(event);

    Ok(())
}

/// Replace the unit's equipment and/or capability lists
pub fn update_attributes(
    world: &mut WorldState,
    unit_id: UnitId,
    equipment: Option<Vec<String>>,
    capabilities: Option<Vec<String>>,
    now: Timestamp,
) -> Result<()> {
    let name = world.require_unit(unit_id)?.name.clone();
    let mut changes = Vec::new();

    {
        let unit = world.require_unit_mut(unit_id)?;
        if let Some(equipment) = equipment {
            changes.push(format!("equipment ({} items)", equipment.len()));
            unit.equipment = equipment;
        }
        if let Some(capabilities) = capabilities {
            changes.push(format!("capabilities ({} items)", capabilities.len()));
            unit.capabilities = capabilities;
        }
    }
    if changes.is_empty() {
        return Ok(());
    }

    world.history.record(
        HistoryEvent::new(
            HistoryKind::AttributesUpdated,
            format!("Attributes updated for {}: {}.", name, changes.join(", ")),
            now,
        )
        .with_unit(unit_id, name),
    );

    Ok(())
}

/// Change the unit's assigned mission text
pub fn update_mission(
    world: &mut WorldState,
    unit_id: UnitId,
    mission: impl Into<String>,
    now: Timestamp,
) -> Result<()> {
    let mission = mission.into();
    let name = world.require_unit(unit_id)?.name.clone();

    let old = {
        let unit = world.require_unit_mut(unit_id)?;
        unit.current_mission.replace(mission.clone()).unwrap_or_else(|| "None".to_string())
    };

    world.history.record(
        HistoryEvent::new(HistoryKind::MissionChanged, format!("Mission changed for {}.", name), now)
            .with_unit(unit_id, name)
            .with_values(old, mission),
    );

    Ok(())
}

/// Change the unit's attachment situation
pub fn update_situation(
    world: &mut WorldState,
    unit_id: UnitId,
    situation: UnitSituation,
    now: Timestamp,
) -> Result<()> {
    let name = world.require_unit(unit_id)?.name.clone();

    let old = {
        let unit = world.require_unit_mut(unit_id)?;
        let old = unit.situation;
        unit.situation = situation;
        old
    };
    if old == situation {
        return Ok(());
    }

    world.history.record(
        HistoryEvent::new(HistoryKind::SituationChanged, format!("Situation changed for {}.", name), now)
            .with_unit(unit_id, name)
            .with_values(format!("{:?}", old), format!("{:?}", situation)),
    );

    Ok(())
}

/// Ingest a SPOT position report: move the unit, extend its route history
/// and infer MOVING/STATIC. Combat and off-picture states are preserved.
pub fn process_spot_report(
    world: &mut WorldState,
    unit_id: UnitId,
    location: GeoPoint,
    now: Timestamp,
) -> Result<()> {
    let cfg = config();
    let name = world.require_unit(unit_id)?.name.clone();

    let moved = {
        let unit = world.require_unit_mut(unit_id)?;
        let moved = unit.location != location;
        unit.location = location;
        unit.route_history.push(RoutePoint { location, timestamp: now });
        if unit.route_history.len() > cfg.max_route_points {
            let excess = unit.route_history.len() - cfg.max_route_points;
            unit.route_history.drain(..excess);
        }
        unit.last_communication = now;
        if moved {
            unit.last_movement = now;
        }
        match unit.status {
            UnitStatus::Engaged | UnitStatus::AarPending | UnitStatus::OnLeaveRetraining => {}
            _ => {
                unit.status = if moved { UnitStatus::Moving } else { UnitStatus::Static };
            }
        }
        moved
    };

    world.history.record(
        HistoryEvent::new(
            HistoryKind::SpotReport,
            format!(
                "SPOT report from {}: {} at {}.",
                name,
                if moved { "moving" } else { "holding" },
                format_dms(location)
            ),
            now,
        )
        .with_unit(unit_id, name)
        .with_location(location),
    );

    Ok(())
}
