//! The command post: single-writer façade over the world
//!
//! Every exposed operation takes the world lock, runs the domain
//! transition to completion, then saves a snapshot and dispatches any
//! notification. Saves and sends are best-effort: a failed save is
//! logged, a failed send raises a NotifyFailed alert, and neither ever
//! rolls back the committed transition.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;

use crate::approval;
use crate::artillery::{AmmoStock, ArtilleryKind};
use crate::core::config::config;
use crate::core::error::Result;
use crate::core::types::{
    AlertId, MissionId, ObserverId, PieceId, RequestId, RequesterId, Timestamp, UnitId, UserId,
};
use crate::fires::coordinator::{self, MissionNotice, RequestOutcome};
use crate::fires::Projectile;
use crate::geo::GeoPoint;
use crate::ledger::{Alert, AlertKind, Severity};
use crate::logistics;
use crate::notify::TelegramClient;
use crate::persist::Persistence;
use crate::unit::lifecycle::{self, NewAfterActionReport};
use crate::unit::logistics::{self as unit_logistics, LogisticsUpdate};
use crate::unit::{Echelon, UnitSituation};
use crate::world::WorldState;

/// Wall-clock milliseconds since the Unix epoch
pub fn now_ms() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Single-writer command post over the shared world
pub struct CommandPost {
    world: Arc<Mutex<WorldState>>,
    notifier: Option<Arc<TelegramClient>>,
    store: Option<Arc<dyn Persistence>>,
}

impl CommandPost {
    pub fn new(notifier: Option<TelegramClient>, store: Option<Arc<dyn Persistence>>) -> Self {
        Self {
            world: Arc::new(Mutex::new(WorldState::new())),
            notifier: notifier.map(Arc::new),
            store,
        }
    }

    /// Build a command post from the last snapshot, or a fresh world when
    /// none exists or the snapshot fails to load.
    pub fn from_store(notifier: Option<TelegramClient>, store: Arc<dyn Persistence>) -> Self {
        let world = match store.load() {
            Ok(Some(world)) => {
                tracing::info!("snapshot restored: {} unit(s), {} piece(s)", world.units().len(), world.pieces().len());
                world
            }
            Ok(None) => WorldState::new(),
            Err(e) => {
                tracing::error!("snapshot load failed, starting empty: {}", e);
                WorldState::new()
            }
        };
        Self {
            world: Arc::new(Mutex::new(world)),
            notifier: notifier.map(Arc::new),
            store: Some(store),
        }
    }

    /// Read access to the world under the lock
    pub async fn read<R>(&self, f: impl FnOnce(&WorldState) -> R) -> R {
        let world = self.world.lock().await;
        f(&world)
    }

    async fn write<R>(&self, f: impl FnOnce(&mut WorldState) -> Result<R>) -> Result<R> {
        let mut world = self.world.lock().await;
        let result = f(&mut world)?;
        self.save_best_effort(&world);
        Ok(result)
    }

    fn save_best_effort(&self, world: &WorldState) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(world) {
                tracing::error!("snapshot save failed: {}", e);
            }
        }
    }

    /// Fire-and-forget notification dispatch. The failure path raises a
    /// MEDIUM alert instead of propagating.
    fn dispatch(&self, notice: MissionNotice, chat_id: Option<String>) {
        let Some(notifier) = self.notifier.clone() else { return };
        let Some(chat_id) = chat_id.or_else(|| notifier.default_chat_id().map(String::from)) else {
            tracing::warn!("no chat id for mission notification, dropping");
            return;
        };
        let world = Arc::clone(&self.world);
        tokio::spawn(async move {
            if !notifier.send(&chat_id, &notice.text).await {
                let mut world = world.lock().await;
                world.alerts.raise(Alert::new(
                    AlertKind::NotifyFailed,
                    Severity::Medium,
                    "Fire mission notification could not be delivered.",
                    now_ms(),
                ));
            }
        });
    }

    // === REGISTRATION ===

    pub async fn register_unit(&self, name: &str, echelon: Echelon, location: GeoPoint) -> Result<UnitId> {
        self.write(|w| w.add_unit(name, echelon, location, now_ms())).await
    }

    pub async fn register_artillery_piece(
        &self,
        name: &str,
        kind: ArtilleryKind,
        location: GeoPoint,
        ammo: AmmoStock,
    ) -> Result<PieceId> {
        self.write(|w| w.add_artillery_piece(name, kind, location, ammo, now_ms())).await
    }

    pub async fn register_forward_observer(&self, callsign: &str, location: GeoPoint) -> Result<ObserverId> {
        self.write(|w| w.add_forward_observer(callsign, location, now_ms())).await
    }

    // === FIRE MISSIONS ===

    pub async fn request_fire_mission(&self, requester: RequesterId, target: GeoPoint) -> Result<RequestOutcome> {
        let (outcome, chat_id) = {
            let mut world = self.world.lock().await;
            let outcome = coordinator::request_fire_mission(&mut world, requester, target, now_ms())?;
            let chat_id = outcome
                .notice
                .as_ref()
                .and_then(|n| n.recipient)
                .and_then(|user| world.roster.chat_id(user).map(String::from));
            self.save_best_effort(&world);
            (outcome, chat_id)
        };

        if let Some(notice) = outcome.notice.clone() {
            self.dispatch(notice, chat_id);
        }
        Ok(outcome)
    }

    pub async fn accept_fire_mission(
        &self,
        mission_id: MissionId,
        artillery_id: PieceId,
        projectile: Projectile,
        charge: u8,
        mrsi: bool,
    ) -> Result<()> {
        self.write(|w| {
            coordinator::accept_fire_mission(w, mission_id, artillery_id, projectile, charge, mrsi, now_ms())
        })
        .await
    }

    pub async fn reject_fire_mission(&self, mission_id: MissionId, rejector: UserId, reason: &str) -> Result<()> {
        self.write(|w| coordinator::reject_fire_mission(w, mission_id, rejector, reason, now_ms())).await
    }

    pub async fn dismiss_pending_mission(&self, mission_id: MissionId) -> Result<()> {
        self.write(|w| coordinator::dismiss_pending_mission(w, mission_id)).await
    }

    pub async fn confirm_shot_fired(&self, mission_id: MissionId) -> Result<()> {
        self.write(|w| coordinator::confirm_shot_fired(w, mission_id, now_ms())).await
    }

    pub async fn purge_completed(&self) -> usize {
        let mut world = self.world.lock().await;
        let purged = coordinator::purge_completed(&mut world, now_ms());
        if purged > 0 {
            self.save_best_effort(&world);
        }
        purged
    }

    // === UNIT LIFECYCLE ===

    pub async fn report_engaged(&self, unit_id: UnitId) -> Result<()> {
        self.write(|w| lifecycle::report_engaged(w, unit_id, now_ms())).await
    }

    pub async fn report_ceasefire(&self, unit_id: UnitId) -> Result<()> {
        self.write(|w| lifecycle::report_ceasefire(w, unit_id, now_ms())).await
    }

    pub async fn add_after_action_report(&self, report: NewAfterActionReport) -> Result<crate::core::types::ReportId> {
        self.write(|w| lifecycle::add_after_action_report(w, report, now_ms())).await
    }

    pub async fn mark_hourly_report(&self, unit_id: UnitId) -> Result<()> {
        self.write(|w| lifecycle::mark_hourly_report(w, unit_id, now_ms())).await
    }

    pub async fn send_to_retraining(&self, unit_id: UnitId) -> Result<()> {
        self.write(|w| lifecycle::send_to_retraining(w, unit_id, now_ms())).await
    }

    pub async fn return_from_retraining(&self, unit_id: UnitId) -> Result<()> {
        self.write(|w| lifecycle::return_from_retraining(w, unit_id, now_ms())).await
    }

    pub async fn start_leave(&self, unit_id: UnitId, duration_days: u32) -> Result<()> {
        self.write(|w| lifecycle::start_leave(w, unit_id, duration_days, now_ms())).await
    }

    pub async fn start_retraining(&self, unit_id: UnitId, focus: &str, duration_days: u32) -> Result<()> {
        self.write(|w| lifecycle::start_retraining(w, unit_id, focus, duration_days, now_ms())).await
    }

    pub async fn check_overdue_reports(&self) -> usize {
        let mut world = self.world.lock().await;
        let raised = lifecycle::check_overdue_reports(&mut world, now_ms());
        if raised > 0 {
            self.save_best_effort(&world);
        }
        raised
    }

    // === UNIT UPDATES ===

    pub async fn update_logistics(&self, unit_id: UnitId, update: LogisticsUpdate, user: Option<UserId>) -> Result<()> {
        self.write(|w| unit_logistics::update_logistics(w, unit_id, update, user, now_ms())).await
    }

    pub async fn update_attributes(
        &self,
        unit_id: UnitId,
        equipment: Option<Vec<String>>,
        capabilities: Option<Vec<String>>,
    ) -> Result<()> {
        self.write(|w| unit_logistics::update_attributes(w, unit_id, equipment, capabilities, now_ms())).await
    }

    pub async fn update_mission(&self, unit_id: UnitId, mission: &str) -> Result<()> {
        self.write(|w| unit_logistics::update_mission(w, unit_id, mission, now_ms())).await
    }

    pub async fn update_situation(&self, unit_id: UnitId, situation: UnitSituation) -> Result<()> {
        self.write(|w| unit_logistics::update_situation(w, unit_id, situation, now_ms())).await
    }

    pub async fn process_spot_report(&self, unit_id: UnitId, location: GeoPoint) -> Result<()> {
        self.write(|w| unit_logistics::process_spot_report(w, unit_id, location, now_ms())).await
    }

    // === APPROVAL WORKFLOW ===

    pub async fn submit_ammo_report(
        &self,
        unit_id: UnitId,
        submitter: UserId,
        amount_percent: u8,
        justification: &str,
    ) -> Result<AlertId> {
        self.write(|w| approval::submit_ammo_report(w, unit_id, submitter, amount_percent, justification, now_ms()))
            .await
    }

    pub async fn log_novelty(
        &self,
        unit_id: UnitId,
        submitter: UserId,
        details: &str,
        is_logistics_request: bool,
    ) -> Result<AlertId> {
        self.write(|w| approval::log_novelty(w, unit_id, submitter, details, is_logistics_request, now_ms())).await
    }

    pub async fn approve_ammo_report(&self, alert_id: AlertId, approver: UserId) -> Result<()> {
        self.write(|w| approval::approve_ammo_report(w, alert_id, approver, now_ms())).await
    }

    pub async fn reject_ammo_report(&self, alert_id: AlertId, approver: UserId, reason: &str) -> Result<()> {
        self.write(|w| approval::reject_ammo_report(w, alert_id, approver, reason, now_ms())).await
    }

    pub async fn approve_novelty(&self, alert_id: AlertId, approver: UserId) -> Result<()> {
        self.write(|w| approval::approve_novelty(w, alert_id, approver, now_ms())).await
    }

    pub async fn reject_novelty(&self, alert_id: AlertId, approver: UserId, reason: &str) -> Result<()> {
        self.write(|w| approval::reject_novelty(w, alert_id, approver, reason, now_ms())).await
    }

    // === LOGISTICS ===

    pub async fn create_logistics_request(&self, unit_id: UnitId, details: &str) -> Result<RequestId> {
        self.write(|w| logistics::create_request(w, unit_id, details, now_ms())).await
    }

    pub async fn fulfill_logistics_request(&self, request_id: RequestId, user: UserId) -> Result<()> {
        self.write(|w| logistics::fulfill_request(w, request_id, user, now_ms())).await
    }

    // === ALERTS & ROSTER ===

    pub async fn acknowledge_alert(&self, alert_id: AlertId) -> bool {
        let mut world = self.world.lock().await;
        let acknowledged = world.acknowledge_alert(alert_id);
        if acknowledged {
            self.save_best_effort(&world);
        }
        acknowledged
    }

    pub async fn add_user(&self, user: crate::roster::User) {
        let mut world = self.world.lock().await;
        world.roster.insert(user);
        self.save_best_effort(&world);
    }

    // === BACKGROUND SWEEPS ===

    /// Periodically purge completed missions past the linger window
    pub fn spawn_purge_timer(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let post = Arc::clone(self);
        let period = std::time::Duration::from_millis(config().completed_mission_linger_ms.max(1000));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let purged = post.purge_completed().await;
                if purged > 0 {
                    tracing::debug!("purged {} completed mission(s)", purged);
                }
            }
        })
    }

    /// Periodically sweep for units with overdue hourly reports
    pub fn spawn_report_watchdog(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let post = Arc::clone(self);
        let period = std::time::Duration::from_millis(config().hourly_report_interval_ms.max(1000));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let raised = post.check_overdue_reports().await;
                if raised > 0 {
                    tracing::info!("report watchdog raised {} alert(s)", raised);
                }
            }
        })
    }
}
