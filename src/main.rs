//! Fireline - Entry Point
//!
//! Stands up a command post with JSON snapshot storage and optional
//! Telegram notifications, registers a small task force and walks one
//! fire mission through request, acceptance and shot confirmation.

use std::sync::Arc;

use fireline::artillery::{AmmoStock, ArtilleryKind};
use fireline::command::CommandPost;
use fireline::core::error::Result;
use fireline::core::types::{RequesterId, UserId};
use fireline::fires::Projectile;
use fireline::geo::GeoPoint;
use fireline::notify::TelegramClient;
use fireline::persist::JsonFileStore;
use fireline::roster::{Role, User};
use fireline::unit::Echelon;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fireline=debug".into()),
        )
        .init();

    tracing::info!("Fireline command post starting...");

    let notifier = TelegramClient::from_env().ok();
    if notifier.is_none() {
        tracing::warn!("TELEGRAM_BOT_TOKEN not set - running without mission notifications");
    }

    let store = Arc::new(JsonFileStore::new("fireline_state.json"));
    let post = Arc::new(CommandPost::from_store(notifier, store));

    let _purge = post.spawn_purge_timer();
    let _watchdog = post.spawn_report_watchdog();

    // Roster
    let commander = User {
        id: UserId::new(),
        username: "cmd6".into(),
        display_name: "Maj. Rojas".into(),
        role: Role::Commander,
        chat_id: std::env::var("TELEGRAM_CHAT_ID").ok(),
    };
    let commander_id = commander.id;
    post.add_user(commander).await;

    // Task force
    let platoon = post
        .register_unit("1st Platoon", Echelon::Platoon, GeoPoint::new(4.6097, -74.0817))
        .await?;
    let battery = post
        .register_artillery_piece(
            "Battery A-1",
            ArtilleryKind::Howitzer155,
            GeoPoint::new(4.5500, -74.1000),
            AmmoStock::new(40, 10, 10),
        )
        .await?;
    let observer = post
        .register_forward_observer("EAGLE-6", GeoPoint::new(4.6500, -74.0500))
        .await?;

    // One mission through the full cycle
    let target = GeoPoint::new(4.6200, -74.0300);
    let outcome = post.request_fire_mission(RequesterId::Observer(observer), target).await?;
    match outcome.candidate {
        Some(piece_id) => {
            tracing::info!("mission {} assigned", outcome.mission_id.short());
            post.accept_fire_mission(outcome.mission_id, piece_id, Projectile::HeM107, 4, false)
                .await?;
            post.confirm_shot_fired(outcome.mission_id).await?;
        }
        None => tracing::warn!("mission {} has no assets", outcome.mission_id.short()),
    }

    // Routine traffic
    post.process_spot_report(platoon, GeoPoint::new(4.6150, -74.0800)).await?;
    let report = post
        .submit_ammo_report(platoon, commander_id, 30, "Contact during movement to the east ridge")
        .await?;
    post.approve_ammo_report(report, commander_id).await?;

    post.read(|world| {
        println!("\n=== FIRELINE ===");
        println!("Units: {}", world.units().len());
        println!("Artillery pieces: {}", world.pieces().len());
        println!("Observers: {}", world.observers().len());
        println!("Active missions: {}", world.active_missions().len());
        println!("\nRecent history:");
        for event in world.history.events().iter().take(10) {
            println!("  [{}] {}: {}", event.timestamp, event.kind, event.details);
        }
        println!("\nOpen alerts:");
        for alert in world.alerts.alerts().iter().filter(|a| !a.acknowledged) {
            println!("  {:?} {}", alert.severity, alert.message);
        }
        if let Some(piece) = world.piece(battery) {
            println!("\n{}: {} ({} rounds left)", piece.name, piece.status, piece.ammo.total());
        }
    })
    .await;

    Ok(())
}
