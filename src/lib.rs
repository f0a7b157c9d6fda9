//! Authoritative multiplayer engine for a monopoly-style board game.
//!
//! Rooms of 2-8 players connect over WebSocket and play a turn-based
//! property game. The engine owns all mutable game state, enforces turn
//! order and action legality, resolves dice and card draws server-side,
//! and reconciles disconnect/reconnect by durable player identity.
//!
//! ## Modules
//!
//! - [`board`] - static 40-space track and the two card decks
//! - [`game`] - players, trades, dice, and the room state machine
//! - [`hosting`] - registry, room actors, wire protocol, HTTP/WS server

pub mod board;
pub mod game;
pub mod hosting;

/// Money, in game dollars. Signed so transient debits stay representable.
pub type Funds = i64;
/// Index into the circular board track.
pub type Position = usize;
/// Client-chosen room identifier.
pub type RoomId = String;
/// Ephemeral per-connection identity, rebound on every reconnect.
pub type SessionId = u64;
/// Durable player identity, stable across reconnects.
pub type PlayerUuid = uuid::Uuid;

/// Number of spaces on the track.
pub const BOARD_LENGTH: Position = 40;
/// Where the jail corner sits.
pub const JAIL_POSITION: Position = 10;
/// Landing here sends you to jail.
pub const GO_TO_JAIL_POSITION: Position = 30;
/// The vacation corner that accumulates tax revenue.
pub const VACATION_POSITION: Position = 20;
/// Credited when a move wraps past Start.
pub const PASS_START_BONUS: Funds = 200;
/// Credited on top of the passing bonus when landing exactly on Start.
pub const LAND_START_BONUS: Funds = 300;
/// A jailed player walks free on their third attempt.
pub const MAX_JAIL_ATTEMPTS: u8 = 2;

/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Register Ctrl+C handler for immediate (non-graceful) termination.
pub fn kys() {
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.expect("install ctrl-c handler");
        println!();
        log::warn!("violent interrupt received, exiting immediately");
        std::process::exit(0);
    });
}
