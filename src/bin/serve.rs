//! Game Server Binary
//!
//! Runs the HTTP server hosting live game rooms.
//! Clients connect over WebSocket at `/ws` and create or join rooms in-band.

use landlord::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    log();
    kys();
    hosting::Server::run().await?;
    Ok(())
}
