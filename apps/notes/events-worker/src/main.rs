//! Notes Events Worker - Entry Point
//!
//! Background worker that consumes note lifecycle events from the Redis streams.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    notes_events_worker::run().await
}
