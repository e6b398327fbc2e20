//! Sweep command
//!
//! One sequential pass over every private channel: fetch the read marker,
//! fetch the messages around it, and advance the marker past a leading run
//! of statuspage-bot messages. Channels are processed one at a time; the
//! first remote failure aborts the whole run.

use tracing::{debug, info};

use crate::marker::{boundary_before, decide, Advancement};
use crate::slack::SlackClient;
use crate::Result;

pub async fn run(client: &SlackClient, bot_id: &str) -> Result<()> {
    let channels = client.list_private_channels().await?;
    info!(channels = channels.len(), "Sweeping private channels");

    for channel in &channels {
        let last_read = client.last_read(&channel.id).await?;

        // Fetch one second before the marker so the boundary message itself
        // is re-examined.
        let oldest = boundary_before(&last_read);
        let mut messages = client.history_since(&channel.id, &oldest).await?;

        // Slack returns newest-first; the scan wants oldest-first.
        messages.reverse();

        debug!(
            channel = %channel.name,
            last_read = %last_read,
            messages = messages.len(),
            "Scanning channel"
        );

        match decide(&messages, bot_id) {
            Advancement::Clear(ts) => {
                println!("Clearing messages in {}", channel.name);
                info!(channel = %channel.name, ts = %ts, "Advancing read marker");
                client.set_read_marker(&channel.id, &ts).await?;
            }
            Advancement::NoOp => {
                println!("No messages in {}", channel.name);
            }
        }
    }

    Ok(())
}
