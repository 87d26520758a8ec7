use super::{Channel, ConnectionHandle, ConnectionState};
use crate::config::Config;
use crate::engine::SharedEngine;
use crate::errors::ChannelError;
use crate::models::Command;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// How a single connection ended.
#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    /// Venue closed the socket.
    Closed,
    /// Nobody can send commands anymore; the process is shutting down.
    CommandsClosed,
}

/// JSON-over-WebSocket connection to the venue.
pub struct WebSocketChannel {
    url: String,
    summary_interval: Duration,
    reconnect_delay: Option<Duration>,
}

impl WebSocketChannel {
    pub fn new(config: &Config) -> Self {
        Self {
            url: config.venue_url.clone(),
            summary_interval: config.summary_interval,
            reconnect_delay: config.reconnect_delay,
        }
    }
}

/// Connects once, then requests a summary every tick and pumps inbound frames
/// into the engine until the socket closes or errors.
/// The summary ticker only lives as long as this connection.
async fn run_session(
    name: &'static str,
    url: &str,
    summary_interval: Duration,
    engine: &SharedEngine,
    conn: &ConnectionHandle,
    outbound: &mut mpsc::UnboundedReceiver<Command>,
) -> Result<SessionEnd, ChannelError> {
    tracing::info!("[{name}] connecting to {url}");
    conn.set(ConnectionState::Connecting);

    let (ws_stream, _) = connect_async(url).await?;
    conn.set(ConnectionState::Connected);
    tracing::info!("[{name}] connected");

    let (mut write_stream, mut read_stream) = ws_stream.split();
    let summary = Command::summary().encode()?;

    let mut ticker = time::interval(summary_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            msg = read_stream.next() => {
                let Some(msg) = msg else {
                    return Ok(SessionEnd::Closed);
                };

                match msg? {
                    Message::Text(text) => {
                        engine.ingest(text.as_str(), conn);
                    }
                    Message::Binary(bytes) => match std::str::from_utf8(&bytes) {
                        Ok(text) => {
                            engine.ingest(text, conn);
                        }
                        Err(e) => {
                            tracing::warn!("[{name}] dropping non UTF-8 binary frame: {e}");
                            metrics::counter!("bookview_frames_total", "kind" => "decode_error")
                                .increment(1);
                        }
                    },
                    Message::Ping(payload) => {
                        write_stream.send(Message::Pong(payload)).await?;
                    }
                    Message::Close(frame) => {
                        tracing::info!("[{name}] venue closed the connection: {frame:?}");
                        return Ok(SessionEnd::Closed);
                    }
                    _ => {}
                }
            }

            _ = ticker.tick() => {
                // a tick racing a disconnect sends nothing
                if conn.is_connected() {
                    write_stream.send(Message::Text(summary.clone().into())).await?;
                }
            }

            cmd = outbound.recv() => {
                let Some(cmd) = cmd else {
                    return Ok(SessionEnd::CommandsClosed);
                };
                if matches!(cmd, Command::Order(_)) {
                    metrics::counter!("bookview_orders_sent_total").increment(1);
                }
                write_stream.send(Message::Text(cmd.encode()?.into())).await?;
            }
        }
    }
}

#[async_trait]
impl Channel for WebSocketChannel {
    fn name(&self) -> &'static str {
        "venue"
    }

    /// Runs sessions back to back, waiting `reconnect_delay` between them.
    /// Without a delay configured the first disconnect ends the channel.
    async fn run(
        &self,
        engine: SharedEngine,
        conn: ConnectionHandle,
        mut outbound: mpsc::UnboundedReceiver<Command>,
    ) -> Result<(), ChannelError> {
        let name = self.name();

        loop {
            let result = run_session(
                name,
                &self.url,
                self.summary_interval,
                &engine,
                &conn,
                &mut outbound,
            )
            .await;
            conn.set(ConnectionState::Disconnected);

            match result {
                Ok(SessionEnd::CommandsClosed) => {
                    tracing::info!("[{name}] command queue closed, stopping");
                    return Ok(());
                }
                Ok(SessionEnd::Closed) => tracing::warn!("[{name}] stream closed"),
                Err(e) => {
                    tracing::error!("[{name}] stream error: {e}");
                    if self.reconnect_delay.is_none() {
                        return Err(e);
                    }
                }
            }

            let Some(delay) = self.reconnect_delay else {
                return Ok(());
            };
            tracing::info!("[{name}] reconnecting in {delay:?}");
            time::sleep(delay).await;
        }
    }
}
