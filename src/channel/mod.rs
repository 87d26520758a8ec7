pub mod codec;
pub mod websocket;

use crate::engine::SharedEngine;
use crate::errors::ChannelError;
use crate::models::{Command, OrderSubmission, OrderTicket};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, watch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    fn gauge_value(self) -> f64 {
        match self {
            ConnectionState::Disconnected => 0.0,
            ConnectionState::Connecting => 1.0,
            ConnectionState::Connected => 2.0,
        }
    }
}

/// Shared view of the venue connection. The channel task writes it,
/// ingestion and the API read it.
#[derive(Clone)]
pub struct ConnectionHandle {
    tx: Arc<watch::Sender<ConnectionState>>,
}

impl Default for ConnectionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionHandle {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(watch::Sender::new(ConnectionState::Disconnected)),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.tx.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn set(&self, state: ConnectionState) {
        let prev = self.tx.send_replace(state);
        if prev != state {
            tracing::debug!("connection state {:?} -> {:?}", prev, state);
        }
        metrics::gauge!("bookview_connection_state").set(state.gauge_value());
    }
}

/// Queues outbound orders for the channel task and assigns their ids.
#[derive(Clone)]
pub struct CommandSender {
    tx: mpsc::UnboundedSender<Command>,
    next_id: Arc<AtomicU64>,
    conn: ConnectionHandle,
}

impl CommandSender {
    /// Returns the sender and the receiving end the channel task drains.
    pub fn new(conn: ConnectionHandle) -> (Self, mpsc::UnboundedReceiver<Command>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sender = Self {
            tx,
            next_id: Arc::new(AtomicU64::new(1)),
            conn,
        };
        (sender, rx)
    }

    /// Assigns the next order id and queues the order for the venue.
    /// Refused while the channel is down; a refused order doesn't use up an id.
    pub fn submit_order(&self, ticket: OrderTicket) -> Result<OrderSubmission, ChannelError> {
        if !self.conn.is_connected() {
            return Err(ChannelError::NotConnected);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let order = OrderSubmission {
            id: id.to_string(),
            order_type: ticket.order_type,
            side: ticket.side,
            price: ticket.price,
            quantity: ticket.quantity,
        };

        self.tx
            .send(Command::Order(order.clone()))
            .map_err(|_| ChannelError::Closed)?;

        tracing::info!(
            "queued order {} {} {} @ {} x {}",
            order.id,
            order.order_type,
            order.side,
            order.price,
            order.quantity
        );
        Ok(order)
    }
}

#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Connects to the venue and pumps frames into the engine until the
    /// connection ends for good. Reconnecting, if any, happens in here.
    async fn run(
        &self,
        engine: SharedEngine,
        conn: ConnectionHandle,
        outbound: mpsc::UnboundedReceiver<Command>,
    ) -> Result<(), ChannelError>;
}
