use crate::analytics::{DepthView, Metrics, RunningStats};
use crate::channel::ConnectionHandle;
use crate::channel::codec;
use crate::errors::DecodeError;
use crate::models::{EventMessage, Inbound, MidPricePoint};
use crate::orderbook::{BookSnapshot, BookStore, RingBuffer};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

/// What a single inbound frame did to the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Applied {
    /// Book replaced. `mid_price` is set when a history point was appended.
    Snapshot { mid_price: Option<f64> },
    Event,
}

/// Live book state: latest snapshot, mid-price history and event log.
#[derive(Debug)]
pub struct BookEngine {
    book: BookStore,
    mid_history: RingBuffer<MidPricePoint>,
    mid_stats: RunningStats,
    /// Evictions since `mid_stats` was last rebuilt from the window.
    evictions: usize,
    events: RingBuffer<EventMessage>,
}

impl BookEngine {
    pub fn new(history_capacity: usize, event_log_capacity: usize) -> Self {
        Self {
            book: BookStore::new(),
            mid_history: RingBuffer::new(history_capacity),
            mid_stats: RunningStats::new(),
            evictions: 0,
            events: RingBuffer::new(event_log_capacity),
        }
    }

    /// Decodes, classifies and applies one raw frame.
    pub fn ingest(&mut self, text: &str, now_ms: u64) -> Result<Applied, DecodeError> {
        let inbound = codec::classify(text)?;
        Ok(self.apply(inbound, now_ms))
    }

    pub fn apply(&mut self, inbound: Inbound, now_ms: u64) -> Applied {
        match inbound {
            Inbound::Snapshot(snapshot) => {
                let quote = snapshot.best_bid().zip(snapshot.best_ask());
                let mid_price = snapshot.mid_price();
                self.book.replace(snapshot);
                if let (Some((best_bid, best_ask)), Some(mid)) = (quote, mid_price) {
                    self.record_mid(best_bid, best_ask, mid, now_ms);
                }
                Applied::Snapshot { mid_price }
            }
            Inbound::Event(event) => {
                self.events.push(event);
                Applied::Event
            }
        }
    }

    fn record_mid(&mut self, best_bid: f64, best_ask: f64, mid_price: f64, now_ms: u64) {
        // keep the series non-decreasing even if the wall clock steps back
        let timestamp = self
            .mid_history
            .last()
            .map_or(now_ms, |last| now_ms.max(last.timestamp));

        let evicted = self.mid_history.push(MidPricePoint {
            timestamp,
            best_bid,
            best_ask,
            mid_price,
        });
        self.mid_stats.push(mid_price);

        let Some(old) = evicted else { return };
        self.evictions += 1;
        let precise = self.mid_stats.remove(old.mid_price);
        if !precise || self.evictions >= self.mid_history.capacity() {
            self.rebuild_mid_stats();
        }
    }

    /// Recomputes the running volatility from the retained window.
    fn rebuild_mid_stats(&mut self) {
        tracing::debug!(
            "rebuilding volatility over {} points after {} evictions",
            self.mid_history.len(),
            self.evictions
        );
        self.mid_stats = RunningStats::from_values(self.mid_history.iter().map(|p| p.mid_price));
        self.evictions = 0;
    }

    pub fn book(&self) -> Option<&BookSnapshot> {
        self.book.current()
    }

    /// Current metrics, or `None` while there is no two-sided book.
    pub fn metrics(&self) -> Option<Metrics> {
        let book = self.book.current()?;
        Metrics::from_book(book, self.mid_stats.sample_std_dev())
    }

    /// Depth bars for both sides; empty before the first snapshot.
    pub fn depth(&self) -> DepthView {
        self.book.current().map(DepthView::of).unwrap_or_default()
    }

    pub fn mid_history(&self) -> Vec<MidPricePoint> {
        self.mid_history.to_vec()
    }

    pub fn events(&self) -> Vec<EventMessage> {
        self.events.to_vec()
    }
}

/// Cloneable handle to the engine. One lock covers classify, route and mutate,
/// so readers never see a new book without its history point.
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<BookEngine>>,
}

impl SharedEngine {
    pub fn new(engine: BookEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Ingestion entry point for the channel task. Frames are ignored unless
    /// the connection is up, and decode failures are logged and dropped.
    pub fn ingest(&self, text: &str, conn: &ConnectionHandle) -> Option<Applied> {
        self.ingest_at(text, conn, now_ms())
    }

    fn ingest_at(&self, text: &str, conn: &ConnectionHandle, now_ms: u64) -> Option<Applied> {
        if !conn.is_connected() {
            tracing::debug!("ignoring frame received while {:?}", conn.state());
            metrics::counter!("bookview_frames_total", "kind" => "ignored").increment(1);
            return None;
        }

        let mut engine = self.lock();
        match engine.ingest(text, now_ms) {
            Ok(applied) => {
                record(&applied, &engine);
                Some(applied)
            }
            Err(e) => {
                tracing::warn!("dropping undecodable frame: {e}");
                metrics::counter!("bookview_frames_total", "kind" => "decode_error").increment(1);
                None
            }
        }
    }

    /// Runs `f` against the engine under the lock.
    pub fn read<T>(&self, f: impl FnOnce(&BookEngine) -> T) -> T {
        let engine = self.lock();
        f(&engine)
    }

    fn lock(&self) -> MutexGuard<'_, BookEngine> {
        // engine state stays consistent even if a reader panicked
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn record(applied: &Applied, engine: &BookEngine) {
    match applied {
        Applied::Snapshot { mid_price } => {
            metrics::counter!("bookview_frames_total", "kind" => "snapshot").increment(1);
            if let Some(mid) = mid_price {
                metrics::gauge!("bookview_mid_price").set(*mid);
            }
            if let Some(m) = engine.metrics().filter(Metrics::is_crossed) {
                tracing::warn!(
                    "crossed book: best bid {} above best ask {} (spread {})",
                    m.best_bid,
                    m.best_ask,
                    m.spread
                );
                metrics::counter!("bookview_crossed_books_total").increment(1);
            }
            tracing::debug!(
                "snapshot bids: {} asks: {}",
                engine.book().map_or(0, |b| b.bids.len()),
                engine.book().map_or(0, |b| b.asks.len())
            );
        }
        Applied::Event => {
            metrics::counter!("bookview_frames_total", "kind" => "event").increment(1);
            tracing::debug!("event logged ({} retained)", engine.events.len());
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
