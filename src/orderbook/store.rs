use crate::orderbook::BookSnapshot;

/// Holds the latest book snapshot. Updates always replace the whole book;
/// the venue never sends partial updates.
#[derive(Debug, Default)]
pub struct BookStore {
    current: Option<BookSnapshot>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the stored book. Empty sides are a valid "no market" state.
    pub fn replace(&mut self, snapshot: BookSnapshot) {
        self.current = Some(snapshot);
    }

    /// Latest snapshot, or `None` until the first one arrives
    pub fn current(&self) -> Option<&BookSnapshot> {
        self.current.as_ref()
    }
}
