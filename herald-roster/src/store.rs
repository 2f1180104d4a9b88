use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;
use tokio::sync::watch;

use crate::{
    error::RosterError,
    row::{RecipientRow, RowId, RowPatch},
};

#[derive(Debug, Default)]
struct Inner {
    headers: Vec<String>,
    rows: Vec<RecipientRow>,
    index: AHashMap<RowId, usize>,
}

impl Inner {
    fn install(&mut self, headers: Vec<String>, mut rows: Vec<RecipientRow>) {
        for row in &mut rows {
            row.reset();
        }
        self.index = rows
            .iter()
            .enumerate()
            .map(|(position, row)| (row.id, position))
            .collect();
        self.headers = headers;
        self.rows = rows;
    }
}

/// The ordered recipient collection and its per-row delivery state.
///
/// Exactly one writer (the orchestrator) mutates rows, and only through
/// [`Roster::update`]; everything else observes committed state through
/// snapshots and the revision channel. Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct Roster {
    inner: Arc<RwLock<Inner>>,
    revision: Arc<watch::Sender<u64>>,
}

impl Default for Roster {
    fn default() -> Self {
        Self::new()
    }
}

impl Roster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            revision: Arc::new(revision),
        }
    }

    /// Create a roster holding the given rows, each reset to its initial
    /// delivery state.
    #[must_use]
    pub fn from_rows(headers: Vec<String>, rows: Vec<RecipientRow>) -> Self {
        let roster = Self::new();
        roster.replace_all(headers, rows);
        roster
    }

    /// Discard the current rows and install a fresh ordered collection.
    ///
    /// Every installed row starts over at `Pending` with no SMS state, no
    /// timestamps, and no error. An empty collection is valid and yields a
    /// no-op run.
    pub fn replace_all(&self, headers: Vec<String>, rows: Vec<RecipientRow>) {
        self.inner.write().install(headers, rows);
        self.notify();
    }

    /// Apply a merge patch to the row with the given ID.
    ///
    /// This is the only mutation path for delivery state. Observers are
    /// notified synchronously once the patch has been applied.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::RowNotFound`] if no row has this ID.
    pub fn update(&self, id: RowId, patch: RowPatch) -> Result<(), RosterError> {
        {
            let mut inner = self.inner.write();
            let position = *inner.index.get(&id).ok_or(RosterError::RowNotFound(id))?;
            inner.rows[position].apply(patch);
        }
        self.notify();
        Ok(())
    }

    /// A copy of the row with the given ID, if present.
    #[must_use]
    pub fn get(&self, id: RowId) -> Option<RecipientRow> {
        let inner = self.inner.read();
        inner.index.get(&id).map(|&position| inner.rows[position].clone())
    }

    /// A copy of every row, in roster order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<RecipientRow> {
        self.inner.read().rows.clone()
    }

    /// The row IDs in roster order.
    #[must_use]
    pub fn order(&self) -> Vec<RowId> {
        self.inner.read().rows.iter().map(|row| row.id).collect()
    }

    /// The ingested column names, in input order.
    #[must_use]
    pub fn headers(&self) -> Vec<String> {
        self.inner.read().headers.clone()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().rows.len()
    }

    /// Whether the roster holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().rows.is_empty()
    }

    /// Subscribe to mutation notifications. The channel carries a revision
    /// counter that bumps on every committed mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn notify(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }
}
