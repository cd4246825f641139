//! Active-cell registries
//!
//! Pending explosions, pending floor collapses and the critical set are
//! sparse sets over flat cell ids: O(1) insert/lookup/cancel, dense
//! iteration for the per-frame tick, at most one entry per cell.

/// Category of a pending timed transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActiveKind {
    PendingExplosion,
    PendingFloorCollapse,
}

/// A registered pending transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveCell {
    pub index: usize,
    pub kind: ActiveKind,
    pub remaining_ms: f32,
}

const ABSENT: u32 = u32::MAX;

/// Sparse set keyed by cell id, carrying a value per member
#[derive(Debug, Clone)]
pub struct SparseSet<T> {
    dense: Vec<(usize, T)>,
    slots: Vec<u32>,
}

impl<T: Copy> SparseSet<T> {
    pub fn new(cell_count: usize) -> Self {
        Self {
            dense: Vec::new(),
            slots: vec![ABSENT; cell_count],
        }
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|&s| s != ABSENT)
    }

    pub fn get(&self, index: usize) -> Option<T> {
        let slot = *self.slots.get(index)?;
        (slot != ABSENT).then(|| self.dense[slot as usize].1)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        let slot = *self.slots.get(index)?;
        if slot == ABSENT {
            return None;
        }
        Some(&mut self.dense[slot as usize].1)
    }

    /// Add a member; returns false (leaving the set unchanged) if already present
    pub fn insert(&mut self, index: usize, value: T) -> bool {
        if index >= self.slots.len() || self.contains(index) {
            return false;
        }
        self.slots[index] = self.dense.len() as u32;
        self.dense.push((index, value));
        true
    }

    /// Remove a member, returning its value
    pub fn remove(&mut self, index: usize) -> Option<T> {
        let slot = *self.slots.get(index)?;
        if slot == ABSENT {
            return None;
        }
        let (_, value) = self.dense.swap_remove(slot as usize);
        if let Some(&(moved, _)) = self.dense.get(slot as usize) {
            self.slots[moved] = slot;
        }
        self.slots[index] = ABSENT;
        Some(value)
    }

    /// Members in dense order
    pub fn iter(&self) -> impl Iterator<Item = (usize, T)> + '_ {
        self.dense.iter().copied()
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.dense.iter().map(|&(i, _)| i)
    }

    pub fn clear(&mut self) {
        for &(i, _) in &self.dense {
            self.slots[i] = ABSENT;
        }
        self.dense.clear();
    }
}

/// Countdown registry for one category of pending transition
#[derive(Debug, Clone)]
pub struct ActiveSet {
    kind: ActiveKind,
    timers: SparseSet<f32>,
}

impl ActiveSet {
    pub fn new(kind: ActiveKind, cell_count: usize) -> Self {
        Self {
            kind,
            timers: SparseSet::new(cell_count),
        }
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.timers.contains(index)
    }

    pub fn remaining(&self, index: usize) -> Option<f32> {
        self.timers.get(index)
    }

    /// Register a countdown; an existing entry keeps the shorter of the two
    ///
    /// Returns true if the entry is new.
    pub fn register(&mut self, index: usize, timeout_ms: f32) -> bool {
        if let Some(remaining) = self.timers.get_mut(index) {
            *remaining = remaining.min(timeout_ms);
            return false;
        }
        self.timers.insert(index, timeout_ms)
    }

    pub fn cancel(&mut self, index: usize) -> bool {
        self.timers.remove(index).is_some()
    }

    /// Count every entry down and remove the expired ones
    ///
    /// Expired cell ids are returned in registry order.
    pub fn advance(&mut self, elapsed_ms: f32) -> Vec<usize> {
        let mut expired = Vec::new();
        for (index, remaining) in self.timers.dense.iter_mut() {
            *remaining -= elapsed_ms;
            if *remaining <= 0.0 {
                expired.push(*index);
            }
        }
        for &index in &expired {
            self.timers.remove(index);
        }
        expired
    }

    pub fn iter(&self) -> impl Iterator<Item = ActiveCell> + '_ {
        let kind = self.kind;
        self.timers.iter().map(move |(index, remaining_ms)| ActiveCell {
            index,
            kind,
            remaining_ms,
        })
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}

/// All transient automaton state
#[derive(Debug, Clone)]
pub struct CellAutomaton {
    pub explosions: ActiveSet,
    pub collapses: ActiveSet,
    /// Fragile cells past the critical threshold, draining toward resolution
    pub critical: SparseSet<()>,
}

impl CellAutomaton {
    pub fn new(cell_count: usize) -> Self {
        Self {
            explosions: ActiveSet::new(ActiveKind::PendingExplosion, cell_count),
            collapses: ActiveSet::new(ActiveKind::PendingFloorCollapse, cell_count),
            critical: SparseSet::new(cell_count),
        }
    }

    /// Nothing pending and nothing critical
    pub fn is_idle(&self) -> bool {
        self.explosions.is_empty() && self.collapses.is_empty() && self.critical.is_empty()
    }

    /// Every pending transition, explosions first
    pub fn active_cells(&self) -> impl Iterator<Item = ActiveCell> + '_ {
        self.explosions.iter().chain(self.collapses.iter())
    }
}
