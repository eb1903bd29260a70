//! Per-event recompute gate.
//!
//! Replaces a wall-clock debounce with explicit request coalescing: at most
//! one balance recompute runs per event at a time, and mutations set a dirty
//! marker that triggers exactly one more run after the in-flight one
//! completes. No request is dropped by a time window.

use crate::domain::{Decimal, EventId, UserId};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Gate state for a single event.
#[derive(Debug)]
pub struct EventSlot {
    /// Held for the duration of a recompute; guards the cached map.
    pub lock: tokio::sync::Mutex<Option<BTreeMap<UserId, Decimal>>>,
    /// Set by mutations, cleared when a recompute claims the work. May be
    /// re-set while a recompute is in flight.
    dirty: AtomicBool,
}

impl EventSlot {
    fn new() -> Self {
        EventSlot {
            lock: tokio::sync::Mutex::new(None),
            // Fresh slots start dirty so the first read computes.
            dirty: AtomicBool::new(true),
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Claim pending work before computing, so a mutation landing mid-flight
    /// re-marks the slot and the next caller runs again.
    pub fn claim(&self) {
        self.dirty.store(false, Ordering::Release);
    }

    /// Re-mark after a failed recompute; the cached map stays last-known.
    pub fn unclaim(&self) {
        self.dirty.store(true, Ordering::Release);
    }
}

/// Registry of per-event gate slots.
#[derive(Debug, Default)]
pub struct RecomputeGate {
    slots: Mutex<HashMap<EventId, Arc<EventSlot>>>,
}

impl RecomputeGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the slot for an event.
    pub fn slot(&self, id: &EventId) -> Arc<EventSlot> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots
            .entry(id.clone())
            .or_insert_with(|| Arc::new(EventSlot::new()))
            .clone()
    }

    /// Flag an event's balances as stale after a mutation.
    pub fn mark_dirty(&self, id: &EventId) {
        self.slot(id).dirty.store(true, Ordering::Release);
    }
}
