// ── Central reactive device store ──
//
// Holds the authoritative local snapshot of all known devices. Writes go
// through a short-lived lock over an insertion-ordered map; reads are
// wait-free against an immutable snapshot published on a `watch` channel.
// Readers therefore see either the full old or full new snapshot during a
// `replace_all`, never a mix.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tokio::sync::watch;

use crate::error::CoreError;
use crate::model::{Device, DeviceId, DevicePatch};
use crate::stream::DeviceStream;

/// Central reactive store for device records.
///
/// Populated wholesale by [`replace_all`](Self::replace_all) after a full
/// fetch; individual records are mutated only through
/// [`apply_patch`](Self::apply_patch). Every successful mutation is
/// broadcast to subscribers. No I/O happens here.
pub struct DeviceStore {
    devices: RwLock<IndexMap<DeviceId, Arc<Device>>>,
    snapshot: watch::Sender<Arc<Vec<Arc<Device>>>>,
    last_full_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl DeviceStore {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        let (last_full_refresh, _) = watch::channel(None);

        Self {
            devices: RwLock::new(IndexMap::new()),
            snapshot,
            last_full_refresh,
        }
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Atomically swap the entire collection, preserving the order of
    /// the incoming sequence. Used after a successful full fetch.
    pub fn replace_all(&self, devices: Vec<Device>) {
        let mut map = self
            .devices
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        map.clear();
        for device in devices {
            map.insert(device.id.clone(), Arc::new(device));
        }

        self.publish(&map);
        drop(map);

        // `send_replace` records the timestamp even with zero receivers;
        // plain `send` would drop it on the floor in that case.
        self.last_full_refresh.send_replace(Some(Utc::now()));
    }

    /// Merge a partial update into an existing record.
    ///
    /// Fails with [`CoreError::UnknownDevice`] if `id` is absent -- the
    /// caller must have fetched first. On success the updated record is
    /// returned and subscribers are notified.
    pub fn apply_patch(&self, id: &DeviceId, patch: &DevicePatch) -> Result<Arc<Device>, CoreError> {
        let mut map = self
            .devices
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let current = map.get(id).ok_or_else(|| CoreError::UnknownDevice {
            device_id: id.clone(),
        })?;

        let updated = Arc::new(patch.apply_to(current));
        // IndexMap keeps the existing position for known keys, so
        // patching never reorders the snapshot.
        map.insert(id.clone(), Arc::clone(&updated));

        self.publish(&map);
        Ok(updated)
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Lookup by identifier.
    pub fn get(&self, id: &DeviceId) -> Option<Arc<Device>> {
        self.devices
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(id)
            .map(Arc::clone)
    }

    /// All devices in the insertion order of the last `replace_all`.
    /// Wait-free: borrows the published snapshot, never the lock.
    pub fn snapshot(&self) -> Arc<Vec<Arc<Device>>> {
        self.snapshot.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.devices
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Subscribe to snapshot changes. Fired after every successful
    /// `replace_all` and `apply_patch`.
    pub fn subscribe(&self) -> DeviceStream {
        DeviceStream::new(self.snapshot.subscribe())
    }

    // ── Metadata ─────────────────────────────────────────────────────

    /// When the last successful full fetch was applied, if ever.
    pub fn last_full_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_full_refresh.borrow()
    }

    /// How long ago the last full refresh occurred, or `None` if never refreshed.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_full_refresh().map(|t| Utc::now() - t)
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Rebuild the published snapshot from the map, in map order.
    /// Called with the write lock held so notifications are serialized.
    fn publish(&self, map: &IndexMap<DeviceId, Arc<Device>>) {
        let values: Vec<Arc<Device>> = map.values().map(Arc::clone).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}

impl Default for DeviceStore {
    fn default() -> Self {
        Self::new()
    }
}
