// ── Device controller ──
//
// Mediates every state-changing user intent into exactly one validated,
// non-duplicated gateway call, then reconciles the result into the
// DeviceStore: optimistic write before the call, confirm or roll back
// after it resolves.
//
// Concurrency contract: operations on different device ids may run in
// parallel; a second control operation on the same id while one is
// outstanding is rejected fast with `AlreadyInFlight` -- no queueing, no
// blocking. The guard slot is released on every exit path via RAII.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::GatewayConfig;
use crate::error::CoreError;
use crate::model::{
    Device, DeviceId, DevicePatch, DeviceStatus, TelemetrySnapshot,
    SAMPLING_INTERVAL_MS_MAX, SAMPLING_INTERVAL_MS_MIN,
};
use crate::store::DeviceStore;
use crate::stream::DeviceStream;

use citysync_api::transport::TransportConfig;
use citysync_api::{ActivationAction, GatewayClient, SwitchAction};

// ── DeviceController ─────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Owns the gateway client,
/// the [`DeviceStore`], and the per-device in-flight guard.
#[derive(Clone)]
pub struct DeviceController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: GatewayConfig,
    store: Arc<DeviceStore>,
    client: GatewayClient,
    in_flight: DashMap<DeviceId, ()>,
    cancel: CancellationToken,
    refresh_handle: Mutex<Option<JoinHandle<()>>>,
}

impl DeviceController {
    /// Create a new controller from configuration.
    ///
    /// Builds the HTTP client (with the mandatory request timeout) but
    /// performs no I/O -- call [`refresh_all`](Self::refresh_all) to load
    /// the initial inventory.
    pub fn new(config: GatewayConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.timeout,
        };
        let client =
            GatewayClient::new(config.url.clone(), &transport).map_err(|e| CoreError::Config {
                message: e.to_string(),
            })?;

        Ok(Self {
            inner: Arc::new(ControllerInner {
                config,
                store: Arc::new(DeviceStore::new()),
                client,
                in_flight: DashMap::new(),
                cancel: CancellationToken::new(),
                refresh_handle: Mutex::new(None),
            }),
        })
    }

    /// Access the controller configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    /// Access the underlying DeviceStore.
    pub fn store(&self) -> &Arc<DeviceStore> {
        &self.inner.store
    }

    /// Subscribe to store changes (delegates to the store).
    pub fn subscribe(&self) -> DeviceStream {
        self.inner.store.subscribe()
    }

    // ── Read operations ──────────────────────────────────────────────

    /// Fetch the full inventory and atomically replace the store contents.
    ///
    /// On failure the store is left unchanged (last-known-good retained)
    /// and [`CoreError::FetchFailed`] is returned.
    pub async fn refresh_all(&self) -> Result<(), CoreError> {
        let wire = self
            .inner
            .client
            .list_devices()
            .await
            .map_err(CoreError::fetch)?;

        let devices: Vec<Device> = wire.into_iter().map(Device::from).collect();
        self.inner.store.replace_all(devices);

        debug!(devices = self.inner.store.len(), "full refresh complete");
        Ok(())
    }

    /// Re-read one device's telemetry and patch the snapshot fields only.
    ///
    /// Non-fatal by design: on failure the prior snapshot is untouched
    /// and the caller decides whether to surface the error.
    pub async fn refresh_telemetry(&self, id: &DeviceId) -> Result<(), CoreError> {
        let data = self
            .inner
            .client
            .read_device_data(id.as_str())
            .await
            .map_err(CoreError::fetch)?;

        if let (Some(temperature), Some(humidity)) = (data.temperature, data.humidity) {
            let snapshot = TelemetrySnapshot {
                temperature_c: temperature,
                humidity_pct: humidity,
                read_at: Utc::now(),
            };
            self.inner
                .store
                .apply_patch(id, &DevicePatch::telemetry(snapshot))?;
            debug!(%id, temperature, humidity, "telemetry snapshot updated");
        }

        Ok(())
    }

    // ── Control operations ───────────────────────────────────────────

    /// Toggle a device's status to the logical complement of its current
    /// one (ON↔OFF for relays/alarms, ACTIVE↔IDLE for sensors).
    ///
    /// The optimistic patch lands before the gateway call so the UI
    /// reflects intent immediately; a failed call rolls it back and
    /// surfaces [`CoreError::CommandFailed`]. Returns the status the
    /// store holds after reconciliation.
    pub async fn toggle_status(&self, id: &DeviceId) -> Result<DeviceStatus, CoreError> {
        let _guard = self.acquire_in_flight(id)?;

        let store = &self.inner.store;
        let device = store.get(id).ok_or_else(|| CoreError::UnknownDevice {
            device_id: id.clone(),
        })?;
        let previous = device.status;
        let target = previous.complement();

        store.apply_patch(id, &DevicePatch::status(target))?;
        debug!(%id, from = previous.as_str(), to = target.as_str(), "optimistic status applied");

        let result = if device.is_sensor {
            self.inner
                .client
                .set_sensor_activation(id.as_str(), activation_for(target))
                .await
        } else {
            self.inner
                .client
                .set_relay_status(id.as_str(), switch_for(target))
                .await
        };

        match result {
            Ok(ack) => {
                // If the ack carries a fresher status, server truth wins.
                let confirmed = ack
                    .status
                    .as_deref()
                    .and_then(DeviceStatus::parse_wire)
                    .filter(|s| s.is_sensor_status() == device.is_sensor)
                    .unwrap_or(target);

                if confirmed != target {
                    debug!(%id, status = confirmed.as_str(), "server overrode optimistic status");
                    self.reconcile(id, &DevicePatch::status(confirmed));
                }
                Ok(confirmed)
            }
            Err(e) => {
                self.reconcile(id, &DevicePatch::status(previous));
                Err(CoreError::command(id.clone(), e))
            }
        }
    }

    /// Change a sensor's sampling interval, given in whole seconds.
    ///
    /// Validation happens before any network call: the interval must be a
    /// positive number of seconds whose millisecond value lies within
    /// [1000, 60000], and the target must be a sensor. After a successful
    /// write a best-effort telemetry follow-up read runs; its failure is
    /// logged and does not fail the operation. Returns the stored
    /// interval in milliseconds.
    pub async fn change_sampling_interval(
        &self,
        id: &DeviceId,
        requested_seconds: u64,
    ) -> Result<u32, CoreError> {
        let interval_ms = validate_interval_seconds(requested_seconds)?;

        let _guard = self.acquire_in_flight(id)?;

        let store = &self.inner.store;
        let device = store.get(id).ok_or_else(|| CoreError::UnknownDevice {
            device_id: id.clone(),
        })?;
        if !device.is_sensor {
            return Err(CoreError::InvalidInput {
                message: format!("device {id} is not a sensor"),
            });
        }
        let previous = device.sampling_interval_ms;

        store.apply_patch(id, &DevicePatch::sampling_interval(Some(interval_ms)))?;
        debug!(%id, interval_ms, "optimistic sampling interval applied");

        match self
            .inner
            .client
            .set_sampling_frequency(id.as_str(), interval_ms)
            .await
        {
            Ok(_ack) => {
                if let Err(e) = self.refresh_telemetry(id).await {
                    warn!(%id, error = %e, "telemetry follow-up read failed (non-fatal)");
                }
                Ok(interval_ms)
            }
            Err(e) => {
                self.reconcile(id, &DevicePatch::sampling_interval(previous));
                Err(CoreError::command(id.clone(), e))
            }
        }
    }

    // ── Background polling ───────────────────────────────────────────

    /// Spawn the periodic full-refresh task, if a polling interval is
    /// configured. Idempotent: a second call while the task is running
    /// does nothing.
    pub async fn start_polling(&self) {
        let interval_secs = self.inner.config.refresh_interval_secs;
        if interval_secs == 0 {
            return;
        }

        let mut handle = self.inner.refresh_handle.lock().await;
        if handle.is_some() {
            return;
        }

        let ctrl = self.clone();
        let cancel = self.inner.cancel.clone();
        *handle = Some(tokio::spawn(refresh_task(ctrl, interval_secs, cancel)));
        debug!(interval_secs, "polling started");
    }

    /// Cancel and join the background task.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        if let Some(handle) = self.inner.refresh_handle.lock().await.take() {
            let _ = handle.await;
        }
        debug!("controller shut down");
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Claim the in-flight slot for `id`, or reject with `AlreadyInFlight`.
    fn acquire_in_flight(&self, id: &DeviceId) -> Result<InFlightGuard<'_>, CoreError> {
        use dashmap::mapref::entry::Entry;

        match self.inner.in_flight.entry(id.clone()) {
            Entry::Occupied(_) => Err(CoreError::AlreadyInFlight {
                device_id: id.clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(());
                Ok(InFlightGuard {
                    slots: &self.inner.in_flight,
                    id: id.clone(),
                })
            }
        }
    }

    /// Undo an optimistic patch after a failed command.
    ///
    /// A concurrent `replace_all` may have dropped the device in the
    /// meantime; in that case the store already holds server truth and
    /// there is nothing to restore.
    fn reconcile(&self, id: &DeviceId, patch: &DevicePatch) {
        if let Err(e) = self.inner.store.apply_patch(id, patch) {
            warn!(%id, error = %e, "rollback skipped: device no longer in store");
        }
    }
}

/// RAII release for a per-device in-flight slot.
struct InFlightGuard<'a> {
    slots: &'a DashMap<DeviceId, ()>,
    id: DeviceId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.slots.remove(&self.id);
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Periodically re-fetch the full inventory.
async fn refresh_task(
    controller: DeviceController,
    interval_secs: u64,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = controller.refresh_all().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Map a target status to the actuator wire action.
fn switch_for(target: DeviceStatus) -> SwitchAction {
    match target {
        DeviceStatus::On => SwitchAction::TurnOn,
        _ => SwitchAction::TurnOff,
    }
}

/// Map a target status to the sensor wire action.
fn activation_for(target: DeviceStatus) -> ActivationAction {
    match target {
        DeviceStatus::Active => ActivationAction::TurnActive,
        _ => ActivationAction::TurnIdle,
    }
}

/// Check the requested interval against the sensor bounds, converting to
/// milliseconds. Rejected requests never reach the network.
fn validate_interval_seconds(requested_seconds: u64) -> Result<u32, CoreError> {
    let Ok(seconds) = u32::try_from(requested_seconds) else {
        return Err(interval_out_of_range(requested_seconds));
    };
    let interval_ms = seconds.saturating_mul(1_000);
    if seconds == 0
        || interval_ms < SAMPLING_INTERVAL_MS_MIN
        || interval_ms > SAMPLING_INTERVAL_MS_MAX
    {
        return Err(interval_out_of_range(requested_seconds));
    }
    Ok(interval_ms)
}

fn interval_out_of_range(requested_seconds: u64) -> CoreError {
    CoreError::InvalidInput {
        message: format!(
            "sampling interval must be between {} and {} seconds, got {requested_seconds}",
            SAMPLING_INTERVAL_MS_MIN / 1_000,
            SAMPLING_INTERVAL_MS_MAX / 1_000,
        ),
    }
}
