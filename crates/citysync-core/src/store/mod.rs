// ── Reactive device store ──
//
// Ordered in-memory storage with push-based change notification.

mod device_store;

pub use device_store::DeviceStore;
