// BroadcastChannelManager: reading and shake fan-out
// Single Responsibility: listener registration and notification delivery
//
// Two delivery styles share one publish call:
// - synchronous callbacks, invoked on the publishing (sensor) thread
// - tokio broadcast receivers for async consumers; lagging receivers drop
//   old messages rather than applying backpressure

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;

use crate::analysis::shake::ShakeEvent;
use crate::engine::reading::Reading;

/// Buffer for async reading subscribers (~1.3 s at 50 Hz)
const READING_CHANNEL_CAPACITY: usize = 64;

/// Buffer for async shake subscribers
const SHAKE_CHANNEL_CAPACITY: usize = 16;

/// Handle returned when registering a callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type ReadingListener = Arc<dyn Fn(&Arc<Reading>) + Send + Sync>;
type ShakeListener = Arc<dyn Fn() + Send + Sync>;

/// Manages reading/shake listeners and broadcast channels
///
/// Listener lists are snapshotted before delivery so a callback may register
/// or remove listeners without deadlocking.
pub struct BroadcastChannelManager {
    next_id: AtomicU64,
    reading_listeners: RwLock<Vec<(ListenerId, ReadingListener)>>,
    shake_listeners: RwLock<Vec<(ListenerId, ShakeListener)>>,
    reading_tx: broadcast::Sender<Arc<Reading>>,
    shake_tx: broadcast::Sender<ShakeEvent>,
}

impl BroadcastChannelManager {
    pub fn new() -> Self {
        let (reading_tx, _) = broadcast::channel(READING_CHANNEL_CAPACITY);
        let (shake_tx, _) = broadcast::channel(SHAKE_CHANNEL_CAPACITY);
        Self {
            next_id: AtomicU64::new(1),
            reading_listeners: RwLock::new(Vec::new()),
            shake_listeners: RwLock::new(Vec::new()),
            reading_tx,
            shake_tx,
        }
    }

    fn allocate_id(&self) -> ListenerId {
        ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // ========================================================================
    // READINGS
    // ========================================================================

    /// Register a synchronous reading callback
    pub fn on_reading<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Arc<Reading>) + Send + Sync + 'static,
    {
        let id = self.allocate_id();
        let mut listeners = self
            .reading_listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        listeners.push((id, Arc::new(listener)));
        id
    }

    /// Subscribe an async receiver to readings
    pub fn subscribe_readings(&self) -> broadcast::Receiver<Arc<Reading>> {
        self.reading_tx.subscribe()
    }

    /// Deliver a reading to every callback, then to broadcast receivers
    ///
    /// Returns the number of synchronous callbacks invoked.
    pub fn publish_reading(&self, reading: &Arc<Reading>) -> usize {
        let snapshot: Vec<ReadingListener> = self
            .reading_listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in &snapshot {
            listener(reading);
        }

        // No receivers is not an error
        let _ = self.reading_tx.send(Arc::clone(reading));
        snapshot.len()
    }

    // ========================================================================
    // SHAKES
    // ========================================================================

    /// Register a synchronous shake callback
    pub fn on_shake<F>(&self, listener: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.allocate_id();
        let mut listeners = self
            .shake_listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        listeners.push((id, Arc::new(listener)));
        id
    }

    /// Subscribe an async receiver to shake events
    pub fn subscribe_shakes(&self) -> broadcast::Receiver<ShakeEvent> {
        self.shake_tx.subscribe()
    }

    pub fn publish_shake(&self, event: ShakeEvent) -> usize {
        let snapshot: Vec<ShakeListener> = self
            .shake_listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in &snapshot {
            listener();
        }

        let _ = self.shake_tx.send(event);
        snapshot.len()
    }

    // ========================================================================
    // REMOVAL
    // ========================================================================

    /// Remove a reading or shake callback; returns false if unknown
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let removed_reading = {
            let mut listeners = self
                .reading_listeners
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let before = listeners.len();
            listeners.retain(|(listener_id, _)| *listener_id != id);
            listeners.len() != before
        };

        if removed_reading {
            return true;
        }

        let mut listeners = self
            .shake_listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    pub fn reading_listener_count(&self) -> usize {
        self.reading_listeners
            .read()
            .map(|listeners| listeners.len())
            .unwrap_or(0)
    }

    pub fn shake_listener_count(&self) -> usize {
        self.shake_listeners
            .read()
            .map(|listeners| listeners.len())
            .unwrap_or(0)
    }
}

impl Default for BroadcastChannelManager {
    fn default() -> Self {
        Self::new()
    }
}
