// Managers Module
//
// Focused manager classes used by the AccelerometerProcessor.
//
// Each manager handles one specific concern:
// - SensorManager: Sensor subscription lifecycle (Idle/Running/Failed)
// - BroadcastChannelManager: Reading and shake listeners plus tokio broadcast bridges

pub mod broadcast_manager;
pub mod sensor_manager;

pub use broadcast_manager::{BroadcastChannelManager, ListenerId};
pub use sensor_manager::{SensorLifecycle, SensorManager};
