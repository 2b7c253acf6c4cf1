// Infrastructure module - Core background services and utilities
pub mod heartbeat;
pub mod task_manager;
pub mod timer;

pub use heartbeat::HeartbeatMonitor;
pub use task_manager::TaskManager;
pub use timer::Timer;
