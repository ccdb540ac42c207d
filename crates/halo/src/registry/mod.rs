pub mod monitor_registry;
pub mod window_registry;

pub use monitor_registry::MonitorRegistry;
pub use window_registry::WindowRegistry;
