pub mod apt;
pub mod config;
pub mod host;
pub mod identity;
pub mod paths;
pub mod profile;
pub mod shell;
pub mod subid;
pub mod systemd;

// Re-export commonly used types
pub use config::SetupConfig;
pub use host::{Host, SystemHost};
pub use identity::Identity;
