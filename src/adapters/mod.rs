// Adapters layer: concrete implementations of the domain ports.

pub mod network;
pub mod process;
pub mod venv;

pub use network::{HttpPublicIpLookup, InterfaceResolver};
pub use process::PythonAppLauncher;
pub use venv::PythonVenv;
