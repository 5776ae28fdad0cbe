// Project lifecycle
pub mod branch;
pub mod update;
pub mod venv;

// Tags
pub mod install;
pub mod list;

// Utilities
pub mod bench;
pub mod inventory;
