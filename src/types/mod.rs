// Smartmarks shared type definitions
// Each submodule defines types used across managers, services and stores.

pub mod bookmark;
pub mod errors;
pub mod identity;
pub mod settings;
