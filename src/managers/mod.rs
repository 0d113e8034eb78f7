// Smartmarks state managers
// Managers own the stateful parts of the engine: who is signed in, the local
// bookmark mirror, the sync subscription, and the add/delete operations.

pub mod bookmark_manager;
pub mod bookmark_store;
pub mod session_manager;
pub mod sync_controller;
