//! Interfaces to the external collaborators the sync engine depends on.
//!
//! The engine never talks to a concrete auth service, database, or realtime
//! channel directly; it goes through these traits so the bundled local
//! backends, the REST backend, and test doubles are interchangeable.

pub mod auth;
pub mod notifications;
pub mod persistence;

pub use auth::{AuthProvider, IdentityListener, ListenerHandle};
pub use notifications::{ChangeNotifier, Subscription, SubscriptionHandle};
pub use persistence::{OrderBy, PersistenceProvider, RowFilter};
