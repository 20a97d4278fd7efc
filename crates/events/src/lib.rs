//! Event bus and safety alert delivery for navmate.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the domain event envelope.
//! - [`EventPersistence`]: background service writing every event to the
//!   `events` table.
//! - [`delivery`]: outbound webhook and email channels.
//! - [`AlertDispatcher`]: the [`SafetyNotifier`](navmate_core::notifier::SafetyNotifier)
//!   used in production, fanning alerts out to the bus and the channels.

pub mod bus;
pub mod delivery;
pub mod notifier;
pub mod persistence;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery};
pub use delivery::webhook::WebhookDelivery;
pub use notifier::AlertDispatcher;
pub use persistence::EventPersistence;
