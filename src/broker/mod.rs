//! Process-wide change notifications.
//!
//! Write paths publish create/update/remove id batches per entity type; every
//! open list on that entity hears about each batch exactly once. The mailbox
//! behind an entity type is a pulse, not a queue: it is empty again as soon as
//! `publish` returns.

mod batch;
mod hub;

pub use batch::ChangeBatch;
pub use hub::{BrokerError, ChangeBroker, ChangeCallback, Subscription};
