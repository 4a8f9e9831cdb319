//! Base trait for intents.

/// Marker trait for intent objects.
///
/// Intents represent:
/// - User edits (sort changes, filter groups, scrolling)
/// - Fetch results delivered by the orchestrator
/// - Change notices pushed by the broker
pub trait Intent: Send + 'static {}
