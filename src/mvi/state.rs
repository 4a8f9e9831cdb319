//! Base trait for view state.

/// Marker trait for state snapshots.
///
/// States are cloned to create new states and compared to detect changes,
/// so they carry no handles or interior mutability.
pub trait ViewState: Clone + PartialEq + Send + 'static {}
