//! Base trait for domain state in the MVI loop.

/// Marker trait for domain state snapshots.
///
/// States should be:
/// - Immutable (Clone to create new states)
/// - Self-contained (everything the front-end needs to render)
/// - Comparable (PartialEq for detecting changes)
/// - Defaultable (the empty state used on first boot and on recovery)
pub trait DomainState: Clone + PartialEq + Default + Send + 'static {}
