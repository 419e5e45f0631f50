//! Mocap Trace Model
//!
//! Defines the core data contracts for marker trajectory analysis:
//! - **Points:** 3D marker positions with a "not captured" sentinel
//! - **Registry:** Marker display names resolved to column offsets
//! - **Frames:** Lazy, forward-only reading of tab-delimited trace exports
//! - **Events:** Detected motion events and their CSV serialization
//!
//! Frame coordinates are kept in the units of the export (typically mm).

pub mod event;
pub mod frame;
pub mod point;
pub mod registry;

pub use event::*;
pub use frame::*;
pub use point::*;
pub use registry::*;
