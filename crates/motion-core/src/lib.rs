//! Mocap Motion Core — approach detection
//!
//! Turns a stream of marker frames into motion events:
//! - **Sequence:** Validate the hand marker and the ordered motion nodes
//! - **Tracker:** The approach-ratio state machine, one frame at a time
//! - **Recorder:** Ordered store of emitted events
//! - **Run:** Drive a frame source through the tracker and summarize
//!
//! This crate is pure computation — no I/O, no prompting.
//! All inputs are data; all outputs are data.

pub mod recorder;
pub mod run;
pub mod sequence;
pub mod tracker;

pub use recorder::EventRecorder;
pub use run::{detect_events, RunSummary};
pub use sequence::{
    validate_hand_marker, validate_node_sequence, HandMarker, MotionNodeSequence,
    ValidationError,
};
pub use tracker::{closest_approach, ApproachTracker, TrackingConfig, TrackingState};
