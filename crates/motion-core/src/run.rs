//! Drive a frame source through the tracker.

use mocap_trace_model::frame::Frame;

use crate::recorder::EventRecorder;
use crate::tracker::ApproachTracker;

/// Outcome of one detection run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Emitted events in order.
    pub events: EventRecorder,

    /// Frames consumed, valid or not.
    pub frames_processed: u64,

    /// Frames skipped for an uncaptured or degenerate marker.
    pub invalid_frames: u64,

    /// Subset of `invalid_frames` where the hand sat on the previous node.
    pub degenerate_frames: u64,

    /// Whether a started traversal was dropped at end of input.
    pub discarded_partial: bool,
}

impl RunSummary {
    /// Share of skipped frames, in percent.
    pub fn invalid_percentage(&self) -> f64 {
        if self.frames_processed == 0 {
            return 0.0;
        }
        self.invalid_frames as f64 / self.frames_processed as f64 * 100.0
    }
}

/// Run the tracker over every frame, stopping at the first source error.
pub fn detect_events<I, E>(frames: I, mut tracker: ApproachTracker) -> Result<RunSummary, E>
where
    I: IntoIterator<Item = Result<Frame, E>>,
{
    let mut events = EventRecorder::new();
    let mut last_index = 0;

    tracing::debug!(
        nodes = %tracker.nodes(),
        cyclic = tracker.nodes().is_cyclic(),
        "starting detection"
    );

    for frame in frames {
        let frame = frame?;
        debug_assert!(frame.index > last_index, "frame indices must increase");
        last_index = frame.index;

        if let Some(event) = tracker.advance(&frame) {
            events.record(event);
        }
    }

    let discarded_partial = tracker.has_partial_traversal();
    if discarded_partial {
        tracing::debug!(
            target_node = tracker.target_node(),
            "dropping traversal still in progress at end of input"
        );
    }

    tracing::info!(
        events = events.len(),
        frames = tracker.frames_processed(),
        invalid = tracker.invalid_frames(),
        "detection finished"
    );

    Ok(RunSummary {
        events,
        frames_processed: tracker.frames_processed(),
        invalid_frames: tracker.invalid_frames(),
        degenerate_frames: tracker.degenerate_frames(),
        discarded_partial,
    })
}
