//! The approach-ratio tracker.
//!
//! # Algorithm
//!
//! For every frame the hand marker `H` is compared against the current
//! target node `T` and the node before it, `P`:
//!
//! 1. **Validate**: if `H`, `T` or `P` is the `(0, 0, 0)` sentinel, the
//!    frame is skipped and counted as invalid.
//! 2. **Ratio**: `|H - T| / |H - P|`. Small values mean the hand is much
//!    closer to the target than to where it came from.
//! 3. **Enter**: the first frame with `ratio <= approach_threshold` starts an
//!    approach and arms the debounce counter with `approach_buffer`. While
//!    approaching, every frame at or below the threshold records its target
//!    distance.
//! 4. **Leave**: a frame above the threshold ends the approach only once the
//!    debounce counter has run out. Entry is immediate, exit is not.
//! 5. **Rotate**: on a confirmed departure the frame of closest approach is
//!    taken as the motion start (first node) or motion end (last node),
//!    and the target moves on to the next node.
//!
//! Reaching the end of the last node emits one [`MotionEvent`].

use mocap_common::config::TrackingDefaults;
use mocap_common::error::{MocapError, MocapResult};
use mocap_trace_model::event::MotionEvent;
use mocap_trace_model::frame::Frame;
use mocap_trace_model::point::Point3D;

use crate::sequence::{HandMarker, MotionNodeSequence};

/// Configuration for the approach tracker. Fixed for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingConfig {
    /// Ratio at or below which the hand counts as approaching.
    pub approach_threshold: f64,

    /// Minimum frames between entering an approach and accepting a
    /// departure from it.
    pub approach_buffer: u32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            approach_threshold: 0.35,
            approach_buffer: 5,
        }
    }
}

impl TrackingConfig {
    /// Create a config, rejecting thresholds outside `(0.0, 0.5)`.
    pub fn new(approach_threshold: f64, approach_buffer: u32) -> MocapResult<Self> {
        if !(approach_threshold > 0.0 && approach_threshold < 0.5) {
            return Err(MocapError::config(format!(
                "approach threshold must be between 0 and 0.5 (exclusive), got {approach_threshold}"
            )));
        }
        Ok(Self {
            approach_threshold,
            approach_buffer,
        })
    }

    pub fn from_defaults(defaults: &TrackingDefaults) -> MocapResult<Self> {
        Self::new(defaults.approach_threshold, defaults.approach_buffer)
    }
}

/// Mutable per-run tracking state.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingState {
    /// Index of the node currently being approached.
    pub target_index: usize,

    /// Index of the node the target is measured against.
    pub previous_index: usize,

    /// Whether the hand is inside the approach zone of the target.
    pub approaching: bool,

    /// Frames left before a departure is accepted. May go negative.
    pub debounce: i64,

    /// `(target_distance, frame_index)` samples of the current approach.
    pub samples: Vec<(f64, u64)>,
}

impl TrackingState {
    fn new(nodes: &MotionNodeSequence) -> Self {
        Self {
            target_index: 0,
            previous_index: nodes.previous_index(0),
            approaching: false,
            debounce: 0,
            samples: Vec::new(),
        }
    }
}

/// Frame index of the closest sample; ties go to the earliest frame.
pub fn closest_approach(samples: &[(f64, u64)]) -> Option<u64> {
    samples
        .iter()
        .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
        .map(|(_, frame)| *frame)
}

/// Approach-detection state machine.
pub struct ApproachTracker {
    config: TrackingConfig,
    hand: HandMarker,
    nodes: MotionNodeSequence,
    frequency: u32,
    state: TrackingState,
    event_index: u32,
    motion_start: Option<u64>,
    motion_end: Option<u64>,
    frames_processed: u64,
    invalid_frames: u64,
    degenerate_frames: u64,
}

impl ApproachTracker {
    /// Create a tracker for one run over frames sampled at `frequency` Hz.
    pub fn new(
        config: TrackingConfig,
        hand: HandMarker,
        nodes: MotionNodeSequence,
        frequency: u32,
    ) -> Self {
        let state = TrackingState::new(&nodes);
        Self {
            config,
            hand,
            nodes,
            frequency,
            state,
            event_index: 1,
            motion_start: None,
            motion_end: None,
            frames_processed: 0,
            invalid_frames: 0,
            degenerate_frames: 0,
        }
    }

    /// Consume one frame. Returns an event when a traversal completes.
    pub fn advance(&mut self, frame: &Frame) -> Option<MotionEvent> {
        self.frames_processed += 1;

        let target_offset = self.nodes.offset(self.state.target_index);
        let previous_offset = self.nodes.offset(self.state.previous_index);

        let positions = (
            frame.position(self.hand.offset),
            frame.position(target_offset),
            frame.position(previous_offset),
        );
        let (hand, target, previous) = match positions {
            (Some(h), Some(t), Some(p))
                if !h.is_missing() && !t.is_missing() && !p.is_missing() =>
            {
                (h, t, p)
            }
            _ => {
                self.invalid_frames += 1;
                tracing::trace!(frame = frame.index, "skipping frame with uncaptured marker");
                return None;
            }
        };

        let Some((target_distance, ratio)) = approach_ratio(&hand, &target, &previous) else {
            self.invalid_frames += 1;
            self.degenerate_frames += 1;
            tracing::trace!(frame = frame.index, "skipping frame with hand on the previous node");
            return None;
        };

        self.state.debounce -= 1;

        if ratio <= self.config.approach_threshold {
            if !self.state.approaching {
                self.state.approaching = true;
                self.state.debounce = i64::from(self.config.approach_buffer);
                tracing::debug!(
                    frame = frame.index,
                    node = self.nodes.name(self.state.target_index),
                    ratio,
                    "approach entered"
                );
            }
            self.state.samples.push((target_distance, frame.index));
            return None;
        }

        if !self.state.approaching || self.state.debounce > 0 {
            return None;
        }

        self.confirm_departure(frame.index)
    }

    fn confirm_departure(&mut self, frame_index: u64) -> Option<MotionEvent> {
        let target_index = self.state.target_index;
        let closest = closest_approach(&self.state.samples);
        let mut emitted = None;

        tracing::debug!(
            frame = frame_index,
            node = self.nodes.name(target_index),
            closest = ?closest,
            "departure confirmed"
        );

        if target_index == 0 {
            self.motion_start = closest;
        }

        if target_index == self.nodes.last_index() {
            self.motion_end = closest;
            match (self.motion_start.take(), self.motion_end.take()) {
                (Some(start), Some(end)) => {
                    let event = MotionEvent::new(self.event_index, start, end, self.frequency);
                    tracing::debug!(
                        index = event.index,
                        start = event.start_frame,
                        end = event.end_frame,
                        "motion event emitted"
                    );
                    self.event_index += 1;
                    emitted = Some(event);
                }
                _ => tracing::warn!(frame = frame_index, "traversal ended without a start frame"),
            }
        }

        self.state.approaching = false;
        self.state.samples.clear();

        let next = (target_index + 1) % self.nodes.len();
        self.state.target_index = next;
        self.state.previous_index = self.nodes.previous_index(next);

        emitted
    }

    pub fn state(&self) -> &TrackingState {
        &self.state
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    pub fn nodes(&self) -> &MotionNodeSequence {
        &self.nodes
    }

    /// Name of the node currently being approached.
    pub fn target_node(&self) -> &str {
        self.nodes.name(self.state.target_index)
    }

    /// Name of the node the target is measured against.
    pub fn previous_node(&self) -> &str {
        self.nodes.name(self.state.previous_index)
    }

    /// Index the next emitted event will receive.
    pub fn next_event_index(&self) -> u32 {
        self.event_index
    }

    /// Whether a traversal has started but not completed.
    pub fn has_partial_traversal(&self) -> bool {
        self.motion_start.is_some()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn invalid_frames(&self) -> u64 {
        self.invalid_frames
    }

    /// Invalid frames caused by the hand sitting exactly on the previous node.
    pub fn degenerate_frames(&self) -> u64 {
        self.degenerate_frames
    }
}

/// `(target_distance, ratio)`, or `None` when the ratio is undefined.
fn approach_ratio(hand: &Point3D, target: &Point3D, previous: &Point3D) -> Option<(f64, f64)> {
    let target_distance = hand.distance_to(target);
    let previous_distance = hand.distance_to(previous);
    if previous_distance == 0.0 {
        return None;
    }
    Some((target_distance, target_distance / previous_distance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{validate_hand_marker, validate_node_sequence};
    use mocap_trace_model::registry::MarkerRegistry;

    const A: Point3D = Point3D {
        x: 100.0,
        y: 0.0,
        z: 0.0,
    };
    const B: Point3D = Point3D {
        x: 0.0,
        y: 100.0,
        z: 0.0,
    };
    const C: Point3D = Point3D {
        x: 0.0,
        y: 0.0,
        z: 100.0,
    };

    /// Registry: HAND, A, B, C.
    fn tracker(nodes: &[&str], config: TrackingConfig) -> ApproachTracker {
        let registry = MarkerRegistry::from_names(["HAND", "A", "B", "C"]);
        let hand = validate_hand_marker("HAND", &registry).unwrap();
        let nodes = validate_node_sequence(nodes, &registry, "HAND").unwrap();
        ApproachTracker::new(config, hand, nodes, 100)
    }

    fn frame(index: u64, hand: Point3D) -> Frame {
        Frame::from_points(index, &[hand, A, B, C])
    }

    /// A hand position `fraction` of the way from `from` to `to`.
    fn between(from: Point3D, to: Point3D, fraction: f64) -> Point3D {
        Point3D::new(
            from.x + (to.x - from.x) * fraction,
            from.y + (to.y - from.y) * fraction,
            from.z + (to.z - from.z) * fraction,
        )
    }

    /// Feed hand positions as consecutive frames, continuing the numbering.
    fn run(tracker: &mut ApproachTracker, hands: &[Point3D]) -> Vec<MotionEvent> {
        let mut events = vec![];
        for hand in hands {
            let index = tracker.frames_processed() + 1;
            if let Some(event) = tracker.advance(&frame(index, *hand)) {
                events.push(event);
            }
        }
        events
    }

    #[test]
    fn test_closest_approach_picks_minimum_distance() {
        assert_eq!(closest_approach(&[(5.0, 10), (3.0, 11), (4.0, 12)]), Some(11));
    }

    #[test]
    fn test_closest_approach_ties_go_to_earliest_frame() {
        assert_eq!(closest_approach(&[(2.0, 20), (1.0, 21), (1.0, 22)]), Some(21));
        assert_eq!(closest_approach(&[]), None);
    }

    #[test]
    fn test_config_rejects_out_of_range_threshold() {
        assert!(TrackingConfig::new(0.0, 5).is_err());
        assert!(TrackingConfig::new(0.5, 5).is_err());
        assert!(TrackingConfig::new(f64::NAN, 5).is_err());
        assert!(TrackingConfig::new(0.2, 0).is_ok());
        assert_eq!(
            TrackingConfig::from_defaults(&TrackingDefaults::default()).unwrap(),
            TrackingConfig::default()
        );
    }

    #[test]
    fn test_initial_state_measures_first_node_against_last() {
        let tracker = tracker(&["A", "B", "C"], TrackingConfig::default());
        assert_eq!(tracker.target_node(), "A");
        assert_eq!(tracker.previous_node(), "C");
        assert_eq!(tracker.next_event_index(), 1);
        assert!(!tracker.state().approaching);
    }

    #[test]
    fn test_two_node_traversal_emits_one_event() {
        let config = TrackingConfig::new(0.35, 2).unwrap();
        let mut tracker = tracker(&["A", "B"], config);

        let hands = [
            between(B, A, 0.5),  // 1: ratio 1, idle
            between(B, A, 0.9),  // 2: enter A
            between(B, A, 0.95), // 3: closest to A
            between(B, A, 0.9),  // 4
            between(B, A, 0.5),  // 5: leave A
            between(A, B, 0.9),  // 6: enter B
            between(A, B, 0.97), // 7: closest to B
            between(A, B, 0.9),  // 8
            between(A, B, 0.5),  // 9: leave B, emit
        ];
        let events = run(&mut tracker, &hands);

        assert_eq!(events, vec![MotionEvent::new(1, 3, 7, 100)]);
        assert!((events[0].duration_secs - 0.04).abs() < 1e-12);
        assert_eq!(tracker.next_event_index(), 2);
        assert_eq!(tracker.target_node(), "A");
        assert_eq!(tracker.previous_node(), "B");
        assert!(!tracker.has_partial_traversal());
    }

    #[test]
    fn test_rotation_after_last_node_wraps_previous() {
        let config = TrackingConfig::new(0.35, 1).unwrap();
        let mut tracker = tracker(&["A", "B", "C"], config);

        let hands = [
            between(C, A, 0.95),
            between(C, A, 0.5),
            between(A, B, 0.95),
            between(A, B, 0.5),
        ];
        run(&mut tracker, &hands);
        assert_eq!(tracker.target_node(), "C");
        assert_eq!(tracker.previous_node(), "B");

        let events = run(&mut tracker, &[between(B, C, 0.95), between(B, C, 0.5)]);
        assert_eq!(events, vec![MotionEvent::new(1, 1, 5, 100)]);
        assert_eq!(tracker.state().target_index, 0);
        assert_eq!(tracker.previous_node(), "C");
    }

    #[test]
    fn test_short_excursion_does_not_split_approach() {
        let config = TrackingConfig::new(0.35, 5).unwrap();
        let mut tracker = tracker(&["A", "B"], config);

        let hands = [
            between(B, A, 0.9),  // 1: enter, debounce 5
            between(B, A, 0.5),  // 2: above, debounce 4
            between(B, A, 0.5),  // 3: above, debounce 3
            between(B, A, 0.99), // 4: back inside, closest
            between(B, A, 0.9),  // 5
        ];
        run(&mut tracker, &hands);

        assert!(tracker.state().approaching);
        assert_eq!(tracker.target_node(), "A");
        assert_eq!(tracker.state().samples.len(), 3);
    }

    #[test]
    fn test_departure_requires_buffer_to_elapse() {
        let config = TrackingConfig::new(0.35, 3).unwrap();
        let mut tracker = tracker(&["A", "B"], config);

        run(&mut tracker, &[between(B, A, 0.9)]);
        assert_eq!(tracker.state().debounce, 3);

        run(&mut tracker, &[between(B, A, 0.5), between(B, A, 0.5)]);
        assert!(tracker.state().approaching);
        assert_eq!(tracker.state().debounce, 1);

        run(&mut tracker, &[between(B, A, 0.5)]);
        assert!(!tracker.state().approaching);
        assert_eq!(tracker.target_node(), "B");
        assert!(tracker.state().samples.is_empty());
        assert!(tracker.has_partial_traversal());
    }

    #[test]
    fn test_missing_markers_are_skipped() {
        let config = TrackingConfig::new(0.35, 0).unwrap();
        let mut tracker = tracker(&["A", "B"], config);

        tracker.advance(&frame(1, between(B, A, 0.9)));
        let before = tracker.state().clone();

        tracker.advance(&frame(2, Point3D::MISSING));
        let dropped_target = Frame::from_points(3, &[between(B, A, 0.5), Point3D::MISSING, B, C]);
        tracker.advance(&dropped_target);
        let dropped_previous = Frame::from_points(4, &[between(B, A, 0.5), A, Point3D::MISSING, C]);
        tracker.advance(&dropped_previous);

        assert_eq!(tracker.state(), &before);
        assert_eq!(tracker.invalid_frames(), 3);
        assert_eq!(tracker.frames_processed(), 4);
    }

    #[test]
    fn test_missing_unrelated_marker_is_ignored() {
        let mut tracker = tracker(&["A", "B"], TrackingConfig::default());
        let frame = Frame::from_points(1, &[between(B, A, 0.9), A, B, Point3D::MISSING]);
        tracker.advance(&frame);
        assert_eq!(tracker.invalid_frames(), 0);
        assert!(tracker.state().approaching);
    }

    #[test]
    fn test_hand_on_previous_node_is_degenerate() {
        let mut tracker = tracker(&["A", "B"], TrackingConfig::default());
        tracker.advance(&frame(1, B));
        assert_eq!(tracker.invalid_frames(), 1);
        assert_eq!(tracker.degenerate_frames(), 1);
        assert_eq!(tracker.state().debounce, 0);
    }

    #[test]
    fn test_partial_traversal_is_not_emitted() {
        let config = TrackingConfig::new(0.35, 1).unwrap();
        let mut tracker = tracker(&["A", "B"], config);
        let events = run(
            &mut tracker,
            &[between(B, A, 0.95), between(B, A, 0.5), between(A, B, 0.95)],
        );
        assert!(events.is_empty());
        assert!(tracker.has_partial_traversal());
        assert_eq!(tracker.next_event_index(), 1);
    }

    #[test]
    fn test_cyclic_sequence_completes() {
        let config = TrackingConfig::new(0.35, 1).unwrap();
        let mut tracker = tracker(&["A", "B", "A"], config);
        assert_eq!(tracker.previous_node(), "B");

        let hands = [
            between(B, A, 0.95), // 1: enter A
            between(B, A, 0.5),  // 2: leave A
            between(A, B, 0.95), // 3: enter B
            between(A, B, 0.5),  // 4: leave B
            between(B, A, 0.95), // 5: enter A (last)
            between(B, A, 0.5),  // 6: leave A, emit
        ];
        let events = run(&mut tracker, &hands);
        assert_eq!(events, vec![MotionEvent::new(1, 1, 5, 100)]);
        assert_eq!(tracker.target_node(), "A");
        assert_eq!(tracker.previous_node(), "B");
    }
}
