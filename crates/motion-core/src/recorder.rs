//! Ordered store of emitted motion events.

use mocap_trace_model::event::MotionEvent;

/// Accumulates events in emission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRecorder {
    events: Vec<MotionEvent>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: MotionEvent) {
        debug_assert!(
            self.events
                .last()
                .map_or(true, |last| last.index < event.index),
            "events must be recorded in emission order"
        );
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MotionEvent> {
        self.events.iter()
    }

    pub fn into_events(self) -> Vec<MotionEvent> {
        self.events
    }
}

impl<'a> IntoIterator for &'a EventRecorder {
    type Item = &'a MotionEvent;
    type IntoIter = std::slice::Iter<'a, MotionEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
