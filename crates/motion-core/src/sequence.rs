//! Hand marker and motion-node sequence validation.
//!
//! Callers (typically an interactive prompt) pass raw user input through
//! these functions and re-ask on error; the tracker only ever sees
//! validated values.

use mocap_trace_model::registry::MarkerRegistry;

/// Reasons a hand marker or node sequence is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("no hand marker given")]
    EmptyHand,

    #[error("unknown marker: {name}")]
    UnknownMarker { name: String },

    #[error("at least 2 motion nodes are required, got {count}")]
    TooFewNodes { count: usize },

    #[error("hand marker {name} cannot also be a motion node")]
    HandInSequence { name: String },

    #[error("node {index} repeats the previous node {name}")]
    ConsecutiveDuplicate { index: usize, name: String },
}

/// The validated hand marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandMarker {
    pub name: String,
    pub offset: usize,
}

/// A validated, ordered list of motion nodes.
///
/// Guarantees: at least two nodes, none is the hand marker, no two
/// consecutive nodes are equal. First and last may coincide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionNodeSequence {
    names: Vec<String>,
    offsets: Vec<usize>,
}

impl MotionNodeSequence {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, index: usize) -> &str {
        &self.names[index]
    }

    /// Registry offset of the node at `index`.
    pub fn offset(&self, index: usize) -> usize {
        self.offsets[index]
    }

    pub fn last_index(&self) -> usize {
        self.names.len() - 1
    }

    /// Whether the sequence returns to its starting node.
    pub fn is_cyclic(&self) -> bool {
        self.names.first() == self.names.last()
    }

    /// Index of the node a target at `index` is measured against.
    ///
    /// This is the node immediately before `index`, wrapping around. If
    /// that node is the target itself (first and last nodes coincide), the
    /// search continues backwards to the nearest different node.
    pub fn previous_index(&self, index: usize) -> usize {
        let len = self.names.len();
        let mut candidate = (index + len - 1) % len;
        while self.names[candidate] == self.names[index] && candidate != index {
            candidate = (candidate + len - 1) % len;
        }
        candidate
    }
}

impl std::fmt::Display for MotionNodeSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.names.join(" -> "))
    }
}

/// Resolve the hand marker against the registry.
pub fn validate_hand_marker(
    name: &str,
    registry: &MarkerRegistry,
) -> Result<HandMarker, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyHand);
    }
    let offset = registry
        .offset(name)
        .map_err(|_| ValidationError::UnknownMarker {
            name: name.to_string(),
        })?;
    Ok(HandMarker {
        name: name.to_string(),
        offset,
    })
}

/// Validate a candidate node sequence for the given hand marker.
pub fn validate_node_sequence<S: AsRef<str>>(
    candidate: &[S],
    registry: &MarkerRegistry,
    hand_marker: &str,
) -> Result<MotionNodeSequence, ValidationError> {
    if candidate.len() < 2 {
        return Err(ValidationError::TooFewNodes {
            count: candidate.len(),
        });
    }

    let mut names = Vec::with_capacity(candidate.len());
    let mut offsets = Vec::with_capacity(candidate.len());

    for (index, raw) in candidate.iter().enumerate() {
        let name = raw.as_ref().trim();
        let offset = registry
            .offset(name)
            .map_err(|_| ValidationError::UnknownMarker {
                name: name.to_string(),
            })?;

        if name == hand_marker {
            return Err(ValidationError::HandInSequence {
                name: name.to_string(),
            });
        }
        if names.last().is_some_and(|prev: &String| prev == name) {
            return Err(ValidationError::ConsecutiveDuplicate {
                index: index + 1,
                name: name.to_string(),
            });
        }

        names.push(name.to_string());
        offsets.push(offset);
    }

    Ok(MotionNodeSequence { names, offsets })
}
