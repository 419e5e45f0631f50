//! Interactive selection of the hand marker and motion nodes.
//!
//! Each prompt loops until the answer validates; validation itself lives
//! in `mocap_motion_core::sequence`.

use std::io::{BufRead, Write};

use anyhow::bail;
use mocap_motion_core::sequence::{
    validate_hand_marker, validate_node_sequence, HandMarker, MotionNodeSequence,
};
use mocap_trace_model::registry::MarkerRegistry;

/// Split a node list on commas and whitespace.
pub fn parse_node_list(line: &str) -> Vec<String> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Print the available marker names.
pub fn print_markers<W: Write>(out: &mut W, registry: &MarkerRegistry) -> std::io::Result<()> {
    writeln!(out, "Available markers:")?;
    for name in registry.names() {
        writeln!(out, "  {name}")?;
    }
    Ok(())
}

fn read_answer<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    question: &str,
) -> anyhow::Result<Option<String>> {
    write!(out, "{question}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Ask for the hand marker until a registered name is given.
pub fn prompt_hand_marker<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    registry: &MarkerRegistry,
) -> anyhow::Result<HandMarker> {
    loop {
        let Some(answer) = read_answer(input, out, "Hand marker: ")? else {
            bail!("input closed before a hand marker was chosen");
        };
        match validate_hand_marker(&answer, registry) {
            Ok(hand) => return Ok(hand),
            Err(e) => writeln!(out, "  {e}, try again")?,
        }
    }
}

/// Ask for the ordered motion nodes until a valid sequence is given.
pub fn prompt_node_sequence<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    registry: &MarkerRegistry,
    hand: &HandMarker,
) -> anyhow::Result<MotionNodeSequence> {
    loop {
        let Some(answer) =
            read_answer(input, out, "Motion nodes in order (comma separated): ")?
        else {
            bail!("input closed before motion nodes were chosen");
        };
        match validate_node_sequence(&parse_node_list(&answer), registry, &hand.name) {
            Ok(nodes) => return Ok(nodes),
            Err(e) => writeln!(out, "  {e}, try again")?,
        }
    }
}
