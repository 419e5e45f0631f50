//! Detect motion events in a trace export.

use std::path::PathBuf;

use mocap_common::config::AppConfig;
use mocap_common::error::MocapError;
use mocap_motion_core::sequence::{validate_hand_marker, validate_node_sequence};
use mocap_motion_core::{detect_events, ApproachTracker, TrackingConfig};
use mocap_trace_model::event::{render_events_csv, write_events_csv};
use mocap_trace_model::frame::TraceReader;

use crate::prompt;

/// Options for one detection run. `None` falls back to config or prompting.
pub struct DetectArgs {
    pub path: PathBuf,
    pub hand: Option<String>,
    pub nodes: Option<Vec<String>>,
    pub threshold: Option<f64>,
    pub buffer: Option<u32>,
    pub output: Option<PathBuf>,
}

pub fn run(args: DetectArgs, config: &AppConfig) -> anyhow::Result<()> {
    let tracking = TrackingConfig::new(
        args.threshold.unwrap_or(config.tracking.approach_threshold),
        args.buffer.unwrap_or(config.tracking.approach_buffer),
    )?;

    println!("Analyzing trace at: {}", args.path.display());

    let reader = TraceReader::open(&args.path)
        .map_err(|e| MocapError::parse(format!("{}: {e}", args.path.display())))?;
    let registry = reader.registry().clone();
    let frequency = reader.frequency();

    println!(
        "  {} markers, {} Hz, {} frames declared",
        registry.len(),
        frequency,
        reader.frame_count()
    );

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut out = std::io::stdout();

    if args.hand.is_none() || args.nodes.is_none() {
        prompt::print_markers(&mut out, &registry)?;
    }

    let hand = match args.hand {
        Some(name) => validate_hand_marker(&name, &registry)
            .map_err(|e| MocapError::validation(format!("--hand {name}: {e}")))?,
        None => prompt::prompt_hand_marker(&mut input, &mut out, &registry)?,
    };
    let nodes = match args.nodes {
        Some(names) => validate_node_sequence(&names, &registry, &hand.name)
            .map_err(|e| MocapError::validation(format!("--nodes: {e}")))?,
        None => prompt::prompt_node_sequence(&mut input, &mut out, &registry, &hand)?,
    };

    println!("  Hand marker: {}", hand.name);
    println!("  Motion nodes: {nodes}");
    println!(
        "  Threshold: {}, buffer: {} frames",
        tracking.approach_threshold, tracking.approach_buffer
    );

    let tracker = ApproachTracker::new(tracking, hand, nodes, frequency);
    let summary = detect_events(reader, tracker)
        .map_err(|e| MocapError::parse(format!("{}: {e}", args.path.display())))?;

    println!(
        "  Detected {} motion event(s) in {} frames",
        summary.events.len(),
        summary.frames_processed
    );

    if summary.invalid_frames > 0 {
        tracing::warn!(
            skipped = summary.invalid_frames,
            degenerate = summary.degenerate_frames,
            "frames skipped during detection"
        );
        println!(
            "  Warning: skipped {} of {} frames ({:.1}%) with uncaptured markers",
            summary.invalid_frames,
            summary.frames_processed,
            summary.invalid_percentage()
        );
    }
    if summary.discarded_partial {
        println!("  Note: an unfinished motion at the end of the trace was not counted");
    }

    let output = args
        .output
        .unwrap_or_else(|| config.output_path_for(&args.path));

    if let Err(e) = write_events_csv(&output, &summary.events) {
        tracing::error!(path = %output.display(), error = %e, "failed to write events");
        eprintln!("Could not write {}: {e}", output.display());
        eprintln!("No output file was produced. Detected events:");
        print!("{}", render_events_csv(&summary.events));
        return Err(MocapError::output(format!("failed to write {}", output.display())).into());
    }

    println!("  Events saved to: {}", output.display());
    println!("\nDetection complete.");

    Ok(())
}
