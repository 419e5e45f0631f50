//! Show trace header information.

use std::path::PathBuf;

use mocap_common::error::MocapError;
use mocap_trace_model::frame::TraceReader;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let reader = TraceReader::open(&path)
        .map_err(|e| MocapError::parse(format!("{}: {e}", path.display())))?;
    let header = reader.header();

    println!("Trace: {}", path.display());
    println!("  Frames (declared): {}", header.frame_count);
    println!("  Frequency: {} Hz", header.frequency);
    println!(
        "  Duration (declared): {:.2}s",
        header.frame_count as f64 / f64::from(header.frequency)
    );
    println!();

    println!("Markers ({}):", reader.registry().len());
    for (offset, name) in reader.registry().names().iter().enumerate() {
        println!("  {offset:>3}  {name}");
    }

    if !header.extra.is_empty() {
        println!();
        println!("Other header rows:");
        for (key, value) in &header.extra {
            println!("  {key}: {value}");
        }
    }

    Ok(())
}
