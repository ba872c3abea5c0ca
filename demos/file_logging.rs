//! File logging example
//!
//! Logs to a small rotating file with console echo, then drains on close.
//!
//! Run with: cargo run --example file_logging

use rotating_logger::prelude::*;
use rotating_logger::{info, warn};

fn main() -> Result<()> {
    println!("=== Rotating Logger - File Logging Example ===\n");

    // A 4 KiB threshold so the example produces a few archives
    let logger = Logger::builder("logs/application.log")
        .min_level(LogLevel::Debug)
        .max_bytes(4 * 1024)
        .console(true)
        .build()?;
    logger.start_worker()?;

    println!("1. Logging to both console and file:");

    logger.info("Application started");
    logger.debug("Loading configuration...");
    logger.info("Configuration loaded successfully");
    logger.warn("Using default settings for some options");
    logger.error("Failed to load optional plugin");

    println!("\n2. Producing enough output to rotate:");

    for i in 1..=200 {
        info!(logger, "Processing item {}/200", i);
        if i % 50 == 0 {
            warn!(logger, "Checkpoint at item {}", i);
        }
    }

    // Blocks until every queued entry is on disk
    logger.close()?;

    let metrics = logger.metrics();
    println!("\n=== Example completed successfully! ===");
    println!(
        "Written: {}, rotations: {}, write failures: {}",
        metrics.written_count(),
        metrics.rotation_count(),
        metrics.write_failures()
    );
    println!("Check 'logs/' for the active file and its archives");

    Ok(())
}
