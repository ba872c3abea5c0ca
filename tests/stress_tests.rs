//! Stress tests for the dispatcher queue
//!
//! These tests verify:
//! - No accepted entry is lost under heavy concurrent load
//! - Each producer's entries keep their relative order
//! - A full queue blocks producers instead of dropping entries
//! - Rotation under load never splits or duplicates a line

use crossbeam_channel::{bounded, Receiver};
use rotating_logger::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

const THREADS: usize = 8;
const PER_THREAD: usize = 500;

/// Every log file for `file_name` in `dir`, archives first in retirement order
fn all_log_files(dir: &Path, file_name: &str) -> Vec<PathBuf> {
    let prefix = format!("{}.", file_name);
    let mut archives: Vec<(String, u32, PathBuf)> = fs::read_dir(dir)
        .expect("Failed to read log dir")
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().into_string().ok()?;
            let stamp = name.strip_prefix(&prefix)?.strip_suffix(".log")?;
            // YYYYMMDD_HHMMSS or YYYYMMDD_HHMMSS_n
            let (base, collision) = match stamp.rsplit_once('_') {
                Some((base, n)) if base.contains('_') => (base.to_string(), n.parse().ok()?),
                _ => (stamp.to_string(), 0),
            };
            Some((base, collision, e.path()))
        })
        .collect();
    archives.sort();

    let mut files: Vec<PathBuf> = archives.into_iter().map(|(_, _, path)| path).collect();
    files.push(dir.join(file_name));
    files
}

/// Stalls the first console write until the gate is opened
struct GatedWriter {
    gate: Option<Receiver<()>>,
}

impl Write for GatedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(gate) = self.gate.take() {
            let _ = gate.recv();
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Parse "T<thread> M<seq>" messages and check per-thread ordering
fn assert_per_thread_order(lines: &[String]) -> HashMap<usize, usize> {
    let mut next_seq: HashMap<usize, usize> = HashMap::new();
    for line in lines {
        let message = line
            .split_once("] ")
            .map(|(_, m)| m)
            .unwrap_or_else(|| panic!("Malformed line: {:?}", line));
        let (thread_part, seq_part) = message.split_once(' ').unwrap();
        let thread_id: usize = thread_part.trim_start_matches('T').parse().unwrap();
        let seq: usize = seq_part.trim_start_matches('M').parse().unwrap();

        let expected = next_seq.entry(thread_id).or_insert(0);
        assert_eq!(seq, *expected, "Thread {} out of order", thread_id);
        *expected += 1;
    }
    next_seq
}

fn spawn_producers(logger: &Arc<Logger>) {
    let handles: Vec<_> = (0..THREADS)
        .map(|thread_id| {
            let logger = Arc::clone(logger);
            thread::spawn(move || {
                for seq in 0..PER_THREAD {
                    logger.info(format!("T{} M{}", thread_id, seq));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Producer thread panicked");
    }
}

#[test]
fn test_concurrent_producers_lose_nothing() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("concurrent.log");

    let logger = Arc::new(Logger::new(&log_file, LogLevel::Info, 10, false).unwrap());
    logger.start_worker().unwrap();
    spawn_producers(&logger);
    logger.close().unwrap();

    let lines: Vec<String> = fs::read_to_string(&log_file)
        .expect("Failed to read log file")
        .lines()
        .map(str::to_string)
        .collect();
    assert_eq!(lines.len(), THREADS * PER_THREAD);

    let counts = assert_per_thread_order(&lines);
    assert_eq!(counts.len(), THREADS);
    assert!(counts.values().all(|&n| n == PER_THREAD));

    let metrics = logger.metrics();
    assert_eq!(metrics.accepted_count(), (THREADS * PER_THREAD) as u64);
    assert_eq!(metrics.written_count(), (THREADS * PER_THREAD) as u64);
    assert_eq!(metrics.write_failures(), 0);
}

#[test]
fn test_full_queue_blocks_instead_of_dropping() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("backpressure.log");

    let (open_gate, gate) = bounded(1);

    let logger = Arc::new(
        Logger::builder(&log_file)
            .queue_capacity(1)
            .console_writer(GatedWriter { gate: Some(gate) })
            .build()
            .unwrap(),
    );
    logger.start_worker().unwrap();

    // The dispatcher stalls on its first entry, so the queue fills up
    let stalled = {
        let logger = Arc::clone(&logger);
        thread::spawn(move || {
            for seq in 0..50 {
                logger.info(format!("T0 M{}", seq));
            }
        })
    };
    while logger.metrics().block_events() == 0 {
        thread::yield_now();
    }
    open_gate.send(()).unwrap();
    stalled.join().expect("Producer thread panicked");
    logger.close().unwrap();

    let lines: Vec<String> = fs::read_to_string(&log_file)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    assert_eq!(lines.len(), 50);
    assert_per_thread_order(&lines);
    assert!(logger.metrics().block_events() > 0);
}

#[test]
fn test_rotation_under_load() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("rotating.log");

    let logger = Arc::new(
        Logger::builder(&log_file)
            .max_bytes(8 * 1024)
            .queue_capacity(64)
            .build()
            .unwrap(),
    );
    logger.start_worker().unwrap();
    spawn_producers(&logger);
    logger.close().unwrap();

    let files = all_log_files(temp_dir.path(), "rotating.log");
    assert!(files.len() > 2, "Expected several rotations, got {:?}", files);

    let mut lines = Vec::new();
    for file in &files {
        let content = fs::read_to_string(file).expect("Failed to read log file");
        assert!(content.is_empty() || content.ends_with('\n'), "Partial line in {:?}", file);
        lines.extend(content.lines().map(str::to_string));
    }

    // Archives are read in retirement order, so concatenation preserves emit order
    assert_eq!(lines.len(), THREADS * PER_THREAD);
    assert_per_thread_order(&lines);
    assert_eq!(
        logger.metrics().rotation_count() as usize,
        files.len() - 1
    );
}

#[test]
fn test_concurrent_set_level_while_logging() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("levels.log");

    let logger = Arc::new(Logger::new(&log_file, LogLevel::Debug, 10, false).unwrap());
    logger.start_worker().unwrap();

    let toggler = {
        let logger = Arc::clone(&logger);
        thread::spawn(move || {
            for i in 0..1000 {
                let level = if i % 2 == 0 { LogLevel::Error } else { LogLevel::Debug };
                logger.set_level(level);
            }
        })
    };
    let writer = {
        let logger = Arc::clone(&logger);
        thread::spawn(move || {
            for i in 0..1000 {
                logger.error(format!("always {}", i));
                logger.debug(format!("sometimes {}", i));
            }
        })
    };
    toggler.join().unwrap();
    writer.join().unwrap();
    logger.close().unwrap();

    let content = fs::read_to_string(&log_file).unwrap();
    assert_eq!(content.matches("[ERROR] always").count(), 1000);
    assert_eq!(
        content.lines().count() as u64,
        logger.metrics().accepted_count()
    );
}
