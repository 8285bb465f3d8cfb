// Debug logging module for asynchronous decision logging
//
// Entries are queued on an unbounded channel and written by a single
// writer task, so the autoplay tick never waits on file I/O and lines land
// in the order they were logged. Each accepted move becomes one JSONL line.

use log::error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;

use crate::types::{Direction, Grid};

/// A single decision as written to the JSONL log
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LogEntry {
    pub move_number: u64,
    pub chosen_move: Direction,
    /// Grid the move was chosen for, before it was applied
    pub grid: Grid,
    /// Game score before the move
    pub score: u64,
    pub expected_value: Option<f64>,
    pub timestamp: String,
}

enum LogCommand {
    Write(LogEntry),
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// Shared debug logger state
/// Clones share the same queue and writer task
#[derive(Clone)]
pub struct DebugLogger {
    sender: Option<mpsc::UnboundedSender<LogCommand>>,
    writer: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl DebugLogger {
    /// Creates a new debug logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    /// and starts the writer task on the current runtime
    pub async fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
            .await
        {
            Ok(file) => {
                log::info!("Debug logging enabled: {}", log_file_path);
                let (sender, receiver) = mpsc::unbounded_channel();
                let writer = tokio::spawn(Self::run_writer(file, receiver));
                DebugLogger {
                    sender: Some(sender),
                    writer: Arc::new(Mutex::new(Some(writer))),
                }
            }
            Err(e) => {
                error!("Failed to create debug log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled debug logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger {
            sender: None,
            writer: Arc::new(Mutex::new(None)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Queues a move decision for the writer task without blocking
    pub fn log_move(
        &self,
        move_number: u64,
        grid: Grid,
        score: u64,
        chosen_move: Direction,
        expected_value: Option<f64>,
    ) {
        let Some(sender) = &self.sender else {
            return;
        };

        let entry = LogEntry {
            move_number,
            chosen_move,
            grid,
            score,
            expected_value,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        if sender.send(LogCommand::Write(entry)).is_err() {
            error!("Debug log writer has stopped; dropping entry {}", move_number);
        }
    }

    /// Waits until every entry queued before this call is written and flushed
    pub async fn flush(&self) {
        let Some(sender) = &self.sender else {
            return;
        };

        let (ack, done) = oneshot::channel();
        if sender.send(LogCommand::Flush(ack)).is_err() {
            return;
        }
        if done.await.is_err() {
            error!("Debug log writer stopped before flushing");
        }
    }

    /// Drains the queue, flushes the file and waits for the writer task to exit
    /// Entries logged afterwards are dropped
    pub async fn shutdown(&self) {
        let Some(sender) = &self.sender else {
            return;
        };

        let _ = sender.send(LogCommand::Shutdown);
        let handle = self.writer.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("Debug log writer task failed: {}", e);
            }
        }
    }

    async fn run_writer(mut file: File, mut receiver: mpsc::UnboundedReceiver<LogCommand>) {
        while let Some(command) = receiver.recv().await {
            match command {
                LogCommand::Write(entry) => Self::write_entry(&mut file, &entry).await,
                LogCommand::Flush(ack) => {
                    Self::flush_file(&mut file).await;
                    let _ = ack.send(());
                }
                LogCommand::Shutdown => break,
            }
        }
        Self::flush_file(&mut file).await;
    }

    async fn write_entry(file: &mut File, entry: &LogEntry) {
        match serde_json::to_string(entry) {
            Ok(json_line) => {
                let line_with_newline = format!("{}\n", json_line);
                if let Err(e) = file.write_all(line_with_newline.as_bytes()).await {
                    error!("Failed to write debug log entry: {}", e);
                }
            }
            Err(e) => {
                error!("Failed to serialize debug log entry: {}", e);
            }
        }
    }

    async fn flush_file(file: &mut File) {
        if let Err(e) = file.flush().await {
            error!("Failed to flush debug log: {}", e);
        }
    }
}
