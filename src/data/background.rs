use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::Result;

use super::loader::{DataSource, load_source};
use super::model::JobDataset;

/// Runs dataset loads off the UI thread.
///
/// Each request gets a generation number; when results arrive only the one
/// from the most recent request is handed out, older ones are dropped.
pub struct BackgroundLoader {
    tx: Sender<(u64, Result<JobDataset>)>,
    rx: Receiver<(u64, Result<JobDataset>)>,
    generation: u64,
    in_flight: bool,
}

impl Default for BackgroundLoader {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            generation: 0,
            in_flight: false,
        }
    }
}

impl BackgroundLoader {
    /// Start loading `source`. `on_done` runs on the worker thread once the
    /// result is queued (used to wake the UI).
    pub fn spawn<F>(&mut self, source: DataSource, timeout: Duration, on_done: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.run(move || load_source(&source, timeout), on_done);
    }

    fn run<J, F>(&mut self, job: J, on_done: F)
    where
        J: FnOnce() -> Result<JobDataset> + Send + 'static,
        F: FnOnce() + Send + 'static,
    {
        self.generation += 1;
        self.in_flight = true;
        let generation = self.generation;
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = job();
            // The receiver lives as long as the app; a send error only means
            // the window was closed mid-load.
            let _ = tx.send((generation, result));
            on_done();
        });
    }

    /// Whether a load is still pending.
    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// Non-blocking check for the latest result.
    pub fn poll(&mut self) -> Option<Result<JobDataset>> {
        loop {
            match self.rx.try_recv() {
                Ok((generation, result)) if generation == self.generation => {
                    self.in_flight = false;
                    return Some(result);
                }
                Ok((generation, _)) => {
                    log::debug!("discarding stale load result (generation {generation})");
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return None,
            }
        }
    }
}
