use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use super::{FileGateway, GatewayError};
use crate::session::SaveTicket;

/// The result of one background write, handed back to the UI thread.
#[derive(Debug)]
pub struct SaveCompletion {
    pub ticket: SaveTicket,
    pub result: Result<(), GatewayError>,
}

/// Runs file writes on a dedicated thread so the event loop never blocks
/// on disk.
///
/// Jobs are written in submission order. Dropping the worker waits for the
/// queue to drain.
pub struct SaveWorker {
    jobs: Option<Sender<SaveTicket>>,
    results: Receiver<SaveCompletion>,
    handle: Option<JoinHandle<()>>,
    in_flight: usize,
}

impl SaveWorker {
    /// Spawn the worker thread.
    ///
    /// # Errors
    /// Returns an error if the OS refuses to create the thread.
    pub fn spawn(gateway: Arc<dyn FileGateway>) -> io::Result<Self> {
        let (job_tx, job_rx) = mpsc::channel::<SaveTicket>();
        let (result_tx, result_rx) = mpsc::channel();
        let handle = std::thread::Builder::new()
            .name("marksplit-save".to_string())
            .spawn(move || {
                for ticket in job_rx {
                    let result = gateway.write_file(&ticket.path, &ticket.content);
                    if result_tx.send(SaveCompletion { ticket, result }).is_err() {
                        break;
                    }
                }
            })?;
        Ok(Self {
            jobs: Some(job_tx),
            results: result_rx,
            handle: Some(handle),
            in_flight: 0,
        })
    }

    /// Queue a write.
    pub fn submit(&mut self, ticket: SaveTicket) {
        tracing::debug!(
            path = %ticket.path.display(),
            revision = ticket.revision,
            kind = ?ticket.kind,
            "queue save"
        );
        let Some(jobs) = &self.jobs else {
            return;
        };
        match jobs.send(ticket) {
            Ok(()) => self.in_flight += 1,
            Err(mpsc::SendError(ticket)) => {
                tracing::error!(path = %ticket.path.display(), "save worker is gone");
            }
        }
    }

    /// Collect a finished write, if any.
    pub fn try_recv(&mut self) -> Option<SaveCompletion> {
        let done = self.results.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(done)
    }

    /// Number of writes submitted but not yet collected.
    pub const fn in_flight(&self) -> usize {
        self.in_flight
    }
}

impl Drop for SaveWorker {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop once the queue is empty.
        self.jobs = None;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
