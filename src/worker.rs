//! Background engine thread
//!
//! The worker owns one [`Engine`] and answers requests strictly in order,
//! one at a time. Callers submit from any thread and collect responses
//! blocking or by polling, so an interactive loop never waits on a search.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::debug;

use crate::engine::{Engine, MoveRequest, MoveResponse};
use crate::error::EngineError;

enum Command {
    Think(MoveRequest),
    NewGame,
}

/// Handle to an engine running on its own thread.
///
/// Dropping the handle stops the thread after the request in progress;
/// requests still queued are discarded unanswered.
pub struct EngineWorker {
    requests: Option<Sender<Command>>,
    responses: Receiver<MoveResponse>,
    cancel: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl EngineWorker {
    pub fn spawn(mut engine: Engine) -> Result<Self, EngineError> {
        let (request_tx, request_rx) = channel::<Command>();
        let (response_tx, response_rx) = channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let shutdown = Arc::new(AtomicBool::new(false));
        let stopping = Arc::clone(&shutdown);

        let handle = thread::Builder::new()
            .name("renju-engine".into())
            .spawn(move || {
                for command in request_rx {
                    match command {
                        Command::Think(request) => {
                            // Reset before reading the shutdown flag so a
                            // concurrent drop cannot be missed
                            flag.store(false, Ordering::SeqCst);
                            if stopping.load(Ordering::SeqCst) {
                                break;
                            }
                            let response = engine.handle_with_cancel(&request, Some(Arc::clone(&flag)));
                            if response_tx.send(response).is_err() {
                                break;
                            }
                        }
                        Command::NewGame => engine.new_game(),
                    }
                }
                debug!("engine worker stopped");
            })?;

        Ok(Self {
            requests: Some(request_tx),
            responses: response_rx,
            cancel,
            shutdown,
            handle: Some(handle),
        })
    }

    /// Queue a request; its response arrives in submission order.
    pub fn submit(&self, request: MoveRequest) -> Result<(), EngineError> {
        self.send(Command::Think(request))
    }

    /// Clear the engine's cached positions before the next request.
    pub fn new_game(&self) -> Result<(), EngineError> {
        self.send(Command::NewGame)
    }

    /// Block until the next response.
    pub fn recv(&self) -> Result<MoveResponse, EngineError> {
        self.responses.recv().map_err(|_| EngineError::WorkerStopped)
    }

    /// Poll for a finished response without blocking.
    pub fn try_recv(&self) -> Result<Option<MoveResponse>, EngineError> {
        match self.responses.try_recv() {
            Ok(response) => Ok(Some(response)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(EngineError::WorkerStopped),
        }
    }

    /// Submit and wait.
    pub fn think(&self, request: MoveRequest) -> Result<MoveResponse, EngineError> {
        self.submit(request)?;
        self.recv()
    }

    /// Ask the running search to stop after its current depth.
    ///
    /// The flag is reset when the worker starts the next request.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    fn send(&self, command: Command) -> Result<(), EngineError> {
        self.requests
            .as_ref()
            .ok_or(EngineError::WorkerStopped)?
            .send(command)
            .map_err(|_| EngineError::WorkerStopped)
    }
}

impl Drop for EngineWorker {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.cancel.store(true, Ordering::SeqCst);
        // Closing the channel ends the worker loop
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
