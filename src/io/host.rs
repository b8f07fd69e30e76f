//! Desktop-shell boundary.
//!
//! The shell owns the task file on a worker thread. The UI reaches it only
//! through two request/response operations ([`HostRequest`]) and hears from
//! it through two signals ([`ShellSignal`]).

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::io::backend::{Backend, BackendKind, StorageError};
use crate::model::store::TaskMap;

/// How long the UI waits for the worker to answer a request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Signals the shell sends to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellSignal {
    /// Persist now (window lost focus, user asked)
    SaveRequested,
    /// Persist one last time; the process is about to exit
    FinalSaveRequested,
}

/// Requests the UI sends to the shell
#[derive(Debug)]
pub enum HostRequest {
    SaveTasks {
        tasks: TaskMap,
        reply: Sender<HostReply>,
    },
    LoadTasks {
        reply: Sender<HostReply>,
    },
}

/// Answer to a [`HostRequest`]
#[derive(Debug, Default)]
pub struct HostReply {
    pub success: bool,
    /// Loaded tasks, for `LoadTasks`
    pub data: Option<TaskMap>,
    /// Diagnostic message on failure
    pub error: Option<String>,
}

impl HostReply {
    fn ok(data: Option<TaskMap>) -> Self {
        HostReply {
            success: true,
            data,
            error: None,
        }
    }

    fn failed(error: &StorageError) -> Self {
        HostReply {
            success: false,
            data: None,
            error: Some(error.to_string()),
        }
    }
}

/// The shell side: a worker thread serving requests plus a signal queue.
pub struct HostShell {
    requests: Sender<HostRequest>,
    signal_tx: Sender<ShellSignal>,
    signal_rx: Receiver<ShellSignal>,
    _worker: JoinHandle<()>,
}

impl HostShell {
    /// Start the worker thread that owns `backend`.
    pub fn spawn<B>(backend: B) -> std::io::Result<Self>
    where
        B: Backend + Send + 'static,
    {
        let (requests, request_rx) = mpsc::channel();
        let (signal_tx, signal_rx) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("dayplan-host".into())
            .spawn(move || serve(backend, request_rx))?;
        Ok(HostShell {
            requests,
            signal_tx,
            signal_rx,
            _worker: worker,
        })
    }

    /// A backend handle the UI can save and load through
    pub fn client(&self) -> HostBackend {
        HostBackend {
            requests: self.requests.clone(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Ask the UI to persist now
    pub fn request_save(&self) {
        let _ = self.signal_tx.send(ShellSignal::SaveRequested);
    }

    /// Ask the UI for one final save before exit
    pub fn request_exit(&self) {
        tracing::debug!("final save requested");
        let _ = self.signal_tx.send(ShellSignal::FinalSaveRequested);
    }

    /// Drain pending signals without blocking
    pub fn poll_signals(&self) -> Vec<ShellSignal> {
        self.signal_rx.try_iter().collect()
    }

    /// Wait up to `timeout` for the next signal
    pub fn wait_signal(&self, timeout: Duration) -> Option<ShellSignal> {
        self.signal_rx.recv_timeout(timeout).ok()
    }
}

fn serve<B: Backend>(backend: B, requests: Receiver<HostRequest>) {
    for request in requests {
        match request {
            HostRequest::SaveTasks { tasks, reply } => {
                let answer = match backend.save(&tasks) {
                    Ok(()) => HostReply::ok(None),
                    Err(e) => {
                        tracing::error!(error = %e, "host save failed");
                        HostReply::failed(&e)
                    }
                };
                let _ = reply.send(answer);
            }
            HostRequest::LoadTasks { reply } => {
                let answer = match backend.load() {
                    Ok(tasks) => HostReply::ok(Some(tasks)),
                    Err(e) => {
                        tracing::error!(error = %e, "host load failed");
                        HostReply::failed(&e)
                    }
                };
                let _ = reply.send(answer);
            }
        }
    }
    tracing::debug!("host worker stopped");
}

/// UI-side handle that forwards saves and loads to the shell.
#[derive(Debug, Clone)]
pub struct HostBackend {
    requests: Sender<HostRequest>,
    timeout: Duration,
}

impl HostBackend {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn call(&self, make: impl FnOnce(Sender<HostReply>) -> HostRequest) -> Result<HostReply, StorageError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.requests
            .send(make(reply_tx))
            .map_err(|_| StorageError::HostDisconnected)?;
        let reply = reply_rx.recv_timeout(self.timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => StorageError::HostTimeout,
            RecvTimeoutError::Disconnected => StorageError::HostDisconnected,
        })?;
        if reply.success {
            Ok(reply)
        } else {
            Err(StorageError::Host(
                reply.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }
}

impl Backend for HostBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::File
    }

    fn save(&self, tasks: &TaskMap) -> Result<(), StorageError> {
        self.call(|reply| HostRequest::SaveTasks {
            tasks: tasks.clone(),
            reply,
        })
        .map(|_| ())
    }

    fn load(&self) -> Result<TaskMap, StorageError> {
        self.call(|reply| HostRequest::LoadTasks { reply })
            .map(|reply| reply.data.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::file_backend::FileBackend;
    use crate::model::store::Store;
    use tempfile::TempDir;

    struct Failing;

    impl Backend for Failing {
        fn kind(&self) -> BackendKind {
            BackendKind::File
        }

        fn save(&self, _tasks: &TaskMap) -> Result<(), StorageError> {
            Err(StorageError::Host("read-only volume".into()))
        }

        fn load(&self) -> Result<TaskMap, StorageError> {
            Err(StorageError::Host("read-only volume".into()))
        }
    }

    struct Stalled;

    impl Backend for Stalled {
        fn kind(&self) -> BackendKind {
            BackendKind::File
        }

        fn save(&self, _tasks: &TaskMap) -> Result<(), StorageError> {
            thread::sleep(Duration::from_millis(500));
            Ok(())
        }

        fn load(&self) -> Result<TaskMap, StorageError> {
            Ok(TaskMap::new())
        }
    }

    #[test]
    fn save_and_load_through_worker() {
        let dir = TempDir::new().unwrap();
        let shell = HostShell::spawn(FileBackend::new(dir.path(), "tasks.csv")).unwrap();
        let client = shell.client();

        let mut store = Store::new();
        store.create("2024-01-01", "via host", "body").unwrap();
        client.save(store.tasks()).unwrap();

        assert!(dir.path().join("tasks.csv").exists());
        assert_eq!(&client.load().unwrap(), store.tasks());
    }

    #[test]
    fn failure_carries_diagnostic() {
        let shell = HostShell::spawn(Failing).unwrap();
        let err = shell.client().save(&TaskMap::new()).unwrap_err();
        match err {
            StorageError::Host(message) => assert!(message.contains("read-only volume")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn slow_worker_times_out() {
        let shell = HostShell::spawn(Stalled).unwrap();
        let client = shell.client().with_timeout(Duration::from_millis(20));
        assert!(matches!(
            client.save(&TaskMap::new()),
            Err(StorageError::HostTimeout)
        ));
    }

    #[test]
    fn signals_arrive_in_order() {
        let shell = HostShell::spawn(Failing).unwrap();
        shell.request_save();
        shell.request_exit();
        assert_eq!(
            shell.poll_signals(),
            vec![ShellSignal::SaveRequested, ShellSignal::FinalSaveRequested]
        );
        assert_eq!(shell.wait_signal(Duration::from_millis(10)), None);
    }
}
