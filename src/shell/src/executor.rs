//! Runs the core's effects against a device.
//!
//! Every request is spawned onto its own task and reports back over one
//! channel; the loop resolves outputs against the core in arrival order.

use anyhow::{bail, Context, Result};
use crux_core::{Core, Request};
use crux_http::protocol::{HttpRequest, HttpResult};
use log::{debug, warn};
use pax_console_core::{
    events::FirmwareEvent, App, Effect, Event, FirmwareOperation, FirmwareOutput, TimerOperation,
    TimerOutput, TransportOutcome, ViewModel,
};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::transport::DeviceClient;

enum Pending {
    Http(Request<HttpRequest>),
    Firmware(Request<FirmwareOperation>),
    Timer(Request<TimerOperation>),
}

enum Output {
    Http(HttpResult),
    Firmware(FirmwareOutput),
    Timer(TimerOutput),
}

struct Completion {
    id: u64,
    output: Output,
}

struct ActiveUpload {
    request_id: u64,
    task: JoinHandle<()>,
}

pub struct Executor {
    core: Core<App>,
    client: DeviceClient,
    pending: HashMap<u64, Pending>,
    uploads: HashMap<u32, ActiveUpload>,
    next_id: u64,
    firmware_path: Option<PathBuf>,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl Executor {
    pub fn new(client: DeviceClient) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            core: Core::new(),
            client,
            pending: HashMap::new(),
            uploads: HashMap::new(),
            next_id: 0,
            firmware_path: None,
            tx,
            rx,
        }
    }

    /// File streamed when the core asks for a firmware upload
    pub fn set_firmware(&mut self, path: &Path) {
        self.firmware_path = Some(path.to_path_buf());
    }

    pub fn view(&self) -> ViewModel {
        self.core.view()
    }

    /// Feed an event to the core and start the effects it asks for.
    /// Returns true if the core asked for a render.
    pub fn send(&mut self, event: Event) -> bool {
        let effects = self.core.process_event(event);
        self.dispatch(effects)
    }

    /// Drive the core until no request other than a timer is in flight.
    /// Ctrl-C aborts a running upload; otherwise it ends the wait with an
    /// error.
    pub async fn run_until_idle(&mut self, mut on_render: impl FnMut(&ViewModel)) -> Result<()> {
        let mut interrupted = false;
        on_render(&self.view());

        while self.is_busy() {
            tokio::select! {
                completion = self.rx.recv() => {
                    let completion = completion.context("effect channel closed")?;
                    if self.complete(completion)? {
                        on_render(&self.view());
                    }
                }
                signal = tokio::signal::ctrl_c(), if !interrupted => {
                    signal.context("failed to listen for ctrl-c")?;
                    interrupted = true;
                    if self.uploads.is_empty() {
                        bail!("interrupted");
                    }
                    warn!("aborting upload");
                    if self.send(Event::Firmware(FirmwareEvent::Abort)) {
                        on_render(&self.view());
                    }
                }
            }
        }
        Ok(())
    }

    /// Drive the core until Ctrl-C.
    pub async fn run_until_interrupted(
        &mut self,
        mut on_render: impl FnMut(&ViewModel),
    ) -> Result<()> {
        on_render(&self.view());
        loop {
            tokio::select! {
                completion = self.rx.recv() => {
                    let completion = completion.context("effect channel closed")?;
                    if self.complete(completion)? {
                        on_render(&self.view());
                    }
                }
                signal = tokio::signal::ctrl_c() => {
                    signal.context("failed to listen for ctrl-c")?;
                    return Ok(());
                }
            }
        }
    }

    fn is_busy(&self) -> bool {
        self.pending
            .values()
            .any(|pending| !matches!(pending, Pending::Timer(_)))
    }

    fn complete(&mut self, completion: Completion) -> Result<bool> {
        let Completion { id, output } = completion;
        let Some(mut pending) = self.pending.remove(&id) else {
            debug!("dropping output of finished request {id}");
            return Ok(false);
        };

        let (effects, done) = match (&mut pending, output) {
            (Pending::Http(request), Output::Http(result)) => {
                (self.core.resolve(request, result), true)
            }
            (Pending::Timer(request), Output::Timer(elapsed)) => {
                (self.core.resolve(request, elapsed), true)
            }
            (Pending::Firmware(request), Output::Firmware(output)) => {
                let done = matches!(output, FirmwareOutput::Finished(_));
                (self.core.resolve(request, output), done)
            }
            _ => bail!("output does not match request {id}"),
        };
        let effects = effects.with_context(|| format!("failed to resolve request {id}"))?;

        if done {
            self.uploads.retain(|_, upload| upload.request_id != id);
        } else {
            self.pending.insert(id, pending);
        }
        Ok(self.dispatch(effects))
    }

    fn dispatch(&mut self, effects: Vec<Effect>) -> bool {
        let mut render = false;
        for effect in effects {
            match effect {
                Effect::Render(_) => render = true,
                Effect::Http(request) => {
                    let operation = request.operation.clone();
                    let id = self.track(Pending::Http(request));
                    let client = self.client.clone();
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let result = client.execute(operation).await;
                        let _ = tx.send(Completion {
                            id,
                            output: Output::Http(result),
                        });
                    });
                }
                Effect::Timer(request) => {
                    let TimerOperation::Start { id: timer, millis } = request.operation;
                    let id = self.track(Pending::Timer(request));
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_millis(millis)).await;
                        let _ = tx.send(Completion {
                            id,
                            output: Output::Timer(TimerOutput::Elapsed { id: timer }),
                        });
                    });
                }
                Effect::Firmware(request) => {
                    let operation = request.operation.clone();
                    let id = self.track(Pending::Firmware(request));
                    match operation {
                        FirmwareOperation::Upload { session, url, file_name } => {
                            self.start_upload(id, session, url, &file_name)
                        }
                        FirmwareOperation::Abort { session } => self.abort_upload(id, session),
                    }
                }
            }
        }
        render
    }

    fn track(&mut self, pending: Pending) -> u64 {
        self.next_id += 1;
        self.pending.insert(self.next_id, pending);
        self.next_id
    }

    fn start_upload(&mut self, id: u64, session: u32, url: String, file_name: &str) {
        let tx = self.tx.clone();
        let Some(path) = self.firmware_path.clone() else {
            let _ = tx.send(Completion {
                id,
                output: Output::Firmware(FirmwareOutput::Finished(
                    TransportOutcome::NetworkError {
                        message: format!("no file picked for {file_name}"),
                    },
                )),
            });
            return;
        };

        let client = self.client.clone();
        let task = tokio::spawn(async move {
            let progress_tx = tx.clone();
            let outcome = client
                .upload(&url, &path, move |loaded, total| {
                    let _ = progress_tx.send(Completion {
                        id,
                        output: Output::Firmware(FirmwareOutput::Progress { loaded, total }),
                    });
                })
                .await;
            let _ = tx.send(Completion {
                id,
                output: Output::Firmware(FirmwareOutput::Finished(outcome)),
            });
        });
        self.uploads.insert(
            session,
            ActiveUpload {
                request_id: id,
                task,
            },
        );
    }

    fn abort_upload(&mut self, id: u64, session: u32) {
        if let Some(upload) = self.uploads.remove(&session) {
            upload.task.abort();
            self.pending.remove(&upload.request_id);
        }
        let _ = self.tx.send(Completion {
            id,
            output: Output::Firmware(FirmwareOutput::Finished(TransportOutcome::Aborted)),
        });
    }
}
