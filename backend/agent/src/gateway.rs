//! Conversational-agent gateway.
//!
//! Owns the helper subprocess lifecycle, frames outbound commands and
//! inbound newline-delimited JSON responses, and exposes the
//! readiness/processing state machine plus the chat transcript.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command as ProcessCommand};
use tokio::sync::{broadcast, oneshot, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use skycast_core::{AgentEvent, ChatEntry, ChatRole, SkycastError, WeatherSnapshot};

use crate::framing::LineFramer;
use crate::protocol::{Command, Reply, Response};

/// Grace period between the shutdown request and a forced kill.
const STOP_GRACE: Duration = Duration::from_secs(3);

/// Default bound on waiting for the helper's ready signal.
pub const START_WAIT: Duration = Duration::from_secs(5);

/// Cap on retained helper stderr, kept for exit diagnostics.
const STDERR_TAIL_CAP: usize = 8 * 1024;

const EVENT_CAPACITY: usize = 64;
const READ_CHUNK: usize = 4096;

/// Process lifecycle states observable by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayState {
    Stopped,
    Starting,
    Ready,
    Busy,
    Errored,
}

impl std::fmt::Display for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayState::Stopped => "stopped",
            GatewayState::Starting => "starting",
            GatewayState::Ready => "ready",
            GatewayState::Busy => "busy",
            GatewayState::Errored => "errored",
        };
        write!(f, "{}", s)
    }
}

/// How to launch the helper process.
#[derive(Debug, Clone)]
pub struct ServiceSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl ServiceSpec {
    /// Launch a Python helper script with unbuffered output, working
    /// directory fixed to the script's containing directory.
    pub fn python(script_path: impl Into<PathBuf>) -> Self {
        let script_path = script_path.into();
        let working_dir = script_path.parent().map(PathBuf::from);
        Self {
            program: "python3".to_string(),
            args: vec!["-u".to_string(), script_path.display().to_string()],
            working_dir,
        }
    }
}

/// Mutable session state behind the gateway's lock.
///
/// All mutators return the notifications they produced so the caller can
/// emit them after releasing the lock. Setters notify only on change,
/// which also makes a duplicate ready signal idempotent.
#[derive(Debug)]
struct SessionState {
    state: GatewayState,
    ready: bool,
    processing: bool,
    last_error: String,
    current_location: String,
    chat_history: Vec<ChatEntry>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            state: GatewayState::Stopped,
            ready: false,
            processing: false,
            last_error: String::new(),
            current_location: String::new(),
            chat_history: Vec::new(),
        }
    }

    fn set_ready(&mut self, ready: bool, out: &mut Vec<AgentEvent>) {
        if self.ready != ready {
            self.ready = ready;
            if ready && self.state == GatewayState::Starting {
                self.state = GatewayState::Ready;
            }
            out.push(AgentEvent::ReadyChanged { ready });
        }
    }

    fn begin_processing(&mut self, out: &mut Vec<AgentEvent>) {
        if !self.processing {
            self.processing = true;
            if self.state == GatewayState::Ready {
                self.state = GatewayState::Busy;
            }
            out.push(AgentEvent::ProcessingChanged { processing: true });
        }
    }

    fn end_processing(&mut self, out: &mut Vec<AgentEvent>) {
        if self.processing {
            self.processing = false;
            if self.state == GatewayState::Busy {
                self.state = GatewayState::Ready;
            }
            out.push(AgentEvent::ProcessingChanged { processing: false });
        }
    }

    fn set_error(&mut self, error: impl Into<String>, out: &mut Vec<AgentEvent>) {
        let error = error.into();
        if self.last_error != error {
            self.last_error = error.clone();
            out.push(AgentEvent::ErrorChanged { error });
        }
    }

    fn set_location(&mut self, location: impl Into<String>, out: &mut Vec<AgentEvent>) {
        let location = location.into();
        if self.current_location != location {
            self.current_location = location.clone();
            out.push(AgentEvent::LocationChanged { location });
        }
    }

    fn push_history(&mut self, role: ChatRole, text: &str, out: &mut Vec<AgentEvent>) {
        self.chat_history.push(ChatEntry::new(role, text));
        out.push(AgentEvent::HistoryChanged);
    }

    /// Response dispatch table, evaluated in order.
    fn apply(&mut self, reply: Reply) -> Vec<AgentEvent> {
        let mut out = Vec::new();
        match reply {
            Reply::Ready => {
                self.set_ready(true, &mut out);
            }
            Reply::Error { message } => {
                self.set_error(message, &mut out);
                self.end_processing(&mut out);
            }
            Reply::WeatherSet { location } => {
                self.set_location(location.clone(), &mut out);
                self.end_processing(&mut out);
                out.push(AgentEvent::ResponseReceived {
                    text: format!("Weather data loaded for {}", location),
                });
            }
            Reply::Answer { text } => {
                self.push_history(ChatRole::Ai, &text, &mut out);
                out.push(AgentEvent::ResponseReceived { text });
                self.end_processing(&mut out);
            }
            Reply::Ignored => {}
        }
        out
    }

    /// Process went away. Clears readiness and processing; the transcript
    /// and the last error remain for inspection.
    fn record_exit(&mut self, error: Option<String>) -> Vec<AgentEvent> {
        let mut out = Vec::new();
        self.set_ready(false, &mut out);
        self.end_processing(&mut out);
        match error {
            Some(message) => {
                self.set_error(message, &mut out);
                self.state = GatewayState::Errored;
            }
            None => {
                self.state = GatewayState::Stopped;
            }
        }
        out
    }
}

struct Inner {
    session: RwLock<SessionState>,
    stdin: Mutex<Option<ChildStdin>>,
    stderr_tail: std::sync::Mutex<String>,
    events: broadcast::Sender<AgentEvent>,
}

impl Inner {
    fn emit(&self, events: Vec<AgentEvent>) {
        for event in events {
            // Send only fails with no subscribers; notifications are best-effort.
            let _ = self.events.send(event);
        }
    }

    async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut SessionState) -> Vec<AgentEvent>,
    {
        let events = {
            let mut session = self.session.write().await;
            f(&mut session)
        };
        self.emit(events);
    }

    async fn dispatch(&self, reply: Reply) {
        debug!(?reply, "Dispatching helper response");
        self.update(|s| s.apply(reply)).await;
    }

    fn stderr_snapshot(&self) -> String {
        self.stderr_tail
            .lock()
            .map(|tail| tail.clone())
            .unwrap_or_default()
    }

    async fn record_exit(&self, status: std::io::Result<ExitStatus>) {
        let error = match status {
            Ok(status) if status.success() => {
                info!("Agent service exited cleanly");
                None
            }
            Ok(status) => {
                let stderr = self.stderr_snapshot();
                let message = match status.code() {
                    // Killed by a signal.
                    None => {
                        if stderr.is_empty() {
                            "Agent service crashed".to_string()
                        } else {
                            format!("Agent service crashed: {}", stderr.trim())
                        }
                    }
                    Some(code) => {
                        format!("Agent service exited with code {}: {}", code, stderr.trim())
                    }
                };
                warn!(%message, "Agent service exited abnormally");
                Some(message)
            }
            Err(e) => Some(format!("Agent service I/O error: {}", e)),
        };
        self.update(|s| s.record_exit(error)).await;
    }
}

/// Handles to the spawned helper, held while it runs.
struct Running {
    shutdown: oneshot::Sender<()>,
    watcher: JoinHandle<()>,
}

/// Gateway mediating between the host and the helper subprocess.
///
/// At most one command is outstanding at a time from the caller's
/// perspective: the processing flag gates new sends at this API layer.
/// The transport itself carries no sequence numbers and enforces no
/// exclusion; responses are matched to commands purely by arrival order.
pub struct AgentGateway {
    spec: ServiceSpec,
    inner: Arc<Inner>,
    running: Mutex<Option<Running>>,
}

impl AgentGateway {
    pub fn new(spec: ServiceSpec) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            spec,
            inner: Arc::new(Inner {
                session: RwLock::new(SessionState::new()),
                stdin: Mutex::new(None),
                stderr_tail: std::sync::Mutex::new(String::new()),
                events,
            }),
            running: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AgentEvent> {
        self.inner.events.subscribe()
    }

    /// Spawn the helper with piped standard streams. No-op if already
    /// running. A spawn failure is recorded as the observable error and
    /// returned as `LaunchFailure`.
    pub async fn start(&self) -> Result<(), SkycastError> {
        let mut running = self.running.lock().await;
        if let Some(r) = running.as_ref() {
            if !r.watcher.is_finished() {
                debug!("Agent service already running");
                return Ok(());
            }
        }
        *running = None;

        self.inner
            .update(|s| {
                let mut out = Vec::new();
                s.set_error("", &mut out);
                s.set_ready(false, &mut out);
                s.state = GatewayState::Starting;
                out
            })
            .await;
        if let Ok(mut tail) = self.inner.stderr_tail.lock() {
            tail.clear();
        }

        let mut command = ProcessCommand::new(&self.spec.program);
        command
            .args(&self.spec.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.spec.working_dir {
            command.current_dir(dir);
        }

        info!(program = %self.spec.program, args = ?self.spec.args, "Starting agent service");

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                let message = format!("Failed to start agent service: {}", e);
                self.inner
                    .update(|s| {
                        let mut out = Vec::new();
                        s.set_error(message.clone(), &mut out);
                        s.state = GatewayState::Errored;
                        out
                    })
                    .await;
                return Err(SkycastError::LaunchFailure(message));
            }
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdin = child.stdin.take();
        let (Some(stdout), Some(stderr), Some(stdin)) = (stdout, stderr, stdin) else {
            let message = "Agent service pipes unavailable".to_string();
            let _ = child.start_kill();
            self.inner
                .update(|s| {
                    let mut out = Vec::new();
                    s.set_error(message.clone(), &mut out);
                    s.state = GatewayState::Errored;
                    out
                })
                .await;
            return Err(SkycastError::LaunchFailure(message));
        };

        *self.inner.stdin.lock().await = Some(stdin);

        let reader = tokio::spawn(read_stdout(stdout, Arc::clone(&self.inner)));
        let stderr_drain = tokio::spawn(drain_stderr(stderr, Arc::clone(&self.inner)));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let watcher = tokio::spawn(watch_child(
            child,
            shutdown_rx,
            reader,
            stderr_drain,
            Arc::clone(&self.inner),
        ));

        *running = Some(Running {
            shutdown: shutdown_tx,
            watcher,
        });
        Ok(())
    }

    /// Request graceful termination; force-kill after the grace period.
    /// Always clears readiness.
    pub async fn stop(&self) {
        let taken = self.running.lock().await.take();
        if let Some(r) = taken {
            info!("Stopping agent service");
            // Closing stdin asks the helper to exit on its own.
            self.inner.stdin.lock().await.take();
            let _ = r.shutdown.send(());
            let _ = r.watcher.await;
        }
        self.inner.update(|s| s.record_exit(None)).await;
    }

    /// Serialize and transmit a `set_weather` command. Fails with
    /// `NotReady` before the helper's ready signal.
    pub async fn submit_weather_context(
        &self,
        location: &str,
        snapshot: &WeatherSnapshot,
    ) -> Result<(), SkycastError> {
        self.require_ready().await?;
        self.inner
            .update(|s| {
                let mut out = Vec::new();
                s.begin_processing(&mut out);
                s.set_error("", &mut out);
                out
            })
            .await;
        let weather_data = serde_json::to_value(snapshot)
            .map_err(|e| SkycastError::Other(anyhow::Error::new(e)))?;
        self.transmit(&Command::SetWeather {
            location: location.to_string(),
            weather_data,
        })
        .await
    }

    /// Transmit a `query` command, appending the user's text to the
    /// transcript. Blank or whitespace-only text is a silent no-op.
    pub async fn submit_query(&self, text: &str) -> Result<(), SkycastError> {
        self.require_ready().await?;
        if text.trim().is_empty() {
            return Ok(());
        }
        self.inner
            .update(|s| {
                let mut out = Vec::new();
                s.begin_processing(&mut out);
                s.set_error("", &mut out);
                s.push_history(ChatRole::User, text, &mut out);
                out
            })
            .await;
        self.transmit(&Command::Query {
            prompt: text.to_string(),
        })
        .await
    }

    pub async fn clear_history(&self) {
        self.inner
            .update(|s| {
                s.chat_history.clear();
                vec![AgentEvent::HistoryChanged]
            })
            .await;
    }

    /// Block (bounded) until the helper signals ready.
    pub async fn wait_ready(&self, wait: Duration) -> Result<(), SkycastError> {
        let mut events = self.subscribe();
        if self.is_ready().await {
            return Ok(());
        }
        let awaited = tokio::time::timeout(wait, async {
            loop {
                match events.recv().await {
                    Ok(AgentEvent::ReadyChanged { ready: true }) => return Ok(()),
                    Ok(_) => continue,
                    Err(_) => return Err(()),
                }
            }
        })
        .await;
        match awaited {
            Ok(Ok(())) => Ok(()),
            _ => {
                if self.is_ready().await {
                    Ok(())
                } else {
                    Err(SkycastError::NotReady)
                }
            }
        }
    }

    pub async fn is_ready(&self) -> bool {
        self.inner.session.read().await.ready
    }

    pub async fn is_processing(&self) -> bool {
        self.inner.session.read().await.processing
    }

    pub async fn last_error(&self) -> String {
        self.inner.session.read().await.last_error.clone()
    }

    pub async fn current_location(&self) -> String {
        self.inner.session.read().await.current_location.clone()
    }

    pub async fn chat_history(&self) -> Vec<ChatEntry> {
        self.inner.session.read().await.chat_history.clone()
    }

    pub async fn state(&self) -> GatewayState {
        self.inner.session.read().await.state
    }

    async fn require_ready(&self) -> Result<(), SkycastError> {
        if self.is_ready().await {
            return Ok(());
        }
        self.inner
            .update(|s| {
                let mut out = Vec::new();
                s.set_error("Agent service not ready", &mut out);
                out
            })
            .await;
        Err(SkycastError::NotReady)
    }

    async fn transmit(&self, command: &Command) -> Result<(), SkycastError> {
        let line = command
            .to_line()
            .map_err(|e| SkycastError::Other(anyhow::Error::new(e)))?;
        debug!(line = %line.trim_end(), "Sending command");

        let mut guard = self.inner.stdin.lock().await;
        let result = match guard.as_mut() {
            Some(stdin) => async {
                stdin.write_all(line.as_bytes()).await?;
                stdin.flush().await
            }
            .await,
            None => Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "agent service stdin closed",
            )),
        };
        drop(guard);

        if let Err(e) = result {
            let message = format!("Write error to agent service: {}", e);
            self.inner
                .update(|s| {
                    let mut out = Vec::new();
                    s.set_error(message, &mut out);
                    s.end_processing(&mut out);
                    out
                })
                .await;
            return Err(SkycastError::Io(e));
        }
        Ok(())
    }
}

/// Append stdout bytes to the frame buffer and dispatch every complete
/// line. Runs until the pipe closes or faults.
async fn read_stdout(mut stdout: ChildStdout, inner: Arc<Inner>) {
    let mut framer = LineFramer::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        match stdout.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                for object in framer.push(&chunk[..n]) {
                    let reply = Response::from_object(object).classify();
                    inner.dispatch(reply).await;
                }
            }
            Err(e) => {
                let message = format!("Read error from agent service: {}", e);
                inner
                    .update(|s| {
                        let mut out = Vec::new();
                        s.set_error(message, &mut out);
                        s.end_processing(&mut out);
                        out
                    })
                    .await;
                break;
            }
        }
    }
    debug!("Agent service stdout closed");
}

/// Drain stderr for diagnostics only. Never parsed as protocol data;
/// surfaced verbatim in the exit error on abnormal termination.
async fn drain_stderr(mut stderr: ChildStderr, inner: Arc<Inner>) {
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        match stderr.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let text = String::from_utf8_lossy(&chunk[..n]);
                debug!(stderr = %text.trim_end(), "Agent service stderr");
                if let Ok(mut tail) = inner.stderr_tail.lock() {
                    tail.push_str(&text);
                    if tail.len() > STDERR_TAIL_CAP {
                        let cut = tail.len() - STDERR_TAIL_CAP;
                        tail.drain(..cut);
                    }
                }
            }
        }
    }
}

/// Wait for the child to exit (or for a shutdown request), then record
/// the outcome. Stream tasks are joined first so all in-flight lines and
/// stderr bytes land before the exit is inspected.
async fn watch_child(
    mut child: Child,
    shutdown: oneshot::Receiver<()>,
    reader: JoinHandle<()>,
    stderr_drain: JoinHandle<()>,
    inner: Arc<Inner>,
) {
    tokio::select! {
        status = child.wait() => {
            let _ = reader.await;
            let _ = stderr_drain.await;
            inner.record_exit(status).await;
        }
        _ = shutdown => {
            match tokio::time::timeout(STOP_GRACE, child.wait()).await {
                Ok(status) => {
                    debug!(?status, "Agent service exited after shutdown request");
                }
                Err(_) => {
                    warn!("Agent service did not exit within grace period; killing");
                    let _ = child.start_kill();
                    let _ = child.wait().await;
                }
            }
            let _ = reader.await;
            let _ = stderr_drain.await;
        }
    }
}
