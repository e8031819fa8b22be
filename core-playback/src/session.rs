//! # Playback Session Manager
//!
//! One hymn plays at a time. All session state lives in a single actor task;
//! the [`PlaybackSessionManager`] handle only sends commands and reads
//! snapshots from a `watch` channel.
//!
//! ## Loading
//!
//! `play` tears the previous session down (engine unload, temp file delete)
//! before anything else happens, then bumps the generation and spawns a load
//! task: cache or fetch, write the temp file, probe it. The result comes back
//! to the actor tagged with its generation; a result from an older generation
//! is dropped, which deletes its temp file.
//!
//! A superseded load is left to finish so its download still lands in the
//! cache. Only shutdown aborts loads.
//!
//! ## Failure
//!
//! A failed load publishes `Failed` and emits [`PlaybackEvent::Failed`], then
//! settles back to `Idle` before the waiting `play` gets the error.
//!
//! ## Threading
//!
//! Engine and media-control calls are awaited inside the actor, so they are
//! strictly ordered. Network and disk work never run on the actor.

use crate::config::PlaybackConfig;
use crate::error::{PlaybackError, Result};
use crate::probe::{MediaInfo, MediaProbe};
use crate::state::{CompletionInfo, PlaybackSnapshot, PlaybackState};
use crate::temp::PlaybackFile;
use bridge_traits::media::{MediaControls, NowPlayingInfo};
use bridge_traits::playback::{
    AudioEngine, AudioSessionEvent, EngineLoadRequest, EngineSessionId, RemoteCommand,
    RouteChangeReason,
};
use core_assets::{AssetError, AssetStore, Edition};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Invoked from the session task when a hymn plays to the end.
///
/// Must not block; spawn a task to issue further playback commands.
pub type CompletionCallback = Arc<dyn Fn(CompletionInfo) + Send + Sync>;

/// Collaborators of the session manager.
pub struct PlaybackDependencies {
    pub store: Arc<AssetStore>,
    pub engine: Arc<dyn AudioEngine>,
    pub media_controls: Option<Arc<dyn MediaControls>>,
    /// `None` skips probing; the engine then gets no duration hint.
    pub probe: Option<Arc<dyn MediaProbe>>,
    pub event_bus: Option<Arc<EventBus>>,
}

impl PlaybackDependencies {
    /// Dependencies with the default probe and no media controls.
    pub fn new(store: Arc<AssetStore>, engine: Arc<dyn AudioEngine>) -> Self {
        Self {
            store,
            engine,
            media_controls: None,
            probe: default_probe(),
            event_bus: None,
        }
    }

    pub fn with_media_controls(mut self, controls: Arc<dyn MediaControls>) -> Self {
        self.media_controls = Some(controls);
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn MediaProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn without_probe(mut self) -> Self {
        self.probe = None;
        self
    }

    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }
}

#[cfg(feature = "symphonia-probe")]
fn default_probe() -> Option<Arc<dyn MediaProbe>> {
    Some(Arc::new(crate::probe::SymphoniaProbe::new()))
}

#[cfg(not(feature = "symphonia-probe"))]
fn default_probe() -> Option<Arc<dyn MediaProbe>> {
    None
}

type Reply = oneshot::Sender<Result<()>>;

enum Command {
    Play {
        hymn: u16,
        edition: Edition,
        reply: Reply,
    },
    Pause(Reply),
    Resume(Reply),
    TogglePlayPause(Reply),
    Seek {
        seconds: f64,
        reply: Reply,
    },
    Stop(Reply),
    AudioEvent(AudioSessionEvent),
}

/// Output of a load task.
struct Loaded {
    generation: u64,
    hymn: u16,
    edition: Edition,
    result: Result<Prepared>,
}

struct Prepared {
    file: PlaybackFile,
    info: Option<MediaInfo>,
}

/// Resources held while the engine has the hymn loaded.
struct ActiveSession {
    engine_session: EngineSessionId,
    file: PlaybackFile,
}

/// Handle to the playback session task.
pub struct PlaybackSessionManager {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<PlaybackSnapshot>,
    on_completion: Arc<Mutex<Option<CompletionCallback>>>,
    shutdown: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PlaybackSessionManager {
    /// Start the session task on the current tokio runtime.
    pub fn spawn(deps: PlaybackDependencies, config: PlaybackConfig) -> Result<Self> {
        config.validate().map_err(PlaybackError::Config)?;

        let (command_tx, command_rx) = mpsc::channel(config.command_buffer);
        let (loaded_tx, loaded_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(PlaybackSnapshot::idle());
        let on_completion: Arc<Mutex<Option<CompletionCallback>>> = Arc::new(Mutex::new(None));
        let shutdown = CancellationToken::new();

        let actor = SessionActor {
            store: deps.store,
            engine: deps.engine,
            media_controls: deps.media_controls,
            probe: deps.probe,
            event_bus: deps.event_bus,
            config,
            snapshot: PlaybackSnapshot::idle(),
            publisher: snapshot_tx,
            loaded_tx,
            on_completion: on_completion.clone(),
            active: None,
            load_task: None,
            superseded_loads: Vec::new(),
            pending: None,
            paused_by_interruption: false,
        };

        let task = tokio::spawn(actor.run(command_rx, loaded_rx, shutdown.clone()));
        info!("Playback session manager started");

        Ok(Self {
            commands: command_tx,
            snapshots: snapshot_rx,
            on_completion,
            shutdown,
            task: Mutex::new(Some(task)),
        })
    }

    /// Play a hymn, replacing whatever is loaded.
    ///
    /// Resolves once the engine is playing. Playing the paused hymn again
    /// resumes it. Returns [`PlaybackError::Superseded`] if a later `play` or
    /// `stop` arrives first.
    #[instrument(skip(self))]
    pub async fn play(&self, hymn: u16, edition: Edition) -> Result<()> {
        self.request(|reply| Command::Play {
            hymn,
            edition,
            reply,
        })
        .await
    }

    /// Pause when playing; otherwise a no-op.
    #[instrument(skip(self))]
    pub async fn pause(&self) -> Result<()> {
        self.request(Command::Pause).await
    }

    /// Resume when paused; otherwise a no-op.
    #[instrument(skip(self))]
    pub async fn resume(&self) -> Result<()> {
        self.request(Command::Resume).await
    }

    pub async fn toggle_play_pause(&self) -> Result<()> {
        self.request(Command::TogglePlayPause).await
    }

    /// Seek within the loaded hymn. Clamped to `[0, duration]`; negative and
    /// NaN positions seek to the start.
    ///
    /// When the duration is unknown (no probe, or the probe found no frame
    /// count) only the lower bound applies and the engine clamps past the end.
    #[instrument(skip(self))]
    pub async fn seek(&self, seconds: f64) -> Result<()> {
        self.request(|reply| Command::Seek { seconds, reply }).await
    }

    /// Tear down the session. Always valid and idempotent.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<()> {
        self.request(Command::Stop).await
    }

    /// Forward a platform audio-session notification.
    pub async fn handle_audio_event(&self, event: AudioSessionEvent) -> Result<()> {
        self.commands
            .send(Command::AudioEvent(event))
            .await
            .map_err(|_| PlaybackError::ManagerClosed)
    }

    /// Apply a command from the system media controls.
    #[instrument(skip(self))]
    pub async fn handle_remote_command(&self, command: RemoteCommand) -> Result<()> {
        match command {
            RemoteCommand::Play => self.resume().await,
            RemoteCommand::Pause => self.pause().await,
            RemoteCommand::Stop => self.stop().await,
            RemoteCommand::TogglePlayPause => self.toggle_play_pause().await,
        }
    }

    /// Receiver that sees every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshots.clone()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Register the completion callback, replacing any previous one.
    pub fn set_on_completion<F>(&self, callback: F)
    where
        F: Fn(CompletionInfo) + Send + Sync + 'static,
    {
        *self.on_completion.lock() = Some(Arc::new(callback));
    }

    pub fn clear_on_completion(&self) {
        self.on_completion.lock().take();
    }

    /// Stop the session task, releasing the engine session and temp file.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "Playback session task ended abnormally");
            }
        }
    }

    async fn request(&self, command: impl FnOnce(Reply) -> Command) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| PlaybackError::ManagerClosed)?;
        response.await.map_err(|_| PlaybackError::ManagerClosed)?
    }
}

// ============================================================================
// Session actor
// ============================================================================

struct SessionActor {
    store: Arc<AssetStore>,
    engine: Arc<dyn AudioEngine>,
    media_controls: Option<Arc<dyn MediaControls>>,
    probe: Option<Arc<dyn MediaProbe>>,
    event_bus: Option<Arc<EventBus>>,
    config: PlaybackConfig,

    snapshot: PlaybackSnapshot,
    publisher: watch::Sender<PlaybackSnapshot>,
    loaded_tx: mpsc::UnboundedSender<Loaded>,
    on_completion: Arc<Mutex<Option<CompletionCallback>>>,

    active: Option<ActiveSession>,
    load_task: Option<JoinHandle<()>>,
    /// Loads left running after a newer `play` or a `stop`
    superseded_loads: Vec<JoinHandle<()>>,
    /// Reply for the `play` currently loading
    pending: Option<Reply>,
    paused_by_interruption: bool,
}

impl SessionActor {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut loaded: mpsc::UnboundedReceiver<Loaded>,
        shutdown: CancellationToken,
    ) {
        self.register_remote_commands().await;

        let mut ticker = tokio::time::interval(self.config.progress_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let playing = self.snapshot.state.is_playing();

            tokio::select! {
                biased;

                _ = shutdown.cancelled() => break,
                command = commands.recv() => match command {
                    Some(command) => self.handle(command).await,
                    None => break,
                },
                Some(result) = loaded.recv() => self.on_loaded(result).await,
                _ = ticker.tick(), if playing => self.on_tick().await,
            }
        }

        self.close().await;
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::Play {
                hymn,
                edition,
                reply,
            } => self.play(hymn, edition, reply).await,
            Command::Pause(reply) => {
                let result = self.pause().await;
                let _ = reply.send(result);
            }
            Command::Resume(reply) => {
                let result = self.resume().await;
                let _ = reply.send(result);
            }
            Command::TogglePlayPause(reply) => {
                let result = match self.snapshot.state {
                    PlaybackState::Playing => self.pause().await,
                    PlaybackState::Paused => self.resume().await,
                    _ => Ok(()),
                };
                let _ = reply.send(result);
            }
            Command::Seek { seconds, reply } => {
                let result = self.seek(seconds).await;
                let _ = reply.send(result);
            }
            Command::Stop(reply) => {
                self.stop().await;
                let _ = reply.send(Ok(()));
            }
            Command::AudioEvent(event) => self.on_audio_event(event).await,
        }
    }

    async fn play(&mut self, hymn: u16, edition: Edition, reply: Reply) {
        if self.snapshot.is_current(hymn, edition) {
            match self.snapshot.state {
                PlaybackState::Paused => {
                    let result = self.resume().await;
                    let _ = reply.send(result);
                    return;
                }
                PlaybackState::Playing => {
                    let _ = reply.send(Ok(()));
                    return;
                }
                _ => {}
            }
        }

        self.cancel_pending_load();
        self.teardown().await;

        self.snapshot.generation += 1;
        let generation = self.snapshot.generation;
        self.snapshot.state = PlaybackState::Loading;
        self.snapshot.hymn = Some(hymn);
        self.snapshot.edition = Some(edition);
        self.snapshot.position = Duration::ZERO;
        self.snapshot.duration = Duration::ZERO;
        self.paused_by_interruption = false;
        self.publish();

        info!(hymn, edition = edition.id(), generation, "Loading hymn audio");
        self.emit(PlaybackEvent::Loading {
            hymn,
            edition: edition.id().to_string(),
            generation,
        });

        let store = self.store.clone();
        let probe = self.probe.clone();
        let temp_dir = self.config.temp_dir.clone();
        let loaded_tx = self.loaded_tx.clone();

        self.load_task = Some(tokio::spawn(async move {
            let result = prepare(store, probe, temp_dir, hymn, edition).await;
            let _ = loaded_tx.send(Loaded {
                generation,
                hymn,
                edition,
                result,
            });
        }));
        self.pending = Some(reply);
    }

    async fn on_loaded(&mut self, loaded: Loaded) {
        if loaded.generation != self.snapshot.generation
            || self.snapshot.state != PlaybackState::Loading
        {
            debug!(
                generation = loaded.generation,
                current = self.snapshot.generation,
                "Discarding stale load result"
            );
            return;
        }
        self.load_task = None;

        let result = match loaded.result {
            Ok(prepared) => self.start(loaded.hymn, loaded.edition, prepared).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                if let Some(reply) = self.pending.take() {
                    let _ = reply.send(Ok(()));
                }
            }
            Err(e) => self.fail(e),
        }
    }

    async fn start(&mut self, hymn: u16, edition: Edition, prepared: Prepared) -> Result<()> {
        let duration = prepared.info.as_ref().and_then(|info| info.duration);
        let request =
            EngineLoadRequest::new(prepared.file.path(), title(hymn)).with_duration_hint(duration);

        let session = self
            .engine
            .load(request)
            .await
            .map_err(PlaybackError::Engine)?;

        if let Err(e) = self.engine.play(session).await {
            self.unload(session).await;
            return Err(PlaybackError::Engine(e));
        }

        self.active = Some(ActiveSession {
            engine_session: session,
            file: prepared.file,
        });
        self.snapshot.state = PlaybackState::Playing;
        self.snapshot.duration = duration.unwrap_or_default();
        self.snapshot.position = Duration::ZERO;
        self.publish();

        info!(hymn, duration = ?duration, "Playback started");
        self.emit(PlaybackEvent::Started {
            hymn,
            edition: edition.id().to_string(),
            duration_secs: self.snapshot.duration.as_secs_f64(),
        });

        if let Some(controls) = &self.media_controls {
            if let Err(e) = controls.set_session_active(true).await {
                debug!(error = %e, "Failed to activate media session");
            }
        }
        self.update_now_playing().await;
        Ok(())
    }

    fn fail(&mut self, error: PlaybackError) {
        warn!(error = %error, "Playback failed");
        let message = error.to_string();

        self.snapshot.state = PlaybackState::Failed {
            message: message.clone(),
        };
        self.snapshot.position = Duration::ZERO;
        self.snapshot.duration = Duration::ZERO;
        self.publish();

        self.emit(PlaybackEvent::Failed {
            hymn: self.snapshot.hymn,
            message,
        });

        self.snapshot.state = PlaybackState::Idle;
        self.snapshot.hymn = None;
        self.snapshot.edition = None;
        self.publish();

        if let Some(reply) = self.pending.take() {
            let _ = reply.send(Err(error));
        }
    }

    async fn pause(&mut self) -> Result<()> {
        if self.snapshot.state != PlaybackState::Playing {
            return Ok(());
        }
        let Some(session) = self.engine_session() else {
            return Ok(());
        };

        self.engine
            .pause(session)
            .await
            .map_err(PlaybackError::Engine)?;
        self.refresh_position(session).await;

        self.snapshot.state = PlaybackState::Paused;
        self.paused_by_interruption = false;
        self.publish();

        if let Some(hymn) = self.snapshot.hymn {
            self.emit(PlaybackEvent::Paused {
                hymn,
                position_secs: self.snapshot.position.as_secs_f64(),
            });
        }
        self.update_now_playing().await;
        Ok(())
    }

    async fn resume(&mut self) -> Result<()> {
        if self.snapshot.state != PlaybackState::Paused {
            return Ok(());
        }
        let Some(session) = self.engine_session() else {
            return Ok(());
        };

        self.engine
            .play(session)
            .await
            .map_err(PlaybackError::Engine)?;

        self.snapshot.state = PlaybackState::Playing;
        self.paused_by_interruption = false;
        self.publish();

        if let Some(hymn) = self.snapshot.hymn {
            self.emit(PlaybackEvent::Resumed {
                hymn,
                position_secs: self.snapshot.position.as_secs_f64(),
            });
        }
        self.update_now_playing().await;
        Ok(())
    }

    async fn seek(&mut self, seconds: f64) -> Result<()> {
        if !matches!(
            self.snapshot.state,
            PlaybackState::Playing | PlaybackState::Paused
        ) {
            return Ok(());
        }
        let Some(session) = self.engine_session() else {
            return Ok(());
        };

        let target = clamp_seek(seconds, self.snapshot.duration);
        self.engine
            .seek(session, target)
            .await
            .map_err(PlaybackError::Engine)?;

        self.snapshot.position = target;
        self.publish();

        if let Some(hymn) = self.snapshot.hymn {
            self.emit(PlaybackEvent::Seeked {
                hymn,
                position_secs: target.as_secs_f64(),
            });
        }
        self.update_now_playing().await;
        Ok(())
    }

    async fn stop(&mut self) {
        self.cancel_pending_load();

        let previous = self.snapshot.state.clone();
        let hymn = self.snapshot.hymn;
        self.teardown().await;

        self.snapshot.state = match previous {
            PlaybackState::Idle | PlaybackState::Failed { .. } => PlaybackState::Idle,
            _ => PlaybackState::Stopped,
        };
        self.snapshot.hymn = None;
        self.snapshot.edition = None;
        self.snapshot.position = Duration::ZERO;
        self.snapshot.duration = Duration::ZERO;
        self.paused_by_interruption = false;
        self.publish();

        if previous.is_active() {
            info!(hymn = ?hymn, "Playback stopped");
            self.emit(PlaybackEvent::Stopped { hymn });
        }
    }

    async fn complete(&mut self) {
        let (Some(hymn), Some(edition)) = (self.snapshot.hymn, self.snapshot.edition) else {
            return;
        };

        info!(hymn, "Hymn finished");
        self.teardown().await;

        self.snapshot.state = PlaybackState::Stopped;
        self.snapshot.hymn = None;
        self.snapshot.edition = None;
        self.snapshot.position = Duration::ZERO;
        self.snapshot.duration = Duration::ZERO;
        self.paused_by_interruption = false;
        self.publish();

        self.emit(PlaybackEvent::Completed {
            hymn,
            edition: edition.id().to_string(),
        });

        let callback = self.on_completion.lock().clone();
        if let Some(callback) = callback {
            callback(CompletionInfo { hymn, edition });
        }
    }

    async fn on_audio_event(&mut self, event: AudioSessionEvent) {
        match event {
            AudioSessionEvent::Finished { session } => {
                if self.engine_session() == Some(session) {
                    self.complete().await;
                } else {
                    debug!(%session, "Ignoring completion of a stale engine session");
                }
            }
            AudioSessionEvent::InterruptionBegan => {
                if self.snapshot.state.is_playing() {
                    self.interrupt("interruption").await;
                    self.paused_by_interruption = self.snapshot.state == PlaybackState::Paused;
                }
            }
            AudioSessionEvent::InterruptionEnded { should_resume } => {
                let resume = should_resume
                    && self.paused_by_interruption
                    && self.snapshot.state == PlaybackState::Paused;
                self.paused_by_interruption = false;

                if resume {
                    if let Err(e) = self.resume().await {
                        warn!(error = %e, "Failed to resume after interruption");
                    }
                }
            }
            AudioSessionEvent::RouteChanged {
                reason: RouteChangeReason::OldDeviceUnavailable,
            } => {
                if self.snapshot.state.is_playing() {
                    self.interrupt("route_change").await;
                }
            }
            AudioSessionEvent::RouteChanged { reason } => {
                debug!(?reason, "Ignoring route change");
            }
        }
    }

    async fn interrupt(&mut self, reason: &str) {
        if let Err(e) = self.pause().await {
            warn!(error = %e, reason, "Failed to pause for interruption");
            return;
        }
        if let Some(hymn) = self.snapshot.hymn {
            info!(hymn, reason, "Playback interrupted");
            self.emit(PlaybackEvent::Interrupted {
                hymn,
                reason: reason.to_string(),
            });
        }
    }

    async fn on_tick(&mut self) {
        let Some(session) = self.engine_session() else {
            return;
        };
        let previous = self.snapshot.position;
        self.refresh_position(session).await;
        if self.snapshot.position != previous {
            self.publish();
        }
    }

    async fn refresh_position(&mut self, session: EngineSessionId) {
        match self.engine.position(session).await {
            Ok(position) => {
                self.snapshot.position = if self.snapshot.duration.is_zero() {
                    position
                } else {
                    position.min(self.snapshot.duration)
                };
            }
            Err(e) => debug!(error = %e, "Position poll failed"),
        }
    }

    // ------------------------------------------------------------------------
    // Resource handling
    // ------------------------------------------------------------------------

    fn engine_session(&self) -> Option<EngineSessionId> {
        self.active.as_ref().map(|active| active.engine_session)
    }

    fn cancel_pending_load(&mut self) {
        if let Some(task) = self.load_task.take() {
            self.superseded_loads.retain(|task| !task.is_finished());
            self.superseded_loads.push(task);
        }
        if let Some(reply) = self.pending.take() {
            let _ = reply.send(Err(PlaybackError::Superseded));
        }
    }

    /// Release the engine session and temp file, if any.
    async fn teardown(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        self.unload(active.engine_session).await;
        if let Err(e) = active.file.delete() {
            warn!(error = %e, "Failed to delete playback file");
        }

        if let Some(controls) = &self.media_controls {
            if let Err(e) = controls.clear_now_playing().await {
                debug!(error = %e, "Failed to clear now playing");
            }
            if let Err(e) = controls.set_session_active(false).await {
                debug!(error = %e, "Failed to deactivate media session");
            }
        }
    }

    async fn unload(&self, session: EngineSessionId) {
        if let Err(e) = self.engine.unload(session).await {
            warn!(error = %e, %session, "Engine unload failed");
        }
    }

    async fn close(&mut self) {
        for task in self.load_task.take().into_iter().chain(self.superseded_loads.drain(..)) {
            task.abort();
        }
        if let Some(reply) = self.pending.take() {
            let _ = reply.send(Err(PlaybackError::ManagerClosed));
        }
        self.teardown().await;

        let generation = self.snapshot.generation;
        self.snapshot = PlaybackSnapshot {
            generation,
            ..PlaybackSnapshot::idle()
        };
        self.publish();
        info!("Playback session manager stopped");
    }

    async fn register_remote_commands(&self) {
        if let Some(controls) = &self.media_controls {
            if let Err(e) = controls.register_commands(&RemoteCommand::ALL).await {
                warn!(error = %e, "Failed to register remote commands");
            }
        }
    }

    async fn update_now_playing(&self) {
        let (Some(controls), Some(hymn)) = (&self.media_controls, self.snapshot.hymn) else {
            return;
        };

        let info = NowPlayingInfo {
            title: title(hymn),
            artist: self.config.artist.clone(),
            duration: self.snapshot.duration,
            elapsed: self.snapshot.position,
            is_playing: self.snapshot.state.is_playing(),
        };
        if let Err(e) = controls.update_now_playing(info).await {
            debug!(error = %e, "Failed to update now playing");
        }
    }

    fn publish(&self) {
        self.publisher.send_replace(self.snapshot.clone());
    }

    fn emit(&self, event: PlaybackEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(CoreEvent::Playback(event)).ok();
        }
    }
}

/// Fetch (or read from cache), write the temp file and probe it.
async fn prepare(
    store: Arc<AssetStore>,
    probe: Option<Arc<dyn MediaProbe>>,
    temp_dir: Option<PathBuf>,
    hymn: u16,
    edition: Edition,
) -> Result<Prepared> {
    let reference = store
        .resolver()
        .resolve_audio(hymn, edition)
        .map_err(AssetError::from)?;
    let data = store.load(&reference).await?;

    let extension = Path::new(&reference.cache_key)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("mp3");
    let file = PlaybackFile::write(temp_dir, data, extension).await?;

    let info = match probe {
        Some(probe) => {
            let path = file.path().to_path_buf();
            let info = tokio::task::spawn_blocking(move || probe.probe(&path))
                .await
                .map_err(|e| PlaybackError::Internal(format!("probe task failed: {}", e)))??;
            Some(info)
        }
        None => None,
    };

    Ok(Prepared { file, info })
}

fn title(hymn: u16) -> String {
    format!("Hymn {}", hymn)
}

/// A zero `duration` means unknown and leaves the target unbounded above.
fn clamp_seek(seconds: f64, duration: Duration) -> Duration {
    if seconds.is_nan() || seconds <= 0.0 {
        return Duration::ZERO;
    }
    if !duration.is_zero() && seconds >= duration.as_secs_f64() {
        return duration;
    }
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seek_clamping() {
        let duration = Duration::from_secs(120);
        assert_eq!(clamp_seek(-3.0, duration), Duration::ZERO);
        assert_eq!(clamp_seek(f64::NAN, duration), Duration::ZERO);
        assert_eq!(clamp_seek(30.5, duration), Duration::from_millis(30_500));
        assert_eq!(clamp_seek(500.0, duration), duration);
        assert_eq!(clamp_seek(f64::INFINITY, duration), duration);
        assert_eq!(clamp_seek(f64::INFINITY, Duration::ZERO), Duration::ZERO);
        // Unknown duration: only the lower bound applies.
        assert_eq!(clamp_seek(12.0, Duration::ZERO), Duration::from_secs(12));
        assert_eq!(clamp_seek(7_200.0, Duration::ZERO), Duration::from_secs(7_200));
        assert_eq!(clamp_seek(-1.0, Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn now_playing_title() {
        assert_eq!(title(7), "Hymn 7");
    }
}
