//=========================================================================
// Render Controller
//=========================================================================
//
// Fixed-rate render loop owning the GPU context for its whole life.
//
// States:
//
//   Uninitialized ──run()──> Idle ──init──> Running ──pause──> Paused
//                              │              ▲  │               │
//                              │              └──┼─────init──────┘
//                              └──────── stop ───┴──> Stopped
//
// One `select!` multiplexes the frame ticker, the 1 s FPS ticker and the
// control channels. While not running, the frame ticker is replaced by
// `never()` so no tick can be observed after a pause is acknowledged.
//
// Resume does not restart the ticker; rendering continues with the next
// init (the platform re-sends its window after every resume).
//
//=========================================================================

//=== External Dependencies ===============================================

use std::io;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{never, select, tick, Receiver};
use log::{debug, info, trace, warn};

//=== Internal Dependencies ===============================================

use super::control::{ControlReceiver, InitRequest, PauseRequest, TapEvent, ViewportSize};
use super::game_state::GameState;
use crate::config::TapAction;
use crate::core::render::{RenderError, RenderTarget};
use crate::core::world::{SceneError, SceneSetup, Viewport};

//=== RenderLoopConfig ====================================================

/// Render loop parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderLoopConfig {
    pub frames_per_second: u32,
    pub tap_action: TapAction,

    /// Destroy the scene on pause instead of keeping it in memory.
    pub release_on_pause: bool,
}

impl Default for RenderLoopConfig {
    fn default() -> Self {
        Self {
            frames_per_second: 30,
            tap_action: TapAction::Explode,
            release_on_pause: true,
        }
    }
}

impl RenderLoopConfig {
    /// Seconds per frame; also the physics step.
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.frames_per_second as f32
    }

    fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frames_per_second as f64)
    }
}

//=== LoopState ===========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Uninitialized,
    Idle,
    Running,
    Paused,
    Stopped,
}

//=== LoopSummary =========================================================

/// Totals reported when the loop stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopSummary {
    /// Frames rendered across all sessions.
    pub frames: u64,

    /// Number of scenes built (one per init).
    pub sessions: u32,
}

//=== RenderLoopError =====================================================

/// Fatal render loop failures.
#[derive(Debug)]
pub enum RenderLoopError {
    /// Surface creation, resize or present failed.
    Render(RenderError),

    /// The scene could not be built.
    Scene(SceneError),

    /// The render thread could not be spawned.
    Spawn(io::Error),
}

impl std::fmt::Display for RenderLoopError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Render(e) => write!(f, "Render error: {}", e),
            Self::Scene(e) => write!(f, "Scene error: {}", e),
            Self::Spawn(e) => write!(f, "Failed to spawn render thread: {}", e),
        }
    }
}

impl std::error::Error for RenderLoopError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render(e) => Some(e),
            Self::Scene(e) => Some(e),
            Self::Spawn(e) => Some(e),
        }
    }
}

impl From<RenderError> for RenderLoopError {
    fn from(e: RenderError) -> Self {
        Self::Render(e)
    }
}

impl From<SceneError> for RenderLoopError {
    fn from(e: SceneError) -> Self {
        Self::Scene(e)
    }
}

//=== RenderController ====================================================

pub struct RenderController<W: RenderTarget> {
    config: RenderLoopConfig,
    setup: SceneSetup,
    state: LoopState,
    game: Option<GameState<W>>,
    ticker: Receiver<Instant>,
    summary: LoopSummary,
}

impl<W: RenderTarget> RenderController<W> {
    //--- Construction -----------------------------------------------------

    /// # Panics
    ///
    /// Panics if `frames_per_second == 0`.
    pub fn new(config: RenderLoopConfig, setup: SceneSetup) -> Self {
        assert!(config.frames_per_second > 0, "Frames per second must be positive");
        Self {
            config,
            setup,
            state: LoopState::Uninitialized,
            game: None,
            ticker: never(),
            summary: LoopSummary::default(),
        }
    }

    /// Runs a controller on its own named thread.
    ///
    /// The controller is constructed on that thread so the canvas and the
    /// world never cross threads.
    pub fn spawn(
        config: RenderLoopConfig,
        setup: SceneSetup,
        control: ControlReceiver<W>,
    ) -> Result<thread::JoinHandle<Result<LoopSummary, RenderLoopError>>, RenderLoopError> {
        thread::Builder::new()
            .name("boxfall-render".into())
            .spawn(move || RenderController::new(config, setup).run(control))
            .map_err(RenderLoopError::Spawn)
    }

    //--- Accessors --------------------------------------------------------

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn game(&self) -> Option<&GameState<W>> {
        self.game.as_ref()
    }

    pub fn summary(&self) -> LoopSummary {
        self.summary
    }

    //--- Execution --------------------------------------------------------

    /// Processes ticks and control messages until stopped.
    ///
    /// # Errors
    ///
    /// Returns the first render or scene error; the loop does not attempt
    /// to recover.
    pub fn run(mut self, mut control: ControlReceiver<W>) -> Result<LoopSummary, RenderLoopError> {
        self.state = LoopState::Idle;
        let fps_ticker = tick(Duration::from_secs(1));
        info!(target: "render", "Render loop started ({} fps)", self.config.frames_per_second);

        loop {
            let mut stopped = false;
            let ticker = self.ticker.clone();
            let (init, tap, pause, resume, resize, stop) = (
                control.init.clone(),
                control.tap.clone(),
                control.pause.clone(),
                control.resume.clone(),
                control.resize.clone(),
                control.stop.clone(),
            );

            select! {
                recv(ticker) -> _ => self.on_tick()?,
                recv(fps_ticker) -> _ => self.on_fps_sample(),
                recv(init) -> msg => match msg {
                    Ok(request) => self.on_init(request)?,
                    Err(_) => control.init = never(),
                },
                recv(tap) -> msg => match msg {
                    Ok(tap) => self.on_tap(tap),
                    Err(_) => control.tap = never(),
                },
                recv(pause) -> msg => match msg {
                    Ok(request) => self.on_pause(request),
                    Err(_) => control.pause = never(),
                },
                recv(resume) -> msg => match msg {
                    Ok(()) => self.on_resume(),
                    Err(_) => control.resume = never(),
                },
                recv(resize) -> msg => match msg {
                    Ok(size) => self.on_resize(size)?,
                    Err(_) => control.resize = never(),
                },
                // A dropped stop handle also means stop
                recv(stop) -> _ => stopped = true,
            }

            if stopped {
                self.on_stop();
                break;
            }
        }

        info!(
            target: "render",
            "Render loop stopped after {} frames ({} sessions)",
            self.summary.frames,
            self.summary.sessions
        );
        Ok(self.summary)
    }

    //--- Handlers ---------------------------------------------------------

    fn on_init(&mut self, request: InitRequest<W>) -> Result<(), RenderLoopError> {
        self.stop_ticker();
        if let Some(old) = self.game.take() {
            debug!(target: "render", "Replacing scene for new window");
            old.release();
        }

        let (width, height) = request.window.size();
        let viewport = Viewport::new(width, height);
        let canvas = request.window.create_canvas()?;
        let world = (self.setup)(viewport)?;

        info!(
            target: "render",
            "Scene initialised: {}x{}, {} boxes",
            width,
            height,
            world.box_count()
        );

        self.game = Some(GameState::new(request.window, request.activity, canvas, world));
        self.summary.sessions += 1;
        self.start_ticker();
        self.state = LoopState::Running;
        Ok(())
    }

    fn on_tick(&mut self) -> Result<(), RenderLoopError> {
        let Some(game) = self.game.as_mut() else {
            return Ok(());
        };

        let culled = game.render_frame(self.config.frame_dt())?;
        self.summary.frames += 1;
        if culled > 0 {
            trace!(target: "render", "Frame {}: culled {} boxes", game.frames(), culled);
        }
        Ok(())
    }

    fn on_fps_sample(&mut self) {
        if self.state != LoopState::Running {
            return;
        }
        if let Some(game) = self.game.as_mut() {
            let fps = game.sample_fps();
            debug!(target: "render", "FPS: {} (frames: {})", fps, game.frames());
        }
    }

    fn on_tap(&mut self, tap: TapEvent) {
        let Some(game) = self.game.as_mut().filter(|_| self.state == LoopState::Running) else {
            debug!(target: "render", "Tap at ({}, {}) ignored while {:?}", tap.x, tap.y, self.state);
            return;
        };

        match self.config.tap_action {
            TapAction::Explode => game.world.apply_radial_force(tap.x, tap.y),
            TapAction::Drop => {
                game.world.drop_box(tap.x, tap.y);
            }
            TapAction::Remove => {
                if game.world.remove_at(tap.x, tap.y).is_none() {
                    trace!(target: "render", "No box near ({}, {})", tap.x, tap.y);
                }
            }
        }
    }

    fn on_pause(&mut self, request: PauseRequest) {
        self.stop_ticker();

        if self.config.release_on_pause {
            if let Some(game) = self.game.take() {
                game.release();
                debug!(target: "render", "Scene released on pause");
            }
        }

        request.acknowledge();

        if self.state != LoopState::Idle {
            self.state = LoopState::Paused;
        }
        info!(target: "render", "Render loop paused");
    }

    fn on_resume(&self) {
        info!(target: "render", "Resume received; waiting for a window");
    }

    fn on_resize(&mut self, size: ViewportSize) -> Result<(), RenderLoopError> {
        let viewport = Viewport::new(size.width, size.height);
        match self.game.as_ref().map(GameState::viewport) {
            None => {
                trace!(target: "render", "Resize to {}x{} without a scene", size.width, size.height);
                return Ok(());
            }
            Some(current) if current == viewport => return Ok(()),
            Some(_) => {}
        }
        if size.width == 0 || size.height == 0 {
            warn!(target: "render", "Ignoring resize to empty surface");
            return Ok(());
        }

        self.stop_ticker();
        if let Some(game) = self.game.as_mut() {
            game.resize(viewport)?;
        }
        debug!(target: "render", "Viewport resized to {}x{}", size.width, size.height);

        if self.state == LoopState::Running {
            self.start_ticker();
        }
        Ok(())
    }

    fn on_stop(&mut self) {
        self.stop_ticker();
        if let Some(game) = self.game.take() {
            game.release();
        }
        self.state = LoopState::Stopped;
    }

    //--- Internal Helpers -------------------------------------------------

    fn start_ticker(&mut self) {
        self.ticker = tick(self.config.frame_interval());
    }

    fn stop_ticker(&mut self) {
        self.ticker = never();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
