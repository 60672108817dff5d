//=========================================================================
// Platform Bridge Interface
//=========================================================================
//
// Platform-to-core interface types (events and errors).
//
// Defines the contract between the event source (main thread) and the
// dispatcher thread. Events are generic over the window handle so tests
// can drive the pipeline with a headless target.
//
//=========================================================================

//=== ActivityHandle ======================================================

/// Opaque token identifying the hosting activity on platforms that have
/// one. Desktop platforms report `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivityHandle(pub u64);

//=== AppEvent ============================================================

/// Application lifecycle and input events, produced only by the event
/// source and consumed exactly once by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent<W> {
    /// A drawable window is available (startup or after resume).
    WindowCreated {
        window: W,
        activity: Option<ActivityHandle>,
    },

    /// Pointer pressed or released at screen coordinates (origin top-left).
    PointerDown { x: f32, y: f32, pressed: bool },

    /// Pointer moved to screen coordinates.
    PointerMove { x: f32, y: f32 },

    /// Application moved to the background.
    Pause,

    /// Application returned to the foreground.
    Resume,

    /// The window surface changed size and must be redrawn.
    RedrawNeeded { width: u32, height: u32 },

    /// Application is shutting down.
    Destroy,
}

impl<W> AppEvent<W> {
    /// Variant name for logging, without the window payload.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::WindowCreated { .. } => "WindowCreated",
            Self::PointerDown { .. } => "PointerDown",
            Self::PointerMove { .. } => "PointerMove",
            Self::Pause => "Pause",
            Self::Resume => "Resume",
            Self::RedrawNeeded { .. } => "RedrawNeeded",
            Self::Destroy => "Destroy",
        }
    }
}

//=== PlatformError =======================================================

/// Platform initialization and runtime errors.
#[derive(Debug)]
pub enum PlatformError {
    /// Event loop creation failed (OS-level issue).
    EventLoopCreation(String),

    /// Event loop execution error.
    EventLoopExecution(String),
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventLoopCreation(e) => write!(f, "Event loop creation failed: {}", e),
            Self::EventLoopExecution(e) => write!(f, "Event loop error: {}", e),
        }
    }
}

impl std::error::Error for PlatformError {}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_variants() {
        let created: AppEvent<()> = AppEvent::WindowCreated { window: (), activity: None };
        assert_eq!(created.kind(), "WindowCreated");
        assert_eq!(AppEvent::<()>::RedrawNeeded { width: 1, height: 2 }.kind(), "RedrawNeeded");
        assert_eq!(AppEvent::<()>::Destroy.kind(), "Destroy");
    }

    #[test]
    fn platform_error_display_format() {
        let e = PlatformError::EventLoopCreation("no display".into());
        assert_eq!(e.to_string(), "Event loop creation failed: no display");
    }

    #[test]
    fn platform_error_is_error_trait() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<PlatformError>();
    }
}
