use crate::Detector;

/// Shared state for route handlers. The detector's pipeline is loaded once at
/// startup and never mutated.
#[derive(Clone)]
pub struct AppState {
    pub detector: Detector,
}
