use super::assets::Asset;
use crate::error::{CalendarResult, Error};
use serde::Serialize;
use tracing::{error, info};

/// Asset loading progress of one calendar instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LifecycleState {
    NotStarted,
    Loading,
    Ready,
    /// Assets failed to load. Terminal until the component is recreated.
    Failed,
}

/// Runs the asset batch exactly once per instance
#[derive(Debug, Clone)]
pub struct LifecycleController {
    state: LifecycleState,
    asset_base_url: String,
    assets: Vec<Asset>,
}

impl LifecycleController {
    pub fn new(asset_base_url: &str, assets: Vec<Asset>) -> Self {
        Self {
            state: LifecycleState::NotStarted,
            asset_base_url: asset_base_url.to_string(),
            assets,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == LifecycleState::Ready
    }

    /// One-shot gate: true only for the first render-ready signal
    pub fn begin(&mut self) -> bool {
        if self.state != LifecycleState::NotStarted {
            return false;
        }
        self.state = LifecycleState::Loading;
        true
    }

    /// The asset batch to run after `begin` returned true
    pub fn batch(&self) -> (String, Vec<Asset>) {
        (self.asset_base_url.clone(), self.assets.clone())
    }

    /// Record the batch result. Returns true when the initial fetch may start.
    pub fn finish(&mut self, result: &CalendarResult<()>) -> bool {
        if self.state != LifecycleState::Loading {
            return false;
        }

        match result {
            Ok(()) => {
                info!("Calendar library ready");
                self.state = LifecycleState::Ready;
                true
            }
            Err(e) => {
                error!("Error loading calendar library: {}", e);
                self.state = LifecycleState::Failed;
                false
            }
        }
    }

    /// Error for operations attempted before the library is ready
    pub fn not_ready(&self) -> Error {
        let reason = match self.state {
            LifecycleState::NotStarted => "assets have not been requested",
            LifecycleState::Loading => "assets are still loading",
            LifecycleState::Failed => "assets failed to load, reload the component",
            LifecycleState::Ready => "ready",
        };
        Error::NotReady(reason.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::assignment_calendar::assets::default_assets;
    use crate::error::asset_error;

    #[test]
    fn gate_opens_once() {
        let mut lifecycle = LifecycleController::new("https://cdn.example.com", default_assets());
        assert!(lifecycle.begin());
        assert!(!lifecycle.begin());
        assert_eq!(lifecycle.state(), LifecycleState::Loading);

        assert!(lifecycle.finish(&Ok(())));
        assert!(lifecycle.is_ready());
        assert!(!lifecycle.begin());
    }

    #[test]
    fn failure_is_terminal() {
        let mut lifecycle = LifecycleController::new("https://cdn.example.com", default_assets());
        lifecycle.begin();
        assert!(!lifecycle.finish(&Err(asset_error("404"))));
        assert_eq!(lifecycle.state(), LifecycleState::Failed);
        assert!(!lifecycle.begin());
        assert!(matches!(lifecycle.not_ready(), Error::NotReady(_)));
    }

    #[test]
    fn finish_without_begin_is_ignored() {
        let mut lifecycle = LifecycleController::new("https://cdn.example.com", default_assets());
        assert!(!lifecycle.finish(&Ok(())));
        assert_eq!(lifecycle.state(), LifecycleState::NotStarted);
    }
}
