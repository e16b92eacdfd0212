use crate::state::messages::UiEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

/// Periodic live-score refresh — every 30 seconds while the console is open.
/// Emits a UI tick rather than a network request directly: only the UI loop
/// knows which stage is selected, so it turns the tick into the right fetch.
pub struct PeriodicRefresher {
    ui_events: mpsc::Sender<UiEvent>,
}

impl PeriodicRefresher {
    pub fn new(ui_events: mpsc::Sender<UiEvent>) -> Self {
        Self { ui_events }
    }

    pub async fn run(self) {
        let mut refresh_interval = interval(Duration::from_secs(30));
        // Skip the immediate first tick so startup loading isn't double-triggered.
        refresh_interval.tick().await;

        loop {
            refresh_interval.tick().await;
            if self.ui_events.send(UiEvent::RefreshTick).await.is_err() {
                break;
            }
        }
    }
}
