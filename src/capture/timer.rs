use std::time::Duration;

use crate::host::ui::Ui;

/// Format elapsed time as `m:ss`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Elapsed-time display shown while recording, refreshed once per whole second.
#[derive(Clone, Debug, Default)]
pub struct RecTimer {
    started_at: Option<Duration>,
    shown_secs: Option<u64>,
}

impl RecTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn start(&mut self, now: Duration, ui: &mut dyn Ui) {
        self.started_at = Some(now);
        self.shown_secs = Some(0);
        ui.set_timer_text(&format_elapsed(Duration::ZERO));
        ui.set_indicator_visible(true);
    }

    pub fn update(&mut self, now: Duration, ui: &mut dyn Ui) {
        let Some(start) = self.started_at else {
            return;
        };
        let secs = now.saturating_sub(start).as_secs();
        if self.shown_secs != Some(secs) {
            self.shown_secs = Some(secs);
            ui.set_timer_text(&format_elapsed(Duration::from_secs(secs)));
        }
    }

    pub fn stop(&mut self, ui: &mut dyn Ui) {
        if self.started_at.take().is_some() {
            self.shown_secs = None;
            ui.set_indicator_visible(false);
        }
    }
}
