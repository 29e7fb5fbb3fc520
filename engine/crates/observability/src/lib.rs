use tracing_subscriber::{fmt, EnvFilter};

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Handlers run on the session's input path and must not block.
pub const HANDLER_BUDGET_US: u128 = 5_000;

/// One dialogue transition, logged after the handler returns.
#[derive(Debug, Clone)]
pub struct TransitionRecord {
    pub dialogue: &'static str,
    pub session: u64,
    pub from: String,
    pub to: String,
    pub duration_us: u128,
}

impl TransitionRecord {
    pub fn exceeded_budget(&self) -> bool {
        self.duration_us > HANDLER_BUDGET_US
    }

    pub fn log(&self) {
        if self.exceeded_budget() {
            tracing::warn!(
                dialogue = self.dialogue,
                session = self.session,
                from = %self.from,
                to = %self.to,
                duration_us = self.duration_us,
                "dialogue handler exceeded budget ({}us > {}us)",
                self.duration_us,
                HANDLER_BUDGET_US
            );
        } else {
            tracing::debug!(
                dialogue = self.dialogue,
                session = self.session,
                from = %self.from,
                to = %self.to,
                duration_us = self.duration_us,
                "dialogue transition"
            );
        }
    }
}
