//! Environment configuration

use crate::state_machine::state::{DEFAULT_PROGRESS_STEP, DEFAULT_TICK_INTERVAL};
use crate::state_machine::WorkflowContext;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8000;

/// Process configuration, read once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub tick_interval: Duration,
    pub progress_step: u8,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            tick_interval: DEFAULT_TICK_INTERVAL,
            progress_step: DEFAULT_PROGRESS_STEP,
        }
    }
}

impl AppConfig {
    /// Read `ADVISOR_PORT`, `ADVISOR_TICK_MS` and `ADVISOR_PROGRESS_STEP`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparseable values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = parse_or(&lookup, "ADVISOR_PORT", defaults.port);
        let tick_ms = parse_or(
            &lookup,
            "ADVISOR_TICK_MS",
            u64::try_from(defaults.tick_interval.as_millis()).unwrap_or(200),
        )
        .max(1);
        let progress_step = parse_or(&lookup, "ADVISOR_PROGRESS_STEP", defaults.progress_step)
            .clamp(1, 100);

        Self {
            port,
            tick_interval: Duration::from_millis(tick_ms),
            progress_step,
        }
    }

    pub fn workflow_context(&self) -> WorkflowContext {
        WorkflowContext::new(self.tick_interval, self.progress_step)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, default = %default, "Ignoring unparseable setting");
            default
        }),
    }
}
