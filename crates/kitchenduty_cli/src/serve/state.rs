//! Shared server state.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;

use chrono::{Local, Utc};
use kitchenduty_core::EngineError;
use log::info;

use crate::app::Engine;

/// Engine shared by request handlers; rendering runs on blocking threads.
pub(crate) struct AppState {
    pub(crate) engine: Mutex<Engine>,
}

#[derive(Debug)]
pub(crate) enum FeedError {
    Poisoned,
    Engine(EngineError),
}

impl Display for FeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Poisoned => write!(f, "engine lock poisoned"),
            Self::Engine(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FeedError {}

impl AppState {
    /// Pulls fresher state, then renders the feed for today.
    pub(crate) fn render_feed(&self) -> Result<String, FeedError> {
        let mut engine = self.engine.lock().map_err(|_| FeedError::Poisoned)?;
        let changed = engine.refresh();
        if !changed.is_empty() {
            info!(
                "event=feed_refresh module=cli status=ok changed={}",
                changed.len()
            );
        }
        engine
            .feed(Local::now().date_naive(), Utc::now())
            .map_err(FeedError::Engine)
    }

    pub(crate) fn roster_size(&self) -> Result<usize, FeedError> {
        let engine = self.engine.lock().map_err(|_| FeedError::Poisoned)?;
        Ok(engine.rotation().roster().len())
    }
}
