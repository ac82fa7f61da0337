use crate::error::AppError;
use actix_session::Session;
use log::warn;
use serde::{Deserialize, Serialize};

const FLASHES_KEY: &str = "_flashes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Danger,
    Info,
    Message,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Danger => "danger",
            Level::Info => "info",
            Level::Message => "message",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

fn pending(session: &Session) -> Vec<Flash> {
    match session.get::<Vec<Flash>>(FLASHES_KEY) {
        Ok(flashes) => flashes.unwrap_or_default(),
        Err(e) => {
            warn!("discarding unreadable flashes: {}", e);
            Vec::new()
        }
    }
}

pub fn push(session: &Session, level: Level, message: &str) -> Result<(), AppError> {
    let mut flashes = pending(session);
    flashes.push(Flash {
        level,
        message: message.to_string(),
    });
    session
        .insert(FLASHES_KEY, flashes)
        .map_err(|e| AppError::Session(e.to_string()))
}

/// Drain pending flashes. The session is only touched when there is
/// something to remove.
pub fn take(session: &Session) -> Vec<Flash> {
    match session.get::<Vec<Flash>>(FLASHES_KEY) {
        Ok(None) => Vec::new(),
        Ok(Some(flashes)) => {
            session.remove(FLASHES_KEY);
            flashes
        }
        Err(e) => {
            warn!("discarding unreadable flashes: {}", e);
            session.remove(FLASHES_KEY);
            Vec::new()
        }
    }
}
