use std::path::PathBuf;
use std::sync::Arc;

use crate::config::EngineConfiguration;
use crate::error::DecodeErrorKind;
use crate::pressure::PressureSignal;

/// Identity of one collection item: stable id, source path, and position in
/// the current ordering. Never mutated after the ordering is built.
#[derive(Debug, Clone)]
pub struct PhotoRef {
    pub id: u64,
    pub ordinal: usize,
    pub path: Arc<PathBuf>,
}

impl PhotoRef {
    pub fn new(id: u64, ordinal: usize, path: PathBuf) -> Self {
        Self {
            id,
            ordinal,
            path: Arc::new(path),
        }
    }
}

/// A decoded RGBA8 payload. Owned by whichever cache tier holds it.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Byte cost charged against the cache budgets.
    pub fn cost_bytes(&self) -> usize {
        self.pixels.len()
    }
}

/// Public load-state snapshot carried on the event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loading,
    Loaded,
    Failed(DecodeErrorKind),
}

/// Emitted by the loader for UI binding and diagnostics.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A slot changed state. Emitted for every index, including preloaded
    /// neighbors.
    Transition { index: usize, state: LoadState },

    /// The photo at the current index finished decoding. Emitted only for
    /// the current index; neighbors update silently via `Transition`.
    CurrentReady { index: usize },
}

/// Commands accepted by the loader task. All are fire-and-forget: callers
/// enqueue and return without waiting on scheduling or cache decisions.
#[derive(Debug)]
pub enum EngineCommand {
    SetCurrentIndex(usize),
    RequestImmediate(usize),
    SetCollection(Vec<PhotoRef>),
    Reconfigure(EngineConfiguration),
    Pressure(PressureSignal),
}
