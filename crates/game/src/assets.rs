//! Background model loading.
//!
//! Each asset decodes on its own thread and reports progress and a one-shot
//! result over a channel; the frame loop drains it with [`AssetLoader::poll`]
//! and does the GPU upload itself.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};

use renderer::{load_model_data, AssetError, LoadProgress, ModelData};

/// The two models the demo loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Skybox,
    Ship,
}

impl AssetKind {
    pub fn label(self) -> &'static str {
        match self {
            AssetKind::Skybox => "Skybox",
            AssetKind::Ship => "Ship",
        }
    }
}

#[derive(Debug)]
pub enum LoadEvent {
    Progress(AssetKind, LoadProgress),
    Finished(AssetKind, Result<ModelData, AssetError>),
}

pub struct AssetLoader {
    tx: Sender<LoadEvent>,
    rx: Receiver<LoadEvent>,
    /// Loads spawned but not yet finished.
    pending: Vec<AssetKind>,
}

impl AssetLoader {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx, pending: Vec::new() }
    }

    /// Start decoding `path` on a worker thread.
    pub fn spawn(&mut self, kind: AssetKind, path: PathBuf) {
        log::info!("Loading {} from {:?}", kind.label(), path);
        let tx = self.tx.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("load-{}", kind.label().to_lowercase()))
            .spawn(move || {
                let progress_tx = tx.clone();
                let result = load_model_data(&path, |progress| {
                    // Receiver gone means the demo is shutting down.
                    let _ = progress_tx.send(LoadEvent::Progress(kind, progress));
                });
                let _ = tx.send(LoadEvent::Finished(kind, result));
            });
        match spawned {
            Ok(_) => self.pending.push(kind),
            Err(e) => log::error!("Could not start {} loader thread: {}", kind.label(), e),
        }
    }

    /// Drain every event that has arrived since the last call.
    pub fn poll(&mut self) -> Vec<LoadEvent> {
        let events: Vec<LoadEvent> = self.rx.try_iter().collect();
        for event in &events {
            if let LoadEvent::Finished(kind, _) = event {
                self.pending.retain(|k| k != kind);
            }
        }
        events
    }

    pub fn is_pending(&self, kind: AssetKind) -> bool {
        self.pending.contains(&kind)
    }
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new()
    }
}
