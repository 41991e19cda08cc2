//! Frame sources

use crate::frame::Frame;
use crate::utils::is_image_file;
use crate::Result;
use anyhow::Context;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Anything the frame loop can pull frames from.
///
/// `Ok(None)` means this capture failed and the iteration should be skipped; it does not mean
/// the source is finished. Use [`FrameSource::is_exhausted`] for that.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<Frame>>;

    fn is_exhausted(&self) -> bool;
}

/// Replays image files from disk in file-name order
#[derive(Debug, Default)]
pub struct ImageSequenceSource {
    pending: VecDeque<PathBuf>,
}

impl ImageSequenceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue every supported image of a directory, sorted by file name
    pub fn add_dir<P: AsRef<Path>>(mut self, dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut files = Vec::new();

        for entry in fs::read_dir(dir).with_context(|| format!("Failed to read frame directory: {:?}", dir))? {
            let path = entry?.path();
            if path.is_file() && is_image_file(&path) {
                files.push(path);
            }
        }
        files.sort();

        debug!(dir = %dir.display(), frames = files.len(), "frame directory queued");
        self.pending.extend(files);
        Ok(self)
    }

    /// Queue a single file
    pub fn add_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.pending.push_back(path.as_ref().to_path_buf());
        self
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(path) = self.pending.pop_front() else {
            return Ok(None);
        };

        match Frame::load(&path) {
            Ok(frame) => Ok(Some(frame)),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "frame capture failed, skipping");
                Ok(None)
            }
        }
    }

    fn is_exhausted(&self) -> bool {
        self.pending.is_empty()
    }
}
