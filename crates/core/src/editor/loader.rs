//! Background image decoding.
//!
//! Decoding runs on a worker thread and the result is posted back over a
//! channel, the same way the editor window receives any other async work.
//! Each request bumps a per-role generation; results from superseded
//! requests are dropped when drained.

use super::rendering::Layer;
use super::state::{ImageRole, LoadEvent};
use crate::error::Result;
use crate::image_processing::{ImageProcessor, ImageSource};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

pub struct ImageLoader {
    tx: Sender<LoadEvent>,
    rx: Receiver<LoadEvent>,
    generations: [u64; 2],
    in_flight: [bool; 2],
    max_bytes: u64,
}

impl ImageLoader {
    pub fn new(max_bytes: u64) -> Self {
        let (tx, rx) = channel();
        Self {
            tx,
            rx,
            generations: [0; 2],
            in_flight: [false; 2],
            max_bytes,
        }
    }

    /// Starts decoding `source` for `role`, superseding earlier requests.
    pub fn request(&mut self, role: ImageRole, source: ImageSource) -> u64 {
        let generation = self.supersede(role);
        self.in_flight[role.index()] = true;
        let tx = self.tx.clone();
        let max_bytes = self.max_bytes;

        log::info!("Loading {} from {}", role.as_str(), source.describe());

        // Spawn background thread for decoding
        thread::spawn(move || {
            let result = ImageProcessor::load(&source, max_bytes)
                .and_then(|image| Layer::from_image(&image));
            let _ = tx.send(LoadEvent {
                role,
                generation,
                result,
            });
        });

        generation
    }

    /// Invalidates any in-flight request for `role`.
    pub fn supersede(&mut self, role: ImageRole) -> u64 {
        self.in_flight[role.index()] = false;
        let slot = &mut self.generations[role.index()];
        *slot += 1;
        *slot
    }

    /// Collects finished loads that are still current.
    pub fn drain(&mut self) -> Vec<(ImageRole, Result<Layer>)> {
        let mut finished = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            if event.generation != self.generations[event.role.index()] {
                log::debug!(
                    "Dropping stale {} load (generation {})",
                    event.role.as_str(),
                    event.generation
                );
                continue;
            }
            self.in_flight[event.role.index()] = false;
            finished.push((event.role, event.result));
        }
        finished
    }

    /// Blocks until the current request for `role` finishes.
    ///
    /// Other events that arrive in the meantime are kept for the next drain.
    /// Returns `None` when nothing is in flight for `role`.
    pub fn wait(&mut self, role: ImageRole) -> Option<Result<Layer>> {
        if !self.in_flight[role.index()] {
            return None;
        }
        let current = self.generations[role.index()];
        let mut pending = Vec::new();
        let mut outcome = None;
        while let Ok(event) = self.rx.recv() {
            if event.role == role && event.generation == current {
                self.in_flight[role.index()] = false;
                outcome = Some(event.result);
                break;
            }
            pending.push(event);
        }
        for event in pending {
            let _ = self.tx.send(event);
        }
        outcome
    }

    /// Whether any current request has not been drained yet.
    pub fn is_loading(&self) -> bool {
        self.in_flight.iter().any(|f| *f)
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_processing::ExportFormat;
    use image::{Rgba, RgbaImage};

    fn png(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, Rgba([1, 2, 3, 255]));
        ImageProcessor::encode(&img, ExportFormat::Png).unwrap()
    }

    #[test]
    fn test_load_and_wait() {
        let mut loader = ImageLoader::new(1 << 20);
        loader.request(ImageRole::Overlay, ImageSource::Bytes(png(5, 7)));
        assert!(loader.is_loading());
        let layer = loader.wait(ImageRole::Overlay).unwrap().unwrap();
        assert_eq!(layer.size(), (5, 7));
        assert!(!loader.is_loading());
    }

    #[test]
    fn test_stale_results_are_dropped() {
        let mut loader = ImageLoader::new(1 << 20);
        loader.request(ImageRole::Background, ImageSource::Bytes(png(3, 3)));
        loader.request(ImageRole::Background, ImageSource::Bytes(png(9, 4)));

        let layer = loader.wait(ImageRole::Background).unwrap().unwrap();
        assert_eq!(layer.size(), (9, 4));

        // Give the superseded worker time to post, then make sure it is ignored
        std::thread::sleep(std::time::Duration::from_millis(200));
        assert!(loader.drain().is_empty());
    }

    #[test]
    fn test_decode_failure_is_reported() {
        let mut loader = ImageLoader::new(1 << 20);
        loader.request(ImageRole::Overlay, ImageSource::Bytes(b"nope".to_vec()));
        let result = loader.wait(ImageRole::Overlay).unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn test_wait_without_request() {
        let mut loader = ImageLoader::new(1 << 20);
        assert!(loader.wait(ImageRole::Background).is_none());
    }
}
