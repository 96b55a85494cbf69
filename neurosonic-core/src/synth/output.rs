//! Audio sink seam and the bounded block queue.

use crate::errors::AudioError;
use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};

/// External audio backend surface consumed by the orchestrator.
///
/// `write` hands over one mono block of `audio_block_frames` samples in
/// [-1, 1]. The core never reads audio back.
pub trait AudioSink: Send {
    fn start(&mut self) -> Result<(), AudioError>;
    fn stop(&mut self) -> Result<(), AudioError>;
    fn write(&mut self, block: &[f32]) -> Result<(), AudioError>;
}

/// Default number of blocks the queue holds (~400 ms at 50 ms blocks).
pub const DEFAULT_QUEUE_BLOCKS: usize = 8;

/// Bounded block queue with drop-tail back-pressure.
///
/// The producer side is the orchestrator's `write`; the consumer side
/// is whatever real-time callback drains via [`BlockQueueSink::pull`]
/// (a `Receiver` clone works across threads). When the queue is full
/// the oldest block is dropped; when it underflows, `pull` returns
/// silence.
pub struct BlockQueueSink {
    block_frames: usize,
    tx: Sender<Vec<f32>>,
    rx: Receiver<Vec<f32>>,
    started: bool,
}

impl BlockQueueSink {
    pub fn new(block_frames: usize, queue_blocks: usize) -> Self {
        let (tx, rx) = bounded(queue_blocks.max(1));
        Self {
            block_frames,
            tx,
            rx,
            started: false,
        }
    }

    /// Receiver handle for a consumer on another thread.
    pub fn receiver(&self) -> Receiver<Vec<f32>> {
        self.rx.clone()
    }

    /// Next queued block, or a silent block on underflow.
    pub fn pull(&self) -> Vec<f32> {
        self.rx
            .try_recv()
            .unwrap_or_else(|_| vec![0.0; self.block_frames])
    }

    /// Blocks currently queued.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl AudioSink for BlockQueueSink {
    fn start(&mut self) -> Result<(), AudioError> {
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.started = false;
        // Drain pending blocks so a restarted session begins clean.
        while self.rx.try_recv().is_ok() {}
        Ok(())
    }

    fn write(&mut self, block: &[f32]) -> Result<(), AudioError> {
        if !self.started {
            return Err(AudioError::WriteFailed {
                reason: "sink is stopped".to_string(),
            });
        }

        let mut owned = block.to_vec();
        loop {
            match self.tx.try_send(owned) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Full(returned)) => {
                    // Drop-tail: evict the oldest block and retry.
                    let _ = self.rx.try_recv();
                    owned = returned;
                }
                Err(TrySendError::Disconnected(_)) => {
                    return Err(AudioError::WriteFailed {
                        reason: "block queue disconnected".to_string(),
                    });
                }
            }
        }
    }
}
