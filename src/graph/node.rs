/// Context passed to graph nodes during rendering
///
/// Contains information about what to render:
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - time: Context time of the first sample in the block, in seconds
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub time: f64,
}

impl RenderCtx {
    pub fn at(sample_rate: f32, time: f64) -> Self {
        Self { sample_rate, time }
    }

    /// Context time of sample `index` within the block.
    #[inline]
    pub fn sample_time(&self, index: usize) -> f64 {
        self.time + index as f64 / self.sample_rate as f64
    }

    /// Context time just past the last sample of a block of `frames`.
    #[inline]
    pub fn end_time(&self, frames: usize) -> f64 {
        self.sample_time(frames)
    }
}

/// Core trait for audio processing graph nodes
///
/// Nodes process a block in place: sources overwrite it, effects transform it.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Check if this node is still producing sound
    ///
    /// Used by the renderer to know when a chain can be handed back.
    fn is_active(&self) -> bool {
        true
    }
}
