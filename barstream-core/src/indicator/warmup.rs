/// Warmup state tracker.
///
/// Counts observed bars against a declared lookback. `is_warm` is monotonic
/// until `reset`.
#[derive(Debug, Clone)]
pub struct WarmupState {
    warmup_bars: usize,
    bars_processed: usize,
}

impl WarmupState {
    pub fn new(warmup_bars: usize) -> Self {
        Self {
            warmup_bars,
            bars_processed: 0,
        }
    }

    pub fn process_bar(&mut self) {
        self.bars_processed += 1;
    }

    pub fn is_warm(&self) -> bool {
        self.bars_processed >= self.warmup_bars
    }

    pub fn bars_processed(&self) -> usize {
        self.bars_processed
    }

    pub fn warmup_bars(&self) -> usize {
        self.warmup_bars
    }

    pub fn bars_until_warm(&self) -> usize {
        self.warmup_bars.saturating_sub(self.bars_processed)
    }

    pub fn reset(&mut self) {
        self.bars_processed = 0;
    }
}
