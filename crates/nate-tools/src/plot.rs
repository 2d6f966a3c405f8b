//! Histogram sinks.

use std::io::Write;
use std::sync::Mutex;

use nate_data::Histogram;
use tracing::warn;

/// Receives finished histograms. Fire-and-forget: failures are logged,
/// never reported to the model.
pub trait PlotSink: Send + Sync {
    fn plot(&self, histogram: &Histogram);
}

/// Draws histograms as text bar charts.
pub struct TextPlotSink {
    out: Mutex<Box<dyn Write + Send>>,
    bar_width: usize,
}

impl TextPlotSink {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            bar_width: 40,
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    pub fn with_bar_width(mut self, width: usize) -> Self {
        self.bar_width = width.max(1);
        self
    }
}

impl PlotSink for TextPlotSink {
    fn plot(&self, histogram: &Histogram) {
        let chart = histogram.render_text(self.bar_width);
        let Ok(mut out) = self.out.lock() else {
            warn!("Plot output lock poisoned; dropping histogram");
            return;
        };
        if let Err(e) = writeln!(out, "\n{chart}\n").and_then(|_| out.flush()) {
            warn!(error = %e, "Failed to write histogram");
        }
    }
}
