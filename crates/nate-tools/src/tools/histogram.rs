use std::sync::Arc;

use async_trait::async_trait;
use nate_ai::{ParamSpec, Tool, ToolArgs, ToolOutput, ToolSpec};
use nate_common::ToolError;
use nate_data::histogram::MAX_BINS;
use nate_data::{ArtifactStore, Histogram};

use crate::plot::PlotSink;

const DEFAULT_BINS: i64 = 10;

/// Histogram of one numeric or date column, sent to the plot sink.
pub struct PlotHistogram {
    spec: ToolSpec,
    sink: Arc<dyn PlotSink>,
}

impl PlotHistogram {
    pub fn new(sink: Arc<dyn PlotSink>) -> Self {
        let spec = ToolSpec::new(
            "plot_histogram",
            "Plot a histogram of a numeric or date column of a stored table and show it to the \
             user. Returns a short description of the bins.",
        )
        .param(ParamSpec::string("artifact", "Name of the table").required())
        .param(ParamSpec::string("column", "Column to plot").required())
        .param(ParamSpec::integer(
            "bins",
            format!("Number of bins (1-{MAX_BINS}, default {DEFAULT_BINS})"),
        ));
        Self { spec, sink }
    }
}

#[async_trait]
impl Tool for PlotHistogram {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, store: &ArtifactStore, args: &ToolArgs) -> Result<ToolOutput, ToolError> {
        let artifact = store.require(args.required_str("artifact")?)?;
        let column_name = args.required_str("column")?;
        let column = artifact
            .table()
            .column(column_name)
            .ok_or_else(|| ToolError::UnknownColumn(vec![column_name.to_string()]))?;

        let bins = args.i64("bins")?.unwrap_or(DEFAULT_BINS);
        let bins = usize::try_from(bins).map_err(|_| ToolError::InvalidArgument {
            name: "bins".into(),
            reason: format!("bins = {bins} is out of range [1, {MAX_BINS}]"),
        })?;
        let title = format!("{} / {}", artifact.name(), column_name);
        let histogram = Histogram::from_column(title, column, bins)?;

        self.sink.plot(&histogram);

        let fullest = histogram
            .bins
            .iter()
            .max_by_key(|b| b.count)
            .map(|b| {
                format!(
                    "; the fullest bin is {} to {} with {} values",
                    histogram.label(b.lower),
                    histogram.label(b.upper),
                    b.count
                )
            })
            .unwrap_or_default();
        Ok(ToolOutput::text(format!(
            "Plotted a histogram of {} values of '{}' from {} in {} bins{}.",
            histogram.total,
            column_name,
            artifact.name(),
            histogram.bins.len(),
            fullest
        )))
    }
}
