use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family, gauge::Gauge, histogram::Histogram},
    registry::{Registry, Unit},
};
use tokio::time::Duration;

#[derive(Clone, Debug)]
pub struct SynthesisMetrics {
    passes: Family<PassLabels, Counter>,
    pass_duration: Histogram,
    side_files: Gauge,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct PassLabels {
    result: String,
}

// === impl SynthesisMetrics ===

impl SynthesisMetrics {
    pub fn register(prom: &mut Registry) -> Self {
        let passes = Family::default();
        prom.register(
            "passes",
            "Count of synthesis passes by result",
            passes.clone(),
        );

        let pass_duration = Histogram::new([0.001, 0.01, 0.1, 1.0, 10.0].into_iter());
        prom.register_with_unit(
            "pass_duration",
            "Time taken by a synthesis pass",
            Unit::Seconds,
            pass_duration.clone(),
        );

        let side_files = Gauge::default();
        prom.register(
            "side_files",
            "Number of side files produced by the last successful pass",
            side_files.clone(),
        );

        Self {
            passes,
            pass_duration,
            side_files,
        }
    }

    pub(crate) fn pass(&self, result: &'static str, elapsed: Duration) {
        self.passes
            .get_or_create(&PassLabels {
                result: result.to_string(),
            })
            .inc();
        self.pass_duration.observe(elapsed.as_secs_f64());
    }

    pub(crate) fn set_side_files(&self, count: usize) {
        self.side_files.set(i64::try_from(count).unwrap_or(i64::MAX));
    }
}
