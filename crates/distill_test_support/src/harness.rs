//! Run a distiller over a chunk plan and compare against the single-shot
//! result.

use std::sync::Arc;

use distill::{Distiller, DistillerConfig, HtmlFilter, ParseOutcome, distill};

use crate::chunker::ChunkPlan;

pub fn run_single(input: &str, config: &DistillerConfig, filter: Arc<dyn HtmlFilter>) -> String {
    distill(input, config, filter)
}

/// Feed `input` chunk by chunk through an incremental parse.
pub fn run_chunked(
    input: &str,
    plan: &ChunkPlan,
    config: &DistillerConfig,
    filter: Arc<dyn HtmlFilter>,
) -> String {
    let mut distiller = Distiller::new(filter);
    *distiller.config_mut() = config.clone();
    distiller.begin_incremental_parsing();
    for chunk in plan.apply(input) {
        distiller.append_source(chunk);
        let _ = distiller.parse();
    }
    distiller.end_incremental_parsing();
    assert_eq!(distiller.parse(), ParseOutcome::Complete);
    distiller.take_output()
}

/// Assert single-shot and chunked runs agree for every given plan.
pub fn assert_chunked_equivalence(
    input: &str,
    plans: &[crate::chunker::ChunkPlanCase],
    config: &DistillerConfig,
    filter: Arc<dyn HtmlFilter>,
) {
    let expected = run_single(input, config, Arc::clone(&filter));
    for case in plans {
        let actual = run_chunked(input, &case.plan, config, Arc::clone(&filter));
        assert_eq!(
            actual, expected,
            "chunked output diverged for input {:?} under plan {}",
            input, case.label
        );
    }
}
