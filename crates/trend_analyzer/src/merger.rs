use common::{PartialResult, TrendResult};

/// Folds per-batch results into the crawl's trend.
///
/// Summaries are joined line by line in batch order, skipping blank and failed
/// ones. The sentiment is the first batch's, even when its summary was unusable;
/// there is no vote.
pub fn merge(results: &[PartialResult]) -> TrendResult {
    let usable: Vec<&PartialResult> = results
        .iter()
        .filter(|r| !r.is_failed() && !r.summary.trim().is_empty())
        .collect();

    if usable.is_empty() {
        return TrendResult::failed();
    }

    let summary = usable
        .iter()
        .map(|r| r.summary.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let sentiment = results.first().map(|r| r.sentiment).unwrap_or_default();

    TrendResult { summary, sentiment }
}
