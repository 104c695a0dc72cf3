// self
use crate::obs::{CallKind, CallOutcome};

/// Counter incremented once per attempt, success, and failure.
pub const CALL_COUNTER: &str = "singly_call_total";

/// Label set attached to [`CALL_COUNTER`]: operation kind, call site, and outcome.
pub fn call_labels(
	kind: CallKind,
	stage: &'static str,
	outcome: CallOutcome,
) -> [(&'static str, &'static str); 3] {
	[("call", kind.as_str()), ("stage", stage), ("outcome", outcome.as_str())]
}

/// Bumps [`CALL_COUNTER`] on the global metrics recorder. A no-op without the `metrics` feature.
pub fn record_call_outcome(kind: CallKind, stage: &'static str, outcome: CallOutcome) {
	let labels = call_labels(kind, stage, outcome);

	#[cfg(feature = "metrics")]
	{
		let labels = labels
			.into_iter()
			.map(|(key, value)| metrics::Label::new(key, value))
			.collect::<Vec<_>>();

		metrics::counter!(CALL_COUNTER, labels).increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = labels;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn labels_carry_kind_stage_and_outcome() {
		assert_eq!(
			call_labels(CallKind::Endpoint, "endpoint_range", CallOutcome::Failure),
			[("call", "endpoint"), ("stage", "endpoint_range"), ("outcome", "failure")]
		);
	}

	#[test]
	fn record_call_outcome_accepts_every_outcome() {
		for outcome in [CallOutcome::Attempt, CallOutcome::Success, CallOutcome::Failure] {
			record_call_outcome(CallKind::TokenExchange, "exchange_code", outcome);
		}
	}
}
