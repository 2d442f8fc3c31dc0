//! Cost estimation for usage events
//!
//! Pricing tables live outside this crate. The stream only needs something
//! that turns a model id and token counts into a dollar amount.

use crate::types::Usage;

/// Estimates the cost of a response from its token usage
pub trait CostEstimator: Send + Sync {
    /// Cost in USD, or `None` when the model has no known price
    fn estimate(&self, model: &str, usage: &Usage) -> Option<f64>;
}

/// Estimator for callers without pricing data
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPricing;

impl CostEstimator for NoPricing {
    fn estimate(&self, _model: &str, _usage: &Usage) -> Option<f64> {
        None
    }
}

/// Single per-million-token rate for every model
///
/// Thinking tokens are billed at the output rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatRate {
    /// USD per million input tokens
    pub input_per_mtok: f64,
    /// USD per million output tokens
    pub output_per_mtok: f64,
}

impl FlatRate {
    /// Rate from input and output prices per million tokens
    pub const fn new(input_per_mtok: f64, output_per_mtok: f64) -> Self {
        Self {
            input_per_mtok,
            output_per_mtok,
        }
    }
}

impl CostEstimator for FlatRate {
    fn estimate(&self, _model: &str, usage: &Usage) -> Option<f64> {
        let output_tokens = usage.output_tokens + usage.reasoning_tokens.unwrap_or(0);
        let input_cost = (f64::from(usage.input_tokens) / 1_000_000.0) * self.input_per_mtok;
        let output_cost = (f64::from(output_tokens) / 1_000_000.0) * self.output_per_mtok;
        Some(input_cost + output_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(input: u32, output: u32, reasoning: Option<u32>) -> Usage {
        Usage {
            input_tokens: input,
            output_tokens: output,
            reasoning_tokens: reasoning,
            ..Usage::default()
        }
    }

    #[test]
    fn flat_rate_prices_input_and_output() {
        let rate = FlatRate::new(1.0, 2.0);
        let cost = rate.estimate("gemini-2.5-pro", &usage(1_000_000, 500_000, None)).unwrap();
        assert!((cost - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reasoning_tokens_bill_at_output_rate() {
        let rate = FlatRate::new(0.0, 10.0);
        let cost = rate.estimate("gemini-2.5-pro", &usage(0, 100_000, Some(100_000))).unwrap();
        assert!((cost - 2.0).abs() < 1e-9);
    }

    #[test]
    fn no_pricing_yields_none() {
        assert_eq!(NoPricing.estimate("any", &usage(10, 5, None)), None);
    }
}
