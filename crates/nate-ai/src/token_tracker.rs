//! Token usage accounting across gateway calls.

use std::collections::BTreeMap;

use crate::TokenUsage;

/// Cumulative token usage, overall and per provider. Informational only.
#[derive(Debug, Clone, Default)]
pub struct TokenTracker {
    total: TokenUsage,
    by_provider: BTreeMap<String, TokenUsage>,
    call_count: u64,
}

impl TokenTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record token usage from one gateway call.
    pub fn record(&mut self, provider: &str, usage: &TokenUsage) {
        self.total.add(usage);
        self.call_count += 1;
        self.by_provider
            .entry(provider.to_string())
            .or_default()
            .add(usage);
    }

    pub fn total(&self) -> &TokenUsage {
        &self.total
    }

    pub fn for_provider(&self, provider: &str) -> Option<&TokenUsage> {
        self.by_provider.get(provider)
    }

    pub fn call_count(&self) -> u64 {
        self.call_count
    }

    /// One line per provider plus a total, for the REPL's `/usage` command.
    pub fn report(&self) -> String {
        let mut lines: Vec<String> = self
            .by_provider
            .iter()
            .map(|(provider, usage)| format_usage(provider, usage))
            .collect();
        lines.push(format!(
            "{} ({} calls)",
            format_usage("total", &self.total),
            self.call_count
        ));
        lines.join("\n")
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn format_usage(label: &str, usage: &TokenUsage) -> String {
    format!(
        "{label}: {} input + {} output = {} tokens",
        usage.input_tokens, usage.output_tokens, usage.total_tokens
    )
}
