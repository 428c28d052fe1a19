use std::collections::BTreeMap;

/// Token usage counters reported by a backend.
///
/// Every counter is optional. When two usage values are added, a counter that
/// is missing on one side contributes 0, and a counter missing on both sides
/// stays missing.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UsageDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_tokens: Option<u64>,
    /// Backend-specific counters, summed per key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_counts: BTreeMap<String, i64>,
}

impl UsageDetails {
    /// Usage with input and output counters set and the total derived from them.
    pub fn tokens(input: u64, output: u64) -> Self {
        Self {
            input_tokens: Some(input),
            output_tokens: Some(output),
            total_tokens: Some(input.saturating_add(output)),
            ..Self::default()
        }
    }

    /// Adds `other` into `self` field by field.
    pub fn add(&mut self, other: &UsageDetails) {
        add_counter(&mut self.input_tokens, other.input_tokens);
        add_counter(&mut self.output_tokens, other.output_tokens);
        add_counter(&mut self.total_tokens, other.total_tokens);
        add_counter(&mut self.cached_input_tokens, other.cached_input_tokens);
        add_counter(&mut self.reasoning_tokens, other.reasoning_tokens);
        for (key, value) in &other.additional_counts {
            let slot = self.additional_counts.entry(key.clone()).or_insert(0);
            *slot = slot.saturating_add(*value);
        }
    }

    /// True when no counter has ever been reported.
    pub fn is_empty(&self) -> bool {
        self.input_tokens.is_none()
            && self.output_tokens.is_none()
            && self.total_tokens.is_none()
            && self.cached_input_tokens.is_none()
            && self.reasoning_tokens.is_none()
            && self.additional_counts.is_empty()
    }
}

fn add_counter(total: &mut Option<u64>, incoming: Option<u64>) {
    *total = match (*total, incoming) {
        (None, None) => None,
        (current, incoming) => Some(current.unwrap_or(0).saturating_add(incoming.unwrap_or(0))),
    };
}
