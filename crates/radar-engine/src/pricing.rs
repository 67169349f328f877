//! Model pricing and per-call cost calculation.
//!
//! Built-in rates are DashScope international pricing, USD per million
//! tokens. Lookup is by exact model name; unknown models cost nothing.

use std::collections::BTreeMap;

use radar_types::TokenUsage;
use serde::{Deserialize, Serialize};

/// Per-model pricing in USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    pub input_per_mtok: f64,
    pub output_per_mtok: f64,
}

impl ModelPricing {
    pub const fn new(input_per_mtok: f64, output_per_mtok: f64) -> Self {
        Self {
            input_per_mtok,
            output_per_mtok,
        }
    }

    pub fn cost(&self, usage: &TokenUsage) -> f64 {
        usage.input_tokens as f64 * self.input_per_mtok / 1_000_000.0
            + usage.output_tokens as f64 * self.output_per_mtok / 1_000_000.0
    }
}

const BUILTIN_RATES: &[(&str, ModelPricing)] = &[
    ("qwen-max", ModelPricing::new(1.20, 6.00)),
    ("qwen-plus", ModelPricing::new(0.40, 1.20)),
    ("qwen-plus-latest", ModelPricing::new(0.40, 1.20)),
    ("qwen-turbo", ModelPricing::new(0.05, 0.20)),
    ("qwen-flash", ModelPricing::new(0.05, 0.40)),
    ("qwen3.5-plus", ModelPricing::new(0.40, 2.40)),
];

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PricingTable {
    #[serde(default)]
    pub models: BTreeMap<String, ModelPricing>,
}

impl PricingTable {
    pub fn builtin() -> Self {
        Self {
            models: BUILTIN_RATES
                .iter()
                .map(|(name, pricing)| (name.to_string(), *pricing))
                .collect(),
        }
    }

    /// Layer `overrides` on top of this table; overriding entries win.
    pub fn merged(mut self, overrides: &PricingTable) -> Self {
        for (name, pricing) in &overrides.models {
            self.models.insert(name.clone(), *pricing);
        }
        self
    }

    pub fn get(&self, model: &str) -> Option<ModelPricing> {
        self.models.get(model).copied()
    }

    pub fn cost(&self, model: &str, usage: &TokenUsage) -> f64 {
        self.get(model)
            .map(|pricing| pricing.cost(usage))
            .unwrap_or(0.0)
    }
}
