//! Persona labeling of cluster centroids and per-persona engagement strategies

use crate::model::{Centroid, ClusterModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    GreaterThan,
    LessThan,
}

/// A single inequality on a centroid's feature average.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Condition {
    pub feature: &'static str,
    pub comparison: Comparison,
    pub threshold: f64,
}

impl Condition {
    const fn gt(feature: &'static str, threshold: f64) -> Self {
        Self {
            feature,
            comparison: Comparison::GreaterThan,
            threshold,
        }
    }

    const fn lt(feature: &'static str, threshold: f64) -> Self {
        Self {
            feature,
            comparison: Comparison::LessThan,
            threshold,
        }
    }

    /// A centroid without the feature never satisfies the condition.
    pub fn matches(&self, centroid: &Centroid) -> bool {
        match centroid.get(self.feature) {
            Some(value) => match self.comparison {
                Comparison::GreaterThan => value > self.threshold,
                Comparison::LessThan => value < self.threshold,
            },
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PersonaRule {
    pub label: &'static str,
    pub conditions: &'static [Condition],
}

impl PersonaRule {
    pub fn matches(&self, centroid: &Centroid) -> bool {
        self.conditions.iter().all(|c| c.matches(centroid))
    }
}

/// Rules are evaluated in order; the first match names the persona.
pub const PERSONA_RULES: [PersonaRule; 3] = [
    PersonaRule {
        label: "Developers (API-Centric)",
        conditions: &[
            Condition::gt("api_calls_monthly", 200.0),
            Condition::lt("login_frequency_weekly", 3.0),
        ],
    },
    PersonaRule {
        label: "E-commerce Business Owners",
        conditions: &[
            Condition::gt("images_generated_monthly", 100.0),
            Condition::gt("templates_used_monthly", 15.0),
        ],
    },
    PersonaRule {
        label: "Marketing Agencies",
        conditions: &[
            Condition::gt("images_generated_monthly", 50.0),
            Condition::gt("custom_generation_minutes_monthly", 30.0),
        ],
    },
];

pub fn label_centroid(centroid: &Centroid) -> String {
    PERSONA_RULES
        .iter()
        .find(|rule| rule.matches(centroid))
        .map(|rule| rule.label.to_string())
        .unwrap_or_else(|| format!("Unidentified Cluster {}", centroid.cluster))
}

/// Persona label per cluster, indexed by cluster id.
pub fn label_clusters(model: &ClusterModel) -> Vec<String> {
    model
        .centroids_original()
        .iter()
        .map(label_centroid)
        .collect()
}

pub fn strategy_for(label: &str) -> &'static str {
    if label.contains("Developers") {
        "Focus on API documentation, SDKs, webhook integrations, and developer community support. Promote new API features."
    } else if label.contains("E-commerce") {
        "Emphasize bulk image generation, product photo editing tools, brand kit consistency, and e-commerce platform integrations. Offer templates for product listings."
    } else if label.contains("Marketing Agencies") {
        "Highlight team collaboration features, client management tools, diverse creative templates, and advanced customization options. Showcase portfolio-building features."
    } else {
        "Further investigation needed to define this cluster's specific needs and propose tailored engagement."
    }
}
