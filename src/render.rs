//! Decorations handed to the rendering sink
//!
//! A pass with no metrics produces [`Decorations::Clear`], never an empty
//! [`Decorations::Paint`]: the sink must remove what it drew for the previous
//! pass rather than draw nothing on top of it.

use crate::config::Config;
use crate::metrics::classify;
use crate::models::{Category, FunctionMetric, Position, Range};
use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::{notification::Notification, Url};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Decorations {
    /// Remove every decoration for the document.
    Clear,
    /// Replace the document's decorations with these.
    Paint {
        highlights: Highlights,
        labels: Vec<Label>,
    },
}

/// Full function ranges partitioned by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlights {
    pub low: Vec<Range>,
    pub medium: Vec<Range>,
    pub high: Vec<Range>,
}

impl Highlights {
    fn bucket_mut(&mut self, category: Category) -> &mut Vec<Range> {
        match category {
            Category::Low => &mut self.low,
            Category::Medium => &mut self.medium,
            Category::High => &mut self.high,
        }
    }
}

/// Inline annotation anchored at the end of a signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub position: Position,
    pub text: String,
    pub color: String,
    pub category: Category,
    pub loc: u32,
}

impl Decorations {
    pub fn from_metrics(metrics: &[FunctionMetric], config: &Config) -> Self {
        if metrics.is_empty() {
            return Decorations::Clear;
        }

        let mut highlights = Highlights::default();
        let mut labels = Vec::new();
        for metric in metrics {
            let category = classify(metric.loc);
            if config.display.highlight {
                highlights.bucket_mut(category).push(metric.range);
            }
            if config.display.labels {
                labels.push(Label {
                    position: metric.signature_position,
                    text: config.label(metric.loc),
                    color: config.colors.for_category(category).to_string(),
                    category,
                    loc: metric.loc,
                });
            }
        }

        Decorations::Paint { highlights, labels }
    }

    pub fn is_clear(&self) -> bool {
        matches!(self, Decorations::Clear)
    }

    pub fn labels(&self) -> &[Label] {
        match self {
            Decorations::Clear => &[],
            Decorations::Paint { labels, .. } => labels,
        }
    }
}

/// Params of the `funcloc/decorations` notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecorationsParams {
    pub uri: Url,
    pub version: i32,
    pub decorations: Decorations,
}

/// Server → client notification carrying a document's decorations.
pub enum DecorationsNotification {}

impl Notification for DecorationsNotification {
    type Params = DecorationsParams;
    const METHOD: &'static str = "funcloc/decorations";
}
