use crate::domain::model::Direction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the summarised results came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    Computed,
    Precomputed,
}

impl fmt::Display for ResultSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultSource::Computed => f.write_str("computed"),
            ResultSource::Precomputed => f.write_str("precomputed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionCount {
    pub orientation: Direction,
    pub count: usize,
    /// Share of all results, 0..=100.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub source: ResultSource,
    pub total: usize,
    pub known: usize,
    pub unknown: usize,
    /// `known / total`, or 0.0 for an empty run.
    pub success_rate: f64,
    /// `unknown / total`, or 0.0 for an empty run.
    pub unknown_rate: f64,
    pub imputed: usize,
    /// One entry per label in `Direction::ALL` order, zero counts included.
    pub directions: Vec<DirectionCount>,
}

impl Summary {
    pub fn count(&self, direction: Direction) -> usize {
        self.directions
            .iter()
            .find(|d| d.orientation == direction)
            .map(|d| d.count)
            .unwrap_or(0)
    }

    /// Distribution table in the layout printed at the end of a run.
    pub fn render_table(&self) -> String {
        let mut out = String::from("ORIENTATION DISTRIBUTION:\n");
        for entry in &self.directions {
            out.push_str(&format!(
                "  {:<7} {:>6} properties ({:5.1}%)\n",
                entry.orientation.label(),
                entry.count,
                entry.percentage
            ));
        }
        out.push_str(&format!("\nTotal: {} ({})\n", self.total, self.source));
        out.push_str(&format!(
            "SUCCESS: {:.1}% of properties have orientation data\n",
            self.success_rate * 100.0
        ));
        out.push_str(&format!("Remaining unknowns: {:.1}%", self.unknown_rate * 100.0));
        if self.imputed > 0 {
            out.push_str(&format!("\nImputed: {}", self.imputed));
        }
        out
    }
}
