//! Cycle diagnostics: timing and counts for each pipeline stage.
//!
//! These are permanent instrumentation for parameter experimentation —
//! the CLI tool collects one [`CycleDiagnostics`] per run and prints it
//! as a report or as JSON.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since [`std::time::Duration`] does not implement
//! serde traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single recompute cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleDiagnostics {
    /// Stage 1: seed scattering.
    pub scatter: StageDiagnostics,
    /// Stage 2: Delaunay triangulation + Voronoi dual + clipping.
    pub tessellate: StageDiagnostics,
    /// Stage 3: per-cell color sampling.
    pub sample: StageDiagnostics,
    /// Total wall-clock duration of the cycle (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across the cycle.
    pub summary: CycleSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Seed scattering metrics.
    Scatter {
        /// Number of seed points produced.
        site_count: usize,
    },
    /// Tessellation metrics.
    Tessellate {
        /// Number of cells produced (one per seed point).
        cell_count: usize,
        /// Flagged degenerate cells (duplicate seed points).
        degenerate_cells: usize,
    },
    /// Color sampling metrics.
    Sample {
        /// Number of cells colored.
        cell_count: usize,
        /// Cells that received the neutral gray fallback.
        gray_fallbacks: usize,
    },
}

impl CycleDiagnostics {
    /// Human-readable per-stage report.
    #[must_use]
    pub fn report(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let _ = writeln!(
            out,
            "Cycle: {} sites -> {} cells ({} degenerate) over {}x{} source",
            self.summary.site_count,
            self.summary.cell_count,
            self.summary.degenerate_cells,
            self.summary.buffer_width,
            self.summary.buffer_height,
        );
        for (name, stage) in [
            ("scatter", &self.scatter),
            ("tessellate", &self.tessellate),
            ("sample", &self.sample),
        ] {
            let _ = writeln!(
                out,
                "  {name:<11} {:>9.3} ms   {}",
                stage.duration.as_secs_f64() * 1e3,
                stage.metrics.describe(),
            );
        }
        let _ = writeln!(
            out,
            "  {:<11} {:>9.3} ms",
            "total",
            self.total_duration.as_secs_f64() * 1e3,
        );
        out
    }
}

impl StageMetrics {
    /// Short textual form for the report.
    fn describe(&self) -> String {
        match *self {
            Self::Scatter { site_count } => format!("{site_count} sites"),
            Self::Tessellate {
                cell_count,
                degenerate_cells,
            } => format!("{cell_count} cells, {degenerate_cells} degenerate"),
            Self::Sample {
                cell_count,
                gray_fallbacks,
            } => format!("{cell_count} cells, {gray_fallbacks} gray fallbacks"),
        }
    }
}

/// Summary counts for a whole cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleSummary {
    /// Seed points scattered.
    pub site_count: usize,
    /// Cells in the committed mosaic.
    pub cell_count: usize,
    /// Flagged degenerate cells.
    pub degenerate_cells: usize,
    /// Source buffer width in pixels.
    pub buffer_width: u32,
    /// Source buffer height in pixels.
    pub buffer_height: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn diagnostics() -> CycleDiagnostics {
        CycleDiagnostics {
            scatter: StageDiagnostics {
                duration: Duration::from_micros(120),
                metrics: StageMetrics::Scatter { site_count: 3000 },
            },
            tessellate: StageDiagnostics {
                duration: Duration::from_millis(45),
                metrics: StageMetrics::Tessellate {
                    cell_count: 3000,
                    degenerate_cells: 1,
                },
            },
            sample: StageDiagnostics {
                duration: Duration::from_millis(6),
                metrics: StageMetrics::Sample {
                    cell_count: 3000,
                    gray_fallbacks: 1,
                },
            },
            total_duration: Duration::from_millis(52),
            summary: CycleSummary {
                site_count: 3000,
                cell_count: 3000,
                degenerate_cells: 1,
                buffer_width: 1920,
                buffer_height: 1080,
            },
        }
    }

    #[test]
    fn durations_serialize_as_fractional_seconds() {
        let json = serde_json::to_value(diagnostics()).unwrap();
        let total = json["total_duration"].as_f64().unwrap();
        assert!((total - 0.052).abs() < 1e-12);
    }

    #[test]
    fn serde_round_trip() {
        let original = diagnostics();
        let json = serde_json::to_string(&original).unwrap();
        let restored: CycleDiagnostics = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.summary.site_count, 3000);
        assert_eq!(restored.total_duration, original.total_duration);
        assert!(matches!(
            restored.tessellate.metrics,
            StageMetrics::Tessellate {
                cell_count: 3000,
                degenerate_cells: 1,
            },
        ));
    }

    #[test]
    fn negative_duration_is_rejected() {
        let result: Result<CycleDiagnostics, _> = serde_json::from_str(
            r#"{
                "scatter": {"duration": 0.0, "metrics": {"Scatter": {"site_count": 1}}},
                "tessellate": {"duration": 0.0, "metrics": {"Tessellate": {"cell_count": 1, "degenerate_cells": 0}}},
                "sample": {"duration": 0.0, "metrics": {"Sample": {"cell_count": 1, "gray_fallbacks": 0}}},
                "total_duration": -1.0,
                "summary": {"site_count": 1, "cell_count": 1, "degenerate_cells": 0, "buffer_width": 1, "buffer_height": 1}
            }"#,
        );
        assert!(result.is_err());
    }
}
