//! Bar-chart renderers for execution time, throughput and memory.
//!
//! Configs serialize to the Chart.js JSON shape so the written dashboard
//! can hand them straight to `new Chart(...)`.

use serde::Serialize;

use crate::error::UiError;
use crate::labels::label_color;
use crate::logging::{self, obj, v_num, v_str, Domain};
use crate::model::BenchmarkResult;
use crate::ui::{ChartHandle, Ui};

pub const CHART_CONTAINER_ID: &str = "chartContainer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    ExecutionTime,
    Throughput,
    Memory,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::ExecutionTime, ChartKind::Throughput, ChartKind::Memory];

    pub fn canvas_id(&self) -> &'static str {
        match self {
            ChartKind::ExecutionTime => "timeChart",
            ChartKind::Throughput => "tasksPerSecondChart",
            ChartKind::Memory => "memoryChart",
        }
    }

    fn dataset_label(&self) -> &'static str {
        match self {
            ChartKind::ExecutionTime => "Execution time (ms)",
            ChartKind::Throughput => "Tasks per second",
            ChartKind::Memory => "Memory usage (MB)",
        }
    }

    fn axis_title(&self) -> &'static str {
        match self {
            ChartKind::ExecutionTime => "Time in milliseconds (lower is better)",
            ChartKind::Throughput => "Tasks per second (higher is better)",
            ChartKind::Memory => "Memory in MB (lower is better)",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ChartKind::ExecutionTime => "Total execution time",
            ChartKind::Throughput => "Throughput (tasks per second)",
            ChartKind::Memory => "Memory usage during test",
        }
    }

    /// Bar value for one result.
    pub fn value(&self, result: &BenchmarkResult) -> f64 {
        match self {
            ChartKind::ExecutionTime => result.total_execution_time_ms,
            ChartKind::Throughput => result.throughput().map(round2).unwrap_or(0.0),
            ChartKind::Memory => result.memory_usage_mb.map(round2).unwrap_or(0.0),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub chart_type: String,
    pub data: ChartData,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub background_color: Vec<String>,
    pub border_color: Vec<String>,
    pub border_width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    pub scales: Scales,
    pub plugins: Plugins,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scales {
    pub y: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    pub begin_at_zero: bool,
    pub title: Title,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugins {
    pub title: Title,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub display: bool,
    pub text: String,
}

impl Title {
    fn shown(text: &str) -> Self {
        Self { display: true, text: text.to_string() }
    }
}

/// Bar chart config for `kind`, one bar per result keyed by thread model.
pub fn build_chart(kind: ChartKind, results: &[BenchmarkResult]) -> ChartConfig {
    let colors: Vec<_> = results.iter().map(|r| label_color(&r.thread_model)).collect();
    ChartConfig {
        chart_type: "bar".to_string(),
        data: ChartData {
            labels: results.iter().map(|r| r.thread_model.clone()).collect(),
            datasets: vec![Dataset {
                label: kind.dataset_label().to_string(),
                data: results.iter().map(|r| kind.value(r)).collect(),
                background_color: colors.iter().map(|c| c.css()).collect(),
                border_color: colors.iter().map(|c| c.opaque().css()).collect(),
                border_width: 1,
            }],
        },
        options: ChartOptions {
            scales: Scales {
                y: Axis { begin_at_zero: true, title: Title::shown(kind.axis_title()) },
            },
            plugins: Plugins { title: Title::shown(kind.title()) },
        },
    }
}

/// The three live chart instances owned by the dashboard.
#[derive(Debug, Default)]
pub struct ChartSet {
    time: Option<ChartHandle>,
    throughput: Option<ChartHandle>,
    memory: Option<ChartHandle>,
}

impl ChartSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self, kind: ChartKind) -> Option<ChartHandle> {
        match kind {
            ChartKind::ExecutionTime => self.time,
            ChartKind::Throughput => self.throughput,
            ChartKind::Memory => self.memory,
        }
    }

    fn slot(&mut self, kind: ChartKind) -> &mut Option<ChartHandle> {
        match kind {
            ChartKind::ExecutionTime => &mut self.time,
            ChartKind::Throughput => &mut self.throughput,
            ChartKind::Memory => &mut self.memory,
        }
    }

    /// Replace all three charts with ones built from `results`.
    /// An empty result set leaves the current charts in place.
    pub fn refresh(&mut self, ui: &mut dyn Ui, results: &[BenchmarkResult]) -> Result<(), UiError> {
        if results.is_empty() {
            return Ok(());
        }
        ui.set_visible(CHART_CONTAINER_ID, true)?;

        for kind in ChartKind::ALL {
            let config = build_chart(kind, results);
            if let Some(old) = self.slot(kind).take() {
                if let Err(e) = ui.destroy_chart(old) {
                    logging::warn(Domain::Chart, "destroy_failed", obj(&[("msg", v_str(&e.to_string()))]));
                }
            }
            let handle = ui.create_chart(kind.canvas_id(), config)?;
            *self.slot(kind) = Some(handle);
        }

        logging::debug(
            Domain::Chart,
            "refreshed",
            obj(&[("bars", v_num(results.len() as f64))]),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{PLATFORM_LABEL, VIRTUAL_LABEL};

    fn result(label: &str, ms: f64, mem: Option<f64>) -> BenchmarkResult {
        BenchmarkResult {
            thread_model: label.to_string(),
            test_type: None,
            matrix_size: 100,
            file_size_kb: 100,
            parallel_tasks: 10,
            total_execution_time_ms: ms,
            memory_before_mb: None,
            memory_peak_mb: None,
            memory_after_mb: None,
            memory_usage_mb: mem,
        }
    }

    #[test]
    fn test_values_per_kind() {
        let r = result(PLATFORM_LABEL, 3000.0, None);
        assert_eq!(ChartKind::ExecutionTime.value(&r), 3000.0);
        assert_eq!(ChartKind::Throughput.value(&r), 3.33);
        assert_eq!(ChartKind::Memory.value(&r), 0.0);
    }

    #[test]
    fn test_config_shape() {
        let results = vec![result(PLATFORM_LABEL, 1000.0, Some(12.346)), result(VIRTUAL_LABEL, 500.0, None)];
        let cfg = build_chart(ChartKind::Memory, &results);
        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["type"], "bar");
        assert_eq!(json["data"]["labels"][1], VIRTUAL_LABEL);
        assert_eq!(json["data"]["datasets"][0]["data"][0], 12.35);
        assert_eq!(json["data"]["datasets"][0]["data"][1], 0.0);
        assert_eq!(json["data"]["datasets"][0]["borderColor"][0], "rgba(40, 167, 69, 1)");
        assert_eq!(json["options"]["scales"]["y"]["beginAtZero"], true);
        assert_eq!(json["options"]["plugins"]["title"]["text"], "Memory usage during test");
    }
}
