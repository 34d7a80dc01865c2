//! Page skeleton and final document rendering.

use std::path::Path;

use crate::charts::CHART_CONTAINER_ID;
use crate::dashboard::form::{CPU_PANE_ID, CPU_RADIO_ID, IO_PANE_ID, IO_RADIO_ID};
use crate::dashboard::{RESULTS_CONTAINER_ID, THREAD_INFO_CONTAINER_ID};
use crate::infobox::INFOBOX_CONTAINER_ID;
use crate::labels::Endpoint;
use crate::model::TestKind;
use crate::ui::{escape_html, MemoryDom};

pub const HEAVY_LOAD_SWITCH_ID: &str = "heavyLoadSwitch";
const CHART_JS_SRC: &str = "https://cdn.jsdelivr.net/npm/chart.js";
const BOOTSTRAP_CSS: &str = "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css";

/// Initial values of the form controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormDefaults {
    pub kind: TestKind,
    pub matrix_size: u32,
    pub parallel_tasks: u32,
    pub file_size_kb: u32,
    pub io_parallel_tasks: u32,
}

fn slider(id: &str, label: &str, min: u32, max: u32, step: u32, value: u32) -> String {
    format!(
        r#"<div class="mb-3">
        <label for="{id}" class="form-label">{label}: <span id="{id}Value"></span></label>
        <input type="range" class="form-range" id="{id}" min="{min}" max="{max}" step="{step}" value="{value}">
    </div>"#
    )
}

fn button(endpoint: Endpoint, style: &str) -> String {
    format!(
        r#"<button id="{}" class="btn {} me-2 mb-2">{}</button>"#,
        endpoint.button_id(),
        style,
        endpoint.title()
    )
}

/// Body markup of a fresh dashboard.
pub fn skeleton(d: &FormDefaults) -> String {
    let (cpu_checked, io_checked) = match d.kind {
        TestKind::Cpu => (" checked", ""),
        TestKind::Io => ("", " checked"),
    };
    let (cpu_style, io_style) = match d.kind {
        TestKind::Cpu => ("", r#" style="display: none""#),
        TestKind::Io => (r#" style="display: none""#, ""),
    };

    format!(
        r#"<div class="container py-4">
<h1 class="mb-4">Thread model comparison</h1>
<div id="{infobox}" class="mb-4"></div>
<div class="card mb-4"><div class="card-body">
    <div class="mb-3">
        <input class="form-check-input" type="radio" name="testType" id="{cpu_radio}" value="cpu"{cpu_checked}>
        <label class="form-check-label me-3" for="{cpu_radio}">CPU-bound</label>
        <input class="form-check-input" type="radio" name="testType" id="{io_radio}" value="io"{io_checked}>
        <label class="form-check-label" for="{io_radio}">I/O-bound</label>
    </div>
    <div id="{cpu_pane}"{cpu_style}>
    {matrix}
    {tasks}
    </div>
    <div id="{io_pane}"{io_style}>
    {file}
    {io_tasks}
    </div>
    <div class="form-check form-switch mb-3">
        <input class="form-check-input" type="checkbox" id="{heavy}">
        <label class="form-check-label" for="{heavy}">Additional system load</label>
    </div>
    {b_all}{b_platform}{b_virtual}{b_limited}{b_optimized}
</div></div>
<div id="{results}" class="row"></div>
<div id="{charts}" class="row mt-4" style="display: none">
    <div class="col-md-4"><canvas id="timeChart"></canvas></div>
    <div class="col-md-4"><canvas id="tasksPerSecondChart"></canvas></div>
    <div class="col-md-4"><canvas id="memoryChart"></canvas></div>
</div>
<div id="{threads}" class="mt-4"></div>
</div>"#,
        infobox = INFOBOX_CONTAINER_ID,
        cpu_radio = CPU_RADIO_ID,
        io_radio = IO_RADIO_ID,
        cpu_checked = cpu_checked,
        io_checked = io_checked,
        cpu_pane = CPU_PANE_ID,
        io_pane = IO_PANE_ID,
        cpu_style = cpu_style,
        io_style = io_style,
        matrix = slider("matrixSize", "Matrix size", 50, 1000, 50, d.matrix_size),
        tasks = slider("parallelTasks", "Parallel tasks", 1, 200, 1, d.parallel_tasks),
        file = slider("fileSizeKB", "File size", 10, 10240, 10, d.file_size_kb),
        io_tasks = slider("ioParallelTasks", "Parallel tasks", 1, 1000, 1, d.io_parallel_tasks),
        heavy = HEAVY_LOAD_SWITCH_ID,
        b_all = button(Endpoint::CompareAll, "btn-primary"),
        b_platform = button(Endpoint::Platform, "btn-outline-success"),
        b_virtual = button(Endpoint::Virtual, "btn-outline-primary"),
        b_limited = button(Endpoint::Limited, "btn-outline-warning"),
        b_optimized = button(Endpoint::Optimized, "btn-outline-danger"),
        results = RESULTS_CONTAINER_ID,
        charts = CHART_CONTAINER_ID,
        threads = THREAD_INFO_CONTAINER_ID,
    )
}

/// Standalone HTML document: the current body plus a script that
/// recreates every live chart.
pub fn render_document(dom: &MemoryDom, title: &str) -> String {
    let mut charts = String::new();
    for (_, chart) in dom.live_charts() {
        let config = serde_json::to_string(&chart.config)
            .unwrap_or_else(|_| "{}".to_string())
            .replace("</", "<\\/");
        charts.push_str(&format!(
            "new Chart(document.getElementById(\"{}\"), {});\n",
            chart.canvas_id, config
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<link rel="stylesheet" href="{css}">
<script src="{chartjs}"></script>
</head>
<body>
{body}
<script>
{charts}</script>
</body>
</html>
"#,
        title = escape_html(title),
        css = BOOTSTRAP_CSS,
        chartjs = CHART_JS_SRC,
        body = dom.to_html(),
        charts = charts,
    )
}

/// Write the rendered document to `path`, creating parent directories.
pub fn write_document(path: &Path, dom: &MemoryDom, title: &str) -> std::io::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, render_document(dom, title))
}
