//! HTML templates for result cards and the thread statistics panel.

use crate::labels::Endpoint;
use crate::model::{BenchmarkRequest, BenchmarkResult, TestKind, ThreadSystemInfo};
use crate::ui::escape_html;

pub fn body_id(card_id: &str) -> String {
    format!("{}-body", card_id)
}

pub fn loading_id(card_id: &str) -> String {
    format!("{}-loading", card_id)
}

fn fixed2(v: f64) -> String {
    format!("{:.2}", v)
}

fn opt_fixed2(v: Option<f64>) -> String {
    v.map(fixed2).unwrap_or_else(|| "N/A".to_string())
}

/// Integral milliseconds print without a fraction, like the backend sends them.
fn millis(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        fixed2(v)
    }
}

/// New card in loading state.
pub fn loading_card(card_id: &str, endpoint: Endpoint, request: &BenchmarkRequest) -> String {
    let width = if endpoint == Endpoint::CompareAll { 12 } else { 6 };
    let kind_class = match request.test_type {
        TestKind::Cpu => "test-type-cpu",
        TestKind::Io => "test-type-io",
    };
    let mut classes = vec!["card", "result-card"];
    classes.extend(endpoint.card_class());
    classes.push(kind_class);

    let params = match request.test_type {
        TestKind::Cpu => format!("<p>Matrix: {0} x {0}</p>", request.matrix_size),
        TestKind::Io => format!("<p>File size: {} KB</p>", request.file_size_kb),
    };

    format!(
        r#"<div class="col-md-{width}">
    <div id="{id}" class="{classes}">
        <div class="card-header">
            <h5 class="mb-0">{title} ({kind})</h5>
        </div>
        <div id="{body}" class="card-body">
            {params}
            <p>Parallel tasks: {tasks}</p>
            <div id="{loading}" class="text-center">
                <div class="loading"></div>
                <p class="mt-2">Test running...</p>
            </div>
        </div>
    </div>
</div>"#,
        width = width,
        id = card_id,
        classes = classes.join(" "),
        title = endpoint.title(),
        kind = request.test_type.as_str().to_uppercase(),
        body = body_id(card_id),
        params = params,
        tasks = request.parallel_tasks,
        loading = loading_id(card_id),
    )
}

/// Detail view for a single result.
pub fn detail_view(result: &BenchmarkResult) -> String {
    let kind = result.test_type.unwrap_or(TestKind::Cpu);
    let mut html = format!(
        r#"<h5>Results:</h5>
<p><strong>Thread model:</strong> {}</p>
<p><strong>Test type:</strong> {}</p>
"#,
        escape_html(&result.thread_model),
        kind.as_str().to_uppercase(),
    );

    match kind {
        TestKind::Cpu => html.push_str(&format!(
            "<p><strong>Matrix:</strong> {0} x {0}</p>\n",
            result.matrix_size
        )),
        TestKind::Io => html.push_str(&format!(
            "<p><strong>File size:</strong> {} KB</p>\n",
            result.file_size_kb
        )),
    }

    html.push_str(&format!(
        r#"<p><strong>Parallel tasks:</strong> {}</p>
<p><strong>Total execution time:</strong> {} ms</p>
<p><strong>Average time per task:</strong> {} ms</p>
<p><strong>Tasks per second:</strong> {}</p>
"#,
        result.parallel_tasks,
        millis(result.total_execution_time_ms),
        opt_fixed2(result.average_time_per_task()),
        opt_fixed2(result.throughput()),
    ));

    if let Some(before) = result.memory_before_mb {
        html.push_str(&format!(
            r#"<p><strong>Memory (start):</strong> {} MB</p>
<p><strong>Memory (peak):</strong> {} MB</p>
<p><strong>Memory (end):</strong> {} MB</p>
<p><strong>Memory used during test:</strong> {} MB</p>
"#,
            fixed2(before),
            opt_fixed2(result.memory_peak_mb),
            opt_fixed2(result.memory_after_mb),
            opt_fixed2(result.memory_usage_mb),
        ));
    }
    html
}

/// Comparison table, one row per result in input order.
pub fn comparison_table(results: &[BenchmarkResult]) -> String {
    let mut html = String::from(
        r#"<div class="table-responsive"><table class="table table-striped"><thead><tr><th>Thread model</th><th>Execution time (ms)</th><th>Tasks/second</th><th>Memory usage (MB)</th></tr></thead><tbody>"#,
    );
    for r in results {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&r.thread_model),
            millis(r.total_execution_time_ms),
            opt_fixed2(r.throughput()),
            opt_fixed2(r.memory_usage_mb),
        ));
    }
    html.push_str("</tbody></table></div>");
    html
}

pub fn error_notice(reason: &str) -> String {
    format!(
        r#"<div class="alert alert-danger mt-3">Request failed: {}</div>"#,
        escape_html(reason)
    )
}

pub fn thread_info_panel(info: &ThreadSystemInfo) -> String {
    let blocked = info.thread_details.iter().filter(|t| t.blocked).count();
    let mut html = format!(
        r#"<div class="card"><div class="card-header"><h5 class="mb-0">JVM threads</h5></div><div class="card-body">
<p><strong>Current:</strong> {} (peak {}, daemon {})</p>
<p><strong>Started since boot:</strong> {}</p>
<p><strong>Waiting or blocked:</strong> {}</p>
<table class="table table-sm"><thead><tr><th>Group</th><th>Threads</th></tr></thead><tbody>"#,
        info.current_thread_count,
        info.peak_thread_count,
        info.daemon_thread_count,
        info.total_started_thread_count,
        blocked,
    );
    // BTreeMap iterates sorted by group name
    for (group, count) in &info.thread_group_stats {
        html.push_str(&format!("<tr><td>{}</td><td>{}</td></tr>", escape_html(group), count));
    }
    html.push_str("</tbody></table></div></div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::VIRTUAL_LABEL;

    fn sample() -> BenchmarkResult {
        BenchmarkResult {
            thread_model: VIRTUAL_LABEL.to_string(),
            test_type: Some(TestKind::Io),
            matrix_size: 100,
            file_size_kb: 512,
            parallel_tasks: 20,
            total_execution_time_ms: 4000.0,
            memory_before_mb: Some(50.0),
            memory_peak_mb: Some(80.5),
            memory_after_mb: None,
            memory_usage_mb: None,
        }
    }

    #[test]
    fn test_detail_view_io() {
        let html = detail_view(&sample());
        assert!(html.contains("<strong>Test type:</strong> IO"));
        assert!(html.contains("<strong>File size:</strong> 512 KB"));
        assert!(!html.contains("Matrix"));
        assert!(html.contains("<strong>Total execution time:</strong> 4000 ms"));
        assert!(html.contains("<strong>Average time per task:</strong> 200.00 ms"));
        assert!(html.contains("<strong>Tasks per second:</strong> 5.00"));
        assert!(html.contains("<strong>Memory (peak):</strong> 80.50 MB"));
        assert!(html.contains("<strong>Memory used during test:</strong> N/A MB"));
    }

    #[test]
    fn test_detail_view_without_memory_block() {
        let mut r = sample();
        r.memory_before_mb = None;
        r.test_type = None;
        let html = detail_view(&r);
        assert!(html.contains("<strong>Test type:</strong> CPU"));
        assert!(html.contains("<strong>Matrix:</strong> 100 x 100"));
        assert!(!html.contains("Memory"));
    }

    #[test]
    fn test_labels_escaped() {
        let mut r = sample();
        r.thread_model = "<script>".into();
        assert!(comparison_table(&[r]).contains("&lt;script&gt;"));
    }

    #[test]
    fn test_loading_card_classes() {
        let req = BenchmarkRequest::cpu(150, 4).unwrap();
        let html = loading_card("result-x-1", Endpoint::CompareAll, &req);
        assert!(html.contains(r#"class="col-md-12""#));
        assert!(html.contains(r#"class="card result-card test-type-cpu""#));
        assert!(html.contains("Comparison of all thread models (CPU)"));
        assert!(html.contains("Matrix: 150 x 150"));

        let html = loading_card("result-x-2", Endpoint::Limited, &req);
        assert!(html.contains("card result-card thread-model-limited test-type-cpu"));
    }
}
