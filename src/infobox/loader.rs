use std::time::Duration;

use crate::api::BenchmarkApi;
use crate::error::ClientError;
use crate::logging::{self, obj, v_num, v_str, Domain};
use crate::ui::{escape_html, Ui};

use super::{InfoBox, PANEL_ID, TOGGLE_ID};

pub const INFOBOX_CONTAINER_ID: &str = "infoBoxContainer";

const PLACEHOLDER: &str = r#"<div class="text-center"><div class="spinner-border text-primary" role="status"><span class="visually-hidden">Loading...</span></div><p>Loading project information...</p></div>"#;

const PARTIAL_NOTICE: &str = r#"<div class="alert alert-warning">
    <h4 class="alert-heading">Notice</h4>
    <p>The project information could not be loaded completely.</p>
    <hr>
    <p class="mb-0">The demo itself is not affected.</p>
</div>"#;

fn error_notice(reason: &str) -> String {
    format!(
        r#"<div class="alert alert-danger">
    <h4 class="alert-heading">Failed to load the info box</h4>
    <p>{}</p>
    <hr>
    <p class="mb-0">The demo itself is not affected.</p>
</div>"#,
        escape_html(reason)
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Fragment injected with both toggle and panel present
    Ready,
    /// Fragment injected but an expected element is missing
    Partial,
    Failed(String),
    NoContainer,
}

/// Fetches the info-box fragment and injects it into its container.
#[derive(Debug, Clone)]
pub struct InfoBoxLoader {
    path: String,
    init_delay: Duration,
}

impl InfoBoxLoader {
    pub fn new(path: impl Into<String>, init_delay: Duration) -> Self {
        Self { path: path.into(), init_delay }
    }

    /// Show the loading placeholder. `false` when there is no container.
    pub fn begin(&self, ui: &mut dyn Ui) -> bool {
        match ui.set_html(INFOBOX_CONTAINER_ID, PLACEHOLDER) {
            Ok(()) => true,
            Err(e) => {
                logging::error(Domain::InfoBox, "missing_container", obj(&[("msg", v_str(&e.to_string()))]));
                false
            }
        }
    }

    /// Replace the placeholder with the fetched fragment or a notice.
    /// Every branch overwrites the placeholder.
    pub fn finish(&self, ui: &mut dyn Ui, fetched: Result<String, ClientError>) -> LoadOutcome {
        let fragment = match fetched {
            Ok(f) => f,
            Err(err) => {
                let reason = err.to_string();
                logging::error(Domain::InfoBox, "load_failed", obj(&[("msg", v_str(&reason))]));
                let _ = ui.set_html(INFOBOX_CONTAINER_ID, &error_notice(&reason));
                return LoadOutcome::Failed(reason);
            }
        };

        if let Err(e) = ui.set_html(INFOBOX_CONTAINER_ID, &fragment) {
            return LoadOutcome::Failed(e.to_string());
        }
        logging::info(
            Domain::InfoBox,
            "loaded",
            obj(&[("path", v_str(&self.path)), ("bytes", v_num(fragment.len() as f64))]),
        );

        if ui.exists(TOGGLE_ID) && ui.exists(PANEL_ID) {
            LoadOutcome::Ready
        } else {
            logging::warn(
                Domain::InfoBox,
                "partial_load",
                obj(&[("msg", v_str("expected toggle and panel in fragment"))]),
            );
            let _ = ui.set_html(INFOBOX_CONTAINER_ID, PARTIAL_NOTICE);
            LoadOutcome::Partial
        }
    }

    /// Full load: placeholder, fetch, inject, then initialize the toggle
    /// after the configured delay.
    pub async fn load(&self, ui: &mut dyn Ui, api: &dyn BenchmarkApi, info: &mut InfoBox) -> LoadOutcome {
        if !self.begin(ui) {
            return LoadOutcome::NoContainer;
        }
        let fetched = api.fetch_fragment(&self.path).await;
        let outcome = self.finish(ui, fetched);
        if outcome == LoadOutcome::Ready {
            tokio::time::sleep(self.init_delay).await;
            info.initialize(ui);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MemoryDom;

    fn loader() -> InfoBoxLoader {
        InfoBoxLoader::new("infobox.html", Duration::from_millis(1))
    }

    #[test]
    fn test_ready_when_both_elements_present() {
        let mut ui = MemoryDom::parse(r#"<div id="infoBoxContainer"></div>"#);
        let l = loader();
        assert!(l.begin(&mut ui));
        assert!(ui.text_content(INFOBOX_CONTAINER_ID).unwrap().contains("Loading"));
        let out = l.finish(
            &mut ui,
            Ok(r#"<button id="toggleInfoButton">Show</button><div id="infoBox"></div>"#.into()),
        );
        assert_eq!(out, LoadOutcome::Ready);
        assert!(!ui.text_content(INFOBOX_CONTAINER_ID).unwrap().contains("Loading"));
    }

    #[test]
    fn test_partial_notice() {
        let mut ui = MemoryDom::parse(r#"<div id="infoBoxContainer"></div>"#);
        let l = loader();
        l.begin(&mut ui);
        let out = l.finish(&mut ui, Ok(r#"<div id="infoBox"></div>"#.into()));
        assert_eq!(out, LoadOutcome::Partial);
        let text = ui.text_content(INFOBOX_CONTAINER_ID).unwrap();
        assert!(text.contains("could not be loaded completely"));
        assert!(!ui.exists(PANEL_ID));
    }

    #[test]
    fn test_failure_notice_carries_reason() {
        let mut ui = MemoryDom::parse(r#"<div id="infoBoxContainer"></div>"#);
        let l = loader();
        l.begin(&mut ui);
        let out = l.finish(&mut ui, Err(ClientError::Http { status: 404, body: String::new() }));
        assert_eq!(out, LoadOutcome::Failed("HTTP error: 404".into()));
        let text = ui.text_content(INFOBOX_CONTAINER_ID).unwrap();
        assert!(text.contains("HTTP error: 404"));
        assert!(!text.contains("Loading"));
    }

    #[test]
    fn test_no_container() {
        let mut ui = MemoryDom::new();
        assert!(!loader().begin(&mut ui));
    }
}
