//! Event routing between the document and the components.
//!
//! The app owns the document and every component. UI events are fed in
//! through [`App::dispatch`]; synchronous behavior runs immediately and
//! anything needing the network comes back as an [`Effect`]. Effects run
//! concurrently on the calling task and their completions are applied in
//! arrival order.

use std::path::Path;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;
use futures_util::{FutureExt, StreamExt};

use crate::api::BenchmarkApi;
use crate::config::Config;
use crate::dashboard::form::{show_pane, Slider, CPU_RADIO_ID, IO_RADIO_ID};
use crate::dashboard::{CardState, Dashboard, Submission};
use crate::error::{ClientError, ConfigError, UiError};
use crate::infobox::{InfoBox, InfoBoxLoader, LoadOutcome, TOGGLE_ID};
use crate::labels::Endpoint;
use crate::logging::{self, obj, v_num, v_str, Domain};
use crate::model::{BenchmarkResponse, TestKind};
use crate::page::{self, FormDefaults, HEAVY_LOAD_SWITCH_ID};
use crate::ui::{EventKind, Listener, MemoryDom, Ui};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Run(Submission),
    HeavyLoad(bool),
}

enum Completion {
    Run(Submission, Result<BenchmarkResponse, ClientError>),
    HeavyLoad(bool, Result<String, ClientError>),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub populated: usize,
    pub failed: usize,
}

pub struct App {
    ui: MemoryDom,
    dashboard: Dashboard,
    infobox: InfoBox,
    loader: InfoBoxLoader,
    api: Arc<dyn BenchmarkApi>,
}

fn radio_for(kind: TestKind) -> &'static str {
    match kind {
        TestKind::Cpu => CPU_RADIO_ID,
        TestKind::Io => IO_RADIO_ID,
    }
}

impl App {
    pub fn new(api: Arc<dyn BenchmarkApi>, config: &Config) -> Result<Self, ConfigError> {
        let defaults = FormDefaults {
            kind: config.test_kind()?,
            matrix_size: config.matrix_size,
            parallel_tasks: config.parallel_tasks,
            file_size_kb: config.file_size_kb,
            io_parallel_tasks: config.io_parallel_tasks,
        };
        let mut app = Self {
            ui: MemoryDom::parse(&page::skeleton(&defaults)),
            dashboard: Dashboard::new(),
            infobox: InfoBox::new(),
            loader: InfoBoxLoader::new(config.infobox_path.clone(), config.infobox_delay()),
            api,
        };
        if let Err(e) = app.wire_controls() {
            logging::error(Domain::Form, "wire_failed", obj(&[("msg", v_str(&e.to_string()))]));
        }
        // the info box may already be part of the page
        if app.ui.exists(TOGGLE_ID) {
            app.infobox.initialize(&mut app.ui);
        }
        Ok(app)
    }

    fn wire_controls(&mut self) -> Result<(), UiError> {
        for slider in Slider::ALL {
            self.ui.listen(slider.input_id(), EventKind::Input, Listener::SliderLabel(slider))?;
            slider.sync_label(&mut self.ui)?;
        }
        for kind in [TestKind::Cpu, TestKind::Io] {
            self.ui.listen(radio_for(kind), EventKind::Change, Listener::SelectTestKind(kind))?;
        }
        for endpoint in Endpoint::ALL {
            self.ui.listen(endpoint.button_id(), EventKind::Click, Listener::Submit(endpoint))?;
        }
        self.ui.listen(HEAVY_LOAD_SWITCH_ID, EventKind::Change, Listener::HeavyLoadSwitch)?;
        Ok(())
    }

    pub fn ui(&self) -> &MemoryDom {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut MemoryDom {
        &mut self.ui
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn infobox(&self) -> &InfoBox {
        &self.infobox
    }

    /// Run every listener attached to `id` for `event`.
    pub fn dispatch(&mut self, id: &str, event: EventKind) -> Vec<Effect> {
        let mut effects = Vec::new();
        for listener in self.ui.listeners(id, event) {
            if let Some(effect) = self.handle(listener) {
                effects.push(effect);
            }
        }
        effects
    }

    fn handle(&mut self, listener: Listener) -> Option<Effect> {
        let result = match listener {
            Listener::ToggleInfoBox => self.infobox.toggle(&mut self.ui).map(|_| None),
            Listener::SliderLabel(slider) => slider.sync_label(&mut self.ui).map(|_| None),
            Listener::SelectTestKind(kind) => match self.ui.is_checked(radio_for(kind)) {
                Ok(true) => show_pane(&mut self.ui, kind).map(|_| None),
                other => other.map(|_| None),
            },
            Listener::HeavyLoadSwitch => self
                .ui
                .is_checked(HEAVY_LOAD_SWITCH_ID)
                .map(|on| Some(Effect::HeavyLoad(on))),
            Listener::Submit(endpoint) => {
                return match self.dashboard.submit_test(&mut self.ui, endpoint) {
                    Ok(sub) => Some(Effect::Run(sub)),
                    Err(e) => {
                        logging::warn(
                            Domain::Dashboard,
                            "submit_rejected",
                            obj(&[("endpoint", v_str(endpoint.as_str())), ("msg", v_str(&e.to_string()))]),
                        );
                        None
                    }
                };
            }
        };
        result.unwrap_or_else(|e| {
            logging::warn(Domain::Form, "handler_failed", obj(&[("msg", v_str(&e.to_string()))]));
            None
        })
    }

    pub fn click(&mut self, id: &str) -> Vec<Effect> {
        self.dispatch(id, EventKind::Click)
    }

    /// Move a slider and fire its input event.
    pub fn input(&mut self, slider: Slider, value: u32) -> Vec<Effect> {
        if let Err(e) = self.ui.set_value(slider.input_id(), &value.to_string()) {
            logging::warn(Domain::Form, "input_failed", obj(&[("msg", v_str(&e.to_string()))]));
            return Vec::new();
        }
        self.dispatch(slider.input_id(), EventKind::Input)
    }

    pub fn select_test_kind(&mut self, kind: TestKind) -> Vec<Effect> {
        let radio = radio_for(kind);
        if let Err(e) = self.ui.set_checked(radio, true) {
            logging::warn(Domain::Form, "select_failed", obj(&[("msg", v_str(&e.to_string()))]));
            return Vec::new();
        }
        self.dispatch(radio, EventKind::Change)
    }

    pub fn set_heavy_load_switch(&mut self, on: bool) -> Vec<Effect> {
        if self.ui.set_checked(HEAVY_LOAD_SWITCH_ID, on).is_err() {
            return Vec::new();
        }
        self.dispatch(HEAVY_LOAD_SWITCH_ID, EventKind::Change)
    }

    /// Perform effects concurrently, applying each completion as it lands.
    pub async fn run_effects(&mut self, effects: Vec<Effect>) -> RunSummary {
        let mut pending: FuturesUnordered<BoxFuture<'static, Completion>> = FuturesUnordered::new();
        for effect in effects {
            let api = Arc::clone(&self.api);
            match effect {
                Effect::Run(sub) => pending.push(
                    async move {
                        let outcome = api.run_benchmark(sub.endpoint, &sub.request).await;
                        Completion::Run(sub, outcome)
                    }
                    .boxed(),
                ),
                Effect::HeavyLoad(on) => pending.push(
                    async move { Completion::HeavyLoad(on, api.set_heavy_load(on).await) }.boxed(),
                ),
            }
        }

        let mut summary = RunSummary::default();
        while let Some(done) = pending.next().await {
            match done {
                Completion::Run(sub, outcome) => match self.dashboard.complete(&mut self.ui, &sub, outcome) {
                    Some(CardState::Populated) => summary.populated += 1,
                    Some(CardState::Error) => summary.failed += 1,
                    _ => {}
                },
                // fire and forget: the body is only logged
                Completion::HeavyLoad(on, Ok(text)) => logging::info(
                    Domain::Api,
                    "heavy_load",
                    obj(&[("enabled", serde_json::Value::Bool(on)), ("msg", v_str(text.trim()))]),
                ),
                Completion::HeavyLoad(on, Err(e)) => logging::error(
                    Domain::Api,
                    "heavy_load_failed",
                    obj(&[("enabled", serde_json::Value::Bool(on)), ("msg", v_str(&e.to_string()))]),
                ),
            }
        }
        summary
    }

    pub async fn load_info_box(&mut self) -> LoadOutcome {
        self.loader
            .load(&mut self.ui, self.api.as_ref(), &mut self.infobox)
            .await
    }

    pub async fn refresh_thread_info(&mut self) {
        let outcome = self.api.thread_info().await;
        if let Ok(info) = &outcome {
            logging::debug(
                Domain::Api,
                "thread_info",
                obj(&[("current", v_num(info.current_thread_count as f64))]),
            );
        }
        self.dashboard.show_thread_info(&mut self.ui, outcome);
    }

    pub fn render(&self, title: &str) -> String {
        page::render_document(&self.ui, title)
    }

    pub fn write_report(&self, path: &Path, title: &str) -> std::io::Result<()> {
        page::write_document(path, &self.ui, title)
    }
}
