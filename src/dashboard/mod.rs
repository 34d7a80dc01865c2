//! Benchmark dashboard: result cards, latest results and chart refresh.
//!
//! A submission happens in two halves. [`Dashboard::submit_test`] reads the
//! form, inserts a loading card and returns a [`Submission`] ticket; the
//! caller performs the HTTP request and hands the outcome to
//! [`Dashboard::complete`]. Any number of tickets may be outstanding.

pub mod form;
pub mod render;

use std::collections::HashMap;

use crate::charts::ChartSet;
use crate::error::{ClientError, DashboardError};
use crate::labels::{normalize_label, Endpoint};
use crate::logging::{self, obj, params_hash, ts_epoch_ms, v_num, v_str, Domain};
use crate::model::{BenchmarkRequest, BenchmarkResponse, BenchmarkResult, ThreadSystemInfo};
use crate::ui::Ui;

use self::form::FormState;

pub const RESULTS_CONTAINER_ID: &str = "resultsContainer";
pub const THREAD_INFO_CONTAINER_ID: &str = "threadInfoContainer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    Loading,
    Populated,
    Error,
}

/// An issued request whose card is waiting for its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub card_id: String,
    pub endpoint: Endpoint,
    pub request: BenchmarkRequest,
}

#[derive(Debug)]
pub struct Dashboard {
    session: String,
    next_seq: u64,
    cards: HashMap<String, CardState>,
    latest: Vec<BenchmarkResult>,
    charts: ChartSet,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            session: ts_epoch_ms().to_string(),
            next_seq: 0,
            cards: HashMap::new(),
            latest: Vec::new(),
            charts: ChartSet::new(),
        }
    }

    /// Results currently shown in the charts.
    pub fn latest_results(&self) -> &[BenchmarkResult] {
        &self.latest
    }

    pub fn card_state(&self, card_id: &str) -> Option<CardState> {
        self.cards.get(card_id).copied()
    }

    pub fn charts(&self) -> &ChartSet {
        &self.charts
    }

    pub fn in_flight(&self) -> usize {
        self.cards.values().filter(|s| **s == CardState::Loading).count()
    }

    // The counter alone makes ids unique; the session stamp keeps them
    // distinct across dashboards rendered into the same page.
    fn next_card_id(&mut self) -> String {
        self.next_seq += 1;
        format!("result-{}-{}", self.session, self.next_seq)
    }

    pub fn submit_test(&mut self, ui: &mut dyn Ui, endpoint: Endpoint) -> Result<Submission, DashboardError> {
        let request = FormState::read(&*ui)?.to_request()?;
        let card_id = self.next_card_id();
        ui.prepend_html(RESULTS_CONTAINER_ID, &render::loading_card(&card_id, endpoint, &request))?;
        self.cards.insert(card_id.clone(), CardState::Loading);

        let body = serde_json::to_string(&request).unwrap_or_default();
        logging::info(
            Domain::Dashboard,
            "submitted",
            obj(&[
                ("card_id", v_str(&card_id)),
                ("endpoint", v_str(endpoint.as_str())),
                ("test_type", v_str(request.test_type.as_str())),
                ("parallel_tasks", v_num(request.parallel_tasks as f64)),
                ("request_hash", v_str(&params_hash(&body))),
            ]),
        );
        Ok(Submission { card_id, endpoint, request })
    }

    /// Apply the outcome of a submission to its card.
    ///
    /// Returns the card's new state, or `None` when the card was not
    /// waiting (unknown id, or already resolved).
    pub fn complete(
        &mut self,
        ui: &mut dyn Ui,
        submission: &Submission,
        outcome: Result<BenchmarkResponse, ClientError>,
    ) -> Option<CardState> {
        let card_id = submission.card_id.as_str();
        if self.card_state(card_id) != Some(CardState::Loading) {
            logging::warn(
                Domain::Dashboard,
                "stale_completion",
                obj(&[("card_id", v_str(card_id)), ("msg", v_str("card is not loading"))]),
            );
            return None;
        }

        let state = match outcome {
            Ok(response) => self.populate(ui, card_id, response),
            Err(err) => {
                self.fail(ui, card_id, &err.to_string());
                CardState::Error
            }
        };
        self.cards.insert(card_id.to_string(), state);
        Some(state)
    }

    fn populate(&mut self, ui: &mut dyn Ui, card_id: &str, response: BenchmarkResponse) -> CardState {
        let many = matches!(response, BenchmarkResponse::Many(_));
        let mut results = response.into_results();
        for r in &mut results {
            r.thread_model = normalize_label(&r.thread_model);
        }

        let html = match results.as_slice() {
            [single] if !many => render::detail_view(single),
            _ => render::comparison_table(&results),
        };
        let _ = ui.set_visible(&render::loading_id(card_id), false);
        if let Err(e) = ui.set_html(&render::body_id(card_id), &html) {
            logging::error(
                Domain::Dashboard,
                "card_missing",
                obj(&[("card_id", v_str(card_id)), ("msg", v_str(&e.to_string()))]),
            );
            return CardState::Error;
        }

        logging::info(
            Domain::Dashboard,
            "populated",
            obj(&[("card_id", v_str(card_id)), ("results", v_num(results.len() as f64))]),
        );

        // last write wins: a slow earlier request may replace newer data
        self.latest = results;
        if let Err(e) = self.charts.refresh(ui, &self.latest) {
            logging::warn(Domain::Chart, "refresh_failed", obj(&[("msg", v_str(&e.to_string()))]));
        }
        CardState::Populated
    }

    fn fail(&mut self, ui: &mut dyn Ui, card_id: &str, reason: &str) {
        logging::error(
            Domain::Dashboard,
            "request_failed",
            obj(&[("card_id", v_str(card_id)), ("msg", v_str(reason))]),
        );
        let _ = ui.set_visible(&render::loading_id(card_id), false);
        if let Err(e) = ui.append_html(&render::body_id(card_id), &render::error_notice(reason)) {
            logging::error(
                Domain::Dashboard,
                "card_missing",
                obj(&[("card_id", v_str(card_id)), ("msg", v_str(&e.to_string()))]),
            );
        }
    }

    /// Render the thread statistics panel, or an error notice in its place.
    pub fn show_thread_info(&self, ui: &mut dyn Ui, outcome: Result<ThreadSystemInfo, ClientError>) {
        let html = match &outcome {
            Ok(info) => render::thread_info_panel(info),
            Err(err) => {
                logging::warn(Domain::Dashboard, "thread_info_failed", obj(&[("msg", v_str(&err.to_string()))]));
                render::error_notice(&err.to_string())
            }
        };
        if let Err(e) = ui.set_html(THREAD_INFO_CONTAINER_ID, &html) {
            logging::warn(Domain::Dashboard, "thread_info_unplaced", obj(&[("msg", v_str(&e.to_string()))]));
        }
    }
}
