use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use threadbench::api::HttpApi;
use threadbench::app::{App, RunSummary};
use threadbench::config::Config;
use threadbench::logging::{self, obj, v_num, v_str, Domain};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    cfg.validate().context("invalid configuration")?;
    let api = Arc::new(HttpApi::new(&cfg.api_base)?);
    let mut app = App::new(api, &cfg)?;

    logging::info(
        Domain::System,
        "startup",
        obj(&[
            ("api_base", v_str(&cfg.api_base)),
            ("test_kind", v_str(&cfg.test_kind)),
            ("run", v_str(&cfg.run.join(","))),
        ]),
    );

    let infobox = app.load_info_box().await;
    logging::info(Domain::InfoBox, "load_outcome", obj(&[("outcome", v_str(&format!("{:?}", infobox)))]));

    let mut effects = app.select_test_kind(cfg.test_kind()?);
    if cfg.heavy_load {
        effects.extend(app.set_heavy_load_switch(true));
    }
    app.run_effects(effects).await;

    let mut effects = Vec::new();
    for endpoint in cfg.endpoints()? {
        effects.extend(app.click(endpoint.button_id()));
    }
    let summary: RunSummary = app.run_effects(effects).await;

    app.refresh_thread_info().await;

    if cfg.heavy_load {
        let effects = app.set_heavy_load_switch(false);
        app.run_effects(effects).await;
    }

    let out = Path::new(&cfg.out_path);
    app.write_report(out, "Thread model comparison")
        .with_context(|| format!("writing {}", out.display()))?;

    logging::info(
        Domain::System,
        "done",
        obj(&[
            ("populated", v_num(summary.populated as f64)),
            ("failed", v_num(summary.failed as f64)),
            ("out", v_str(&cfg.out_path)),
        ]),
    );
    Ok(())
}
