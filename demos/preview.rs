//! Interactive terminal preview of the portfolio page.
//!
//! ```text
//! cargo run --example preview [config.toml]
//! ```
//!
//! Logs go to `folio-preview.log` (filter with `RUST_LOG`, default `debug`).

use std::fs::File;
use std::rc::Rc;
use std::sync::Mutex;

use folio_fx::renderer::terminal;
use folio_fx::{PageConfig, Page, Viewport, VirtualScheduler, attach_all, template};
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "folio-preview.log";

fn main() -> folio_fx::Result<()> {
    let log = File::create(LOG_FILE).map_err(|source| folio_fx::Error::Io {
        path: LOG_FILE.into(),
        source,
    })?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_writer(Mutex::new(log))
        .with_ansi(false)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => PageConfig::load(path)?,
        None => PageConfig::default(),
    };

    let scheduler = Rc::new(VirtualScheduler::new());
    let page = Page::new(
        template::portfolio_document(&config),
        scheduler.clone(),
        Viewport::default(),
    );
    let interactions = attach_all(&page, &config);
    for (name, err) in interactions.skipped() {
        tracing::warn!(behavior = name, error = %err, "not running");
    }

    let result = terminal::run(&page, &scheduler, &config);
    interactions.detach();
    result
}
