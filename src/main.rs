//! Customer lifetime value report
//!
//! Ingests an event file and prints the customers with the highest simple lifetime value.

use std::io;

use anyhow::{Context, Result, anyhow};
use rusty_money::iso;
use tracing::info;

use customer_ltv::{
    engine::{Engine, EngineConfig},
    fixtures::load_events,
    report::write_ranking,
};

use crate::config::Config;

mod config;
mod observability;

/// Report entry point
pub fn main() -> Result<()> {
    let config = Config::load().unwrap_or_else(|err| err.exit());

    observability::init_subscriber(&config.logging)?;

    let currency = iso::find(&config.currency)
        .ok_or_else(|| anyhow!("unknown currency code: {}", config.currency))?;
    let engine_config = EngineConfig::new(config.lifespan_years)?;

    let records = load_events(&config.events)
        .with_context(|| format!("loading events from {}", config.events.display()))?;

    let mut engine = Engine::new(engine_config);
    engine.parse_events(&records)?;

    let ranking = engine.top_ltv_customers(config.top)?;

    info!(
        customers = engine.store().customer_count(),
        reported = ranking.len(),
        lifespan_years = %engine.config().lifespan_years(),
        "ranked customers"
    );

    write_ranking(io::stdout().lock(), &ranking, currency)?;

    Ok(())
}
