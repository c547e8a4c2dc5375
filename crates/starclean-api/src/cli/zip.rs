//! `starq zip`: resolve a zip code.

use anyhow::Result;
use console::style;
use tracing::Instrument;

use starclean_observe::lead_attrs;

use crate::state::AppState;

pub async fn lookup_zip(state: &AppState, zip: &str, json: bool) -> Result<()> {
    let span = tracing::info_span!(lead_attrs::OP_ZIP_LOOKUP, { lead_attrs::ZIP_CODE } = %zip);
    let info = state.engine.lookup_zip(zip).instrument(span).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!();
    match &info.city {
        Some(city) if info.served => println!(
            "  {} {} is in {}, which we serve",
            style("✓").green().bold(),
            info.zip,
            style(city).cyan()
        ),
        Some(city) => println!(
            "  {} {} is in {}, outside our service area",
            style("!").yellow().bold(),
            info.zip,
            style(city).cyan()
        ),
        None => println!(
            "  {} No city found for {}",
            style("i").blue().bold(),
            style(&info.zip).yellow()
        ),
    }
    println!();

    Ok(())
}
