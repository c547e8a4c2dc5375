//! `starq slots`: upcoming walkthrough dates and arrival windows.

use anyhow::{Result, bail};
use chrono::NaiveDate;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use crate::state::AppState;

/// List the offered dates, or the arrival windows of `date`.
pub fn show_slots(state: &AppState, date: Option<NaiveDate>, json: bool) -> Result<()> {
    let today = state.today();

    let Some(date) = date else {
        let dates = state.engine.dates(today);
        if json {
            println!("{}", serde_json::to_string_pretty(&dates)?);
            return Ok(());
        }

        println!();
        println!(
            "  {} Next {} walkthrough dates",
            style("📅").bold(),
            dates.len()
        );
        println!();
        for d in &dates {
            println!(
                "    {} {}",
                style("•").dim(),
                style(d.format("%a, %b %-d")).cyan()
            );
        }
        println!();
        println!(
            "  Show times with: {}",
            style("starq slots --date YYYY-MM-DD").yellow()
        );
        println!();
        return Ok(());
    };

    if !state.engine.availability().is_offered(today, date) {
        bail!("{date} is not an available appointment date");
    }

    let slots = state.engine.slots_for(date);
    if json {
        println!("{}", serde_json::to_string_pretty(&slots)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Arrival window").fg(Color::White),
        Cell::new("Status").fg(Color::White),
    ]);

    for slot in &slots {
        let status = if slot.booked {
            Cell::new("○ booked").fg(Color::DarkGrey)
        } else {
            Cell::new("● open").fg(Color::Green)
        };
        table.add_row(vec![Cell::new(slot.window.label()).fg(Color::Cyan), status]);
    }

    println!();
    println!("  {}", style(date.format("%A, %B %-d, %Y")).bold());
    println!();
    println!("{table}");
    println!();

    Ok(())
}
