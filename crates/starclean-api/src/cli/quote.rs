//! `starq quote`: price a home from flags.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use rust_decimal::Decimal;

use starclean_types::quote::{Frequency, HomeProfile, PriceQuote, ServiceSelection, ServiceType};

use crate::state::AppState;

/// Print the price breakdown for a home profile and plan.
///
/// # Examples
///
/// ```bash
/// starq quote --bedrooms 4 --bathrooms 3 --dog --service deep --frequency weekly
/// ```
pub fn show_quote(
    state: &AppState,
    home: HomeProfile,
    service: ServiceType,
    frequency: Frequency,
    json: bool,
) -> Result<()> {
    let selection = ServiceSelection { service, frequency };
    let quote = state.engine.quote(&home, &selection);

    if json {
        let out = serde_json::json!({
            "home": home,
            "selection": selection,
            "quote": quote,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {} bed / {} bath, {} ({})",
        style("$").green().bold(),
        home.bedrooms(),
        home.bathrooms(),
        style(service.label()).cyan(),
        frequency.label()
    );
    println!();
    println!("{}", breakdown_table(&home, &quote));
    println!();

    if let Some(recurring) = quote.recurring {
        println!(
            "  {} {} per visit after the first clean",
            style("Recurring:").bold(),
            style(recurring).green().bold()
        );
        println!(
            "  {} ${:.2} per visit",
            style("You save:").bold(),
            quote.savings
        );
    } else {
        println!(
            "  {} {}",
            style("Your price:").bold(),
            style(quote.initial).green().bold()
        );
    }
    println!("  {}", style(format!("pricing {}", quote.version)).dim());
    println!();

    Ok(())
}

fn breakdown_table(home: &HomeProfile, quote: &PriceQuote) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Item").fg(Color::White),
        Cell::new("Value").fg(Color::White),
    ]);

    let pets = match (home.has_dog, home.has_cat) {
        (true, true) => "dog, cat",
        (true, false) => "dog",
        (false, true) => "cat",
        (false, false) => "none",
    };

    table.add_row(vec![Cell::new("Pets"), Cell::new(pets)]);
    table.add_row(vec![
        Cell::new("Base price"),
        Cell::new(format!("${:.2}", quote.base)).fg(Color::Cyan),
    ]);
    table.add_row(vec![
        Cell::new("Service multiplier"),
        Cell::new(format!("x{}", quote.multiplier)),
    ]);
    table.add_row(vec![
        Cell::new("First clean"),
        Cell::new(quote.initial.to_string()).fg(Color::Green),
    ]);
    if let Some(recurring) = quote.recurring {
        table.add_row(vec![
            Cell::new("Frequency discount"),
            Cell::new(format!("{}%", (quote.discount * Decimal::ONE_HUNDRED).normalize())),
        ]);
        table.add_row(vec![
            Cell::new("Recurring visits"),
            Cell::new(recurring.to_string()).fg(Color::Green),
        ]);
    }

    table
}
