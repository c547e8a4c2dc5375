//! `starq book`: the booking wizard in the terminal.
//!
//! Walks the same session the REST API exposes: contact, home, plan, price
//! locked, scheduling, confirmation. Every step can go back with "< Back".

use std::time::Duration;

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::Instrument;

use starclean_observe::lead_attrs;
use starclean_types::quote::{Frequency, ServiceType};
use starclean_types::wizard::{WizardAction, WizardInput, WizardStep};

use crate::cli::capture::print_failure;
use crate::state::{AppState, ConcreteSession};

const BACK: &str = "< Back";

/// Run the wizard until the visitor reaches the confirmation.
pub async fn book(state: &AppState, json: bool) -> Result<()> {
    let mut session = state.engine.start_session(state.today(), None).await;

    loop {
        let step = session.step();
        println!();
        println!(
            "  {} {}",
            style(format!("Step {}/6", step.index() + 1)).dim(),
            style(step.title()).bold()
        );
        println!();

        let next = match step {
            WizardStep::Contact => contact_step(&mut session).await?,
            WizardStep::HomeDetails => home_step(&mut session).await?,
            WizardStep::PlanReview => plan_step(&mut session).await?,
            WizardStep::PriceLocked => price_step(&session, state.config.wizard.offer_scheduling)?,
            WizardStep::Scheduling => scheduling_step(&mut session).await?,
            WizardStep::Confirmed => break,
        };
        if let Some(action) = next {
            act(&mut session, action).await?;
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
    } else {
        print_summary(&session, &state.config.business.name);
    }
    Ok(())
}

/// Apply a field edit, printing the reason when it is rejected.
async fn apply(session: &mut ConcreteSession, input: WizardInput) -> bool {
    let span = tracing::debug_span!(
        lead_attrs::OP_WIZARD_INPUT,
        { lead_attrs::WIZARD_STEP } = %session.step(),
    );
    match session.input(input).instrument(span).await {
        Ok(()) => true,
        Err(e) => {
            print_failure(&e);
            false
        }
    }
}

/// Run a navigation action. Failures are printed and leave the step as is.
async fn act(session: &mut ConcreteSession, action: WizardAction) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message("Saving...");
    spinner.enable_steady_tick(Duration::from_millis(80));

    let span = tracing::info_span!(
        lead_attrs::OP_WIZARD_ACTION,
        { lead_attrs::WIZARD_STEP } = %session.step(),
        { lead_attrs::WIZARD_ACTION } = %action,
    );
    let result = session.act(action).instrument(span).await;
    spinner.finish_and_clear();

    if let Err(e) = result {
        print_failure(&e);
    }
    Ok(())
}

fn prompt_text(prompt: &str, current: &str) -> Result<String> {
    let mut input = Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true);
    if !current.is_empty() {
        input = input.default(current.to_string());
    }
    Ok(input.interact_text()?)
}

/// Select among `items` plus a trailing "< Back". `None` means back.
fn select_or_back(prompt: &str, items: &[String], default: usize) -> Result<Option<usize>> {
    let mut all = items.to_vec();
    all.push(BACK.to_string());
    let selection = Select::new()
        .with_prompt(prompt)
        .items(&all)
        .default(default)
        .interact()?;
    Ok((selection < items.len()).then_some(selection))
}

async fn contact_step(session: &mut ConcreteSession) -> Result<Option<WizardAction>> {
    let contact = session.request().contact.clone();

    let full_name = prompt_text("Full name", &contact.full_name)?;
    apply(session, WizardInput::FullName(full_name)).await;
    let email = prompt_text("Email", &contact.email)?;
    apply(session, WizardInput::Email(email)).await;
    let phone = prompt_text("Phone", &contact.phone)?;
    apply(session, WizardInput::Phone(phone)).await;
    let zip = prompt_text("Zip code", &contact.zip)?;
    apply(session, WizardInput::Zip(zip)).await;

    let request = session.request();
    match &request.city {
        Some(city) if request.in_service_area => {
            println!("  {} Great, we clean in {}", style("✓").green(), style(city).cyan());
        }
        Some(city) => {
            println!(
                "  {} {} is outside our usual area, we'll confirm coverage",
                style("!").yellow(),
                style(city).cyan()
            );
        }
        None => {}
    }

    Ok(Some(WizardAction::Next))
}

async fn home_step(session: &mut ConcreteSession) -> Result<Option<WizardAction>> {
    let home = session.request().home.clone();

    let bedrooms: Vec<String> = (1..=6)
        .map(|n| if n == 6 { "6+".to_string() } else { n.to_string() })
        .collect();
    let Some(bed) = select_or_back("Bedrooms", &bedrooms, usize::from(home.bedrooms() - 1))? else {
        return Ok(Some(WizardAction::Back));
    };
    apply(session, WizardInput::Bedrooms(bed as u8 + 1)).await;

    let bathrooms: Vec<String> = (1..=5)
        .map(|n| if n == 5 { "5+".to_string() } else { n.to_string() })
        .collect();
    let Some(bath) = select_or_back("Bathrooms", &bathrooms, usize::from(home.bathrooms() - 1))?
    else {
        return Ok(Some(WizardAction::Back));
    };
    apply(session, WizardInput::Bathrooms(bath as u8 + 1)).await;

    let dog = Confirm::new()
        .with_prompt("Do you have a dog?")
        .default(home.has_dog)
        .interact()?;
    apply(session, WizardInput::HasDog(dog)).await;
    let cat = Confirm::new()
        .with_prompt("Do you have a cat?")
        .default(home.has_cat)
        .interact()?;
    apply(session, WizardInput::HasCat(cat)).await;

    Ok(Some(WizardAction::Next))
}

async fn plan_step(session: &mut ConcreteSession) -> Result<Option<WizardAction>> {
    let selection = session.request().selection;

    let services: Vec<String> = ServiceType::ALL.iter().map(|s| s.label().to_string()).collect();
    let current = ServiceType::ALL
        .iter()
        .position(|s| *s == selection.service)
        .unwrap_or(0);
    let Some(service) = select_or_back("Service", &services, current)? else {
        return Ok(Some(WizardAction::Back));
    };
    apply(session, WizardInput::Service(ServiceType::ALL[service])).await;

    let frequencies: Vec<String> = Frequency::ALL.iter().map(|f| f.label().to_string()).collect();
    let current = Frequency::ALL
        .iter()
        .position(|f| *f == selection.frequency)
        .unwrap_or(0);
    let Some(frequency) = select_or_back("How often?", &frequencies, current)? else {
        return Ok(Some(WizardAction::Back));
    };
    apply(session, WizardInput::Frequency(Frequency::ALL[frequency])).await;

    print_pricing(session);

    let lock = Confirm::new()
        .with_prompt("Lock in this price?")
        .default(true)
        .interact()?;
    Ok(Some(if lock { WizardAction::Next } else { WizardAction::Back }))
}

fn price_step(session: &ConcreteSession, offer_scheduling: bool) -> Result<Option<WizardAction>> {
    print_pricing(session);

    let next = if offer_scheduling {
        "Schedule a free walkthrough"
    } else {
        "Finish"
    };
    let items = [next.to_string(), "Skip scheduling".to_string()];
    Ok(Some(match select_or_back("What next?", &items, 0)? {
        Some(0) => WizardAction::Next,
        Some(_) => WizardAction::SkipScheduling,
        None => WizardAction::Back,
    }))
}

async fn scheduling_step(session: &mut ConcreteSession) -> Result<Option<WizardAction>> {
    let dates = session.dates();
    let labels: Vec<String> = dates
        .iter()
        .map(|d| d.format("%a, %b %-d").to_string())
        .collect();
    let mut items = labels;
    items.push("Skip scheduling".to_string());

    let Some(choice) = select_or_back("Pick a date", &items, 0)? else {
        return Ok(Some(WizardAction::Back));
    };
    let Some(date) = dates.get(choice).copied() else {
        return Ok(Some(WizardAction::SkipScheduling));
    };
    if !apply(session, WizardInput::Date(date)).await {
        return scheduling_retry();
    }

    let slots = session.slots();
    let windows: Vec<String> = slots
        .iter()
        .map(|s| {
            if s.booked {
                format!("{} (booked)", s.window.label())
            } else {
                s.window.label()
            }
        })
        .collect();
    let Some(choice) = select_or_back("Arrival time", &windows, 0)? else {
        return Ok(Some(WizardAction::Back));
    };
    let slot = &slots[choice];
    if slot.booked {
        println!(
            "  {} That time is taken, please pick another",
            style("!").yellow()
        );
        return scheduling_retry();
    }
    if !apply(session, WizardInput::Window(slot.window)).await {
        return scheduling_retry();
    }

    Ok(Some(WizardAction::Next))
}

/// Stay on the scheduling step, or skip it.
fn scheduling_retry() -> Result<Option<WizardAction>> {
    let retry = Confirm::new()
        .with_prompt("Pick another time?")
        .default(true)
        .interact()?;
    Ok((!retry).then_some(WizardAction::SkipScheduling))
}

fn print_pricing(session: &ConcreteSession) {
    let Some(quote) = &session.request().pricing else {
        return;
    };
    println!();
    match quote.recurring {
        Some(recurring) => {
            println!(
                "  {} {}",
                style("First clean:").bold(),
                style(quote.initial).green()
            );
            println!(
                "  {} {}  {}",
                style("Each visit after:").bold(),
                style(recurring).green().bold(),
                style(format!("save ${:.2}", quote.savings)).dim()
            );
        }
        None => println!(
            "  {} {}",
            style("Your price:").bold(),
            style(quote.initial).green().bold()
        ),
    }
    println!();
}

fn print_summary(session: &ConcreteSession, business: &str) {
    let request = session.request();

    println!();
    println!(
        "  {} You're all set, {}!",
        style("✓").green().bold(),
        style(request.contact.first_name()).cyan()
    );
    println!();
    println!(
        "  {}  {} ({})",
        style("Plan:").bold(),
        request.selection.service.label(),
        request.selection.frequency.label()
    );
    if let Some(quote) = &request.pricing {
        println!("  {}  {}", style("Price:").bold(), quote.initial);
    }
    match (request.appointment_date(), request.appointment_window()) {
        (Some(date), Some(window)) => println!(
            "  {}  {} at {}",
            style("Walkthrough:").bold(),
            date.format("%A, %B %-d"),
            window.label()
        ),
        _ => println!(
            "  {}",
            style(format!("{business} will reach out to schedule your walkthrough.")).dim()
        ),
    }
    println!();
}
