//! CLI command definitions and dispatch for the `starq` binary.
//!
//! Uses clap derive macros for argument parsing. Every command works against
//! the same engine the REST API serves.

pub mod book;
pub mod capture;
pub mod quote;
pub mod slots;
pub mod zip;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

use starclean_types::quote::{Frequency, ServiceType};

/// Quote, schedule and capture house-cleaning leads.
#[derive(Parser)]
#[command(name = "starq", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log errors only. Command output is unaffected.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Price a home without contact details.
    Quote {
        /// Number of bedrooms (1-6, 6 means 6+).
        #[arg(long, default_value = "3")]
        bedrooms: u8,

        /// Number of bathrooms (1-5, 5 means 5+).
        #[arg(long, default_value = "2")]
        bathrooms: u8,

        /// The home has a dog.
        #[arg(long)]
        dog: bool,

        /// The home has a cat.
        #[arg(long)]
        cat: bool,

        /// Service type (standard, deep, move-in-out, vacation-rental, post-construction).
        #[arg(long, default_value = "standard")]
        service: ServiceType,

        /// Visit frequency (one-time, weekly, bi-weekly, monthly).
        #[arg(long, default_value = "bi-weekly")]
        frequency: Frequency,
    },

    /// List upcoming walkthrough dates, or the arrival windows of one date.
    Slots {
        /// Date to show arrival windows for (YYYY-MM-DD).
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Resolve a zip code and check the service area.
    Zip {
        /// Five digit US zip code.
        zip: String,
    },

    /// Submit a short-form lead.
    Capture {
        /// First name.
        #[arg(long)]
        first_name: String,

        /// Last name.
        #[arg(long, default_value = "")]
        last_name: String,

        /// Email address.
        #[arg(long)]
        email: String,

        /// Phone number.
        #[arg(long)]
        phone: String,

        /// Zip code.
        #[arg(long)]
        zip: String,

        /// Service interested in.
        #[arg(long)]
        service: Option<ServiceType>,

        /// Preferred frequency.
        #[arg(long)]
        frequency: Option<Frequency>,

        /// Label of the form the lead came from.
        #[arg(long, default_value = "Main Booking Form")]
        form_source: String,
    },

    /// Walk through the booking wizard interactively.
    Book,

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_quote_defaults() {
        let cli = Cli::try_parse_from(["starq", "quote"]).unwrap();
        match cli.command {
            Commands::Quote {
                bedrooms,
                bathrooms,
                service,
                frequency,
                ..
            } => {
                assert_eq!((bedrooms, bathrooms), (3, 2));
                assert_eq!(service, ServiceType::Standard);
                assert_eq!(frequency, Frequency::BiWeekly);
            }
            _ => panic!("expected quote command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["starq", "slots", "--json", "-vv", "--date", "2026-03-03"])
            .unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Slots { date: Some(_) }));
    }

    #[test]
    fn test_quiet_only_narrows_logging() {
        let cli = Cli::try_parse_from(["starq", "zip", "29401", "--quiet", "-v"]).unwrap();
        assert!(cli.quiet);
        assert!(!cli.json);

        let help = Cli::command()
            .get_arguments()
            .find(|arg| arg.get_id() == "quiet")
            .and_then(|arg| arg.get_help())
            .map(|help| help.to_string())
            .unwrap();
        assert!(help.starts_with("Log errors only"));
    }
}
