//! Command-line interface parsing for salonadm
//!
//! This module defines the clap command tree and turns parsed arguments into
//! the gateway configuration. Backend location and token can come from flags
//! or from the environment.

use clap::{Args, Parser, Subcommand};
use std::time::Duration;
use thiserror::Error;

use crate::api::ServiceFlag;
use crate::config::{GatewayConfig, API_PREFIX_ENV, API_URL_ENV};

/// Environment variable holding a bearer token that overrides the saved session
pub const TOKEN_ENV: &str = "SALONADMIN_TOKEN";

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified flag name is not recognized
    #[error(
        "Invalid flag: '{0}'. Valid flags: trending-near-you, best-seller, \
         last-minute-addon, people-also-availed, spa-retreat-for-women, whats-new"
    )]
    InvalidFlag(String),
}

/// Parses a service flag argument
pub fn parse_flag_arg(s: &str) -> Result<ServiceFlag, CliError> {
    ServiceFlag::from_slug(s).ok_or_else(|| CliError::InvalidFlag(s.to_string()))
}

/// salonadm - manage the beauty-services marketplace catalog and orders
#[derive(Parser, Debug)]
#[command(name = "salonadm")]
#[command(about = "Marketplace admin: categories, services, flags, orders and auth")]
#[command(version)]
pub struct Cli {
    /// Backend base URL
    #[arg(long, global = true, env = API_URL_ENV)]
    pub base_url: Option<String>,

    /// Path prefix between the base URL and each endpoint
    #[arg(long, global = true, env = API_PREFIX_ENV)]
    pub api_prefix: Option<String>,

    /// Bearer token to use instead of the saved session
    #[arg(long, global = true, env = TOKEN_ENV, hide_env_values = true)]
    pub token: Option<String>,

    /// Print raw JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Request a login OTP for a phone number
    Login { phone: String },
    /// Complete a login with the OTP and save the session
    Verify { phone: String, otp: String },
    /// Forget the saved session
    Logout,
    /// Catalog counts and the signed-in profile
    Dashboard {
        /// Pause between sequential calls, in milliseconds
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,
    },
    /// Main categories
    #[command(subcommand)]
    Categories(CategoryCommand),
    /// Sub-categories
    #[command(subcommand)]
    SubCategories(SubCategoryCommand),
    /// Services and their flags
    #[command(subcommand)]
    Services(ServiceCommand),
    /// Booked orders
    Orders,
    /// Registered users
    Users,
    /// The signed-in admin's profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileCommand>,
    },
    /// Backend health check
    Health,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CategoryFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub image_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    List,
    Create {
        #[command(flatten)]
        fields: CategoryFields,
    },
    Update {
        id: String,
        #[command(flatten)]
        fields: CategoryFields,
    },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum SubCategoryCommand {
    List,
    Create {
        #[command(flatten)]
        fields: CategoryFields,
        #[arg(long)]
        main_category: Option<String>,
    },
    Update {
        id: String,
        #[command(flatten)]
        fields: CategoryFields,
        #[arg(long)]
        main_category: Option<String>,
    },
    Delete { id: String },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ServiceFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub price: Option<f64>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub image_url: Option<String>,
    #[arg(long)]
    pub sub_category: Option<String>,
    #[arg(long)]
    pub duration: Option<String>,
    #[arg(long)]
    pub brand: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ServiceCommand {
    List,
    Create {
        #[command(flatten)]
        fields: ServiceFields,
    },
    Update {
        id: String,
        #[command(flatten)]
        fields: ServiceFields,
    },
    Delete { id: String },
    /// Set or clear a promotional flag
    ///
    /// Valid flags: trending-near-you, best-seller, last-minute-addon,
    /// people-also-availed, spa-retreat-for-women, whats-new
    Flag {
        id: String,
        #[arg(value_parser = parse_flag_arg)]
        flag: ServiceFlag,
        /// Clear the flag instead of setting it
        #[arg(long)]
        remove: bool,
    },
    /// Show which services carry which flags
    Flags,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    Show,
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

impl Cli {
    /// Gateway configuration with flag/env values applied over defaults
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig::from_values(self.base_url.clone(), self.api_prefix.clone())
    }

    /// `tracing` filter directive for the requested verbosity
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "salonadmin=debug,salonadm=debug,info",
            _ => "trace",
        }
    }
}

/// Converts the dashboard delay flag
pub fn dashboard_delay(delay_ms: u64) -> Duration {
    Duration::from_millis(delay_ms)
}
