//! salonadm - admin CLI for the beauty-services marketplace
//!
//! Manages categories, sub-categories, services and their flags, and shows
//! orders, users and the admin profile, all through the shared request gateway.

use std::error::Error;
use std::process;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use salonadmin::api::models::{
    MainCategoryInput, ProfileUpdate, Service, ServiceInput, SubCategoryInput,
};
use salonadmin::api::{Api, Availability, ServiceFlag};
use salonadmin::cli::{
    dashboard_delay, CategoryCommand, CategoryFields, Cli, Command, ProfileCommand,
    ServiceCommand, ServiceFields, SubCategoryCommand,
};
use salonadmin::dashboard::load_dashboard;
use salonadmin::gateway::Gateway;
use salonadmin::session::SessionStore;

/// Sets up stderr logging; `RUST_LOG` wins over the verbosity flag
fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn category_input(fields: CategoryFields) -> MainCategoryInput {
    MainCategoryInput {
        name: fields.name,
        image_url: fields.image_url,
    }
}

fn sub_category_input(fields: CategoryFields, main_category: Option<String>) -> SubCategoryInput {
    SubCategoryInput {
        name: fields.name,
        image_url: fields.image_url,
        main_category_id: main_category,
    }
}

fn service_input(fields: ServiceFields) -> ServiceInput {
    ServiceInput {
        name: fields.name,
        price: fields.price,
        description: fields.description,
        image_url: fields.image_url,
        sub_category_id: fields.sub_category,
        duration: fields.duration,
        brand: fields.brand,
        ..ServiceInput::default()
    }
}

/// One line per service listing the flags it carries
fn render_service_flags(services: &[Service]) {
    for service in services {
        let set: Vec<&str> = ServiceFlag::ALL
            .iter()
            .filter(|flag| flag.is_set(service))
            .map(|flag| flag.label())
            .collect();
        let flags = if set.is_empty() {
            "-".to_string()
        } else {
            set.join(", ")
        };
        println!("{:<26} {:<32} {}", service.id, service.name, flags);
    }
}

async fn run(cli: Cli, api: Api, sessions: Arc<SessionStore>) -> Result<(), Box<dyn Error>> {
    let json = cli.json;

    match cli.command {
        Command::Login { phone } => {
            let challenge = api.auth.login(&phone).await?;
            println!(
                "{}",
                challenge.message.as_deref().unwrap_or("OTP sent")
            );
            if let Some(otp) = challenge.otp {
                println!("Development OTP: {otp}");
            }
            println!("Run `salonadm verify {phone} <otp>` to finish signing in.");
        }
        Command::Verify { phone, otp } => {
            let login = api.auth.verify_login(&phone, &otp).await?;
            sessions.save(&login.into_session(&phone))?;
            api.refresh();
            println!("Signed in as {phone}");
        }
        Command::Logout => {
            api.refresh();
            sessions.clear()?;
            println!("Signed out");
        }
        Command::Dashboard { delay_ms } => {
            let summary = load_dashboard(&api, dashboard_delay(delay_ms)).await;
            println!("Main categories: {}", summary.main_categories);
            println!("Sub categories:  {}", summary.sub_categories);
            println!("Services:        {}", summary.services);
            if let Some(profile) = &summary.profile {
                println!("Signed in as:    {}", profile.display_name());
            }
            for failure in &summary.failures {
                eprintln!("{} failed: {}", failure.section, failure.error);
            }
            if let Some(warning) = &summary.warning {
                eprintln!("{warning}");
            }
        }
        Command::Categories(action) => match action {
            CategoryCommand::List => {
                let categories = api.main_categories.list().await?;
                if json {
                    return print_json(&categories);
                }
                println!("All Categories ({})", categories.len());
                for category in &categories {
                    println!("{:<26} {:<32} {}", category.id, category.name, category.image_url);
                }
            }
            CategoryCommand::Create { fields } => {
                print_json(&api.main_categories.create(&category_input(fields)).await?)?;
            }
            CategoryCommand::Update { id, fields } => {
                print_json(&api.main_categories.update(&id, &category_input(fields)).await?)?;
            }
            CategoryCommand::Delete { id } => {
                api.main_categories.delete(&id).await?;
                println!("Deleted main category {id}");
            }
        },
        Command::SubCategories(action) => match action {
            SubCategoryCommand::List => {
                let sub_categories = api.sub_categories.list().await?;
                if json {
                    return print_json(&sub_categories);
                }
                println!("All Sub Categories ({})", sub_categories.len());
                for sub in &sub_categories {
                    let parent = sub
                        .main_category_id
                        .as_ref()
                        .map_or("-", |parent| parent.display_name());
                    println!("{:<26} {:<32} {}", sub.id, sub.name, parent);
                }
            }
            SubCategoryCommand::Create { fields, main_category } => {
                let input = sub_category_input(fields, main_category);
                print_json(&api.sub_categories.create(&input).await?)?;
            }
            SubCategoryCommand::Update { id, fields, main_category } => {
                let input = sub_category_input(fields, main_category);
                print_json(&api.sub_categories.update(&id, &input).await?)?;
            }
            SubCategoryCommand::Delete { id } => {
                api.sub_categories.delete(&id).await?;
                println!("Deleted sub category {id}");
            }
        },
        Command::Services(action) => match action {
            ServiceCommand::List => {
                let services = api.services.list().await?;
                if json {
                    return print_json(&services);
                }
                println!("All Services ({})", services.len());
                for service in &services {
                    let sub = service
                        .sub_category_id
                        .as_ref()
                        .map_or("-", |sub| sub.display_name());
                    println!(
                        "{:<26} {:<32} {:>10.2} {}",
                        service.id, service.name, service.price, sub
                    );
                }
            }
            ServiceCommand::Create { fields } => {
                print_json(&api.services.create(&service_input(fields)).await?)?;
            }
            ServiceCommand::Update { id, fields } => {
                print_json(&api.services.update(&id, &service_input(fields)).await?)?;
            }
            ServiceCommand::Delete { id } => {
                api.services.delete(&id).await?;
                println!("Deleted service {id}");
            }
            ServiceCommand::Flag { id, flag, remove } => {
                api.services.set_flag(&id, flag, !remove).await?;
                let verb = if remove { "Removed" } else { "Marked" };
                println!("{verb} {id}: {}", flag.label());
            }
            ServiceCommand::Flags => {
                let services = api.services.list().await?;
                render_service_flags(&services);
            }
        },
        Command::Orders => {
            let bookings = api.cart.booking_details().await?;
            if json {
                return print_json(&bookings);
            }
            println!("All Orders ({})", bookings.len());
            for booking in &bookings {
                println!(
                    "{:<26} {:<12} {:<12} {:>10.2} {}",
                    booking.checkout_id.as_deref().unwrap_or(&booking.id),
                    booking.date.as_deref().unwrap_or("-"),
                    booking.status.as_deref().unwrap_or("-"),
                    booking.total(),
                    booking.address.as_deref().unwrap_or("-"),
                );
            }
        }
        Command::Users => match api.users.list().await? {
            Availability::Available(users) => {
                if json {
                    return print_json(&users);
                }
                println!("All Users ({})", users.len());
                for user in &users {
                    println!(
                        "{:<26} {:<24} {:<14} {:<6} {}",
                        user.id,
                        user.name,
                        user.phone_number,
                        user.role,
                        if user.is_verified { "verified" } else { "unverified" }
                    );
                }
            }
            Availability::Unavailable { reason } => {
                println!("User listing is not available: {reason}");
            }
        },
        Command::Profile { action } => match action.unwrap_or(ProfileCommand::Show) {
            ProfileCommand::Show => {
                let profile = api.auth.profile().await?;
                if json {
                    return print_json(&profile);
                }
                println!("Name:  {}", profile.name.as_deref().unwrap_or("-"));
                println!("Phone: {}", profile.phone_number.as_deref().unwrap_or("-"));
                println!("Email: {}", profile.email.as_deref().unwrap_or("-"));
                println!("Role:  {}", profile.role.as_deref().unwrap_or("-"));
            }
            ProfileCommand::Update { name, email } => {
                let update = ProfileUpdate { name, email };
                print_json(&api.auth.update_profile(&update).await?)?;
            }
        },
        Command::Health => {
            print_json(&api.health.check().await?)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_filter());

    let sessions = Arc::new(
        SessionStore::new()
            .unwrap_or_else(|| SessionStore::with_dir(std::env::temp_dir().join("salonadmin"))),
    );
    sessions.set_override(cli.token.clone());

    let config = cli.gateway_config();
    debug!("Using backend {:?} with prefix {}", config.base_url, config.api_prefix);

    let gateway = Arc::new(Gateway::with_reqwest(config, sessions.clone()));
    let api = Api::new(gateway);

    if let Err(e) = run(cli, api, sessions).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
