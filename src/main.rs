use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use clinic_intake_lib::commands::{appointment, lead};
use clinic_intake_lib::config::{self, ClinicTimeZone};
use clinic_intake_lib::contact::ContactPage;
use clinic_intake_lib::gateway::HttpGateway;
use clinic_intake_lib::submission::SubmissionStatus;

#[derive(Parser)]
#[command(name = "clinic-intake")]
#[command(about = "Book appointments and send enquiries to the clinic API", long_about = None)]
#[command(version)]
struct Cli {
    /// API base address (default: $CLINIC_API_URL or http://localhost:8080/api)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Book an appointment
    Book {
        /// Full name
        #[arg(long)]
        name: String,
        /// Phone number, e.g. +1234567890
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: String,
        /// Preferred date and time in clinic time, e.g. 2024-06-01T10:00
        #[arg(long)]
        datetime: String,
        /// Reason for visit
        #[arg(long)]
        reason: Option<String>,
        /// Additional notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// Send a message through the contact form
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        message: String,
    },
    /// Manage appointments
    Appointments {
        #[command(subcommand)]
        command: AppointmentCommands,
    },
    /// Manage leads
    Leads {
        #[command(subcommand)]
        command: LeadCommands,
    },
}

#[derive(Subcommand)]
enum AppointmentCommands {
    /// List appointments
    List {
        /// Only appointments in this status (PENDING, CONFIRMED, CANCELLED, COMPLETED)
        #[arg(long)]
        status: Option<String>,
    },
    /// Show one appointment
    Get { id: i64 },
    /// Change an appointment's status
    SetStatus { id: i64, status: String },
}

#[derive(Subcommand)]
enum LeadCommands {
    /// List leads
    List,
    /// Show one lead
    Get { id: i64 },
    /// Change a lead's status (NEW, CONTACTED, CONVERTED, LOST)
    SetStatus { id: i64, status: String },
    /// Download the lead spreadsheet
    Export {
        /// Output file
        #[arg(long, default_value = "leads.xlsx")]
        out: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    clinic_intake_lib::init_tracing();
    let cli = Cli::parse();

    let base_url = cli.api_url.unwrap_or_else(config::api_base_url);
    let gateway = Arc::new(HttpGateway::new(&base_url)?);

    match cli.command {
        Commands::Book {
            name,
            phone,
            email,
            datetime,
            reason,
            notes,
        } => {
            let zone = ClinicTimeZone::from_env()?;
            let mut page = ContactPage::new(gateway, zone);
            let input = appointment::BookingInput {
                patient_name: name,
                phone_number: phone,
                email,
                appointment_date_time: datetime,
                reason,
                notes,
            };
            let status = appointment::book_appointment(&mut page, input)
                .await
                .map_err(|e| anyhow!(e))?;
            report(status)
        }
        Commands::Contact {
            name,
            email,
            phone,
            message,
        } => {
            // Leads carry no date-time, so the clinic zone is irrelevant here.
            let mut page = ContactPage::new(gateway, ClinicTimeZone::default());
            let input = lead::ContactInput {
                name,
                email,
                phone_number: phone,
                message,
            };
            let status = lead::send_contact_message(&mut page, input)
                .await
                .map_err(|e| anyhow!(e))?;
            report(status)
        }
        Commands::Appointments { command } => match command {
            AppointmentCommands::List { status } => print_json(
                &appointment::list_appointments(gateway.as_ref(), status.as_deref())
                    .await
                    .map_err(|e| anyhow!(e))?,
            ),
            AppointmentCommands::Get { id } => print_json(
                &appointment::get_appointment(gateway.as_ref(), id)
                    .await
                    .map_err(|e| anyhow!(e))?,
            ),
            AppointmentCommands::SetStatus { id, status } => print_json(
                &appointment::set_appointment_status(gateway.as_ref(), id, &status)
                    .await
                    .map_err(|e| anyhow!(e))?,
            ),
        },
        Commands::Leads { command } => match command {
            LeadCommands::List => print_json(
                &lead::list_leads(gateway.as_ref())
                    .await
                    .map_err(|e| anyhow!(e))?,
            ),
            LeadCommands::Get { id } => print_json(
                &lead::get_lead(gateway.as_ref(), id)
                    .await
                    .map_err(|e| anyhow!(e))?,
            ),
            LeadCommands::SetStatus { id, status } => print_json(
                &lead::set_lead_status(gateway.as_ref(), id, &status)
                    .await
                    .map_err(|e| anyhow!(e))?,
            ),
            LeadCommands::Export { out } => {
                let path = lead::export_leads(gateway.as_ref(), &out)
                    .await
                    .map_err(|e| anyhow!(e))?;
                println!("Exported leads to {}", path.display());
                Ok(())
            }
        },
    }
}

/// Print the form status; an error status fails the process.
fn report(status: SubmissionStatus) -> Result<()> {
    if status.is_error() {
        bail!("{}", status.text);
    }
    println!("{}", status.text);
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to render response")?;
    println!("{json}");
    Ok(())
}
