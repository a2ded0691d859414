mod api;
mod output;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::{Input, Password};

use crate::api::ApiClient;

#[derive(Parser)]
#[command(
    name = "equipviz",
    about = "Client for the EquipViz equipment dataset service",
    version
)]
struct Cli {
    /// Base URL of the EquipViz server.
    #[arg(
        long,
        global = true,
        env = "EQUIPVIZ_SERVER",
        default_value = "http://127.0.0.1:8000"
    )]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a new user account.
    Register,
    /// Upload an equipment CSV file and show its summary.
    Upload {
        /// Path to the CSV file.
        file: PathBuf,
    },
    /// List the retained datasets, newest first.
    List,
    /// Show one dataset record.
    Show {
        /// Dataset ID.
        id: i32,
    },
    /// Download the PDF report for a dataset (requires credentials).
    Report {
        /// Dataset ID.
        id: i32,
        /// Output path; defaults to equipment_report_<id>.pdf.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = ApiClient::new(cli.server)?;

    match cli.command {
        Command::Register => register(&client),
        Command::Upload { file } => upload(&client, &file),
        Command::List => list(&client),
        Command::Show { id } => show(&client, id),
        Command::Report { id, output } => report(&client, id, output),
    }
}

fn register(client: &ApiClient) -> Result<()> {
    let username: String = Input::new()
        .with_prompt("Username")
        .interact_text()
        .context("Failed to read username")?;
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .context("Failed to read password")?;

    client.register(&username, &password)?;
    println!("{} user '{username}'", style("Registered").green().bold());
    Ok(())
}

fn upload(client: &ApiClient, file: &Path) -> Result<()> {
    let bytes = fs::read(file).with_context(|| format!("Cannot read {}", file.display()))?;
    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string());
    let Some(file_name) = file_name else {
        bail!("{} has no usable filename", file.display());
    };

    let result = client.upload(&file_name, bytes)?;
    output::print_upload_result(&result);
    Ok(())
}

fn list(client: &ApiClient) -> Result<()> {
    let datasets = client.list()?;
    output::print_dataset_list(&datasets);
    Ok(())
}

fn show(client: &ApiClient, id: i32) -> Result<()> {
    let dataset = client.get(id)?;
    output::print_dataset(&dataset);
    Ok(())
}

fn report(client: &ApiClient, id: i32, output: Option<PathBuf>) -> Result<()> {
    // Report downloads are credentialed; prompt and log in first.
    let username: String = Input::new()
        .with_prompt("Username")
        .interact_text()
        .context("Failed to read username")?;
    let password = Password::new()
        .with_prompt("Password")
        .interact()
        .context("Failed to read password")?;

    let token = client.login(&username, &password)?;
    let pdf = client.download_report(id, &token)?;

    let path = output.unwrap_or_else(|| PathBuf::from(format!("equipment_report_{id}.pdf")));
    fs::write(&path, pdf).with_context(|| format!("Cannot write {}", path.display()))?;

    println!(
        "{} report for dataset #{id} to {}",
        style("Saved").green().bold(),
        path.display()
    );
    Ok(())
}
