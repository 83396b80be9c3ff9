//! CLI tool for the card registry.
//!
//! # Usage
//!
//! ```bash
//! # Check a single value
//! cardregistry check card 4532015112830366
//! cardregistry check cpf 111.444.777-35
//! cardregistry check date 25/05/2004
//!
//! # Apply an input mask
//! cardregistry format cpf 11144477735
//!
//! # Manage the data file
//! cardregistry add --holder-name "Maria Silva" --card-number 4532015112830366 \
//!     --birth-date 25/05/2004 --cpf 11144477735
//! cardregistry list
//! cardregistry update <id> --holder-name "Maria Souza"
//! cardregistry remove <id>
//!
//! # Re-validate every stored record
//! cardregistry audit
//!
//! # Generate test payloads
//! cardregistry generate --count 5 --output json
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use card_registry::batch::{AuditReport, BatchValidator};
use card_registry::birth_date::{format_birth_date, parse_birth_date};
use card_registry::clock::{Clock, SystemClock};
use card_registry::cpf::check_cpf;
use card_registry::format::{format_card_number, format_cpf, format_date};
use card_registry::generate;
use card_registry::luhn::check_card_number;
use card_registry::mask::{mask_card_number, mask_cpf};
use card_registry::registry::{CardRegistry, RegistryError};
use card_registry::store::{CardStore, JsonFileStore};
use card_registry::{CardRecord, CardUpdate, NewCard, ValidationError};

#[derive(Parser)]
#[command(name = "cardregistry")]
#[command(author, version, about = "Validated personal credit card registry")]
struct Cli {
    /// JSON file holding the card records
    #[arg(
        short,
        long,
        global = true,
        env = "CARD_REGISTRY_DATA",
        default_value = "data/cards.json"
    )]
    data: PathBuf,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a single value
    Check {
        /// What kind of value to check
        kind: ValueKind,
        /// The value, formatted or not
        value: String,
    },

    /// Apply the input mask for a kind of value
    Format {
        /// What kind of value to format
        kind: ValueKind,
        /// The raw value
        value: String,
    },

    /// List stored cards (card numbers and CPFs masked in text output)
    List,

    /// Show one stored card
    Show {
        /// Card id
        id: String,
    },

    /// Validate and store a new card
    Add(CardFields),

    /// Re-validate and change some fields of a stored card
    Update {
        /// Card id
        id: String,

        #[command(flatten)]
        fields: CardFields,
    },

    /// Delete a stored card
    Remove {
        /// Card id
        id: String,
    },

    /// Re-validate every stored card against the current rules
    Audit,

    /// Generate valid test payloads (for testing only)
    Generate {
        /// Number of payloads to generate
        #[arg(short, long, default_value = "1")]
        count: usize,

        /// Store the generated cards in the data file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Args)]
struct CardFields {
    /// Holder name
    #[arg(long)]
    holder_name: Option<String>,

    /// Card number (spaces allowed)
    #[arg(long)]
    card_number: Option<String>,

    /// Birth date as DD/MM/YYYY
    #[arg(long)]
    birth_date: Option<String>,

    /// CPF (dots and dash allowed)
    #[arg(long)]
    cpf: Option<String>,
}

impl CardFields {
    fn into_new_card(self) -> NewCard {
        NewCard {
            holder_name: self.holder_name.unwrap_or_default(),
            card_number: self.card_number.unwrap_or_default(),
            birth_date: self.birth_date.unwrap_or_default(),
            cpf: self.cpf.unwrap_or_default(),
        }
    }

    fn into_update(self) -> CardUpdate {
        CardUpdate {
            holder_name: self.holder_name,
            card_number: self.card_number,
            birth_date: self.birth_date,
            cpf: self.cpf,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ValueKind {
    Card,
    Cpf,
    Date,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct CheckOutput {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    normalized: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ValidationError>,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = cli.output;

    match cli.command {
        Commands::Check { kind, value } => Ok(cmd_check(kind, &value, output)),
        Commands::Format { kind, value } => {
            cmd_format(kind, &value);
            Ok(ExitCode::SUCCESS)
        }
        Commands::List => cmd_list(&open_registry(&cli.data)?, output),
        Commands::Show { id } => cmd_show(&open_registry(&cli.data)?, &id, output),
        Commands::Add(fields) => cmd_add(&open_registry(&cli.data)?, fields.into_new_card(), output),
        Commands::Update { id, fields } => {
            cmd_update(&open_registry(&cli.data)?, &id, fields.into_update(), output)
        }
        Commands::Remove { id } => cmd_remove(&open_registry(&cli.data)?, &id),
        Commands::Audit => cmd_audit(&cli.data, output),
        Commands::Generate { count, save } => {
            let registry = if save {
                Some(open_registry(&cli.data)?)
            } else {
                None
            };
            cmd_generate(count, registry.as_ref(), output)
        }
    }
}

fn open_registry(path: &Path) -> anyhow::Result<CardRegistry> {
    let store = JsonFileStore::open(path)
        .with_context(|| format!("opening card data file {}", path.display()))?;
    Ok(CardRegistry::new(store))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_check(kind: ValueKind, value: &str, output: OutputFormat) -> ExitCode {
    let result = match kind {
        ValueKind::Card => check_card_number(value),
        ValueKind::Cpf => check_cpf(value),
        ValueKind::Date => parse_birth_date(value, &SystemClock).map(format_birth_date),
    };

    let check = match result {
        Ok(normalized) => CheckOutput {
            valid: true,
            normalized: Some(normalized),
            error: None,
        },
        Err(e) => CheckOutput {
            valid: false,
            normalized: None,
            error: Some(e),
        },
    };

    match output {
        OutputFormat::Text => {
            if check.valid {
                println!("Valid: yes");
            } else {
                println!("Valid: no");
            }
            if let Some(e) = &check.error {
                println!("Error: {}", e);
            }
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(&check) {
                println!("{}", json);
            }
        }
    }

    if check.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn cmd_format(kind: ValueKind, value: &str) {
    let formatted = match kind {
        ValueKind::Card => format_card_number(value),
        ValueKind::Cpf => format_cpf(value),
        ValueKind::Date => format_date(value),
    };
    println!("{}", formatted);
}

fn print_card(record: &CardRecord) {
    println!("Id: {}", record.id());
    println!("Holder: {}", record.holder_name());
    println!("Card: {}", mask_card_number(record.card_number()));
    println!("Birth Date: {}", record.birth_date());
    println!("CPF: {}", mask_cpf(record.cpf()));
    println!("Created: {}", record.created_at().to_rfc3339());
}

fn cmd_list(registry: &CardRegistry, output: OutputFormat) -> anyhow::Result<ExitCode> {
    let records = registry.list()?;

    match output {
        OutputFormat::Text => {
            if records.is_empty() {
                println!("No cards stored");
            }
            for record in &records {
                println!(
                    "{}  {:<30}  {}",
                    record.id(),
                    record.holder_name(),
                    record.masked_card_number()
                );
            }
        }
        OutputFormat::Json => print_json(&records)?,
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_show(registry: &CardRegistry, id: &str, output: OutputFormat) -> anyhow::Result<ExitCode> {
    match registry.get(id) {
        Ok(record) => {
            match output {
                OutputFormat::Text => print_card(&record),
                OutputFormat::Json => print_json(&record)?,
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => report_registry_error(e, output),
    }
}

fn cmd_add(registry: &CardRegistry, card: NewCard, output: OutputFormat) -> anyhow::Result<ExitCode> {
    match registry.create(&card) {
        Ok(record) => {
            match output {
                OutputFormat::Text => {
                    println!("Card stored");
                    print_card(&record);
                }
                OutputFormat::Json => print_json(&record)?,
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => report_registry_error(e, output),
    }
}

fn cmd_update(
    registry: &CardRegistry,
    id: &str,
    update: CardUpdate,
    output: OutputFormat,
) -> anyhow::Result<ExitCode> {
    if update.is_empty() {
        eprintln!("Error: nothing to update; pass at least one field");
        return Ok(ExitCode::FAILURE);
    }

    match registry.update(id, &update) {
        Ok(record) => {
            match output {
                OutputFormat::Text => {
                    println!("Card updated");
                    print_card(&record);
                }
                OutputFormat::Json => print_json(&record)?,
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => report_registry_error(e, output),
    }
}

fn cmd_remove(registry: &CardRegistry, id: &str) -> anyhow::Result<ExitCode> {
    match registry.delete(id) {
        Ok(()) => {
            println!("Card {} removed", id);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => report_registry_error(e, OutputFormat::Text),
    }
}

fn cmd_audit(path: &Path, output: OutputFormat) -> anyhow::Result<ExitCode> {
    let store = JsonFileStore::open(path)
        .with_context(|| format!("opening card data file {}", path.display()))?;
    let records = store.list()?;

    let batch = BatchValidator::new(SystemClock);
    #[cfg(feature = "parallel")]
    let report = batch.audit_parallel(&records);
    #[cfg(not(feature = "parallel"))]
    let report = batch.audit(&records);

    match output {
        OutputFormat::Text => print_audit(&report),
        OutputFormat::Json => print_json(&report)?,
    }

    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_audit(report: &AuditReport) {
    println!("Checked: {}", report.checked);
    println!("Passed: {}", report.passed());
    println!("Failed: {}", report.failures.len());

    for failure in &report.failures {
        println!();
        println!("{}  {}", failure.id, failure.card_number);
        for error in &failure.errors {
            println!("  - {}", error);
        }
    }
}

fn cmd_generate(
    count: usize,
    registry: Option<&CardRegistry>,
    output: OutputFormat,
) -> anyhow::Result<ExitCode> {
    let today = SystemClock.today();
    let cards = generate::generate_cards(today, count);

    if let Some(registry) = registry {
        for card in &cards {
            registry.create(card).context("storing generated card")?;
        }
    }

    match output {
        OutputFormat::Text => {
            for card in &cards {
                println!(
                    "{} | {} | {} | {}",
                    card.holder_name,
                    format_card_number(&card.card_number),
                    card.birth_date,
                    format_cpf(&card.cpf)
                );
            }
        }
        OutputFormat::Json => print_json(&cards)?,
    }

    Ok(ExitCode::SUCCESS)
}

fn report_registry_error(error: RegistryError, output: OutputFormat) -> anyhow::Result<ExitCode> {
    match error {
        RegistryError::Invalid(errors) => {
            match output {
                OutputFormat::Text => {
                    eprintln!("Card rejected:");
                    for e in &errors {
                        eprintln!("  - {}", e);
                    }
                }
                OutputFormat::Json => print_json(&serde_json::json!({ "errors": errors }))?,
            }
            Ok(ExitCode::FAILURE)
        }
        RegistryError::NotFound(id) => {
            eprintln!("Error: card {} not found", id);
            Ok(ExitCode::FAILURE)
        }
        RegistryError::Store(e) => Err(e.into()),
    }
}
