use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use medisene::analysis::{GeminiClient, SymptomAnalyzer};
use medisene::config;
use medisene::db;
use medisene::models::{Coordinates, SymptomAnalysisRecord, SymptomInput};
use medisene::places::{staged_search, GooglePlacesClient};

#[derive(Parser)]
#[command(name = "medisene", version, about = "Symptom analysis and nearby healthcare facility search")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a symptom submission and store the result
    Analyze {
        /// Primary symptom, e.g. "headache"
        #[arg(long)]
        symptom: String,

        /// How long the symptom has lasted: less-than-day, 1-3-days,
        /// 4-7-days, 1-2-weeks, more-than-2-weeks
        #[arg(long, default_value = "1-3-days")]
        duration: String,

        /// Severity: mild, moderate, severe, very-severe
        #[arg(long, default_value = "moderate")]
        severity: String,

        /// Additional symptoms, comma separated
        #[arg(long, value_delimiter = ',')]
        additional: Vec<String>,

        /// Free-text description of the symptom
        #[arg(long, default_value = "")]
        description: String,

        /// Current medications
        #[arg(long)]
        medications: Option<String>,

        /// Known allergies
        #[arg(long)]
        allergies: Option<String>,

        /// Relevant medical history
        #[arg(long = "history")]
        medical_history: Option<String>,

        /// User identifier the record is stored under
        #[arg(long, default_value = "local")]
        user: String,

        /// Skip persisting the analysis to the local database
        #[arg(long)]
        no_store: bool,
    },

    /// Find healthcare facilities near a coordinate
    Facilities {
        #[arg(long)]
        latitude: f64,

        #[arg(long)]
        longitude: f64,
    },

    /// List stored analyses for a user, newest first
    History {
        #[arg(long, default_value = "local")]
        user: String,
    },
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Analyze {
            symptom,
            duration,
            severity,
            additional,
            description,
            medications,
            allergies,
            medical_history,
            user,
            no_store,
        } => {
            let input = SymptomInput {
                primary_symptom: symptom,
                duration: duration.parse()?,
                severity: severity.parse()?,
                additional_symptoms: additional,
                description,
                medications_context: medications,
                allergies_context: allergies,
                medical_history_context: medical_history,
            };

            let analyzer = SymptomAnalyzer::new(GeminiClient::from_env()?);

            let outcome = if no_store {
                analyzer.analyze(&input)
            } else {
                let conn = open_app_database()?;
                let record = SymptomAnalysisRecord {
                    id: Uuid::new_v4(),
                    user_id: user,
                    input: input.clone(),
                    analysis_result: None,
                    confidence_score: None,
                    api_prompt: None,
                    api_response: None,
                    created_at: Utc::now(),
                };
                db::insert_analysis(&conn, &record)?;
                info!(analysis_id = %record.id, "analysis record created");
                analyzer.analyze_and_store(&conn, &record.id, &input)
            };

            println!("{}", serde_json::to_string_pretty(&outcome.result)?);
        }

        Command::Facilities {
            latitude,
            longitude,
        } => {
            let client = GooglePlacesClient::from_env()?;
            let facilities = staged_search(
                &client,
                Coordinates {
                    latitude,
                    longitude,
                },
            )?;
            println!("{}", serde_json::to_string_pretty(&facilities)?);
        }

        Command::History { user } => {
            let conn = open_app_database()?;
            let records = db::list_analyses(&conn, &user)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }
    Ok(())
}

fn open_app_database() -> Result<rusqlite::Connection, Box<dyn std::error::Error>> {
    let dir = config::app_data_dir();
    std::fs::create_dir_all(&dir)?;
    Ok(db::open_database(&config::database_path())?)
}
