//! Command line definition using clap
//!
//! Without a subcommand the interactive menu runs. `run <query>` executes a
//! single query and exits.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::app::{OutputFormat, QueryRequest};
use crate::config::ExplorerConfig;
use crate::query::ChronicDiseaseParams;

/// Explore four NCHS public-health datasets
#[derive(Parser, Debug)]
#[command(name = "nchs-explorer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the Parquet tables
    #[arg(long, env = "NCHS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to the drug poisoning XML document
    #[arg(long, env = "NCHS_DRUG_POISONING_XML")]
    pub xml: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Load tables one after another
    #[arg(long)]
    pub sequential: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a single query and exit
    Run {
        #[command(subcommand)]
        query: QueryCommand,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum QueryCommand {
    /// Leading cause of death in each state
    LeadingCause {
        #[arg(long)]
        year: i32,
    },
    /// States with overweight above 35% and their inactivity
    OverweightInactivity {
        #[arg(long)]
        year: i32,
    },
    /// States where heart disease is the leading cause, with inactivity
    HeartDisease {
        #[arg(long)]
        year: i32,
    },
    /// Chronic disease values by stratification
    ChronicDisease {
        #[arg(long)]
        year_start: i32,
        #[arg(long)]
        year_end: i32,
        #[arg(long)]
        state: String,
        #[arg(long)]
        question: String,
    },
    /// Nutrition values by stratification
    Nutrition {
        #[arg(long)]
        year: i32,
        #[arg(long)]
        state: String,
        #[arg(long)]
        question: String,
    },
    /// Causes of death in states with inactivity above 30%
    InactivityCauses {
        #[arg(long)]
        year: i32,
    },
    /// Drug poisoning deaths by sex, race and age range
    DrugPoisoning {
        #[arg(long)]
        year: i32,
        #[arg(long)]
        state: String,
    },
}

impl From<QueryCommand> for QueryRequest {
    fn from(command: QueryCommand) -> Self {
        match command {
            QueryCommand::LeadingCause { year } => Self::LeadingCause { year },
            QueryCommand::OverweightInactivity { year } => Self::OverweightInactivity { year },
            QueryCommand::HeartDisease { year } => Self::HeartDiseaseInactivity { year },
            QueryCommand::ChronicDisease {
                year_start,
                year_end,
                state,
                question,
            } => Self::ChronicDisease(ChronicDiseaseParams {
                year_start,
                year_end,
                state,
                question_id: question,
            }),
            QueryCommand::Nutrition {
                year,
                state,
                question,
            } => Self::NutritionStratified {
                year,
                state,
                question_id: question,
            },
            QueryCommand::InactivityCauses { year } => Self::InactivityCauses { year },
            QueryCommand::DrugPoisoning { year, state } => Self::DrugPoisoning { year, state },
        }
    }
}

impl Cli {
    /// Parse command line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Environment configuration with command line options applied on top
    #[must_use]
    pub fn config(&self) -> ExplorerConfig {
        let mut config = ExplorerConfig::from_env();
        if let Some(dir) = &self.data_dir {
            config = config.with_data_dir(dir);
        }
        if let Some(xml) = &self.xml {
            config.drug_poisoning_xml.clone_from(xml);
        }
        if self.sequential {
            config.parallel_load = false;
        }
        config
    }

    /// The one-shot request, if a `run` subcommand was given
    #[must_use]
    pub fn request(&self) -> Option<QueryRequest> {
        self.command.as_ref().map(|command| match command {
            Command::Run { query } => QueryRequest::from(query.clone()),
        })
    }
}
