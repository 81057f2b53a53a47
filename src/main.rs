use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use log::{error, info};
use nchs_explorer::app::args::Cli;
use nchs_explorer::app::session::Session;
use nchs_explorer::app::{execute, validate::validate_request};
use nchs_explorer::utils::logging::{create_spinner, finish_progress_bar};
use nchs_explorer::{
    DocumentStore, DrugPoisoningDocument, ExplorerConfig, QueryEngine, Result, TableStore,
};

fn open_engine(config: &ExplorerConfig) -> Result<QueryEngine> {
    let spinner = create_spinner(Some("Loading NCHS datasets..."));
    let opened = TableStore::open(config).and_then(|store| {
        let document = DrugPoisoningDocument::open(&config.drug_poisoning_xml)?;
        Ok((store, document))
    });
    finish_progress_bar(&spinner, None);

    let (store, document) = opened?;
    if let Some(source) = document.source() {
        info!(
            "Loaded {} drug poisoning statistics from {}",
            document.statistics().len(),
            source.display()
        );
    }
    Ok(QueryEngine::new(Arc::new(store), Arc::new(document)))
}

fn run(cli: &Cli) -> Result<()> {
    let engine = open_engine(&cli.config())?;

    if let Some(request) = cli.request() {
        let request = validate_request(&engine, &request)?;
        println!("{request}\n");
        println!("{}", execute(&engine, &request, cli.format)?);
        return Ok(());
    }

    let stdin = io::stdin();
    let mut session = Session::new(&engine, stdin.lock(), io::stdout(), cli.format);
    session.run()
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse_args();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
