use clap::{Parser, Subcommand};
use loansim::application::simulator::LoanSimulator;
use loansim::config::{AuditConfig, ServerConfig, StorageConfig};
use loansim::domain::amortization::amortize;
use loansim::domain::loan::LoanRequest;
use loansim::domain::ports::{SimulationStoreBox, SimulationStoreFactory};
use loansim::infrastructure::in_memory::InMemorySimulationStore;
#[cfg(feature = "storage-rocksdb")]
use loansim::infrastructure::rocksdb::RocksDBStore;
use loansim::infrastructure::scoring::RandomScoringProvider;
use loansim::interfaces::csv::loan_reader::LoanRequestReader;
use loansim::interfaces::csv::schedule_writer::ScheduleWriter;
use loansim::interfaces::csv::simulation_writer::SimulationWriter;
use loansim::interfaces::http;
use loansim::telemetry;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the simulation HTTP API
    Serve {
        #[command(flatten)]
        server: ServerConfig,
        #[command(flatten)]
        storage: StorageConfig,
        #[command(flatten)]
        audit: AuditConfig,
    },
    /// Simulate every loan of a CSV file and print the audited results
    Batch {
        /// Input CSV file with `amount,rate,months` columns
        input: PathBuf,
        #[command(flatten)]
        storage: StorageConfig,
        #[command(flatten)]
        audit: AuditConfig,
    },
    /// Print the amortization schedule of one loan as CSV
    Schedule {
        /// Loan principal
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
        /// Annual interest rate in percent
        #[arg(long, allow_negative_numbers = true)]
        rate: f64,
        /// Term in months
        #[arg(long, allow_negative_numbers = true)]
        months: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            server,
            storage,
            audit,
        } => serve(server, storage, audit).await,
        Command::Batch {
            input,
            storage,
            audit,
        } => batch(input, storage, audit).await,
        Command::Schedule {
            amount,
            rate,
            months,
        } => schedule(LoanRequest::new(amount, rate, months)),
    }
}

fn in_memory_stores() -> SimulationStoreFactory {
    let store = InMemorySimulationStore::new();
    Arc::new(move || Box::new(store.clone()) as SimulationStoreBox)
}

fn store_factory(storage: &StorageConfig) -> Result<SimulationStoreFactory> {
    match &storage.db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = RocksDBStore::open(path).into_diagnostic()?;
            Ok(Arc::new(move || Box::new(store.clone()) as SimulationStoreBox))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            tracing::warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(in_memory_stores())
        }
        None => Ok(in_memory_stores()),
    }
}

async fn serve(server: ServerConfig, storage: StorageConfig, audit: AuditConfig) -> Result<()> {
    let provider = RandomScoringProvider::new(&audit).into_diagnostic()?;
    let simulator = Arc::new(LoanSimulator::new(
        store_factory(&storage)?,
        Arc::new(provider),
    ));

    http::serve(server.bind, simulator.clone())
        .await
        .into_diagnostic()?;

    // Let audits that are still running reach their terminal state.
    if let Ok(simulator) = Arc::try_unwrap(simulator) {
        simulator.shutdown().await.into_diagnostic()?;
    }
    Ok(())
}

async fn batch(input: PathBuf, storage: StorageConfig, audit: AuditConfig) -> Result<()> {
    let provider = RandomScoringProvider::new(&audit).into_diagnostic()?;
    let stores = store_factory(&storage)?;
    let results_store = stores();
    let simulator = LoanSimulator::new(stores, Arc::new(provider));

    let file = File::open(input).into_diagnostic()?;
    let reader = LoanRequestReader::new(file);
    let mut ids = Vec::new();
    for request in reader.requests() {
        match request {
            Ok(request) => match simulator.simulate(request).await {
                Ok(receipt) => ids.push(receipt.simulation_id),
                Err(e) => tracing::warn!(error = %e, "Error simulating loan"),
            },
            Err(e) => tracing::warn!(error = %e, "Error reading loan request"),
        }
    }

    // Every audit reaches a terminal state before results are reported.
    simulator.shutdown().await.into_diagnostic()?;

    let mut records = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(record) = results_store.get(id).await.into_diagnostic()? {
            records.push(record);
        }
    }

    let stdout = io::stdout();
    let mut writer = SimulationWriter::new(stdout.lock());
    writer.write_simulations(&records).into_diagnostic()?;

    Ok(())
}

fn schedule(request: LoanRequest) -> Result<()> {
    let terms = request.validate().into_diagnostic()?;
    let result = amortize(&terms).into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = ScheduleWriter::new(stdout.lock());
    writer.write_schedule(&result.schedule).into_diagnostic()?;

    Ok(())
}
