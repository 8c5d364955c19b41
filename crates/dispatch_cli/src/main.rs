//! Command-line driver for the ride-dispatch engine.
//!
//! Each invocation runs a single operation against a fresh engine and prints
//! the result as JSON; `run-script` instead replays a JSON array of
//! operations against one engine and prints the final state, for scripting
//! a whole scenario in one process.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use dispatch_api::{handle_operation, logging, Operation};
use dispatch_core::grid::Position;
use dispatch_core::{DriverId, Engine, RideId, RiderId};

#[derive(Parser)]
#[command(name = "dispatch_cli", about = "Ride-dispatch simulation engine CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current world state (empty on a fresh engine)
    State,
    /// Create a driver
    CreateDriver {
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        x: i32,
        #[arg(long)]
        y: i32,
    },
    /// Remove a driver
    DeleteDriver {
        #[arg(long)]
        id: String,
    },
    /// Create a rider
    CreateRider {
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        x: i32,
        #[arg(long)]
        y: i32,
    },
    /// Remove a rider
    DeleteRider {
        #[arg(long)]
        id: String,
    },
    /// Request a ride for a rider
    RequestRide {
        #[arg(long)]
        rider_id: String,
        #[arg(long)]
        pickup_x: i32,
        #[arg(long)]
        pickup_y: i32,
        #[arg(long)]
        dropoff_x: i32,
        #[arg(long)]
        dropoff_y: i32,
    },
    /// Accept a ride offer on behalf of its assigned driver
    AcceptRide {
        #[arg(long)]
        ride_id: String,
    },
    /// Reject a ride offer on behalf of its assigned driver
    RejectRide {
        #[arg(long)]
        ride_id: String,
    },
    /// Advance the simulation by one tick
    Tick,
    /// Replay a JSON array of operations against one engine, then print the
    /// final state
    RunScript {
        /// Path to a JSON file containing an array of operations
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    logging::init_logging();
    let cli = Cli::parse();
    let engine = Engine::new();

    let response = match cli.command {
        Commands::State => handle_operation(&engine, Operation::GetState),
        Commands::CreateDriver { id, x, y } => handle_operation(
            &engine,
            Operation::CreateDriver {
                id: id.map(DriverId::from),
                position: Position::new(x, y),
            },
        ),
        Commands::DeleteDriver { id } => {
            handle_operation(&engine, Operation::DeleteDriver { id: DriverId::from(id) })
        }
        Commands::CreateRider { id, x, y } => handle_operation(
            &engine,
            Operation::CreateRider {
                id: id.map(RiderId::from),
                position: Position::new(x, y),
            },
        ),
        Commands::DeleteRider { id } => {
            handle_operation(&engine, Operation::DeleteRider { id: RiderId::from(id) })
        }
        Commands::RequestRide {
            rider_id,
            pickup_x,
            pickup_y,
            dropoff_x,
            dropoff_y,
        } => handle_operation(
            &engine,
            Operation::RequestRide {
                rider_id: RiderId::from(rider_id),
                pickup: Position::new(pickup_x, pickup_y),
                dropoff: Position::new(dropoff_x, dropoff_y),
            },
        ),
        Commands::AcceptRide { ride_id } => handle_operation(
            &engine,
            Operation::AcceptRide {
                ride_id: RideId::from(ride_id),
            },
        ),
        Commands::RejectRide { ride_id } => handle_operation(
            &engine,
            Operation::RejectRide {
                ride_id: RideId::from(ride_id),
            },
        ),
        Commands::Tick => handle_operation(&engine, Operation::Tick),
        Commands::RunScript { path } => return run_script(&engine, &path),
    };

    print_response(response)
}

fn run_script(engine: &Engine, path: &PathBuf) -> Result<()> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    let operations: Vec<Operation> =
        serde_json::from_str(&contents).context("script is not a JSON array of operations")?;

    for operation in operations {
        let response = handle_operation(engine, operation);
        if let Err(error) = response {
            anyhow::bail!("operation failed: {error}");
        }
    }

    let state = handle_operation(engine, Operation::GetState)?;
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}

fn print_response(response: Result<dispatch_api::OperationResponse, dispatch_core::EngineError>) -> Result<()> {
    match response {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(error) => anyhow::bail!("operation failed: {error}"),
    }
}
