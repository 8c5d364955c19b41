//! The serializable surface of every engine operation (§6).
//!
//! `Operation` and `OperationResponse` give the nine façade calls a concrete
//! wire shape so that a caller — a CLI, a test harness, an eventual HTTP
//! layer — can describe a request and parse a response without reaching
//! into `dispatch_core` types directly.

use serde::{Deserialize, Serialize};
use tracing::info;

use dispatch_core::grid::Position;
use dispatch_core::{DriverId, Engine, EngineError, RideId, RiderId};
use dispatch_core::{DriverSnapshot, RideSnapshot, RiderSnapshot, StateSnapshot};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Operation {
    GetState,
    CreateDriver {
        id: Option<DriverId>,
        position: Position,
    },
    DeleteDriver {
        id: DriverId,
    },
    CreateRider {
        id: Option<RiderId>,
        position: Position,
    },
    DeleteRider {
        id: RiderId,
    },
    RequestRide {
        rider_id: RiderId,
        pickup: Position,
        dropoff: Position,
    },
    AcceptRide {
        ride_id: RideId,
    },
    RejectRide {
        ride_id: RideId,
    },
    Tick,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum OperationResponse {
    State(StateSnapshot),
    Driver(DriverSnapshot),
    Rider(RiderSnapshot),
    Ride(RideSnapshot),
    Ack,
}

/// Name used in log lines; kept separate from the `serde(tag)` casing so
/// logging can change independently of the wire format.
fn operation_name(operation: &Operation) -> &'static str {
    match operation {
        Operation::GetState => "get_state",
        Operation::CreateDriver { .. } => "create_driver",
        Operation::DeleteDriver { .. } => "delete_driver",
        Operation::CreateRider { .. } => "create_rider",
        Operation::DeleteRider { .. } => "delete_rider",
        Operation::RequestRide { .. } => "request_ride",
        Operation::AcceptRide { .. } => "accept_ride",
        Operation::RejectRide { .. } => "reject_ride",
        Operation::Tick => "tick",
        Operation::Reset => "reset",
    }
}

/// Run one operation against `engine` and map its result onto the wire
/// response shape. Every operation is logged at `info` on success and
/// `warn` on failure (see [`crate::logging`]).
pub fn handle_operation(
    engine: &Engine,
    operation: Operation,
) -> Result<OperationResponse, EngineError> {
    let name = operation_name(&operation);
    let result = match operation {
        Operation::GetState => Ok(OperationResponse::State(engine.get_state())),
        Operation::CreateDriver { id, position } => engine
            .create_driver(id, position)
            .map(OperationResponse::Driver),
        Operation::DeleteDriver { id } => engine.delete_driver(&id).map(|()| OperationResponse::Ack),
        Operation::CreateRider { id, position } => engine
            .create_rider(id, position)
            .map(OperationResponse::Rider),
        Operation::DeleteRider { id } => engine.delete_rider(&id).map(|()| OperationResponse::Ack),
        Operation::RequestRide {
            rider_id,
            pickup,
            dropoff,
        } => engine
            .request_ride(&rider_id, pickup, dropoff)
            .map(OperationResponse::Ride),
        Operation::AcceptRide { ride_id } => {
            engine.accept_ride(&ride_id).map(OperationResponse::Ride)
        }
        Operation::RejectRide { ride_id } => {
            engine.reject_ride(&ride_id).map(OperationResponse::Ride)
        }
        Operation::Tick => Ok(OperationResponse::State(engine.tick())),
        Operation::Reset => {
            engine.reset();
            Ok(OperationResponse::Ack)
        }
    };

    match &result {
        Ok(_) => info!(operation = name, "operation completed"),
        Err(error) => tracing::warn!(operation = name, %error, "operation failed"),
    }

    result
}
