//! gripdash-core - shared domain types for the gripper dashboard client.
//!
//! Everything the other crates agree on lives here: the classified
//! connection state, the Modbus health mirror, digital-output state with
//! its bounded change history, the device parameter registry with the
//! client-side validation ranges, and the in-flight guard used to keep
//! polls from overlapping.

pub mod error;
pub mod params;
pub mod pending;
pub mod status;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use params::{validate_output_port, validate_output_value, Param, ParamKind, ALL_PARAMS};
pub use pending::{PendingFlag, PendingGuard};
pub use status::{classify_status, ConnectionState};
pub use types::{
    ConnectionSnapshot, DigitalOutputState, ModbusHealth, OutputChange, ParamReading,
    ParamSnapshot, HISTORY_LIMIT, OUTPUT_PORT_MAX, OUTPUT_PORT_MIN,
};
