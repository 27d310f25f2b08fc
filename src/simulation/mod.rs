//! Interface to the external coalescent simulation oracle.
//!
//! The simulator itself is a black box: this module owns only the seam the
//! rest of the crate consumes ([`LikelihoodOracle`]), the textual
//! request/response protocol, and the thin production implementation that
//! drives one external run per evaluation.

pub mod errors;
pub mod oracle;
pub mod protocol;

pub use errors::{SimResult, SimulationError};
pub use oracle::{
    CommandRunner, ExternalOracle, LikelihoodOracle, OracleConfig, OracleProcess, SeedSequence,
};
pub use protocol::{SimulationReply, SimulationRequest};
