// ledger_core - account model and program interface shared by the ledger
// runtime and the programs it executes.
//
//! Everything a program needs to compile against: account ids and records,
//! the views handed to and returned from programs, program-derived address
//! derivation, and the rent schedule. The runtime itself lives in `ledger`.

pub mod account;
pub mod address;
pub mod native_token;
pub mod program;
pub mod rent;

pub use account::{
    Account, AccountId, AccountPostState, AccountWithMetadata, ProgramId, SYSTEM_PROGRAM_ID,
};
pub use address::{AddressError, create_program_address, find_program_address};
pub use program::{Program, ProgramContext, ProgramError, ProgramOutput};
pub use rent::Rent;
