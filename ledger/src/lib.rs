// ledger - in-process account ledger: signed transactions, program
// execution, validation and atomic commit.

pub mod config;
pub mod error;
pub mod file;
pub mod keys;
pub mod ledger;
pub mod locks;
pub mod store;
pub mod transaction;

pub use config::LedgerConfig;
pub use error::LedgerError;
pub use file::LedgerFile;
pub use keys::{PrivateKey, PublicKey, Signature, account_id_from_key};
pub use ledger::{EventRecord, Ledger, TransactionReceipt, validate_execution};
pub use store::{AccountStore, VersionedAccount};
pub use transaction::{Message, Transaction, WitnessSet};
