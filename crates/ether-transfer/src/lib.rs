//! ether-transfer — the sender and receiver roles of the Ether protocol.
//!
//! A session moves exactly one file over one TCP connection. Callers supply
//! [`TransferHooks`] for progress and status and a [`CancelToken`] they may
//! set from any thread; the session polls it between I/O steps.

pub mod addrs;
pub mod cancel;
pub mod error;
pub mod hooks;
pub mod probe;
pub mod receiver;
pub mod sender;

pub use addrs::list_local_addresses;
pub use cancel::CancelToken;
pub use error::TransferError;
pub use hooks::{ProgressEvent, TransferHooks, TransferStatus};
pub use probe::{check_connection, Reachability};
pub use receiver::{receive_file, FileReceiver, ReceiveOutcome, ReceiveSession};
pub use sender::{send_file, FileSender, SendOutcome};
