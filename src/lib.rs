pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod session;
pub mod types;

pub use error::TxirimiriError;
pub use router::{TxirimiriState, txirimiri_router};
