pub mod access;
pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod transport;

pub use access::DataAccess;
pub use config::Config;
pub use error::FetchError;
pub use filter::{apply_filters, FilterState, FilterView};
