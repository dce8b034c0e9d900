pub mod client;
pub mod normalize;
pub mod transport;
pub mod types;

mod error;

pub use client::SearchClient;
pub use error::SearchError;
pub use normalize::normalize;
pub use transport::{GraphQlTransport, Transport};
pub use types::*;

pub type Result<T> = std::result::Result<T, SearchError>;
