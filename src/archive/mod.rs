pub mod date;
pub mod detail;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod types;
pub mod urls;

pub use detail::{DetailPolicy, DetailSource};
pub use error::{ExtractError, FetchError};
pub use fetch::{Fetcher, HttpConfig, HttpFetcher};
pub use types::Rating;
