pub mod fanout;
pub mod http;
pub mod logger;
pub mod types;

#[cfg(test)]
mod tests;

pub use fanout::join_all_ordered;
pub use http::{HttpClient, HttpError};
