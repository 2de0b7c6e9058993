pub mod wiki;

pub use wiki::{FetchedPage, WikiFetcher};
