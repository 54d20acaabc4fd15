pub mod aggregator;
pub mod amount;
pub mod collector;
pub mod config;
pub mod cost_explorer;
pub mod error;
pub mod identity;
pub mod logging;
pub mod message;
pub mod notifier;
pub mod report;
pub mod response;
pub mod storage;
pub mod summary;
pub mod time_range;
pub mod timeout;

#[cfg(test)]
mod test_utils;
