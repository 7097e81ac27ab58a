pub mod app_error;
pub mod config;
pub mod cql_session;
pub mod tweet_store;
pub mod tweets;
