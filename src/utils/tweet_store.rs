use std::collections::HashMap;

use async_trait::async_trait;
use futures::stream::BoxStream;
use scylla::value::CqlValue;

/// One result row, keyed by column name. NULL cells are `None`.
pub type Row = HashMap<String, Option<CqlValue>>;

/// Single-pass cursor over the rows of one query
pub type RowStream = BoxStream<'static, Result<Row, QueryError>>;

/// A query failed in the store (network, timeout, malformed statement, undecodable row)
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct QueryError {
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl QueryError {
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> QueryError {
        QueryError {
            source: Box::new(err),
        }
    }
}

/// The four supported lookups on the `tweets` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TweetQuery {
    All,
    ByDate { date: String },
    ByTweeter { tweeter: String },
    OnDateByTweeter { date: String, tweeter: String },
}

impl TweetQuery {
    /// CQL text, with one positional `?` per bind value.
    ///
    /// `tweeter` is not part of the primary key, so filtering on it needs `ALLOW FILTERING`.
    pub fn cql(&self) -> &'static str {
        match self {
            TweetQuery::All => {
                "SELECT tweeter, tweet, created, created_date, tweet_id FROM tweets"
            }
            TweetQuery::ByDate { .. } => {
                "SELECT tweeter, tweet, created, created_date, tweet_id FROM tweets WHERE created_date = ?"
            }
            TweetQuery::ByTweeter { .. } => {
                "SELECT tweeter, tweet, created, created_date, tweet_id FROM tweets WHERE tweeter = ? ALLOW FILTERING"
            }
            TweetQuery::OnDateByTweeter { .. } => {
                "SELECT tweeter, tweet, created, created_date, tweet_id FROM tweets WHERE created_date = ? AND tweeter = ? ALLOW FILTERING"
            }
        }
    }

    /// Bind values in placeholder order
    pub fn binds(&self) -> Vec<String> {
        match self {
            TweetQuery::All => vec![],
            TweetQuery::ByDate { date } => vec![date.clone()],
            TweetQuery::ByTweeter { tweeter } => vec![tweeter.clone()],
            TweetQuery::OnDateByTweeter { date, tweeter } => vec![date.clone(), tweeter.clone()],
        }
    }
}

/// Read access to stored tweets. Implementations must be usable from many requests at once.
#[async_trait]
pub trait TweetStore: Send + Sync {
    async fn execute(&self, query: &TweetQuery) -> Result<RowStream, QueryError>;
}

#[cfg(test)]
pub mod memory {
    use futures::StreamExt;
    use scylla::value::{CqlTimestamp, CqlValue};

    use super::*;

    /// Test store that evaluates [TweetQuery] filters over fixture rows
    #[derive(Default, Clone)]
    pub struct MemoryStore {
        rows: Vec<Row>,
    }

    impl MemoryStore {
        pub fn new(rows: Vec<Row>) -> Self {
            Self { rows }
        }
    }

    pub fn tweet_row(
        tweeter: &str,
        tweet: &str,
        created_millis: i64,
        created_date: &str,
        id: &str,
    ) -> Row {
        Row::from([
            (
                "tweeter".to_string(),
                Some(CqlValue::Text(tweeter.to_string())),
            ),
            ("tweet".to_string(), Some(CqlValue::Text(tweet.to_string()))),
            (
                "created".to_string(),
                Some(CqlValue::Timestamp(CqlTimestamp(created_millis))),
            ),
            (
                "created_date".to_string(),
                Some(CqlValue::Text(created_date.to_string())),
            ),
            ("tweet_id".to_string(), Some(CqlValue::Text(id.to_string()))),
        ])
    }

    fn text<'a>(row: &'a Row, column: &str) -> Option<&'a str> {
        match row.get(column) {
            Some(Some(CqlValue::Text(s))) | Some(Some(CqlValue::Ascii(s))) => Some(s.as_str()),
            _ => None,
        }
    }

    fn matches(query: &TweetQuery, row: &Row) -> bool {
        match query {
            TweetQuery::All => true,
            TweetQuery::ByDate { date } => text(row, "created_date") == Some(date.as_str()),
            TweetQuery::ByTweeter { tweeter } => text(row, "tweeter") == Some(tweeter.as_str()),
            TweetQuery::OnDateByTweeter { date, tweeter } => {
                text(row, "created_date") == Some(date.as_str())
                    && text(row, "tweeter") == Some(tweeter.as_str())
            }
        }
    }

    #[async_trait]
    impl TweetStore for MemoryStore {
        async fn execute(&self, query: &TweetQuery) -> Result<RowStream, QueryError> {
            let rows: Vec<Result<Row, QueryError>> = self
                .rows
                .iter()
                .filter(|row| matches(query, row))
                .cloned()
                .map(Ok)
                .collect();
            Ok(futures::stream::iter(rows).boxed())
        }
    }

    /// Test store whose every query fails
    pub struct BrokenStore;

    #[async_trait]
    impl TweetStore for BrokenStore {
        async fn execute(&self, _query: &TweetQuery) -> Result<RowStream, QueryError> {
            Err(QueryError::new(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "connection timed out",
            )))
        }
    }
}
