use chrono::{DateTime, Utc};
use scylla::value::CqlValue;
use serde::Serialize;
use tracing::warn;

use crate::utils::tweet_store::Row;

/// A stored tweet, as returned by every route
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tweet {
    #[serde(rename = "tweeter")]
    pub author: String,
    #[serde(rename = "tweet")]
    pub text: String,
    pub created: DateTime<Utc>,
    /// Date part of `created`, denormalized by the writer for partitioning
    pub created_date: String,
    #[serde(rename = "tweet_id")]
    pub id: String,
}

/// A row does not have the shape of a tweet
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("column `{column}` is missing")]
    MissingColumn { column: &'static str },
    #[error("column `{column}` is not a {expected}")]
    UnexpectedType {
        column: &'static str,
        expected: &'static str,
    },
    #[error("column `{column}` holds an out of range timestamp ({millis} ms)")]
    TimestampOutOfRange { column: &'static str, millis: i64 },
}

/// `0001-01-01T00:00:00Z`, served for a NULL timestamp
const ZERO_TIME_MILLIS: i64 = -62_135_596_800_000;

fn take(row: &mut Row, column: &'static str) -> Result<Option<CqlValue>, SchemaError> {
    row.remove(column)
        .ok_or(SchemaError::MissingColumn { column })
}

/// A NULL text cell reads as the empty string
fn take_text(row: &mut Row, column: &'static str) -> Result<String, SchemaError> {
    match take(row, column)? {
        Some(CqlValue::Text(s)) | Some(CqlValue::Ascii(s)) => Ok(s),
        None => Ok(String::new()),
        Some(_) => Err(SchemaError::UnexpectedType {
            column,
            expected: "text",
        }),
    }
}

fn take_timestamp(row: &mut Row, column: &'static str) -> Result<DateTime<Utc>, SchemaError> {
    let millis = match take(row, column)? {
        Some(CqlValue::Timestamp(ts)) => ts.0,
        None => ZERO_TIME_MILLIS,
        Some(_) => {
            return Err(SchemaError::UnexpectedType {
                column,
                expected: "timestamp",
            })
        }
    };
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or(SchemaError::TimestampOutOfRange { column, millis })
}

impl TryFrom<Row> for Tweet {
    type Error = SchemaError;

    fn try_from(mut row: Row) -> Result<Self, Self::Error> {
        let tweet = Tweet {
            created: take_timestamp(&mut row, "created")?,
            created_date: take_text(&mut row, "created_date")?,
            author: take_text(&mut row, "tweeter")?,
            id: take_text(&mut row, "tweet_id")?,
            text: take_text(&mut row, "tweet")?,
        };

        if tweet.created.date_naive().to_string() != tweet.created_date {
            warn!(
                "Tweet {} has created_date {} but was created at {}",
                tweet.id, tweet.created_date, tweet.created
            );
        }

        Ok(tweet)
    }
}
