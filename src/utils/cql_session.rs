use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use scylla::{
    client::{
        execution_profile::ExecutionProfile, session::Session, session_builder::SessionBuilder,
    },
    errors::{NewSessionError, PrepareError},
    policies::host_filter::AllowListHostFilter,
    statement::prepared::PreparedStatement,
    value::Row as CqlRow,
};
use secrecy::ExposeSecret;
use tracing::info;

use super::{
    config::{Config, CONNECT_TIMEOUT, REQUEST_TIMEOUT},
    tweet_store::{QueryError, Row, RowStream, TweetQuery, TweetStore},
};

/// The database could not be reached or prepared at startup
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("failed to resolve node addresses {nodes:?} : {source}")]
    ResolveNodes {
        nodes: Vec<String>,
        source: std::io::Error,
    },
    #[error("failed to create a CQL session : {0}")]
    NewSession(#[from] NewSessionError),
    #[error("failed to prepare statement `{stmt}` : {source}")]
    Prepare { stmt: String, source: PrepareError },
}

struct PreparedQueries {
    all: PreparedStatement,
    by_date: PreparedStatement,
    by_tweeter: PreparedStatement,
    on_date_by_tweeter: PreparedStatement,
}

impl PreparedQueries {
    fn get(&self, query: &TweetQuery) -> &PreparedStatement {
        match query {
            TweetQuery::All => &self.all,
            TweetQuery::ByDate { .. } => &self.by_date,
            TweetQuery::ByTweeter { .. } => &self.by_tweeter,
            TweetQuery::OnDateByTweeter { .. } => &self.on_date_by_tweeter,
        }
    }
}

/// The one database session shared by every request handler.
///
/// Built once by [CqlSession::open] before the server accepts connections; the driver pools its
/// connections internally so the session is used concurrently without any locking here.
pub struct CqlSession {
    session: Session,
    prepared: PreparedQueries,
}

impl CqlSession {
    /// Connect to the configured nodes only, authenticate, select the keyspace and prepare the
    /// tweet queries. The driver speaks CQL native protocol v4.
    pub async fn open(config: &Config) -> Result<CqlSession, ConnectionError> {
        // Only the listed nodes get connections, discovered peers are ignored
        let host_filter = AllowListHostFilter::new(config.nodes.iter().map(String::as_str))
            .map_err(|source| ConnectionError::ResolveNodes {
                nodes: config.nodes.clone(),
                source,
            })?;

        let profile = ExecutionProfile::builder()
            .request_timeout(Some(REQUEST_TIMEOUT))
            .build();

        let session = SessionBuilder::new()
            .known_nodes(&config.nodes)
            .user(
                config.user_name.as_str(),
                config.user_password.expose_secret(),
            )
            .connection_timeout(CONNECT_TIMEOUT)
            .default_execution_profile_handle(profile.into_handle())
            .host_filter(Arc::new(host_filter))
            .use_keyspace(config.keyspace.as_str(), false)
            .build()
            .await?;

        info!(nodes = ?config.nodes, keyspace = %config.keyspace, "CQL session opened");

        let prepared = PreparedQueries {
            all: Self::prepare(&session, &TweetQuery::All).await?,
            by_date: Self::prepare(
                &session,
                &TweetQuery::ByDate {
                    date: String::new(),
                },
            )
            .await?,
            by_tweeter: Self::prepare(
                &session,
                &TweetQuery::ByTweeter {
                    tweeter: String::new(),
                },
            )
            .await?,
            on_date_by_tweeter: Self::prepare(
                &session,
                &TweetQuery::OnDateByTweeter {
                    date: String::new(),
                    tweeter: String::new(),
                },
            )
            .await?,
        };

        Ok(CqlSession { session, prepared })
    }

    async fn prepare(
        session: &Session,
        query: &TweetQuery,
    ) -> Result<PreparedStatement, ConnectionError> {
        let stmt = query.cql();
        session
            .prepare(stmt)
            .await
            .map_err(|source| ConnectionError::Prepare {
                stmt: stmt.to_owned(),
                source,
            })
    }

    /// Drop every connection of the session
    pub fn close(self) {
        drop(self.session);
        info!("CQL session closed");
    }
}

#[async_trait]
impl TweetStore for CqlSession {
    async fn execute(&self, query: &TweetQuery) -> Result<RowStream, QueryError> {
        let pager = self
            .session
            .execute_iter(self.prepared.get(query).clone(), query.binds())
            .await
            .map_err(QueryError::new)?;

        let columns: Vec<String> = pager
            .column_specs()
            .iter()
            .map(|spec| spec.name().to_owned())
            .collect();

        let rows = pager.rows_stream::<CqlRow>().map_err(QueryError::new)?;

        Ok(rows
            .map(move |row| Ok(to_row(&columns, row.map_err(QueryError::new)?)))
            .boxed())
    }
}

/// Key the cells of `row` by the column names of the result, in result order
fn to_row(columns: &[String], row: CqlRow) -> Row {
    columns.iter().cloned().zip(row.columns).collect()
}

#[cfg(test)]
mod tests {
    use scylla::value::{CqlTimestamp, CqlValue};

    use super::*;

    fn columns() -> Vec<String> {
        ["tweeter", "tweet", "created", "created_date", "tweet_id"]
            .iter()
            .map(|c| c.to_string())
            .collect()
    }

    #[test]
    fn cells_are_keyed_by_column_name() {
        let row = to_row(
            &columns(),
            CqlRow {
                columns: vec![
                    Some(CqlValue::Text("alice".to_string())),
                    Some(CqlValue::Text("hi".to_string())),
                    Some(CqlValue::Timestamp(CqlTimestamp(1_672_567_200_000))),
                    Some(CqlValue::Text("2023-01-01".to_string())),
                    Some(CqlValue::Text("1".to_string())),
                ],
            },
        );
        assert_eq!(row.len(), 5);
        assert_eq!(row["tweeter"], Some(CqlValue::Text("alice".to_string())));
        assert_eq!(row["tweet"], Some(CqlValue::Text("hi".to_string())));
        assert_eq!(
            row["created"],
            Some(CqlValue::Timestamp(CqlTimestamp(1_672_567_200_000)))
        );
        assert_eq!(row["tweet_id"], Some(CqlValue::Text("1".to_string())));
    }

    #[test]
    fn null_cells_stay_in_the_row() {
        let row = to_row(
            &columns(),
            CqlRow {
                columns: vec![
                    Some(CqlValue::Text("alice".to_string())),
                    None,
                    Some(CqlValue::Timestamp(CqlTimestamp(1_672_567_200_000))),
                    Some(CqlValue::Text("2023-01-01".to_string())),
                    Some(CqlValue::Text("1".to_string())),
                ],
            },
        );
        assert_eq!(row.get("tweet"), Some(&None));
        assert_eq!(row["tweeter"], Some(CqlValue::Text("alice".to_string())));
    }
}
