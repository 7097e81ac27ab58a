use axum::{
    response::{IntoResponse, Response},
    Json,
};
use hyper::StatusCode;
use serde::Serialize;
use tracing::error;

use crate::structs::tweet::SchemaError;

use super::tweet_store::QueryError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    //Store could not run the query or deliver its rows
    #[error("database error : {0}")]
    Query(#[from] QueryError),
    //A row is not shaped like a tweet
    #[error("schema error : {0}")]
    Schema(#[from] SchemaError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("{self}");

        let body = match self {
            AppError::Query(_) => ErrorBody {
                error: "database_error",
                message: "Erreur lors de la lecture des tweets.",
            },
            AppError::Schema(_) => ErrorBody {
                error: "schema_error",
                message: "Un tweet stocké est invalide.",
            },
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let err = AppError::from(SchemaError::MissingColumn { column: "tweet" });
        assert_eq!(err.to_string(), "schema error : column `tweet` is missing");
    }

    #[tokio::test]
    async fn errors_are_internal_server_errors_with_a_json_body() {
        let err = AppError::from(QueryError::new(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "connection timed out",
        )));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "database_error");
        assert!(!body.to_string().contains("timed out"));
    }
}
