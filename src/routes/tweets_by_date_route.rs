use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::{
    structs::tweet::Tweet,
    utils::{app_error::AppError, tweet_store::TweetQuery, tweets::fetch_tweets},
    AppState,
};

pub async fn tweets_by_date_route(
    State(app_state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<Vec<Tweet>>, AppError> {
    info!("searching tweets on - {date}");

    Ok(Json(
        fetch_tweets(app_state.store.as_ref(), TweetQuery::ByDate { date }).await?,
    ))
}
