use axum::{extract::State, Json};
use tracing::info;

use crate::{
    structs::tweet::Tweet,
    utils::{app_error::AppError, tweet_store::TweetQuery, tweets::fetch_tweets},
    AppState,
};

pub async fn all_tweets_route(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Tweet>>, AppError> {
    info!("fetching all tweets");

    Ok(Json(fetch_tweets(app_state.store.as_ref(), TweetQuery::All).await?))
}
