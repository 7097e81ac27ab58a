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

pub async fn tweets_on_date_by_tweeter_route(
    State(app_state): State<AppState>,
    Path((date, tweeter)): Path<(String, String)>,
) -> Result<Json<Vec<Tweet>>, AppError> {
    info!("searching tweets on - {date} by tweeter - {tweeter}");

    let tweets = fetch_tweets(
        app_state.store.as_ref(),
        TweetQuery::OnDateByTweeter { date, tweeter },
    )
    .await?;

    Ok(Json(tweets))
}
