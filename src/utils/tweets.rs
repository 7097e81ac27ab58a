use futures::TryStreamExt;
use tracing::info;

use crate::structs::tweet::Tweet;

use super::{
    app_error::AppError,
    tweet_store::{RowStream, TweetQuery, TweetStore},
};

/// Drain `rows`, mapping each row to a [Tweet] in the order the store delivers them
pub async fn collect_tweets(rows: RowStream) -> Result<Vec<Tweet>, AppError> {
    rows.map_err(AppError::from)
        .and_then(|row| async move { Tweet::try_from(row).map_err(AppError::from) })
        .try_collect()
        .await
}

pub async fn fetch_tweets(
    store: &dyn TweetStore,
    query: TweetQuery,
) -> Result<Vec<Tweet>, AppError> {
    let rows = store.execute(&query).await?;
    let tweets = collect_tweets(rows).await?;
    info!("got {} tweets", tweets.len());
    Ok(tweets)
}
