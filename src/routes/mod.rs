pub mod all_tweets_route;
pub mod tweets_by_date_route;
pub mod tweets_by_tweeter_route;
pub mod tweets_on_date_by_tweeter_route;
