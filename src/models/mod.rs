//! Core data models for feed items and search operations.

mod feed;
mod search;

pub use feed::{Feed, FeedPost, Location, User, Visibility};
pub use search::{
    Query, QueryBuilder, ResultsByType, SearchQuery, SearchResultValue, SearchResults, SortOrder,
    FEED_SEARCH_TYPE,
};
