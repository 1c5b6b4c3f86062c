//! Search queries and result envelopes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Feed, Location, User};

/// Discriminator value sent with every feed search
pub const FEED_SEARCH_TYPE: &str = "FEED";

/// Ordering requested from the search endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    Date,
    Distance,
    Relevance,
}

impl SortOrder {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Date => "DATE",
            SortOrder::Distance => "DISTANCE",
            SortOrder::Relevance => "RELEVANCE",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Criteria common to every searchable item kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text term
    pub q: Option<String>,

    /// Owner name fragments and living location
    pub user: User,

    /// Owner distance bound, always in meters
    pub maximum_distance_in_meters: Option<f64>,

    pub sort_order: Option<SortOrder>,
}

impl SearchQuery {
    /// Flatten into transport parameters. Unset fields are omitted.
    pub fn to_query_params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();

        if let Some(q) = &self.q {
            params.insert("q".to_string(), q.clone());
        }
        if let Some(first_name) = &self.user.first_name {
            params.insert("first_name".to_string(), first_name.clone());
        }
        if let Some(last_name) = &self.user.last_name {
            params.insert("last_name".to_string(), last_name.clone());
        }
        if let Some(location) = &self.user.living_location {
            params.insert(
                "location_latitude".to_string(),
                location.latitude.to_string(),
            );
            params.insert(
                "location_longitude".to_string(),
                location.longitude.to_string(),
            );
        }
        if let Some(distance) = self.maximum_distance_in_meters {
            params.insert("maximum_distance".to_string(), distance.to_string());
        }
        if let Some(order) = self.sort_order {
            params.insert("sort_field".to_string(), order.as_str().to_string());
        }

        params
    }
}

/// An immutable feed search, produced by [`QueryBuilder`]
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    base: SearchQuery,
}

impl Query {
    /// Start building a feed search
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }

    pub fn text(&self) -> Option<&str> {
        self.base.q.as_deref()
    }

    pub fn sort_order(&self) -> Option<SortOrder> {
        self.base.sort_order
    }

    pub fn owner(&self) -> &User {
        &self.base.user
    }

    /// Distance bound in meters, whatever unit it was given in
    pub fn maximum_distance_in_meters(&self) -> Option<f64> {
        self.base.maximum_distance_in_meters
    }

    /// The item kind this search targets
    pub fn kind(&self) -> &'static str {
        FEED_SEARCH_TYPE
    }

    /// Base parameters plus the `type` discriminator
    pub fn to_query_params(&self) -> BTreeMap<String, String> {
        let mut params = self.base.to_query_params();
        params.insert("type".to_string(), self.kind().to_string());
        params
    }
}

/// Step-wise construction of a [`Query`]
///
/// The builder performs no validation: negative distances or empty text are
/// passed through as given.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    user: User,
    text_to_search: Option<String>,
    sort_order: Option<SortOrder>,
    location_maximum_distance: Option<f64>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text_to_search(mut self, text: impl Into<String>) -> Self {
        self.text_to_search = Some(text.into());
        self
    }

    pub fn set_order(mut self, order: SortOrder) -> Self {
        self.sort_order = Some(order);
        self
    }

    pub fn set_owner_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.user.first_name = Some(first_name.into());
        self
    }

    pub fn set_owner_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.user.last_name = Some(last_name.into());
        self
    }

    pub fn set_location(mut self, location: Location) -> Self {
        self.user.living_location = Some(location);
        self
    }

    pub fn set_owner_living_location_maximum_distance_in_meters(mut self, meters: f64) -> Self {
        self.location_maximum_distance = Some(meters);
        self
    }

    /// Same field as the meters setter; the value is multiplied by 1000
    pub fn set_owner_living_location_maximum_distance_in_kilometers(
        mut self,
        kilometers: f64,
    ) -> Self {
        self.location_maximum_distance = Some(kilometers * 1000.0);
        self
    }

    pub fn build(&self) -> Query {
        Query {
            base: SearchQuery {
                q: self.text_to_search.clone(),
                user: self.user.clone(),
                maximum_distance_in_meters: self.location_maximum_distance,
                sort_order: self.sort_order,
            },
        }
    }
}

/// Matched items of one kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultValue<T> {
    #[serde(default)]
    pub matched_count: usize,

    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T> SearchResultValue<T> {
    /// A zero-count envelope
    pub fn empty() -> Self {
        Self {
            matched_count: 0,
            data: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matched_count == 0 && self.data.is_empty()
    }
}

impl<T> Default for SearchResultValue<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Per-kind results of one search call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsByType {
    #[serde(default)]
    pub feeds: Option<SearchResultValue<Feed>>,
}

/// Response envelope of the search endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub results_by_type: Option<ResultsByType>,
}

impl SearchResults {
    /// Feed matches, or a zero-count envelope when the kind is absent
    pub fn into_feeds(self) -> SearchResultValue<Feed> {
        self.results_by_type
            .and_then(|r| r.feeds)
            .unwrap_or_else(SearchResultValue::empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kilometers_are_stored_as_meters() {
        let query = QueryBuilder::new()
            .set_owner_living_location_maximum_distance_in_kilometers(2.5)
            .build();
        assert_eq!(query.maximum_distance_in_meters(), Some(2500.0));
    }

    #[test]
    fn test_distance_last_writer_wins() {
        let query = QueryBuilder::new()
            .set_owner_living_location_maximum_distance_in_kilometers(3.0)
            .set_owner_living_location_maximum_distance_in_meters(150.0)
            .build();
        assert_eq!(query.maximum_distance_in_meters(), Some(150.0));

        let query = QueryBuilder::new()
            .set_owner_living_location_maximum_distance_in_meters(150.0)
            .set_owner_living_location_maximum_distance_in_kilometers(1.0)
            .build();
        assert_eq!(query.maximum_distance_in_meters(), Some(1000.0));
    }

    #[test]
    fn test_negative_distance_is_accepted() {
        let query = QueryBuilder::new()
            .set_owner_living_location_maximum_distance_in_meters(-5.0)
            .build();
        assert_eq!(query.maximum_distance_in_meters(), Some(-5.0));
    }

    #[test]
    fn test_empty_query_only_carries_discriminator() {
        let params = QueryBuilder::new().build().to_query_params();
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("type").map(String::as_str), Some("FEED"));
    }

    #[test]
    fn test_query_params_full() {
        let query = QueryBuilder::new()
            .set_text_to_search("concert")
            .set_order(SortOrder::Distance)
            .set_owner_first_name("Ada")
            .set_owner_last_name("Lovelace")
            .set_location(Location::new(48.85, 2.35))
            .set_owner_living_location_maximum_distance_in_kilometers(2.5)
            .build();

        let params = query.to_query_params();
        assert_eq!(params["q"], "concert");
        assert_eq!(params["sort_field"], "DISTANCE");
        assert_eq!(params["first_name"], "Ada");
        assert_eq!(params["last_name"], "Lovelace");
        assert_eq!(params["location_latitude"], "48.85");
        assert_eq!(params["location_longitude"], "2.35");
        assert_eq!(params["maximum_distance"], "2500");
        assert_eq!(params["type"], "FEED");
    }

    #[test]
    fn test_built_query_is_detached_from_builder() {
        let builder = QueryBuilder::new().set_text_to_search("first");
        let query = builder.build();
        let builder = builder.set_text_to_search("second");

        assert_eq!(query.text(), Some("first"));
        assert_eq!(builder.build().text(), Some("second"));
    }

    #[test]
    fn test_missing_kind_yields_empty_envelope() {
        let results: SearchResults = serde_json::from_str(r#"{"results_by_type": {}}"#).unwrap();
        let feeds = results.into_feeds();
        assert_eq!(feeds.matched_count, 0);
        assert!(feeds.data.is_empty());

        assert!(SearchResults::default().into_feeds().is_empty());
    }

    #[test]
    fn test_feed_envelope_deserialize() {
        let json = r#"{
            "results_by_type": {
                "feeds": {"matched_count": 2, "data": [{"id": "a"}, {"id": "b"}]}
            }
        }"#;
        let results: SearchResults = serde_json::from_str(json).unwrap();
        let feeds = results.into_feeds();
        assert_eq!(feeds.matched_count, 2);
        assert_eq!(feeds.data[1].id, "b");
    }
}
