//! Gateway implementations over the platform's GraphQL API
//!
//! One endpoint serves both sides: the source catalog is read through the
//! platform's billing-integration queries, and the target catalog through
//! its CRUD/publish mutations. `CatalogApi` implements both gateway traits.

mod source;
mod target;

use serde::Deserialize;

use crate::graphql::GraphQlClient;

/// The platform API, viewed as both the source and the target gateway.
#[derive(Debug, Clone)]
pub struct CatalogApi {
    client: GraphQlClient,
}

impl CatalogApi {
    pub fn new(client: GraphQlClient) -> Self {
        Self { client }
    }
}

/// Relay-style connection wrapper used by the platform's list queries.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Edges<T> {
    #[serde(default)]
    edges: Vec<Edge<T>>,
}

#[derive(Debug, Deserialize)]
struct Edge<T> {
    node: T,
}

impl<T> Edges<T> {
    fn into_first(self) -> Option<T> {
        self.edges.into_iter().next().map(|edge| edge.node)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_unwraps_first_node() {
        let raw = serde_json::json!({"edges": [{"node": 1}, {"node": 2}]});
        let edges: Edges<i64> = serde_json::from_value(raw).unwrap();
        assert_eq!(edges.into_first(), Some(1));
    }

    #[test]
    fn test_empty_connection_is_none() {
        let edges: Edges<i64> = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(edges.into_first(), None);
    }
}
