//! Error types for the catalog importer

use thiserror::Error;

/// The kind of entity an operation was acting on, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Integration,
    Product,
    Plan,
    Addon,
    Price,
    Draft,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integration => "integration",
            Self::Product => "product",
            Self::Plan => "plan",
            Self::Addon => "addon",
            Self::Price => "price",
            Self::Draft => "draft",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Importer-wide errors. Any of these aborts the run; there is no
/// partial-success continuation across top-level entities.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No billing integration found for environment {environment_id}")]
    IntegrationNotFound { environment_id: String },

    #[error("Error fetching {entity} {ref_id}: {payload}")]
    Query {
        entity: EntityKind,
        ref_id: String,
        payload: serde_json::Value,
    },

    #[error("Failed to {action} {entity} {ref_id}: {payload}")]
    Mutation {
        entity: EntityKind,
        action: &'static str,
        ref_id: String,
        payload: serde_json::Value,
    },

    #[error("No draft found for {entity} with refId {ref_id}")]
    DraftNotFound { entity: EntityKind, ref_id: String },

    #[error("Malformed response for {entity} {ref_id}: {detail}")]
    Malformed {
        entity: EntityKind,
        ref_id: String,
        detail: String,
    },

    #[error("Transport error during {operation}: {detail}")]
    Transport { operation: String, detail: String },
}

impl ImportError {
    /// Wrap a raw GraphQL error payload from a read operation.
    pub fn query(
        entity: EntityKind,
        ref_id: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self::Query {
            entity,
            ref_id: ref_id.into(),
            payload,
        }
    }

    /// Wrap a raw GraphQL error payload from a write operation.
    pub fn mutation(
        entity: EntityKind,
        action: &'static str,
        ref_id: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self::Mutation {
            entity,
            action,
            ref_id: ref_id.into(),
            payload,
        }
    }

    pub fn transport(operation: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        Self::Transport {
            operation: operation.into(),
            detail: detail.to_string(),
        }
    }
}

pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_error_names_entity_and_ref() {
        let err = ImportError::mutation(
            EntityKind::Plan,
            "create",
            "pro_plan_abc123",
            serde_json::json!([{"message": "boom"}]),
        );
        let rendered = err.to_string();
        assert!(rendered.contains("plan"));
        assert!(rendered.contains("pro_plan_abc123"));
        assert!(rendered.contains("boom"));
    }

    #[test]
    fn test_entity_kind_labels() {
        assert_eq!(EntityKind::Addon.as_str(), "addon");
        assert_eq!(EntityKind::Draft.to_string(), "draft");
    }
}
