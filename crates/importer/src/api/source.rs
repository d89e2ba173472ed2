//! Source-side queries: the billing catalog behind the Zuora integration

use async_trait::async_trait;
use catsync_catalog::gateway::SourceGateway;
use catsync_catalog::source::{IntegrationHandle, SourceProduct};
use catsync_shared::{EntityKind, ImportError, ImportResult};
use serde::Deserialize;
use serde_json::json;

use super::{CatalogApi, Edges};

const INTEGRATIONS_QUERY: &str = r#"query Integrations($filter: IntegrationFilter) {
  integrations(filter: $filter) {
    edges {
      node {
        environment {
          id
        }
        integrationId
        id
      }
    }
  }
}"#;

const BILLING_PRODUCTS_QUERY: &str = r#"query BillingProducts($input: BillingProductsInput!) {
  billingProducts(input: $input) {
    products {
      id
      name
      description
      plans {
        id
        name
        description
        active
        prices {
          id
          amount
          billingPeriod
          usage
          chargeModel
          discountPercent
        }
      }
    }
  }
}"#;

#[derive(Deserialize)]
struct IntegrationsData {
    integrations: Edges<IntegrationHandle>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BillingProductsData {
    #[serde(default)]
    billing_products: Option<BillingProducts>,
}

#[derive(Deserialize)]
struct BillingProducts {
    #[serde(default)]
    products: Vec<SourceProduct>,
}

#[async_trait]
impl SourceGateway for CatalogApi {
    async fn find_integration(&self, environment_id: &str) -> ImportResult<IntegrationHandle> {
        let variables = json!({
            "filter": {
                "environmentId": { "eq": environment_id },
                "vendorIdentifier": { "eq": "ZUORA" },
            }
        });
        let response = self
            .client
            .execute::<_, IntegrationsData>(INTEGRATIONS_QUERY, &variables)
            .await
            .map_err(|e| ImportError::transport("Integrations", e))?;

        if let Some(errors) = response.errors {
            return Err(ImportError::query(
                EntityKind::Integration,
                environment_id,
                errors,
            ));
        }

        response
            .data
            .and_then(|data| data.integrations.into_first())
            .ok_or_else(|| ImportError::IntegrationNotFound {
                environment_id: environment_id.to_string(),
            })
    }

    async fn fetch_billing_products(
        &self,
        product_ref: &str,
        integration_id: &str,
    ) -> ImportResult<Vec<SourceProduct>> {
        let variables = json!({
            "input": {
                "productNameOrId": product_ref,
                "integrationId": integration_id,
            }
        });
        let response = self
            .client
            .execute::<_, BillingProductsData>(BILLING_PRODUCTS_QUERY, &variables)
            .await
            .map_err(|e| ImportError::transport("BillingProducts", e))?;

        if let Some(errors) = response.errors {
            return Err(ImportError::query(EntityKind::Product, product_ref, errors));
        }

        Ok(response
            .data
            .and_then(|data| data.billing_products)
            .map(|billing| billing.products)
            .unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_integration_node_decodes_with_extra_fields() {
        let raw = serde_json::json!({
            "integrations": {
                "edges": [{
                    "node": {
                        "environment": { "id": "env-1" },
                        "integrationId": "zuora-account-7",
                        "id": "int-1"
                    }
                }]
            }
        });
        let data: IntegrationsData = serde_json::from_value(raw).unwrap();
        let handle = data.integrations.into_first().unwrap();
        assert_eq!(handle.id, "int-1");
        assert_eq!(handle.integration_id.as_deref(), Some("zuora-account-7"));
    }

    #[test]
    fn test_billing_products_tolerates_null_container() {
        let data: BillingProductsData =
            serde_json::from_value(serde_json::json!({"billingProducts": null})).unwrap();
        assert!(data.billing_products.is_none());
    }
}
