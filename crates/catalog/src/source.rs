//! Source-side catalog records
//!
//! These are read-only snapshots of what the Zuora integration exposes
//! through the platform's `billingProducts` query. Field names mirror the
//! wire shape.

use serde::Deserialize;

/// Billing period of a recurring charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingPeriod {
    Monthly,
    Annually,
}

/// A billing product in the source system, with its nested plans.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceProduct {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub plans: Vec<SourcePlan>,
}

/// A rate plan nested under a source product. Classified as add-on or
/// regular plan by name heuristic before reconciliation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcePlan {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub prices: Vec<SourcePrice>,
}

/// A charge on a source plan. `charge_model` is an open string because the
/// source system grows new models; unrecognized ones are skipped, not
/// rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcePrice {
    pub id: String,
    #[serde(default)]
    pub amount: f64,
    pub billing_period: BillingPeriod,
    #[serde(default)]
    pub usage: bool,
    pub charge_model: String,
    #[serde(default)]
    pub discount_percent: f64,
}

/// Platform-side handle of the Zuora integration for an environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationHandle {
    pub id: String,
    #[serde(default)]
    pub integration_id: Option<String>,
}

impl SourcePlan {
    /// True if any charge on this plan has a positive amount.
    pub fn has_paid_price(&self) -> bool {
        self.prices.iter().any(|price| price.amount > 0.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_billing_products_payload() {
        let raw = serde_json::json!({
            "id": "8adc9dd08",
            "name": "Pro Product",
            "description": null,
            "plans": [{
                "id": "8adc9dd09",
                "name": "Pro Plan",
                "active": true,
                "prices": [{
                    "id": "8adc9dd10",
                    "amount": 99.0,
                    "billingPeriod": "MONTHLY",
                    "usage": false,
                    "chargeModel": "flat_fee",
                    "discountPercent": 0.0
                }]
            }]
        });
        let product: SourceProduct = serde_json::from_value(raw).unwrap();
        assert_eq!(product.plans.len(), 1);
        assert_eq!(product.plans[0].prices[0].billing_period, BillingPeriod::Monthly);
        assert!(product.plans[0].has_paid_price());
        assert!(product.description.is_none());
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let raw = serde_json::json!({
            "id": "p1",
            "name": "Bare",
        });
        let product: SourceProduct = serde_json::from_value(raw).unwrap();
        assert!(product.plans.is_empty());
    }
}
