//! Target-side catalog entities and mutation inputs
//!
//! Entities are what the platform hands back from queries; inputs are what
//! the reconciler sends into mutations. Inputs serialize straight into
//! GraphQL variables, so the renames here follow the API schema.

use std::collections::BTreeMap;

use catsync_shared::EntityKind;
use serde::{Deserialize, Serialize};

use crate::source::BillingPeriod;

/// Plan or Addon. The two share structure and reconciliation logic but live
/// behind differently named GraphQL operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    Plan,
    Addon,
}

impl PackageKind {
    /// GraphQL type name fragment, e.g. `CreateOnePlan` / `PlanFilter`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Plan => "Plan",
            Self::Addon => "Addon",
        }
    }

    /// GraphQL collection field name, e.g. `plans(filter: ...)`.
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Plan => "plans",
            Self::Addon => "addons",
        }
    }

    pub fn entity(&self) -> EntityKind {
        match self {
            Self::Plan => EntityKind::Plan,
            Self::Addon => EntityKind::Addon,
        }
    }
}

impl std::fmt::Display for PackageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Lifecycle status of a package version. A `Published` version is immutable
/// for pricing; changes must land on a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageStatus {
    Draft,
    Published,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricingType {
    Paid,
    Free,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingCadence {
    Recurring,
    OneOff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingModel {
    FlatFee,
    UsageBased,
    PerUnit,
    MinimumSpend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub currency: String,
    pub amount: f64,
}

/// A product in the target catalog, matched to its source by `ref_id`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub ref_id: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
}

/// An existing price attached to a package version. Identity for "does this
/// price already exist" is the (billing_id, billing_period, amount,
/// billing_model, billing_cadence) tuple, never the target-assigned `id`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagePrice {
    pub id: String,
    pub billing_id: String,
    pub billing_cadence: BillingCadence,
    pub billing_model: BillingModel,
    pub billing_period: BillingPeriod,
    pub price: Money,
}

/// Version marker on a published package that has a newer draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DraftSummary {
    pub version: i64,
}

/// A plan or add-on in the target catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub id: String,
    pub ref_id: String,
    pub display_name: String,
    pub description: String,
    pub status: PackageStatus,
    pub product_id: String,
    pub billing_id: Option<String>,
    pub draft_summary: Option<DraftSummary>,
    pub prices: Vec<PackagePrice>,
    pub kind: PackageKind,
    /// Draft id resolved during price reconciliation, reused by publish.
    pub draft_id: Option<String>,
}

/// Result of creating a new draft from a published package.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftHandle {
    pub id: String,
    pub ref_id: String,
    pub version_number: i64,
}

/// Create input for a product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub ref_id: String,
    pub display_name: String,
    pub description: String,
    pub environment_id: String,
    #[serde(rename = "additionalMetaData")]
    pub additional_metadata: BTreeMap<String, String>,
}

/// In-place update of a product's display fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub id: String,
    pub display_name: String,
    pub description: String,
    #[serde(rename = "additionalMetaData")]
    pub additional_metadata: BTreeMap<String, String>,
}

/// Create input for a plan or add-on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInput {
    pub ref_id: String,
    pub display_name: String,
    pub description: String,
    pub product_id: String,
    /// Source product id, kept as the billing linkage.
    pub billing_id: String,
    pub environment_id: String,
    pub pricing_type: PricingType,
    pub status: PackageStatus,
    #[serde(rename = "additionalMetaData")]
    pub additional_metadata: BTreeMap<String, String>,
}

/// In-place update of a package's display fields and billing linkage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageUpdate {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub billing_id: String,
    #[serde(rename = "additionalMetaData")]
    pub additional_metadata: BTreeMap<String, String>,
}

/// One price period inside a price model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePeriod {
    pub billing_period: BillingPeriod,
    pub price: Money,
}

/// A price to set on a package, mapped from one source charge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceModel {
    pub billing_id: String,
    pub billing_cadence: BillingCadence,
    pub billing_model: BillingModel,
    pub price_periods: Vec<PricePeriod>,
}

/// Input of the pricing mutation. `package_id` must name a draft version.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingInput {
    pub environment_id: String,
    pub package_id: String,
    /// Source plan id, kept as the price-group billing linkage.
    #[serde(rename = "priceGroupPackageBillingId")]
    pub price_group_billing_id: String,
    pub pricing_models: Vec<PriceModel>,
    pub pricing_type: PricingType,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_enums_use_wire_casing() {
        assert_eq!(
            serde_json::to_value(PackageStatus::Draft).unwrap(),
            serde_json::json!("DRAFT")
        );
        assert_eq!(
            serde_json::to_value(BillingModel::FlatFee).unwrap(),
            serde_json::json!("FLAT_FEE")
        );
        assert_eq!(
            serde_json::to_value(BillingCadence::OneOff).unwrap(),
            serde_json::json!("ONE_OFF")
        );
    }

    #[test]
    fn test_package_input_serializes_schema_field_names() {
        let input = PackageInput {
            ref_id: "pro_plan_abc123".into(),
            display_name: "Pro Plan".into(),
            description: String::new(),
            product_id: "prod-1".into(),
            billing_id: "zuora-prod-1".into(),
            environment_id: "env-1".into(),
            pricing_type: PricingType::Paid,
            status: PackageStatus::Draft,
            additional_metadata: BTreeMap::new(),
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["refId"], "pro_plan_abc123");
        assert_eq!(value["pricingType"], "PAID");
        assert!(value.get("additionalMetaData").is_some());
    }

    #[test]
    fn test_pricing_input_uses_price_group_rename() {
        let input = PricingInput {
            environment_id: "env-1".into(),
            package_id: "pkg-1".into(),
            price_group_billing_id: "zuora-plan-1".into(),
            pricing_models: vec![],
            pricing_type: PricingType::Paid,
        };
        let value = serde_json::to_value(&input).unwrap();
        assert!(value.get("priceGroupPackageBillingId").is_some());
    }

    #[test]
    fn test_package_price_deserializes_wire_payload() {
        let raw = serde_json::json!({
            "id": "price-1",
            "billingId": "charge-1",
            "billingCadence": "RECURRING",
            "billingModel": "FLAT_FEE",
            "billingPeriod": "ANNUALLY",
            "price": { "currency": "USD", "amount": 950.0 }
        });
        let price: PackagePrice = serde_json::from_value(raw).unwrap();
        assert_eq!(price.billing_model, BillingModel::FlatFee);
        assert_eq!(price.price.amount, 950.0);
    }
}
