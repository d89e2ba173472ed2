//! Add-on vs plan classification
//!
//! The source system has no structural marker for add-ons; the convention is
//! a naming one. Case-insensitive substring match on "addon"/"add-on".
//! Known limitation: localized or differently phrased names end up as
//! regular plans.

use crate::source::SourceProduct;

const ADDON_KEYWORDS: [&str; 2] = ["addon", "add-on"];

/// True if a plan name marks the plan as an add-on.
pub fn is_addon_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    ADDON_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Source products partitioned by plan classification. A product with both
/// kinds of plans appears in both lists, carrying disjoint plan subsets.
#[derive(Debug, Clone, Default)]
pub struct CatalogSplit {
    pub addon_products: Vec<SourceProduct>,
    pub plan_products: Vec<SourceProduct>,
}

/// Partition each product's plans into add-ons and regular plans.
///
/// A product contributes to `addon_products` only if it has at least one
/// add-on plan, and to `plan_products` only if it has at least one regular
/// plan. A product with no plans at all still lands in `plan_products` so
/// its product entity gets reconciled.
pub fn split_addons_and_plans(products: &[SourceProduct]) -> CatalogSplit {
    let mut split = CatalogSplit::default();

    for product in products {
        let (addons, plans): (Vec<_>, Vec<_>) = product
            .plans
            .iter()
            .cloned()
            .partition(|plan| is_addon_name(&plan.name));

        if !addons.is_empty() {
            let mut addon_product = product.clone();
            addon_product.plans = addons;
            split.addon_products.push(addon_product);
        }
        if !plans.is_empty() || product.plans.is_empty() {
            let mut plan_product = product.clone();
            plan_product.plans = plans;
            split.plan_products.push(plan_product);
        }
    }

    split
}
