//! Price-model mapping
//!
//! Translates source charges into target price models. A plan carries at
//! most one `discount_percentage` charge; it never becomes a price itself
//! but scales the amount of every other price on the plan. Unrecognized
//! charge models are skipped with a warning so one odd charge cannot block
//! the rest of the plan.

use catsync_shared::Reporter;

use crate::source::{SourcePlan, SourcePrice};
use crate::target::{BillingCadence, BillingModel, Money, PackagePrice, PriceModel, PricePeriod};

/// The platform stores catalog prices in a single currency.
pub const PRICE_CURRENCY: &str = "USD";

const FLAT_FEE_CHARGE: &str = "flat_fee";
const DISCOUNT_CHARGE: &str = "discount_percentage";

enum ChargeMapping {
    Flat(PriceModel),
    DiscountCarrier,
    Unsupported,
}

/// Plan-level discount: `discount_percent` of the first charge whose model
/// is `discount_percentage`, or 0 when the plan has none.
pub fn discount_percentage(plan: &SourcePlan) -> f64 {
    plan.prices
        .iter()
        .find(|price| price.charge_model.eq_ignore_ascii_case(DISCOUNT_CHARGE))
        .map(|price| price.discount_percent)
        .unwrap_or(0.0)
}

fn map_charge(price: &SourcePrice, plan: &SourcePlan) -> ChargeMapping {
    if price.charge_model.eq_ignore_ascii_case(DISCOUNT_CHARGE) {
        return ChargeMapping::DiscountCarrier;
    }
    if !price.charge_model.eq_ignore_ascii_case(FLAT_FEE_CHARGE) {
        return ChargeMapping::Unsupported;
    }

    let discount = discount_percentage(plan);
    let discounted_amount = price.amount * (1.0 - discount / 100.0);

    ChargeMapping::Flat(PriceModel {
        billing_id: price.id.clone(),
        billing_cadence: BillingCadence::Recurring,
        billing_model: BillingModel::FlatFee,
        price_periods: vec![PricePeriod {
            billing_period: price.billing_period,
            price: Money {
                currency: PRICE_CURRENCY.to_string(),
                amount: discounted_amount,
            },
        }],
    })
}

/// Map a single source charge. `None` means "skip": the charge is either
/// the plan's discount carrier or an unsupported model.
pub fn price_model(price: &SourcePrice, plan: &SourcePlan) -> Option<PriceModel> {
    match map_charge(price, plan) {
        ChargeMapping::Flat(model) => Some(model),
        ChargeMapping::DiscountCarrier | ChargeMapping::Unsupported => None,
    }
}

/// Map every chargeable price on a plan. An empty result is a valid
/// "nothing to set" outcome, never an error.
pub fn plan_price_models(plan: &SourcePlan, reporter: &dyn Reporter) -> Vec<PriceModel> {
    let mut models = Vec::new();
    for price in &plan.prices {
        match map_charge(price, plan) {
            ChargeMapping::Flat(model) => models.push(model),
            ChargeMapping::DiscountCarrier => {}
            ChargeMapping::Unsupported => {
                reporter.warn(&format!(
                    "Skipping price {} on plan {}: unsupported charge model {}",
                    price.id, plan.name, price.charge_model
                ));
            }
        }
    }
    models
}

/// True iff every (model, period) pair already has a tuple-identical price
/// on the package. Identity is (billing_id, billing_period, amount,
/// billing_model, billing_cadence); amounts compare exactly.
pub fn prices_already_match(models: &[PriceModel], existing: &[PackagePrice]) -> bool {
    if existing.is_empty() {
        return false;
    }
    models.iter().all(|model| {
        model.price_periods.iter().all(|period| {
            existing.iter().any(|current| {
                current.billing_id == model.billing_id
                    && current.billing_period == period.billing_period
                    && current.price.amount == period.price.amount
                    && current.billing_model == model.billing_model
                    && current.billing_cadence == model.billing_cadence
            })
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::BillingPeriod;
    use catsync_shared::MemoryReporter;

    fn price(id: &str, amount: f64, charge_model: &str) -> SourcePrice {
        SourcePrice {
            id: id.to_string(),
            amount,
            billing_period: BillingPeriod::Monthly,
            usage: false,
            charge_model: charge_model.to_string(),
            discount_percent: 0.0,
        }
    }

    fn discount(id: &str, percent: f64) -> SourcePrice {
        SourcePrice {
            id: id.to_string(),
            amount: 0.0,
            billing_period: BillingPeriod::Monthly,
            usage: false,
            charge_model: "Discount_Percentage".to_string(),
            discount_percent: percent,
        }
    }

    fn plan(prices: Vec<SourcePrice>) -> SourcePlan {
        SourcePlan {
            id: "zp-1".to_string(),
            name: "Pro Plan".to_string(),
            description: None,
            active: true,
            prices,
        }
    }

    #[test]
    fn test_flat_fee_maps_to_recurring_usd_model() {
        let plan = plan(vec![price("c1", 99.0, "FLAT_FEE")]);
        let reporter = MemoryReporter::new();
        let models = plan_price_models(&plan, &reporter);

        assert_eq!(models.len(), 1);
        assert_eq!(models[0].billing_id, "c1");
        assert_eq!(models[0].billing_cadence, BillingCadence::Recurring);
        assert_eq!(models[0].billing_model, BillingModel::FlatFee);
        assert_eq!(models[0].price_periods[0].price.currency, "USD");
        assert_eq!(models[0].price_periods[0].price.amount, 99.0);
        assert!(reporter.warnings().is_empty());
    }

    #[test]
    fn test_discount_scales_every_other_price() {
        let plan = plan(vec![
            price("c1", 100.0, "flat_fee"),
            price("c2", 50.0, "flat_fee"),
            discount("d1", 20.0),
        ]);
        let reporter = MemoryReporter::new();
        let models = plan_price_models(&plan, &reporter);

        assert_eq!(models.len(), 2);
        assert_eq!(models[0].price_periods[0].price.amount, 80.0);
        assert_eq!(models[1].price_periods[0].price.amount, 40.0);
        // The discount carrier is consumed, not warned about.
        assert!(reporter.warnings().is_empty());
    }

    #[test]
    fn test_discount_only_plan_maps_to_empty_list() {
        let plan = plan(vec![discount("d1", 15.0)]);
        let reporter = MemoryReporter::new();
        assert!(plan_price_models(&plan, &reporter).is_empty());
        assert!(reporter.warnings().is_empty());
    }

    #[test]
    fn test_unsupported_charge_model_warns_and_skips() {
        let plan = plan(vec![
            price("c1", 10.0, "per_unit"),
            price("c2", 99.0, "flat_fee"),
        ]);
        let reporter = MemoryReporter::new();
        let models = plan_price_models(&plan, &reporter);

        assert_eq!(models.len(), 1);
        assert_eq!(models[0].billing_id, "c2");
        let warnings = reporter.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("per_unit"));
    }

    #[test]
    fn test_discount_percentage_defaults_to_zero() {
        assert_eq!(discount_percentage(&plan(vec![price("c1", 5.0, "flat_fee")])), 0.0);
        assert_eq!(discount_percentage(&plan(vec![discount("d1", 25.0)])), 25.0);
    }

    fn existing(billing_id: &str, amount: f64) -> PackagePrice {
        PackagePrice {
            id: format!("target-{billing_id}"),
            billing_id: billing_id.to_string(),
            billing_cadence: BillingCadence::Recurring,
            billing_model: BillingModel::FlatFee,
            billing_period: BillingPeriod::Monthly,
            price: Money {
                currency: "USD".to_string(),
                amount,
            },
        }
    }

    #[test]
    fn test_identical_tuples_match() {
        let plan = plan(vec![price("c1", 99.0, "flat_fee")]);
        let models = plan_price_models(&plan, &MemoryReporter::new());
        assert!(prices_already_match(&models, &[existing("c1", 99.0)]));
    }

    #[test]
    fn test_amount_change_forces_write() {
        let plan = plan(vec![price("c1", 89.0, "flat_fee")]);
        let models = plan_price_models(&plan, &MemoryReporter::new());
        assert!(!prices_already_match(&models, &[existing("c1", 99.0)]));
    }

    #[test]
    fn test_empty_existing_prices_force_write() {
        let plan = plan(vec![price("c1", 99.0, "flat_fee")]);
        let models = plan_price_models(&plan, &MemoryReporter::new());
        assert!(!prices_already_match(&models, &[]));
    }

    #[test]
    fn test_match_ignores_target_assigned_id() {
        let plan = plan(vec![price("c1", 99.0, "flat_fee")]);
        let models = plan_price_models(&plan, &MemoryReporter::new());
        let mut current = existing("c1", 99.0);
        current.id = "completely-different".to_string();
        assert!(prices_already_match(&models, &[current]));
    }
}
