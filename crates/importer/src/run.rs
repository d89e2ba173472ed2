//! Run orchestration
//!
//! Thin sequencing over the reconciler: integration → fetch → classify →
//! add-ons → publish add-ons → plans → link → publish plans. Ordering is
//! strict because plan and price writes must observe freshly created ids,
//! and add-ons must exist before the plans that reference them.

use std::sync::Arc;

use catsync_catalog::gateway::SourceGateway;
use catsync_catalog::source::SourceProduct;
use catsync_catalog::target::{Package, PackageKind};
use catsync_catalog::{split_addons_and_plans, Reconciler};
use catsync_shared::{ImportResult, Reporter};

use crate::api::CatalogApi;
use crate::config::Config;
use crate::graphql::GraphQlClient;

pub async fn run(config: &Config, reporter: Arc<dyn Reporter>) -> ImportResult<()> {
    let api = CatalogApi::new(GraphQlClient::new(&config.base_url, &config.api_key));

    let integration = api.find_integration(&config.environment_id).await?;
    tracing::debug!(integration_id = %integration.id, "Resolved billing integration");

    let mut products = Vec::new();
    for product_ref in &config.product_ids {
        products.extend(
            api.fetch_billing_products(product_ref, &integration.id)
                .await?,
        );
    }
    if products.is_empty() {
        reporter.info("No products found in the source system for the given product ids");
        return Ok(());
    }

    let split = split_addons_and_plans(&products);
    let reconciler = Reconciler::new(
        &api,
        reporter,
        config.environment_id.clone(),
        config.options,
    );

    let addons = import_products(&reconciler, &split.addon_products, PackageKind::Addon).await?;
    // Add-ons publish ahead of the plans that get linked to them.
    reconciler.publish_packages(&addons).await?;

    let plans = import_products(&reconciler, &split.plan_products, PackageKind::Plan).await?;
    reconciler.link_addons_to_plans(&plans, &addons).await?;
    for plan in &plans {
        reconciler.publish_package(plan).await?;
    }

    Ok(())
}

async fn import_products(
    reconciler: &Reconciler<'_, CatalogApi>,
    products: &[SourceProduct],
    kind: PackageKind,
) -> ImportResult<Vec<Package>> {
    let mut packages = Vec::new();
    for product in products {
        let product_id = reconciler.reconcile_product(product).await?;
        for plan in &product.plans {
            let mut package = reconciler
                .reconcile_package(kind, plan, &product_id, &product.id)
                .await?;
            reconciler.reconcile_prices(plan, &mut package).await?;
            packages.push(package);
        }
    }
    Ok(packages)
}
