//! Fetch-or-create-or-update reconciliation
//!
//! One pattern, three entity kinds: query the target by identity key,
//! branch on existence, then create or compare-and-conditionally-update.
//! Price changes never touch a published version directly; the reconciler
//! resolves a draft first and mutates that. Dry-run mode keeps every read
//! and replaces every write with a reported preview.

use std::collections::BTreeMap;
use std::sync::Arc;

use catsync_shared::{ImportError, ImportResult, Reporter};
use futures::future::try_join_all;

use crate::gateway::TargetGateway;
use crate::pricing::{discount_percentage, plan_price_models, prices_already_match};
use crate::refid::compose_ref_id;
use crate::source::{SourcePlan, SourceProduct};
use crate::target::{
    Package, PackageInput, PackageKind, PackageStatus, PackageUpdate, PricingInput, PricingType,
    Product, ProductInput, ProductUpdate,
};

/// Marks a record as managed by this importer so the live sync leaves it be.
const SYNC_MANAGED_KEY: &str = "ZUORA__SYNC_SKIP_UPDATE";
/// Plan-level discount annotation, recorded when > 0.
const DISCOUNT_METADATA_KEY: &str = "ZUORA__DISCOUNT_PERCENTAGE";
/// Import marker on products.
const PRODUCT_IMPORT_MARKER_KEY: &str = "from_zuora_import";

/// Display-name fallback for source products with an empty name.
const UNNAMED_PRODUCT: &str = "unknown_product";

/// Placeholder ids handed back by dry runs instead of calling the target.
const DRY_RUN_PRODUCT_ID: &str = "dry-run-new-product-id";
const DRY_RUN_PACKAGE_ID: &str = "dry-run-id-placeholder";

/// Mode flags threaded in from configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Log intended mutations without issuing them. Reads still happen.
    pub dry_run: bool,
    /// Publish packages after reconciliation.
    pub publish: bool,
    /// Update existing entities whose display fields drifted.
    pub update: bool,
}

/// Per-entity reconciliation over an abstract target gateway. Sole writer of
/// target-side mutations.
pub struct Reconciler<'a, G> {
    target: &'a G,
    reporter: Arc<dyn Reporter>,
    environment_id: String,
    options: RunOptions,
}

fn pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| String::from("<unserializable>"))
}

impl<'a, G: TargetGateway> Reconciler<'a, G> {
    pub fn new(
        target: &'a G,
        reporter: Arc<dyn Reporter>,
        environment_id: impl Into<String>,
        options: RunOptions,
    ) -> Self {
        Self {
            target,
            reporter,
            environment_id: environment_id.into(),
            options,
        }
    }

    fn mode_prefix(&self) -> &'static str {
        if self.options.dry_run {
            "[Dry Run]: "
        } else {
            ""
        }
    }

    /// Resolve the target product for a source product, creating or updating
    /// it as needed. Always returns the resolved target product id.
    pub async fn reconcile_product(&self, source: &SourceProduct) -> ImportResult<String> {
        let input = self.product_input(source);

        if let Some(existing) = self.target.find_product(&input.ref_id).await? {
            self.reporter.info(&format!(
                "{}Product already exists with ID: {}",
                self.mode_prefix(),
                existing.id
            ));
            self.update_product_if_needed(&existing, &input).await?;
            return Ok(existing.id);
        }

        if self.options.dry_run {
            self.reporter.info(&format!(
                "[Dry Run]: would create PRODUCT with input\n{}",
                pretty(&input)
            ));
            return Ok(DRY_RUN_PRODUCT_ID.to_string());
        }

        let created = self.target.create_product(&input).await?;
        self.reporter.info(&format!(
            "Created product {} with ID: {}",
            created.display_name, created.id
        ));
        Ok(created.id)
    }

    fn product_input(&self, source: &SourceProduct) -> ProductInput {
        let name = if source.name.trim().is_empty() {
            UNNAMED_PRODUCT
        } else {
            source.name.as_str()
        };
        ProductInput {
            ref_id: compose_ref_id(name, &source.id),
            display_name: source.name.clone(),
            description: source.description.clone().unwrap_or_default(),
            environment_id: self.environment_id.clone(),
            additional_metadata: BTreeMap::from([(
                PRODUCT_IMPORT_MARKER_KEY.to_string(),
                "true".to_string(),
            )]),
        }
    }

    async fn update_product_if_needed(
        &self,
        existing: &Product,
        input: &ProductInput,
    ) -> ImportResult<()> {
        if !self.options.update {
            return Ok(());
        }

        let needs_update = existing.display_name != input.display_name
            || existing.description != input.description;
        if !needs_update {
            self.reporter.info(&format!(
                "No updates needed for product with refId: {}",
                existing.ref_id
            ));
            return Ok(());
        }

        if self.options.dry_run {
            self.reporter.info(&format!(
                "[Dry Run]: would update PRODUCT with input\n{}",
                pretty(input)
            ));
            return Ok(());
        }

        let update = ProductUpdate {
            id: existing.id.clone(),
            display_name: input.display_name.clone(),
            description: input.description.clone(),
            additional_metadata: input.additional_metadata.clone(),
        };
        let updated = self.target.update_product(&update).await?;
        self.reporter.info(&format!(
            "Updated product {} with ID: {}",
            updated.display_name, updated.id
        ));
        Ok(())
    }

    /// Resolve the target package (plan or add-on) for a source plan,
    /// creating or updating it as needed.
    pub async fn reconcile_package(
        &self,
        kind: PackageKind,
        plan: &SourcePlan,
        product_id: &str,
        source_product_id: &str,
    ) -> ImportResult<Package> {
        let input = self.package_input(kind, plan, product_id, source_product_id);

        if let Some(existing) = self
            .target
            .find_package(kind, &input.ref_id, product_id, None, true)
            .await?
        {
            self.reporter.info(&format!(
                "{}{} already exists with refId: {}, proceeding to add prices",
                self.mode_prefix(),
                kind,
                existing.ref_id
            ));
            if let Some(updated) = self.update_package_if_needed(kind, &existing, &input).await? {
                return Ok(updated);
            }
            return Ok(existing);
        }

        if self.options.dry_run {
            self.reporter.info(&format!(
                "[Dry Run]: would create {} with input\n{}",
                kind.type_name().to_uppercase(),
                pretty(&input)
            ));
            return Ok(Package {
                id: DRY_RUN_PACKAGE_ID.to_string(),
                ref_id: input.ref_id,
                display_name: input.display_name,
                description: input.description,
                status: PackageStatus::Draft,
                product_id: product_id.to_string(),
                billing_id: Some(input.billing_id),
                draft_summary: None,
                prices: vec![],
                kind,
                draft_id: None,
            });
        }

        let created = self.target.create_package(kind, &input).await?;
        self.reporter.info(&format!(
            "Created {} {} with ID: {}",
            kind, created.display_name, created.id
        ));
        Ok(created)
    }

    fn package_input(
        &self,
        kind: PackageKind,
        plan: &SourcePlan,
        product_id: &str,
        source_product_id: &str,
    ) -> PackageInput {
        let discount = discount_percentage(plan);
        let is_paid = match kind {
            PackageKind::Plan => plan.has_paid_price(),
            PackageKind::Addon => true,
        };

        let mut metadata =
            BTreeMap::from([(SYNC_MANAGED_KEY.to_string(), "true".to_string())]);
        if discount > 0.0 {
            metadata.insert(DISCOUNT_METADATA_KEY.to_string(), discount.to_string());
        }

        PackageInput {
            ref_id: compose_ref_id(&plan.name, &plan.id),
            display_name: plan.name.clone(),
            description: plan.description.clone().unwrap_or_default(),
            product_id: product_id.to_string(),
            billing_id: source_product_id.to_string(),
            environment_id: self.environment_id.clone(),
            pricing_type: if is_paid {
                PricingType::Paid
            } else {
                PricingType::Free
            },
            status: PackageStatus::Draft,
            additional_metadata: metadata,
        }
    }

    async fn update_package_if_needed(
        &self,
        kind: PackageKind,
        existing: &Package,
        input: &PackageInput,
    ) -> ImportResult<Option<Package>> {
        if !self.options.update {
            return Ok(None);
        }

        let billing_drifted = existing
            .billing_id
            .as_deref()
            .map(|id| id != input.billing_id)
            .unwrap_or(false);
        let needs_update = existing.display_name != input.display_name
            || existing.description != input.description
            || billing_drifted;
        if !needs_update {
            self.reporter.info(&format!(
                "No updates needed for {} with refId: {}",
                kind, existing.ref_id
            ));
            return Ok(None);
        }

        if self.options.dry_run {
            self.reporter.info(&format!(
                "[Dry Run]: would update {} with input\n{}",
                kind.type_name().to_uppercase(),
                pretty(input)
            ));
            return Ok(None);
        }

        self.reporter
            .info(&format!("Updating {} with refId: {}", kind, existing.ref_id));
        let update = PackageUpdate {
            id: existing.id.clone(),
            display_name: input.display_name.clone(),
            description: input.description.clone(),
            billing_id: input.billing_id.clone(),
            additional_metadata: input.additional_metadata.clone(),
        };
        let updated = self.target.update_package(kind, &update).await?;
        Ok(Some(updated))
    }

    /// Bring the package's prices in line with the source plan. Skips
    /// entirely when every mapped price already exists; otherwise resolves a
    /// draft and mutates that, recording the draft id on the package.
    pub async fn reconcile_prices(
        &self,
        plan: &SourcePlan,
        package: &mut Package,
    ) -> ImportResult<()> {
        let models = plan_price_models(plan, self.reporter.as_ref());
        if models.is_empty() {
            self.reporter.info(&format!(
                "No prices to set for {} with refId: {}",
                package.kind, package.ref_id
            ));
            return Ok(());
        }

        if prices_already_match(&models, &package.prices) {
            self.reporter.info(&format!(
                "Prices already exist for {} with refId: {}, skipping price update",
                package.kind, package.ref_id
            ));
            return Ok(());
        }

        let mut input = PricingInput {
            environment_id: self.environment_id.clone(),
            package_id: package.id.clone(),
            price_group_billing_id: plan.id.clone(),
            pricing_models: models,
            pricing_type: PricingType::Paid,
        };

        if self.options.dry_run {
            self.reporter.info(&format!(
                "[Dry Run]: would set PRICE with input\n{}",
                pretty(&input)
            ));
            return Ok(());
        }

        let draft_id = self.resolve_draft_id(package).await?;
        package.draft_id = Some(draft_id.clone());
        input.package_id = draft_id;

        self.target.set_package_pricing(&input).await?;
        self.reporter.info(&format!(
            "Set pricing for {} with refId: {}",
            package.kind, package.ref_id
        ));
        Ok(())
    }

    /// The one draft-resolution path: a draft package is its own draft; a
    /// published package without a draft summary gets a fresh draft; one
    /// with a summary resolves that exact version.
    async fn resolve_draft_id(&self, package: &Package) -> ImportResult<String> {
        if package.status == PackageStatus::Draft {
            return Ok(package.id.clone());
        }

        let Some(summary) = package.draft_summary else {
            let draft = self
                .target
                .create_package_draft(package.kind, &package.id)
                .await?;
            tracing::debug!(
                package_ref_id = %package.ref_id,
                draft_id = %draft.id,
                "Created draft for published package"
            );
            return Ok(draft.id);
        };

        tracing::debug!(
            package_ref_id = %package.ref_id,
            version = summary.version,
            "Resolving existing draft version"
        );

        let draft = self
            .target
            .find_package(
                package.kind,
                &package.ref_id,
                &package.product_id,
                Some(summary.version),
                false,
            )
            .await?
            .ok_or_else(|| ImportError::DraftNotFound {
                entity: package.kind.entity(),
                ref_id: package.ref_id.clone(),
            })?;
        Ok(draft.id)
    }

    /// Publish one package. Branches are mutually exclusive: a draft id
    /// resolved during pricing wins, then the package's own draft status,
    /// then the draft version named by its summary; anything else is already
    /// published. Gated on publish mode and never run under dry-run.
    pub async fn publish_package(&self, package: &Package) -> ImportResult<()> {
        if !self.options.publish || self.options.dry_run {
            return Ok(());
        }

        if let Some(draft_id) = &package.draft_id {
            self.reporter.info(&format!(
                "Publishing {} with refId: {}",
                package.kind, package.ref_id
            ));
            return self.target.publish_package(package.kind, draft_id).await;
        }

        if package.status == PackageStatus::Draft {
            self.reporter.info(&format!(
                "Publishing {} with refId: {}",
                package.kind, package.ref_id
            ));
            return self.target.publish_package(package.kind, &package.id).await;
        }

        if let Some(summary) = package.draft_summary.filter(|summary| summary.version > 0) {
            let draft = self
                .target
                .find_package(
                    package.kind,
                    &package.ref_id,
                    &package.product_id,
                    Some(summary.version),
                    false,
                )
                .await?;
            let Some(draft) = draft else {
                self.reporter.warn(&format!(
                    "No draft found for {} with refId: {}",
                    package.kind, package.ref_id
                ));
                return Ok(());
            };
            self.reporter.info(&format!(
                "Publishing {} with refId: {}",
                package.kind, package.ref_id
            ));
            return self.target.publish_package(package.kind, &draft.id).await;
        }

        self.reporter.info(&format!(
            "{} with refId: {} is already published",
            package.kind, package.ref_id
        ));
        Ok(())
    }

    /// Publish a set of packages concurrently. Used for add-ons, which do
    /// not reference each other, so order among them is irrelevant.
    pub async fn publish_packages(&self, packages: &[Package]) -> ImportResult<()> {
        if !self.options.publish || self.options.dry_run {
            return Ok(());
        }
        try_join_all(packages.iter().map(|package| self.publish_package(package))).await?;
        Ok(())
    }

    /// Associate the full add-on set with every plan, one batched mutation
    /// per plan, issued concurrently across plans.
    pub async fn link_addons_to_plans(
        &self,
        plans: &[Package],
        addons: &[Package],
    ) -> ImportResult<()> {
        if plans.is_empty() || addons.is_empty() {
            return Ok(());
        }

        let addon_ids: Vec<String> = addons.iter().map(|addon| addon.id.clone()).collect();

        if self.options.dry_run {
            let plan_ids: Vec<&str> = plans.iter().map(|plan| plan.id.as_str()).collect();
            self.reporter.info(&format!(
                "[Dry Run]: would assign ADDON IDs {:?} to PLAN IDs {:?}",
                addon_ids, plan_ids
            ));
            return Ok(());
        }

        try_join_all(plans.iter().map(|plan| {
            let addon_ids = &addon_ids;
            async move {
                self.reporter.info(&format!(
                    "Assigning {} add-ons to plan with refId: {}",
                    addon_ids.len(),
                    plan.ref_id
                ));
                self.target.link_addons_to_plan(&plan.id, addon_ids).await
            }
        }))
        .await?;
        Ok(())
    }
}
