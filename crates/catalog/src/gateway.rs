//! Gateway traits
//!
//! The reconciler consumes two abstract capabilities: "query the source
//! catalog" and "query/mutate the target catalog". How either is transported
//! is the importer's concern; tests substitute in-memory fakes.

use async_trait::async_trait;
use catsync_shared::ImportResult;

use crate::source::{IntegrationHandle, SourceProduct};
use crate::target::{
    DraftHandle, Package, PackageInput, PackageKind, PackageUpdate, PricingInput, Product,
    ProductInput, ProductUpdate,
};

/// Read side: the billing catalog exposed through the Zuora integration.
#[async_trait]
pub trait SourceGateway: Send + Sync {
    /// Resolve the integration handle for an environment. Absence is an
    /// error (`IntegrationNotFound`), not a create branch.
    async fn find_integration(&self, environment_id: &str) -> ImportResult<IntegrationHandle>;

    /// Fetch the billing products matching one product id or name. An empty
    /// list is valid and means "nothing to import".
    async fn fetch_billing_products(
        &self,
        product_ref: &str,
        integration_id: &str,
    ) -> ImportResult<Vec<SourceProduct>>;
}

/// Write side: the target catalog API. Lookup misses return `Ok(None)`;
/// every failure carries entity kind, identifying ref, and the raw error
/// payload.
#[async_trait]
pub trait TargetGateway: Send + Sync {
    async fn find_product(&self, ref_id: &str) -> ImportResult<Option<Product>>;

    async fn create_product(&self, input: &ProductInput) -> ImportResult<Product>;

    async fn update_product(&self, update: &ProductUpdate) -> ImportResult<Product>;

    /// Query one package version. `latest_only` asks for the current
    /// version; `version` pins an exact one (used for draft resolution).
    async fn find_package(
        &self,
        kind: PackageKind,
        ref_id: &str,
        product_id: &str,
        version: Option<i64>,
        latest_only: bool,
    ) -> ImportResult<Option<Package>>;

    async fn create_package(
        &self,
        kind: PackageKind,
        input: &PackageInput,
    ) -> ImportResult<Package>;

    async fn update_package(
        &self,
        kind: PackageKind,
        update: &PackageUpdate,
    ) -> ImportResult<Package>;

    /// Create a new mutable draft from a published package.
    async fn create_package_draft(
        &self,
        kind: PackageKind,
        package_id: &str,
    ) -> ImportResult<DraftHandle>;

    /// Set the full pricing of a draft package version.
    async fn set_package_pricing(&self, input: &PricingInput) -> ImportResult<()>;

    /// Promote a draft version to the immutable published status.
    async fn publish_package(&self, kind: PackageKind, package_id: &str) -> ImportResult<()>;

    /// Batched association of the add-on set with one plan.
    async fn link_addons_to_plan(&self, plan_id: &str, addon_ids: &[String]) -> ImportResult<()>;
}
