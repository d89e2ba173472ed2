//! Target-side catalog operations
//!
//! Documents mirror the platform schema: plans and add-ons share field
//! shapes but live behind differently named operations, so documents are
//! built from the package kind. Responses keyed by operation name
//! (`createOnePlan` vs `createOneAddon`) are resolved by matching on the
//! kind we asked for, never by probing which field happens to be present.

use async_trait::async_trait;
use catsync_catalog::gateway::TargetGateway;
use catsync_catalog::target::{
    DraftHandle, DraftSummary, Package, PackageInput, PackageKind, PackagePrice, PackageStatus,
    PackageUpdate, PricingInput, Product, ProductInput, ProductUpdate,
};
use catsync_shared::{EntityKind, ImportError, ImportResult};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{CatalogApi, Edges};

const PRODUCT_FIELDS: &str = "id refId displayName description";

const PACKAGE_FIELDS: &str = r#"displayName
description
id
refId
status
productId
billingId
draftSummary {
  version
}
prices {
  billingCadence
  billingId
  billingModel
  billingPeriod
  id
  price {
    currency
    amount
  }
}"#;

/// Wire shape of a package node; `kind` is not on the wire, so nodes are
/// tagged with the kind the query asked for.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageNode {
    id: String,
    ref_id: String,
    display_name: String,
    #[serde(default)]
    description: String,
    status: PackageStatus,
    product_id: String,
    #[serde(default)]
    billing_id: Option<String>,
    #[serde(default)]
    draft_summary: Option<DraftSummary>,
    #[serde(default)]
    prices: Vec<PackagePrice>,
}

impl PackageNode {
    fn into_package(self, kind: PackageKind) -> Package {
        Package {
            id: self.id,
            ref_id: self.ref_id,
            display_name: self.display_name,
            description: self.description,
            status: self.status,
            product_id: self.product_id,
            billing_id: self.billing_id,
            draft_summary: self.draft_summary,
            prices: self.prices,
            kind,
            draft_id: None,
        }
    }
}

#[derive(Deserialize)]
struct ProductsData {
    products: Edges<Product>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateProductData {
    #[serde(default)]
    create_one_product: Option<Product>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProductData {
    #[serde(default)]
    update_one_product: Option<Product>,
}

#[derive(Deserialize)]
struct PackagesData {
    #[serde(default)]
    plans: Option<Edges<PackageNode>>,
    #[serde(default)]
    addons: Option<Edges<PackageNode>>,
}

impl PackagesData {
    fn into_first(self, kind: PackageKind) -> Option<PackageNode> {
        match kind {
            PackageKind::Plan => self.plans.and_then(Edges::into_first),
            PackageKind::Addon => self.addons.and_then(Edges::into_first),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePackageData {
    #[serde(default)]
    create_one_plan: Option<PackageNode>,
    #[serde(default)]
    create_one_addon: Option<PackageNode>,
}

impl CreatePackageData {
    fn into_node(self, kind: PackageKind) -> Option<PackageNode> {
        match kind {
            PackageKind::Plan => self.create_one_plan,
            PackageKind::Addon => self.create_one_addon,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePackageData {
    #[serde(default)]
    update_one_plan: Option<PackageNode>,
    #[serde(default)]
    update_one_addon: Option<PackageNode>,
}

impl UpdatePackageData {
    fn into_node(self, kind: PackageKind) -> Option<PackageNode> {
        match kind {
            PackageKind::Plan => self.update_one_plan,
            PackageKind::Addon => self.update_one_addon,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDraftData {
    #[serde(default)]
    create_plan_draft: Option<DraftHandle>,
    #[serde(default)]
    create_addon_draft: Option<DraftHandle>,
}

impl CreateDraftData {
    fn into_handle(self, kind: PackageKind) -> Option<DraftHandle> {
        match kind {
            PackageKind::Plan => self.create_plan_draft,
            PackageKind::Addon => self.create_addon_draft,
        }
    }
}

fn package_filter(
    ref_id: &str,
    product_id: &str,
    version: Option<i64>,
    latest_only: bool,
) -> Value {
    let mut filter = json!({
        "refId": { "eq": ref_id },
        "productId": { "eq": product_id },
    });
    if let Some(version) = version {
        filter["versionNumber"] = json!({ "eq": version });
    }
    if latest_only {
        filter["isLatest"] = json!({ "is": true });
    }
    filter
}

fn find_package_query(kind: PackageKind) -> String {
    format!(
        "query {kind}s($filter: {kind}Filter) {{\n  {collection}(filter: $filter) {{\n    edges {{\n      node {{\n        {PACKAGE_FIELDS}\n      }}\n    }}\n  }}\n}}",
        kind = kind.type_name(),
        collection = kind.collection(),
    )
}

impl CatalogApi {
    async fn execute_or_transport<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: &Value,
    ) -> ImportResult<crate::graphql::GraphQlResponse<T>> {
        self.client
            .execute(query, variables)
            .await
            .map_err(|e| ImportError::transport(operation, e))
    }
}

#[async_trait]
impl TargetGateway for CatalogApi {
    async fn find_product(&self, ref_id: &str) -> ImportResult<Option<Product>> {
        let query = format!(
            "query Products($filter: ProductFilter) {{\n  products(filter: $filter) {{\n    edges {{\n      node {{\n        {PRODUCT_FIELDS}\n      }}\n    }}\n  }}\n}}"
        );
        let variables = json!({ "filter": { "refId": { "eq": ref_id } } });
        let response = self
            .execute_or_transport::<ProductsData>("Products", &query, &variables)
            .await?;

        if let Some(errors) = response.errors {
            return Err(ImportError::query(EntityKind::Product, ref_id, errors));
        }
        Ok(response.data.and_then(|data| data.products.into_first()))
    }

    async fn create_product(&self, input: &ProductInput) -> ImportResult<Product> {
        let query = format!(
            "mutation CreateOneProduct($input: CreateOneProductInput!) {{\n  createOneProduct(input: $input) {{\n    {PRODUCT_FIELDS}\n  }}\n}}"
        );
        let variables = json!({ "input": { "product": input } });
        let response = self
            .execute_or_transport::<CreateProductData>("CreateOneProduct", &query, &variables)
            .await?;

        if let Some(errors) = response.errors {
            return Err(ImportError::mutation(
                EntityKind::Product,
                "create",
                &input.ref_id,
                errors,
            ));
        }
        response
            .data
            .and_then(|data| data.create_one_product)
            .ok_or_else(|| ImportError::Malformed {
                entity: EntityKind::Product,
                ref_id: input.ref_id.clone(),
                detail: "create response carried no product".to_string(),
            })
    }

    async fn update_product(&self, update: &ProductUpdate) -> ImportResult<Product> {
        let query = format!(
            "mutation UpdateOneProduct($input: UpdateOneProductInput!) {{\n  updateOneProduct(input: $input) {{\n    {PRODUCT_FIELDS}\n  }}\n}}"
        );
        let variables = json!({
            "input": {
                "id": update.id,
                "update": {
                    "displayName": update.display_name,
                    "description": update.description,
                    "additionalMetaData": update.additional_metadata,
                },
            }
        });
        let response = self
            .execute_or_transport::<UpdateProductData>("UpdateOneProduct", &query, &variables)
            .await?;

        if let Some(errors) = response.errors {
            return Err(ImportError::mutation(
                EntityKind::Product,
                "update",
                &update.id,
                errors,
            ));
        }
        response
            .data
            .and_then(|data| data.update_one_product)
            .ok_or_else(|| ImportError::Malformed {
                entity: EntityKind::Product,
                ref_id: update.id.clone(),
                detail: "update response carried no product".to_string(),
            })
    }

    async fn find_package(
        &self,
        kind: PackageKind,
        ref_id: &str,
        product_id: &str,
        version: Option<i64>,
        latest_only: bool,
    ) -> ImportResult<Option<Package>> {
        let query = find_package_query(kind);
        let variables = json!({
            "filter": package_filter(ref_id, product_id, version, latest_only)
        });
        let response = self
            .execute_or_transport::<PackagesData>(kind.type_name(), &query, &variables)
            .await?;

        if let Some(errors) = response.errors {
            return Err(ImportError::query(kind.entity(), ref_id, errors));
        }
        Ok(response
            .data
            .and_then(|data| data.into_first(kind))
            .map(|node| node.into_package(kind)))
    }

    async fn create_package(
        &self,
        kind: PackageKind,
        input: &PackageInput,
    ) -> ImportResult<Package> {
        let query = format!(
            "mutation CreateOne{kind}($input: {kind}CreateInput!) {{\n  createOne{kind}(input: $input) {{\n    {PACKAGE_FIELDS}\n  }}\n}}",
            kind = kind.type_name(),
        );
        let variables = json!({ "input": input });
        let response = self
            .execute_or_transport::<CreatePackageData>("CreateOnePackage", &query, &variables)
            .await?;

        if let Some(errors) = response.errors {
            return Err(ImportError::mutation(
                kind.entity(),
                "create",
                &input.ref_id,
                errors,
            ));
        }
        response
            .data
            .and_then(|data| data.into_node(kind))
            .map(|node| node.into_package(kind))
            .ok_or_else(|| ImportError::Malformed {
                entity: kind.entity(),
                ref_id: input.ref_id.clone(),
                detail: "create response carried no package".to_string(),
            })
    }

    async fn update_package(
        &self,
        kind: PackageKind,
        update: &PackageUpdate,
    ) -> ImportResult<Package> {
        let query = format!(
            "mutation UpdateOne{kind}($input: {kind}UpdateInput!) {{\n  updateOne{kind}(input: $input) {{\n    {PACKAGE_FIELDS}\n  }}\n}}",
            kind = kind.type_name(),
        );
        let variables = json!({ "input": update });
        let response = self
            .execute_or_transport::<UpdatePackageData>("UpdateOnePackage", &query, &variables)
            .await?;

        if let Some(errors) = response.errors {
            return Err(ImportError::mutation(
                kind.entity(),
                "update",
                &update.id,
                errors,
            ));
        }
        response
            .data
            .and_then(|data| data.into_node(kind))
            .map(|node| node.into_package(kind))
            .ok_or_else(|| ImportError::Malformed {
                entity: kind.entity(),
                ref_id: update.id.clone(),
                detail: "update response carried no package".to_string(),
            })
    }

    async fn create_package_draft(
        &self,
        kind: PackageKind,
        package_id: &str,
    ) -> ImportResult<DraftHandle> {
        let query = format!(
            "mutation Create{kind}Draft($input: UUID!) {{\n  create{kind}Draft(id: $input) {{\n    id\n    refId\n    versionNumber\n    __typename\n  }}\n}}",
            kind = kind.type_name(),
        );
        let variables = json!({ "input": package_id });
        let response = self
            .execute_or_transport::<CreateDraftData>("CreatePackageDraft", &query, &variables)
            .await?;

        if let Some(errors) = response.errors {
            return Err(ImportError::mutation(
                EntityKind::Draft,
                "create",
                package_id,
                errors,
            ));
        }
        response
            .data
            .and_then(|data| data.into_handle(kind))
            .ok_or_else(|| ImportError::Malformed {
                entity: EntityKind::Draft,
                ref_id: package_id.to_string(),
                detail: "draft response carried no handle".to_string(),
            })
    }

    async fn set_package_pricing(&self, input: &PricingInput) -> ImportResult<()> {
        let query = "mutation SetPackagePricing($input: PackagePricingInput!) {\n  setPackagePricing(input: $input) {\n    packageId\n    pricingType\n  }\n}";
        let variables = json!({ "input": input });
        let response = self
            .execute_or_transport::<Value>("SetPackagePricing", query, &variables)
            .await?;

        if let Some(errors) = response.errors {
            return Err(ImportError::mutation(
                EntityKind::Price,
                "set",
                &input.package_id,
                errors,
            ));
        }
        Ok(())
    }

    async fn publish_package(&self, kind: PackageKind, package_id: &str) -> ImportResult<()> {
        let query = format!(
            "mutation Publish{kind}($input: PackagePublishInput!) {{\n  publish{kind}(input: $input) {{\n    taskId\n    __typename\n  }}\n}}",
            kind = kind.type_name(),
        );
        let variables = json!({
            "input": {
                "id": package_id,
                "migrationType": "NEW_CUSTOMERS",
            }
        });
        let response = self
            .execute_or_transport::<Value>("PublishPackage", &query, &variables)
            .await?;

        if let Some(errors) = response.errors {
            return Err(ImportError::mutation(
                kind.entity(),
                "publish",
                package_id,
                errors,
            ));
        }
        Ok(())
    }

    async fn link_addons_to_plan(&self, plan_id: &str, addon_ids: &[String]) -> ImportResult<()> {
        let query = "mutation AddCompatibleAddonsToPlan($input: AddCompatibleAddonsToPlanInput!) {\n  addCompatibleAddonsToPlan(input: $input) {\n    id\n    __typename\n  }\n}";
        let variables = json!({
            "input": {
                "id": plan_id,
                "relationIds": addon_ids,
            }
        });
        let response = self
            .execute_or_transport::<Value>("AddCompatibleAddonsToPlan", query, &variables)
            .await?;

        if let Some(errors) = response.errors {
            return Err(ImportError::mutation(
                EntityKind::Plan,
                "link add-ons to",
                plan_id,
                errors,
            ));
        }
        Ok(())
    }
}
