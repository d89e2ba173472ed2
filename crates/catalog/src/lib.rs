//! Catsync Catalog Core
//!
//! Domain model and reconciliation logic for importing a Zuora billing
//! catalog into the target platform. Everything network-shaped sits behind
//! the gateway traits in [`gateway`]; this crate never talks to the wire
//! itself.

pub mod classify;
pub mod gateway;
pub mod pricing;
pub mod reconcile;
pub mod refid;
pub mod source;
pub mod target;

pub use classify::{is_addon_name, split_addons_and_plans, CatalogSplit};
pub use gateway::{SourceGateway, TargetGateway};
pub use reconcile::{Reconciler, RunOptions};
pub use refid::compose_ref_id;
