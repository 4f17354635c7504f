//! Domain types passed between the validator, the gateway and the backend.

mod product;

pub use product::{MeasureValue, Measurements, Product};

use serde::Serialize;

/// A row exactly as the backend stored and returned it, including its
/// backend-assigned identifier.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// An entity that can be served by a [`crate::service::CrudGateway`].
pub trait Resource: Serialize + Send + Sync + 'static {
    /// Default collection (table) name at the backend.
    const COLLECTION: &'static str;
    /// Column holding the backend-assigned identifier.
    const ID_COLUMN: &'static str = "id";
    /// Human-readable name used in messages.
    const LABEL: &'static str;
}
