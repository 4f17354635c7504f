use super::Resource;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::BTreeMap;

/// A single measurement entry. Numeric values are the norm; the storefront also
/// sends a textual `unit` next to them (`cm`, `kg`, ...). Numbers keep the
/// form they were submitted in: `10` stays an integer, `2.5` a float.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasureValue {
    Number(Number),
    Text(String),
}

/// Dimension or weight breakdown, e.g. `{"length": 10, "width": 4, "unit": "cm"}`.
pub type Measurements = BTreeMap<String, MeasureValue>;

/// Product as accepted on writes. Identity is owned by the backend, so there is
/// no id here.
///
/// Absent optional fields serialize as `null`: updates replace the whole
/// document and must clear whatever the previous version had set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    pub description: String,
    pub ean_code: String,
    pub asin: Option<String>,
    pub price: Number,
    pub dimensions: Measurements,
    pub weight: Measurements,
    pub images: Option<Vec<String>>,
    pub status: String,
    pub browse_nodes: Option<Vec<String>>,
    pub sales_rank: Option<i64>,
    pub buy_box: Option<serde_json::Map<String, serde_json::Value>>,
    pub amazon_price: Option<Number>,
    pub lowest_prices: Option<BTreeMap<String, Number>>,
    pub list_price: Option<Number>,
    pub product_group: Option<String>,
    pub product_type: Option<String>,
}

impl Resource for Product {
    const COLLECTION: &'static str = "products";
    const LABEL: &'static str = "Product";
}
