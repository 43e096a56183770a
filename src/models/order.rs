use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys owned by `Order`; never carried in its passthrough map
const ORDER_FIELDS: [&str; 5] = ["id", "timestamp", "status", "products", "total"];

/// Keys owned by `Product`; never carried in its passthrough map
const PRODUCT_FIELDS: [&str; 5] = ["id", "status", "title", "image", "price"];

fn without_fields(mut extra: Map<String, Value>, fields: &[&str]) -> Map<String, Value> {
    for field in fields {
        extra.remove(*field);
    }
    extra
}

/// Generate a new order id
pub fn generate_order_id() -> String {
    format!("order_{}", uuid::Uuid::new_v4().simple())
}

/// Generate a new product id
pub fn generate_product_id() -> String {
    format!("product_{}", uuid::Uuid::new_v4().simple())
}

/// Product line within an order. `status` mirrors the parent order's status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub price: f64,
    /// Fields supplied by the caller that the tracker does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Tracked order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    /// Creation instant, ms since epoch
    pub timestamp: i64,
    /// Stage name, re-derived from elapsed time on every recompute
    pub status: String,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub total: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Order {
    /// Display title: first product's title, or `Order #<id>`
    pub fn title(&self) -> String {
        match self.products.first() {
            Some(product) if !product.title.is_empty() => product.title.clone(),
            _ => format!("Order #{}", self.id),
        }
    }

    /// Set the order's status and mirror it onto every product
    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
        for product in &mut self.products {
            product.status = status.to_string();
        }
    }
}

/// Partial product record as submitted (e.g. from a cart)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewProduct {
    pub fn new(title: &str, price: f64) -> Self {
        Self {
            title: title.to_string(),
            price,
            ..Default::default()
        }
    }

    /// Complete the record: keep a supplied id or generate one.
    /// A submitted `status` is replaced by the given one.
    pub fn into_product(self, status: &str) -> Product {
        Product {
            id: self.id.unwrap_or_else(generate_product_id),
            status: status.to_string(),
            title: self.title,
            image: self.image,
            price: self.price,
            extra: without_fields(self.extra, &PRODUCT_FIELDS),
        }
    }
}

/// Partial order record as submitted. Missing id and timestamp are assigned on add.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub products: Vec<NewProduct>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewOrder {
    pub fn new(products: Vec<NewProduct>) -> Self {
        Self {
            products,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// Complete the record with the given creation time and initial status.
    /// A missing total becomes the sum of product prices. Submitted
    /// `timestamp` and `status` keys are replaced, not kept as extra fields.
    pub fn into_order(self, timestamp: i64, status: &str) -> Order {
        let total = self
            .total
            .unwrap_or_else(|| self.products.iter().map(|p| p.price).sum());
        Order {
            id: self.id.unwrap_or_else(generate_order_id),
            timestamp,
            status: status.to_string(),
            products: self
                .products
                .into_iter()
                .map(|p| p.into_product(status))
                .collect(),
            total,
            extra: without_fields(self.extra, &ORDER_FIELDS),
        }
    }
}
