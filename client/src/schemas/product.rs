//! Marketplace product schemas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storefront_cart::CartProduct;
use storefront_remote::{JsonSchema, ObjectShape, Shape};

/// Package dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
    /// Depth
    pub depth: f64,
}

/// A customer review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Stars
    pub rating: f64,
    /// Review text
    pub comment: String,
    /// When the review was written
    pub date: DateTime<Utc>,
    /// Reviewer display name
    pub reviewer_name: String,
    /// Reviewer email
    pub reviewer_email: String,
}

/// Catalog bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMeta {
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
    /// Barcode
    pub barcode: String,
    /// QR code image URL
    pub qr_code: String,
}

/// A marketplace product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct Product {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub discount_percentage: f64,
    pub rating: f64,
    pub stock: u32,
    pub tags: Vec<String>,
    #[serde(default)]
    pub brand: Option<String>,
    pub sku: String,
    pub weight: f64,
    pub dimensions: Dimensions,
    pub warranty_information: String,
    pub shipping_information: String,
    pub availability_status: String,
    pub reviews: Vec<Review>,
    pub return_policy: String,
    pub minimum_order_quantity: u32,
    pub meta: ProductMeta,
    pub images: Vec<String>,
    pub thumbnail: String,
}

impl Product {
    pub(crate) fn shape() -> ObjectShape {
        let review = Shape::object()
            .field("rating", Shape::number())
            .field("comment", Shape::string())
            .field("date", Shape::string().datetime("Invalid datetime"))
            .field("reviewerName", Shape::string())
            .field("reviewerEmail", Shape::string().email("Invalid email"));

        let meta = Shape::object()
            .field("createdAt", Shape::string().datetime("Invalid datetime"))
            .field("updatedAt", Shape::string().datetime("Invalid datetime"))
            .field("barcode", Shape::string())
            .field("qrCode", Shape::string().url("Invalid url"));

        Shape::object()
            .field("id", Shape::number().integer())
            .field("title", Shape::string())
            .field("description", Shape::string())
            .field("category", Shape::string())
            .field("price", Shape::number())
            .field("discountPercentage", Shape::number())
            .field("rating", Shape::number())
            .field("stock", Shape::number().integer().min(0.0, "Stock cannot be negative"))
            .field("tags", Shape::array(Shape::string()))
            .optional("brand", Shape::string())
            .field("sku", Shape::string())
            .field("weight", Shape::number())
            .field(
                "dimensions",
                Shape::object()
                    .field("width", Shape::number())
                    .field("height", Shape::number())
                    .field("depth", Shape::number()),
            )
            .field("warrantyInformation", Shape::string())
            .field("shippingInformation", Shape::string())
            .field("availabilityStatus", Shape::string())
            .field("reviews", Shape::array(review))
            .field("returnPolicy", Shape::string())
            .field("minimumOrderQuantity", Shape::number().integer())
            .field("meta", meta)
            .field("images", Shape::array(Shape::string().url("Invalid url")))
            .field("thumbnail", Shape::string().url("Invalid url"))
    }

    /// Schema of `/products/{id}` responses.
    #[must_use]
    pub fn schema() -> JsonSchema<Self> {
        JsonSchema::new(Self::shape())
    }
}

impl From<&Product> for CartProduct {
    fn from(product: &Product) -> Self {
        let descriptor = Self::new(product.id, product.title.clone(), product.price, product.stock)
            .with_discount(product.discount_percentage)
            .with_thumbnail(product.thumbnail.clone());
        match &product.brand {
            Some(brand) => descriptor.with_brand(brand.clone()),
            None => descriptor,
        }
    }
}

/// One page of products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductsPage {
    /// Products on this page
    pub products: Vec<Product>,
    /// Total products
    pub total: u32,
    /// Offset of this page
    pub skip: u32,
    /// Page size
    pub limit: u32,
}

impl ProductsPage {
    /// Schema of `/products` responses.
    #[must_use]
    pub fn schema() -> JsonSchema<Self> {
        JsonSchema::new(
            Shape::object()
                .field("products", Shape::array(Product::shape()))
                .field("total", Shape::number().integer())
                .field("skip", Shape::number().integer())
                .field("limit", Shape::number().integer()),
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::{Value, json};
    use storefront_cart::ProductId;
    use storefront_remote::Schema;

    pub(crate) fn mascara_json() -> Value {
        json!({
            "id": 1,
            "title": "Essence Mascara Lash Princess",
            "description": "A popular mascara known for its volumizing and lengthening effects.",
            "category": "beauty",
            "price": 9.99,
            "discountPercentage": 7.17,
            "rating": 4.94,
            "stock": 5,
            "tags": ["beauty", "mascara"],
            "brand": "Essence",
            "sku": "RCH45Q1A",
            "weight": 2,
            "dimensions": {"width": 23.17, "height": 14.43, "depth": 28.01},
            "warrantyInformation": "1 month warranty",
            "shippingInformation": "Ships in 1 month",
            "availabilityStatus": "Low Stock",
            "reviews": [{
                "rating": 2,
                "comment": "Very unhappy with my purchase!",
                "date": "2024-05-23T08:56:21.618Z",
                "reviewerName": "John Doe",
                "reviewerEmail": "john.doe@x.dummyjson.com"
            }],
            "returnPolicy": "30 days return policy",
            "minimumOrderQuantity": 24,
            "meta": {
                "createdAt": "2024-05-23T08:56:21.618Z",
                "updatedAt": "2024-05-23T08:56:21.618Z",
                "barcode": "9164035109868",
                "qrCode": "https://assets.dummyjson.com/public/qr-code.png"
            },
            "images": ["https://cdn.dummyjson.com/products/images/beauty/Essence%20Mascara%20Lash%20Princess/1.png"],
            "thumbnail": "https://cdn.dummyjson.com/products/images/beauty/Essence%20Mascara%20Lash%20Princess/thumbnail.png"
        })
    }

    #[test]
    fn test_product_document() {
        let product = Product::schema().validate(&mascara_json()).unwrap();
        assert_eq!(product.brand.as_deref(), Some("Essence"));
        assert_eq!(product.reviews[0].date.to_rfc3339(), "2024-05-23T08:56:21.618+00:00");
    }

    #[test]
    fn test_brand_is_optional() {
        let mut doc = mascara_json();
        doc.as_object_mut().unwrap().remove("brand");
        let product = Product::schema().validate(&doc).unwrap();
        assert_eq!(product.brand, None);
    }

    #[test]
    fn test_bad_reviewer_email_and_qr_url() {
        let mut doc = mascara_json();
        doc["reviews"][0]["reviewerEmail"] = json!("not-an-email");
        doc["meta"]["qrCode"] = json!("qr-code.png");

        let violations = Product::schema().validate(&doc).unwrap_err();
        let paths: Vec<String> = violations.iter().map(|v| v.path.to_string()).collect();
        assert_eq!(paths, vec!["reviews[0].reviewerEmail", "meta.qrCode"]);
    }

    #[test]
    fn test_cart_descriptor_from_product() {
        let product = Product::schema().validate(&mascara_json()).unwrap();
        let descriptor = CartProduct::from(&product);
        assert_eq!(descriptor.id, ProductId::new(1));
        assert_eq!(descriptor.stock, 5);
        assert_eq!(descriptor.discount_percentage, Some(7.17));
        assert_eq!(descriptor.brand.as_deref(), Some("Essence"));
    }
}
