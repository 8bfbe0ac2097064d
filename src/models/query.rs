use mongodb::bson::{oid::ObjectId, Bson, Document};
use serde::{Deserialize, Serialize};

/// Product query (armazenada no MongoDB, coleção `products`)
///
/// Clients submit free-form documents. Only the fields the service itself
/// reads are typed here; everything else rides along verbatim in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Owner email, set by the submitter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Searched via case-insensitive substring match
    #[serde(rename = "productName", skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,

    /// Client-supplied timestamp, sort key for the owner listing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<Bson>,

    /// Denormalized recommendation counter, maintained via $inc
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,

    /// Any other submitted fields, kept as-is
    #[serde(flatten)]
    pub extra: Document,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arbitrary_fields_round_trip() {
        let body = serde_json::json!({
            "email": "a@x.com",
            "productName": "Laptop",
            "date": "2025-01-15",
            "brand": "Acme",
            "reason": "battery died"
        });

        let query: Query = serde_json::from_value(body).unwrap();
        assert_eq!(query.email.as_deref(), Some("a@x.com"));
        assert_eq!(query.product_name.as_deref(), Some("Laptop"));
        assert_eq!(query.extra.get_str("brand").unwrap(), "Acme");
        assert_eq!(query.extra.get_str("reason").unwrap(), "battery died");

        let back = serde_json::to_value(&query).unwrap();
        assert_eq!(back["productName"], "Laptop");
        assert_eq!(back["brand"], "Acme");
        // Unset id and count must not appear in the stored document
        assert!(back.get("_id").is_none());
        assert!(back.get("count").is_none());
    }

    #[test]
    fn test_count_deserializes_from_int32() {
        // $inc with a literal 1 stores an Int32; the model widens it
        let doc = mongodb::bson::doc! { "productName": "Phone", "count": 3_i32 };
        let query: Query = mongodb::bson::from_document(doc).unwrap();
        assert_eq!(query.count, Some(3));
    }
}
