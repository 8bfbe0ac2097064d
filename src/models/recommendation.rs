use mongodb::bson::{oid::ObjectId, Document};
use serde::{Deserialize, Serialize};

/// Recommendation (coleção `recommand`): one user's suggestion attached to a
/// query. At most one per (queryId, recommandEmail) pair.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Recommendation {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub id: Option<ObjectId>,

    /// Target query id, stored as a plain string (not an enforced relation)
    #[serde(rename = "queryId")]
    pub query_id: String,

    /// The query owner's email, duplicated here at creation time for display
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Who made the recommendation; ownership and uniqueness key
    #[serde(rename = "recommandEmail")]
    pub recommand_email: String,

    /// Any other submitted fields, kept as-is
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Document,
}
