use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::results::{DeleteResult, InsertOneResult, UpdateResult};

use crate::database::{MongoDB, PRODUCTS_COLLECTION};
use crate::models::Query;
use crate::utils::error::AppError;

/// Home listing cap
const HOME_LIMIT: i64 = 6;

pub fn parse_object_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::InvalidRequest(format!("Invalid id: {}", id)))
}

/// Case-insensitive substring filter on productName
pub fn search_filter(search: &str) -> Document {
    doc! { "productName": { "$regex": search, "$options": "i" } }
}

/// Owner listing order: newest first
pub fn owner_listing_sort() -> Document {
    doc! { "date": -1 }
}

fn db_err(e: mongodb::error::Error) -> AppError {
    AppError::Database(e.to_string())
}

pub async fn create_query(db: &MongoDB, query: &Query) -> Result<InsertOneResult, AppError> {
    db.collection::<Query>(PRODUCTS_COLLECTION)
        .insert_one(query)
        .await
        .map_err(db_err)
}

pub async fn search_queries(db: &MongoDB, search: &str) -> Result<Vec<Query>, AppError> {
    db.collection::<Query>(PRODUCTS_COLLECTION)
        .find(search_filter(search))
        .await
        .map_err(db_err)?
        .try_collect()
        .await
        .map_err(db_err)
}

pub async fn home_queries(db: &MongoDB) -> Result<Vec<Query>, AppError> {
    db.collection::<Query>(PRODUCTS_COLLECTION)
        .find(doc! {})
        .limit(HOME_LIMIT)
        .await
        .map_err(db_err)?
        .try_collect()
        .await
        .map_err(db_err)
}

/// Owner listing, newest first
pub async fn queries_by_owner(db: &MongoDB, email: &str) -> Result<Vec<Query>, AppError> {
    db.collection::<Query>(PRODUCTS_COLLECTION)
        .find(doc! { "email": email })
        .sort(owner_listing_sort())
        .await
        .map_err(db_err)?
        .try_collect()
        .await
        .map_err(db_err)
}

pub async fn get_query(db: &MongoDB, id: &str) -> Result<Option<Query>, AppError> {
    let oid = parse_object_id(id)?;
    db.collection::<Query>(PRODUCTS_COLLECTION)
        .find_one(doc! { "_id": oid })
        .await
        .map_err(db_err)
}

/// Deletes a query. Only the owner may delete it; a missing query is reported
/// the same way as someone else's, so ids cannot be probed.
pub async fn delete_query(db: &MongoDB, id: &str, requester: &str) -> Result<DeleteResult, AppError> {
    let oid = parse_object_id(id)?;
    let collection = db.collection::<Query>(PRODUCTS_COLLECTION);

    let query = collection
        .find_one(doc! { "_id": oid })
        .await
        .map_err(db_err)?;

    match query {
        Some(q) if q.email.as_deref() == Some(requester) => collection
            .delete_one(doc! { "_id": oid })
            .await
            .map_err(db_err),
        _ => Err(AppError::Forbidden("Forbidden access".to_string())),
    }
}

/// Replace-or-insert: $set the submitted fields on the matching document, or
/// create a new one under the given id when no match exists.
pub async fn upsert_query(
    db: &MongoDB,
    id: &str,
    update: Document,
) -> Result<UpdateResult, AppError> {
    let oid = parse_object_id(id)?;
    db.collection::<Query>(PRODUCTS_COLLECTION)
        .update_one(doc! { "_id": oid }, doc! { "$set": update })
        .upsert(true)
        .await
        .map_err(db_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_filter_is_case_insensitive_regex() {
        let filter = search_filter("lap");
        let inner = filter.get_document("productName").unwrap();
        assert_eq!(inner.get_str("$regex").unwrap(), "lap");
        assert_eq!(inner.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn test_empty_search_matches_everything() {
        // An empty substring is contained in every productName
        let filter = search_filter("");
        let inner = filter.get_document("productName").unwrap();
        assert_eq!(inner.get_str("$regex").unwrap(), "");
    }

    #[test]
    fn test_owner_listing_sorts_by_date_descending() {
        let sort = owner_listing_sort();
        assert_eq!(sort.get_i32("date").unwrap(), -1);
        assert_eq!(sort.len(), 1);
    }

    #[test]
    fn test_home_listing_caps_at_six() {
        assert_eq!(HOME_LIMIT, 6);
    }

    #[test]
    fn test_parse_object_id_rejects_garbage() {
        assert!(matches!(
            parse_object_id("not-an-oid"),
            Err(AppError::InvalidRequest(_))
        ));

        let valid = ObjectId::new().to_hex();
        assert!(parse_object_id(&valid).is_ok());
    }
}
