use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::results::InsertOneResult;

use crate::database::{MongoDB, PRODUCTS_COLLECTION, RECOMMEND_COLLECTION};
use crate::models::{Query, Recommendation};
use crate::services::query_service::parse_object_id;
use crate::utils::error::AppError;

/// Uniqueness key: one recommendation per person per query
pub fn duplicate_filter(query_id: &str, recommand_email: &str) -> Document {
    doc! { "queryId": query_id, "recommandEmail": recommand_email }
}

fn db_err(e: mongodb::error::Error) -> AppError {
    AppError::Database(e.to_string())
}

/// Server error code for a unique-index violation
const DUPLICATE_KEY_CODE: i32 = 11000;

fn error_code(e: &mongodb::error::Error) -> Option<i32> {
    use mongodb::error::{ErrorKind, WriteFailure};
    match *e.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref write_error)) => Some(write_error.code),
        ErrorKind::Command(ref command_error) => Some(command_error.code),
        _ => None,
    }
}

/// A concurrent duplicate create can slip past the pre-insert check and land
/// on the unique (queryId, recommandEmail) index instead; that is still a
/// Conflict, not a store failure.
fn classify_insert_error(code: Option<i32>, message: String) -> AppError {
    if code == Some(DUPLICATE_KEY_CODE) {
        AppError::Conflict("You have already recommended this query".to_string())
    } else {
        AppError::Database(message)
    }
}

fn insert_err(e: mongodb::error::Error) -> AppError {
    classify_insert_error(error_code(&e), e.to_string())
}

/// Inserts a recommendation and bumps the target query's counter. Both writes
/// run inside one client-session transaction so the counter cannot drift when
/// either write fails.
pub async fn create_recommendation(
    db: &MongoDB,
    recommendation: &Recommendation,
) -> Result<InsertOneResult, AppError> {
    let recommend = db.collection::<Recommendation>(RECOMMEND_COLLECTION);

    let existing = recommend
        .find_one(duplicate_filter(
            &recommendation.query_id,
            &recommendation.recommand_email,
        ))
        .await
        .map_err(db_err)?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "You have already recommended this query".to_string(),
        ));
    }

    let target = parse_object_id(&recommendation.query_id)?;
    let products = db.collection::<Query>(PRODUCTS_COLLECTION);

    let mut session = db.client().start_session().await.map_err(db_err)?;
    session.start_transaction().await.map_err(db_err)?;

    let inserted = match recommend
        .insert_one(recommendation)
        .session(&mut session)
        .await
    {
        Ok(result) => result,
        Err(e) => {
            session.abort_transaction().await.ok();
            return Err(insert_err(e));
        }
    };

    if let Err(e) = products
        .update_one(doc! { "_id": target }, doc! { "$inc": { "count": 1 } })
        .session(&mut session)
        .await
    {
        session.abort_transaction().await.ok();
        return Err(db_err(e));
    }

    session.commit_transaction().await.map_err(db_err)?;
    Ok(inserted)
}

/// All recommendations attached to one query
pub async fn recommendations_for_query(
    db: &MongoDB,
    query_id: &str,
) -> Result<Vec<Recommendation>, AppError> {
    db.collection::<Recommendation>(RECOMMEND_COLLECTION)
        .find(doc! { "queryId": query_id })
        .await
        .map_err(db_err)?
        .try_collect()
        .await
        .map_err(db_err)
}

/// Recommendations received on queries the given owner posted
pub async fn recommendations_received(
    db: &MongoDB,
    email: &str,
) -> Result<Vec<Recommendation>, AppError> {
    db.collection::<Recommendation>(RECOMMEND_COLLECTION)
        .find(doc! { "email": email })
        .await
        .map_err(db_err)?
        .try_collect()
        .await
        .map_err(db_err)
}

/// Recommendations the given person made on other people's queries
pub async fn recommendations_made(
    db: &MongoDB,
    email: &str,
) -> Result<Vec<Recommendation>, AppError> {
    db.collection::<Recommendation>(RECOMMEND_COLLECTION)
        .find(doc! { "recommandEmail": email })
        .await
        .map_err(db_err)?
        .try_collect()
        .await
        .map_err(db_err)
}

/// Deletes the requester's own recommendation and decrements the target
/// query's counter, transactionally. A missing recommendation and someone
/// else's recommendation are both Forbidden.
pub async fn delete_recommendation(
    db: &MongoDB,
    id: &str,
    requester: &str,
) -> Result<(), AppError> {
    let oid = parse_object_id(id)?;
    let recommend = db.collection::<Recommendation>(RECOMMEND_COLLECTION);

    let recommendation = recommend
        .find_one(doc! { "_id": oid })
        .await
        .map_err(db_err)?;

    let recommendation = match recommendation {
        Some(r) if r.recommand_email == requester => r,
        _ => return Err(AppError::Forbidden("Forbidden access".to_string())),
    };

    let target = parse_object_id(&recommendation.query_id)?;
    let products = db.collection::<Query>(PRODUCTS_COLLECTION);

    let mut session = db.client().start_session().await.map_err(db_err)?;
    session.start_transaction().await.map_err(db_err)?;

    if let Err(e) = recommend
        .delete_one(doc! { "_id": oid })
        .session(&mut session)
        .await
    {
        session.abort_transaction().await.ok();
        return Err(db_err(e));
    }

    if let Err(e) = products
        .update_one(doc! { "_id": target }, doc! { "$inc": { "count": -1 } })
        .session(&mut session)
        .await
    {
        session.abort_transaction().await.ok();
        return Err(db_err(e));
    }

    session.commit_transaction().await.map_err(db_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::query_service;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn test_duplicate_filter_uses_pair_key() {
        let filter = duplicate_filter("Q1", "r@x.com");
        assert_eq!(filter.get_str("queryId").unwrap(), "Q1");
        assert_eq!(filter.get_str("recommandEmail").unwrap(), "r@x.com");
        assert_eq!(filter.len(), 2);
    }

    #[test]
    fn test_unique_index_violation_reads_as_conflict() {
        let err = classify_insert_error(Some(DUPLICATE_KEY_CODE), "E11000 duplicate key".into());
        assert!(matches!(err, AppError::Conflict(_)));

        // Any other write failure stays a store error
        let err = classify_insert_error(Some(121), "Document failed validation".into());
        assert!(matches!(err, AppError::Database(_)));
        let err = classify_insert_error(None, "connection reset".into());
        assert!(matches!(err, AppError::Database(_)));
    }

    fn sample(query_id: &str, recommender: &str) -> Recommendation {
        Recommendation {
            id: None,
            query_id: query_id.to_string(),
            email: Some("owner@x.com".to_string()),
            recommand_email: recommender.to_string(),
            extra: Document::new(),
        }
    }

    #[tokio::test]
    #[ignore] // Requires a MongoDB replica set (transactions)
    async fn test_counter_follows_recommendation_lifecycle() {
        dotenv::dotenv().ok();
        let uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let db = MongoDB::new(&uri, "suggestify_test").await.unwrap();

        let query = Query {
            id: None,
            email: Some("owner@x.com".to_string()),
            product_name: Some("Laptop".to_string()),
            date: None,
            count: None,
            extra: Document::new(),
        };
        let inserted = query_service::create_query(&db, &query).await.unwrap();
        let query_id = inserted.inserted_id.as_object_id().unwrap().to_hex();

        let recommender = format!("{}@x.com", ObjectId::new().to_hex());

        create_recommendation(&db, &sample(&query_id, &recommender))
            .await
            .unwrap();
        let fetched = query_service::get_query(&db, &query_id).await.unwrap();
        assert_eq!(fetched.unwrap().count, Some(1));

        // Duplicate pair: rejected and the counter untouched
        let second = create_recommendation(&db, &sample(&query_id, &recommender)).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
        let fetched = query_service::get_query(&db, &query_id).await.unwrap();
        assert_eq!(fetched.unwrap().count, Some(1));

        let made = recommendations_made(&db, &recommender).await.unwrap();
        let rec_id = made[0].id.unwrap().to_hex();

        // Only the recommender may delete
        let other = delete_recommendation(&db, &rec_id, "someone-else@x.com").await;
        assert!(matches!(other, Err(AppError::Forbidden(_))));

        delete_recommendation(&db, &rec_id, &recommender)
            .await
            .unwrap();
        let fetched = query_service::get_query(&db, &query_id).await.unwrap();
        assert_eq!(fetched.unwrap().count, Some(0));
    }
}
