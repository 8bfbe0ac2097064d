use actix_web::{web, HttpResponse, ResponseError};
use mongodb::bson::Document;
use serde::Deserialize;

use crate::database::MongoDB;
use crate::models::Query;
use crate::services::auth_service::{self, Claims};
use crate::services::query_service;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub search: String,
}

/// POST /add-query - insert the submitted query as-is (session required)
pub async fn add_query(
    user: Claims,
    db: web::Data<MongoDB>,
    body: web::Json<Query>,
) -> HttpResponse {
    log::info!("📝 POST /add-query - owner: {}", user.email);

    match query_service::create_query(&db, &body).await {
        Ok(result) => HttpResponse::Ok().json(serde_json::json!({
            "acknowledged": true,
            "insertedId": result.inserted_id.as_object_id().map(|id| id.to_hex()),
        })),
        Err(e) => {
            log::error!("❌ Failed to insert query: {}", e);
            e.error_response()
        }
    }
}

/// GET /queries?search= - public substring search on productName
#[utoipa::path(
    get,
    path = "/queries",
    tag = "Queries",
    params(
        ("search" = Option<String>, Query, description = "Substring matched case-insensitively against productName")
    ),
    responses(
        (status = 200, description = "All matching queries")
    )
)]
pub async fn search_queries(db: web::Data<MongoDB>, params: web::Query<SearchParams>) -> HttpResponse {
    match query_service::search_queries(&db, &params.search).await {
        Ok(queries) => HttpResponse::Ok().json(queries),
        Err(e) => {
            log::error!("❌ Search failed: {}", e);
            e.error_response()
        }
    }
}

/// GET /queries-home - public listing capped at 6 items
#[utoipa::path(
    get,
    path = "/queries-home",
    tag = "Queries",
    responses(
        (status = 200, description = "At most 6 queries")
    )
)]
pub async fn home_queries(db: web::Data<MongoDB>) -> HttpResponse {
    match query_service::home_queries(&db).await {
        Ok(queries) => HttpResponse::Ok().json(queries),
        Err(e) => {
            log::error!("❌ Home listing failed: {}", e);
            e.error_response()
        }
    }
}

/// GET /queries/{email} - caller's own queries, newest first
pub async fn queries_by_owner(
    user: Claims,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> HttpResponse {
    let email = path.into_inner();
    if let Err(e) = auth_service::ensure_owner(&user, &email) {
        log::warn!("🚫 {} tried to list queries of {}", user.email, email);
        return e.error_response();
    }

    match query_service::queries_by_owner(&db, &email).await {
        Ok(queries) => HttpResponse::Ok().json(queries),
        Err(e) => {
            log::error!("❌ Owner listing failed: {}", e);
            e.error_response()
        }
    }
}

/// GET /query/{id} - public fetch of one query; null when absent
pub async fn get_query(db: web::Data<MongoDB>, path: web::Path<String>) -> HttpResponse {
    match query_service::get_query(&db, &path).await {
        Ok(found) => HttpResponse::Ok().json(found),
        Err(e) => e.error_response(),
    }
}

/// DELETE /query/{id} - owner-only delete
pub async fn delete_query(
    user: Claims,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> HttpResponse {
    log::info!("🗑️ DELETE /query/{} - by {}", path, user.email);

    match query_service::delete_query(&db, &path, &user.email).await {
        Ok(result) => HttpResponse::Ok().json(serde_json::json!({
            "acknowledged": true,
            "deletedCount": result.deleted_count,
        })),
        Err(e) => {
            log::warn!("❌ Delete query failed: {}", e);
            e.error_response()
        }
    }
}

/// PUT /update-query/{id} - upsert the submitted fields (session required)
pub async fn update_query(
    user: Claims,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
    body: web::Json<Document>,
) -> HttpResponse {
    log::info!("✏️ PUT /update-query/{} - by {}", path, user.email);

    match query_service::upsert_query(&db, &path, body.into_inner()).await {
        Ok(result) => HttpResponse::Ok().json(serde_json::json!({
            "acknowledged": true,
            "matchedCount": result.matched_count,
            "modifiedCount": result.modified_count,
            "upsertedId": result.upserted_id.and_then(|id| id.as_object_id().map(|o| o.to_hex())),
        })),
        Err(e) => {
            log::warn!("❌ Update query failed: {}", e);
            e.error_response()
        }
    }
}
