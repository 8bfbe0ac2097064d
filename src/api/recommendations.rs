use actix_web::{web, HttpResponse, ResponseError};

use crate::database::MongoDB;
use crate::models::Recommendation;
use crate::services::auth_service::{self, Claims};
use crate::services::recommendation_service;

/// POST /add-recommand - public create; 409 when the (queryId, recommandEmail)
/// pair already exists
#[utoipa::path(
    post,
    path = "/add-recommand",
    tag = "Recommendations",
    responses(
        (status = 200, description = "Recommendation stored, query counter incremented"),
        (status = 409, description = "This person already recommended this query")
    )
)]
pub async fn add_recommendation(
    db: web::Data<MongoDB>,
    body: web::Json<Recommendation>,
) -> HttpResponse {
    log::info!(
        "💡 POST /add-recommand - query: {}, by: {}",
        body.query_id,
        body.recommand_email
    );

    match recommendation_service::create_recommendation(&db, &body).await {
        Ok(result) => HttpResponse::Ok().json(serde_json::json!({
            "acknowledged": true,
            "insertedId": result.inserted_id.as_object_id().map(|id| id.to_hex()),
        })),
        Err(e) => {
            log::warn!("❌ Add recommendation failed: {}", e);
            e.error_response()
        }
    }
}

/// GET /recommendations/{queryId} - public listing for one query
pub async fn recommendations_for_query(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> HttpResponse {
    match recommendation_service::recommendations_for_query(&db, &path).await {
        Ok(recommendations) => HttpResponse::Ok().json(recommendations),
        Err(e) => {
            log::error!("❌ Listing recommendations failed: {}", e);
            e.error_response()
        }
    }
}

/// GET /recommand/{email} - recommendations received on the caller's queries
pub async fn recommendations_received(
    user: Claims,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> HttpResponse {
    let email = path.into_inner();
    if let Err(e) = auth_service::ensure_owner(&user, &email) {
        log::warn!("🚫 {} tried to read recommendations of {}", user.email, email);
        return e.error_response();
    }

    match recommendation_service::recommendations_received(&db, &email).await {
        Ok(recommendations) => HttpResponse::Ok().json(recommendations),
        Err(e) => {
            log::error!("❌ Listing received recommendations failed: {}", e);
            e.error_response()
        }
    }
}

/// GET /recommand-request/{email} - recommendations the caller made
pub async fn recommendations_made(
    user: Claims,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> HttpResponse {
    let email = path.into_inner();
    if let Err(e) = auth_service::ensure_owner(&user, &email) {
        log::warn!(
            "🚫 {} tried to read recommendation requests of {}",
            user.email,
            email
        );
        return e.error_response();
    }

    match recommendation_service::recommendations_made(&db, &email).await {
        Ok(recommendations) => HttpResponse::Ok().json(recommendations),
        Err(e) => {
            log::error!("❌ Listing made recommendations failed: {}", e);
            e.error_response()
        }
    }
}

/// DELETE /delete-recommand/{id} - recommender-only delete; also decrements
/// the target query's counter
pub async fn delete_recommendation(
    user: Claims,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> HttpResponse {
    log::info!("🗑️ DELETE /delete-recommand/{} - by {}", path, user.email);

    match recommendation_service::delete_recommendation(&db, &path, &user.email).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Recommendation deleted successfully",
        })),
        Err(e) => {
            log::warn!("❌ Delete recommendation failed: {}", e);
            e.error_response()
        }
    }
}
