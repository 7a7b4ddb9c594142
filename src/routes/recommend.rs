use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{ErrorResponse, HealthResponse, RankingStrategy, RecommendRequest, RecommendResponse};
use crate::services::CorpusSource;
use crate::core::Recommender;
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn CorpusSource>,
    pub recommender: Recommender,
    pub request_timeout: Duration,
}

/// Configure all recommendation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/recommend", web::get().to(recommend));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Similar listings endpoint
///
/// GET /api/v1/recommend?pg={name or id}&limit=6&strategy=tag_overlap
///
/// An unknown or missing listing yields an empty list, not an error.
async fn recommend(
    state: web::Data<AppState>,
    query: web::Query<RecommendRequest>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        tracing::info!("Validation failed for recommend request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let max_limit = state.recommender.config().max_top_n;
    if let Some(limit) = query.limit.filter(|&limit| limit > max_limit) {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: format!("limit {} exceeds the maximum of {}", limit, max_limit),
            status_code: 400,
        });
    }

    let strategy = match query.strategy.as_deref().map(str::parse::<RankingStrategy>) {
        None => None,
        Some(Ok(strategy)) => Some(strategy),
        Some(Err(e)) => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid strategy".to_string(),
                message: format!("{} (expected similarity or tag_overlap)", e),
                status_code: 400,
            });
        }
    };

    let options = state.recommender.options(strategy, query.limit);

    let key = match query.pg.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => key,
        _ => return HttpResponse::Ok().json(RecommendResponse::empty(options.strategy)),
    };

    tracing::info!(
        "Recommending for '{}' (strategy: {:?}, limit: {})",
        key,
        options.strategy,
        options.top_n
    );

    let result = match tokio::time::timeout(
        state.request_timeout,
        state.recommender.recommend_from(state.source.as_ref(), key, &options),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                "Recommendation for '{}' exceeded {:?}, returning no results",
                key,
                state.request_timeout
            );
            return HttpResponse::Ok().json(RecommendResponse::empty(options.strategy));
        }
    };

    tracing::info!(
        "Returning {} recommendations for '{}' (from {} candidates)",
        result.recommendations.len(),
        key,
        result.total_candidates
    );

    HttpResponse::Ok().json(RecommendResponse {
        recommendations: result.recommendations,
        strategy: options.strategy,
        total_candidates: result.total_candidates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RecommenderConfig;
    use crate::models::Listing;
    use crate::services::StaticSource;
    use actix_web::{test, App};

    const REVIEW_WORDS: &[&str] = &[
        "clean", "spacious", "noisy", "friendly", "owner", "mess", "food", "tasty", "curfew",
        "strict", "laundry", "metro", "walking", "distance", "water", "supply", "power", "backup",
    ];

    fn create_large_state(request_timeout: Duration) -> AppState {
        let listings = (0..3000)
            .map(|i| {
                let review: Vec<&str> = (0..200)
                    .map(|w| REVIEW_WORDS[(i * 7 + w * 13) % REVIEW_WORDS.len()])
                    .collect();
                Listing::new(i.to_string(), format!("PG {}", i))
                    .with_group("1")
                    .with_rating(4.0)
                    .with_tags(&["wifi"])
                    .with_review_text(review.join(" "))
            })
            .collect();

        AppState {
            source: Arc::new(StaticSource::from_listings(listings)),
            recommender: Recommender::default(),
            request_timeout,
        }
    }

    fn create_state() -> AppState {
        let source = StaticSource::from_listings(vec![
            Listing::new("1", "A").with_group("1").with_rating(4.0).with_tags(&["quiet", "wifi"]),
            Listing::new("2", "B").with_group("1").with_rating(4.2).with_tags(&["wifi"]),
        ]);

        AppState {
            source: Arc::new(source),
            recommender: Recommender::default(),
            request_timeout: Duration::from_secs(5),
        }
    }

    #[actix_web::test]
    async fn test_recommend_endpoint() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(create_state()))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/recommend?pg=A&limit=3")
            .to_request();
        let resp: RecommendResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp.recommendations.len(), 1);
        assert_eq!(resp.recommendations[0].name, "B");
        assert_eq!(resp.strategy, RankingStrategy::TagOverlap);
    }

    #[actix_web::test]
    async fn test_bad_strategy_is_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(create_state()))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/recommend?pg=A&strategy=popularity")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_missing_listing_is_empty() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(create_state()))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/recommend").to_request();
        let resp: RecommendResponse = test::call_and_read_body_json(&app, req).await;

        assert!(resp.recommendations.is_empty());
        assert_eq!(resp.total_candidates, 0);
    }

    #[actix_web::test]
    async fn test_deadline_covers_similarity_fit() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(create_large_state(Duration::ZERO)))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/recommend?pg=PG%200&strategy=similarity")
            .to_request();
        let resp: RecommendResponse = test::call_and_read_body_json(&app, req).await;

        assert!(resp.recommendations.is_empty());
        assert_eq!(resp.strategy, RankingStrategy::Similarity);
    }

    #[actix_web::test]
    async fn test_similarity_fit_within_deadline() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(create_large_state(Duration::from_secs(60))))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/recommend?pg=PG%200&strategy=similarity")
            .to_request();
        let resp: RecommendResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp.recommendations.len(), 3);
    }

    #[actix_web::test]
    async fn test_limit_follows_configured_maximum() {
        let mut state = create_state();
        state.recommender = Recommender::new(RecommenderConfig {
            max_top_n: 80,
            ..RecommenderConfig::default()
        });
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/recommend?pg=A&limit=60")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/v1/recommend?pg=A&limit=81")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }
}
