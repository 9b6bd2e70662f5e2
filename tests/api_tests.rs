// HTTP tests for the match routes, backed by the in-memory store

use actix_web::{http::StatusCode, test, web, App};
use cats_social::core::{MatchEngine, MessageBounds};
use cats_social::models::{Cat, CatSex, MatchResponse, UserSnapshot};
use cats_social::routes::{self, auth::{Claims, JwtVerifier}, matches::AppState};
use cats_social::services::InMemoryStore;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use std::sync::Arc;

const SECRET: &str = "test-secret";

fn token(user_id: i64) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

fn bearer(user_id: i64) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token(user_id)))
}

fn create_test_cat(id: &str, user_id: i64, sex: CatSex) -> Cat {
    Cat {
        id: id.to_string(),
        user_id,
        name: format!("Cat {}", id),
        race: "Bengal".to_string(),
        sex,
        age_in_month: 18,
        description: "curious".to_string(),
        image_urls: vec![],
        has_matched: false,
        created_at: Utc::now(),
    }
}

async fn state() -> (AppState, InMemoryStore) {
    let store = InMemoryStore::new();
    for id in 1..=3 {
        store
            .insert_user(UserSnapshot {
                id,
                name: format!("User {}", id),
                email: format!("user{}@example.com", id),
                created_at: Utc::now(),
            })
            .await;
    }
    store.insert_cat(create_test_cat("A", 1, CatSex::Male)).await;
    store.insert_cat(create_test_cat("B", 2, CatSex::Female)).await;
    store.insert_cat(create_test_cat("C", 3, CatSex::Male)).await;

    let engine = MatchEngine::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        MessageBounds::default(),
    );

    (
        AppState {
            engine,
            verifier: JwtVerifier::new(SECRET),
        },
        store,
    )
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(routes::configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health() {
    let (state, _) = state().await;
    let app = app!(state);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_requires_token() {
    let (state, _) = state().await;
    let app = app!(state);

    let req = test::TestRequest::get().uri("/v1/cat/match").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/v1/cat/match")
        .insert_header(("Authorization", "Bearer not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_full_flow() {
    let (state, store) = state().await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/v1/cat/match")
        .insert_header(bearer(1))
        .set_json(json!({"matchCatId": "B", "userCatId": "A", "message": "hi there B"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri("/v1/cat/match")
        .insert_header(bearer(2))
        .to_request();
    let matches: Vec<MatchResponse> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].user_cat_detail.id, "B");
    let match_id = matches[0].id.clone();

    let req = test::TestRequest::post()
        .uri("/v1/cat/match/approve")
        .insert_header(bearer(2))
        .set_json(json!({ "matchId": match_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(store.cat("A").await.unwrap().has_matched);

    // Decided matches can no longer be withdrawn
    let req = test::TestRequest::delete()
        .uri(&format!("/v1/cat/match/{}", match_id))
        .insert_header(bearer(1))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_error_statuses() {
    let (state, _) = state().await;
    let app = app!(state);

    // Same sex
    let req = test::TestRequest::post()
        .uri("/v1/cat/match")
        .insert_header(bearer(1))
        .set_json(json!({"matchCatId": "C", "userCatId": "A", "message": "hi there C"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    // Unknown cat
    let req = test::TestRequest::post()
        .uri("/v1/cat/match")
        .insert_header(bearer(1))
        .set_json(json!({"matchCatId": "Z", "userCatId": "A", "message": "hi there Z"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    // Missing ids
    let req = test::TestRequest::post()
        .uri("/v1/cat/match")
        .insert_header(bearer(1))
        .set_json(json!({"matchCatId": "", "userCatId": "A", "message": "hi there"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    // Malformed JSON
    let req = test::TestRequest::post()
        .uri("/v1/cat/match/reject")
        .insert_header(bearer(2))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    // Unknown match
    let req = test::TestRequest::post()
        .uri("/v1/cat/match/reject")
        .insert_header(bearer(2))
        .set_json(json!({"matchId": "missing"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_issuer_withdraws_pending_match() {
    let (state, _) = state().await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/v1/cat/match")
        .insert_header(bearer(1))
        .set_json(json!({"matchCatId": "B", "userCatId": "A", "message": "hi there B"}))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get()
        .uri("/v1/cat/match")
        .insert_header(bearer(1))
        .to_request();
    let matches: Vec<MatchResponse> = test::call_and_read_body_json(&app, req).await;
    let match_id = matches[0].id.clone();

    // Target cannot delete it
    let req = test::TestRequest::delete()
        .uri(&format!("/v1/cat/match/{}", match_id))
        .insert_header(bearer(2))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri(&format!("/v1/cat/match/{}", match_id))
        .insert_header(bearer(1))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}
