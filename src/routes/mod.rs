use axum::{
    middleware,
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::handlers::{auth, centers, pickups};
use crate::middleware::auth::{auth_middleware, require_admin};
use crate::middleware::user_rate_limit::create_pickup_governor;
use crate::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "ok": true, "msg": "Smart E-waste Backend" }))
}

pub fn create_router(state: AppState) -> Router {
    // Public routes
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let center_routes = Router::new()
        .route("/", get(centers::list_centers))
        .route("/nearest/distance", get(centers::nearest_centers))
        .merge(
            Router::new()
                .route("/", post(centers::create_center))
                .layer(middleware::from_fn(require_admin))
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        );

    // Any logged-in user may submit; submissions are rate limited per user
    let submit_routes = Router::new()
        .route("/", post(pickups::create_pickup))
        .layer(create_pickup_governor())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Pickup review and dispatch (requires auth + admin role)
    let review_routes = Router::new()
        .route("/", get(pickups::list_pickups))
        .route("/{id}", patch(pickups::update_pickup))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/", get(health))
        .nest("/api/auth", auth_routes)
        .nest("/api/centers", center_routes)
        .nest("/api/pickups", submit_routes.merge(review_routes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use sea_orm::DatabaseConnection;
    use tower::ServiceExt;

    use super::*;
    use crate::entities::user::UserRole;
    use crate::utils::jwt::create_token;
    use crate::utils::jwt::tests::{test_config, test_user};

    // No database: every request here must be answered before a query runs
    fn app() -> Router {
        create_router(AppState {
            db: DatabaseConnection::Disconnected,
            config: test_config(),
        })
    }

    fn bearer(role: UserRole) -> String {
        let token = create_token(&test_user(role), &test_config()).unwrap();
        format!("Bearer {}", token)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["ok"], true);
    }

    #[tokio::test]
    async fn test_list_pickups_requires_token() {
        let response = app()
            .oneshot(Request::get("/api/pickups").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "No token");
    }

    #[tokio::test]
    async fn test_list_pickups_rejects_bad_token() {
        let response = app()
            .oneshot(
                Request::get("/api/pickups")
                    .header(header::AUTHORIZATION, "Bearer forged")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_list_pickups_requires_admin() {
        let response = app()
            .oneshot(
                Request::get("/api/pickups")
                    .header(header::AUTHORIZATION, bearer(UserRole::User))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_update_pickup_rejects_unknown_status() {
        let response = app()
            .oneshot(
                Request::patch(format!("/api/pickups/{}", uuid::Uuid::new_v4()))
                    .header(header::AUTHORIZATION, bearer(UserRole::Admin))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"status":"shipped"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Invalid status value");
    }

    #[tokio::test]
    async fn test_create_center_requires_admin() {
        let response = app()
            .oneshot(
                Request::post("/api/centers")
                    .header(header::AUTHORIZATION, bearer(UserRole::User))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"name":"Depot"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_pickup_requires_token() {
        let response = app()
            .oneshot(
                Request::post("/api/pickups")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"items":["Laptop"]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_nearest_requires_coordinates() {
        let response = app()
            .oneshot(
                Request::get("/api/centers/nearest/distance?latitude=40.7")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"],
            "Latitude and longitude required"
        );
    }

    #[tokio::test]
    async fn test_nearest_rejects_out_of_range() {
        let response = app()
            .oneshot(
                Request::get("/api/centers/nearest/distance?latitude=120&longitude=10")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_requires_fields() {
        let response = app()
            .oneshot(
                Request::post("/api/auth/register")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"email":"a@b.c","password":""}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Missing fields");
    }

    #[tokio::test]
    async fn test_login_with_missing_fields_is_unauthorized() {
        for body in ["{}", r#"{"email":"admin@admin.com"}"#, r#"{"password":"admin123"}"#] {
            let response = app()
                .oneshot(
                    Request::post("/api/auth/login")
                        .header(header::CONTENT_TYPE, "application/json")
                        .body(Body::from(body))
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{body}");
            assert_eq!(body_json(response).await["error"], "Invalid credentials");
        }
    }
}
