// HTTP integration tests: pages, JSON API, sitemap and health check
//
// Run with: cargo test --test api_integration_tests
// Every request goes through the full router backed by the sample store.

#[cfg(feature = "api")]
mod api_tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use hvac_directory::{create_router, AppConfig, AppState, Directory, SampleStore};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt; // for oneshot

    // Helper: Create test app over the sample listings
    fn create_test_app() -> axum::Router {
        let directory = Directory::new(Arc::new(SampleStore::new()));
        let state = AppState::with_directory(directory, AppConfig::default());
        create_router(state)
    }

    async fn get(uri: &str) -> axum::response::Response {
        create_test_app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    // Helper: Parse JSON response
    async fn json_response(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        serde_json::from_slice(&body).expect("Failed to parse JSON")
    }

    async fn text_response(response: axum::response::Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        String::from_utf8(body.to_vec()).expect("Body is not UTF-8")
    }

    // =========================================================================
    // Section 1: Health Check and Sitemap
    // =========================================================================

    #[tokio::test]
    async fn test_health_check() {
        let response = get("/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_sitemap() {
        let response = get("/sitemap.xml").await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("application/xml"));

        let xml = text_response(response).await;
        // home + 51 registry states + 3 cities + 5 listings
        assert_eq!(xml.matches("<url>").count(), 60);
        assert!(xml.contains("<loc>https://hvaclocate.com/wyoming</loc>"));
        assert!(xml.contains("<loc>https://hvaclocate.com/illinois/chicago</loc>"));
        assert!(xml
            .contains("<loc>https://hvaclocate.com/texas/houston/bayou-breeze-cooling</loc>"));
    }

    // =========================================================================
    // Section 2: HTML Pages
    // =========================================================================

    #[tokio::test]
    async fn test_home_page() {
        let response = get("/").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = text_response(response).await;
        assert!(html.contains("5 contractors and counting"));
        assert!(html.contains("href=\"/texas\""));
        // Registry states without listings are still linked
        assert!(html.contains("href=\"/wyoming\""));
    }

    #[tokio::test]
    async fn test_state_page_lists_cities() {
        let response = get("/california").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = text_response(response).await;
        assert!(html.contains("HVAC Contractors in California"));
        assert!(html.contains("href=\"/california/los-angeles\""));
    }

    #[tokio::test]
    async fn test_state_page_without_listings() {
        let response = get("/wyoming").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = text_response(response).await;
        assert!(html.contains("still adding HVAC contractors in Wyoming"));
    }

    #[tokio::test]
    async fn test_unknown_state_is_404() {
        let response = get("/atlantis").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let html = text_response(response).await;
        assert!(html.contains("Page Not Found"));
    }

    #[tokio::test]
    async fn test_city_page_orders_by_rating() {
        let response = get("/texas/houston").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = text_response(response).await;
        assert!(html.contains("HVAC Contractors in Houston, TX"));
        let lone_star = html.find("Lone Star HVAC Pros").unwrap();
        let bayou = html.find("Bayou Breeze Cooling").unwrap();
        assert!(lone_star < bayou);
    }

    #[tokio::test]
    async fn test_empty_city_is_named_from_slug() {
        let response = get("/texas/el-paso").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = text_response(response).await;
        assert!(html.contains("HVAC Contractors in El Paso, TX"));
        assert!(html.contains("No contractors listed here yet."));
    }

    #[tokio::test]
    async fn test_listing_page_embeds_json_ld() {
        let response = get("/texas/houston/lone-star-hvac-pros").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = text_response(response).await;
        assert!(html.contains("<script type=\"application/ld+json\">"));
        assert!(html.contains("\"@type\":\"HVACBusiness\""));
        assert!(html.contains("\"reviewCount\":312"));
        assert!(html.contains("24/7 Available"));
        assert!(html.contains(">Houston</a>"));
    }

    #[tokio::test]
    async fn test_missing_listing_is_404() {
        let response = get("/texas/houston/no-such-company").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Listing exists, but under a different state
        let response = get("/illinois/houston/lone-star-hvac-pros").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_search_page() {
        let response = get("/search?q=houston").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = text_response(response).await;
        assert!(html.contains("2 results found"));
        assert!(html.contains("Lone Star HVAC Pros"));
        assert!(!html.contains("Windy City Climate Control"));
    }

    #[tokio::test]
    async fn test_blank_search_page_shows_form() {
        let response = get("/search?q=%20%20").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = text_response(response).await;
        assert!(html.contains("Search HVAC Contractors"));
        assert!(!html.contains("results found"));
    }

    #[tokio::test]
    async fn test_unmatched_route_is_404() {
        let response = get("/texas/houston/lone-star-hvac-pros/reviews").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    // =========================================================================
    // Section 3: JSON API
    // =========================================================================

    #[tokio::test]
    async fn test_api_states() {
        let response = get("/api/states").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["rows"], 3);
        let names: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["California", "Illinois", "Texas"]);
        assert_eq!(body["data"][2]["business_count"], 2);
    }

    #[tokio::test]
    async fn test_api_cities() {
        let response = get("/api/states/texas/cities").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["rows"], 1);
        assert_eq!(body["data"][0]["slug"], "houston");
        assert_eq!(body["data"][0]["state_abbr"], "TX");

        let response = get("/api/states/atlantis/cities").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_response(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_api_city_businesses() {
        let response = get("/api/states/california/cities/los-angeles/businesses").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["rows"], 2);
        assert_eq!(body["data"][0]["slug"], "arctic-air-heating-cooling");
        assert_eq!(body["data"][1]["slug"], "socal-comfort-systems");
    }

    #[tokio::test]
    async fn test_api_business() {
        let response = get("/api/businesses/texas/houston/bayou-breeze-cooling").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["business"]["name"], "Bayou Breeze Cooling");
        assert!(body["business"]["website"].is_null());
        assert!(body["json_ld"].get("url").is_none());

        let response = get("/api/businesses/texas/houston/nobody").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_api_search() {
        let response = get("/api/search?q=BOILER").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["rows"], 1);
        assert_eq!(body["data"][0]["slug"], "windy-city-climate-control");
    }

    #[tokio::test]
    async fn test_api_blank_search_is_400() {
        for uri in ["/api/search", "/api/search?q=", "/api/search?q=%20"] {
            let response = get(uri).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_api_stats() {
        let response = get("/api/stats").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["store"], "sample");
        assert_eq!(body["total_businesses"], 5);
        assert_eq!(body["states_with_listings"], 3);
        assert_eq!(body["registry_states"], 51);
    }
}
