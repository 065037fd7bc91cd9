use std::path::PathBuf;
use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::get,
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use crate::error::{AppError, Result};

pub mod error;
pub mod routes;

use routes::*;

fn cors_layer(allowed_origin: Option<&str>) -> Result<CorsLayer> {
    let origin = match allowed_origin {
        Some(origin) => AllowOrigin::exact(
            HeaderValue::from_str(origin)
                .map_err(|e| AppError::Settings(format!("Invalid allowed_origin '{origin}': {e}")))?,
        ),
        None => AllowOrigin::any(),
    };
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60)))
}

pub fn router(db_path: PathBuf, allowed_origin: Option<&str>) -> Result<Router> {
    let state = ApiState::new(db_path);
    Ok(Router::new()
        .route("/health", get(health_handler))
        .route("/api/candidates", get(candidates_handler))
        .route("/api/contributions/{candidate}", get(contributions_handler))
        .route("/api/top_donors_bar/{candidate}", get(top_donors_bar_handler))
        .route("/api/top_employers_bar/{candidate}", get(top_employers_bar_handler))
        .route("/api/top_donors_csv/{candidate}", get(top_donors_table_handler))
        .route("/api/repeated_donors/{candidate}", get(repeated_donors_handler))
        .route("/api/repeat_donors_bar/{candidate}", get(repeat_donors_bar_handler))
        .route("/api/repeat_donors/{candidate}", get(repeat_frequency_handler))
        .route("/api/donations_over_time/{candidate}", get(donations_over_time_handler))
        .route("/api/total_donations/{candidate}", get(total_donations_handler))
        .route("/api/vendors/{candidate}", get(vendors_handler))
        .route("/api/contracts/{candidate}", get(contracts_handler))
        .route("/api/search_donor/{candidate}", get(search_donor_handler))
        .route("/download/{file}", get(download_handler))
        .layer(cors_layer(allowed_origin)?)
        .with_state(state))
}

pub async fn serve(db_path: PathBuf, bind_addr: &str, allowed_origin: Option<&str>) -> Result<()> {
    let app = router(db_path, allowed_origin)?;

    info!("Binding to {bind_addr}");
    let listener = TcpListener::bind(bind_addr).await?;
    info!(addr = %listener.local_addr()?, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::db::test_db;
    use crate::reports::tests::{insert, row, solomon, Row};

    fn app() -> (tempfile::TempDir, Router) {
        let (dir, conn) = test_db();
        let cid = solomon(&conn);
        insert(&conn, cid, &Row {
            business: Some("McManimon Scotland & Baumann LLC"),
            date: Some("2025-01-10"),
            ..row("Corporate", 5400.0)
        });
        insert(&conn, cid, &Row {
            first: Some("Jane"),
            last: Some("Doe"),
            date: Some("2025-02-01"),
            employer: Some("Acme"),
            ..row("Individual - Small", 100.0)
        });
        insert(&conn, cid, &Row { business: Some("Sal Electric Co"), ..row("Corporate", 500.0) });
        insert(&conn, cid, &Row { business: Some("Sal Electric Inc"), ..row("Corporate", 250.0) });
        drop(conn);
        let router = router(dir.path().join("test.db"), None).unwrap();
        (dir, router)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = resp.into_body().collect().await.unwrap().to_bytes().to_vec();
        (status, body)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let (status, body) = get(app, uri).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, app) = app();
        let (status, body) = get(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");
    }

    #[tokio::test]
    async fn test_contributions_accept_any_alias() {
        let (_dir, app) = app();
        let (status, a) = get_json(app.clone(), "/api/contributions/JamesSolomon").await;
        assert_eq!(status, StatusCode::OK);
        let (_, b) = get_json(app, "/api/contributions/james%20solomon").await;
        assert_eq!(a, b);
        assert_eq!(a[0]["ContributorGroup"], "Corporate");
        assert_eq!(a[0]["ContributionAmount"], 6150.0);
    }

    #[tokio::test]
    async fn test_unknown_candidate_is_404_json() {
        let (_dir, app) = app();
        let (status, body) = get_json(app, "/api/top_donors_bar/Nobody").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Unknown candidate: Nobody");
    }

    #[tokio::test]
    async fn test_top_donors_bar_shape() {
        let (_dir, app) = app();
        let (_, body) = get_json(app, "/api/top_donors_bar/James_Solomon").await;
        assert_eq!(body["labels"][0], "McManimon Scotland & Baumann LLC");
        assert_eq!(body["datasets"][0]["backgroundColor"].as_array().unwrap().len(), 4);
        assert_eq!(body["datasets"][0]["label"], "Donation Amount");
    }

    #[tokio::test]
    async fn test_search_found_and_suggestions() {
        let (_dir, app) = app();
        let (status, body) = get_json(app.clone(), "/api/search_donor/James_Solomon?q=Jane%20Doe").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "found");
        assert_eq!(body["donor"], "jane doe");
        assert_eq!(body["records"][0]["ContributorGroup"], "Individual - Small");

        let (_, body) = get_json(app, "/api/search_donor/James_Solomon?q=sal%20electric").await;
        assert_eq!(body["status"], "not_found");
        assert_eq!(body["suggestions"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_search_missing_query_is_400() {
        let (_dir, app) = app();
        let (status, body) = get_json(app.clone(), "/api/search_donor/James_Solomon?q=%20%20").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing query");
        let (status, _) = get_json(app, "/api/search_donor/James_Solomon").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_total_uses_canonical_slug() {
        let (_dir, app) = app();
        let (_, body) = get_json(app, "/api/total_donations/jamessolomon").await;
        assert_eq!(body["candidate"], "James_Solomon");
        assert_eq!(body["total_donations"], 6250.0);
    }

    #[tokio::test]
    async fn test_vendor_and_contract_wrappers() {
        let (_dir, app) = app();
        let (_, vendors) = get_json(app.clone(), "/api/vendors/James_Solomon").await;
        assert!(vendors["vendor_matches"].as_array().unwrap().is_empty());
        let (_, contracts) = get_json(app, "/api/contracts/James_Solomon").await;
        assert!(contracts["contract_matches"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_download_combined_csv() {
        let (_dir, app) = app();
        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/download/James_Solomon_combined_contributions.csv")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp.headers()["content-disposition"].to_str().unwrap().to_string();
        assert!(disposition.contains("James_Solomon_combined_contributions.csv"));
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(String::from_utf8_lossy(&body).lines().count(), 5);

        let (status, _) = get(app, "/download/whatever.txt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_candidates_list() {
        let (_dir, app) = app();
        let (_, body) = get_json(app, "/api/candidates").await;
        let slugs: Vec<&str> = body.as_array().unwrap().iter().map(|c| c["slug"].as_str().unwrap()).collect();
        assert_eq!(slugs.len(), 5);
        assert!(slugs.contains(&"Bill_ODea"));
    }

    #[test]
    fn test_invalid_origin_is_rejected() {
        assert!(router(std::path::PathBuf::from("x.db"), Some("bad\norigin")).is_err());
    }
}
