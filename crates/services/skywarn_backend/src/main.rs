// File: services/skywarn_backend/src/main.rs
use axum::{routing::get, Json, Router};
use http::{header, HeaderValue, Method};
use serde::Serialize;
use skywarn_config::load_config;
use skywarn_registration::routes as registration_routes;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

mod service_factory;

/// Liveness response for the root route.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Skywarn FCM server is running.",
    })
}

#[tokio::main]
async fn main() {
    skywarn_common::logging::init();

    let config = load_config().expect("Failed to load config");
    let state = service_factory::build_registration_state(&config)
        .expect("Failed to initialize services");

    let api_router = registration_routes(state);

    #[allow(unused_mut)] // openapi adds the swagger routes
    let mut app = Router::new()
        .route("/", get(health))
        .nest("/api", api_router);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use skywarn_registration::openapi::RegistrationApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        info!("Adding Swagger UI at /api/docs");
        let swagger_ui = SwaggerUi::new("/api/docs")
            .url("/api/docs/openapi.json", RegistrationApiDoc::openapi());
        app = app.merge(swagger_ui);
    }

    // The endpoint is browser-facing and answers exactly one web origin
    if let Some(cors) = config.cors.as_ref() {
        let origin = cors
            .allowed_origin
            .parse::<HeaderValue>()
            .expect("Invalid cors.allowed_origin");
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE]),
        );
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await.expect("Failed to bind");
    info!("Starting server at http://{}", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}
