// File: services/appointly_backend/src/main.rs
use appointly_common::{logging, routes as common_routes, AppointlyError, Context};
use appointly_config::load_config;
#[cfg(feature = "gcal")]
use appointly_gcal::routes as gcal_routes;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), AppointlyError> {
    let config = Arc::new(load_config().context("Failed to load config")?);
    // Keep the guard alive so the file writer flushes on shutdown.
    let _log_guard = logging::init_from_config(&config.logging);

    #[allow(unused_mut)] // for the features it needs to be mutable
    let mut app = Router::new().merge(common_routes());

    #[cfg(feature = "gcal")]
    {
        if appointly_common::is_gcal_enabled(&config) {
            app = app.merge(gcal_routes::routes(config.clone()).await?);
            info!("Google Calendar routes enabled");
        } else {
            tracing::warn!("Google Calendar disabled: set use_gcal and a [gcal] section");
        }
    }

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        #[cfg(feature = "gcal")]
        use appointly_gcal::doc::GcalApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Appointly API",
                version = "0.1.0",
                description = "Appointment availability and booking",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            components(),
            tags( (name = "Appointly", description = "Core service endpoints")),
        )]
        struct ApiDoc;

        #[allow(unused_mut)] // for the features it needs to be mutable
        let mut openapi_doc = ApiDoc::openapi();
        #[cfg(feature = "gcal")]
        openapi_doc.merge(GcalApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server is running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .context("Server stopped unexpectedly")?;
    Ok(())
}
