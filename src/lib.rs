use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod assembly;
pub mod config;
pub mod report;

pub use crate::config::AppConfig;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

pub async fn run() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    #[derive(OpenApi)]
    #[openapi(
        paths(
            crate::report::handlers::generate_report,
            crate::report::handlers::download_report,
            crate::report::handlers::health
        ),
        components(
            schemas(
                report::models::ReportResponse,
                report::models::ImageRejectionResponse,
                report::models::HealthResponse,
                assembly::images::ImageFailure,
                assembly::images::ImageFailureKind,
                assembly::template::Organization,
                ErrorResponse,
            )
        ),
        tags(
            (name = "Report Service", description = "Training report generation endpoints.")
        )
    )]
    struct ApiDoc;

    dotenvy::dotenv().ok();
    let app_config = web::Data::new(AppConfig::from_env());
    log::info!(
        "templates from {}, output to {}",
        app_config.template_dir.display(),
        app_config.output_dir.display()
    );

    log::info!("Starting server at http://0.0.0.0:8080");

    HttpServer::new(move || {
        let app_config = app_config.clone();
        let cors = Cors::default()
            .allowed_origin("http://localhost:5173")
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://localhost:8080")
            .allowed_origin("http://127.0.0.1:8080")
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(cors)
            .app_data(app_config)
            .app_data(web::PayloadConfig::new(config::MAX_PAYLOAD_BYTES))
            .service(
                web::scope("/api")
                    .service(
                        web::resource("/reports")
                            .route(web::post().to(report::handlers::generate_report)),
                    )
                    .service(
                        web::resource("/reports/{filename}")
                            .route(web::get().to(report::handlers::download_report)),
                    ),
            )
            .service(web::resource("/health").route(web::get().to(report::handlers::health)))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind(("0.0.0.0", 8080))?
    .run()
    .await
}
