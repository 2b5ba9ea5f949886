use actix_files::NamedFile;
use actix_multipart::Multipart;
use actix_web::{
    web::{self, Path},
    HttpRequest, HttpResponse, Responder,
};
use log::{error, info};
use sanitize_filename::sanitize;

use crate::assembly::{self, AssemblyError, GeneratedDocument};
use crate::config::AppConfig;
use crate::report::form::RawReportForm;
use crate::report::models::{
    GenerateReportRequest, HealthResponse, ImageRejectionResponse, ReportResponse,
};
use crate::ErrorResponse;

#[derive(Debug, thiserror::Error)]
enum GenerateError {
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error("failed to persist generated document: {0}")]
    Persist(std::io::Error),
}

#[utoipa::path(
    context_path = "/api",
    tag = "Report Service",
    post,
    path = "/reports",
    request_body(content = inline(GenerateReportRequest), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Report generated", body = ReportResponse),
        (status = 400, description = "Unknown organization or malformed payload", body = ErrorResponse),
        (status = 422, description = "Image slots failed validation", body = ImageRejectionResponse),
        (status = 500, description = "Template or rendering failure", body = ErrorResponse)
    )
)]
pub async fn generate_report(
    multipart: Multipart,
    config: web::Data<AppConfig>,
) -> impl Responder {
    let form = match RawReportForm::from_multipart(multipart).await {
        Ok(form) => form,
        Err(e) => {
            error!("failed to parse report form: {e}");
            return HttpResponse::from(e);
        }
    };

    let submission = form.into_submission();
    info!(
        "report submission for '{}' ({} feedback questions)",
        submission.organization_id,
        submission.feedback.len()
    );

    let options = config.assembly_options();
    let output_dir = config.output_dir.clone();

    let result = web::block(move || -> Result<GeneratedDocument, GenerateError> {
        let document = assembly::generate_report(submission, &options)?;
        std::fs::create_dir_all(&output_dir).map_err(GenerateError::Persist)?;
        std::fs::write(output_dir.join(&document.filename), &document.pdf)
            .map_err(GenerateError::Persist)?;
        Ok(document)
    })
    .await;

    match result {
        Ok(Ok(document)) => HttpResponse::Created().json(ReportResponse {
            download_url: format!("/api/reports/{}", document.filename),
            filename: document.filename,
            generated_at: document.generated_at,
        }),
        Ok(Err(GenerateError::Assembly(AssemblyError::InvalidImages(failures)))) => {
            HttpResponse::UnprocessableEntity().json(ImageRejectionResponse {
                error: format!("{} image slot(s) failed validation", failures.len()),
                failures,
            })
        }
        Ok(Err(GenerateError::Assembly(err))) if err.is_client_error() => {
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&err.to_string()))
        }
        Ok(Err(err)) => {
            error!("report generation failed: {err}");
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("report generation failed"))
        }
        Err(e) => {
            error!("report generation task failed: {e}");
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("report generation failed"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Report Service",
    get,
    path = "/reports/{filename}",
    responses(
        (status = 200, description = "The generated document"),
        (status = 404, description = "No such document")
    ),
    params(
        ("filename" = String, Path, description = "Filename returned by report generation")
    )
)]
pub async fn download_report(
    filename: Path<String>,
    config: web::Data<AppConfig>,
    req: HttpRequest,
) -> impl Responder {
    let safe_name = sanitize(filename.into_inner());
    let path = config.output_dir.join(&safe_name);
    let mime = mime_guess::from_path(&path).first_or_octet_stream();

    match NamedFile::open_async(&path).await {
        Ok(file) => file.set_content_type(mime).into_response(&req),
        Err(_) => {
            HttpResponse::NotFound().json(ErrorResponse::not_found("No such generated document"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Report Service",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
