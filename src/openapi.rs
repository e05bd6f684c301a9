//! OpenAPI document and Swagger UI.

use axum::{http::StatusCode, response::IntoResponse};
use utoipa::OpenApi;

use crate::models::{
    AddHumanRequest, DeleteHumanRequest, EnrichedAttributes, Gender, Human, UpdateHumanRequest,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "People Enrichment API",
        description = "Stores people and fills in age, gender and nationality from their first name"
    ),
    paths(
        crate::handlers::health,
        crate::handlers::add_human,
        crate::handlers::get_humans,
        crate::handlers::update_human,
        crate::handlers::delete_human,
    ),
    components(schemas(
        Human,
        AddHumanRequest,
        UpdateHumanRequest,
        DeleteHumanRequest,
        EnrichedAttributes,
        Gender
    )),
    tags(
        (name = "humans", description = "Human records"),
        (name = "system", description = "Service status")
    )
)]
pub struct ApiDoc;

/// Serves the generated OpenAPI document as JSON.
pub async fn serve_openapi_spec() -> impl IntoResponse {
    match ApiDoc::openapi().to_json() {
        Ok(content) => (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            content,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to render OpenAPI document: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "OpenAPI document unavailable",
            )
                .into_response()
        }
    }
}

/// Serves the Swagger UI HTML page, loading the document from
/// `serve_openapi_spec`.
pub async fn serve_swagger_ui() -> impl IntoResponse {
    let html = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>People Enrichment API - Swagger UI</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        body { margin: 0; padding: 0; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {
            window.ui = SwaggerUIBundle({
                url: "/api-docs/openapi.json",
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout"
            });
        };
    </script>
</body>
</html>
"#;
    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_human_routes() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let humans = &doc["paths"]["/humans"];
        for method in ["get", "post", "patch", "delete"] {
            assert!(humans.get(method).is_some(), "missing {} /humans", method);
        }
        assert!(doc["components"]["schemas"].get("Human").is_some());
    }
}
