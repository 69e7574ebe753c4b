//! REST API for the load planner.
//!
//! Exposes the calculation over HTTP with Axum. The container catalog is
//! loaded once at start and shared read-only by all handlers.

use std::sync::{Arc, OnceLock};

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::{OpenApi, ToSchema};

use crate::aggregate::{ItemDetail, format_cbm};
use crate::calculator::{
    CalculatorConfig, LoadPlan, PlacementStatus, calculate_load, calculate_load_with_progress,
};
use crate::catalog::Catalog;
use crate::config::{ApiConfig, PlannerConfig};
use crate::fit::{GridCounts, Orientation};
use crate::model::{ContainerType, Item, ValidationError};
use crate::placement::{ColorMode, PackedItemPlacement, PlacementSize};
use crate::selector::{ContainerLoadDetail, ContainerSuggestion};
use crate::types::{Dimensions, Vec3};

#[derive(Clone)]
pub struct ApiState {
    catalog: Arc<Catalog>,
    planner: PlannerConfig,
}

impl ApiState {
    pub fn new(catalog: Catalog, planner: PlannerConfig) -> Self {
        Self {
            catalog: Arc::new(catalog),
            planner,
        }
    }
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>load-planner API Docs</title>
        <link
            rel="stylesheet"
            href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css"
            integrity="sha384-wxLW6kwyHktdDGr6Pv1zgm/VGJh99lfUbzSn6HNHBENZlCN7W602k9VkGdxuFvPn"
            crossorigin="anonymous"
        />
    </head>
    <body>
        <div id="swagger-ui"></div>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"
            integrity="sha384-wmyclcVGX/WhUkdkATwhaK1X1JtiNrr2EoYJ+diV3vj4v6OC5yCeSu+yW13SYJep"
            crossorigin="anonymous"
        ></script>
        <script>
            window.onload = function () {
                window.ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                });
            };
        </script>
    </body>
</html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// Request body for the calculation endpoints.
///
/// `allow_rotations` and `color_policy` override the server configuration
/// for this request only.
#[derive(Deserialize, ToSchema)]
#[schema(
    example = json!({
        "items": [
            {
                "length": 200.0, "width": 150.0, "height": 150.0,
                "weight": 100.0, "quantity": 1, "color": "#FF5733"
            }
        ],
        "allow_rotations": true,
        "color_policy": "palette"
    })
)]
pub struct CalculateRequest {
    pub items: Vec<Item>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub allow_rotations: Option<bool>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub color_policy: Option<ColorMode>,
}

#[derive(Debug)]
struct ValidatedCalculateRequest {
    items: Vec<Item>,
    allow_rotations: Option<bool>,
    color_policy: Option<ColorMode>,
}

impl ValidatedCalculateRequest {
    fn calculator_config(&self, base: &CalculatorConfig) -> CalculatorConfig {
        let mut config = base.clone();
        if let Some(allow) = self.allow_rotations {
            config.allow_item_rotation = allow;
        }
        if let Some(mode) = self.color_policy {
            config.color_mode = mode;
        }
        config
    }
}

#[derive(Debug)]
struct InvalidItem {
    index: usize,
    error: ValidationError,
}

impl CalculateRequest {
    fn into_validated(self) -> Result<ValidatedCalculateRequest, InvalidItem> {
        for (index, item) in self.items.iter().enumerate() {
            item.validate()
                .map_err(|error| InvalidItem { index, error })?;
        }
        Ok(ValidatedCalculateRequest {
            items: self.items,
            allow_rotations: self.allow_rotations,
            color_policy: self.color_policy,
        })
    }
}

/// Single-unit capacity of the suggestion, or `"N/A"`.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum CbmValue {
    Value(f64),
    NotApplicable(String),
}

#[derive(Serialize, ToSchema)]
pub struct SuggestedContainerResponse {
    pub name: String,
    pub cbm: CbmValue,
    pub required_count: u32,
    #[schema(nullable = true)]
    pub utilization_percent: Option<f64>,
    #[schema(nullable = true)]
    pub dimensions: Option<Dimensions>,
}

impl From<&ContainerSuggestion> for SuggestedContainerResponse {
    fn from(suggestion: &ContainerSuggestion) -> Self {
        let chosen = suggestion.suggested();
        Self {
            name: suggestion.name().to_string(),
            cbm: suggestion
                .cbm()
                .map_or_else(|| CbmValue::NotApplicable("N/A".to_string()), CbmValue::Value),
            required_count: suggestion.required_count(),
            utilization_percent: chosen.map(|s| s.utilization_percent),
            dimensions: chosen.map(|s| s.container.dimensions),
        }
    }
}

/// Response of `POST /calculate`.
#[derive(Serialize, ToSchema)]
pub struct CalculateResponse {
    /// Total volume in m³ with two decimals.
    pub total_cbm: String,
    pub total_weight: f64,
    pub suggested_container: SuggestedContainerResponse,
    pub item_details: Vec<ItemDetail>,
    pub container_load_details: Vec<ContainerLoadDetail>,
    #[schema(nullable = true)]
    pub container_dimensions: Option<Dimensions>,
    pub packed_items: Vec<PackedItemPlacement>,
    pub placement_status: PlacementStatus,
}

impl CalculateResponse {
    pub fn from_load_plan(plan: LoadPlan) -> Self {
        let LoadPlan {
            item_details,
            totals,
            suggestion,
            container_load_details,
            container_dimensions,
            packed_items,
            placement_status,
        } = plan;

        Self {
            total_cbm: format_cbm(totals.total_cbm),
            total_weight: totals.total_weight,
            suggested_container: SuggestedContainerResponse::from(&suggestion),
            item_details,
            container_load_details,
            container_dimensions,
            packed_items,
            placement_status,
        }
    }
}

#[derive(Serialize, ToSchema)]
struct ErrorResponse {
    error: String,
    details: String,
}

fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    details: impl Into<String>,
) -> Response {
    let body = ErrorResponse {
        error: error.into(),
        details: details.into(),
    };
    (status, Json(body)).into_response()
}

fn parse_calculate_request(
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Result<ValidatedCalculateRequest, Response> {
    let Json(payload) = payload.map_err(|err| {
        error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid JSON data",
            err.to_string(),
        )
    })?;

    payload.into_validated().map_err(|invalid| {
        error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid input data",
            format!("Item {}: {}", invalid.index + 1, invalid.error),
        )
    })
}

#[derive(OpenApi)]
#[openapi(
    paths(handle_calculate, handle_calculate_stream, list_containers),
    components(
        schemas(
            CalculateRequest,
            CalculateResponse,
            SuggestedContainerResponse,
            CbmValue,
            ErrorResponse,
            Item,
            ItemDetail,
            ContainerType,
            ContainerLoadDetail,
            Dimensions,
            Orientation,
            GridCounts,
            PackedItemPlacement,
            PlacementSize,
            PlacementStatus,
            ColorMode,
            Vec3
        )
    ),
    tags((name = "loading", description = "Container load calculation"))
)]
struct ApiDoc;

/// Builds the application router.
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/calculate", post(handle_calculate))
        .route("/calculate_stream", post(handle_calculate_stream))
        .route("/containers", get(list_containers))
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Starts the API server and serves until it terminates.
pub async fn start_api_server(config: ApiConfig, state: ApiState) -> std::io::Result<()> {
    let app = router(state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        "Server running on http://{}:{}",
        config.display_host(),
        config.port()
    );
    if config.binds_to_all_interfaces() {
        tracing::info!("Local access: http://localhost:{}", config.port());
    }
    tracing::info!("Endpoints: POST /calculate, POST /calculate_stream, GET /containers, GET /docs");

    axum::serve(listener, app).await
}

/// Handler for POST /calculate.
///
/// Runs the full load calculation against the server's catalog.
#[utoipa::path(
    post,
    path = "/calculate",
    request_body = CalculateRequest,
    responses(
        (status = 200, description = "Load calculated", body = CalculateResponse),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid request",
            body = ErrorResponse
        ),
        (
            status = INTERNAL_SERVER_ERROR,
            description = "Calculation failed",
            body = ErrorResponse
        )
    ),
    tag = "loading"
)]
async fn handle_calculate(
    State(state): State<ApiState>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Response {
    let request = match parse_calculate_request(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let config = request.calculator_config(state.planner.calculator_config());
    tracing::info!(items = request.items.len(), "new calculate request");

    let catalog = Arc::clone(&state.catalog);
    let plan = match tokio::task::spawn_blocking(move || {
        calculate_load(&request.items, &catalog, &config)
    })
    .await
    {
        Ok(plan) => plan,
        Err(err) => {
            tracing::error!("calculation task failed: {}", err);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Calculation failed",
                err.to_string(),
            );
        }
    };
    tracing::info!(
        suggestion = plan.suggestion.name(),
        placed = plan.placed_count(),
        "calculation finished"
    );

    let response = CalculateResponse::from_load_plan(plan);
    (StatusCode::OK, Json(response)).into_response()
}

/// Handler for POST /calculate_stream (SSE).
///
/// Streams calculation events as Server-Sent Events so a viewer can show
/// placements while they are produced.
#[utoipa::path(
    post,
    path = "/calculate_stream",
    request_body = CalculateRequest,
    responses(
        (
            status = 200,
            description = "Streams calculation events",
            content_type = "text/event-stream",
            body = String
        ),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid request",
            body = ErrorResponse
        )
    ),
    tag = "loading"
)]
async fn handle_calculate_stream(
    State(state): State<ApiState>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Response {
    let request = match parse_calculate_request(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let config = request.calculator_config(state.planner.calculator_config());
    let catalog = Arc::clone(&state.catalog);
    let (tx, rx) = mpsc::channel::<String>(32);

    tokio::task::spawn_blocking(move || {
        calculate_load_with_progress(&request.items, &catalog, &config, |evt| {
            match serde_json::to_string(evt) {
                // A closed receiver only means the client went away.
                Ok(json) => {
                    let _ = tx.blocking_send(json);
                }
                Err(err) => tracing::warn!("could not serialize event: {}", err),
            }
        });
    });

    let stream = ReceiverStream::new(rx)
        .map(|msg| Ok::<_, std::convert::Infallible>(Event::default().data(msg)));
    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(std::time::Duration::from_secs(10))
                .text("keep-alive"),
        )
        .into_response()
}

/// Handler for GET /containers: the read-only container catalog.
#[utoipa::path(
    get,
    path = "/containers",
    responses((status = 200, description = "Container catalog", body = [ContainerType])),
    tag = "loading"
)]
async fn list_containers(State(state): State<ApiState>) -> Json<Vec<ContainerType>> {
    Json(state.catalog.containers().to_vec())
}

async fn serve_openapi_json() -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}
