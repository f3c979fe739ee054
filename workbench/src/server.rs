//! HTTP server exposing the workbench over JSON
//!
//! Only available when the "server" feature is enabled. Engine failures are
//! answered with status 200 and an `error` string; the framework rejects
//! malformed JSON on its own.

#[cfg(feature = "server")]
pub mod server_impl {
    use std::sync::Arc;

    use axum::extract::{Request as HttpRequest, State};
    use axum::http::header::{
        ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    };
    use axum::http::{HeaderValue, Method, StatusCode};
    use axum::middleware::{self, Next};
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post, MethodRouter};
    use axum::{Json, Router};
    use serde::de::DeserializeOwned;
    use serde::Serialize;
    use serde_json::json;
    use tokio::net::TcpListener;
    use tracing::{info, warn};

    use crate::config::WorkbenchConfig;
    use crate::error::{Result, ServiceError};
    use crate::operation::{Request, Workbench};

    type Shared = Arc<Workbench>;

    /// Every route the server answers, as listed by `GET /`
    pub const ROUTES: &[&str] = &[
        "POST /matrix/operate",
        "POST /determinants/calculate",
        "POST /determinants/properties",
        "POST /linear-systems/solve",
        "POST /vectors/independence",
        "POST /vectors/basis",
        "POST /vectors/combination",
        "POST /numerical/bisection",
        "POST /numerical/false-position",
        "POST /numerical/newton-raphson",
        "POST /numerical/secant",
        "POST /numerical/decompose/base10",
        "POST /numerical/decompose/base2",
        "POST /numerical/errors/roundoff",
        "POST /numerical/errors/truncation",
        "POST /numerical/errors/propagation",
        "POST /numerical/errors/function-propagation",
        "GET /numerical/floating-point",
        "POST /batch",
    ];

    /// Build the router for `workbench`
    pub fn router(workbench: Workbench) -> Router {
        Router::new()
            .route("/", get(banner))
            .route("/matrix/operate", endpoint(Workbench::matrix_operate))
            .route("/determinants/calculate", endpoint(Workbench::determinant))
            .route(
                "/determinants/properties",
                endpoint(Workbench::determinant_properties),
            )
            .route("/linear-systems/solve", endpoint(Workbench::linear_system))
            .route("/vectors/independence", endpoint(Workbench::independence))
            .route("/vectors/basis", endpoint(Workbench::basis))
            .route("/vectors/combination", endpoint(Workbench::combination))
            .route("/numerical/bisection", endpoint(Workbench::bisection))
            .route("/numerical/false-position", endpoint(Workbench::false_position))
            .route("/numerical/newton-raphson", endpoint(Workbench::newton_raphson))
            .route("/numerical/secant", endpoint(Workbench::secant))
            .route(
                "/numerical/decompose/base10",
                endpoint(Workbench::decompose_base10),
            )
            .route(
                "/numerical/decompose/base2",
                endpoint(Workbench::decompose_base2),
            )
            .route("/numerical/errors/roundoff", endpoint(Workbench::roundoff))
            .route("/numerical/errors/truncation", endpoint(Workbench::truncation))
            .route("/numerical/errors/propagation", endpoint(Workbench::propagation))
            .route(
                "/numerical/errors/function-propagation",
                endpoint(Workbench::function_propagation),
            )
            .route("/numerical/floating-point", get(floating_point))
            .route("/batch", post(batch))
            .layer(middleware::from_fn(cors))
            .with_state(Arc::new(workbench))
    }

    /// Bind the configured address and serve until Ctrl-C
    pub async fn serve(config: WorkbenchConfig) -> Result<()> {
        let address = config.address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ServiceError::Bind {
                address: address.clone(),
                source,
            })?;
        info!(%address, "workbench server listening");
        serve_on(listener, Workbench::new(config)).await
    }

    /// Serve on an already bound listener
    pub async fn serve_on(listener: TcpListener, workbench: Workbench) -> Result<()> {
        axum::serve(listener, router(workbench))
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("workbench server stopped");
        Ok(())
    }

    async fn shutdown_signal() {
        if tokio::signal::ctrl_c().await.is_err() {
            // No signal handler available; run until the process is killed
            std::future::pending::<()>().await;
        }
    }

    /// POST route evaluating one request type on a blocking worker
    fn endpoint<Req, Resp>(evaluate: fn(&Workbench, &Req) -> Resp) -> MethodRouter<Shared>
    where
        Req: DeserializeOwned + Send + 'static,
        Resp: Serialize + Send + 'static,
    {
        post(
            move |State(workbench): State<Shared>, Json(request): Json<Req>| async move {
                blocking(workbench, move |workbench| evaluate(workbench, &request)).await
            },
        )
    }

    async fn blocking<T, F>(workbench: Shared, job: F) -> std::result::Result<Json<T>, StatusCode>
    where
        F: FnOnce(&Workbench) -> T + Send + 'static,
        T: Send + 'static,
    {
        tokio::task::spawn_blocking(move || job(&workbench))
            .await
            .map(Json)
            .map_err(|error| {
                warn!(%error, "computation task failed");
                StatusCode::INTERNAL_SERVER_ERROR
            })
    }

    async fn banner() -> impl IntoResponse {
        Json(json!({
            "message": "Linear workbench API running",
            "endpoints": ROUTES,
        }))
    }

    async fn floating_point(State(workbench): State<Shared>) -> impl IntoResponse {
        blocking(workbench, |workbench| workbench.floating_point()).await
    }

    async fn batch(State(workbench): State<Shared>, Json(requests): Json<Vec<Request>>) -> Response {
        let outcome = tokio::task::spawn_blocking(move || workbench.execute_batch(&requests)).await;
        match outcome {
            Ok(Ok(responses)) => Json(responses).into_response(),
            Ok(Err(error)) => {
                warn!(%error, "batch rejected");
                (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    Json(json!({ "error": error.to_string() })),
                )
                    .into_response()
            }
            Err(error) => {
                warn!(%error, "batch task failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }

    /// Allow any origin and answer preflights directly
    async fn cors(request: HttpRequest, next: Next) -> Response {
        let mut response = if request.method() == Method::OPTIONS {
            StatusCode::NO_CONTENT.into_response()
        } else {
            next.run(request).await
        };
        let headers = response.headers_mut();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, OPTIONS"),
        );
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
        response
    }
}

#[cfg(not(feature = "server"))]
pub mod server_stub {
    use crate::config::WorkbenchConfig;
    use crate::error::{Result, ServiceError};

    pub async fn serve(_config: WorkbenchConfig) -> Result<()> {
        Err(ServiceError::Unsupported(
            "Server support not enabled. Build with --features server",
        ))
    }
}

#[cfg(feature = "server")]
pub use server_impl::*;

#[cfg(not(feature = "server"))]
pub use server_stub::*;
