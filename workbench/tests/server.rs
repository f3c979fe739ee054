#![cfg(all(feature = "server", feature = "http"))]

use serde_json::json;
use tokio::net::TcpListener;
use workbench::api::{BracketRequest, DeterminantRequest, VectorsRequest};
use workbench::{server, DeterminantMethod, HttpWorkbench, Request, Workbench, WorkbenchConfig};

async fn spawn(config: WorkbenchConfig) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(server::serve_on(listener, Workbench::new(config)));
    format!("http://{address}")
}

#[tokio::test]
async fn test_banner_lists_routes() {
    let client = HttpWorkbench::new(&spawn(WorkbenchConfig::default()).await);
    let banner = client.banner().await.unwrap();
    assert!(banner["message"].is_string());
    let endpoints = banner["endpoints"].as_array().unwrap();
    assert!(endpoints.iter().any(|e| e == "POST /linear-systems/solve"));
}

#[tokio::test]
async fn test_typed_routes() {
    let client = HttpWorkbench::new(&spawn(WorkbenchConfig::default()).await);

    let determinant = client
        .determinant(&DeterminantRequest {
            matrix: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            method: DeterminantMethod::Cramer,
        })
        .await
        .unwrap();
    assert_eq!(determinant.determinant, Some(-2.0));
    assert!(determinant.error.is_none());

    let independence = client
        .independence(&VectorsRequest {
            vectors: vec![vec![1.0, 2.0], vec![2.0, 4.0]],
        })
        .await
        .unwrap();
    assert_eq!(independence.independent, Some(false));

    let root = client
        .bisection(&BracketRequest {
            expr: "x^2 - 4".into(),
            a: 0.0,
            b: 5.0,
            tol: None,
            max_iter: None,
        })
        .await
        .unwrap();
    assert_eq!(root.converged, Some(true));
    assert!((root.value.unwrap() - 2.0).abs() < 1e-3);
}

#[tokio::test]
async fn test_engine_errors_are_status_200() {
    let client = HttpWorkbench::new(&spawn(WorkbenchConfig::default()).await);
    let request: Request = serde_json::from_value(json!({
        "kind": "matrix-operate",
        "operation": "inverse",
        "a": {"data": [[1, 2, 3]]}
    }))
    .unwrap();
    let response = client.execute(&request).await.unwrap();
    assert!(response["result"].is_null());
    assert!(response["error"].is_string());
}

#[tokio::test]
async fn test_floating_point_is_a_get() {
    let client = HttpWorkbench::new(&spawn(WorkbenchConfig::default()).await);
    let response = client.execute(&Request::FloatingPoint).await.unwrap();
    assert_ne!(response["value"].as_f64(), Some(0.3));
}

#[tokio::test]
async fn test_batch_limit() {
    let config = WorkbenchConfig::default().with_max_batch_size(1);
    let client = HttpWorkbench::new(&spawn(config).await);

    let ok = client.execute_batch(&[Request::FloatingPoint]).await.unwrap();
    assert_eq!(ok.len(), 1);

    let rejected = client
        .execute_batch(&[Request::FloatingPoint, Request::FloatingPoint])
        .await;
    assert!(matches!(
        rejected,
        Err(workbench::ServiceError::Status { status: 413, .. })
    ));
}

#[tokio::test]
async fn test_cors_preflight() {
    let base = spawn(WorkbenchConfig::default()).await;
    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{base}/matrix/operate"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}

#[tokio::test]
async fn test_bad_shapes_get_a_structured_error() {
    let base = spawn(WorkbenchConfig::default()).await;
    let client = reqwest::Client::new();
    for matrix in [json!([[1, 2], [3]]), json!([])] {
        let response = client
            .post(format!("{base}/determinants/calculate"))
            .json(&json!({ "matrix": matrix }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        let body: serde_json::Value = response.json().await.unwrap();
        assert!(body["determinant"].is_null());
        assert_eq!(body["steps"], json!([]));
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_long_expression_is_refused_without_crashing() {
    let client = HttpWorkbench::new(&spawn(WorkbenchConfig::default()).await);
    let long = BracketRequest {
        expr: vec!["x"; 100_000].join("+"),
        a: -1.0,
        b: 1.0,
        tol: None,
        max_iter: None,
    };
    let refused = client.bisection(&long).await.unwrap();
    assert!(refused.value.is_none());
    assert!(refused.error.unwrap().starts_with("Parse error"));

    // The server is still up
    let root = client
        .bisection(&BracketRequest {
            expr: "x - 0.5".into(),
            ..long
        })
        .await
        .unwrap();
    assert_eq!(root.converged, Some(true));
}
