use approx::assert_abs_diff_eq;
use serde_json::{json, Value};
use workbench::{Request, Workbench, WorkbenchConfig};

fn run(request: Value) -> Value {
    let request: Request = serde_json::from_value(request).expect("request should parse");
    let response = Workbench::new(WorkbenchConfig::default()).execute(&request);
    serde_json::to_value(&response).expect("response should serialize")
}

fn steps(response: &Value) -> Vec<String> {
    serde_json::from_value(response["steps"].clone()).unwrap()
}

#[test]
fn test_every_response_has_steps_and_error() {
    let requests = [
        json!({"kind": "matrix-operate", "operation": "transpose", "a": {"data": [[1, 2, 3]]}}),
        json!({"kind": "determinant", "matrix": [[1, 2], [3, 4]]}),
        json!({"kind": "determinant-properties", "matrix": [[1, 2], [3, 4]]}),
        json!({"kind": "linear-system", "augmented": [[1, 1, 2]]}),
        json!({"kind": "independence", "vectors": [[1, 0], [0, 1]]}),
        json!({"kind": "basis", "vectors": [[1, 0], [0, 1]]}),
        json!({"kind": "combination", "vectors": [[1, 0], [0, 1]], "target": [3, 4]}),
        json!({"kind": "bisection", "expr": "x - 1", "a": 0, "b": 3}),
        json!({"kind": "false-position", "expr": "x - 1", "a": 0, "b": 3}),
        json!({"kind": "newton-raphson", "expr": "x - 1", "x0": 4}),
        json!({"kind": "secant", "expr": "x - 1", "x0": 4, "x1": 5}),
        json!({"kind": "decompose-base10", "value": "472"}),
        json!({"kind": "decompose-base2", "value": "101"}),
        json!({"kind": "roundoff", "value": 0.1, "n": 10}),
        json!({"kind": "truncation", "x": 1.0, "max_terms": 5}),
        json!({"kind": "propagation", "a": 1.0, "b": 3.0}),
        json!({"kind": "function-propagation", "true_value": 1.0, "approx_value": 1.01}),
        json!({"kind": "floating-point"}),
    ];
    for request in requests {
        let response = run(request.clone());
        assert!(response["steps"].is_array(), "{request}");
        assert!(response.get("error").is_some(), "{request}");
        assert!(response["error"].is_null(), "{request}: {}", response["error"]);
    }
}

#[test]
fn test_matrix_multiply_shape() {
    let response = run(json!({
        "kind": "matrix-operate",
        "operation": "multiply",
        "a": {"data": [[1, 2], [3, 4], [5, 6]]},
        "b": {"data": [[1, 0, 2], [0, 1, 3]]}
    }));
    let result: Vec<Vec<f64>> = serde_json::from_value(response["result"].clone()).unwrap();
    assert_eq!(result.len(), 3);
    assert_eq!(result[0], vec![1.0, 2.0, 8.0]);
}

#[test]
fn test_shape_mismatch_is_an_error_string() {
    let response = run(json!({
        "kind": "matrix-operate",
        "operation": "add",
        "a": {"data": [[1, 2]]},
        "b": {"data": [[1], [2]]}
    }));
    assert!(response["result"].is_null());
    assert!(response["error"].as_str().unwrap().contains("Incompatible dimensions"));
    assert!(steps(&response).is_empty());
}

#[test]
fn test_determinant_methods_agree() {
    let matrix = json!([[2, -3, 1], [2, 0, -1], [1, 4, 5]]);
    let values: Vec<f64> = ["cofactors", "sarrus", "cramer"]
        .iter()
        .map(|method| {
            let response = run(json!({"kind": "determinant", "matrix": matrix, "method": method}));
            response["determinant"].as_f64().unwrap()
        })
        .collect();
    assert_abs_diff_eq!(values[0], 49.0, epsilon = 1e-9);
    assert_abs_diff_eq!(values[0], values[1], epsilon = 1e-9);
    assert_abs_diff_eq!(values[0], values[2], epsilon = 1e-9);
}

#[test]
fn test_sarrus_rejects_2x2() {
    let response = run(json!({"kind": "determinant", "matrix": [[1, 2], [3, 4]], "method": "sarrus"}));
    assert!(response["determinant"].is_null());
    assert!(response["error"].is_string());
}

#[test]
fn test_linear_system_classification() {
    let unique = run(json!({
        "kind": "linear-system",
        "augmented": [[2, 1, -1, 8], [-3, -1, 2, -11], [-2, 1, 2, -3]]
    }));
    assert_eq!(unique["solution_type"], "unique");
    let solution: Vec<f64> = serde_json::from_value(unique["solution"].clone()).unwrap();
    for (x, expected) in solution.iter().zip([2.0, 3.0, -1.0]) {
        assert_abs_diff_eq!(*x, expected, epsilon = 1e-9);
    }
    assert!(!steps(&unique).is_empty());

    let infinite = run(json!({
        "kind": "linear-system",
        "augmented": [[1, 2, 3], [2, 4, 6]]
    }));
    assert_eq!(infinite["solution_type"], "infinite");
    assert!(infinite["solution"].is_null());

    let none = run(json!({
        "kind": "linear-system",
        "augmented": [[1, 1, 2], [1, 1, 3]]
    }));
    assert_eq!(none["solution_type"], "none");
}

#[test]
fn test_cramer_solve() {
    let response = run(json!({
        "kind": "linear-system",
        "augmented": [[2, 1, 5], [1, -1, 1]],
        "method": "cramer"
    }));
    assert_eq!(response["solution_type"], "unique");
    let solution: Vec<f64> = serde_json::from_value(response["solution"].clone()).unwrap();
    assert_abs_diff_eq!(solution[0], 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(solution[1], 1.0, epsilon = 1e-12);
}

#[test]
fn test_vector_space_routes() {
    let independent = run(json!({"kind": "independence", "vectors": [[1, 0, 0], [0, 1, 0]]}));
    assert_eq!(independent["independent"], true);
    assert_eq!(independent["solution_type"], "unique");

    let dependent = run(json!({"kind": "independence", "vectors": [[1, 2], [2, 4]]}));
    assert_eq!(dependent["independent"], false);
    assert_eq!(dependent["solution_type"], "infinite");

    let too_many = run(json!({"kind": "independence", "vectors": [[1, 0], [0, 1], [1, 1]]}));
    assert_eq!(too_many["independent"], false);

    let basis = run(json!({"kind": "basis", "vectors": [[1, 1], [1, -1]]}));
    assert_eq!(basis["basis"], true);

    let short = run(json!({"kind": "basis", "vectors": [[1, 0, 0], [0, 1, 0]]}));
    assert_eq!(short["basis"], false);
    assert!(short["error"].is_null());

    let mixed = run(json!({"kind": "basis", "vectors": [[1, 0], [0, 1, 0]]}));
    assert!(mixed["error"].is_string());

    let combination = run(json!({
        "kind": "combination",
        "vectors": [[1, 0], [1, 1]],
        "target": [3, 2]
    }));
    assert_eq!(combination["in_span"], true);
    let coefficients: Vec<f64> = serde_json::from_value(combination["solution"].clone()).unwrap();
    assert_abs_diff_eq!(coefficients[0], 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(coefficients[1], 2.0, epsilon = 1e-9);
}

#[test]
fn test_root_finders() {
    let bisection = run(json!({"kind": "bisection", "expr": "x^3 - x - 2", "a": 1, "b": 2, "tol": 1e-4}));
    assert_eq!(bisection["converged"], true);
    assert_abs_diff_eq!(bisection["value"].as_f64().unwrap(), 1.5214, epsilon = 1e-3);

    let newton = run(json!({"kind": "newton-raphson", "expr": "x^3 - x - 2", "x0": 1.5, "tol": 1e-4}));
    assert_eq!(newton["converged"], true);
    assert!(newton["iterations"].as_u64().unwrap() < bisection["iterations"].as_u64().unwrap());

    let same_sign = run(json!({"kind": "bisection", "expr": "x^2 + 1", "a": -1, "b": 1}));
    assert!(same_sign["value"].is_null());
    assert!(same_sign["error"].is_string());

    let bad_expr = run(json!({"kind": "secant", "expr": "2x", "x0": 0, "x1": 1}));
    assert!(bad_expr["error"].as_str().unwrap().starts_with("Parse error"));
    assert!(steps(&bad_expr).is_empty());
}

#[test]
fn test_numerical_demos() {
    let binary = run(json!({"kind": "decompose-base2", "value": "1111001"}));
    assert_eq!(binary["value"].as_f64(), Some(121.0));

    let invalid = run(json!({"kind": "decompose-base2", "value": "1021"}));
    assert!(invalid["value"].is_null());
    assert!(invalid["error"].is_string());

    let roundoff = run(json!({"kind": "roundoff", "value": 0.1, "n": 10}));
    let sum = roundoff["value"].as_f64().unwrap();
    assert_ne!(sum, 1.0);
    assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-12);

    let out_of_range = run(json!({"kind": "roundoff", "value": 0.1, "n": 0}));
    assert!(out_of_range["error"].is_string());

    let truncation = run(json!({"kind": "truncation", "x": 1.0, "max_terms": 20}));
    assert_abs_diff_eq!(
        truncation["value"].as_f64().unwrap(),
        std::f64::consts::E,
        epsilon = 1e-12
    );

    let propagation = run(json!({"kind": "propagation", "a": 1.0, "b": 0.0}));
    assert_eq!(propagation["values"].as_array().unwrap().len(), 2);

    let function = run(json!({"kind": "function-propagation", "true_value": 2.0, "approx_value": 2.001}));
    assert!(function["diagnosis"].is_string());
}

#[test]
fn test_batch_preserves_order() {
    let requests: Vec<Request> = serde_json::from_value(json!([
        {"kind": "decompose-base2", "value": "10"},
        {"kind": "decompose-base2", "value": "11"},
        {"kind": "decompose-base10", "value": "7"}
    ]))
    .unwrap();
    let responses = Workbench::default().execute_batch(&requests).unwrap();
    let values: Vec<Value> = responses
        .iter()
        .map(|r| serde_json::to_value(r).unwrap()["value"].clone())
        .collect();
    assert_eq!(values, vec![json!(2.0), json!(3.0), json!(7.0)]);
}
