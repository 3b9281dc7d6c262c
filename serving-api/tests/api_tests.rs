//! End-to-end tests driving the router in-process

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use ndarray::{Array2, ArrayView2};
use serde_json::{json, Value};
use tower::ServiceExt;

use banknote_api::inference::{Classifier, ModelError, StandardScaler};
use banknote_api::{create_router, AppState, Config, ModelBundle};

const BOUNDARY: &str = "banknote-test-boundary";
const HEADER: &str = "diagonal,height_left,height_right,margin_low,margin_up,length";

fn artifact(name: &str) -> String {
    format!("{}/models/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn shipped_models() -> ModelBundle {
    ModelBundle::load(artifact("scaler.json"), artifact("classifier.json")).unwrap()
}

fn app() -> Router {
    create_router(AppState::new(shipped_models(), Config::default()))
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_file(field: &str, filename: &str, contents: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/csv\r\n\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/predict_file")
        .header("content-type", format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap()
}

fn sample_record() -> Value {
    json!({
        "diagonal": 171.8, "height_left": 104.2, "height_right": 104.3,
        "margin_low": 4.3, "margin_up": 2.3, "length": 113.2
    })
}

fn labels(body: &Value) -> Vec<i64> {
    body["predictions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["prediction"].as_i64().unwrap())
        .collect()
}

fn assert_well_formed(body: &Value, rows: usize) {
    let predictions = body["predictions"].as_array().unwrap();
    assert_eq!(predictions.len(), rows);
    assert_eq!(body["total_samples"], rows);

    for (i, p) in predictions.iter().enumerate() {
        assert_eq!(p["index"], i);
        let label = p["prediction"].as_i64().unwrap();
        assert!(label == 0 || label == 1);
        let p0 = p["probability_class_0"].as_f64().unwrap();
        let p1 = p["probability_class_1"].as_f64().unwrap();
        assert!((p0 + p1 - 1.0).abs() < 1e-9);
        assert_eq!(p["confidence"].as_f64().unwrap(), p0.max(p1));
    }
}

// ============================================================================
// INFO / HEALTH
// ============================================================================

#[tokio::test]
async fn test_index() {
    let (status, body) = send(app(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Banknote authentication API");
}

#[tokio::test]
async fn test_health_ok() {
    let (status, body) = send(app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["models_loaded"], true);
    assert_eq!(
        body["expected_columns"],
        json!(["diagonal", "height_left", "height_right", "margin_low", "margin_up", "length"])
    );
}

struct NanClassifier;

impl Classifier for NanClassifier {
    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, ModelError> {
        Ok(Array2::from_elem((x.nrows(), 2), f64::NAN))
    }
    fn classes(&self) -> [i64; 2] {
        [0, 1]
    }
    fn n_features(&self) -> usize {
        6
    }
    fn type_name(&self) -> &'static str {
        "NanClassifier"
    }
}

#[tokio::test]
async fn test_health_fails_when_inference_fails() {
    let models = ModelBundle::new(
        Box::new(StandardScaler::new(vec![0.0; 6], vec![1.0; 6])),
        Box::new(NanClassifier),
    )
    .unwrap();
    let app = create_router(AppState::new(models, Config::default()));

    let (status, body) = send(app.clone(), get("/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Model health check failed");
    assert_eq!(body["status"], 503);

    // inference failures never leak details
    let (status, body) = send(app, post_json(json!([sample_record()]))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Prediction failed");
}

#[tokio::test]
async fn test_model_info() {
    let (status, body) = send(app(), get("/model_info")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_type"], "LogisticRegression");
    assert_eq!(body["scaler_type"], "StandardScaler");
    assert_eq!(body["classes"], json!([0, 1]));
    assert_eq!(body["class_labels"]["0"], "counterfeit");
    assert_eq!(body["class_labels"]["1"], "authentic");
    assert_eq!(body["expected_columns"].as_array().unwrap().len(), 6);
}

// ============================================================================
// POST /predict
// ============================================================================

#[tokio::test]
async fn test_predict_example_row() {
    let (status, body) = send(app(), post_json(json!([sample_record()]))).await;
    assert_eq!(status, StatusCode::OK);
    assert_well_formed(&body, 1);

    let first = &body["predictions"][0];
    assert!(first["confidence"].as_f64().unwrap() >= 0.5);
    // large upper margin deficit + long note: authentic
    assert_eq!(first["prediction"], 1);
}

#[tokio::test]
async fn test_predict_many_rows() {
    let records = json!([
        sample_record(),
        {"diagonal": 171.9, "height_left": 104.5, "height_right": 104.4,
         "margin_low": 5.9, "margin_up": 3.4, "length": 111.3},
        {"diagonal": 172.3, "height_left": 103.7, "height_right": 103.5,
         "margin_low": 4.1, "margin_up": 2.9, "length": 113.5, "comment": "extra keys are ignored"}
    ]);

    let (status, body) = send(app(), post_json(records)).await;
    assert_eq!(status, StatusCode::OK);
    assert_well_formed(&body, 3);
    assert_eq!(labels(&body)[1], 0);
}

#[tokio::test]
async fn test_predict_missing_columns() {
    let records = json!([{"diagonal": 171.8, "height_left": 104.2, "height_right": 104.3, "margin_low": 4.3}]);

    let (status, body) = send(app(), post_json(records)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["missing_columns"], json!(["margin_up", "length"]));
    assert_eq!(body["error"], "Missing required columns: margin_up, length");
}

#[tokio::test]
async fn test_predict_missing_values() {
    let mut record = sample_record();
    record["margin_low"] = Value::Null;

    let (status, body) = send(app(), post_json(json!([sample_record(), record]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["missing_values"], json!({"margin_low": 1}));
    assert!(body["error"].as_str().unwrap().contains("Missing values"));
}

#[tokio::test]
async fn test_predict_empty_list() {
    let (status, body) = send(app(), post_json(json!([]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_predict_non_numeric_value() {
    let mut record = sample_record();
    record["length"] = json!("long");

    let (status, body) = send(app(), post_json(json!([record]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("length"));
}

#[tokio::test]
async fn test_predict_malformed_json_is_structured() {
    let req = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(app(), req).await;
    assert!(status.is_client_error());
    assert_eq!(body["status"], status.as_u16());
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_predict_body_limit() {
    let config = Config {
        max_upload_bytes: 64,
        ..Config::default()
    };
    let app = create_router(AppState::new(shipped_models(), config));

    let records: Vec<Value> = (0..10).map(|_| sample_record()).collect();
    let (status, body) = send(app, post_json(json!(records))).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["status"], 413);
}

// ============================================================================
// POST /predict_file
// ============================================================================

#[tokio::test]
async fn test_predict_file_comma() {
    let csv = format!(
        "{}\n171.8,104.2,104.3,4.3,2.3,113.2\n171.9,104.5,104.4,5.9,3.4,111.3\n",
        HEADER
    );

    let (status, body) = send(app(), post_file("file", "billets.csv", csv.as_bytes())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filename"], "billets.csv");
    assert_well_formed(&body, 2);
    assert_eq!(labels(&body), vec![1, 0]);
}

#[tokio::test]
async fn test_predict_file_latin1_semicolon() {
    let mut csv = b"id;diagonal;height_left;height_right;margin_low;margin_up;length;remarque\n".to_vec();
    csv.extend_from_slice(b"1;171.8;104.2;104.3;4.3;2.3;113.2;tr\xE8s bon\n");
    csv.extend_from_slice(b"2;171.9;104.5;104.4;5.9;3.4;111.3;ab\xEEm\xE9\n");

    let (status, body) = send(app(), post_file("file", "billets.csv", &csv)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(labels(&body), vec![1, 0]);
}

#[tokio::test]
async fn test_predict_file_missing_columns() {
    let csv = "diagonal,height_left,margin_low,margin_up\n171.8,104.2,4.3,2.3\n";

    let (status, body) = send(app(), post_file("file", "partial.csv", csv.as_bytes())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["missing_columns"], json!(["height_right", "length"]));
}

#[tokio::test]
async fn test_predict_file_missing_values() {
    let csv = format!("{}\n171.8,104.2,104.3,,2.3,113.2\n171.8,104.2,104.3,4.3,2.3,113.2\n", HEADER);

    let (status, body) = send(app(), post_file("file", "holes.csv", csv.as_bytes())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["missing_values"], json!({"margin_low": 1}));
}

#[tokio::test]
async fn test_predict_file_short_row_is_missing_value() {
    let csv = format!("{}\n171.8,104.2,104.3,4.3,2.3\n", HEADER);

    let (status, body) = send(app(), post_file("file", "short.csv", csv.as_bytes())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["missing_values"], json!({"length": 1}));
}

#[tokio::test]
async fn test_predict_file_empty() {
    let (status, body) = send(app(), post_file("file", "empty.csv", b"")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Uploaded file is empty");
}

#[tokio::test]
async fn test_predict_file_not_csv() {
    let (status, body) = send(app(), post_file("file", "photo.png", b"\x89PNG\r\n\x1a\n\x00\x00")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Could not read the file as CSV"));
}

#[tokio::test]
async fn test_predict_file_requires_file_field() {
    let csv = format!("{}\n171.8,104.2,104.3,4.3,2.3,113.2\n", HEADER);

    let (status, body) = send(app(), post_file("document", "billets.csv", csv.as_bytes())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("'file'"));
}

#[tokio::test]
async fn test_predict_file_rejects_non_multipart() {
    let req = Request::builder()
        .method("POST")
        .uri("/predict_file")
        .header("content-type", "text/csv")
        .body(Body::from(HEADER))
        .unwrap();

    let (status, body) = send(app(), req).await;
    assert!(status.is_client_error());
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_exported_csv_round_trip_keeps_labels() {
    let plain = format!(
        "{}\n171.8,104.2,104.3,4.3,2.3,113.2\n171.9,104.5,104.4,5.9,3.4,111.3\n172.3,103.7,103.5,4.1,2.9,113.5\n",
        HEADER
    );
    let (_, before) = send(app(), post_file("file", "billets.csv", plain.as_bytes())).await;
    let before = labels(&before);

    // Dashboard export of the "counterfeit only" view: extra columns, subset of rows
    let exported = "diagonal,height_left,height_right,margin_low,margin_up,length,prediction,status,confidence\n\
                    171.9,104.5,104.4,5.9,3.4,111.3,0,Counterfeit,0.9999993\n";
    let (status, after) = send(app(), post_file("file", "predictions_billets.csv", exported.as_bytes())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(labels(&after), vec![before[1]]);
}
