use actix_web::{
    App, HttpRequest, HttpResponse,
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    http::Method,
    middleware, web,
};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    config::WebhookConfig,
    error::WebhookError,
    ledger::{Donation, LedgerStore},
};

pub(crate) struct AppState {
    pub(crate) store: LedgerStore,
    pub(crate) verification_token: String,
}

impl AppState {
    pub(crate) fn from_config(config: &WebhookConfig) -> Self {
        Self {
            store: LedgerStore::new(&config.data_file, config.max_donations),
            verification_token: config.verification_token.clone(),
        }
    }
}

/// Form-encoded body: a single `data` field holding JSON
#[derive(Debug, Deserialize)]
pub(crate) struct WebhookForm {
    data: String,
}

/// Amount as a JSON number or a string with a leading numeric prefix
/// (`"5.00 USD"` reads as 5); anything else counts as zero
fn parse_amount(value: Option<&Value>) -> f64 {
    let amount = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => leading_number(s).unwrap_or(0.0),
        _ => 0.0,
    };
    if amount.is_finite() { amount } else { 0.0 }
}

/// Longest decimal prefix of `s` after leading whitespace
fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_digits = bytes[end..].iter().take_while(|b| b.is_ascii_digit()).count();
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = bytes[end + 1..].iter().take_while(|b| b.is_ascii_digit()).count();
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = bytes[exp..].iter().take_while(|b| b.is_ascii_digit()).count();
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }
    s[..end].parse().ok()
}

/// Text for a free-form payload field. Missing, null, empty, zero and false
/// read as absent; other scalars are stored in their JSON text form.
fn text_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) async fn receive_donation(
    state: web::Data<AppState>,
    form: web::Form<WebhookForm>,
) -> Result<HttpResponse, WebhookError> {
    let payload: Value = serde_json::from_str(&form.data).map_err(|err| {
        log::error!("invalid donation payload: {err}");
        WebhookError::BadRequest(err.to_string())
    })?;
    if payload.is_null() {
        log::error!("invalid donation payload: null");
        return Err(WebhookError::BadRequest("payload is null".to_string()));
    }

    // Only an exact string match passes; numbers, objects and absence do not
    let token_ok = matches!(
        payload.get("verification_token"),
        Some(Value::String(token)) if *token == state.verification_token
    );
    if !token_ok {
        log::warn!("rejected webhook call with bad verification token");
        return Err(WebhookError::Forbidden);
    }

    let donation = Donation {
        from: text_field(payload.get("from_name")).unwrap_or_else(|| "Anonymous".to_string()),
        amount: parse_amount(payload.get("amount")),
        message: text_field(payload.get("message")).unwrap_or_default(),
        timestamp: text_field(payload.get("timestamp")).unwrap_or_else(now_timestamp),
    };
    let (from, amount) = (donation.from.clone(), donation.amount);

    let ledger = state.store.record(donation).await.map_err(|err| {
        log::error!("failed to save ledger {}: {err}", state.store.path().display());
        WebhookError::Storage(err)
    })?;

    log::info!("Donation: ${amount} from {from} - Total: ${}", ledger.total);
    Ok(HttpResponse::Ok().content_type("text/plain; charset=utf-8").body("OK"))
}

/// Preflight gets an empty 200, everything else unmatched is a 404
pub(crate) async fn fallback(req: HttpRequest) -> HttpResponse {
    if *req.method() == Method::OPTIONS {
        HttpResponse::Ok().finish()
    } else {
        HttpResponse::NotFound()
            .content_type("text/plain; charset=utf-8")
            .body("Not Found")
    }
}

fn form_config() -> web::FormConfig {
    web::FormConfig::default().error_handler(|err, _req| {
        log::error!("unreadable webhook form: {err}");
        WebhookError::BadRequest(err.to_string()).into()
    })
}

/// CORS headers carried by every response
pub(crate) fn cors_headers() -> middleware::DefaultHeaders {
    middleware::DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Methods", "POST, OPTIONS"))
        .add(("Access-Control-Allow-Headers", "Content-Type"))
}

pub(crate) fn build_app(
    state: web::Data<AppState>,
    path: impl Into<String>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .app_data(form_config())
        .wrap(cors_headers())
        .service(
            web::resource(path.into())
                .route(web::post().to(receive_donation))
                .default_service(web::to(fallback)),
        )
        .default_service(web::to(fallback))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test as awtest};
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::ledger::Ledger;

    const TOKEN: &str = "test-token";
    const PATH: &str = "/wolcen/api/webhook";

    fn test_state(dir: &TempDir) -> web::Data<AppState> {
        web::Data::new(AppState {
            store: LedgerStore::new(dir.path().join("earnings.json"), 50),
            verification_token: TOKEN.to_string(),
        })
    }

    fn donation_request(payload: Value) -> awtest::TestRequest {
        awtest::TestRequest::post()
            .uri(PATH)
            .set_form([("data", payload.to_string())])
    }

    fn read_ledger(dir: &TempDir) -> Ledger {
        let raw = std::fs::read_to_string(dir.path().join("earnings.json")).unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn amount_parsing() {
        assert_eq!(parse_amount(Some(&json!(5))), 5.0);
        assert_eq!(parse_amount(Some(&json!("3.50"))), 3.5);
        assert_eq!(parse_amount(Some(&json!("5.00 USD"))), 5.0);
        assert_eq!(parse_amount(Some(&json!("  -2.5e1x"))), -25.0);
        assert_eq!(parse_amount(Some(&json!(".75"))), 0.75);
        assert_eq!(parse_amount(Some(&json!("3e"))), 3.0);
        assert_eq!(parse_amount(Some(&json!("lots"))), 0.0);
        assert_eq!(parse_amount(Some(&json!("-"))), 0.0);
        assert_eq!(parse_amount(Some(&json!(true))), 0.0);
        assert_eq!(parse_amount(Some(&json!(null))), 0.0);
        assert_eq!(parse_amount(None), 0.0);
    }

    #[test]
    fn text_fields_fall_back_on_falsy_values() {
        assert_eq!(text_field(Some(&json!("Kai"))), Some("Kai".to_string()));
        assert_eq!(text_field(Some(&json!(42))), Some("42".to_string()));
        assert_eq!(text_field(Some(&json!(true))), Some("true".to_string()));
        assert_eq!(text_field(Some(&json!(""))), None);
        assert_eq!(text_field(Some(&json!(0))), None);
        assert_eq!(text_field(Some(&json!(false))), None);
        assert_eq!(text_field(Some(&json!(null))), None);
        assert_eq!(text_field(None), None);
    }

    #[test]
    fn timestamp_is_rfc3339_millis_utc() {
        let ts = now_timestamp();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
        // "YYYY-MM-DDTHH:MM:SS.mmmZ"
        assert_eq!(ts.len(), 24);
    }

    #[actix_web::test]
    async fn valid_donation_updates_ledger() {
        let dir = TempDir::new().unwrap();
        let app = awtest::init_service(build_app(test_state(&dir), PATH)).await;

        let req = donation_request(json!({
            "verification_token": TOKEN,
            "amount": "5.00",
            "message": "nice game",
            "timestamp": "2024-05-01T12:00:00Z",
        }))
        .to_request();
        let resp = awtest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
        let body = awtest::read_body(resp).await;
        assert_eq!(body.as_ref(), b"OK");

        let ledger = read_ledger(&dir);
        assert_eq!(ledger.total, 5.0);
        assert_eq!(ledger.donations.len(), 1);
        let entry = &ledger.donations[0];
        assert_eq!(entry.from, "Anonymous");
        assert_eq!(entry.amount, 5.0);
        assert_eq!(entry.message, "nice game");
        assert_eq!(entry.timestamp, "2024-05-01T12:00:00Z");
    }

    #[actix_web::test]
    async fn totals_accumulate_with_rounding() {
        let dir = TempDir::new().unwrap();
        let app = awtest::init_service(build_app(test_state(&dir), PATH)).await;

        for amount in [json!(0.1), json!(0.2)] {
            let req = donation_request(json!({
                "verification_token": TOKEN,
                "amount": amount,
                "from_name": "Kai",
            }))
            .to_request();
            assert_eq!(awtest::call_service(&app, req).await.status(), StatusCode::OK);
        }

        let ledger = read_ledger(&dir);
        assert_eq!(ledger.total, 0.3);
        assert_eq!(ledger.donations[1].from, "Kai");
        assert!(!ledger.donations[1].timestamp.is_empty());
    }

    #[actix_web::test]
    async fn wrong_or_missing_token_is_forbidden() {
        let dir = TempDir::new().unwrap();
        let app = awtest::init_service(build_app(test_state(&dir), PATH)).await;

        for payload in [
            json!({ "verification_token": "nope", "amount": 5 }),
            json!({ "amount": 5 }),
            json!({ "verification_token": 123, "amount": 5 }),
            json!({ "verification_token": [TOKEN], "amount": 5 }),
            json!([TOKEN]),
        ] {
            let resp = awtest::call_service(&app, donation_request(payload).to_request()).await;
            assert_eq!(resp.status(), StatusCode::FORBIDDEN);
            assert_eq!(awtest::read_body(resp).await.as_ref(), b"Forbidden");
        }
        assert!(!dir.path().join("earnings.json").exists());
    }

    #[actix_web::test]
    async fn forbidden_call_leaves_existing_ledger_byte_identical() {
        let dir = TempDir::new().unwrap();
        let seeded = r#"{"total":12.5,"donations":[{"from":"A","amount":12.5,"message":"","timestamp":"t"}]}"#;
        std::fs::write(dir.path().join("earnings.json"), seeded).unwrap();
        let app = awtest::init_service(build_app(test_state(&dir), PATH)).await;

        let req = donation_request(json!({ "verification_token": "nope", "amount": 5 })).to_request();
        assert_eq!(awtest::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let raw = std::fs::read_to_string(dir.path().join("earnings.json")).unwrap();
        assert_eq!(raw, seeded);
    }

    #[actix_web::test]
    async fn non_string_fields_are_coerced() {
        let dir = TempDir::new().unwrap();
        let app = awtest::init_service(build_app(test_state(&dir), PATH)).await;

        let req = donation_request(json!({
            "verification_token": TOKEN,
            "amount": "5.00 USD",
            "from_name": 42,
            "message": 0,
        }))
        .to_request();
        assert_eq!(awtest::call_service(&app, req).await.status(), StatusCode::OK);

        let ledger = read_ledger(&dir);
        assert_eq!(ledger.total, 5.0);
        assert_eq!(ledger.donations[0].from, "42");
        assert_eq!(ledger.donations[0].message, "");
    }

    #[actix_web::test]
    async fn malformed_bodies_are_bad_requests() {
        let dir = TempDir::new().unwrap();
        let app = awtest::init_service(build_app(test_state(&dir), PATH)).await;

        let not_json = awtest::TestRequest::post()
            .uri(PATH)
            .set_form([("data", "{broken")])
            .to_request();
        let resp = awtest::call_service(&app, not_json).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Methods").unwrap(),
            "POST, OPTIONS"
        );

        let no_data_field = awtest::TestRequest::post()
            .uri(PATH)
            .set_form([("other", "x")])
            .to_request();
        let resp = awtest::call_service(&app, no_data_field).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let null_payload = awtest::TestRequest::post()
            .uri(PATH)
            .set_form([("data", "null")])
            .to_request();
        let resp = awtest::call_service(&app, null_payload).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let json_body = awtest::TestRequest::post()
            .uri(PATH)
            .set_json(json!({ "verification_token": TOKEN }))
            .to_request();
        let resp = awtest::call_service(&app, json_body).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        assert!(!dir.path().join("earnings.json").exists());
    }

    #[actix_web::test]
    async fn other_paths_and_methods_are_not_found() {
        let dir = TempDir::new().unwrap();
        let app = awtest::init_service(build_app(test_state(&dir), PATH)).await;

        let get = awtest::TestRequest::get().uri(PATH).to_request();
        assert_eq!(awtest::call_service(&app, get).await.status(), StatusCode::NOT_FOUND);

        let other = awtest::TestRequest::post().uri("/elsewhere").to_request();
        let resp = awtest::call_service(&app, other).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
    }

    #[actix_web::test]
    async fn preflight_returns_ok_with_cors_headers() {
        let dir = TempDir::new().unwrap();
        let app = awtest::init_service(build_app(test_state(&dir), PATH)).await;

        for uri in [PATH, "/anything"] {
            let req = awtest::TestRequest::default()
                .method(Method::OPTIONS)
                .uri(uri)
                .to_request();
            let resp = awtest::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let headers = resp.headers();
            assert_eq!(headers.get("Access-Control-Allow-Origin").unwrap(), "*");
            assert_eq!(
                headers.get("Access-Control-Allow-Methods").unwrap(),
                "POST, OPTIONS"
            );
            assert_eq!(
                headers.get("Access-Control-Allow-Headers").unwrap(),
                "Content-Type"
            );
        }
    }

    #[actix_web::test]
    async fn history_never_exceeds_cap() {
        let dir = TempDir::new().unwrap();
        let app = awtest::init_service(build_app(test_state(&dir), PATH)).await;

        for i in 0..55 {
            let req = donation_request(json!({
                "verification_token": TOKEN,
                "amount": 1,
                "from_name": format!("donor {i}"),
            }))
            .to_request();
            assert_eq!(awtest::call_service(&app, req).await.status(), StatusCode::OK);
        }

        let ledger = read_ledger(&dir);
        assert_eq!(ledger.donations.len(), 50);
        assert_eq!(ledger.donations[0].from, "donor 5");
        assert_eq!(ledger.total, 55.0);
    }

    #[actix_web::test]
    async fn storage_failure_is_internal_error() {
        let dir = TempDir::new().unwrap();
        let state = web::Data::new(AppState {
            store: LedgerStore::new(dir.path().join("missing").join("earnings.json"), 50),
            verification_token: TOKEN.to_string(),
        });
        let app = awtest::init_service(build_app(state, PATH)).await;

        let req = donation_request(json!({ "verification_token": TOKEN, "amount": 1 })).to_request();
        let resp = awtest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn unreadable_ledger_is_internal_error_and_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("earnings.json");
        std::fs::write(&path, "{\"total\": 100.0, \"donations\": [").unwrap();
        let app = awtest::init_service(build_app(test_state(&dir), PATH)).await;

        let req = donation_request(json!({ "verification_token": TOKEN, "amount": 1 })).to_request();
        let resp = awtest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "{\"total\": 100.0, \"donations\": ["
        );
    }
}
