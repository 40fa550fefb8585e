use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
    HttpResponse,
};
use serde_json::Value;

/// Runs a single request against an app assembled by `configure` and returns the status
/// and body, whether the request succeeded or was rejected by a handler or middleware.
pub async fn call_endpoint<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
            (status, body)
        },
        Err(e) => {
            let res = HttpResponse::from_error(e);
            let status = res.status();
            let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
            (status, body)
        },
    }
}

pub async fn post_json<F>(path: &str, body: Value, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    call_endpoint(TestRequest::post().uri(path).set_json(body), configure).await
}

pub async fn post_raw<F>(
    path: &str,
    body: Vec<u8>,
    headers: Vec<(&'static str, String)>,
    configure: F,
) -> (StatusCode, String)
where
    F: FnOnce(&mut ServiceConfig),
{
    let mut req = TestRequest::post().uri(path).set_payload(body);
    for (name, value) in headers {
        req = req.insert_header((name, value));
    }
    call_endpoint(req, configure).await
}

pub async fn get_path<F>(path: &str, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    call_endpoint(TestRequest::get().uri(path), configure).await
}

/// Parses a response body that is expected to be JSON.
pub fn json_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|e| panic!("Response body is not JSON ({e}): {body}"))
}
