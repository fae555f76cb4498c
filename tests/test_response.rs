use wireline::http::response::{StatusCode, default_headers};

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
    assert_eq!(StatusCode::Other(503).as_u16(), 503);
}

#[test]
fn test_status_code_reason_phrase() {
    assert_eq!(StatusCode::Ok.reason_phrase(), Some("OK"));
    assert_eq!(StatusCode::BadRequest.reason_phrase(), Some("Bad Request"));
    assert_eq!(
        StatusCode::InternalServerError.reason_phrase(),
        Some("Internal Server Error")
    );
    assert_eq!(StatusCode::Other(418).reason_phrase(), None);
}

#[test]
fn test_reason_phrase_matches_numerically() {
    assert_eq!(StatusCode::Other(200).reason_phrase(), Some("OK"));
    assert_eq!(StatusCode::Other(400).reason_phrase(), Some("Bad Request"));
}

#[test]
fn test_default_headers_contents() {
    let headers = default_headers(128);

    assert_eq!(headers.len(), 3);
    assert_eq!(headers.get("content-length"), Some("128"));
    assert_eq!(headers.get("connection"), Some("close"));
    assert_eq!(headers.get("content-type"), Some("text/plain"));
}
