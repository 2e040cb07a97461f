// tests/http_client_tests.rs

use liveknoxss_rs::adapters::http::ReqwestClient;
use liveknoxss_rs::config::ServiceSettings;
use liveknoxss_rs::core::dispatcher::build_request;
use liveknoxss_rs::core::error::Error;
use liveknoxss_rs::core::ports::HttpClient;
use liveknoxss_rs::core::verdict::Verdict;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service_at(server: &MockServer) -> ServiceSettings {
    ServiceSettings { endpoint: format!("{}/old/pro", server.uri()), ..Default::default() }
}

#[tokio::test]
async fn posts_the_scan_form_and_reads_the_verdict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/old/pro"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(header("x-webextension", "LiveKNOXSS v0.1.0"))
        .and(header("cookie", "wordpress_logged_in=abc"))
        .and(body_string_contains("target=https%3A%2F%2Fexample.com%2F"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<script>window.open('https://example.com/?q=%3Csvg%3E','_blank')</script>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let service = service_at(&server);
    let request = build_request(&service, "v0.1.0", "https://example.com/", "", "wordpress_logged_in=abc");
    let client = ReqwestClient::new(Duration::from_secs(5)).unwrap();
    let response = client.post(request).await.unwrap();

    assert_eq!(response.status, 200);
    let verdict = Verdict::from_response(&response, &service.endpoint, &service.login_path);
    assert_eq!(verdict.finding.as_deref(), Some("https://example.com/?q=%3Csvg%3E"));
    assert!(!verdict.login_required);
}

#[tokio::test]
async fn redirect_to_login_is_followed_and_detected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/old/pro"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/wp-login.php?redirect_to=%2Fold%2Fpro"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wp-login.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<form id=\"loginform\"></form>"))
        .mount(&server)
        .await;

    let service = service_at(&server);
    let request = build_request(&service, "v0.1.0", "https://example.com/", "", "");
    let client = ReqwestClient::new(Duration::from_secs(5)).unwrap();
    let response = client.post(request).await.unwrap();

    let verdict = Verdict::from_response(&response, &service.endpoint, &service.login_path);
    assert!(verdict.login_required);
    assert!(verdict.finding.is_none());
}

#[tokio::test]
async fn unreachable_endpoint_is_reported_as_such() {
    // Grab a free port and close it again so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}/old/pro", listener.local_addr().unwrap());
    drop(listener);

    let service = ServiceSettings { endpoint, ..Default::default() };
    let request = build_request(&service, "v0.1.0", "https://example.com/", "", "");
    let client = ReqwestClient::new(Duration::from_secs(2)).unwrap();
    let err = client.post(request).await.unwrap_err();
    assert!(matches!(err, Error::ServiceUnreachable(_)));
    assert!(err.is_unreachable());
}
