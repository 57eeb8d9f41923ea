use std::{net::SocketAddr, str::FromStr, time::Duration};

use campusgate_kernel::{
    listener::CgListen,
    service::{
        registry::ServiceRegistry,
        route_table::{PathRewrite, Route, RouteTable, Target},
        Gateway,
    },
};
use hyper::{
    header::{HeaderMap, HeaderValue},
    Uri,
};
use regex::Regex;
use tokio_util::sync::CancellationToken;

const GATEWAY_PORT: u16 = 19180;
const COURSES_PORT: u16 = 19181;

#[tokio::test]
async fn test_routing() {
    tokio::spawn(gateway());
    tokio::spawn(axum_server());
    // wait for startup
    tokio::time::sleep(Duration::from_millis(200)).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("http://127.0.0.1:{GATEWAY_PORT}/Proiect_TW/courses/getCourseById/3?verbose=true")).send().await.expect("fail to send");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert_eq!(resp.headers().get("x-service").and_then(|v| v.to_str().ok()), Some("courses-service"));
    let text = resp.text().await.expect("fail to get text");
    assert_eq!(text, "/getCourseById/3?verbose=true courses-service 127.0.0.1");

    let resp = client.get(format!("http://127.0.0.1:{GATEWAY_PORT}/Proiect_TW/unknown/1")).send().await.expect("fail to send");
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

    let resp = client.get(format!("http://127.0.0.1:{GATEWAY_PORT}/Proiect_TW/students/countStudents")).send().await.expect("fail to send");
    assert_eq!(resp.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);

    let resp = client.get(format!("http://127.0.0.1:{GATEWAY_PORT}/Proiect_TW/slow/sleep")).send().await.expect("fail to send");
    assert_eq!(resp.status(), reqwest::StatusCode::GATEWAY_TIMEOUT);
}

async fn gateway() {
    let cancel = CancellationToken::default();
    let mut service_header = HeaderMap::new();
    service_header.insert("x-service", HeaderValue::from_static("courses-service"));
    let routes = RouteTable::new([
        Route::new("courses", "/Proiect_TW/courses", Target::Balanced("courses".into()))
            .rewrite(PathRewrite::Regex {
                regex: Regex::new("/Proiect_TW/courses/(?<segment>.*)").expect("invalid regex"),
                replacement: "/${segment}".into(),
            })
            .request_headers(service_header.clone())
            .response_headers(service_header),
        Route::new("students", "/Proiect_TW/students", Target::Balanced("students".into())),
        Route::new("slow", "/Proiect_TW/slow", Target::Direct(Uri::from_str(&format!("http://127.0.0.1:{COURSES_PORT}")).expect("invalid uri"))).timeout(Some(Duration::from_millis(100))),
    ]);
    let registry = ServiceRegistry::new([
        ("courses".to_string(), vec![Uri::from_str(&format!("http://127.0.0.1:{COURSES_PORT}")).expect("invalid uri")]),
        ("students".to_string(), vec![]),
    ]);
    let gateway = Gateway::builder("test_routing").routes(routes).registry(registry).build();
    let addr = SocketAddr::from_str(&format!("127.0.0.1:{GATEWAY_PORT}")).expect("invalid host");
    let listener = CgListen::new(addr, gateway.as_service(), cancel);
    listener.listen().await.expect("fail to listen");
}

async fn axum_server() {
    use axum::{extract::Request, http::HeaderMap, routing::get, Router};
    async fn reflect(headers: HeaderMap, request: Request) -> String {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or_default().to_string();
        format!("{} {} {}", request.uri(), header("x-service"), header("x-forwarded-for"))
    }
    async fn sleep() -> &'static str {
        tokio::time::sleep(Duration::from_secs(2)).await;
        "too late"
    }
    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{COURSES_PORT}")).await.expect("fail to bind");
    let app = Router::new().route("/sleep", get(sleep)).route("/getCourseById/{id}", get(reflect));
    axum::serve(listener, app).await.expect("fail to serve");
}
