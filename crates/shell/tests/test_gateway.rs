use std::{collections::BTreeMap, time::Duration};

use campusgate_shell::{
    config::{memory::Memory, startup_with_shutdown_signal},
    model::{CgGateway, CgHttpRoute, CgListener, CgPathRewrite, Config, PluginConfig, PluginInstanceId, SecurityConfig},
    server::RunningGateway,
};
use reqwest::{header::HeaderValue, redirect::Policy, StatusCode};
use serde_json::json;
use tokio_util::sync::CancellationToken;

const BACKEND_PORT: u16 = 19391;

fn config(port: u16) -> Config {
    let route = |name: &str, service: &str| CgHttpRoute {
        name: name.to_string(),
        prefix: format!("/Proiect_TW/{name}"),
        uri: format!("lb://{name}"),
        rewrite: CgPathRewrite::Regex {
            regex: format!("/Proiect_TW/{name}/(?<segment>.*)"),
            replacement: "/${segment}".to_string(),
        },
        request_headers: BTreeMap::from([("X-Service".to_string(), service.to_string())]),
        response_headers: BTreeMap::from([("X-Service".to_string(), service.to_string())]),
        ..Default::default()
    };
    let backend = format!("http://127.0.0.1:{BACKEND_PORT}");
    Config {
        gateway: CgGateway {
            name: "test-gateway".to_string(),
            listeners: vec![CgListener {
                name: "http".to_string(),
                ip: Some([127, 0, 0, 1].into()),
                port,
            }],
            ..Default::default()
        },
        routes: vec![route("courses", "courses-service"), route("students", "students-service"), route("enrollments", "enrollments-service")],
        services: BTreeMap::from([
            ("courses".to_string(), vec![backend.clone()]),
            ("students".to_string(), vec![backend.clone()]),
            ("enrollments".to_string(), vec![backend]),
        ]),
        plugins: vec![
            PluginConfig::new(PluginInstanceId::mono("cache-control")),
            PluginConfig::new(PluginInstanceId::mono("last-modified")),
            PluginConfig::new(PluginInstanceId::mono("role-access-guard")),
            PluginConfig::new(PluginInstanceId::mono("admin-key-guard")).with_config(json!({ "key": "secret-admin-key" })),
        ],
        security: None,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_gateway() {
    tokio::spawn(backend());
    let gateway = RunningGateway::create(config(19390), CancellationToken::new()).expect("fail to create gateway");
    tokio::time::sleep(Duration::from_millis(300)).await;
    let base = "http://127.0.0.1:19390";
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/Proiect_TW/courses/getCourseById/3")).send().await.expect("fail to send");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("x-service"), Some(&HeaderValue::from_static("courses-service")));
    assert_eq!(resp.text().await.expect("fail to read"), "GET /getCourseById/3 courses-service ");

    let resp = client.delete(format!("{base}/Proiect_TW/courses/3")).send().await.expect("fail to send");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let resp = client.delete(format!("{base}/Proiect_TW/courses/3")).header("X-Admin-Key", "secret-admin-key").send().await.expect("fail to send");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client.get(format!("{base}/Proiect_TW/students/getAll")).send().await.expect("fail to send");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("last-modified"));

    let resp = client.delete(format!("{base}/Proiect_TW/enrollments/2")).header("X-User-Role", "student").send().await.expect("fail to send");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let resp = client.get(format!("{base}/Proiect_TW/enrollments/all")).header("X-User-Role", "student").send().await.expect("fail to send");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("cache-control"), Some(&HeaderValue::from_static("public, max-age=3600")));
    assert_eq!(resp.text().await.expect("fail to read"), "GET /all enrollments-service STUDENT");

    let resp = client.get(format!("{base}/Proiect_TW/teachers/all")).send().await.expect("fail to send");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    gateway.shutdown().await;
    assert!(reqwest::Client::new().get(format!("{base}/Proiect_TW/courses/getAll")).send().await.is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_security_redirects_to_login() {
    let mut config = config(19392);
    config.security = Some(SecurityConfig {
        login_entry: Some("/oauth2/authorization/google".to_string()),
        ..Default::default()
    });
    let cancel = CancellationToken::new();
    let task = tokio::spawn(startup_with_shutdown_signal(Memory::new(config), cancel.clone()));
    tokio::time::sleep(Duration::from_millis(300)).await;

    let client = reqwest::Client::builder().redirect(Policy::none()).build().expect("fail to build client");
    let resp = client.get("http://127.0.0.1:19392/Proiect_TW/courses/getAll").send().await.expect("fail to send");
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get("location"), Some(&HeaderValue::from_static("/oauth2/authorization/google")));

    cancel.cancel();
    task.await.expect("join error").expect("gateway error");
}

#[test]
fn test_invalid_plugin_config() {
    let mut config = config(19393);
    config.plugins.push(PluginConfig::new(PluginInstanceId::mono("no-such-plugin")));
    let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().expect("fail to build runtime");
    let result = rt.block_on(async { RunningGateway::create(config, CancellationToken::new()) });
    assert!(result.is_err());
}

async fn backend() {
    use axum::{extract::Request, http::HeaderMap, Router};
    async fn reflect(headers: HeaderMap, request: Request) -> String {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or_default().to_string();
        format!("{} {} {} {}", request.method(), request.uri(), header("x-service"), header("x-verified-role"))
    }
    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{BACKEND_PORT}")).await.expect("fail to bind");
    axum::serve(listener, Router::new().fallback(reflect)).await.expect("fail to serve");
}
