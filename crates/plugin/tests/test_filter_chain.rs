use std::{
    convert::Infallible,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use campusgate_kernel::{backend_service::get_echo_service, utils::fold_layers, ArcHyperService};
use campusgate_plugin::{
    BoxError, CgBody, CgRequest, CgResponse, Inner, Plugin, PluginConfig, PluginInstanceId, PluginInstanceName, PluginRepository,
};
use hyper::{
    header::{HeaderValue, CACHE_CONTROL, LAST_MODIFIED},
    service::service_fn,
    Method, Request, Response, StatusCode,
};
use serde_json::json;

fn prelude_chain() -> Vec<PluginConfig> {
    // deliberately not in chain order
    vec![
        PluginConfig::new(PluginInstanceId::mono("cache-control")),
        PluginConfig::new(PluginInstanceId::mono("role-access-guard")),
        PluginConfig::new(PluginInstanceId::mono("last-modified")),
        PluginConfig::new(PluginInstanceId::mono("admin-key-guard")).with_config(json!({ "key": "secret-admin-key" })),
    ]
}

fn counting_backend(counter: Arc<AtomicUsize>) -> ArcHyperService {
    ArcHyperService::new(service_fn(move |_req: CgRequest| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Infallible>(Response::new(CgBody::full("ok")))
        }
    }))
}

fn gateway(counter: Arc<AtomicUsize>) -> ArcHyperService {
    let layers = PluginRepository::global().create_chain(prelude_chain()).expect("fail to create chain");
    fold_layers(layers.iter(), counting_backend(counter))
}

async fn send(service: &ArcHyperService, method: Method, path: &str, headers: &[(&str, &str)]) -> CgResponse {
    let mut builder = Request::builder().method(method).uri(path);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    Inner::new(service.clone()).call(builder.body(CgBody::empty()).expect("invalid request")).await
}

#[tokio::test]
async fn test_admin_key_rejects_before_backend() {
    let counter = Arc::new(AtomicUsize::new(0));
    let service = gateway(counter.clone());
    for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
        let resp = send(&service, method, "/Proiect_TW/courses/7", &[("X-Admin-Key", "guess")]).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
    assert_eq!(counter.load(Ordering::SeqCst), 0);

    let resp = send(&service, Method::DELETE, "/Proiect_TW/courses/7", &[("X-Admin-Key", "secret-admin-key")]).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_role_access_on_enrollments() {
    let counter = Arc::new(AtomicUsize::new(0));
    let service = gateway(counter.clone());

    let resp = send(&service, Method::DELETE, "/Proiect_TW/enrollments/5", &[("X-User-Role", "STUDENT")]).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let resp = send(&service, Method::GET, "/Proiect_TW/enrollments/5", &[]).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let resp = send(&service, Method::GET, "/Proiect_TW/enrollments/5", &[("X-User-Role", "guest")]).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(counter.load(Ordering::SeqCst), 0);

    for method in [Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
        let resp = send(&service, method, "/Proiect_TW/enrollments/5", &[("X-User-Role", "admin")]).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
    assert_eq!(counter.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_response_decorators() {
    let counter = Arc::new(AtomicUsize::new(0));
    let service = gateway(counter);

    let resp = send(&service, Method::GET, "/Proiect_TW/enrollments/5", &[("X-User-Role", "student")]).await;
    assert_eq!(resp.headers().get(CACHE_CONTROL), Some(&HeaderValue::from_static("public, max-age=3600")));
    assert!(!resp.headers().contains_key(LAST_MODIFIED));

    let resp = send(&service, Method::GET, "/Proiect_TW/students/getAll", &[]).await;
    assert!(resp.headers().contains_key(LAST_MODIFIED));
    assert!(!resp.headers().contains_key(CACHE_CONTROL));
}

#[tokio::test]
async fn test_rejections_are_not_decorated() {
    let counter = Arc::new(AtomicUsize::new(0));
    let configs = vec![
        PluginConfig::new(PluginInstanceId::mono("last-modified")).with_config(json!({ "prefix": "/Proiect_TW" })),
        PluginConfig::new(PluginInstanceId::mono("cache-control")).with_config(json!({ "prefix": "/Proiect_TW" })),
        PluginConfig::new(PluginInstanceId::mono("role-access-guard")),
    ];
    let layers = PluginRepository::global().create_chain(configs).expect("fail to create chain");
    let service = fold_layers(layers.iter(), counting_backend(counter.clone()));

    let resp = send(&service, Method::GET, "/Proiect_TW/enrollments/1", &[]).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(!resp.headers().contains_key(LAST_MODIFIED));
    assert!(!resp.headers().contains_key(CACHE_CONTROL));
    assert_eq!(counter.load(Ordering::SeqCst), 0);

    let resp = send(&service, Method::GET, "/Proiect_TW/enrollments/1", &[("X-User-Role", "STUDENT")]).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key(LAST_MODIFIED));
    assert!(resp.headers().contains_key(CACHE_CONTROL));
}

/// Appends its mark to the `x-trace` request header.
struct Marker<const ORDER: i32> {
    mark: String,
}

impl<const ORDER: i32> Plugin for Marker<ORDER> {
    const CODE: &'static str = if ORDER < 0 { "marker-early" } else { "marker-late" };
    const ORDER: i32 = ORDER;

    async fn call(&self, mut req: CgRequest, inner: Inner) -> Result<CgResponse, BoxError> {
        req.headers_mut().append("x-trace", HeaderValue::from_str(&self.mark)?);
        Ok(inner.call(req).await)
    }

    fn create(plugin_config: PluginConfig) -> Result<Self, BoxError> {
        let mark = plugin_config.spec.get("mark").and_then(|m| m.as_str()).ok_or("missing mark")?;
        Ok(Self { mark: mark.to_string() })
    }
}

#[tokio::test]
async fn test_chain_order_is_stable() {
    let repo = PluginRepository::new();
    repo.register::<Marker<{ -1 }>>();
    repo.register::<Marker<10>>();
    let marker = |code: &'static str, mark: &str| PluginConfig::new(PluginInstanceId::new(code, PluginInstanceName::named(mark))).with_config(json!({ "mark": mark }));
    let configs = vec![marker("marker-late", "late-1"), marker("marker-early", "early-1"), marker("marker-late", "late-2"), marker("marker-early", "early-2")];
    let layers = repo.create_chain(configs).expect("fail to create chain");
    let service = fold_layers(layers.iter(), get_echo_service());

    let resp = send(&service, Method::GET, "/", &[]).await;
    let trace = resp.headers().get_all("x-echo-x-trace").iter().filter_map(|v| v.to_str().ok()).collect::<Vec<_>>();
    assert_eq!(trace, vec!["early-1", "early-2", "late-1", "late-2"]);
}

#[test]
fn test_unknown_plugin_is_an_error() {
    let repo = PluginRepository::new();
    assert!(repo.create_chain([PluginConfig::new(PluginInstanceId::mono("admin-key-guard"))]).is_err());
    repo.register_prelude();
    // registered, but its key is required
    assert!(repo.create_chain([PluginConfig::new(PluginInstanceId::mono("admin-key-guard"))]).is_err());
    let codes = repo.plugin_list().into_iter().map(|(code, _)| code).collect::<Vec<_>>();
    assert_eq!(codes, vec!["admin-key-guard", "role-access-guard", "last-modified", "cache-control"]);
}
