use std::{collections::BTreeMap, collections::HashMap, time::Duration};

use campusgate_auth::SecurityLayer;
use campusgate_kernel::{
    backend_service::get_echo_service,
    helper_layers::function::{FnLayerMethod, Inner},
    CgBody, CgResponse,
};
use campusgate_model::{AccessRule, OidcRegistration, RoleMapperConfig, SecurityConfig};
use hyper::{
    header::{COOKIE, LOCATION, SET_COOKIE},
    Method, Request, StatusCode,
};

const IDP_PORT: u16 = 19281;

fn config() -> SecurityConfig {
    let idp = format!("http://127.0.0.1:{IDP_PORT}");
    SecurityConfig {
        registrations: BTreeMap::from([(
            "google".to_string(),
            OidcRegistration {
                client_id: "gateway".to_string(),
                client_secret: "gateway-secret".to_string(),
                authorization_uri: format!("{idp}/auth"),
                token_uri: format!("{idp}/token"),
                user_info_uri: format!("{idp}/userinfo"),
                scopes: vec!["openid".to_string(), "email".to_string()],
                redirect_uri: "http://localhost:8072/login/oauth2/code/google".to_string(),
            },
        )]),
        post_login_redirect: "http://localhost:8072/university".to_string(),
        access_rules: vec![AccessRule {
            method: Some("GET".to_string()),
            path: "/Proiect_TW/courses/getCourseById/{courseId}".to_string(),
            roles: vec!["ADMIN".to_string(), "STUDENT".to_string()],
        }],
        role_mappers: vec![
            RoleMapperConfig::StaticDomain {
                admin_emails: vec!["flaviu.petre09@gmail.com".to_string()],
                admin_domains: vec![],
                student_domains: vec!["@gmail.com".to_string()],
            },
            RoleMapperConfig::PolicyLookup {
                resource_id: "test-project-479314".to_string(),
                api_base: idp,
                role_table: campusgate_model::default_policy_roles(),
                fallback_role: Some("STUDENT".to_string()),
            },
        ],
        http_timeout_ms: 2000,
        ..Default::default()
    }
}

async fn send(layer: &SecurityLayer, method: Method, uri: &str, cookie: Option<&str>) -> CgResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    let req = builder.body(CgBody::empty()).expect("invalid request");
    layer.call(req, Inner::new(get_echo_service())).await
}

fn location(resp: &CgResponse) -> String {
    resp.headers().get(LOCATION).and_then(|v| v.to_str().ok()).expect("missing location").to_string()
}

/// Run a whole login, returns the `Set-Cookie` header of the session.
async fn login(layer: &SecurityLayer, code: &str) -> String {
    let resp = send(layer, Method::GET, "/oauth2/authorization/google", None).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    let authorize = url::Url::parse(&location(&resp)).expect("invalid authorize url");
    assert_eq!(authorize.path(), "/auth");
    let state = authorize.query_pairs().find(|(k, _)| k == "state").map(|(_, v)| v.into_owned()).expect("missing state");

    let resp = send(layer, Method::GET, &format!("/login/oauth2/code/google?code={code}&state={state}"), None).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "http://localhost:8072/university");
    let set_cookie = resp.headers().get(SET_COOKIE).and_then(|v| v.to_str().ok()).expect("missing cookie");
    assert!(set_cookie.contains("HttpOnly"));

    // a state is good for one login only
    let resp = send(layer, Method::GET, &format!("/login/oauth2/code/google?code={code}&state={state}"), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    set_cookie.to_string()
}

fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().expect("empty cookie").to_string()
}

#[tokio::test]
async fn test_login_and_authorize() {
    tokio::spawn(identity_provider());
    tokio::time::sleep(Duration::from_millis(200)).await;
    let layer = SecurityLayer::from_config(&config()).expect("invalid security config");

    // without a session
    let resp = send(&layer, Method::GET, "/Proiect_TW/courses/getCourseById/3", None).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/oauth2/authorization/google");
    let resp = send(&layer, Method::GET, "/login/help", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = send(&layer, Method::GET, "/oauth2/authorization/github", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // the policy service refuses, the student still logs in with the domain role
    let set_cookie = login(&layer, "ana").await;
    assert!(!set_cookie.contains("Secure"));
    let student = cookie_pair(&set_cookie);
    let resp = send(&layer, Method::GET, "/Proiect_TW/courses/getCourseById/3", Some(&student)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = send(&layer, Method::DELETE, "/Proiect_TW/courses/3", Some(&student)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let admin = cookie_pair(&login(&layer, "flaviu").await);
    let resp = send(&layer, Method::DELETE, "/Proiect_TW/courses/3", Some(&format!("theme=dark; {admin}"))).await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert_eq!(layer.sessions().len(), 2);
    let resp = send(&layer, Method::GET, "/Proiect_TW/courses/getCourseById/3", Some("CGSESSION=forged")).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let https = SecurityLayer::from_config(&SecurityConfig { secure_cookie: true, ..config() }).expect("invalid security config");
    assert!(login(&https, "ana").await.contains("; Secure"));
}

#[tokio::test]
async fn test_pending_logins_are_bounded() {
    let layer = SecurityLayer::from_config(&SecurityConfig { max_pending_logins: 2, ..config() }).expect("invalid security config");
    for _ in 0..2 {
        let resp = send(&layer, Method::GET, "/oauth2/authorization/google", None).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
    }
    let resp = send(&layer, Method::GET, "/oauth2/authorization/google", None).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(!resp.headers().contains_key(LOCATION));
}

async fn identity_provider() {
    use axum::{
        extract::Form,
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};

    async fn token(Form(form): Form<HashMap<String, String>>) -> Result<Json<Value>, StatusCode> {
        if form.get("grant_type").map(String::as_str) != Some("authorization_code") || form.get("client_secret").map(String::as_str) != Some("gateway-secret") {
            return Err(StatusCode::BAD_REQUEST);
        }
        let code = form.get("code").ok_or(StatusCode::BAD_REQUEST)?;
        Ok(Json(json!({ "access_token": format!("t-{code}"), "token_type": "Bearer", "expires_in": 3600 })))
    }
    async fn userinfo(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
        let email = match headers.get("authorization").and_then(|v| v.to_str().ok()) {
            Some("Bearer t-ana") => "ana@gmail.com",
            Some("Bearer t-flaviu") => "flaviu.petre09@gmail.com",
            _ => return Err(StatusCode::UNAUTHORIZED),
        };
        Ok(Json(json!({ "sub": email, "email": email, "email_verified": true })))
    }
    let app = Router::new()
        .route("/token", post(token))
        .route("/userinfo", get(userinfo))
        // every policy request is refused
        .fallback(|| async { (StatusCode::FORBIDDEN, "permission denied") });
    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{IDP_PORT}")).await.expect("fail to bind");
    axum::serve(listener, app).await.expect("fail to serve");
}
