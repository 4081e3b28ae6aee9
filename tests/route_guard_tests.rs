//! Gateway integration tests driven over a real socket: guard redirects,
//! role gating, cookie issuance and the security response headers.

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use medhire::config::SessionConfig;
use medhire::server::{app, AppState};

// Mount the gateway on an ephemeral localhost port; the task is dropped
// with the runtime at the end of each test.
async fn start_gateway() -> SocketAddr {
    let listener = TcpListener::bind(("127.0.0.1", 0)).await.expect("bind 127.0.0.1:0");
    let addr = listener.local_addr().expect("local addr");
    let state = AppState { config: SessionConfig::development() };
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app(state)).await {
            eprintln!("gateway task error: {e:?}");
        }
    });
    addr
}

async fn raw_request(addr: SocketAddr, raw: String) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    stream.write_all(raw.as_bytes()).await.expect("write request");
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.expect("read response");
    String::from_utf8_lossy(&buf).to_string()
}

fn get(path: &str, cookie: Option<&str>) -> String {
    let mut req = format!("GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n", path);
    if let Some(c) = cookie {
        req.push_str(&format!("Cookie: {}\r\n", c));
    }
    req.push_str("\r\n");
    req
}

fn post_json(path: &str, body: &str) -> String {
    format!(
        "POST {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        path,
        body.len(),
        body
    )
}

#[tokio::test]
async fn health_route_carries_security_headers() {
    let addr = start_gateway().await;
    let resp = raw_request(addr, get("/", None)).await;
    assert!(resp.starts_with("HTTP/1.1 200"), "unexpected response: {resp}");
    assert!(resp.contains("medhire gateway ok"));
    assert!(resp.contains("x-frame-options: DENY"));
    assert!(resp.contains("x-content-type-options: nosniff"));
    assert!(resp.contains("x-xss-protection: 1; mode=block"));
    assert!(resp.contains("referrer-policy: strict-origin-when-cross-origin"));
}

#[tokio::test]
async fn unauthenticated_protected_route_redirects_to_login() {
    let addr = start_gateway().await;
    let resp = raw_request(addr, get("/EmployerDashboard", None)).await;
    assert!(resp.starts_with("HTTP/1.1 307"), "unexpected response: {resp}");
    assert!(resp.contains("location: /EmployerLogin?redirect=%2FEmployerDashboard"));
    // redirects are stamped too
    assert!(resp.contains("x-frame-options: DENY"));

    let resp = raw_request(addr, get("/nurseProfile", None)).await;
    assert!(resp.contains("location: /nurseLogin?redirect=%2FnurseProfile"));
}

#[tokio::test]
async fn role_gating_on_protected_routes() {
    let addr = start_gateway().await;
    let nurse = "authToken=tok123; userRole=Nurse; userEmail=n%40example.com";
    let employer = "authToken=tok456; userRole=Employer; userEmail=e%40example.com";

    let resp = raw_request(addr, get("/joblist", Some(nurse))).await;
    assert!(resp.starts_with("HTTP/1.1 200"), "unexpected response: {resp}");
    assert!(resp.contains("joblist"));

    let resp = raw_request(addr, get("/EmployerDashboard", Some(nurse))).await;
    assert!(resp.starts_with("HTTP/1.1 307"), "nurse must not enter employer routes: {resp}");
    assert!(resp.contains("location: /EmployerLogin?redirect=%2FEmployerDashboard"));

    let resp = raw_request(addr, get("/EmployerDashboard", Some(employer))).await;
    assert!(resp.starts_with("HTTP/1.1 200"), "unexpected response: {resp}");
    assert!(resp.contains("employer_dashboard"));
}

#[tokio::test]
async fn corrupted_role_cookie_is_bounced() {
    let addr = start_gateway().await;
    let corrupted = "authToken=tok123; userRole=Administrator";
    let resp = raw_request(addr, get("/Applicants", Some(corrupted))).await;
    assert!(resp.starts_with("HTTP/1.1 307"), "unexpected response: {resp}");
    assert!(resp.contains("location: /EmployerLogin?redirect=%2FApplicants"));
}

#[tokio::test]
async fn login_issues_the_cookie_triple_and_logout_expires_it() {
    let addr = start_gateway().await;
    let body = r#"{"token":"tok123","role":"Employer","email":"e@example.com"}"#;
    let resp = raw_request(addr, post_json("/login", body)).await;
    assert!(resp.starts_with("HTTP/1.1 200"), "unexpected response: {resp}");
    assert!(resp.contains("set-cookie: authToken=tok123;"));
    assert!(resp.contains("set-cookie: userRole=Employer;"));
    assert!(resp.contains("set-cookie: userEmail=e%40example.com;"));
    assert!(resp.contains("Path=/; SameSite=Strict"));

    let resp = raw_request(addr, post_json("/logout", "{}")).await;
    assert!(resp.starts_with("HTTP/1.1 200"), "unexpected response: {resp}");
    for name in ["authToken", "userRole", "userEmail"] {
        assert!(
            resp.contains(&format!("set-cookie: {}=deleted; Expires=Thu, 01 Jan 1970", name)),
            "missing expired cookie for {name}: {resp}"
        );
    }
}

#[tokio::test]
async fn login_with_unknown_role_is_rejected() {
    let addr = start_gateway().await;
    let body = r#"{"token":"tok123","role":"Admin","email":"a@example.com"}"#;
    let resp = raw_request(addr, post_json("/login", body)).await;
    assert!(resp.starts_with("HTTP/1.1 400"), "unexpected response: {resp}");
    assert!(!resp.contains("set-cookie:"));
}
