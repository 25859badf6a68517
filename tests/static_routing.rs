//! Asset port behaviour over real HTTP.

mod common;

use common::{Site, TestServer};
use devserve::config::RouteAction;
use reqwest::{header, redirect, StatusCode};

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn rewrite_and_default_mapping_serve_files() {
    let site = Site::new()
        .file("help/install", "install guide")
        .file("public/other", "other page");
    let mut config = site.config();
    config.rewrite_rules.insert("^/docs/(.+)$".into(), "help/$1".into());
    let server = TestServer::start(&config).await;

    let response = client().get(server.asset_url("/docs/install")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "no-cache, no-store, max-age=0"
    );
    assert_eq!(response.text().await.unwrap(), "install guide");

    let response = client().get(server.asset_url("/other")).send().await.unwrap();
    assert_eq!(response.text().await.unwrap(), "other page");
}

#[tokio::test]
async fn first_declared_rule_wins() {
    let site = Site::new()
        .file("first.txt", "first")
        .file("second.txt", "second");
    let mut config = site.config();
    config.rewrite_rules.insert("page/(.*)".into(), "first.txt".into());
    config.rewrite_rules.insert("page/x".into(), "second.txt".into());
    let server = TestServer::start(&config).await;

    let body = client()
        .get(server.asset_url("/page/x"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "first");
}

#[tokio::test]
async fn template_rule_renders() {
    let site = Site::new().file("index.html", "static");
    let mut config = site.config();
    config
        .template_rules
        .insert("$".into(), RouteAction::render(|| "<h1>rendered</h1>".to_string()));
    config.rewrite_rules.insert("$".into(), "index.html".into());
    let server = TestServer::start(&config).await;

    let response = client().get(server.asset_url("/")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache, no-store, max-age=0");
    assert_eq!(response.text().await.unwrap(), "<h1>rendered</h1>");
}

#[tokio::test]
async fn missing_file_is_404_and_uncached() {
    let site = Site::new();
    let server = TestServer::start(&site.config()).await;

    let response = client().head(server.asset_url("/nope.js")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache, no-store, max-age=0");
}

#[tokio::test]
async fn post_skips_routing() {
    let site = Site::new().file("public/form", "should not be served by POST");
    let server = TestServer::start(&site.config()).await;

    let response = client().post(server.asset_url("/form")).send().await.unwrap();
    assert!(response.headers().get(header::CACHE_CONTROL).is_none());
}

#[tokio::test]
async fn directory_redirect_points_at_requested_url() {
    let site = Site::new().file("public/docs/index.html", "docs index");
    let server = TestServer::start(&site.config()).await;

    let response = client().get(server.asset_url("/docs")).send().await.unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(response.headers()[header::LOCATION], "/docs/");

    let body = client()
        .get(server.asset_url("/docs/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "docs index");
}

#[tokio::test]
async fn favicon_is_served_from_memory() {
    let site = Site::new().file("public/images/favicon.ico", "ICO");
    let server = TestServer::start(&site.config()).await;

    let response = client().get(server.asset_url("/favicon.ico")).send().await.unwrap();
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/x-icon");
    assert_eq!(response.headers()[header::CACHE_CONTROL], "public, max-age=86400");
    assert_eq!(response.text().await.unwrap(), "ICO");
}

#[tokio::test]
async fn config_file_drives_routing() {
    let site = Site::new().file("help/faq.html", "faq");
    let toml = format!(
        r#"
asset_port = 0
notify_port = 0
root_dir = "{}"

[rewrite_rules]
"faq" = "help/faq.html"
"#,
        site.path().display().to_string().replace('\\', "/")
    );
    let config_path = site.path().join("devserve.toml");
    std::fs::write(&config_path, toml).unwrap();

    let config = devserve::config::load_config(&config_path).unwrap();
    let server = TestServer::start(&config).await;

    let body = client()
        .get(server.asset_url("/faq?ref=nav"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "faq");
}

#[tokio::test]
async fn spaced_base_dir_serves_files() {
    let site = Site::new().file("my site/index.html", "spaced base");
    let mut config = site.config();
    config.base_dir = "my site".into();
    let server = TestServer::start(&config).await;

    let response = client().get(server.asset_url("/index.html")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "spaced base");
}

#[tokio::test]
async fn rewrite_targets_needing_encoding_are_served() {
    let site = Site::new()
        .file("my docs/index.html", "spaced replacement")
        .file("help/a b.html", "escaped capture")
        .file("café/carte.html", "non-ascii replacement")
        .file("public/index.html", "wrong file");
    let mut config = site.config();
    config.rewrite_rules.insert("docs".into(), "my docs/index.html".into());
    config.rewrite_rules.insert("^/help/(.+)$".into(), "help/$1.html".into());
    config.rewrite_rules.insert("menu".into(), "café/carte.html".into());
    let server = TestServer::start(&config).await;

    for (url, expected) in [
        ("/docs", "spaced replacement"),
        ("/help/a%20b", "escaped capture"),
        ("/menu", "non-ascii replacement"),
    ] {
        let response = client().get(server.asset_url(url)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{url}");
        assert_eq!(response.text().await.unwrap(), expected, "{url}");
    }
}
