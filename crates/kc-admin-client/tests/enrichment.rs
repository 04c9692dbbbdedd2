//! Enriched user listing tests.

use std::time::{Duration, Instant};

use kc_admin_client::{AdminError, EnrichmentFetcher, PageWindow};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{role_json, user_json, TestEnv};

async fn mount_page(env: &TestEnv, users: serde_json::Value, count: &str) {
    Mock::given(method("GET"))
        .and(path(env.path("/users")))
        .and(query_param("first", "0"))
        .and(query_param("max", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(users))
        .expect(1)
        .mount(&env.server)
        .await;
    Mock::given(method("GET"))
        .and(path(env.path("/users/count")))
        .respond_with(ResponseTemplate::new(200).set_body_string(count))
        .expect(1)
        .mount(&env.server)
        .await;
}

async fn mount_roles(env: &TestEnv, user_id: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(env.path(&format!("/users/{user_id}/role-mappings/realm"))))
        .respond_with(response)
        .expect(1)
        .mount(&env.server)
        .await;
}

#[tokio::test]
async fn test_failed_role_fetch_keeps_page_intact() -> anyhow::Result<()> {
    let env = TestEnv::new().await;

    mount_page(
        &env,
        json!([user_json("u1", "alice"), user_json("u2", "bob"), user_json("u3", "carol")]),
        "7",
    )
    .await;
    mount_roles(
        &env,
        "u1",
        ResponseTemplate::new(200).set_body_json(json!([role_json("r1", "doctor")])),
    )
    .await;
    mount_roles(&env, "u2", ResponseTemplate::new(500).set_body_string("boom")).await;
    mount_roles(
        &env,
        "u3",
        ResponseTemplate::new(200)
            .set_body_json(json!([role_json("r3", "nurse"), role_json("r2", "admin")])),
    )
    .await;

    let page = EnrichmentFetcher::new(env.client.clone(), &env.config)
        .list_enriched(PageWindow::new(0, 3))
        .await?;

    assert_eq!(page.total, 7);
    assert!(page.has_more());
    let usernames: Vec<_> = page.users.iter().map(|u| u.user.username.as_str()).collect();
    assert_eq!(usernames, vec!["alice", "bob", "carol"]);

    assert_eq!(page.users[0].roles.iter().collect::<Vec<_>>(), vec!["doctor"]);
    assert!(page.users[1].roles.is_empty());
    assert_eq!(page.users[2].roles.iter().collect::<Vec<_>>(), vec!["admin", "nurse"]);

    assert!(page.is_degraded());
    assert_eq!(page.warnings.len(), 1);
    assert_eq!(page.warnings[0].user_id, "u2");
    assert!(page.warnings[0].message.contains("500"));
    Ok(())
}

#[tokio::test]
async fn test_noise_roles_are_hidden() -> anyhow::Result<()> {
    let env = TestEnv::new().await;

    mount_page(&env, json!([user_json("u1", "alice")]), "1").await;
    mount_roles(
        &env,
        "u1",
        ResponseTemplate::new(200).set_body_json(json!([
            role_json("r0", "default-roles-clinic"),
            role_json("r8", "offline_access"),
            role_json("r9", "uma_authorization"),
            role_json("r2", "admin")
        ])),
    )
    .await;

    let page = EnrichmentFetcher::new(env.client.clone(), &env.config)
        .list_enriched(PageWindow::new(0, 3))
        .await?;

    assert_eq!(page.users.len(), 1);
    assert_eq!(page.users[0].roles.iter().collect::<Vec<_>>(), vec!["admin"]);
    assert!(!page.has_more());
    assert!(!page.is_degraded());
    Ok(())
}

#[tokio::test]
async fn test_unreadable_count_falls_back_to_window_end() -> anyhow::Result<()> {
    let env = TestEnv::new().await;

    mount_page(&env, json!([user_json("u1", "alice")]), "n/a").await;
    mount_roles(&env, "u1", ResponseTemplate::new(200).set_body_json(json!([]))).await;

    let page = EnrichmentFetcher::new(env.client.clone(), &env.config)
        .list_enriched(PageWindow::new(0, 3))
        .await?;

    assert_eq!(page.total, 1);
    Ok(())
}

#[tokio::test]
async fn test_forbidden_page_propagates() {
    let env = TestEnv::new().await;

    Mock::given(method("GET"))
        .and(path(env.path("/users")))
        .respond_with(ResponseTemplate::new(403))
        .mount(&env.server)
        .await;
    Mock::given(method("GET"))
        .and(path(env.path("/users/count")))
        .respond_with(ResponseTemplate::new(403))
        .mount(&env.server)
        .await;

    let result = EnrichmentFetcher::new(env.client.clone(), &env.config)
        .list_enriched(PageWindow::new(0, 3))
        .await;
    assert!(matches!(result, Err(AdminError::Forbidden { .. })));
}

#[tokio::test]
async fn test_empty_page_issues_no_role_fetches() -> anyhow::Result<()> {
    let env = TestEnv::new().await;

    mount_page(&env, json!([]), "0").await;
    Mock::given(method("GET"))
        .and(wiremock::matchers::path_regex(r"/role-mappings/realm$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&env.server)
        .await;

    let page = EnrichmentFetcher::new(env.client.clone(), &env.config)
        .list_enriched(PageWindow::new(0, 3))
        .await?;
    assert!(page.users.is_empty());
    assert_eq!(page.total, 0);
    Ok(())
}

#[tokio::test]
async fn test_role_fetches_overlap_up_to_the_cap() -> anyhow::Result<()> {
    let env = TestEnv::new().await;
    assert_eq!(env.config.enrichment_concurrency, 2);

    Mock::given(method("GET"))
        .and(path(env.path("/users")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            user_json("u1", "alice"),
            user_json("u2", "bob"),
            user_json("u3", "carol"),
            user_json("u4", "dave")
        ])))
        .mount(&env.server)
        .await;
    Mock::given(method("GET"))
        .and(path(env.path("/users/count")))
        .respond_with(ResponseTemplate::new(200).set_body_string("4"))
        .mount(&env.server)
        .await;
    // u1 answers last, so completion order differs from listing order
    for (id, role, delay_ms) in [
        ("u1", "doctor", 300),
        ("u2", "nurse", 200),
        ("u3", "admin", 200),
        ("u4", "nurse", 200),
    ] {
        mount_roles(
            &env,
            id,
            ResponseTemplate::new(200)
                .set_body_json(json!([role_json("r", role)]))
                .set_delay(Duration::from_millis(delay_ms)),
        )
        .await;
    }

    let started = Instant::now();
    let page = EnrichmentFetcher::new(env.client.clone(), &env.config)
        .list_enriched(PageWindow::new(0, 4))
        .await?;
    let elapsed = started.elapsed();

    let listed: Vec<_> = page
        .users
        .iter()
        .map(|u| (u.user.id.as_str(), u.roles.iter().next().map(String::as_str)))
        .collect();
    assert_eq!(
        listed,
        vec![
            ("u1", Some("doctor")),
            ("u2", Some("nurse")),
            ("u3", Some("admin")),
            ("u4", Some("nurse"))
        ]
    );

    // two at a time: u1|u2, then u3 after u2, u4 after u1 => ~500ms.
    // unbounded would take ~300ms, one at a time ~900ms.
    assert!(elapsed >= Duration::from_millis(450), "more than 2 in flight: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(850), "role fetches ran serially: {elapsed:?}");
    Ok(())
}

#[tokio::test]
async fn test_page_and_count_are_requested_together() -> anyhow::Result<()> {
    let env = TestEnv::new().await;

    Mock::given(method("GET"))
        .and(path(env.path("/users")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&env.server)
        .await;
    Mock::given(method("GET"))
        .and(path(env.path("/users/count")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("0")
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&env.server)
        .await;

    let started = Instant::now();
    EnrichmentFetcher::new(env.client.clone(), &env.config)
        .list_enriched(PageWindow::new(0, 3))
        .await?;
    let elapsed = started.elapsed();

    assert!(elapsed < Duration::from_millis(550), "page and count ran serially: {elapsed:?}");
    Ok(())
}
