//! End-to-end tests against the in-memory store: the router is served on an ephemeral port and
//! driven over HTTP.

use game_catalog::domain::sync::MissingLinkPolicy;
use game_catalog::{transport, CatalogService, MemoryCatalogStore, ServicePolicy};
use serde_json::{json, Value};
use std::sync::Arc;

type TestResult = Result<(), Box<dyn std::error::Error>>;

async fn spawn_server(missing_platforms: MissingLinkPolicy) -> Result<String, Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryCatalogStore::new());
    let catalog = CatalogService::new(store, ServicePolicy { missing_platforms });
    let state = transport::http::AppState::new(Arc::new(catalog));
    let router = transport::http::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Ok(format!("http://{}", addr))
}

async fn post(client: &reqwest::Client, url: String, body: Value) -> Result<(u16, Value), Box<dyn std::error::Error>> {
    let resp = client.post(url).json(&body).send().await?;
    let status = resp.status().as_u16();
    Ok((status, resp.json().await?))
}

async fn put(client: &reqwest::Client, url: String, body: Value) -> Result<(u16, Value), Box<dyn std::error::Error>> {
    let resp = client.put(url).json(&body).send().await?;
    let status = resp.status().as_u16();
    Ok((status, resp.json().await?))
}

async fn get(client: &reqwest::Client, url: String) -> Result<(u16, Value), Box<dyn std::error::Error>> {
    let resp = client.get(url).send().await?;
    let status = resp.status().as_u16();
    Ok((status, resp.json().await?))
}

async fn delete(client: &reqwest::Client, url: String) -> Result<(u16, Value), Box<dyn std::error::Error>> {
    let resp = client.delete(url).send().await?;
    let status = resp.status().as_u16();
    Ok((status, resp.json().await?))
}

/// Creates genre "Puzzle" (id 1) and platforms PC (1), Xbox 360 (2), PlayStation 3 (3).
async fn seed(client: &reqwest::Client, base: &str) -> TestResult {
    let (status, _) = post(client, format!("{}/api/genres", base), json!({"name": "Puzzle"})).await?;
    assert_eq!(status, 201);
    for (name, manufacturer) in [("PC", None), ("Xbox 360", Some("Microsoft")), ("PlayStation 3", Some("Sony"))] {
        let (status, _) = post(
            client,
            format!("{}/api/platforms", base),
            json!({"name": name, "manufacturer": manufacturer}),
        )
        .await?;
        assert_eq!(status, 201);
    }
    Ok(())
}

fn portal(platform_ids: Value) -> Value {
    json!({
        "title": "Portal",
        "release_date": "2007-10-10",
        "genre_id": 1,
        "description": "A first-person puzzle game built around a portal gun.",
        "platform_ids": platform_ids
    })
}

fn platform_ids(game: &Value) -> Vec<i64> {
    let mut ids: Vec<i64> = game["platforms"]
        .as_array()
        .map(|ps| ps.iter().filter_map(|p| p["platform_id"].as_i64()).collect())
        .unwrap_or_default();
    ids.sort();
    ids
}

#[tokio::test]
async fn portal_create_then_delete() -> TestResult {
    let base = spawn_server(MissingLinkPolicy::Reject).await?;
    let client = reqwest::Client::new();
    seed(&client, &base).await?;

    let (status, body) = post(&client, format!("{}/api/games", base), portal(json!([1, 2]))).await?;
    assert_eq!(status, 201, "{}", body);
    assert_eq!(body["success"], json!(true));
    let game_id = body["data"]["game_id"].as_i64().expect("game_id assigned");
    assert_eq!(body["data"]["genre"]["name"], json!("Puzzle"));
    assert_eq!(platform_ids(&body["data"]), vec![1, 2]);

    let (status, body) = get(&client, format!("{}/api/platforms/1", base)).await?;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["games"][0]["title"], json!("Portal"));

    let (status, body) = delete(&client, format!("{}/api/games/{}", base, game_id)).await?;
    assert_eq!(status, 200);
    assert_eq!(body["message"], json!("Game deleted successfully"));

    let (status, body) = get(&client, format!("{}/api/platforms/1", base)).await?;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["games"], json!([]));

    let (status, body) = get(&client, format!("{}/api/games/{}", base, game_id)).await?;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], json!("GAME_NOT_FOUND"));

    let (status, body) = delete(&client, format!("{}/api/games/{}", base, game_id)).await?;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], json!("GAME_NOT_FOUND"));
    Ok(())
}

#[tokio::test]
async fn invalid_games_are_rejected_with_field_errors() -> TestResult {
    let base = spawn_server(MissingLinkPolicy::Reject).await?;
    let client = reqwest::Client::new();
    seed(&client, &base).await?;

    let (status, body) = post(&client, format!("{}/api/games", base), json!({})).await?;
    assert_eq!(status, 422);
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
    for field in ["title", "release_date", "genre_id", "description", "platform_ids"] {
        assert!(body["validation_errors"][field].is_array(), "missing errors for {}", field);
    }

    let mut bad_date = portal(json!([1]));
    bad_date["release_date"] = json!("2007-02-30");
    let (status, body) = post(&client, format!("{}/api/games", base), bad_date).await?;
    assert_eq!(status, 422);
    assert!(body["validation_errors"]["release_date"].is_array());
    assert!(body["validation_errors"].get("title").is_none());

    let mut too_short = portal(json!([]));
    too_short["description"] = json!("short");
    let (status, body) = post(&client, format!("{}/api/games", base), too_short).await?;
    assert_eq!(status, 422);
    assert!(body["validation_errors"]["description"].is_array());
    assert!(body["validation_errors"]["platform_ids"].is_array());

    // Nothing was written.
    let (_, body) = get(&client, format!("{}/api/games", base)).await?;
    assert_eq!(body["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn referenced_ids_must_exist() -> TestResult {
    let base = spawn_server(MissingLinkPolicy::Reject).await?;
    let client = reqwest::Client::new();
    seed(&client, &base).await?;

    let mut no_genre = portal(json!([1]));
    no_genre["genre_id"] = json!(42);
    let (status, body) = post(&client, format!("{}/api/games", base), no_genre).await?;
    assert_eq!(status, 422);
    assert_eq!(body["error"]["code"], json!("GENRE_NOT_FOUND"));

    let (status, body) = post(&client, format!("{}/api/games", base), portal(json!([1, 99]))).await?;
    assert_eq!(status, 422);
    assert_eq!(body["error"]["code"], json!("PLATFORM_NOT_FOUND"));
    assert_eq!(body["error"]["message"], json!("Platform with ID 99 not found"));

    let (_, body) = get(&client, format!("{}/api/games", base)).await?;
    assert_eq!(body["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn skip_policy_links_only_existing_platforms() -> TestResult {
    let base = spawn_server(MissingLinkPolicy::Skip).await?;
    let client = reqwest::Client::new();
    seed(&client, &base).await?;

    let (status, body) = post(&client, format!("{}/api/games", base), portal(json!([1, 99]))).await?;
    assert_eq!(status, 201, "{}", body);
    assert_eq!(platform_ids(&body["data"]), vec![1]);
    Ok(())
}

#[tokio::test]
async fn update_synchronizes_platforms() -> TestResult {
    let base = spawn_server(MissingLinkPolicy::Reject).await?;
    let client = reqwest::Client::new();
    seed(&client, &base).await?;

    let (_, body) = post(&client, format!("{}/api/games", base), portal(json!([1, 2]))).await?;
    let game_id = body["data"]["game_id"].as_i64().expect("game_id assigned");

    let mut sequel = portal(json!([2, 3]));
    sequel["title"] = json!("Portal: Still Alive");
    let (status, body) = put(&client, format!("{}/api/games/{}", base, game_id), sequel.clone()).await?;
    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["data"]["title"], json!("Portal: Still Alive"));
    assert_eq!(platform_ids(&body["data"]), vec![2, 3]);

    // Same payload again leaves the links untouched.
    let (status, body) = put(&client, format!("{}/api/games/{}", base, game_id), sequel).await?;
    assert_eq!(status, 200);
    assert_eq!(platform_ids(&body["data"]), vec![2, 3]);

    let (_, body) = get(&client, format!("{}/api/platforms/1", base)).await?;
    assert_eq!(body["data"]["games"], json!([]));

    let (status, body) = put(&client, format!("{}/api/games/777", base), portal(json!([1]))).await?;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], json!("GAME_NOT_FOUND"));
    Ok(())
}

#[tokio::test]
async fn genres_in_use_cannot_be_deleted() -> TestResult {
    let base = spawn_server(MissingLinkPolicy::Reject).await?;
    let client = reqwest::Client::new();
    seed(&client, &base).await?;
    let (_, body) = post(&client, format!("{}/api/games", base), portal(json!([1]))).await?;
    let game_id = body["data"]["game_id"].as_i64().expect("game_id assigned");

    let (status, body) = get(&client, format!("{}/api/genres/1", base)).await?;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["games"][0]["game_id"], json!(game_id));

    let (status, body) = delete(&client, format!("{}/api/genres/1", base)).await?;
    assert_eq!(status, 422);
    assert_eq!(body["error"]["code"], json!("GENRE_IN_USE"));

    delete(&client, format!("{}/api/games/{}", base, game_id)).await?;
    let (status, _) = delete(&client, format!("{}/api/genres/1", base)).await?;
    assert_eq!(status, 200);
    Ok(())
}

#[tokio::test]
async fn genre_and_platform_updates() -> TestResult {
    let base = spawn_server(MissingLinkPolicy::Reject).await?;
    let client = reqwest::Client::new();
    seed(&client, &base).await?;

    let (status, body) = put(
        &client,
        format!("{}/api/platforms/1", base),
        json!({"name": "Windows PC", "manufacturer": "Various"}),
    )
    .await?;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["name"], json!("Windows PC"));

    let (status, body) = put(&client, format!("{}/api/genres/1", base), json!({"name": ""})).await?;
    assert_eq!(status, 422);
    assert!(body["validation_errors"]["name"].is_array());

    let (_, body) = get(&client, format!("{}/api/platforms", base)).await?;
    let names: Vec<&str> = body["data"]
        .as_array()
        .map(|ps| ps.iter().filter_map(|p| p["name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, vec!["PlayStation 3", "Windows PC", "Xbox 360"]);

    let (status, _) = delete(&client, format!("{}/api/platforms/3", base)).await?;
    assert_eq!(status, 200);
    let (status, body) = get(&client, format!("{}/api/platforms/3", base)).await?;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], json!("PLATFORM_NOT_FOUND"));
    Ok(())
}

#[tokio::test]
async fn malformed_requests() -> TestResult {
    let base = spawn_server(MissingLinkPolicy::Reject).await?;
    let client = reqwest::Client::new();

    let (status, body) = get(&client, format!("{}/api/games/abc", base)).await?;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], json!("INVALID_ID"));

    let resp = client
        .post(format!("{}/api/games", base))
        .header("content-type", "application/json")
        .body("{\"title\": ")
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await?;
    assert_eq!(body["error"]["code"], json!("INVALID_JSON"));

    let (status, body) = post(&client, format!("{}/api/genres", base), json!(["Puzzle"])).await?;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], json!("INVALID_JSON"));

    let resp = client.patch(format!("{}/api/games", base)).send().await?;
    assert_eq!(resp.status().as_u16(), 405);
    let body: Value = resp.json().await?;
    assert_eq!(body["error"]["code"], json!("METHOD_NOT_ALLOWED"));

    let (status, body) = get(&client, format!("{}/api/consoles", base)).await?;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], json!("NOT_FOUND"));

    let (status, body) = get(&client, format!("{}/health", base)).await?;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], json!("ok"));
    Ok(())
}

#[tokio::test]
async fn object_platform_ids_link_their_values() -> TestResult {
    let base = spawn_server(MissingLinkPolicy::Reject).await?;
    let client = reqwest::Client::new();
    seed(&client, &base).await?;

    let (status, body) = post(&client, format!("{}/api/games", base), portal(json!({"a": 1, "b": 3}))).await?;
    assert_eq!(status, 201, "{}", body);
    assert_eq!(platform_ids(&body["data"]), vec![1, 3]);

    let mut bad_title = portal(json!([1]));
    bad_title["title"] = json!(["Portal"]);
    let (status, body) = post(&client, format!("{}/api/games", base), bad_title).await?;
    assert_eq!(status, 422);
    assert_eq!(body["validation_errors"]["title"], json!(["The title must be a string."]));
    assert!(body["validation_errors"].get("genre_id").is_none());
    Ok(())
}
