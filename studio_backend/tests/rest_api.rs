use studio_backend::api;
use studio_backend::bootstrap;
use studio_backend::config::{StudioConfig, StudioPaths};
use studio_backend::realtime::RealtimeBridge;
use tempfile::{tempdir, TempDir};
use tokio::time::{sleep, Duration};

struct TestServer {
    _dir: TempDir,
    base_url: String,
    server: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn shutdown(self) {
        self.server.abort();
        let _ = self.server.await;
    }
}

fn next_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .expect("bind ephemeral port")
        .local_addr()
        .unwrap()
        .port()
}

async fn wait_for_health(base_url: &str) {
    let client = reqwest::Client::new();
    for _ in 0..50 {
        if let Ok(resp) = client.get(format!("{base_url}/health")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        sleep(Duration::from_millis(100)).await;
    }
    panic!("server did not become healthy in time");
}

async fn spawn_server() -> TestServer {
    let dir = tempdir().expect("tempdir");
    let port = next_port();
    let config = StudioConfig::new(port, StudioPaths::from_base_dir(dir.path()).expect("paths"));

    let bootstrap = bootstrap::initialize(&config).expect("bootstrap");
    let database = bootstrap.database.clone();
    let realtime = RealtimeBridge::new(config.realtime.channel_capacity);

    let server_config = config.clone();
    let server = tokio::spawn(async move {
        let _ = api::serve_http(server_config, database, realtime).await;
    });

    let base_url = format!("http://127.0.0.1:{port}");
    wait_for_health(&base_url).await;

    TestServer {
        _dir: dir,
        base_url,
        server,
    }
}

async fn register(client: &reqwest::Client, base_url: &str, username: &str) -> String {
    let resp: serde_json::Value = client
        .post(format!("{base_url}/users"))
        .json(&serde_json::json!({ "username": username }))
        .send()
        .await
        .expect("register response")
        .json()
        .await
        .expect("register json");
    resp.get("id")
        .and_then(|id| id.as_str())
        .expect("user id")
        .to_string()
}

async fn create_showcase(
    client: &reqwest::Client,
    base_url: &str,
    user_id: &str,
) -> serde_json::Value {
    client
        .post(format!("{base_url}/showcases"))
        .header("x-studio-user", user_id)
        .json(&serde_json::json!({
            "url": "https://storage.example/obj-1",
            "storage_key": "objects/obj-1",
            "mime": "image/png",
            "caption": "harbor at dawn",
            "tags": ["ink", "#harbor"],
        }))
        .send()
        .await
        .expect("create showcase response")
        .json()
        .await
        .expect("showcase json")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn health_and_registration_roundtrip() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    let health: serde_json::Value = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await
        .expect("health")
        .json()
        .await
        .expect("health json");
    assert_eq!(health.get("status").and_then(|s| s.as_str()), Some("ok"));

    let first = register(&client, &server.base_url, "mina").await;
    let second = register(&client, &server.base_url, "mina").await;
    assert_eq!(first, second);

    // Mutations without the identity header are rejected.
    let resp = client
        .post(format!("{}/showcases", server.base_url))
        .json(&serde_json::json!({
            "url": "https://storage.example/x",
            "storage_key": "objects/x",
            "mime": "image/png",
        }))
        .send()
        .await
        .expect("unauthenticated create");
    assert_eq!(resp.status(), 401);

    server.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn comment_with_mention_produces_two_notifications() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    let mina = register(&client, &server.base_url, "mina").await;
    let theo = register(&client, &server.base_url, "theo").await;

    let showcase = create_showcase(&client, &server.base_url, &mina).await;
    let showcase_id = showcase.get("id").and_then(|id| id.as_str()).expect("id");
    assert_eq!(
        showcase.get("media_kind").and_then(|k| k.as_str()),
        Some("image")
    );
    assert_eq!(
        showcase.get("tags").and_then(|t| t.as_array()).map(|t| t.len()),
        Some(2)
    );

    let resp = client
        .post(format!("{}/showcases/{}/comments", server.base_url, showcase_id))
        .header("x-studio-user", &theo)
        .json(&serde_json::json!({ "content": "@mina nice work" }))
        .send()
        .await
        .expect("post comment");
    assert_eq!(resp.status(), 201);
    let comment: serde_json::Value = resp.json().await.expect("comment json");
    assert!(comment.get("parent_id").map(|p| p.is_null()).unwrap_or(false));

    let fetched: serde_json::Value = client
        .get(format!("{}/showcases/{}", server.base_url, showcase_id))
        .header("x-studio-user", &theo)
        .send()
        .await
        .expect("get showcase")
        .json()
        .await
        .expect("showcase json");
    assert_eq!(fetched.get("comment_count").and_then(|c| c.as_i64()), Some(1));

    // One COMMENT and one MENTION row for the owner, from the same action.
    let notifications: serde_json::Value = client
        .get(format!("{}/notifications", server.base_url))
        .header("x-studio-user", &mina)
        .send()
        .await
        .expect("notifications")
        .json()
        .await
        .expect("notifications json");
    let items = notifications.as_array().expect("array");
    assert_eq!(items.len(), 2);
    let kinds: Vec<&str> = items
        .iter()
        .filter_map(|n| n.get("kind").and_then(|k| k.as_str()))
        .collect();
    assert!(kinds.contains(&"COMMENT"));
    assert!(kinds.contains(&"MENTION"));

    server.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn like_toggle_is_idempotent_and_symmetric() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    let mina = register(&client, &server.base_url, "mina").await;
    let theo = register(&client, &server.base_url, "theo").await;
    let showcase = create_showcase(&client, &server.base_url, &mina).await;
    let showcase_id = showcase.get("id").and_then(|id| id.as_str()).expect("id");

    let like = |user: String| {
        let client = client.clone();
        let url = format!("{}/showcases/{}/like", server.base_url, showcase_id);
        async move {
            client
                .post(url)
                .header("x-studio-user", user)
                .send()
                .await
                .expect("like response")
                .json::<serde_json::Value>()
                .await
                .expect("like json")
        }
    };

    let first = like(theo.clone()).await;
    assert_eq!(first.get("changed").and_then(|c| c.as_bool()), Some(true));
    let second = like(theo.clone()).await;
    assert_eq!(second.get("changed").and_then(|c| c.as_bool()), Some(false));

    let likes: serde_json::Value = client
        .get(format!("{}/showcases/{}/likes", server.base_url, showcase_id))
        .header("x-studio-user", &theo)
        .send()
        .await
        .expect("likes")
        .json()
        .await
        .expect("likes json");
    assert_eq!(likes.get("count").and_then(|c| c.as_i64()), Some(1));
    assert_eq!(
        likes.get("likers").and_then(|l| l.as_array()).map(|l| l.len()),
        Some(1)
    );

    client
        .post(format!("{}/showcases/{}/unlike", server.base_url, showcase_id))
        .header("x-studio-user", &theo)
        .send()
        .await
        .expect("unlike");
    let likes: serde_json::Value = client
        .get(format!("{}/showcases/{}/likes", server.base_url, showcase_id))
        .header("x-studio-user", &theo)
        .send()
        .await
        .expect("likes after unlike")
        .json()
        .await
        .expect("likes json");
    assert_eq!(likes.get("count").and_then(|c| c.as_i64()), Some(0));

    server.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn reply_edit_delete_flow_keeps_the_counter_honest() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    let mina = register(&client, &server.base_url, "mina").await;
    let theo = register(&client, &server.base_url, "theo").await;
    let showcase = create_showcase(&client, &server.base_url, &mina).await;
    let showcase_id = showcase
        .get("id")
        .and_then(|id| id.as_str())
        .expect("id")
        .to_string();

    let comment: serde_json::Value = client
        .post(format!("{}/showcases/{}/comments", server.base_url, showcase_id))
        .header("x-studio-user", &theo)
        .json(&serde_json::json!({ "content": "first pass" }))
        .send()
        .await
        .expect("post comment")
        .json()
        .await
        .expect("comment json");
    let comment_id = comment
        .get("id")
        .and_then(|id| id.as_str())
        .expect("comment id")
        .to_string();

    let reply_resp = client
        .post(format!("{}/comments/{}/replies", server.base_url, comment_id))
        .header("x-studio-user", &mina)
        .json(&serde_json::json!({ "content": "thank you!" }))
        .send()
        .await
        .expect("post reply");
    assert_eq!(reply_resp.status(), 201);

    // Editing someone else's comment is rejected.
    let resp = client
        .put(format!("{}/comments/{}", server.base_url, comment_id))
        .header("x-studio-user", &mina)
        .json(&serde_json::json!({ "content": "hijacked" }))
        .send()
        .await
        .expect("forbidden edit");
    assert_eq!(resp.status(), 401);

    let tree: serde_json::Value = client
        .get(format!("{}/showcases/{}/comments", server.base_url, showcase_id))
        .header("x-studio-user", &theo)
        .send()
        .await
        .expect("tree")
        .json()
        .await
        .expect("tree json");
    let roots = tree.as_array().expect("roots");
    assert_eq!(roots.len(), 1);
    assert_eq!(
        roots[0].get("replies").and_then(|r| r.as_array()).map(|r| r.len()),
        Some(1)
    );

    // Deleting the root takes its reply with it, atomically with the counter.
    let deleted: serde_json::Value = client
        .delete(format!("{}/comments/{}", server.base_url, comment_id))
        .header("x-studio-user", &theo)
        .send()
        .await
        .expect("delete")
        .json()
        .await
        .expect("delete json");
    assert_eq!(deleted.get("removed").and_then(|r| r.as_i64()), Some(2));

    let fetched: serde_json::Value = client
        .get(format!("{}/showcases/{}", server.base_url, showcase_id))
        .header("x-studio-user", &theo)
        .send()
        .await
        .expect("get showcase")
        .json()
        .await
        .expect("showcase json");
    assert_eq!(fetched.get("comment_count").and_then(|c| c.as_i64()), Some(0));

    server.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn follow_showcase_fanout_and_read_state() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    let mina = register(&client, &server.base_url, "mina").await;
    let theo = register(&client, &server.base_url, "theo").await;

    let resp = client
        .post(format!("{}/users/mina/follow", server.base_url))
        .header("x-studio-user", &theo)
        .send()
        .await
        .expect("follow");
    assert!(resp.status().is_success());

    create_showcase(&client, &server.base_url, &mina).await;

    // The follower hears about the new showcase; the owner hears about the
    // follow; neither hears about their own actions.
    let theo_items: serde_json::Value = client
        .get(format!("{}/notifications", server.base_url))
        .header("x-studio-user", &theo)
        .send()
        .await
        .expect("theo notifications")
        .json()
        .await
        .expect("json");
    let theo_items = theo_items.as_array().expect("array");
    assert_eq!(theo_items.len(), 1);
    assert_eq!(
        theo_items[0].get("kind").and_then(|k| k.as_str()),
        Some("ADD_SHOWCASE")
    );
    let notification_id = theo_items[0]
        .get("id")
        .and_then(|id| id.as_str())
        .expect("notification id")
        .to_string();

    let mina_items: serde_json::Value = client
        .get(format!("{}/notifications", server.base_url))
        .header("x-studio-user", &mina)
        .send()
        .await
        .expect("mina notifications")
        .json()
        .await
        .expect("json");
    let mina_items = mina_items.as_array().expect("array");
    assert_eq!(mina_items.len(), 1);
    assert_eq!(
        mina_items[0].get("kind").and_then(|k| k.as_str()),
        Some("FOLLOW")
    );

    // Only the recipient can mark a notification read.
    let resp = client
        .post(format!("{}/notifications/{}/read", server.base_url, notification_id))
        .header("x-studio-user", &mina)
        .json(&serde_json::json!({ "is_read": true }))
        .send()
        .await
        .expect("foreign mark read");
    assert_eq!(resp.status(), 401);

    let resp = client
        .post(format!("{}/notifications/{}/read", server.base_url, notification_id))
        .header("x-studio-user", &theo)
        .json(&serde_json::json!({ "is_read": true }))
        .send()
        .await
        .expect("mark read");
    assert!(resp.status().is_success());

    let unread: serde_json::Value = client
        .get(format!("{}/notifications/unread/count", server.base_url))
        .header("x-studio-user", &theo)
        .send()
        .await
        .expect("unread count")
        .json()
        .await
        .expect("json");
    assert_eq!(unread.get("count").and_then(|c| c.as_i64()), Some(0));

    server.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn duplicate_album_name_is_a_conflict() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    let mina = register(&client, &server.base_url, "mina").await;

    let resp = client
        .post(format!("{}/albums", server.base_url))
        .header("x-studio-user", &mina)
        .json(&serde_json::json!({ "name": "Sketches" }))
        .send()
        .await
        .expect("create album");
    assert_eq!(resp.status(), 201);

    let resp = client
        .post(format!("{}/albums", server.base_url))
        .header("x-studio-user", &mina)
        .json(&serde_json::json!({ "name": "Sketches" }))
        .send()
        .await
        .expect("duplicate album");
    assert_eq!(resp.status(), 409);
    let body: serde_json::Value = resp.json().await.expect("conflict json");
    assert_eq!(
        body.get("message").and_then(|m| m.as_str()),
        Some("album Sketches already exists")
    );

    server.shutdown().await;
}
