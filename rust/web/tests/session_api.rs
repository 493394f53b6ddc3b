use hanabi_web::{AppContext, GameEvent, WebServer};
use serde_json::{json, Value};
use warp::http::StatusCode;

struct Api {
    ctx: AppContext,
}

impl Api {
    fn new() -> Self {
        Self {
            ctx: AppContext::new_for_tests(),
        }
    }

    async fn call(&self, method: &str, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let routes = WebServer::routes(&self.ctx);
        let mut request = warp::test::request().method(method).path(path);
        if let Some(body) = body {
            request = request
                .header("content-type", "application/json")
                .body(body.to_string());
        }
        let response = request.reply(&routes).await;
        let status = response.status();
        let body = if response.body().is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(response.body()).expect("json body")
        };
        (status, body)
    }

    async fn create(&self, seed: u64) -> String {
        let (status, body) = self
            .call("POST", "/api/sessions", Some(json!({ "seed": seed })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["session_id"].as_str().expect("session id").to_string()
    }

    async fn join(&self, id: &str, name: &str) -> (StatusCode, Value) {
        self.call(
            "POST",
            &format!("/api/sessions/{id}/players"),
            Some(json!({ "name": name })),
        )
        .await
    }

    async fn started_pair(&self) -> String {
        let id = self.create(123123123).await;
        assert_eq!(self.join(&id, "nick").await.0, StatusCode::CREATED);
        assert_eq!(self.join(&id, "nick2").await.0, StatusCode::CREATED);
        let (status, _) = self
            .call("POST", &format!("/api/sessions/{id}/start"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        id
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let api = Api::new();
    let (status, body) = api.call("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["active_sessions"], 0);
}

#[tokio::test]
async fn create_without_body_picks_a_seed() {
    let api = Api::new();
    let (status, body) = api.call("POST", "/api/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["seed"].is_u64());
    assert_eq!(body["state"]["state"]["seed"], body["seed"]);
    assert_eq!(body["state"]["state"]["deck"].as_array().unwrap().len(), 50);
}

#[tokio::test]
async fn two_player_game_through_the_api() {
    let api = Api::new();
    let id = api.started_pair().await;

    let (status, state) = api
        .call("GET", &format!("/api/sessions/{id}/state"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["state"]["current_player"], "nick");
    assert_eq!(state["state"]["lives"], 3);
    assert_eq!(state["state"]["info"], 8);
    assert_eq!(state["state"]["deck"].as_array().unwrap().len(), 40);
    for player in state["state"]["players"].as_array().unwrap() {
        assert_eq!(player["cards"].as_array().unwrap().len(), 5);
    }

    let (status, outcome) = api
        .call(
            "POST",
            &format!("/api/sessions/{id}/moves"),
            Some(json!({ "type": "clue", "kind": "number", "target": "nick2", "card_index": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["player"], "nick");
    assert_eq!(outcome["effect"], "clued");

    let (_, state) = api
        .call("GET", &format!("/api/sessions/{id}/state"), None)
        .await;
    assert_eq!(state["state"]["info"], 7);
    assert_eq!(state["state"]["current_player"], "nick2");
    assert_eq!(state["moves_made"], 1);
}

#[tokio::test]
async fn move_errors_map_to_status_codes() {
    let api = Api::new();
    let id = api.create(5).await;
    api.join(&id, "ann").await;
    api.join(&id, "bob").await;
    let moves = format!("/api/sessions/{id}/moves");

    let (status, body) = api
        .call("POST", &moves, Some(json!({ "type": "play", "card_index": 0 })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "game_not_started");

    api.call("POST", &format!("/api/sessions/{id}/start"), None)
        .await;

    let (status, body) = api
        .call("POST", &moves, Some(json!({ "type": "discard", "card_index": 9 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "card_index_out_of_range");
    assert_eq!(body["details"]["hand_size"], 5);

    let (status, body) = api
        .call(
            "POST",
            &moves,
            Some(json!({ "type": "clue", "kind": "colour", "target": "ann", "card_index": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "cannot_clue_self");

    let (status, body) = api
        .call("POST", &moves, Some(json!({ "type": "shuffle" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn lobby_endpoints_manage_players() {
    let api = Api::new();
    let id = api.create(8).await;
    api.join(&id, "nick").await;

    let (status, body) = api.join(&id, "nick").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "player_exists");

    let (status, body) = api.join(&id, "   ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");

    let (status, body) = api
        .call(
            "POST",
            &format!("/api/sessions/{id}/players/nick/ready"),
            Some(json!({ "ready": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["players"][0]["ready"], true);

    let (status, body) = api
        .call("DELETE", &format!("/api/sessions/{id}/players/nick"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["state"]["players"].as_array().unwrap().is_empty());

    let (status, body) = api
        .call("POST", &format!("/api/sessions/{id}/start"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "no_players");
}

#[tokio::test]
async fn reset_returns_to_the_lobby() {
    let api = Api::new();
    let id = api.started_pair().await;

    let (status, body) = api
        .call(
            "POST",
            &format!("/api/sessions/{id}/reset"),
            Some(json!({ "seed": 99 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["seed"], 99);
    assert!(body["state"]["current_player"].is_null());
    assert_eq!(body["state"]["players"].as_array().unwrap().len(), 2);

    let (status, _) = api
        .call("POST", &format!("/api/sessions/{id}/start"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn deleted_session_is_gone() {
    let api = Api::new();
    let id = api.create(1).await;
    let mut events = api.ctx.event_bus().subscribe(id.clone());

    let (status, body) = api
        .call("DELETE", &format!("/api/sessions/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    match events.receiver.try_recv() {
        Ok(GameEvent::GameEnded { reason, .. }) => assert_eq!(reason, "terminated_by_request"),
        other => panic!("unexpected event: {:?}", other),
    }

    let (status, body) = api.call("GET", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "session_not_found");
    assert_eq!(body["details"]["session_id"], id.as_str());
}

#[tokio::test]
async fn unknown_routes_and_methods_are_json_errors() {
    let api = Api::new();

    let (status, body) = api.call("GET", "/api/nothing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, body) = api.call("PUT", "/health", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "method_not_allowed");
}

#[tokio::test]
async fn mutations_are_broadcast_with_state() {
    let api = Api::new();
    let id = api.create(3).await;
    let mut events = api.ctx.event_bus().subscribe(id.clone());

    api.join(&id, "ann").await;

    let first = events.receiver.try_recv().expect("player joined");
    assert!(matches!(first, GameEvent::PlayerJoined { ref name, .. } if name == "ann"));
    match events.receiver.try_recv().expect("state update") {
        GameEvent::StateUpdated { state, .. } => {
            assert!(state.state.has_player("ann"));
        }
        other => panic!("unexpected event: {:?}", other),
    }
}
