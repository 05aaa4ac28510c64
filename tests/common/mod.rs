#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use http::StatusCode;
use netfeed::{ApiRequest, ApiResponse, Transport, ViewError};
use serde_json::{json, Value};
use tokio::sync::oneshot;

struct Reply {
    response: Result<ApiResponse, ViewError>,
    gate: Option<oneshot::Receiver<()>>,
}

/// Transport that answers from a per-route script and records every request.
/// Replies for a route are consumed in the order they were scripted.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: &str, path: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(format!("{} {}", method, path))
            .or_default()
            .push_back(reply);
    }

    pub fn reply(&self, method: &str, path: &str, body: Value) {
        self.push(
            method,
            path,
            Reply {
                response: Ok(ApiResponse::new(StatusCode::OK, body.to_string())),
                gate: None,
            },
        );
    }

    pub fn reply_status(&self, method: &str, path: &str, status: StatusCode) {
        self.push(
            method,
            path,
            Reply {
                response: Ok(ApiResponse::new(status, "server error")),
                gate: None,
            },
        );
    }

    pub fn fail(&self, method: &str, path: &str) {
        self.push(
            method,
            path,
            Reply {
                response: Err(ViewError::Transport("connection refused".to_string())),
                gate: None,
            },
        );
    }

    /// The reply is held back until the returned sender fires.
    pub fn reply_gated(&self, method: &str, path: &str, body: Value) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.push(
            method,
            path,
            Reply {
                response: Ok(ApiResponse::new(StatusCode::OK, body.to_string())),
                gate: Some(rx),
            },
        );
        tx
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method.as_str() == method && r.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ViewError> {
        let key = format!("{} {}", request.method, request.path);
        self.requests.lock().unwrap().push(request);

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front);
        let Some(reply) = reply else {
            return Err(ViewError::Transport(format!("no reply scripted for {}", key)));
        };

        if let Some(gate) = reply.gate {
            let _ = gate.await;
        }
        reply.response
    }
}

pub fn post_json(id: u64, poster: &str, timestamp: &str, likes: u64, liked: bool) -> Value {
    json!({
        "id": id,
        "poster": poster,
        "posterID": id * 10,
        "body": format!("post {} by {}", id, poster),
        "timestamp": timestamp,
        "edited": false,
        "edited_timestamp": null,
        "likes_count": likes,
        "user_liked": liked
    })
}

pub fn profile_json(user_name: &str, active_user: &str, follows: bool, followers: u64) -> Value {
    json!({
        "userName": user_name,
        "numFollowers": followers,
        "numFollows": 2,
        "activeUser": active_user,
        "activeUserFollows": follows,
        "userPosts": [
            post_json(1, user_name, "Jan 05 2024, 03:47 PM", 0, false),
            post_json(2, user_name, "Feb 01 2024, 09:00 AM", 1, false)
        ]
    })
}
