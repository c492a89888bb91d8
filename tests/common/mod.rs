#![allow(dead_code)]

use std::sync::Arc;

use chrono::Duration;
use recipe_api::{
    actions::users,
    jwt::AuthKeys,
    memory::MemoryRepository,
    routes,
    schema::User,
    state::AppState,
};
use serde_json::Value;
use warp::{http::Response, hyper::body::Bytes, Filter, Reply};

pub struct TestApp {
    pub repo: Arc<MemoryRepository>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let repo = Arc::new(MemoryRepository::new());
        let keys = AuthKeys::new(b"test-secret", Duration::hours(1)).unwrap();
        let state = AppState::new(repo.clone(), keys);
        Self { repo, state }
    }

    pub fn api(&self) -> impl Filter<Extract = (impl Reply,), Error = std::convert::Infallible> + Clone {
        routes::api(self.state.clone())
    }

    pub async fn create_user(&self, email: &str, password: &str) -> User {
        users::create_user(self.repo.as_ref(), email, password, "Test User")
            .await
            .unwrap()
    }

    pub async fn create_superuser(&self, email: &str, password: &str) -> User {
        users::create_superuser(self.repo.as_ref(), email, password, "Admin")
            .await
            .unwrap()
    }

    /// Header value authenticating as `user`, like a client that already
    /// fetched a token.
    pub fn auth(&self, user: &User) -> String {
        format!("Token {}", self.state.keys.generate_token(user).unwrap())
    }

    pub async fn send(
        &self,
        method: &str,
        path: &str,
        auth: Option<&str>,
        body: Option<Value>,
    ) -> Response<Bytes> {
        let mut request = warp::test::request().method(method).path(path);
        if let Some(auth) = auth {
            request = request.header("authorization", auth);
        }
        request = match body {
            Some(body) => request.json(&body),
            None => request.body(""),
        };

        request.reply(&self.api()).await
    }
}

pub fn json(response: &Response<Bytes>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}
