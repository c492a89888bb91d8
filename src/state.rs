use std::{convert::Infallible, sync::Arc};

use warp::Filter;

use crate::{authentication::jwt::AuthKeys, repository::Repository};

/// Everything a request handler needs; cheap to clone into every filter.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    pub keys: AuthKeys,
}

impl AppState {
    pub fn new(repo: Arc<dyn Repository>, keys: AuthKeys) -> Self {
        Self { repo, keys }
    }

    pub fn repo(&self) -> &dyn Repository {
        self.repo.as_ref()
    }
}

pub fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}
