use warp::{http::StatusCode, reject::Rejection, reply::Response, Filter, Reply};

use super::{form_body, json_reply, update_method};
use crate::{
    actions::tags,
    authentication::middleware::with_user,
    form::{Form, FormData},
    schema::{User, Uuid},
    state::{with_state, AppState},
};

pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let list = warp::path!("api" / "recipe" / "tags")
        .and(warp::get())
        .and(with_user(state.clone()))
        .and(with_state(state.clone()))
        .and_then(list_tags);

    let update = warp::path!("api" / "recipe" / "tags" / Uuid)
        .and(update_method())
        .and(with_user(state.clone()))
        .and(with_state(state.clone()))
        .and(form_body())
        .and_then(update_tag);

    let delete = warp::path!("api" / "recipe" / "tags" / Uuid)
        .and(warp::delete())
        .and(with_user(state.clone()))
        .and(with_state(state))
        .and_then(delete_tag);

    list.or(update).or(delete)
}

async fn list_tags(user: User, state: AppState) -> Result<Response, Rejection> {
    let rows = tags::list_tags(state.repo(), &user).await?;

    Ok(json_reply(&rows, StatusCode::OK))
}

async fn update_tag(
    id: Uuid,
    partial: bool,
    user: User,
    state: AppState,
    data: FormData,
) -> Result<Response, Rejection> {
    let form = Form::from_data(data).partial(partial);
    let tag = tags::update_tag(state.repo(), &user, id, form).await?;

    Ok(json_reply(&tag, StatusCode::OK))
}

async fn delete_tag(id: Uuid, user: User, state: AppState) -> Result<Response, Rejection> {
    tags::delete_tag(state.repo(), &user, id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
