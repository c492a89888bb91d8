use warp::{http::StatusCode, reject::Rejection, reply::Response, Filter, Reply};

use super::{form_body, json_reply, update_method};
use crate::{
    actions::admin,
    authentication::middleware::with_user,
    form::{Form, FormData},
    schema::{User, Uuid},
    state::{with_state, AppState},
};

pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    users(state.clone()).or(recipes(state.clone())).or(tags(state))
}

fn users(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let list = warp::path!("api" / "admin" / "users")
        .and(warp::get())
        .and(with_user(state.clone()))
        .and(with_state(state.clone()))
        .and_then(list_users);

    let create = warp::path!("api" / "admin" / "users")
        .and(warp::post())
        .and(with_user(state.clone()))
        .and(with_state(state.clone()))
        .and(form_body())
        .and_then(create_user);

    let retrieve = warp::path!("api" / "admin" / "users" / Uuid)
        .and(warp::get())
        .and(with_user(state.clone()))
        .and(with_state(state.clone()))
        .and_then(get_user);

    let update = warp::path!("api" / "admin" / "users" / Uuid)
        .and(update_method())
        .and(with_user(state.clone()))
        .and(with_state(state.clone()))
        .and(form_body())
        .and_then(update_user);

    let delete = warp::path!("api" / "admin" / "users" / Uuid)
        .and(warp::delete())
        .and(with_user(state.clone()))
        .and(with_state(state))
        .and_then(delete_user);

    list.or(create).or(retrieve).or(update).or(delete)
}

fn recipes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let list = warp::path!("api" / "admin" / "recipes")
        .and(warp::get())
        .and(with_user(state.clone()))
        .and(with_state(state.clone()))
        .and_then(list_recipes);

    let create = warp::path!("api" / "admin" / "recipes")
        .and(warp::post())
        .and(with_user(state.clone()))
        .and(with_state(state.clone()))
        .and(form_body())
        .and_then(create_recipe);

    let retrieve = warp::path!("api" / "admin" / "recipes" / Uuid)
        .and(warp::get())
        .and(with_user(state.clone()))
        .and(with_state(state.clone()))
        .and_then(get_recipe);

    let update = warp::path!("api" / "admin" / "recipes" / Uuid)
        .and(update_method())
        .and(with_user(state.clone()))
        .and(with_state(state.clone()))
        .and(form_body())
        .and_then(update_recipe);

    let delete = warp::path!("api" / "admin" / "recipes" / Uuid)
        .and(warp::delete())
        .and(with_user(state.clone()))
        .and(with_state(state))
        .and_then(delete_recipe);

    list.or(create).or(retrieve).or(update).or(delete)
}

fn tags(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let list = warp::path!("api" / "admin" / "tags")
        .and(warp::get())
        .and(with_user(state.clone()))
        .and(with_state(state.clone()))
        .and_then(list_tags);

    let create = warp::path!("api" / "admin" / "tags")
        .and(warp::post())
        .and(with_user(state.clone()))
        .and(with_state(state.clone()))
        .and(form_body())
        .and_then(create_tag);

    let retrieve = warp::path!("api" / "admin" / "tags" / Uuid)
        .and(warp::get())
        .and(with_user(state.clone()))
        .and(with_state(state.clone()))
        .and_then(get_tag);

    let update = warp::path!("api" / "admin" / "tags" / Uuid)
        .and(update_method())
        .and(with_user(state.clone()))
        .and(with_state(state.clone()))
        .and(form_body())
        .and_then(update_tag);

    let delete = warp::path!("api" / "admin" / "tags" / Uuid)
        .and(warp::delete())
        .and(with_user(state.clone()))
        .and(with_state(state))
        .and_then(delete_tag);

    list.or(create).or(retrieve).or(update).or(delete)
}

async fn list_users(staff: User, state: AppState) -> Result<Response, Rejection> {
    let rows = admin::list_users(state.repo(), &staff).await?;

    Ok(json_reply(&rows, StatusCode::OK))
}

async fn create_user(staff: User, state: AppState, data: FormData) -> Result<Response, Rejection> {
    let user = admin::create_user(state.repo(), &staff, Form::from_data(data)).await?;

    Ok(json_reply(&user, StatusCode::CREATED))
}

async fn get_user(id: Uuid, staff: User, state: AppState) -> Result<Response, Rejection> {
    let user = admin::get_user(state.repo(), &staff, id).await?;

    Ok(json_reply(&user, StatusCode::OK))
}

async fn update_user(
    id: Uuid,
    partial: bool,
    staff: User,
    state: AppState,
    data: FormData,
) -> Result<Response, Rejection> {
    let form = Form::from_data(data).partial(partial);
    let user = admin::update_user(state.repo(), &staff, id, form).await?;

    Ok(json_reply(&user, StatusCode::OK))
}

async fn delete_user(id: Uuid, staff: User, state: AppState) -> Result<Response, Rejection> {
    admin::delete_user(state.repo(), &staff, id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn list_recipes(staff: User, state: AppState) -> Result<Response, Rejection> {
    let rows = admin::list_recipes(state.repo(), &staff).await?;

    Ok(json_reply(&rows, StatusCode::OK))
}

async fn create_recipe(staff: User, state: AppState, data: FormData) -> Result<Response, Rejection> {
    let recipe = admin::create_recipe(state.repo(), &staff, Form::from_data(data)).await?;

    Ok(json_reply(&recipe, StatusCode::CREATED))
}

async fn get_recipe(id: Uuid, staff: User, state: AppState) -> Result<Response, Rejection> {
    let recipe = admin::get_recipe(state.repo(), &staff, id).await?;

    Ok(json_reply(&recipe, StatusCode::OK))
}

async fn update_recipe(
    id: Uuid,
    partial: bool,
    staff: User,
    state: AppState,
    data: FormData,
) -> Result<Response, Rejection> {
    let form = Form::from_data(data).partial(partial);
    let recipe = admin::update_recipe(state.repo(), &staff, id, form).await?;

    Ok(json_reply(&recipe, StatusCode::OK))
}

async fn delete_recipe(id: Uuid, staff: User, state: AppState) -> Result<Response, Rejection> {
    admin::delete_recipe(state.repo(), &staff, id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn list_tags(staff: User, state: AppState) -> Result<Response, Rejection> {
    let rows = admin::list_tags(state.repo(), &staff).await?;

    Ok(json_reply(&rows, StatusCode::OK))
}

async fn create_tag(staff: User, state: AppState, data: FormData) -> Result<Response, Rejection> {
    let tag = admin::create_tag(state.repo(), &staff, Form::from_data(data)).await?;

    Ok(json_reply(&tag, StatusCode::CREATED))
}

async fn get_tag(id: Uuid, staff: User, state: AppState) -> Result<Response, Rejection> {
    let tag = admin::get_tag(state.repo(), &staff, id).await?;

    Ok(json_reply(&tag, StatusCode::OK))
}

async fn update_tag(
    id: Uuid,
    partial: bool,
    staff: User,
    state: AppState,
    data: FormData,
) -> Result<Response, Rejection> {
    let form = Form::from_data(data).partial(partial);
    let tag = admin::update_tag(state.repo(), &staff, id, form).await?;

    Ok(json_reply(&tag, StatusCode::OK))
}

async fn delete_tag(id: Uuid, staff: User, state: AppState) -> Result<Response, Rejection> {
    admin::delete_tag(state.repo(), &staff, id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
