use warp::{http::StatusCode, reject::Rejection, reply::Response, Filter, Reply};

use super::{form_body, json_reply, update_method};
use crate::{
    actions::recipes,
    authentication::middleware::with_user,
    form::{Form, FormData},
    schema::{User, Uuid},
    state::{with_state, AppState},
};

pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let list = warp::path!("api" / "recipe" / "recipes")
        .and(warp::get())
        .and(with_user(state.clone()))
        .and(with_state(state.clone()))
        .and_then(list_recipes);

    let create = warp::path!("api" / "recipe" / "recipes")
        .and(warp::post())
        .and(with_user(state.clone()))
        .and(with_state(state.clone()))
        .and(form_body())
        .and_then(create_recipe);

    let retrieve = warp::path!("api" / "recipe" / "recipes" / Uuid)
        .and(warp::get())
        .and(with_user(state.clone()))
        .and(with_state(state.clone()))
        .and_then(get_recipe);

    let update = warp::path!("api" / "recipe" / "recipes" / Uuid)
        .and(update_method())
        .and(with_user(state.clone()))
        .and(with_state(state.clone()))
        .and(form_body())
        .and_then(update_recipe);

    let delete = warp::path!("api" / "recipe" / "recipes" / Uuid)
        .and(warp::delete())
        .and(with_user(state.clone()))
        .and(with_state(state))
        .and_then(delete_recipe);

    list.or(create).or(retrieve).or(update).or(delete)
}

async fn list_recipes(user: User, state: AppState) -> Result<Response, Rejection> {
    let rows = recipes::list_recipes(state.repo(), &user).await?;

    Ok(json_reply(&rows, StatusCode::OK))
}

async fn create_recipe(user: User, state: AppState, data: FormData) -> Result<Response, Rejection> {
    let recipe = recipes::create_recipe(state.repo(), &user, Form::from_data(data)).await?;

    Ok(json_reply(&recipe, StatusCode::CREATED))
}

async fn get_recipe(id: Uuid, user: User, state: AppState) -> Result<Response, Rejection> {
    let recipe = recipes::get_recipe(state.repo(), &user, id).await?;

    Ok(json_reply(&recipe, StatusCode::OK))
}

async fn update_recipe(
    id: Uuid,
    partial: bool,
    user: User,
    state: AppState,
    data: FormData,
) -> Result<Response, Rejection> {
    let form = Form::from_data(data).partial(partial);
    let recipe = recipes::update_recipe(state.repo(), &user, id, form).await?;

    Ok(json_reply(&recipe, StatusCode::OK))
}

async fn delete_recipe(id: Uuid, user: User, state: AppState) -> Result<Response, Rejection> {
    recipes::delete_recipe(state.repo(), &user, id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
