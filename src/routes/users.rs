use warp::{http::StatusCode, reject::Rejection, reply::Response, Filter, Reply};

use super::{form_body, json_reply, update_method};
use crate::{
    actions::users,
    authentication::middleware::with_user,
    form::{Form, FormData},
    schema::User,
    state::{with_state, AppState},
};

pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let create = warp::path!("api" / "user" / "create")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(form_body())
        .and_then(create_user);

    let token = warp::path!("api" / "user" / "token")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(form_body())
        .and_then(create_token);

    let me = warp::path!("api" / "user" / "me")
        .and(warp::get())
        .and(with_user(state.clone()))
        .and_then(get_me);

    let update_me = warp::path!("api" / "user" / "me")
        .and(update_method())
        .and(with_user(state.clone()))
        .and(with_state(state))
        .and(form_body())
        .and_then(update_me);

    create.or(token).or(me).or(update_me)
}

async fn create_user(state: AppState, data: FormData) -> Result<Response, Rejection> {
    let profile = users::register(state.repo(), Form::from_data(data)).await?;

    Ok(json_reply(&profile, StatusCode::CREATED))
}

async fn create_token(state: AppState, data: FormData) -> Result<Response, Rejection> {
    let token = users::obtain_token(state.repo(), &state.keys, Form::from_data(data)).await?;

    Ok(json_reply(&token, StatusCode::OK))
}

async fn get_me(user: User) -> Result<Response, Rejection> {
    let profile = users::me(&user)?;

    Ok(json_reply(&profile, StatusCode::OK))
}

async fn update_me(
    partial: bool,
    user: User,
    state: AppState,
    data: FormData,
) -> Result<Response, Rejection> {
    let form = Form::from_data(data).partial(partial);
    let profile = users::update_me(state.repo(), user, form).await?;

    Ok(json_reply(&profile, StatusCode::OK))
}
