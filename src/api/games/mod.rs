pub(crate) mod form;
mod handlers;

use axum::{routing::get, routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/game", post(handlers::create_game).get(handlers::get_game))
        .route("/game/end", post(handlers::end_game))
        .route("/games", get(handlers::list_games))
}
