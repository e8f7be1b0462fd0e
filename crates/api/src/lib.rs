pub mod game;
pub mod gateway;
pub mod leaderboard;
pub mod preload;
pub mod view;

#[cfg(test)]
mod testing;

pub use game::Game;

use gateway::Gateway;
use http_body_util::{BodyExt, Full};
use hyper::{
    body::{Body, Buf, Bytes},
    header::{HeaderValue, CONTENT_TYPE},
    Method, Request, Response, StatusCode,
};
use preload::Fetch;
use serde::{de::DeserializeOwned, Deserialize};

/// Payload of `POST /start`.
#[derive(Deserialize)]
struct Login {
    username: String,
}

/// Payload of `POST /answer`.
#[derive(Deserialize)]
struct Selection {
    question: usize,
    choice: usize,
}

const ROUTES: [&str; 6] = ["/view", "/init", "/start", "/answer", "/again", "/login"];

/// Serves a browser request. Failures become empty responses with the matching status.
pub async fn respond<B, G, F>(req: Request<B>, game: &Game<G, F>) -> Response<Full<Bytes>>
where
    B: Body,
    G: Gateway,
    F: Fetch,
{
    match try_respond(req, game).await {
        Ok(res) => res,
        Err(code) => {
            let mut res = Response::new(Full::new(Bytes::new()));
            *res.status_mut() = code;
            res
        }
    }
}

pub async fn try_respond<B, G, F>(req: Request<B>, game: &Game<G, F>) -> Result<Response<Full<Bytes>>, StatusCode>
where
    B: Body,
    G: Gateway,
    F: Fetch,
{
    let (parts, body) = req.into_parts();
    let path = parts.uri.path();

    if let Some(index) = path.strip_prefix("/image/") {
        if parts.method != Method::GET {
            return Err(StatusCode::METHOD_NOT_ALLOWED);
        }
        let index = index.parse().map_err(|_| StatusCode::NOT_FOUND)?;
        let bytes = game.image(index).await.ok_or(StatusCode::NOT_FOUND)?;
        return Ok(Response::new(Full::new(bytes)));
    }

    match (&parts.method, path) {
        (&Method::GET, "/view") => (),
        (&Method::POST, "/init") => game.init_game().await,
        (&Method::POST, "/start") => {
            let Login { username } = parse(body).await?;
            game.set_username(&username).await;
            if let Err(err) = game.start_game().await {
                log::warn!("refused to start a game: {err}");
            }
        }
        (&Method::POST, "/answer") => {
            let Selection { question, choice } = parse(body).await?;
            if !game.select_answer(question, choice).await {
                log::warn!("answer {choice} to question {question} arrived with no game running");
            }
        }
        (&Method::POST, "/again") => {
            if let Err(err) = game.play_again().await {
                log::warn!("refused to replay: {err}");
            }
        }
        (&Method::POST, "/login") => game.show_login().await,
        (_, path) if ROUTES.contains(&path) => return Err(StatusCode::METHOD_NOT_ALLOWED),
        _ => return Err(StatusCode::NOT_FOUND),
    }

    let view = game.snapshot().await;
    let bytes = serde_json::to_vec(&view).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let mut res = Response::new(Full::new(Bytes::from(bytes)));
    assert!(res.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json")).is_none());
    Ok(res)
}

async fn parse<T, B>(body: B) -> Result<T, StatusCode>
where
    T: DeserializeOwned,
    B: Body,
{
    let reader = body.collect().await.map_err(|_| StatusCode::BAD_REQUEST)?.aggregate().reader();
    serde_json::from_reader(reader).map_err(|_| StatusCode::BAD_REQUEST)
}
