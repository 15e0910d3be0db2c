//! HTTP handlers for `/api/posts`.
//!
//! Service outcomes are mapped to statuses here. Malformed JSON is not a
//! service outcome: it is returned as an `Err` and answered `500` by the
//! dispatcher.

use serde::Serialize;

use crate::app::AppContext;
use crate::error::Error;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

use super::model::PostDto;
use super::service::{PostError, Saved};

/// Collection path. Single posts live under `{POSTS_PATH}/{id}`.
pub const POSTS_PATH: &str = "/api/posts";

fn json<T: Serialize>(status: Status, value: &T) -> Result<Response, Error> {
    Ok(Response::builder().status(status).json(serde_json::to_vec(value)?))
}

/// `GET /api/posts`
pub async fn all(_req: Request, ctx: AppContext) -> Result<Response, Error> {
    json(Status::Ok, &ctx.posts().all())
}

/// `GET /api/posts/{id}`
pub async fn get_by_id(req: Request, ctx: AppContext) -> Result<Response, Error> {
    let Some(id) = req.id_param() else {
        return Ok(Response::status(Status::NotFound));
    };
    match ctx.posts().get_by_id(id) {
        Ok(post) => json(Status::Ok, &post),
        Err(PostError::NotFound(_)) => Ok(Response::status(Status::NotFound)),
    }
}

/// `POST /api/posts`: `201` on create, `200` on update.
pub async fn save(req: Request, ctx: AppContext) -> Result<Response, Error> {
    let dto: PostDto = serde_json::from_slice(req.body())?;
    match ctx.posts().save(dto) {
        Ok(Saved::Created(post)) => Ok(Response::builder()
            .status(Status::Created)
            .header("location", &format!("{POSTS_PATH}/{}", post.id))
            .json(serde_json::to_vec(&post)?)),
        Ok(Saved::Updated(post)) => json(Status::Ok, &post),
        Err(PostError::NotFound(_)) => Ok(Response::status(Status::NotFound)),
    }
}

/// `DELETE /api/posts/{id}`: `204` whether or not the post existed.
pub async fn remove_by_id(req: Request, ctx: AppContext) -> Result<Response, Error> {
    let Some(id) = req.id_param() else {
        return Ok(Response::status(Status::NotFound));
    };
    ctx.posts().remove_by_id(id);
    Ok(Response::status(Status::NoContent))
}
