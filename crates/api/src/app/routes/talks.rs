use axum::{extract::Path, Json};

use codecamp_core::TalkId;

use crate::app::dto::{TalkModel, TalkPath};
use crate::app::errors::ApiError;
use crate::app::services::Repo;

pub async fn get_talk(Repo(repo): Repo, Path(path): Path<TalkPath>) -> Result<Json<TalkModel>, ApiError> {
    let talk_id: TalkId = path.talk_id.parse()?;
    let talk = repo
        .get_talk_by_moniker(&path.moniker, talk_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(TalkModel::from(talk)))
}
