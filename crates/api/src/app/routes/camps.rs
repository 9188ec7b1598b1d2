use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Extension, Path, Query},
    http::{header, HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};

use codecamp_core::{DomainError, ValidationErrors};

use crate::app::dto::{self, CampModel, CampPath, CampRequest, EventDatePath, IncludeTalksQuery};
use crate::app::errors::ApiError;
use crate::app::routes::talks;
use crate::app::services::Repo;
use crate::app::versioning::{self, ApiVersion, RequestedVersion};

pub fn router() -> Router {
    let mutation = || from_fn_with_state(ApiVersion::MUTATIONS, versioning::require_version);

    Router::new()
        .route("/", get(list_camps).merge(post(create_camp).route_layer(mutation())))
        .route("/searchByDate/:event_date", get(search_by_event_date))
        .route(
            "/:moniker",
            get(get_camp)
                .merge(put(update_camp).route_layer(mutation()))
                .merge(delete(delete_camp).route_layer(mutation())),
        )
        .route("/:moniker/talks/:talk_id", get(talks::get_talk))
}

fn include_talks(query: Result<Query<IncludeTalksQuery>, QueryRejection>) -> Result<bool, ApiError> {
    query
        .map(|Query(q)| q.include_talks)
        .map_err(|e| ApiError::InvalidParameter(e.body_text()))
}

fn camp_models(camps: Vec<codecamp_camps::Camp>) -> Vec<CampModel> {
    camps.into_iter().map(CampModel::from).collect()
}

pub async fn list_camps(
    Repo(repo): Repo,
    query: Result<Query<IncludeTalksQuery>, QueryRejection>,
) -> Result<Json<Vec<CampModel>>, ApiError> {
    let camps = repo.get_all_camps(include_talks(query)?).await?;
    Ok(Json(camp_models(camps)))
}

pub async fn get_camp(
    Repo(repo): Repo,
    Path(path): Path<CampPath>,
    query: Result<Query<IncludeTalksQuery>, QueryRejection>,
) -> Result<Json<CampModel>, ApiError> {
    let camp = repo
        .get_camp(&path.moniker, include_talks(query)?)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(CampModel::from(camp)))
}

pub async fn search_by_event_date(
    Repo(repo): Repo,
    Path(path): Path<EventDatePath>,
    query: Result<Query<IncludeTalksQuery>, QueryRejection>,
) -> Result<Json<Vec<CampModel>>, ApiError> {
    let date = dto::parse_event_date(&path.event_date)
        .ok_or_else(|| ApiError::InvalidParameter(format!("invalid event date '{}'", path.event_date)))?;
    let camps = repo.get_all_camps_by_event_date(date, include_talks(query)?).await?;
    Ok(Json(camp_models(camps)))
}

pub async fn create_camp(
    Repo(mut repo): Repo,
    Extension(version): Extension<RequestedVersion>,
    body: Result<Json<CampRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::InvalidBody(e.body_text()))?;

    let mut errors = ValidationErrors::new();
    if let Some(moniker) = body.moniker.as_deref() {
        if repo.get_camp(moniker, false).await?.is_some() {
            errors.add(codecamp_camps::moniker::MONIKER_FIELD, crate::app::errors::MONIKER_IN_USE);
        }
    }
    let camp = match body.into_camp() {
        Ok(camp) if errors.is_empty() => camp,
        Ok(_) => return Err(ApiError::Validation(errors)),
        Err(DomainError::Validation(invalid)) => {
            errors.extend(invalid);
            return Err(ApiError::Validation(errors));
        }
        Err(other) => return Err(other.into()),
    };

    let moniker = camp.moniker.clone();
    let location = HeaderValue::try_from(format!("{}/camps/{}", version.api_prefix(), moniker))
        .map_err(|e| ApiError::Internal(format!("location for camp '{moniker}': {e}")))?;

    repo.add_camp(camp);
    if !repo.save_changes().await? {
        return Err(ApiError::CommitFailed);
    }

    let created = repo
        .get_camp(&moniker, false)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("camp '{moniker}' missing after commit")))?;
    tracing::info!(moniker = %moniker, "camp created");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(CampModel::from(created)),
    ))
}

pub async fn update_camp(
    Repo(mut repo): Repo,
    Path(path): Path<CampPath>,
    body: Result<Json<CampRequest>, JsonRejection>,
) -> Result<Json<CampModel>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::InvalidBody(e.body_text()))?;

    let mut camp = repo.get_camp(&path.moniker, false).await?.ok_or(ApiError::NotFound)?;

    if let Some(moniker) = body.moniker.as_deref() {
        if moniker != camp.moniker && repo.get_camp(moniker, false).await?.is_some() {
            return Err(ApiError::moniker_in_use());
        }
    }
    body.apply_to(&mut camp)?;

    let moniker = camp.moniker.clone();
    repo.update_camp(camp)?;
    if !repo.save_changes().await? {
        return Err(ApiError::CommitFailed);
    }

    let updated = repo
        .get_camp(&moniker, false)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("camp '{moniker}' missing after commit")))?;
    tracing::info!(moniker = %moniker, "camp updated");
    Ok(Json(CampModel::from(updated)))
}

pub async fn delete_camp(Repo(mut repo): Repo, Path(path): Path<CampPath>) -> Result<StatusCode, ApiError> {
    let camp = repo.get_camp(&path.moniker, false).await?.ok_or(ApiError::NotFound)?;

    repo.delete_camp(camp)?;
    if !repo.save_changes().await? {
        return Err(ApiError::CommitFailed);
    }
    tracing::info!(moniker = %path.moniker, "camp deleted");
    Ok(StatusCode::OK)
}
