//! Content CRUD handlers
//!
//! One set of generic handlers serves every collection; the concrete
//! repository is picked through [`ContentSource`].

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::state::{AppState, ContentSource};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use folio_core::Content;
use std::sync::Arc;
use uuid::Uuid;

fn check_required<T: Content>(item: &T) -> Result<(), AppError> {
    match item.missing_field() {
        Some(field) => Err(AppError::BadRequest(format!("{field} is required"))),
        None => Ok(()),
    }
}

fn actor(user: &Option<Extension<AuthenticatedUser>>) -> &str {
    user.as_ref().map_or("anonymous", |Extension(u)| u.user_id.as_str())
}

/// List every item in a collection
pub async fn list_items<T>(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError>
where
    T: Content,
    AppState: ContentSource<T>,
{
    let items = ContentSource::<T>::repository(state.as_ref()).list().await?;
    Ok(Json(items))
}

/// Fetch one item by id
pub async fn get_item<T>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    T: Content,
    AppState: ContentSource<T>,
{
    let item = ContentSource::<T>::repository(state.as_ref())
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {id}", T::COLLECTION)))?;

    Ok(Json(item))
}

/// Create an item, assigning a UUID when no id is given
pub async fn create_item<T>(
    State(state): State<Arc<AppState>>,
    user: Option<Extension<AuthenticatedUser>>,
    Json(mut item): Json<T>,
) -> Result<impl IntoResponse, AppError>
where
    T: Content,
    AppState: ContentSource<T>,
{
    if item.id().trim().is_empty() {
        item.set_id(Uuid::new_v4().to_string());
    }
    check_required(&item)?;

    ContentSource::<T>::repository(state.as_ref()).create(&item).await?;

    tracing::info!(
        collection = T::COLLECTION,
        id = item.id(),
        actor = actor(&user),
        "Content created"
    );
    Ok((StatusCode::CREATED, Json(item)))
}

/// Replace an item; the id in the path wins over the body
pub async fn update_item<T>(
    State(state): State<Arc<AppState>>,
    user: Option<Extension<AuthenticatedUser>>,
    Path(id): Path<String>,
    Json(mut item): Json<T>,
) -> Result<impl IntoResponse, AppError>
where
    T: Content,
    AppState: ContentSource<T>,
{
    item.set_id(id);
    check_required(&item)?;

    ContentSource::<T>::repository(state.as_ref()).update(&item).await?;

    tracing::info!(
        collection = T::COLLECTION,
        id = item.id(),
        actor = actor(&user),
        "Content updated"
    );
    Ok(Json(item))
}

/// Delete an item
pub async fn delete_item<T>(
    State(state): State<Arc<AppState>>,
    user: Option<Extension<AuthenticatedUser>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    T: Content,
    AppState: ContentSource<T>,
{
    ContentSource::<T>::repository(state.as_ref()).delete(&id).await?;

    tracing::info!(
        collection = T::COLLECTION,
        id = %id,
        actor = actor(&user),
        "Content deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// `/<collection>` and `/<collection>/:id` routes for one content type
pub fn collection_routes<T>() -> Router<Arc<AppState>>
where
    T: Content,
    AppState: ContentSource<T>,
{
    Router::new()
        .route(
            &format!("/{}", T::COLLECTION),
            get(list_items::<T>).post(create_item::<T>),
        )
        .route(
            &format!("/{}/:id", T::COLLECTION),
            get(get_item::<T>)
                .put(update_item::<T>)
                .delete(delete_item::<T>),
        )
}
