use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{CreateProductRequest, ListQuery, ProductResponse, UpdateProductRequest};
use crate::{entity::Product, error::Result, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(body) = payload?;
    let product = Product::new(body.name, body.description, body.price)?;
    state.products.create(&product).await?;

    info!(product_id = %product.id, "product created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/products/{}", product.id))],
        Json(ProductResponse::from(&product)),
    ))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>> {
    let product = state.products.find_by_id(&id).await?;
    Ok(Json(ProductResponse::from(&product)))
}

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<ProductResponse>>> {
    let products = state
        .products
        .find_all(q.page(), q.limit(), q.sort())
        .await?;
    Ok(Json(products.iter().map(ProductResponse::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Result<Json<ProductResponse>> {
    let mut product = state.products.find_by_id(&id).await?;
    let Json(body) = payload?;

    if let Some(name) = body.name {
        product.name = name;
    }
    if let Some(description) = body.description {
        product.description = description;
    }
    if let Some(price) = body.price {
        product.price = price;
    }

    state.products.update(&mut product).await?;
    info!(product_id = %product.id, "product updated");
    Ok(Json(ProductResponse::from(&product)))
}

#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.products.find_by_id(&id).await?;
    state.products.delete(&id).await?;
    info!(product_id = %id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}
