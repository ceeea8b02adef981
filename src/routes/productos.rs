use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::productos::{ListaProductos, ProductoConImagenes},
    error::AppResult,
    response::ApiResponse,
    routes::params::ProductoQuery,
    services::producto_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(listar_productos))
        .route("/{id}", get(obtener_producto))
}

#[utoipa::path(
    get,
    path = "/productos",
    params(
        ("page" = Option<i64>, Query, description = "Página, por defecto 1"),
        ("per_page" = Option<i64>, Query, description = "Elementos por página, por defecto 20"),
        ("q" = Option<String>, Query, description = "Búsqueda por nombre o descripción")
    ),
    responses(
        (status = 200, description = "Catálogo de lámparas", body = ApiResponse<ListaProductos>)
    ),
    tag = "Productos"
)]
pub async fn listar_productos(
    State(state): State<AppState>,
    Query(query): Query<ProductoQuery>,
) -> AppResult<Json<ApiResponse<ListaProductos>>> {
    let body = producto_service::listar_productos(&state, query).await?;
    Ok(Json(body))
}

#[utoipa::path(
    get,
    path = "/productos/{id}",
    params(
        ("id" = i32, Path, description = "Identificador del producto")
    ),
    responses(
        (status = 200, description = "Producto con sus imágenes", body = ApiResponse<ProductoConImagenes>),
        (status = 404, description = "Producto inexistente"),
    ),
    tag = "Productos"
)]
pub async fn obtener_producto(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<ProductoConImagenes>>> {
    let body = producto_service::obtener_producto(&state, id).await?;
    Ok(Json(body))
}
