use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::pedidos::{CrearPedidoRequest, ListaPedidos, PedidoCreado},
    error::AppResult,
    response::ApiResponse,
    services::pedido_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(crear_pedido))
        .route("/usuario/{usuario_id}", get(listar_pedidos_usuario))
}

#[utoipa::path(
    post,
    path = "/pedidos",
    request_body = CrearPedidoRequest,
    responses(
        (status = 201, description = "Pedido creado, actualizado o dirección corregida", body = ApiResponse<PedidoCreado>),
        (status = 400, description = "Dirección incompleta, carrito vacío, línea inválida o sin impuesto activo"),
        (status = 404, description = "Un producto del carrito ya no existe"),
        (status = 502, description = "Cart store no disponible"),
        (status = 500, description = "Fallo de persistencia"),
    ),
    tag = "Pedidos"
)]
pub async fn crear_pedido(
    State(state): State<AppState>,
    Json(payload): Json<CrearPedidoRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<PedidoCreado>>)> {
    // Invalid input must surface before the cart store is contacted; the
    // service validates again so it stays self-contained.
    payload.validar()?;

    // The live cart is fetched up front; reconciliation itself only sees the
    // snapshot, never the store.
    let carrito = state.carts.get_cart(&payload.usuario_id).await?;

    let body = pedido_service::crear_o_actualizar_pedido(&state, payload, carrito).await?;
    Ok((StatusCode::CREATED, Json(body)))
}

#[utoipa::path(
    get,
    path = "/pedidos/usuario/{usuario_id}",
    params(
        ("usuario_id" = String, Path, description = "Identificador externo del usuario")
    ),
    responses(
        (status = 200, description = "Pedidos del usuario", body = ApiResponse<ListaPedidos>),
        (status = 404, description = "Usuario desconocido"),
    ),
    tag = "Pedidos"
)]
pub async fn listar_pedidos_usuario(
    State(state): State<AppState>,
    Path(usuario_id): Path<String>,
) -> AppResult<Json<ApiResponse<ListaPedidos>>> {
    let body = pedido_service::listar_pedidos_usuario(&state, &usuario_id).await?;
    Ok(Json(body))
}
