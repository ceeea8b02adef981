use utoipa::OpenApi;
use utoipa::openapi::OpenApi as OpenApiSpec;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        pedidos::{CrearPedidoRequest, DireccionInput, ListaPedidos, PedidoCreado, ResumenPedido},
        productos::{ListaProductos, ProductoConImagenes},
    },
    models::{Imagen, Producto},
    response::{ApiResponse, Meta},
    routes::{health, params, pedidos, productos},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        pedidos::crear_pedido,
        pedidos::listar_pedidos_usuario,
        productos::listar_productos,
        productos::obtener_producto,
    ),
    components(
        schemas(
            Producto,
            Imagen,
            DireccionInput,
            CrearPedidoRequest,
            PedidoCreado,
            ResumenPedido,
            ListaPedidos,
            ProductoConImagenes,
            ListaProductos,
            params::Pagination,
            params::ProductoQuery,
            Meta,
            ApiResponse<PedidoCreado>,
            ApiResponse<ListaPedidos>,
            ApiResponse<ListaProductos>,
            ApiResponse<ProductoConImagenes>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Pedidos", description = "Conversión de carrito a pedido e historial"),
        (name = "Productos", description = "Catálogo de lámparas"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
