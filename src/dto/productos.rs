use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Imagen, Producto};

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductoConImagenes {
    #[serde(flatten)]
    pub producto: Producto,
    pub imagenes: Vec<Imagen>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListaProductos {
    pub items: Vec<ProductoConImagenes>,
}
