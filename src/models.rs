use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Producto {
    pub id: i32,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub precio: Decimal,
    pub creado_en: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Imagen {
    pub id: i32,
    pub producto_id: i32,
    pub url: String,
    pub es_miniatura: bool,
}
