use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Shipping address as submitted at checkout. Missing mandatory fields are
/// reported as a 400 by [`DireccionInput::validar`], not as a deserialization
/// rejection, so the client always gets the same error shape.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DireccionInput {
    #[serde(default)]
    pub cedula: String,
    #[serde(default)]
    pub nombre_completo: String,
    #[serde(default)]
    pub telefono: String,
    #[serde(default)]
    pub calle_principal: String,
    pub calle_secundaria: Option<String>,
    #[serde(default)]
    pub ciudad: String,
    #[serde(default)]
    pub provincia: String,
    pub numeracion: Option<String>,
    pub referencia: Option<String>,
    pub codigo_postal: Option<String>,
}

impl DireccionInput {
    pub fn validar(&self) -> AppResult<()> {
        let obligatorios = [
            ("cedula", &self.cedula),
            ("nombre_completo", &self.nombre_completo),
            ("telefono", &self.telefono),
            ("calle_principal", &self.calle_principal),
            ("ciudad", &self.ciudad),
            ("provincia", &self.provincia),
        ];
        for (campo, valor) in obligatorios {
            if valor.trim().is_empty() {
                return Err(AppError::BadRequest(format!(
                    "La dirección está incompleta: falta {campo}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CrearPedidoRequest {
    pub direccion: Option<DireccionInput>,
    #[serde(default)]
    pub usuario_id: String,
}

impl CrearPedidoRequest {
    /// Check both inputs before anything external is touched; returns the
    /// validated address.
    pub fn validar(&self) -> AppResult<&DireccionInput> {
        let direccion = self
            .direccion
            .as_ref()
            .ok_or_else(|| AppError::BadRequest("La dirección es obligatoria".into()))?;
        direccion.validar()?;
        if self.usuario_id.trim().is_empty() {
            return Err(AppError::BadRequest("usuario_id es obligatorio".into()));
        }
        Ok(direccion)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PedidoCreado {
    pub pedido_id: i32,
    pub direccion_id: i32,
    pub usuario_id: i32,
}

/// One order as shown in a user's order history: thumbnail of the first
/// line's product, joined product names and dates localized at UTC-5.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResumenPedido {
    pub id: i32,
    pub estado: i32,
    pub precio: Decimal,
    pub precio_final: Decimal,
    pub miniatura: Option<String>,
    pub productos: String,
    pub cantidad_total: i64,
    pub fecha_es: String,
    pub fecha_en: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListaPedidos {
    pub items: Vec<ResumenPedido>,
}
