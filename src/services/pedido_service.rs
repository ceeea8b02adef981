use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder, Set, Statement, TransactionTrait,
};

use crate::{
    cart_store::CartSnapshot,
    dto::pedidos::{CrearPedidoRequest, DireccionInput, ListaPedidos, PedidoCreado, ResumenPedido},
    entity::{
        direcciones::{self, ActiveModel as DireccionActive, Entity as Direcciones},
        imagenes::{self, Column as ImagenCol, Entity as Imagenes},
        impuestos::{Column as ImpuestoCol, Entity as Impuestos},
        pedidos::{self, ActiveModel as PedidoActive, Column as PedidoCol, Entity as Pedidos},
        producto_pedido::{
            ActiveModel as LineaActive, Column as LineaCol, Entity as ProductoPedido,
        },
        productos::Entity as Productos,
        usuario_pedido::{
            ActiveModel as UsuarioPedidoActive, Column as UsuarioPedidoCol, Entity as UsuarioPedido,
        },
        usuarios::{ActiveModel as UsuarioActive, Column as UsuarioCol, Entity as Usuarios},
    },
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Status code for an order that has not been paid yet. At most one such
/// order may exist per user; reconciliation updates it in place.
pub const ESTADO_ESPERANDO_PAGO: i32 = 8;

/// AI-generation credits granted when a user record is created implicitly
/// at checkout.
pub const CREDITOS_INICIALES: i32 = 3;

/// Flat shipping fee, added to every order.
pub fn tarifa_envio() -> Decimal {
    Decimal::new(200, 2)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totales {
    pub subtotal: Decimal,
    pub impuesto: Decimal,
    pub envio: Decimal,
    pub total: Decimal,
}

/// Price breakdown for a given subtotal and active-tax percentage.
/// Tax and total are rounded to 2 decimal places.
pub fn calcular_totales(subtotal: Decimal, porcentaje: Decimal) -> Totales {
    let impuesto = (subtotal * porcentaje / Decimal::ONE_HUNDRED).round_dp(2);
    let envio = tarifa_envio();
    let total = (subtotal + impuesto + envio).round_dp(2);
    Totales {
        subtotal,
        impuesto,
        envio,
        total,
    }
}

/// Pick the image to show for an order: an explicit thumbnail wins, else the
/// first image in insertion order, else nothing. `imagenes` must already be
/// sorted by insertion order.
pub fn elegir_miniatura(imagenes: &[imagenes::Model]) -> Option<String> {
    imagenes
        .iter()
        .find(|i| i.es_miniatura)
        .or_else(|| imagenes.first())
        .map(|i| i.url.clone())
}

// Display dates are always rendered at UTC-5, the shop's timezone,
// regardless of server locale.
fn zona_tienda() -> FixedOffset {
    FixedOffset::west_opt(5 * 3600).unwrap()
}

const MESES_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

const MESES_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// "12 de mayo de 2025, 14:30"
pub fn formatear_fecha_es(fecha: DateTime<Utc>) -> String {
    let local = fecha.with_timezone(&zona_tienda());
    format!(
        "{} de {} de {}, {:02}:{:02}",
        local.day(),
        MESES_ES[local.month0() as usize],
        local.year(),
        local.hour(),
        local.minute()
    )
}

/// "May 12, 2025, 2:30 PM"
pub fn formatear_fecha_en(fecha: DateTime<Utc>) -> String {
    let local = fecha.with_timezone(&zona_tienda());
    let (pm, hora) = local.hour12();
    format!(
        "{} {}, {}, {}:{:02} {}",
        MESES_EN[local.month0() as usize],
        local.day(),
        local.year(),
        hora,
        local.minute(),
        if pm { "PM" } else { "AM" }
    )
}

/// Convert the user's live cart into a durable order.
///
/// The whole decision sequence runs inside one transaction holding a per-user
/// advisory lock, so two concurrent checkouts from the same user serialize:
///
/// 1. the cart-session token already belongs to one of the user's orders —
///    retried request for a finished checkout; only the address is corrected,
///    totals and lines stay untouched;
/// 2. the user still has an order awaiting payment — it is overwritten with
///    the current cart (latest cart state wins, lines replaced wholesale);
/// 3. otherwise a fresh address, order, association and line rows are created.
///
/// Any failure rolls the transaction back; no partial state is committed.
pub async fn crear_o_actualizar_pedido(
    state: &AppState,
    payload: CrearPedidoRequest,
    carrito: Option<CartSnapshot>,
) -> AppResult<ApiResponse<PedidoCreado>> {
    let direccion = payload.validar()?;

    let carrito = carrito
        .filter(|c| !c.is_empty())
        .ok_or(AppError::EmptyCart)?;

    let txn = state.orm.begin().await?;

    // The user may have authenticated upstream without ever hitting a
    // login-sync endpoint; checkout must not fail because of that.
    let usuario = match Usuarios::find()
        .filter(UsuarioCol::Auth0Id.eq(payload.usuario_id.clone()))
        .one(&txn)
        .await?
    {
        Some(u) => u,
        None => {
            UsuarioActive {
                id: NotSet,
                auth0_id: Set(Some(payload.usuario_id.clone())),
                creditos: Set(CREDITOS_INICIALES),
                ultima_conexion: Set(Some(Utc::now().into())),
            }
            .insert(&txn)
            .await?
        }
    };

    bloquear_usuario(&txn, usuario.id).await?;

    let pedidos_existentes = pedidos_de_usuario(&txn, usuario.id).await?;

    // Retried request for a checkout that already went through: the address
    // is still correctable, totals and lines must not drift.
    if let Some(pedido) = pedidos_existentes
        .iter()
        .find(|p| p.temporal_id == carrito.temporal_id)
    {
        let direccion_id = guardar_direccion(&txn, pedido.direccion_id, direccion).await?;
        if pedido.direccion_id != Some(direccion_id) {
            let mut activo: PedidoActive = pedido.clone().into();
            activo.direccion_id = Set(Some(direccion_id));
            activo.update(&txn).await?;
        }
        let resultado = PedidoCreado {
            pedido_id: pedido.id,
            direccion_id,
            usuario_id: usuario.id,
        };
        txn.commit().await?;
        return Ok(ApiResponse::success(
            "Dirección actualizada en pedido existente",
            resultado,
            Some(Meta::empty()),
        ));
    }

    // Prices come from the catalog at call time, never from the cart payload.
    // Quantities are narrowed here too, so the stored lines always match the
    // quantities the subtotal was computed from.
    let mut subtotal = Decimal::ZERO;
    let mut lineas_validas: Vec<(i32, i32)> = Vec::with_capacity(carrito.items.len());
    for linea in &carrito.items {
        let cantidad = i32::try_from(linea.quantity)
            .ok()
            .filter(|c| *c > 0)
            .ok_or(AppError::InvalidCartLine(linea.database_product_id))?;
        let producto = Productos::find_by_id(linea.database_product_id)
            .one(&txn)
            .await?
            .ok_or(AppError::ProductNotFound(linea.database_product_id))?;
        subtotal += producto.precio * Decimal::from(cantidad);
        lineas_validas.push((linea.database_product_id, cantidad));
    }

    let impuesto = Impuestos::find()
        .filter(ImpuestoCol::Activo.eq(true))
        .one(&txn)
        .await?
        .ok_or(AppError::NoActiveTax)?;
    let totales = calcular_totales(subtotal, impuesto.porcentaje);

    // A user who abandons checkout and comes back before paying must not
    // accumulate ghost unpaid orders; the latest cart state wins.
    if let Some(pendiente) = pedidos_existentes
        .iter()
        .find(|p| p.estado == ESTADO_ESPERANDO_PAGO)
    {
        let direccion_id = guardar_direccion(&txn, pendiente.direccion_id, direccion).await?;

        let mut activo: PedidoActive = pendiente.clone().into();
        activo.direccion_id = Set(Some(direccion_id));
        activo.precio = Set(totales.subtotal);
        activo.precio_final = Set(totales.total);
        activo.impuesto_id = Set(impuesto.id);
        activo.temporal_id = Set(carrito.temporal_id.clone());
        let pedido = activo.update(&txn).await?;

        ProductoPedido::delete_many()
            .filter(LineaCol::PedidoId.eq(pedido.id))
            .exec(&txn)
            .await?;
        insertar_lineas(&txn, pedido.id, &lineas_validas).await?;

        txn.commit().await?;
        tracing::info!(pedido_id = pedido.id, usuario_id = usuario.id, "pedido actualizado");
        return Ok(ApiResponse::success(
            "Pedido actualizado",
            PedidoCreado {
                pedido_id: pedido.id,
                direccion_id,
                usuario_id: usuario.id,
            },
            Some(Meta::empty()),
        ));
    }

    let direccion_row = insertar_direccion(&txn, direccion).await?;

    let pedido = PedidoActive {
        id: NotSet,
        fecha_envio: Set(None),
        fecha_entrega: Set(None),
        fecha_pago: Set(None),
        estado: Set(ESTADO_ESPERANDO_PAGO),
        direccion_id: Set(Some(direccion_row.id)),
        precio: Set(totales.subtotal),
        impuesto_id: Set(impuesto.id),
        precio_final: Set(totales.total),
        pago_id: Set(None),
        temporal_id: Set(carrito.temporal_id.clone()),
        detalles_pago: Set(None),
        monto_neto: Set(None),
        creado_en: NotSet,
    }
    .insert(&txn)
    .await?;

    UsuarioPedidoActive {
        id: NotSet,
        usuario_id: Set(usuario.id),
        pedido_id: Set(pedido.id),
    }
    .insert(&txn)
    .await?;

    insertar_lineas(&txn, pedido.id, &lineas_validas).await?;

    txn.commit().await?;
    tracing::info!(pedido_id = pedido.id, usuario_id = usuario.id, "pedido creado");

    Ok(ApiResponse::success(
        "Pedido creado",
        PedidoCreado {
            pedido_id: pedido.id,
            direccion_id: direccion_row.id,
            usuario_id: usuario.id,
        },
        Some(Meta::empty()),
    ))
}

/// List a user's orders with the presentation fields the storefront shows:
/// thumbnail of the first line's product, joined product names, total item
/// count and the effective date localized in Spanish and English.
pub async fn listar_pedidos_usuario(
    state: &AppState,
    usuario_externo: &str,
) -> AppResult<ApiResponse<ListaPedidos>> {
    let usuario = Usuarios::find()
        .filter(UsuarioCol::Auth0Id.eq(usuario_externo))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let pedidos = pedidos_de_usuario(&state.orm, usuario.id).await?;

    let mut items = Vec::with_capacity(pedidos.len());
    for pedido in pedidos {
        let lineas = ProductoPedido::find()
            .filter(LineaCol::PedidoId.eq(pedido.id))
            .order_by_asc(LineaCol::Id)
            .all(&state.orm)
            .await?;

        let mut nombres: Vec<String> = Vec::new();
        let mut cantidad_total: i64 = 0;
        let mut miniatura = None;

        for (indice, linea) in lineas.iter().enumerate() {
            cantidad_total += i64::from(linea.cantidad);
            if let Some(producto) = Productos::find_by_id(linea.producto_id)
                .one(&state.orm)
                .await?
            {
                nombres.push(producto.nombre);
            }
            if indice == 0 {
                let imagenes = Imagenes::find()
                    .filter(ImagenCol::ProductoId.eq(linea.producto_id))
                    .order_by_asc(ImagenCol::CreadoEn)
                    .order_by_asc(ImagenCol::Id)
                    .all(&state.orm)
                    .await?;
                miniatura = elegir_miniatura(&imagenes);
            }
        }

        // Payment date when the order was paid, creation timestamp otherwise.
        let fecha = pedido
            .fecha_pago
            .unwrap_or(pedido.creado_en)
            .with_timezone(&Utc);

        items.push(ResumenPedido {
            id: pedido.id,
            estado: pedido.estado,
            precio: pedido.precio,
            precio_final: pedido.precio_final,
            miniatura,
            productos: nombres.join(", "),
            cantidad_total,
            fecha_es: formatear_fecha_es(fecha),
            fecha_en: formatear_fecha_en(fecha),
        });
    }

    Ok(ApiResponse::success(
        "Ok",
        ListaPedidos { items },
        Some(Meta::empty()),
    ))
}

/// Serialize checkouts per user with a transaction-scoped advisory lock, so
/// two concurrent requests cannot both observe "no pending order" and insert.
async fn bloquear_usuario(txn: &DatabaseTransaction, usuario_id: i32) -> AppResult<()> {
    let backend = txn.get_database_backend();
    txn.execute(Statement::from_sql_and_values(
        backend,
        "SELECT pg_advisory_xact_lock($1)",
        [i64::from(usuario_id).into()],
    ))
    .await?;
    Ok(())
}

async fn pedidos_de_usuario<C: ConnectionTrait>(
    conn: &C,
    usuario_id: i32,
) -> AppResult<Vec<pedidos::Model>> {
    let asociaciones = UsuarioPedido::find()
        .filter(UsuarioPedidoCol::UsuarioId.eq(usuario_id))
        .all(conn)
        .await?;
    if asociaciones.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i32> = asociaciones.iter().map(|a| a.pedido_id).collect();
    let pedidos = Pedidos::find()
        .filter(PedidoCol::Id.is_in(ids))
        .order_by_desc(PedidoCol::CreadoEn)
        .all(conn)
        .await?;
    Ok(pedidos)
}

/// Overwrite the order's address in place when it has one, otherwise insert a
/// fresh row. Never leaves two address rows for the same order.
async fn guardar_direccion(
    txn: &DatabaseTransaction,
    direccion_id: Option<i32>,
    input: &DireccionInput,
) -> AppResult<i32> {
    if let Some(id) = direccion_id {
        if let Some(existente) = Direcciones::find_by_id(id).one(txn).await? {
            let mut activo: DireccionActive = existente.into();
            aplicar_campos(&mut activo, input);
            let guardada = activo.update(txn).await?;
            return Ok(guardada.id);
        }
    }
    let creada = insertar_direccion(txn, input).await?;
    Ok(creada.id)
}

async fn insertar_direccion(
    txn: &DatabaseTransaction,
    input: &DireccionInput,
) -> AppResult<direcciones::Model> {
    let mut activo = DireccionActive {
        id: NotSet,
        ..Default::default()
    };
    aplicar_campos(&mut activo, input);
    let creada = activo.insert(txn).await?;
    Ok(creada)
}

fn aplicar_campos(activo: &mut DireccionActive, input: &DireccionInput) {
    activo.cedula = Set(input.cedula.clone());
    activo.nombre_completo = Set(input.nombre_completo.clone());
    activo.telefono = Set(input.telefono.clone());
    activo.calle_principal = Set(input.calle_principal.clone());
    activo.calle_secundaria = Set(input.calle_secundaria.clone());
    activo.ciudad = Set(input.ciudad.clone());
    activo.provincia = Set(input.provincia.clone());
    activo.numeracion = Set(input.numeracion.clone());
    activo.referencia = Set(input.referencia.clone());
    activo.codigo_postal = Set(input.codigo_postal.clone());
}

async fn insertar_lineas(
    txn: &DatabaseTransaction,
    pedido_id: i32,
    lineas: &[(i32, i32)],
) -> AppResult<()> {
    for (producto_id, cantidad) in lineas {
        LineaActive {
            id: NotSet,
            pedido_id: Set(pedido_id),
            producto_id: Set(*producto_id),
            cantidad: Set(*cantidad),
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}
