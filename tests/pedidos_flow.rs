use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, Statement,
};

use lamparas_api::{
    cart_store::{CartLine, CartSnapshot, CartStore},
    db::{create_orm_conn, run_migrations},
    dto::pedidos::{CrearPedidoRequest, DireccionInput},
    entity::{
        direcciones::Entity as Direcciones,
        impuestos::{ActiveModel as ImpuestoActive, Column as ImpuestoCol, Entity as Impuestos},
        pedidos::Entity as Pedidos,
        producto_pedido::{Column as LineaCol, Entity as ProductoPedido},
        productos::{ActiveModel as ProductoActive, Column as ProductoCol, Entity as Productos},
        usuario_pedido::Entity as UsuarioPedido,
    },
    error::AppError,
    services::pedido_service::{self, ESTADO_ESPERANDO_PAGO},
    state::AppState,
};

// Integration flow: create order from cart -> retry same session -> coalesce
// a new session onto the still-unpaid order.
#[tokio::test]
async fn reconciliacion_idempotente_y_coalescente() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let lampara_luna = seed_producto(&state, "Lámpara Luna", Decimal::new(1000, 2)).await?;
    let lampara_voronoi = seed_producto(&state, "Lámpara Voronoi", Decimal::new(500, 2)).await?;
    seed_impuesto(&state, Decimal::new(15, 0)).await?;

    let carrito = CartSnapshot {
        items: vec![linea(lampara_luna, 2), linea(lampara_voronoi, 1)],
        temporal_id: "sesion-1".into(),
    };

    let creado = pedido_service::crear_o_actualizar_pedido(
        &state,
        peticion(direccion_completa()),
        Some(carrito.clone()),
    )
    .await?;
    assert_eq!(creado.message, "Pedido creado");
    let creado = creado.data.unwrap();

    let pedido = Pedidos::find_by_id(creado.pedido_id)
        .one(&state.orm)
        .await?
        .unwrap();
    assert_eq!(pedido.estado, ESTADO_ESPERANDO_PAGO);
    assert_eq!(pedido.precio, Decimal::new(2500, 2));
    assert_eq!(pedido.precio_final, Decimal::new(3075, 2));
    assert_eq!(pedido.temporal_id, "sesion-1");
    assert_eq!(pedido.direccion_id, Some(creado.direccion_id));

    // A catalog price change must not move the totals of an already-finished
    // session when the client merely retries.
    set_precio(&state, lampara_luna, Decimal::new(9900, 2)).await?;

    let mut corregida = direccion_completa();
    corregida.ciudad = "Guayaquil".into();
    let repetido = pedido_service::crear_o_actualizar_pedido(
        &state,
        peticion(corregida),
        Some(carrito.clone()),
    )
    .await?;
    assert_eq!(repetido.message, "Dirección actualizada en pedido existente");
    let repetido = repetido.data.unwrap();
    assert_eq!(repetido.pedido_id, creado.pedido_id);
    assert_eq!(repetido.direccion_id, creado.direccion_id);

    let pedido = Pedidos::find_by_id(creado.pedido_id)
        .one(&state.orm)
        .await?
        .unwrap();
    assert_eq!(pedido.precio, Decimal::new(2500, 2));
    assert_eq!(pedido.precio_final, Decimal::new(3075, 2));

    let direccion = Direcciones::find_by_id(creado.direccion_id)
        .one(&state.orm)
        .await?
        .unwrap();
    assert_eq!(direccion.ciudad, "Guayaquil");
    assert_eq!(Direcciones::find().count(&state.orm).await?, 1);

    // Fresh checkout session while the order is still unpaid: the same order
    // row is overwritten and its lines match the new cart exactly.
    let carrito2 = CartSnapshot {
        items: vec![linea(lampara_voronoi, 4)],
        temporal_id: "sesion-2".into(),
    };
    let actualizado = pedido_service::crear_o_actualizar_pedido(
        &state,
        peticion(direccion_completa()),
        Some(carrito2),
    )
    .await?;
    assert_eq!(actualizado.message, "Pedido actualizado");
    assert_eq!(actualizado.data.unwrap().pedido_id, creado.pedido_id);

    assert_eq!(Pedidos::find().count(&state.orm).await?, 1);
    assert_eq!(UsuarioPedido::find().count(&state.orm).await?, 1);

    let pedido = Pedidos::find_by_id(creado.pedido_id)
        .one(&state.orm)
        .await?
        .unwrap();
    assert_eq!(pedido.estado, ESTADO_ESPERANDO_PAGO);
    assert_eq!(pedido.temporal_id, "sesion-2");
    assert_eq!(pedido.precio, Decimal::new(2000, 2));
    assert_eq!(pedido.precio_final, Decimal::new(2500, 2));

    let lineas = ProductoPedido::find()
        .filter(LineaCol::PedidoId.eq(pedido.id))
        .order_by_asc(LineaCol::Id)
        .all(&state.orm)
        .await?;
    assert_eq!(lineas.len(), 1);
    assert_eq!(lineas[0].producto_id, lampara_voronoi);
    assert_eq!(lineas[0].cantidad, 4);

    Ok(())
}

#[tokio::test]
async fn fallos_no_dejan_estado_parcial() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let lampara = seed_producto(&state, "Lámpara Nebulosa", Decimal::new(3200, 2)).await?;
    seed_impuesto(&state, Decimal::new(15, 0)).await?;

    // Absent and empty carts are the same client error.
    let err = pedido_service::crear_o_actualizar_pedido(&state, peticion(direccion_completa()), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::EmptyCart), "{err:?}");

    let vacio = CartSnapshot {
        items: vec![],
        temporal_id: "sesion-vacia".into(),
    };
    let err = pedido_service::crear_o_actualizar_pedido(
        &state,
        peticion(direccion_completa()),
        Some(vacio),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::EmptyCart), "{err:?}");

    let cantidad_invalida = CartSnapshot {
        items: vec![linea(lampara, 0)],
        temporal_id: "sesion-a".into(),
    };
    let err = pedido_service::crear_o_actualizar_pedido(
        &state,
        peticion(direccion_completa()),
        Some(cantidad_invalida),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidCartLine(id) if id == lampara), "{err:?}");

    // Quantities wider than the column type must be rejected, not narrowed.
    let cantidad_desbordada = CartSnapshot {
        items: vec![linea(lampara, i64::from(i32::MAX) + 2)],
        temporal_id: "sesion-desbordada".into(),
    };
    let err = pedido_service::crear_o_actualizar_pedido(
        &state,
        peticion(direccion_completa()),
        Some(cantidad_desbordada),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidCartLine(id) if id == lampara), "{err:?}");

    let producto_fantasma = CartSnapshot {
        items: vec![linea(9999, 1)],
        temporal_id: "sesion-b".into(),
    };
    let err = pedido_service::crear_o_actualizar_pedido(
        &state,
        peticion(direccion_completa()),
        Some(producto_fantasma),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::ProductNotFound(9999)), "{err:?}");

    // Without an active tax nothing may be persisted, not even the address.
    Impuestos::update_many()
        .col_expr(ImpuestoCol::Activo, sea_orm::sea_query::Expr::value(false))
        .exec(&state.orm)
        .await?;

    let carrito = CartSnapshot {
        items: vec![linea(lampara, 1)],
        temporal_id: "sesion-c".into(),
    };
    let err = pedido_service::crear_o_actualizar_pedido(
        &state,
        peticion(direccion_completa()),
        Some(carrito),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NoActiveTax), "{err:?}");

    assert_eq!(Pedidos::find().count(&state.orm).await?, 0);
    assert_eq!(Direcciones::find().count(&state.orm).await?, 0);
    assert_eq!(ProductoPedido::find().count(&state.orm).await?, 0);

    Ok(())
}

async fn setup_state() -> anyhow::Result<Option<AppState>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(None);
            }
        };

    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE producto_pedido, usuario_pedido, pedidos, direcciones, imagenes, productos, impuestos, usuarios RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(Some(AppState {
        orm,
        carts: CartStore::new("http://127.0.0.1:9"),
    }))
}

async fn seed_producto(state: &AppState, nombre: &str, precio: Decimal) -> anyhow::Result<i32> {
    let producto = ProductoActive {
        id: NotSet,
        nombre: Set(nombre.to_string()),
        descripcion: Set(None),
        precio: Set(precio),
        creado_en: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(producto.id)
}

async fn seed_impuesto(state: &AppState, porcentaje: Decimal) -> anyhow::Result<()> {
    ImpuestoActive {
        id: NotSet,
        nombre: Set("IVA".into()),
        porcentaje: Set(porcentaje),
        activo: Set(true),
    }
    .insert(&state.orm)
    .await?;
    Ok(())
}

async fn set_precio(state: &AppState, producto_id: i32, precio: Decimal) -> anyhow::Result<()> {
    Productos::update_many()
        .col_expr(ProductoCol::Precio, sea_orm::sea_query::Expr::value(precio))
        .filter(ProductoCol::Id.eq(producto_id))
        .exec(&state.orm)
        .await?;
    Ok(())
}

fn linea(producto_id: i32, cantidad: i64) -> CartLine {
    CartLine {
        database_product_id: producto_id,
        quantity: cantidad,
    }
}

fn peticion(direccion: DireccionInput) -> CrearPedidoRequest {
    CrearPedidoRequest {
        direccion: Some(direccion),
        usuario_id: "auth0|cliente".into(),
    }
}

fn direccion_completa() -> DireccionInput {
    DireccionInput {
        cedula: "1712345678".into(),
        nombre_completo: "Ana Pérez".into(),
        telefono: "0991234567".into(),
        calle_principal: "Av. Amazonas".into(),
        calle_secundaria: Some("Naciones Unidas".into()),
        ciudad: "Quito".into(),
        provincia: "Pichincha".into(),
        numeracion: Some("N34-12".into()),
        referencia: None,
        codigo_postal: Some("170135".into()),
    }
}
