use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use lamparas_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        imagenes::ActiveModel as ImagenActive,
        impuestos::{ActiveModel as ImpuestoActive, Column as ImpuestoCol, Entity as Impuestos},
        productos::{ActiveModel as ProductoActive, Column as ProductoCol, Entity as Productos},
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    ensure_impuesto(&orm, "IVA", Decimal::new(15, 0)).await?;

    let lamparas = [
        ("Lámpara Luna", "Luna impresa en PLA con acabado lunar", Decimal::new(2450, 2)),
        ("Lámpara Voronoi", "Pantalla voronoi, luz cálida", Decimal::new(1899, 2)),
        ("Lámpara Nebulosa", "Difusor doble capa", Decimal::new(3200, 2)),
    ];
    for (nombre, descripcion, precio) in lamparas {
        ensure_producto(&orm, nombre, descripcion, precio).await?;
    }

    println!("Seed completed");
    Ok(())
}

async fn ensure_impuesto(
    orm: &sea_orm::DatabaseConnection,
    nombre: &str,
    porcentaje: Decimal,
) -> anyhow::Result<()> {
    let existente = Impuestos::find()
        .filter(ImpuestoCol::Nombre.eq(nombre))
        .one(orm)
        .await?;
    if existente.is_none() {
        ImpuestoActive {
            id: NotSet,
            nombre: Set(nombre.to_string()),
            porcentaje: Set(porcentaje),
            activo: Set(true),
        }
        .insert(orm)
        .await?;
    }
    Ok(())
}

async fn ensure_producto(
    orm: &sea_orm::DatabaseConnection,
    nombre: &str,
    descripcion: &str,
    precio: Decimal,
) -> anyhow::Result<()> {
    let existente = Productos::find()
        .filter(ProductoCol::Nombre.eq(nombre))
        .one(orm)
        .await?;
    if existente.is_some() {
        return Ok(());
    }

    let producto = ProductoActive {
        id: NotSet,
        nombre: Set(nombre.to_string()),
        descripcion: Set(Some(descripcion.to_string())),
        precio: Set(precio),
        creado_en: NotSet,
    }
    .insert(orm)
    .await?;

    ImagenActive {
        id: NotSet,
        producto_id: Set(producto.id),
        url: Set(format!("https://cdn.example.com/lamparas/{}.jpg", producto.id)),
        es_miniatura: Set(true),
        creado_en: NotSet,
    }
    .insert(orm)
    .await?;

    Ok(())
}
