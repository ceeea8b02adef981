use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::{
    dto::productos::{ListaProductos, ProductoConImagenes},
    entity::{
        imagenes::{self, Column as ImagenCol, Entity as Imagenes},
        productos::{self, Column as ProductoCol, Entity as Productos},
    },
    error::{AppError, AppResult},
    models::{Imagen, Producto},
    response::{ApiResponse, Meta},
    routes::params::ProductoQuery,
    state::AppState,
};

pub async fn listar_productos(
    state: &AppState,
    query: ProductoQuery,
) -> AppResult<ApiResponse<ListaProductos>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(busqueda) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let patron = format!("%{}%", busqueda);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(ProductoCol::Nombre).ilike(patron.clone()))
                .add(Expr::col(ProductoCol::Descripcion).ilike(patron)),
        );
    }

    let finder = Productos::find()
        .filter(condition)
        .order_by_desc(ProductoCol::CreadoEn);

    let total = finder.clone().count(&state.orm).await? as i64;

    let productos = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let mut items = Vec::with_capacity(productos.len());
    for producto in productos {
        items.push(con_imagenes(state, producto).await?);
    }

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        ListaProductos { items },
        Some(meta),
    ))
}

pub async fn obtener_producto(
    state: &AppState,
    id: i32,
) -> AppResult<ApiResponse<ProductoConImagenes>> {
    let producto = Productos::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let item = con_imagenes(state, producto).await?;
    Ok(ApiResponse::success("Ok", item, Some(Meta::empty())))
}

async fn con_imagenes(
    state: &AppState,
    producto: productos::Model,
) -> AppResult<ProductoConImagenes> {
    let imagenes = Imagenes::find()
        .filter(ImagenCol::ProductoId.eq(producto.id))
        .order_by_asc(ImagenCol::CreadoEn)
        .order_by_asc(ImagenCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(imagen_from_entity)
        .collect();

    Ok(ProductoConImagenes {
        producto: producto_from_entity(producto),
        imagenes,
    })
}

fn producto_from_entity(model: productos::Model) -> Producto {
    Producto {
        id: model.id,
        nombre: model.nombre,
        descripcion: model.descripcion,
        precio: model.precio,
        creado_en: model.creado_en.with_timezone(&Utc),
    }
}

fn imagen_from_entity(model: imagenes::Model) -> Imagen {
    Imagen {
        id: model.id,
        producto_id: model.producto_id,
        url: model.url,
        es_miniatura: model.es_miniatura,
    }
}
