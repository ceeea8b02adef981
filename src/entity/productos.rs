use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "productos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub precio: Decimal,
    pub creado_en: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::imagenes::Entity")]
    Imagenes,
    #[sea_orm(has_many = "super::producto_pedido::Entity")]
    ProductoPedido,
}

impl Related<super::imagenes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Imagenes.def()
    }
}

impl Related<super::producto_pedido::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductoPedido.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
