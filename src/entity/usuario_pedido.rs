use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "usuario_pedido")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub usuario_id: i32,
    pub pedido_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::usuarios::Entity",
        from = "Column::UsuarioId",
        to = "super::usuarios::Column::Id"
    )]
    Usuarios,
    #[sea_orm(
        belongs_to = "super::pedidos::Entity",
        from = "Column::PedidoId",
        to = "super::pedidos::Column::Id"
    )]
    Pedidos,
}

impl Related<super::usuarios::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Usuarios.def()
    }
}

impl Related<super::pedidos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pedidos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
