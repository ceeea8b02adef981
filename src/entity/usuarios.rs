use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "usuarios")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Subject identifier from the external identity provider. Nullable until
    /// the user's first login, unique afterwards.
    #[sea_orm(unique)]
    pub auth0_id: Option<String>,
    pub creditos: i32,
    pub ultima_conexion: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::usuario_pedido::Entity")]
    UsuarioPedido,
}

impl Related<super::usuario_pedido::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UsuarioPedido.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
