use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "direcciones")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cedula: String,
    pub nombre_completo: String,
    pub telefono: String,
    pub calle_principal: String,
    pub calle_secundaria: Option<String>,
    pub ciudad: String,
    pub provincia: String,
    pub numeracion: Option<String>,
    pub referencia: Option<String>,
    pub codigo_postal: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pedidos::Entity")]
    Pedidos,
}

impl Related<super::pedidos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pedidos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
