use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pedidos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub fecha_envio: Option<DateTimeWithTimeZone>,
    pub fecha_entrega: Option<DateTimeWithTimeZone>,
    pub fecha_pago: Option<DateTimeWithTimeZone>,
    /// Order status code; 8 is "esperando pago".
    pub estado: i32,
    pub direccion_id: Option<i32>,
    /// Subtotal before tax and shipping.
    pub precio: Decimal,
    pub impuesto_id: i32,
    /// Subtotal + tax + shipping.
    pub precio_final: Decimal,
    /// Payment-gateway transaction id, set by the payment webhook.
    pub pago_id: Option<String>,
    /// Cart-session token copied from the cart store at creation time.
    /// Idempotency key for retried checkouts.
    pub temporal_id: String,
    pub detalles_pago: Option<Json>,
    pub monto_neto: Option<Decimal>,
    pub creado_en: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::direcciones::Entity",
        from = "Column::DireccionId",
        to = "super::direcciones::Column::Id"
    )]
    Direcciones,
    #[sea_orm(
        belongs_to = "super::impuestos::Entity",
        from = "Column::ImpuestoId",
        to = "super::impuestos::Column::Id"
    )]
    Impuestos,
    #[sea_orm(has_many = "super::producto_pedido::Entity")]
    ProductoPedido,
    #[sea_orm(has_many = "super::usuario_pedido::Entity")]
    UsuarioPedido,
}

impl Related<super::direcciones::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Direcciones.def()
    }
}

impl Related<super::impuestos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Impuestos.def()
    }
}

impl Related<super::producto_pedido::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductoPedido.def()
    }
}

impl Related<super::usuario_pedido::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UsuarioPedido.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
