use crate::cart_store::CartStore;
use crate::db::OrmConn;

#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub carts: CartStore,
}
