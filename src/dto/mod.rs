pub mod pedidos;
pub mod productos;
