pub mod pedido_service;
pub mod producto_service;
