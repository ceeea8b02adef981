pub mod direcciones;
pub mod imagenes;
pub mod impuestos;
pub mod pedidos;
pub mod producto_pedido;
pub mod productos;
pub mod usuario_pedido;
pub mod usuarios;

pub use direcciones::Entity as Direcciones;
pub use imagenes::Entity as Imagenes;
pub use impuestos::Entity as Impuestos;
pub use pedidos::Entity as Pedidos;
pub use producto_pedido::Entity as ProductoPedido;
pub use productos::Entity as Productos;
pub use usuario_pedido::Entity as UsuarioPedido;
pub use usuarios::Entity as Usuarios;
