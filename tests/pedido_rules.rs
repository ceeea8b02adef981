use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

use lamparas_api::cart_store::CartSnapshot;
use lamparas_api::dto::pedidos::{CrearPedidoRequest, DireccionInput};
use lamparas_api::entity::imagenes;
use lamparas_api::error::AppError;
use lamparas_api::services::pedido_service::{
    calcular_totales, elegir_miniatura, formatear_fecha_en, formatear_fecha_es, tarifa_envio,
};

fn imagen(id: i32, url: &str, es_miniatura: bool) -> imagenes::Model {
    imagenes::Model {
        id,
        producto_id: 1,
        url: url.to_string(),
        es_miniatura,
        creado_en: Utc::now().into(),
    }
}

#[test]
fn totales_escenario_de_referencia() {
    // Cart [A: $10 x2, B: $5 x1], 15% tax.
    let subtotal = Decimal::new(1000, 2) * Decimal::from(2) + Decimal::new(500, 2);
    let totales = calcular_totales(subtotal, Decimal::new(15, 0));

    assert_eq!(totales.subtotal, Decimal::new(2500, 2));
    assert_eq!(totales.impuesto, Decimal::new(375, 2));
    assert_eq!(totales.envio, Decimal::new(200, 2));
    assert_eq!(totales.total, Decimal::new(3075, 2));
}

#[test]
fn totales_redondea_el_impuesto_a_dos_decimales() {
    let totales = calcular_totales(Decimal::new(1001, 2), Decimal::new(125, 1));

    assert_eq!(totales.impuesto, Decimal::new(125, 2));
    assert_eq!(totales.total, Decimal::new(1326, 2));
}

#[test]
fn tarifa_de_envio_es_fija() {
    assert_eq!(tarifa_envio(), Decimal::new(200, 2));
}

#[test]
fn miniatura_prefiere_la_imagen_marcada() {
    let imagenes = vec![
        imagen(1, "a.jpg", false),
        imagen(2, "b.jpg", true),
        imagen(3, "c.jpg", false),
    ];
    assert_eq!(elegir_miniatura(&imagenes), Some("b.jpg".to_string()));
}

#[test]
fn miniatura_cae_a_la_primera_imagen() {
    let imagenes = vec![imagen(1, "a.jpg", false), imagen(2, "b.jpg", false)];
    assert_eq!(elegir_miniatura(&imagenes), Some("a.jpg".to_string()));
}

#[test]
fn miniatura_ausente_sin_imagenes() {
    assert_eq!(elegir_miniatura(&[]), None);
}

#[test]
fn fechas_se_formatean_en_utc_menos_cinco() {
    let fecha = Utc.with_ymd_and_hms(2025, 5, 12, 19, 30, 0).unwrap();

    assert_eq!(formatear_fecha_es(fecha), "12 de mayo de 2025, 14:30");
    assert_eq!(formatear_fecha_en(fecha), "May 12, 2025, 2:30 PM");
}

#[test]
fn fechas_cruzan_la_medianoche_hacia_atras() {
    let fecha = Utc.with_ymd_and_hms(2025, 1, 1, 4, 59, 0).unwrap();

    assert_eq!(formatear_fecha_es(fecha), "31 de diciembre de 2024, 23:59");
    assert_eq!(formatear_fecha_en(fecha), "December 31, 2024, 11:59 PM");
}

#[test]
fn direccion_completa_es_valida() {
    assert!(direccion_completa().validar().is_ok());
}

#[test]
fn direccion_sin_campo_obligatorio_es_rechazada() {
    for campo in [
        "cedula",
        "nombre_completo",
        "telefono",
        "calle_principal",
        "ciudad",
        "provincia",
    ] {
        let mut direccion = direccion_completa();
        match campo {
            "cedula" => direccion.cedula = String::new(),
            "nombre_completo" => direccion.nombre_completo = "  ".into(),
            "telefono" => direccion.telefono = String::new(),
            "calle_principal" => direccion.calle_principal = String::new(),
            "ciudad" => direccion.ciudad = String::new(),
            "provincia" => direccion.provincia = String::new(),
            _ => unreachable!(),
        }
        let err = direccion.validar().unwrap_err();
        match err {
            AppError::BadRequest(mensaje) => {
                assert!(mensaje.contains(campo), "mensaje sin el campo {campo}: {mensaje}")
            }
            otro => panic!("se esperaba BadRequest, fue {otro:?}"),
        }
    }
}

#[test]
fn peticion_sin_direccion_es_rechazada() {
    let peticion = CrearPedidoRequest {
        direccion: None,
        usuario_id: "auth0|cliente".into(),
    };
    let err = peticion.validar().unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)), "{err:?}");
}

#[test]
fn peticion_sin_usuario_es_rechazada() {
    let peticion = CrearPedidoRequest {
        direccion: Some(direccion_completa()),
        usuario_id: "  ".into(),
    };
    let err = peticion.validar().unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)), "{err:?}");
}

#[test]
fn peticion_completa_es_valida() {
    let peticion = CrearPedidoRequest {
        direccion: Some(direccion_completa()),
        usuario_id: "auth0|cliente".into(),
    };
    assert!(peticion.validar().is_ok());
}

#[test]
fn carrito_con_cantidad_fraccionaria_no_deserializa() {
    let cuerpo = r#"{"items":[{"databaseProductId":1,"quantity":1.5}],"temporalId":"sesion-x"}"#;
    assert!(serde_json::from_str::<CartSnapshot>(cuerpo).is_err());
}

#[test]
fn carrito_sin_items_deserializa_vacio() {
    let cuerpo = r#"{"temporalId":"sesion-x"}"#;
    let carrito: CartSnapshot = serde_json::from_str(cuerpo).unwrap();
    assert!(carrito.is_empty());
}

#[test]
fn direccion_no_exige_los_campos_opcionales() {
    let mut direccion = direccion_completa();
    direccion.calle_secundaria = None;
    direccion.numeracion = None;
    direccion.referencia = None;
    direccion.codigo_postal = None;
    assert!(direccion.validar().is_ok());
}

fn direccion_completa() -> DireccionInput {
    DireccionInput {
        cedula: "1712345678".into(),
        nombre_completo: "Ana Pérez".into(),
        telefono: "0991234567".into(),
        calle_principal: "Av. Amazonas".into(),
        calle_secundaria: Some("Naciones Unidas".into()),
        ciudad: "Quito".into(),
        provincia: "Pichincha".into(),
        numeracion: Some("N34-12".into()),
        referencia: Some("Edificio azul".into()),
        codigo_postal: Some("170135".into()),
    }
}
