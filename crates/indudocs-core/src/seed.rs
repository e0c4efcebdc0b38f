//! Built-in seed dataset.
//!
//! Returned by the store adapter for any collection that has never been
//! saved, and written wholesale by `indudocs reset`.

use chrono::NaiveDate;

use crate::models::{DocType, Document, Role, Site, User};

const VIEWER_URL: &str = "https://docs.google.com/viewer?url=https://www.w3.org/WAI/ER/tests/xhtml/testfiles/resources/pdf/dummy.pdf";

pub fn sites() -> Vec<Site> {
    vec![
        Site {
            id: "c1".to_string(),
            name: "Planta Principal - Madrid".to_string(),
            location: Some("Getafe".to_string()),
        },
        Site {
            id: "c2".to_string(),
            name: "Centro Logístico - Barcelona".to_string(),
            location: Some("El Prat".to_string()),
        },
    ]
}

pub fn users() -> Vec<User> {
    vec![
        User {
            id: "1".to_string(),
            name: "Administrador Sistema".to_string(),
            email: "admin@indudocs.com".to_string(),
            role: Role::Admin,
            password: "admin".to_string(),
            site_affinity: None,
        },
        User {
            id: "2".to_string(),
            name: "Juan Operario Madrid".to_string(),
            email: "juan@indudocs.com".to_string(),
            role: Role::Operario,
            password: "user123".to_string(),
            site_affinity: Some("c1".to_string()),
        },
    ]
}

pub fn documents() -> Vec<Document> {
    vec![
        Document {
            id: "d1".to_string(),
            title: "Procedimiento de Soldadura TIG".to_string(),
            doc_type: DocType::WorkInstruction,
            category: "Producción".to_string(),
            external_url: VIEWER_URL.to_string(),
            description: "Instrucciones paso a paso para soldadura en acero inoxidable."
                .to_string(),
            last_updated: date(2023, 10, 15),
            site_id: "c1".to_string(),
        },
        Document {
            id: "d2".to_string(),
            title: "Acetona Industrial - FDS".to_string(),
            doc_type: DocType::SafetySheet,
            category: "Químicos".to_string(),
            external_url: VIEWER_URL.to_string(),
            description: "Ficha de datos de seguridad para el manejo de acetona.".to_string(),
            last_updated: date(2023, 11, 2),
            site_id: "c1".to_string(),
        },
        Document {
            id: "d3".to_string(),
            title: "Manual Torno CNC Mazak".to_string(),
            doc_type: DocType::MachineManual,
            category: "Mantenimiento".to_string(),
            external_url: VIEWER_URL.to_string(),
            description: "Manual de usuario y mantenimiento preventivo.".to_string(),
            last_updated: date(2024, 1, 20),
            site_id: "c2".to_string(),
        },
    ]
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}
