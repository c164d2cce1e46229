//! The processes offered by the portal

use std::sync::Arc;

use crate::config::{FieldSpec, WorkflowConfig};

const SPREADSHEET_EXTENSIONS: &[&str] = &["xls", "xlsx"];

/// Scheduling reconciliation between the Manager and Bitrix exports
pub fn agendamiento_v2() -> WorkflowConfig {
    WorkflowConfig {
        id: "agendamiento-v2".to_string(),
        title: "Cruce Agendamiento".to_string(),
        endpoint: "/agendamiento-v2/procesar".to_string(),
        fields: vec![
            FieldSpec::new("manager_file", "Archivo Manager", SPREADSHEET_EXTENSIONS),
            FieldSpec::new("bitrix_file", "Archivo Bitrix", SPREADSHEET_EXTENSIONS),
        ],
        output_filename: "Agendamiento_v2.xlsx".to_string(),
        submit_label: "Procesar".to_string(),
        validation_message: "Debe seleccionar ambos archivos.".to_string(),
        error_message: "Ocurrió un error procesando el agendamiento.".to_string(),
    }
}

/// Box inventory computed from a sales export
pub fn inventario() -> WorkflowConfig {
    WorkflowConfig {
        id: "inventario".to_string(),
        title: "Inventario de Cajas".to_string(),
        endpoint: "/inventario/procesar".to_string(),
        fields: vec![FieldSpec::new(
            "file",
            "Archivo de Ventas",
            SPREADSHEET_EXTENSIONS,
        )],
        output_filename: "Inventario_Cajas.xlsx".to_string(),
        submit_label: "Procesar".to_string(),
        validation_message: "Debe seleccionar un archivo.".to_string(),
        error_message: "Ocurrió un error procesando el inventario.".to_string(),
    }
}

/// Settlement payslips, returned as a zip of PDFs
pub fn liquidacion() -> WorkflowConfig {
    WorkflowConfig {
        id: "liquidacion".to_string(),
        title: "Liquidación".to_string(),
        endpoint: "/liquidacion/procesar".to_string(),
        fields: vec![FieldSpec::new(
            "file",
            "Archivo de Liquidación",
            SPREADSHEET_EXTENSIONS,
        )],
        output_filename: "Recibos_Liquidacion.zip".to_string(),
        submit_label: "Generar Recibos".to_string(),
        validation_message: "Debe seleccionar un archivo.".to_string(),
        error_message: "Ocurrió un error generando los recibos.".to_string(),
    }
}

/// All processes, in navigation order
pub fn all() -> Vec<Arc<WorkflowConfig>> {
    vec![
        Arc::new(agendamiento_v2()),
        Arc::new(inventario()),
        Arc::new(liquidacion()),
    ]
}

/// Look up a process by id in an already built catalog
pub fn find(catalog: &[Arc<WorkflowConfig>], id: &str) -> Option<Arc<WorkflowConfig>> {
    catalog.iter().find(|config| config.id == id).cloned()
}
