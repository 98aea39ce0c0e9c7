//! WASM bindings for sankey-studio.
//!
//! Exposes the one-shot pipeline to JavaScript via wasm-bindgen; scenes and
//! documents cross the boundary as JSON strings.

use wasm_bindgen::prelude::*;

use crate::config::DiagramConfig;
use crate::overrides::OverrideStore;
use crate::serialize::{Document, export_json, from_csv, import_json, to_csv, to_dsl};

/// Parse flow DSL and lay it out with default settings. Returns the scene
/// as a JSON string, or an empty string when no valid flow line exists.
#[wasm_bindgen]
pub fn render(src: &str) -> Result<String, JsError> {
    render_with_size(src, 960.0, 540.0)
}

/// Parse flow DSL and lay it out at the given canvas size.
#[wasm_bindgen(js_name = "renderWithSize")]
pub fn render_with_size(src: &str, width: f64, height: f64) -> Result<String, JsError> {
    let config = DiagramConfig {
        width,
        height,
        ..DiagramConfig::default()
    };
    match crate::render_scene(src, &config) {
        Ok(Some(scene)) => {
            serde_json::to_string(&scene).map_err(|e| JsError::new(&e.to_string()))
        }
        Ok(None) => Ok(String::new()),
        Err(e) => Err(JsError::new(&e.to_string())),
    }
}

/// Parse flow DSL into the document schema JSON (no overrides).
#[wasm_bindgen(js_name = "dslToDocument")]
pub fn dsl_to_document(src: &str) -> Result<String, JsError> {
    let graph = crate::parsers::parse(src)
        .ok_or_else(|| JsError::new("no valid flow lines in input"))?;
    let doc = Document::from_parts(
        &graph,
        &OverrideStore::new(),
        &[],
        &DiagramConfig::default(),
    );
    export_json(&doc).map_err(|e| JsError::new(&e.to_string()))
}

/// Round-trip a document JSON string back to flow DSL.
#[wasm_bindgen(js_name = "documentToDsl")]
pub fn document_to_dsl(json: &str) -> Result<String, JsError> {
    let doc = import_json(json).map_err(|e| JsError::new(&e.to_string()))?;
    Ok(to_dsl(&doc.graph(), &doc.store()))
}

/// Convert flow DSL to CSV rows.
#[wasm_bindgen(js_name = "dslToCsv")]
pub fn dsl_to_csv(src: &str) -> Result<String, JsError> {
    let graph = crate::parsers::parse(src)
        .ok_or_else(|| JsError::new("no valid flow lines in input"))?;
    Ok(to_csv(&graph))
}

/// Convert CSV rows to flow DSL.
#[wasm_bindgen(js_name = "csvToDsl")]
pub fn csv_to_dsl(src: &str) -> Result<String, JsError> {
    let graph = from_csv(src).map_err(|e| JsError::new(&e.to_string()))?;
    Ok(to_dsl(&graph, &OverrideStore::new()))
}
