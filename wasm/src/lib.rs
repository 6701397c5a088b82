//! WebAssembly module for Jewel Ledger
//!
//! Runs the item calculator in the browser so the derived fields update on
//! every keystroke without a round trip:
//! - Net weight and fine calculations
//! - Inclusion carat totals
//! - The item entry form with its recompute rules
//! - Client-side search filtering

use std::collections::BTreeMap;
use std::fmt::Display;

use shared::form::{ItemField, ItemForm};
use shared::models::{Inclusion, InclusionField, InclusionKind};
use shared::types::matches_search;
use shared::valuation::{carat_total, compute_fine, compute_net_weight, normalize_decimal_input};
use validator::ValidationErrors;
use wasm_bindgen::prelude::*;

fn js_error(message: impl Display) -> JsValue {
    js_sys::Error::new(&message.to_string()).into()
}

fn parse_rows(rows_json: &str) -> Result<Vec<Inclusion>, JsValue> {
    if rows_json.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(rows_json).map_err(|e| js_error(format!("Invalid inclusions JSON: {}", e)))
}

/// Net weight in grams, three decimals, from gross weight and inclusion rows
#[wasm_bindgen]
pub fn calculate_net_weight(
    gross_weight: &str,
    diamonds_json: &str,
    stones_json: &str,
) -> Result<String, JsValue> {
    let diamonds = parse_rows(diamonds_json)?;
    let stones = parse_rows(stones_json)?;
    Ok(compute_net_weight(gross_weight, &diamonds, &stones).to_string())
}

/// Fine, two decimals
#[wasm_bindgen]
pub fn calculate_fine(net_weight: &str, percentage: &str) -> String {
    compute_fine(net_weight, percentage).to_string()
}

/// Carats across a list of inclusion rows, two decimals
#[wasm_bindgen]
pub fn total_carats(rows_json: &str) -> Result<String, JsValue> {
    Ok(carat_total(&parse_rows(rows_json)?).to_string())
}

/// Typed text as it should be stored in a numeric field
#[wasm_bindgen]
pub fn normalize_input(raw: &str) -> String {
    normalize_decimal_input(raw)
}

/// Client list filter: case-insensitive match on name, email or phone
#[wasm_bindgen]
pub fn client_matches(term: &str, name: &str, email: Option<String>, phone: &str) -> bool {
    matches_search(term, &[name, email.as_deref().unwrap_or_default(), phone])
}

/// Item list filter: case-insensitive match on name or description
#[wasm_bindgen]
pub fn item_matches(term: &str, name: &str, description: Option<String>) -> bool {
    matches_search(term, &[name, description.as_deref().unwrap_or_default()])
}

fn validation_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

/// Item entry form exposed to the page
#[wasm_bindgen]
#[derive(Default)]
pub struct ItemFormHandle {
    form: ItemForm,
}

#[wasm_bindgen]
impl ItemFormHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ItemFormHandle {
        ItemFormHandle::default()
    }

    /// Set a user-editable field; `net_weight` and `fine` are not settable
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), JsValue> {
        let field: ItemField = field.parse().map_err(js_error)?;
        self.form.set_field(field, value);
        Ok(())
    }

    pub fn field(&self, field: &str) -> Result<String, JsValue> {
        let field: ItemField = field.parse().map_err(js_error)?;
        Ok(self.form.field(field).to_string())
    }

    /// Append an empty diamond or stone row, returning its id
    pub fn add_inclusion(&mut self, kind: &str) -> Result<String, JsValue> {
        let kind: InclusionKind = kind.parse().map_err(js_error)?;
        Ok(self.form.add_inclusion(kind))
    }

    pub fn remove_inclusion(&mut self, kind: &str, id: &str) -> Result<(), JsValue> {
        let kind: InclusionKind = kind.parse().map_err(js_error)?;
        self.form.remove_inclusion(kind, id).map_err(js_error)
    }

    pub fn update_inclusion(
        &mut self,
        kind: &str,
        id: &str,
        field: &str,
        value: &str,
    ) -> Result<(), JsValue> {
        let kind: InclusionKind = kind.parse().map_err(js_error)?;
        let field: InclusionField = field.parse().map_err(js_error)?;
        self.form
            .update_inclusion(kind, id, field, value)
            .map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn net_weight(&self) -> String {
        self.form.net_weight().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn fine(&self) -> String {
        self.form.fine().to_string()
    }

    pub fn total_carats(&self, kind: &str) -> Result<String, JsValue> {
        let kind: InclusionKind = kind.parse().map_err(js_error)?;
        Ok(self.form.total_carats(kind).to_string())
    }

    pub fn is_valid(&self) -> bool {
        self.form.validate().is_ok()
    }

    /// Field -> messages as JSON; `{}` when the form can be submitted
    pub fn validation_errors(&self) -> Result<String, JsValue> {
        let messages = match self.form.validate() {
            Ok(()) => BTreeMap::new(),
            Err(errors) => validation_messages(&errors),
        };
        serde_json::to_string(&messages).map_err(js_error)
    }

    /// Create-item request body for the current form
    pub fn submission_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.form.to_create_input()).map_err(js_error)
    }

    /// Restore a draft saved with `to_json`; absent fields start empty
    pub fn from_json(json: &str) -> Result<ItemFormHandle, JsValue> {
        let form = serde_json::from_str(json)
            .map_err(|e| js_error(format!("Invalid draft JSON: {}", e)))?;
        Ok(ItemFormHandle { form })
    }

    /// Whole form state, for persisting a draft
    pub fn to_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.form).map_err(js_error)
    }

    pub fn reset(&mut self) {
        self.form.reset();
    }
}
