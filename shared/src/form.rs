//! In-progress item entry
//!
//! `ItemForm` holds what the user has typed so far and keeps the derived
//! fields (`net_weight`, `fine`) in step with every edit:
//!
//! - gross weight edit: net weight, then fine, recomputed
//! - percentage edit: fine recomputed from the current net weight
//! - inclusion added, removed, or its weight/pieces edited: net weight, then fine
//! - anything else: derived fields untouched

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::models::{CreateItemInput, Inclusion, InclusionField, InclusionKind};
use crate::validation::{check_decimal_text, Bound, Precision};
use crate::valuation::{carat_total, compute_fine, compute_net_weight, normalize_decimal_input};

/// Errors raised by form edits that target something that is not there
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("No {kind} row with id '{id}'")]
    UnknownInclusion { kind: InclusionKind, id: String },

    #[error("Unknown form field: {0}")]
    UnknownField(String),
}

/// User-editable item fields; the derived fields are deliberately absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemField {
    Name,
    Date,
    GrossWeight,
    Carate,
    Percentage,
    Making,
    Description,
    ImageUrl,
    ClientId,
}

impl ItemField {
    /// Fields holding numbers get decimal normalization
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ItemField::GrossWeight | ItemField::Percentage | ItemField::Making
        )
    }
}

impl FromStr for ItemField {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(ItemField::Name),
            "date" => Ok(ItemField::Date),
            "gross_weight" | "grossWeight" => Ok(ItemField::GrossWeight),
            "carate" => Ok(ItemField::Carate),
            "percentage" => Ok(ItemField::Percentage),
            "making" => Ok(ItemField::Making),
            "description" => Ok(ItemField::Description),
            "image_url" | "imageUrl" => Ok(ItemField::ImageUrl),
            "client_id" | "clientId" => Ok(ItemField::ClientId),
            other => Err(FormError::UnknownField(other.to_string())),
        }
    }
}

/// Working copy of an item while it is being entered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemForm {
    name: String,
    date: String,
    gross_weight: String,
    carate: String,
    diamonds: Vec<Inclusion>,
    stones: Vec<Inclusion>,
    net_weight: String,
    percentage: String,
    making: String,
    fine: String,
    description: String,
    image_url: String,
    client_id: String,
    #[serde(skip)]
    next_row: u64,
}

impl ItemForm {
    /// Empty form, no inclusion rows
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&self, field: ItemField) -> &str {
        match field {
            ItemField::Name => &self.name,
            ItemField::Date => &self.date,
            ItemField::GrossWeight => &self.gross_weight,
            ItemField::Carate => &self.carate,
            ItemField::Percentage => &self.percentage,
            ItemField::Making => &self.making,
            ItemField::Description => &self.description,
            ItemField::ImageUrl => &self.image_url,
            ItemField::ClientId => &self.client_id,
        }
    }

    fn field_mut(&mut self, field: ItemField) -> &mut String {
        match field {
            ItemField::Name => &mut self.name,
            ItemField::Date => &mut self.date,
            ItemField::GrossWeight => &mut self.gross_weight,
            ItemField::Carate => &mut self.carate,
            ItemField::Percentage => &mut self.percentage,
            ItemField::Making => &mut self.making,
            ItemField::Description => &mut self.description,
            ItemField::ImageUrl => &mut self.image_url,
            ItemField::ClientId => &mut self.client_id,
        }
    }

    pub fn net_weight(&self) -> &str {
        &self.net_weight
    }

    pub fn fine(&self) -> &str {
        &self.fine
    }

    pub fn inclusions(&self, kind: InclusionKind) -> &[Inclusion] {
        match kind {
            InclusionKind::Diamond => &self.diamonds,
            InclusionKind::Stone => &self.stones,
        }
    }

    fn inclusions_mut(&mut self, kind: InclusionKind) -> &mut Vec<Inclusion> {
        match kind {
            InclusionKind::Diamond => &mut self.diamonds,
            InclusionKind::Stone => &mut self.stones,
        }
    }

    /// Store an edit and refresh whatever depends on it
    pub fn set_field(&mut self, field: ItemField, value: &str) {
        let value = if field.is_numeric() {
            normalize_decimal_input(value)
        } else {
            value.to_string()
        };
        *self.field_mut(field) = value;

        match field {
            ItemField::GrossWeight => self.recompute_net_weight(),
            ItemField::Percentage => self.recompute_fine(),
            _ => {}
        }
    }

    /// Append an empty row and return its id
    pub fn add_inclusion(&mut self, kind: InclusionKind) -> String {
        let id = self.next_row_id();
        self.inclusions_mut(kind).push(Inclusion {
            id: id.clone(),
            ..Inclusion::default()
        });
        self.recompute_net_weight();
        id
    }

    pub fn remove_inclusion(&mut self, kind: InclusionKind, id: &str) -> Result<(), FormError> {
        let rows = self.inclusions_mut(kind);
        let index = rows
            .iter()
            .position(|row| row.id == id)
            .ok_or_else(|| FormError::UnknownInclusion {
                kind,
                id: id.to_string(),
            })?;
        rows.remove(index);
        self.recompute_net_weight();
        Ok(())
    }

    pub fn update_inclusion(
        &mut self,
        kind: InclusionKind,
        id: &str,
        field: InclusionField,
        value: &str,
    ) -> Result<(), FormError> {
        let row = self
            .inclusions_mut(kind)
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or_else(|| FormError::UnknownInclusion {
                kind,
                id: id.to_string(),
            })?;

        let value = normalize_decimal_input(value);
        match field {
            InclusionField::Weight => row.weight = value,
            InclusionField::Pieces => row.pieces = value,
            InclusionField::Rate => row.rate = value,
        }

        if field.affects_valuation() {
            self.recompute_net_weight();
        }
        Ok(())
    }

    /// Carats across one inclusion list, for the running total under it
    pub fn total_carats(&self, kind: InclusionKind) -> Decimal {
        carat_total(self.inclusions(kind))
    }

    /// Discard everything (cancel, or after a successful submit)
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Submit-time checks; every failing field is reported
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let required_text = [
            ("name", &self.name, "Item name is required"),
            ("date", &self.date, "Date is required"),
            ("carate", &self.carate, "Carate is required"),
        ];
        for (field, value, message) in required_text {
            if value.trim().is_empty() {
                let mut err = validator::ValidationError::new("required");
                err.message = Some(message.into());
                errors.add(field, err);
            }
        }

        let numeric = [
            (
                "gross_weight",
                &self.gross_weight,
                Precision::GRAMS,
                "Gross weight is required",
                "Please enter a valid gross weight",
            ),
            (
                "net_weight",
                &self.net_weight,
                Precision::GRAMS,
                "Net weight is required",
                "Please enter a valid net weight",
            ),
            (
                "percentage",
                &self.percentage,
                Precision::PERCENTAGE,
                "Percentage is required",
                "Please enter a valid percentage",
            ),
            (
                "fine",
                &self.fine,
                Precision::AMOUNT,
                "Fine is required",
                "Please enter a valid fine amount",
            ),
        ];
        for (field, value, precision, required, invalid) in numeric {
            if let Err(err) =
                check_decimal_text(value, Bound::NonNegative, precision, required, invalid)
            {
                errors.add(field, err);
            }
        }

        if !self.making.trim().is_empty() {
            if let Err(err) = check_decimal_text(
                &self.making,
                Bound::NonNegative,
                Precision::AMOUNT,
                "Making is required",
                "Please enter a valid making amount",
            ) {
                errors.add("making", err);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Request body for creating the item this form describes
    pub fn to_create_input(&self) -> CreateItemInput {
        CreateItemInput {
            name: self.name.clone(),
            date: self.date.clone(),
            gross_weight: self.gross_weight.clone(),
            carate: self.carate.clone(),
            net_weight: Some(self.net_weight.clone()),
            percentage: self.percentage.clone(),
            making: non_blank(&self.making),
            fine: Some(self.fine.clone()),
            description: non_blank(&self.description),
            image_url: non_blank(&self.image_url),
            client_id: Uuid::parse_str(self.client_id.trim()).ok(),
            diamonds: self.diamonds.clone(),
            stones: self.stones.clone(),
        }
    }

    fn recompute_net_weight(&mut self) {
        self.net_weight =
            compute_net_weight(&self.gross_weight, &self.diamonds, &self.stones).to_string();
        self.recompute_fine();
    }

    fn recompute_fine(&mut self) {
        self.fine = compute_fine(&self.net_weight, &self.percentage).to_string();
    }

    fn next_row_id(&mut self) -> String {
        loop {
            self.next_row += 1;
            let candidate = self.next_row.to_string();
            let taken = self
                .diamonds
                .iter()
                .chain(self.stones.iter())
                .any(|row| row.id == candidate);
            if !taken {
                return candidate;
            }
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_form_is_empty() {
        let form = ItemForm::new();
        assert_eq!(form.net_weight(), "");
        assert_eq!(form.fine(), "");
        assert!(form.inclusions(InclusionKind::Diamond).is_empty());
    }

    #[test]
    fn test_other_fields_leave_derived_alone() {
        let mut form = ItemForm::new();
        form.set_field(ItemField::Name, "Ring");
        form.set_field(ItemField::Carate, "22K");
        form.set_field(ItemField::Making, ".5");
        assert_eq!(form.net_weight(), "");
        assert_eq!(form.fine(), "");
        assert_eq!(form.field(ItemField::Making), "0.5");
    }

    #[test]
    fn test_text_fields_not_normalized() {
        let mut form = ItemForm::new();
        form.set_field(ItemField::Description, ".925 silver clasp");
        assert_eq!(form.field(ItemField::Description), ".925 silver clasp");
    }

    #[test]
    fn test_row_ids_unique() {
        let mut form = ItemForm::new();
        let a = form.add_inclusion(InclusionKind::Diamond);
        let b = form.add_inclusion(InclusionKind::Stone);
        let c = form.add_inclusion(InclusionKind::Diamond);
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn test_unknown_row_is_an_error() {
        let mut form = ItemForm::new();
        form.set_field(ItemField::GrossWeight, "4");
        let before = form.clone();

        let err = form
            .remove_inclusion(InclusionKind::Stone, "missing")
            .unwrap_err();
        assert_eq!(
            err,
            FormError::UnknownInclusion {
                kind: InclusionKind::Stone,
                id: "missing".to_string()
            }
        );
        assert_eq!(form, before);
    }

    #[test]
    fn test_field_names_parse() {
        assert_eq!("grossWeight".parse::<ItemField>().unwrap(), ItemField::GrossWeight);
        assert_eq!("percentage".parse::<ItemField>().unwrap(), ItemField::Percentage);
        assert!("net_weight".parse::<ItemField>().is_err());
    }

    #[test]
    fn test_reset() {
        let mut form = ItemForm::new();
        form.set_field(ItemField::GrossWeight, "4");
        form.add_inclusion(InclusionKind::Diamond);
        form.reset();
        assert_eq!(form, ItemForm::new());
    }
}
