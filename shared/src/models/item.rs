//! Jewelry item models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::ClientSummary;
use crate::validation::{
    validate_fine, validate_item_date, validate_item_name, validate_making,
    validate_net_weight, validate_percentage, validate_positive_gross_weight,
};

/// A diamond or stone line on an item
///
/// Values are kept as entered; the valuation calculator parses them leniently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inclusion {
    /// Row key assigned by the form, used to target edits and removal
    pub id: String,
    /// Carats per piece
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub pieces: String,
    /// Price per carat, carried for display only
    #[serde(default)]
    pub rate: String,
}

/// Which inclusion list a row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InclusionKind {
    Diamond,
    Stone,
}

impl InclusionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InclusionKind::Diamond => "diamond",
            InclusionKind::Stone => "stone",
        }
    }
}

impl fmt::Display for InclusionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InclusionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "diamond" | "diamonds" => Ok(InclusionKind::Diamond),
            "stone" | "stones" => Ok(InclusionKind::Stone),
            other => Err(format!("unknown inclusion kind '{}'", other)),
        }
    }
}

/// Editable column of an inclusion row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InclusionField {
    Weight,
    Pieces,
    Rate,
}

impl InclusionField {
    /// Rate is informational; only weight and pieces move the net weight
    pub fn affects_valuation(&self) -> bool {
        matches!(self, InclusionField::Weight | InclusionField::Pieces)
    }
}

impl FromStr for InclusionField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weight" => Ok(InclusionField::Weight),
            "pieces" => Ok(InclusionField::Pieces),
            "rate" => Ok(InclusionField::Rate),
            other => Err(format!("unknown inclusion field '{}'", other)),
        }
    }
}

/// A persisted jewelry item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    /// Generated reference, `ITEM-<base36 millis>-<4 chars>`
    pub item_id: String,
    pub user_id: String,
    pub client_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    /// Grams
    pub gross_weight: Decimal,
    /// Purity grade label, e.g. "22K"
    pub carate: String,
    /// Grams, gross plus inclusion weight
    pub net_weight: Decimal,
    pub diamonds: Vec<Inclusion>,
    pub stones: Vec<Inclusion>,
    pub percentage: Decimal,
    pub making: Option<Decimal>,
    pub fine: Decimal,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Item listing entry with its client, if any
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemWithClient {
    #[serde(flatten)]
    pub item: Item,
    pub client: Option<ClientSummary>,
}

/// Input for creating an item
///
/// Numeric fields are text, as typed. `net_weight` and `fine` may be left out,
/// in which case they are derived from the measurements.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateItemInput {
    #[validate(custom = "validate_item_name")]
    pub name: String,

    #[validate(custom = "validate_item_date")]
    pub date: String,

    #[validate(custom = "validate_positive_gross_weight")]
    pub gross_weight: String,

    #[validate(length(min = 1, message = "Carate is required"))]
    pub carate: String,

    #[validate(custom = "validate_net_weight")]
    pub net_weight: Option<String>,

    #[validate(custom = "validate_percentage")]
    pub percentage: String,

    #[validate(custom = "validate_making")]
    pub making: Option<String>,

    #[validate(custom = "validate_fine")]
    pub fine: Option<String>,

    pub description: Option<String>,
    pub image_url: Option<String>,
    pub client_id: Option<Uuid>,

    #[serde(default)]
    pub diamonds: Vec<Inclusion>,
    #[serde(default)]
    pub stones: Vec<Inclusion>,
}

/// Partial update of an item; absent fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateItemInput {
    #[validate(custom = "validate_item_name")]
    pub name: Option<String>,

    #[validate(custom = "validate_item_date")]
    pub date: Option<String>,

    #[validate(custom = "validate_positive_gross_weight")]
    pub gross_weight: Option<String>,

    #[validate(length(min = 1, message = "Carate is required"))]
    pub carate: Option<String>,

    #[validate(custom = "validate_net_weight")]
    pub net_weight: Option<String>,

    #[validate(custom = "validate_percentage")]
    pub percentage: Option<String>,

    #[validate(custom = "validate_making")]
    pub making: Option<String>,

    #[validate(custom = "validate_fine")]
    pub fine: Option<String>,

    pub description: Option<String>,
    pub image_url: Option<String>,

    /// `null` detaches the client; absent keeps the current one
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub client_id: Option<Option<Uuid>>,

    pub diamonds: Option<Vec<Inclusion>>,
    pub stones: Option<Vec<Inclusion>>,
}

impl UpdateItemInput {
    /// True when the update touches an input of the valuation
    pub fn changes_measurements(&self) -> bool {
        self.gross_weight.is_some()
            || self.percentage.is_some()
            || self.diamonds.is_some()
            || self.stones.is_some()
    }

    /// Client the item belongs to once this update is applied
    pub fn client_after(&self, current: Option<Uuid>) -> Option<Uuid> {
        self.client_id.unwrap_or(current)
    }
}

/// Deserialize a present field, `null` included, as `Some`
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Raw measurements for a valuation preview
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValuationRequest {
    #[serde(default)]
    pub gross_weight: String,
    #[serde(default)]
    pub percentage: String,
    #[serde(default)]
    pub diamonds: Vec<Inclusion>,
    #[serde(default)]
    pub stones: Vec<Inclusion>,
}

/// Derived values returned by a valuation preview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationResponse {
    pub net_weight: Decimal,
    pub fine: Decimal,
    pub diamond_carats: Decimal,
    pub stone_carats: Decimal,
}
