//! Jewelry item service

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};
use crate::models::{
    carat_total, compute_fine, generate_item_id, parse_decimal_prefix, parse_item_date,
    ClientSummary, CreateItemInput, Inclusion, Item, ItemWithClient,
    ListQuery, Precision, UpdateItemInput, Valuation, ValuationRequest, ValuationResponse,
};
use crate::services::ClientService;

const ITEM_COLUMNS: &str = r#"
    i.id, i.item_id, i.user_id, i.client_id, i.name, i.description, i.date,
    i.gross_weight, i.carate, i.net_weight, i.diamonds, i.stones, i.percentage,
    i.making, i.fine, i.image_url, i.created_at, i.updated_at
"#;

/// Item service for recording and valuing jewelry pieces
#[derive(Clone)]
pub struct ItemService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    item_id: String,
    user_id: String,
    client_id: Option<Uuid>,
    name: String,
    description: Option<String>,
    date: NaiveDate,
    gross_weight: Decimal,
    carate: String,
    net_weight: Decimal,
    diamonds: Json<Vec<Inclusion>>,
    stones: Json<Vec<Inclusion>>,
    percentage: Decimal,
    making: Option<Decimal>,
    fine: Decimal,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: row.id,
            item_id: row.item_id,
            user_id: row.user_id,
            client_id: row.client_id,
            name: row.name,
            description: row.description,
            date: row.date,
            gross_weight: row.gross_weight,
            carate: row.carate,
            net_weight: row.net_weight,
            diamonds: row.diamonds.0,
            stones: row.stones.0,
            percentage: row.percentage,
            making: row.making,
            fine: row.fine,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ItemWithClientRow {
    #[sqlx(flatten)]
    item: ItemRow,
    client_name: Option<String>,
    client_phone: Option<String>,
    client_email: Option<String>,
}

impl From<ItemWithClientRow> for ItemWithClient {
    fn from(row: ItemWithClientRow) -> Self {
        let client = match (row.item.client_id, row.client_name, row.client_phone) {
            (Some(id), Some(name), Some(phone)) => Some(ClientSummary {
                id,
                name,
                phone,
                email: row.client_email,
            }),
            _ => None,
        };
        ItemWithClient {
            item: row.item.into(),
            client,
        }
    }
}

/// Numeric text that already passed validation
fn decimal_field(value: &str, field: &str) -> AppResult<Decimal> {
    parse_decimal_prefix(value).ok_or_else(|| AppError::Validation {
        field: field.to_string(),
        message: format!("{} must be a number", field),
    })
}

fn field_error(field: &str, err: ValidationError) -> AppError {
    AppError::Validation {
        field: field.to_string(),
        message: err
            .message
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("{} is invalid", field)),
    }
}

fn date_field(value: &str) -> AppResult<NaiveDate> {
    parse_item_date(value).map_err(|e| field_error("date", e))
}

/// A derived value still has to fit its column
fn stored_value(value: Decimal, precision: Precision, field: &str) -> AppResult<Decimal> {
    precision
        .check(value)
        .map(|_| value)
        .map_err(|e| field_error(field, e))
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl ItemService {
    /// Create a new ItemService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Net weight and fine for raw form measurements, no persistence involved
    pub fn preview_valuation(request: &ValuationRequest) -> ValuationResponse {
        let valuation = Valuation::derive(
            &request.gross_weight,
            &request.diamonds,
            &request.stones,
            &request.percentage,
        );
        ValuationResponse {
            net_weight: valuation.net_weight,
            fine: valuation.fine,
            diamond_carats: carat_total(&request.diamonds),
            stone_carats: carat_total(&request.stones),
        }
    }

    /// Items of a user, newest first, with their clients
    pub async fn list_items(
        &self,
        user_id: &str,
        query: &ListQuery,
    ) -> AppResult<Vec<ItemWithClient>> {
        let sql = format!(
            r#"
            SELECT {ITEM_COLUMNS},
                   c.name AS client_name, c.phone AS client_phone, c.email AS client_email
            FROM items i
            LEFT JOIN clients c ON c.id = i.client_id
            WHERE i.user_id = $1
              AND ($2::text IS NULL
                   OR i.name ILIKE $2
                   OR i.description ILIKE $2)
            ORDER BY i.created_at DESC
            "#
        );

        let rows = sqlx::query_as::<_, ItemWithClientRow>(&sql)
            .bind(user_id)
            .bind(query.ilike_pattern())
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(ItemWithClient::from).collect())
    }

    pub async fn get_item(&self, user_id: &str, id: Uuid) -> AppResult<ItemWithClient> {
        let sql = format!(
            r#"
            SELECT {ITEM_COLUMNS},
                   c.name AS client_name, c.phone AS client_phone, c.email AS client_email
            FROM items i
            LEFT JOIN clients c ON c.id = i.client_id
            WHERE i.id = $1 AND i.user_id = $2
            "#
        );

        let row = sqlx::query_as::<_, ItemWithClientRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        Ok(row.into())
    }

    /// Record a new item
    ///
    /// Omitted `net_weight` / `fine` are derived from the measurements.
    pub async fn create_item(&self, user_id: &str, input: CreateItemInput) -> AppResult<Item> {
        input.validate()?;

        let date = date_field(&input.date)?;
        let gross_weight = decimal_field(&input.gross_weight, "gross_weight")?;
        let percentage = decimal_field(&input.percentage, "percentage")?;
        let making = optional_text(input.making)
            .map(|m| decimal_field(&m, "making"))
            .transpose()?;

        let net_weight = match input.net_weight.as_deref() {
            Some(value) => decimal_field(value, "net_weight")?,
            None => Valuation::derive(gross_weight, &input.diamonds, &input.stones, percentage)
                .net_weight,
        };
        let fine = match input.fine.as_deref() {
            Some(value) => decimal_field(value, "fine")?,
            None => compute_fine(net_weight, percentage),
        };
        let net_weight = stored_value(net_weight, Precision::GRAMS, "net_weight")?;
        let fine = stored_value(fine, Precision::AMOUNT, "fine")?;

        if let Some(client_id) = input.client_id {
            self.ensure_client(user_id, client_id).await?;
        }

        let item_id = generate_item_id();

        let sql = format!(
            r#"
            INSERT INTO items AS i (item_id, user_id, client_id, name, description, date,
                               gross_weight, carate, net_weight, diamonds, stones,
                               percentage, making, fine, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {ITEM_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(&item_id)
            .bind(user_id)
            .bind(input.client_id)
            .bind(input.name.trim())
            .bind(optional_text(input.description))
            .bind(date)
            .bind(gross_weight)
            .bind(input.carate.trim())
            .bind(net_weight)
            .bind(Json(&input.diamonds))
            .bind(Json(&input.stones))
            .bind(percentage)
            .bind(making)
            .bind(fine)
            .bind(optional_text(input.image_url))
            .fetch_one(&self.db)
            .await
            .map_err(|e| AppError::from_insert(e, "item_id"))?;

        tracing::info!(item_id = %row.item_id, %net_weight, %fine, "Item created");

        Ok(row.into())
    }

    /// Apply a partial update
    ///
    /// When measurements change and the caller did not send derived values,
    /// net weight and fine are derived again from the merged record.
    pub async fn update_item(
        &self,
        user_id: &str,
        id: Uuid,
        input: UpdateItemInput,
    ) -> AppResult<Item> {
        input.validate()?;

        let existing: Item = {
            let sql = format!("SELECT {ITEM_COLUMNS} FROM items i WHERE i.id = $1 AND i.user_id = $2");
            sqlx::query_as::<_, ItemRow>(&sql)
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Item".to_string()))?
                .into()
        };

        if let Some(Some(client_id)) = input.client_id {
            self.ensure_client(user_id, client_id).await?;
        }
        let client_id = input.client_after(existing.client_id);

        let remeasure = input.changes_measurements();

        let name = input
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.name);
        let date = match input.date.as_deref() {
            Some(value) => date_field(value)?,
            None => existing.date,
        };
        let gross_weight = match input.gross_weight.as_deref() {
            Some(value) => decimal_field(value, "gross_weight")?,
            None => existing.gross_weight,
        };
        let percentage = match input.percentage.as_deref() {
            Some(value) => decimal_field(value, "percentage")?,
            None => existing.percentage,
        };
        let carate = input
            .carate
            .map(|c| c.trim().to_string())
            .unwrap_or(existing.carate);
        let diamonds = input.diamonds.unwrap_or(existing.diamonds);
        let stones = input.stones.unwrap_or(existing.stones);
        let making = match input.making {
            Some(value) => optional_text(Some(value))
                .map(|m| decimal_field(&m, "making"))
                .transpose()?,
            None => existing.making,
        };

        let net_weight = match input.net_weight.as_deref() {
            Some(value) => decimal_field(value, "net_weight")?,
            None if remeasure => {
                Valuation::derive(gross_weight, &diamonds, &stones, percentage).net_weight
            }
            None => existing.net_weight,
        };
        let fine = match input.fine.as_deref() {
            Some(value) => decimal_field(value, "fine")?,
            None if remeasure || input.net_weight.is_some() => compute_fine(net_weight, percentage),
            None => existing.fine,
        };
        let net_weight = stored_value(net_weight, Precision::GRAMS, "net_weight")?;
        let fine = stored_value(fine, Precision::AMOUNT, "fine")?;

        let description = match input.description {
            Some(value) => optional_text(Some(value)),
            None => existing.description,
        };
        let image_url = match input.image_url {
            Some(value) => optional_text(Some(value)),
            None => existing.image_url,
        };

        let sql = format!(
            r#"
            UPDATE items AS i
            SET client_id = $1, name = $2, description = $3, date = $4,
                gross_weight = $5, carate = $6, net_weight = $7, diamonds = $8,
                stones = $9, percentage = $10, making = $11, fine = $12,
                image_url = $13, updated_at = NOW()
            WHERE i.id = $14 AND i.user_id = $15
            RETURNING {ITEM_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(client_id)
            .bind(&name)
            .bind(&description)
            .bind(date)
            .bind(gross_weight)
            .bind(&carate)
            .bind(net_weight)
            .bind(Json(&diamonds))
            .bind(Json(&stones))
            .bind(percentage)
            .bind(making)
            .bind(fine)
            .bind(&image_url)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        Ok(row.into())
    }

    pub async fn delete_item(&self, user_id: &str, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Item".to_string()));
        }
        Ok(())
    }

    async fn ensure_client(&self, user_id: &str, client_id: Uuid) -> AppResult<()> {
        let owned = ClientService::new(self.db.clone())
            .owns_client(user_id, client_id)
            .await?;
        if !owned {
            return Err(AppError::NotFound("Client".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(weight: &str, pieces: &str) -> Inclusion {
        Inclusion {
            id: "1".to_string(),
            weight: weight.to_string(),
            pieces: pieces.to_string(),
            rate: "52000".to_string(),
        }
    }

    #[test]
    fn test_preview_valuation() {
        let request = ValuationRequest {
            gross_weight: "5".to_string(),
            percentage: "91.6".to_string(),
            diamonds: vec![row("0.5", "4")],
            stones: vec![row("1", "1")],
        };

        let preview = ItemService::preview_valuation(&request);
        assert_eq!(preview.net_weight.to_string(), "5.600");
        assert_eq!(preview.fine.to_string(), "5.13");
        assert_eq!(preview.diamond_carats.to_string(), "2.00");
        assert_eq!(preview.stone_carats.to_string(), "1.00");
    }

    #[test]
    fn test_preview_of_empty_form() {
        let preview = ItemService::preview_valuation(&ValuationRequest::default());
        assert_eq!(preview.net_weight.to_string(), "0.000");
        assert_eq!(preview.fine.to_string(), "0.00");
    }

    #[test]
    fn test_decimal_field() {
        assert_eq!(decimal_field("12.5", "gross_weight").unwrap().to_string(), "12.5");
        assert!(matches!(
            decimal_field("abc", "gross_weight"),
            Err(AppError::Validation { .. })
        ));
    }

    #[test]
    fn test_derived_values_must_fit_columns() {
        let request = ValuationRequest {
            gross_weight: "99999999999".to_string(),
            percentage: "9999".to_string(),
            diamonds: vec![row("5000", "1")],
            stones: vec![],
        };
        let preview = ItemService::preview_valuation(&request);

        assert!(matches!(
            stored_value(preview.net_weight, Precision::GRAMS, "net_weight"),
            Err(AppError::Validation { ref field, .. }) if field == "net_weight"
        ));
        assert!(stored_value(preview.fine, Precision::AMOUNT, "fine").is_err());
        assert_eq!(
            stored_value(Decimal::new(5600, 3), Precision::GRAMS, "net_weight").unwrap(),
            Decimal::new(5600, 3)
        );
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(Some("  ".to_string())), None);
        assert_eq!(optional_text(Some(" note ".to_string())), Some("note".to_string()));
        assert_eq!(optional_text(None), None);
    }
}
