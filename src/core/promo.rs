//! Promo ledger business logic - Validation and exactly-once usage reservation.
//!
//! A promo code's usage counter is shared, contended state: two concurrent bookings
//! may race for its last remaining use. Reservation therefore happens through a
//! guarded atomic UPDATE (`times_used = times_used + 1` with the limit re-checked in
//! the WHERE clause) inside the caller's booking transaction, so exactly one racer
//! can win and a promo failure rolls the whole booking back.

use crate::{
    entities::{PromoCode, promo_code, promo_code::DiscountType},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    Condition, DatabaseConnection, Set,
    prelude::*,
    sea_query::Expr,
};

/// Normalizes a user-supplied code for case-insensitive matching.
fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Validates a promo code against activation, expiry, and usage-limit rules.
///
/// Returns the promo model on success. Failures are the expected, user-facing
/// outcomes [`Error::PromoNotFound`], [`Error::PromoInactive`],
/// [`Error::PromoExpired`], and [`Error::PromoUsageExceeded`].
pub async fn validate_promo<C>(
    db: &C,
    code: &str,
    now: DateTime<Utc>,
) -> Result<promo_code::Model>
where
    C: ConnectionTrait,
{
    let normalized = normalize_code(code);

    let promo = PromoCode::find()
        .filter(promo_code::Column::Code.eq(normalized.clone()))
        .one(db)
        .await?
        .ok_or_else(|| Error::PromoNotFound {
            code: normalized.clone(),
        })?;

    if !promo.is_active {
        return Err(Error::PromoInactive { code: promo.code });
    }

    if let Some(expires_at) = promo.expires_at {
        if now > expires_at {
            return Err(Error::PromoExpired { code: promo.code });
        }
    }

    if promo.usage_exhausted() {
        return Err(Error::PromoUsageExceeded { code: promo.code });
    }

    Ok(promo)
}

/// Reserves one usage unit of a promo code with a guarded atomic increment.
///
/// Must be called inside the same transaction as the booking it supports. The usage
/// limit is re-checked in the UPDATE's WHERE clause, so of two transactions racing
/// for the last use exactly one sees a row updated; the other gets
/// [`Error::PromoUsageExceeded`]. A `max_uses` of NULL or <= 0 never limits.
pub async fn reserve_promo_use<C>(db: &C, promo: &promo_code::Model) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = PromoCode::update_many()
        .col_expr(
            promo_code::Column::TimesUsed,
            Expr::col(promo_code::Column::TimesUsed).add(1),
        )
        .filter(promo_code::Column::Id.eq(promo.id))
        .filter(
            Condition::any()
                .add(promo_code::Column::MaxUses.is_null())
                .add(promo_code::Column::MaxUses.lte(0))
                .add(
                    Expr::col(promo_code::Column::TimesUsed)
                        .lt(Expr::col(promo_code::Column::MaxUses)),
                ),
        )
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::PromoUsageExceeded {
            code: promo.code.clone(),
        });
    }

    Ok(())
}

/// Computes the discount a promo grants over an eligible base amount.
///
/// Percentage codes yield `base * value / 100`; fixed-amount codes yield the smaller
/// of the value and the base, so a discount can never exceed what it discounts.
#[must_use]
pub fn discount_amount(promo: &promo_code::Model, base_amount: f64) -> f64 {
    let discount = match promo.discount_type {
        DiscountType::Percentage => base_amount * promo.discount_value / 100.0,
        DiscountType::FixedAmount => promo.discount_value.min(base_amount),
    };

    discount.max(0.0)
}

/// Creates a promo code, normalizing the code and skipping codes that already exist.
///
/// Returns `Ok(None)` when the code is already present, which lets catalog seeding
/// run repeatedly without duplicating rows.
pub async fn create_promo_code(
    db: &DatabaseConnection,
    code: &str,
    discount_type: DiscountType,
    discount_value: f64,
    expires_at: Option<DateTime<Utc>>,
    max_uses: Option<i32>,
) -> Result<Option<promo_code::Model>> {
    let normalized = normalize_code(code);

    if normalized.is_empty() {
        return Err(Error::Config {
            message: "Promo code cannot be empty".to_string(),
        });
    }

    if discount_value < 0.0 || !discount_value.is_finite() {
        return Err(Error::InvalidAmount {
            amount: discount_value,
        });
    }

    let existing = PromoCode::find()
        .filter(promo_code::Column::Code.eq(normalized.clone()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(None);
    }

    let promo = promo_code::ActiveModel {
        code: Set(normalized),
        discount_type: Set(discount_type),
        discount_value: Set(discount_value),
        expires_at: Set(expires_at),
        max_uses: Set(max_uses),
        times_used: Set(0),
        is_active: Set(true),
        ..Default::default()
    };

    let result = promo.insert(db).await?;
    Ok(Some(result))
}
