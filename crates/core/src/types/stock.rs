//! Stock guard for cart quantities.
//!
//! Carts never reserve stock. These checks only compare against the stock
//! read at the time of the cart change; the order step re-checks atomically.

/// Why a requested quantity was rejected.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockError {
    /// Quantity is zero or negative.
    #[error("quantity must be at least 1 (got {0})")]
    InvalidQuantity(i32),
    /// Not enough units in stock.
    #[error("insufficient stock: requested {requested}, available {available}")]
    Insufficient {
        /// Units currently in stock.
        available: i32,
        /// Units the cart line would hold after the change.
        requested: i32,
    },
}

/// Check adding `requested` units to a cart line already holding `existing`.
///
/// Returns the new line quantity.
///
/// # Errors
///
/// Returns `StockError::InvalidQuantity` if `requested < 1` and
/// `StockError::Insufficient` if the combined quantity exceeds `available`.
pub fn check_cart_add(existing: i32, requested: i32, available: i32) -> Result<i32, StockError> {
    if requested < 1 {
        return Err(StockError::InvalidQuantity(requested));
    }
    let combined = existing.saturating_add(requested);
    if combined > available {
        return Err(StockError::Insufficient {
            available,
            requested: combined,
        });
    }
    Ok(combined)
}

/// Check setting a cart line to `requested` units.
///
/// # Errors
///
/// Returns `StockError::InvalidQuantity` if `requested < 1` and
/// `StockError::Insufficient` if it exceeds `available`.
pub const fn check_cart_update(requested: i32, available: i32) -> Result<i32, StockError> {
    if requested < 1 {
        return Err(StockError::InvalidQuantity(requested));
    }
    if requested > available {
        return Err(StockError::Insufficient {
            available,
            requested,
        });
    }
    Ok(requested)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_exactly_remaining_stock_succeeds() {
        assert_eq!(check_cart_add(0, 5, 5), Ok(5));
    }

    #[test]
    fn test_add_one_more_than_remaining_fails_with_available() {
        assert_eq!(
            check_cart_add(0, 6, 5),
            Err(StockError::Insufficient {
                available: 5,
                requested: 6
            })
        );
    }

    #[test]
    fn test_add_sums_with_existing_line() {
        assert_eq!(check_cart_add(3, 2, 5), Ok(5));
        assert_eq!(
            check_cart_add(3, 3, 5),
            Err(StockError::Insufficient {
                available: 5,
                requested: 6
            })
        );
    }

    #[test]
    fn test_add_rejects_non_positive_quantity() {
        assert_eq!(check_cart_add(1, 0, 5), Err(StockError::InvalidQuantity(0)));
        assert_eq!(check_cart_add(1, -2, 5), Err(StockError::InvalidQuantity(-2)));
    }

    #[test]
    fn test_add_against_empty_stock() {
        assert!(matches!(
            check_cart_add(0, 1, 0),
            Err(StockError::Insufficient { available: 0, .. })
        ));
    }

    #[test]
    fn test_update_compares_directly_to_stock() {
        // Existing quantity is irrelevant for updates.
        assert_eq!(check_cart_update(5, 5), Ok(5));
        assert_eq!(
            check_cart_update(6, 5),
            Err(StockError::Insufficient {
                available: 5,
                requested: 6
            })
        );
        assert_eq!(check_cart_update(0, 5), Err(StockError::InvalidQuantity(0)));
    }
}
