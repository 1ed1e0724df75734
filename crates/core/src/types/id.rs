//! Typed row identifiers.
//!
//! Every table uses a `SERIAL` key. Wrapping each in its own type keeps a
//! `ShopId` from being passed where a `ProductId` is expected.

macro_rules! row_ids {
    ($($(#[$doc:meta])* $name:ident),+ $(,)?) => {$(
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[cfg_attr(feature = "postgres", derive(::sqlx::Type))]
        #[cfg_attr(feature = "postgres", sqlx(transparent))]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    )+};
}

row_ids! {
    /// Account key (`users.id`).
    UserId,
    /// Storefront key (`shops.id`).
    ShopId,
    /// Catalog entry key (`products.id`).
    ProductId,
    /// Cart line key (`cart_items.id`).
    CartItemId,
    /// Wishlist entry key (`wishlist_items.id`).
    WishlistItemId,
    /// Order key (`orders.id`), distinct from the customer-facing order number.
    OrderId,
    /// Payment record key (`payments.id`).
    PaymentId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrips_through_i32() {
        let id = ProductId::new(42);
        assert_eq!(id.as_i32(), 42);
        assert_eq!(i32::from(id), 42);
        assert_eq!(ProductId::from(42), id);
    }

    #[test]
    fn test_id_serializes_transparently() {
        let json = serde_json::to_string(&ShopId::new(7)).expect("serialize");
        assert_eq!(json, "7");
        let id: ShopId = serde_json::from_str("7").expect("deserialize");
        assert_eq!(id, ShopId::new(7));
    }

    #[test]
    fn test_ids_order_numerically() {
        let mut ids = vec![ProductId::new(10), ProductId::new(2), ProductId::new(7)];
        ids.sort();
        assert_eq!(ids, [ProductId::new(2), ProductId::new(7), ProductId::new(10)]);
        assert_eq!(OrderId::new(123).to_string(), "123");
    }
}
