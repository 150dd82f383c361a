//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i32` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_i32()`
/// - `From<i32>` and `Into<i32>` implementations
/// - `FromStr`, so ids can be read back out of `data-id` attributes
///
/// # Example
///
/// ```rust
/// # use aymodines_core::define_id;
/// define_id!(MenuItemId);
/// define_id!(TableId);
///
/// let item = MenuItemId::new(1);
/// let table = TableId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: MenuItemId = table;
/// assert_eq!("7".parse::<MenuItemId>().unwrap(), MenuItemId::new(7));
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i32>().map(Self)
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
    };
}

// Menu items are the only entity the cart references.
define_id!(ItemId);

impl ItemId {
    /// Whether this id counts as "no id" for an incoming item.
    ///
    /// Menu pages never emit `0`; a zero id means the payload was built
    /// without one.
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_parses_data_attribute() {
        assert_eq!("42".parse::<ItemId>().unwrap(), ItemId::new(42));
        assert_eq!(" 3 ".parse::<ItemId>().unwrap(), ItemId::new(3));
        assert!("abc".parse::<ItemId>().is_err());
        assert!("".parse::<ItemId>().is_err());
    }

    #[test]
    fn test_item_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&ItemId::new(5)).unwrap();
        assert_eq!(json, "5");
        let id: ItemId = serde_json::from_str("12").unwrap();
        assert_eq!(id.as_i32(), 12);
    }

    #[test]
    fn test_zero_id_is_unset() {
        assert!(ItemId::new(0).is_unset());
        assert!(!ItemId::new(1).is_unset());
    }
}
