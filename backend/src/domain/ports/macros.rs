//! `define_port_error!` declares a port's error enum together with one
//! snake_case constructor per variant. Field parameters take `impl Into<_>`
//! so callers can pass `&str` for `String` fields.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[must_use]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* }) => {
        ::paste::paste! {
            #[must_use]
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum KitchenError {
            Closed => "kitchen closed",
            OutOfStock { dish: String } => "out of {dish}",
            Backlog { tickets: u32 } => "{tickets} tickets waiting",
            Rejected { status: u16, reason: String } => "rejected ({status}): {reason}",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(KitchenError::closed().to_string(), "kitchen closed");
    }

    #[test]
    fn string_fields_accept_str() {
        let err = KitchenError::out_of_stock("basil");
        assert_eq!(err, KitchenError::OutOfStock { dish: String::from("basil") });
        assert_eq!(err.to_string(), "out of basil");
    }

    #[test]
    fn other_field_types_pass_through() {
        assert_eq!(KitchenError::backlog(12_u32).to_string(), "12 tickets waiting");
        assert_eq!(
            KitchenError::rejected(503_u16, "busy").to_string(),
            "rejected (503): busy"
        );
    }
}
