//! Helper macro for declaring driven port error enums.
//!
//! Each variant gets a `thiserror` message and a snake_case constructor whose
//! field parameters accept `impl Into<T>`, so adapters can write
//! `CatalogStoreError::query("timeout")` instead of spelling out the struct.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
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
    use crate::domain::{BookId, BookStatusKind};

    define_port_error! {
        pub enum ExamplePortError {
            Unavailable => "store unavailable",
            Query { message: String } => "query failed: {message}",
            Mismatch { id: BookId, actual: BookStatusKind } => "book {id} is {actual}",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(ExamplePortError::unavailable().to_string(), "store unavailable");
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = ExamplePortError::query("timeout");
        assert_eq!(err.to_string(), "query failed: timeout");
    }

    #[test]
    fn constructors_preserve_domain_types() {
        let id = BookId::new("6f1c2b1e-8d7a-4f4e-9a53-2f5e1c9b0a11").expect("valid id");
        let err = ExamplePortError::mismatch(id, BookStatusKind::Borrowed);
        assert_eq!(
            err.to_string(),
            "book 6f1c2b1e-8d7a-4f4e-9a53-2f5e1c9b0a11 is borrowed"
        );
    }
}
