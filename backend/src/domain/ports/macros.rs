//! Helper macro generating domain port error enums.

/// Declare a `thiserror` enum whose variants carry named fields and gain
/// snake_case constructors accepting `impl Into<T>` for each field.
macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),* $(,)? } => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field : $ty),* },
            )*
        }

        impl $name {
            ::paste::paste! {
                $(
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                        Self::$variant { $($field: $field.into()),* }
                    }
                )*
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        /// Example error for macro coverage.
        pub enum SampleError {
            Unavailable { message: String } => "backend unavailable: {message}",
            Rejected { message: String, attempts: u32 } => "rejected after {attempts} tries: {message}",
        }
    }

    #[test]
    fn constructors_accept_into_types() {
        let err = SampleError::unavailable("redis timed out");
        assert_eq!(err.to_string(), "backend unavailable: redis timed out");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = SampleError::rejected("lock contention", 3_u32);
        assert_eq!(err.to_string(), "rejected after 3 tries: lock contention");
    }
}
