//! Defines helper macros for generating domain port error enums.

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
    //! Constructor generation for port error enums.
    use rstest::rstest;

    define_port_error! {
        pub enum MembershipStoreError {
            Unreachable => "membership store unreachable",
            Rejected { message: String } => "membership write rejected: {message}",
            Capacity { limit: u32 } => "membership capacity of {limit} reached",
            Duplicate { community: String, user: String } =>
                "user {user} already belongs to {community}",
        }
    }

    #[rstest]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(
            MembershipStoreError::unreachable().to_string(),
            "membership store unreachable"
        );
    }

    #[rstest]
    fn string_fields_accept_borrowed_text() {
        let error = MembershipStoreError::rejected("read only replica");
        assert_eq!(error.to_string(), "membership write rejected: read only replica");
    }

    #[rstest]
    fn non_string_fields_keep_their_type() {
        let error = MembershipStoreError::capacity(250_u32);
        assert_eq!(error, MembershipStoreError::Capacity { limit: 250 });
    }

    #[rstest]
    fn multi_field_constructors_follow_declaration_order() {
        let error = MembershipStoreError::duplicate("Soup Club", "ada");
        assert_eq!(error.to_string(), "user ada already belongs to Soup Club");
    }
}
