//! Strongly-typed ID newtypes for domain entities.
//!
//! Every table uses a `BIGSERIAL` key. Wrapping it per entity keeps a
//! `CategoryId` from being passed where a `BlogId` is expected.
//!
//! # Example
//!
//! ```ignore
//! use quillboard_models::ids::{BlogId, CategoryId};
//!
//! fn get_blog(id: BlogId) { /* ... */ }
//!
//! get_blog(BlogId::from(4));
//! // get_blog(CategoryId::from(4)); // Compile error! Type mismatch.
//! ```

use serde::{Deserialize, Serialize};
use sqlx::{
    Database, Decode, Encode, Type,
    postgres::{PgHasArrayType, PgTypeInfo},
};
use std::fmt;
use utoipa::ToSchema;

macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
        #[serde(transparent)]
        #[schema(value_type = i64, format = Int64)]
        pub struct $name(pub i64);

        impl $name {
            #[inline]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            #[inline]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            #[inline]
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            #[inline]
            fn from(id: $name) -> i64 {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<i64>().map(Self)
            }
        }

        impl Type<sqlx::Postgres> for $name {
            fn type_info() -> PgTypeInfo {
                <i64 as Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <i64 as Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'q> Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <i64 as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }

        impl<'r> Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: <sqlx::Postgres as Database>::ValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                <i64 as Decode<'r, sqlx::Postgres>>::decode(value).map(Self)
            }
        }

        impl PgHasArrayType for $name {
            fn array_type_info() -> PgTypeInfo {
                <i64 as PgHasArrayType>::array_type_info()
            }
        }
    };
}

define_id!(
    /// Strongly-typed ID for User entities.
    UserId
);

define_id!(
    /// Strongly-typed ID for Role entities.
    RoleId
);

define_id!(
    /// Strongly-typed ID for Permission entities.
    PermissionId
);

define_id!(
    /// Strongly-typed ID for Blog entities.
    BlogId
);

define_id!(
    /// Strongly-typed ID for Category entities.
    CategoryId
);

define_id!(CountryId);
define_id!(StateId);
define_id!(CityId);
define_id!(CourseId);
define_id!(SubjectId);

/// Unwraps typed ids for the repository layer, which works on raw keys.
pub fn raw_ids<T: Into<i64> + Copy>(ids: &[T]) -> Vec<i64> {
    ids.iter().map(|id| (*id).into()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip_through_i64() {
        let id = BlogId::from(42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(id.get(), 42);
    }

    #[test]
    fn test_id_display_and_debug() {
        let id = RoleId::new(7);
        assert_eq!(id.to_string(), "7");
        assert_eq!(format!("{:?}", id), "RoleId(7)");
    }

    #[test]
    fn test_id_from_str() {
        assert_eq!("15".parse::<CategoryId>().unwrap(), CategoryId(15));
        assert!("abc".parse::<CategoryId>().is_err());
    }

    #[test]
    fn test_id_serde_is_transparent() {
        let json = serde_json::to_string(&PermissionId(3)).unwrap();
        assert_eq!(json, "3");
        let id: PermissionId = serde_json::from_str("9").unwrap();
        assert_eq!(id, PermissionId(9));
    }

    #[test]
    fn test_raw_ids() {
        assert_eq!(raw_ids(&[BlogId(4), BlogId(7)]), vec![4, 7]);
    }

    #[test]
    fn test_ids_are_ordered() {
        let mut ids = vec![BlogId(3), BlogId(1), BlogId(2)];
        ids.sort();
        assert_eq!(ids, vec![BlogId(1), BlogId(2), BlogId(3)]);
    }
}
