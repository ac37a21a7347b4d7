//! Runtime field access for types the engine has never seen.
//!
//! A type opts in by listing its zero-argument getters with [`reflect!`]. The
//! generated table is all the engine knows about the type: accessor names in
//! slot order and a way to invoke a slot. Discovery of which slot answers a
//! given field name happens in [`AccessorCache`] and is memoized per type.

mod cache;
mod value;

use std::any::TypeId;

pub use cache::{Accessor, AccessorCache};
pub use value::{Blob, FieldValue, ToField};

/// Per-type accessor table.
///
/// Implement with [`reflect!`](crate::reflect) rather than by hand.
pub trait Reflect {
    /// Stable identity of the concrete type, used as the cache key.
    fn type_key(&self) -> TypeId;

    fn type_name(&self) -> &'static str;

    /// Accessor names in slot order.
    fn accessors(&self) -> &'static [&'static str];

    /// Invoke the accessor at `slot`. `None` for an unknown slot or an absent value.
    fn invoke(&self, slot: usize) -> Option<FieldValue<'_>>;
}

/// Generate a [`Reflect`] impl from a list of `&self` getter methods.
///
/// Each getter's return type must implement [`ToField`].
///
/// ```ignore
/// reflect!(GetObjectRequest { bucket, key, version_id });
/// ```
#[macro_export]
macro_rules! reflect {
    ($ty:ty { $($getter:ident),* $(,)? }) => {
        impl $crate::domain::reflect::Reflect for $ty {
            fn type_key(&self) -> ::std::any::TypeId {
                ::std::any::TypeId::of::<$ty>()
            }

            fn type_name(&self) -> &'static str {
                ::std::any::type_name::<$ty>()
            }

            fn accessors(&self) -> &'static [&'static str] {
                &[$(stringify!($getter)),*]
            }

            #[allow(unused_mut, unused_variables, unused_assignments)]
            fn invoke(&self, slot: usize) -> Option<$crate::domain::reflect::FieldValue<'_>> {
                let mut index = 0usize;
                $(
                    if index == slot {
                        return $crate::domain::reflect::ToField::to_field(self.$getter());
                    }
                    index += 1;
                )*
                None
            }
        }
    };
}

/// Identity of `T` as seen by the accessor cache.
pub fn type_key_of<T: 'static>() -> TypeId {
    TypeId::of::<T>()
}
