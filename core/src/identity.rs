//! Change-detection equality for projected values.
//!
//! A store notifies a subscriber only when the projected value is not the
//! *same* as the one it delivered last. "Same" here is identity, not deep
//! equality:
//!
//! - shared handles (`Arc<T>`) are the same when they point at the same
//!   allocation
//! - scalars (`bool`, integers, `char`, `String`, `&'static str`) are the
//!   same when they are equal, since they carry no identity of their own
//! - `Option` and tuples compare component-wise
//!
//! Collections such as `Vec<T>` deliberately do not implement [`Identity`]:
//! a projector that builds a fresh `Vec` on every call would either never
//! change (deep equality) or always change (allocation identity). Keep
//! sequences behind an `Arc<[T]>` in the state and project the `Arc`.

use std::sync::Arc;

/// Identity comparison used to suppress consecutive duplicate emissions
///
/// # Example
///
/// ```
/// use composable_state_core::Identity;
/// use std::sync::Arc;
///
/// let a: Arc<[u8]> = Arc::from(vec![1, 2, 3]);
/// let b: Arc<[u8]> = Arc::from(vec![1, 2, 3]);
///
/// assert!(a.same(&Arc::clone(&a)));
/// assert!(!a.same(&b)); // equal contents, different allocation
/// assert!(true.same(&true));
/// ```
pub trait Identity {
    /// Returns true if `other` is the same value as `self`
    fn same(&self, other: &Self) -> bool;
}

impl<T: ?Sized> Identity for Arc<T> {
    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: Identity> Identity for Option<T> {
    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.same(b),
            (None, None) => true,
            _ => false,
        }
    }
}

macro_rules! value_identity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Identity for $ty {
                fn same(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

value_identity!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    String,
    &'static str,
);

// NaN is never the same as itself, matching strict equality.
#[allow(clippy::float_cmp)]
mod floats {
    use super::Identity;

    value_identity!(f32, f64);
}

macro_rules! tuple_identity {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Identity),+> Identity for ($($name,)+) {
            fn same(&self, other: &Self) -> bool {
                $(self.$idx.same(&other.$idx))&&+
            }
        }
    };
}

tuple_identity!(A: 0, B: 1);
tuple_identity!(A: 0, B: 1, C: 2);
tuple_identity!(A: 0, B: 1, C: 2, D: 3);
