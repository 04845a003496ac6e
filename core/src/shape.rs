//! Static distinction between record states and scalar states.
//!
//! A store's `patch_state` behaves differently depending on what the state
//! is:
//!
//! - **Record** (a struct deriving `Record`): the partial is a companion
//!   `…Patch` struct whose `Some` fields override the current ones; every
//!   other field is carried over unchanged (shallow merge).
//! - **Scalar** (anything else): the partial is a whole new value and the
//!   patch replaces the state wholesale.
//!
//! Scalar replacement is a documented behavior, not an error: patching a
//! scalar state with a value *is* the new state. The distinction is fixed by
//! the type, so there is no runtime shape check.

/// The two patch behaviors a state can have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// Composite record, patched by shallow merge
    Record,

    /// Scalar value, patched by replacement
    Scalar,
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Record => write!(f, "record"),
            Self::Scalar => write!(f, "scalar"),
        }
    }
}

/// How a state type absorbs a partial update
///
/// Implemented by `#[derive(Record)]` for composite states and by
/// [`scalar_state!`](crate::scalar_state) for everything else.
///
/// # Invariant
///
/// `merge` never mutates `self`; it always builds a new value. Fields that
/// are not overridden are cloned, which for `Arc` fields keeps their
/// identity so downstream projections see them as unchanged.
pub trait StateShape: Sized + Send + Sync + 'static {
    /// The partial update type accepted by `patch_state`
    type Partial: Send + 'static;

    /// Whether this state merges or replaces on patch
    const KIND: ShapeKind;

    /// Build the next state from the current one and a partial update
    #[must_use]
    fn merge(&self, partial: Self::Partial) -> Self;
}

/// Implement [`StateShape`] with replace-on-patch semantics
///
/// Use this for application states that are not composite records, such as
/// enums or newtypes:
///
/// ```
/// use composable_state_core::{ShapeKind, StateShape, scalar_state};
///
/// #[derive(Clone, Debug, PartialEq)]
/// enum Phase {
///     Idle,
///     Running,
/// }
///
/// scalar_state!(Phase);
///
/// assert_eq!(Phase::Idle.merge(Phase::Running), Phase::Running);
/// assert_eq!(<Phase as StateShape>::KIND, ShapeKind::Scalar);
/// ```
#[macro_export]
macro_rules! scalar_state {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::shape::StateShape for $ty {
                type Partial = Self;

                const KIND: $crate::shape::ShapeKind = $crate::shape::ShapeKind::Scalar;

                fn merge(&self, partial: Self::Partial) -> Self {
                    partial
                }
            }
        )*
    };
}

scalar_state!(
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
    f32,
    f64,
    String,
);

impl<T: Send + Sync + 'static> StateShape for Vec<T> {
    type Partial = Self;

    const KIND: ShapeKind = ShapeKind::Scalar;

    fn merge(&self, partial: Self::Partial) -> Self {
        partial
    }
}

impl<T: Send + Sync + 'static> StateShape for Option<T> {
    type Partial = Self;

    const KIND: ShapeKind = ShapeKind::Scalar;

    fn merge(&self, partial: Self::Partial) -> Self {
        partial
    }
}
