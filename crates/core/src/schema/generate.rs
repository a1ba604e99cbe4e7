//! Ahead-of-time schema generation.
//!
//! Every type that can appear in tool arguments implements [`Schematic`].
//! Structs and enums get it from `#[derive(Schematic)]`; the implementations
//! below cover the primitives and containers the derived code recurses into.
//! Types with no portable representation (tuples, unit, raw pointers, ...)
//! have no implementation, so using them is a compile error.

use crate::schema::Schema;
use serde_json::Value;
use std::{
    borrow::Cow,
    cell::Cell,
    collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
    rc::Rc,
    sync::Arc,
};

/// Deepest nesting a generated schema may reach.
///
/// Schemas are always inlined, so a recursive type would otherwise expand
/// forever.
pub const MAX_DEPTH: usize = 64;

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// A type with a statically known schema
pub trait Schematic {
    /// Describe the type.
    ///
    /// Must be pure: every call returns a structurally equal schema.
    fn schema() -> Schema;
}

/// Generate the schema of `T`.
pub fn schema_for<T: Schematic + ?Sized>() -> Schema {
    nested::<T>()
}

/// Generate the schema of `T` from inside another schema.
///
/// # Panics
///
/// Panics when generation nests deeper than [`MAX_DEPTH`], which only
/// happens for recursive types.
pub fn nested<T: Schematic + ?Sized>() -> Schema {
    struct Guard;

    impl Drop for Guard {
        fn drop(&mut self) {
            DEPTH.with(|depth| depth.set(depth.get() - 1));
        }
    }

    let depth = DEPTH.with(|depth| {
        depth.set(depth.get() + 1);
        depth.get()
    });
    let _guard = Guard;
    if depth > MAX_DEPTH {
        panic!(
            "schema of {} nests deeper than {MAX_DEPTH} levels, recursive types cannot be inlined",
            std::any::type_name::<T>()
        );
    }

    T::schema()
}

macro_rules! primitive {
    ($ctor:ident => $($ty:ty),+) => {
        $(
            impl Schematic for $ty {
                fn schema() -> Schema {
                    Schema::$ctor()
                }
            }
        )+
    };
}

primitive!(string => String, str, char);
primitive!(boolean => bool);
primitive!(integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
primitive!(number => f32, f64);

macro_rules! transparent {
    ($($ty:ident),+) => {
        $(
            impl<T: Schematic + ?Sized> Schematic for $ty<T> {
                fn schema() -> Schema {
                    nested::<T>()
                }
            }
        )+
    };
}

// pointers and `Option` describe their target, presence stays the field's concern
transparent!(Box, Rc, Arc);

impl<T: Schematic> Schematic for Option<T> {
    fn schema() -> Schema {
        nested::<T>()
    }
}

impl<T: Schematic + ?Sized> Schematic for &T {
    fn schema() -> Schema {
        nested::<T>()
    }
}

impl<T: Schematic + ToOwned + ?Sized> Schematic for Cow<'_, T> {
    fn schema() -> Schema {
        nested::<T>()
    }
}

macro_rules! sequence {
    ($($ty:ident),+) => {
        $(
            impl<T: Schematic> Schematic for $ty<T> {
                fn schema() -> Schema {
                    Schema::array(nested::<T>())
                }
            }
        )+
    };
}

sequence!(Vec, VecDeque, BTreeSet);

impl<T: Schematic, S> Schematic for HashSet<T, S> {
    fn schema() -> Schema {
        Schema::array(nested::<T>())
    }
}

impl<T: Schematic> Schematic for [T] {
    fn schema() -> Schema {
        Schema::array(nested::<T>())
    }
}

impl<T: Schematic, const N: usize> Schematic for [T; N] {
    fn schema() -> Schema {
        let mut schema = Schema::array(nested::<T>());
        schema.min_items = Some(N as u64);
        schema.max_items = Some(N as u64);
        schema
    }
}

impl<K, V: Schematic> Schematic for BTreeMap<K, V> {
    fn schema() -> Schema {
        Schema::object()
    }
}

impl<K, V: Schematic, S> Schematic for HashMap<K, V, S> {
    fn schema() -> Schema {
        Schema::object()
    }
}

impl Schematic for serde_json::Map<String, Value> {
    fn schema() -> Schema {
        Schema::object()
    }
}

impl Schematic for Value {
    fn schema() -> Schema {
        Schema::any()
    }
}
