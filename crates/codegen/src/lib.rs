//! Derive macro for gai tool schemas
//!
//! Generates a `gai_core::Schematic` implementation that describes the type
//! as a portable schema, for example
//!
//! ```rust,ignore
//! #[derive(gai_core::Schematic)]
//! struct Person {
//!     /// The name of the person
//!     name: String,
//!     #[schema(minimum = 0, maximum = 150)]
//!     age: u8,
//!     #[serde(skip_serializing_if = "Option::is_none")]
//!     nickname: Option<String>,
//! }
//! ```
//!
//! generates
//!
//! ```rust,ignore
//! impl gai_core::Schematic for Person {
//!     fn schema() -> gai_core::Schema {
//!         let mut schema = gai_core::Schema::object();
//!         schema.push_property("name", /* string, described */, true);
//!         schema.push_property("age", /* integer, 0..=150 */, true);
//!         schema.push_property("nickname", /* string */, false);
//!         schema
//!     }
//! }
//! ```
//!
//! Field attributes under `#[schema(...)]`: `rename`, `omit_empty`, `skip`,
//! `description`, `title`, `format`, `pattern`, `minimum`, `maximum`,
//! `min_length`, `max_length`, `min_items`, `max_items`, `enum_values`,
//! `default` and `example`. The serde keys `rename`, `rename_all`,
//! `skip_serializing_if`, `skip`, `untagged` and `tag` are honored as well.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attr;
mod schema;

/// Derive `gai_core::Schematic`.
#[proc_macro_derive(Schematic, attributes(schema, serde))]
pub fn schematic(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    schema::expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
