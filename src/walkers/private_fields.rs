//! Private-field inventory.
//!
//! Safe-delete and move decisions may only rewrite fields nobody outside
//! the type can name: default-private fields and explicit `pub(self)`
//! fields. Any broader visibility is out of scope.

use crate::walkers::{is_private, render_type};
use std::collections::BTreeMap;
use syn::Item;

/// Collect `name -> declared type` for every private field of `type_name`.
pub fn collect_private_fields(file: &syn::File, type_name: &str) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();

    for item in &file.items {
        let Item::Struct(item_struct) = item else {
            continue;
        };
        if item_struct.ident != type_name {
            continue;
        }
        for field in &item_struct.fields {
            let (Some(ident), true) = (&field.ident, is_private(&field.vis)) else {
                continue;
            };
            fields.insert(ident.to_string(), render_type(&field.ty));
        }
    }

    fields
}
