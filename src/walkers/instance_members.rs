//! Instance-member name collection.
//!
//! The returned set is the reserved/meaningful-identifier inventory that
//! extraction and move-method reference rewriting consult: every name that
//! resolves to per-instance state on the target type. Associated `const`
//! and `static` items and receiver-less functions carry an explicit static
//! flavor and are excluded.

use crate::walkers::impl_target_name;
use std::collections::BTreeSet;
use syn::{FnArg, ImplItem, Item};

/// Collect names of instance fields and getter-style accessors declared on
/// `type_name`.
///
/// Accessors taking only `&self` are the closest analog of properties; a
/// method with further parameters is behavior, not state, and is left to
/// the method-usage walker.
pub fn collect_instance_member_names(file: &syn::File, type_name: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();

    for item in &file.items {
        match item {
            Item::Struct(item_struct) if item_struct.ident == type_name => {
                for field in &item_struct.fields {
                    if let Some(ident) = &field.ident {
                        names.insert(ident.to_string());
                    }
                }
            }
            Item::Impl(item_impl)
                if item_impl.trait_.is_none()
                    && impl_target_name(item_impl).as_deref() == Some(type_name) =>
            {
                for impl_item in &item_impl.items {
                    if let ImplItem::Fn(method) = impl_item {
                        if is_getter(&method.sig) {
                            names.insert(method.sig.ident.to_string());
                        }
                    }
                }
            }
            _ => {}
        }
    }

    names
}

fn is_getter(sig: &syn::Signature) -> bool {
    let mut inputs = sig.inputs.iter();
    matches!(inputs.next(), Some(FnArg::Receiver(_)))
        && inputs.next().is_none()
        && matches!(sig.output, syn::ReturnType::Type(_, _))
}
