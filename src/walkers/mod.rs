//! Stateless member walkers serving move/static/delete-style refactorings:
//! instance-member inventories, per-method usage facts, private-field
//! collection, unused-member detection, and deterministic name generation.

pub mod instance_members;
pub mod member_usage;
pub mod naming;
pub mod private_fields;
pub mod unused;

pub use instance_members::collect_instance_member_names;
pub use member_usage::{analyze_member, MemberUsageFacts};
pub use naming::generate_access_member_name;
pub use private_fields::collect_private_fields;
pub use unused::{
    detect_unused_members, find_unused_members, find_unused_members_syntactic, MemberKind,
    UnusedMember, UnusedMemberStrategy,
};

use syn::{ItemImpl, Type, Visibility};

/// Name of the type an impl block targets, for path-typed self types.
pub(crate) fn impl_target_name(item: &ItemImpl) -> Option<String> {
    match &*item.self_ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|seg| seg.ident.to_string()),
        _ => None,
    }
}

/// `pub` without restriction. `pub(crate)`, `pub(self)`, and inherited
/// visibility all count as non-public for eligibility decisions.
pub(crate) fn is_public(vis: &Visibility) -> bool {
    matches!(vis, Visibility::Public(_))
}

/// Private in the strict sense: inherited visibility or `pub(self)`.
pub(crate) fn is_private(vis: &Visibility) -> bool {
    match vis {
        Visibility::Inherited => true,
        Visibility::Restricted(restricted) => restricted.path.is_ident("self"),
        Visibility::Public(_) => false,
    }
}

/// Render a type back to compact source text.
pub(crate) fn render_type(ty: &Type) -> String {
    let tokens = quote::quote!(#ty).to_string();
    tokens
        .replace(" :: ", "::")
        .replace("< ", "<")
        .replace(" <", "<")
        .replace(" >", ">")
        .replace(" ,", ",")
        .replace("& ", "&")
}
