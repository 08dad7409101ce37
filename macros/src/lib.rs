/*
 * Copyright 2025 ferrite contributors
 *
 * This file is part of ferrite.
 *
 * ferrite is free software: you can redistribute it and/or modify it under the
 * terms of the GNU General Public License as published by the Free Software
 * Foundation, either version 3 of the License, or (at your option) any later
 * version.
 *
 * ferrite is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR
 * A PARTICULAR PURPOSE. See the GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License along with
 * ferrite. If not, see <https://www.gnu.org/licenses/>.
 */

//! This crate implements derive macros for the ferrite kernel.

#![deny(warnings)]

extern crate proc_macro;

mod util;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Derives the `AnyRepr` marker, allowing a structure to be reinterpreted
/// from raw bytes.
///
/// The structure must be `repr(C)` so that its layout is stable.
#[proc_macro_derive(AnyRepr)]
pub fn derive_any_repr(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);
	if !util::has_repr_c(&input.attrs) {
		return syn::Error::new_spanned(&input.ident, "the structure must be `repr(C)`")
			.to_compile_error()
			.into();
	}
	let ident = input.ident;
	let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
	let out = quote! {
		unsafe impl #impl_generics utils::bytes::AnyRepr for #ident #ty_generics #where_clause {}
	};
	out.into()
}
