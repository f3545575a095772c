extern crate proc_macro;
extern crate proc_macro2;

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use std::path::PathBuf;
use syn::parse::{Parse, ParseStream, Result};
use syn::parse_macro_input;
use syn::{LitInt, LitStr, Token};

mod parsers;

/// Expands to a `&'static [RegOp]` slice built from a register table file
/// under the calling crate's `tables/` directory.
///
/// Each non-blank line of the file is a register address and a value, both
/// written in hexadecimal with a `0x` prefix. A `#` starts a comment that
/// runs to the end of the line. The file is also pulled in with
/// `include_bytes!` so that editing it causes the calling crate to rebuild.
///
/// The expansion refers to `crate::registers::RegOp`, so this macro is only
/// usable from inside the `rkcam` crate itself.
#[proc_macro]
pub fn register_table(input: TokenStream) -> TokenStream {
    let call = parse_macro_input!(input as RegisterTable);
    let rel = call.path;
    let span = rel.span();

    let path = match table_path(&rel.value()) {
        Some(path) => path,
        None => {
            let err = syn::Error::new(span, "CARGO_MANIFEST_DIR is not set");
            return err.into_compile_error().into();
        }
    };

    let src = match std::fs::read_to_string(&path) {
        Ok(src) => src,
        Err(err) => {
            let err = syn::Error::new(
                span,
                format!("failed to read register table {}: {}", path.display(), err),
            );
            return err.into_compile_error().into();
        }
    };

    let entries = match parsers::parse_table(&src) {
        Ok(entries) => entries,
        Err(err) => {
            let err = syn::Error::new(
                span,
                format!("{}:{}: {}", rel.value(), err.line, err.message),
            );
            return err.into_compile_error().into();
        }
    };

    let ops = entries.iter().map(|entry| {
        let reg = hex_literal(entry.reg as u32, 4, span);
        let val = hex_literal(entry.val as u32, 2, span);
        quote!(crate::registers::RegOp { reg: #reg, val: #val })
    });
    let track = path.to_string_lossy().into_owned();

    quote!({
        const _: &[u8] = include_bytes!(#track);
        &[#(#ops),*]
    })
    .into()
}

fn table_path(rel: &str) -> Option<PathBuf> {
    let base = std::env::var_os("CARGO_MANIFEST_DIR")?;
    let mut path = PathBuf::from(base);
    path.push("tables");
    path.push(rel);
    Some(path)
}

fn hex_literal(v: u32, digits: usize, span: Span) -> LitInt {
    LitInt::new(&format!("{:#0width$x}", v, width = digits + 2), span)
}

struct RegisterTable {
    path: LitStr,
}

impl Parse for RegisterTable {
    fn parse(input: ParseStream) -> Result<Self> {
        let path: LitStr = input.parse()?;
        // Tolerate a trailing comma, as with the standard include macros.
        let _ = input.parse::<Option<Token![,]>>()?;
        Ok(RegisterTable { path: path })
    }
}
