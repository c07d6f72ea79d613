#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the Sprout workspace.
//!
//! * [`macro@sprout_error`] turns an enum into a context-aware error type.
//! * [`macro@sprout_slice`] turns a struct into a cheaply cloneable feature slice handle.
//! * [`macro@main`] boots an `async fn main` on a preset Tokio runtime (re-exported by
//!   `sprout-runtime`).
//!
//! The examples below are `ignore`d because a proc-macro crate cannot use its own macros
//! in doctests; see the consuming crates for working code.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Attribute macro to bootstrap a preset Tokio runtime.
///
/// Transforms an `async fn main` returning `Result` into a plain `fn main` that
/// builds the runtime described by the chosen profile and blocks on the body.
///
/// # Arguments
///
/// * `high_performance` - Server profile: larger stacks, longer thread keep-alive.
/// * `memory_efficient` - Half the worker threads, smaller stacks.
/// * `default` (or no argument) - Auto-detected worker threads, 3 `MiB` stacks.
///
/// # Examples
///
/// ```rust,ignore
/// #[sprout_runtime::main(high_performance)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Attribute macro for defining crate-level error enums.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * `<Name>Ext` trait adding `.context(...)` to `Result<T, Name>` and to
///   `Result<T, Source>` for every variant that wraps a source error.
/// * `From<Source>` for every variant with a `source` field (or `#[source]`/`#[from]`).
/// * `From<&'static str>` and `From<String>` when an `Internal { message, context }`
///   variant exists.
/// * A module-private `format_context` helper for use inside `#[error(...)]` strings.
///
/// # Requirements
///
/// * Only enums with named-field variants are accepted.
/// * A `context` field must be `Option<Cow<'static, str>>`.
/// * A variant with a source must also carry a `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[sprout_derive::sprout_error]
/// pub enum StoreError {
///     #[error("I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal store error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &str) -> Result<Vec<u8>, StoreError> {
///     std::fs::read(path).context(format!("Reading {path}"))
/// }
/// ```
#[proc_macro_attribute]
pub fn sprout_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Attribute macro to define a feature slice handle.
///
/// Given `struct Foo { .. }`, emits `FooInner` with the original fields, a `Foo`
/// wrapper around `Arc<FooInner>` with `Foo::new(inner)`, `Deref` to the inner
/// state, and an implementation of `sprout_kernel::domain::slice::FeatureSlice`.
///
/// # Example
///
/// ```rust,ignore
/// #[sprout_derive::sprout_slice]
/// pub struct Newsletter {
///     pub sender: String,
/// }
///
/// let slice = Newsletter::new(NewsletterInner { sender: "hi@sprout.edu".to_owned() });
/// ```
#[proc_macro_attribute]
pub fn sprout_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
