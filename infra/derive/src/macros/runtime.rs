use proc_macro2::TokenStream;
use quote::quote;
use syn::{Error, Ident, ItemFn, ReturnType, Type};

/// Expands `#[sprout_runtime::main(profile)]`.
#[must_use]
pub fn expand_main(args: TokenStream, input: ItemFn) -> TokenStream {
    if let Err(err) = check_signature(&input) {
        return err.to_compile_error();
    }

    let profile = match runtime_profile(args) {
        Ok(profile) => profile,
        Err(err) => return err.to_compile_error(),
    };

    let ItemFn { attrs, vis, sig, block } = input;
    let name = &sig.ident;
    let output = &sig.output;

    quote! {
        #(#attrs)*
        #vis fn #name() #output {
            let config = #profile;
            let runtime = ::sprout_runtime::build_runtime_with_config(&config)?;
            runtime.block_on(async #block)
        }
    }
}

fn check_signature(input: &ItemFn) -> syn::Result<()> {
    if input.sig.asyncness.is_none() {
        return Err(Error::new_spanned(
            &input.sig.ident,
            "#[sprout_runtime::main] can only be applied to async functions",
        ));
    }
    if !returns_result(&input.sig.output) {
        return Err(Error::new_spanned(
            &input.sig.output,
            "#[sprout_runtime::main] requires a Result return type",
        ));
    }
    Ok(())
}

fn runtime_profile(args: TokenStream) -> syn::Result<TokenStream> {
    if args.is_empty() {
        return Ok(quote! { ::sprout_runtime::RuntimeConfig::default() });
    }

    let profile: Ident = syn::parse2(args)?;
    match profile.to_string().as_str() {
        "default" => Ok(quote! { ::sprout_runtime::RuntimeConfig::default() }),
        "high_performance" => Ok(quote! { ::sprout_runtime::RuntimeConfig::high_performance() }),
        "memory_efficient" => Ok(quote! { ::sprout_runtime::RuntimeConfig::memory_efficient() }),
        _ => Err(Error::new_spanned(
            profile,
            "unknown runtime profile; expected high_performance, memory_efficient or default",
        )),
    }
}

fn returns_result(output: &ReturnType) -> bool {
    let ReturnType::Type(_, ty) = output else {
        return false;
    };
    let Type::Path(path) = &**ty else {
        return false;
    };
    path.path.segments.last().is_some_and(|segment| segment.ident == "Result")
}
