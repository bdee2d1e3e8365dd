use proc_macro::TokenStream;
use quote::{quote, quote_spanned};
use syn::spanned::Spanned;

/// Runs an async test inside a harness `TestSession`.
///
/// `#[harness_test]` uses the default configuration; `#[harness_test(configure)]` passes
/// it through `fn configure(&mut HarnessConfiguration)` first. The body runs in the
/// session's scope, so it can register teardowns. Teardowns and interceptor
/// cleanup run even when the test body panics; the panic is resumed afterwards.
#[proc_macro_attribute]
pub fn harness_test(attrs: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as syn::ItemFn);
    let args = syn::parse_macro_input!(attrs as syn::AttributeArgs);

    if args.len() > 1 {
        return quote! {
            compile_error!("Only a configuration function may be passed to the macro");
        }
        .into();
    }

    let configure = match args.first() {
        None => None,
        Some(syn::NestedMeta::Meta(syn::Meta::Path(function_path))) => Some(function_path),
        Some(other) => {
            return quote_spanned! {other.span()=>
                compile_error!("The argument should be a configuration function!");
            }
            .into();
        }
    };

    if let Err(stream) = validate_signature(&input.sig) {
        return stream.into();
    }

    let attributes = &input.attrs;
    let visibility = &input.vis;
    let name = &input.sig.ident;
    let return_type = &input.sig.output;
    let block = &input.block;
    let value_type = match return_type {
        syn::ReturnType::Default => quote! { () },
        syn::ReturnType::Type(_, ty) => quote! { #ty },
    };

    let configuration = configure.map(|function_path| {
        quote! { #function_path(&mut __harness_configuration); }
    });

    let output = quote! {
        #[::tokio::test]
        #(#attributes)*
        #visibility async fn #name() #return_type {
            #[allow(unused_mut)]
            let mut __harness_configuration = ::crud_harness::HarnessConfiguration::new();
            #configuration

            let __harness_session = match ::crud_harness::TestSession::before_test(__harness_configuration).await {
                Ok(session) => session,
                Err(e) => panic!("Harness Error: {}", e),
            };

            let __harness_result = ::crud_harness::__private::FutureExt::catch_unwind(
                ::crud_harness::__private::AssertUnwindSafe(__harness_session.scope(
                    ::crud_harness::__private::with_output::<#value_type, _>(async move #block),
                )),
            )
            .await;

            let __harness_cleanup = __harness_session.after_test().await;

            let __harness_value = match __harness_result {
                Ok(value) => value,
                Err(panic) => ::crud_harness::__private::resume_unwind(panic),
            };
            if let Err(e) = __harness_cleanup {
                panic!("Harness Error: {}", e);
            }

            __harness_value
        }
    };

    TokenStream::from(output)
}

fn validate_signature(signature: &syn::Signature) -> Result<(), proc_macro2::TokenStream> {
    if signature.asyncness.is_none() {
        return Err(quote_spanned! {signature.fn_token.span()=>
            compile_error!("The test function should be async!");
        });
    }

    if !signature.inputs.is_empty() {
        return Err(quote_spanned! {signature.inputs.span()=>
            compile_error!("The test function should not take arguments!");
        });
    }

    Ok(())
}
