//! Procedural macros for toolset definitions.
//!
//! `#[toolset]` turns an inherent `impl` block into an
//! `agent_tools::Toolset` implementation. Every `pub fn` taking `&self` whose
//! name does not start with `_` becomes a capability; its declared parameter
//! types, defaults, return type and doc comment are recorded verbatim and
//! resolved into a schema when the toolset is registered.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{ToTokens, quote};
use syn::ext::IdentExt;
use syn::{
    Attribute, Expr, ExprLit, FnArg, GenericParam, ImplItem, ImplItemFn, ItemImpl, Lit, LitStr,
    Meta, Pat, PathArguments, ReturnType, Type, Visibility, parse_macro_input,
};

/// Exposes the public `&self` methods of an inherent `impl` block as
/// capabilities.
///
/// ```ignore
/// #[toolset(name = "Echo")]
/// impl Echo {
///     /// Repeats text.
///     ///
///     /// # Arguments
///     ///
///     /// * `text` - Text to repeat.
///     /// * `times` - Number of repetitions.
///     pub fn repeat(&self, text: &str, #[arg(default = 1)] times: usize) -> String {
///         text.repeat(times)
///     }
/// }
/// ```
///
/// `#[toolset(crate = "my_facade::tools")]` points the generated code at a
/// re-export when `agent_tools` is not a direct dependency.
///
/// Attributes understood inside the block:
///
/// * `#[capability(skip)]` hides a public method.
/// * `#[capability(name = "...")]` renames the capability.
/// * `#[arg(default = <expr>)]` makes a parameter optional.
/// * `#[arg(kind = "...")]` replaces the declared type text used for schema
///   inference, e.g. `kind = "enum(celsius|fahrenheit)"`.
///
/// Methods returning `Result` or a generic `...Result<T>` alias are treated
/// as fallible and their `Err` becomes an execution failure.
#[proc_macro_attribute]
pub fn toolset(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut display_name: Option<LitStr> = None;
    let mut krate: Option<syn::Path> = None;
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("name") {
            display_name = Some(meta.value()?.parse()?);
            Ok(())
        } else if meta.path.is_ident("crate") {
            let path: LitStr = meta.value()?.parse()?;
            krate = Some(path.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported toolset attribute, expected `name` or `crate`"))
        }
    });
    parse_macro_input!(attr with parser);

    let krate = krate.unwrap_or_else(|| syn::parse_quote!(::agent_tools));
    let mut block = parse_macro_input!(item as ItemImpl);
    match expand(&krate, display_name, &mut block) {
        Ok(tokens) => tokens.into(),
        Err(err) => {
            let err = err.to_compile_error();
            quote!(#block #err).into()
        }
    }
}

fn expand(
    krate: &syn::Path,
    display_name: Option<LitStr>,
    block: &mut ItemImpl,
) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &block.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[toolset] must be placed on an inherent impl block",
        ));
    }
    if !block.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &block.generics,
            "#[toolset] does not support generic impl blocks",
        ));
    }

    let self_ty = block.self_ty.clone();
    let display_name = display_name.unwrap_or_else(|| {
        let text = self_ty.to_token_stream().to_string().replace(' ', "");
        LitStr::new(&text, Span::call_site())
    });

    let mut errors: Option<syn::Error> = None;
    let mut methods = Vec::new();
    for item in &mut block.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        match method_def(krate, method) {
            Ok(Some(tokens)) => methods.push(tokens),
            Ok(None) => {}
            Err(err) => match &mut errors {
                Some(existing) => existing.combine(err),
                None => errors = Some(err),
            },
        }
    }
    if let Some(err) = errors {
        return Err(err);
    }

    Ok(quote! {
        #block

        #[automatically_derived]
        impl #krate::Toolset for #self_ty {
            fn toolset_name(&self) -> &str {
                #display_name
            }

            fn methods() -> ::std::vec::Vec<#krate::MethodDef<Self>> {
                ::std::vec![#(#methods),*]
            }
        }
    })
}

#[derive(Default)]
struct CapabilityOptions {
    skip: bool,
    name: Option<LitStr>,
}

#[derive(Default)]
struct ArgOptions {
    default: Option<Expr>,
    kind: Option<LitStr>,
}

struct Param {
    ident: syn::Ident,
    name: String,
    type_text: String,
    decoded: Type,
    by_ref: bool,
    default: Option<Expr>,
}

/// Builds the `MethodDef` expression for one method, stripping the helper
/// attributes. Returns `None` for methods that are not exposed.
fn method_def(krate: &syn::Path, method: &mut ImplItemFn) -> syn::Result<Option<TokenStream2>> {
    let options = take_capability_options(&mut method.attrs)?;

    let mut params = Vec::new();
    let mut receiver = None;
    for input in &mut method.sig.inputs {
        match input {
            FnArg::Receiver(recv) => receiver = Some(recv.clone()),
            FnArg::Typed(typed) => {
                let arg = take_arg_options(&mut typed.attrs)?;
                params.push((typed.clone(), arg));
            }
        }
    }

    let ident = method.sig.ident.clone();
    let exposed = matches!(method.vis, Visibility::Public(_))
        && receiver.is_some()
        && !options.skip
        && !ident.unraw().to_string().starts_with('_');
    if !exposed {
        return Ok(None);
    }

    if let Some(recv) = &receiver {
        if recv.reference.is_none() || recv.mutability.is_some() {
            return Err(syn::Error::new_spanned(
                recv,
                "exposed toolset methods must take `&self`",
            ));
        }
    }
    if let Some(param) = method
        .sig
        .generics
        .params
        .iter()
        .find(|param| !matches!(param, GenericParam::Lifetime(_)))
    {
        return Err(syn::Error::new_spanned(
            param,
            "exposed toolset methods cannot have type or const parameters; add #[capability(skip)] to hide it",
        ));
    }

    let params = params
        .into_iter()
        .map(|(typed, arg)| param(&typed, arg))
        .collect::<syn::Result<Vec<_>>>()?;

    let capability = options
        .name
        .map_or_else(|| ident.unraw().to_string(), |name| name.value());
    let doc = doc_text(&method.attrs);
    let is_async = method.sig.asyncness.is_some();

    let raw_params = params.iter().map(|param| {
        let name = &param.name;
        let type_text = &param.type_text;
        let default = param.default.as_ref().map(|expr| {
            quote!(.with_default(#krate::__private::json!(#expr)))
        });
        quote!(.param(#krate::RawParam::new(#name, #type_text) #default))
    });

    let (returns, fallible) = match &method.sig.output {
        ReturnType::Default => (None, false),
        ReturnType::Type(_, ty) => {
            let text = ty.to_token_stream().to_string();
            (Some(quote!(.returns(#text))), is_result(ty))
        }
    };

    let signature = quote! {
        #krate::MethodSignature::new(#capability)
            .with_doc(#doc)
            #(#raw_params)*
            #returns
    };

    let bindings = params.iter().map(|param| {
        let ident = &param.ident;
        let name = &param.name;
        let decoded = &param.decoded;
        quote!(let #ident: #decoded = __args.take(#name)?;)
    });
    let call_args = params.iter().map(|param| {
        let ident = &param.ident;
        if param.by_ref {
            quote!(&#ident)
        } else {
            quote!(#ident)
        }
    });
    let convert = if fallible {
        quote!(#krate::__private::fallible)
    } else {
        quote!(#krate::__private::infallible)
    };
    let args_pat = if params.is_empty() {
        quote!(_)
    } else {
        quote!(mut __args)
    };

    let handler = if is_async {
        quote! {
            #krate::Handler::Async(|__this, #args_pat| -> #krate::ToolFuture {
                ::std::boxed::Box::pin(async move {
                    #(#bindings)*
                    #convert(__this.#ident(#(#call_args),*).await)
                })
            })
        }
    } else {
        quote! {
            #krate::Handler::Sync(|__this, #args_pat| {
                #(#bindings)*
                #convert(__this.#ident(#(#call_args),*))
            })
        }
    };

    Ok(Some(quote! {
        #krate::MethodDef::new(#signature, #handler)
    }))
}

fn param(typed: &syn::PatType, arg: ArgOptions) -> syn::Result<Param> {
    let Pat::Ident(pat) = typed.pat.as_ref() else {
        return Err(syn::Error::new_spanned(
            &typed.pat,
            "toolset parameters must be plain identifiers",
        ));
    };
    if pat.by_ref.is_some() || pat.subpat.is_some() {
        return Err(syn::Error::new_spanned(
            pat,
            "toolset parameters must be plain identifiers",
        ));
    }

    let ty = typed.ty.as_ref();
    let (decoded, by_ref) = match ty {
        Type::ImplTrait(_) => {
            return Err(syn::Error::new_spanned(
                ty,
                "`impl Trait` parameters cannot be decoded from arguments",
            ));
        }
        Type::Reference(reference) => {
            if reference.mutability.is_some() {
                return Err(syn::Error::new_spanned(
                    ty,
                    "`&mut` parameters cannot be decoded from arguments",
                ));
            }
            (owned(&reference.elem), true)
        }
        other => (other.clone(), false),
    };

    let type_text = arg
        .kind
        .map_or_else(|| ty.to_token_stream().to_string(), |kind| kind.value());

    Ok(Param {
        ident: syn::Ident::new(&format!("__arg_{}", pat.ident.unraw()), pat.ident.span()),
        name: pat.ident.unraw().to_string(),
        type_text,
        decoded,
        by_ref,
        default: arg.default,
    })
}

/// Owned type decoded for a borrowed parameter: `str` -> `String`,
/// `[T]` -> `Vec<T>`, anything else unchanged.
fn owned(elem: &Type) -> Type {
    match elem {
        Type::Path(path) if path.qself.is_none() && path.path.is_ident("str") => {
            syn::parse_quote!(::std::string::String)
        }
        Type::Slice(slice) => {
            let inner = &slice.elem;
            syn::parse_quote!(::std::vec::Vec<#inner>)
        }
        other => other.clone(),
    }
}

/// `Result`, or a generic alias such as `io::Result<T>` or `ToolResult<T>`.
/// Plain types like `SearchResult` are ordinary values.
fn is_result(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path.path.segments.last().is_some_and(|segment| {
            let ident = segment.ident.to_string();
            ident == "Result"
                || (ident.ends_with("Result")
                    && matches!(segment.arguments, PathArguments::AngleBracketed(_)))
        }),
        Type::Paren(inner) => is_result(&inner.elem),
        Type::Group(inner) => is_result(&inner.elem),
        _ => false,
    }
}

fn doc_text(attrs: &[Attribute]) -> String {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(pair) => match &pair.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(text),
                    ..
                }) => Some(text.value()),
                _ => None,
            },
            _ => None,
        })
        .flat_map(|text| {
            text.lines()
                .map(|line| line.strip_prefix(' ').unwrap_or(line).to_owned())
                .collect::<Vec<_>>()
        })
        .collect();
    lines.join("\n")
}

fn take_capability_options(attrs: &mut Vec<Attribute>) -> syn::Result<CapabilityOptions> {
    let mut options = CapabilityOptions::default();
    let mut kept = Vec::with_capacity(attrs.len());
    for attr in attrs.drain(..) {
        if !attr.path().is_ident("capability") {
            kept.push(attr);
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
                Ok(())
            } else if meta.path.is_ident("name") {
                options.name = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("expected `skip` or `name = \"...\"`"))
            }
        })?;
    }
    *attrs = kept;
    Ok(options)
}

fn take_arg_options(attrs: &mut Vec<Attribute>) -> syn::Result<ArgOptions> {
    let mut options = ArgOptions::default();
    let mut kept = Vec::with_capacity(attrs.len());
    for attr in attrs.drain(..) {
        if !attr.path().is_ident("arg") {
            kept.push(attr);
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                options.default = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("kind") {
                options.kind = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("expected `default = <expr>` or `kind = \"...\"`"))
            }
        })?;
    }
    *attrs = kept;
    Ok(options)
}
