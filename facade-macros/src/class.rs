//! The `#[class]` attribute macro.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Attribute, Expr, ExprLit, FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, Lit, LitStr, Meta,
    Pat, Token, Type,
    ext::IdentExt,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

/// Arguments for the `#[class]` macro.
struct ClassArgs {
    name: Option<String>,
}

impl Parse for ClassArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut name = None;

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "name" => {
                    let lit: LitStr = input.parse()?;
                    name = Some(lit.value());
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(ClassArgs { name })
    }
}

/// `old = "new"` pairs from `#[legacy_names(...)]`.
struct LegacyNamesArgs {
    rules: Vec<(String, String)>,
}

impl Parse for LegacyNamesArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut rules = Vec::new();

        while !input.is_empty() {
            let old = Ident::parse_any(input)?;
            input.parse::<Token![=]>()?;
            let new: LitStr = input.parse()?;
            rules.push((old.unraw().to_string(), new.value()));

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(LegacyNamesArgs { rules })
    }
}

/// How a Rust parameter maps onto the dynamic signature.
enum ParamKind {
    Required,
    Default(Option<Expr>),
    VarArgs,
    VarKw,
}

impl Parse for ParamKind {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let ident: Ident = input.parse()?;
        let kind = match ident.to_string().as_str() {
            "default" => {
                if input.peek(Token![=]) {
                    input.parse::<Token![=]>()?;
                    ParamKind::Default(Some(input.parse()?))
                } else {
                    ParamKind::Default(None)
                }
            }
            "varargs" => ParamKind::VarArgs,
            "varkw" => ParamKind::VarKw,
            other => {
                return Err(syn::Error::new(
                    ident.span(),
                    format!("unknown attribute: {}", other),
                ));
            }
        };
        if !input.is_empty() {
            return Err(input.error("expected a single `default`, `varargs` or `varkw`"));
        }
        Ok(kind)
    }
}

struct CapturedParam {
    ident: Ident,
    ty: Type,
    kind: ParamKind,
}

struct CapturedMethod {
    ident: Ident,
    params: Vec<CapturedParam>,
    legacy_names: Vec<(String, String)>,
    doc: Option<String>,
}

/// Implementation of the `#[class]` macro.
pub fn class_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ClassArgs);
    let mut input = parse_macro_input!(item as ItemImpl);

    match expand(args, &mut input) {
        Ok(generated) => TokenStream::from(quote! {
            #input
            #generated
        }),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(args: ClassArgs, input: &mut ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[class] must be placed on an inherent impl block",
        ));
    }

    let self_ty = (*input.self_ty).clone();
    let class_name = match args.name {
        Some(name) => name,
        None => type_name(&self_ty)?,
    };

    let mut methods = Vec::new();
    for item in &mut input.items {
        if let ImplItem::Fn(method) = item {
            if let Some(captured) = capture_method(method)? {
                methods.push(captured);
            }
        }
    }

    let registrations = methods.iter().map(|method| method.registration(&self_ty));
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::facade::ProxyClass for #self_ty #where_clause {
            fn class_builder() -> ::core::result::Result<::facade::ClassBuilder, ::facade::ClassError> {
                let __builder = ::facade::Class::builder(#class_name);
                #(let __builder = #registrations;)*
                ::core::result::Result::Ok(__builder)
            }
        }
    })
}

fn type_name(ty: &Type) -> syn::Result<String> {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.unraw().to_string())
            .ok_or_else(|| syn::Error::new_spanned(ty, "expected a type path")),
        _ => Err(syn::Error::new_spanned(
            ty,
            "cannot derive a class name for this type; use #[class(name = \"...\")]",
        )),
    }
}

/// Capture a `&self` method, stripping the helper attributes it carries.
///
/// Associated functions without a receiver are not exposed.
fn capture_method(method: &mut ImplItemFn) -> syn::Result<Option<CapturedMethod>> {
    let Some(receiver) = method.sig.receiver() else {
        return Ok(None);
    };
    if receiver.reference.is_none() || receiver.mutability.is_some() {
        return Err(syn::Error::new_spanned(
            receiver,
            "exposed methods must take `&self`",
        ));
    }
    if let Some(asyncness) = &method.sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "exposed methods cannot be async",
        ));
    }
    if !method.sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &method.sig.generics,
            "exposed methods cannot be generic",
        ));
    }

    let legacy_names = take_legacy_names(&mut method.attrs)?;
    let doc = collect_doc(&method.attrs);

    let mut params = Vec::new();
    let mut seen_varargs = false;
    let mut seen_varkw = false;
    for input in method.sig.inputs.iter_mut() {
        let FnArg::Typed(pat_type) = input else {
            continue;
        };

        let ident = match &*pat_type.pat {
            Pat::Ident(pat) => pat.ident.clone(),
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "exposed method parameters must be plain identifiers",
                ));
            }
        };
        if let Type::Reference(reference) = &*pat_type.ty {
            return Err(syn::Error::new_spanned(
                reference,
                "exposed method parameters must be owned types",
            ));
        }

        let kind = take_param_kind(&mut pat_type.attrs)?;
        match kind {
            ParamKind::VarArgs if seen_varargs => {
                return Err(syn::Error::new_spanned(&ident, "duplicate `varargs` parameter"));
            }
            ParamKind::VarKw if seen_varkw => {
                return Err(syn::Error::new_spanned(&ident, "duplicate `varkw` parameter"));
            }
            ParamKind::VarArgs => seen_varargs = true,
            ParamKind::VarKw => seen_varkw = true,
            _ => {}
        }

        params.push(CapturedParam {
            ident,
            ty: (*pat_type.ty).clone(),
            kind,
        });
    }

    Ok(Some(CapturedMethod {
        ident: method.sig.ident.clone(),
        params,
        legacy_names,
        doc,
    }))
}

fn take_legacy_names(attrs: &mut Vec<Attribute>) -> syn::Result<Vec<(String, String)>> {
    let mut rules = Vec::new();
    let mut result = Ok(());
    attrs.retain(|attr| {
        if !attr.path().is_ident("legacy_names") {
            return true;
        }
        match attr.parse_args::<LegacyNamesArgs>() {
            Ok(args) => rules.extend(args.rules),
            Err(err) => result = Err(err),
        }
        false
    });
    result.map(|()| rules)
}

fn take_param_kind(attrs: &mut Vec<Attribute>) -> syn::Result<ParamKind> {
    let mut kind = ParamKind::Required;
    let mut result = Ok(());
    attrs.retain(|attr| {
        if !attr.path().is_ident("arg") {
            return true;
        }
        match attr.parse_args::<ParamKind>() {
            Ok(parsed) if matches!(kind, ParamKind::Required) => kind = parsed,
            Ok(_) => {
                result = Err(syn::Error::new_spanned(
                    attr,
                    "a parameter takes at most one #[arg(...)]",
                ))
            }
            Err(err) => result = Err(err),
        }
        false
    });
    result.map(|()| kind)
}

fn collect_doc(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) => Some(s.value()),
                _ => None,
            },
            _ => None,
        })
        .map(|line| line.strip_prefix(' ').unwrap_or(&line).to_owned())
        .collect();

    let doc = lines.join("\n").trim().to_owned();
    if doc.is_empty() { None } else { Some(doc) }
}

impl CapturedMethod {
    fn registration(&self, self_ty: &Type) -> TokenStream2 {
        let ident = &self.ident;
        let name = ident.unraw().to_string();

        let signature_calls = self.params.iter().map(|param| {
            let pname = param.ident.unraw().to_string();
            match &param.kind {
                ParamKind::Required => quote! { .param(#pname) },
                ParamKind::Default(None) => quote! { .param_default(#pname, ::facade::Value::None) },
                ParamKind::Default(Some(expr)) => quote! { .param_default(#pname, #expr) },
                ParamKind::VarArgs => quote! { .varargs(#pname) },
                ParamKind::VarKw => quote! { .varkw(#pname) },
            }
        });

        let extractions = self.params.iter().map(|param| {
            let local = &param.ident;
            let ty = &param.ty;
            let pname = local.unraw().to_string();
            match &param.kind {
                ParamKind::Required | ParamKind::Default(_) => quote! {
                    let #local: #ty = __bound.extract::<#ty>(#pname)?;
                },
                ParamKind::VarArgs => quote! {
                    let #local: #ty = <#ty as ::facade::FromValue>::from_value(
                        ::facade::Value::List(__bound.varargs().to_vec()),
                    )?;
                },
                ParamKind::VarKw => quote! {
                    let #local: #ty = <#ty as ::facade::FromValue>::from_value(
                        ::facade::Value::Map(__bound.varkw().clone()),
                    )?;
                },
            }
        });
        let locals = self.params.iter().map(|param| &param.ident);

        let legacy = if self.legacy_names.is_empty() {
            quote! {}
        } else {
            let rules = self
                .legacy_names
                .iter()
                .map(|(old, new)| quote! { .rule(#old, #new) });
            quote! { .with_legacy_names(::facade::LegacyNames::new() #(#rules)*) }
        };
        let doc = self.doc.as_ref().map(|doc| quote! { .with_doc(#doc) });

        quote! {
            __builder.method(#name, {
                let __signature = ::facade::MethodSignature::builder(#name)
                    #(#signature_calls)*
                    .build()?;
                ::facade::Method::from_body(
                    __signature,
                    |__instance: &::facade::Instance, __bound: &::facade::BoundArguments|
                        -> ::core::result::Result<::facade::Value, ::facade::BoxError>
                    {
                        let __this = __instance.require_payload::<#self_ty>()?;
                        #(#extractions)*
                        ::facade::IntoReturn::into_return(__this.#ident(#(#locals),*))
                    },
                )
                #legacy
                #doc
            })
        }
    }
}
