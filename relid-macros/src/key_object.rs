use crate::utils::apply_derives;
use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Item, Result, Token, parse::Parse, parse::ParseStream, parse_macro_input};

/// #[key_object] 宏实现
/// - 支持结构体（具名或 tuple）与枚举
/// - 合并/追加派生：Default, Clone, (Debug 可控), Serialize, Deserialize,
///   PartialEq, Eq, Hash —— 键值对象的相等与哈希必须是分量值的纯函数
/// - 参数：
///   - `#[key_object(debug = true|false)]`，默认 true
///   - `#[key_object(ordered = true)]` 追加 PartialOrd/Ord，便于作为 BTreeMap 键
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as KeyObjectAttrConfig);
    let mut input = parse_macro_input!(item as Item);

    // 组装需要的 derive 集合（struct/enum 通用）
    let mut required: Vec<syn::Path> = vec![
        syn::parse_quote!(Default),
        syn::parse_quote!(Clone),
        syn::parse_quote!(serde::Serialize),
        syn::parse_quote!(serde::Deserialize),
        syn::parse_quote!(PartialEq),
        syn::parse_quote!(Eq),
        syn::parse_quote!(Hash),
    ];

    if cfg.derive_debug.unwrap_or(true) {
        required.insert(0, syn::parse_quote!(Debug));
    }

    if cfg.ordered.unwrap_or(false) {
        required.push(syn::parse_quote!(PartialOrd));
        required.push(syn::parse_quote!(Ord));
    }

    match &mut input {
        Item::Struct(st) => {
            apply_derives(&mut st.attrs, required);
            TokenStream::from(quote! { #st })
        }
        Item::Enum(en) => {
            apply_derives(&mut en.attrs, required);
            TokenStream::from(quote! { #en })
        }
        other => syn::Error::new(other.span(), "#[key_object] only supports struct or enum")
            .to_compile_error()
            .into(),
    }
}

// -------- parsing --------

struct KeyObjectAttrConfig {
    derive_debug: Option<bool>,
    ordered: Option<bool>,
}

impl Parse for KeyObjectAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut derive_debug: Option<bool> = None;
        let mut ordered: Option<bool> = None;

        if input.is_empty() {
            return Ok(Self {
                derive_debug,
                ordered,
            });
        }

        let pairs: Punctuated<KeyObjectAttrElem, Token![,]> = Punctuated::parse_terminated(input)?;

        for elem in pairs {
            match elem {
                KeyObjectAttrElem::Debug(b) => {
                    if derive_debug.is_some() {
                        return Err(syn::Error::new(
                            proc_macro2::Span::call_site(),
                            "duplicate key 'debug' in attribute",
                        ));
                    }
                    derive_debug = Some(b);
                }
                KeyObjectAttrElem::Ordered(b) => {
                    if ordered.is_some() {
                        return Err(syn::Error::new(
                            proc_macro2::Span::call_site(),
                            "duplicate key 'ordered' in attribute",
                        ));
                    }
                    ordered = Some(b);
                }
            }
        }
        Ok(Self {
            derive_debug,
            ordered,
        })
    }
}

enum KeyObjectAttrElem {
    Debug(bool),
    Ordered(bool),
}

impl Parse for KeyObjectAttrElem {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: syn::Ident = input.parse()?;
        let _eq: Token![=] = input.parse()?;
        let expr: syn::Expr = input.parse()?;
        let value = match expr {
            syn::Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Bool(b),
                ..
            }) => b.value(),
            other => {
                return Err(syn::Error::new(
                    other.span(),
                    "expected boolean literal for attribute value",
                ));
            }
        };
        if key == "debug" {
            Ok(Self::Debug(value))
        } else if key == "ordered" {
            Ok(Self::Ordered(value))
        } else {
            Err(syn::Error::new(
                key.span(),
                "unknown key in attribute; expected 'debug' or 'ordered'",
            ))
        }
    }
}
