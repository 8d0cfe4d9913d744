use crate::attributes::{ControllerAttributes, RouteAttributes};
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::spanned::Spanned;
use syn::{Attribute, Error, Ident, ImplItem, Item, ItemImpl, LitStr, Result};

const METHODS: [&str; 5] = ["get", "post", "put", "delete", "patch"];

struct Route {
    method: String,
    span: Span,
    handler: Ident,
    path: LitStr,
    attributes: RouteAttributes,
}

impl Route {
    fn router_call(&self) -> TokenStream {
        let method = Ident::new(&self.method, self.span);
        let handler = &self.handler;
        let path = &self.path;

        quote! {
            .route(#path, ::user_guide::axum::routing::#method(Self::#handler))
        }
    }

    fn metadata(&self, tags: &TokenStream) -> TokenStream {
        let method = Ident::new(&self.method.to_uppercase(), self.span);
        let path = &self.path;
        let operation_id = LitStr::new(&self.handler.to_string(), self.handler.span());

        let summary = match &self.attributes.summary {
            Some(summary) => quote!(Some(#summary)),
            None => quote!(None),
        };

        let params = match &self.attributes.params {
            Some(params) => {
                let params = params.elems.iter();
                quote!(vec![#(#params),*])
            }
            None => quote!(Vec::new()),
        };

        let request_body = match &self.attributes.body {
            Some(body) => {
                quote!(Some(<#body as ::user_guide::openapi::BodySchema>::schema_entry))
            }
            None => quote!(None),
        };

        quote! {
            ::user_guide::controller::RouteMetadata {
                method: ::user_guide::axum::http::Method::#method,
                path: #path,
                operation_id: #operation_id,
                summary: #summary,
                tags: #tags,
                params: #params,
                request_body: #request_body,
            }
        }
    }
}

fn route_method(attr: &Attribute) -> Option<String> {
    attr.path()
        .get_ident()
        .map(ToString::to_string)
        .filter(|name| METHODS.contains(&name.as_str()))
}

fn full_path(prefix: Option<&LitStr>, path: &LitStr) -> LitStr {
    match prefix {
        Some(prefix) => LitStr::new(
            &format!("{}{}", prefix.value().trim_end_matches('/'), path.value()),
            path.span(),
        ),
        None => path.clone(),
    }
}

// strips route attributes from handlers, since they are not real attributes
fn extract_routes(item: &mut ItemImpl, prefix: Option<&LitStr>) -> Result<Vec<Route>> {
    let mut routes = vec![];
    for impl_item in &mut item.items {
        let ImplItem::Fn(function) = impl_item else {
            continue;
        };

        let mut route_attrs = vec![];
        let mut other_attrs = vec![];
        for attr in function.attrs.drain(..) {
            match route_method(&attr) {
                Some(method) => route_attrs.push((method, attr)),
                None => other_attrs.push(attr),
            }
        }
        function.attrs = other_attrs;

        if route_attrs.is_empty() {
            continue;
        }

        if let Some(receiver) = function.sig.receiver() {
            return Err(Error::new(
                receiver.span(),
                "Route handlers cannot take self - use associated functions instead!",
            ));
        }

        for (method, attr) in route_attrs {
            let attributes = attr.parse_args::<RouteAttributes>()?;
            routes.push(Route {
                method,
                span: attr.span(),
                handler: function.sig.ident.clone(),
                path: full_path(prefix, &attributes.path),
                attributes,
            });
        }
    }

    Ok(routes)
}

pub fn generate_controller(item: Item, args: &ControllerAttributes) -> Result<TokenStream> {
    let mut item_impl = match item {
        Item::Impl(item_impl) => item_impl,
        item => {
            return Err(Error::new(
                item.span(),
                "Only impl blocks can be marked as a controller!",
            ))
        }
    };

    let routes = extract_routes(&mut item_impl, args.path.as_ref())?;
    let ty = &item_impl.self_ty;

    let server_names = match &args.server_names {
        Some(server_names) => {
            let server_names = server_names.elems.iter();
            quote! {
                Some(
                    [#(#server_names),*]
                        .into_iter()
                        .map(|name: &str| name.to_string())
                        .collect(),
                )
            }
        }
        None => quote!(None),
    };

    let tags = match &args.tags {
        Some(tags) => {
            let tags = tags.elems.iter();
            quote!(&[#(#tags),*])
        }
        None => quote!(&[]),
    };

    let router_calls = routes.iter().map(Route::router_call);
    let metadata = routes.iter().map(|route| route.metadata(&tags));

    Ok(quote! {
        #item_impl

        #[automatically_derived]
        impl ::user_guide::controller::Controller for #ty {
            fn server_names(&self) -> Option<::user_guide::fxhash::FxHashSet<String>> {
                #server_names
            }

            fn routes(&self) -> Vec<::user_guide::controller::RouteMetadata> {
                vec![#(#metadata),*]
            }

            fn configure_router(&self, router: ::user_guide::axum::Router) -> ::user_guide::axum::Router {
                router
                    #(#router_calls)*
            }
        }

        const _: () = {
            fn create_controller() -> ::user_guide::controller::ControllerPtr {
                ::std::boxed::Box::new(<#ty as ::std::default::Default>::default())
            }

            ::user_guide::inventory::submit! {
                ::user_guide::controller::ControllerRegistration::new(create_controller)
            }
        };
    })
}
