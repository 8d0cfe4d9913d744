use proc_macro2::Span;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Error, ExprArray, Ident, LitStr, Result, Token, Type};

/// Single `key = value` argument of the controller or route attributes.
enum Arg {
    Path(LitStr),
    ServerNames(ExprArray),
    Tags(ExprArray),
    Summary(LitStr),
    Params(ExprArray),
    Body(Type),
}

impl Arg {
    fn key(&self) -> &'static str {
        match self {
            Arg::Path(_) => "path",
            Arg::ServerNames(_) => "server_names",
            Arg::Tags(_) => "tags",
            Arg::Summary(_) => "summary",
            Arg::Params(_) => "params",
            Arg::Body(_) => "body",
        }
    }
}

impl Parse for Arg {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: Ident = input.parse()?;
        input.parse::<Token![=]>()?;

        match key.to_string().as_str() {
            "path" => input.parse().map(Arg::Path),
            "server_names" => input.parse().map(Arg::ServerNames),
            "tags" => input.parse().map(Arg::Tags),
            "summary" => input.parse().map(Arg::Summary),
            "params" => input.parse().map(Arg::Params),
            "body" => input.parse().map(Arg::Body),
            other => Err(Error::new(key.span(), format!("Unknown argument: {other}"))),
        }
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, key: &str, span: Span) -> Result<()> {
    if slot.replace(value).is_some() {
        return Err(Error::new(span, format!("Argument {key} is already defined!")));
    }

    Ok(())
}

fn parse_args(input: ParseStream) -> Result<Vec<(Span, Arg)>> {
    let args = Punctuated::<(Span, Arg), Token![,]>::parse_terminated_with(input, |input| {
        let span = input.span();
        input.parse::<Arg>().map(|arg| (span, arg))
    })?;
    Ok(args.into_iter().collect())
}

#[derive(Default)]
pub struct ControllerAttributes {
    pub path: Option<LitStr>,
    pub server_names: Option<ExprArray>,
    pub tags: Option<ExprArray>,
}

impl Parse for ControllerAttributes {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut result = Self::default();
        for (span, arg) in parse_args(input)? {
            let key = arg.key();
            match arg {
                Arg::Path(path) => set_once(&mut result.path, path, key, span)?,
                Arg::ServerNames(names) => set_once(&mut result.server_names, names, key, span)?,
                Arg::Tags(tags) => set_once(&mut result.tags, tags, key, span)?,
                _ => return Err(Error::new(span, format!("{key} is not a controller argument"))),
            }
        }

        Ok(result)
    }
}

/// Arguments of a route attribute, e.g. `#[get("/items/:item_id", summary = "...")]`.
pub struct RouteAttributes {
    pub path: LitStr,
    pub summary: Option<LitStr>,
    pub params: Option<ExprArray>,
    pub body: Option<Type>,
}

impl Parse for RouteAttributes {
    fn parse(input: ParseStream) -> Result<Self> {
        let path = input.parse()?;
        if !input.is_empty() {
            input.parse::<Token![,]>()?;
        }

        let mut result = Self {
            path,
            summary: None,
            params: None,
            body: None,
        };

        for (span, arg) in parse_args(input)? {
            let key = arg.key();
            match arg {
                Arg::Summary(summary) => set_once(&mut result.summary, summary, key, span)?,
                Arg::Params(params) => set_once(&mut result.params, params, key, span)?,
                Arg::Body(body) => set_once(&mut result.body, body, key, span)?,
                _ => return Err(Error::new(span, format!("{key} is not a route argument"))),
            }
        }

        Ok(result)
    }
}
