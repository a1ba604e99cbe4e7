//! Attribute parsing for `#[schema(...)]` and the `#[serde(...)]` keys that
//! change the wire shape of a type.

use heck::{
    ToKebabCase, ToLowerCamelCase, ToShoutyKebabCase, ToShoutySnakeCase, ToSnakeCase,
    ToUpperCamelCase,
};
use syn::{
    Attribute, Error, Expr, ExprArray, Lit, LitStr, Meta, Result, Token, meta::ParseNestedMeta,
    token,
};

/// Serde `rename_all` rules.
#[derive(Clone, Copy)]
pub enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn parse(lit: &LitStr) -> Result<Self> {
        Ok(match lit.value().as_str() {
            "lowercase" => Self::Lower,
            "UPPERCASE" => Self::Upper,
            "PascalCase" => Self::Pascal,
            "camelCase" => Self::Camel,
            "snake_case" => Self::Snake,
            "SCREAMING_SNAKE_CASE" => Self::ScreamingSnake,
            "kebab-case" => Self::Kebab,
            "SCREAMING-KEBAB-CASE" => Self::ScreamingKebab,
            other => {
                return Err(Error::new_spanned(
                    lit,
                    format!("unknown rename rule `{other}`"),
                ));
            }
        })
    }

    /// Apply the rule to a field or variant identifier.
    pub fn apply(self, name: &str) -> String {
        match self {
            Self::Lower => name.to_lowercase(),
            Self::Upper => name.to_uppercase(),
            Self::Pascal => name.to_upper_camel_case(),
            Self::Camel => name.to_lower_camel_case(),
            Self::Snake => name.to_snake_case(),
            Self::ScreamingSnake => name.to_shouty_snake_case(),
            Self::Kebab => name.to_kebab_case(),
            Self::ScreamingKebab => name.to_shouty_kebab_case(),
        }
    }
}

/// Attributes on the struct or enum itself.
#[derive(Default)]
pub struct Container {
    pub title: Option<String>,
    pub description: Option<String>,
    pub rename_all: Option<RenameRule>,
    pub untagged: bool,
    pub tag: Option<String>,
    pub content: Option<String>,
}

impl Container {
    pub fn from_attrs(attrs: &[Attribute]) -> Result<Self> {
        let mut container = Self {
            description: doc(attrs),
            ..Default::default()
        };

        for attr in attrs {
            if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename_all") {
                        if let Some(lit) = renamed(&meta)? {
                            container.rename_all = Some(RenameRule::parse(&lit)?);
                        }
                    } else if meta.path.is_ident("untagged") {
                        container.untagged = true;
                    } else if meta.path.is_ident("tag") {
                        container.tag = Some(meta.value()?.parse::<LitStr>()?.value());
                    } else if meta.path.is_ident("content") {
                        container.content = Some(meta.value()?.parse::<LitStr>()?.value());
                    } else {
                        skip(&meta)?;
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident("schema") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("title") {
                        container.title = Some(string(&meta)?);
                    } else if meta.path.is_ident("description") {
                        container.description = Some(string(&meta)?);
                    } else if meta.path.is_ident("rename_all") {
                        let lit = meta.value()?.parse::<LitStr>()?;
                        container.rename_all = Some(RenameRule::parse(&lit)?);
                    } else if meta.path.is_ident("untagged") {
                        container.untagged = true;
                    } else {
                        return Err(meta.error("unknown schema container attribute"));
                    }
                    Ok(())
                })?;
            }
        }

        Ok(container)
    }
}

/// Attributes on an enum variant.
#[derive(Default)]
pub struct Variant {
    pub rename: Option<String>,
    pub skip: bool,
    pub description: Option<String>,
}

impl Variant {
    pub fn from_attrs(attrs: &[Attribute]) -> Result<Self> {
        let mut variant = Self {
            description: doc(attrs),
            ..Default::default()
        };

        for attr in attrs {
            if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") {
                        variant.rename = renamed(&meta)?.map(|lit| lit.value());
                    } else if is_skip(&meta) {
                        variant.skip = true;
                    } else {
                        skip(&meta)?;
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident("schema") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") {
                        variant.rename = Some(string(&meta)?);
                    } else if meta.path.is_ident("description") {
                        variant.description = Some(string(&meta)?);
                    } else if meta.path.is_ident("skip") {
                        variant.skip = true;
                    } else {
                        return Err(meta.error("unknown schema variant attribute"));
                    }
                    Ok(())
                })?;
            }
        }

        Ok(variant)
    }
}

/// Attributes on a struct field.
#[derive(Default)]
pub struct Field {
    pub rename: Option<String>,
    pub skip: bool,
    pub omit_empty: bool,
    pub flatten: bool,
    pub constraints: Constraints,
}

/// Schema keywords copied verbatim onto a field's schema.
#[derive(Default)]
pub struct Constraints {
    pub description: Option<String>,
    pub title: Option<String>,
    pub format: Option<String>,
    pub pattern: Option<String>,
    pub minimum: Option<Expr>,
    pub maximum: Option<Expr>,
    pub min_length: Option<Expr>,
    pub max_length: Option<Expr>,
    pub min_items: Option<Expr>,
    pub max_items: Option<Expr>,
    pub enum_values: Option<ExprArray>,
    pub default: Option<Expr>,
    pub example: Option<Expr>,
}

impl Field {
    pub fn from_attrs(attrs: &[Attribute]) -> Result<Self> {
        let mut field = Self::default();
        field.constraints.description = doc(attrs);

        for attr in attrs {
            if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") {
                        field.rename = renamed(&meta)?.map(|lit| lit.value());
                    } else if meta.path.is_ident("skip_serializing_if") {
                        meta.value()?.parse::<LitStr>()?;
                        field.omit_empty = true;
                    } else if meta.path.is_ident("flatten") {
                        field.flatten = true;
                    } else if is_skip(&meta) {
                        field.skip = true;
                    } else {
                        skip(&meta)?;
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident("schema") {
                attr.parse_nested_meta(|meta| field.parse_schema(&meta))?;
            }
        }

        Ok(field)
    }

    fn parse_schema(&mut self, meta: &ParseNestedMeta) -> Result<()> {
        let c = &mut self.constraints;
        let path = &meta.path;
        if path.is_ident("rename") {
            self.rename = Some(string(meta)?);
        } else if path.is_ident("omit_empty") {
            self.omit_empty = true;
        } else if path.is_ident("skip") {
            self.skip = true;
        } else if path.is_ident("description") {
            c.description = Some(string(meta)?);
        } else if path.is_ident("title") {
            c.title = Some(string(meta)?);
        } else if path.is_ident("format") {
            c.format = Some(string(meta)?);
        } else if path.is_ident("pattern") {
            c.pattern = Some(string(meta)?);
        } else if path.is_ident("minimum") {
            c.minimum = Some(meta.value()?.parse()?);
        } else if path.is_ident("maximum") {
            c.maximum = Some(meta.value()?.parse()?);
        } else if path.is_ident("min_length") {
            c.min_length = Some(meta.value()?.parse()?);
        } else if path.is_ident("max_length") {
            c.max_length = Some(meta.value()?.parse()?);
        } else if path.is_ident("min_items") {
            c.min_items = Some(meta.value()?.parse()?);
        } else if path.is_ident("max_items") {
            c.max_items = Some(meta.value()?.parse()?);
        } else if path.is_ident("enum_values") {
            c.enum_values = Some(meta.value()?.parse()?);
        } else if path.is_ident("default") {
            c.default = Some(meta.value()?.parse()?);
        } else if path.is_ident("example") {
            let example: Expr = meta.value()?.parse()?;
            // only the first example is kept
            c.example.get_or_insert(example);
        } else {
            return Err(meta.error("unknown schema field attribute"));
        }
        Ok(())
    }
}

/// Collect `///` doc lines into a single description.
pub fn doc(attrs: &[Attribute]) -> Option<String> {
    let lines = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(expr) => match &expr.lit {
                    Lit::Str(lit) => Some(lit.value().trim().to_owned()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>();

    (!lines.is_empty()).then(|| lines.join(" "))
}

fn string(meta: &ParseNestedMeta) -> Result<String> {
    Ok(meta.value()?.parse::<LitStr>()?.value())
}

fn is_skip(meta: &ParseNestedMeta) -> bool {
    meta.path.is_ident("skip")
        || meta.path.is_ident("skip_serializing")
        || meta.path.is_ident("skip_deserializing")
}

/// Read `rename = "x"` or the serialize side of `rename(serialize = "x")`.
fn renamed(meta: &ParseNestedMeta) -> Result<Option<LitStr>> {
    if meta.input.peek(Token![=]) {
        return Ok(Some(meta.value()?.parse()?));
    }

    let mut lit = None;
    meta.parse_nested_meta(|inner| {
        if inner.path.is_ident("serialize") {
            lit = Some(inner.value()?.parse()?);
        } else {
            skip(&inner)?;
        }
        Ok(())
    })?;
    Ok(lit)
}

/// Consume a serde key this macro does not care about.
fn skip(meta: &ParseNestedMeta) -> Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<Expr>()?;
    } else if meta.input.peek(token::Paren) {
        meta.input.parse::<proc_macro2::TokenTree>()?;
    }
    Ok(())
}
