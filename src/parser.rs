/// Parser for the catalog text format
///
/// ```text
/// # comment
/// $free free
/// $unconstrained no constraint
///
/// era
///     90s
///     free
///
/// $special
///     Title has two words
/// ```
use crate::catalog::{Catalog, CatalogError};
use crate::span::{Span, Spanned};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Invalid indentation at byte {}", .span.start)]
    InvalidIndentation { span: Span },
    #[error("Unknown directive '${name}'")]
    UnknownDirective { name: String, span: Span },
    #[error("Directive '${name}' needs a value")]
    MissingDirectiveValue { name: String, span: Span },
    #[error("Directive '${name}' takes no value")]
    UnexpectedDirectiveValue { name: String, span: Span },
    #[error("Item at byte {} does not belong to any block", .span.start)]
    OrphanItem { span: Span },
    #[error("Block '{name}' has no items")]
    EmptyBlock { name: String, span: Span },
    #[error("'{name}' is defined more than once")]
    DuplicateBlock { name: String, span: Span },
    #[error("{error}")]
    Invalid { error: CatalogError, span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::InvalidIndentation { span } => *span,
            ParseError::UnknownDirective { span, .. } => *span,
            ParseError::MissingDirectiveValue { span, .. } => *span,
            ParseError::UnexpectedDirectiveValue { span, .. } => *span,
            ParseError::OrphanItem { span } => *span,
            ParseError::EmptyBlock { span, .. } => *span,
            ParseError::DuplicateBlock { span, .. } => *span,
            ParseError::Invalid { span, .. } => *span,
        }
    }
}

/// A header line and the items indented under it
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub name: Spanned<String>,
    pub items: Vec<Spanned<String>>,
}

/// Parsed but not yet validated catalog source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogDocument {
    pub free: Option<Spanned<String>>,
    pub unconstrained: Option<Spanned<String>>,
    pub categories: Vec<Block>,
    pub specials: Option<Block>,
}

enum Current {
    None,
    Category,
    Specials,
}

pub struct Parser<'a> {
    input: &'a str,
    space_indent_unit: Option<usize>, // Detected from the first space-indented line
    document: CatalogDocument,
    current: Current,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Parser {
            input,
            space_indent_unit: None,
            document: CatalogDocument::default(),
            current: Current::None,
        }
    }

    pub fn parse(mut self) -> Result<CatalogDocument, ParseError> {
        let input = self.input;
        let mut offset = 0;
        for raw in input.split_inclusive('\n') {
            let line_start = offset;
            offset += raw.len();

            let line = raw.trim_end_matches(['\n', '\r']);
            let body = line.trim_start_matches([' ', '\t']);
            let content = body.trim_end();
            if content.is_empty() || content.starts_with('#') {
                continue;
            }

            let indent = &line[..line.len() - body.len()];
            let start = line_start + indent.len();
            let span = Span::new(start, start + content.len());

            match self.indentation_level(indent, line_start)? {
                0 => self.header(content, span)?,
                1 => self.item(content, span)?,
                _ => {
                    return Err(ParseError::InvalidIndentation {
                        span: Span::new(line_start, start),
                    })
                }
            }
        }

        let document = self.document;
        for block in document.categories.iter().chain(document.specials.iter()) {
            if block.items.is_empty() {
                return Err(ParseError::EmptyBlock {
                    name: block.name.value.clone(),
                    span: block.name.span,
                });
            }
        }
        Ok(document)
    }

    fn indentation_level(&mut self, indent: &str, line_start: usize) -> Result<usize, ParseError> {
        let invalid = || ParseError::InvalidIndentation {
            span: Span::new(line_start, line_start + indent.len()),
        };

        let tabs = indent.chars().take_while(|&c| c == '\t').count();
        let spaces = indent.len() - tabs;
        if indent[tabs..].contains('\t') {
            return Err(invalid());
        }
        if spaces == 0 {
            return Ok(tabs);
        }

        let unit = match self.space_indent_unit {
            Some(unit) => unit,
            None if spaces == 2 || spaces == 4 => {
                self.space_indent_unit = Some(spaces);
                spaces
            }
            None => return Err(invalid()),
        };
        if spaces % unit != 0 {
            return Err(invalid());
        }
        Ok(tabs + spaces / unit)
    }

    fn header(&mut self, content: &str, span: Span) -> Result<(), ParseError> {
        let Some(directive) = content.strip_prefix('$') else {
            return self.category(content, span);
        };

        let (name, value) = match directive.find(char::is_whitespace) {
            Some(at) => (&directive[..at], directive[at..].trim()),
            None => (directive, ""),
        };
        let name_span = Span::new(span.start, span.start + 1 + name.len());
        let value_span = Span::new(span.end - value.len(), span.end);

        match name {
            "free" | "unconstrained" => {
                if value.is_empty() {
                    return Err(ParseError::MissingDirectiveValue {
                        name: name.to_string(),
                        span: name_span,
                    });
                }
                let slot = if name == "free" {
                    &mut self.document.free
                } else {
                    &mut self.document.unconstrained
                };
                if slot.is_some() {
                    return Err(ParseError::DuplicateBlock {
                        name: format!("${}", name),
                        span: name_span,
                    });
                }
                *slot = Some(Spanned::new(value.to_string(), value_span));
                self.current = Current::None;
            }
            "special" => {
                if !value.is_empty() {
                    return Err(ParseError::UnexpectedDirectiveValue {
                        name: name.to_string(),
                        span: value_span,
                    });
                }
                if self.document.specials.is_some() {
                    return Err(ParseError::DuplicateBlock {
                        name: "$special".to_string(),
                        span: name_span,
                    });
                }
                self.document.specials = Some(Block {
                    name: Spanned::new("$special".to_string(), name_span),
                    items: Vec::new(),
                });
                self.current = Current::Specials;
            }
            _ => {
                return Err(ParseError::UnknownDirective {
                    name: name.to_string(),
                    span: name_span,
                })
            }
        }
        Ok(())
    }

    fn category(&mut self, name: &str, span: Span) -> Result<(), ParseError> {
        if self
            .document
            .categories
            .iter()
            .any(|block| block.name.value == name)
        {
            return Err(ParseError::DuplicateBlock {
                name: name.to_string(),
                span,
            });
        }
        self.document.categories.push(Block {
            name: Spanned::new(name.to_string(), span),
            items: Vec::new(),
        });
        self.current = Current::Category;
        Ok(())
    }

    fn item(&mut self, content: &str, span: Span) -> Result<(), ParseError> {
        let block = match self.current {
            Current::Category => self.document.categories.last_mut(),
            Current::Specials => self.document.specials.as_mut(),
            Current::None => None,
        };
        let Some(block) = block else {
            return Err(ParseError::OrphanItem { span });
        };
        block.items.push(Spanned::new(content.to_string(), span));
        Ok(())
    }
}

impl CatalogDocument {
    /// Validate into a [`Catalog`], pointing errors at the offending lines
    pub fn into_catalog(self) -> Result<Catalog, ParseError> {
        let mut builder = Catalog::builder();
        if let Some(free) = &self.free {
            builder = builder.free(free.value.clone());
        }
        if let Some(label) = &self.unconstrained {
            builder = builder.unconstrained(label.value.clone());
        }
        for block in &self.categories {
            builder = builder.category(
                block.name.value.clone(),
                block.items.iter().map(|item| item.value.clone()),
            );
        }
        if let Some(specials) = &self.specials {
            builder = builder.specials(specials.items.iter().map(|item| item.value.clone()));
        }

        builder.build().map_err(|error| {
            let span = self.locate(&error);
            ParseError::Invalid { error, span }
        })
    }

    fn locate(&self, error: &CatalogError) -> Span {
        let category = |name: &str| {
            self.categories
                .iter()
                .find(|block| block.name.value == name)
        };
        let repeated = |block: &Block, value: &str| {
            block
                .items
                .iter()
                .filter(|item| item.value == value)
                .nth(1)
                .map(|item| item.span)
        };
        let fallback = Span::new(0, 0);

        match error {
            CatalogError::FreeSentinel { category: name, .. }
            | CatalogError::TooFewOptions(name)
            | CatalogError::DuplicateCategory(name) => {
                category(name.as_str()).map_or(fallback, |block| block.name.span)
            }
            CatalogError::DuplicateOption {
                category: name,
                option,
            } => category(name.as_str())
                .and_then(|block| repeated(block, option.as_str()))
                .unwrap_or(fallback),
            CatalogError::DuplicateSpecial(prompt) => self
                .specials
                .as_ref()
                .and_then(|block| repeated(block, prompt.as_str()))
                .unwrap_or(fallback),
            CatalogError::NoSpecials => self
                .specials
                .as_ref()
                .map_or(fallback, |block| block.name.span),
            CatalogError::EmptyLabel("free") => self.free.as_ref().map_or(fallback, |f| f.span),
            CatalogError::EmptyLabel(_) => self
                .unconstrained
                .as_ref()
                .map_or(fallback, |u| u.span),
            CatalogError::NoCategories | CatalogError::EmptyCategoryName => fallback,
        }
    }
}

pub fn parse(input: &str) -> Result<CatalogDocument, ParseError> {
    Parser::new(input).parse()
}
