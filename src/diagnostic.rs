/// Diagnostic reporting for catalog sources using ariadne
use crate::catalog::CatalogError;
use crate::parser::ParseError;
use ariadne::{Color, Label, Report, ReportKind, Source};

/// Render a catalog parse or validation error against its source
pub fn report_parse_error(source_name: &str, source: &str, error: &ParseError) -> String {
    let span = error.span();
    let label = Label::new((source_name, span.range())).with_color(Color::Red);
    let builder = Report::build(ReportKind::Error, source_name, span.start);

    let report = match error {
        ParseError::InvalidIndentation { .. } => builder
            .with_message("Invalid indentation")
            .with_label(label.with_message("this indentation is not valid"))
            .with_note("Indent options with one tab or a consistent 2/4 spaces"),
        ParseError::UnknownDirective { name, .. } => builder
            .with_message(format!("Unknown directive '${}'", name))
            .with_label(label.with_message("not a known directive"))
            .with_help("Known directives are $free, $unconstrained and $special"),
        ParseError::MissingDirectiveValue { name, .. } => builder
            .with_message(format!("Directive '${}' needs a value", name))
            .with_label(label.with_message("value missing after this"))
            .with_help(format!("Write the value on the same line, e.g. '${} ...'", name)),
        ParseError::UnexpectedDirectiveValue { name, .. } => builder
            .with_message(format!("Directive '${}' takes no value", name))
            .with_label(label.with_message("unexpected value"))
            .with_help("List special prompts on indented lines below the directive"),
        ParseError::OrphanItem { .. } => builder
            .with_message("Item outside of any block")
            .with_label(label.with_message("this line is indented but has no header"))
            .with_help("Put a category name or '$special' above it"),
        ParseError::EmptyBlock { name, .. } => builder
            .with_message(format!("Block '{}' has no items", name))
            .with_label(label.with_message("nothing is indented below this"))
            .with_help("Add indented lines below the header"),
        ParseError::DuplicateBlock { name, .. } => builder
            .with_message(format!("'{}' is defined more than once", name))
            .with_label(label.with_message("defined again here"))
            .with_help("Merge the two definitions"),
        ParseError::Invalid { error, .. } => builder
            .with_message(format!("Invalid catalog: {}", error))
            .with_label(label.with_message(validation_label(error)))
            .with_note(validation_note(error)),
    }
    .finish();

    let mut output = Vec::new();
    if report
        .write((source_name, Source::from(source)), &mut output)
        .is_err()
    {
        let (line, column) = span.line_col(source);
        return format!("{}:{}:{}: {}\n", source_name, line, column, error);
    }
    String::from_utf8_lossy(&output).into_owned()
}

fn validation_label(error: &CatalogError) -> &'static str {
    match error {
        CatalogError::FreeSentinel { .. } => "free option missing or repeated",
        CatalogError::TooFewOptions(_) => "only the free option is listed",
        CatalogError::DuplicateOption { .. } => "option listed again here",
        CatalogError::DuplicateSpecial(_) => "prompt listed again here",
        CatalogError::NoSpecials => "no special prompts",
        _ => "here",
    }
}

fn validation_note(error: &CatalogError) -> String {
    match error {
        CatalogError::FreeSentinel { free, .. } => {
            format!("Every category lists '{}' exactly once", free)
        }
        CatalogError::NoSpecials => "Add a '$special' block with at least one prompt".to_string(),
        CatalogError::NoCategories => "Add at least one category".to_string(),
        _ => "Each value may appear only once in its block".to_string(),
    }
}

/// Render any crate error; errors without a source position are printed plainly
pub fn report_error(source_name: &str, source: &str, error: &crate::KaraokeError) -> String {
    match error {
        crate::KaraokeError::Parse(e) => report_parse_error(source_name, source, e),
        other => format!("Error: {}\n", other),
    }
}
