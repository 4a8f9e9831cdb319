use std::path::PathBuf;

use clap::Parser;

use crate::filter::Operator;
use crate::schema::Path;

#[derive(Parser, Debug)]
#[command(name = "record-browser")]
#[command(about = "Browse the records of a JSON dataset page by page", long_about = None)]
pub struct Cli {
    /// Dataset file (schema plus records)
    #[arg(short, long)]
    pub data: PathBuf,

    /// Entity type to list
    #[arg(short, long)]
    pub entity: String,

    /// Records per page (overrides config)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Sort column as `path[:asc|:desc]`, repeatable; earlier columns rank first
    #[arg(long = "sort", value_parser = parse_sort)]
    pub sort: Vec<SortArg>,

    /// Predicate as `"<path> <op> <value>"`, repeatable; all must hold
    #[arg(short = 'w', long = "where", value_parser = parse_where)]
    pub filters: Vec<WhereArg>,

    /// Number of pages to fetch
    #[arg(long, default_value_t = 1)]
    pub pages: usize,

    /// Layout name (overrides config)
    #[arg(long)]
    pub layout: Option<String>,

    /// Config file (default: the per-user config file)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// One `--sort` column. `descending` is `None` when the direction was left to
/// the configured default.
#[derive(Debug, Clone, PartialEq)]
pub struct SortArg {
    pub path: Path,
    pub descending: Option<bool>,
}

/// One `--where` predicate, values still unparsed.
///
/// A value written as `@path` refers to another field of the same record.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereArg {
    pub path: Path,
    pub operator: Operator,
    pub values: Vec<String>,
}

pub fn parse_sort(raw: &str) -> Result<SortArg, String> {
    let (path, descending) = match raw.rsplit_once(':') {
        Some((path, "asc")) => (path, Some(false)),
        Some((path, "desc")) => (path, Some(true)),
        Some((_, other)) => return Err(format!("unknown sort direction '{}'", other)),
        None => (raw, None),
    };
    let path = Path::parse(path).ok_or_else(|| format!("invalid field path '{}'", path))?;
    Ok(SortArg { path, descending })
}

pub fn parse_where(raw: &str) -> Result<WhereArg, String> {
    let mut parts = raw.trim().splitn(3, char::is_whitespace);
    let (Some(path), Some(operator), Some(rest)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected '<path> <op> <value>', got '{}'", raw));
    };

    let path = Path::parse(path).ok_or_else(|| format!("invalid field path '{}'", path))?;
    let operator =
        Operator::parse(operator).ok_or_else(|| format!("unknown operator '{}'", operator))?;
    let rest = rest.trim();

    let values: Vec<String> = if operator.is_range() {
        rest.split_whitespace().map(str::to_string).collect()
    } else {
        vec![rest.to_string()]
    };
    let expected = if operator.is_range() { 2 } else { 1 };
    if values.len() != expected || values.iter().any(String::is_empty) {
        return Err(format!(
            "operator '{}' takes {} value(s), got '{}'",
            operator, expected, rest
        ));
    }

    Ok(WhereArg {
        path,
        operator,
        values,
    })
}
