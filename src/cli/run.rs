use std::io::Write;
use std::sync::Arc;

use crate::broker::ChangeBroker;
use crate::config::BrowserConfig;
use crate::error::{Error, Result};
use crate::filter::{
    AndFilter, Condition, FilterPath, MetaField, Operand, OrFilter, ValidationError,
};
use crate::list::{ListController, ListIntent, ListReducer, ListState};
use crate::mvi::Reducer;
use crate::schema::{EntityType, Schema};
use crate::source::{Dataset, MemorySource};

use super::args::{Cli, SortArg, WhereArg};
use super::literal::parse_operand;

/// Load the dataset, fetch the requested pages and write one JSON line per
/// record to `out`.
pub async fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let config = match &cli.config {
        Some(path) => BrowserConfig::load_from(path)?,
        None => BrowserConfig::load()?,
    };

    let dataset = Dataset::load(&cli.data)?;
    let broker = ChangeBroker::new();
    let source = Arc::new(MemorySource::from_dataset(dataset, broker.clone())?);

    let state = build_state(cli, &config, source.schema())?;
    let controller = ListController::new(state, source).attach(&broker)?;

    controller.sync().await?;
    for _ in 1..cli.pages {
        if !controller.load_more().await? {
            break;
        }
    }

    let state = controller.state();
    tracing::info!(
        entity = %state.struct_id,
        records = state.window.len(),
        reached_end = state.reached_end,
        layout = %state.layout,
        "Listing complete"
    );
    for record in &state.window {
        writeln!(out, "{}", serde_json::to_string(record)?)?;
    }
    Ok(())
}

/// Initial list state for the command line, built through reducer intents.
pub fn build_state(cli: &Cli, config: &BrowserConfig, schema: &Schema) -> Result<ListState> {
    let entity = EntityType::new(&cli.entity);
    let page_size = cli.page_size.unwrap_or(config.defaults.page_size);
    if page_size == 0 {
        return Err(Error::InvalidArgument("page size must be at least 1".to_string()));
    }

    let catalog = OrFilter::catalog(schema, &entity, config.defaults.catalog_depth)?;
    let layout = cli.layout.as_deref().unwrap_or(&config.defaults.layout);
    let mut state = ListState::new(entity, catalog, page_size)
        .with_sort_policy(config.sort)
        .with_layout(layout);

    for sort in &cli.sort {
        state = apply_sort(state, sort)?;
    }
    for (index, filter) in (0u32..).zip(&cli.filters) {
        let group = AndFilter::new(index).upsert_filter(where_filter(&state, schema, filter)?);
        state = ListReducer::reduce(state, ListIntent::UpsertGroup { group });
    }
    Ok(state)
}

fn apply_sort(state: ListState, sort: &SortArg) -> Result<ListState> {
    if state.catalog.entry(&sort.path).is_none() {
        return Err(ValidationError::UnknownPath {
            entity: state.struct_id.clone(),
            path: sort.path.clone(),
        }
        .into());
    }

    let path = sort.path.clone();
    let state = ListReducer::reduce(state, ListIntent::AddSort { path: path.clone() });
    let current = state
        .catalog
        .entry(&path)
        .and_then(|entry| entry.ordering)
        .map(|key| key.descending);

    match (sort.descending, current) {
        (Some(wanted), Some(current)) if wanted != current => Ok(ListReducer::reduce(
            state,
            ListIntent::ToggleSortDirection { path },
        )),
        _ => Ok(state),
    }
}

/// One `--where` predicate as a single-entry conjunction.
fn where_filter(state: &ListState, schema: &Schema, arg: &WhereArg) -> Result<OrFilter> {
    let entity = &state.struct_id;
    let unknown = || ValidationError::UnknownPath {
        entity: entity.clone(),
        path: arg.path.clone(),
    };

    let entry = match state.catalog.entry(&arg.path) {
        Some(entry) => Some(entry.clone()),
        None => schema
            .field_type(entity, &arg.path)
            .map(|field_type| FilterPath::new(arg.path.to_string(), arg.path.clone(), field_type)),
    };

    let field_type = match (&entry, MetaField::parse(arg.path.field_name())) {
        (Some(entry), _) => entry.field_type().clone(),
        (None, Some(meta)) if arg.path.is_direct() => meta.field_type(),
        _ => return Err(unknown().into()),
    };

    let mut operands = Vec::with_capacity(arg.values.len());
    for raw in &arg.values {
        let operand = parse_operand(raw, &field_type)?;
        if let Operand::FieldRef(path) = &operand {
            if schema.field_type(entity, path).is_none() {
                return Err(ValidationError::UnknownPath {
                    entity: entity.clone(),
                    path: path.clone(),
                }
                .into());
            }
        }
        operands.push(operand);
    }

    let mut operands = operands.into_iter();
    let condition = match (operands.next(), operands.next()) {
        (Some(low), Some(high)) => Condition::range(arg.operator, low, high)?,
        (Some(operand), None) => Condition::new(arg.operator, operand)?,
        _ => {
            return Err(Error::InvalidArgument(format!(
                "no value given for '{}'",
                arg.path
            )))
        }
    };

    let filter = OrFilter::new(0);
    match entry {
        Some(entry) => Ok(filter.with_filter_path(entry.with_condition(condition)?.activated(true))),
        None => {
            let meta = MetaField::parse(arg.path.field_name()).ok_or_else(unknown)?;
            Ok(filter.with_meta(meta, true, Some(condition))?)
        }
    }
}
