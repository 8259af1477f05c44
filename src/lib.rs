pub mod cli;
pub mod context;
pub mod filter;
pub mod filtering;
pub mod query;
pub mod sections;
pub mod settings;
pub mod store;

pub use cli::{Cli, Commands, Encoding, OutputFormat, Section, cli_parse};
pub use context::{ActiveFilter, CompiledFilter, FilterContext, FilterSet, SortKey};
pub use filter::{
    DatePeriod, FieldDefinition, FieldKind, FieldTable, FilterError, FilterValue, ListOperator,
    NumberOperator, Term, suggest_terms, translate,
};
pub use filtering::{Filtering, FilteringError, SectionConfig, SectionDefaults};
pub use query::{QueryNode, compile};
pub use settings::{TagJoinPolicy, UiSettings, load_settings};
pub use store::{ContextStore, FileStore, MemoryStore, StoreError};

use anyhow::{Context, anyhow};
use colored::Colorize;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};

/// Open a section against the file store, loading or creating its context.
fn open_section(
    section: Section,
    settings: &UiSettings,
    store: FileStore,
) -> Result<Filtering<FileStore>, FilteringError> {
    let mut filtering = Filtering::new(section.config(), settings.clone(), store);
    filtering.init_context("list")?;
    Ok(filtering)
}

/// Read a filter value typed on the command line.
///
/// The argument is JSON5 (unquoted keys and single quotes welcome). A form
/// carrying a `kind` tag is taken as a full typed value; anything else is
/// coerced to the field's kind the way quick filters are.
fn parse_value_arg(def: &FieldDefinition, raw: &str) -> anyhow::Result<FilterValue> {
    let parsed: serde_json::Value =
        json5::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));

    if parsed.get("kind").is_some() {
        return serde_json::from_value::<FilterValue>(parsed)
            .with_context(|| format!("Cannot read '{raw}' as a typed filter value"));
    }

    def.value_from(&parsed).ok_or_else(|| {
        anyhow!(
            "Cannot read '{raw}' as a {:?} value for field '{}'",
            def.kind,
            def.field
        )
    })
}

fn create_styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
    table
}

fn format_sort(sort: &[SortKey]) -> String {
    if sort.is_empty() {
        "(none)".to_string()
    } else {
        sort.iter()
            .map(SortKey::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn print_context(filtering: &Filtering<FileStore>) {
    let context = filtering.context();

    println!("Section {}", filtering.config().section.cyan());
    println!("  page size: {}", context.page_size);
    println!("  sort:      {}", format_sort(&context.sort));
    println!(
        "  panels:    filters {}, stats {}",
        if context.show_filters { "shown" } else { "hidden" },
        if context.show_stats { "shown" } else { "hidden" }
    );

    if !filtering.has_filters() {
        println!("\nNo filters applied.");
        return;
    }

    let mut table = create_styled_table(&["Field", "Label", "Value", "Criterion"]);
    for filter in context.filters.iter() {
        table.add_row(vec![
            Cell::new(&filter.field),
            Cell::new(&filter.label),
            Cell::new(filter.value.display_text().unwrap_or_default()),
            Cell::new(query::legacy::to_query_string(&filter.criterion)),
        ]);
    }

    println!("\n{table}");

    if let Some(query) = filtering.build_query_string() {
        println!("\nQuery: {}", query.yellow());
    }
}

fn print_query(filtering: &Filtering<FileStore>, encoding: Encoding, format: OutputFormat) {
    let rendered = match encoding {
        Encoding::Legacy => filtering.build_query_string(),
        Encoding::Wire => filtering.build_wire_query().map(|value| {
            serde_json::to_string_pretty(&value)
                .unwrap_or_else(|_| "{\"error\":\"failed to serialize query\"}".into())
        }),
    };

    match (rendered, format) {
        (Some(query), _) => println!("{query}"),
        (None, OutputFormat::Text) => println!("No filters applied."),
        (None, OutputFormat::Json) => println!("null"),
    }
}

pub fn run() -> anyhow::Result<()> {
    let cli = cli_parse();

    let settings = settings::load_settings(cli.settings.as_deref())
        .context("Failed to load settings profile")?;

    if cli.verbose > 0 {
        eprintln!("Store directory: {}", cli.store_dir.display());
        eprintln!("Settings profile: {}", settings.profile_name);
        if let Some(path) = &cli.settings {
            eprintln!("Settings file: {}", path.display());
        }
    }

    let store = FileStore::new(&cli.store_dir);

    match &cli.command {
        Commands::List => {
            let mut keys = store.keys();
            keys.sort();

            if keys.is_empty() {
                println!("No stored contexts under {}", store.dir().display());
            }
            for key in keys {
                println!("{key}");
            }
        }

        Commands::Show { section } => {
            let filtering = open_section(*section, &settings, store)?;
            match cli.format {
                OutputFormat::Text => print_context(&filtering),
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(filtering.context())?);
                }
            }
        }

        Commands::Compile { section, encoding } => {
            let filtering = open_section(*section, &settings, store)?;
            print_query(&filtering, *encoding, cli.format);
        }

        Commands::Set {
            section,
            field,
            value,
        } => {
            let mut filtering = open_section(*section, &settings, store)?;
            let def = filtering
                .config()
                .fields
                .get(field)
                .cloned()
                .ok_or_else(|| anyhow!("No filter definition for field '{field}'"))?;

            let parsed = parse_value_arg(&def, value)?;
            filtering.add_filter(field, parsed)?;

            match filtering.build_query_string() {
                Some(query) => println!("Query: {}", query.yellow()),
                None => println!("No filters applied."),
            }
        }

        Commands::Unset { section, field } => {
            let mut filtering = open_section(*section, &settings, store)?;
            filtering.remove_filter(field)?;
            let left = filtering.count_filters();
            println!(
                "Removed '{}' ({} filter{} left)",
                field,
                left,
                if left == 1 { "" } else { "s" }
            );
        }

        Commands::Clear { section } => {
            let mut filtering = open_section(*section, &settings, store)?;
            filtering.clear_filters()?;
            println!("Cleared filters of {}", filtering.config().section);
        }

        Commands::Sort { section, field } => {
            let mut filtering = open_section(*section, &settings, store)?;
            filtering.sort_by_field(field)?;
            println!("Sort: {}", format_sort(&filtering.context().sort));
        }

        Commands::PageSize { section, size } => {
            let mut filtering = open_section(*section, &settings, store)?;
            filtering.set_page_size(*size)?;
            println!("Page size: {size}");
        }

        Commands::Reset { section } => {
            let mut filtering = open_section(*section, &settings, store)?;
            filtering.reset_context()?;
            println!("Reset {} to its defaults", filtering.config().section);
        }
    }

    Ok(())
}
