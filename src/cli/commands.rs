//! CLI command implementations

use anyhow::{bail, Context, Result};
use std::path::Path;
use walkdir::WalkDir;

use qfilter::config::Config;
use qfilter::query::order::{detect_sql_injection, guard_order_expr, parse_order_expr};
use qfilter::schema::{create_example_filter, load_filter};
use qfilter::{Database, Dialect, FilterSpec, RenderedSql, Select, SqlCondition};

/// Create the config file, plus an example filter when asked
pub fn init(config_path: Option<&Path>, example: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(path) => {
            Config::create_at(path)?;
            path.to_path_buf()
        }
        None => Config::create_default()?,
    };
    println!("✓ Config: {}", path.display());

    if let Some(example) = example {
        if example.exists() {
            println!("Skipped {} (already exists)", example.display());
        } else {
            create_example_filter(example)?;
            println!("✓ Created example filter: {}", example.display());
        }
    }

    Ok(())
}

/// Compile a filter file and print the statement
pub fn compile(
    config: &Config,
    file: &Path,
    dialect: Dialect,
    paging: Option<(u64, u64)>,
    json: bool,
) -> Result<()> {
    let spec = load_filter(file)?;
    let condition = config
        .compiler(dialect)
        .compile(&spec)
        .with_context(|| format!("Failed to compile {}", file.display()))?;
    let select = build_select(&spec, condition, paging)?;

    let rows = select.to_sql(dialect);
    let count = select.count_sql(dialect);

    if json {
        let out = serde_json::json!({
            "dialect": dialect.name(),
            "query": rows,
            "count": count,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_statement("query", &rows);
    print_statement("count", &count);
    Ok(())
}

/// Run a filter against a configured SQLite database
pub fn run(config: &Config, file: &Path, database: Option<&str>, paging: (u64, u64)) -> Result<()> {
    let (name, db_config) = config.database(database)?;
    let db_path = match &db_config.path {
        Some(path) => path,
        None => bail!("Database '{}' has no path configured", name),
    };
    let dialect = Dialect::from_driver(&db_config.driver);

    let spec = load_filter(file)?;
    let condition = config
        .compiler(dialect)
        .compile(&spec)
        .with_context(|| format!("Failed to compile {}", file.display()))?;
    let select = build_select(&spec, condition, Some(paging))?;

    tracing::info!(database = name, dialect = %dialect, table = select.table(), "Running filter");

    let db = Database::open(db_path)?;
    let page = db.page(&select, dialect)?;

    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}

/// Compile every filter file under `dir` with both dialects
pub fn check(config: &Config, dir: &Path) -> Result<()> {
    println!("Checking filters in: {}", dir.display());

    let mut errors = 0;
    let mut warnings = 0;
    let mut file_count = 0;

    for entry in WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file()
                && e.path()
                    .extension()
                    .map_or(false, |ext| ext == "yaml" || ext == "yml" || ext == "json")
        })
    {
        file_count += 1;
        let file_path = entry.path();
        let relative_path = file_path.strip_prefix(dir).unwrap_or(file_path);

        let spec = match load_filter(file_path) {
            Ok(spec) => spec,
            Err(e) => {
                println!("ERROR: {} - {:#}", relative_path.display(), e);
                errors += 1;
                continue;
            }
        };

        if spec.table.is_empty() {
            println!("WARN:  {} - No table set, fields cannot be qualified", relative_path.display());
            warnings += 1;
        }

        for dialect in [Dialect::Mysql, Dialect::Postgres] {
            if let Err(e) = config.compiler(dialect).compile(&spec) {
                println!("ERROR: {} [{}] - {}", relative_path.display(), dialect, e);
                errors += 1;
            }
        }
    }

    println!();
    if errors == 0 && warnings == 0 {
        println!("✓ No issues found in {} files.", file_count);
    } else {
        println!("Found {} error(s), {} warning(s) in {} files.", errors, warnings, file_count);
    }

    if errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// Show how an ordering expression would be accepted or rejected
pub fn order(expr: &str) -> Result<()> {
    if let Some(order) = guard_order_expr(expr) {
        println!("✓ {} {}", order.column, order.direction);
        return Ok(());
    }

    match parse_order_expr(expr) {
        None => println!("Rejected: expected order[column]=asc|desc"),
        Some((column, _)) if detect_sql_injection(&column) => {
            println!("Rejected: column '{}' looks like SQL injection", column)
        }
        Some((column, direction)) => {
            println!("Rejected: '{}={}' is not a valid column/direction pair", column, direction)
        }
    }
    std::process::exit(1);
}

fn build_select(spec: &FilterSpec, condition: SqlCondition, paging: Option<(u64, u64)>) -> Result<Select> {
    if spec.table.is_empty() {
        bail!("Filter has no table; set 'table:' at the top level");
    }

    let select = Select::from(spec.table.as_str()).condition(condition);
    Ok(match paging {
        Some((size, index)) => select.paginate(size, index),
        None => select,
    })
}

fn print_statement(label: &str, statement: &RenderedSql) {
    println!("-- {}", label);
    println!("{};", statement.sql);
    for (i, param) in statement.params.iter().enumerate() {
        println!("--   ${} = {}", i + 1, param);
    }
}
