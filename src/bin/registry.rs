//! Schema Registry CLI
//!
//! Inspect, edit and publish record schemas in a directory registry.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use record_schemas::codec;
use record_schemas::{DirectoryRegistry, SchemaConfig, SchemaField, SchemaStore, SqlHint};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-registry")]
#[command(about = "Inspect and publish record schemas")]
struct Cli {
    /// Config file to load (optional)
    #[arg(short, long)]
    config: Option<String>,

    /// Path to schema registry (overrides config)
    #[arg(short, long)]
    registry: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all published schemas
    List,

    /// Print a schema as JSON
    Show {
        /// Schema name
        name: String,
    },

    /// Print the fields of a schema, in position order
    Fields {
        /// Schema name
        name: String,
    },

    /// Look up a single field
    Field {
        /// Schema name
        name: String,
        /// Field position (1-based)
        #[arg(short, long, conflicts_with = "field_name", required_unless_present = "field_name")]
        position: Option<u16>,
        /// Field name
        #[arg(short = 'n', long)]
        field_name: Option<String>,
    },

    /// Add a field to a schema, replacing any field at the same position
    AddField {
        /// Schema name
        name: String,
        #[arg(short, long)]
        position: u16,
        #[arg(short = 'n', long)]
        field_name: String,
        /// Type tag (e.g. string, i64, double)
        #[arg(short = 't', long = "type")]
        type_tag: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// SQL type name
        #[arg(long, default_value = "")]
        sql_type: String,
        #[arg(long)]
        length: Option<i32>,
        #[arg(long)]
        scale: Option<i32>,
        #[arg(long)]
        precision: Option<i32>,
    },

    /// Set or clear the sink metadata of a schema
    SetSinkInfo {
        /// Schema name
        name: String,
        /// New value (omit to clear)
        value: Option<String>,
    },

    /// Decode a local JSON file and publish it
    Import {
        /// Schema file
        file: PathBuf,
    },

    /// Write a schema to a file (or stdout)
    Export {
        /// Schema name
        name: String,
        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fuzzy search schema names
    Search {
        query: String,
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Check that every published schema (or one) decodes and matches its checksum
    Verify {
        /// Schema name (default: all)
        name: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = SchemaConfig::load_from(cli.config.as_deref())?;
    let path = cli.registry.unwrap_or_else(|| config.registry_path());
    let registry = DirectoryRegistry::open(&path)?
        .with_checksum_verification(config.registry.verify_checksums);
    let store = SchemaStore::new(registry);

    match cli.command {
        Commands::List => {
            let names = store.names()?;
            if names.is_empty() {
                println!("No schemas published yet.");
            } else {
                for name in names {
                    println!("{}", name);
                }
            }
            Ok(())
        }

        Commands::Show { name } => {
            let schema = store.load(&name)?;
            let json = codec::encode_pretty(&schema)?;
            println!("{}", String::from_utf8(json)?);
            Ok(())
        }

        Commands::Fields { name } => {
            let schema = store.load(&name)?;
            for field in schema.fields() {
                print_field(field);
            }
            Ok(())
        }

        Commands::Field { name, position, field_name } => {
            let schema = store.load(&name)?;
            let field = match (position, field_name.as_deref()) {
                (Some(position), _) => schema.field_by_position(position),
                (None, Some(field_name)) => schema.field_by_name(field_name),
                (None, None) => None,
            };
            match field {
                Some(field) => {
                    print_field(field);
                    Ok(())
                }
                None => Err(format!("No such field in {}", name).into()),
            }
        }

        Commands::AddField {
            name,
            position,
            field_name,
            type_tag,
            description,
            sql_type,
            length,
            scale,
            precision,
        } => {
            let mut schema = store.load(&name)?;
            let mut sql = SqlHint::new(sql_type);
            if let Some(length) = length {
                sql = sql.with_length(length);
            }
            if let Some(scale) = scale {
                sql = sql.with_scale(scale);
            }
            if let Some(precision) = precision {
                sql = sql.with_precision(precision);
            }

            let replaced = schema.contains_position(position);
            schema.add_field(SchemaField::new(position, field_name, type_tag, description, sql));
            store.save_as(&name, &schema)?;
            if replaced {
                println!("Replaced field {} in {}", position, name);
            } else {
                println!("Added field {} to {}", position, name);
            }
            Ok(())
        }

        Commands::SetSinkInfo { name, value } => {
            let mut schema = store.load(&name)?;
            schema.set_sink_add_info(value);
            store.save_as(&name, &schema)?;
            println!("Updated sink info for {}", name);
            Ok(())
        }

        Commands::Import { file } => {
            let bytes = std::fs::read(&file)?;
            let schema = codec::decode(&bytes)?;
            store.save(&schema)?;
            println!("Published {} ({} fields)", schema.name(), schema.len());
            Ok(())
        }

        Commands::Export { name, output } => {
            let schema = store.load(&name)?;
            let json = codec::encode_with(&schema, config.codec.output_format)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &json)?;
                    println!("Wrote {} to {:?}", name, path);
                }
                None => println!("{}", String::from_utf8(json)?),
            }
            Ok(())
        }

        Commands::Search { query, limit } => {
            for hit in store.search(&query, limit)? {
                println!("{:>5}  {}", hit.score, hit.name);
            }
            Ok(())
        }

        Commands::Verify { name } => {
            // Checksums are always checked here, whatever the config says
            let store = SchemaStore::new(store.client().clone().with_checksum_verification(true));
            let names = match name {
                Some(name) => vec![name],
                None => store.names()?,
            };

            let mut failures = 0;
            for name in &names {
                match store.load(name) {
                    Ok(schema) => println!("ok      {} ({} fields)", name, schema.len()),
                    Err(e) => {
                        println!("FAILED  {}: {}", name, e);
                        failures += 1;
                    }
                }
            }

            if failures > 0 {
                return Err(format!("{} of {} schemas failed verification", failures, names.len()).into());
            }
            Ok(())
        }
    }
}

fn print_field(field: &SchemaField) {
    let sql = field.sql();
    let mut sql_type = sql.type_name().to_string();
    match (sql.length(), sql.precision(), sql.scale()) {
        (Some(length), _, _) => sql_type.push_str(&format!("({})", length)),
        (None, Some(precision), Some(scale)) => sql_type.push_str(&format!("({},{})", precision, scale)),
        (None, Some(precision), None) => sql_type.push_str(&format!("({})", precision)),
        _ => {}
    }
    println!(
        "{:>4}  {:<24} {:<10} {:<20} {}",
        field.id(),
        field.name(),
        field.type_tag(),
        sql_type,
        field.description()
    );
}
