use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hivelink_client::{ClientResult, HiveClient, PartitionSpec, TableSpec, Value};
use hivelink_common::config::AppConfig;
use hivelink_telemetry::telemetry::init_telemetry;
use log::debug;

use crate::args::{parse_column, parse_key_value, parse_param};
use crate::output::{render_rows, OutputFormat};

#[derive(Parser)]
#[command(version, name = "hivelink", about = "Runs statements against HiveServer2")]
struct Cli {
    /// A TOML configuration file, applied over the built-in defaults.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// A connection URL such as `jdbc:hive2://host:10000/db;user=hive`.
    #[arg(long, global = true)]
    url: Option<String>,
    #[arg(long, global = true)]
    user: Option<String>,
    /// Logs at the debug level unless `RUST_LOG` is set.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Creates a table partitioned by string columns.
    CreateTable {
        table: String,
        /// A column in table order.
        #[arg(long = "column", value_name = "NAME:TYPE", required = true, value_parser = parse_column)]
        columns: Vec<(String, String)>,
        #[arg(long = "partition", value_name = "KEY", required = true)]
        partition_keys: Vec<String>,
        /// Prints the statement instead of executing it.
        #[arg(long)]
        dry_run: bool,
    },
    /// Adds a partition to a table.
    AddPartition {
        table: String,
        #[arg(long = "value", value_name = "KEY=VALUE", required = true, value_parser = parse_key_value)]
        values: Vec<(String, String)>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Loads a file into a partition of a table.
    LoadData {
        table: String,
        path: String,
        /// Reads the file from the server's local file system.
        #[arg(long)]
        local: bool,
        #[arg(long = "value", value_name = "KEY=VALUE", required = true, value_parser = parse_key_value)]
        values: Vec<(String, String)>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Runs a query and prints its rows.
    Query {
        sql: String,
        /// A value for the next `?` placeholder. Quote it as `'...'` to force a string.
        #[arg(long = "param", value_name = "VALUE", value_parser = parse_param, allow_hyphen_values = true)]
        params: Vec<Value>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Executes a statement that returns no rows.
    Execute { sql: String },
}

pub fn main(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse_from(args);
    init_telemetry(cli.verbose)?;
    let client = HiveClient::from_config(load_config(&cli)?);

    match cli.command {
        Command::CreateTable {
            table,
            columns,
            partition_keys,
            dry_run,
        } => {
            let spec = TableSpec {
                name: table,
                columns: columns.into_iter().collect(),
                partition_keys,
            };
            let sql = client.create_table_statement(&spec)?;
            run_or_print(&client, &sql, dry_run)?;
        }
        Command::AddPartition {
            table,
            values,
            dry_run,
        } => {
            let partition = values.into_iter().collect::<PartitionSpec>();
            let sql = client.add_partition_statement(&table, &partition)?;
            run_or_print(&client, &sql, dry_run)?;
        }
        Command::LoadData {
            table,
            path,
            local,
            values,
            dry_run,
        } => {
            let partition = values.into_iter().collect::<PartitionSpec>();
            let sql = client.load_data_statement(&table, local, &path, &partition)?;
            run_or_print(&client, &sql, dry_run)?;
        }
        Command::Query {
            sql,
            params,
            format,
        } => {
            let rows = client.execute_query(&sql, &params)?;
            println!("{}", render_rows(&rows, format)?);
        }
        Command::Execute { sql } => {
            client.execute(&sql)?;
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> ClientResult<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(url) = &cli.url {
        config.connection.apply_url(url)?;
    }
    if let Some(user) = &cli.user {
        config.connection.user = user.clone();
    }
    debug!(
        "connecting to {} as {} in database {}",
        config.connection.address(),
        config.connection.user,
        config.connection.database
    );
    Ok(config)
}

fn run_or_print(client: &HiveClient, sql: &str, dry_run: bool) -> ClientResult<()> {
    if dry_run {
        println!("{sql}");
        Ok(())
    } else {
        client.execute(sql)
    }
}
