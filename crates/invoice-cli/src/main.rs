//! Invoice Comparator CLI
//!
//! Command-line tool for comparing two invoice spreadsheets and exporting a
//! highlighted comparison report.

use clap::{Args, Parser, Subcommand};
use invoice_core::{
    compare_files, load_table, write_report, CompareConfig, Comparison, ReportFormat,
    ReportLayout, DEFAULT_REPORT_NAME,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "invoice-cli")]
#[command(about = "Purchase invoice comparator", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two invoices and write a highlighted report
    Compare {
        #[command(flatten)]
        input: InputArgs,

        /// Output file path
        #[arg(short, long, default_value = DEFAULT_REPORT_NAME)]
        output: PathBuf,

        /// Output format (xlsx, csv or json); defaults to the output extension
        #[arg(long)]
        format: Option<String>,

        /// Maximum number of rows to preview
        #[arg(short, long)]
        limit: Option<usize>,

        /// Skip the preview table
        #[arg(long)]
        no_preview: bool,
    },

    /// Compare two invoices and print the comparison table only
    Preview {
        #[command(flatten)]
        input: InputArgs,

        /// Maximum number of rows to display
        #[arg(short, long)]
        limit: Option<usize>,

        /// Only show rows with a discrepancy
        #[arg(long)]
        only_diffs: bool,
    },

    /// Parse and display a single invoice file
    Parse {
        /// Path to invoice file (xlsx, xls, ods or csv)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Create a config file template with the default column names
    CreateConfig {
        /// Output path for the config file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Invoice A (xlsx, xls, ods or csv)
    #[arg(short = 'a', long = "invoice-a")]
    invoice_a: PathBuf,

    /// Invoice B (xlsx, xls, ods or csv)
    #[arg(short = 'b', long = "invoice-b")]
    invoice_b: PathBuf,

    /// Config file with column names (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Key column name
    #[arg(long)]
    key: Option<String>,

    /// Quantity column name
    #[arg(long)]
    quantity: Option<String>,

    /// Price column name
    #[arg(long)]
    price: Option<String>,
}

impl InputArgs {
    fn compare_config(&self) -> invoice_core::Result<CompareConfig> {
        let base = match &self.config {
            Some(path) => CompareConfig::load(path)?,
            None => CompareConfig::default(),
        };
        Ok(base.with_overrides(self.key.clone(), self.quantity.clone(), self.price.clone()))
    }

    fn run(&self) -> invoice_core::Result<Comparison> {
        let config = self.compare_config()?;
        compare_files(&self.invoice_a, &self.invoice_b, &config)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> invoice_core::Result<()> {
    match cli.command {
        Commands::Compare {
            input,
            output,
            format,
            limit,
            no_preview,
        } => cmd_compare(&input, &output, format.as_deref(), limit, no_preview),
        Commands::Preview {
            input,
            limit,
            only_diffs,
        } => cmd_preview(&input, limit, only_diffs),
        Commands::Parse { file } => cmd_parse(&file),
        Commands::CreateConfig { output } => cmd_create_config(&output),
    }
}

fn cmd_compare(
    input: &InputArgs,
    output: &Path,
    format: Option<&str>,
    limit: Option<usize>,
    no_preview: bool,
) -> invoice_core::Result<()> {
    let format = match format {
        Some(f) => f.parse::<ReportFormat>().unwrap_or_else(|e| {
            eprintln!("{}", e);
            std::process::exit(1);
        }),
        None => ReportFormat::from_path(output).unwrap_or(ReportFormat::Xlsx),
    };

    let comparison = input.run()?;

    if !no_preview {
        println!("Comparison Table");
        println!();
        print_comparison(&comparison, limit, false);
        println!();
    }
    print_summary(&comparison);

    let result = write_report(&comparison, output, format)?;
    println!();
    println!(
        "Wrote comparison report ({}, {} rows) to {}",
        result.format,
        result.rows_written,
        result.path.display()
    );
    if result.highlighted_cells > 0 {
        println!("  {} highlighted cells", result.highlighted_cells);
    }

    Ok(())
}

fn cmd_preview(input: &InputArgs, limit: Option<usize>, only_diffs: bool) -> invoice_core::Result<()> {
    let comparison = input.run()?;

    print_comparison(&comparison, limit, only_diffs);
    println!();
    print_summary(&comparison);

    Ok(())
}

fn cmd_parse(file: &Path) -> invoice_core::Result<()> {
    let table = load_table(file)?;

    println!("File: {}", file.display());
    println!("Columns: {}", table.column_count());
    println!("Rows: {}", table.row_count());
    println!();

    // Print header
    let header = table.column_names();
    println!("{}", header.join("\t"));
    println!("{}", "-".repeat(header.len() * 12));

    // Print first 10 rows
    for row in table.rows.iter().take(10) {
        let values: Vec<String> = row.cells.iter().map(|c| c.to_string_value()).collect();
        println!("{}", values.join("\t"));
    }

    if table.row_count() > 10 {
        println!("... ({} more rows)", table.row_count() - 10);
    }

    Ok(())
}

fn cmd_create_config(output: &Path) -> invoice_core::Result<()> {
    let config = CompareConfig::default();
    config.save(output)?;

    println!("Created config file: {}", output.display());
    println!("  key column:      {}", config.key_column);
    println!("  quantity column: {}", config.quantity_column);
    println!("  price column:    {}", config.price_column);
    println!();
    println!("Edit the file to match your invoice headers, then run:");
    println!(
        "  invoice-cli compare -a <invoice_a> -b <invoice_b> --config {}",
        output.display()
    );

    Ok(())
}

fn print_comparison(comparison: &Comparison, limit: Option<usize>, only_diffs: bool) {
    let layout = ReportLayout::new(comparison);

    // Print header
    println!("{}", layout.headers().join("\t"));
    println!("{}", "-".repeat(layout.headers().len() * 12));

    let rows: Vec<_> = if only_diffs {
        comparison.discrepancies().collect()
    } else {
        comparison.records.iter().collect()
    };

    // Print rows
    let row_limit = limit.unwrap_or(rows.len());
    for record in rows.iter().take(row_limit) {
        println!("{}", layout.row_text(record).join("\t"));
    }

    if rows.len() > row_limit {
        println!("... ({} more rows)", rows.len() - row_limit);
    }
}

fn print_summary(comparison: &Comparison) {
    let summary = comparison.summary();
    println!("Summary:");
    println!("  {} compared rows", summary.records);
    println!("  {} with discrepancies", summary.with_discrepancies);
    println!("  {} quantity differences", summary.qty_diffs);
    println!("  {} price differences", summary.price_diffs);
    println!("  {} missing in A", summary.missing_in_a);
    println!("  {} missing in B", summary.missing_in_b);
}
