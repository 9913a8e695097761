use clap::Parser as ClapParser;
use grubsim::{Defaults, EmitOptions, Netlist, Target, compile_document};
use miette::{IntoDiagnostic, Result, bail};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(ClapParser, Debug)]
#[command(
    name = "grubsim",
    about = "Compile a gate-level netlist into a self-running simulator script"
)]
struct Cli {
    /// Runtime to generate for (supported: grub)
    target: String,

    /// Netlist JSON document (Yosys `write_json` format)
    file: PathBuf,

    /// Document with a `default_values` table overriding initial values
    #[arg(long)]
    defaults: Option<PathBuf>,

    /// Comma-separated signals to print each cycle, in order
    #[arg(long, value_delimiter = ',')]
    print: Option<Vec<String>>,

    /// Print a blank line before each cycle's trace
    #[arg(long)]
    new_line: bool,

    /// Do not toggle `clk` at the end of each cycle
    #[arg(long)]
    no_cycle: bool,

    /// Replace the bundled primitive library with the contents of this file
    #[arg(long)]
    preamble: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            cycle_clock: !self.no_cycle,
            trace_selection: self.print.clone(),
            blank_line_before_trace: self.new_line,
        }
    }
}

/// Compile every module and write the scripts to `out`. Returns the names of
/// the modules that failed, after reporting each on stderr.
fn run(cli: &Cli, out: &mut impl Write) -> Result<Vec<String>> {
    let target = cli.target.parse::<Target>().into_diagnostic()?;

    let defaults = match &cli.defaults {
        Some(path) => Defaults::from_json(&fs::read_to_string(path).into_diagnostic()?)
            .into_diagnostic()?,
        None => Defaults::empty(),
    };
    let preamble = match &cli.preamble {
        Some(path) => Some(fs::read_to_string(path).into_diagnostic()?),
        None => None,
    };
    let netlist = Netlist::from_json(&fs::read_to_string(&cli.file).into_diagnostic()?)
        .into_diagnostic()?;

    let dialect = target.dialect(preamble);
    let options = cli.emit_options();
    let results = compile_document(&netlist, &defaults, &*dialect, &options);

    let mut failed = Vec::new();
    let mut first = true;
    for result in results {
        match result.script {
            Ok(script) => {
                if !first {
                    writeln!(out).into_diagnostic()?;
                }
                first = false;
                out.write_all(script.as_bytes()).into_diagnostic()?;
            }
            Err(e) => {
                eprintln!("error: {e}");
                failed.push(result.name);
            }
        }
    }
    log::info!(
        "compiled {} module(s) for {}, {} failed",
        netlist.modules.len() - failed.len(),
        dialect.name(),
        failed.len()
    );
    Ok(failed)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        clilog::init_stderr_color_debug();
    }

    let stdout = io::stdout();
    let failed = run(&cli, &mut stdout.lock())?;
    if !failed.is_empty() {
        bail!("Failed to compile module(s): {}", failed.join(", "));
    }
    Ok(())
}
