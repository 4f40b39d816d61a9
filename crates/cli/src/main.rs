//! Five-stage pipeline simulator CLI.
//!
//! This binary provides a single entry point for the simulator. It performs:
//! 1. **Run:** Load a program image, run it to halt or a cycle limit, and print
//!    the final registers and statistics.
//! 2. **Disassemble:** List a program image with addresses and mnemonics.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;

use pipesim_core::config::{BranchResolution, Config};
use pipesim_core::isa::disasm::disassemble;
use pipesim_core::sim::{RunOutcome, Simulator, loader};

#[derive(Parser, Debug)]
#[command(
    name = "pipesim",
    author,
    version,
    about = "Cycle-level five-stage pipeline simulator",
    long_about = "Run an RV32I program image through a five-stage pipeline with forwarding, load-use stalls, and branch flushes.\n\nExamples:\n  pipesim run -f program.bin\n  pipesim run -f program.hex --branch-resolution execute --no-forwarding\n  pipesim disasm -f program.hex"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a program image until it halts (ECALL/EBREAK) or hits the cycle limit.
    Run {
        /// Program image: raw little-endian binary, or a `.hex` word listing.
        #[arg(short, long)]
        file: PathBuf,

        /// JSON configuration file; command-line flags override it.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Emit per-stage trace events.
        #[arg(long)]
        trace: bool,

        /// Stage that resolves control transfers.
        #[arg(long, value_enum)]
        branch_resolution: Option<Placement>,

        /// Disable the bypass network; hazards interlock until commit.
        #[arg(long)]
        no_forwarding: bool,

        /// Stop after this many cycles.
        #[arg(long)]
        max_cycles: Option<u64>,

        /// Comma-separated statistics sections to print (summary, hazards, instruction_mix).
        #[arg(long, value_delimiter = ',')]
        stats: Vec<String>,
    },

    /// Disassemble a program image.
    Disasm {
        /// Program image: raw little-endian binary, or a `.hex` word listing.
        #[arg(short, long)]
        file: PathBuf,

        /// Address of the first word.
        #[arg(long, default_value_t = 0, value_parser = parse_addr)]
        base: u32,
    },
}

/// Command-line spelling of the branch resolution stage.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Placement {
    Decode,
    Execute,
}

impl From<Placement> for BranchResolution {
    fn from(p: Placement) -> Self {
        match p {
            Placement::Decode => Self::Decode,
            Placement::Execute => Self::Execute,
        }
    }
}

fn parse_addr(s: &str) -> Result<u32, String> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let radix = if digits.len() == s.len() { 10 } else { 16 };
    u32::from_str_radix(digits, radix).map_err(|e| e.to_string())
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            file,
            config,
            trace,
            branch_resolution,
            no_forwarding,
            max_cycles,
            stats,
        } => {
            let mut config = load_config(config.as_deref());
            config.general.trace |= trace;
            if let Some(p) = branch_resolution {
                config.pipeline.branch_resolution = p.into();
            }
            if no_forwarding {
                config.pipeline.forwarding = false;
            }
            if let Some(n) = max_cycles {
                config.general.max_cycles = n;
            }
            init_tracing(config.general.trace);
            cmd_run(&file, &config, &stats);
        }
        Commands::Disasm { file, base } => {
            init_tracing(false);
            cmd_disasm(&file, base);
        }
    }
}

/// Installs the log subscriber; `RUST_LOG` wins over `--trace`.
fn init_tracing(trace: bool) {
    let default = if trace { "trace" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Config {
    let Some(path) = path else {
        return Config::default();
    };
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|text| Config::from_json(&text).map_err(|e| e.to_string()));
    parsed.unwrap_or_else(|e| {
        eprintln!("[!] FATAL: bad config '{}': {e}", path.display());
        process::exit(1);
    })
}

/// Loads the program, runs it, and prints registers and statistics.
///
/// Exits with code 1 on a load failure or a pipeline protocol violation, and
/// with code 2 when the cycle limit is reached before the program halts.
fn cmd_run(file: &Path, config: &Config, stats: &[String]) {
    let program = loader::load_binary(file).unwrap_or_else(|e| {
        eprintln!("[!] FATAL: {e}");
        process::exit(1);
    });
    let mut sim = Simulator::from_config(config, &program).unwrap_or_else(|e| {
        eprintln!("[!] FATAL: {e}");
        process::exit(1);
    });

    let active = sim.config();
    println!("[*] Running {}", file.display());
    println!(
        "  Branch resolution: {:?}  Forwarding: {}  Start PC: {:#x}",
        active.pipeline.branch_resolution, active.pipeline.forwarding, active.general.start_pc
    );
    let max_cycles = active.general.max_cycles;

    let code = match sim.run(max_cycles) {
        Ok(RunOutcome::Halted { cycles }) => {
            println!("\n[*] Halted after {cycles} cycles");
            0
        }
        Ok(RunOutcome::CycleLimit { cycles }) => {
            println!("\n[!] Cycle limit reached after {cycles} cycles");
            2
        }
        Err(e) => {
            error!("pipeline protocol violation: {e}");
            eprintln!("\n[!] FATAL: {e}");
            1
        }
    };

    print!("{}", sim.core.regs().dump());
    sim.core.stats.print_sections(stats);
    process::exit(code);
}

fn cmd_disasm(file: &Path, base: u32) {
    let program = loader::load_binary(file).unwrap_or_else(|e| {
        eprintln!("[!] FATAL: {e}");
        process::exit(1);
    });
    for (i, chunk) in program.chunks_exact(4).enumerate() {
        let word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        let addr = base.wrapping_add(4 * i as u32);
        println!("{addr:08x}:  {word:08x}  {}", disassemble(word));
    }
}
