//! Bosque kernel CLI - Jupyter kernel for the Bosque language.

mod colors;
mod highlight;
mod info;
mod install;
mod run;
mod serve;

use std::path::PathBuf;
use std::time::Duration;

use bosque_core::compile::BridgeConfig;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bosque-kernel")]
#[command(about = "Jupyter kernel for the Bosque language")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Bosque compiler executable (overrides BOSQUE_KERNEL_COMPILER)
    #[arg(long, global = true)]
    compiler: Option<String>,

    /// JavaScript runtime executable (overrides BOSQUE_KERNEL_RUNTIME)
    #[arg(long, global = true)]
    runtime: Option<String>,

    /// Per-process timeout in seconds, 0 disables it (overrides BOSQUE_KERNEL_TIMEOUT_SECS)
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve notebook requests on stdin/stdout
    Serve {
        /// Jupyter connection file (accepted for kernel.json compatibility)
        #[arg(long)]
        connection_file: Option<PathBuf>,
    },

    /// Compile and run a Bosque source file once
    Run {
        /// Path to the source (.bsq file)
        source: String,
    },

    /// Print a Bosque source file with syntax highlighting
    Highlight {
        /// Path to the source (.bsq file), `-` for stdin
        source: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "ansi")]
        format: highlight::Format,
    },

    /// Install the Jupyter kernel spec
    Install {
        /// Kernels directory (default: the user's Jupyter data directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Show kernel metadata and resolved tools
    Info,
}

impl Cli {
    /// Bridge configuration from the environment, overridden by flags.
    fn bridge_config(&self) -> BridgeConfig {
        let mut config = BridgeConfig::from_env();
        if let Some(compiler) = &self.compiler {
            config = config.with_compiler(compiler.clone());
        }
        if let Some(runtime) = &self.runtime {
            config = config.with_runtime(runtime.clone());
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout((secs > 0).then(|| Duration::from_secs(secs)));
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for protocol and program output
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Helper to format bosque-core errors with recovery hints
    let format_error = |err: anyhow::Error| -> anyhow::Error {
        if let Some(core_err) = err.downcast_ref::<bosque_core::Error>() {
            anyhow::anyhow!("{}", core_err.with_hint())
        } else if let Some(bosque_kernel::KernelError::Core(core_err)) =
            err.downcast_ref::<bosque_kernel::KernelError>()
        {
            anyhow::anyhow!("{}", core_err.with_hint())
        } else {
            err
        }
    };

    let config = cli.bridge_config();

    match cli.command {
        Commands::Serve { connection_file } => {
            serve::execute(connection_file.as_deref(), config)
                .await
                .map_err(format_error)?;
        }

        Commands::Run { source } => {
            run::execute(&source, config).await.map_err(format_error)?;
        }

        Commands::Highlight { source, format } => {
            highlight::execute(&source, format).map_err(format_error)?;
        }

        Commands::Install { dir } => {
            install::execute(dir).map_err(format_error)?;
        }

        Commands::Info => info::execute(&config).map_err(format_error)?,
    }

    Ok(())
}
