mod logging;
mod output;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use sketch2code_codegen::document::react_bundle;
use sketch2code_codegen::{GenerationPipeline, SubmissionInput};
use sketch2code_core::config::{Config, GenerationConfig};
use sketch2code_core::types::ComponentMode;

#[derive(Parser)]
#[command(
    name = "sketch2code",
    about = "Turn UI sketches into HTML, CSS and React with a vision model",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate code from a sketch or an image
    Generate {
        /// What the design should be
        #[arg(short, long)]
        description: String,

        /// Image file or data URI (takes precedence over --sketch)
        #[arg(short, long)]
        image: Option<String>,

        /// Saved canvas snapshot (JSON) to rasterize
        #[arg(short, long)]
        sketch: Option<PathBuf>,

        /// full-page, button, card or form
        #[arg(short, long)]
        mode: Option<String>,

        /// Remote service base URL (posts to {endpoint}/api/generate)
        #[arg(long)]
        endpoint: Option<String>,

        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the result instead of writing files
        #[arg(long)]
        print: bool,
    },

    /// Rasterize a saved canvas snapshot to PNG
    Render {
        /// Snapshot JSON
        #[arg(short, long)]
        sketch: PathBuf,

        /// Output PNG path
        #[arg(short, long, default_value = "sketch.png")]
        out: PathBuf,
    },

    /// List component modes
    Modes,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show provider and generation settings
    Status,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Get a specific config value
    Get { key: String },
    /// Check the configuration for problems
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(Config::config_path);
    let mut config = Config::load(&config_path)?;

    logging::init(config.logging.as_ref(), cli.verbose);

    match cli.command {
        Commands::Generate {
            description,
            image,
            sketch,
            mode,
            endpoint,
            out,
            print,
        } => {
            if let Some(endpoint) = endpoint {
                config
                    .generation
                    .get_or_insert_with(GenerationConfig::default)
                    .endpoint = Some(endpoint);
            }
            let mode = mode
                .as_deref()
                .map(ComponentMode::parse_lenient)
                .unwrap_or_else(|| config.default_mode());

            let mut input = SubmissionInput::new(description).with_mode(mode);
            if let Some(image) = image {
                input = input.with_upload(output::load_image(&image)?);
            }
            if let Some(sketch) = sketch {
                let raster = output::render_sketch(&config, &sketch)?;
                input = input.with_canvas(raster.to_data_uri());
            }

            let pipeline = GenerationPipeline::from_config(&config)?;
            tracing::info!(
                transport = %pipeline.transport_name(),
                mode = %mode,
                timeout_secs = pipeline.timeout().as_secs(),
                "Generating code"
            );

            let result = match pipeline.submit(&input).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::debug!(error = %e, "Generation error detail");
                    anyhow::bail!("{}", e.user_message());
                }
            };

            if print {
                println!("<!-- HTML -->\n{}\n", result.html);
                println!("/* CSS */\n{}", result.css);
                if result.has_react() {
                    println!("\n/* React */\n{}", react_bundle(&result.react_component, &result.react_css));
                }
            } else {
                let dir = out.unwrap_or_else(output::default_output_dir);
                for path in output::write_result(&dir, &result)? {
                    println!("{}", path.display());
                }
            }
        }
        Commands::Render { sketch, out } => {
            let raster = output::render_sketch(&config, &sketch)?;
            std::fs::write(&out, &raster.png)
                .with_context(|| format!("writing {}", out.display()))?;
            println!("{} ({}x{})", out.display(), raster.width, raster.height);
        }
        Commands::Modes => {
            for mode in ComponentMode::ALL {
                println!("{:<10} {:<10} {}", mode.as_str(), mode.label(), mode.description());
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let json = serde_json::to_string_pretty(&config)?;
                println!("{json}");
            }
            ConfigAction::Get { key } => match config.get_path(&key) {
                Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                None => anyhow::bail!("{key} is not set"),
            },
            ConfigAction::Validate => {
                let (warnings, errors) = config.validate();
                for warning in &warnings {
                    println!("warning: {warning}");
                }
                for error in &errors {
                    println!("error: {error}");
                }
                if !errors.is_empty() {
                    anyhow::bail!("{} configuration error(s)", errors.len());
                }
                println!("Config OK: {}", config_path.display());
            }
        },
        Commands::Status => {
            let provider = config.provider();
            println!("Sketch2Code v{}", env!("CARGO_PKG_VERSION"));
            println!("Config: {}", config_path.display());
            println!("Provider: {} ({})", provider.id, provider.model());
            println!(
                "API key: {}",
                if provider.resolve_api_key().is_some() {
                    "configured"
                } else if provider.requires_api_key() {
                    "missing"
                } else {
                    "not required"
                }
            );
            match config.endpoint() {
                Some(endpoint) => println!("Transport: http ({endpoint}/api/generate)"),
                None => println!("Transport: in-process"),
            }
            println!("Timeout: {}s", config.timeout_secs());
            println!("Default mode: {}", config.default_mode());
            println!(
                "Output: {}",
                if config.react_output() {
                    "HTML/CSS + React"
                } else {
                    "HTML/CSS"
                }
            );
        }
    }

    Ok(())
}
