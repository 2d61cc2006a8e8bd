//! provenance-db CLI - record datasets and models, query lineage statistics

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use provenance_db::export::{License, MetadataExporter};
use provenance_db::ids;
use provenance_db::record::{DatasetRecord, ModelRecord, TRAINED_ON};
use provenance_db::simulate::{Simulator, DEFAULT_MODEL_COUNT};
use provenance_db::{
    ModelSchema, ProvenanceGraph, ProvenanceStore, StatisticsEngine, StoreConfig,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "provenance-db")]
#[command(version)]
#[command(about = "Track which datasets trained which models")]
#[command(long_about = r#"
provenance-db keeps three append-only CSV tables (datasets, models, edges)
and derives lineage statistics from them.

Example usage:
  provenance-db init
  provenance-db add-dataset --file data/mnist.csv --name MNIST --creator LeCun --license MIT
  provenance-db add-model --name Net1 --params "LR=0.01" --accuracy 0.88 --dataset <dataset-id>
  provenance-db stats
  provenance-db graph > lineage.dot
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding datasets.csv, models.csv and edges.csv
    #[arg(short, long, global = true, env = "PROVENANCE_DATA_DIR", default_value = "database")]
    data_dir: PathBuf,

    /// Model table schema (statistics | provenance)
    #[arg(short, long, global = true, env = "PROVENANCE_MODEL_SCHEMA", default_value = "statistics")]
    schema: ModelSchema,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create any missing tables
    Init,

    /// Record a dataset
    AddDataset {
        /// Dataset file; its SHA-256 becomes the dataset id
        #[arg(short, long, conflicts_with = "id")]
        file: Option<PathBuf>,

        /// Explicit dataset id (when no file is available)
        #[arg(long)]
        id: Option<String>,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Creator
        #[arg(short, long)]
        creator: String,

        /// License label (free text)
        #[arg(short, long)]
        license: String,
    },

    /// Record a model and link it to the datasets it was trained on
    AddModel {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Hyperparameters, e.g. "LR=0.01, Epochs=10"
        #[arg(short, long, default_value = "")]
        params: String,

        /// Accuracy in [0, 1] (statistics schema)
        #[arg(short, long)]
        accuracy: Option<f64>,

        /// Dataset id used for training (repeatable)
        #[arg(short = 'D', long = "dataset", required = true)]
        datasets: Vec<String>,

        /// Edge label
        #[arg(short, long, default_value = TRAINED_ON)]
        relationship: String,
    },

    /// Average accuracy per dataset
    Stats,

    /// Most accurate models
    Top {
        /// Number of models
        #[arg(short = 'n', long, default_value = "3")]
        limit: usize,
    },

    /// Print the lineage graph in Graphviz DOT format
    Graph,

    /// Write a schema.org JSON-LD description of a dataset file
    ExportMetadata {
        /// Dataset file
        #[arg(short, long)]
        file: PathBuf,

        /// Dataset title
        #[arg(short, long)]
        title: String,

        /// Author name
        #[arg(short, long)]
        author: String,

        /// Description
        #[arg(long, default_value = "")]
        description: String,

        /// License key; prompted for when omitted
        #[arg(short, long)]
        license: Option<String>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Generate random models trained on existing datasets
    Simulate {
        /// Number of models to generate
        #[arg(short = 'n', long, default_value_t = DEFAULT_MODEL_COUNT)]
        count: usize,

        /// RNG seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    let config = StoreConfig::builder()
        .data_dir(&cli.data_dir)
        .model_schema(cli.schema)
        .build();
    let store = ProvenanceStore::new(config);

    match cli.command {
        Commands::Init => {
            store.ensure_all_initialized()?;
            println!("✅ Tables ready in {}", cli.data_dir.display());
        }

        Commands::AddDataset {
            file,
            id,
            name,
            creator,
            license,
        } => {
            let record = match (file, id) {
                (Some(file), _) => store
                    .register_dataset_file(&file, &name, &creator, &license)
                    .with_context(|| format!("registering {}", file.display()))?,
                (None, Some(id)) => {
                    let record = DatasetRecord::new(id, name, creator, license);
                    store.append(&record)?;
                    record
                }
                (None, None) => bail!("either --file or --id is required"),
            };
            println!("📦 Dataset '{}' added with ID: {}", record.name(), record.dataset_id());
        }

        Commands::AddModel {
            name,
            params,
            accuracy,
            datasets,
            relationship,
        } => {
            let builder = ModelRecord::builder(ids::new_model_id(), name).params(params);
            let model = match (cli.schema, accuracy) {
                (ModelSchema::Statistics, Some(accuracy)) => builder.accuracy(accuracy).build(),
                (ModelSchema::Statistics, None) => {
                    bail!("--accuracy is required with the statistics schema")
                }
                (ModelSchema::Provenance, _) => {
                    let trained_on = store.dataset_names(&datasets)?;
                    builder.trained_on(&trained_on).build()
                }
            };
            store.record_training(&model, &datasets, &relationship)?;
            println!("🧠 Model '{}' added with ID: {}", model.name(), model.model_id());
            println!("   Linked to {} dataset(s).", datasets.len());
        }

        Commands::Stats => {
            let engine = StatisticsEngine::new(&store);
            let averages = engine.per_dataset_average_accuracy()?;
            if averages.is_empty() {
                println!("∅ No scored training edges found.");
            } else {
                println!("📊 Average Accuracy per Dataset");
                println!("------------------------------------");
                for (dataset, average) in averages {
                    println!("  - {dataset}: {average}");
                }
            }
        }

        Commands::Top { limit } => {
            let engine = StatisticsEngine::new(&store);
            let models = engine.top_models(limit)?;
            if models.is_empty() {
                println!("∅ No scored models found.");
            } else {
                println!("🏆 Top Performing Models");
                for model in models {
                    println!("  - {} (Accuracy: {})", model.name(), model.detail());
                }
            }
        }

        Commands::Graph => {
            let graph = ProvenanceGraph::build(&store)?;
            print!("{}", graph.to_dot());
        }

        Commands::ExportMetadata {
            file,
            title,
            author,
            description,
            license,
            out_dir,
        } => {
            let license = match license {
                Some(key) => key.parse::<License>()?,
                None => License::prompt(io::stdin().lock(), io::stdout())?,
            };
            let exporter = MetadataExporter::new(out_dir);
            let path = exporter.export(&file, &title, &author, &description, license.key())?;
            println!("✅ Metadata saved to: {}", path.display());
        }

        Commands::Simulate { count, seed } => {
            let mut simulator = match seed {
                Some(seed) => Simulator::with_seed(&store, seed),
                None => Simulator::new(&store),
            };
            println!("🎲 Generating {count} random models...");
            simulator.run(count)?;

            let engine = StatisticsEngine::new(&store);
            println!("\n🏆 Top Performing Models:");
            for model in engine.top_models(3)? {
                println!("  - {} (Accuracy: {})", model.name(), model.detail());
            }
            println!("\n📊 Average Accuracy per Dataset:");
            for (dataset, average) in engine.per_dataset_average_accuracy()? {
                println!("  - {dataset}: {average}");
            }
        }
    }

    Ok(())
}
