//! panakeia CLI: ontology-backed medical concept recommendations.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::Result;

use panakeia::error::RecommendError;
use panakeia::explain;
use panakeia::graph::rank::rank_by_degree;
use panakeia::graph::related::related_concepts;
use panakeia::llm::{LlmClient, LlmConfig};
use panakeia::ontology::Ontology;
use panakeia::recommend::Recommender;
use panakeia::repl;
use panakeia::term::TermId;

#[derive(Parser)]
#[command(name = "panakeia", version, about = "Ontology-backed medical concept recommendations")]
struct Cli {
    /// Path to a Turtle ontology file.
    #[arg(long, global = true, default_value = "ontology.owl")]
    ontology: PathBuf,

    /// Use the bundled demo ontology instead of a file.
    #[arg(long, global = true)]
    demo: bool,

    /// Ontology namespace IRI; overrides the document's default prefix.
    #[arg(long, global = true)]
    namespace: Option<String>,

    /// Base URL of the OpenAI-compatible chat API.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Model used for concept classification.
    #[arg(long, global = true)]
    classify_model: Option<String>,

    /// Model used for explanation enhancement.
    #[arg(long, global = true)]
    explain_model: Option<String>,

    /// Chat request timeout in seconds.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// TOML config file with an [llm] table.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive question loop.
    Repl,

    /// One-shot question: classify free text, then recommend or fall back.
    Ask {
        /// Free-form question or concept description.
        text: String,
    },

    /// Ranked recommendations for a concept label.
    Recommend {
        /// Concept label (exact or case-insensitive).
        label: String,
    },

    /// Templated explanation of how two concepts relate. No API key needed.
    Explain {
        /// First concept label.
        a: String,
        /// Second concept label.
        b: String,
    },

    /// List concepts related to a concept.
    Related {
        /// Concept label.
        label: String,

        /// Restrict to one predicate (local name, or a full IRI).
        #[arg(long)]
        via: Option<String>,
    },

    /// Resolve a label to a declared concept and show its details.
    Resolve {
        /// Concept label (exact or case-insensitive).
        label: String,
    },

    /// List the declared concepts.
    Concepts {
        /// Order by descending relation degree instead of declaration order.
        #[arg(long)]
        by_degree: bool,
    },

    /// Show ontology statistics.
    Info,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let ontology = if cli.demo {
        Ontology::bundled_demo()
    } else {
        Ontology::from_turtle_path(&cli.ontology, cli.namespace.as_deref())?
    };

    match &cli.command {
        Commands::Repl => {
            let client = LlmClient::new(llm_config(&cli)?)?;
            repl::run(&ontology, &client)?;
        }

        Commands::Ask { text } => {
            let client = LlmClient::new(llm_config(&cli)?)?;
            let recommender = Recommender::new(&ontology, &client, &client);

            match recommender.resolve_input(text)? {
                Some(concept) => {
                    let recommendations = recommender.recommend(concept)?;
                    println!("{}", repl::render_recommendations(&recommendations));
                }
                None => {
                    let response = client.unknown_concept_reply(text)?;
                    println!("\nResponse:\n{response}");
                }
            }
        }

        Commands::Recommend { label } => {
            let client = LlmClient::new(llm_config(&cli)?)?;
            let recommender = Recommender::new(&ontology, &client, &client);
            let recommendations = recommender.recommend_label(label)?;
            println!("{}", repl::render_recommendations(&recommendations));
        }

        Commands::Explain { a, b } => {
            let concept_a = resolve(&ontology, a)?;
            let concept_b = resolve(&ontology, b)?;
            println!("{}", explain::explain(&ontology, concept_a, concept_b));
        }

        Commands::Related { label, via } => {
            let concept = resolve(&ontology, label)?;
            let predicate = via.as_deref().map(|p| {
                if p.contains("://") {
                    ontology.intern(p)
                } else {
                    ontology.predicate(p)
                }
            });

            let related = related_concepts(ontology.store(), concept, predicate);
            if related.is_empty() {
                println!("No related concepts.");
            } else {
                println!("Related concepts ({}):", related.len());
                for other in &related {
                    println!("  {}", ontology.local_name(*other));
                }
            }
        }

        Commands::Resolve { label } => {
            let concept = resolve(&ontology, label)?;
            println!("Concept: \"{}\"", ontology.local_name(concept));
            println!("  iri:    {}", ontology.iri(concept));
            println!("  degree: {}", ontology.store().degree(concept));
        }

        Commands::Concepts { by_degree } => {
            let mut concepts = ontology.concepts();
            if *by_degree {
                concepts = rank_by_degree(ontology.store(), concepts);
            }

            if concepts.is_empty() {
                println!("No concepts declared.");
            } else {
                println!("Concepts ({}):", concepts.len());
                for concept in &concepts {
                    println!(
                        "  {} (degree {})",
                        ontology.local_name(*concept),
                        ontology.store().degree(*concept)
                    );
                }
            }
        }

        Commands::Info => {
            println!("{}", ontology.info());
        }
    }

    Ok(())
}

/// Environment defaults, overlaid by the config file, overlaid by flags.
fn llm_config(cli: &Cli) -> Result<LlmConfig> {
    let mut config = LlmConfig::from_env();
    if let Some(path) = &cli.config {
        config.merge_file(path)?;
    }
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(classify_model) = &cli.classify_model {
        config.classify_model = classify_model.clone();
    }
    if let Some(explain_model) = &cli.explain_model {
        config.explain_model = explain_model.clone();
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        config.timeout_secs = timeout_secs;
    }
    Ok(config)
}

fn resolve(ontology: &Ontology, label: &str) -> Result<TermId> {
    let concept = ontology
        .resolve_concept(label)
        .ok_or_else(|| RecommendError::UnknownConcept {
            label: label.to_string(),
        })?;
    Ok(concept)
}
