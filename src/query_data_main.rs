//! Asks the indexed documents a single question from the command line.
//!
//! ```bash
//! query-data "How long is the warranty?"
//! query-data "How long is the warranty?" --k 3 --score-mode normalized
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde_json::Value;

use rag_query::core::config::{validate_profile, AppPaths, ConfigService};
use rag_query::core::logging;
use rag_query::query::{QueryResponse, RetrievalProfile};
use rag_query::rag::{Metadata, ScoreMode};
use rag_query::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "query-data", about = "Query the document index and compare answers")]
struct Args {
    /// The question to ask.
    query_text: String,

    /// Number of chunks to retrieve (defaults to `retrieval.cli.k`).
    #[arg(long)]
    k: Option<usize>,

    /// How to report the best match's score (defaults to `retrieval.cli.score_mode`).
    #[arg(long, value_enum)]
    score_mode: Option<ScoreModeArg>,

    /// Path to a config file to use instead of the discovered `config.yml`.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScoreModeArg {
    Normalized,
    Raw,
}

impl From<ScoreModeArg> for ScoreMode {
    fn from(arg: ScoreModeArg) -> Self {
        match arg {
            ScoreModeArg::Normalized => ScoreMode::Normalized,
            ScoreModeArg::Raw => ScoreMode::Raw,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init_cli();

    let paths = Arc::new(AppPaths::new());
    let config_service = match args.config {
        Some(path) => ConfigService::with_config_path(paths, path),
        None => ConfigService::new(paths),
    };
    let state = AppState::initialize(config_service)
        .await
        .context("Failed to initialize the query pipeline")?;

    let profile = resolve_profile(state.config.retrieval.cli, args.k, args.score_mode)?;

    let response = state
        .pipeline
        .run(Some(args.query_text.as_str()), profile)
        .await
        .context("Query failed")?;

    print!("{}", render(&response));
    Ok(())
}

/// Applies `--k` / `--score-mode` over the configured profile and checks the
/// result against the same bounds as the config file.
fn resolve_profile(
    defaults: RetrievalProfile,
    k: Option<usize>,
    score_mode: Option<ScoreModeArg>,
) -> anyhow::Result<RetrievalProfile> {
    let profile = RetrievalProfile::new(
        k.unwrap_or(defaults.k),
        score_mode.map(ScoreMode::from).unwrap_or(defaults.score_mode),
    );
    validate_profile("retrieval.cli", &profile).context("Invalid --k override")?;
    Ok(profile)
}

fn render(response: &QueryResponse) -> String {
    let score_label = match response.score_mode {
        ScoreMode::Normalized => "Accuracy Score",
        ScoreMode::Raw => "Score",
    };

    format!(
        "\n===== General Response =====\n{}\n\
         \n===== RAG Response (Based on Retrieved Context) =====\n{}\n\
         \n===== Exact Chunk from Database =====\n\
         Content: {}\n\
         Metadata: {}\n\
         {}: {}\n",
        response.general_response,
        response.rag_response,
        response.exact_chunk,
        render_metadata(&response.exact_chunk_metadata),
        score_label,
        response.accuracy_score,
    )
}

fn render_metadata(metadata: &Metadata) -> String {
    if metadata.is_empty() {
        return "{}".to_string();
    }
    let fields = metadata
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) => format!("{key}: {s}"),
            other => format!("{key}: {other}"),
        })
        .collect::<Vec<_>>();
    format!("{{{}}}", fields.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(score_mode: ScoreMode) -> QueryResponse {
        let mut metadata = Metadata::new();
        metadata.insert("page".to_string(), json!(2));
        metadata.insert("source".to_string(), json!("manual.pdf"));
        QueryResponse {
            general_response: "Usually a year.".to_string(),
            rag_response: "Two years.".to_string(),
            exact_chunk: "The warranty lasts two years.".to_string(),
            exact_chunk_metadata: metadata,
            accuracy_score: 0.5,
            score_mode,
        }
    }

    #[test]
    fn render_prints_sections_in_order() {
        let out = render(&response(ScoreMode::Raw));
        let general = out.find("===== General Response =====").unwrap();
        let rag = out
            .find("===== RAG Response (Based on Retrieved Context) =====")
            .unwrap();
        let chunk = out.find("===== Exact Chunk from Database =====").unwrap();
        assert!(general < rag && rag < chunk);
        assert!(out.contains("Content: The warranty lasts two years.\n"));
        assert!(out.contains("Metadata: {page: 2, source: manual.pdf}\n"));
        assert!(out.contains("Score: 0.5\n"));
    }

    #[test]
    fn normalized_mode_labels_accuracy() {
        let out = render(&response(ScoreMode::Normalized));
        assert!(out.contains("Accuracy Score: 0.5\n"));
    }

    #[test]
    fn args_accept_overrides() {
        let args = Args::try_parse_from([
            "query-data",
            "what?",
            "--k",
            "3",
            "--score-mode",
            "normalized",
        ])
        .unwrap();
        assert_eq!(args.query_text, "what?");
        assert_eq!(args.k, Some(3));
        assert!(matches!(args.score_mode, Some(ScoreModeArg::Normalized)));
        assert!(args.config.is_none());
    }

    #[test]
    fn overrides_replace_configured_profile() {
        let defaults = RetrievalProfile::new(5, ScoreMode::Raw);

        let kept = resolve_profile(defaults, None, None).unwrap();
        assert_eq!(kept, defaults);

        let overridden = resolve_profile(defaults, Some(3), Some(ScoreModeArg::Normalized)).unwrap();
        assert_eq!(overridden, RetrievalProfile::new(3, ScoreMode::Normalized));
    }

    #[test]
    fn out_of_range_k_override_is_rejected() {
        let defaults = RetrievalProfile::new(5, ScoreMode::Raw);
        assert!(resolve_profile(defaults, Some(0), None).is_err());

        let err = resolve_profile(defaults, Some(100_000), None).unwrap_err();
        assert!(format!("{err:#}").contains("between 1 and 100"));
    }

    #[test]
    fn args_require_query_text() {
        assert!(Args::try_parse_from(["query-data"]).is_err());
    }
}
