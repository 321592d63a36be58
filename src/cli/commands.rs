use crate::domain::entities::document::DocumentMetadata;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "localmem", about = "Local document memory for prompt enhancement")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Embed a document and add it to the store
    Add {
        /// Document text
        text: String,
        /// Provenance tag stored with the document (defaults to the `source` key
        /// of `--meta`, then `user_provided`)
        #[arg(long)]
        source: Option<String>,
        /// Extra metadata as a JSON object
        #[arg(long)]
        meta: Option<String>,
    },
    /// Rank stored documents by similarity to a query
    Query {
        text: String,
        #[arg(long, default_value = "5")]
        k: usize,
    },
    /// Retrieve context and summarize history for a task, side by side
    Context {
        /// Task description
        task: String,
        /// Conversation history line (repeatable)
        #[arg(long = "history")]
        history: Vec<String>,
        /// Skip the chat-model relevance check
        #[arg(long)]
        no_gate: bool,
    },
    /// Rewrite a prompt with retrieved context
    Enhance {
        prompt: String,
        /// Skip the chat-model relevance check
        #[arg(long)]
        no_gate: bool,
    },
    /// Show store statistics
    Stats,
}

impl Commands {
    /// Whether the command asked to bypass the relevance gate.
    pub fn skips_gate(&self) -> bool {
        matches!(
            self,
            Commands::Context { no_gate: true, .. } | Commands::Enhance { no_gate: true, .. }
        )
    }
}

/// Builds the metadata for `add` from `--source` and the raw `--meta` JSON.
pub fn add_metadata(source: Option<String>, meta: Option<&str>) -> Result<DocumentMetadata, String> {
    let extra = meta
        .map(serde_json::from_str)
        .transpose()
        .map_err(|e| format!("--meta is not valid JSON: {e}"))?;
    DocumentMetadata::from_json(source, extra)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_with_meta() {
        let cli = Cli::try_parse_from(["localmem", "add", "hello", "--source", "notes", "--meta", "{\"lang\":\"rust\"}"]).unwrap();
        match cli.command {
            Commands::Add { text, source, meta } => {
                assert_eq!(text, "hello");
                assert_eq!(source.as_deref(), Some("notes"));
                assert_eq!(meta.as_deref(), Some("{\"lang\":\"rust\"}"));
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_parse_context_history_and_gate() {
        let cli = Cli::try_parse_from(["localmem", "context", "task", "--history", "a", "--history", "b", "--no-gate"]).unwrap();
        assert!(cli.command.skips_gate());
        match cli.command {
            Commands::Context { history, .. } => assert_eq!(history, vec!["a", "b"]),
            _ => panic!("expected context"),
        }
    }

    #[test]
    fn test_query_default_k() {
        let cli = Cli::try_parse_from(["localmem", "query", "q"]).unwrap();
        assert!(!cli.command.skips_gate());
        assert!(matches!(cli.command, Commands::Query { k: 5, .. }));
    }

    #[test]
    fn test_add_source_comes_from_meta_when_flag_absent() {
        let cli = Cli::try_parse_from(["localmem", "add", "hello", "--meta", "{\"source\":\"wiki\",\"lang\":\"rust\"}"]).unwrap();
        let Commands::Add { source, meta, .. } = cli.command else {
            panic!("expected add");
        };
        assert_eq!(source, None);
        let metadata = add_metadata(source, meta.as_deref()).unwrap();
        assert_eq!(metadata.source, "wiki");
        assert!(!metadata.extra.contains_key("source"));

        let explicit = add_metadata(Some("notes".into()), meta.as_deref()).unwrap();
        assert_eq!(explicit.source, "notes");
        assert_eq!(add_metadata(None, None).unwrap().source, "user_provided");
        assert!(add_metadata(None, Some("{oops")).is_err());
    }
}
