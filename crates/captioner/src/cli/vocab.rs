//! The `captioner vocab` command: build and summarize the vocabulary.

use std::path::PathBuf;

use clap::Args;
use captioner_core::{Config, Vocabulary};

/// Arguments for the `vocab` command.
#[derive(Args, Debug)]
pub struct VocabArgs {
    /// Caption corpus to read (overrides model.captions_path)
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    /// Number of most frequent words to list
    #[arg(long, default_value_t = 20)]
    pub top: usize,
}

pub async fn execute(args: VocabArgs, config: Config) -> anyhow::Result<()> {
    let corpus = args.corpus.unwrap_or_else(|| config.captions_path());
    let normalization = config.vocabulary.normalization;

    let load_path = corpus.clone();
    let vocab = tokio::task::spawn_blocking(move || {
        Vocabulary::from_corpus_file(&load_path, normalization)
    })
    .await??;

    print!("{}", summarize(&vocab, &corpus, args.top));
    Ok(())
}

fn summarize(vocab: &Vocabulary, corpus: &std::path::Path, top: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("Corpus:      {}\n", corpus.display()));
    out.push_str(&format!("Words:       {}\n", vocab.len()));
    out.push_str(&format!("Cardinality: {}\n", vocab.cardinality()));
    out.push_str(&format!("Start index: {}\n", vocab.start_id()));
    out.push_str(&format!("End index:   {}\n", vocab.end_id()));
    out.push_str(&format!("Hash:        {}\n", vocab.content_hash()));

    if top > 0 {
        out.push_str(&format!("\nTop {} words:\n", top.min(vocab.len())));
        for (i, word) in vocab.words().iter().take(top).enumerate() {
            out.push_str(&format!("{:>6}  {}\n", i + 1, word));
        }
    }
    out
}
