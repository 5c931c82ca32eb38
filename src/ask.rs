//! Question answering over the ingested documentation.

use std::io::Write;

use anyhow::Result;

use crate::config::Config;
use crate::gemini::GeminiClient;
use crate::prompt::build_prompt;
use crate::qdrant::QdrantStore;
use crate::search::{best_source, retrieve_all};

/// Shown when no retrieved chunk carried a source URL.
const NO_SOURCE: &str = "No relevant source found";

const EMPTY_PROMPT_HINT: &str = "Enter a query to get started.";

/// Retrieve context for the question, generate an answer, and return it
/// together with the most relevant source URL.
pub async fn answer_query(
    config: &Config,
    gemini: &GeminiClient,
    store: &QdrantStore,
    question: &str,
) -> Result<(String, String)> {
    let domains = config.select_domains(None)?;
    let results = retrieve_all(gemini, store, &domains, question, config.search.top_k).await?;

    let source = best_source(&results)
        .map(|(source, _)| source)
        .unwrap_or_else(|| NO_SOURCE.to_string());

    let prompt = build_prompt(&results, question);
    let answer = gemini.generate(&prompt).await?;
    Ok((answer, source))
}

/// `chai ask`: answer one question, or read questions line by line when
/// none is given.
pub async fn run_ask(config: &Config, question: Option<String>) -> Result<()> {
    match question {
        Some(question) => {
            if question.trim().is_empty() {
                println!("{EMPTY_PROMPT_HINT}");
                return Ok(());
            }
            let gemini = GeminiClient::from_env(&config.gemini)?;
            let store = QdrantStore::new(&config.qdrant)?;
            let (answer, source) = answer_query(config, &gemini, &store, question.trim()).await?;
            print_answer(&answer, &source);
            Ok(())
        }
        None => run_repl(config).await,
    }
}

/// Interactive loop: one question per line. A failed question prints the
/// error and keeps the loop alive; only a missing API key at startup is
/// fatal.
async fn run_repl(config: &Config) -> Result<()> {
    let gemini = GeminiClient::from_env(&config.gemini)?;
    let store = QdrantStore::new(&config.qdrant)?;

    let labels: Vec<&str> = config.domains.iter().map(|d| d.label.as_str()).collect();
    println!("chai docs assistant ({}). Ctrl-D to exit.", labels.join(", "));

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            println!();
            break;
        }

        let question = line.trim();
        if question.is_empty() {
            println!("{EMPTY_PROMPT_HINT}");
            continue;
        }

        match answer_query(config, &gemini, &store, question).await {
            Ok((answer, source)) => print_answer(&answer, &source),
            Err(e) => eprintln!("Error: {e:#}"),
        }
    }
    Ok(())
}

fn print_answer(answer: &str, source: &str) {
    println!("--- Answer ---");
    println!("{}", answer.trim());
    println!();
    println!("--- Source ---");
    println!("{}", source);
}
