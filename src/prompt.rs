//! Prompt assembly for answer generation.

use crate::models::DomainMatches;

/// Render the question and the retrieved context into the prompt sent to
/// the chat model.
///
/// Every configured domain gets a labeled context block, in configuration
/// order, even when retrieval found nothing for it; an empty section tells
/// the model that domain had nothing relevant, which reads differently
/// from the section being absent.
pub fn build_prompt(domains: &[DomainMatches], question: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str("You are an expert assistant answering questions based on documentation.\n");
    prompt.push_str("Use the correct section based on the question.\n\n");

    if let Some(first) = domains.first() {
        prompt.push_str(&format!(
            "You retrieve the answer from the right context. For example: if the \
             question is related to {label}, you will retrieve the answer from the \
             {label} context.\n\n",
            label = first.label
        ));
    }

    prompt.push_str(
        "You retrieve the answer from the right context and then think about the \
         answer and respond to the question as a human would. Explain content in \
         200 words.\n\n",
    );

    for domain in domains {
        let context: Vec<&str> = domain.hits.iter().map(|hit| hit.text.as_str()).collect();
        prompt.push_str(&format!(
            "{} Context:\n{}\n\n",
            domain.label,
            context.join("\n")
        ));
    }

    prompt.push_str(&format!("Question: {question}\n\nAnswer:"));
    prompt
}
