// SPDX-FileCopyrightText: 2026 finbench contributors
//
// SPDX-License-Identifier: MIT

//! Conversational query surface: forwards a user question to the report
//! writer together with the benchmarking insights as context.

use crate::error::UpstreamError;
use crate::narrative::NarrativeClient;

/// How many insight sentences ride along with each question.
const CONTEXT_INSIGHTS: usize = 10;

/// Build the message sent to the report writer for one user question.
pub fn build_chat_prompt(question: &str, insights: &[String]) -> String {
    let context: Vec<&str> = insights
        .iter()
        .take(CONTEXT_INSIGHTS)
        .map(|s| s.as_str())
        .collect();
    format!(
        "{}\n\nHere are financial insights:\n{}",
        question,
        context.join("\n")
    )
}

/// Answer one question about the company's standing.
pub async fn chatbot_response(
    client: &NarrativeClient,
    company_name: &str,
    question: &str,
    insights: &[String],
) -> Result<String, UpstreamError> {
    let prompt = build_chat_prompt(question, insights);
    client.chat(company_name, &prompt).await
}
