// SPDX-FileCopyrightText: 2026 finbench contributors
//
// SPDX-License-Identifier: MIT

//! Remote narrative collaborators: a report-writer service (OpenAI-compatible
//! chat completions) and a market-research service. The local pipeline never
//! depends on these for correctness; they consume its output as context and
//! their failures surface as [`UpstreamError`] after retries are exhausted.
//!
//! Responses are cached per company name through an injectable cache so
//! concurrent runs and tests can isolate state.

use rand::Rng;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::env;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::time::sleep;

use crate::error::UpstreamError;

const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_CAP_SECS: u64 = 60;

const GROQ_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const PERPLEXITY_CHAT_URL: &str = "https://api.perplexity.ai/chat/completions";
const REPORT_MODEL: &str = "deepseek-r1-distill-llama-70b";
const RESEARCH_MODEL: &str = "sonar-pro";

/// Process-lifetime cache for narrative responses, keyed by company name.
pub trait ReportCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: String);
}

/// In-memory cache with optional TTL.
pub struct MemoryCache {
    ttl: Option<Duration>,
    entries: Mutex<HashMap<String, (Instant, String)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            ttl: None,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap();
        let (stored_at, value) = entries.get(key)?;
        if let Some(ttl) = self.ttl {
            if stored_at.elapsed() > ttl {
                return None;
            }
        }
        Some(value.clone())
    }

    fn put(&self, key: &str, value: String) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (Instant::now(), value));
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Client for both narrative collaborators. Holds the HTTP client, the API
/// keys, and the injected response cache.
pub struct NarrativeClient {
    client: Client,
    groq_api_key: String,
    perplexity_api_key: String,
    cache: Box<dyn ReportCache>,
}

impl NarrativeClient {
    pub fn new(
        groq_api_key: String,
        perplexity_api_key: String,
        cache: Box<dyn ReportCache>,
    ) -> Self {
        Self {
            client: Client::new(),
            groq_api_key,
            perplexity_api_key,
            cache,
        }
    }

    /// Build a client from `GROQ_API_KEY` / `PERPLEXITY_API_KEY`.
    pub fn from_env(cache: Box<dyn ReportCache>) -> Result<Self, UpstreamError> {
        let groq = env::var("GROQ_API_KEY").map_err(|_| UpstreamError::MissingApiKey {
            service: "report writer",
            env_var: "GROQ_API_KEY",
        })?;
        let perplexity =
            env::var("PERPLEXITY_API_KEY").map_err(|_| UpstreamError::MissingApiKey {
                service: "market research",
                env_var: "PERPLEXITY_API_KEY",
            })?;
        Ok(Self::new(groq, perplexity, cache))
    }

    /// Market-context narrative for a company. Cached per company name.
    pub async fn market_report(&self, company_name: &str) -> Result<String, UpstreamError> {
        let cache_key = format!("market:{}", company_name);
        if let Some(cached) = self.cache.get(&cache_key) {
            return Ok(cached);
        }

        let prompt = format!(
            "Do market research for the business named {} in the CPG sector, and the \
             Food & Beverage vertical. Be specific and use specific examples and references. \
             Include the following information: Company Summary, Product Offering, Market \
             Opportunity, Target Markets and size, Similarly-sized Competitors, Sales and \
             Growth, Distribution Channels, Customer Retention and Conversion, Financial \
             Performance, Competitive Advantage. Also make recommendations for additional \
             Target Markets, Distribution Channels, and general growth opportunities. Keep \
             in mind the company's size, financials, and industry position.",
            company_name
        );

        let payload = json!({
            "model": RESEARCH_MODEL,
            "messages": [
                { "role": "system", "content": system_prompt(company_name) },
                { "role": "user", "content": prompt },
            ],
            "max_tokens": 2000,
            "temperature": 0.01,
            "search_recency_filter": "month",
        });

        let raw = self
            .post_chat(
                "market research",
                PERPLEXITY_CHAT_URL,
                &self.perplexity_api_key,
                &payload,
            )
            .await?;
        let report = clean_narrative(&raw);

        self.cache.put(&cache_key, report.clone());
        Ok(report)
    }

    /// Industry-average narrative built from peer statement texts. Cached
    /// per company name.
    pub async fn industry_report(
        &self,
        company_name: &str,
        peer_statements: &[String],
    ) -> Result<String, UpstreamError> {
        let cache_key = format!("industry:{}", company_name);
        if let Some(cached) = self.cache.get(&cache_key) {
            return Ok(cached);
        }

        let mut prompt = String::from(
            "Given the following income statements from different companies, treat them \
             together as the industry. Summarize what the industry averages look like for \
             revenue, growth trend, profit, expenses, and net income. Present the result \
             as a single professional industry report without mentioning individual \
             companies.\n\n",
        );
        for (i, doc) in peer_statements.iter().enumerate() {
            prompt.push_str(&format!("Income Statement {}: {}\n\n", i + 2, doc));
        }

        let report = self.groq_chat(company_name, &prompt, 3000).await?;
        self.cache.put(&cache_key, report.clone());
        Ok(report)
    }

    /// Standing analysis: company vs industry benchmarks, with the market
    /// report as additional context. Not cached (inputs vary per run).
    pub async fn standing_analysis(
        &self,
        company_name: &str,
        company_statement: &str,
        industry_averages: &str,
        market_report: &str,
    ) -> Result<String, UpstreamError> {
        let prompt = format!(
            "Analyze {company}'s performance compared to industry benchmarks. Create a \
             markdown table titled \"Key Metrics vs. Industry Benchmarks\" with columns \
             Metric, {company}, Industry Average, and Verdict (Outperforming, On par, or \
             Underperforming), covering Quarterly Revenue Growth, Gross Margin, and Net \
             Profit Margin. Then list key strengths and weaknesses under \"Operational \
             Highlights\", and give 3 strategic recommendations.\n\
             Company Data: {statement}\n\
             Industry Averages: {industry}\n\
             Market Report: {market}",
            company = company_name,
            statement = company_statement,
            industry = industry_averages,
            market = market_report,
        );

        self.groq_chat(company_name, &prompt, 5000).await
    }

    /// One free-form exchange with the report writer, used by the chat
    /// surface.
    pub async fn chat(
        &self,
        company_name: &str,
        user_message: &str,
    ) -> Result<String, UpstreamError> {
        self.groq_chat(company_name, user_message, 1500).await
    }

    async fn groq_chat(
        &self,
        company_name: &str,
        user_prompt: &str,
        max_tokens: u32,
    ) -> Result<String, UpstreamError> {
        let payload = json!({
            "model": REPORT_MODEL,
            "messages": [
                { "role": "system", "content": system_prompt(company_name) },
                { "role": "user", "content": user_prompt },
            ],
            "temperature": 0.01,
            "max_tokens": max_tokens,
        });

        let raw = self
            .post_chat("report writer", GROQ_CHAT_URL, &self.groq_api_key, &payload)
            .await?;
        Ok(strip_think_blocks(&raw).trim().to_string())
    }

    /// POST one chat-completions payload with up to three attempts and
    /// randomized exponential backoff between them.
    async fn post_chat(
        &self,
        service: &'static str,
        url: &str,
        api_key: &str,
        payload: &serde_json::Value,
    ) -> Result<String, UpstreamError> {
        let mut last_error = String::new();

        for attempt in 1..=MAX_ATTEMPTS {
            match self.try_post_chat(service, url, api_key, payload).await {
                Ok(content) => return Ok(content),
                Err(e) => {
                    last_error = e.to_string();
                    if attempt < MAX_ATTEMPTS {
                        let delay = backoff_delay(attempt);
                        eprintln!(
                            "⚠️  {} attempt {} failed: {}. Retrying in {}s...",
                            service,
                            attempt,
                            last_error,
                            delay.as_secs()
                        );
                        sleep(delay).await;
                    }
                }
            }
        }

        Err(UpstreamError::RetriesExhausted {
            service,
            attempts: MAX_ATTEMPTS,
            last_error,
        })
    }

    async fn try_post_chat(
        &self,
        service: &'static str,
        url: &str,
        api_key: &str,
        payload: &serde_json::Value,
    ) -> Result<String, UpstreamError> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(payload)
            .send()
            .await
            .map_err(|e| UpstreamError::BadResponse {
                service,
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::BadResponse {
                service,
                detail: format!("status {}: {}", status, body),
            });
        }

        let parsed: ChatResponse =
            response.json().await.map_err(|e| UpstreamError::BadResponse {
                service,
                detail: e.to_string(),
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(UpstreamError::BadResponse {
                service,
                detail: "empty choices array".to_string(),
            })
    }
}

/// Randomized exponential backoff: 1s up to 2^attempt seconds, capped at 60.
fn backoff_delay(attempt: u32) -> Duration {
    let cap = (1u64 << attempt.min(6)).min(BACKOFF_CAP_SECS);
    let secs = rand::thread_rng().gen_range(1..=cap.max(1));
    Duration::from_secs(secs)
}

fn system_prompt(company_name: &str) -> String {
    format!(
        "You are an intelligent financial assistant. You answer the user's question based \
         on the company's financial data, and you always return the answer in proper \
         Markdown that renders with react-markdown and remark-gfm. Do not use headers \
         larger than h4. Separate sections with a blank line. Denote all amounts in USD \
         with a dollar sign. The company is named {} in the CPG sector, and the Food & \
         Beverage vertical.",
        company_name
    )
}

/// Remove markdown decoration and citation markers from research output.
fn clean_narrative(text: &str) -> String {
    let without_decoration: String = text
        .chars()
        .filter(|c| !matches!(c, '*' | '#'))
        .collect();
    strip_citations(&without_decoration)
}

/// Drop `[n]` citation markers left by the research service.
fn strip_citations(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if c == '[' {
            let rest = &text[idx + 1..];
            if let Some(close) = rest.find(']') {
                let inner = &rest[..close];
                if !inner.is_empty() && inner.chars().all(|d| d.is_ascii_digit()) {
                    // Skip past the closing bracket.
                    for _ in 0..=close {
                        chars.next();
                    }
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// The report model emits `<think>...</think>` scratchpads; drop them.
fn strip_think_blocks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("<think>") {
        out.push_str(&rest[..start]);
        match rest[start..].find("</think>") {
            Some(end) => rest = &rest[start + end + "</think>".len()..],
            None => return out, // unterminated block: drop the tail
        }
    }
    out.push_str(rest);
    out
}
