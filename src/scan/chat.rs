//! Questions about a sample, answered by a hosted chat-completion model.
//!
//! Only the summary of the sample is sent, never the entries. The service is expected to
//! follow the OpenAI streaming protocol: the answer comes back as server-sent events, one
//! `data: {json}` line per chunk, terminated by `data: [DONE]`.

use dialoguer::Input;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

use std::io::{BufRead, BufReader};
use std::time::Duration;

use crate::scan::*;

pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-specdec";
pub const DEFAULT_API_KEY_ENV: &str = "GROQ_API_KEY";
pub const DEFAULT_LANGUAGE: &str = "Spanish";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChatSettings {
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable that holds the API key.
    pub api_key_env: String,
    /// The language of the answers.
    pub language: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        ChatSettings {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

#[derive(Deserialize, Debug)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    error: Option<JSValue>,
}

#[derive(Deserialize, Debug)]
struct ChunkChoice {
    delta: Option<ChunkDelta>,
}

#[derive(Deserialize, Debug)]
struct ChunkDelta {
    content: Option<String>,
}

pub fn build_prompt(summary: &SampleSummary, question: &str, settings: &ChatSettings) -> String {
    format!(
        "You are an electoral analyst. \
         You receive data from a sample of labeled votes in an electoral process. \
         Speak only in {}.\n\n\
         Summarized sample data:\n{}\n\n\
         User question: {}\n\n\
         Provide the best possible answer based on the information above.",
        settings.language,
        summary.describe(),
        question
    )
}

pub fn build_request(summary: &SampleSummary, question: &str, settings: &ChatSettings) -> ChatRequest {
    ChatRequest {
        model: settings.model.clone(),
        messages: vec![
            ChatMessage {
                role: "system".to_string(),
                content: format!("You will only answer in {}", settings.language),
            },
            ChatMessage {
                role: "user".to_string(),
                content: build_prompt(summary, question, settings),
            },
        ],
        stream: true,
    }
}

/// Reads a stream of server-sent events and writes the text of the answer to `sink` as it
/// arrives. Returns the full answer.
pub fn stream_answer<R: BufRead, W: Write>(reader: R, sink: &mut W) -> ScanResult<String> {
    let mut answer = String::new();
    for line_r in reader.lines() {
        let line = line_r.context(ChatStreamSnafu {})?;
        let data = match line.trim().strip_prefix("data:") {
            Some(d) => d.trim(),
            None => {
                // Blank separators, comments and other fields.
                continue;
            }
        };
        if data == "[DONE]" {
            break;
        }
        if data.is_empty() {
            continue;
        }
        let chunk: ChatChunk = serde_json::from_str(data).context(ChatChunkSnafu { line: data })?;
        if let Some(err) = chunk.error {
            return ChatApiSnafu {
                status: 200_u16,
                message: err.to_string(),
            }
            .fail();
        }
        let content = chunk
            .choices
            .first()
            .and_then(|c| c.delta.as_ref())
            .and_then(|d| d.content.as_deref());
        if let Some(content) = content {
            answer.push_str(content);
            sink.write_all(content.as_bytes())
                .context(ChatStreamSnafu {})?;
            sink.flush().context(ChatStreamSnafu {})?;
        }
    }
    debug!("stream_answer: {:?} characters", answer.chars().count());
    Ok(answer)
}

fn check_response(
    resp: reqwest::blocking::Response,
) -> ScanResult<reqwest::blocking::Response> {
    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        return ChatApiSnafu {
            status,
            message: resp.text().unwrap_or_default(),
        }
        .fail();
    }
    Ok(resp)
}

/// Sends one question and streams the answer into `sink`.
pub fn ask<W: Write>(
    settings: &ChatSettings,
    summary: &SampleSummary,
    question: &str,
    sink: &mut W,
) -> ScanResult<String> {
    let api_key = std::env::var(&settings.api_key_env)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .context(MissingApiKeySnafu {
            var: settings.api_key_env.as_str(),
        })?;
    let request = build_request(summary, question, settings);
    info!(
        "ask: sending question to {:?} with model {:?}",
        settings.endpoint, settings.model
    );
    let client = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context(ChatTransportSnafu {})?;
    let resp = client
        .post(&settings.endpoint)
        .bearer_auth(api_key)
        .json(&request)
        .send()
        .context(ChatTransportSnafu {})?;
    let resp = check_response(resp)?;
    stream_answer(BufReader::new(resp), sink)
}

fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(p) => debug!("load_dotenv: loaded {:?}", p),
        Err(e) if e.not_found() => debug!("load_dotenv: no .env file"),
        Err(e) => warn!("Could not load the .env file: {}", e),
    }
}

// Prints the question and its answer. Errors are reported and do not stop the session.
fn answer_one(settings: &ChatSettings, summary: &SampleSummary, question: &str) -> bool {
    println!("\n> {}\n", question);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let res = ask(settings, summary, question, &mut out);
    drop(out);
    match res {
        Ok(_) => {
            println!();
            true
        }
        Err(e) => {
            warn!("answer_one: {:?}", e);
            eprintln!("{}", e.user_message());
            false
        }
    }
}

/// Answers the questions passed on the command line, then the ones typed in the terminal
/// when `interactive` is set.
pub fn ask_questions(
    questions: &[String],
    interactive: bool,
    settings: &ChatSettings,
    summary: &SampleSummary,
) -> ScanResult<()> {
    if questions.is_empty() && !interactive {
        return Ok(());
    }
    load_dotenv();

    let mut failures = 0;
    for q in questions.iter() {
        if !answer_one(settings, summary, q) {
            failures += 1;
        }
    }

    if interactive {
        println!("\nQuestions about the data (empty line to quit)");
        loop {
            let q: String = Input::new()
                .with_prompt("Question")
                .allow_empty(true)
                .interact_text()
                .context(PromptSnafu {})?;
            if q.trim().is_empty() {
                break;
            }
            answer_one(settings, summary, q.trim());
        }
        return Ok(());
    }

    if failures > 0 {
        whatever!("{} question(s) could not be answered", failures);
    }
    Ok(())
}
