//! CLI output formatting utilities
//!
//! This module provides consistent output formatting for the `docchat` CLI

use std::io::Write;

use crate::rag::context::truncate_str;
use crate::rag::IndexReport;
use crate::rag::RagResponse;
use crate::session::ConversationTurn;
use crate::session::Role;
use crate::AppConfig;

/// Print a per-file summary of an indexed upload
pub fn print_index_report(report: &IndexReport) {
    for file in &report.files {
        match &file.error {
            None => println!("  📄 {} ({} chars)", file.name, file.characters),
            Some(error) => println!("  ⚠️  {} skipped: {}", file.name, error),
        }
    }
    println!(
        "  {} passages indexed from {} characters",
        report.passages, report.characters
    );
}

/// Print an answer, optionally followed by its source passages
pub fn print_answer(response: &RagResponse, show_sources: bool) {
    if let Some(standalone) = &response.standalone_question {
        println!("   (searched for: {standalone})");
    }
    println!("\n🤖 {}\n", response.answer);

    if show_sources && !response.sources.is_empty() {
        println!("📚 Sources:");
        for (idx, source) in response.sources.iter().enumerate() {
            println!(
                "  {}. [passage {} | similarity {:.2}] {}",
                idx + 1,
                source.position,
                source.score,
                truncate_str(&source.text.replace('\n', " "), 120)
            );
        }
        println!();
    }
}

/// Print the conversation so far
pub fn print_history(turns: &[ConversationTurn]) {
    if turns.is_empty() {
        print_info("No messages yet.");
        return;
    }
    for turn in turns {
        let label = match turn.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
        };
        println!(
            "[{}] {}: {}",
            turn.timestamp.format("%H:%M:%S"),
            label,
            turn.content
        );
    }
}

/// Print configuration (credential masked)
pub fn print_config(config: &AppConfig) {
    let config = config.redacted();
    println!("📋 docchat Configuration:");
    println!("  LLM:");
    println!("    Provider: {:?}", config.llm.provider);
    println!("    Model: {}", config.llm_model());
    println!("    Endpoint: {}", config.llm_endpoint());
    println!("    API key: {}", config.llm.api_key);
    println!("    Temperature: {}", config.llm.temperature);
    println!("    Max tokens: {}", config.llm.max_tokens);
    println!("  Embeddings:");
    println!("    Provider: {:?}", config.embeddings.provider);
    println!("    Model: {}", config.embedding_model());
    println!("    Endpoint: {}", config.embedding_endpoint());
    println!("    Concurrency: {}", config.embeddings.concurrency);
    println!("  Chunking:");
    println!("    Chunk size: {}", config.chunking.chunk_size);
    println!("    Overlap: {}", config.chunking.chunk_overlap);
    println!("  Retrieval:");
    println!("    Top k: {}", config.retrieval.top_k);
    println!("  Generator:");
    println!("    Mode: {:?}", config.generator.mode);
    println!("    Memory turns: {}", config.generator.memory_turns);
    println!("  Upload:");
    println!("    Max file size: {} bytes", config.upload.max_file_bytes);
    println!("    Max files: {}", config.upload.max_files);
    println!("  Server:");
    println!("    Address: {}:{}", config.server.host, config.server.port);
    println!("    Session timeout: {}s", config.server.session_timeout_secs);
    println!("    CORS: {}", config.server.enable_cors);
}

pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_error(msg: &str) {
    println!("❌ {msg}");
}

pub fn print_prompt(msg: &str) {
    print!("{msg}");
    let _ = std::io::stdout().flush();
}
