//! Chat over local files from the terminal

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;

use crate::cli::output::*;
use crate::documents::UploadedFile;
use crate::errors::DocChatError;
use crate::rag::RagService;
use crate::session::Session;
use crate::AppConfig;
use crate::Result;

/// One line typed at the chat prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Ask(String),
    Upload(Vec<PathBuf>),
    Clear,
    Export(Option<PathBuf>),
    History,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

impl ChatCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let Some(command) = line.strip_prefix('/') else {
            return Self::Ask(line.to_string());
        };

        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default();
        match name {
            "quit" | "exit" | "q" => Self::Quit,
            "clear" => Self::Clear,
            "history" => Self::History,
            "help" | "?" => Self::Help,
            "export" => Self::Export(parts.next().map(PathBuf::from)),
            "upload" | "load" => Self::Upload(parts.map(PathBuf::from).collect()),
            _ => Self::Unknown(name.to_string()),
        }
    }
}

/// Interactive chat loop
pub async fn handle_chat(config: &AppConfig, files: &[PathBuf]) -> Result<()> {
    println!("💬 docchat");
    println!("==========\n");

    let rag = Arc::new(RagService::new(config)?);
    let mut session = Session::new(rag);

    upload(&mut session, files).await;
    print_chat_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt("\nYou: ");
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match ChatCommand::parse(&line) {
            ChatCommand::Empty => {}
            ChatCommand::Quit => break,
            ChatCommand::Help => print_chat_help(),
            ChatCommand::Ask(question) => match session.ask(&question).await {
                Ok(response) => print_answer(&response, false),
                Err(DocChatError::EmptyIndex) => {
                    print_info(&DocChatError::EmptyIndex.user_message());
                }
                Err(e) => {
                    tracing::debug!("Question failed: {}", e);
                    print_error(&e.user_message());
                }
            },
            ChatCommand::Upload(paths) if paths.is_empty() => {
                print_warning("Usage: /upload <file> [file...]");
            }
            ChatCommand::Upload(paths) => upload(&mut session, &paths).await,
            ChatCommand::Clear => {
                session.clear();
                print_success("Chat history and documents cleared. Use /upload to add documents.");
            }
            ChatCommand::History => print_history(session.history().turns()),
            ChatCommand::Export(path) => match export(&session, path.as_deref()) {
                Ok(path) => print_success(&format!("Chat history saved to {}", path.display())),
                Err(e) => print_error(&e.user_message()),
            },
            ChatCommand::Unknown(name) => {
                print_warning(&format!("Unknown command /{name}. Type /help for commands."));
            }
        }
    }

    println!("\n👋 Goodbye!");
    Ok(())
}

/// Answer one question and exit
pub async fn handle_ask(
    config: &AppConfig,
    files: &[PathBuf],
    question: &str,
    show_sources: bool,
) -> Result<()> {
    let rag = Arc::new(RagService::new(config)?);
    let mut session = Session::new(rag);

    let loaded = read_files(files);
    if loaded.is_empty() {
        return Err(DocChatError::EmptyDocument);
    }

    println!("📚 Indexing {} file(s)...", loaded.len());
    let report = session.upload(loaded).await?;
    print_index_report(&report);

    println!("\n❓ {question}");
    let response = session.ask(question).await?;
    print_answer(&response, show_sources);
    Ok(())
}

async fn upload(session: &mut Session, paths: &[PathBuf]) {
    let files = read_files(paths);
    if files.is_empty() {
        print_warning("No documents loaded. Use /upload <file> to add some.");
        return;
    }

    println!("📚 Processing {} document(s)...", files.len());
    match session.upload(files).await {
        Ok(report) => {
            print_index_report(&report);
            print_success("Documents processed successfully!");
        }
        Err(e) => {
            tracing::debug!("Upload failed: {}", e);
            print_error(&e.user_message());
        }
    }
}

/// Read files from disk, reporting and skipping the unreadable ones
fn read_files(paths: &[PathBuf]) -> Vec<UploadedFile> {
    paths
        .iter()
        .filter_map(|path| match UploadedFile::from_path(path) {
            Ok(file) => Some(file),
            Err(e) => {
                print_error(&format!("Cannot read {}: {}", path.display(), e));
                None
            }
        })
        .collect()
}

fn export(session: &Session, path: Option<&Path>) -> Result<PathBuf> {
    let export = session.export()?;
    let path = path.map_or_else(|| PathBuf::from(&export.filename), Path::to_path_buf);
    std::fs::write(&path, export.bytes)?;
    Ok(path)
}

fn print_chat_help() {
    println!("\nAsk a question about your documents, or use a command:");
    println!("  /upload <file>...  Replace the loaded documents");
    println!("  /history           Show the conversation");
    println!("  /export [path]     Save the conversation as CSV");
    println!("  /clear             Clear the conversation and documents");
    println!("  /quit              Exit");
}
