//! Toronto safety plan RAG
//!
//! Retrieval-augmented generation of personal safety plans for Toronto
//! neighbourhoods, built on crawled police and city safety pages:
//! - Corpus filtering, chunking and indexing into Pinecone
//! - Two-pass plan generation (analysis, then synthesis) with cited sources
//! - An evaluation harness with LLM-judged metrics and experiment tracking

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
