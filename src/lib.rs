//! # Startup Research
//!
//! Ingests loosely-structured JSON research records about startups,
//! normalizes them into a single SQLite table, and serves them back as
//! console reports, JSON exports, an HTTP API, and LLM-backed answers to
//! natural-language questions.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────┐
//! │ Result files │──▶│  Normalize   │──▶│  SQLite  │
//! │ JSON / prose │   │ alias table  │   │ startups │
//! └──────────────┘   └──────────────┘   └────┬─────┘
//!                                            │
//!                   ┌────────────┬───────────┼────────────┐
//!                   ▼            ▼           ▼            ▼
//!              ┌────────┐  ┌──────────┐ ┌────────┐  ┌───────────┐
//!              │  CLI   │  │  Export  │ │  HTTP  │  │ Analytics │
//!              │ (srdb) │  │  (JSON)  │ │ (axum) │  │   (LLM)   │
//!              └────────┘  └──────────┘ └────────┘  └───────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! srdb init                         # create database
//! srdb ingest research_results.json # ingest one file
//! srdb ingest all                   # ingest every known result file
//! srdb list --industry fin
//! srdb ask "Which sectors are best funded?"
//! srdb serve                        # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Record types and list codec |
//! | [`normalize`] | Alias resolution into the canonical record |
//! | [`sources`] | Result-file discovery |
//! | [`ingest`] | Parsing, recovery, and per-record inserts |
//! | [`list`] / [`get`] | Reading records back |
//! | [`stats`] | Aggregate statistics |
//! | [`export`] | Timestamped JSON export |
//! | [`completion`] | Completion service client |
//! | [`analytics`] | Prompt building and question answering |
//! | [`server`] | HTTP API |
//! | [`db`] / [`migrate`] | Store connection and schema |

pub mod analytics;
pub mod completion;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod get;
pub mod ingest;
pub mod list;
pub mod migrate;
pub mod models;
pub mod normalize;
pub mod server;
pub mod sources;
pub mod stats;
