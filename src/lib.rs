#![doc = "stats-backfill: one-off importers and site history reconstruction for the game-stats archive."]

//! Disposable batch tools feeding the archive: two importers that forward
//! records from the public stats API to the internal ingestion endpoint, and
//! a rebuild pipeline that replays site snapshot events as git commits.
//!
//! Each subcommand is a straight fetch → transform → submit/commit run with
//! no state of its own; everything durable lives in the ingestion service or
//! in the target git repository.

pub mod cli;
pub mod gitrepo;
pub mod importers;
pub mod ingest;
pub mod load_config;
pub mod prettify;
pub mod site;
pub mod site_history;
pub mod stats;
pub mod timeline;
