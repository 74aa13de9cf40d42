//! CLI commands for Floodgate using clap.

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use crate::config::Config;
use crate::core::{
    evaluate, normalize_content, normalize_latency, normalize_priority, render, SignalSnapshot,
};
use crate::store::Store;

/// Floodgate - traffic governance for multi-agent AI systems.
#[derive(Parser)]
#[command(name = "floodgate")]
#[command(version)]
#[command(about = "Dam the flood: buffer agent chatter while the network is congested", long_about = None)]
pub struct Cli {
    /// Path to the SQLite governance database
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show current governance status
    Status,

    /// Buffer a thought for later synthesis
    Buffer {
        /// Thought content
        thought: String,

        /// Agent ID
        #[arg(long, default_value = "main")]
        agent: String,

        /// Priority (P0/P1/P2)
        #[arg(long, default_value = "P1")]
        priority: String,
    },

    /// Flush buffered thoughts and print the synthesis prompt
    Flush {
        /// Agent ID
        #[arg(long, default_value = "main")]
        agent: String,

        /// Flush every agent with a pending backlog
        #[arg(long)]
        all: bool,
    },

    /// Halt the system (buffer everything)
    Halt,

    /// Resume normal operations (clear halt, forced buffering, and simulated latency)
    Resume,

    /// Force buffering on (manual override)
    Force,

    /// Set simulated network latency
    Simulate {
        /// Latency in milliseconds (0 clears, negative clamps to 0)
        ms: i64,
    },

    /// Record a measured latency sample
    RecordLatency {
        /// Latency in milliseconds (negative clamps to 0)
        ms: i64,
    },

    /// Show recent synthesis events
    History {
        /// Agent ID
        #[arg(long, default_value = "main")]
        agent: String,

        /// Maximum events to show
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Show version
    Version,
}

impl Cli {
    /// Run the command.
    pub async fn run(self, config: Config) -> Result<()> {
        let config = match self.db {
            Some(db) => config.with_db_path(db),
            None => config,
        };

        match self.command {
            Command::Status => cmd_status(&config, self.json).await,
            Command::Buffer {
                thought,
                agent,
                priority,
            } => cmd_buffer(&config, &thought, &agent, &priority, self.json).await,
            Command::Flush { agent, all } => cmd_flush(&config, &agent, all).await,
            Command::Halt => cmd_halt(&config).await,
            Command::Resume => cmd_resume(&config).await,
            Command::Force => cmd_force(&config).await,
            Command::Simulate { ms } => cmd_simulate(&config, ms).await,
            Command::RecordLatency { ms } => cmd_record_latency(&config, ms, self.json).await,
            Command::History { agent, limit } => {
                cmd_history(&config, &agent, limit, self.json).await
            }
            Command::Version => cmd_version(&config, self.json).await,
        }
    }
}

// Command implementations

#[derive(Serialize)]
struct StatusReport {
    pending: i64,
    halted: bool,
    forced_buffering: bool,
    simulated_ms: i64,
    buffering: bool,
    reason: String,
    avg_latency_ms: i64,
    max_latency_ms: i64,
    threshold_ms: i64,
}

async fn cmd_status(config: &Config, json: bool) -> Result<()> {
    let store = Store::open(&config.db_path)?;

    let pending = store.pending_count(None)?;
    let halted = store.is_halted()?;
    let forced = store.is_forced_buffering()?;
    let simulated = store.simulated_latency()?;
    let avg_latency = store.average_latency(config.window_minutes)?;
    let max_latency = store.max_latency(config.window_minutes)?;

    let state = SignalSnapshot {
        avg_latency_ms: avg_latency,
        max_latency_ms: max_latency,
        threshold_ms: config.threshold_ms,
        forced,
        simulated_ms: simulated,
        halted,
    };
    let verdict = evaluate(&state);

    if json {
        let report = StatusReport {
            pending,
            halted,
            forced_buffering: forced,
            simulated_ms: simulated,
            buffering: verdict.buffering,
            reason: verdict.reason,
            avg_latency_ms: avg_latency,
            max_latency_ms: max_latency,
            threshold_ms: config.threshold_ms,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if verdict.buffering {
        println!("  Status: BUFFERING ({})", verdict.reason);
    } else {
        println!("  Status: NORMAL ({})", verdict.reason);
    }
    println!("  Pending: {} thoughts", pending);
    println!(
        "  Latency: avg {}ms / max {}ms (threshold: {}ms)",
        avg_latency, max_latency, config.threshold_ms
    );

    if halted {
        println!();
        println!("  SYSTEM HALTED");
    }
    if forced {
        println!("  Forced buffering enabled");
    }
    if simulated > 0 {
        println!("  Simulated latency: {}ms", simulated);
    }

    Ok(())
}

#[derive(Serialize)]
struct BufferReport {
    ok: bool,
    id: i64,
    agent: String,
    priority: String,
}

async fn cmd_buffer(
    config: &Config,
    thought: &str,
    agent: &str,
    priority: &str,
    json: bool,
) -> Result<()> {
    let content = normalize_content(thought)?;
    let priority = normalize_priority(priority)?;

    let store = Store::open(&config.db_path)?;
    let id = store.insert_thought(agent, "cli", "", &content, priority)?;
    tracing::info!("Buffered thought {} for agent {}", id, agent);

    if json {
        let report = BufferReport {
            ok: true,
            id,
            agent: agent.to_string(),
            priority: priority.to_string(),
        };
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    println!(
        "  Buffered thought (id: {}, priority: {}, agent: {})",
        id, priority, agent
    );
    Ok(())
}

async fn cmd_flush(config: &Config, agent: &str, all: bool) -> Result<()> {
    let mut store = Store::open(&config.db_path)?;

    if all {
        let agents = store.pending_agents()?;
        if agents.is_empty() {
            println!("  No pending thoughts to flush");
            return Ok(());
        }
        for agent in agents {
            let thoughts = store.pending_thoughts(&agent)?;
            if thoughts.is_empty() {
                continue;
            }
            println!();
            println!("  === Agent: {} ===", agent);
            println!();
            let prompt = render(&thoughts);
            println!("{}", prompt);
            let count = store.mark_synthesized(&agent, &prompt)?;
            tracing::info!("Synthesized {} thoughts for agent {}", count, agent);
        }
        return Ok(());
    }

    let thoughts = store.pending_thoughts(agent)?;
    if thoughts.is_empty() {
        println!("  No pending thoughts for agent: {}", agent);
        return Ok(());
    }

    let prompt = render(&thoughts);
    println!("{}", prompt);

    let count = store.mark_synthesized(agent, &prompt)?;
    tracing::info!("Synthesized {} thoughts for agent {}", count, agent);
    println!();
    println!("  Synthesized {} thoughts", count);
    Ok(())
}

async fn cmd_halt(config: &Config) -> Result<()> {
    let store = Store::open(&config.db_path)?;
    store.set_halted(true)?;
    tracing::warn!("System halted");

    println!("  SYSTEM HALTED");
    println!("  All messages will be buffered until resume");
    Ok(())
}

async fn cmd_resume(config: &Config) -> Result<()> {
    let store = Store::open(&config.db_path)?;
    store.set_halted(false)?;
    store.set_forced_buffering(false)?;
    store.set_simulated_latency(0)?;
    tracing::info!("System resumed");

    println!("  System RESUMED");
    println!("  Normal operations restored");
    Ok(())
}

async fn cmd_force(config: &Config) -> Result<()> {
    let store = Store::open(&config.db_path)?;
    store.set_forced_buffering(true)?;
    tracing::warn!("Forced buffering enabled");

    println!("  Forced buffering ENABLED");
    println!("  Use 'floodgate resume' to clear");
    Ok(())
}

async fn cmd_simulate(config: &Config, ms: i64) -> Result<()> {
    let ms = normalize_latency(ms);

    let store = Store::open(&config.db_path)?;
    store.set_simulated_latency(ms)?;

    if ms == 0 {
        println!("  Simulated latency cleared");
    } else {
        println!("  Simulated latency set to {}ms", ms);
        if ms > config.threshold_ms {
            println!("  This will trigger buffering");
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct RecordLatencyReport {
    ok: bool,
    latency_ms: i64,
}

async fn cmd_record_latency(config: &Config, ms: i64, json: bool) -> Result<()> {
    let ms = normalize_latency(ms);

    let store = Store::open(&config.db_path)?;
    store.record_latency(ms)?;

    if json {
        let report = RecordLatencyReport {
            ok: true,
            latency_ms: ms,
        };
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    println!("  Recorded latency: {}ms", ms);
    Ok(())
}

async fn cmd_history(config: &Config, agent: &str, limit: usize, json: bool) -> Result<()> {
    let store = Store::open(&config.db_path)?;
    let events = store.synthesis_events(agent, limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    if events.is_empty() {
        println!("  No synthesis events for agent: {}", agent);
        return Ok(());
    }

    println!("  Synthesis history for agent: {}", agent);
    for event in events {
        println!(
            "  [{}] {} thoughts (event {})",
            event.triggered_at, event.thoughts_count, event.id
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct VersionReport {
    version: &'static str,
}

async fn cmd_version(config: &Config, json: bool) -> Result<()> {
    if json {
        let report = VersionReport {
            version: config.version,
        };
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    println!("  floodgate v{}", config.version);
    println!("  traffic governance for multi-agent systems");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Priority;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            version: "0.0.0-test",
            db_path: temp_dir.path().join("governance.db"),
            threshold_ms: 5000,
            window_minutes: 1,
        }
    }

    #[test]
    fn test_parses_buffer_command() {
        let cli = Cli::try_parse_from([
            "floodgate", "buffer", "hello", "--agent", "scout", "--priority", "P0",
        ])
        .unwrap();

        match cli.command {
            Command::Buffer {
                thought,
                agent,
                priority,
            } => {
                assert_eq!(thought, "hello");
                assert_eq!(agent, "scout");
                assert_eq!(priority, "P0");
            }
            _ => panic!("expected buffer command"),
        }
    }

    #[test]
    fn test_parses_global_flags() {
        let cli =
            Cli::try_parse_from(["floodgate", "status", "--json", "--db", "/tmp/g.db"]).unwrap();

        assert!(cli.json);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/g.db")));
    }

    #[test]
    fn test_rejects_missing_subcommand() {
        assert!(Cli::try_parse_from(["floodgate"]).is_err());
    }

    #[test]
    fn test_rejects_non_numeric_latency() {
        assert!(Cli::try_parse_from(["floodgate", "simulate", "abc"]).is_err());
    }

    #[tokio::test]
    async fn test_buffer_flush_cycle() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        cmd_buffer(&config, "first thought", "main", "P1", false)
            .await
            .unwrap();
        cmd_buffer(&config, "urgent thought", "main", "P0", false)
            .await
            .unwrap();

        let store = Store::open(&config.db_path).unwrap();
        assert_eq!(store.pending_count(Some("main")).unwrap(), 2);
        drop(store);

        cmd_flush(&config, "main", false).await.unwrap();

        let store = Store::open(&config.db_path).unwrap();
        assert_eq!(store.pending_count(Some("main")).unwrap(), 0);
        let events = store.synthesis_events("main", 10).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].thoughts_count, 2);
        assert!(events[0].final_output.contains("urgent thought"));
    }

    #[tokio::test]
    async fn test_buffer_rejects_invalid_priority() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        assert!(cmd_buffer(&config, "thought", "main", "p0", false)
            .await
            .is_err());
        assert!(cmd_buffer(&config, "thought", "main", "P9", false)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_buffer_rejects_empty_content() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        assert!(cmd_buffer(&config, "   \t ", "main", "P1", false)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_halt_resume_cycle() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        cmd_halt(&config).await.unwrap();
        cmd_force(&config).await.unwrap();
        cmd_simulate(&config, 9000).await.unwrap();

        let store = Store::open(&config.db_path).unwrap();
        assert!(store.is_halted().unwrap());
        assert!(store.is_forced_buffering().unwrap());
        assert_eq!(store.simulated_latency().unwrap(), 9000);
        drop(store);

        cmd_resume(&config).await.unwrap();

        let store = Store::open(&config.db_path).unwrap();
        assert!(!store.is_halted().unwrap());
        assert!(!store.is_forced_buffering().unwrap());
        assert_eq!(store.simulated_latency().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_simulate_clamps_negative() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        cmd_simulate(&config, -500).await.unwrap();

        let store = Store::open(&config.db_path).unwrap();
        assert_eq!(store.simulated_latency().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_record_latency_clamps_negative() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        cmd_record_latency(&config, -100, false).await.unwrap();
        cmd_record_latency(&config, 400, false).await.unwrap();

        let store = Store::open(&config.db_path).unwrap();
        assert_eq!(store.average_latency(1).unwrap(), 200);
        assert_eq!(store.max_latency(1).unwrap(), 400);
    }

    #[tokio::test]
    async fn test_flush_all_covers_every_agent() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let store = Store::open(&config.db_path).unwrap();
        store
            .insert_thought("alpha", "cli", "", "one", Priority::Normal)
            .unwrap();
        store
            .insert_thought("beta", "cli", "", "two", Priority::Normal)
            .unwrap();
        drop(store);

        cmd_flush(&config, "main", true).await.unwrap();

        let store = Store::open(&config.db_path).unwrap();
        assert_eq!(store.pending_count(None).unwrap(), 0);
        assert_eq!(store.synthesis_events("alpha", 10).unwrap().len(), 1);
        assert_eq!(store.synthesis_events("beta", 10).unwrap().len(), 1);
    }
}
