//! Operator CLI (§6 exit codes): `status`, `cancel`, `reindex`,
//! `sweep-secrets`. Talks to a freshly bootstrapped [`AppContext`]
//! directly rather than over HTTP, the same way the lane workers do.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rag_domain::error::Error;
use rag_domain::value_objects::DocumentState;
use rag_infrastructure::config::ConfigLoader;
use rag_infrastructure::{bootstrap, logging, AppContext};

#[derive(Parser)]
#[command(name = "ragctl", about = "Operator CLI for the ingestion/retrieval core")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a document's current ingestion status.
    Status {
        /// `bucket/key` identifying the document.
        document: String,
    },
    /// Request cooperative cancellation of a running job.
    Cancel {
        /// Job id to stop.
        job: String,
        /// Owner principal the job is recorded under.
        #[arg(long)]
        owner: String,
    },
    /// Re-embed a subset of a document's chunks.
    Reindex {
        /// `bucket/key` identifying the document.
        document: String,
        /// Chunk ids to re-embed.
        chunks: Vec<String>,
        #[arg(long)]
        owner: String,
        #[arg(long)]
        job_id: String,
        #[arg(long)]
        embedding_model: String,
    },
    /// Delete secret parcels with no corresponding live document.
    SweepSecrets,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_dir = std::env::var("RAG_CONFIG_DIR").unwrap_or_else(|_| "config".to_owned());
    let config = match ConfigLoader::new(config_dir).load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration: {e}");
            return ExitCode::from(1);
        }
    };
    logging::init(config.logging.format, &config.logging.level);

    let ctx = match bootstrap(config).await {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("failed to bootstrap: {e}");
            return ExitCode::from(1);
        }
    };

    let result = match cli.command {
        Command::Status { document } => run_status(&ctx, &document).await,
        Command::Cancel { job, owner } => run_cancel(&ctx, &owner, &job).await,
        Command::Reindex {
            document,
            chunks,
            owner,
            job_id,
            embedding_model,
        } => run_reindex(&ctx, &owner, &job_id, &document, &embedding_model, &chunks).await,
        Command::SweepSecrets => run_sweep_secrets(&ctx).await,
    };

    match result {
        Ok(()) => ExitCode::from(0),
        Err(e) => exit_code_for(&e),
    }
}

fn exit_code_for(err: &Error) -> ExitCode {
    let code = match err {
        Error::Forbidden { .. } => 2,
        Error::NotFound { .. } => 3,
        _ => 1,
    };
    eprintln!("{err}");
    ExitCode::from(code)
}

async fn run_status(ctx: &AppContext, document: &str) -> Result<(), Error> {
    let Some((bucket, key)) = document.split_once('/') else {
        return Err(Error::validation("document must be in bucket/key form"));
    };

    let record = ctx.status.get_or_default(bucket, key).await?;
    println!(
        "{}/{}: {:?} ({}%){}",
        record.bucket,
        record.key,
        record.state,
        record.progress,
        record.error.as_deref().map(|e| format!(" error={e}")).unwrap_or_default(),
    );
    Ok(())
}

async fn run_cancel(ctx: &AppContext, owner: &str, job_id: &str) -> Result<(), Error> {
    ctx.jobs.stop(owner, job_id).await?;
    println!("cancellation requested for job {job_id}");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_reindex(
    ctx: &AppContext,
    owner: &str,
    job_id: &str,
    document: &str,
    embedding_model: &str,
    chunks: &[String],
) -> Result<(), Error> {
    if chunks.is_empty() {
        return Err(Error::validation("reindex requires at least one chunk id"));
    }
    let reembedded = ctx
        .jobs
        .reindex_subset(owner, job_id, document, embedding_model, chunks)
        .await?;
    println!("re-embedded {reembedded} chunk(s)");
    Ok(())
}

async fn run_sweep_secrets(ctx: &AppContext) -> Result<(), Error> {
    let parcels = ctx.secrets.list_all().await?;
    let mut swept = 0usize;

    for (document_key, _created_at) in parcels {
        let Some((bucket, key)) = document_key.split_once('/') else {
            continue;
        };
        let orphaned = match ctx.status.get_or_default(bucket, key).await {
            Ok(record) => matches!(record.state, DocumentState::Completed | DocumentState::Failed),
            Err(_) => true,
        };
        if orphaned {
            ctx.secrets.delete(&document_key).await?;
            swept += 1;
        }
    }

    println!("swept {swept} orphaned secret parcel(s)");
    Ok(())
}
