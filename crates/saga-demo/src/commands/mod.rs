mod resume;
mod run;

use std::path::PathBuf;

use clap::{Args, Subcommand};
use saga_core::{SagaResult, SagaStatus};

use crate::error::Result;
use crate::output;
use crate::ticket::{FailurePlan, Ticket, TicketStep};

/// Workflow name recorded in checkpoints written by this tool.
pub(crate) const WORKFLOW: &str = "ticket-activation";

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the ticket activation saga from the start
    Run(RunArgs),
    /// Resume a checkpointed ticket activation saga
    Resume(ResumeArgs),
}

#[derive(Args)]
pub(crate) struct FailureArgs {
    /// Make this step's action fail
    #[arg(long, value_enum)]
    fail_step: Option<TicketStep>,

    /// Make this step's compensation fail
    #[arg(long, value_enum)]
    fail_compensation: Option<TicketStep>,
}

impl FailureArgs {
    fn plan(&self) -> FailurePlan {
        FailurePlan {
            execute: self.fail_step,
            compensate: self.fail_compensation,
        }
    }
}

#[derive(Args)]
pub(crate) struct RunArgs {
    #[command(flatten)]
    failures: FailureArgs,

    /// Ticket value in points
    #[arg(long, default_value_t = 100)]
    value: u32,

    /// Checkpoint progress as JSON files in this directory
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Identifier for the checkpointed run (default: random UUID)
    #[arg(long, requires = "state_dir")]
    saga_id: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
pub(crate) struct ResumeArgs {
    #[command(flatten)]
    failures: FailureArgs,

    /// Directory holding the checkpoint files
    #[arg(long)]
    state_dir: PathBuf,

    /// Identifier of the run to resume
    #[arg(long)]
    saga_id: String,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl Commands {
    /// Execute the command and return the final saga status.
    pub(crate) async fn execute(self) -> Result<SagaStatus> {
        match self {
            Self::Run(args) => run::run(args).await,
            Self::Resume(args) => resume::run(args).await,
        }
    }
}

fn print_result(saga_id: Option<&str>, result: &SagaResult<Ticket>, json: bool) -> Result<()> {
    let output = output::formatter(json).format_result(saga_id, result)?;
    println!("{}", output.trim_end());
    Ok(())
}
