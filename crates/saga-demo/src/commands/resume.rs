use saga_core::SagaStatus;
use saga_state::DurableSaga;
use saga_state::providers::FileSystemStateRepository;

use super::{ResumeArgs, WORKFLOW, print_result};
use crate::error::Result;
use crate::ticket::{Ticket, ticket_saga};

pub(crate) async fn run(args: ResumeArgs) -> Result<SagaStatus> {
    // Rehydration replaces this ticket with the checkpointed one.
    let saga = ticket_saga(Ticket::new(0), args.failures.plan())?;
    let durable = DurableSaga::new(
        WORKFLOW,
        saga,
        FileSystemStateRepository::new(args.state_dir),
    );

    let result = durable.resume(&args.saga_id).await?;
    print_result(Some(&args.saga_id), &result, args.json)?;
    Ok(result.status)
}
