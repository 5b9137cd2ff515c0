use saga_core::SagaStatus;
use saga_state::DurableSaga;
use saga_state::providers::FileSystemStateRepository;
use tracing::info;
use uuid::Uuid;

use super::{RunArgs, WORKFLOW, print_result};
use crate::error::Result;
use crate::ticket::{Ticket, ticket_saga};

pub(crate) async fn run(args: RunArgs) -> Result<SagaStatus> {
    let ticket = Ticket::new(args.value);
    info!(ticket = %ticket.id, value = ticket.value, "creating ticket");
    let saga = ticket_saga(ticket, args.failures.plan())?;

    let Some(state_dir) = args.state_dir else {
        let result = saga.execute().await;
        print_result(None, &result, args.json)?;
        return Ok(result.status);
    };

    let saga_id = args
        .saga_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let durable = DurableSaga::new(WORKFLOW, saga, FileSystemStateRepository::new(state_dir));
    let result = durable.execute(&saga_id).await?;
    print_result(Some(&saga_id), &result, args.json)?;
    Ok(result.status)
}
