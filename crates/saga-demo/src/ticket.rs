use async_trait::async_trait;
use clap::ValueEnum;
use saga_core::{ConfigError, SagaBuilder, SagaOrchestrator, SagaStep, StepObserver};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Code assigned to a ticket whose code was revoked.
pub(crate) const REVOKED_CODE: &str = "NO_CODE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum TicketStatus {
    Created,
    Active,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Debit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) restore_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Ticket {
    pub(crate) id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) code: Option<String>,
    pub(crate) value: u32,
    pub(crate) status: TicketStatus,
    pub(crate) debit: Debit,
}

impl Ticket {
    pub(crate) fn new(value: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            code: None,
            value,
            status: TicketStatus::Created,
            debit: Debit::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum TicketError {
    #[error("{service} service unavailable")]
    Unavailable { service: &'static str },
}

/// The ticket saga's steps, as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum TicketStep {
    CreateCode,
    Debit,
    Activate,
}

/// Which calls to break on purpose.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FailurePlan {
    pub(crate) execute: Option<TicketStep>,
    pub(crate) compensate: Option<TicketStep>,
}

impl FailurePlan {
    fn check(
        which: Option<TicketStep>,
        step: TicketStep,
        service: &'static str,
    ) -> Result<(), TicketError> {
        if which == Some(step) {
            Err(TicketError::Unavailable { service })
        } else {
            Ok(())
        }
    }
}

pub(crate) struct CreateCode {
    plan: FailurePlan,
}

#[async_trait]
impl SagaStep for CreateCode {
    type Context = Ticket;
    type Error = TicketError;

    fn name(&self) -> &str {
        "CreateCode"
    }

    async fn execute(&self, ticket: &Ticket) -> Result<Ticket, TicketError> {
        FailurePlan::check(self.plan.execute, TicketStep::CreateCode, "code")?;
        let code = Uuid::new_v4().simple().to_string();
        Ok(Ticket {
            code: Some(code[..8].to_uppercase()),
            ..ticket.clone()
        })
    }

    // Without a code the ticket is unusable, so it is marked failed here.
    async fn compensate(&self, ticket: &Ticket) -> Result<Ticket, TicketError> {
        FailurePlan::check(self.plan.compensate, TicketStep::CreateCode, "code")?;
        Ok(Ticket {
            code: Some(REVOKED_CODE.to_string()),
            status: TicketStatus::Failed,
            ..ticket.clone()
        })
    }

    fn compensation_description(&self) -> String {
        "revoke ticket code".to_string()
    }
}

pub(crate) struct DebitPoints {
    plan: FailurePlan,
}

#[async_trait]
impl SagaStep for DebitPoints {
    type Context = Ticket;
    type Error = TicketError;

    fn name(&self) -> &str {
        "Debit"
    }

    async fn execute(&self, ticket: &Ticket) -> Result<Ticket, TicketError> {
        FailurePlan::check(self.plan.execute, TicketStep::Debit, "points")?;
        let mut next = ticket.clone();
        next.debit.id = Some(Uuid::new_v4().to_string());
        Ok(next)
    }

    async fn compensate(&self, ticket: &Ticket) -> Result<Ticket, TicketError> {
        FailurePlan::check(self.plan.compensate, TicketStep::Debit, "points")?;
        let mut next = ticket.clone();
        next.debit.restore_id = Some(Uuid::new_v4().to_string());
        Ok(next)
    }

    fn compensation_description(&self) -> String {
        "restore debited points".to_string()
    }
}

pub(crate) struct Activate {
    plan: FailurePlan,
}

#[async_trait]
impl SagaStep for Activate {
    type Context = Ticket;
    type Error = TicketError;

    fn name(&self) -> &str {
        "Activate"
    }

    async fn execute(&self, ticket: &Ticket) -> Result<Ticket, TicketError> {
        FailurePlan::check(self.plan.execute, TicketStep::Activate, "activation")?;
        Ok(Ticket {
            status: TicketStatus::Active,
            ..ticket.clone()
        })
    }

    async fn compensate(&self, ticket: &Ticket) -> Result<Ticket, TicketError> {
        FailurePlan::check(self.plan.compensate, TicketStep::Activate, "activation")?;
        Ok(Ticket {
            status: TicketStatus::Failed,
            ..ticket.clone()
        })
    }
}

/// Logs every completed step together with the ticket's new status.
pub(crate) struct StepLogger;

#[async_trait]
impl StepObserver<Ticket> for StepLogger {
    async fn on_step_completed(&self, step: &str, ticket: &Ticket) {
        info!(step, ticket = %ticket.id, status = ?ticket.status, "ticket step completed");
    }
}

/// Build the `CreateCode → Debit → Activate` saga for `ticket`.
pub(crate) fn ticket_saga(
    ticket: Ticket,
    plan: FailurePlan,
) -> Result<SagaOrchestrator<Ticket, TicketError>, ConfigError> {
    SagaBuilder::new()
        .step(CreateCode { plan })
        .step(DebitPoints { plan })
        .step(Activate { plan })
        .observer(StepLogger)
        .build(ticket)
}
