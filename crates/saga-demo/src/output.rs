use std::fmt::Write as _;

use saga_core::{SagaResult, SagaStatus};
use serde::Serialize;

use crate::error::Result;
use crate::ticket::Ticket;

pub(crate) trait ResultFormatter {
    fn format_result(&self, saga_id: Option<&str>, result: &SagaResult<Ticket>) -> Result<String>;
}

pub(crate) struct PlainTextResultFormatter;

impl PlainTextResultFormatter {
    fn format_outcome(output: &mut String, result: &SagaResult<Ticket>) {
        let _ = writeln!(output, "status: {}", status_label(result.status));
        if let Some(error) = &result.error {
            let _ = writeln!(output, "error: {error}");
        }
        if let Some(failure) = &result.failure {
            let _ = writeln!(output, "failed step: {} ({})", failure.step, failure.reason);
        }
    }

    fn format_ticket(output: &mut String, ticket: &Ticket) {
        let _ = writeln!(output, "\nticket {}", ticket.id);
        let _ = writeln!(
            output,
            "  code: {}",
            ticket.code.as_deref().unwrap_or("-")
        );
        let _ = writeln!(output, "  value: {}", ticket.value);
        let _ = writeln!(output, "  status: {:?}", ticket.status);
        if let Some(id) = &ticket.debit.id {
            let _ = writeln!(output, "  debit: {id}");
        }
        if let Some(id) = &ticket.debit.restore_id {
            let _ = writeln!(output, "  restore: {id}");
        }
    }

    fn format_log(output: &mut String, result: &SagaResult<Ticket>) {
        output.push_str("\nexecution log:\n");
        for line in result.execution_log.summary().lines() {
            let _ = writeln!(output, "  {line}");
        }

        let Some(compensation) = &result.compensation_log else {
            return;
        };
        output.push_str("\ncompensation log:\n");
        if compensation.is_empty() {
            output.push_str("  (nothing to compensate)\n");
        }
        for line in compensation.summary().lines() {
            let _ = writeln!(output, "  {line}");
        }
    }
}

impl ResultFormatter for PlainTextResultFormatter {
    fn format_result(&self, saga_id: Option<&str>, result: &SagaResult<Ticket>) -> Result<String> {
        let mut output = String::new();
        if let Some(saga_id) = saga_id {
            let _ = writeln!(output, "saga: {saga_id}");
        }
        Self::format_outcome(&mut output, result);
        Self::format_ticket(&mut output, &result.data);
        Self::format_log(&mut output, result);
        Ok(output)
    }
}

pub(crate) struct JsonResultFormatter;

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    saga_id: Option<&'a str>,
    #[serde(flatten)]
    result: &'a SagaResult<Ticket>,
}

impl ResultFormatter for JsonResultFormatter {
    fn format_result(&self, saga_id: Option<&str>, result: &SagaResult<Ticket>) -> Result<String> {
        let report = JsonReport { saga_id, result };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

pub(crate) fn formatter(json: bool) -> Box<dyn ResultFormatter> {
    if json {
        Box::new(JsonResultFormatter)
    } else {
        Box::new(PlainTextResultFormatter)
    }
}

fn status_label(status: SagaStatus) -> &'static str {
    match status {
        SagaStatus::Running => "running",
        SagaStatus::Compensating => "compensating",
        SagaStatus::Succeeded => "succeeded",
        SagaStatus::Compensated => "compensated",
        SagaStatus::PartiallyCompensated => "partially compensated",
    }
}

#[cfg(test)]
mod tests {
    use crate::ticket::{FailurePlan, TicketStep, ticket_saga};

    use super::*;

    async fn failed_activation() -> SagaResult<Ticket> {
        let plan = FailurePlan {
            execute: Some(TicketStep::Activate),
            compensate: None,
        };
        ticket_saga(Ticket::new(10), plan)
            .expect("valid saga")
            .execute()
            .await
    }

    #[tokio::test]
    async fn plain_text_lists_failure_and_both_logs() -> anyhow::Result<()> {
        let result = failed_activation().await;

        let output = PlainTextResultFormatter.format_result(Some("t-1"), &result)?;

        assert!(output.starts_with("saga: t-1\nstatus: compensated\n"));
        assert!(output.contains("failed step: Activate (activation service unavailable)"));
        assert!(output.contains("  code: NO_CODE"));
        assert!(output.contains("  status: Failed"));
        assert!(output.contains("  ✗ Activate (activation service unavailable)"));
        assert!(output.contains("compensation log:\n  ↩ Debit\n  ↩ CreateCode\n"));
        Ok(())
    }

    #[tokio::test]
    async fn plain_text_omits_compensation_log_on_success() -> anyhow::Result<()> {
        let result = ticket_saga(Ticket::new(10), FailurePlan::default())?
            .execute()
            .await;

        let output = PlainTextResultFormatter.format_result(None, &result)?;

        assert!(output.starts_with("status: succeeded\n"));
        assert!(!output.contains("compensation log"));
        assert!(!output.contains("error:"));
        Ok(())
    }

    #[tokio::test]
    async fn json_report_flattens_result() -> anyhow::Result<()> {
        let result = failed_activation().await;

        let output = JsonResultFormatter.format_result(Some("t-1"), &result)?;
        let value: serde_json::Value = serde_json::from_str(&output)?;

        assert_eq!(value["saga_id"], "t-1");
        assert_eq!(value["status"], "compensated");
        assert_eq!(value["data"]["status"], "FAILED");
        assert_eq!(value["failure"]["step"], "Activate");
        assert_eq!(value["compensation_log"][0]["step"], "Debit");
        Ok(())
    }
}
