//! Get-job-info and cancel-job tools (spec §4.9) — pass-throughs over the
//! job manager.

use super::ToolContext;
use crate::error::Result;
use crate::job::Job;
use uuid::Uuid;

pub struct GetJobInfoTool<'a> {
    ctx: &'a ToolContext,
}

impl<'a> GetJobInfoTool<'a> {
    pub fn new(ctx: &'a ToolContext) -> Self {
        Self { ctx }
    }

    pub async fn execute(&self, job_id: Uuid) -> Option<Job> {
        self.ctx.jobs.get_job(job_id).await
    }
}

pub struct CancelJobTool<'a> {
    ctx: &'a ToolContext,
}

impl<'a> CancelJobTool<'a> {
    pub fn new(ctx: &'a ToolContext) -> Self {
        Self { ctx }
    }

    pub async fn execute(&self, job_id: Uuid) -> Result<()> {
        self.ctx.jobs.cancel_job(job_id).await
    }
}
