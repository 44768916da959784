//! List-libraries and list-jobs tools (spec §4.9) — straightforward
//! pass-throughs over the store and the job manager.

use super::ToolContext;
use crate::error::Result;
use crate::job::{Job, JobStatus};

pub struct ListLibrariesTool<'a> {
    ctx: &'a ToolContext,
}

impl<'a> ListLibrariesTool<'a> {
    pub fn new(ctx: &'a ToolContext) -> Self {
        Self { ctx }
    }

    pub async fn execute(&self) -> Result<Vec<(String, Vec<String>)>> {
        self.ctx.store.list_libraries().await
    }
}

pub struct ListJobsTool<'a> {
    ctx: &'a ToolContext,
}

impl<'a> ListJobsTool<'a> {
    pub fn new(ctx: &'a ToolContext) -> Self {
        Self { ctx }
    }

    pub async fn execute(&self, status_filter: Option<JobStatus>) -> Vec<Job> {
        self.ctx.jobs.get_jobs(status_filter).await
    }
}
