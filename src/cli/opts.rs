// Flag validation and target selection for the logs command

use crate::cli::selector::DeploySelector;
use crate::config::Store;
use crate::error::{Result, SvcLogsError};
use crate::logs::time::parse_time_flag;
use crate::logs::{
    LogGroupTarget, OutputFormat, QueryParameters, DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT,
};
use chrono::TimeDelta;

/// Raw flag values of the logs command
#[derive(Debug, Clone)]
pub struct LogsVars {
    pub app_name: Option<String>,
    pub env_name: Option<String>,
    pub svc_name: Option<String>,
    pub limit: i64,
    pub follow: bool,
    pub human_start_time: Option<String>,
    pub human_end_time: Option<String>,
    pub since: Option<TimeDelta>,
    pub json: bool,
}

impl Default for LogsVars {
    fn default() -> Self {
        Self {
            app_name: None,
            env_name: None,
            svc_name: None,
            limit: DEFAULT_LIMIT,
            follow: false,
            human_start_time: None,
            human_end_time: None,
            since: None,
            json: false,
        }
    }
}

/// Treat an empty flag value the same as an absent one
fn flag(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl LogsVars {
    /// Check the flags before anything is fetched.
    ///
    /// Rules are checked in a fixed order and the first violation is returned.
    pub fn validate(&self, store: &dyn Store) -> Result<QueryParameters> {
        if let Some(app) = flag(&self.app_name) {
            store.get_application(app)?;
        }

        let start = flag(&self.human_start_time);
        let end = flag(&self.human_end_time);

        if self.since.is_some() && start.is_some() {
            return Err(SvcLogsError::validation(
                "only one of --since or --start-time may be used",
            ));
        }

        if self.follow && end.is_some() {
            return Err(SvcLogsError::validation(
                "only one of --follow or --end-time may be used",
            ));
        }

        let start_time = parse_time_flag("--start-time", start.unwrap_or_default())?;
        let end_time = parse_time_flag("--end-time", end.unwrap_or_default())?;

        if self.since.is_some_and(|since| since <= TimeDelta::zero()) {
            return Err(SvcLogsError::validation("--since must be greater than 0"));
        }

        if !(MIN_LIMIT..=MAX_LIMIT).contains(&self.limit) {
            return Err(SvcLogsError::validation(format!(
                "--limit {} is out-of-bounds, value must be between {} and {}",
                self.limit, MIN_LIMIT, MAX_LIMIT
            )));
        }

        Ok(QueryParameters {
            limit: self.limit as usize,
            follow: self.follow,
            start_time,
            end_time,
            since: self.since,
            output_format: if self.json {
                OutputFormat::Json
            } else {
                OutputFormat::Human
            },
        })
    }

    /// Resolve the application and deployed service whose logs are read.
    ///
    /// The selector is always asked for the deployed service, even when both
    /// environment and service were given.
    pub fn ask(&self, sel: &dyn DeploySelector) -> Result<LogGroupTarget> {
        let app = match flag(&self.app_name) {
            Some(app) => app.to_string(),
            None => sel
                .application()
                .map_err(|e| SvcLogsError::SelectApplication(Box::new(e)))?,
        };

        let deployed = sel
            .deployed_service(&app, flag(&self.env_name), flag(&self.svc_name))
            .map_err(|e| SvcLogsError::SelectDeployedService {
                app: app.clone(),
                source: Box::new(e),
            })?;

        tracing::debug!(app = %app, env = %deployed.env, svc = %deployed.svc, "selected deployed service");

        Ok(LogGroupTarget::new(&app, &deployed.env, &deployed.svc))
    }
}
