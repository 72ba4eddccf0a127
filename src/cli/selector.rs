// Deployment selection from the workspace config

use crate::config::{Deployment, Store};
use crate::error::{Result, SvcLogsError};

/// A service deployed to an environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedService {
    pub env: String,
    pub svc: String,
}

impl From<&Deployment> for DeployedService {
    fn from(d: &Deployment) -> Self {
        Self {
            env: d.environment.clone(),
            svc: d.service.clone(),
        }
    }
}

/// Picks the application and the deployed service to read logs from
pub trait DeploySelector {
    /// Choose an application when none was given
    fn application(&self) -> Result<String>;

    /// Choose one deployed service of `app`, narrowed by the optional hints
    fn deployed_service(
        &self,
        app: &str,
        env: Option<&str>,
        svc: Option<&str>,
    ) -> Result<DeployedService>;
}

/// How much of the deployment the caller already pinned down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution<'a> {
    /// Both environment and service given, used as is
    Direct { env: &'a str, svc: &'a str },
    /// One of the two given, the other looked up
    Partial {
        env: Option<&'a str>,
        svc: Option<&'a str>,
    },
    /// Nothing given, the application must have a single deployment
    Open,
}

impl<'a> Resolution<'a> {
    fn from_hints(env: Option<&'a str>, svc: Option<&'a str>) -> Self {
        match (env, svc) {
            (Some(env), Some(svc)) => Self::Direct { env, svc },
            (None, None) => Self::Open,
            (env, svc) => Self::Partial { env, svc },
        }
    }

    fn matches(&self, deployment: &Deployment) -> bool {
        match self {
            Self::Direct { env, svc } => deployment.environment == *env && deployment.service == *svc,
            Self::Partial { env, svc } => {
                env.map_or(true, |e| deployment.environment == e)
                    && svc.map_or(true, |s| deployment.service == s)
            }
            Self::Open => true,
        }
    }
}

/// Non-interactive selector backed by the deployments listed in a [`Store`]
pub struct WorkspaceSelector<'a, S: Store + ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> WorkspaceSelector<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }
}

impl<S: Store + ?Sized> DeploySelector for WorkspaceSelector<'_, S> {
    fn application(&self) -> Result<String> {
        let apps = self.store.list_applications()?;
        match apps.as_slice() {
            [] => Err(SvcLogsError::NoApplications),
            [app] => Ok(app.name.clone()),
            _ => {
                let names: Vec<&str> = apps.iter().map(|a| a.name.as_str()).collect();
                Err(SvcLogsError::AmbiguousSelection(format!(
                    "found {} applications ({}), specify one with --app",
                    names.len(),
                    names.join(", ")
                )))
            }
        }
    }

    fn deployed_service(
        &self,
        app: &str,
        env: Option<&str>,
        svc: Option<&str>,
    ) -> Result<DeployedService> {
        let resolution = Resolution::from_hints(env, svc);
        if let Resolution::Direct { env, svc } = resolution {
            return Ok(DeployedService {
                env: env.to_string(),
                svc: svc.to_string(),
            });
        }

        let application = self.store.get_application(app)?;
        let candidates: Vec<DeployedService> = application
            .deployments
            .iter()
            .filter(|d| resolution.matches(d))
            .map(DeployedService::from)
            .collect();

        match candidates.as_slice() {
            [] => Err(SvcLogsError::NoDeployedServices(app.to_string())),
            [only] => Ok(only.clone()),
            _ => {
                let listed: Vec<String> = candidates
                    .iter()
                    .map(|c| format!("{} ({})", c.svc, c.env))
                    .collect();
                Err(SvcLogsError::AmbiguousSelection(format!(
                    "found {} deployed services ({}), specify --env and --name",
                    listed.len(),
                    listed.join(", ")
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Application, WorkspaceConfig};
    use std::path::PathBuf;

    fn deployment(env: &str, svc: &str) -> Deployment {
        Deployment {
            environment: env.to_string(),
            service: svc.to_string(),
        }
    }

    fn workspace(apps: Vec<Application>) -> WorkspaceConfig {
        WorkspaceConfig {
            log_dir: PathBuf::from("/tmp"),
            poll_interval_ms: 1000,
            default_limit: 10,
            applications: apps,
        }
    }

    fn app(name: &str, deployments: Vec<Deployment>) -> Application {
        Application {
            name: name.to_string(),
            deployments,
        }
    }

    #[test]
    fn test_single_application_is_chosen() {
        let ws = workspace(vec![app("my-app", vec![])]);
        assert_eq!(WorkspaceSelector::new(&ws).application().unwrap(), "my-app");
    }

    #[test]
    fn test_application_errors() {
        let ws = workspace(vec![]);
        assert!(matches!(
            WorkspaceSelector::new(&ws).application(),
            Err(SvcLogsError::NoApplications)
        ));

        let ws = workspace(vec![app("a", vec![]), app("b", vec![])]);
        let err = WorkspaceSelector::new(&ws).application().unwrap_err();
        assert_eq!(
            err.to_string(),
            "found 2 applications (a, b), specify one with --app"
        );
    }

    #[test]
    fn test_direct_pair_is_returned_as_given() {
        let ws = workspace(vec![]);
        let selected = WorkspaceSelector::new(&ws)
            .deployed_service("anything", Some("mockEnv"), Some("mockSvc"))
            .unwrap();
        assert_eq!(
            selected,
            DeployedService {
                env: "mockEnv".to_string(),
                svc: "mockSvc".to_string(),
            }
        );
    }

    #[test]
    fn test_environment_hint_narrows_choice() {
        let ws = workspace(vec![app(
            "my-app",
            vec![deployment("test", "web"), deployment("prod", "web")],
        )]);
        let selected = WorkspaceSelector::new(&ws)
            .deployed_service("my-app", Some("prod"), None)
            .unwrap();
        assert_eq!(selected.env, "prod");
        assert_eq!(selected.svc, "web");
    }

    #[test]
    fn test_open_selection_needs_single_deployment() {
        let ws = workspace(vec![app("my-app", vec![deployment("test", "api")])]);
        let selected = WorkspaceSelector::new(&ws)
            .deployed_service("my-app", None, None)
            .unwrap();
        assert_eq!(selected.svc, "api");

        let ws = workspace(vec![app(
            "my-app",
            vec![deployment("test", "api"), deployment("test", "web")],
        )]);
        let err = WorkspaceSelector::new(&ws)
            .deployed_service("my-app", None, None)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "found 2 deployed services (api (test), web (test)), specify --env and --name"
        );
    }

    #[test]
    fn test_no_matching_deployment() {
        let ws = workspace(vec![app("my-app", vec![deployment("test", "api")])]);
        let err = WorkspaceSelector::new(&ws)
            .deployed_service("my-app", None, Some("web"))
            .unwrap_err();
        assert_eq!(err.to_string(), "no deployed services found for application my-app");
    }
}
