//! The shipped namespaces, dispatched against an in-memory API.

use std::cell::RefCell;
use std::rc::Rc;

use heroku::commands::VERSION;
use heroku::{dispatcher, AppInfo, AppsApi, Collaborator, Settings};
use heroku_dispatch::{
    ApiError, Dispatcher, FailureKind, RunResult, AUTHENTICATION_FAILURE, NO_APP_SPECIFIED,
    RESOURCE_NOT_FOUND, UNKNOWN_COMMAND,
};
use insta::assert_snapshot;

// =============================================================================
// Fake API
// =============================================================================

#[derive(Default)]
struct State {
    apps: Vec<String>,
    failure: Option<ApiError>,
}

#[derive(Clone, Default)]
struct FakeApi {
    state: Rc<RefCell<State>>,
}

impl FakeApi {
    fn with_apps(apps: &[&str]) -> Self {
        let fake = FakeApi::default();
        fake.state.borrow_mut().apps = apps.iter().map(|a| a.to_string()).collect();
        fake
    }

    fn fail_with(&self, err: ApiError) {
        self.state.borrow_mut().failure = Some(err);
    }

    fn apps(&self) -> Vec<String> {
        self.state.borrow().apps.clone()
    }

    fn check(&self) -> Result<(), ApiError> {
        match &self.state.borrow().failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn position(&self, name: &str) -> Result<usize, ApiError> {
        self.state
            .borrow()
            .apps
            .iter()
            .position(|a| a == name)
            .ok_or(ApiError::NotFound)
    }
}

impl AppsApi for FakeApi {
    fn host(&self) -> &str {
        "heroku.com"
    }

    fn list(&self) -> Result<Vec<String>, ApiError> {
        self.check()?;
        Ok(self.apps())
    }

    fn create(&self, name: Option<&str>) -> Result<String, ApiError> {
        self.check()?;
        let name = name.unwrap_or("blazing-sun-42").to_string();
        self.state.borrow_mut().apps.push(name.clone());
        Ok(name)
    }

    fn rename(&self, name: &str, new_name: &str) -> Result<(), ApiError> {
        self.check()?;
        let index = self.position(name)?;
        self.state.borrow_mut().apps[index] = new_name.to_string();
        Ok(())
    }

    fn info(&self, name: &str) -> Result<AppInfo, ApiError> {
        self.check()?;
        self.position(name)?;
        Ok(AppInfo {
            name: name.to_string(),
            domain_name: None,
            production: false,
            code_size: Some(1536),
            data_size: Some(3 * 1024 * 1024),
            share_public: true,
            collaborators: vec![
                Collaborator {
                    email: "owner@example.com".into(),
                    access: "edit".into(),
                },
                Collaborator {
                    email: "dev@example.com".into(),
                    access: "view".into(),
                },
            ],
        })
    }

    fn destroy(&self, name: &str) -> Result<(), ApiError> {
        self.check()?;
        let index = self.position(name)?;
        self.state.borrow_mut().apps.remove(index);
        Ok(())
    }
}

fn setup(api: &FakeApi) -> Dispatcher {
    dispatcher(Settings::default(), Some(Box::new(api.clone()))).unwrap()
}

fn run(d: &mut Dispatcher, token: &str, args: &[&str]) -> RunResult {
    d.dispatch(token, args).unwrap()
}

fn handled(text: &str) -> RunResult {
    RunResult::Handled(text.to_string())
}

fn failed(kind: FailureKind, message: &str) -> RunResult {
    RunResult::Failed {
        kind,
        message: message.to_string(),
    }
}

// =============================================================================
// list / create
// =============================================================================

#[test]
fn test_list_without_apps() {
    let api = FakeApi::default();
    let mut d = setup(&api);
    assert_eq!(run(&mut d, "list", &[]), handled("You have no apps."));
}

#[test]
fn test_list_and_alias() {
    let api = FakeApi::with_apps(&["myapp", "other"]);
    let mut d = setup(&api);
    assert_eq!(run(&mut d, "list", &[]), handled("myapp\nother"));
    assert_eq!(run(&mut d, "apps", &[]), handled("myapp\nother"));
    assert_eq!(run(&mut d, "app:list", &[]), handled("myapp\nother"));
}

#[test]
fn test_create_normalizes_name() {
    let api = FakeApi::default();
    let mut d = setup(&api);
    assert_eq!(
        run(&mut d, "create", &[" MyApp "]),
        handled("Created http://myapp.heroku.com/ | git@heroku.com:myapp.git")
    );
    assert_eq!(
        run(&mut d, "create", &[]),
        handled("Created http://blazing-sun-42.heroku.com/ | git@heroku.com:blazing-sun-42.git")
    );
    assert_eq!(api.apps(), vec!["myapp", "blazing-sun-42"]);
}

// =============================================================================
// rename / info / destroy
// =============================================================================

#[test]
fn test_rename() {
    let api = FakeApi::with_apps(&["old"]);
    let mut d = setup(&api);

    assert_eq!(
        run(&mut d, "rename", &["new"]),
        failed(FailureKind::CommandFailed, NO_APP_SPECIFIED)
    );
    assert_eq!(
        run(&mut d, "rename", &["--app", "old"]),
        failed(FailureKind::CommandFailed, "Invalid name.")
    );
    assert_eq!(
        run(&mut d, "rename", &["NEW", "-a", "old"]),
        handled(
            "http://new.heroku.com/ | git@heroku.com:new.git\n\
             Don't forget to update your Git remotes on any local checkouts."
        )
    );
    assert_eq!(api.apps(), vec!["new"]);
}

#[test]
fn test_info() {
    let api = FakeApi::with_apps(&["myapp"]);
    let mut d = setup(&api);
    let result = run(&mut d, "info", &["--app", "myapp"]);
    assert_snapshot!(result.message().unwrap(), @r"
    === myapp
    Web URL:        http://myapp.heroku.com/
    Git Repo:       git@heroku.com:myapp.git
    Mode:           development
    Code size:      1k
    Data size:      3M
    Public:         true
    Collaborators:  owner@example.com (edit)
                    dev@example.com (view)
    ");
}

#[test]
fn test_info_unknown_app() {
    let api = FakeApi::default();
    let mut d = setup(&api);
    assert_eq!(
        run(&mut d, "app:info", &["--app", "ghost"]),
        failed(FailureKind::NotFound, RESOURCE_NOT_FOUND)
    );
}

#[test]
fn test_destroy() {
    let api = FakeApi::with_apps(&["myapp"]);
    let mut d = setup(&api);
    assert_eq!(
        run(&mut d, "destroy", &[]),
        handled("Set the app you want to destroy adding --app <app name> to this command")
    );
    assert_eq!(run(&mut d, "destroy", &["--app", "myapp"]), handled("Destroyed myapp"));
    assert!(api.apps().is_empty());
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_api_failures() {
    let api = FakeApi::with_apps(&["myapp"]);
    let mut d = setup(&api);

    api.fail_with(ApiError::Unauthorized);
    assert_eq!(
        run(&mut d, "list", &[]),
        failed(FailureKind::Unauthorized, AUTHENTICATION_FAILURE)
    );

    api.fail_with(ApiError::RequestFailed {
        status: 422,
        body: "<errors><error>Name is already taken</error></errors>".into(),
    });
    assert_eq!(
        run(&mut d, "create", &["myapp"]),
        failed(FailureKind::RequestFailed, "Name is already taken")
    );

    api.fail_with(ApiError::RequestFailed {
        status: 404,
        body: String::new(),
    });
    assert_eq!(
        run(&mut d, "list", &[]),
        failed(FailureKind::RequestFailed, "Not found")
    );
}

#[test]
fn test_without_client() {
    let settings = Settings {
        host: "staging.example.com".into(),
    };
    let mut d = dispatcher(settings, None).unwrap();
    assert_eq!(
        run(&mut d, "list", &[]),
        failed(
            FailureKind::CommandFailed,
            "No API client configured for staging.example.com."
        )
    );
}

#[test]
fn test_unknown_command() {
    let mut d = setup(&FakeApi::default());
    let unknown = failed(FailureKind::InvalidCommand, UNKNOWN_COMMAND);
    assert_eq!(run(&mut d, "deploy", &[]), unknown);
    assert_eq!(run(&mut d, "ssl:add", &[]), unknown);
    assert_eq!(run(&mut d, "version:bogus", &[]), unknown);
}

// =============================================================================
// version / help
// =============================================================================

#[test]
fn test_version() {
    let mut d = setup(&FakeApi::default());
    assert_eq!(run(&mut d, "version", &[]), handled(VERSION));
    assert_eq!(run(&mut d, "--version", &[]), handled(VERSION));
}

#[test]
fn test_help_index() {
    console::set_colors_enabled(false);
    let mut d = setup(&FakeApi::default());
    let result = run(&mut d, "help", &[]);
    let text = result.message().unwrap();

    assert!(text.contains("=== app\nmanage apps (create, destroy)"), "{text}");
    assert!(text.contains("# list your apps"), "{text}");
    assert!(text.contains("=== version\ndisplay the client version"), "{text}");
    assert!(text.find("=== app").unwrap() < text.find("=== version").unwrap());
}

#[test]
fn test_help_topic() {
    console::set_colors_enabled(false);
    let mut d = setup(&FakeApi::default());
    let result = run(&mut d, "help", &["info"]);
    assert_snapshot!(result.message().unwrap(), @r"
    Usage: heroku info

     show detailed app information

     -a, --app APP  # the app to show
    ");
}
