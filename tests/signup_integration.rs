//! End-to-end signup flow: synchronous field checks, concurrent remote
//! checks that accumulate, and a flaky persistence step guarded by retry and
//! timeout.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use undertow::testing::CallCounter;
use undertow::{
    assert_invalid_errors, assert_valid, Backoff, NonEmptyVec, ResultExt, RetryPolicy,
    TaskResult, TaskValidation, Validation,
};

#[derive(Clone, Debug, PartialEq)]
struct Signup {
    username: String,
    email: String,
    age: u8,
}

#[derive(Clone, Debug, PartialEq)]
enum SignupError {
    UsernameTooShort,
    EmailMissingAt,
    TooYoung,
    UsernameTaken,
    EmailBlocked,
}

#[derive(Clone, Debug, PartialEq)]
enum StoreError {
    Unavailable,
    Conflict,
    TimedOut,
}

fn validate_username(name: &str) -> Validation<String, SignupError> {
    Validation::valid(name.to_string()).ensure(|n| n.len() >= 3, SignupError::UsernameTooShort)
}

fn validate_email(email: &str) -> Validation<String, SignupError> {
    Validation::valid(email.to_string()).ensure(|e| e.contains('@'), SignupError::EmailMissingAt)
}

fn validate_age(age: u8) -> Validation<u8, SignupError> {
    Validation::valid(age).ensure(|a| *a >= 18, SignupError::TooYoung)
}

fn validate_form(username: &str, email: &str, age: u8) -> Validation<Signup, SignupError> {
    Validation::all((validate_username(username), validate_email(email), validate_age(age))).map(
        |(username, email, age)| Signup {
            username,
            email,
            age,
        },
    )
}

struct Directory {
    taken: HashSet<String>,
    blocked_domains: HashSet<String>,
}

fn username_available(dir: Arc<Directory>, name: String) -> TaskValidation<(), SignupError> {
    TaskValidation::new(move || {
        let taken = dir.taken.contains(&name);
        async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if taken {
                Validation::invalid(SignupError::UsernameTaken)
            } else {
                Validation::valid(())
            }
        }
    })
}

fn email_allowed(dir: Arc<Directory>, email: String) -> TaskValidation<(), SignupError> {
    TaskValidation::new(move || {
        let domain = email.rsplit('@').next().unwrap_or_default().to_string();
        let blocked = dir.blocked_domains.contains(&domain);
        async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            if blocked {
                Validation::invalid(SignupError::EmailBlocked)
            } else {
                Validation::valid(())
            }
        }
    })
}

fn directory() -> Arc<Directory> {
    Arc::new(Directory {
        taken: ["admin".to_string()].into_iter().collect(),
        blocked_domains: ["spam.test".to_string()].into_iter().collect(),
    })
}

fn remote_checks(dir: Arc<Directory>, form: Signup) -> TaskValidation<Signup, SignupError> {
    username_available(Arc::clone(&dir), form.username.clone())
        .and(email_allowed(dir, form.email.clone()))
        .map(move |_| form.clone())
}

#[test]
fn form_reports_every_field_error() {
    let result = validate_form("ab", "nowhere", 16);
    assert_invalid_errors!(
        result,
        vec![
            SignupError::UsernameTooShort,
            SignupError::EmailMissingAt,
            SignupError::TooYoung,
        ]
    );
}

#[test]
fn valid_form_builds_signup() {
    let signup = assert_valid!(validate_form("ada", "ada@example.com", 36));
    assert_eq!(signup.username, "ada");
}

#[test]
fn form_result_is_fail_fast_when_converted() {
    let first = validate_form("ab", "nowhere", 16)
        .into_result()
        .map_err(|errors| errors.head().clone());
    assert_eq!(first, Err(SignupError::UsernameTooShort));
    assert_eq!(
        first.fold(|_| "rejected", |_| "accepted"),
        "rejected"
    );
}

#[tokio::test(start_paused = true)]
async fn remote_checks_run_concurrently_and_accumulate() {
    let form = assert_valid!(validate_form("admin", "root@spam.test", 40));
    let start = tokio::time::Instant::now();

    let result = remote_checks(directory(), form).run().await;

    assert_invalid_errors!(
        result,
        vec![SignupError::UsernameTaken, SignupError::EmailBlocked]
    );
    assert!(start.elapsed() < Duration::from_millis(25));
}

#[tokio::test(start_paused = true)]
async fn signup_persists_with_retry_after_checks_pass() {
    let form = assert_valid!(validate_form("grace", "grace@example.com", 45));
    let saved = Arc::new(Mutex::new(Vec::new()));
    let calls = CallCounter::new();

    let store = {
        let saved = Arc::clone(&saved);
        let calls = calls.clone();
        move |signup: Signup| {
            let saved = Arc::clone(&saved);
            let calls = calls.clone();
            TaskResult::new(move || {
                let attempt = calls.hit();
                let saved = Arc::clone(&saved);
                let signup = signup.clone();
                async move {
                    if attempt < 2 {
                        Err(StoreError::Unavailable)
                    } else {
                        saved.lock().push(signup.username.clone());
                        Ok(signup.username)
                    }
                }
            })
            .retry_if(
                RetryPolicy::new(4).with_backoff(Backoff::exponential(Duration::from_millis(10))),
                |e| *e == StoreError::Unavailable,
            )
            .timeout(Duration::from_secs(1), || StoreError::TimedOut)
        }
    };

    let flow = remote_checks(directory(), form)
        .into_task_result()
        .map_err(|_| StoreError::Conflict)
        .and_then(store);

    assert_eq!(flow.run().await, Ok("grace".to_string()));
    assert_eq!(calls.count(), 3);
    assert_eq!(*saved.lock(), vec!["grace".to_string()]);
}

#[tokio::test]
async fn rejected_checks_never_reach_the_store() {
    let form = assert_valid!(validate_form("admin", "admin@example.com", 40));
    let calls = CallCounter::new();
    let store_calls = calls.clone();

    let flow = remote_checks(directory(), form)
        .into_task_result()
        .map_err(NonEmptyVec::into_vec)
        .and_then(move |_| {
            store_calls.hit();
            TaskResult::succeed(())
        });

    assert_eq!(flow.run().await, Err(vec![SignupError::UsernameTaken]));
    assert_eq!(calls.count(), 0);
}
