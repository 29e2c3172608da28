//! # Decorator Module Unit Tests / Decorator 模块单元测试
//!
//! Tests for wrapping callables into steps: name inference, explicit titles,
//! argument and return value forwarding, methods, fixtures and the `step_fn!` macro.
//!
//! 测试将可调用对象包装为步骤：名称推断、显式标题、参数和返回值转发、方法、fixture 以及 `step_fn!` 宏。

use step_report::decorator::{FALLBACK_STEP_NAME, declared_name, title_from_doc};
use step_report::reporting::{UnitOutcome, UnitRun, run_unit};
use step_report::{Skip, Status, Stepped, Tracker, step_fn};

fn login(user: &str, password: &str) -> bool {
    user == "admin" && password == "secret"
}

fn make_fixture() -> Vec<u32> {
    vec![1, 2, 3]
}

struct Calculator {
    offset: i64,
}

impl Calculator {
    fn shift(&self, value: i64) -> i64 {
        value + self.offset
    }

    step_fn! {
        #[step("apply offset")]
        fn apply(&self, tracker: &Tracker, value: i64) -> i64 {
            tracker.step("inside apply", || ());
            self.shift(value)
        }
    }

    step_fn! {
        fn checked(&self, tracker: &Tracker, value: i64) -> Result<i64, String> {
            if value >= 0 { Ok(self.shift(value)) } else { Err("negative".to_string()) }
        }
    }
}

struct Wrapper<T> {
    inner: T,
}

impl<T: Clone> Wrapper<T> {
    fn get(&self) -> T {
        self.inner.clone()
    }
}

struct Counter {
    hits: u32,
}

impl Counter {
    step_fn! {
        /// Adds `by` to the counter.
        #[step("bump counter")]
        fn bump(&mut self, tracker: &Tracker, by: u32) -> u32 {
            self.hits += by;
            self.hits
        }
    }

    step_fn! {
        fn reset(&mut self, tracker: &Tracker) {
            self.hits = 0;
        }
    }
}

step_fn! {
    fn add(tracker: &Tracker, a: i32, b: i32) -> i32 {
        a + b
    }
}

step_fn! {
    #[step("prepare environment")]
    fn prepare(tracker: &Tracker) {
        tracker.attach_text("env", "ready");
    }
}

step_fn! {
    /// Not run on this platform.
    fn maybe_skip(tracker: &Tracker, run_it: bool) -> anyhow::Result<u8> {
        if run_it { Ok(7) } else { Err(Skip::new("disabled").into()) }
    }
}

#[cfg(test)]
mod naming_tests {
    use super::*;

    #[test]
    fn test_declared_name_of_function_item() {
        assert_eq!(Stepped::new(login).name(), "login");
        assert_eq!(Stepped::new(make_fixture).name(), "make_fixture");
    }

    #[test]
    fn test_method_path_is_named_after_method() {
        assert_eq!(Stepped::new(Calculator::shift).name(), "shift");
        assert_eq!(Stepped::new(Wrapper::<i32>::get).name(), "get");
        assert_eq!(declared_name("my_crate::Wrapper<i32>::get"), "get");
        assert_eq!(
            declared_name("my_crate::Wrapper<alloc::vec::Vec<u8>>::get::{{closure}}"),
            "get"
        );
        assert_eq!(declared_name("<my_crate::Foo as my_crate::Check>::verify"), "verify");
    }

    #[test]
    fn test_closure_and_pointer_names() {
        assert_eq!(
            declared_name("my_crate::tests::check::{{closure}}"),
            "check"
        );
        assert_eq!(declared_name("fn(i32) -> i32"), FALLBACK_STEP_NAME);
        assert_eq!(declared_name("my_crate::Wrapper<u8>"), "Wrapper");
        let pointer: fn() -> Vec<u32> = make_fixture;
        assert_eq!(Stepped::new(pointer).name(), FALLBACK_STEP_NAME);
    }

    #[test]
    fn test_explicit_name_wins() {
        assert_eq!(Stepped::named("log in as admin", login).name(), "log in as admin");
    }

    #[test]
    fn test_title_from_doc_fragment() {
        assert_eq!(
            title_from_doc("\n  Opens the session. Then waits.\n").as_deref(),
            Some("Opens the session")
        );
        assert_eq!(title_from_doc("Single line.").as_deref(), Some("Single line"));
        assert_eq!(title_from_doc("   \n "), None);
        let long = "x".repeat(100);
        assert_eq!(title_from_doc(&long).map(|title| title.len()), Some(64));
        assert_eq!(Stepped::documented("", login).name(), "login");
        assert_eq!(
            Stepped::documented("Checks credentials.", login).name(),
            "Checks credentials"
        );
    }
}

#[cfg(test)]
mod invocation_tests {
    use super::*;

    #[test]
    fn test_generic_method_called_through_path() {
        let wrapper = Wrapper { inner: 7 };
        let wrapped = Stepped::new(Wrapper::<i32>::get);
        let report = run_unit("unit", |tracker| {
            assert_eq!(wrapped.call(tracker, (&wrapper,)), 7);
            Ok(())
        });
        assert_eq!(report.steps()[0].name(), "get");
    }

    #[test]
    fn test_call_forwards_arguments_and_result() {
        let wrapped = Stepped::new(login);
        let report = run_unit("unit", |tracker| {
            assert!(wrapped.call(tracker, ("admin", "secret")));
            assert!(!wrapped.call(tracker, ("guest", "secret")));
            Ok(())
        });

        let names: Vec<_> = report.steps().iter().map(|step| step.name()).collect();
        assert_eq!(names, vec!["login", "login"]);
        assert_eq!(report.status(), Status::Passed);
    }

    #[test]
    fn test_try_call_fails_step_on_error() {
        let parse = Stepped::named("parse number", |text: &str| text.parse::<i32>());
        let run = UnitRun::start("unit");
        assert_eq!(parse.try_call(run.tracker(), ("12",)), Ok(12));
        assert!(parse.try_call(run.tracker(), ("twelve",)).is_err());
        let report = run.finish(UnitOutcome::Passed);

        assert_eq!(report.steps()[0].status(), Some(Status::Passed));
        assert_eq!(report.steps()[1].status(), Some(Status::Failed));
    }

    #[test]
    fn test_bound_fixture_factory() {
        let fixture = Stepped::named("fixture: numbers", make_fixture);
        let run = UnitRun::start("unit");
        let factory = fixture.bind::<()>(run.tracker());
        assert_eq!(factory(()), vec![1, 2, 3]);
        drop(factory);
        let report = run.finish(UnitOutcome::Passed);

        assert_eq!(report.steps()[0].name(), "fixture: numbers");
    }

    #[test]
    fn test_method_wrapped_through_path() {
        let calculator = Calculator { offset: 10 };
        let wrapped = Stepped::new(Calculator::shift);
        let report = run_unit("unit", |tracker| {
            assert_eq!(wrapped.call(tracker, (&calculator, 5)), 15);
            Ok(())
        });
        assert_eq!(report.steps()[0].name(), "shift");
    }

    #[test]
    fn test_into_inner_returns_callable() {
        let inner = Stepped::new(login).into_inner();
        assert!(inner("admin", "secret"));
    }
}

#[cfg(test)]
mod macro_tests {
    use super::*;

    #[test]
    fn test_free_function_uses_declared_name() {
        let report = run_unit("unit", |tracker| {
            assert_eq!(add(tracker, 2, 3), 5);
            Ok(())
        });
        assert_eq!(report.steps()[0].name(), "add");
        assert_eq!(report.steps()[0].status(), Some(Status::Passed));
    }

    #[test]
    fn test_title_attribute_and_attachment() {
        let report = run_unit("unit", |tracker| {
            prepare(tracker);
            Ok(())
        });
        let step = &report.steps()[0];
        assert_eq!(step.name(), "prepare environment");
        assert_eq!(step.attachments()[0].title(), "env");
    }

    #[test]
    fn test_methods_with_receiver() {
        let calculator = Calculator { offset: 1 };
        let run = UnitRun::start("unit");
        assert_eq!(calculator.apply(run.tracker(), 41), 42);
        assert_eq!(calculator.checked(run.tracker(), -1), Err("negative".to_string()));
        let report = run.finish(UnitOutcome::Passed);

        let apply = &report.steps()[0];
        assert_eq!(apply.name(), "apply offset");
        assert_eq!(apply.children()[0].name(), "inside apply");
        assert_eq!(report.steps()[1].name(), "checked");
        assert_eq!(report.steps()[1].status(), Some(Status::Failed));
    }

    #[test]
    fn test_mut_receiver_and_title_after_doc_comment() {
        let mut counter = Counter { hits: 1 };
        let run = UnitRun::start("unit");
        assert_eq!(counter.bump(run.tracker(), 2), 3);
        counter.reset(run.tracker());
        assert_eq!(counter.hits, 0);
        let report = run.finish(UnitOutcome::Passed);

        assert_eq!(report.steps()[0].name(), "bump counter");
        assert_eq!(report.steps()[1].name(), "reset");
        assert_eq!(report.status(), Status::Passed);
    }

    #[test]
    fn test_result_functions_classify_skip() {
        let run = UnitRun::start("unit");
        assert_eq!(maybe_skip(run.tracker(), true).ok(), Some(7));
        assert!(maybe_skip(run.tracker(), false).is_err());
        let report = run.finish(UnitOutcome::Passed);

        assert_eq!(report.steps()[0].status(), Some(Status::Passed));
        assert_eq!(report.steps()[1].status(), Some(Status::Skipped));
        assert_eq!(report.steps()[1].name(), "maybe_skip");
    }

    #[test]
    fn test_panicking_step_function_fails() {
        step_fn! {
            fn explode(tracker: &Tracker) {
                panic!("kaboom");
            }
        }

        let report = run_unit("unit", |tracker| {
            explode(tracker);
            Ok(())
        });
        assert_eq!(report.status(), Status::Failed);
        assert_eq!(report.steps()[0].status(), Some(Status::Failed));
        assert_eq!(report.failure().map(|failure| failure.message.as_str()), Some("kaboom"));
    }
}
