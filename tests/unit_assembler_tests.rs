//! # Assembler Module Unit Tests / Assembler 模块单元测试
//!
//! Tests for the host boundary: classification of unit outcomes and the
//! report status produced by the end hook.
//!
//! 测试宿主边界：工作单元结果的分类以及结束钩子生成的报告状态。

use step_report::reporting::{UnitOutcome, UnitRun};
use step_report::{Skip, Status};

#[cfg(test)]
mod outcome_tests {
    use super::*;

    #[test]
    fn test_skip_error_becomes_skipped_outcome() {
        let err = anyhow::Error::new(Skip::new("not on this platform"));
        assert_eq!(
            UnitOutcome::from_error(&err),
            UnitOutcome::Skipped(Some("not on this platform".to_string()))
        );
    }

    #[test]
    fn test_plain_error_keeps_its_chain() {
        let err = anyhow::anyhow!("root cause").context("while checking");
        let UnitOutcome::Failed(failure) = UnitOutcome::from_error(&err) else {
            panic!("expected a failure");
        };
        assert_eq!(failure.message, "while checking");
        assert!(failure.stack_trace.unwrap_or_default().contains("root cause"));
    }

    #[test]
    fn test_panic_payloads_are_classified() {
        let skipped: Box<dyn std::any::Any + Send> = Box::new(Skip::new("later"));
        assert_eq!(
            UnitOutcome::from_panic(&*skipped),
            UnitOutcome::Skipped(Some("later".to_string()))
        );
        let failed: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(UnitOutcome::from_panic(&*failed).status(), Status::Failed);
    }
}

#[cfg(test)]
mod end_hook_tests {
    use super::*;

    #[test]
    fn test_failed_top_level_step_fails_a_passed_unit() {
        let run = UnitRun::start("unit");
        {
            let mut guard = run.tracker().open("bad");
            guard.fail();
        }
        let report = run.finish(UnitOutcome::Passed);
        assert_eq!(report.status(), Status::Failed);
        assert!(report.failure().is_some());
    }

    #[test]
    fn test_start_hook_names_report_and_tracker() {
        let run = UnitRun::start("named unit");
        assert_eq!(run.name(), "named unit");
        assert_eq!(run.tracker().report_name(), "named unit");
        let id = run.id();
        let report = run.finish(UnitOutcome::Skipped(None));
        assert_eq!(report.id(), id);
        assert_eq!(report.status(), Status::Skipped);
        assert!(report.failure().is_none());
    }
}
