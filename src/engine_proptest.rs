//! Property-based tests for the reconciler's command selection.
//!
//! These tests use proptest to generate declarations and verify which git
//! commands are issued for each filesystem state.

#[cfg(test)]
mod proptest_tests {
    use crate::config::RepositoryDeclaration;
    use crate::engine::{Outcome, Reconciler};
    use crate::error::Error;
    use crate::report::RecordingSink;
    use crate::testing::MockRunner;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn branch() -> impl Strategy<Value = Option<String>> {
        proptest::option::of("[a-z][a-z0-9_./]{0,15}")
    }

    fn upstream() -> impl Strategy<Value = Option<String>> {
        proptest::option::of("git@[a-z]{1,8}:[a-z]{1,8}/[a-z]{1,8}\\.git")
    }

    fn target() -> impl Strategy<Value = String> {
        "https://[a-z]{1,8}\\.example/[a-z' $;]{1,12}\\.git"
    }

    proptest! {
        /// Property: an absent working copy gets exactly one clone, with `-b`
        /// iff a branch is set, then a set-url iff an upstream is set
        #[test]
        fn absent_repo_issues_one_clone(
            target in target(),
            branch in branch(),
            set_upstream in upstream(),
        ) {
            let temp = TempDir::new().unwrap();
            let path = temp.path().join("repo").to_string_lossy().into_owned();
            let runner = MockRunner::new();
            let calls = runner.calls.clone();

            let decl = RepositoryDeclaration {
                branch: branch.clone(),
                set_upstream: set_upstream.clone(),
                ..RepositoryDeclaration::new(target.clone(), path.clone())
            }
            .finalize()
            .unwrap();
            Reconciler::new(runner)
                .reconcile_one(&decl, &mut RecordingSink::new())
                .unwrap();

            let calls = calls.lock().unwrap();
            let clones: Vec<_> = calls.iter().filter(|(_, args)| args[0] == "clone").collect();
            prop_assert_eq!(clones.len(), 1);

            let clone_args = &clones[0].1;
            prop_assert_eq!(clone_args.contains(&"-b".to_string()), branch.is_some());
            prop_assert_eq!(&clone_args[clone_args.len() - 2], &target);
            prop_assert_eq!(&clone_args[clone_args.len() - 1], &path);

            let set_urls = calls.iter().filter(|(_, args)| args[0] == "remote").count();
            prop_assert_eq!(set_urls, usize::from(set_upstream.is_some()));
        }

        /// Property: an existing working copy without sync-on-load issues no
        /// commands, however many times it is reconciled
        #[test]
        fn existing_repo_without_sync_is_idempotent(
            branch in branch(),
            set_upstream in upstream(),
            passes in 1usize..4,
        ) {
            let temp = TempDir::new().unwrap();
            fs::create_dir_all(temp.path().join("repo/.git")).unwrap();
            let path = temp.path().join("repo").to_string_lossy().into_owned();
            let runner = MockRunner::new();
            let calls = runner.calls.clone();
            let reconciler = Reconciler::new(runner);

            let decl = RepositoryDeclaration {
                branch,
                set_upstream,
                sync_on_load: Some(false),
                ..RepositoryDeclaration::new("https://x/a.git", path)
            }
            .finalize()
            .unwrap();

            for _ in 0..passes {
                let outcome = reconciler
                    .reconcile_one(&decl, &mut RecordingSink::new())
                    .unwrap();
                prop_assert_eq!(outcome, Outcome::Unchanged);
            }
            prop_assert!(calls.lock().unwrap().is_empty());
        }

        /// Property: guest-side cloning always fails before any command
        #[test]
        fn clone_in_guest_never_runs_git(
            branch in branch(),
            sync_on_load in any::<bool>(),
        ) {
            let runner = MockRunner::new();
            let calls = runner.calls.clone();

            let decl = RepositoryDeclaration {
                branch,
                sync_on_load: Some(sync_on_load),
                clone_in_host: Some(false),
                ..RepositoryDeclaration::new("https://x/a.git", "/nonexistent/repo")
            }
            .finalize()
            .unwrap();

            let result = Reconciler::new(runner).reconcile_one(&decl, &mut RecordingSink::new());
            let not_implemented = matches!(result, Err(Error::NotImplemented { .. }));
            prop_assert!(not_implemented);
            prop_assert!(calls.lock().unwrap().is_empty());
        }
    }
}
