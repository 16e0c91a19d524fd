#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use crate::error::AppError;
    use crate::indexer::{build_globset, index_course, index_library, IndexOptions};
    use crate::tests::write_file;
    use crate::types::ContentNode;

    fn titles(nodes: &[ContentNode]) -> Vec<&str> {
        nodes.iter().map(ContentNode::title).collect()
    }

    fn create_course() -> TempDir {
        let dir = TempDir::new().unwrap();
        let base = dir.path();
        write_file(base, "10 - Intro.mp4", b"x");
        write_file(base, "2 - Setup.mp4", b"x");
        write_file(base, "Bonus.pdf", b"x");
        write_file(base, "1 - Welcome.mp4", b"x");
        write_file(base, "readme.txt", b"ignored");
        write_file(base, "Modulo 2/Aula 10.webm", b"x");
        write_file(base, "Modulo 2/Aula 2.webm", b"x");
        write_file(base, "Modulo 2/Extras/notes.txt", b"only text");
        write_file(base, "Modulo 2/Deep/Deeper/page.html", b"<p>x</p>");
        write_file(base, "Empty/also-empty/cover.jpg", b"x");
        dir
    }

    #[test]
    fn siblings_follow_natural_order() {
        let dir = TempDir::new().unwrap();
        for name in ["10 - Intro.mp4", "2 - Setup.mp4", "Bonus.pdf", "1 - Welcome.mp4"] {
            write_file(dir.path(), name, b"x");
        }
        let content = index_course(dir.path(), &IndexOptions::default());
        assert_eq!(titles(&content), vec!["1 - Welcome.mp4", "2 - Setup.mp4", "10 - Intro.mp4", "Bonus.pdf"]);
    }

    #[test]
    fn directories_without_lessons_are_pruned() {
        let dir = create_course();
        let content = index_course(dir.path(), &IndexOptions::default());

        assert!(!titles(&content).contains(&"Empty"));
        assert!(!titles(&content).contains(&"readme.txt"));

        let module = content.iter().find(|n| n.title() == "Modulo 2").expect("module present");
        let ContentNode::Module { children, path, .. } = module else {
            panic!("expected module");
        };
        assert_eq!(path, "Modulo 2");
        assert_eq!(titles(children), vec!["Aula 2.webm", "Aula 10.webm", "Deep"]);
        assert!(!titles(children).contains(&"Extras"));
    }

    #[test]
    fn every_module_contains_a_lesson() {
        fn check(nodes: &[ContentNode]) {
            for n in nodes {
                if let ContentNode::Module { children, .. } = n {
                    assert!(n.lesson_count() > 0, "empty module {}", n.path());
                    check(children);
                }
            }
        }
        let dir = create_course();
        check(&index_course(dir.path(), &IndexOptions::default()));
    }

    #[test]
    fn nested_paths_are_relative_and_slash_separated() {
        let dir = create_course();
        let content = index_course(dir.path(), &IndexOptions::default());
        let ContentNode::Module { children, .. } = content.iter().find(|n| n.title() == "Modulo 2").unwrap() else {
            panic!("expected module");
        };
        let ContentNode::Module { children: deep, path, .. } = children.iter().find(|n| n.title() == "Deep").unwrap()
        else {
            panic!("expected module");
        };
        assert_eq!(path, "Modulo 2/Deep");
        let ContentNode::Module { children: deeper, .. } = &deep[0] else {
            panic!("expected module");
        };
        assert_eq!(deeper[0].path(), "Modulo 2/Deep/Deeper/page.html");
    }

    #[test]
    fn indexing_is_idempotent() {
        let dir = create_course();
        let first = index_course(dir.path(), &IndexOptions::default());
        let second = index_course(dir.path(), &IndexOptions::default());
        assert_eq!(first, second);
        assert_eq!(serde_json::to_string(&first).unwrap(), serde_json::to_string(&second).unwrap());
    }

    #[test]
    fn titles_are_decoded_but_paths_stay_raw() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "M%C3%B3dulo%201/Aula%201.mp4", b"x");
        let content = index_course(dir.path(), &IndexOptions::default());
        assert_eq!(content[0].title(), "Módulo 1");
        assert_eq!(content[0].path(), "M%C3%B3dulo%201");
        let ContentNode::Module { children, .. } = &content[0] else { panic!("expected module") };
        assert_eq!(children[0].title(), "Aula 1.mp4");
        assert_eq!(children[0].path(), "M%C3%B3dulo%201/Aula%201.mp4");
    }

    #[test]
    fn serialized_shape_uses_kind_tags() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "M/a.mp4", b"x");
        let content = index_course(dir.path(), &IndexOptions::default());
        let v = serde_json::to_value(&content).unwrap();
        assert_eq!(v[0]["kind"], "module");
        assert_eq!(v[0]["children"][0]["kind"], "lesson");
        assert_eq!(v[0]["children"][0]["path"], "M/a.mp4");
    }

    #[test]
    fn excludes_skip_matching_entries() {
        let dir = create_course();
        let opts = IndexOptions {
            excludes: build_globset(&["Bonus.*".to_string(), "Modulo 2/Deep".to_string()]).unwrap(),
            ..IndexOptions::default()
        };
        let content = index_course(dir.path(), &opts);
        assert!(!titles(&content).contains(&"Bonus.pdf"));
        let ContentNode::Module { children, .. } = content.iter().find(|n| n.title() == "Modulo 2").unwrap() else {
            panic!("expected module");
        };
        assert!(!titles(children).contains(&"Deep"));
    }

    #[test]
    fn max_depth_limits_descent() {
        let dir = create_course();
        let opts = IndexOptions { max_depth: Some(0), ..IndexOptions::default() };
        let content = index_course(dir.path(), &opts);
        assert!(content.iter().all(|n| matches!(n, ContentNode::Lesson { .. })));
        assert_eq!(content.len(), 4);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_followed_only_when_enabled() {
        let target = TempDir::new().unwrap();
        write_file(target.path(), "linked.mp4", b"x");
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "own.mp4", b"x");
        std::os::unix::fs::symlink(target.path(), dir.path().join("Shared")).unwrap();

        let content = index_course(dir.path(), &IndexOptions::default());
        assert_eq!(titles(&content), vec!["own.mp4"]);

        let opts = IndexOptions { follow_symlinks: true, ..IndexOptions::default() };
        let content = index_course(dir.path(), &opts);
        assert_eq!(titles(&content), vec!["own.mp4", "Shared"]);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_module_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "1 - Open.mp4", b"x");
        write_file(dir.path(), "Locked/secret.mp4", b"x");
        write_file(dir.path(), "Visible/a.pdf", b"x");
        let locked = dir.path().join("Locked");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        // root ignores permission bits
        if std::fs::read_dir(&locked).is_ok() {
            std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let content = index_course(dir.path(), &IndexOptions::default());
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(titles(&content), vec!["1 - Open.mp4", "Visible"]);
    }

    #[tokio::test]
    async fn library_lists_one_course_per_directory() {
        let root = TempDir::new().unwrap();
        write_file(root.path(), "Rust/01 - Ownership.mp4", b"x");
        write_file(root.path(), "Algebra/1 - Vectors.pdf", b"x");
        write_file(root.path(), "Nothing Yet/notes.txt", b"x");
        write_file(root.path(), "loose-file.mp4", b"x");

        let courses = index_library(root.path().to_path_buf(), Arc::new(IndexOptions::default()), 2)
            .await
            .unwrap();

        let names: Vec<&str> = courses.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(names, vec!["Algebra", "Nothing Yet", "Rust"]);
        assert_eq!(courses[2].description, "Course: Rust");
        assert_eq!(courses[2].content[0].path(), "01 - Ownership.mp4");
        assert!(courses[1].content.is_empty());
    }

    #[tokio::test]
    async fn missing_root_is_not_found() {
        let root = TempDir::new().unwrap();
        let missing = root.path().join("gone");
        let err = index_library(missing, Arc::new(IndexOptions::default()), 1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
