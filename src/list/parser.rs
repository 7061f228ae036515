//! List file parser
//!
//! One operation per line. A line whose first character is `#` is a
//! comment; other lines are trimmed and skipped when empty. Lines starting
//! with `http://` or `https://` are downloads, everything else is a path
//! relative to the source root. Destinations mirror the relative path (or
//! the URL path) under the destination root.

use crate::core::{OpContext, Operation};
use crate::error::{BatchCopyError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};
use url::Url;

/// Read a list file into the operations of a batch
pub fn load_list(
    list_file: &Path,
    source_root: &Path,
    dest_root: &Path,
) -> Result<Vec<Operation>> {
    let file = File::open(list_file).map_err(|e| BatchCopyError::ListFile {
        path: list_file.to_path_buf(),
        source: e,
    })?;

    parse_list(
        BufReader::new(file),
        &list_file.display().to_string(),
        source_root,
        dest_root,
    )
}

/// Parse list content; `origin` names the list in operation contexts
pub fn parse_list<R: BufRead>(
    reader: R,
    origin: &str,
    source_root: &Path,
    dest_root: &Path,
) -> Result<Vec<Operation>> {
    if !source_root.is_absolute() || !dest_root.is_absolute() {
        return Err(BatchCopyError::config(format!(
            "source and destination roots must be absolute (got '{}' and '{}')",
            source_root.display(),
            dest_root.display()
        )));
    }

    let mut operations = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|e| BatchCopyError::ListFile {
            path: origin.into(),
            source: e,
        })?;

        if line.starts_with('#') {
            continue;
        }
        let entry = line.trim();
        if entry.is_empty() {
            continue;
        }

        let context = OpContext::new(origin, line_no);
        operations.push(parse_entry(entry, context, source_root, dest_root)?);
    }

    Ok(operations)
}

/// Turn one trimmed, non-comment line into an operation
pub fn parse_entry(
    entry: &str,
    context: OpContext,
    source_root: &Path,
    dest_root: &Path,
) -> Result<Operation> {
    if entry.starts_with("http://") || entry.starts_with("https://") {
        let invalid = |source: Box<dyn std::error::Error + Send + Sync>| {
            BatchCopyError::InvalidUrl {
                line: context.origin_line,
                url: entry.to_string(),
                source,
            }
        };
        let url = Url::parse(entry).map_err(|e| invalid(e.into()))?;
        let dest = url_destination(&url, dest_root).map_err(invalid)?;
        return Ok(Operation::download(url, dest, context));
    }

    let relative = strip_leading_separators(entry);
    Ok(Operation::local(
        source_root.join(relative),
        dest_root.join(relative),
        context,
    ))
}

/// Mirror the decoded URL path under `dest_root`
///
/// Segments are percent-decoded one at a time. A segment that decodes to a
/// separator or to `.`/`..` would escape its directory and is rejected.
fn url_destination(
    url: &Url,
    dest_root: &Path,
) -> std::result::Result<PathBuf, Box<dyn std::error::Error + Send + Sync>> {
    let mut dest = dest_root.to_path_buf();
    for segment in url.path_segments().into_iter().flatten() {
        if segment.is_empty() {
            continue;
        }
        let decoded = percent_decode_str(segment).decode_utf8()?;
        if decoded == "." || decoded == ".." || decoded.contains(std::path::is_separator) {
            return Err(format!("path segment '{}' is not a file name", decoded).into());
        }
        dest.push(&*decoded);
    }
    Ok(dest)
}

// Joining an absolute component would replace the root entirely
fn strip_leading_separators(path: &str) -> &str {
    path.trim_start_matches(std::path::is_separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OperationKind;
    use proptest::prelude::*;
    use std::io::Write;

    fn parse(content: &str) -> Result<Vec<Operation>> {
        parse_list(
            content.as_bytes(),
            "list.txt",
            Path::new("/src"),
            Path::new("/dst"),
        )
    }

    #[test]
    fn test_mixed_list() {
        let ops = parse("a.txt\n# comment\n \nhttps://example.com/b.bin\n").unwrap();

        assert_eq!(ops.len(), 2);

        match ops[0].kind() {
            OperationKind::LocalCopy(op) => {
                assert_eq!(op.source(), Path::new("/src/a.txt"));
                assert_eq!(op.dest(), Path::new("/dst/a.txt"));
            }
            other => panic!("expected local copy, got {:?}", other),
        }
        assert_eq!(ops[0].context().origin_line, 1);

        match ops[1].kind() {
            OperationKind::HttpDownload(op) => {
                assert_eq!(op.url().as_str(), "https://example.com/b.bin");
                assert_eq!(op.dest(), Path::new("/dst/b.bin"));
            }
            other => panic!("expected download, got {:?}", other),
        }
        assert_eq!(ops[1].context().origin_line, 4);
        assert_eq!(ops[1].context().origin_file, "list.txt");
    }

    #[test]
    fn test_entries_are_trimmed() {
        let ops = parse("   nested/dir/c.txt  \t\n").unwrap();
        assert_eq!(ops[0].dest(), Path::new("/dst/nested/dir/c.txt"));
    }

    #[test]
    fn test_indented_hash_is_not_a_comment() {
        let ops = parse("  # not a comment\n").unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].dest(), Path::new("/dst/# not a comment"));
    }

    #[test]
    fn test_leading_separator_stays_under_root() {
        let ops = parse("/etc/hosts\n").unwrap();
        assert_eq!(ops[0].dest(), Path::new("/dst/etc/hosts"));
    }

    #[test]
    fn test_url_path_mirrors_under_dest() {
        let ops = parse("http://example.com/pub/x/y.tar.gz?version=2\n").unwrap();
        assert_eq!(ops[0].dest(), Path::new("/dst/pub/x/y.tar.gz"));
    }

    #[test]
    fn test_url_path_is_percent_decoded() {
        let ops = parse("https://example.com/dir/a%20b.txt\nhttps://example.com/caf%C3%A9\n")
            .unwrap();
        assert_eq!(ops[0].dest(), Path::new("/dst/dir/a b.txt"));
        assert_eq!(ops[1].dest(), Path::new("/dst/café"));
    }

    #[test]
    fn test_encoded_separator_is_rejected() {
        let err = parse("https://example.com/a%2F..%2F..%2Fetc%2Fpasswd\n").unwrap_err();
        assert!(matches!(err, BatchCopyError::InvalidUrl { line: 1, .. }));
    }

    #[test]
    fn test_undecodable_path_is_rejected() {
        let err = parse("a.txt\nhttps://example.com/bad%FF.bin\n").unwrap_err();
        assert!(matches!(err, BatchCopyError::InvalidUrl { line: 2, .. }));
        assert!(err.to_string().starts_with("line 2"));
    }

    #[test]
    fn test_invalid_url_names_line() {
        let err = parse("a.txt\n\nhttp://[::1/broken\n").unwrap_err();
        match &err {
            BatchCopyError::InvalidUrl { line, url, .. } => {
                assert_eq!(*line, 3);
                assert_eq!(url, "http://[::1/broken");
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(err.is_preflight());
    }

    #[test]
    fn test_relative_roots_are_rejected() {
        let err = parse_list(
            "a.txt".as_bytes(),
            "list.txt",
            Path::new("src"),
            Path::new("/dst"),
        )
        .unwrap_err();
        assert!(matches!(err, BatchCopyError::ConfigError(_)));
    }

    #[test]
    fn test_load_list_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let list = dir.path().join("files.txt");
        let mut file = File::create(&list).unwrap();
        writeln!(file, "# header").unwrap();
        writeln!(file, "one.txt").unwrap();
        writeln!(file, "two.txt").unwrap();

        let ops = load_list(&list, Path::new("/src"), Path::new("/dst")).unwrap();

        assert_eq!(ops.len(), 2);
        assert_eq!(ops[1].context().origin_line, 3);
        assert_eq!(ops[1].context().origin_file, list.display().to_string());
    }

    #[test]
    fn test_missing_list_file() {
        let err = load_list(
            &PathBuf::from("/definitely/not/here.txt"),
            Path::new("/src"),
            Path::new("/dst"),
        )
        .unwrap_err();
        assert!(matches!(err, BatchCopyError::ListFile { .. }));
        assert!(err.is_preflight());
    }

    fn list_line() -> impl Strategy<Value = String> {
        prop_oneof![
            "#[a-z ]{0,10}",
            "[ \t]{0,3}",
            "[a-z]{1,8}(/[a-z]{1,8})?\\.txt",
            "https://example\\.com/[a-z]{1,8}",
        ]
    }

    proptest! {
        #[test]
        fn prop_one_operation_per_content_line(lines in prop::collection::vec(list_line(), 0..40)) {
            let expected = lines
                .iter()
                .filter(|l| !l.starts_with('#') && !l.trim().is_empty())
                .count();

            let ops = parse(&lines.join("\n")).unwrap();

            prop_assert_eq!(ops.len(), expected);
            prop_assert!(ops.iter().all(|op| op.dest().starts_with("/dst")));
            prop_assert!(ops
                .windows(2)
                .all(|w| w[0].context().origin_line < w[1].context().origin_line));
        }
    }
}
