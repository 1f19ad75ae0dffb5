//! Turns every `src/fixtures/<name>.html` into its own `#[test]`.
//!
//! A fixture may sit next to a `<name>.expected` file, one expectation per
//! line, `#` starting a comment:
//!
//! ```text
//! blocks: 2                                     named top-level blocks
//! depth: 1                                      depth after the last token
//! diagnostic: orphaned core/paragraph
//! diagnostic: mismatched core/group core/quote  expected, then found
//! ```
//!
//! Without one the fixture must tokenize cleanly and end at depth 0.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

#[derive(Default)]
struct Expected {
    blocks: Option<usize>,
    depth: usize,
    diagnostics: Vec<String>,
}

fn read_expected(path: &Path) -> Expected {
    let mut expected = Expected::default();
    let Ok(text) = fs::read_to_string(path) else {
        return expected;
    };

    for (n, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            panic!("{}:{}: expected `key: value`, got {line:?}", path.display(), n + 1);
        };
        let value = value.trim();
        let number = || {
            value
                .parse()
                .unwrap_or_else(|_| panic!("{}:{}: not a number: {value:?}", path.display(), n + 1))
        };
        match key.trim() {
            "blocks" => expected.blocks = Some(number()),
            "depth" => expected.depth = number(),
            "diagnostic" => expected
                .diagnostics
                .push(value.split_whitespace().collect::<Vec<_>>().join(" ")),
            other => panic!("{}:{}: unknown expectation {other:?}", path.display(), n + 1),
        }
    }
    expected
}

fn main() {
    let out_dir = std::env::var("OUT_DIR").unwrap();
    let dest = Path::new(&out_dir).join("fixture_tests.rs");

    let mut code = String::from(
        r#"mod fixtures {
    use super::{Expected, fixture_test};
"#,
    );

    let mut entries: Vec<_> = fs::read_dir("src/fixtures")
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|path| path.extension().is_some_and(|e| e == "html"))
        .collect();
    entries.sort();

    for path in entries {
        let name = path.file_stem().unwrap().to_str().unwrap();
        let expected = read_expected(&path.with_extension("expected"));
        write!(
            code,
            r#"
    #[test]
    fn {name}() {{
        fixture_test(
            "{name}",
            &Expected {{
                blocks: {blocks:?},
                depth: {depth},
                diagnostics: &{diagnostics:?},
            }},
        );
    }}
"#,
            blocks = expected.blocks,
            depth = expected.depth,
            diagnostics = expected.diagnostics,
        )
        .unwrap();
    }

    code.push_str("}\n");
    fs::write(&dest, code).unwrap();

    println!("cargo::rerun-if-changed=src/fixtures");
}
