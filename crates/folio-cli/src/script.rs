//! Line-oriented edit scripts.
//!
//! One command per line. Blank lines and lines starting with `#` are skipped.
//! Blocks are numbered from 1 in document order and resolved when the line
//! runs, so numbers always refer to the document as it is at that point.
//!
//! ```text
//! title Groceries
//! focus 1
//! type oat milk
//! select 0 3
//! bold
//! insert checkbox
//! check 2
//! undo
//! ```

use folio_common::{FolioError, line_span};
use folio_editor_core::{
    BlockKind, BlockTemplate, DocumentSnapshot, EditorAction, MediaRef, NoteEditor, Selection,
    SpanStyle, TextAlign, TextInput, execute_action,
};
use miette::NamedSource;

/// A parsed script command. Block numbers are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Title(String),
    Focus(Option<usize>),
    Type(String),
    Select(usize, usize),
    Style(SpanStyle),
    Align(TextAlign),
    List,
    Insert(BlockTemplate),
    InsertImage(MediaRef),
    Delete(usize),
    Move(usize, usize),
    Check(usize, Option<bool>),
    Toggle(usize),
    Expand(usize),
    Radio(usize, usize),
    Undo,
    Redo,
    Commit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub line: usize,
    pub step: Step,
}

/// What running a script did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub applied: usize,
    /// Lines that were valid but changed nothing.
    pub unchanged: usize,
}

/// A script ready to run, keeping its source for diagnostics.
#[derive(Debug)]
pub struct Script {
    name: String,
    source: String,
    lines: Vec<ScriptLine>,
}

impl Script {
    pub fn parse(name: impl Into<String>, source: impl Into<String>) -> Result<Self, FolioError> {
        let name = name.into();
        let source = source.into();
        let mut lines = Vec::new();
        for (i, text) in source.lines().enumerate() {
            let line = i + 1;
            let text = text.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            match parse_step(text) {
                Ok(step) => lines.push(ScriptLine { line, step }),
                Err((message, advice)) => {
                    return Err(script_error(&name, &source, line, message, advice));
                }
            }
        }
        Ok(Self {
            name,
            source,
            lines,
        })
    }

    pub fn lines(&self) -> &[ScriptLine] {
        &self.lines
    }

    /// Run every line against `editor`, stopping at the first line that
    /// refers to something the document does not have.
    pub fn run(&self, editor: &mut NoteEditor) -> Result<RunReport, FolioError> {
        let mut report = RunReport::default();
        for ScriptLine { line, step } in &self.lines {
            let action = step.resolve(editor.document()).map_err(|message| {
                script_error(&self.name, &self.source, *line, message, None)
            })?;
            if execute_action(editor, &action) {
                report.applied += 1;
            } else {
                tracing::info!(target: "folio::script", line, ?action, "line changed nothing");
                report.unchanged += 1;
            }
        }
        Ok(report)
    }
}

fn script_error(
    name: &str,
    source: &str,
    line: usize,
    message: impl Into<String>,
    advice: Option<String>,
) -> FolioError {
    FolioError::Script {
        line,
        message: message.into(),
        src: NamedSource::new(name, source.to_owned()),
        span: line_span(source, line),
        advice,
    }
}

type ParseFailure = (String, Option<String>);

fn parse_step(text: &str) -> Result<Step, ParseFailure> {
    let (command, rest) = match text.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (text, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();
    let step = match command {
        "title" => Step::Title(rest.to_owned()),
        "focus" => match rest {
            "none" => Step::Focus(None),
            _ => Step::Focus(Some(block_number(rest)?)),
        },
        "type" => Step::Type(rest.to_owned()),
        "select" => {
            let [start, end] = exactly::<2>(&args, "select <start> <end>")?;
            Step::Select(offset(start)?, offset(end)?)
        }
        "bold" => Step::Style(SpanStyle::Bold),
        "italic" => Step::Style(SpanStyle::Italic),
        "underline" => Step::Style(SpanStyle::Underline),
        "strike" | "strikethrough" => Step::Style(SpanStyle::Strikethrough),
        "align" => Step::Align(match rest {
            "start" | "left" => TextAlign::Start,
            "center" => TextAlign::Center,
            "end" | "right" => TextAlign::End,
            "justify" => TextAlign::Justify,
            other => {
                return Err((
                    format!("unknown alignment `{other}`"),
                    Some("use start, center, end or justify".to_owned()),
                ));
            }
        }),
        "list" => Step::List,
        "insert" => match args.as_slice() {
            ["image", resource] => Step::InsertImage(MediaRef::from(*resource)),
            [kind] => Step::Insert(kind.parse().map_err(|kind| {
                let known: Vec<_> = BlockTemplate::ALL.iter().map(|t| t.keyword()).collect();
                (
                    format!("unknown block kind `{kind}`"),
                    Some(format!("known kinds: {}, image <ref>", known.join(", "))),
                )
            })?),
            _ => return Err(usage("insert <kind>")),
        },
        "delete" => Step::Delete(block_number(rest)?),
        "move" => {
            let [from, to] = exactly::<2>(&args, "move <from> <to>")?;
            Step::Move(block_number(from)?, block_number(to)?)
        }
        "check" => match args.as_slice() {
            [block] => Step::Check(block_number(block)?, None),
            [block, "on"] => Step::Check(block_number(block)?, Some(true)),
            [block, "off"] => Step::Check(block_number(block)?, Some(false)),
            _ => return Err(usage("check <block> [on|off]")),
        },
        "toggle" => Step::Toggle(block_number(rest)?),
        "expand" => Step::Expand(block_number(rest)?),
        "radio" => {
            let [block, option] = exactly::<2>(&args, "radio <block> <option>")?;
            Step::Radio(block_number(block)?, block_number(option)?)
        }
        "undo" => Step::Undo,
        "redo" => Step::Redo,
        "commit" => Step::Commit,
        other => {
            return Err((
                format!("unknown command `{other}`"),
                Some("see the `folio edit --help` output for the command list".to_owned()),
            ));
        }
    };
    Ok(step)
}

fn usage(form: &str) -> ParseFailure {
    ("wrong arguments".to_owned(), Some(format!("usage: {form}")))
}

fn exactly<'a, const N: usize>(args: &[&'a str], form: &str) -> Result<[&'a str; N], ParseFailure> {
    <[&str; N]>::try_from(args).map_err(|_| usage(form))
}

fn block_number(text: &str) -> Result<usize, ParseFailure> {
    match text.parse::<usize>() {
        Ok(0) => Err(("block numbers start at 1".to_owned(), None)),
        Ok(n) => Ok(n),
        Err(_) => Err((format!("expected a number, found `{text}`"), None)),
    }
}

fn offset(text: &str) -> Result<usize, ParseFailure> {
    text.parse()
        .map_err(|_| (format!("expected a character offset, found `{text}`"), None))
}

impl Step {
    /// Turn the step into an action against the current document.
    pub fn resolve(&self, doc: &DocumentSnapshot) -> Result<EditorAction, String> {
        let block_at = |n: usize| {
            doc.blocks
                .get(n - 1)
                .ok_or_else(|| format!("no block {n}, the note has {}", doc.blocks.len()))
        };
        let focused = || {
            doc.focused_block()
                .map(|b| b.id())
                .ok_or_else(|| "no block is focused; use `focus <block>` first".to_owned())
        };

        let action = match self {
            Step::Title(title) => EditorAction::SetTitle(title.clone()),
            Step::Focus(None) => EditorAction::Focus(None),
            Step::Focus(Some(n)) => EditorAction::Focus(Some(block_at(*n)?.id())),
            Step::Type(text) => EditorAction::ChangeText {
                block: focused()?,
                input: TextInput::new(text.as_str()),
            },
            Step::Select(start, end) => EditorAction::Select {
                block: focused()?,
                selection: Selection::new(*start, *end),
            },
            Step::Style(style) => EditorAction::ToggleStyle(*style),
            Step::Align(align) => EditorAction::SetAlign(*align),
            Step::List => EditorAction::ToggleListItem,
            Step::Insert(template) => EditorAction::Insert(*template),
            Step::InsertImage(resource) => EditorAction::InsertImage(resource.clone()),
            Step::Delete(n) => EditorAction::Delete(block_at(*n)?.id()),
            Step::Move(from, to) => EditorAction::Move {
                from: from - 1,
                to: to - 1,
            },
            Step::Check(n, state) => {
                let block = block_at(*n)?;
                let BlockKind::Checkbox(checkbox) = &block.kind else {
                    return Err(format!("block {n} is a {}, not a checkbox", block.kind_name()));
                };
                EditorAction::SetChecked {
                    block: block.id(),
                    checked: state.unwrap_or(!checkbox.checked),
                }
            }
            Step::Toggle(n) => {
                let block = block_at(*n)?;
                let BlockKind::ToggleSwitch(switch) = &block.kind else {
                    return Err(format!("block {n} is a {}, not a toggle", block.kind_name()));
                };
                EditorAction::SetToggle {
                    block: block.id(),
                    on: !switch.on,
                }
            }
            Step::Expand(n) => {
                let block = block_at(*n)?;
                if !matches!(block.kind, BlockKind::Accordion(_)) {
                    return Err(format!("block {n} is a {}, not an accordion", block.kind_name()));
                }
                EditorAction::ToggleAccordion(block.id())
            }
            Step::Radio(n, option) => {
                let block = block_at(*n)?;
                let BlockKind::RadioGroup(group) = &block.kind else {
                    return Err(format!("block {n} is a {}, not a radio group", block.kind_name()));
                };
                let choice = group.options.get(option - 1).ok_or_else(|| {
                    format!("radio group {n} has {} options", group.options.len())
                })?;
                EditorAction::SelectRadio {
                    group: block.id(),
                    option: choice.id,
                }
            }
            Step::Undo => EditorAction::Undo,
            Step::Redo => EditorAction::Redo,
            Step::Commit => EditorAction::Commit,
        };
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_editor_core::{EditorConfig, PlatformServices};
    use miette::Diagnostic;

    fn editor() -> (NoteEditor, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let services = PlatformServices::headless(dir.path());
        (NoteEditor::new(EditorConfig::default(), services), dir)
    }

    // === Parsing ===

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let script = Script::parse("s", "# plan\n\ntitle  Weekend plans \ninsert checkbox\n").unwrap();
        assert_eq!(
            script.lines(),
            &[
                ScriptLine {
                    line: 3,
                    step: Step::Title("Weekend plans".into()),
                },
                ScriptLine {
                    line: 4,
                    step: Step::Insert(BlockTemplate::Checkbox),
                },
            ]
        );
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!(parse_step("select 2 5"), Ok(Step::Select(2, 5)));
        assert_eq!(parse_step("check 3 off"), Ok(Step::Check(3, Some(false))));
        assert_eq!(parse_step("focus none"), Ok(Step::Focus(None)));
        assert_eq!(parse_step("align right"), Ok(Step::Align(TextAlign::End)));
        assert_eq!(
            parse_step("insert image content://media/4"),
            Ok(Step::InsertImage(MediaRef::from("content://media/4")))
        );
        assert_eq!(parse_step("move 1 3"), Ok(Step::Move(1, 3)));
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = Script::parse("plan.txt", "title x\ninsert table\n").unwrap_err();
        assert_eq!(err.code().map(|c| c.to_string()).as_deref(), Some("folio::script"));
        let FolioError::Script {
            line,
            message,
            advice,
            ..
        } = &err
        else {
            panic!("unexpected error {err:?}");
        };
        assert_eq!(*line, 2);
        assert_eq!(message, "unknown block kind `table`");
        assert!(advice.as_deref().is_some_and(|a| a.contains("checkbox")));
    }

    #[test]
    fn test_parse_rejects_bad_numbers() {
        assert!(parse_step("delete 0").is_err());
        assert!(parse_step("delete two").is_err());
        assert!(parse_step("move 1").is_err());
        assert!(parse_step("check").is_err());
        assert!(parse_step("frobnicate").is_err());
    }

    // === Running ===

    #[test]
    fn test_run_builds_note() {
        let (mut editor, _dir) = editor();
        let script = Script::parse(
            "s",
            "title Packing\nfocus 1\ntype passport\nselect 0 4\nbold\ninsert checkbox\nfocus 2\ntype charger\ncheck 2\ninsert toggle\ntoggle 3\n",
        )
        .unwrap();
        let report = script.run(&mut editor).unwrap();
        assert_eq!(report.unchanged, 0);
        editor.set_focus(None);

        let outline = editor.document().outline();
        let filled: Vec<_> = outline.lines().filter(|l| !l.trim().is_empty()).collect();
        insta::assert_snapshot!(filled.join("\n"), @r"
        Packing
        =======
          passport
          [x] charger
          [on] Toggle Switch
        ");
        assert_eq!(editor.document().blocks.len(), 5);
    }

    #[test]
    fn test_run_undo_counts_unchanged_at_floor() {
        let (mut editor, _dir) = editor();
        let script = Script::parse("s", "undo\ninsert separator\nundo\nredo\n").unwrap();
        let report = script.run(&mut editor).unwrap();
        assert_eq!(report, RunReport { applied: 3, unchanged: 1 });
        assert_eq!(editor.document().blocks.len(), 2);
    }

    #[test]
    fn test_run_rejects_missing_block() {
        let (mut editor, _dir) = editor();
        let script = Script::parse("s", "insert separator\ncheck 2\n").unwrap();
        let err = script.run(&mut editor).unwrap_err();
        let FolioError::Script { line, message, .. } = &err else {
            panic!("unexpected error {err:?}");
        };
        assert_eq!(*line, 2);
        assert!(message.contains("not a checkbox"), "{message}");
    }

    #[test]
    fn test_type_needs_focus() {
        let (mut editor, _dir) = editor();
        let script = Script::parse("s", "type hello\n").unwrap();
        assert!(script.run(&mut editor).is_err());
    }
}
