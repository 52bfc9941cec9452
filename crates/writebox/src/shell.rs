//! Line-oriented command shell over a [`Workspace`].
//!
//! Each input line is one command; `help` lists them. Output goes to the writer passed to
//! [`Shell::run`], errors included, so a bad command never ends the session.

use anyhow::{Context, Result, anyhow, bail};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use writebox_core::grammar::SharedChecker;
use writebox_core::{
    BasicChecker, CheckStatus, CheckerLoader, Document, FindOutcome, FindSession, GrammarSession,
    SaveChoice, SearchOptions, SearchQuery, SearchScope, SessionState, TextEncoding, Workspace,
    Zoom, link_at,
};

const HELP: &str = "\
commands:
  type <text>          insert text at the cursor
  newline              insert a line break at the cursor
  text                 print the active document
  cursor <n>           move the cursor to character n
  select <a> <b>       select characters a..b
  undo | redo          step through history
  history              list undo steps
  find <pattern>       find the next match (see `options`, `scope`)
  wrap                 restart the search at the top of the scope
  replace <text>       replace the current match
  replace-all <text>   replace every match of the last pattern
  options [case] [word] [regex]
  scope document|paragraph|line|selection
  search-all <pattern> search every open document
  check                start a grammar check
  fix [n]              apply suggestion n (default 0) to the current issue
  fix-all [n]          apply suggestion n to every issue of the same rule
  skip | skip-all      ignore the current issue (or its whole rule)
  new | open <path> [encoding]
  save | save-as <path> | save-all
  close [save|save-all|discard]
  close-others
  tabs | switch <n>
  zoom in|out|reset
  link                 print the URL under the cursor
  title                print the window title
  quit";

/// Whether the shell keeps reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Interactive state on top of the workspace.
pub struct Shell {
    workspace: Workspace,
    find: Option<FindSession>,
    find_options: SearchOptions,
    find_scope: SearchScope,
    grammar: GrammarSession,
    zoom: Zoom,
}

/// Start loading the built-in checker in the background.
pub fn start_checker_load() {
    CheckerLoader::global().start(|| {
        let checker = BasicChecker::new()?;
        Ok(Arc::new(checker) as SharedChecker)
    });
}

impl Shell {
    /// A shell over `workspace`.
    pub fn new(workspace: Workspace) -> Self {
        Self {
            workspace,
            find: None,
            find_options: SearchOptions::default(),
            find_scope: SearchScope::Document,
            grammar: GrammarSession::new(),
            zoom: Zoom::default(),
        }
    }

    /// The underlying workspace.
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Read commands from `input` until `quit` or end of input.
    pub fn run(&mut self, input: impl BufRead, out: &mut impl Write) -> Result<()> {
        for line in input.lines() {
            let line = line.context("failed to read command")?;
            self.workspace.active_document_mut().poll_undo(Instant::now());

            match self.execute(line.trim(), out) {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(err) => writeln!(out, "error: {err:#}")?,
            }
        }
        Ok(())
    }

    fn doc(&mut self) -> &mut Document {
        self.workspace.active_document_mut()
    }

    fn execute(&mut self, line: &str, out: &mut impl Write) -> Result<Flow> {
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let now = Instant::now();

        match command {
            "" => {}
            "help" => writeln!(out, "{HELP}")?,
            "quit" | "exit" => return Ok(Flow::Quit),

            "type" => {
                let doc = self.doc();
                let cursor = doc.cursor();
                doc.insert(cursor, rest, now);
            }
            "newline" => {
                let doc = self.doc();
                let cursor = doc.cursor();
                doc.insert(cursor, "\n", now);
            }
            "text" => writeln!(out, "{}", self.workspace.active_document().content())?,
            "cursor" => {
                let offset = parse_number(rest)?;
                self.doc().set_cursor(offset);
            }
            "select" => {
                let (a, b) = rest
                    .split_once(' ')
                    .ok_or_else(|| anyhow!("usage: select <start> <end>"))?;
                let range = parse_number(a)?..parse_number(b)?;
                self.doc().set_selection(range);
            }
            "undo" => {
                if !self.doc().undo() {
                    writeln!(out, "nothing to undo")?;
                }
            }
            "redo" => {
                if !self.doc().redo() {
                    writeln!(out, "nothing to redo")?;
                }
            }
            "history" => {
                let doc = self.doc();
                doc.flush_undo();
                let position = doc.history_position();
                for (i, step) in doc.history().iter().enumerate() {
                    let marker = if i < position { ' ' } else { '~' };
                    writeln!(out, "{marker}{i}: {}", step.label())?;
                }
            }

            "find" => self.find_next(Some(rest), out)?,
            "wrap" => {
                if let Some(session) = self.find.as_mut() {
                    session.wrap_around();
                }
                self.find_next(None, out)?;
            }
            "replace" => {
                let session = self
                    .find
                    .as_mut()
                    .ok_or_else(|| anyhow!("nothing found yet"))?;
                let doc = self.workspace.active_document_mut();
                if !session.replace_current(doc, rest, now) {
                    writeln!(out, "no current match")?;
                }
            }
            "replace-all" => {
                let session = self
                    .find
                    .as_mut()
                    .ok_or_else(|| anyhow!("use `find` to set a pattern first"))?;
                let doc = self.workspace.active_document_mut();
                let count = session.replace_all(doc, rest, now)?;
                writeln!(out, "replaced {count} occurrence(s)")?;
            }
            "options" => {
                let words: Vec<_> = rest.split_whitespace().collect();
                self.find_options = SearchOptions {
                    match_case: words.contains(&"case"),
                    whole_word: words.contains(&"word"),
                    use_regex: words.contains(&"regex"),
                };
                self.find = None;
            }
            "scope" => {
                self.find_scope = match rest {
                    "document" => SearchScope::Document,
                    "paragraph" => SearchScope::Paragraph,
                    "line" => SearchScope::CurrentLine,
                    "selection" => SearchScope::Selection,
                    other => bail!("unknown scope {other:?}"),
                };
                self.find = None;
            }
            "search-all" => {
                let results = self
                    .workspace
                    .search_all_documents(rest, self.find_options)?;
                for result in results {
                    let title = self
                        .workspace
                        .document(result.id)
                        .map(Document::title)
                        .unwrap_or_default();
                    writeln!(out, "{title}: {} match(es)", result.matches.len())?;
                }
            }

            "check" => self.check(out)?,
            "fix" | "fix-all" => {
                let choice = if rest.is_empty() { 0 } else { parse_number(rest)? };
                let replacement = self
                    .grammar
                    .current()
                    .and_then(|issue| issue.replacements.get(choice).cloned())
                    .ok_or_else(|| anyhow!("no suggestion {choice}"))?;
                let text = self.workspace.active_document().content().to_string();
                let corrected = if command == "fix" {
                    self.grammar.replace_current(&text, &replacement)?
                } else {
                    self.grammar.replace_all_by_rule(&text, &replacement)?
                };
                self.doc().set_text(corrected.text, 0, now);
                self.report_status(corrected.status, out)?;
            }
            "skip" => {
                let status = self.grammar.ignore();
                self.report_status(status, out)?;
            }
            "skip-all" => {
                let status = self.grammar.ignore_all_by_rule()?;
                self.report_status(status, out)?;
            }

            "new" => {
                self.workspace.new_document();
                self.reset_sessions();
            }
            "open" => {
                let mut parts = rest.split_whitespace();
                let path = parts.next().ok_or_else(|| anyhow!("usage: open <path>"))?;
                let encoding = parts.next().map(TextEncoding::for_label).transpose()?;
                self.workspace.open(path, encoding)?;
                self.reset_sessions();
            }
            "save" => self.doc().save()?,
            "save-as" => {
                if rest.is_empty() {
                    bail!("usage: save-as <path>");
                }
                self.doc().save_as(PathBuf::from(rest))?;
            }
            "save-all" => {
                for failure in self.workspace.save_all() {
                    writeln!(out, "{}: {}", failure.id.get(), failure.error)?;
                }
            }
            "close" => {
                let choice = match rest {
                    "" | "save" => SaveChoice::Save,
                    "save-all" => SaveChoice::SaveAll,
                    "discard" => SaveChoice::Discard,
                    other => bail!("unknown choice {other:?}"),
                };
                let id = self.workspace.active();
                if self.workspace.needs_save_prompt(id)? && rest.is_empty() {
                    writeln!(out, "unsaved changes; use `close save`, `close save-all` or `close discard`")?;
                } else if self.workspace.close(id, choice)? {
                    self.reset_sessions();
                }
            }
            "close-others" => {
                let left = self.workspace.close_others(self.workspace.active())?;
                if !left.is_empty() {
                    writeln!(out, "{} tab(s) with unsaved changes left open", left.len())?;
                }
            }
            "tabs" => {
                let active = self.workspace.active();
                for (i, (id, title)) in self.workspace.tab_titles().into_iter().enumerate() {
                    let marker = if id == active { '>' } else { ' ' };
                    writeln!(out, "{marker}{i}: {title}")?;
                }
            }
            "switch" => {
                let index = parse_number(rest)?;
                let id = *self
                    .workspace
                    .ids()
                    .get(index)
                    .ok_or_else(|| anyhow!("no tab {index}"))?;
                self.workspace.set_active(id)?;
                self.reset_sessions();
            }

            "zoom" => {
                match rest {
                    "in" => {
                        self.zoom.zoom_in();
                    }
                    "out" => {
                        self.zoom.zoom_out();
                    }
                    "reset" => self.zoom.reset(),
                    other => bail!("unknown zoom {other:?}"),
                }
                writeln!(out, "zoom {:.0}%", self.zoom.level() * 100.0)?;
            }
            "link" => {
                let doc = self.workspace.active_document();
                match link_at(doc.content(), doc.cursor()) {
                    Some(url) => writeln!(out, "{url}")?,
                    None => writeln!(out, "no link")?,
                }
            }
            "title" => writeln!(out, "{}", self.workspace.active_document().window_title())?,

            other => bail!("unknown command {other:?} (try `help`)"),
        }

        Ok(Flow::Continue)
    }

    fn reset_sessions(&mut self) {
        self.find = None;
        self.grammar = GrammarSession::new();
    }

    fn find_next(&mut self, pattern: Option<&str>, out: &mut impl Write) -> Result<()> {
        let query_changed = pattern.is_some_and(|pattern| {
            self.find
                .as_ref()
                .is_none_or(|session| session.query().pattern != pattern)
        });

        if query_changed || self.find.is_none() {
            let pattern = pattern.unwrap_or_default();
            let query = SearchQuery::new(pattern)
                .with_scope(self.find_scope)
                .with_options(self.find_options);
            self.find = Some(FindSession::new(query, self.workspace.active_document()));
        }

        let Some(session) = self.find.as_mut() else {
            return Ok(());
        };
        let doc = self.workspace.active_document_mut();
        match session.find_next(doc)? {
            FindOutcome::Found(m) => writeln!(out, "found at {}..{}", m.start, m.end)?,
            FindOutcome::ReachedEnd => writeln!(out, "reached the end; `wrap` to continue")?,
            FindOutcome::NotFound => {
                writeln!(out, "cannot find {:?}", session.query().pattern)?
            }
        }
        Ok(())
    }

    fn check(&mut self, out: &mut impl Write) -> Result<()> {
        if matches!(self.grammar.state(), SessionState::Uninitialized) {
            self.grammar.attach(CheckerLoader::global());
        }
        if matches!(self.grammar.state(), SessionState::CheckerLoading) {
            writeln!(out, "waiting for the grammar checker...")?;
        }
        self.grammar.wait_ready()?;

        let text = self.workspace.active_document().content().to_string();
        let status = self.grammar.start(&text)?;
        self.report_status(status, out)
    }

    fn report_status(&self, status: CheckStatus, out: &mut impl Write) -> Result<()> {
        match status {
            CheckStatus::Issue(_) => {
                if let Some(issue) = self.grammar.current() {
                    writeln!(
                        out,
                        "{}..{} {:?}: {} [{}] suggestions: {}",
                        issue.offset,
                        issue.offset + issue.length,
                        issue.matched_text,
                        issue.message,
                        issue.rule_id,
                        issue.replacements.join(" | ")
                    )?;
                }
            }
            CheckStatus::NoErrors => writeln!(out, "no errors found")?,
            CheckStatus::EndOfDocument => writeln!(out, "reached the end of the document")?,
        }
        Ok(())
    }
}

fn parse_number(value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .with_context(|| format!("expected a number, got {value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(script: &str) -> (Shell, String) {
        let mut shell = Shell::new(Workspace::default());
        let mut out = Vec::new();
        shell.run(script.as_bytes(), &mut out).unwrap();
        (shell, String::from_utf8(out).unwrap())
    }

    #[test]
    fn typing_and_undo() {
        let (shell, out) = run("type hello\nundo\ntext\ntitle\n");
        assert_eq!(shell.workspace().active_document().content(), "");
        assert!(out.contains("Untitled* - WriteBox"));
    }

    #[test]
    fn find_reports_wraparound() {
        let (_, out) = run("type one two one\nfind one\nfind one\nfind one\nwrap\n");
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "found at 0..3",
                "found at 8..11",
                "reached the end; `wrap` to continue",
                "found at 0..3",
            ]
        );
    }

    #[test]
    fn replace_all_uses_the_last_pattern() {
        let (shell, out) = run("type a cat and a cat\nfind cat\nreplace-all dog\n");
        assert!(out.contains("replaced 2 occurrence(s)"));
        assert_eq!(
            shell.workspace().active_document().content(),
            "a dog and a dog"
        );
    }

    #[test]
    fn grammar_fix_applies_the_suggestion() {
        start_checker_load();
        let (shell, out) = run("type the the end\ncheck\nfix\n");
        assert!(out.contains("WORD_REPEAT_RULE"));
        assert!(out.contains("reached the end of the document"));
        assert_eq!(shell.workspace().active_document().content(), "the end");
    }

    #[test]
    fn second_check_after_fixing_finds_nothing() {
        start_checker_load();
        let (_, out) = run("type the the end\ncheck\nfix\ncheck\n");
        assert!(out.contains("reached the end of the document"));
        assert!(out.ends_with("no errors found\n"));
    }

    #[test]
    fn bad_commands_do_not_stop_the_shell() {
        let (_, out) = run("frobnicate\ncursor x\ntype ok\ntext\n");
        assert!(out.contains("unknown command"));
        assert!(out.contains("expected a number"));
        assert!(out.ends_with("ok\n"));
    }
}
