//! Line-oriented terminal driver for an exam session.

use std::fmt::{self, Write as _};
use std::io::Write as _;
use std::time::Duration;

use exam_core::model::{
    ChoiceError, ChoiceLetter, FontSize, NavigationMode, SectionId, SectionResult, SettingsPatch,
    Theme,
};
use exam_core::time::format_clock;
use services::{Action, ExamController, ExamSession, ResetMode, Screen, TickOutcome, View};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

//
// ─── INPUT ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Help,
    Status,
    Quit,
    Start(SectionId),
    Mock,
    Begin,
    Back,
    Show(Option<usize>),
    Answer { index: usize, choice: ChoiceLetter },
    Bookmark(usize),
    Bookmarks,
    ClearBookmarks,
    Goto { section: SectionId, index: usize },
    Submit,
    Pause,
    Hold,
    Resume,
    Next,
    Review(SectionId),
    Open(Screen),
    Set(SettingsPatch),
    Reset { soft: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    Empty,
    Unknown(String),
    Usage(&'static str),
    BadNumber(String),
    BadChoice(ChoiceError),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Empty => f.write_str("empty input"),
            InputError::Unknown(cmd) => write!(f, "unknown command: {cmd} (try `help`)"),
            InputError::Usage(usage) => write!(f, "usage: {usage}"),
            InputError::BadNumber(raw) => write!(f, "not a question number: {raw}"),
            InputError::BadChoice(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for InputError {}

/// Question numbers are typed 1-based and stored 0-based.
fn question_index(raw: &str) -> Result<usize, InputError> {
    raw.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .ok_or_else(|| InputError::BadNumber(raw.to_string()))
}

fn section_id(raw: &str) -> SectionId {
    SectionId::new(raw.to_ascii_uppercase())
}

fn on_off(raw: &str) -> Option<bool> {
    match raw {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn parse_setting(key: &str, value: &str) -> Option<SettingsPatch> {
    let mut patch = SettingsPatch::new();
    match key {
        "theme" => {
            patch.theme = Some(match value {
                "light" => Theme::Light,
                "dark" => Theme::Dark,
                _ => return None,
            });
        }
        "font" => {
            patch.font_size = Some(match value {
                "small" => FontSize::Small,
                "medium" => FontSize::Medium,
                "large" => FontSize::Large,
                _ => return None,
            });
        }
        "nav" => {
            patch.navigation_mode = Some(match value {
                "buttons" => NavigationMode::Buttons,
                "scroll" => NavigationMode::Scroll,
                _ => return None,
            });
        }
        "autosave" => patch.auto_save = Some(on_off(value)?),
        "study" => patch.study_mode = Some(on_off(value)?),
        "shortcuts" => patch.keyboard_shortcuts = Some(on_off(value)?),
        _ => return None,
    }
    Some(patch)
}

/// Parse one line of user input.
///
/// # Errors
///
/// Returns `InputError` for blank lines, unknown commands, or bad arguments.
pub fn parse_input(line: &str) -> Result<Input, InputError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((command, rest)) = words.split_first() else {
        return Err(InputError::Empty);
    };
    let input = match (command.to_ascii_lowercase().as_str(), rest) {
        ("help" | "?", []) => Input::Help,
        ("status" | "menu", []) => Input::Status,
        ("quit" | "exit", []) => Input::Quit,
        ("start", [section]) => Input::Start(section_id(section)),
        ("start", _) => return Err(InputError::Usage("start <SECTION>")),
        ("mock", []) => Input::Mock,
        ("begin", []) => Input::Begin,
        ("back", []) => Input::Back,
        ("show", []) => Input::Show(None),
        ("show", [n]) => Input::Show(Some(question_index(n)?)),
        ("answer" | "a", [n, letter]) => Input::Answer {
            index: question_index(n)?,
            choice: letter.parse().map_err(InputError::BadChoice)?,
        },
        ("answer" | "a", _) => return Err(InputError::Usage("answer <number> <letter>")),
        ("bookmark" | "b", [n]) => Input::Bookmark(question_index(n)?),
        ("bookmarks", []) => Input::Bookmarks,
        ("clear-bookmarks", []) => Input::ClearBookmarks,
        ("goto", [section, n]) => Input::Goto {
            section: section_id(section),
            index: question_index(n)?,
        },
        ("goto", _) => return Err(InputError::Usage("goto <SECTION> <number>")),
        ("submit", []) => Input::Submit,
        ("pause", []) => Input::Pause,
        ("hold", []) => Input::Hold,
        ("resume", []) => Input::Resume,
        ("next", []) => Input::Next,
        ("review", [section]) => Input::Review(section_id(section)),
        ("review", _) => return Err(InputError::Usage("review <SECTION>")),
        ("results", []) => Input::Open(Screen::FinalResults),
        ("analytics", []) => Input::Open(Screen::Analytics),
        ("settings", []) => Input::Open(Screen::Settings),
        ("set", [key, value]) => Input::Set(
            parse_setting(key, &value.to_ascii_lowercase())
                .ok_or(InputError::Usage("set <theme|font|nav|autosave|study|shortcuts> <value>"))?,
        ),
        ("set", _) => {
            return Err(InputError::Usage(
                "set <theme|font|nav|autosave|study|shortcuts> <value>",
            ));
        }
        ("reset", []) => Input::Reset { soft: false },
        ("reset", ["soft"]) => Input::Reset { soft: true },
        (other, _) => return Err(InputError::Unknown(other.to_string())),
    };
    Ok(input)
}

pub const HELP: &str = "\
commands:
  status                      show the current screen
  start <SECTION>             open a section's instructions
  mock                        start a full mock exam (wipes progress)
  begin                       start the timed exam from the instructions
  show [n]                    list questions, or show question n
  answer <n> <letter>         answer question n
  bookmark <n>                toggle a bookmark on question n
  hold | resume               freeze / unfreeze the timer
  pause                       save the section and return to the menu
  submit                      grade the current section
  next                        continue after a section result
  review <SECTION>            review a graded section
  bookmarks | analytics | results | settings
  goto <SECTION> <n>          reopen a section at a bookmarked question
  clear-bookmarks
  set <key> <value>           theme light|dark, font small|medium|large,
                              nav buttons|scroll, autosave|study|shortcuts on|off
  back                        leave instructions or review, or go to the menu
  reset [soft]                discard all progress (soft keeps bookmarks)
  quit";

//
// ─── RENDERING ─────────────────────────────────────────────────────────────────
//

fn score(result: &SectionResult) -> String {
    if result.is_valid() {
        format!("{:.2}%", result.score_pct)
    } else {
        "n/a".to_string()
    }
}

fn seconds(value: u64) -> String {
    format_clock(i64::try_from(value).unwrap_or(i64::MAX))
}

fn render_menu(session: &ExamSession, out: &mut String) {
    let _ = writeln!(out, "== Main menu ==");
    for section in session.blueprint().sections() {
        let status = match session.results().get(section.id()) {
            Some(result) => format!("done, {}", score(result)),
            None if session.time_spent().spent(section.id()) > 0 => format!(
                "paused, {} left",
                seconds(session.time_spent().remaining(section))
            ),
            None => "not started".to_string(),
        };
        let _ = writeln!(
            out,
            "  {:<8} {} ({} questions, {}) - {status}",
            section.id(),
            section.title(),
            session.sequence().section_len(section.id()),
            seconds(section.time_secs()),
        );
    }
    if session.is_locked() {
        let _ = writeln!(out, "Exam complete. `reset` to start over.");
    }
    if session.sequence().is_empty() {
        let _ = writeln!(out, "No questions loaded.");
    }
}

fn render_results(session: &ExamSession, section: &SectionId, out: &mut String) {
    let Some(result) = session.results().get(section) else {
        return;
    };
    let _ = writeln!(out, "== {section} result ==");
    let _ = writeln!(
        out,
        "Score {} ({} of {} correct, {} wrong or unanswered)",
        score(result),
        result.correct,
        result.total,
        result.wrong.len()
    );
    let _ = writeln!(out, "`next` to continue, `review {section}` to see mistakes.");
}

fn render_final(session: &ExamSession, out: &mut String) {
    let standing = session.standing();
    let _ = writeln!(out, "== Final results ==");
    for row in session.analytics() {
        let _ = writeln!(
            out,
            "  {:<8} {:>8}  {}/{}",
            row.section,
            if row.score_pct.is_finite() {
                format!("{:.2}%", row.score_pct)
            } else {
                "n/a".to_string()
            },
            row.correct,
            row.total
        );
    }
    let _ = writeln!(out, "Weighted average: {:.2}%", standing.weighted_average);
    if !standing.all_completed {
        let _ = writeln!(out, "Not every section was taken.");
    }
    for section in &standing.failing_sections {
        let _ = writeln!(
            out,
            "  {section} is below the {:.0}% floor",
            session.blueprint().section_floor()
        );
    }
    let _ = writeln!(out, "{}", if standing.passed { "PASSED" } else { "FAILED" });
}

fn render_review(session: &ExamSession, section: &SectionId, out: &mut String) {
    let Some(result) = session.results().get(section) else {
        return;
    };
    let _ = writeln!(out, "== Review {section} ==");
    for wrong in &result.wrong {
        let _ = writeln!(out, "{}. {}", wrong.number, wrong.stem);
        if let Some(figure) = &wrong.figure {
            let _ = writeln!(out, "   [figure: {figure}]");
        }
        let yours = wrong
            .user_answer
            .map_or_else(|| "-".to_string(), String::from);
        let _ = writeln!(out, "   your answer: {yours}, correct: {}", wrong.correct_answer);
        if let Some(explanation) = &wrong.explanation {
            let _ = writeln!(out, "   {explanation}");
        }
    }
    if result.wrong.is_empty() {
        let _ = writeln!(out, "No mistakes.");
    }
}

fn render_bookmarks(session: &ExamSession, out: &mut String) {
    let _ = writeln!(out, "== Bookmarks ==");
    for bookmark in session.bookmarks().as_slice() {
        let stem = session
            .question_at(bookmark.section(), bookmark.question_index())
            .map_or("(missing question)", |q| q.stem.as_str());
        let _ = writeln!(
            out,
            "  {} #{}: {stem}",
            bookmark.section(),
            bookmark.question_index() + 1
        );
    }
    if session.bookmarks().is_empty() {
        let _ = writeln!(out, "  none");
    }
}

/// Render a single question of the active section.
#[must_use]
pub fn render_question(session: &ExamSession, index: usize) -> Option<String> {
    let section = session.current_section()?;
    let question = session.question_at(section.id(), index)?;
    let selected = session.answers().get(section.id(), index);
    let mut out = String::new();
    let marker = if session.is_bookmarked(index) { " *" } else { "" };
    let _ = writeln!(out, "{}.{marker} {}", index + 1, question.stem);
    if let Some(figure) = &question.figure {
        let _ = writeln!(out, "   [figure: {figure}]");
    }
    for (letter, text) in question.lettered_choices() {
        let pick = if selected == Some(letter) { ">" } else { " " };
        let _ = writeln!(out, "  {pick} {}. {text}", letter.as_char());
    }
    if session.settings().study_mode && selected.is_some() {
        let _ = writeln!(
            out,
            "   correct: {}",
            question.correct_answer.as_char()
        );
        if let Some(explanation) = &question.explanation {
            let _ = writeln!(out, "   {explanation}");
        }
    }
    Some(out)
}

/// Render the current view.
#[must_use]
pub fn render_view(session: &ExamSession) -> String {
    let mut out = String::new();
    match session.view() {
        View::Loading => {
            let _ = writeln!(out, "Loading...");
        }
        View::MainMenu => render_menu(session, &mut out),
        View::Instructions { section } => {
            if let Some(descriptor) = session.blueprint().section(section) {
                let _ = writeln!(out, "== {} ({section}) ==", descriptor.title());
                let _ = writeln!(
                    out,
                    "{} questions, {} available.",
                    session.sequence().section_len(section),
                    seconds(session.initial_time().unwrap_or(descriptor.time_secs()))
                );
            }
            if session.is_full_mock() {
                let _ = writeln!(out, "Full mock exam in progress.");
            }
            let _ = writeln!(out, "`begin` to start the timer, `back` to return.");
        }
        View::Exam { section } => {
            let _ = writeln!(
                out,
                "== {section} exam == {} unanswered",
                session.unanswered_count().unwrap_or(0)
            );
            let _ = writeln!(out, "`show` lists questions; `answer <n> <letter>`; `submit` when done.");
        }
        View::Results { section } => render_results(session, section, &mut out),
        View::FinalResults => render_final(session, &mut out),
        View::Settings => {
            let s = session.settings();
            let _ = writeln!(out, "== Settings ==");
            let _ = writeln!(out, "  theme      {:?}", s.theme);
            let _ = writeln!(out, "  font       {:?}", s.font_size);
            let _ = writeln!(out, "  nav        {:?}", s.navigation_mode);
            let _ = writeln!(out, "  autosave   {}", s.auto_save);
            let _ = writeln!(out, "  study      {}", s.study_mode);
            let _ = writeln!(out, "  shortcuts  {}", s.keyboard_shortcuts);
        }
        View::Bookmarks => render_bookmarks(session, &mut out),
        View::Analytics => {
            let _ = writeln!(out, "== Analytics ==");
            for row in session.analytics() {
                let _ = writeln!(
                    out,
                    "  {:<8} {:>7.2}%  {}/{}  {}",
                    row.section,
                    row.score_pct,
                    row.correct,
                    row.total,
                    if row.passed { "pass" } else { "below mark" }
                );
            }
        }
        View::Review { section } => render_review(session, section, &mut out),
    }
    out
}

//
// ─── DRIVER ────────────────────────────────────────────────────────────────────
//

async fn execute(controller: &mut ExamController, input: Input) {
    let view_before = controller.session().view().clone();
    match input {
        Input::Help => println!("{HELP}"),
        Input::Status | Input::Quit => {}
        Input::Start(section) => {
            controller.dispatch(Action::StartExam(section)).await;
        }
        Input::Mock => controller.start_full_mock().await,
        Input::Begin => {
            controller.dispatch(Action::BeginSection).await;
        }
        Input::Back => {
            let action = match controller.session().view() {
                View::Instructions { .. } => Action::LeaveInstructions,
                View::Review { .. } => Action::BackFromReview,
                _ => Action::Open(Screen::MainMenu),
            };
            controller.dispatch(action).await;
        }
        Input::Show(Some(index)) => match render_question(controller.session(), index) {
            Some(text) => print!("{text}"),
            None => println!("no such question"),
        },
        Input::Show(None) => {
            let session = controller.session();
            let count = session.current_questions().len();
            if count == 0 {
                println!("no active section");
            }
            let limit = match session.settings().navigation_mode {
                NavigationMode::Scroll => count,
                NavigationMode::Buttons => count.min(1),
            };
            for index in 0..limit {
                if let Some(text) = render_question(session, index) {
                    print!("{text}");
                }
            }
        }
        Input::Answer { index, choice } => {
            if controller
                .dispatch(Action::SelectAnswer { index, choice })
                .await
                && controller.session().settings().study_mode
            {
                if let Some(text) = render_question(controller.session(), index) {
                    print!("{text}");
                }
            }
        }
        Input::Bookmark(index) => {
            controller.dispatch(Action::ToggleBookmark(index)).await;
            let state = if controller.session().is_bookmarked(index) {
                "bookmarked"
            } else {
                "not bookmarked"
            };
            println!("question {} {state}", index + 1);
        }
        Input::Bookmarks => {
            controller.dispatch(Action::Open(Screen::Bookmarks)).await;
        }
        Input::ClearBookmarks => {
            controller.dispatch(Action::ClearBookmarks).await;
        }
        Input::Goto { section, index } => {
            if controller
                .dispatch(Action::GoToQuestion { section, index })
                .await
            {
                if let Some(text) = render_question(controller.session(), index) {
                    print!("{text}");
                }
            }
        }
        Input::Submit => {
            let unanswered = controller.session().unanswered_count().unwrap_or(0);
            if unanswered > 0 {
                println!("{unanswered} question(s) left unanswered.");
            }
            controller.dispatch(Action::SubmitSection).await;
        }
        Input::Pause => {
            controller.pause_section().await;
        }
        Input::Hold => {
            controller.pause_countdown();
            println!("timer paused");
        }
        Input::Resume => {
            controller.resume_countdown();
            println!("timer running");
        }
        Input::Next => {
            controller.dispatch(Action::NextSection).await;
        }
        Input::Review(section) => {
            controller.dispatch(Action::ReviewSection(section)).await;
        }
        Input::Open(screen) => {
            controller.dispatch(Action::Open(screen)).await;
        }
        Input::Set(patch) => {
            controller.update_settings(patch).await;
            println!("settings updated");
        }
        Input::Reset { soft } => {
            let mode = if soft {
                ResetMode::soft()
            } else {
                ResetMode::hard()
            };
            controller.reset_exam(mode).await;
        }
    }

    if controller.session().view() != &view_before {
        print!("{}", render_view(controller.session()));
    }
}

fn prompt(controller: &ExamController) {
    match controller.countdown() {
        Some(countdown) if countdown.is_paused() => print!("[{} paused] > ", countdown.display()),
        Some(countdown) => print!("[{}] > ", countdown.display()),
        None => print!("> "),
    }
    let _ = std::io::stdout().flush();
}

/// Drive `controller` from stdin until `quit` or end of input.
///
/// A running section is paused on exit so its elapsed time is kept.
///
/// # Errors
///
/// Returns an I/O error if stdin cannot be read.
pub async fn run(controller: &mut ExamController) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    print!("{}", render_view(controller.session()));
    prompt(controller);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if controller.tick().await == TickOutcome::AutoSubmitted {
                    println!();
                    println!("Time is up.");
                    print!("{}", render_view(controller.session()));
                    prompt(controller);
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Ok(Input::Quit) => break,
                    Ok(Input::Status) => print!("{}", render_view(controller.session())),
                    Ok(input) => execute(controller, input).await,
                    Err(InputError::Empty) => {}
                    Err(err) => println!("{err}"),
                }
                prompt(controller);
            }
        }
    }

    if controller.session().view().is_exam() {
        controller.pause_section().await;
    }
    Ok(())
}
