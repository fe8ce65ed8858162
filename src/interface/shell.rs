//! Interactive menu shell for book-catalog
//!
//! Prompt (dialoguer / piped stdin lines / scripted) <-> application::CatalogStore
//!
//! 9 actions: add, list, find, delete, stats, sort, edit, filter, exit

use std::io::{self, BufRead, IsTerminal, StdinLock, Write};
use std::path::Path;

use console::Term;
use dialoguer::Input;

use crate::application::error::AppError;
use crate::application::report::{ReportService, BOOK_NOT_FOUND};
use crate::application::service::CatalogStore;
use crate::domain::model::catalog::{BookPatch, SortKey};
use crate::domain::repository::CatalogRepository;
use crate::domain::validation::{parse_price, parse_year, require_text, Field, ValidationError};
use crate::infra::json_store::JsonCatalogRepository;

// =============================================================================
// Input abstraction
// =============================================================================

/// 1行入力の抽象。入力が尽きたら `Ok(None)`。
pub trait Prompt {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// 行単位の入力。端末でない標準入力（パイプ・リダイレクト）で使う。
/// 0バイト読み込み（入力終端）で `Ok(None)`。
pub struct LinePrompt<B: BufRead> {
    reader: B,
}

impl<B: BufRead> LinePrompt<B> {
    pub fn new(reader: B) -> Self {
        Self { reader }
    }
}

impl<B: BufRead> Prompt for LinePrompt<B> {
    fn read_line(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let content = line.strip_suffix('\n').unwrap_or(&line);
        let content = content.strip_suffix('\r').unwrap_or(content);
        Ok(Some(content.to_string()))
    }
}

/// 標準入力。端末ならdialoguer、そうでなければ行読み込み。
pub enum TerminalPrompt {
    Interactive,
    Piped(LinePrompt<StdinLock<'static>>),
}

impl TerminalPrompt {
    pub fn detect() -> Self {
        if io::stdin().is_terminal() && Term::stderr().is_term() {
            TerminalPrompt::Interactive
        } else {
            tracing::debug!("stdin is not a terminal, reading plain lines");
            TerminalPrompt::Piped(LinePrompt::new(io::stdin().lock()))
        }
    }
}

impl Prompt for TerminalPrompt {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        match self {
            TerminalPrompt::Interactive => match Input::<String>::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
            {
                Ok(line) => Ok(Some(line)),
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
                Err(e) => Err(e),
            },
            TerminalPrompt::Piped(lines) => lines.read_line(prompt),
        }
    }
}

// =============================================================================
// Menu
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Add,
    List,
    Find,
    Delete,
    Statistics,
    Sort,
    Edit,
    Filter,
    Exit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 9] = [
        MenuAction::Add,
        MenuAction::List,
        MenuAction::Find,
        MenuAction::Delete,
        MenuAction::Statistics,
        MenuAction::Sort,
        MenuAction::Edit,
        MenuAction::Filter,
        MenuAction::Exit,
    ];

    /// "1"〜"9" のみ受け付ける。
    pub fn from_input(s: &str) -> Option<Self> {
        let n: usize = s.trim().parse().ok()?;
        n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::Add => "Add book",
            MenuAction::List => "Show catalog",
            MenuAction::Find => "Find book by title",
            MenuAction::Delete => "Delete book",
            MenuAction::Statistics => "Show statistics",
            MenuAction::Sort => "Sort books",
            MenuAction::Edit => "Edit book",
            MenuAction::Filter => "Filter books by author",
            MenuAction::Exit => "Exit",
        }
    }
}

/// アクション後にループを続けるか。入力終端ならQuit。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Quit,
}

// =============================================================================
// Shell
// =============================================================================

pub struct Shell<P: Prompt, W: Write, R: CatalogRepository = JsonCatalogRepository> {
    store: CatalogStore<R>,
    prompt: P,
    out: W,
}

impl<P: Prompt, W: Write> Shell<P, W, JsonCatalogRepository> {
    /// JSONファイルからカタログを読み込んでシェルを作る。
    pub fn open(path: &Path, prompt: P, out: W) -> Self {
        let store = CatalogStore::load(JsonCatalogRepository::new(path));
        Self::new(store, prompt, out)
    }
}

impl<P: Prompt, W: Write, R: CatalogRepository> Shell<P, W, R> {
    pub fn new(store: CatalogStore<R>, prompt: P, out: W) -> Self {
        Self { store, prompt, out }
    }

    pub fn store(&self) -> &CatalogStore<R> {
        &self.store
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Exit選択か入力終端までメニューを繰り返す。
    pub fn run(&mut self) -> anyhow::Result<()> {
        self.announce_load()?;
        loop {
            self.show_menu()?;
            let Some(choice) = self.prompt.read_line("Select an option")? else {
                break;
            };
            let step = match MenuAction::from_input(&choice) {
                Some(MenuAction::Exit) => {
                    writeln!(self.out, "Exiting...")?;
                    Step::Quit
                }
                Some(action) => self.dispatch(action)?,
                None => {
                    writeln!(self.out, "Invalid option. Try again.")?;
                    Step::Continue
                }
            };
            if step == Step::Quit {
                break;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn announce_load(&mut self) -> io::Result<()> {
        match self.store.list().len() {
            0 => writeln!(self.out, "Starting with an empty catalog."),
            n => writeln!(self.out, "Catalog loaded ({n} books)."),
        }
    }

    fn show_menu(&mut self) -> io::Result<()> {
        writeln!(self.out, "\n=== MAIN MENU ===")?;
        for (index, action) in MenuAction::ALL.iter().enumerate() {
            writeln!(self.out, "{}. {}", index + 1, action.label())?;
        }
        writeln!(self.out, "=================")
    }

    fn dispatch(&mut self, action: MenuAction) -> anyhow::Result<Step> {
        writeln!(self.out, "\n=== {} ===", action.label().to_uppercase())?;
        match action {
            MenuAction::Add => self.add_book(),
            MenuAction::List => self.list_books(),
            MenuAction::Find => self.find_book(),
            MenuAction::Delete => self.delete_book(),
            MenuAction::Statistics => self.show_statistics(),
            MenuAction::Sort => self.sort_books(),
            MenuAction::Edit => self.edit_book(),
            MenuAction::Filter => self.filter_books(),
            MenuAction::Exit => Ok(Step::Quit),
        }
    }

    // --- Actions ---

    fn add_book(&mut self) -> anyhow::Result<Step> {
        let Some(title) = self.ask_valid("Book title", |s| require_text(Field::Title, s))? else {
            return Ok(Step::Quit);
        };
        let Some(author) = self.ask_valid("Book author", |s| require_text(Field::Author, s))?
        else {
            return Ok(Step::Quit);
        };
        let Some(price) = self.ask_valid("Book price (must be a positive number)", parse_price)?
        else {
            return Ok(Step::Quit);
        };
        let Some(year) = self.ask_valid("Publication year", parse_year)? else {
            return Ok(Step::Quit);
        };

        match self.store.add(&title, &author, price, year) {
            Ok(book) => {
                let message = format!("Book \"{}\" added successfully.", book.title());
                writeln!(self.out, "Catalog saved.")?;
                writeln!(self.out, "{message}")?;
            }
            Err(e) => self.report_failure(e)?,
        }
        Ok(Step::Continue)
    }

    fn list_books(&mut self) -> anyhow::Result<Step> {
        writeln!(self.out, "{}", ReportService::render_catalog(self.store.list()))?;
        Ok(Step::Continue)
    }

    fn find_book(&mut self) -> anyhow::Result<Step> {
        let Some(query) = self.prompt.read_line("Title to search for")? else {
            return Ok(Step::Quit);
        };
        match self.store.find_by_title(&query) {
            Some(book) => {
                let rendered = ReportService::render_book(book);
                writeln!(self.out, "Book found:\n{rendered}")?;
            }
            None => writeln!(self.out, "{BOOK_NOT_FOUND}")?,
        }
        Ok(Step::Continue)
    }

    fn delete_book(&mut self) -> anyhow::Result<Step> {
        let Some(query) = self.prompt.read_line("Title of the book to delete")? else {
            return Ok(Step::Quit);
        };
        match self.store.delete_by_title(&query) {
            Ok(Some(removed)) => {
                writeln!(self.out, "Catalog saved.")?;
                writeln!(self.out, "Book \"{}\" deleted successfully.", removed.title())?;
            }
            Ok(None) => writeln!(self.out, "{BOOK_NOT_FOUND}")?,
            Err(e) => self.report_failure(e)?,
        }
        Ok(Step::Continue)
    }

    fn show_statistics(&mut self) -> anyhow::Result<Step> {
        let stats = self.store.statistics();
        writeln!(self.out, "{}", ReportService::render_statistics(stats.as_ref()))?;
        Ok(Step::Continue)
    }

    fn sort_books(&mut self) -> anyhow::Result<Step> {
        for (index, key) in SortKey::ALL.iter().enumerate() {
            writeln!(self.out, "{}. By {}", index + 1, key.label())?;
        }
        let Some(choice) = self.prompt.read_line("Select a sort option")? else {
            return Ok(Step::Quit);
        };
        match choice.parse::<SortKey>() {
            Ok(key) => {
                self.store.sort(key);
                writeln!(self.out, "Books sorted by {}.", key.label())?;
                self.list_books()
            }
            Err(_) => {
                writeln!(self.out, "Invalid option. No sorting was performed.")?;
                Ok(Step::Continue)
            }
        }
    }

    fn edit_book(&mut self) -> anyhow::Result<Step> {
        let Some(query) = self.prompt.read_line("Title of the book to edit")? else {
            return Ok(Step::Quit);
        };
        let Some(current) = self.store.find_exact(&query).cloned() else {
            writeln!(self.out, "{BOOK_NOT_FOUND}")?;
            return Ok(Step::Continue);
        };

        writeln!(self.out, "Leave a field blank to keep its current value.")?;
        let prompts = [
            format!("New title (current: {})", current.title()),
            format!("New author (current: {})", current.author()),
            format!("New price (current: {})", current.price()),
            format!("New year (current: {})", current.year()),
        ];
        let mut answers = Vec::with_capacity(prompts.len());
        for prompt in &prompts {
            let Some(answer) = self.prompt.read_line(prompt)? else {
                return Ok(Step::Quit);
            };
            answers.push(answer);
        }
        let mut answers = answers.into_iter();
        let patch = BookPatch {
            title: answers.next(),
            author: answers.next(),
            price: answers.next(),
            year: answers.next(),
        };

        match self.store.edit_by_title(&query, patch) {
            Ok(Some(outcome)) => {
                writeln!(self.out, "Catalog saved.")?;
                writeln!(self.out, "{}", ReportService::render_edit(&outcome))?;
            }
            Ok(None) => writeln!(self.out, "{BOOK_NOT_FOUND}")?,
            Err(e) => self.report_failure(e)?,
        }
        Ok(Step::Continue)
    }

    fn filter_books(&mut self) -> anyhow::Result<Step> {
        let Some(query) = self.prompt.read_line("Author name")? else {
            return Ok(Step::Quit);
        };
        let books = self.store.filter_by_author(&query);
        let rendered = ReportService::render_author_listing(&query, &books);
        writeln!(self.out, "{rendered}")?;
        Ok(Step::Continue)
    }

    // --- Helpers ---

    /// 検証に通るまで再入力させる。
    fn ask_valid<T>(
        &mut self,
        prompt: &str,
        parse: impl Fn(&str) -> Result<T, ValidationError>,
    ) -> anyhow::Result<Option<T>> {
        loop {
            let Some(line) = self.prompt.read_line(prompt)? else {
                return Ok(None);
            };
            match parse(&line) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => writeln!(self.out, "Invalid {}: {e}. Try again.", e.field())?,
            }
        }
    }

    /// 保存失敗などは操作単位の失敗として表示し、ループは続ける。
    fn report_failure(&mut self, e: AppError) -> io::Result<()> {
        tracing::error!(error = %e, "operation failed");
        writeln!(self.out, "Operation failed: {e}")
    }
}
