//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation between the form and the result
//! - Input event handling
//! - Submissions and report downloads through the session

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::model::{FileModelLoader, StackingModel};
use crate::adapters::pdf::PdfReportWriter;
use crate::adapters::raster::PixelGaugeRasterizer;
use crate::application::{ReportBuilder, RiskClassifier, Session};
use crate::config::AppConfig;
use crate::ports::RiskModel;
use crate::AeroLungError;

use super::ui::{
    form::{render_form, FormState},
    render_disclaimer,
    result::render_result,
    StatusLine,
};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Form,
    Result,
}

/// Main application state
pub struct App<M = StackingModel>
where
    M: RiskModel,
{
    screen: Screen,
    should_quit: bool,
    session: Session<M>,
    reports: ReportBuilder<PixelGaugeRasterizer, PdfReportWriter>,
    report_dir: PathBuf,
    form_state: FormState,
    status: Option<StatusLine>,
}

impl App<StackingModel> {
    /// Build the application from configuration.
    ///
    /// A model that fails to load does not stop startup; the form shows a
    /// banner and refuses submissions.
    pub fn new(config: &AppConfig) -> Self {
        let loader = FileModelLoader::new(&config.model_path);
        let classifier = RiskClassifier::load(&loader);
        Self::with_session(
            Session::new(classifier, config.form_defaults),
            config.report_dir.clone(),
        )
    }
}

impl<M> App<M>
where
    M: RiskModel,
{
    /// Create the application around an existing session.
    pub fn with_session(session: Session<M>, report_dir: PathBuf) -> Self {
        Self {
            screen: Screen::Form,
            should_quit: false,
            session,
            reports: ReportBuilder::new(PixelGaugeRasterizer::default(), PdfReportWriter::new()),
            report_dir,
            form_state: FormState::default(),
            status: None,
        }
    }

    /// Wrap a preloaded model, for callers that load it themselves.
    pub fn with_model(model: Arc<M>, config: &AppConfig) -> Self {
        Self::with_session(
            Session::new(RiskClassifier::new(model), config.form_defaults),
            config.report_dir.clone(),
        )
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                match self.screen {
                    Screen::Form => render_form(
                        f,
                        chunks[0],
                        self.session.input(),
                        &self.form_state,
                        self.session.unavailable_reason(),
                        self.status.as_ref(),
                    ),
                    Screen::Result => render_result(
                        f,
                        chunks[0],
                        self.session.last_result(),
                        self.status.as_ref(),
                    ),
                }

                render_disclaimer(f, chunks[1]);
            })?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Form => self.handle_form_key(key),
            Screen::Result => self.handle_result_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        let field = self.form_state.field();
        match key {
            KeyCode::Up | KeyCode::BackTab => self.form_state.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.form_state.next_field(),
            KeyCode::Left => self.session.input_mut().step(field, -1),
            KeyCode::Right => self.session.input_mut().step(field, 1),
            KeyCode::Home => self.session.input_mut().jump_to_bound(field, false),
            KeyCode::End => self.session.input_mut().jump_to_bound(field, true),
            KeyCode::Enter => self.try_submit(),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.session.reset_form();
                self.status = Some(StatusLine::Info("Form reset to defaults".into()));
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.status = None;
                self.screen = Screen::Form;
            }
            KeyCode::Char('d') | KeyCode::Char('D') => self.download_report(),
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            _ => {}
        }
    }

    fn try_submit(&mut self) {
        if self.session.accepts_submissions() {
            self.submit();
        } else {
            let reason = self.session.unavailable_reason().unwrap_or("model not loaded");
            let refused = AeroLungError::ModelUnavailable(reason.to_string());
            self.status = Some(StatusLine::Error(refused.to_string()));
        }
    }

    fn submit(&mut self) {
        match self.session.submit() {
            Ok(_) => {
                self.status = None;
                self.screen = Screen::Result;
            }
            Err(e) => {
                tracing::warn!("Submission refused: {}", e);
                self.status = Some(StatusLine::Error(e.to_string()));
            }
        }
    }

    fn download_report(&mut self) {
        if !self.session.report_available() {
            return;
        }
        self.status = Some(
            match self
                .session
                .export_report(&self.reports, &self.report_dir, Local::now())
            {
                Ok(path) => StatusLine::Info(format!("Report saved to {}", path.display())),
                Err(e) => {
                    tracing::error!("Report download failed: {}", e);
                    StatusLine::Error(e.to_string())
                }
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::model::tests::sample_params;
    use crate::domain::{FormDefaults, PatientField};
    use tempfile::TempDir;

    fn app(dir: &TempDir) -> App {
        let model = StackingModel::from_params(sample_params()).unwrap();
        let config = AppConfig {
            report_dir: dir.path().join("reports"),
            ..AppConfig::default()
        };
        App::with_model(Arc::new(model), &config)
    }

    fn press(app: &mut App, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    #[test]
    fn test_form_keys_edit_selected_field() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);

        // Smoking: Current -> Never (cycles)
        press(&mut app, KeyCode::Right);
        assert_eq!(app.session.input().smoking.label(), "Never");

        while app.form_state.field() != PatientField::Age {
            press(&mut app, KeyCode::Down);
        }
        press(&mut app, KeyCode::End);
        assert_eq!(app.session.input().age, 100);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.session.input().age, 100);
        press(&mut app, KeyCode::Home);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.session.input().age, 18);

        press(&mut app, KeyCode::Char('r'));
        assert_eq!(*app.session.input(), crate::PatientInput::default());
    }

    #[test]
    fn test_submit_download_and_return() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::Result);
        assert!(app.session.report_available());

        press(&mut app, KeyCode::Char('d'));
        match &app.status {
            Some(StatusLine::Info(msg)) => assert!(msg.starts_with("Report saved to")),
            other => panic!("unexpected status {other:?}"),
        }
        let saved = std::fs::read_dir(dir.path().join("reports")).unwrap().count();
        assert_eq!(saved, 1);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Form);
        assert!(app.status.is_none());
    }

    #[test]
    fn test_unavailable_model_keeps_form_open() {
        let dir = TempDir::new().unwrap();
        let session: Session<StackingModel> = Session::new(
            RiskClassifier::unavailable("no model artifact"),
            FormDefaults::default(),
        );
        let mut app = App::with_session(session, dir.path().to_path_buf());

        assert!(!app.session.accepts_submissions());
        // Out of range: reaching the encoder would fail validation first.
        app.session.input_mut().age = 5;
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::Form);
        assert!(app.session.last_result().is_none());
        match &app.status {
            Some(StatusLine::Error(msg)) => {
                assert_eq!(msg, "Risk model unavailable: no model artifact");
            }
            other => panic!("unexpected status {other:?}"),
        }
    }

    #[test]
    fn test_quit_keys() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);

        let mut app = app_on_result(&dir);
        press(&mut app, KeyCode::Char('Q'));
        assert!(app.should_quit);
    }

    fn app_on_result(dir: &TempDir) -> App {
        let mut app = app(dir);
        press(&mut app, KeyCode::Enter);
        app
    }
}
