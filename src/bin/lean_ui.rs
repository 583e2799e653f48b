//! MLB Lean Dashboard - Graphical User Interface
//!
//! Shows the day's matchup table with a bet-type toggle, a team filter,
//! the F5 call key and a CSV download.

use mlb_lean_dashboard::config::DashboardConfig;
use mlb_lean_dashboard::lean::LeanCall;
use mlb_lean_dashboard::report::{self, build_report, Report, ReportView, F5_CALL};
use mlb_lean_dashboard::source::{self, MatchupTable};
use iced::widget::{
    button, checkbox, column, container, pick_list, radio, row, rule, scrollable, text, text_input,
};
use iced::{Center, Color, Element, Fill, Length, Task, Theme};
use std::path::{Path, PathBuf};

const ALL_TEAMS: &str = "All";

fn main() -> iced::Result {
    env_logger::init();
    iced::application(App::new, App::update, App::view)
        .theme(App::theme)
        .centered()
        .run()
}

// ============================================================================
// App State
// ============================================================================

struct App {
    config: DashboardConfig,

    // Source selection
    data_dir: String,
    date: String,
    loaded_from: Option<PathBuf>,
    table: Option<MatchupTable>,

    // Filters
    view: ReportView,
    team_options: Vec<String>,
    selected_team: String,
    show_key: bool,

    report: Option<Report>,
    is_running: bool,
    status_text: String,
}

impl App {
    fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn new() -> (Self, Task<Message>) {
        let config = DashboardConfig::load();
        let date = source::today().format("%Y-%m-%d").to_string();
        let app = App {
            data_dir: config.data_dir.display().to_string(),
            config,
            date,
            loaded_from: None,
            table: None,
            view: ReportView::FullGame,
            team_options: vec![ALL_TEAMS.to_string()],
            selected_team: ALL_TEAMS.to_string(),
            show_key: false,
            report: None,
            is_running: false,
            status_text: String::new(),
        };
        let task = app.load_date_task();
        (app, task)
    }

    /// Task loading the dashboard for the entered date from the data folder.
    fn load_date_task(&self) -> Task<Message> {
        let data_dir = PathBuf::from(&self.data_dir);
        let date = self.date.clone();
        Task::perform(
            async move {
                let date = source::parse_date(&date).map_err(|e| e.to_string())?;
                let path = source::dashboard_path(&data_dir, date);
                source::load_for_date(&data_dir, date)
                    .map(|table| (path, table))
                    .map_err(|e| e.to_string())
            },
            Message::Loaded,
        )
    }

    /// Rebuild the displayed report from the loaded table and current filters.
    fn refresh_report(&mut self) {
        self.report = self.table.as_ref().map(|table| {
            let team = if self.selected_team == ALL_TEAMS {
                None
            } else {
                Some(self.selected_team.as_str())
            };
            build_report(&table.filter_team(team), self.view, &self.config.thresholds)
        });
    }

    /// Suggested download file name for the current view.
    fn download_file_name(&self) -> String {
        let stem = self
            .loaded_from
            .as_deref()
            .and_then(Path::file_stem)
            .and_then(|s| s.to_str())
            .unwrap_or("mlb_dashboard");
        match self.view {
            ReportView::FullGame => format!("{}.csv", stem),
            ReportView::F5 => format!("{}_f5.csv", stem),
        }
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Clone)]
enum Message {
    // Source
    DataDirChanged(String),
    DateChanged(String),
    LoadDate,
    BrowseFile,
    FileSelected(Option<PathBuf>),
    Loaded(Result<(PathBuf, MatchupTable), String>),

    // Filters
    ViewSelected(ReportView),
    TeamSelected(String),
    ShowKeyToggled(bool),

    // Download
    Download,
    DownloadTarget(Option<PathBuf>),
    DownloadFinished(Result<String, String>),
}

// ============================================================================
// Update
// ============================================================================

impl App {
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            // -- Source --
            Message::DataDirChanged(v) => {
                self.data_dir = v;
                Task::none()
            }
            Message::DateChanged(v) => {
                self.date = v;
                Task::none()
            }
            Message::LoadDate => {
                self.is_running = true;
                self.status_text = "Loading...".to_string();
                self.load_date_task()
            }
            Message::BrowseFile => Task::perform(
                async {
                    let file = rfd::AsyncFileDialog::new()
                        .set_title("Open dashboard CSV")
                        .add_filter("CSV files", &["csv"])
                        .pick_file()
                        .await;
                    file.map(|f| f.path().to_path_buf())
                },
                Message::FileSelected,
            ),
            Message::FileSelected(path) => {
                let Some(path) = path else {
                    return Task::none();
                };
                // Undated files don't belong to the date field
                match path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .and_then(source::parse_file_date)
                {
                    Some(date) => self.date = date.format("%Y-%m-%d").to_string(),
                    None => self.date.clear(),
                }
                if let Some(parent) = path.parent() {
                    self.data_dir = parent.display().to_string();
                }
                self.is_running = true;
                self.status_text = "Loading...".to_string();
                Task::perform(
                    async move {
                        MatchupTable::from_path(&path)
                            .map(|table| (path, table))
                            .map_err(|e| e.to_string())
                    },
                    Message::Loaded,
                )
            }
            Message::Loaded(result) => {
                self.is_running = false;
                match result {
                    Ok((path, table)) => {
                        let mut options = vec![ALL_TEAMS.to_string()];
                        options.extend(table.teams());
                        if !options.contains(&self.selected_team) {
                            self.selected_team = ALL_TEAMS.to_string();
                        }
                        self.team_options = options;
                        self.status_text = format!(
                            "Loaded {} matchups from {}",
                            table.len(),
                            path.display()
                        );
                        self.loaded_from = Some(path);
                        self.table = Some(table);

                        let dir = PathBuf::from(&self.data_dir);
                        if self.config.data_dir != dir {
                            self.config.data_dir = dir;
                            if let Err(e) = self.config.save() {
                                log::warn!("Could not save settings: {}", e);
                            }
                        }
                    }
                    Err(e) => {
                        self.table = None;
                        self.loaded_from = None;
                        self.team_options = vec![ALL_TEAMS.to_string()];
                        self.selected_team = ALL_TEAMS.to_string();
                        self.status_text = e;
                    }
                }
                self.refresh_report();
                Task::none()
            }

            // -- Filters --
            Message::ViewSelected(view) => {
                self.view = view;
                self.refresh_report();
                Task::none()
            }
            Message::TeamSelected(team) => {
                self.selected_team = team;
                self.refresh_report();
                Task::none()
            }
            Message::ShowKeyToggled(v) => {
                self.show_key = v;
                Task::none()
            }

            // -- Download --
            Message::Download => {
                let file_name = self.download_file_name();
                Task::perform(
                    async move {
                        let file = rfd::AsyncFileDialog::new()
                            .add_filter("CSV files", &["csv"])
                            .add_filter("Excel files", &["xlsx"])
                            .set_file_name(file_name)
                            .save_file()
                            .await;
                        file.map(|f| f.path().to_path_buf())
                    },
                    Message::DownloadTarget,
                )
            }
            Message::DownloadTarget(path) => {
                let (Some(path), Some(report)) = (path, self.report.clone()) else {
                    return Task::none();
                };
                self.is_running = true;
                Task::perform(
                    async move {
                        report
                            .export(&path)
                            .map(|_| format!("Saved {} rows to {}", report.len(), path.display()))
                            .map_err(|e| e.to_string())
                    },
                    Message::DownloadFinished,
                )
            }
            Message::DownloadFinished(result) => {
                self.is_running = false;
                self.status_text = match result {
                    Ok(s) => s,
                    Err(e) => format!("Error: {}", e),
                };
                Task::none()
            }
        }
    }
}

// ============================================================================
// View
// ============================================================================

impl App {
    fn view(&self) -> Element<'_, Message> {
        let disabled = self.is_running;

        let caption = match &self.loaded_from {
            Some(path) => source::dashboard_caption(path),
            None if self.date.trim().is_empty() => "No dashboard loaded".to_string(),
            None => format!("Updated for {}", self.date.trim()),
        };
        let header = column![
            text("Pick-5 Daily Dashboard").size(28),
            text(caption).size(14),
        ]
        .spacing(4);

        let source_row = row![
            text("Data folder:").width(100),
            text_input("data", &self.data_dir)
                .on_input_maybe(if disabled {
                    None
                } else {
                    Some(Message::DataDirChanged)
                })
                .width(Fill),
            text("Date:"),
            text_input("YYYY-MM-DD", &self.date)
                .on_input_maybe(if disabled {
                    None
                } else {
                    Some(Message::DateChanged)
                })
                .on_submit(Message::LoadDate)
                .width(120),
            button(text("Load").size(13)).on_press_maybe(if disabled {
                None
            } else {
                Some(Message::LoadDate)
            }),
            button(text("Open CSV").size(13)).on_press_maybe(if disabled {
                None
            } else {
                Some(Message::BrowseFile)
            }),
        ]
        .spacing(10)
        .align_y(Center);

        let view_radios = ReportView::ALL.iter().fold(
            row![text("Bet type:").width(100)].spacing(16).align_y(Center),
            |r, v| r.push(radio(v.label(), *v, Some(self.view), Message::ViewSelected)),
        );

        let filter_row = row![
            view_radios,
            text("Team:"),
            pick_list(
                self.team_options.as_slice(),
                Some(&self.selected_team),
                Message::TeamSelected,
            )
            .width(160),
        ]
        .spacing(20)
        .align_y(Center);

        let body: Element<'_, Message> = match &self.report {
            Some(report) => self.view_report(report),
            None => container(text("No dashboard loaded.").size(14))
                .padding(20)
                .into(),
        };

        let mut download_btn = button(text("Download CSV"));
        if !disabled && self.report.is_some() {
            download_btn = download_btn.on_press(Message::Download);
        }
        let footer = row![
            download_btn,
            text(&self.status_text).size(13).width(Fill),
        ]
        .spacing(16)
        .align_y(Center);

        column![
            header,
            source_row,
            filter_row,
            rule::horizontal(1),
            body,
            rule::horizontal(1),
            footer,
        ]
        .spacing(12)
        .padding(20)
        .into()
    }

    fn view_report(&self, report: &Report) -> Element<'_, Message> {
        let formatted = report.formatted_rows();
        let call_col = report.column(F5_CALL);

        // Column widths from the longest cell, monospace at ~8px per char
        let mut widths: Vec<usize> = report.columns.iter().map(|c| c.chars().count()).collect();
        for row in &formatted {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }
        let px = |chars: usize| Length::Fixed((chars * 8 + 16) as f32);

        let header_cells: Vec<Element<'_, Message>> = report
            .columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| {
                text(c.clone())
                    .size(13)
                    .font(iced::Font::MONOSPACE)
                    .color(Color::from_rgb(0.6, 0.75, 1.0))
                    .width(px(*w))
                    .into()
            })
            .collect();

        let mut lines: Vec<Element<'_, Message>> = vec![row(header_cells).into()];
        lines.push(rule::horizontal(1).into());

        if formatted.is_empty() {
            lines.push(
                text("-- no matchups --")
                    .size(13)
                    .color(Color::from_rgb(0.6, 0.6, 0.6))
                    .into(),
            );
        }

        for (row_data, cells) in report.rows.iter().zip(formatted) {
            let fill = row_data
                .classification
                .as_ref()
                .and_then(|c| call_color(c.call()));
            let cells: Vec<Element<'_, Message>> = cells
                .into_iter()
                .zip(&widths)
                .enumerate()
                .map(|(i, (cell, w))| {
                    let mut t = text(cell).size(13).font(iced::Font::MONOSPACE).width(px(*w));
                    if Some(i) == call_col {
                        if let Some(color) = fill {
                            t = t.color(color);
                        }
                    }
                    t.into()
                })
                .collect();
            lines.push(row(cells).into());
        }

        let table = scrollable(column(lines).spacing(4).padding(8))
            .direction(scrollable::Direction::Both {
                vertical: scrollable::Scrollbar::default(),
                horizontal: scrollable::Scrollbar::default(),
            })
            .height(Fill)
            .width(Fill);

        let mut items: Vec<Element<'_, Message>> = vec![table.into()];

        if report.view.has_lean_calls() {
            items.push(
                text(report.summary().to_string())
                    .size(12)
                    .font(iced::Font::MONOSPACE)
                    .into(),
            );
            items.push(
                checkbox(self.show_key)
                    .label("Show F5 call key")
                    .on_toggle(Message::ShowKeyToggled)
                    .into(),
            );
            if self.show_key {
                items.push(
                    container(
                        text(report::call_key(&self.config.thresholds))
                            .size(12)
                            .font(iced::Font::MONOSPACE),
                    )
                    .padding(8)
                    .into(),
                );
            }
        }

        column(items).spacing(10).height(Fill).into()
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Text colour for a lean call in the table.
fn call_color(call: LeanCall) -> Option<Color> {
    match call {
        LeanCall::LeanStrong => Some(Color::from_rgb(0.3, 0.9, 0.3)),
        LeanCall::LeanModerate => Some(Color::from_rgb(0.6, 0.9, 0.5)),
        LeanCall::FadeStrong => Some(Color::from_rgb(0.95, 0.35, 0.35)),
        LeanCall::FadeModerate => Some(Color::from_rgb(0.95, 0.65, 0.45)),
        LeanCall::StayAway => None,
    }
}
