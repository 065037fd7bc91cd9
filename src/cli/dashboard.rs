use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use rand::seq::SliceRandom;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};
use tracing::{info, warn};

use crate::candidates::Registry;
use crate::charts::{
    bar_series, format_k, group_proportions, line_series, month_label, repeated_series,
    y_axis_ticks, BarSeries, LegendEntry, LineSeries,
};
use crate::client::ApiClient;
use crate::donor_search::{DonorSearch, Reply, SearchState, SearchTransport, Ticket};
use crate::error::Result;
use crate::models::{Candidate, ContractMatch, VendorMatch};
use crate::settings::load_settings;
use crate::tui::{
    dollars_span, hex_color, with_terminal, wrap_text, ERROR_STYLE, FOOTER_STYLE, HEADER_STYLE,
    SELECTED_STYLE, STATUS_STYLE, TITLE_STYLE,
};

const TAGLINES: &[&str] = &[
    "Follow the money.",
    "Every dollar has a name.",
    "Who's paying for the yard signs?",
    "Public money, public records.",
    "Sunlight is the best disinfectant.",
    "Read the fine print.",
    "Donors, employers and the odd LLC.",
    "The filings are in.",
];

const LOADING: &str = "Loading...";
const TICK: Duration = Duration::from_millis(100);
const RESULT_ROWS: u16 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Total,
    Breakdown,
    TopDonors,
    TopEmployers,
    RepeatDonors,
    Timeline,
    Vendors,
    Contracts,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Total,
        Section::Breakdown,
        Section::TopDonors,
        Section::TopEmployers,
        Section::RepeatDonors,
        Section::Timeline,
        Section::Vendors,
        Section::Contracts,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Section::Total => "Total Raised",
            Section::Breakdown => "Contributions by Group",
            Section::TopDonors => "Top Donors",
            Section::TopEmployers => "Top Employers",
            Section::RepeatDonors => "Repeat Donors",
            Section::Timeline => "Donations Over Time",
            Section::Vendors => "Donors Who Are City Vendors",
            Section::Contracts => "Donors With City Contracts",
        }
    }

    fn index(&self) -> usize {
        Section::ALL.iter().position(|s| s == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionData {
    Total(f64),
    Breakdown(Vec<LegendEntry>),
    Bars(BarSeries),
    Timeline(LineSeries),
    Vendors(Vec<VendorMatch>),
    Contracts(Vec<ContractMatch>),
}

/// Fetch one section through the API and shape it for drawing.
pub fn fetch(client: &ApiClient, slug: &str, section: Section) -> Result<SectionData> {
    Ok(match section {
        Section::Total => SectionData::Total(client.total_donations(slug)?.total_donations),
        Section::Breakdown => SectionData::Breakdown(group_proportions(&client.contributions(slug)?)),
        Section::TopDonors => SectionData::Bars(bar_series(&client.top_donors_bar(slug)?)),
        Section::TopEmployers => SectionData::Bars(bar_series(&client.top_employers_bar(slug)?)),
        Section::RepeatDonors => SectionData::Bars(repeated_series(&client.repeated_donors(slug)?)),
        Section::Timeline => SectionData::Timeline(line_series(&client.donations_over_time(slug)?)),
        Section::Vendors => SectionData::Vendors(client.vendors(slug)?.vendor_matches),
        Section::Contracts => SectionData::Contracts(client.contracts(slug)?.contract_matches),
    })
}

pub enum Update {
    Section(Section, SectionData),
    Search(Ticket, Reply),
}

#[derive(Debug, PartialEq)]
pub enum Action {
    Continue,
    Search(Ticket),
    Quit,
}

/// One dashboard for any registered candidate. Sections fill in as their
/// fetches land; a section whose fetch failed keeps showing "Loading...".
pub struct CandidateDashboard {
    candidate: Candidate,
    tagline: String,
    sections: Vec<Option<SectionData>>,
    search: DonorSearch,
    selected: Option<usize>,
}

impl CandidateDashboard {
    pub fn new(candidate: Candidate) -> Self {
        let mut rng = rand::thread_rng();
        let tagline = TAGLINES.choose(&mut rng).unwrap_or(&"Follow the money.").to_string();
        let search = DonorSearch::new(&candidate.slug);
        Self {
            candidate,
            tagline,
            sections: vec![None; Section::ALL.len()],
            search,
            selected: None,
        }
    }

    pub fn section(&self, section: Section) -> Option<&SectionData> {
        self.sections[section.index()].as_ref()
    }

    pub fn search(&self) -> &DonorSearch {
        &self.search
    }

    pub fn apply(&mut self, update: Update) {
        match update {
            Update::Section(section, data) => self.sections[section.index()] = Some(data),
            Update::Search(ticket, reply) => {
                if self.search.resolve(&ticket, reply) {
                    self.selected = None;
                }
            }
        }
    }

    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Action {
        if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
            return Action::Quit;
        }
        let suggestions = self.search.suggestions().len();
        match code {
            KeyCode::Esc => {
                if self.search.input().is_empty() && *self.search.state() == SearchState::Idle {
                    return Action::Quit;
                }
                self.selected = None;
                self.search.set_input("");
                // Blank submit: back to idle and any in-flight reply is dropped.
                self.search.submit();
            }
            KeyCode::Down if suggestions > 0 => {
                self.selected = Some(match self.selected {
                    Some(i) => (i + 1).min(suggestions - 1),
                    None => 0,
                });
            }
            KeyCode::Up => {
                self.selected = match self.selected {
                    Some(0) | None => None,
                    Some(i) => Some(i - 1),
                };
            }
            KeyCode::Enter => {
                let chosen = self
                    .selected
                    .and_then(|i| self.search.suggestions().get(i).cloned());
                self.selected = None;
                let ticket = match chosen {
                    Some(name) => Some(self.search.select_suggestion(&name)),
                    None => self.search.submit(),
                };
                if let Some(ticket) = ticket {
                    return Action::Search(ticket);
                }
            }
            KeyCode::Backspace => {
                self.selected = None;
                self.search.pop_char();
            }
            KeyCode::Char(c) => {
                self.selected = None;
                self.search.push_char(c);
            }
            _ => {}
        }
        Action::Continue
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let border_style = Style::default().fg(Color::DarkGray);

        let [header_area, sep1, summary_area, sep2, search_area, sep3, charts_area, hints_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(RESULT_ROWS + 2),
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(1),
            ])
            .areas(area);

        frame.render_widget(
            Paragraph::new(format!(" {}: {}", self.candidate.display_name, self.tagline))
                .style(HEADER_STYLE),
            header_area,
        );

        let sep_line = "━".repeat(area.width as usize);
        let sep_widget = Paragraph::new(sep_line.as_str()).style(border_style);
        frame.render_widget(sep_widget.clone(), sep1);
        frame.render_widget(sep_widget.clone(), sep2);
        frame.render_widget(sep_widget, sep3);

        self.draw_summary(frame, summary_area);
        self.draw_search(frame, search_area);

        let [top_row, middle_row, bottom_row] = Layout::vertical([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .areas(charts_area);
        let [breakdown, donors, employers] = Layout::horizontal([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .areas(top_row);
        let [repeat, timeline] =
            Layout::horizontal([Constraint::Percentage(34), Constraint::Percentage(66)])
                .areas(middle_row);
        let [vendors, contracts] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(bottom_row);

        self.draw_section(frame, Section::Breakdown, breakdown);
        self.draw_section(frame, Section::TopDonors, donors);
        self.draw_section(frame, Section::TopEmployers, employers);
        self.draw_section(frame, Section::RepeatDonors, repeat);
        self.draw_section(frame, Section::Timeline, timeline);
        self.draw_section(frame, Section::Vendors, vendors);
        self.draw_section(frame, Section::Contracts, contracts);

        frame.render_widget(
            Paragraph::new(" Type to search  Enter=search/select  Up/Down=suggestions  Esc=clear/quit")
                .style(FOOTER_STYLE),
            hints_area,
        );
    }

    fn draw_summary(&self, frame: &mut Frame, area: Rect) {
        let total = match self.section(Section::Total) {
            Some(SectionData::Total(total)) => dollars_span(*total),
            _ => Span::raw(LOADING),
        };
        let mut lines = vec![Line::from(vec![Span::styled(" Total Raised   ", TITLE_STYLE), total])];
        if let Some(bio) = &self.candidate.bio {
            let (wrapped, _) = wrap_text(bio, area.width.saturating_sub(2) as usize);
            lines.extend(wrapped.lines().take(2).map(|l| Line::from(format!(" {l}"))));
        }
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_search(&self, frame: &mut Frame, area: Rect) {
        let [input_area, status_area, results_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" Search donors: ", TITLE_STYLE),
                Span::raw(self.search.input().to_string()),
                Span::styled("_", FOOTER_STYLE),
            ])),
            input_area,
        );

        if let Some(status) = self.search.status_line() {
            let style = match self.search.state() {
                SearchState::Error(_) => ERROR_STYLE,
                _ if self.search.is_pending() => STATUS_STYLE,
                _ => Style::default(),
            };
            frame.render_widget(Paragraph::new(format!(" {status}")).style(style), status_area);
        }

        let history = self.search.history();
        let lines: Vec<Line> = match self.search.state() {
            SearchState::Found(_) => history
                .iter()
                .take(RESULT_ROWS as usize)
                .map(|r| {
                    Line::from(vec![
                        Span::raw(format!(" {:<28} ", truncate(&r.contributor_name, 28))),
                        dollars_span(r.contribution_amount),
                        Span::styled(
                            format!(
                                "  {}  {}  {}",
                                r.contribution_date.as_deref().unwrap_or(""),
                                r.employer.as_deref().unwrap_or(""),
                                r.donor_city.as_deref().unwrap_or(""),
                            ),
                            FOOTER_STYLE,
                        ),
                    ])
                })
                .collect(),
            SearchState::Suggestions(names) => {
                let mut lines = vec![Line::from(Span::styled(" Did you mean:", STATUS_STYLE))];
                lines.extend(names.iter().enumerate().map(|(i, name)| {
                    if self.selected == Some(i) {
                        Line::from(Span::styled(format!(" > {name}"), SELECTED_STYLE))
                    } else {
                        Line::from(format!("   {name}"))
                    }
                }));
                lines
            }
            _ => Vec::new(),
        };
        frame.render_widget(Paragraph::new(lines), results_area);
    }

    fn draw_section(&self, frame: &mut Frame, section: Section, area: Rect) {
        let block = Block::default()
            .title(section.title())
            .title_style(Style::default().add_modifier(Modifier::BOLD))
            .borders(Borders::NONE);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(data) = self.section(section) else {
            frame.render_widget(Paragraph::new(LOADING).style(FOOTER_STYLE), inner);
            return;
        };

        match data {
            SectionData::Total(_) => {}
            SectionData::Breakdown(entries) => draw_legend(frame, entries, inner),
            SectionData::Bars(series) => draw_bars(frame, series, inner),
            SectionData::Timeline(series) => draw_timeline(frame, series, inner),
            SectionData::Vendors(matches) => {
                let lines = matches
                    .iter()
                    .map(|m| match_line(&m.business_name, &m.matched_vendor, m.contribution_amount))
                    .collect();
                draw_matches(frame, lines, inner);
            }
            SectionData::Contracts(matches) => {
                let lines = matches
                    .iter()
                    .map(|m| match_line(&m.donor_business, &m.matched_vendor, m.donated))
                    .collect();
                draw_matches(frame, lines, inner);
            }
        }
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn draw_legend(frame: &mut Frame, entries: &[LegendEntry], area: Rect) {
    let name_width = entries.iter().map(|e| e.label.len()).max().unwrap_or(10).min(22);
    let lines: Vec<Line> = entries
        .iter()
        .map(|e| {
            Line::from(vec![
                Span::raw(format!(" {:<width$} ", truncate(&e.label, name_width), width = name_width)),
                dollars_span(e.value),
                Span::styled(format!("  {}%", e.percent), FOOTER_STYLE),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_bars(frame: &mut Frame, series: &BarSeries, area: Rect) {
    if series.bars.is_empty() {
        frame.render_widget(Paragraph::new(" No data").style(FOOTER_STYLE), area);
        return;
    }
    let bars: Vec<Bar> = series
        .bars
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let color = series.colors.get(i).map(|c| hex_color(c)).unwrap_or(Color::Gray);
            Bar::default()
                .value(*value)
                .label(Line::from(truncate(label, 18)))
                .text_value(format_k(*value as f64))
                .style(Style::default().fg(color))
        })
        .collect();
    let chart = BarChart::default()
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

fn draw_timeline(frame: &mut Frame, series: &LineSeries, area: Rect) {
    if series.points.is_empty() {
        frame.render_widget(Paragraph::new(" No data").style(FOOTER_STYLE), area);
        return;
    }
    let color = series.color.as_deref().map(hex_color).unwrap_or(Color::Green);

    let (top_tick, mid_tick) = y_axis_ticks(series.max);
    let top_label = format_k(top_tick);
    let mid_label = format_k(mid_tick);
    let y_label_width = top_label.len().max(mid_label.len()) as u16 + 1;

    let [y_axis_area, bar_area] =
        Layout::horizontal([Constraint::Length(y_label_width), Constraint::Fill(1)]).areas(area);

    let inner_height = bar_area.height.saturating_sub(1);
    let mid_row = inner_height / 2;
    let y_lines: Vec<Line> = (0..inner_height)
        .map(|row| {
            let label = if row == 0 {
                top_label.as_str()
            } else if row == mid_row {
                mid_label.as_str()
            } else {
                ""
            };
            Line::from(Span::styled(
                format!("{:>width$}", label, width = y_label_width as usize),
                FOOTER_STYLE,
            ))
        })
        .collect();
    frame.render_widget(Paragraph::new(y_lines), y_axis_area);

    let bars: Vec<Bar> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, (_, y))| {
            let label = series.labels.get(i).map(|m| month_label(m)).unwrap_or_default();
            Bar::default()
                .value(y.max(0.0).round() as u64)
                .label(Line::from(label))
                .text_value(String::new())
                .style(Style::default().fg(color))
        })
        .collect();
    let chart = BarChart::default()
        .bar_width(6)
        .bar_gap(1)
        .max(top_tick.round() as u64)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, bar_area);
}

fn match_line(donor: &str, vendor: &str, amount: f64) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!(" {} ", truncate(donor, 26))),
        Span::styled(format!("-> {} ", truncate(vendor, 26)), FOOTER_STYLE),
        dollars_span(amount),
    ])
}

fn draw_matches(frame: &mut Frame, lines: Vec<Line<'static>>, area: Rect) {
    if lines.is_empty() {
        frame.render_widget(Paragraph::new(" No matches").style(FOOTER_STYLE), area);
    } else {
        frame.render_widget(Paragraph::new(lines), area);
    }
}

/// One worker per section. Failures are logged and never reported back, so
/// the section stays on "Loading...".
fn spawn_sections(client: &ApiClient, slug: &str, tx: &Sender<Update>) {
    for section in Section::ALL {
        let client = client.clone();
        let slug = slug.to_string();
        let tx = tx.clone();
        std::thread::spawn(move || match fetch(&client, &slug, section) {
            Ok(data) => {
                let _ = tx.send(Update::Section(section, data));
            }
            Err(e) => warn!(section = section.title(), error = %e, "section fetch failed"),
        });
    }
}

fn spawn_search(client: &ApiClient, slug: &str, ticket: Ticket, tx: &Sender<Update>) {
    let client = client.clone();
    let slug = slug.to_string();
    let tx = tx.clone();
    std::thread::spawn(move || {
        let reply = client.search_donor(&slug, &ticket.query);
        let _ = tx.send(Update::Search(ticket, reply));
    });
}

fn drain(dashboard: &mut CandidateDashboard, rx: &Receiver<Update>) {
    while let Ok(update) = rx.try_recv() {
        dashboard.apply(update);
    }
}

pub fn run(candidate: &str) -> Result<()> {
    let settings = load_settings();
    let client = ApiClient::new(&settings.api_base_url);
    let registry = Registry::new(client.candidates()?);
    let entry = registry.require(candidate)?.clone();
    info!(candidate = %entry.slug, api = client.base_url(), "opening dashboard");

    let (tx, rx) = mpsc::channel();
    spawn_sections(&client, &entry.slug, &tx);
    let mut dashboard = CandidateDashboard::new(entry);

    with_terminal(|terminal| loop {
        drain(&mut dashboard, &rx);
        terminal.draw(|frame| dashboard.draw(frame))?;

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match dashboard.handle_key(key.code, key.modifiers) {
                Action::Quit => return Ok(()),
                Action::Search(ticket) => {
                    spawn_search(&client, dashboard.search().candidate(), ticket, &tx)
                }
                Action::Continue => {}
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::donor_search::{HISTORY_FAILED, NO_HISTORY, SEARCH_FAILED};
    use crate::fmt::dollars;
    use crate::models::{DonorRecord, SearchResponse};

    fn solomon() -> Candidate {
        Candidate {
            slug: "James_Solomon".to_string(),
            display_name: "James Solomon".to_string(),
            bio: Some("Jersey City Ward E Councilman.".to_string()),
            photo: None,
            recipient_first: "James".to_string(),
            recipient_last: "Solomon".to_string(),
        }
    }

    fn record(name: &str, amount: f64) -> DonorRecord {
        DonorRecord {
            contributor_name: name.to_string(),
            contribution_amount: amount,
            employer: None,
            donor_city: None,
            contribution_date: None,
            contributor_group: Some("Corporate".to_string()),
        }
    }

    fn type_text(d: &mut CandidateDashboard, text: &str) {
        for c in text.chars() {
            d.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    fn enter(d: &mut CandidateDashboard) -> Ticket {
        match d.handle_key(KeyCode::Enter, KeyModifiers::NONE) {
            Action::Search(ticket) => ticket,
            other => panic!("expected a search, got {other:?}"),
        }
    }

    #[test]
    fn test_sections_start_loading() {
        let d = CandidateDashboard::new(solomon());
        assert!(Section::ALL.iter().all(|s| d.section(*s).is_none()));
        assert!(TAGLINES.contains(&d.tagline.as_str()));
    }

    #[test]
    fn test_section_updates_land_independently() {
        let mut d = CandidateDashboard::new(solomon());
        d.apply(Update::Section(Section::Total, SectionData::Total(6250.0)));
        assert_eq!(d.section(Section::Total), Some(&SectionData::Total(6250.0)));
        assert!(d.section(Section::TopDonors).is_none());
    }

    #[test]
    fn test_enter_submits_typed_query() {
        let mut d = CandidateDashboard::new(solomon());
        type_text(&mut d, "  McManimon ");
        let ticket = enter(&mut d);
        assert_eq!(ticket.query, "McManimon");
        assert!(d.search().is_pending());

        d.apply(Update::Search(
            ticket,
            Reply::Response(SearchResponse::found("mcmanimon", vec![record("McManimon", 5400.0)])),
        ));
        assert_eq!(d.search().history().len(), 1);
        assert_eq!(dollars(d.search().history()[0].contribution_amount), "$5,400");
    }

    #[test]
    fn test_blank_enter_issues_nothing() {
        let mut d = CandidateDashboard::new(solomon());
        type_text(&mut d, "   ");
        assert_eq!(d.handle_key(KeyCode::Enter, KeyModifiers::NONE), Action::Continue);
        assert_eq!(*d.search().state(), SearchState::Idle);
    }

    #[test]
    fn test_suggestion_selection_with_arrows() {
        let mut d = CandidateDashboard::new(solomon());
        type_text(&mut d, "sal electric");
        let ticket = enter(&mut d);
        d.apply(Update::Search(
            ticket,
            Reply::Response(SearchResponse::not_found(
                "sal electric",
                vec!["Sal Electric Co".into(), "Sal Electric Inc".into()],
            )),
        ));
        assert_eq!(d.search().suggestions().len(), 2);

        d.handle_key(KeyCode::Down, KeyModifiers::NONE);
        d.handle_key(KeyCode::Down, KeyModifiers::NONE);
        d.handle_key(KeyCode::Down, KeyModifiers::NONE);
        let ticket = enter(&mut d);
        assert_eq!(ticket.query, "Sal Electric Inc");
        assert_eq!(d.search().input(), "Sal Electric Inc");

        d.apply(Update::Search(
            ticket,
            Reply::Response(SearchResponse::not_found("sal electric inc", vec!["Other".into()])),
        ));
        assert_eq!(d.search().status_line(), Some(NO_HISTORY));
        assert!(d.search().suggestions().is_empty());
    }

    #[test]
    fn test_failed_lookups_show_messages() {
        let mut d = CandidateDashboard::new(solomon());
        type_text(&mut d, "x");
        let ticket = enter(&mut d);
        d.apply(Update::Search(ticket, Reply::Failed("connection refused".into())));
        assert_eq!(d.search().status_line(), Some(SEARCH_FAILED));

        let ticket = d.search.select_suggestion("Jane Doe");
        d.apply(Update::Search(ticket, Reply::Failed("timeout".into())));
        assert_eq!(d.search().status_line(), Some(HISTORY_FAILED));
    }

    #[test]
    fn test_stale_reply_is_ignored() {
        let mut d = CandidateDashboard::new(solomon());
        type_text(&mut d, "first");
        let old = enter(&mut d);
        d.handle_key(KeyCode::Esc, KeyModifiers::NONE);
        type_text(&mut d, "second");
        let new = enter(&mut d);

        d.apply(Update::Search(
            old,
            Reply::Response(SearchResponse::found("first", vec![record("First", 1.0)])),
        ));
        assert!(d.search().is_pending());
        d.apply(Update::Search(new, Reply::Response(SearchResponse::not_found("second", vec![]))));
        assert!(!d.search().is_pending());
    }

    #[test]
    fn test_escape_clears_then_quits() {
        let mut d = CandidateDashboard::new(solomon());
        type_text(&mut d, "abc");
        assert_eq!(d.handle_key(KeyCode::Esc, KeyModifiers::NONE), Action::Continue);
        assert_eq!(d.search().input(), "");
        assert_eq!(d.handle_key(KeyCode::Esc, KeyModifiers::NONE), Action::Quit);
        assert_eq!(d.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL), Action::Quit);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Short", 10), "Short");
        assert_eq!(truncate("McManimon Scotland", 10), "McManimon…");
    }
}
