//! Terminal rendering of a [`RenderState`]

use ratatui::{prelude::*, widgets::*};

use crate::app::state::{LoadStatus, StatsState};
use crate::constants::{APP_NAME, APP_VERSION, NO_SELECTION_MESSAGE};
use crate::messages::render::{ExplanationBody, ExplanationView};
use crate::messages::RenderState;
use crate::models::{percent, Action, DashboardStats, Severity, Threat};

/// Draw the whole dashboard
pub fn draw_ui(f: &mut Frame, state: &RenderState) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_title(f, chunks[0]);

    match &state.load {
        LoadStatus::Loading => {
            let loading = Paragraph::new("Loading data...")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(loading, chunks[1]);
        }
        LoadStatus::Failed(message) => {
            let error = Paragraph::new(format!("Error: {}", message))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::ALL).title(" Load failed (R to reload) "));
            f.render_widget(error, chunks[1]);
        }
        LoadStatus::Ready => draw_dashboard(f, state, chunks[1]),
    }

    draw_status_bar(f, state, chunks[2]);

    if state.show_stats {
        draw_stats_popup(f, &state.stats, area);
    }

    if state.show_help {
        draw_help_popup(f, area);
    }
}

fn draw_title(f: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(format!(" {} ", APP_NAME), Style::default().fg(Color::Black).bg(Color::Cyan).bold()),
        Span::styled(format!(" v{}", APP_VERSION), Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(title), area);
}

fn draw_dashboard(f: &mut Frame, state: &RenderState, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    draw_threats(f, state, columns[0]);

    match &state.explanation {
        Some(view) => {
            let right = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(6), Constraint::Min(5)])
                .split(columns[1]);
            draw_action_details(f, state.selected_action.as_ref(), right[0]);
            draw_explanation(f, view, right[1]);
        }
        None => draw_action_details(f, state.selected_action.as_ref(), columns[1]),
    }
}

fn draw_threats(f: &mut Frame, state: &RenderState, area: Rect) {
    let items: Vec<ListItem> = state
        .threats
        .iter()
        .map(|threat| {
            let selected = state.selected_threat_id.as_ref() == Some(&threat.id);
            threat_item(threat, selected)
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(format!(" Threats ({}) ", state.threats.len())),
        )
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut list_state = ListState::default();
    if !state.threats.is_empty() {
        list_state.select(Some(state.cursor));
    }
    f.render_stateful_widget(list, area, &mut list_state);
}

fn threat_item(threat: &Threat, selected: bool) -> ListItem<'static> {
    let marker = if selected { "* " } else { "  " };
    let mut header = vec![
        Span::styled(marker, Style::default().fg(Color::Yellow).bold()),
        Span::styled(threat.kind.clone(), Style::default().bold()),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", threat.severity),
            Style::default().fg(severity_color(threat.severity_level())).bold(),
        ),
        Span::styled(format!("  {}", threat.source), Style::default().fg(Color::Gray)),
    ];
    if let Some(ts) = &threat.timestamp {
        header.push(Span::styled(format!("  {}", ts), Style::default().fg(Color::DarkGray)));
    }

    ListItem::new(vec![
        Line::from(header),
        Line::from(Span::styled(format!("    {}", threat.summary), Style::default().fg(Color::DarkGray))),
    ])
}

fn draw_action_details(f: &mut Frame, action: Option<&Action>, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Actions ");

    let content = match action {
        Some(action) => vec![
            Line::from(Span::styled(action.action.clone(), Style::default().fg(Color::Green).bold())),
            Line::from(format!("Confidence: {}", percent(action.confidence))),
            Line::from(format!("Reward: {}", percent(action.reward))),
        ],
        None => vec![Line::from(Span::styled(NO_SELECTION_MESSAGE, Style::default().fg(Color::DarkGray)))],
    };

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn draw_explanation(f: &mut Frame, view: &ExplanationView, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" AI Explanation ");

    let button_style = if view.button_enabled {
        Style::default().fg(Color::Black).bg(Color::Magenta).bold()
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("[ {} ]", view.button_label), button_style),
            Span::styled(if view.button_enabled { "  x" } else { "" }, Style::default().fg(Color::DarkGray)),
        ]),
        Line::default(),
    ];

    match &view.body {
        ExplanationBody::Empty | ExplanationBody::Loading => {}
        ExplanationBody::Text(text) => {
            lines.extend(text.lines().map(|l| Line::from(l.to_string())));
        }
        ExplanationBody::Error(message) => {
            lines.push(Line::from(Span::styled(format!("Error: {}", message), Style::default().fg(Color::Red))));
        }
    }

    if let Some(subject) = &view.subject {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(format!("for {}", subject), Style::default().fg(Color::DarkGray))));
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let status = match &state.load {
        LoadStatus::Loading => String::from(" Loading... | q:quit "),
        LoadStatus::Failed(_) => String::from(" Load failed | R:reload | q:quit "),
        LoadStatus::Ready => {
            let loaded = state
                .loaded_at
                .map(|t| format!(" at {}", t.with_timezone(&chrono::Local).format("%H:%M:%S")))
                .unwrap_or_default();
            format!(
                " {} threats, {} actions{} | up/down:move Enter:select x:explain s:stats R:reload ?:help q:quit ",
                state.threats.len(),
                state.action_count,
                loaded
            )
        }
    };

    f.render_widget(Paragraph::new(status).style(Style::default().fg(Color::DarkGray)), area);
}

fn draw_stats_popup(f: &mut Frame, stats: &StatsState, area: Rect) {
    let popup_area = centered_rect(60, 60, area);

    let lines = match stats {
        StatsState::Idle | StatsState::Loading { .. } => vec![Line::from("Loading statistics...")],
        StatsState::Failed(message) => vec![Line::from(Span::styled(
            format!("Error: {}", message),
            Style::default().fg(Color::Red),
        ))],
        StatsState::Ready(stats) => stats_lines(stats),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Statistics (s/Esc to close) ")
        .style(Style::default().bg(Color::Black));

    f.render_widget(Clear, popup_area);
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), popup_area);
}

fn stats_lines(stats: &DashboardStats) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(format!("Threats: {}   Actions: {}", stats.total_threats, stats.total_actions)),
        Line::from(format!(
            "Average confidence: {}   Average reward: {}",
            percent(stats.avg_confidence),
            percent(stats.avg_reward)
        )),
        Line::default(),
        Line::from(Span::styled("Threat types", Style::default().bold())),
    ];
    lines.extend(stats.threat_types.iter().map(|(k, v)| Line::from(format!("  {:<14} {}", k, v))));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Action types", Style::default().bold())));
    lines.extend(stats.action_types.iter().map(|(k, v)| Line::from(format!("  {:<14} {}", k, v))));
    lines
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);

    let help_text = r#"
 CYBER BRAIN DASHBOARD - Keyboard Shortcuts

 THREATS
   Up / Down, k / j   Move highlight
   Enter / Space      Select threat

 EXPLANATION
   x                  Explain selected decision

 GENERAL
   s                  Statistics
   R                  Reload data
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#;

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    f.render_widget(Clear, popup_area);
    f.render_widget(Paragraph::new(help_text).block(block), popup_area);
}

/// Severity color
pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Critical => Color::Magenta,
        Severity::High => Color::Red,
        Severity::Medium => Color::Yellow,
        Severity::Low => Color::Green,
        Severity::Unknown => Color::White,
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::reducer::{reduce, AppEvent};
    use crate::app::AppState;
    use crate::error::ApiError;
    use crate::messages::{NetworkCommand, NetworkResponse, UiEvent};
    use crate::models::RecordId;
    use ratatui::backend::TestBackend;

    fn render(state: &RenderState) -> String {
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw_ui(f, state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn apply(state: AppState, event: AppEvent) -> (AppState, Vec<NetworkCommand>) {
        let t = reduce(state, event);
        (t.state, t.commands)
    }

    fn scenario_loaded() -> AppState {
        let (state, commands) = apply(AppState::new(), AppEvent::Mount);
        let NetworkCommand::LoadDashboard { id } = commands[0] else {
            panic!("expected load");
        };
        let threats: Vec<Threat> = serde_json::from_str(
            r#"[{"id":1,"type":"phishing","summary":"Credential lure","severity":"high","source":"email"}]"#,
        )
        .unwrap();
        let actions: Vec<Action> = serde_json::from_str(
            r#"[{"id":1,"threat_id":1,"action":"quarantine","confidence":0.9,"reward":0.8}]"#,
        )
        .unwrap();
        apply(
            state,
            AppEvent::Network(NetworkResponse::DashboardLoaded {
                id,
                threats,
                actions,
                fetched_at: chrono::Utc::now(),
            }),
        )
        .0
    }

    #[test]
    fn test_renders_loading() {
        let screen = render(&RenderState::default());
        assert!(screen.contains("Loading data..."));
    }

    #[test]
    fn test_renders_load_error_without_lists() {
        let (state, commands) = apply(AppState::new(), AppEvent::Mount);
        let NetworkCommand::LoadDashboard { id } = commands[0] else {
            panic!("expected load");
        };
        let (state, _) = apply(
            state,
            AppEvent::Network(NetworkResponse::DashboardFailed {
                id,
                error: ApiError::Status { endpoint: "/api/threats".into(), status: 500 },
            }),
        );
        let screen = render(&state.to_render_state());
        assert!(screen.contains("Error: Failed to fetch data"));
        assert!(!screen.contains("Threats ("));
    }

    #[test]
    fn test_renders_threats_and_placeholder() {
        let screen = render(&scenario_loaded().to_render_state());
        assert!(screen.contains("phishing"));
        assert!(screen.contains("[high]"));
        assert!(screen.contains("email"));
        assert!(screen.contains("Credential lure"));
        assert!(screen.contains(NO_SELECTION_MESSAGE));
        assert!(!screen.contains("AI Explanation"));
    }

    #[test]
    fn test_scenario_selection_and_explanation() {
        let (state, _) = apply(scenario_loaded(), AppEvent::Ui(UiEvent::SelectThreat));
        let screen = render(&state.to_render_state());
        assert!(screen.contains("quarantine"));
        assert!(screen.contains("Confidence: 90%"));
        assert!(screen.contains("Reward: 80%"));
        assert!(screen.contains("[ Explain Decision ]"));

        let (state, commands) = apply(state, AppEvent::Ui(UiEvent::Explain));
        let NetworkCommand::Explain { id, .. } = &commands[0] else {
            panic!("expected explain");
        };
        let id = *id;
        assert!(render(&state.to_render_state()).contains("[ Loading... ]"));

        let (ok, _) = apply(
            state.clone(),
            AppEvent::Network(NetworkResponse::ExplanationReady {
                id,
                text: "blocked due to sender reputation".into(),
            }),
        );
        let screen = render(&ok.to_render_state());
        assert!(screen.contains("blocked due to sender reputation"));
        assert!(!screen.contains("Error:"));

        let (failed, _) = apply(
            state,
            AppEvent::Network(NetworkResponse::ExplanationFailed {
                id,
                error: ApiError::Status { endpoint: "/api/explain".into(), status: 502 },
            }),
        );
        let screen = render(&failed.to_render_state());
        assert!(screen.contains("Error: Failed to fetch explanation"));
        assert!(!screen.contains("blocked due to sender reputation"));
    }

    #[test]
    fn test_renders_stats_popup() {
        let mut render_state = scenario_loaded().to_render_state();
        render_state.show_stats = true;
        render_state.stats = StatsState::Ready(DashboardStats {
            threat_types: [("phishing".to_string(), 3)].into_iter().collect(),
            action_types: [("Blocked".to_string(), 2)].into_iter().collect(),
            total_threats: 3,
            total_actions: 2,
            avg_reward: 0.5,
            avg_confidence: 0.873,
        });
        let screen = render(&render_state);
        assert!(screen.contains("Average confidence: 87%"));
        assert!(screen.contains("Blocked"));
    }

    #[test]
    fn test_renders_help_over_anything() {
        let mut render_state = RenderState::default();
        render_state.show_help = true;
        render_state.selected_threat_id = Some(RecordId::Number(1));
        assert!(render(&render_state).contains("Keyboard Shortcuts"));
    }

    #[test]
    fn test_severity_colors_distinct() {
        assert_ne!(severity_color(Severity::High), severity_color(Severity::Low));
        assert_eq!(severity_color(Severity::Unknown), Color::White);
    }
}
