pub mod charting;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use steelcore::analytics::{daily_breakdown, weekly_buckets, LoadSummary};
use steelcore::timer::Phase;
use steelcore::util::format_mmss;

use crate::{App, AppState, EntryField};
use charting::{bar_len, compute_chart_params, format_label, zone_marker_col};

const HORIZONTAL_MARGIN: u16 = 3;
const VERTICAL_MARGIN: u16 = 1;

/// Zone color for a ratio value, one per risk band.
fn ratio_color(ratio: f64) -> Color {
    if ratio < 0.8 {
        Color::Blue
    } else if ratio <= 1.3 {
        Color::Green
    } else if ratio <= 1.5 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn phase_color(phase: Phase) -> Color {
    match phase {
        Phase::Work => Color::Red,
        Phase::Rest => Color::Blue,
        Phase::Done => Color::Green,
        Phase::Idle => Color::Gray,
    }
}

pub fn ui(app: &mut App, f: &mut Frame) {
    match app.state {
        AppState::Dashboard => render_dashboard(app, f),
        AppState::Timer => render_timer(app, f),
        AppState::Entry => render_entry(app, f),
        AppState::History => render_history(app, f),
    }
}

fn outer(f: &Frame) -> Rect {
    let area = f.area();
    Layout::default()
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([Constraint::Min(0)])
        .split(area)[0]
}

fn header_line() -> Paragraph<'static> {
    Paragraph::new(Line::from(vec![
        Span::styled(
            "STEELCORE",
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  load tracker", Style::default().fg(Color::DarkGray)),
    ]))
}

fn render_dashboard(app: &mut App, f: &mut Frame) {
    let today = app.today;
    let summary = LoadSummary::compute(&app.workouts, today);
    let buckets = weekly_buckets(&app.workouts, today);
    let days = daily_breakdown(&app.workouts, today);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),  // header
            Constraint::Length(5),  // metric cells
            Constraint::Length(3),  // zone bar
            Constraint::Min(8),     // weekly chart
            Constraint::Length(9),  // daily breakdown
            Constraint::Length(1),  // footer
        ])
        .split(outer(f));

    f.render_widget(header_line(), chunks[0]);

    // Metric cells: acute / chronic / ratio / trend
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(chunks[1]);

    let zone = ratio_color(summary.ratio);
    let trend_text = summary
        .trend
        .map(|t| t.to_string())
        .unwrap_or_else(|| "—".to_string());

    let metric = |label: &'static str, value: String, sub: &'static str, color: Color| {
        Paragraph::new(vec![
            Line::from(Span::styled(label, Style::default().fg(Color::DarkGray))),
            Line::from(Span::styled(
                value,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(sub, Style::default().fg(Color::DarkGray))),
        ])
        .block(Block::default().borders(Borders::ALL))
    };

    f.render_widget(
        metric("ACUTE", format_label(summary.acute), "7-day sum", Color::White),
        cells[0],
    );
    f.render_widget(
        metric(
            "CHRONIC",
            format_label(summary.chronic),
            "28-day avg",
            Color::White,
        ),
        cells[1],
    );
    f.render_widget(
        metric("RATIO", format!("{:.2}", summary.ratio), "acute / chronic", zone),
        cells[2],
    );
    f.render_widget(metric("TREND", trend_text, "", zone), cells[3]);

    // Zone bar: marker across the clamped 0..2 ratio range
    let track_width = chunks[2].width.saturating_sub(2).max(10);
    let marker = zone_marker_col(summary.ratio, track_width);
    let mut track: Vec<Span> = Vec::with_capacity(track_width as usize);
    for col in 0..track_width {
        if col == marker {
            track.push(Span::styled(
                "◆",
                Style::default().fg(zone).add_modifier(Modifier::BOLD),
            ));
        } else {
            track.push(Span::styled("─", Style::default().fg(Color::DarkGray)));
        }
    }
    let zone_bar = Paragraph::new(vec![
        Line::from(track),
        Line::from(Span::styled(
            "0.0       0.8       1.3  1.5       2.0+",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    f.render_widget(zone_bar, chunks[2]);

    // Weekly load line chart
    let points: Vec<(f64, f64)> = buckets
        .iter()
        .enumerate()
        .map(|(i, b)| (i as f64, b.load))
        .collect();
    let y_max = compute_chart_params(&buckets);
    let datasets = vec![Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Red))
        .data(&points)];
    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("4-week load"),
        )
        .x_axis(
            Axis::default()
                .bounds([0.0, 3.0])
                .labels(
                    buckets
                        .iter()
                        .map(|b| Span::styled(b.label, Style::default().fg(Color::DarkGray)))
                        .collect::<Vec<Span>>(),
                ),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, y_max])
                .labels(vec![
                    Span::styled("0", Style::default().fg(Color::DarkGray)),
                    Span::styled(format_label(y_max), Style::default().fg(Color::DarkGray)),
                ]),
        );
    f.render_widget(chart, chunks[3]);

    // Daily breakdown bars, today last
    let max_load = days.iter().map(|d| d.load).fold(1.0_f64, f64::max);
    let bar_width = chunks[4].width.saturating_sub(18).max(10);
    let mut lines: Vec<Line> = vec![Line::from(Span::styled(
        "Last 7 days",
        Style::default().fg(Color::DarkGray),
    ))];
    for day in &days {
        let style = if day.is_today {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let bar = "█".repeat(bar_len(day.load, max_load, bar_width) as usize);
        let load_text = if day.load > 0.0 {
            format_label(day.load)
        } else {
            "—".to_string()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<6}", day.label), style),
            Span::styled(bar, Style::default().fg(Color::Red)),
            Span::styled(format!(" {load_text}"), style),
        ]));
    }
    f.render_widget(Paragraph::new(lines), chunks[4]);

    f.render_widget(footer("(t)imer  (l)og workout  (h)istory  (q)uit"), chunks[5]);
}

fn render_timer(app: &mut App, f: &mut Frame) {
    let timer = &app.timer;
    let preset = timer.preset();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // header
            Constraint::Length(1), // phase
            Constraint::Length(2), // clock
            Constraint::Length(1), // round pips
            Constraint::Length(1), // preset summary
            Constraint::Length(1), // announcement
            Constraint::Min(1),    // decision / spacing
            Constraint::Length(1), // footer
        ])
        .split(outer(f));

    f.render_widget(header_line(), chunks[0]);

    let color = phase_color(timer.phase());
    f.render_widget(
        Paragraph::new(Span::styled(
            timer.phase().label(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        chunks[1],
    );

    f.render_widget(
        Paragraph::new(Span::styled(
            format_mmss(timer.time_left()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        chunks[2],
    );

    // Round pips: filled for finished rounds, hollow ahead
    let mut pips: Vec<Span> = Vec::new();
    for r in 1..=preset.rounds {
        let pip = if r < timer.round() || timer.is_done() {
            Span::styled("● ", Style::default().fg(Color::Red))
        } else if r == timer.round() && timer.phase() != Phase::Idle {
            Span::styled("● ", Style::default().fg(Color::White))
        } else {
            Span::styled("○ ", Style::default().fg(Color::DarkGray))
        };
        pips.push(pip);
    }
    f.render_widget(
        Paragraph::new(Line::from(pips)).alignment(Alignment::Center),
        chunks[3],
    );

    f.render_widget(
        Paragraph::new(Span::styled(
            format!(
                "{} rounds × {} work / {} rest",
                preset.rounds,
                format_mmss(preset.work_secs),
                format_mmss(preset.rest_secs)
            ),
            Style::default().fg(Color::DarkGray),
        ))
        .alignment(Alignment::Center),
        chunks[4],
    );

    if let Some(text) = app.notifier.last_announcement() {
        f.render_widget(
            Paragraph::new(Span::styled(
                text,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
            ))
            .alignment(Alignment::Center),
            chunks[5],
        );
    }

    if let Some(handoff) = timer.handoff() {
        let decision = Paragraph::new(vec![
            Line::from(Span::styled(
                "Log this session?",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!(
                    "{} elapsed, logs as {} min",
                    format_mmss(handoff.elapsed_secs),
                    handoff.suggested_minutes
                ),
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(Span::styled(
                "(y) log it   (n) discard",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center);
        f.render_widget(decision, chunks[6]);
    }

    let keys = match timer.phase() {
        Phase::Idle => "(s)tart  +/- work minutes  [/] rounds  (Esc) back",
        Phase::Work | Phase::Rest => "(r)eset  (Esc) back",
        Phase::Done => "(y) log  (n) discard",
    };
    f.render_widget(footer(keys), chunks[7]);
}

fn render_entry(app: &mut App, f: &mut Frame) {
    let entry = &app.entry;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // header
            Constraint::Length(1), // title
            Constraint::Length(1), // spacer
            Constraint::Length(1), // date
            Constraint::Length(1), // duration
            Constraint::Length(1), // intensity
            Constraint::Length(1), // derived load
            Constraint::Min(0),
            Constraint::Length(1), // footer
        ])
        .split(outer(f));

    f.render_widget(header_line(), chunks[0]);

    let title = if entry.editing_id.is_some() {
        "Edit workout"
    } else {
        "Log workout"
    };
    f.render_widget(
        Paragraph::new(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        chunks[1],
    );

    let field_style = |field: EntryField| {
        if entry.field == field {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        }
    };

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Date       ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                entry.date(app.today).format("%d %b %Y").to_string(),
                field_style(EntryField::Date),
            ),
            Span::styled("  (←/→ shift day)", Style::default().fg(Color::DarkGray)),
        ])),
        chunks[3],
    );

    let duration_display = if entry.duration.is_empty() {
        "_".to_string()
    } else {
        entry.duration.clone()
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Duration   ", Style::default().fg(Color::DarkGray)),
            Span::styled(duration_display, field_style(EntryField::Duration)),
            Span::styled(" min", Style::default().fg(Color::DarkGray)),
        ])),
        chunks[4],
    );

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Intensity  ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("< {} >", entry.intensity()),
                field_style(EntryField::Intensity),
            ),
            Span::styled(
                format!("  ×{}", entry.intensity().multiplier()),
                Style::default().fg(Color::DarkGray),
            ),
        ])),
        chunks[5],
    );

    if let Some(duration) = entry.parsed_duration() {
        let load = duration * f64::from(entry.intensity().multiplier());
        f.render_widget(
            Paragraph::new(Span::styled(
                format!("Load {}", format_label(load)),
                Style::default().fg(Color::DarkGray),
            )),
            chunks[6],
        );
    }

    f.render_widget(
        footer("(Tab) next field  (Enter) save  (Esc) cancel"),
        chunks[8],
    );
}

fn render_history(app: &mut App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // header
            Constraint::Length(1), // title
            Constraint::Min(1),    // rows
            Constraint::Length(1), // footer
        ])
        .split(outer(f));

    f.render_widget(header_line(), chunks[0]);
    f.render_widget(
        Paragraph::new(Span::styled(
            "History",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        chunks[1],
    );

    if app.workouts.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled(
                "No workouts logged yet.",
                Style::default().fg(Color::DarkGray),
            )),
            chunks[2],
        );
    } else {
        let visible = chunks[2].height as usize;
        let offset = app.history_selected.saturating_sub(visible.saturating_sub(1));
        let lines: Vec<Line> = app
            .workouts
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(i, w)| {
                let style = if i == app.history_selected {
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                Line::from(Span::styled(
                    format!(
                        "{}  {:>5} min · {:<10}  {:>6}",
                        w.date.format("%d %b %Y"),
                        format_label(w.duration_min),
                        w.intensity.to_string(),
                        format_label(w.load),
                    ),
                    style,
                ))
            })
            .collect();
        f.render_widget(Paragraph::new(lines), chunks[2]);
    }

    f.render_widget(footer("j/k select  (e)dit  (d)elete  (Esc) back"), chunks[3]);
}

fn footer(keys: &str) -> Paragraph<'_> {
    Paragraph::new(Span::styled(
        keys,
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    ))
}
