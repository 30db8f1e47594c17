//! ---
//! ems_section: "12-gui-dashboard"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Terminal rendering for the dashboard panels."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use eap_sim::{Alert, AlertKind, ConnectionStatus, DashboardSnapshot};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, Gauge, GraphType, List,
    ListItem, Paragraph, Row, Table, Tabs,
};
use ratatui::Frame;
use strum::IntoEnumIterator;

use crate::app::{App, Tab};
use crate::catalog;

const TITLE: &str = "Energy Analytics Platform";
const SUBTITLE: &str = "Real-Time SCADA Monitoring & Analytics";
const FOOTER: &str = "© 2025 Energy Analytics Platform. NERC CIP Compliant.";
const DEPLOY_NOTE: &str = "Deployed via GitLab CI/CD | Monitored by Prometheus & Grafana";
const KEY_HELP: &str = "1-4 panels  Tab/←/→ switch  q quit";

pub fn draw(frame: &mut Frame, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(frame.size());

    draw_header(frame, layout[0], app.snapshot());
    draw_tabs(frame, layout[1], app.tab());
    match app.tab() {
        Tab::Dashboard => draw_dashboard(frame, layout[2], app),
        Tab::Analytics => draw_analytics(frame, layout[2]),
        Tab::Scada => draw_scada(frame, layout[2], app),
        Tab::System => draw_system(frame, layout[2], app.snapshot()),
    }
    draw_footer(frame, layout[3]);
}

fn block(title: &str) -> Block<'_> {
    Block::default().borders(Borders::ALL).title(Span::styled(
        title,
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
}

fn draw_header(frame: &mut Frame, area: Rect, snapshot: &DashboardSnapshot) {
    let line = Line::from(vec![
        Span::styled(TITLE, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(SUBTITLE, Style::default().fg(Color::Gray)),
        Span::raw("  "),
        Span::styled("● Operational", Style::default().fg(Color::Green)),
        Span::raw("  "),
        link_span(snapshot.connection),
        Span::raw(format!("  tick {}", snapshot.tick)),
    ]);
    frame.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn link_span(status: ConnectionStatus) -> Span<'static> {
    let color = if status.is_connected() {
        Color::Green
    } else {
        Color::Red
    };
    Span::styled(link_label(status), Style::default().fg(color))
}

fn draw_tabs(frame: &mut Frame, area: Rect, selected: Tab) {
    let titles: Vec<Line> = Tab::iter()
        .enumerate()
        .map(|(index, tab)| Line::from(format!("{} {}", index + 1, tab)))
        .collect();
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL))
        .select(selected.index())
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn draw_footer(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(FOOTER, Style::default().fg(Color::Gray))),
        Line::from(Span::styled(DEPLOY_NOTE, Style::default().fg(Color::Gray))),
        Line::from(Span::styled(KEY_HELP, Style::default().fg(Color::DarkGray))),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_dashboard(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(10),
            Constraint::Length(12),
        ])
        .split(area);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(rows[0]);
    let alerts = app.snapshot().alerts.len().to_string();
    let card_data = [
        ("Current Load", app.load_label(), "+5.2%"),
        ("Generation", app.generation_label(), "+3.8%"),
        ("Efficiency", catalog::EFFICIENCY_LABEL.to_owned(), "+1.2%"),
        ("Active Alerts", alerts, app.alert_level()),
    ];
    for ((title, value, trend), area) in card_data.into_iter().zip(cards.iter()) {
        let text = vec![
            Line::from(Span::styled(value, Style::default().add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(trend, Style::default().fg(Color::Gray))),
        ];
        frame.render_widget(Paragraph::new(text).block(block(title)), *area);
    }

    draw_power_flow(frame, rows[1], app.snapshot());

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);
    draw_grid_utilization(frame, bottom[0]);
    draw_alerts(frame, bottom[1], &app.snapshot().alerts);
}

fn draw_power_flow(frame: &mut Frame, area: Rect, snapshot: &DashboardSnapshot) {
    let load: Vec<(f64, f64)> = snapshot
        .samples
        .iter()
        .enumerate()
        .map(|(index, sample)| (index as f64, f64::from(sample.load)))
        .collect();
    let generation: Vec<(f64, f64)> = snapshot
        .samples
        .iter()
        .enumerate()
        .map(|(index, sample)| (index as f64, f64::from(sample.generation)))
        .collect();
    let (low, high) = snapshot
        .samples
        .iter()
        .flat_map(|sample| [sample.load, sample.generation])
        .fold(None, |acc: Option<(u32, u32)>, value| match acc {
            Some((low, high)) => Some((low.min(value), high.max(value))),
            None => Some((value, value)),
        })
        .map(|(low, high)| (f64::from(low.saturating_sub(50)), f64::from(high + 50)))
        .unwrap_or((0.0, 2000.0));
    let width = snapshot.samples.len().saturating_sub(1).max(1) as f64;

    let datasets = vec![
        Dataset::default()
            .name("Load (MW)")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Red))
            .data(&load),
        Dataset::default()
            .name("Generation (MW)")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&generation),
    ];
    let first = snapshot.samples.first().map(|s| s.timestamp.clone()).unwrap_or_default();
    let last = snapshot.latest().map(|s| s.timestamp.clone()).unwrap_or_default();
    let title = format!("Real-Time Power Flow  [{}]", link_label(snapshot.connection));
    let chart = Chart::new(datasets)
        .block(block(&title))
        .x_axis(
            Axis::default()
                .bounds([0.0, width])
                .labels(vec![Span::raw(first), Span::raw(last)]),
        )
        .y_axis(
            Axis::default()
                .bounds([low, high])
                .labels(vec![
                    Span::raw(format!("{low:.0}")),
                    Span::raw(format!("{high:.0}")),
                ]),
        );
    frame.render_widget(chart, area);
}

fn link_label(status: ConnectionStatus) -> &'static str {
    if status.is_connected() {
        "SCADA CONNECTED"
    } else {
        "SCADA DISCONNECTED"
    }
}

fn draw_grid_utilization(frame: &mut Frame, area: Rect) {
    let mut chart = BarChart::default()
        .block(block("Grid Utilization (MW)"))
        .bar_width(5)
        .bar_gap(1)
        .group_gap(2);
    for grid in catalog::GRIDS {
        let bars = [
            Bar::default()
                .value(u64::from(grid.capacity_mw))
                .style(Style::default().fg(Color::DarkGray)),
            Bar::default()
                .value(u64::from(grid.current_mw))
                .style(Style::default().fg(Color::Blue)),
        ];
        chart = chart.data(BarGroup::default().label(Line::from(grid.name)).bars(&bars));
    }
    frame.render_widget(chart, area);
}

fn alert_color(kind: AlertKind) -> Color {
    match kind {
        AlertKind::Critical => Color::Red,
        AlertKind::Warning => Color::Yellow,
        AlertKind::Info => Color::Blue,
    }
}

fn draw_alerts(frame: &mut Frame, area: Rect, alerts: &[Alert]) {
    let items: Vec<ListItem> = if alerts.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "No active alerts",
            Style::default().fg(Color::Gray),
        )))]
    } else {
        alerts
            .iter()
            .map(|alert| {
                ListItem::new(vec![
                    Line::from(Span::styled(
                        alert.message.clone(),
                        Style::default().fg(alert_color(alert.kind)),
                    )),
                    Line::from(Span::styled(
                        format!("  {}  severity {}", alert.timestamp, alert.severity),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
            })
            .collect()
    };
    frame.render_widget(List::new(items).block(block("Recent Alerts")), area);
}

fn draw_analytics(frame: &mut Frame, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let consumption: Vec<(f64, f64)> = catalog::HISTORICAL
        .iter()
        .enumerate()
        .map(|(index, month)| (index as f64, f64::from(month.consumption)))
        .collect();
    let generation: Vec<(f64, f64)> = catalog::HISTORICAL
        .iter()
        .enumerate()
        .map(|(index, month)| (index as f64, f64::from(month.generation)))
        .collect();
    let months: Vec<Span> = catalog::HISTORICAL
        .iter()
        .map(|month| Span::raw(month.month))
        .collect();
    let datasets = vec![
        Dataset::default()
            .name("Consumption")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Red))
            .data(&consumption),
        Dataset::default()
            .name("Generation")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&generation),
    ];
    let history = Chart::new(datasets)
        .block(block("Historical Energy Trends (MWh)"))
        .x_axis(
            Axis::default()
                .bounds([0.0, (catalog::HISTORICAL.len() - 1) as f64])
                .labels(months),
        )
        .y_axis(
            Axis::default()
                .bounds([3500.0, 6000.0])
                .labels(vec![Span::raw("3500"), Span::raw("6000")]),
        );
    frame.render_widget(history, rows[0]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(rows[1]);

    let efficiency: Vec<Bar> = catalog::HISTORICAL
        .iter()
        .map(|month| {
            Bar::default()
                .label(Line::from(month.month))
                .value(u64::from(month.efficiency))
                .style(Style::default().fg(Color::Magenta))
        })
        .collect();
    let efficiency = BarChart::default()
        .block(block("Efficiency (%)"))
        .bar_width(3)
        .bar_gap(1)
        .data(BarGroup::default().bars(&efficiency));
    frame.render_widget(efficiency, bottom[0]);

    frame.render_widget(key_values(&catalog::PEAK_DEMAND, "Peak Demand"), bottom[1]);
    frame.render_widget(key_values(&catalog::CARBON, "Carbon Metrics"), bottom[2]);
}

fn key_values<'a>(rows: &'a [(&'a str, &'a str)], title: &'a str) -> Table<'a> {
    let rows = rows
        .iter()
        .map(|(label, value)| Row::new(vec![label.to_string(), value.to_string()]));
    Table::new(rows, [Constraint::Percentage(60), Constraint::Percentage(40)]).block(block(title))
}

fn draw_scada(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(11), Constraint::Min(8)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[0]);

    let link = link_label(app.snapshot().connection);
    let items: Vec<ListItem> = catalog::SUBSTATIONS
        .iter()
        .map(|name| {
            let status = if app.snapshot().connection.is_connected() {
                Span::styled("● Online", Style::default().fg(Color::Green))
            } else {
                Span::styled("● Offline", Style::default().fg(Color::Red))
            };
            ListItem::new(Line::from(vec![Span::raw(format!("{name:<16}")), status]))
        })
        .collect();
    frame.render_widget(
        List::new(items).block(block(&format!("SCADA Connections  [{link}]"))),
        top[0],
    );

    let gauges = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3); 3])
        .split(top[1]);
    let parameters = [
        ("Voltage", app.voltage_label(), 98),
        ("Frequency", app.frequency_label(), 100),
        ("Power Factor", app.power_factor_label(), 95),
    ];
    for ((title, value, percent), area) in parameters.into_iter().zip(gauges.iter()) {
        let gauge = Gauge::default()
            .block(block(title))
            .gauge_style(Style::default().fg(Color::Green))
            .percent(percent)
            .label(value);
        frame.render_widget(gauge, *area);
    }

    let compliance = catalog::NERC_CIP.iter().map(|item| {
        let color = match item.status {
            catalog::ComplianceStatus::Compliant => Color::Green,
            catalog::ComplianceStatus::Review => Color::Yellow,
        };
        Row::new(vec![
            Span::raw(item.standard),
            Span::styled(item.status.label(), Style::default().fg(color)),
            Span::raw(format!("{}%", item.score)),
        ])
    });
    let table = Table::new(
        compliance,
        [
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ],
    )
    .header(
        Row::new(vec!["Standard", "Status", "Score"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(block("NERC CIP Compliance"));
    frame.render_widget(table, rows[1]);
}

fn draw_system(frame: &mut Frame, area: Rect, snapshot: &DashboardSnapshot) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(12), Constraint::Min(8)])
        .split(area);

    let gauges = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3); 4])
        .split(rows[0]);
    let titles = ["CPU Usage", "Memory", "Disk I/O", "Network"];
    for ((title, (_, percent)), area) in titles
        .into_iter()
        .zip(snapshot.health.components())
        .zip(gauges.iter())
    {
        let color = match percent {
            0..=59 => Color::Green,
            60..=79 => Color::Yellow,
            _ => Color::Red,
        };
        let gauge = Gauge::default()
            .block(block(title))
            .gauge_style(Style::default().fg(color))
            .percent(u16::from(percent.min(100)))
            .label(format!("{percent}%"));
        frame.render_widget(gauge, *area);
    }

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let deployments = catalog::DEPLOYMENTS.iter().map(|deployment| {
        let color = if deployment.healthy {
            Color::Green
        } else {
            Color::Yellow
        };
        Row::new(vec![
            Span::raw(deployment.environment),
            Span::raw(deployment.version),
            Span::styled(deployment.status(), Style::default().fg(color)),
            Span::raw(deployment.pods),
        ])
    });
    let deployments = Table::new(deployments, [Constraint::Ratio(1, 4); 4])
        .header(
            Row::new(vec!["Environment", "Version", "Status", "Pods"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(block("Kubernetes Deployments"));
    frame.render_widget(deployments, bottom[0]);

    let scans = catalog::SECURITY_SCANS.iter().map(|scan| {
        let color = if scan.passed {
            Color::Green
        } else {
            Color::Yellow
        };
        Row::new(vec![
            Span::raw(scan.tool),
            Span::styled(scan.status(), Style::default().fg(color)),
            Span::raw(scan.issues.to_string()),
            Span::raw(scan.last_scan),
        ])
    });
    let scans = Table::new(scans, [Constraint::Ratio(1, 4); 4])
        .header(
            Row::new(vec!["Tool", "Status", "Issues", "Last Scan"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(block("Security Scans"));
    frame.render_widget(scans, bottom[1]);
}
