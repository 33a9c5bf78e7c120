use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};

use quizr::{QuizState, Status};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

/// Renders a second count as `MM:SS`.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let quiz = &self.quiz;
        let frame = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(area);

        Paragraph::new(Span::styled(
            "quizr",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM))
        .render(frame[0], buf);

        match quiz.status() {
            Status::Ready => render_start(quiz, frame[1], buf),
            Status::Active => render_question(self, frame[1], buf),
            Status::Finished => render_finish(quiz, frame[1], buf),
        }
    }
}

fn render_start(quiz: &QuizState, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);

    let mut lines = vec![
        Line::from(Span::styled("Welcome to quizr!", bold_style)),
        Line::from(""),
        Line::from(format!(
            "{} questions, {} on the clock",
            quiz.num_questions(),
            format_clock(quiz.seconds_remaining())
        )),
    ];
    if quiz.high_score() > 0 {
        lines.push(Line::from(format!("High score: {} points", quiz.high_score())));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "press enter to start, esc to quit",
        dim_style,
    )));

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(centered(area, 6), buf);
}

fn render_question(app: &App, area: Rect, buf: &mut Buffer) {
    let quiz = &app.quiz;
    let question = quiz.current_question();

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                             // progress gauge
            Constraint::Length(1),                             // question n/m, points
            Constraint::Length(1),                             // padding
            Constraint::Length(3),                             // prompt
            Constraint::Length(question.options.len() as u16), // options
            Constraint::Min(1),                                // padding
            Constraint::Length(1),                             // timer + hint
        ])
        .split(area);

    // a question counts as done once it has an answer
    let done = quiz.current_index() + usize::from(quiz.has_answered());
    let ratio = done as f64 / quiz.num_questions() as f64;
    Gauge::default()
        .gauge_style(Style::default().fg(Color::Magenta))
        .ratio(ratio.clamp(0.0, 1.0))
        .label("")
        .render(chunks[0], buf);

    let progress = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    Paragraph::new(format!(
        "Question {}/{}",
        quiz.current_index() + 1,
        quiz.num_questions()
    ))
    .render(progress[0], buf);
    Paragraph::new(format!(
        "{}/{} points",
        quiz.points(),
        quiz.max_possible_points()
    ))
    .alignment(Alignment::Right)
    .render(progress[1], buf);

    Paragraph::new(Span::styled(question.text.as_str(), bold_style))
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

    let correct = question.correct_index();
    let options = question
        .options
        .iter()
        .enumerate()
        .map(|(idx, option)| {
            let label = format!("{}. {}", idx + 1, option);
            let style = match quiz.selected_answer() {
                Some(_) if Some(idx) == correct => green_bold_style,
                Some(choice) if choice == idx => red_bold_style,
                Some(_) => dim_style,
                None if idx == app.cursor => bold_style.add_modifier(Modifier::REVERSED),
                None => Style::default(),
            };
            Line::from(Span::styled(label, style))
        })
        .collect::<Vec<Line>>();
    Paragraph::new(options).render(chunks[4], buf);

    let footer = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(8), Constraint::Min(1)])
        .split(chunks[6]);
    Paragraph::new(Span::styled(
        format_clock(quiz.seconds_remaining()),
        bold_style,
    ))
    .render(footer[0], buf);

    let hint = match (quiz.has_answered(), quiz.is_last_question()) {
        (false, _) => "1-9 or ↑/↓ + enter to answer",
        (true, false) => "n / enter: next question",
        (true, true) => "n / enter: finish",
    };
    Paragraph::new(Span::styled(hint, dim_style))
        .alignment(Alignment::Right)
        .render(footer[1], buf);
}

fn render_finish(quiz: &QuizState, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);

    let mut lines = vec![Line::from(Span::styled(
        format!(
            "You scored {} out of {} ({}%)",
            quiz.points(),
            quiz.max_possible_points(),
            quiz.percentage()
        ),
        bold_style,
    ))];
    if quiz.seconds_remaining() == 0 {
        lines.push(Line::from(Span::styled(
            "time's up!",
            Style::default().fg(Color::Yellow),
        )));
    }
    lines.push(Line::from(format!("(High score: {} points)", quiz.high_score())));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "(r)estart or esc to quit",
        dim_style,
    )));

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(centered(area, 5), buf);
}

/// A full-width strip of `height` rows in the vertical middle of `area`.
fn centered(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    Rect {
        y: area.y + (area.height - height) / 2,
        height,
        ..area
    }
}
