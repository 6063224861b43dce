use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::models::{SortMode, StudentRecord, ViewStats};

pub const EMPTY_VIEW_MESSAGE: &str = "No results. Try adding students or changing search/sort.";

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

/// Whole numbers print without a fractional part, like `275` rather than `275.0`.
pub fn format_total(total: f64) -> String {
    if total.fract() == 0.0 {
        format!("{total:.0}")
    } else {
        total.to_string()
    }
}

pub fn stats_line(stats: ViewStats) -> String {
    if stats.shown == 0 {
        return String::new();
    }
    format!("Showing {} of {} student(s).", stats.shown, stats.total)
}

fn format_created_at(created_at: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(created_at)
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| created_at.to_string())
}

/// Plain-text listing for the terminal.
pub fn render_list(view: &[&StudentRecord], stats: ViewStats, limit: Option<usize>) -> String {
    let mut output = String::new();

    if view.is_empty() {
        let _ = writeln!(output, "{EMPTY_VIEW_MESSAGE}");
        return output;
    }

    let listed = limit.map_or(view.len(), |limit| limit.min(view.len()));
    for (index, student) in view.iter().take(listed).enumerate() {
        let _ = writeln!(
            output,
            "{:>3}. {} total {} avg {:.2} grade {} [{}]",
            index + 1,
            student.name,
            format_total(student.total),
            student.avg,
            student.grade,
            student.id
        );
    }

    if listed < view.len() {
        let _ = writeln!(output, "{} First {listed} listed.", stats_line(stats));
    } else {
        let _ = writeln!(output, "{}", stats_line(stats));
    }
    output
}

pub fn build_html_report(
    search: Option<&str>,
    mode: SortMode,
    view: &[&StudentRecord],
    stats: ViewStats,
) -> String {
    let mut output = String::new();
    let search_label = search
        .map(str::trim)
        .filter(|query| !query.is_empty())
        .map(escape_html)
        .unwrap_or_else(|| "all students".to_string());

    let _ = writeln!(output, "<!doctype html>");
    let _ = writeln!(output, "<html lang=\"en\">");
    let _ = writeln!(output, "<head><meta charset=\"utf-8\"><title>Grade Roster</title></head>");
    let _ = writeln!(output, "<body>");
    let _ = writeln!(output, "<h1>Grade Roster</h1>");
    let _ = writeln!(
        output,
        "<p>Generated for {} ({}) on {}</p>",
        search_label,
        mode.label(),
        Utc::now().format("%Y-%m-%d")
    );
    let _ = writeln!(output, "<table class=\"table\">");
    let _ = writeln!(
        output,
        "<thead><tr><th>#</th><th>Name</th><th>Total</th><th>Average</th><th>Grade</th><th>Added</th></tr></thead>"
    );
    let _ = writeln!(output, "<tbody>");

    if view.is_empty() {
        let _ = writeln!(
            output,
            "<tr class=\"text-center text-muted\"><td colspan=\"6\" class=\"py-4\">{EMPTY_VIEW_MESSAGE}</td></tr>"
        );
    } else {
        for (index, student) in view.iter().enumerate() {
            let _ = writeln!(
                output,
                "<tr data-id=\"{}\"><td>{}</td><td class=\"fw-semibold\">{}</td><td>{}</td><td>{:.2}</td><td><span class=\"badge {}\">{}</span></td><td>{}</td></tr>",
                escape_html(student.id.as_str()),
                index + 1,
                escape_html(&student.name),
                format_total(student.total),
                student.avg,
                student.grade.badge_class(),
                student.grade,
                format_created_at(student.created_at)
            );
        }
    }

    let _ = writeln!(output, "</tbody>");
    let _ = writeln!(output, "</table>");
    let _ = writeln!(output, "<p>{}</p>", stats_line(stats));
    let _ = writeln!(output, "</body>");
    let _ = writeln!(output, "</html>");

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::build;
    use crate::models::{Identity, Scores};

    fn student(name: &str) -> StudentRecord {
        build(
            name,
            Scores {
                math: 95.0,
                english: 88.0,
                science: 92.0,
            },
            Some(Identity {
                id: "s-1".into(),
                created_at: 1_767_225_600_000,
            }),
        )
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#039;Jerry&#039;&lt;/b&gt;"
        );
    }

    #[test]
    fn totals_print_without_trailing_zero() {
        assert_eq!(format_total(275.0), "275");
        assert_eq!(format_total(250.5), "250.5");
    }

    #[test]
    fn stats_line_blank_for_empty_view() {
        assert_eq!(stats_line(ViewStats { shown: 0, total: 4 }), "");
        assert_eq!(
            stats_line(ViewStats { shown: 2, total: 4 }),
            "Showing 2 of 4 student(s)."
        );
    }

    #[test]
    fn list_numbers_rows_and_honours_limit() {
        let first = student("Alice");
        let second = student("Bo");
        let view = vec![&first, &second];
        let text = render_list(&view, ViewStats { shown: 2, total: 2 }, Some(1));
        assert!(text.contains("  1. Alice total 275 avg 91.67 grade A [s-1]"));
        assert!(!text.contains("Bo"));
        assert!(text.ends_with("Showing 2 of 2 student(s). First 1 listed.\n"));

        let text = render_list(&view, ViewStats { shown: 2, total: 3 }, Some(5));
        assert!(text.contains("  2. Bo total 275"));
        assert!(text.ends_with("Showing 2 of 3 student(s).\n"));
    }

    #[test]
    fn empty_list_shows_hint() {
        let text = render_list(&[], ViewStats { shown: 0, total: 3 }, None);
        assert_eq!(text, format!("{EMPTY_VIEW_MESSAGE}\n"));
    }

    #[test]
    fn html_report_escapes_names_and_badges_grades() {
        let record = student("<script>alert('x')</script>");
        let view = vec![&record];
        let html = build_html_report(
            Some("<i>"),
            SortMode::NameAz,
            &view,
            ViewStats { shown: 1, total: 5 },
        );
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#039;x&#039;)&lt;/script&gt;"));
        assert!(html.contains("Generated for &lt;i&gt; (name A-Z)"));
        assert!(html.contains("<span class=\"badge bg-success\">A</span>"));
        assert!(html.contains("<td>2026-01-01 00:00</td>"));
        assert!(html.contains("<p>Showing 1 of 5 student(s).</p>"));
    }
}
