use crate::insights;
use crate::stats::StatsResult;
use std::fmt::Write;

const START_Y: i32 = 30;
const LINE_HEIGHT: i32 = 20;
const LEFT_PADDING: f32 = 15.0;
const RIGHT_PADDING: f32 = 30.0;
const CHAR_WIDTH: f32 = 9.6;
const MIN_COL_CHARS: usize = 50;
const LANG_LABEL_CHARS: usize = 14;
const BAR_HEIGHT: f32 = 8.0;
const CHART_HEIGHT: f32 = 120.0;

#[derive(Clone, Copy, Debug)]
pub enum Theme {
    Dark,
    Light,
}

pub struct ThemeColors {
    pub bg: &'static str,
    pub text: &'static str,
    pub key: &'static str,
    pub value: &'static str,
    pub cc: &'static str,
    pub track: &'static str,
    pub accent: &'static str,
}

impl Theme {
    pub fn colors(self) -> ThemeColors {
        match self {
            Theme::Dark => ThemeColors {
                bg: "#161b22",
                text: "#c9d1d9",
                key: "#ffa657",
                value: "#a5d6ff",
                cc: "#616e7f",
                track: "#21262d",
                accent: "#3fb950",
            },
            Theme::Light => ThemeColors {
                bg: "#ffffff",
                text: "#24292f",
                key: "#d73a49",
                value: "#0366d6",
                cc: "#6a737d",
                track: "#eaeef2",
                accent: "#1a7f37",
            },
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Split a row into key, dot leader and value so the value lands at `align_width`.
pub fn build_stat_row(key: &str, value: &str, align_width: usize) -> (String, String, String) {
    let key_part = format!("{key}: ");
    let base_len = key_part.chars().count() + value.chars().count();
    let available = align_width.saturating_sub(base_len);

    let dots = match available {
        0 => "".to_string(),
        1 => " ".to_string(),
        2 => ". ".to_string(),
        n => ".".repeat(n),
    };

    (key_part, dots, value.to_string())
}

fn build_header_line(label: &str, align_width: usize) -> String {
    let base = format!("{label} ");
    let dash_count = align_width.saturating_sub(base.chars().count()) + 2;
    format!("{base}{}", "-".repeat(dash_count))
}

/// Accumulates text rows and graphics while tracking the next free line.
struct Canvas {
    text: String,
    shapes: String,
    y: i32,
}

impl Canvas {
    fn new() -> Self {
        Self {
            text: String::new(),
            shapes: String::new(),
            y: START_Y,
        }
    }

    fn header(&mut self, label: &str, align_width: usize) {
        let _ = writeln!(
            self.text,
            r#"<tspan x="{LEFT_PADDING}" y="{}">{}</tspan>"#,
            self.y,
            escape_xml(&build_header_line(label, align_width))
        );
        self.y += LINE_HEIGHT;
    }

    fn stat(&mut self, key: &str, value: &str, align_width: usize) {
        let (k, d, v) = build_stat_row(key, value, align_width);
        let _ = writeln!(
            self.text,
            r#"<tspan x="{LEFT_PADDING}" y="{}" class="cc">. </tspan><tspan class="key">{}</tspan><tspan class="cc">{}</tspan><tspan class="value">{}</tspan>"#,
            self.y,
            escape_xml(&k),
            escape_xml(&d),
            escape_xml(&v)
        );
        self.y += LINE_HEIGHT;
    }

    fn note(&mut self, text: &str) {
        let _ = writeln!(
            self.text,
            r#"<tspan x="{LEFT_PADDING}" y="{}" class="cc">  {}</tspan>"#,
            self.y,
            escape_xml(text)
        );
        self.y += LINE_HEIGHT;
    }

    fn blank(&mut self) {
        self.y += LINE_HEIGHT;
    }
}

fn language_rows(canvas: &mut Canvas, stats: &StatsResult, bar_width: f32) {
    if stats.top_languages.is_empty() {
        canvas.note("no language data");
        return;
    }

    let bar_x = LEFT_PADDING + (LANG_LABEL_CHARS as f32 + 2.0) * CHAR_WIDTH;
    for lang in &stats.top_languages {
        let label: String = lang.name.chars().take(LANG_LABEL_CHARS).collect();
        let _ = writeln!(
            canvas.text,
            r#"<tspan x="{LEFT_PADDING}" y="{}" class="cc">. </tspan><tspan class="key">{}</tspan>"#,
            canvas.y,
            escape_xml(&label)
        );
        let _ = writeln!(
            canvas.text,
            r#"<tspan x="{:.1}" y="{}" class="value">{}%</tspan>"#,
            bar_x + bar_width + CHAR_WIDTH,
            canvas.y,
            lang.percentage
        );

        let bar_y = canvas.y as f32 - BAR_HEIGHT - 2.0;
        let filled = bar_width * lang.percentage as f32 / 100.0;
        let _ = writeln!(
            canvas.shapes,
            r#"<rect x="{bar_x:.1}" y="{bar_y:.1}" width="{bar_width:.1}" height="{BAR_HEIGHT}" rx="4" class="track"/>
<rect x="{bar_x:.1}" y="{bar_y:.1}" width="{filled:.1}" height="{BAR_HEIGHT}" rx="4" class="bar"/>"#
        );
        canvas.y += LINE_HEIGHT;
    }
}

/// Area chart of the monthly series with month labels underneath.
fn activity_chart(canvas: &mut Canvas, stats: &StatsResult, chart_width: f32) {
    let points = &stats.activity_data;
    if points.is_empty() {
        canvas.note("no activity data");
        return;
    }

    let top = canvas.y as f32 - LINE_HEIGHT as f32 / 2.0;
    let baseline = top + CHART_HEIGHT;
    let max = points.iter().map(|p| p.count).max().unwrap_or(0).max(1) as f32;
    let step = if points.len() > 1 {
        chart_width / (points.len() - 1) as f32
    } else {
        0.0
    };

    let coords: Vec<(f32, f32)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let x = LEFT_PADDING + step * i as f32;
            let y = baseline - CHART_HEIGHT * p.count as f32 / max;
            (x, y)
        })
        .collect();

    let line: Vec<String> = coords.iter().map(|(x, y)| format!("{x:.1},{y:.1}")).collect();
    let (first_x, _) = coords[0];
    let (last_x, _) = coords[coords.len() - 1];

    let _ = writeln!(
        canvas.shapes,
        r#"<path d="M{first_x:.1},{baseline:.1} L{} L{last_x:.1},{baseline:.1} Z" class="area"/>
<polyline points="{}" class="line"/>"#,
        line.join(" L"),
        line.join(" ")
    );

    let label_y = baseline + LINE_HEIGHT as f32;
    for ((x, _), p) in coords.iter().zip(points) {
        let _ = writeln!(
            canvas.shapes,
            r#"<text x="{x:.1}" y="{label_y:.1}" class="cc" font-size="12px" text-anchor="middle">{}</text>"#,
            escape_xml(p.month)
        );
    }

    canvas.y = (label_y + LINE_HEIGHT as f32).ceil() as i32;
}

/// Render the wrapped card for `username`.
pub fn generate_svg(username: &str, year: i32, stats: &StatsResult, theme: Theme) -> String {
    let colors = theme.colors();
    let insights = insights::derive(&stats.activity_data);

    let most_active = insights
        .most_active
        .map(|p| format!("{} ({} contributions)", p.month, p.count))
        .unwrap_or_else(|| "-".to_string());
    let streaks = insights.streak_months.join(", ");

    let mut rows_for_width: Vec<(String, String)> = stats
        .top_repos
        .iter()
        .map(|r| (r.name.clone(), format!("★ {}", r.stars)))
        .collect();
    rows_for_width.push(("Most Active Month".into(), most_active.clone()));
    rows_for_width.push(("Productive Streaks".into(), streaks.clone()));

    let align_width = rows_for_width
        .iter()
        .map(|(k, v)| k.chars().count() + 2 + v.chars().count())
        .max()
        .unwrap_or(0)
        .max(MIN_COL_CHARS);
    let content_px = align_width as f32 * CHAR_WIDTH;

    let mut canvas = Canvas::new();
    canvas.header(&format!("{username}@wrapped-{year}"), align_width);
    canvas.blank();

    canvas.header("- Top Languages", align_width);
    let bar_width = content_px - (LANG_LABEL_CHARS as f32 + 2.0 + 5.0) * CHAR_WIDTH;
    language_rows(&mut canvas, stats, bar_width.max(CHAR_WIDTH * 10.0));
    canvas.blank();

    canvas.header("- Top Repositories", align_width);
    if stats.top_repos.is_empty() {
        canvas.note("no repositories");
    }
    for repo in &stats.top_repos {
        canvas.stat(&repo.name, &format!("★ {}", repo.stars), align_width);
        if !repo.description.is_empty() {
            let short: String = repo.description.chars().take(align_width - 2).collect();
            canvas.note(&short);
        }
    }
    canvas.blank();

    canvas.header("- Activity (simulated)", align_width);
    activity_chart(&mut canvas, stats, content_px);

    canvas.header("- Year in Review", align_width);
    canvas.stat("Most Active Month", &most_active, align_width);
    canvas.stat("Total Contributions", &insights.total.to_string(), align_width);
    canvas.stat("Average per Month", &insights.average.to_string(), align_width);
    if insights.has_streak() {
        canvas.stat("Productive Streaks", &streaks, align_width);
    }

    let w = LEFT_PADDING + content_px + RIGHT_PADDING;
    let h = canvas.y as f32 + 10.0;

    format!(
        r#"<?xml version='1.0' encoding='UTF-8'?>
<svg xmlns="http://www.w3.org/2000/svg"
     width="{w}px" height="{h}px"
     font-family="ConsolasFallback,Consolas,monospace"
     font-size="16px">

<style>
.key   {{ fill: {key}; }}
.value {{ fill: {value}; }}
.cc    {{ fill: {cc}; }}
.track {{ fill: {track}; }}
.bar   {{ fill: {accent}; }}
.area  {{ fill: {accent}; fill-opacity: 0.15; }}
.line  {{ fill: none; stroke: {accent}; stroke-width: 2; }}
</style>

<rect width="{w}px" height="{h}px" fill="{bg}" rx="15"/>

{shapes}
<text fill="{text}" xml:space="preserve">
{rows}
</text>

</svg>
"#,
        bg = colors.bg,
        text = colors.text,
        key = colors.key,
        value = colors.value,
        cc = colors.cc,
        track = colors.track,
        accent = colors.accent,
        shapes = canvas.shapes,
        rows = canvas.text
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{ActivityPoint, LanguageShare, MONTHS, RepositorySummary};

    fn sample() -> StatsResult {
        StatsResult {
            top_languages: vec![LanguageShare {
                name: "C++".into(),
                percentage: 100,
            }],
            top_repos: vec![RepositorySummary {
                name: "<tags> & more".into(),
                stars: 7,
                description: "uses \"quotes\"".into(),
            }],
            activity_data: MONTHS
                .iter()
                .map(|&month| ActivityPoint { month, count: 42 })
                .collect(),
        }
    }

    #[test]
    fn dot_leader_aligns_value() {
        let (k, d, v) = build_stat_row("Stars", "12", 20);
        assert_eq!(k, "Stars: ");
        assert_eq!(k.len() + d.len() + v.len(), 20);
        assert!(d.chars().all(|c| c == '.'));
    }

    #[test]
    fn short_leaders() {
        assert_eq!(build_stat_row("ab", "c", 5).1, "");
        assert_eq!(build_stat_row("ab", "c", 6).1, " ");
        assert_eq!(build_stat_row("ab", "c", 7).1, ". ");
    }

    #[test]
    fn multibyte_rows_align_by_characters() {
        let (k, d, v) = build_stat_row("Größe", "★ 7", 20);
        let row = format!("{k}{d}{v}");
        assert_eq!(row.chars().count(), 20);
        assert_eq!(d, ".".repeat(10));
        assert!(row.len() > 20);

        let header = build_header_line("- Übersicht", 14);
        assert_eq!(header, "- Übersicht ----");
        assert_eq!(header.chars().count(), 16);
    }

    #[test]
    fn header_pads_with_dashes() {
        assert_eq!(build_header_line("- X", 6), "- X ----");
    }

    #[test]
    fn user_text_is_escaped() {
        let svg = generate_svg("octo", 2024, &sample(), Theme::Dark);
        assert!(svg.contains("&lt;tags&gt; &amp; more"));
        assert!(svg.contains("uses &quot;quotes&quot;"));
        assert!(!svg.contains("<tags>"));
    }

    #[test]
    fn chart_labels_every_month() {
        let svg = generate_svg("octo", 2024, &sample(), Theme::Light);
        for month in MONTHS {
            assert!(svg.contains(&format!(">{month}</text>")));
        }
        assert!(svg.contains("Activity (simulated)"));
        assert!(svg.contains("#ffffff"));
    }

    #[test]
    fn flat_series_has_no_streak_row() {
        let svg = generate_svg("octo", 2024, &sample(), Theme::Dark);
        assert!(!svg.contains("Productive Streaks"));
        assert!(svg.contains("octo@wrapped-2024"));
    }

    #[test]
    fn empty_result_still_renders() {
        let stats = StatsResult {
            top_languages: vec![],
            top_repos: vec![],
            activity_data: vec![],
        };
        let svg = generate_svg("nobody", 2024, &stats, Theme::Dark);
        assert!(svg.contains("no language data"));
        assert!(svg.contains("no repositories"));
        assert!(svg.ends_with("</svg>\n"));
    }
}
