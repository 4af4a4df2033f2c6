//! Render the isomorphic key grid as text or as an HTML/SVG page.
//! Row 0 is drawn at the bottom, like the physical board.

use std::fmt::Write as _;

use isogrid_core::config::KEY_COUNT;
use isogrid_core::{KeyIndex, Layout};

/// Key unit size in SVG pixels.
const U: f64 = 54.0;
/// Gap between keys.
const GAP: f64 = 4.0;
/// Step: key + gap.
const S: f64 = U + GAP;
/// Key corner radius.
const R: f64 = 4.0;
/// Horizontal shift per row, giving the staggered look of the board.
const ROW_SHIFT: f64 = S / 2.0;
/// Margin around the SVG content.
const MARGIN: f64 = 20.0;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Scientific pitch name, MIDI note 60 = C4.
pub fn note_name(note: u8) -> String {
    let octave = note as i32 / 12 - 1;
    format!("{}{}", NOTE_NAMES[note as usize % 12], octave)
}

fn keys() -> impl Iterator<Item = KeyIndex> {
    KeyIndex::all()
}

/// Plain-text grid, top row first: note number and name per key.
pub fn render_text(layout: &Layout) -> String {
    let mut out = String::new();
    for row in (0..layout.rows()).rev() {
        let _ = write!(out, "row {:>2} |", row);
        for key in keys().filter(|&k| layout.position(k).0 == row) {
            let note = layout.note(key);
            let _ = write!(out, " {:>3} {:<4}", note, note_name(note));
        }
        out.push('\n');
    }
    out
}

fn key_origin(layout: &Layout, key: KeyIndex) -> (f64, f64) {
    let (row, col) = layout.position(key);
    let top_row = layout.rows() - 1;
    let x = MARGIN + col as f64 * S + row as f64 * ROW_SHIFT;
    let y = MARGIN + 30.0 + (top_row - row) as f64 * S;
    (x, y)
}

fn render_keys(layout: &Layout) -> String {
    let mut svg = String::from("<g>");

    for key in keys() {
        let (x, y) = key_origin(layout, key);
        let note = layout.note(key);
        let name = note_name(note);
        let class = if name.contains('#') { "key sharp" } else { "key natural" };

        let _ = write!(
            svg,
            r#"<rect class="{class}" x="{x}" y="{y}" width="{U}" height="{U}" rx="{R}" ry="{R}"><title>key {index}</title></rect>"#,
            index = key.get(),
        );
        let _ = write!(
            svg,
            r#"<text class="label" x="{cx}" y="{cy}">{label}</text>"#,
            cx = x + U / 2.0,
            cy = y + U / 2.0 - 7.0,
            label = html_escape(&name),
        );
        let _ = write!(
            svg,
            r#"<text class="label small" x="{cx}" y="{cy}">{note}</text>"#,
            cx = x + U / 2.0,
            cy = y + U / 2.0 + 10.0,
        );
    }

    svg.push_str("</g>");
    svg
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Generate the complete HTML document with inline SVG.
pub fn generate_html(layout: &Layout) -> String {
    let per_row = layout.keys_per_row() as f64;
    let rows = layout.rows() as f64;
    let total_width = 2.0 * MARGIN + per_row * S + (rows - 1.0) * ROW_SHIFT;
    let total_height = 2.0 * MARGIN + 30.0 + rows * S;

    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>isogrid Layout</title>
<style>
  body {{
    background: #1a1a2e;
    color: #eee;
    font-family: system-ui, -apple-system, sans-serif;
    display: flex;
    justify-content: center;
    padding: 2em;
  }}
  svg {{
    filter: drop-shadow(0 2px 8px rgba(0,0,0,0.3));
  }}
  .key {{
    stroke-width: 1.5;
  }}
  .key.natural {{
    fill: #16213e;
    stroke: #0f3460;
  }}
  .key.sharp {{
    fill: #0d1117;
    stroke: #30365e;
  }}
  .key:hover {{
    stroke: #e94560;
  }}
  .label {{
    fill: #eee;
    font-family: "JetBrains Mono", "Fira Code", monospace;
    font-size: 13px;
    text-anchor: middle;
    dominant-baseline: middle;
    pointer-events: none;
  }}
  .label.small {{
    font-size: 10px;
    fill: #8b949e;
  }}
  .title {{
    fill: #e94560;
    font-size: 16px;
    font-weight: bold;
  }}
</style>
</head>
<body>
<svg width="{total_width}" height="{total_height}" xmlns="http://www.w3.org/2000/svg">
<text class="title" x="{MARGIN}" y="{title_y}">{keys} keys, {per_row} per row, rows {stride} semitones apart</text>
"#,
        title_y = MARGIN + 16.0,
        keys = KEY_COUNT,
        stride = layout.row_stride(),
    );

    html.push_str(&render_keys(layout));
    html.push_str("\n</svg>\n</body>\n</html>\n");
    html
}
