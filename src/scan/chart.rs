// Bar charts of the label counts, for the terminal and as image files.

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgb, RgbImage};
use std::path::Path;

use crate::scan::*;

pub const CHART_TITLE: &str = "Vote distribution in the sample";
pub const X_LABEL: &str = "Vote type";
pub const Y_LABEL: &str = "Count";

const WIDTH: u32 = 500;
const HEIGHT: u32 = 400;
const MARGIN_LEFT: u32 = 60;
const MARGIN_RIGHT: u32 = 20;
const MARGIN_TOP: u32 = 40;
const MARGIN_BOTTOM: u32 = 60;

/// The RGB value of a colour name. Unknown names are gray.
pub fn color_rgb(name: &str) -> [u8; 3] {
    match name.trim().to_lowercase().as_str() {
        "blue" => [31, 119, 180],
        "red" => [214, 39, 40],
        "green" => [44, 160, 44],
        "orange" => [255, 127, 14],
        "purple" => [148, 103, 189],
        "yellow" => [188, 189, 34],
        "black" => [0, 0, 0],
        _ => [127, 127, 127],
    }
}

/// A horizontal bar chart, one line per label. The longest bar has `width` characters.
pub fn render_text_chart(counts: &LabelCounts, width: usize) -> String {
    let max_count = counts.counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let label_width = counts
        .counts
        .iter()
        .map(|(l, _)| l.chars().count())
        .max()
        .unwrap_or(0);
    let mut res = String::new();
    for (label, count) in counts.counts.iter() {
        let bar_len = if max_count == 0 {
            0
        } else {
            ((*count as f64) * (width as f64) / (max_count as f64)).round() as usize
        };
        res.push_str(&format!(
            "{:<lw$} | {:<bw$} {}\n",
            label,
            "#".repeat(bar_len),
            count,
            lw = label_width,
            bw = width
        ));
    }
    res
}

// Geometry of one bar: (x, y, width, height) in pixels, from the top-left corner.
fn bar_geometry(idx: usize, num_bars: usize, count: u64, max_count: u64) -> (u32, u32, u32, u32) {
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let slot = plot_w / (num_bars.max(1) as u32);
    let bar_w = (slot * 6 / 10).max(1);
    let bar_h = if max_count == 0 {
        0
    } else {
        ((count as f64) * (plot_h as f64) / (max_count as f64)).round() as u32
    };
    let x = MARGIN_LEFT + slot * (idx as u32) + slot.saturating_sub(bar_w) / 2;
    let y = MARGIN_TOP + plot_h - bar_h;
    (x, y, bar_w, bar_h)
}

const GLYPH_SIZE: u32 = 8;

fn glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

// Pixels outside of the image are dropped.
fn put(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
    for px in x..x.saturating_add(w) {
        for py in y..y.saturating_add(h) {
            put(img, px as i64, py as i64, color);
        }
    }
}

fn text_width(text: &str, scale: u32) -> u32 {
    (text.chars().count() as u32) * GLYPH_SIZE * scale
}

/// Draws a line of text with the 8x8 bitmap font. (x, y) is the top-left corner.
fn draw_text(img: &mut RgbImage, x: i64, y: i64, text: &str, scale: u32, color: Rgb<u8>) {
    let scale = scale.max(1) as i64;
    for (idx, c) in text.chars().enumerate() {
        let origin = x + (idx as i64) * (GLYPH_SIZE as i64) * scale;
        for (gy, row) in glyph(c).iter().enumerate() {
            for gx in 0..GLYPH_SIZE {
                if row & (1 << gx) == 0 {
                    continue;
                }
                for sx in 0..scale {
                    for sy in 0..scale {
                        put(
                            img,
                            origin + (gx as i64) * scale + sx,
                            y + (gy as i64) * scale + sy,
                            color,
                        );
                    }
                }
            }
        }
    }
}

// Text rotated by a quarter turn, read from bottom to top. (x, y) is the bottom-left corner.
fn draw_text_up(img: &mut RgbImage, x: i64, y: i64, text: &str, color: Rgb<u8>) {
    for (idx, c) in text.chars().enumerate() {
        let origin = y - (idx as i64) * (GLYPH_SIZE as i64);
        for (gy, row) in glyph(c).iter().enumerate() {
            for gx in 0..GLYPH_SIZE {
                if row & (1 << gx) != 0 {
                    put(img, x + gy as i64, origin - gx as i64, color);
                }
            }
        }
    }
}

fn draw_centered(img: &mut RgbImage, center_x: u32, y: u32, text: &str, scale: u32, color: Rgb<u8>) {
    let x = center_x as i64 - (text_width(text, scale) / 2) as i64;
    draw_text(img, x, y as i64, text, scale, color);
}

pub fn render_png(counts: &LabelCounts, labeler: &Labeler) -> RgbImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([255, 255, 255]));
    let ink = Rgb([0, 0, 0]);
    let max_count = counts.counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let num_bars = counts.counts.len();
    let x_axis_y = HEIGHT - MARGIN_BOTTOM;

    let title_scale = if text_width(CHART_TITLE, 2) <= WIDTH { 2 } else { 1 };
    draw_centered(&mut img, WIDTH / 2, 10, CHART_TITLE, title_scale, ink);

    for (idx, (label, count)) in counts.counts.iter().enumerate() {
        let (x, y, w, h) = bar_geometry(idx, num_bars, *count, max_count);
        let color = Rgb(color_rgb(labeler.color_of(label)));
        fill_rect(&mut img, x, y, w, h, color);
        let center = x + w / 2;
        let count_y = y.saturating_sub(GLYPH_SIZE + 2);
        draw_centered(&mut img, center, count_y, &count.to_string(), 1, ink);
        draw_centered(&mut img, center, x_axis_y + 6, label, 1, ink);
    }

    // Axes
    fill_rect(&mut img, MARGIN_LEFT, x_axis_y, WIDTH - MARGIN_LEFT - MARGIN_RIGHT, 1, ink);
    fill_rect(&mut img, MARGIN_LEFT, MARGIN_TOP, 1, x_axis_y - MARGIN_TOP + 1, ink);
    draw_centered(
        &mut img,
        (MARGIN_LEFT + WIDTH - MARGIN_RIGHT) / 2,
        HEIGHT - 20,
        X_LABEL,
        1,
        ink,
    );
    let y_label_bottom = ((MARGIN_TOP + x_axis_y) / 2 + text_width(Y_LABEL, 1) / 2) as i64;
    draw_text_up(&mut img, 16, y_label_bottom, Y_LABEL, ink);
    img
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn render_svg(counts: &LabelCounts, labeler: &Labeler) -> String {
    let max_count = counts.counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let num_bars = counts.counts.len();
    let x_axis_y = HEIGHT - MARGIN_BOTTOM;
    let mut res = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n\
         <rect width=\"{w}\" height=\"{h}\" fill=\"white\"/>\n\
         <text x=\"{cx}\" y=\"24\" text-anchor=\"middle\" font-family=\"sans-serif\" font-size=\"16\">{title}</text>\n",
        w = WIDTH,
        h = HEIGHT,
        cx = WIDTH / 2,
        title = xml_escape(CHART_TITLE)
    );
    for (idx, (label, count)) in counts.counts.iter().enumerate() {
        let (x, y, w, h) = bar_geometry(idx, num_bars, *count, max_count);
        let [r, g, b] = color_rgb(labeler.color_of(label));
        res.push_str(&format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"rgb({},{},{})\"/>\n",
            x, y, w, h, r, g, b
        ));
        res.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-family=\"sans-serif\" font-size=\"11\">{}</text>\n",
            x + w / 2,
            y.saturating_sub(4),
            count
        ));
        res.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-family=\"sans-serif\" font-size=\"12\">{}</text>\n",
            x + w / 2,
            x_axis_y + 18,
            xml_escape(label)
        ));
    }
    res.push_str(&format!(
        "<line x1=\"{l}\" y1=\"{b}\" x2=\"{r}\" y2=\"{b}\" stroke=\"black\"/>\n\
         <line x1=\"{l}\" y1=\"{t}\" x2=\"{l}\" y2=\"{b}\" stroke=\"black\"/>\n\
         <text x=\"{cx}\" y=\"{xl}\" text-anchor=\"middle\" font-family=\"sans-serif\" font-size=\"13\">{x_label}</text>\n\
         <text x=\"16\" y=\"{cy}\" text-anchor=\"middle\" font-family=\"sans-serif\" font-size=\"13\" transform=\"rotate(-90 16 {cy})\">{y_label}</text>\n\
         </svg>\n",
        l = MARGIN_LEFT,
        r = WIDTH - MARGIN_RIGHT,
        t = MARGIN_TOP,
        b = x_axis_y,
        cx = (MARGIN_LEFT + WIDTH - MARGIN_RIGHT) / 2,
        xl = HEIGHT - 16,
        cy = (MARGIN_TOP + x_axis_y) / 2,
        x_label = xml_escape(X_LABEL),
        y_label = xml_escape(Y_LABEL)
    ));
    res
}

/// Writes the bar chart to a file. The format follows the extension: `.png` or `.svg`.
pub fn write_chart(path: &str, counts: &LabelCounts, labeler: &Labeler) -> ScanResult<()> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    debug!("write_chart: path: {:?} extension: {:?}", path, ext);
    match ext.as_deref() {
        Some("png") => render_png(counts, labeler)
            .save(path)
            .context(WritingChartSnafu { path }),
        Some("svg") => {
            fs::write(path, render_svg(counts, labeler)).context(WritingFileSnafu { path })
        }
        _ => UnsupportedChartFormatSnafu { path }.fail(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts() -> LabelCounts {
        LabelCounts {
            counts: vec![
                ("Voto Noboa".to_string(), 40),
                ("Voto Nulo".to_string(), 20),
                ("Voto Luisa".to_string(), 1),
            ],
        }
    }

    fn labeler() -> Labeler {
        Labeler::new(&LabelRules::default_rules()).unwrap()
    }

    #[test]
    fn text_chart() {
        let chart = render_text_chart(&counts(), 10);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Voto Noboa | ########## 40");
        assert_eq!(lines[1], "Voto Nulo  | #####      20");
        assert_eq!(lines[2], "Voto Luisa |            1");
    }

    #[test]
    fn text_chart_empty() {
        assert_eq!(render_text_chart(&LabelCounts::default(), 10), "");
    }

    #[test]
    fn png_bars_use_label_colors() {
        let img = render_png(&counts(), &labeler());
        assert_eq!(img.dimensions(), (WIDTH, HEIGHT));
        let (x, y, w, h) = bar_geometry(0, 3, 40, 40);
        assert_eq!(*img.get_pixel(x + w / 2, y + h / 2), Rgb(color_rgb("blue")));
        let (x, y, w, h) = bar_geometry(1, 3, 20, 40);
        assert_eq!(*img.get_pixel(x + w / 2, y + h / 2), Rgb(color_rgb("gray")));
        // The top of the shorter bar is background.
        assert_eq!(*img.get_pixel(x + w / 2, MARGIN_TOP + 1), Rgb([255, 255, 255]));
    }

    fn has_ink(img: &RgbImage, x0: u32, y0: u32, x1: u32, y1: u32) -> bool {
        (x0..x1).any(|x| (y0..y1).any(|y| *img.get_pixel(x, y) == Rgb([0, 0, 0])))
    }

    #[test]
    fn png_has_title_and_labels() {
        let img = render_png(&counts(), &labeler());
        let x_axis_y = HEIGHT - MARGIN_BOTTOM;
        // Title
        assert!(has_ink(&img, 0, 0, WIDTH, MARGIN_TOP - GLYPH_SIZE - 2));
        // Label under the first bar
        let (x, _, w, _) = bar_geometry(0, 3, 40, 40);
        assert!(has_ink(&img, x, x_axis_y + 2, x + w, x_axis_y + 2 + GLYPH_SIZE + 4));
        // Count above the second bar
        let (x, y, w, _) = bar_geometry(1, 3, 20, 40);
        assert!(has_ink(&img, x, y - GLYPH_SIZE - 2, x + w, y));
        // Axis titles
        assert!(has_ink(&img, MARGIN_LEFT, HEIGHT - 20, WIDTH, HEIGHT));
        assert!(has_ink(&img, 16, MARGIN_TOP, 16 + GLYPH_SIZE, x_axis_y));
        // Nothing is drawn between the bars, below the title.
        let (x0, _, w0, _) = bar_geometry(0, 3, 40, 40);
        assert!(!has_ink(&img, x0 + w0 + 1, MARGIN_TOP, x, x_axis_y));
    }

    #[test]
    fn png_with_many_labels() {
        let many = LabelCounts {
            counts: (0..500).map(|i| (format!("L{}", i), 1)).collect(),
        };
        let img = render_png(&many, &labeler());
        assert_eq!(img.dimensions(), (WIDTH, HEIGHT));
        let (x, _, w, _) = bar_geometry(499, 500, 1, 1);
        assert_eq!(w, 1);
        assert!(x >= MARGIN_LEFT);
    }

    #[test]
    fn svg_contains_labels() {
        let svg = render_svg(&counts(), &labeler());
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(CHART_TITLE));
        assert!(svg.contains(">Voto Noboa</text>"));
        assert!(svg.contains("fill=\"rgb(214,39,40)\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn write_chart_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["chart.png", "chart.SVG"] {
            let p = dir.path().join(name);
            let path = p.to_str().unwrap();
            write_chart(path, &counts(), &labeler()).unwrap();
            assert!(fs::metadata(path).unwrap().len() > 0);
        }
        let p = dir.path().join("chart.gif");
        assert!(matches!(
            write_chart(p.to_str().unwrap(), &counts(), &labeler()),
            Err(ScanError::UnsupportedChartFormat { .. })
        ));
    }
}
