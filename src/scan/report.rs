use log::warn;
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::scan::chart::{render_text_chart, CHART_TITLE};
use crate::scan::io_common::simplify_file_name;
use crate::scan::*;

const PREVIEW_ROWS: usize = 10;
const PREVIEW_TEXT_WIDTH: usize = 50;
const TEXT_CHART_WIDTH: usize = 40;

/// Formats a number with a comma every three digits.
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut res = String::new();
    for (idx, c) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            res.push(',');
        }
        res.push(c);
    }
    res
}

fn shorten(text: &str, width: usize) -> String {
    let one_line = text.replace(['\n', '\r'], " ");
    if one_line.chars().count() <= width {
        one_line
    } else {
        let mut res: String = one_line.chars().take(width.saturating_sub(3)).collect();
        res.push_str("...");
        res
    }
}

/// Prints the statistics of the sample: preview, counts, chart and conclusion.
pub fn print_report<W: Write>(
    out: &mut W,
    summary: &SampleSummary,
    labeled: &[LabeledEntry],
    labeler: &Labeler,
) -> io::Result<()> {
    writeln!(
        out,
        "Total rows in the dataset: {}",
        format_thousands(summary.total_rows as u64)
    )?;
    writeln!(
        out,
        "Sample size: {}",
        format_thousands(summary.sample_size as u64)
    )?;

    writeln!(out, "\nPreview of the sample:")?;
    let preview = &labeled[..labeled.len().min(PREVIEW_ROWS)];
    let id_width = preview
        .iter()
        .map(|le| le.entry.id.chars().count())
        .chain(std::iter::once(2))
        .max()
        .unwrap_or(2);
    let label_width = summary
        .labels
        .iter()
        .map(|l| l.chars().count())
        .chain(std::iter::once(5))
        .max()
        .unwrap_or(5);
    writeln!(
        out,
        "  {:<iw$}  {:<lw$}  text",
        "id",
        "label",
        iw = id_width,
        lw = label_width
    )?;
    for le in preview.iter() {
        writeln!(
            out,
            "  {:<iw$}  {:<lw$}  {}",
            le.entry.id,
            le.label,
            shorten(&le.entry.text, PREVIEW_TEXT_WIDTH),
            iw = id_width,
            lw = label_width
        )?;
    }

    writeln!(out, "\n{}:", CHART_TITLE)?;
    write!(out, "{}", render_text_chart(&summary.counts, TEXT_CHART_WIDTH))?;

    writeln!(
        out,
        "\nNumber of {} in the sample: {}",
        summary.fallback,
        format_thousands(summary.fallback_count())
    )?;
    if let Some(majority) = summary.majority() {
        debug!(
            "print_report: majority {:?} ({})",
            majority,
            labeler.color_of(majority)
        );
    }
    writeln!(out, "\nConclusion: {}", summary.conclusion)?;
    Ok(())
}

/// The summary of the sample, in JSON format.
///
/// All the configured labels are listed, in rule order, including the ones with no vote.
pub fn build_summary_js(summary: &SampleSummary, labeler: &Labeler, settings: &ScanSettings) -> JSValue {
    let tally: Vec<JSValue> = summary
        .labels
        .iter()
        .map(|l| {
            json!({
                "label": l,
                "count": summary.counts.get(l),
                "color": labeler.color_of(l),
            })
        })
        .collect();
    json!({
        "config": {
            "input": simplify_file_name(&settings.input_path),
            "column": settings.column,
            "sampleSize": summary.sample_size,
            "seed": settings.seed,
        },
        "results": {
            "totalRows": summary.total_rows,
            "sampleSize": summary.sample_size,
            "tally": tally,
            "majority": summary.majority(),
            "conclusion": summary.conclusion,
        }
    })
}

pub fn read_summary(path: &str) -> ScanResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

/// Compares a summary with a reference summary. The differences are printed.
pub fn check_reference(reference_path: &str, pretty_js_stats: &str) -> ScanResult<()> {
    let summary_ref = read_summary(reference_path)?;
    info!("summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        return ReferenceMismatchSnafu {}.fail();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::chat::ChatSettings;
    use crate::scan::config_reader::InputType;

    fn labeler() -> Labeler {
        Labeler::new(&LabelRules::default_rules()).unwrap()
    }

    fn labeled() -> Vec<LabeledEntry> {
        let texts = [
            "Noboa",
            "noboa!",
            "luisa",
            "nada",
            "Daniel Noboa, el mejor candidato de todos los tiempos según mi opinión",
        ];
        let entries: Vec<Entry> = texts
            .iter()
            .enumerate()
            .map(|(idx, t)| Entry::new(&format!("v.xlsx-{:08}", idx + 2), t))
            .collect();
        labeler().label_all(&entries)
    }

    fn settings() -> ScanSettings {
        ScanSettings {
            input_path: "/data/v.xlsx".to_string(),
            input_type: InputType::Xlsx,
            column: "text".to_string(),
            worksheet: None,
            sample_size: None,
            seed: 42,
            rules: LabelRules::default_rules(),
            chat: ChatSettings::default(),
            chart_path: None,
            out: None,
            reference: None,
            questions: vec![],
            interactive: false,
        }
    }

    #[test]
    fn thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1234567), "1,234,567");
    }

    #[test]
    fn shorten_text() {
        assert_eq!(shorten("abc", 10), "abc");
        assert_eq!(shorten("a\nb", 10), "a b");
        assert_eq!(shorten("abcdefghij", 6), "abc...");
    }

    #[test]
    fn report_lines() {
        let l = labeled();
        let summary = SampleSummary::new(12000, &l, labeler().rules());
        let mut out: Vec<u8> = Vec::new();
        print_report(&mut out, &summary, &l, &labeler()).unwrap();
        let s = String::from_utf8(out).unwrap();
        assert!(s.contains("Total rows in the dataset: 12,000\n"));
        assert!(s.contains("Sample size: 5\n"));
        assert!(s.contains("v.xlsx-00000004  Voto Luisa  luisa\n"));
        assert!(s.contains("Daniel Noboa, el mejor candidato de todos los t...\n"));
        assert!(s.contains("Number of Voto Nulo in the sample: 1\n"));
        assert!(s.contains("Conclusion: The majority of the votes are for Voto Noboa.\n"));
    }

    #[test]
    fn summary_json() {
        let l = labeled();
        let summary = SampleSummary::new(12000, &l, labeler().rules());
        let js = build_summary_js(&summary, &labeler(), &settings());
        assert_eq!(js["config"]["input"], "v.xlsx");
        assert_eq!(js["config"]["seed"], 42);
        assert_eq!(js["results"]["totalRows"], 12000);
        assert_eq!(js["results"]["majority"], "Voto Noboa");
        let tally = js["results"]["tally"].as_array().unwrap();
        assert_eq!(tally.len(), 3);
        assert_eq!(tally[0]["label"], "Voto Luisa");
        assert_eq!(tally[0]["count"], 1);
        assert_eq!(tally[1]["count"], 3);
        assert_eq!(tally[2]["color"], "gray");
    }

    #[test]
    fn reference_comparison() {
        let l = labeled();
        let summary = SampleSummary::new(12000, &l, labeler().rules());
        let js = build_summary_js(&summary, &labeler(), &settings());
        let pretty = serde_json::to_string_pretty(&js).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let same = dir.path().join("same.json");
        fs::write(&same, &pretty).unwrap();
        assert!(check_reference(same.to_str().unwrap(), &pretty).is_ok());

        let mut other = js.clone();
        other["results"]["totalRows"] = json!(11000);
        let different = dir.path().join("different.json");
        fs::write(&different, serde_json::to_string(&other).unwrap()).unwrap();
        assert!(matches!(
            check_reference(different.to_str().unwrap(), &pretty),
            Err(ScanError::ReferenceMismatch {})
        ));
    }
}
